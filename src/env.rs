//! The ranking environment: one observation per round, one slate per round,
//! cascading click feedback back.
//!
//! A round is an explicit value. [`RankingEnvironment::begin_round`] draws
//! the contexts and hands them out as a [`Round`]; [`RankingEnvironment::apply`]
//! takes that `Round` by value, so an observation is consumed exactly once
//! whether the action is accepted or rejected.

use ndarray::{Array2, Array3, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::click::ClickModel;
use crate::config::RankingConfig;
use crate::error::{RankingError, Result};
use crate::feedback::{CascadingFeedback, FeedbackEncoder};
use crate::observation::{Observation, ObservationGenerator};
use crate::sampler::ContextSampler;
use crate::schema::{action_schema, ArraySchema, ObservationSchema, RewardSchema};
use crate::score::ScoreEngine;

/// The narrow interface a step-lifecycle driver needs from a bandit environment.
pub trait BanditEnvironment {
    fn name(&self) -> &str;

    /// Per-batch-element observation schema.
    fn observation_schema(&self) -> ObservationSchema;

    /// Per-batch-element action schema.
    fn action_schema(&self) -> ArraySchema;

    /// Per-batch-element reward schema.
    fn reward_schema(&self) -> RewardSchema;

    /// Whether observations, actions and rewards carry a leading batch dimension.
    fn batched(&self) -> bool {
        true
    }

    fn batch_size(&self) -> usize;
}

/// Contexts for one round, valid for exactly one [`RankingEnvironment::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    index: u64,
    observation: Observation,
}

impl Round {
    /// Zero-based round number within the issuing environment.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn into_observation(self) -> Observation {
        self.observation
    }
}

/// Contextual ranking-bandit simulator.
///
/// `G` and `I` sample global and per-item contexts; `R` drives the click
/// model's noise and categorical draws.
#[derive(Debug)]
pub struct RankingEnvironment<G, I, R = StdRng> {
    name: String,
    generator: ObservationGenerator<G, I>,
    engine: ScoreEngine,
    click_model: ClickModel,
    feedback: FeedbackEncoder,
    reward_schema: RewardSchema,
    num_slots: usize,
    batch_size: usize,
    rng: R,
    rounds: u64,
}

impl<G: ContextSampler, I: ContextSampler> RankingEnvironment<G, I, StdRng> {
    /// Build an environment whose RNG comes from `cfg.seed` (OS entropy if `None`).
    ///
    /// `weights` is the `[item_dim, global_dim]` score matrix.
    pub fn new(
        global_sampler: G,
        item_sampler: I,
        weights: Array2<f64>,
        cfg: RankingConfig,
    ) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(global_sampler, item_sampler, weights, cfg, rng)
    }
}

impl<G: ContextSampler, I: ContextSampler, R: Rng> RankingEnvironment<G, I, R> {
    /// Build an environment around an injected RNG. `cfg.seed` is ignored.
    ///
    /// The configuration is validated before either sampler is called. Each
    /// sampler is then called once to infer its feature dimension.
    pub fn with_rng(
        global_sampler: G,
        item_sampler: I,
        weights: Array2<f64>,
        cfg: RankingConfig,
        rng: R,
    ) -> Result<Self> {
        let (feedback, click_model) = cfg.resolve()?;

        let generator = ObservationGenerator::new(global_sampler, item_sampler, cfg.num_items);
        let engine = ScoreEngine::with_dims(weights, generator.item_dim(), generator.global_dim())?;

        if click_model.num_outcomes(cfg.num_slots, generator.item_dim()) == 0 {
            return Err(RankingError::Config(
                "ghost actions need num_slots + item_dim >= 1".to_string(),
            ));
        }

        tracing::info!(
            name = %cfg.name,
            num_items = cfg.num_items,
            num_slots = cfg.num_slots,
            global_dim = generator.global_dim(),
            item_dim = generator.item_dim(),
            batch_size = cfg.batch_size,
            click_model = ?click_model,
            "ranking environment ready"
        );

        Ok(Self {
            name: cfg.name,
            generator,
            engine,
            click_model,
            feedback,
            reward_schema: RewardSchema::cascading(cfg.num_slots),
            num_slots: cfg.num_slots,
            batch_size: cfg.batch_size,
            rng,
            rounds: 0,
        })
    }

    pub fn num_items(&self) -> usize {
        self.generator.num_items()
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn global_dim(&self) -> usize {
        self.generator.global_dim()
    }

    pub fn item_dim(&self) -> usize {
        self.generator.item_dim()
    }

    pub fn click_model(&self) -> ClickModel {
        self.click_model
    }

    pub fn score_engine(&self) -> &ScoreEngine {
        &self.engine
    }

    /// Rounds started so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Draw a fresh observation and open a round for it.
    pub fn begin_round(&mut self) -> Result<Round> {
        let observation = self.generator.observe(self.batch_size)?;
        let index = self.rounds;
        self.rounds += 1;
        Ok(Round { index, observation })
    }

    /// Apply a batch of slates to the round's observation.
    ///
    /// `action` is `[batch_size, num_slots]`; row `b` lists item indices into
    /// batch element `b`'s item pool, best slot first. The round is consumed
    /// even when the action is rejected.
    pub fn apply(
        &mut self,
        round: Round,
        action: ArrayView2<'_, usize>,
    ) -> Result<CascadingFeedback> {
        self.validate_action(action)?;
        self.check_observation(&round.observation)?;

        let global = round.observation.global();
        let items = round.observation.per_arm();
        let mut slotted = Array3::<f64>::zeros((self.batch_size, self.num_slots, self.item_dim()));
        for (b, slate) in action.outer_iter().enumerate() {
            let pool = items.index_axis(Axis(0), b);
            let mut dest = slotted.index_axis_mut(Axis(0), b);
            for (slot, &item) in slate.iter().enumerate() {
                dest.row_mut(slot).assign(&pool.row(item));
            }
        }

        let chosen = self
            .click_model
            .choose(&self.engine, global, slotted.view(), &mut self.rng)?;
        let raw = self.feedback.encode(&chosen, self.num_slots);
        let feedback = self.reward_schema.coerce(&raw)?;

        tracing::debug!(
            round = round.index,
            clicks = feedback.clicks(),
            no_clicks = feedback.batch_size() - feedback.clicks(),
            "round applied"
        );
        Ok(feedback)
    }

    /// Begin a round, ask `policy` for slates, and apply them.
    pub fn run_round<F>(&mut self, policy: F) -> Result<(Observation, CascadingFeedback)>
    where
        F: FnOnce(&Observation) -> Array2<usize>,
    {
        let round = self.begin_round()?;
        let action = policy(round.observation());
        let observation = round.observation.clone();
        let feedback = self.apply(round, action.view())?;
        Ok((observation, feedback))
    }

    fn validate_action(&self, action: ArrayView2<'_, usize>) -> Result<()> {
        let (rows, cols) = action.dim();
        if rows != self.batch_size {
            return Err(RankingError::Validation(format!(
                "number of actions ({rows}) must match batch size ({})",
                self.batch_size
            )));
        }
        if cols != self.num_slots {
            return Err(RankingError::Validation(format!(
                "each slate must have {} slots, got {cols}",
                self.num_slots
            )));
        }
        let num_items = self.num_items();
        if let Some(&bad) = action.iter().find(|&&i| i >= num_items) {
            return Err(RankingError::Validation(format!(
                "item index {bad} out of range for {num_items} items"
            )));
        }
        Ok(())
    }

    fn check_observation(&self, obs: &Observation) -> Result<()> {
        let expected = [self.batch_size, self.num_items(), self.item_dim()];
        let actual = obs.per_arm().dim();
        if actual != (expected[0], expected[1], expected[2])
            || obs.global().dim() != (self.batch_size, self.global_dim())
        {
            return Err(RankingError::ShapeMismatch {
                what: "round observation",
                expected: expected.to_vec(),
                actual: vec![actual.0, actual.1, actual.2],
            });
        }
        Ok(())
    }
}

impl<G, I, R> BanditEnvironment for RankingEnvironment<G, I, R>
where
    G: ContextSampler,
    I: ContextSampler,
    R: Rng,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn observation_schema(&self) -> ObservationSchema {
        ObservationSchema::new(self.global_dim(), self.num_items(), self.item_dim())
    }

    fn action_schema(&self) -> ArraySchema {
        action_schema(self.num_slots, self.num_items())
    }

    fn reward_schema(&self) -> RewardSchema {
        self.reward_schema.clone()
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClickModelKind;
    use ndarray::array;

    fn fixed(v: Vec<f64>) -> impl FnMut() -> Vec<f64> {
        move || v.clone()
    }

    fn distance_cfg(threshold: f64, batch_size: usize) -> RankingConfig {
        RankingConfig {
            num_items: 2,
            num_slots: 2,
            click_model: ClickModelKind::DistanceBased,
            distance_threshold: Some(threshold),
            batch_size,
            ..RankingConfig::default()
        }
    }

    #[test]
    fn begin_round_counts_rounds() {
        let mut env = RankingEnvironment::new(
            fixed(vec![1.0, 0.0]),
            fixed(vec![1.0, 0.0]),
            Array2::eye(2),
            distance_cfg(0.5, 3),
        )
        .unwrap();
        let r0 = env.begin_round().unwrap();
        let r1 = env.begin_round().unwrap();
        assert_eq!((r0.index(), r1.index()), (0, 1));
        assert_eq!(env.rounds(), 2);
        assert_eq!(r1.observation().global().shape(), &[3, 2]);
    }

    #[test]
    fn slate_order_picks_items() {
        // Items alternate [1,0], [0,1]; the slate reverses them, so the
        // high-scoring item sits in slot 1.
        let mut flip = false;
        let items = move || {
            flip = !flip;
            if flip {
                vec![0.0, 1.0]
            } else {
                vec![1.0, 0.0]
            }
        };
        // Inference sample consumes the first call ([0,1]); the pool is then [1,0], [0,1].
        let mut env = RankingEnvironment::new(
            fixed(vec![1.0, 0.0]),
            items,
            Array2::eye(2),
            distance_cfg(0.5, 1),
        )
        .unwrap();
        let round = env.begin_round().unwrap();
        assert_eq!(round.observation().per_arm()[[0, 0, 0]], 1.0);
        let fb = env.apply(round, array![[1usize, 0]].view()).unwrap();
        assert_eq!(fb.chosen_index().to_vec(), vec![1]);
        assert_eq!(fb.chosen_value().to_vec(), vec![1.0]);
    }

    #[test]
    fn wrong_slate_width_and_out_of_range_items_are_rejected() {
        let mut env = RankingEnvironment::new(
            fixed(vec![1.0, 0.0]),
            fixed(vec![1.0, 0.0]),
            Array2::eye(2),
            distance_cfg(0.5, 1),
        )
        .unwrap();
        let round = env.begin_round().unwrap();
        assert!(matches!(
            env.apply(round, array![[0usize]].view()),
            Err(RankingError::Validation(_))
        ));
        let round = env.begin_round().unwrap();
        assert!(matches!(
            env.apply(round, array![[0usize, 2]].view()),
            Err(RankingError::Validation(_))
        ));
    }

    #[test]
    fn weight_matrix_must_match_dims() {
        let res = RankingEnvironment::new(
            fixed(vec![1.0, 0.0, 0.0]),
            fixed(vec![1.0, 0.0]),
            Array2::eye(2),
            distance_cfg(0.5, 1),
        );
        assert!(matches!(
            res,
            Err(RankingError::ShapeMismatch {
                what: "weight matrix",
                ..
            })
        ));
    }

    #[test]
    fn config_is_checked_before_sampling() {
        let mut sampled = false;
        let global = || {
            sampled = true;
            vec![1.0]
        };
        let cfg = RankingConfig {
            click_model: ClickModelKind::DistanceBased,
            distance_threshold: None,
            ..RankingConfig::default()
        };
        let rejected = matches!(
            RankingEnvironment::new(global, fixed(vec![1.0]), Array2::eye(1), cfg),
            Err(RankingError::Config(_))
        );
        assert!(rejected);
        assert!(!sampled);
    }

    #[test]
    fn empty_ghost_categorical_is_rejected() {
        let cfg = RankingConfig {
            num_items: 1,
            num_slots: 0,
            ..RankingConfig::default()
        };
        let res = RankingEnvironment::new(
            fixed(vec![1.0]),
            fixed(Vec::new()),
            Array2::zeros((0, 1)),
            cfg,
        );
        assert!(matches!(res, Err(RankingError::Config(_))));
    }

    #[test]
    fn schemas_reflect_configuration() {
        let env = RankingEnvironment::new(
            fixed(vec![1.0, 0.0, 0.0]),
            fixed(vec![1.0, 0.0]),
            Array2::zeros((2, 3)),
            RankingConfig {
                num_items: 7,
                num_slots: 4,
                batch_size: 5,
                ..RankingConfig::default()
            },
        )
        .unwrap();
        assert!(env.batched());
        assert_eq!(env.batch_size(), 5);
        assert_eq!(env.name(), "ranking_environment");
        assert_eq!(env.observation_schema().per_arm.shape, vec![7, 2]);
        assert_eq!(env.action_schema().maximum, Some(6.0));
        assert_eq!(env.reward_schema().chosen_index.maximum, Some(4.0));
    }
}

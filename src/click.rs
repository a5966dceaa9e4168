//! Simulated user click models.
//!
//! Both models turn a slate's scores into a chosen slot index in
//! `[0, num_slots]`, where `num_slots` is the no-click sentinel.
//!
//! - [`ClickModel::GhostActions`]: the slate competes against `item_dim`
//!   one-hot "ghost" items. Scores are perturbed with unit Gaussian noise,
//!   squashed with a logistic, normalized by their L1 norm and sampled as a
//!   categorical. Landing on a ghost means the user clicked nothing. A slate
//!   that covers the feature space well makes ghosts unlikely.
//! - [`ClickModel::DistanceBased`]: the threshold is appended as one more
//!   "score" and the arg-max wins. If no item beats the threshold, nothing is
//!   clicked. Exact ties go to the lowest index, so an item scoring exactly
//!   the threshold is clicked.

use ndarray::{concatenate, Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::ClickModelKind;
use crate::error::{RankingError, Result};
use crate::score::ScoreEngine;

/// Resolved click model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickModel {
    GhostActions,
    DistanceBased { threshold: f64 },
}

impl ClickModel {
    /// Resolve the configured kind and threshold.
    ///
    /// The threshold must be present (and finite) exactly when the kind is
    /// `DistanceBased`.
    pub fn from_config(kind: ClickModelKind, distance_threshold: Option<f64>) -> Result<Self> {
        match (kind, distance_threshold) {
            (ClickModelKind::GhostActions, None) => Ok(Self::GhostActions),
            (ClickModelKind::GhostActions, Some(_)) => Err(RankingError::Config(
                "distance_threshold is only used by the distance-based click model".to_string(),
            )),
            (ClickModelKind::DistanceBased, Some(threshold)) if threshold.is_finite() => {
                Ok(Self::DistanceBased { threshold })
            }
            (ClickModelKind::DistanceBased, Some(t)) => Err(RankingError::Config(format!(
                "distance_threshold must be finite, got {t}"
            ))),
            (ClickModelKind::DistanceBased, None) => Err(RankingError::Config(
                "distance_threshold must be set for the distance-based click model".to_string(),
            )),
            (ClickModelKind::Unknown, _) => Err(RankingError::Unsupported(
                "click model `unknown` is not implemented".to_string(),
            )),
        }
    }

    /// Length of the score vector this model draws its choice from.
    pub fn num_outcomes(&self, num_slots: usize, item_dim: usize) -> usize {
        match self {
            Self::GhostActions => num_slots + item_dim,
            Self::DistanceBased { .. } => num_slots + 1,
        }
    }

    /// Choose one slot per batch element.
    ///
    /// `slotted` holds the slate's item vectors, `[B, num_slots, item_dim]`.
    /// Every returned index lies in `[0, num_slots]`.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        engine: &ScoreEngine,
        global: ArrayView2<'_, f64>,
        slotted: ArrayView3<'_, f64>,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        match *self {
            Self::GhostActions => choose_ghost_actions(engine, global, slotted, &mut *rng),
            Self::DistanceBased { threshold } => {
                choose_distance_based(engine, global, slotted, threshold)
            }
        }
    }
}

/// Append one unit vector per item-feature dimension to every slate.
///
/// `[B, S, D]` becomes `[B, S + D, D]`; row `S + j` is the `j`-th unit vector.
pub fn with_ghost_items(slotted: ArrayView3<'_, f64>) -> Result<Array3<f64>> {
    let (b, s, d) = slotted.dim();
    let eye = Array2::<f64>::eye(d);
    let ghosts = eye
        .broadcast((b, d, d))
        .ok_or_else(|| RankingError::ShapeMismatch {
            what: "ghost items",
            expected: vec![b, d, d],
            actual: vec![d, d],
        })?;
    concatenate(Axis(1), &[slotted.view(), ghosts]).map_err(|_| RankingError::ShapeMismatch {
        what: "slate with ghost items",
        expected: vec![b, s + d, d],
        actual: slotted.shape().to_vec(),
    })
}

/// Turn perturbed scores into per-row categorical probabilities.
///
/// Each score is mapped through the logistic function and every row is
/// divided by its L1 norm. The weights are kept in log space and normalized
/// against the row maximum, so a row whose logistic weights all underflow
/// still concentrates on its highest scores. A row containing NaN becomes
/// uniform.
pub fn ghost_action_probabilities(perturbed: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut probs = perturbed.mapv(log_logistic);
    for mut row in probs.axis_iter_mut(Axis(0)) {
        if row.is_empty() {
            continue;
        }
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if row.iter().any(|l| l.is_nan()) || max == f64::NEG_INFINITY {
            tracing::warn!(max, "degenerate click weights, falling back to uniform");
            let uniform = 1.0 / row.len() as f64;
            row.fill(uniform);
            continue;
        }
        row.mapv_inplace(|l| (l - max).exp());
        let norm = row.sum();
        row.mapv_inplace(|w| w / norm);
    }
    probs
}

/// `ln(1 / (1 + e^-x))` without overflow or underflow to `-inf` for finite `x`.
fn log_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

/// Sample an index from a probability vector by walking its CDF.
///
/// If rounding leaves the draw past the last cumulative bucket, the last
/// index is returned.
pub fn sample_categorical<R: Rng + ?Sized>(probs: ArrayView1<'_, f64>, rng: &mut R) -> usize {
    let r: f64 = rng.random();
    let mut cdf = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cdf += *p;
        if r < cdf {
            return i;
        }
    }
    // Numerical fallback.
    probs.len().saturating_sub(1)
}

/// Index of the largest value; the lowest index wins exact ties. NaN never wins.
pub fn argmax_first(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

fn choose_ghost_actions<R: Rng + ?Sized>(
    engine: &ScoreEngine,
    global: ArrayView2<'_, f64>,
    slotted: ArrayView3<'_, f64>,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let num_slots = slotted.shape()[1];
    let extended = with_ghost_items(slotted)?;
    let mut scores = engine.scores(global, extended.view())?;

    // Noisy observation of the user's utility: N(score, 1).
    for s in scores.iter_mut() {
        let z: f64 = rng.sample(StandardNormal);
        *s += z;
    }

    let probs = ghost_action_probabilities(scores.view());
    let chosen = probs
        .axis_iter(Axis(0))
        .map(|p| {
            tracing::trace!(probs = ?p.to_vec(), "ghost-action distribution");
            sample_categorical(p, &mut *rng).min(num_slots)
        })
        .collect();
    Ok(chosen)
}

fn choose_distance_based(
    engine: &ScoreEngine,
    global: ArrayView2<'_, f64>,
    slotted: ArrayView3<'_, f64>,
    threshold: f64,
) -> Result<Vec<usize>> {
    let scores = engine.scores(global, slotted)?;
    let no_click = Array2::from_elem((scores.nrows(), 1), threshold);
    let with_threshold =
        concatenate(Axis(1), &[scores.view(), no_click.view()]).map_err(|_| {
            RankingError::ShapeMismatch {
                what: "scores with threshold",
                expected: vec![scores.nrows(), scores.ncols() + 1],
                actual: scores.shape().to_vec(),
            }
        })?;
    Ok(with_threshold
        .axis_iter(Axis(0))
        .map(argmax_first)
        .collect())
}

/// Ghost-action probabilities for unperturbed scores, for inspection.
///
/// Same transform as the click draw, minus the Gaussian noise.
pub fn expected_ghost_probabilities(
    engine: &ScoreEngine,
    global: ArrayView2<'_, f64>,
    slotted: ArrayView3<'_, f64>,
) -> Result<Array2<f64>> {
    let extended = with_ghost_items(slotted)?;
    let scores = engine.scores(global, extended.view())?;
    Ok(ghost_action_probabilities(scores.view()))
}

/// Per-row click probability mass on real slots (everything but ghosts).
pub fn click_mass(probs: ArrayView2<'_, f64>, num_slots: usize) -> Array1<f64> {
    let k = num_slots.min(probs.ncols());
    probs
        .axis_iter(Axis(0))
        .map(|row| row.iter().take(k).sum::<f64>())
        .collect()
}

//! Environment configuration.
//!
//! A [`RankingConfig`] is fixed for the lifetime of an environment. It is
//! resolved once, at construction, into the closed runtime enums
//! ([`ClickModel`], [`FeedbackEncoder`]); their `from_config` constructors
//! hold the model rules. Nothing re-reads the raw fields after construction.

use crate::click::ClickModel;
use crate::error::{RankingError, Result};
use crate::feedback::FeedbackEncoder;

/// Default environment name.
pub const DEFAULT_NAME: &str = "ranking_environment";

/// How the simulated user's choice is reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeedbackModel {
    /// No feedback model specified. Always rejected.
    Unknown,
    /// A single `(chosen_index, chosen_value)` pair per batch element.
    #[default]
    Cascading,
}

/// Which user click model to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClickModelKind {
    /// No click model specified. Always rejected.
    Unknown,
    /// One unit-vector "ghost" item per item-feature dimension competes with
    /// the slate; picking a ghost means no click.
    #[default]
    GhostActions,
    /// The best-scoring slate item is clicked only if it beats a threshold.
    DistanceBased,
}

/// Configuration for a [`RankingEnvironment`](crate::RankingEnvironment).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RankingConfig {
    /// Items in the per-round pool (must be >= 1).
    pub num_items: usize,
    /// Slate length (must be <= `num_items`).
    pub num_slots: usize,
    /// Feedback model; only `Cascading` is implemented.
    pub feedback_model: FeedbackModel,
    /// User click model.
    pub click_model: ClickModelKind,
    /// Utility of "click nothing" for the distance-based model.
    ///
    /// Required (and finite) iff `click_model == DistanceBased`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub distance_threshold: Option<f64>,
    /// Batch elements simulated per round (must be >= 1).
    pub batch_size: usize,
    /// RNG seed for noise and categorical draws. `None` seeds from the OS.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub seed: Option<u64>,
    /// Human-readable environment name.
    pub name: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            num_items: 10,
            num_slots: 3,
            feedback_model: FeedbackModel::Cascading,
            click_model: ClickModelKind::GhostActions,
            distance_threshold: None,
            batch_size: 1,
            seed: Some(0),
            name: DEFAULT_NAME.to_string(),
        }
    }
}

impl RankingConfig {
    /// Check the sampler-independent invariants.
    ///
    /// Dimension-dependent checks (weight matrix shape, empty ghost-action
    /// categorical) happen at environment construction, once the sampler
    /// dimensions are known.
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Validate and resolve the configured models into their runtime enums.
    pub(crate) fn resolve(&self) -> Result<(FeedbackEncoder, ClickModel)> {
        let feedback = FeedbackEncoder::from_config(self.feedback_model)?;
        if self.batch_size == 0 {
            return Err(RankingError::Config("batch_size must be >= 1".to_string()));
        }
        if self.num_items == 0 {
            return Err(RankingError::Config("num_items must be >= 1".to_string()));
        }
        if self.num_slots > self.num_items {
            return Err(RankingError::Config(format!(
                "num_slots ({}) must not exceed num_items ({})",
                self.num_slots, self.num_items
            )));
        }
        let click_model = ClickModel::from_config(self.click_model, self.distance_threshold)?;
        Ok((feedback, click_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(RankingConfig::default().validate(), Ok(()));
        assert_eq!(
            RankingConfig::default().resolve(),
            Ok((FeedbackEncoder::Cascading, ClickModel::GhostActions))
        );
    }

    #[test]
    fn distance_based_resolves_with_its_threshold() {
        let cfg = RankingConfig {
            click_model: ClickModelKind::DistanceBased,
            distance_threshold: Some(0.75),
            ..RankingConfig::default()
        };
        assert_eq!(
            cfg.resolve().map(|(_, click)| click),
            Ok(ClickModel::DistanceBased { threshold: 0.75 })
        );
    }

    #[test]
    fn distance_based_requires_threshold() {
        let cfg = RankingConfig {
            click_model: ClickModelKind::DistanceBased,
            distance_threshold: None,
            ..RankingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RankingError::Config(_))));

        let cfg = RankingConfig {
            distance_threshold: Some(f64::NAN),
            ..cfg
        };
        assert!(matches!(cfg.validate(), Err(RankingError::Config(_))));
    }

    #[test]
    fn threshold_without_distance_model_is_rejected() {
        let cfg = RankingConfig {
            distance_threshold: Some(0.5),
            ..RankingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RankingError::Config(_))));
    }

    #[test]
    fn unknown_models_are_unsupported() {
        let cfg = RankingConfig {
            feedback_model: FeedbackModel::Unknown,
            ..RankingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RankingError::Unsupported(_))));

        let cfg = RankingConfig {
            click_model: ClickModelKind::Unknown,
            ..RankingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(RankingError::Unsupported(_))));
    }

    #[test]
    fn slot_and_batch_bounds() {
        let too_many_slots = RankingConfig {
            num_items: 2,
            num_slots: 3,
            ..RankingConfig::default()
        };
        assert!(matches!(too_many_slots.validate(), Err(RankingError::Config(_))));

        let empty_batch = RankingConfig {
            batch_size: 0,
            ..RankingConfig::default()
        };
        assert!(matches!(empty_batch.validate(), Err(RankingError::Config(_))));

        let no_items = RankingConfig {
            num_items: 0,
            num_slots: 0,
            ..RankingConfig::default()
        };
        assert!(matches!(no_items.validate(), Err(RankingError::Config(_))));

        let zero_slots = RankingConfig {
            num_slots: 0,
            ..RankingConfig::default()
        };
        assert_eq!(zero_slots.validate(), Ok(()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_json_roundtrip() {
        let cfg = RankingConfig {
            click_model: ClickModelKind::DistanceBased,
            distance_threshold: Some(0.25),
            batch_size: 4,
            ..RankingConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("distance_based"));
        let back: RankingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);

        // Missing fields fall back to defaults.
        let partial: RankingConfig = serde_json::from_str(r#"{"num_items": 5}"#).unwrap();
        assert_eq!(partial.num_items, 5);
        assert_eq!(partial.click_model, ClickModelKind::GhostActions);
    }
}

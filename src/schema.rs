//! Declared shapes, value kinds and bounds of observations, actions and rewards.
//!
//! Schemas describe a single batch element. [`RewardSchema::coerce`] is the
//! explicit step that turns the simulator's internal feedback (`usize`
//! indices, `f64` values) into the declared reward types.

use ndarray::Array1;

use crate::error::{RankingError, Result};
use crate::feedback::{CascadingFeedback, RawFeedback};

/// Key of the global feature vector in an observation.
pub const GLOBAL_KEY: &str = "global";
/// Key of the per-item feature matrix in an observation.
pub const PER_ARM_KEY: &str = "per_arm";

/// Element type of a declared array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Int32,
    Float32,
    Float64,
}

/// Shape, element type and optional inclusive bounds of one array.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArraySchema {
    pub name: String,
    pub shape: Vec<usize>,
    pub kind: ValueKind,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ArraySchema {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            shape,
            kind,
            minimum: None,
            maximum: None,
        }
    }

    pub fn bounded(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Whether `v` lies within the declared bounds (if any).
    pub fn contains(&self, v: f64) -> bool {
        self.minimum.map_or(true, |lo| v >= lo) && self.maximum.map_or(true, |hi| v <= hi)
    }
}

/// The two named observation entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSchema {
    pub global: ArraySchema,
    pub per_arm: ArraySchema,
}

impl ObservationSchema {
    pub fn new(global_dim: usize, num_items: usize, item_dim: usize) -> Self {
        Self {
            global: ArraySchema::new(GLOBAL_KEY, vec![global_dim], ValueKind::Float64),
            per_arm: ArraySchema::new(PER_ARM_KEY, vec![num_items, item_dim], ValueKind::Float64),
        }
    }
}

/// Action schema: `num_slots` item indices in `[0, num_items - 1]`.
pub fn action_schema(num_slots: usize, num_items: usize) -> ArraySchema {
    ArraySchema::new("action", vec![num_slots], ValueKind::Int32)
        .bounded(0.0, num_items.saturating_sub(1) as f64)
}

/// Reward schema of the cascading feedback model.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSchema {
    pub chosen_index: ArraySchema,
    pub chosen_value: ArraySchema,
    num_slots: usize,
}

impl RewardSchema {
    /// `chosen_index == num_slots` means no item was clicked.
    pub fn cascading(num_slots: usize) -> Self {
        Self {
            chosen_index: ArraySchema::new("chosen_index", Vec::new(), ValueKind::Int32)
                .bounded(0.0, num_slots as f64),
            chosen_value: ArraySchema::new("chosen_value", Vec::new(), ValueKind::Float32),
            num_slots,
        }
    }

    /// Slate length; also the no-click `chosen_index`.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Coerce raw feedback into the declared reward types.
    ///
    /// Fails if a value cannot be represented or lies outside its bounds.
    pub fn coerce(&self, raw: &RawFeedback) -> Result<CascadingFeedback> {
        if raw.chosen_index.len() != raw.chosen_value.len() {
            return Err(RankingError::ShapeMismatch {
                what: "raw feedback",
                expected: vec![raw.chosen_index.len()],
                actual: vec![raw.chosen_value.len()],
            });
        }
        let kinds = (self.chosen_index.kind, self.chosen_value.kind);
        if kinds != (ValueKind::Int32, ValueKind::Float32) {
            return Err(RankingError::Unsupported(format!(
                "reward kinds ({:?}, {:?})",
                self.chosen_index.kind, self.chosen_value.kind
            )));
        }

        let index = raw
            .chosen_index
            .iter()
            .map(|&k| {
                let v = i32::try_from(k).map_err(|_| {
                    RankingError::Validation(format!("chosen_index {k} does not fit in i32"))
                })?;
                if !self.chosen_index.contains(f64::from(v)) {
                    return Err(RankingError::Validation(format!(
                        "chosen_index {k} outside [{:?}, {:?}]",
                        self.chosen_index.minimum, self.chosen_index.maximum
                    )));
                }
                Ok(v)
            })
            .collect::<Result<Array1<i32>>>()?;

        let value = raw
            .chosen_value
            .iter()
            .map(|&v| v as f32)
            .collect::<Array1<f32>>();

        Ok(CascadingFeedback::from_parts(index, value, self.num_slots))
    }
}

//! Cascading feedback encoding.
//!
//! The user's choice is reported as one `(chosen_index, chosen_value)` pair
//! per batch element: the clicked slot and `1.0`, or the no-click sentinel
//! `num_slots` and `0.0`. The score that produced the click is not reported.

use ndarray::{Array1, ArrayView1};

use crate::config::FeedbackModel;
use crate::error::{RankingError, Result};

/// Resolved feedback model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEncoder {
    Cascading,
}

impl FeedbackEncoder {
    pub fn from_config(model: FeedbackModel) -> Result<Self> {
        match model {
            FeedbackModel::Cascading => Ok(Self::Cascading),
            FeedbackModel::Unknown => Err(RankingError::Unsupported(
                "feedback model `unknown` is not implemented".to_string(),
            )),
        }
    }

    /// Encode chosen slot indices (each in `[0, num_slots]`).
    pub fn encode(&self, chosen: &[usize], num_slots: usize) -> RawFeedback {
        match self {
            Self::Cascading => RawFeedback {
                chosen_index: chosen.to_vec(),
                chosen_value: chosen
                    .iter()
                    .map(|&k| if k < num_slots { 1.0 } else { 0.0 })
                    .collect(),
            },
        }
    }
}

/// Feedback in the simulator's internal representation, before it is coerced
/// to the declared reward schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeedback {
    pub chosen_index: Vec<usize>,
    pub chosen_value: Vec<f64>,
}

/// Cascading feedback in its declared types: `i32` index, `f32` value.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadingFeedback {
    chosen_index: Array1<i32>,
    chosen_value: Array1<f32>,
    num_slots: usize,
}

impl CascadingFeedback {
    pub(crate) fn from_parts(
        chosen_index: Array1<i32>,
        chosen_value: Array1<f32>,
        num_slots: usize,
    ) -> Self {
        Self {
            chosen_index,
            chosen_value,
            num_slots,
        }
    }

    pub fn chosen_index(&self) -> ArrayView1<'_, i32> {
        self.chosen_index.view()
    }

    pub fn chosen_value(&self) -> ArrayView1<'_, f32> {
        self.chosen_value.view()
    }

    /// The no-click sentinel for this feedback (`num_slots`).
    pub fn no_click_index(&self) -> usize {
        self.num_slots
    }

    pub fn batch_size(&self) -> usize {
        self.chosen_index.len()
    }

    /// Clicked slot for batch element `b`, `None` on no-click.
    pub fn clicked_slot(&self, b: usize) -> Option<usize> {
        let k = usize::try_from(*self.chosen_index.get(b)?).ok()?;
        (k < self.num_slots).then_some(k)
    }

    /// Number of batch elements with a click.
    pub fn clicks(&self) -> usize {
        self.chosen_value.iter().filter(|&&v| v > 0.0).count()
    }
}

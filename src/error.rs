//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Errors raised while constructing an environment or running a round.
///
/// Construction-time problems (`Config`, `Unsupported`) are reported before any
/// round runs. Per-round problems (`Validation`, `ShapeMismatch`) fail only the
/// round they occur in.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A feedback or click model was requested that is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An action (or other per-round input) violates the declared contract.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Data produced by a sampler, or handed back by a caller, has the wrong shape.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A sampling distribution could not be built from the given parameters.
    #[error("invalid distribution: {0}")]
    Distribution(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RankingError>;

//! `rankenv`: a contextual ranking-bandit simulator.
//!
//! Each round the environment draws a global context and a pool of item
//! contexts, accepts a ranked slate of item indices as the action, and
//! simulates which slot (if any) a synthetic user clicks.  It is meant for
//! benchmarking ranking / recommendation policies offline; it contains no
//! agent logic of its own.
//!
//! **User model.** An item's utility is the bilinear score
//! `item · W · global`, with a fixed `[item_dim, global_dim]` weight matrix.
//! Scores become a click through one of two [`ClickModel`]s:
//!
//! - **Ghost actions**: every slate is extended with `item_dim` unit-vector
//!   "ghost" items.  Scores get unit Gaussian noise, pass through a logistic,
//!   are L1-normalized, and one outcome is sampled.  Landing on a ghost means
//!   there was no suitable candidate near the user, i.e. no click.  Slates that
//!   cover the item feature space well make ghosts unlikely, so this rewards
//!   diversity.
//! - **Distance based**: the arg-max over the slate scores plus one constant
//!   `distance_threshold` column.  Nothing beats the threshold → no click.
//!   Exact ties go to the lowest index (the item, not the threshold).
//!
//! **Feedback.** Cascading: per batch element, `chosen_index` in
//! `[0, num_slots]` (`num_slots` = no click) and `chosen_value` = `1.0` on a
//! click, `0.0` otherwise.  Values are coerced to the declared reward schema
//! (`i32`, `f32`) in an explicit step.
//!
//! **Rounds are values.**  [`RankingEnvironment::begin_round`] returns a
//! [`Round`] owning the observation; [`RankingEnvironment::apply`] consumes it.
//! There is no cached "current observation" to go stale.
//!
//! **Determinism.**  All noise and categorical draws go through one RNG:
//! seeded from [`RankingConfig::seed`] by default, or injected with
//! [`RankingEnvironment::with_rng`].  Same seed, same samplers, same slates →
//! same feedback.
//!
//! ```rust
//! use ndarray::{array, Array2};
//! use rankenv::{ClickModelKind, RankingConfig, RankingEnvironment};
//!
//! let cfg = RankingConfig {
//!     num_items: 2,
//!     num_slots: 2,
//!     click_model: ClickModelKind::DistanceBased,
//!     distance_threshold: Some(0.5),
//!     ..RankingConfig::default()
//! };
//! let mut flip = false;
//! let items = move || {
//!     flip = !flip;
//!     if flip { vec![1.0, 0.0] } else { vec![0.0, 1.0] }
//! };
//! let mut env =
//!     RankingEnvironment::new(|| vec![1.0, 0.0], items, Array2::eye(2), cfg).unwrap();
//!
//! let round = env.begin_round().unwrap();
//! let feedback = env.apply(round, array![[0usize, 1]].view()).unwrap();
//! assert!(feedback.chosen_index()[0] <= 2);
//! ```
//!
//! **Non-goals:**
//! - No policies / learners.
//! - No episode or step-type bookkeeping; [`BanditEnvironment`] exposes only
//!   what a driver needs (schemas, batch size).
//! - No statistical realism beyond the two click models.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod config;
pub use config::*;

mod sampler;
pub use sampler::*;

mod observation;
pub use observation::*;

mod score;
pub use score::*;

mod click;
pub use click::*;

mod feedback;
pub use feedback::*;

mod schema;
pub use schema::*;

mod env;
pub use env::*;

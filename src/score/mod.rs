//! Scoring pipeline: normalize → lag blend → stability → mood blend → Life Score.
//!
//! Every function here is pure over a `History`, an explicit as-of date, and
//! a `ScoringConfig`.

pub mod lag;
pub mod life;
pub mod normalize;
pub mod optimum;
pub mod stability;

pub use lag::lag_blend;
pub use life::{compose, compute_life_score, observed_mood, score_from_raw, Band, LifeScoreResult};
pub use normalize::{goodness, mood_unit};
pub use optimum::{estimate_zone, OptimalZone};
pub use stability::{compute_stability, StabilityResult};

//! Streaks of consecutive qualifying days.
//!
//! A day qualifies when its saved entry scores at least the goal (10 points
//! by default). Streaks are computed entirely on the backend; clients only
//! read [`StreakSnapshot`]s.

pub mod models;
pub mod tracker;

pub use models::{DEFAULT_GOAL_POINTS, StreakRecord, StreakSnapshot};
pub use tracker::StreakTracker;

//! # Greenify
//!
//! Daily environmental-impact habit tracking.
//!
//! A user records, once per calendar day, how often they threw away trash or
//! recycled, how far they drove, and whether they used a reusable bottle or
//! bag. Those inputs are worth points, and days that reach the point goal
//! build a streak.
//!
//! ## Core Modules
//!
//! - [`scoring`]: The point formula shared by backend and client
//! - [`entry`]: Daily inputs, saved entry views and the entry manager
//! - [`streak`]: Streak rules and the streak tracker
//! - [`auth`]: Accounts, password hashing and bearer tokens
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use greenify::{DailyInputs, score};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
//! let commute = DailyInputs {
//!     miles_driven: 100.0,
//!     ..DailyInputs::empty(date)
//! };
//! assert_eq!(score(&commute), 0);
//! ```

/// Accounts, password hashing and bearer tokens.
pub mod auth;

/// Daily inputs and the entry manager.
pub mod entry;
pub use entry::{DailyEntryView, DailyInputs};

/// Point formula.
pub mod scoring;
pub use scoring::{sanitize_miles, score};

/// Streak rules and tracking.
pub mod streak;
pub use streak::StreakSnapshot;

//! Daily entries: one record of habit inputs per user per calendar date.
//!
//! The [`EntryManager`] is the backend's view of entries. Saving is a full
//! replace keyed by `(user, date)`; every save recomputes the authoritative
//! point total with [`crate::scoring::score`] and feeds the streak tracker.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use greenify::entry::{DailyInputs, EntryManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let entries = EntryManager::new(10);
//! let date = NaiveDate::from_ymd_opt(2025, 4, 22).unwrap();
//!
//! let view = entries
//!     .upsert(1, DailyInputs { recycle_count: 4, ..DailyInputs::empty(date) })
//!     .await?;
//! assert_eq!(view.points_total, 8);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{EntryError, EntryResult};
pub use manager::EntryManager;
pub use models::{DailyEntryView, DailyInputs, parse_date};

//! Client library for the greenify daily impact tracker.
//!
//! - [`session`]: login, registration, account changes and the bearer token
//! - [`reconciler`]: editable daily entry reconciled against the saved record
//! - [`streak`]: streak statistics
//! - [`token_store`]: durable token storage
//! - [`commands`]: command-line parsing for the `gf_client` binary

pub mod commands;
pub mod config;
pub mod errors;
pub mod reconciler;
pub mod session;
pub mod streak;
pub mod token_store;

pub use errors::{ClientError, ClientResult};
pub use reconciler::{DailyEntryReconciler, EntryPhase, Outcome};
pub use session::{SessionManager, UserIdentity};
pub use streak::StreakReader;

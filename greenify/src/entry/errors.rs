//! Daily entry error types.

use thiserror::Error;

/// Daily entry errors
#[derive(Debug, Error)]
pub enum EntryError {
    /// Date was not a `YYYY-MM-DD` calendar day
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Mileage was negative or not a finite number
    #[error("Invalid miles driven: {0}")]
    InvalidMiles(f64),
}

impl EntryError {
    /// Get a message that is safe to send back to a client
    pub fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Result type for daily entry operations
pub type EntryResult<T> = Result<T, EntryError>;

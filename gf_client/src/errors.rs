//! Client error types.

use thiserror::Error;

/// Failures surfaced by the session, reconciler and CLI
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("Saving failed ({status}): {detail}")]
    SaveFailed { status: u16, detail: String },

    #[error("Request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token storage error: {0}")]
    TokenStore(#[from] std::io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

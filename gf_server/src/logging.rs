//! Structured logging configuration.
//!
//! Request correlation is handled by the request ID middleware; this module
//! installs the subscriber and provides helpers for security events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info` with noisy HTTP internals turned down. Records emitted through the
/// `log` facade (the `greenify` library) are forwarded as well.
///
/// # Example
///
/// ```no_run
/// use gf_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `request_id` - Request the event happened in, for correlation
/// * `user_id` - Optional user ID
/// * `username` - Optional username the event concerns
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use gf_server::logging::log_security_event;
///
/// log_security_event(
///     "failed_login",
///     Some("3f2c9a4e-request"),
///     None,
///     Some("fern"),
///     "Invalid credentials"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    request_id: Option<&str>,
    user_id: Option<i64>,
    username: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        request_id = request_id,
        user_id = user_id,
        username = username,
        "SECURITY: {}",
        message
    );
}

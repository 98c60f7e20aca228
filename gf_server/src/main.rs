//! Greenify tracker backend.
//!
//! Serves the account, daily entry and streak API over HTTP with
//! in-memory storage.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use chrono::Duration;
use gf_server::{api, config::ServerConfig, logging, metrics};
use greenify::{auth::AuthManager, entry::EntryManager};
use pico_args::Arguments;

const HELP: &str = "\
Run the greenify daily impact tracker backend

USAGE:
  gf_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  JWT_SECRET               JWT signing secret, at least 32 characters (required)
  PASSWORD_PEPPER          Password hashing pepper, at least 16 characters (required)
  TOKEN_TTL_HOURS          Bearer token lifetime in hours [default: 24]
  STREAK_GOAL_POINTS       Daily points needed to extend a streak [default: 10]
  METRICS_BIND             Prometheus exporter address, disabled when unset
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;

    logging::init();

    let config = ServerConfig::from_env(bind)?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        tracing::info!("Prometheus exporter listening on {}", metrics_bind);
    }

    let auth_manager = Arc::new(
        AuthManager::new(
            config.security.password_pepper.clone(),
            config.security.jwt_secret.clone(),
        )
        .with_token_duration(Duration::hours(config.security.token_ttl_hours)),
    );
    let entry_manager = Arc::new(EntryManager::new(config.streak_goal_points));

    tracing::info!(
        goal_points = config.streak_goal_points,
        token_ttl_hours = config.security.token_ttl_hours,
        "Managers ready"
    );

    let app = api::create_router(api::AppState {
        auth_manager,
        entry_manager,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
    }
}

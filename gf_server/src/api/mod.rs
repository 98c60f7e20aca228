//! HTTP API for the greenify tracker.
//!
//! # Modules
//!
//! - [`users`]: Account endpoints (register, login, identity, rename, password, delete)
//! - [`entries`]: Daily entry read and save
//! - [`streak`]: Streak statistics
//! - [`middleware`]: Bearer token authentication for protected endpoints
//! - [`request_id`]: Request correlation and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ## Accounts (No Auth Required)
//! - `POST /api/user/register` - Register new user
//! - `POST /api/user/login` - Login, returns the bearer token as plain text
//!
//! ## Accounts (Auth Required)
//! - `GET /api/user/me` - Current identity
//! - `PUT /api/user/me/username` - Change username
//! - `PUT /api/user/me/password` - Change password
//! - `DELETE /api/user/me` - Delete account
//!
//! ## Entries and Streak (Auth Required)
//! - `GET /api/daily-entry/{date}` - Entry for a `YYYY-MM-DD` date
//! - `POST /api/daily-entry` - Save (replace) the entry for a date
//! - `GET /api/streak` - Current and longest streak
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use gf_server::api::{create_router, AppState};
//! use greenify::{auth::AuthManager, entry::EntryManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         "a-pepper-of-sixteen-chars".to_string(),
//!         "a-jwt-secret-that-is-at-least-32-characters".to_string(),
//!     )),
//!     entry_manager: Arc::new(EntryManager::new(10)),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is permissive so browser front ends on other origins can call the API.

pub mod entries;
pub mod middleware;
pub mod request_id;
pub mod streak;
pub mod users;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use greenify::{auth::AuthManager, entry::EntryManager};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Error half of every handler result: status plus a plain-text body
pub type ApiError = (StatusCode, String);

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; both managers sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub entry_manager: Arc<EntryManager>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET    /health                   - Health check (public)
/// POST   /api/user/register        - Register user (public)
/// POST   /api/user/login           - Login (public)
/// GET    /api/user/me              - Identity (auth required)
/// DELETE /api/user/me              - Delete account (auth required)
/// PUT    /api/user/me/username     - Rename (auth required)
/// PUT    /api/user/me/password     - Change password (auth required)
/// GET    /api/daily-entry/{date}   - Read entry (auth required)
/// POST   /api/daily-entry          - Save entry (auth required)
/// GET    /api/streak               - Streak (auth required)
/// ```
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login));

    let protected_routes = Router::new()
        .route("/api/user/me", get(users::me).delete(users::delete_account))
        .route("/api/user/me/username", put(users::change_username))
        .route("/api/user/me/password", put(users::change_password))
        .route("/api/daily-entry", post(entries::save_entry))
        .route("/api/daily-entry/{date}", get(entries::get_entry))
        .route("/api/streak", get(streak::get_streak))
        // Only matched routes are guarded; unknown paths fall through to 404
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id::request_id_middleware)),
        )
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0"}
/// ```
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

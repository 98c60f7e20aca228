//! Account API handlers.
//!
//! This module provides the `/api/user` endpoints:
//! - Registration with username, email and password
//! - Login returning a bearer token as plain text
//! - Reading the current identity
//! - Changing username / password and deleting the account
//!
//! Failures carry a human-readable plain-text body that clients show as-is.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8080/api/user/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "fern", "email": "fern@example.com", "password": "compost"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/user/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "fern", "password": "compost"}'
//! ```

use axum::{Extension, Json, extract::State, http::StatusCode};
use greenify::auth::{AuthError, LoginRequest, RegisterRequest, User, UserId};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, request_id::RequestId};
use crate::{logging::log_security_event, metrics};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUsernamePayload {
    pub new_username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub new_password: String,
}

/// Public identity of an account
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<User> for IdentityResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Map an account error onto a status code and plain-text body
fn auth_error(e: AuthError) -> ApiError {
    let status = match e {
        AuthError::InvalidCredentials | AuthError::JwtError(_) | AuthError::UserNotFound => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::UsernameTaken
        | AuthError::EmailTaken
        | AuthError::InvalidUsername(_)
        | AuthError::InvalidEmail(_)
        | AuthError::InvalidPassword(_) => StatusCode::BAD_REQUEST,
    };
    (status, e.client_message())
}

/// Register a new account.
///
/// # Response
///
/// `200 OK` with `{"id": 1, "username": "fern", "email": "fern@example.com"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Blank fields, malformed email, or name/email in use
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let request = RegisterRequest {
        username: payload.username,
        email: payload.email,
        password: payload.password,
    };

    let user = state.auth_manager.register(request).await.map_err(|e| {
        tracing::info!("Registration rejected: {}", e);
        auth_error(e)
    })?;

    metrics::registrations_total();
    Ok(Json(user.into()))
}

/// Authenticate and return a bearer token.
///
/// # Response
///
/// `200 OK` with the token as a plain-text body.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<LoginPayload>,
) -> Result<String, ApiError> {
    let username = payload.username.clone();
    let request = LoginRequest {
        username: payload.username,
        password: payload.password,
    };

    match state.auth_manager.login(request).await {
        Ok((user, token)) => {
            metrics::login_attempts_total(true);
            tracing::info!(user_id = user.id, "User logged in");
            Ok(token)
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            log_security_event(
                "failed_login",
                Some(request_id.as_str()),
                None,
                Some(&username),
                &e.to_string(),
            );
            Err(auth_error(e))
        }
    }
}

/// Identity of the authenticated user.
pub async fn me(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let user = state.auth_manager.get_user(user_id).await.map_err(auth_error)?;
    Ok(Json(user.into()))
}

/// Change the authenticated user's username.
///
/// # Errors
///
/// - `400 Bad Request`: Blank name or name already taken
pub async fn change_username(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<ChangeUsernamePayload>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_manager
        .change_username(user_id, &payload.new_username)
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::OK)
}

/// Change the authenticated user's password.
///
/// # Errors
///
/// - `400 Bad Request`: Blank password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_manager
        .change_password(user_id, &payload.new_password)
        .await
        .map_err(auth_error)?;
    log_security_event(
        "password_changed",
        Some(request_id.as_str()),
        Some(user_id),
        None,
        "Password changed",
    );
    Ok(StatusCode::OK)
}

/// Delete the authenticated user's account with its entries and streak.
///
/// # Response
///
/// `204 No Content`. Tokens issued to the account stop working.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Extension(request_id): Extension<RequestId>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_manager
        .delete_user(user_id)
        .await
        .map_err(auth_error)?;
    state.entry_manager.remove_user(user_id).await;
    log_security_event(
        "account_deleted",
        Some(request_id.as_str()),
        Some(user_id),
        None,
        "Account deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

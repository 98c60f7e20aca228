//! Streak API handler.

use axum::{Extension, Json, extract::State};
use greenify::{StreakSnapshot, auth::UserId};

use super::AppState;

/// Streak statistics for the authenticated user.
///
/// # Response
///
/// ```json
/// {"current": 3, "longest": 5, "goal": 10, "lastDate": "2025-06-02"}
/// ```
///
/// Users who never reached the goal get `{"current": 0, "longest": 0, "goal": 10}`.
pub async fn get_streak(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Json<StreakSnapshot> {
    Json(state.entry_manager.streak(user_id).await)
}

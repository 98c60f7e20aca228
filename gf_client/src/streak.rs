//! Streak lookups.

use greenify::StreakSnapshot;
use reqwest::Method;
use std::sync::Arc;

use crate::session::SessionManager;

/// Read-through view of the server's streak statistics
#[derive(Clone)]
pub struct StreakReader {
    session: Arc<SessionManager>,
}

impl StreakReader {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Current streak, or `None` when logged out or the server has nothing
    /// usable to say
    pub async fn get_streak(&self) -> Option<StreakSnapshot> {
        let response = match self
            .session
            .authenticated_request(Method::GET, "/api/streak", None)
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::debug!("Streak unavailable (status {})", response.status());
                return None;
            }
            Err(e) => {
                log::debug!("Streak fetch failed: {}", e);
                return None;
            }
        };

        response
            .json::<StreakSnapshot>()
            .await
            .inspect_err(|e| log::debug!("Streak response was not understood: {}", e))
            .ok()
    }
}

//! Session management for the tracker backend.
//!
//! A [`SessionManager`] owns the bearer token and the cached identity of the
//! logged-in user. It is built once at startup (loading any persisted token)
//! and shared behind an `Arc` with every component that issues authenticated
//! calls.
//!
//! The session is torn down on explicit [`logout`](SessionManager::logout)
//! and whenever the server answers an authenticated call with
//! `401 Unauthorized`.
//!
//! # Example
//!
//! ```rust,no_run
//! use gf_client::{session::SessionManager, token_store::MemoryTokenStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> gf_client::ClientResult<()> {
//! let session = Arc::new(SessionManager::new(
//!     "http://localhost:8080",
//!     Box::new(MemoryTokenStore::new()),
//! )?);
//!
//! session.login("fern", "compost").await?;
//! assert!(session.is_authenticated());
//! # Ok(())
//! # }
//! ```

use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    errors::{ClientError, ClientResult},
    token_store::TokenStore,
};

/// Identity of the logged-in user as reported by `GET /api/user/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
}

/// In-memory session state
///
/// `identity` is fetched lazily and may be absent while `token` is present.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<UserIdentity>,
}

/// Owner of the session and issuer of authenticated requests
pub struct SessionManager {
    client: reqwest::Client,
    base_url: String,
    session: RwLock<Session>,
    store: Box<dyn TokenStore>,
}

impl SessionManager {
    /// Create a manager talking to `base_url`, restoring any token in `store`
    ///
    /// # Errors
    ///
    /// * `ClientError::TokenStore` - The persisted token could not be read
    pub fn new(base_url: impl Into<String>, store: Box<dyn TokenStore>) -> ClientResult<Self> {
        let token = store.load()?;
        if token.is_some() {
            log::debug!("Restored persisted session token");
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(Session {
                token,
                identity: None,
            }),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.read().identity.clone()
    }

    /// Log in and persist the returned token
    ///
    /// The identity is fetched afterwards; failing to fetch it does not fail
    /// the login.
    ///
    /// # Errors
    ///
    /// * `ClientError::InvalidCredentials` - Server answered 401
    /// * `ClientError::LoginFailed` - Any other failure, including transport
    /// * `ClientError::TokenStore` - Token could not be persisted
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        let response = self
            .client
            .post(self.url("/api/user/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::LoginFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        if !status.is_success() {
            let (_, detail) = failure_detail(response).await;
            return Err(ClientError::LoginFailed(detail));
        }

        let token = response
            .text()
            .await
            .map_err(|e| ClientError::LoginFailed(e.to_string()))?
            .trim()
            .to_string();
        if token.is_empty() {
            return Err(ClientError::LoginFailed(
                "Server returned an empty token".to_string(),
            ));
        }

        {
            let mut session = self.write();
            session.token = Some(token.clone());
            session.identity = None;
        }
        self.store.save(&token)?;
        log::info!("Logged in as {}", username);

        self.fetch_identity().await;
        Ok(token)
    }

    /// Create an account; the response body is ignored
    ///
    /// # Errors
    ///
    /// * `ClientError::RegistrationFailed` - Non-2xx, carrying the server's text
    /// * `ClientError::Transport` - Server unreachable
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url("/api/user/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (_, detail) = failure_detail(response).await;
            return Err(ClientError::RegistrationFailed(detail));
        }

        log::info!("Registered {}", username);
        Ok(())
    }

    /// Register, then log in with the same credentials
    pub async fn register_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<String> {
        self.register(username, email, password).await?;
        self.login(username, password).await
    }

    /// Issue a request carrying the bearer token.
    ///
    /// A `401` response clears the session (memory and durable token) before
    /// the response is handed back, unless the session has moved on to a
    /// different token in the meantime. Callers still have to check the status.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotAuthenticated` - No token; nothing was sent
    /// * `ClientError::Transport` - Server unreachable
    pub async fn authenticated_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<Response> {
        let (_, response) = self.send_with_token(method, path, body).await?;
        Ok(response)
    }

    /// Send with the current token and hand back that token with the response
    async fn send_with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<(String, Response)> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;

        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if self.clear_session(&token) {
                log::warn!("Server rejected the session on {}, logging out", path);
            } else {
                log::debug!("Ignoring 401 on {} for a replaced token", path);
            }
        }

        Ok((token, response))
    }

    /// Forget the token and identity. No network call is made.
    ///
    /// # Errors
    ///
    /// * `ClientError::TokenStore` - Durable token could not be removed
    pub fn logout(&self) -> ClientResult<()> {
        *self.write() = Session::default();
        self.store.clear()?;
        log::info!("Logged out");
        Ok(())
    }

    /// Refresh the cached identity; failures leave it empty
    pub async fn fetch_identity(&self) -> Option<UserIdentity> {
        let (token, response) = match self.send_with_token(Method::GET, "/api/user/me", None).await {
            Ok((token, response)) if response.status().is_success() => (token, response),
            Ok((_, response)) => {
                log::debug!("Identity fetch returned {}", response.status());
                return None;
            }
            Err(e) => {
                log::debug!("Identity fetch failed: {}", e);
                return None;
            }
        };

        match response.json::<UserIdentity>().await {
            Ok(identity) => {
                let mut session = self.write();
                if session.token.as_deref() != Some(token.as_str()) {
                    log::debug!("Dropping identity fetched for a replaced token");
                    return None;
                }
                session.identity = Some(identity.clone());
                Some(identity)
            }
            Err(e) => {
                log::debug!("Identity response was not understood: {}", e);
                None
            }
        }
    }

    /// Rename the logged-in user
    ///
    /// # Errors
    ///
    /// * `ClientError::RequestFailed` - Non-2xx, carrying the server's text
    /// * `ClientError::SessionExpired` - Server rejected the token
    pub async fn change_username(&self, new_username: &str) -> ClientResult<()> {
        let response = self
            .authenticated_request(
                Method::PUT,
                "/api/user/me/username",
                Some(json!({ "newUsername": new_username })),
            )
            .await?;
        expect_success(response).await?;

        if let Some(identity) = self.write().identity.as_mut() {
            identity.username = new_username.trim().to_string();
        }
        Ok(())
    }

    /// Change the logged-in user's password
    ///
    /// # Errors
    ///
    /// * `ClientError::RequestFailed` - Non-2xx, carrying the server's text
    /// * `ClientError::SessionExpired` - Server rejected the token
    pub async fn change_password(&self, new_password: &str) -> ClientResult<()> {
        let response = self
            .authenticated_request(
                Method::PUT,
                "/api/user/me/password",
                Some(json!({ "newPassword": new_password })),
            )
            .await?;
        expect_success(response).await
    }

    /// Delete the account and log out
    ///
    /// # Errors
    ///
    /// * `ClientError::RequestFailed` - Non-2xx; the session is kept
    /// * `ClientError::SessionExpired` - Server rejected the token
    pub async fn delete_account(&self) -> ClientResult<()> {
        let response = self
            .authenticated_request(Method::DELETE, "/api/user/me", None)
            .await?;
        expect_success(response).await?;

        log::info!("Account deleted");
        self.logout()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Tear the session down if it still holds `rejected`
    fn clear_session(&self, rejected: &str) -> bool {
        let mut session = self.write();
        if session.token.as_deref() != Some(rejected) {
            return false;
        }
        *session = Session::default();
        if let Err(e) = self.store.clear() {
            log::warn!("Failed to remove persisted token: {}", e);
        }
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Status code and body text of a failed response
pub(crate) async fn failure_detail(response: Response) -> (u16, String) {
    let status = response.status();
    let detail = match response.text().await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(e) => format!("Failed to read error response: {}", e),
    };
    (status.as_u16(), detail)
}

/// Turn a non-2xx response into the matching error
async fn expect_success(response: Response) -> ClientResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::SessionExpired);
    }
    let (status, detail) = failure_detail(response).await;
    Err(ClientError::RequestFailed { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;

    #[test]
    fn test_new_restores_token() {
        let manager = SessionManager::new(
            "http://localhost:8080/",
            Box::new(MemoryTokenStore::with_token("saved")),
        )
        .unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(manager.token().as_deref(), Some("saved"));
        assert_eq!(manager.identity(), None);
        assert_eq!(manager.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_logout_clears_everything() {
        let manager =
            SessionManager::new("http://localhost:8080", Box::new(MemoryTokenStore::with_token("t")))
                .unwrap();

        manager.logout().unwrap();
        assert!(!manager.is_authenticated());
        assert_eq!(manager.token(), None);
    }

    #[tokio::test]
    async fn test_unauthenticated_request_is_local() {
        // Nothing listens on port 9; a network attempt would be a transport error
        let manager =
            SessionManager::new("http://127.0.0.1:9", Box::new(MemoryTokenStore::new())).unwrap();

        let result = manager
            .authenticated_request(Method::GET, "/api/user/me", None)
            .await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
        assert_eq!(manager.fetch_identity().await, None);
    }
}

//! Account management: registration, login and profile changes.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - Stateless HS256 JWT bearer tokens (24-hour expiry by default)
//! - Username / password changes and account deletion
//!
//! Accounts are kept in process memory.
//!
//! ## Example
//!
//! ```
//! use greenify::auth::{AuthManager, LoginRequest, RegisterRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthManager::new("pepper".to_string(), "jwt_secret".to_string());
//!
//! auth.register(RegisterRequest {
//!     username: "fern".to_string(),
//!     email: "fern@example.com".to_string(),
//!     password: "compost".to_string(),
//! })
//! .await?;
//!
//! let (user, token) = auth
//!     .login(LoginRequest {
//!         username: "fern".to_string(),
//!         password: "compost".to_string(),
//!     })
//!     .await?;
//! assert_eq!(auth.authenticate(&token).await?, user.id);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessTokenClaims, LoginRequest, RegisterRequest, User, UserId};

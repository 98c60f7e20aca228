//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, LoginRequest, RegisterRequest, User, UserId},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tokio::sync::RwLock;

/// Longest accepted username
const MAX_USERNAME_LEN: usize = 50;

/// A user together with their password hash
#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<RwLock<HashMap<UserId, StoredUser>>>,
    next_id: Arc<AtomicI64>,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    ///
    /// * `AuthManager` - New authentication manager instance
    pub fn new(pepper: String, jwt_secret: String) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            pepper,
            jwt_secret,
            access_token_duration: Duration::hours(24),
        }
    }

    /// Override how long issued access tokens stay valid
    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Register a new user
    ///
    /// Username and email are trimmed before validation. The password is
    /// hashed exactly as given.
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::InvalidUsername` - Username blank or too long
    /// * `AuthError::InvalidEmail` - Email is not an address
    /// * `AuthError::InvalidPassword` - Password blank
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&request.password)?;

        let password_hash = self.hash_password(&request.password)?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.username == username) {
            return Err(AuthError::UsernameTaken);
        }
        if users
            .values()
            .any(|u| u.user.email.eq_ignore_ascii_case(&email))
        {
            return Err(AuthError::EmailTaken);
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username,
            email,
            created_at: Utc::now(),
        };
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );

        log::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, String)>` - User and signed access token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown user or wrong password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        let stored = self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user.username == request.username.trim())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(&request.password, &stored.password_hash)?;

        let token = self.generate_access_token(stored.user.id, &stored.user.username)?;
        Ok((stored.user, token))
    }

    /// Verify an access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Verify an access token and check its user still exists
    ///
    /// # Errors
    ///
    /// * `AuthError::JwtError` - Token malformed, forged or expired
    /// * `AuthError::UserNotFound` - Account was deleted after the token was issued
    pub async fn authenticate(&self, token: &str) -> AuthResult<UserId> {
        let claims = self.verify_access_token(token)?;
        if self.users.read().await.contains_key(&claims.sub) {
            Ok(claims.sub)
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Look up a user by ID
    pub async fn get_user(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .read()
            .await
            .get(&user_id)
            .map(|u| u.user.clone())
            .ok_or(AuthError::UserNotFound)
    }

    /// Change a user's username
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidUsername` - New name blank or too long
    /// * `AuthError::UsernameTaken` - Another user has the name
    /// * `AuthError::UserNotFound` - User doesn't exist
    pub async fn change_username(&self, user_id: UserId, new_username: &str) -> AuthResult<User> {
        let new_username = new_username.trim();
        validate_username(new_username)?;

        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.user.username == new_username && u.user.id != user_id)
        {
            return Err(AuthError::UsernameTaken);
        }

        let stored = users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        log::info!(
            "User {} renamed from {} to {}",
            user_id,
            stored.user.username,
            new_username
        );
        stored.user.username = new_username.to_string();
        Ok(stored.user.clone())
    }

    /// Change a user's password
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidPassword` - New password blank
    /// * `AuthError::UserNotFound` - User doesn't exist
    pub async fn change_password(&self, user_id: UserId, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;
        let password_hash = self.hash_password(new_password)?;

        let mut users = self.users.write().await;
        let stored = users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        stored.password_hash = password_hash;
        Ok(())
    }

    /// Delete a user account
    ///
    /// Tokens issued to the user stop authenticating immediately.
    pub async fn delete_user(&self, user_id: UserId) -> AuthResult<()> {
        let removed = self.users.write().await.remove(&user_id);
        match removed {
            Some(stored) => {
                log::info!("Deleted user {} (id {})", stored.user.username, user_id);
                Ok(())
            }
            None => Err(AuthError::UserNotFound),
        }
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user_id: UserId, username: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            username: username.to_string(),
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

/// Validate username format
fn validate_username(username: &str) -> AuthResult<()> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername(
            "Username is required".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    Ok(())
}

/// Validate email format
fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() {
        return Err(AuthError::InvalidEmail("Email is required".to_string()));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(AuthError::InvalidEmail(
            "Must be a valid email".to_string(),
        ));
    }

    Ok(())
}

/// Validate password; whitespace-only counts as blank
fn validate_password(password: &str) -> AuthResult<()> {
    if password.trim().is_empty() {
        return Err(AuthError::InvalidPassword(
            "Password is required".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.org").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c.org").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("fern").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let auth = AuthManager::new("pepper".to_string(), "secret".to_string());
        let token = auth.generate_access_token(42, "moss").unwrap();
        let claims = auth.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "moss");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = AuthManager::new("pepper".to_string(), "secret-a".to_string());
        let verifier = AuthManager::new("pepper".to_string(), "secret-b".to_string());
        let token = issuer.generate_access_token(1, "moss").unwrap();

        assert!(matches!(
            verifier.verify_access_token(&token),
            Err(AuthError::JwtError(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60 second validation leeway.
        let auth = AuthManager::new("pepper".to_string(), "secret".to_string())
            .with_token_duration(Duration::minutes(-5));
        let token = auth.generate_access_token(1, "moss").unwrap();

        assert!(auth.verify_access_token(&token).is_err());
    }
}

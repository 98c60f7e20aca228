//! Integration tests for the account system.
//!
//! Tests registration, login, token verification, profile changes and deletion.

use greenify::auth::{AuthError, AuthManager, LoginRequest, RegisterRequest};

/// Helper to create test auth manager
fn setup_auth_manager() -> AuthManager {
    AuthManager::new(
        "test_pepper_for_testing".to_string(),
        "test_secret_key_for_jwt_testing_only".to_string(),
    )
}

fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_new_user() {
    let auth = setup_auth_manager();

    let user = auth
        .register(register_request("willow", "willow@example.com", "leafy123"))
        .await
        .expect("Registration should succeed");

    assert!(user.id > 0, "User ID should be positive");
    assert_eq!(user.username, "willow");
    assert_eq!(user.email, "willow@example.com");
}

#[tokio::test]
async fn test_register_trims_identity_fields() {
    let auth = setup_auth_manager();

    let user = auth
        .register(register_request("  aspen ", " aspen@example.com ", "pw"))
        .await
        .unwrap();
    assert_eq!(user.username, "aspen");
    assert_eq!(user.email, "aspen@example.com");

    auth.login(login_request(" aspen ", "pw")).await.unwrap();
}

#[tokio::test]
async fn test_password_whitespace_is_significant() {
    let auth = setup_auth_manager();
    let user = auth
        .register(register_request("alder", "alder@example.com", "  my pass  "))
        .await
        .unwrap();

    assert!(matches!(
        auth.login(login_request("alder", "my pass")).await,
        Err(AuthError::InvalidCredentials)
    ));
    auth.login(login_request("alder", "  my pass  "))
        .await
        .unwrap();

    auth.change_password(user.id, " new pass").await.unwrap();
    assert!(matches!(
        auth.login(login_request("alder", "new pass")).await,
        Err(AuthError::InvalidCredentials)
    ));
    auth.login(login_request("alder", " new pass")).await.unwrap();
}

#[tokio::test]
async fn test_whitespace_only_password_rejected() {
    let auth = setup_auth_manager();

    assert!(matches!(
        auth.register(register_request("rowan", "rowan@example.com", "   "))
            .await,
        Err(AuthError::InvalidPassword(_))
    ));

    let user = auth
        .register(register_request("rowan", "rowan@example.com", "berry"))
        .await
        .unwrap();
    assert!(matches!(
        auth.change_password(user.id, " \t ").await,
        Err(AuthError::InvalidPassword(_))
    ));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let auth = setup_auth_manager();
    auth.register(register_request("birch", "birch@example.com", "pw1"))
        .await
        .unwrap();

    let result = auth
        .register(register_request("birch", "other@example.com", "pw2"))
        .await;

    assert!(matches!(result, Err(AuthError::UsernameTaken)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let auth = setup_auth_manager();
    auth.register(register_request("cedar", "shared@example.com", "pw1"))
        .await
        .unwrap();

    let result = auth
        .register(register_request("cypress", "SHARED@example.com", "pw2"))
        .await;

    assert!(matches!(result, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn test_register_rejects_blank_and_malformed_fields() {
    let auth = setup_auth_manager();

    assert!(matches!(
        auth.register(register_request("   ", "a@b.org", "pw")).await,
        Err(AuthError::InvalidUsername(_))
    ));
    assert!(matches!(
        auth.register(register_request("dogwood", "not-an-email", "pw")).await,
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        auth.register(register_request("dogwood", "d@b.org", "  ")).await,
        Err(AuthError::InvalidPassword(_))
    ));
}

#[tokio::test]
async fn test_login_success_issues_verifiable_token() {
    let auth = setup_auth_manager();
    let registered = auth
        .register(register_request("elm", "elm@example.com", "bark!"))
        .await
        .unwrap();

    let (user, token) = auth.login(login_request("elm", "bark!")).await.unwrap();

    assert_eq!(user.id, registered.id);
    let claims = auth.verify_access_token(&token).unwrap();
    assert_eq!(claims.sub, registered.id);
    assert_eq!(claims.username, "elm");
    assert_eq!(auth.authenticate(&token).await.unwrap(), registered.id);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let auth = setup_auth_manager();
    auth.register(register_request("fir", "fir@example.com", "needles"))
        .await
        .unwrap();

    let result = auth.login(login_request("fir", "cones")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let auth = setup_auth_manager();

    let result = auth.login(login_request("ghost", "boo")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let auth = setup_auth_manager();

    assert!(matches!(
        auth.authenticate("not.a.jwt").await,
        Err(AuthError::JwtError(_))
    ));
}

#[tokio::test]
async fn test_change_username() {
    let auth = setup_auth_manager();
    let user = auth
        .register(register_request("hazel", "hazel@example.com", "nut"))
        .await
        .unwrap();
    auth.register(register_request("holly", "holly@example.com", "berry"))
        .await
        .unwrap();

    assert!(matches!(
        auth.change_username(user.id, "holly").await,
        Err(AuthError::UsernameTaken)
    ));

    let renamed = auth.change_username(user.id, "hazelnut").await.unwrap();
    assert_eq!(renamed.username, "hazelnut");
    assert_eq!(auth.get_user(user.id).await.unwrap().username, "hazelnut");

    // Old name no longer logs in, new one does.
    assert!(auth.login(login_request("hazel", "nut")).await.is_err());
    assert!(auth.login(login_request("hazelnut", "nut")).await.is_ok());
}

#[tokio::test]
async fn test_rename_to_own_name_is_allowed() {
    let auth = setup_auth_manager();
    let user = auth
        .register(register_request("juniper", "juniper@example.com", "pw"))
        .await
        .unwrap();

    assert!(auth.change_username(user.id, "juniper").await.is_ok());
}

#[tokio::test]
async fn test_change_password() {
    let auth = setup_auth_manager();
    let user = auth
        .register(register_request("larch", "larch@example.com", "old-pw"))
        .await
        .unwrap();

    auth.change_password(user.id, "new-pw").await.unwrap();

    assert!(matches!(
        auth.login(login_request("larch", "old-pw")).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(auth.login(login_request("larch", "new-pw")).await.is_ok());
}

#[tokio::test]
async fn test_delete_user_invalidates_tokens() {
    let auth = setup_auth_manager();
    auth.register(register_request("maple", "maple@example.com", "syrup"))
        .await
        .unwrap();
    let (user, token) = auth.login(login_request("maple", "syrup")).await.unwrap();

    auth.delete_user(user.id).await.unwrap();

    assert!(matches!(
        auth.authenticate(&token).await,
        Err(AuthError::UserNotFound)
    ));
    assert!(matches!(
        auth.delete_user(user.id).await,
        Err(AuthError::UserNotFound)
    ));
    // Name and email are free again.
    assert!(
        auth.register(register_request("maple", "maple@example.com", "syrup"))
            .await
            .is_ok()
    );
}

//! Integration tests for the OAuth connector
//!
//! Exercises the connect/callback/disconnect flow end to end against a
//! temporary database, with mock exchangers standing in for the platform
//! APIs. The mock call counters prove that CSRF and authorization
//! rejections never reach the exchange step.

use std::sync::Arc;

use libsteeplecast::config::{
    Config, DatabaseConfig, DefaultsConfig, FacebookConfig, OauthConfig,
};
use libsteeplecast::db::Database;
use libsteeplecast::error::{AuthError, ConfigError, PlatformError, SteeplecastError};
use libsteeplecast::oauth::mock::MockExchange;
use libsteeplecast::oauth::{Connector, TokenExchange};
use libsteeplecast::types::{Platform, Role};
use libsteeplecast::Session;
use tempfile::TempDir;

fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        oauth: OauthConfig {
            redirect_origin: "https://dashboard.gracechurch.org".to_string(),
        },
        facebook: Some(FacebookConfig {
            app_id: "fb-app-id".to_string(),
            app_secret: "fb-app-secret".to_string(),
        }),
        instagram: None,
        youtube: None,
        defaults: DefaultsConfig::default(),
    }
}

fn session() -> Session {
    Session::login("user-1", "bearer-token", Some("church-1".to_string()), Role::Editor)
}

async fn setup(exchangers: Vec<Box<dyn TokenExchange>>) -> (Connector, Arc<Database>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(Database::new(db_path.to_str().unwrap()).await.unwrap());

    let connector = Connector::with_exchangers(Arc::new(test_config()), Arc::clone(&db), exchangers);
    (connector, db, temp_dir)
}

#[tokio::test]
async fn test_callback_without_stored_state_is_rejected() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let calls = exchanger.call_counter();
    let (connector, _db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let result = connector
        .handle_callback(&session(), Platform::Facebook, "code-123", "facebook_bogus", "user-1")
        .await;

    match result {
        Err(SteeplecastError::Auth(AuthError::InvalidState { platform })) => {
            assert_eq!(platform, Platform::Facebook);
        }
        other => panic!("Expected InvalidState, got {:?}", other.err()),
    }

    // The exchange endpoint must never have been called
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_callback_with_mismatched_state_is_rejected() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let calls = exchanger.call_counter();
    let (connector, _db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();

    let result = connector
        .handle_callback(&session, Platform::Facebook, "code-123", "facebook_other", "user-1")
        .await;
    assert!(matches!(
        result,
        Err(SteeplecastError::Auth(AuthError::InvalidState { .. }))
    ));
    assert_eq!(*calls.lock().unwrap(), 0);

    // The stored nonce was consumed by the failed attempt, so even the
    // originally issued state can no longer be used.
    let replay = connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await;
    assert!(matches!(
        replay,
        Err(SteeplecastError::Auth(AuthError::InvalidState { .. }))
    ));
}

#[tokio::test]
async fn test_callback_happy_path_connects_account() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let calls = exchanger.call_counter();
    let (connector, db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();

    let account = connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await
        .unwrap();

    assert_eq!(account.platform, Platform::Facebook);
    assert_eq!(account.access_token, "fb-token");
    assert_eq!(account.display_name(), "Mock Page");
    assert_eq!(*calls.lock().unwrap(), 1);

    let stored = db.get_account("user-1", Platform::Facebook).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_state_is_single_use() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let (connector, _db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();

    connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await
        .unwrap();

    // Replaying the same callback must be rejected
    let replay = connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await;
    assert!(matches!(
        replay,
        Err(SteeplecastError::Auth(AuthError::InvalidState { .. }))
    ));
}

#[tokio::test]
async fn test_user_mismatch_is_unauthorized() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let calls = exchanger.call_counter();
    let (connector, _db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();

    let result = connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-2")
        .await;

    match result {
        Err(SteeplecastError::Auth(AuthError::Unauthorized(_))) => {}
        other => panic!("Expected Unauthorized, got {:?}", other.err()),
    }
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_reconnect_replaces_tokens() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(Database::new(db_path.to_str().unwrap()).await.unwrap());
    let config = Arc::new(test_config());
    let session = session();

    // First connect
    let connector = Connector::with_exchangers(
        Arc::clone(&config),
        Arc::clone(&db),
        vec![Box::new(MockExchange::success(Platform::Facebook, "first-token"))],
    );
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();
    connector
        .handle_callback(&session, Platform::Facebook, "code-1", &issued.state, "user-1")
        .await
        .unwrap();

    // Reconnect with fresh tokens
    let connector = Connector::with_exchangers(
        Arc::clone(&config),
        Arc::clone(&db),
        vec![Box::new(MockExchange::success(Platform::Facebook, "second-token"))],
    );
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();
    connector
        .handle_callback(&session, Platform::Facebook, "code-2", &issued.state, "user-1")
        .await
        .unwrap();

    // Exactly one row, with the second call's tokens in effect
    let accounts = db.list_accounts("user-1").await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].access_token, "second-token");
}

#[tokio::test]
async fn test_exchange_failure_does_not_store_account() {
    let exchanger = MockExchange::failure(Platform::Facebook, "Error validating verification code");
    let (connector, db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();

    let result = connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await;

    match result {
        Err(SteeplecastError::Platform(PlatformError::Exchange { platform, message })) => {
            assert_eq!(platform, Platform::Facebook);
            assert!(message.contains("Error validating verification code"));
        }
        other => panic!("Expected Exchange error, got {:?}", other.err()),
    }

    let stored = db.get_account("user-1", Platform::Facebook).await.unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_disconnect_is_idempotent_and_reported() {
    let exchanger = MockExchange::success(Platform::Facebook, "fb-token");
    let (connector, _db, _guard) = setup(vec![Box::new(exchanger)]).await;

    let session = session();
    let issued = connector
        .authorize_url(&session, Platform::Facebook, "https://dashboard.gracechurch.org/settings")
        .await
        .unwrap();
    connector
        .handle_callback(&session, Platform::Facebook, "code-123", &issued.state, "user-1")
        .await
        .unwrap();

    connector.disconnect(&session, Platform::Facebook).await.unwrap();
    // Repeating the disconnect is not an error
    connector.disconnect(&session, Platform::Facebook).await.unwrap();

    let connections = connector.list_connections(&session).await.unwrap();
    let facebook = connections
        .iter()
        .find(|c| c.platform == Platform::Facebook)
        .unwrap();
    assert!(!facebook.connected);
    assert_eq!(facebook.account_name, "");
}

#[tokio::test]
async fn test_list_connections_covers_every_platform() {
    let (connector, _db, _guard) = setup(vec![]).await;

    let connections = connector.list_connections(&session()).await.unwrap();
    assert_eq!(connections.len(), Platform::ALL.len());
    assert!(connections.iter().all(|c| !c.connected));
    assert!(connections.iter().all(|c| c.account_name.is_empty()));
}

#[tokio::test]
async fn test_authorize_url_missing_client_id() {
    // Config has no YouTube credentials
    let (connector, _db, _guard) = setup(vec![]).await;

    let result = connector
        .authorize_url(&session(), Platform::Youtube, "https://dashboard.gracechurch.org/settings")
        .await;

    match result {
        Err(SteeplecastError::Config(ConfigError::MissingClientId(platform))) => {
            assert_eq!(platform, Platform::Youtube);
        }
        other => panic!("Expected MissingClientId, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_authorize_url_contains_required_params() {
    let (connector, _db, _guard) = setup(vec![]).await;

    let issued = connector
        .authorize_url(
            &session(),
            Platform::Facebook,
            "https://dashboard.gracechurch.org/settings?platform=facebook",
        )
        .await
        .unwrap();

    assert!(issued.state.starts_with("facebook_"));
    assert!(issued.url.starts_with("https://www.facebook.com/v19.0/dialog/oauth?"));
    assert!(issued.url.contains("client_id=fb-app-id"));
    assert!(issued.url.contains("scope=pages_manage_posts"));
    assert!(issued.url.contains(&format!("state={}", issued.state)));
    // redirect_uri must be percent-encoded
    assert!(issued
        .url
        .contains("redirect_uri=https%3A%2F%2Fdashboard.gracechurch.org%2Fsettings"));
}

#[tokio::test]
async fn test_tiktok_connect_is_unsupported() {
    let (connector, _db, _guard) = setup(vec![]).await;

    let result = connector
        .authorize_url(&session(), Platform::Tiktok, "https://dashboard.gracechurch.org/settings")
        .await;

    match result {
        Err(SteeplecastError::Platform(PlatformError::Unsupported { platform, .. })) => {
            assert_eq!(platform, Platform::Tiktok);
        }
        other => panic!("Expected Unsupported, got {:?}", other.err()),
    }
}

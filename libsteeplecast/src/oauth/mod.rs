//! OAuth connector
//!
//! Drives the three-legged OAuth flow per platform and persists the
//! resulting credentials. The flow is:
//!
//! 1. [`Connector::authorize_url`] builds the platform's authorization URL
//!    and stores a freshly issued CSRF state nonce for the pending
//!    (user, platform) transaction.
//! 2. The browser is sent to that URL; the platform redirects back to the
//!    callback URL carrying `code` and `state`.
//! 3. [`Connector::handle_callback`] validates the state (single-use: the
//!    stored nonce is consumed whether or not it matches), verifies the
//!    caller against the session, runs the platform's code→token exchange,
//!    and upserts the [`SocialAccount`] row.
//!
//! Each platform's exchange protocol lives behind the [`TokenExchange`]
//! trait, one implementation per supported platform.

use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Url;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::{AuthError, ConfigError, PlatformError, Result};
use crate::session::Session;
use crate::types::{new_id, PageRef, Platform, SocialAccount};

pub mod facebook;
pub mod instagram;
pub mod youtube;

// Mock exchanger is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// Everything a successful code→token exchange produces
#[derive(Debug, Clone)]
pub struct ExchangedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token is no longer valid
    pub expires_at: Option<i64>,
    /// Publishing targets the account can post to
    pub pages: Vec<PageRef>,
}

/// Per-platform code→token exchange protocol
///
/// One implementation per supported platform. An implementation performs
/// every network step of the exchange (token endpoint, follow-up profile or
/// page lookups) and returns the assembled [`ExchangedTokens`]; any failing
/// step propagates [`PlatformError::Exchange`] carrying the platform's own
/// error description.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// The platform this exchanger serves
    fn platform(&self) -> Platform;

    /// Exchange an authorization code for tokens and publishing targets
    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ExchangedTokens>;
}

/// An authorization URL plus the state nonce embedded in it
#[derive(Debug, Clone)]
pub struct AuthorizeUrl {
    pub url: String,
    pub state: String,
}

/// Connection status for one platform
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub platform: Platform,
    pub connected: bool,
    pub account_name: String,
}

/// OAuth connector over the credential store
pub struct Connector {
    config: Arc<Config>,
    db: Arc<Database>,
    exchangers: Vec<Box<dyn TokenExchange>>,
}

impl Connector {
    /// Create a connector with exchangers for every configured platform
    pub fn new(config: Arc<Config>, db: Arc<Database>) -> Self {
        let exchangers = create_exchangers(&config);
        Self {
            config,
            db,
            exchangers,
        }
    }

    /// Create a connector with caller-supplied exchangers
    ///
    /// Used by tests to inject mock exchangers.
    pub fn with_exchangers(
        config: Arc<Config>,
        db: Arc<Database>,
        exchangers: Vec<Box<dyn TokenExchange>>,
    ) -> Self {
        Self {
            config,
            db,
            exchangers,
        }
    }

    /// The callback URL registered with the platforms for this deployment
    pub fn callback_url(&self, platform: Platform) -> String {
        format!(
            "{}/settings?platform={}",
            self.config.oauth.redirect_origin.trim_end_matches('/'),
            platform
        )
    }

    /// Build the authorization URL for a platform
    ///
    /// Issues a fresh CSRF state nonce for the (user, platform) transaction
    /// and stores it before returning; re-issuing replaces any pending nonce
    /// for the pair.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::MissingClientId`] when the platform's
    /// client credentials are not configured, and
    /// [`PlatformError::Unsupported`] for platforms without a connect flow.
    pub async fn authorize_url(
        &self,
        session: &Session,
        platform: Platform,
        redirect_uri: &str,
    ) -> Result<AuthorizeUrl> {
        let state = issue_state(platform);

        let (endpoint, params) = match platform {
            Platform::Facebook => {
                let app = self
                    .config
                    .facebook
                    .as_ref()
                    .ok_or(ConfigError::MissingClientId(platform))?;
                (
                    facebook::AUTHORIZE_ENDPOINT,
                    vec![
                        ("client_id", app.app_id.clone()),
                        ("redirect_uri", redirect_uri.to_string()),
                        ("scope", facebook::SCOPES.to_string()),
                        ("state", state.clone()),
                    ],
                )
            }
            Platform::Instagram => {
                let app = self
                    .config
                    .instagram
                    .as_ref()
                    .ok_or(ConfigError::MissingClientId(platform))?;
                (
                    instagram::AUTHORIZE_ENDPOINT,
                    vec![
                        ("client_id", app.app_id.clone()),
                        ("redirect_uri", redirect_uri.to_string()),
                        ("scope", instagram::SCOPES.to_string()),
                        ("response_type", "code".to_string()),
                        ("state", state.clone()),
                    ],
                )
            }
            Platform::Youtube => {
                let app = self
                    .config
                    .youtube
                    .as_ref()
                    .ok_or(ConfigError::MissingClientId(platform))?;
                (
                    youtube::AUTHORIZE_ENDPOINT,
                    vec![
                        ("client_id", app.client_id.clone()),
                        ("redirect_uri", redirect_uri.to_string()),
                        ("scope", youtube::scopes()),
                        ("response_type", "code".to_string()),
                        ("access_type", "offline".to_string()),
                        ("include_granted_scopes", "true".to_string()),
                        ("prompt", "consent".to_string()),
                        ("state", state.clone()),
                    ],
                )
            }
            Platform::Tiktok => {
                return Err(PlatformError::Unsupported {
                    platform,
                    operation: "account connection",
                }
                .into())
            }
        };

        let url = Url::parse_with_params(endpoint, &params)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;

        self.db
            .put_oauth_state(session.user_id(), platform, &state)
            .await?;

        info!("Issued {} authorization URL for user {}", platform, session.user_id());

        Ok(AuthorizeUrl {
            url: url.into(),
            state,
        })
    }

    /// Complete the OAuth callback for a platform
    ///
    /// Validates the returned `state` against the stored nonce (consuming it
    /// either way), verifies `user_id` against the session, runs the
    /// platform's token exchange, and upserts the credential row.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthorized`] when `user_id` does not match the
    ///   session's authenticated identity
    /// - [`AuthError::InvalidState`] when no nonce is pending or the
    ///   returned state differs; no exchange is attempted
    /// - [`PlatformError::Exchange`] when any exchange step fails; the
    ///   credential store is left untouched
    pub async fn handle_callback(
        &self,
        session: &Session,
        platform: Platform,
        code: &str,
        state: &str,
        user_id: &str,
    ) -> Result<SocialAccount> {
        session.ensure_user(user_id)?;

        let stored = self.db.take_oauth_state(user_id, platform).await?;
        match stored {
            Some(expected) if expected == state => {}
            _ => {
                warn!("Rejected {} callback for user {}: state mismatch", platform, user_id);
                return Err(AuthError::InvalidState { platform }.into());
            }
        }

        let exchanger = self.exchanger(platform)?;
        let redirect_uri = self.callback_url(platform);
        let tokens = exchanger.exchange(code, &redirect_uri).await?;

        let account = SocialAccount {
            id: new_id(),
            user_id: user_id.to_string(),
            platform,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            pages: tokens.pages,
            expires_at: tokens.expires_at,
            connected_at: chrono::Utc::now().timestamp(),
        };

        self.db.upsert_account(&account).await?;

        info!(
            "Connected {} account '{}' for user {}",
            platform,
            account.display_name(),
            user_id
        );

        Ok(account)
    }

    /// Remove the stored credentials for a platform
    ///
    /// Idempotent: disconnecting a platform that was never connected
    /// succeeds.
    pub async fn disconnect(&self, session: &Session, platform: Platform) -> Result<()> {
        self.db.delete_account(session.user_id(), platform).await?;
        info!("Disconnected {} for user {}", platform, session.user_id());
        Ok(())
    }

    /// Connection status for every supported platform
    ///
    /// Platforms without a stored account report disconnected with an empty
    /// account name.
    pub async fn list_connections(&self, session: &Session) -> Result<Vec<ConnectionStatus>> {
        let accounts = self.db.list_accounts(session.user_id()).await?;

        Ok(Platform::ALL
            .iter()
            .map(|&platform| {
                let account = accounts.iter().find(|a| a.platform == platform);
                ConnectionStatus {
                    platform,
                    connected: account.is_some(),
                    account_name: account.map(|a| a.display_name().to_string()).unwrap_or_default(),
                }
            })
            .collect())
    }

    fn exchanger(&self, platform: Platform) -> Result<&dyn TokenExchange> {
        if platform == Platform::Tiktok {
            return Err(PlatformError::Unsupported {
                platform,
                operation: "token exchange",
            }
            .into());
        }

        self.exchangers
            .iter()
            .find(|e| e.platform() == platform)
            .map(|e| e.as_ref())
            .ok_or_else(|| ConfigError::MissingClientId(platform).into())
    }
}

/// Create exchanger instances for every configured platform
pub fn create_exchangers(config: &Config) -> Vec<Box<dyn TokenExchange>> {
    let http = reqwest::Client::new();
    let mut exchangers: Vec<Box<dyn TokenExchange>> = Vec::new();

    if let Some(app) = &config.facebook {
        exchangers.push(Box::new(facebook::FacebookExchange::new(app, http.clone())));
    }
    if let Some(app) = &config.instagram {
        exchangers.push(Box::new(instagram::InstagramExchange::new(
            app,
            http.clone(),
        )));
    }
    if let Some(app) = &config.youtube {
        exchangers.push(Box::new(youtube::YoutubeExchange::new(app, http.clone())));
    }

    if exchangers.is_empty() {
        warn!("No platform credentials are configured");
    } else {
        info!("Created {} token exchanger(s)", exchangers.len());
    }

    exchangers
}

/// Generate a fresh state nonce of the form `<platform>_<random-suffix>`
fn issue_state(platform: Platform) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("{}_{}", platform, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_state_format() {
        let state = issue_state(Platform::Facebook);
        assert!(state.starts_with("facebook_"));
        assert_eq!(state.len(), "facebook_".len() + 12);

        let suffix = state.strip_prefix("facebook_").unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_issue_state_is_random() {
        let a = issue_state(Platform::Youtube);
        let b = issue_state(Platform::Youtube);
        assert_ne!(a, b);
    }
}

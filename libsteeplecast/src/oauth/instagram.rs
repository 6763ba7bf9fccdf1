//! Instagram token exchange
//!
//! Two-step exchange: the authorization code buys a short-lived token on the
//! Instagram OAuth endpoint, which is then traded for a long-lived token on
//! the Graph endpoint. The connected profile itself is the single publishing
//! target.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::InstagramConfig;
use crate::error::{PlatformError, Result};
use crate::oauth::{ExchangedTokens, TokenExchange};
use crate::types::{PageRef, Platform};

pub const AUTHORIZE_ENDPOINT: &str = "https://api.instagram.com/oauth/authorize";
pub const SCOPES: &str = "user_profile,user_media";

const OAUTH_API_BASE: &str = "https://api.instagram.com";
const GRAPH_API_BASE: &str = "https://graph.instagram.com";

pub struct InstagramExchange {
    app_id: String,
    app_secret: String,
    http: reqwest::Client,
    oauth_base: String,
    graph_base: String,
}

impl InstagramExchange {
    pub fn new(config: &InstagramConfig, http: reqwest::Client) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            http,
            oauth_base: OAUTH_API_BASE.to_string(),
            graph_base: GRAPH_API_BASE.to_string(),
        }
    }

    /// Point the exchanger at different endpoints (for tests)
    pub fn with_endpoints(
        mut self,
        oauth_base: impl Into<String>,
        graph_base: impl Into<String>,
    ) -> Self {
        self.oauth_base = oauth_base.into();
        self.graph_base = graph_base.into();
        self
    }
}

#[derive(Deserialize)]
struct ShortLivedResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct LongLivedResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct ProfileResponse {
    id: String,
    username: String,
}

#[derive(Deserialize, Default)]
struct OauthErrorResponse {
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GraphErrorResponse {
    error: GraphErrorDetail,
}

#[derive(Deserialize)]
struct GraphErrorDetail {
    message: String,
}

fn exchange_error(message: String) -> crate::error::SteeplecastError {
    PlatformError::Exchange {
        platform: Platform::Instagram,
        message,
    }
    .into()
}

async fn decode_graph_error(response: reqwest::Response, fallback: &str) -> String {
    response
        .json::<GraphErrorResponse>()
        .await
        .map(|e| e.error.message)
        .unwrap_or_else(|_| fallback.to_string())
}

#[async_trait]
impl TokenExchange for InstagramExchange {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ExchangedTokens> {
        // Step 1: code → short-lived token
        let token_url = format!("{}/oauth/access_token", self.oauth_base);
        let response = self
            .http
            .post(&token_url)
            .form(&[
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body: OauthErrorResponse = response.json().await.unwrap_or_default();
            let message = body
                .error_message
                .unwrap_or_else(|| "Failed to get Instagram access token".to_string());
            return Err(exchange_error(message));
        }

        let short_lived: ShortLivedResponse = response
            .json()
            .await
            .map_err(|e| exchange_error(e.to_string()))?;

        // Step 2: short-lived → long-lived token
        let exchange_url = format!("{}/access_token", self.graph_base);
        let response = self
            .http
            .get(&exchange_url)
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.app_secret.as_str()),
                ("access_token", short_lived.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message =
                decode_graph_error(response, "Failed to get long-lived Instagram token").await;
            return Err(exchange_error(message));
        }

        let long_lived: LongLivedResponse = response
            .json()
            .await
            .map_err(|e| exchange_error(e.to_string()))?;

        let expires_at = chrono::Utc::now().timestamp() + long_lived.expires_in;

        // Step 3: profile lookup; the profile is the publishing target
        let profile_url = format!("{}/me", self.graph_base);
        let response = self
            .http
            .get(&profile_url)
            .query(&[
                ("fields", "id,username"),
                ("access_token", long_lived.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message =
                decode_graph_error(response, "Failed to get Instagram profile").await;
            return Err(exchange_error(message));
        }

        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| exchange_error(e.to_string()))?;

        Ok(ExchangedTokens {
            access_token: long_lived.access_token,
            refresh_token: None,
            expires_at: Some(expires_at),
            pages: vec![PageRef {
                id: profile.id,
                name: None,
                username: Some(profile.username),
            }],
        })
    }
}

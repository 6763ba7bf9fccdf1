//! YouTube token exchange
//!
//! Exchanges the authorization code on the Google token endpoint for an
//! access token, refresh token and expiry, then fetches the authenticated
//! channel list. An account with zero channels cannot publish, so the
//! exchange fails rather than storing unusable credentials.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::YoutubeConfig;
use crate::error::{PlatformError, Result};
use crate::oauth::{ExchangedTokens, TokenExchange};
use crate::types::{PageRef, Platform};

pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

const SCOPE_LIST: [&str; 7] = [
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/youtube.upload",
    "https://www.googleapis.com/auth/youtube.readonly",
    "https://www.googleapis.com/auth/youtube.force-ssl",
    "https://www.googleapis.com/auth/youtube.channel-memberships.creator",
    "https://www.googleapis.com/auth/youtubepartner",
    "https://www.googleapis.com/auth/youtubepartner-channel-audit",
];

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const API_BASE: &str = "https://www.googleapis.com";

/// Space-separated scope string for the authorization URL
pub fn scopes() -> String {
    SCOPE_LIST.join(" ")
}

pub struct YoutubeExchange {
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
    token_endpoint: String,
    api_base: String,
}

impl YoutubeExchange {
    pub fn new(config: &YoutubeConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            http,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Point the exchanger at different endpoints (for tests)
    pub fn with_endpoints(
        mut self,
        token_endpoint: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.token_endpoint = token_endpoint.into();
        self.api_base = api_base.into();
        self
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    id: String,
    snippet: ChannelSnippet,
}

#[derive(Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn exchange_error(message: String) -> crate::error::SteeplecastError {
    PlatformError::Exchange {
        platform: Platform::Youtube,
        message,
    }
    .into()
}

#[async_trait]
impl TokenExchange for YoutubeExchange {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ExchangedTokens> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| "Failed to get YouTube access token".to_string());
            return Err(exchange_error(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| exchange_error(e.to_string()))?;

        let expires_at = chrono::Utc::now().timestamp() + token.expires_in;

        let channels_url = format!("{}/youtube/v3/channels", self.api_base);
        let response = self
            .http
            .get(&channels_url)
            .query(&[("part", "snippet"), ("mine", "true")])
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Failed to get YouTube channel info".to_string());
            return Err(exchange_error(message));
        }

        let channels: ChannelListResponse = response
            .json()
            .await
            .map_err(|e| exchange_error(e.to_string()))?;

        if channels.items.is_empty() {
            return Err(exchange_error(
                "No YouTube channels found for this account".to_string(),
            ));
        }

        let pages = channels
            .items
            .into_iter()
            .map(|channel| PageRef {
                id: channel.id,
                name: Some(channel.snippet.title),
                username: None,
            })
            .collect();

        Ok(ExchangedTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Some(expires_at),
            pages,
        })
    }
}

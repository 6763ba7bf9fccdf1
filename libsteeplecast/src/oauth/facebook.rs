//! Facebook token exchange
//!
//! Exchanges the authorization code for a user access token on the Graph
//! API, then fetches the Pages the user can manage. Facebook does not issue
//! a refresh token on this flow.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::FacebookConfig;
use crate::error::{PlatformError, Result};
use crate::oauth::{ExchangedTokens, TokenExchange};
use crate::types::{PageRef, Platform};

pub const AUTHORIZE_ENDPOINT: &str = "https://www.facebook.com/v19.0/dialog/oauth";
pub const SCOPES: &str = "pages_manage_posts,pages_read_engagement";

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct FacebookExchange {
    app_id: String,
    app_secret: String,
    http: reqwest::Client,
    api_base: String,
}

impl FacebookExchange {
    pub fn new(config: &FacebookConfig, http: reqwest::Client) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            http,
            api_base: GRAPH_API_BASE.to_string(),
        }
    }

    /// Point the exchanger at a different Graph API base URL (for tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct PageListResponse {
    data: Vec<PageRef>,
}

#[derive(Deserialize)]
struct GraphErrorResponse {
    error: GraphErrorDetail,
}

#[derive(Deserialize)]
struct GraphErrorDetail {
    message: String,
}

/// Decode a Graph API response, surfacing Facebook's own error message on
/// non-success statuses
async fn decode_graph<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(|e| {
            PlatformError::Exchange {
                platform: Platform::Facebook,
                message: e.to_string(),
            }
            .into()
        })
    } else {
        let message = response
            .json::<GraphErrorResponse>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| fallback.to_string());
        Err(PlatformError::Exchange {
            platform: Platform::Facebook,
            message,
        }
        .into())
    }
}

#[async_trait]
impl TokenExchange for FacebookExchange {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<ExchangedTokens> {
        let token_url = format!("{}/oauth/access_token", self.api_base);
        let response = self
            .http
            .get(&token_url)
            .query(&[
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let token: TokenResponse =
            decode_graph(response, "Failed to get Facebook access token").await?;

        let pages_url = format!("{}/me/accounts", self.api_base);
        let response = self
            .http
            .get(&pages_url)
            .query(&[("access_token", token.access_token.as_str())])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let pages: PageListResponse =
            decode_graph(response, "Failed to get Facebook pages").await?;

        Ok(ExchangedTokens {
            access_token: token.access_token,
            refresh_token: None,
            expires_at: None,
            pages: pages.data,
        })
    }
}

//! Facebook publisher
//!
//! Posts to the first Page on the connected account: a photo post when the
//! request carries a media URL, a plain feed post otherwise.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::publish::{PlatformPublisher, PublishRequest};
use crate::types::{Platform, SocialAccount};

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct FacebookPublisher {
    http: reqwest::Client,
    api_base: String,
}

impl FacebookPublisher {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: GRAPH_API_BASE.to_string(),
        }
    }

    /// Point the publisher at a different Graph API base URL (for tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Deserialize)]
struct PostResponse {
    #[serde(default)]
    id: Option<String>,
    /// Photo posts carry the feed post id separately
    #[serde(default)]
    post_id: Option<String>,
}

#[derive(Deserialize)]
struct GraphErrorResponse {
    error: GraphErrorDetail,
}

#[derive(Deserialize)]
struct GraphErrorDetail {
    message: String,
}

fn publish_error(message: String) -> crate::error::SteeplecastError {
    PlatformError::Publish {
        platform: Platform::Facebook,
        message,
    }
    .into()
}

#[async_trait]
impl PlatformPublisher for FacebookPublisher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn publish(&self, account: &SocialAccount, request: &PublishRequest) -> Result<String> {
        let page = account
            .pages
            .first()
            .ok_or_else(|| publish_error("no Facebook Page on the connected account".to_string()))?;

        let endpoint = if request.media_url.is_some() {
            format!("{}/{}/photos", self.api_base, page.id)
        } else {
            format!("{}/{}/feed", self.api_base, page.id)
        };

        let mut form = vec![
            ("message", request.message.clone()),
            ("access_token", account.access_token.clone()),
        ];
        if let Some(media_url) = &request.media_url {
            form.push(("url", media_url.clone()));
        }

        let response = self
            .http
            .post(&endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = response
                .json::<GraphErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Failed to post to Facebook".to_string());
            return Err(publish_error(message));
        }

        let posted: PostResponse = response
            .json()
            .await
            .map_err(|e| publish_error(e.to_string()))?;

        posted
            .post_id
            .or(posted.id)
            .ok_or_else(|| publish_error("Facebook returned no post id".to_string()))
    }
}

//! YouTube publisher
//!
//! Creates a public video entry with the message as its title. A media URL
//! is mandatory; the check runs before any network call so a bad request
//! costs nothing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{PlatformError, Result};
use crate::publish::{PlatformPublisher, PublishRequest};
use crate::types::{Platform, SocialAccount};

const UPLOAD_API_BASE: &str = "https://www.googleapis.com";

// People & Blogs
const CATEGORY_ID: &str = "22";

pub struct YoutubePublisher {
    http: reqwest::Client,
    api_base: String,
}

impl YoutubePublisher {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: UPLOAD_API_BASE.to_string(),
        }
    }

    /// Point the publisher at a different API base URL (for tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Deserialize)]
struct VideoResponse {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl PlatformPublisher for YoutubePublisher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn publish(&self, account: &SocialAccount, request: &PublishRequest) -> Result<String> {
        if request.media_url.is_none() {
            return Err(
                PlatformError::Validation("A video URL is required for YouTube posts".to_string())
                    .into(),
            );
        }

        let endpoint = format!("{}/upload/youtube/v3/videos", self.api_base);
        let body = json!({
            "snippet": {
                "title": request.message,
                "description": request.message,
                "tags": [],
                "categoryId": CATEGORY_ID,
            },
            "status": {
                "privacyStatus": "public",
                "selfDeclaredMadeForKids": false,
            },
        });

        let response = self
            .http
            .post(&endpoint)
            .query(&[("part", "snippet,status")])
            .bearer_auth(&account.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Failed to post to YouTube".to_string());
            return Err(PlatformError::Publish {
                platform: Platform::Youtube,
                message,
            }
            .into());
        }

        let video: VideoResponse = response.json().await.map_err(|e| {
            PlatformError::Publish {
                platform: Platform::Youtube,
                message: e.to_string(),
            }
        })?;

        Ok(video.id)
    }
}

//! Publish dispatcher
//!
//! Fans one content item out to every requested, connected platform and
//! collects a per-platform outcome. Platform calls run concurrently through
//! a structured join: one platform's failure never cancels or aborts its
//! siblings, and there is no ordering guarantee or cross-platform atomicity.
//!
//! A publish is all-or-nothing only at the resolution step: if any requested
//! platform has no stored credentials the whole operation fails with
//! [`PublishError::MissingConnections`] before a single network call is
//! made.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{PlatformError, PublishError, PublishFailure, Result};
use crate::session::Session;
use crate::types::{Content, Platform, SocialAccount};

pub mod facebook;
pub mod youtube;

// Mock publisher is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// One content item, ready to send
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub message: String,
    pub media_url: Option<String>,
    pub scheduled_for: Option<i64>,
    pub platforms: Vec<Platform>,
}

impl From<&Content> for PublishRequest {
    fn from(content: &Content) -> Self {
        Self {
            message: content.compose_message(),
            media_url: content.media_url.clone(),
            scheduled_for: content.scheduled_for,
            platforms: content.platforms.clone(),
        }
    }
}

/// Result of publishing to a single platform
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub platform: Platform,
    pub success: bool,
    /// Platform-specific post ID (if successful)
    pub post_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Aggregate result of one fan-out
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    /// Platforms that were posted to successfully
    pub fn successes(&self) -> Vec<Platform> {
        self.outcomes
            .iter()
            .filter(|o| o.success)
            .map(|o| o.platform)
            .collect()
    }

    /// Outcomes that failed
    pub fn failures(&self) -> Vec<&PublishOutcome> {
        self.outcomes.iter().filter(|o| !o.success).collect()
    }

    /// Convert a report with failures into the aggregate error, preserving
    /// both the failing platforms with their reasons and the successes
    pub fn into_partial_error(self) -> PublishError {
        let successes = self.successes();
        let failures = self
            .outcomes
            .into_iter()
            .filter(|o| !o.success)
            .map(|o| PublishFailure {
                platform: o.platform,
                reason: o.error.unwrap_or_else(|| "unknown error".to_string()),
            })
            .collect();

        PublishError::Partial {
            failures,
            successes,
        }
    }
}

/// Per-platform publish call
///
/// One implementation per platform that supports publishing. Implementations
/// must perform any required-field validation before their first network
/// call.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// The platform this publisher serves
    fn platform(&self) -> Platform;

    /// Publish the request through the given connected account
    ///
    /// Returns the platform-specific post ID.
    async fn publish(&self, account: &SocialAccount, request: &PublishRequest) -> Result<String>;
}

/// Publish dispatcher over the credential store
pub struct Dispatcher {
    db: Arc<Database>,
    publishers: Vec<Box<dyn PlatformPublisher>>,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in publishers
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            publishers: create_publishers(),
        }
    }

    /// Create a dispatcher with caller-supplied publishers
    ///
    /// Used by tests to inject mock publishers.
    pub fn with_publishers(db: Arc<Database>, publishers: Vec<Box<dyn PlatformPublisher>>) -> Self {
        Self { db, publishers }
    }

    /// Publish one item to every requested platform
    ///
    /// # Errors
    ///
    /// - [`PublishError::MissingConnections`] when any requested platform has
    ///   no stored account; nothing is attempted in that case
    /// - [`PublishError::Partial`] when one or more platform calls failed;
    ///   the error enumerates each failure with its reason and lists the
    ///   platforms that did succeed
    pub async fn publish(
        &self,
        session: &Session,
        request: &PublishRequest,
    ) -> Result<PublishReport> {
        let mut requested = request.platforms.clone();
        requested.sort();
        requested.dedup();

        if requested.is_empty() {
            return Err(crate::error::SteeplecastError::InvalidInput(
                "no platforms requested".to_string(),
            ));
        }

        let accounts = self
            .db
            .accounts_for_platforms(session.user_id(), &requested)
            .await?;

        let missing: Vec<Platform> = requested
            .iter()
            .copied()
            .filter(|p| !accounts.iter().any(|a| a.platform == *p))
            .collect();

        if !missing.is_empty() {
            return Err(PublishError::MissingConnections(missing).into());
        }

        info!(
            "Publishing to {} platform(s) for user {}",
            accounts.len(),
            session.user_id()
        );

        let futures: Vec<_> = accounts
            .iter()
            .map(|account| async move {
                let platform = account.platform;

                let result = match self.publisher(platform) {
                    Some(publisher) => publisher.publish(account, request).await,
                    None => Err(PlatformError::Unsupported {
                        platform,
                        operation: "publishing",
                    }
                    .into()),
                };

                match result {
                    Ok(post_id) => {
                        info!("Published to {}: {}", platform, post_id);
                        PublishOutcome {
                            platform,
                            success: true,
                            post_id: Some(post_id),
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!("Failed to publish to {}: {}", platform, e);
                        PublishOutcome {
                            platform,
                            success: false,
                            post_id: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        let outcomes = join_all(futures).await;

        let report = PublishReport { outcomes };
        if report.failures().is_empty() {
            Ok(report)
        } else {
            Err(report.into_partial_error().into())
        }
    }

    fn publisher(&self, platform: Platform) -> Option<&dyn PlatformPublisher> {
        self.publishers
            .iter()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_ref())
    }
}

/// Create the built-in publisher instances
///
/// Facebook and YouTube support publishing; Instagram and TikTok do not yet,
/// and requests targeting them fail per-platform with an unsupported error.
pub fn create_publishers() -> Vec<Box<dyn PlatformPublisher>> {
    let http = reqwest::Client::new();
    vec![
        Box::new(facebook::FacebookPublisher::new(http.clone())),
        Box::new(youtube::YoutubePublisher::new(http)),
    ]
}

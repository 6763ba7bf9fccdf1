//! Mock publisher for testing
//!
//! A configurable publisher that can simulate successes, failures and
//! latency. Integration tests use it to verify the dispatcher's fan-out and
//! aggregation without platform credentials or network access.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::publish::{PlatformPublisher, PublishRequest};
use crate::types::{Platform, SocialAccount};

pub struct MockPublisher {
    platform: Platform,
    succeeds: bool,
    error: Option<String>,
    delay: Duration,
    call_count: Arc<Mutex<usize>>,
    published: Arc<Mutex<Vec<String>>>,
}

impl MockPublisher {
    /// A publisher that always succeeds
    pub fn success(platform: Platform) -> Self {
        Self {
            platform,
            succeeds: true,
            error: None,
            delay: Duration::from_millis(0),
            call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A publisher that always fails with the given error message
    pub fn failure(platform: Platform, error: &str) -> Self {
        Self {
            platform,
            succeeds: false,
            error: Some(error.to_string()),
            delay: Duration::from_millis(0),
            call_count: Arc::new(Mutex::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add latency before the publish completes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared handle to the publish call counter
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.call_count)
    }

    /// Shared handle to the messages that were published
    pub fn published_messages(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.published)
    }
}

#[async_trait]
impl PlatformPublisher for MockPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, _account: &SocialAccount, request: &PublishRequest) -> Result<String> {
        *self.call_count.lock().unwrap() += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if !self.succeeds {
            let message = self
                .error
                .clone()
                .unwrap_or_else(|| "mock publish failure".to_string());
            return Err(PlatformError::Publish {
                platform: self.platform,
                message,
            }
            .into());
        }

        self.published.lock().unwrap().push(request.message.clone());
        Ok(format!("{}-post-1", self.platform))
    }
}

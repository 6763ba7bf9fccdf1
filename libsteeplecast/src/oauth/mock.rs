//! Mock token exchanger for testing
//!
//! A configurable exchanger used by integration tests to verify the
//! connector's callback flow without platform credentials or network access.
//! The call counter lets tests assert that CSRF rejections never reach the
//! exchange step.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::oauth::{ExchangedTokens, TokenExchange};
use crate::types::{PageRef, Platform};

pub struct MockExchange {
    platform: Platform,
    succeeds: bool,
    error: Option<String>,
    access_token: String,
    call_count: Arc<Mutex<usize>>,
}

impl MockExchange {
    /// An exchanger that always succeeds with the given access token
    pub fn success(platform: Platform, access_token: &str) -> Self {
        Self {
            platform,
            succeeds: true,
            error: None,
            access_token: access_token.to_string(),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// An exchanger that always fails with the given platform error message
    pub fn failure(platform: Platform, error: &str) -> Self {
        Self {
            platform,
            succeeds: false,
            error: Some(error.to_string()),
            access_token: String::new(),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Shared handle to the exchange call counter
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait]
impl TokenExchange for MockExchange {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn exchange(&self, _code: &str, _redirect_uri: &str) -> Result<ExchangedTokens> {
        *self.call_count.lock().unwrap() += 1;

        if !self.succeeds {
            let message = self
                .error
                .clone()
                .unwrap_or_else(|| "mock exchange failure".to_string());
            return Err(PlatformError::Exchange {
                platform: self.platform,
                message,
            }
            .into());
        }

        Ok(ExchangedTokens {
            access_token: self.access_token.clone(),
            refresh_token: None,
            expires_at: None,
            pages: vec![PageRef {
                id: "mock-page-1".to_string(),
                name: Some("Mock Page".to_string()),
                username: None,
            }],
        })
    }
}

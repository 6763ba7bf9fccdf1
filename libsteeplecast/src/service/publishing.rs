//! Submit-and-publish orchestration
//!
//! Mirrors the dashboard submit action: the content row is created first,
//! then the dispatcher fans out to the connected platforms, then the row's
//! status is updated from the aggregate outcome. Publish failure is not a
//! storage failure: the row survives, and the aggregate error is re-raised
//! to the caller after the status write.

use std::sync::Arc;

use tracing::warn;

use crate::db::Database;
use crate::error::{PublishError, Result, SteeplecastError};
use crate::publish::{Dispatcher, PublishReport, PublishRequest};
use crate::service::content::{ContentService, NewContent};
use crate::session::Session;
use crate::types::{Content, ContentStatus};

/// Result of a successful submit
#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub content: Content,
    pub report: PublishReport,
}

#[derive(Clone)]
pub struct PublishingService {
    db: Arc<Database>,
    content: ContentService,
    dispatcher: Arc<Dispatcher>,
}

impl PublishingService {
    pub fn new(db: Arc<Database>, content: ContentService, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            db,
            content,
            dispatcher,
        }
    }

    /// Create a content item and publish it to its platforms
    ///
    /// # Errors
    ///
    /// Validation and storage errors abort before anything is sent. Publish
    /// errors (missing connections, partial or total platform failure) are
    /// returned after the content row's status has been updated; the row is
    /// never rolled back.
    pub async fn submit(&self, session: &Session, new: NewContent) -> Result<SubmitResponse> {
        let content = self.content.create(session, new).await?;
        self.publish_row(session, content).await
    }

    /// Publish an already-stored content item (e.g. a draft being sent now)
    pub async fn publish_content(
        &self,
        session: &Session,
        content_id: &str,
    ) -> Result<SubmitResponse> {
        let content = self.db.get_content(content_id).await?.ok_or_else(|| {
            SteeplecastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;
        self.publish_row(session, content).await
    }

    async fn publish_row(&self, session: &Session, mut content: Content) -> Result<SubmitResponse> {
        let request = PublishRequest::from(&content);

        match self.dispatcher.publish(session, &request).await {
            Ok(report) => {
                self.record_status(&content.id, ContentStatus::Posted).await;
                content.status = ContentStatus::Posted;
                Ok(SubmitResponse { content, report })
            }
            Err(e) => {
                // Partial success still counts as posted; only a publish
                // where nothing went out is marked failed.
                let status = match &e {
                    SteeplecastError::Publish(PublishError::Partial { successes, .. })
                        if !successes.is_empty() =>
                    {
                        ContentStatus::Posted
                    }
                    _ => ContentStatus::Failed,
                };
                self.record_status(&content.id, status).await;
                Err(e)
            }
        }
    }

    async fn record_status(&self, content_id: &str, status: ContentStatus) {
        if let Err(e) = self.db.update_content_status(content_id, status).await {
            warn!("Failed to update content status for {}: {}", content_id, e);
        }
    }
}

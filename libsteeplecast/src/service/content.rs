//! Content record store
//!
//! Durable CRUD for content entities, independent of publish outcome. A
//! content row created here stays created even when a later publish fails in
//! whole or in part.

use std::sync::Arc;

use crate::db::Database;
use crate::error::Result;
use crate::session::Session;
use crate::types::{new_id, Content, ContentStatus, ContentType, Platform};
use crate::SteeplecastError;

/// Fields for a new content item
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub media_url: Option<String>,
    pub platforms: Vec<Platform>,
    pub status: ContentStatus,
    pub scheduled_for: Option<i64>,
    pub hashtags: Vec<String>,
}

/// Partial update for an existing content item; `None` leaves a field as-is
#[derive(Debug, Clone, Default)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub platforms: Option<Vec<Platform>>,
    pub status: Option<ContentStatus>,
    pub scheduled_for: Option<i64>,
    pub hashtags: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct ContentService {
    db: Arc<Database>,
}

impl ContentService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a content item for the session's church
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` when the session has no church affiliation,
    /// the title is empty, no platform is targeted, or a scheduled item has
    /// no schedule time.
    pub async fn create(&self, session: &Session, new: NewContent) -> Result<Content> {
        let church_id = session.church_id()?.to_string();
        validate_new_content(&new)?;

        let now = chrono::Utc::now().timestamp();
        let content = Content {
            id: new_id(),
            title: new.title,
            description: new.description,
            content_type: new.content_type,
            media_url: new.media_url,
            platforms: new.platforms,
            status: new.status,
            scheduled_for: new.scheduled_for,
            author_id: session.user_id().to_string(),
            church_id,
            hashtags: new.hashtags,
            created_at: now,
            updated_at: now,
        };

        self.db.create_content(&content).await?;
        Ok(content)
    }

    pub async fn get(&self, content_id: &str) -> Result<Option<Content>> {
        self.db.get_content(content_id).await
    }

    /// All content for a church, soonest scheduled first
    pub async fn list(&self, church_id: &str) -> Result<Vec<Content>> {
        self.db.list_contents(church_id).await
    }

    /// Apply a partial update and bump `updated_at`
    pub async fn update(&self, content_id: &str, update: ContentUpdate) -> Result<Content> {
        let mut content = self.db.get_content(content_id).await?.ok_or_else(|| {
            SteeplecastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        if let Some(title) = update.title {
            content.title = title;
        }
        if let Some(description) = update.description {
            content.description = Some(description);
        }
        if let Some(media_url) = update.media_url {
            content.media_url = Some(media_url);
        }
        if let Some(platforms) = update.platforms {
            content.platforms = platforms;
        }
        if let Some(status) = update.status {
            content.status = status;
        }
        if let Some(scheduled_for) = update.scheduled_for {
            content.scheduled_for = Some(scheduled_for);
        }
        if let Some(hashtags) = update.hashtags {
            content.hashtags = hashtags;
        }
        content.updated_at = chrono::Utc::now().timestamp();

        self.db.update_content(&content).await?;
        Ok(content)
    }

    pub async fn delete(&self, content_id: &str) -> Result<()> {
        self.db.delete_content(content_id).await
    }

    /// Set a schedule time, forcing status to scheduled
    ///
    /// Nothing fires the post at that time; an external scheduler owns that.
    pub async fn schedule(&self, content_id: &str, scheduled_for: i64) -> Result<()> {
        self.db.set_content_schedule(content_id, scheduled_for).await
    }
}

fn validate_new_content(new: &NewContent) -> Result<()> {
    if new.title.trim().is_empty() {
        return Err(SteeplecastError::InvalidInput(
            "Title cannot be empty".to_string(),
        ));
    }
    if new.platforms.is_empty() {
        return Err(SteeplecastError::InvalidInput(
            "Select at least one platform".to_string(),
        ));
    }
    if new.status == ContentStatus::Scheduled && new.scheduled_for.is_none() {
        return Err(SteeplecastError::InvalidInput(
            "A schedule time is required for scheduled content".to_string(),
        ));
    }
    Ok(())
}

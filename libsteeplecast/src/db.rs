//! Database operations for Steeplecast

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::error::Result;
use crate::types::{Content, ContentStatus, Platform, SocialAccount};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::DbError::IoError)?;
        }

        // Use forward slashes for the SQLite URL (works on both Windows and
        // Unix) and mode=rwc so the database file is created if missing.
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(crate::error::DbError::MigrationError)?;

        Ok(Self { pool })
    }

    // ========================================================================
    // Social accounts
    // ========================================================================

    /// Insert or replace the credentials for a (user, platform) pair
    ///
    /// Reconnecting a platform lands here too: the UNIQUE(user_id, platform)
    /// constraint guarantees a single row, with the newest tokens in effect.
    pub async fn upsert_account(&self, account: &SocialAccount) -> Result<()> {
        let pages_json = serde_json::to_string(&account.pages)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO social_accounts
                (id, user_id, platform, access_token, refresh_token, pages, expires_at, connected_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, platform) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                pages = excluded.pages,
                expires_at = excluded.expires_at,
                connected_at = excluded.connected_at
            "#,
        )
        .bind(&account.id)
        .bind(&account.user_id)
        .bind(account.platform.as_str())
        .bind(&account.access_token)
        .bind(&account.refresh_token)
        .bind(pages_json)
        .bind(account.expires_at)
        .bind(account.connected_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Get the stored account for a (user, platform) pair
    pub async fn get_account(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<SocialAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, platform, access_token, refresh_token, pages, expires_at, connected_at
            FROM social_accounts
            WHERE user_id = ? AND platform = ?
            "#,
        )
        .bind(user_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        row.map(account_from_row).transpose()
    }

    /// All accounts connected by a user
    pub async fn list_accounts(&self, user_id: &str) -> Result<Vec<SocialAccount>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, platform, access_token, refresh_token, pages, expires_at, connected_at
            FROM social_accounts
            WHERE user_id = ?
            ORDER BY platform
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        rows.into_iter().map(account_from_row).collect()
    }

    /// A user's accounts restricted to the given platforms
    pub async fn accounts_for_platforms(
        &self,
        user_id: &str,
        platforms: &[Platform],
    ) -> Result<Vec<SocialAccount>> {
        let accounts = self.list_accounts(user_id).await?;
        Ok(accounts
            .into_iter()
            .filter(|a| platforms.contains(&a.platform))
            .collect())
    }

    /// Delete the account for a (user, platform) pair
    ///
    /// Deleting a nonexistent row is not an error.
    pub async fn delete_account(&self, user_id: &str, platform: Platform) -> Result<()> {
        sqlx::query("DELETE FROM social_accounts WHERE user_id = ? AND platform = ?")
            .bind(user_id)
            .bind(platform.as_str())
            .execute(&self.pool)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    // ========================================================================
    // OAuth state nonces
    // ========================================================================

    /// Store a pending CSRF state for a (user, platform) pair
    ///
    /// Re-issuing replaces any previous pending state for the same pair.
    pub async fn put_oauth_state(
        &self,
        user_id: &str,
        platform: Platform,
        state: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_states (state, user_id, platform, issued_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, platform) DO UPDATE SET
                state = excluded.state,
                issued_at = excluded.issued_at
            "#,
        )
        .bind(state)
        .bind(user_id)
        .bind(platform.as_str())
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Take (read and delete) the pending CSRF state for a (user, platform)
    /// pair
    ///
    /// The delete happens whether or not the caller's comparison succeeds,
    /// making every nonce single-use.
    pub async fn take_oauth_state(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT state FROM oauth_states WHERE user_id = ? AND platform = ?",
        )
        .bind(user_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        let state: Option<String> = row.map(|r| r.get("state"));

        if state.is_some() {
            sqlx::query("DELETE FROM oauth_states WHERE user_id = ? AND platform = ?")
                .bind(user_id)
                .bind(platform.as_str())
                .execute(&self.pool)
                .await
                .map_err(crate::error::DbError::SqlxError)?;
        }

        Ok(state)
    }

    // ========================================================================
    // Contents
    // ========================================================================

    /// Create a new content row
    pub async fn create_content(&self, content: &Content) -> Result<()> {
        let platforms_json = serde_json::to_string(&content.platforms)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;
        let hashtags_json = serde_json::to_string(&content.hashtags)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO contents
                (id, title, description, content_type, media_url, platforms, status,
                 scheduled_for, author_id, church_id, hashtags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&content.id)
        .bind(&content.title)
        .bind(&content.description)
        .bind(content.content_type.as_str())
        .bind(&content.media_url)
        .bind(platforms_json)
        .bind(content.status.as_str())
        .bind(content.scheduled_for)
        .bind(&content.author_id)
        .bind(&content.church_id)
        .bind(hashtags_json)
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Get a content row by id
    pub async fn get_content(&self, content_id: &str) -> Result<Option<Content>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, content_type, media_url, platforms, status,
                   scheduled_for, author_id, church_id, hashtags, created_at, updated_at
            FROM contents WHERE id = ?
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        row.map(content_from_row).transpose()
    }

    /// All content for a church, soonest scheduled first
    pub async fn list_contents(&self, church_id: &str) -> Result<Vec<Content>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, content_type, media_url, platforms, status,
                   scheduled_for, author_id, church_id, hashtags, created_at, updated_at
            FROM contents
            WHERE church_id = ?
            ORDER BY scheduled_for ASC
            "#,
        )
        .bind(church_id)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        rows.into_iter().map(content_from_row).collect()
    }

    /// Write back every mutable column of a content row
    pub async fn update_content(&self, content: &Content) -> Result<()> {
        let platforms_json = serde_json::to_string(&content.platforms)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;
        let hashtags_json = serde_json::to_string(&content.hashtags)
            .map_err(|e| crate::error::SteeplecastError::InvalidInput(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE contents SET
                title = ?, description = ?, content_type = ?, media_url = ?,
                platforms = ?, status = ?, scheduled_for = ?, hashtags = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&content.title)
        .bind(&content.description)
        .bind(content.content_type.as_str())
        .bind(&content.media_url)
        .bind(platforms_json)
        .bind(content.status.as_str())
        .bind(content.scheduled_for)
        .bind(hashtags_json)
        .bind(content.updated_at)
        .bind(&content.id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Update a content row's status
    pub async fn update_content_status(
        &self,
        content_id: &str,
        status: ContentStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE contents SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(chrono::Utc::now().timestamp())
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Set a content row's schedule time, forcing its status to scheduled
    pub async fn set_content_schedule(&self, content_id: &str, scheduled_for: i64) -> Result<()> {
        sqlx::query(
            "UPDATE contents SET scheduled_for = ?, status = 'scheduled', updated_at = ? WHERE id = ?",
        )
        .bind(scheduled_for)
        .bind(chrono::Utc::now().timestamp())
        .bind(content_id)
        .execute(&self.pool)
        .await
        .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }

    /// Delete a content row
    pub async fn delete_content(&self, content_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM contents WHERE id = ?")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(crate::error::DbError::SqlxError)?;

        Ok(())
    }
}

fn account_from_row(row: SqliteRow) -> Result<SocialAccount> {
    let platform: Platform = row.get::<String, _>("platform").parse()?;
    let pages = serde_json::from_str(&row.get::<String, _>("pages")).unwrap_or_default();

    Ok(SocialAccount {
        id: row.get("id"),
        user_id: row.get("user_id"),
        platform,
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        pages,
        expires_at: row.get("expires_at"),
        connected_at: row.get("connected_at"),
    })
}

fn content_from_row(row: SqliteRow) -> Result<Content> {
    let content_type = row.get::<String, _>("content_type").parse()?;
    let status = row.get::<String, _>("status").parse()?;
    let platforms = serde_json::from_str(&row.get::<String, _>("platforms")).unwrap_or_default();
    let hashtags = serde_json::from_str(&row.get::<String, _>("hashtags")).unwrap_or_default();

    Ok(Content {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content_type,
        media_url: row.get("media_url"),
        platforms,
        status,
        scheduled_for: row.get("scheduled_for"),
        author_id: row.get("author_id"),
        church_id: row.get("church_id"),
        hashtags,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

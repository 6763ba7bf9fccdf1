//! Service layer for Steeplecast
//!
//! Provides a single entry point for consumers (CLI tools, a dashboard
//! backend) over the shared database: the OAuth connector, the publish
//! dispatcher, content CRUD and the submit orchestration.
//!
//! # Example
//!
//! ```no_run
//! use libsteeplecast::service::{SteeplecastService, NewContent};
//! use libsteeplecast::types::{ContentStatus, ContentType, Platform, Role};
//! use libsteeplecast::Session;
//!
//! # async fn example() -> libsteeplecast::Result<()> {
//! let service = SteeplecastService::new().await?;
//! let session = Session::login(
//!     "user-1",
//!     "bearer-token",
//!     Some("church-1".to_string()),
//!     Role::Editor,
//! );
//!
//! let new = NewContent {
//!     title: "Sunday Service".to_string(),
//!     description: None,
//!     content_type: ContentType::Text,
//!     media_url: None,
//!     platforms: vec![Platform::Facebook],
//!     status: ContentStatus::Draft,
//!     scheduled_for: None,
//!     hashtags: vec![],
//! };
//!
//! let response = service.publishing().submit(&session, new).await?;
//! println!("Posted to {} platform(s)", response.report.successes().len());
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod publishing;

pub use content::{ContentService, ContentUpdate, NewContent};
pub use publishing::{PublishingService, SubmitResponse};

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::oauth::Connector;
use crate::publish::Dispatcher;
use crate::Result;

/// Main service facade over the shared database and config
pub struct SteeplecastService {
    db: Arc<Database>,
    connector: Connector,
    content: ContentService,
    publishing: PublishingService,
}

impl SteeplecastService {
    /// Create a service with configuration from the default location
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service with a pre-built configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized or its
    /// migrations fail.
    pub async fn from_config(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config.database.path).await?);
        let config = Arc::new(config);

        let connector = Connector::new(Arc::clone(&config), Arc::clone(&db));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&db)));
        let content = ContentService::new(Arc::clone(&db));
        let publishing =
            PublishingService::new(Arc::clone(&db), content.clone(), Arc::clone(&dispatcher));

        Ok(Self {
            db,
            connector,
            content,
            publishing,
        })
    }

    /// Direct database access
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The OAuth connector (connect, callback, disconnect, list)
    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    /// Content CRUD
    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// Submit-and-publish orchestration
    pub fn publishing(&self) -> &PublishingService {
        &self.publishing
    }
}

//! Error types for Steeplecast

use thiserror::Error;

use crate::types::Platform;

pub type Result<T> = std::result::Result<T, SteeplecastError>;

#[derive(Error, Debug)]
pub enum SteeplecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SteeplecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SteeplecastError::InvalidInput(_) => 3,
            SteeplecastError::Auth(_) => 2,
            SteeplecastError::Config(_) => 1,
            SteeplecastError::Database(_) => 1,
            SteeplecastError::Platform(_) => 1,
            SteeplecastError::Publish(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("No client credentials configured for {0}")]
    MissingClientId(Platform),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("OAuth state mismatch for {platform}; restart the connect flow")]
    InvalidState { platform: Platform },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("{platform} token exchange failed: {message}")]
    Exchange { platform: Platform, message: String },

    #[error("{platform} publish failed: {message}")]
    Publish { platform: Platform, message: String },

    #[error("Missing required field: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{operation} is not supported for {platform}")]
    Unsupported {
        platform: Platform,
        operation: &'static str,
    },
}

/// One platform's failure inside an aggregate publish error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub platform: Platform,
    pub reason: String,
}

#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("no connected account for: {}", join_platforms(.0))]
    MissingConnections(Vec<Platform>),

    #[error("{}", describe_partial(.failures, .successes))]
    Partial {
        failures: Vec<PublishFailure>,
        successes: Vec<Platform>,
    },
}

fn join_platforms(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_partial(failures: &[PublishFailure], successes: &[Platform]) -> String {
    let failed = failures
        .iter()
        .map(|f| format!("{}: {}", f.platform, f.reason))
        .collect::<Vec<_>>()
        .join("; ");

    if successes.is_empty() {
        format!("failed on all platforms ({})", failed)
    } else {
        format!(
            "failed on some platforms ({}); posted to: {}",
            failed,
            join_platforms(successes)
        )
    }
}

//! Core types for Steeplecast

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SteeplecastError;

/// A supported social platform
///
/// The set is closed: adding a platform means adding a variant plus one
/// exchanger and/or publisher implementation behind the `TokenExchange` and
/// `PlatformPublisher` traits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Youtube,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Youtube,
        Platform::Tiktok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SteeplecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::Youtube),
            "tiktok" => Ok(Platform::Tiktok),
            other => Err(SteeplecastError::InvalidInput(format!(
                "Unknown platform: '{}'. Valid options: facebook, instagram, youtube, tiktok",
                other
            ))),
        }
    }
}

/// Kind of media a content item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Text,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Text => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = SteeplecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            "text" => Ok(ContentType::Text),
            other => Err(SteeplecastError::InvalidInput(format!(
                "Unknown content type: '{}'. Valid options: image, video, text",
                other
            ))),
        }
    }
}

/// Lifecycle status of a content item
///
/// Transitions are driven by caller actions; nothing in this crate fires a
/// scheduled post at its `scheduled_for` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Scheduled,
    Posted,
    Failed,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Posted => "posted",
            ContentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = SteeplecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "scheduled" => Ok(ContentStatus::Scheduled),
            "posted" => Ok(ContentStatus::Posted),
            "failed" => Ok(ContentStatus::Failed),
            other => Err(SteeplecastError::InvalidInput(format!(
                "Unknown content status: '{}'",
                other
            ))),
        }
    }
}

/// A platform-side publishing target owned by a connected account
///
/// Facebook returns manageable Pages, YouTube returns channels, Instagram
/// returns the profile itself. Unknown fields from the platform response are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl PageRef {
    /// Human-readable label for this target
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("")
    }
}

/// Stored OAuth credentials for one (user, platform) pair
///
/// A row exists only after a successful token exchange. Reconnecting the
/// same platform upserts, so the latest tokens always win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub pages: Vec<PageRef>,
    pub expires_at: Option<i64>,
    pub connected_at: i64,
}

impl SocialAccount {
    /// Display name of the account, taken from its first publishing target
    pub fn display_name(&self) -> &str {
        self.pages.first().map(|p| p.label()).unwrap_or("")
    }
}

/// A user-authored content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub media_url: Option<String>,
    pub platforms: Vec<Platform>,
    pub status: ContentStatus,
    pub scheduled_for: Option<i64>,
    pub author_id: String,
    pub church_id: String,
    pub hashtags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Content {
    /// Compose the outbound post message from title, description and hashtags
    pub fn compose_message(&self) -> String {
        let mut message = self.title.clone();
        if let Some(description) = &self.description {
            if !description.trim().is_empty() {
                message.push_str("\n\n");
                message.push_str(description);
            }
        }
        if !self.hashtags.is_empty() {
            let tags = self
                .hashtags
                .iter()
                .map(|t| format!("#{}", t.trim_start_matches('#')))
                .collect::<Vec<_>>()
                .join(" ");
            message.push_str("\n\n");
            message.push_str(&tags);
        }
        message
    }
}

/// User role within a church team
///
/// Carried on the session for display purposes; role enforcement is out of
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Editor
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Role {
    type Err = SteeplecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(SteeplecastError::InvalidInput(format!(
                "Unknown role: '{}'",
                other
            ))),
        }
    }
}

/// Create a fresh UUID string for an entity id
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_wire_form_is_lowercase() {
        let json = serde_json::to_string(&Platform::Facebook).unwrap();
        assert_eq!(json, r#""facebook""#);

        let parsed: Platform = serde_json::from_str(r#""youtube""#).unwrap();
        assert_eq!(parsed, Platform::Youtube);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("facebook".parse::<Platform>().unwrap(), Platform::Facebook);
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::Youtube);
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_display_round_trip() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.to_string().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_content_status_round_trip() {
        for status in [
            ContentStatus::Draft,
            ContentStatus::Scheduled,
            ContentStatus::Posted,
            ContentStatus::Failed,
        ] {
            let parsed: ContentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_page_ref_label_prefers_name() {
        let page = PageRef {
            id: "123".to_string(),
            name: Some("Grace Community".to_string()),
            username: Some("gracecommunity".to_string()),
        };
        assert_eq!(page.label(), "Grace Community");

        let profile = PageRef {
            id: "456".to_string(),
            name: None,
            username: Some("gracecommunity".to_string()),
        };
        assert_eq!(profile.label(), "gracecommunity");
    }

    #[test]
    fn test_page_ref_ignores_unknown_fields() {
        // Facebook's /me/accounts rows carry extra fields (category, page
        // access token) that must not break decoding.
        let json = r#"{"id":"98765","name":"Hope Chapel","access_token":"EAAB...","category":"Church"}"#;
        let page: PageRef = serde_json::from_str(json).unwrap();
        assert_eq!(page.id, "98765");
        assert_eq!(page.name.as_deref(), Some("Hope Chapel"));
        assert_eq!(page.username, None);
    }

    #[test]
    fn test_account_display_name_defaults_to_empty() {
        let account = SocialAccount {
            id: new_id(),
            user_id: "user-1".to_string(),
            platform: Platform::Facebook,
            access_token: "token".to_string(),
            refresh_token: None,
            pages: vec![],
            expires_at: None,
            connected_at: 0,
        };
        assert_eq!(account.display_name(), "");
    }

    #[test]
    fn test_compose_message_with_description_and_hashtags() {
        let content = Content {
            id: new_id(),
            title: "Sunday Service".to_string(),
            description: Some("Join us at 10am".to_string()),
            content_type: ContentType::Text,
            media_url: None,
            platforms: vec![Platform::Facebook],
            status: ContentStatus::Draft,
            scheduled_for: None,
            author_id: "user-1".to_string(),
            church_id: "church-1".to_string(),
            hashtags: vec!["church".to_string(), "#sunday".to_string()],
            created_at: 0,
            updated_at: 0,
        };

        let message = content.compose_message();
        assert!(message.starts_with("Sunday Service"));
        assert!(message.contains("Join us at 10am"));
        assert!(message.ends_with("#church #sunday"));
    }

    #[test]
    fn test_compose_message_title_only() {
        let content = Content {
            id: new_id(),
            title: "Midweek update".to_string(),
            description: None,
            content_type: ContentType::Text,
            media_url: None,
            platforms: vec![Platform::Facebook],
            status: ContentStatus::Draft,
            scheduled_for: None,
            author_id: "user-1".to_string(),
            church_id: "church-1".to_string(),
            hashtags: vec![],
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(content.compose_message(), "Midweek update");
    }

    #[test]
    fn test_role_default_and_parse() {
        assert_eq!(Role::default(), Role::Editor);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }
}

//! Configuration management for Steeplecast

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub oauth: OauthConfig,
    pub facebook: Option<FacebookConfig>,
    pub instagram: Option<InstagramConfig>,
    pub youtube: Option<YoutubeConfig>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Settings shared by every OAuth flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthConfig {
    /// Origin the platforms redirect back to, e.g. "https://app.example.org".
    /// The per-platform callback path is appended to this.
    pub redirect_origin: String,
}

/// Facebook app credentials (Meta developer console)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    pub app_id: String,
    pub app_secret: String,
}

/// Instagram app credentials (Basic Display app)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub app_id: String,
    pub app_secret: String,
}

/// YouTube / Google OAuth client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platforms targeted when the caller does not name any
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "~/.local/share/steeplecast/steeplecast.db".to_string(),
            },
            oauth: OauthConfig {
                redirect_origin: "http://localhost:5173".to_string(),
            },
            facebook: None,
            instagram: None,
            youtube: None,
            defaults: DefaultsConfig {
                platforms: vec!["facebook".to_string()],
            },
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("STEEPLECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("steeplecast").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[database]
path = "/tmp/steeplecast.db"

[oauth]
redirect_origin = "https://dashboard.gracechurch.org"

[facebook]
app_id = "fb-app-id"
app_secret = "fb-app-secret"

[youtube]
client_id = "yt-client-id"
client_secret = "yt-client-secret"

[defaults]
platforms = ["facebook", "youtube"]
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.path, "/tmp/steeplecast.db");
        assert_eq!(
            config.oauth.redirect_origin,
            "https://dashboard.gracechurch.org"
        );
        assert_eq!(config.facebook.unwrap().app_id, "fb-app-id");
        assert!(config.instagram.is_none());
        assert_eq!(config.youtube.unwrap().client_id, "yt-client-id");
        assert_eq!(config.defaults.platforms, vec!["facebook", "youtube"]);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_str = r#"
[database]
path = ":memory:"

[oauth]
redirect_origin = "http://localhost:5173"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.facebook.is_none());
        assert!(config.youtube.is_none());
        assert!(config.defaults.platforms.is_empty());
    }

    #[test]
    fn test_parse_invalid_config() {
        let result: std::result::Result<Config, _> = toml::from_str("not valid toml [[[");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        std::env::set_var("STEEPLECAST_CONFIG", "/tmp/custom-config.toml");
        let path = resolve_config_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom-config.toml"));
        std::env::remove_var("STEEPLECAST_CONFIG");
    }

    #[test]
    #[serial]
    fn test_config_path_default_location() {
        std::env::remove_var("STEEPLECAST_CONFIG");
        let path = resolve_config_path().unwrap();
        assert!(path.ends_with("steeplecast/config.toml"));
    }

    #[test]
    fn test_default_config_has_no_platform_credentials() {
        let config = Config::default_config();
        assert!(config.facebook.is_none());
        assert!(config.instagram.is_none());
        assert!(config.youtube.is_none());
    }
}

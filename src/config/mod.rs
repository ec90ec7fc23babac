//! User-level configuration for vibes
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/vibes/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpotifyConfig {
    /// Access token used directly when present (skips the refresh grant)
    pub access_token: Option<String>,

    /// App client id, used together with the secret and refresh token
    pub client_id: Option<String>,

    /// App client secret
    pub client_secret: Option<String>,

    /// Long-lived refresh token traded for access tokens
    pub refresh_token: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/vibes/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        // Load user config
        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        // Environment variables override everything
        if let Ok(token) = std::env::var("SPOTIFY_ACCESS_TOKEN") {
            config.spotify.access_token = Some(token);
        }
        if let Ok(id) = std::env::var("SPOTIFY_CLIENT_ID") {
            config.spotify.client_id = Some(id);
        }
        if let Ok(secret) = std::env::var("SPOTIFY_CLIENT_SECRET") {
            config.spotify.client_secret = Some(secret);
        }
        if let Ok(token) = std::env::var("SPOTIFY_REFRESH_TOKEN") {
            config.spotify.refresh_token = Some(token);
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vibes").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.spotify.access_token.is_some() {
            self.spotify.access_token = other.spotify.access_token;
        }
        if other.spotify.client_id.is_some() {
            self.spotify.client_id = other.spotify.client_id;
        }
        if other.spotify.client_secret.is_some() {
            self.spotify.client_secret = other.spotify.client_secret;
        }
        if other.spotify.refresh_token.is_some() {
            self.spotify.refresh_token = other.spotify.refresh_token;
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.spotify.access_token.as_deref()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.spotify.client_id.as_deref()
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.spotify.client_secret.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.spotify.refresh_token.as_deref()
    }

    /// Check if any usable credential combination is configured
    pub fn has_credentials(&self) -> bool {
        self.spotify.access_token.is_some()
            || (self.spotify.client_id.is_some()
                && self.spotify.client_secret.is_some()
                && self.spotify.refresh_token.is_some())
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# Vibes User Configuration

[spotify]
# Either a ready access token (short-lived, simplest for one-off runs):
# access_token = "BQ..."

# Or app credentials plus a refresh token (survives token expiry).
# Create an app at https://developer.spotify.com/dashboard
# client_id = "..."
# client_secret = "..."
# refresh_token = "..."
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.has_credentials());
        assert!(config.access_token().is_none());
        assert!(config.refresh_token().is_none());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml_str = r#"
[spotify]
access_token = "BQ-test"
client_id = "id-123"
client_secret = "secret-123"
refresh_token = "refresh-123"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.access_token(), Some("BQ-test"));
        assert_eq!(config.client_id(), Some("id-123"));
        assert_eq!(config.client_secret(), Some("secret-123"));
        assert_eq!(config.refresh_token(), Some("refresh-123"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_refresh_credentials_require_all_three() {
        let toml_str = r#"
[spotify]
client_id = "id-123"
refresh_token = "refresh-123"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_invalid_toml_does_not_crash() {
        let bad_toml = "this is [[ not valid toml {{{}}}";
        let result = toml::from_str::<UserConfig>(bad_toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut base = UserConfig::default();
        let other = UserConfig {
            spotify: SpotifyConfig {
                access_token: Some("BQ-new".to_string()),
                client_id: Some("id-new".to_string()),
                client_secret: None,
                refresh_token: None,
            },
        };
        base.merge(other);
        assert_eq!(base.access_token(), Some("BQ-new"));
        assert_eq!(base.client_id(), Some("id-new"));
        assert!(base.client_secret().is_none());
    }

    #[test]
    fn test_merge_preserves_base_when_other_is_none() {
        let mut base = UserConfig {
            spotify: SpotifyConfig {
                access_token: Some("BQ-original".to_string()),
                client_id: None,
                client_secret: None,
                refresh_token: None,
            },
        };
        base.merge(UserConfig::default());
        assert_eq!(base.access_token(), Some("BQ-original"));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        if let Some(path) = UserConfig::user_config_path() {
            assert!(path.ends_with("vibes/config.toml"));
        }
    }
}

//! Runtime configuration.
//!
//! Only endpoints and limits live here. Credentials are never read from the
//! config file; they are submitted per session.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    /// Where uploads are staged during a call. System temp dir when unset.
    pub staging_dir: Option<PathBuf>,
    pub reddit: RedditEndpoints,
    pub youtube: YouTubeEndpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            upload_timeout_secs: 600,
            staging_dir: None,
            reddit: RedditEndpoints::default(),
            youtube: YouTubeEndpoints::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditEndpoints {
    /// Host of the token endpoint (`/api/v1/access_token`).
    pub auth_base: String,
    /// Host of the OAuth API.
    pub api_base: String,
    pub listing_page_size: u32,
    /// How deep a read scans the `new` listing before giving up.
    pub listing_scan_cap: usize,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            auth_base: "https://www.reddit.com".to_string(),
            api_base: "https://oauth.reddit.com".to_string(),
            listing_page_size: 100,
            listing_scan_cap: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeEndpoints {
    pub api_base: String,
    pub upload_base: String,
    /// Largest `maxResults` a single list call may ask for.
    pub list_cap: u32,
}

impl Default for YouTubeEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/youtube/v3".to_string(),
            list_cap: 50,
        }
    }
}

impl AppConfig {
    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("reddit.auth_base", &self.reddit.auth_base)?;
        check_url("reddit.api_base", &self.reddit.api_base)?;
        check_url("youtube.api_base", &self.youtube.api_base)?;
        check_url("youtube.upload_base", &self.youtube.upload_base)?;

        check_non_zero("request_timeout_secs", self.request_timeout_secs)?;
        check_non_zero("upload_timeout_secs", self.upload_timeout_secs)?;
        check_non_zero("reddit.listing_page_size", self.reddit.listing_page_size as u64)?;
        check_non_zero("reddit.listing_scan_cap", self.reddit.listing_scan_cap as u64)?;
        check_non_zero("youtube.list_cap", self.youtube.list_cap as u64)?;

        if let Some(dir) = &self.staging_dir {
            if !dir.is_dir() {
                return Err(ConfigError::InvalidValue {
                    field: "staging_dir".to_string(),
                    value: dir.display().to_string(),
                });
            }
        }

        if self.reddit.listing_page_size > 100 {
            return Err(ConfigError::InvalidValue {
                field: "reddit.listing_page_size".to_string(),
                value: self.reddit.listing_page_size.to_string(),
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn check_non_zero(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: "0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.reddit.api_base, "https://oauth.reddit.com");
        assert_eq!(config.youtube.list_cap, 50);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            request_timeout_secs = 5

            [reddit]
            api_base = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.reddit.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.reddit.auth_base, "https://www.reddit.com");
        assert_eq!(config.reddit.listing_scan_cap, 1000);
        assert_eq!(config.upload_timeout_secs, 600);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [youtube]
            api_base = "not a url"
            "#,
        );
        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "youtube.api_base"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_page_rejected() {
        let result = AppConfig::from_toml("[reddit]\nlisting_page_size = 500\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_staging_dir_must_exist() {
        let result = AppConfig::from_toml("staging_dir = \"/definitely/not/here\"\n");
        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "staging_dir"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        let dir = tempfile::tempdir().unwrap();
        let toml = format!("staging_dir = {:?}\n", dir.path().display().to_string());
        let config = AppConfig::from_toml(&toml).unwrap();
        assert_eq!(config.staging_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_malformed_toml() {
        let result = AppConfig::from_toml("request_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "upload_timeout_secs = 42").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.upload_timeout(), Duration::from_secs(42));
    }
}

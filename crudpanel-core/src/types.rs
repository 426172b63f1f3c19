use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Reddit,
    YouTube,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Reddit => "reddit",
            Provider::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret value that never shows up in logs.
///
/// Debug and Display print `[REDACTED]`; the value is reachable only through
/// [`expose`](Secret::expose).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::missing_field(field));
    }
    Ok(())
}

/// Script-app credentials for Reddit's password grant.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    client_id: Secret,
    client_secret: Secret,
    user_agent: String,
    username: String,
    password: Secret,
}

impl RedditCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let credentials = Self {
            client_id: Secret::new(client_id),
            client_secret: Secret::new(client_secret),
            user_agent: user_agent.into(),
            username: username.into().trim().to_string(),
            password: Secret::new(password),
        };

        require("client_id", credentials.client_id.expose())?;
        require("client_secret", credentials.client_secret.expose())?;
        require("user_agent", &credentials.user_agent)?;
        require("username", &credentials.username)?;
        require("password", credentials.password.expose())?;

        Ok(credentials)
    }

    pub fn client_id(&self) -> &Secret {
        &self.client_id
    }

    pub fn client_secret(&self) -> &Secret {
        &self.client_secret
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }
}

#[derive(Debug, Clone)]
pub struct YouTubeCredentials {
    api_key: Secret,
}

impl YouTubeCredentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CoreError> {
        let api_key = Secret::new(api_key.into().trim());
        require("api_key", api_key.expose())?;
        Ok(Self { api_key })
    }

    pub fn api_key(&self) -> &Secret {
        &self.api_key
    }
}

/// Everything a user types into the credentials form for one provider.
#[derive(Debug, Clone)]
pub enum Credentials {
    Reddit(RedditCredentials),
    YouTube(YouTubeCredentials),
}

impl Credentials {
    pub fn provider(&self) -> Provider {
        match self {
            Credentials::Reddit(_) => Provider::Reddit,
            Credentials::YouTube(_) => Provider::YouTube,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub created_utc: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Image,
    Video,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Text => "text",
            PostKind::Image => "image",
            PostKind::Video => "video",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded file as handed over by the front end, before it is staged
/// to disk.
#[derive(Clone)]
pub struct MediaPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaPayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let file_name = file_name.into();
        require("file_name", &file_name)?;
        if bytes.is_empty() {
            return Err(CoreError::invalid_input(format!(
                "uploaded file '{}' is empty",
                file_name
            )));
        }
        Ok(Self { file_name, bytes })
    }

    /// Lower-cased extension of the original file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPayload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

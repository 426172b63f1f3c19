use crate::types::Provider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("YouTube API error: {0}")]
    YouTubeApi(#[from] YouTubeApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("No active {provider} session. Submit credentials first.")]
    NoActiveSession { provider: Provider },
}

impl CoreError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        CoreError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Media upload failed: {details}")]
    MediaUploadFailed { details: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum YouTubeApiError {
    #[error("API key rejected: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Quota exceeded: {reason}")]
    QuotaExceeded { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Request rejected ({status_code}): {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Upload failed: {details}")]
    UploadFailed { details: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read configuration: {0}")]
    Read(#[from] std::io::Error),
}

use crate::error::*;
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

/// Coarse classification every failure collapses into before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad credentials, failed identity check, or no session yet.
    Authentication,
    /// The provider rejected the call or could not be reached.
    RemoteApi,
    /// A required field was missing or malformed; nothing was sent.
    Validation,
    /// Local I/O or configuration trouble.
    Local,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::RemoteApi => "remote_api",
            ErrorKind::Validation => "validation",
            ErrorKind::Local => "local",
        };
        f.write_str(name)
    }
}

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn kind(&self) -> ErrorKind;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::YouTubeApi(e) => {
                error!("YouTube API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn kind(&self) -> ErrorKind {
        match self {
            CoreError::RedditApi(e) => e.kind(),
            CoreError::YouTubeApi(e) => e.kind(),
            CoreError::Config(_) => ErrorKind::Local,
            CoreError::Io(_) => ErrorKind::Local,
            CoreError::Serialization(_) => ErrorKind::RemoteApi,
            CoreError::Network(_) => ErrorKind::RemoteApi,
            CoreError::InvalidInput { .. } => ErrorKind::Validation,
            CoreError::MissingField { .. } => ErrorKind::Validation,
            CoreError::NoActiveSession { .. } => ErrorKind::Authentication,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::YouTubeApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Could not reach the provider. Check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::MissingField { field } => {
                format!("The field '{}' is required.", field)
            }
            CoreError::NoActiveSession { provider } => format!(
                "You are not logged in to {}. Please submit your credentials.",
                provider
            ),
            CoreError::Io(_) => {
                "Could not stage the uploaded file on local disk.".to_string()
            }
            _ => "Something unexpected went wrong on our side.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::YouTubeApi(_) => "YOUTUBE_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::MissingField { .. } => "MISSING_FIELD".to_string(),
            CoreError::NoActiveSession { .. } => "NO_ACTIVE_SESSION".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn kind(&self) -> ErrorKind {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                ErrorKind::Authentication
            }
            _ => ErrorKind::RemoteApi,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { reason } => format!(
                "Reddit login failed: {}. Please check your credentials.",
                reason
            ),
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Reddit asks to wait {} seconds.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission for this action.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("r/{} does not exist or is private.", subreddit)
            }
            RedditApiError::PostNotFound { post_id } => {
                format!("Post '{}' could not be found.", post_id)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-enter your credentials."
                    .to_string()
            }
            RedditApiError::RequestTimeout => {
                "Reddit did not answer in time.".to_string()
            }
            RedditApiError::Rejected { message } => format!("Reddit rejected the request: {}", message),
            RedditApiError::MediaUploadFailed { details } => {
                format!("Media upload to Reddit failed: {}", details)
            }
            _ => "Reddit could not complete the request.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::Rejected { .. } => "REDDIT_REJECTED".to_string(),
            RedditApiError::MediaUploadFailed { .. } => "REDDIT_MEDIA_UPLOAD_FAILED".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for YouTubeApiError {
    fn log_error(&self) -> &Self {
        error!("YouTubeApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("YouTubeApiError (warning): {}", self);
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::RemoteApi
    }

    fn user_friendly_message(&self) -> String {
        match self {
            YouTubeApiError::InvalidApiKey { .. } => {
                "YouTube rejected the API key. Please re-enter it.".to_string()
            }
            YouTubeApiError::QuotaExceeded { .. } => {
                "YouTube API quota exhausted for this key.".to_string()
            }
            YouTubeApiError::Forbidden { reason } => {
                format!("YouTube refused the request: {}", reason)
            }
            YouTubeApiError::VideoNotFound { video_id } => {
                format!("Video '{}' could not be found.", video_id)
            }
            YouTubeApiError::RequestTimeout => {
                "YouTube did not answer in time.".to_string()
            }
            YouTubeApiError::Rejected { message, .. } => {
                format!("YouTube rejected the request: {}", message)
            }
            YouTubeApiError::UploadFailed { details } => {
                format!("Video upload failed: {}", details)
            }
            _ => "YouTube could not complete the request.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            YouTubeApiError::InvalidApiKey { .. } => "YOUTUBE_INVALID_API_KEY".to_string(),
            YouTubeApiError::QuotaExceeded { .. } => "YOUTUBE_QUOTA_EXCEEDED".to_string(),
            YouTubeApiError::Forbidden { .. } => "YOUTUBE_FORBIDDEN".to_string(),
            YouTubeApiError::VideoNotFound { .. } => "YOUTUBE_VIDEO_NOT_FOUND".to_string(),
            YouTubeApiError::RequestTimeout => "YOUTUBE_TIMEOUT".to_string(),
            YouTubeApiError::Rejected { .. } => "YOUTUBE_REJECTED".to_string(),
            YouTubeApiError::UploadFailed { .. } => "YOUTUBE_UPLOAD_FAILED".to_string(),
            YouTubeApiError::InvalidResponse { .. } => "YOUTUBE_INVALID_RESPONSE".to_string(),
            YouTubeApiError::ServerError { .. } => "YOUTUBE_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Local
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Configuration field '{}' has an invalid value.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file is not valid TOML.".to_string()
            }
            ConfigError::Read(_) => {
                "Configuration file could not be read. Please check file permissions."
                    .to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
            ConfigError::Read(_) => "CONFIG_READ_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {} ({})", error.error_code(), error.kind());
            info!("User message: {}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a failure the way the front end shows it: one line, provider
/// message kept verbatim.
pub fn display_error(error: &CoreError) -> String {
    format!("Error: {}", error)
}

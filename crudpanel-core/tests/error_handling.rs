use crudpanel_core::{
    display_error, ConfigError, CoreError, ErrorExt, ErrorKind, ErrorReporter, Provider,
    RedditApiError, YouTubeApiError,
};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let youtube_error = CoreError::YouTubeApi(YouTubeApiError::VideoNotFound {
        video_id: "abc".to_string(),
    });
    assert_eq!(youtube_error.error_code(), "YOUTUBE_API");

    let config_error = CoreError::Config(ConfigError::FileNotFound {
        path: "crudpanel.toml".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let session_error = CoreError::NoActiveSession {
        provider: Provider::Reddit,
    };
    assert_eq!(session_error.error_code(), "NO_ACTIVE_SESSION");
}

#[test]
fn test_error_kinds() {
    let auth = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    assert_eq!(auth.kind(), ErrorKind::Authentication);

    let not_found = CoreError::RedditApi(RedditApiError::PostNotFound {
        post_id: "zzz999".to_string(),
    });
    assert_eq!(not_found.kind(), ErrorKind::RemoteApi);

    let bad_key = CoreError::YouTubeApi(YouTubeApiError::InvalidApiKey {
        reason: "keyInvalid".to_string(),
    });
    assert_eq!(bad_key.kind(), ErrorKind::RemoteApi);

    let missing = CoreError::missing_field("title");
    assert_eq!(missing.kind(), ErrorKind::Validation);

    let no_session = CoreError::NoActiveSession {
        provider: Provider::YouTube,
    };
    assert_eq!(no_session.kind(), ErrorKind::Authentication);

    let io = CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
    assert_eq!(io.kind(), ErrorKind::Local);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let missing = CoreError::missing_field("new_title");
    assert!(missing.user_friendly_message().contains("new_title"));

    let no_session = CoreError::NoActiveSession {
        provider: Provider::YouTube,
    };
    assert!(no_session.user_friendly_message().contains("youtube"));
}

#[test]
fn test_remote_message_displayed_verbatim() {
    let error = CoreError::RedditApi(RedditApiError::Rejected {
        message: "SUBREDDIT_NOEXIST: that subreddit doesn't exist".to_string(),
    });
    let rendered = display_error(&error);
    assert!(rendered.starts_with("Error: "));
    assert!(rendered.contains("SUBREDDIT_NOEXIST: that subreddit doesn't exist"));
}

#[test]
fn test_error_reporter() {
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // Logs only; passing means nothing panicked
    ErrorReporter::new().report_error(&error);
    ErrorReporter::new()
        .with_error_reporting(false)
        .report_error(&error);
}

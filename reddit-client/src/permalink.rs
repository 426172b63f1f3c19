use crudpanel_core::CoreError;
use regex::Regex;
use std::sync::LazyLock;

static COMMENTS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/comments/([^/?#\s]+)").expect("permalink pattern is valid")
});

/// Extracts the post id from a Reddit permalink.
///
/// Returns the first path component after `/comments/`. Anything without
/// that marker, or with nothing after it, is rejected rather than guessed at.
pub fn extract_post_id(url: &str) -> Result<String, CoreError> {
    COMMENTS_PATTERN
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| {
            CoreError::invalid_input(
                "Invalid URL. Please provide a valid Reddit post URL containing /comments/",
            )
        })
}

use crate::api::{RedditApiClient, SubmitRequest};
use crate::auth::{self, RedditToken};
use crate::media::{self, MediaFile};
use crudpanel_core::{
    AppConfig, CoreError, PostKind, RedditApiError, RedditCredentials, RedditPost,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a new post carries besides its title.
///
/// Media variants point at a local file. `file_name`, when set, is the name
/// Reddit is told the upload has, in place of the file's own name.
#[derive(Debug, Clone, Copy)]
pub enum PostContent<'a> {
    Text(&'a str),
    Image {
        path: &'a Path,
        file_name: Option<&'a str>,
    },
    Video {
        path: &'a Path,
        file_name: Option<&'a str>,
    },
}

impl PostContent<'_> {
    pub fn kind(&self) -> PostKind {
        match self {
            PostContent::Text(_) => PostKind::Text,
            PostContent::Image { .. } => PostKind::Image,
            PostContent::Video { .. } => PostKind::Video,
        }
    }
}

/// A logged-in Reddit account. Only obtainable through [`RedditSession::establish`],
/// so holding one means the identity check passed.
#[derive(Debug)]
pub struct RedditSession {
    api: RedditApiClient,
    token: RedditToken,
    username: String,
    listing_page_size: u32,
    listing_scan_cap: usize,
}

impl RedditSession {
    /// Builds a client, runs the password grant and verifies the identity
    /// behind the token with `/api/v1/me`.
    pub async fn establish(
        credentials: &RedditCredentials,
        config: &AppConfig,
    ) -> Result<Self, CoreError> {
        info!("Establishing Reddit session for u/{}", credentials.username());

        let api = RedditApiClient::new(
            credentials.user_agent(),
            &config.reddit,
            config.request_timeout(),
            config.upload_timeout(),
        )?;

        let token = auth::request_password_token(api.http_client(), credentials, &config.reddit)
            .await?;

        let me = api
            .get_user_info(token.access_token.expose())
            .await
            .map_err(|e| {
                warn!("Identity check failed: {}", e);
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: format!("identity check failed: {}", e),
                })
            })?;

        if !me.name.eq_ignore_ascii_case(credentials.username()) {
            warn!(
                "Token belongs to u/{} but credentials name u/{}",
                me.name,
                credentials.username()
            );
            return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: format!(
                    "credentials authenticate u/{}, not u/{}",
                    me.name,
                    credentials.username()
                ),
            }));
        }

        info!("Logged in to Reddit as u/{}", me.name);
        Ok(Self {
            api,
            token,
            username: me.name,
            listing_page_size: config.reddit.listing_page_size,
            listing_scan_cap: config.reddit.listing_scan_cap,
        })
    }

    /// Canonical username as reported by Reddit.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &RedditToken {
        &self.token
    }

    /// Bearer token for the next call. Sessions are not refreshed, so an
    /// expired token ends the session.
    fn access_token(&self) -> Result<&str, CoreError> {
        if self.token.is_expired() {
            warn!("Reddit token for u/{} has expired", self.username);
            return Err(CoreError::RedditApi(RedditApiError::InvalidToken));
        }
        Ok(self.token.access_token.expose())
    }

    /// Submits a post and returns its id.
    ///
    /// `Ok(None)` means Reddit accepted the submission without returning a
    /// post object, which is how media posts are acknowledged.
    pub async fn create_post(
        &self,
        subreddit: &str,
        title: &str,
        content: PostContent<'_>,
    ) -> Result<Option<String>, CoreError> {
        let subreddit = normalize_subreddit(subreddit)?;
        require_text("title", title)?;

        let kind = content.kind();
        let data = match content {
            PostContent::Text(body) => {
                require_text("body", body)?;
                let request = SubmitRequest::text(subreddit, title, body);
                self.api.submit_post(self.access_token()?, &request).await?
            }
            PostContent::Image { path, file_name } => {
                let image = MediaFile::inspect(path, PostKind::Image)?.named(file_name);
                let token = self.access_token()?;
                let image_url = media::upload_media_file(&self.api, token, &image).await?;
                let request = SubmitRequest::image(subreddit, title, &image_url);
                self.api.submit_post(token, &request).await?
            }
            PostContent::Video { path, file_name } => {
                let video = MediaFile::inspect(path, PostKind::Video)?.named(file_name);
                let token = self.access_token()?;
                let video_url = media::upload_media_file(&self.api, token, &video).await?;
                let poster_url = media::upload_default_poster(&self.api, token).await?;
                let request = SubmitRequest::video(subreddit, title, &video_url, &poster_url);
                self.api.submit_post(token, &request).await?
            }
        };

        let post_id = data.and_then(|data| data.post_id());
        match &post_id {
            Some(id) => info!("Created {} post {} in r/{}", kind, id, subreddit),
            None => warn!(
                "Reddit accepted the {} post in r/{} without returning a post object",
                kind, subreddit
            ),
        }
        Ok(post_id)
    }

    /// Scans `/r/{subreddit}/new` newest first and keeps posts written by
    /// `username`.
    ///
    /// Stops after `limit` matches, when the listing runs out, or after
    /// `listing_scan_cap` posts. `None` means no match limit. A post id is
    /// never returned twice even if the listing shifts between pages.
    pub async fn read_posts(
        &self,
        subreddit: &str,
        username: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let subreddit = normalize_subreddit(subreddit)?;
        require_text("username", username)?;

        let mut posts = Vec::new();
        if limit == Some(0) {
            return Ok(posts);
        }
        let token = self.access_token()?;

        let mut seen = HashSet::new();
        let mut after: Option<String> = None;
        let mut scanned = 0usize;

        'pages: loop {
            let listing = self
                .api
                .get_new_posts(
                    token,
                    subreddit,
                    self.listing_page_size,
                    after.as_deref(),
                )
                .await?;

            let page_len = listing.data.children.len();
            for child in listing.data.children {
                scanned += 1;
                let post = child.data;

                if post.author == username && seen.insert(post.id.clone()) {
                    posts.push(RedditPost::from(post));
                    if limit.is_some_and(|max| posts.len() >= max) {
                        break 'pages;
                    }
                }

                if scanned >= self.listing_scan_cap {
                    debug!("Reached scan cap of {} posts in r/{}", scanned, subreddit);
                    break 'pages;
                }
            }

            match listing.data.after {
                Some(next) if page_len > 0 => after = Some(next),
                _ => break,
            }
        }

        info!(
            "Found {} posts by u/{} among {} scanned in r/{}",
            posts.len(),
            username,
            scanned,
            subreddit
        );
        Ok(posts)
    }

    /// Replaces the body of a post.
    ///
    /// `new_title` must be non-empty for the edit to go ahead, but it is not
    /// applied: Reddit has no way to retitle a submission.
    pub async fn update_post(
        &self,
        post_id: &str,
        new_title: &str,
        new_body: &str,
    ) -> Result<(), CoreError> {
        let post_id = normalize_post_id(post_id)?;
        if new_title.is_empty() {
            return Err(CoreError::missing_field("new_title"));
        }

        let fullname = format!("t3_{}", post_id);
        self.api
            .edit_post_text(self.access_token()?, &fullname, new_body)
            .await?;

        info!("Updated body of post {}", post_id);
        Ok(())
    }

    /// Deletes a post by id. Ids Reddit does not know fail with
    /// `PostNotFound` instead of silently succeeding.
    pub async fn delete_post(&self, post_id: &str) -> Result<(), CoreError> {
        let post_id = normalize_post_id(post_id)?;
        let fullname = format!("t3_{}", post_id);

        let token = self.access_token()?;
        let listing = self.api.get_info(token, &fullname).await?;
        if listing.data.children.is_empty() {
            warn!("Refusing to delete unknown post {}", post_id);
            return Err(CoreError::RedditApi(RedditApiError::PostNotFound {
                post_id: post_id.to_string(),
            }));
        }

        self.api.delete_thing(token, &fullname).await?;
        info!("Deleted post {}", post_id);
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::missing_field(field));
    }
    Ok(())
}

/// Accepts `rust`, `r/rust` or `/r/rust/`.
pub(crate) fn normalize_subreddit(subreddit: &str) -> Result<&str, CoreError> {
    let trimmed = subreddit.trim().trim_matches('/');
    let name = trimmed.strip_prefix("r/").unwrap_or(trimmed);

    if name.is_empty() {
        return Err(CoreError::missing_field("subreddit"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::invalid_input(format!(
            "'{}' is not a valid subreddit name",
            name
        )));
    }
    Ok(name)
}

/// Accepts a bare base36 id or a `t3_` fullname.
pub(crate) fn normalize_post_id(post_id: &str) -> Result<&str, CoreError> {
    let trimmed = post_id.trim();
    let id = trimmed.strip_prefix("t3_").unwrap_or(trimmed);

    if id.is_empty() {
        return Err(CoreError::missing_field("post_id"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::invalid_input(format!(
            "'{}' is not a valid post id",
            id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subreddit() {
        assert_eq!(normalize_subreddit("test").unwrap(), "test");
        assert_eq!(normalize_subreddit("r/test").unwrap(), "test");
        assert_eq!(normalize_subreddit(" /r/rust_gamedev/ ").unwrap(), "rust_gamedev");
        assert!(matches!(
            normalize_subreddit("  "),
            Err(CoreError::MissingField { .. })
        ));
        assert!(matches!(
            normalize_subreddit("two words"),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_normalize_post_id() {
        assert_eq!(normalize_post_id("abc123").unwrap(), "abc123");
        assert_eq!(normalize_post_id("t3_abc123").unwrap(), "abc123");
        assert!(normalize_post_id("").is_err());
        assert!(normalize_post_id("abc/123").is_err());
    }

    #[test]
    fn test_post_content_kind() {
        assert_eq!(PostContent::Text("b").kind(), PostKind::Text);
        let image = PostContent::Image {
            path: Path::new("a.png"),
            file_name: None,
        };
        let video = PostContent::Video {
            path: Path::new("a.mp4"),
            file_name: Some("holiday.mp4"),
        };
        assert_eq!(image.kind(), PostKind::Image);
        assert_eq!(video.kind(), PostKind::Video);
    }
}

use crudpanel_core::{CoreError, RedditApiError, RedditEndpoints, RedditPost};
use reqwest::header::HeaderValue;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditUserData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
}

/// Envelope Reddit wraps around `api_type=json` write responses.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditJsonResponse<T> {
    pub json: RedditJsonBody<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditJsonBody<T> {
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub user_submitted_page: Option<String>,
    pub websocket_url: Option<String>,
}

impl SubmitData {
    /// Base36 id of the new post, if Reddit returned one synchronously.
    pub fn post_id(&self) -> Option<String> {
        self.id.clone().or_else(|| {
            self.name
                .as_deref()
                .and_then(|name| name.strip_prefix("t3_"))
                .map(str::to_string)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaLease {
    pub args: MediaLeaseArgs,
    pub asset: MediaAsset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaLeaseArgs {
    pub action: String,
    pub fields: Vec<MediaLeaseField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaLeaseField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaAsset {
    pub asset_id: String,
    pub websocket_url: Option<String>,
}

/// Fields for `/api/submit`.
#[derive(Debug, Clone)]
pub struct SubmitRequest<'a> {
    pub subreddit: &'a str,
    pub title: &'a str,
    pub kind: &'a str,
    pub text: Option<&'a str>,
    pub url: Option<&'a str>,
    pub video_poster_url: Option<&'a str>,
}

impl<'a> SubmitRequest<'a> {
    pub fn text(subreddit: &'a str, title: &'a str, body: &'a str) -> Self {
        Self {
            subreddit,
            title,
            kind: "self",
            text: Some(body),
            url: None,
            video_poster_url: None,
        }
    }

    pub fn image(subreddit: &'a str, title: &'a str, image_url: &'a str) -> Self {
        Self {
            subreddit,
            title,
            kind: "image",
            text: None,
            url: Some(image_url),
            video_poster_url: None,
        }
    }

    pub fn video(
        subreddit: &'a str,
        title: &'a str,
        video_url: &'a str,
        poster_url: &'a str,
    ) -> Self {
        Self {
            subreddit,
            title,
            kind: "video",
            text: None,
            url: Some(video_url),
            video_poster_url: Some(poster_url),
        }
    }

    fn form_fields(&self) -> Vec<(&'a str, &'a str)> {
        let mut fields = vec![
            ("api_type", "json"),
            ("sr", self.subreddit),
            ("title", self.title),
            ("kind", self.kind),
            ("resubmit", "true"),
            ("sendreplies", "true"),
        ];
        if let Some(text) = self.text {
            fields.push(("text", text));
        }
        if let Some(url) = self.url {
            fields.push(("url", url));
        }
        if let Some(poster) = self.video_poster_url {
            fields.push(("video_poster_url", poster));
        }
        fields
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: String,
    media_scheme: String,
    user_agent: String,
    upload_timeout: Duration,
}

impl RedditApiClient {
    /// Builds the HTTP client every Reddit call goes through.
    ///
    /// Fails with `AuthenticationFailed` when `user_agent` cannot be sent as a
    /// header value.
    pub fn new(
        user_agent: &str,
        endpoints: &RedditEndpoints,
        timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, CoreError> {
        if let Err(e) = HeaderValue::from_str(user_agent) {
            error!("Rejected malformed user agent: {}", e);
            return Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: format!("malformed user agent: {}", e),
            }));
        }

        let api_base = endpoints.api_base.trim_end_matches('/').to_string();
        let media_scheme = Url::parse(&api_base)
            .map(|url| url.scheme().to_string())
            .map_err(|e| CoreError::invalid_input(format!("invalid Reddit API base: {}", e)))?;

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            http_client,
            api_base,
            media_scheme,
            user_agent: user_agent.to_string(),
            upload_timeout,
        })
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }
        if let Some(fields) = form {
            request_builder = request_builder.form(fields);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        match request_builder.send().await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    Err(CoreError::RedditApi(RedditApiError::RequestTimeout))
                } else {
                    Err(CoreError::Network(e))
                }
            }
        }
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let response = self
            .send(method, endpoint, access_token, query_params, form)
            .await?;
        ensure_success(response, endpoint).await
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<RedditUserData, CoreError> {
        let response = self
            .make_request(Method::GET, "/api/v1/me", access_token, None, None)
            .await?;

        let user_data: RedditUserData = response.json().await.map_err(|e| {
            error!("Failed to parse user data: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "Failed to parse user data".to_string(),
            })
        })?;

        debug!("Retrieved user info for: {}", user_data.name);
        Ok(user_data)
    }

    /// One page of `/r/{subreddit}/new`, newest first.
    pub async fn get_new_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let limit_str = limit.to_string();
        let mut params = vec![("limit", limit_str.as_str()), ("raw_json", "1")];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self
            .send(
                Method::GET,
                &endpoint,
                access_token,
                Some(params.as_slice()),
                None,
            )
            .await?;

        // Unknown subreddits answer 404, or redirect to the search page.
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status.is_redirection() {
            warn!("r/{} does not exist (status {})", subreddit, status);
            return Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            }));
        }
        let response = ensure_success(response, &endpoint).await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Looks up things by fullname (`t3_...`). Unknown ids yield an empty listing.
    pub async fn get_info(
        &self,
        access_token: &str,
        fullname: &str,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let params = [("id", fullname), ("raw_json", "1")];
        let response = self
            .make_request(Method::GET, "/api/info", access_token, Some(&params[..]), None)
            .await?;

        parse_json(response, "info listing").await
    }

    pub async fn submit_post(
        &self,
        access_token: &str,
        request: &SubmitRequest<'_>,
    ) -> Result<Option<SubmitData>, CoreError> {
        let form = request.form_fields();
        let response = self
            .make_request(
                Method::POST,
                "/api/submit",
                access_token,
                None,
                Some(form.as_slice()),
            )
            .await?;

        let body: RedditJsonResponse<SubmitData> = parse_json(response, "submit response").await?;
        check_json_errors(&body.json.errors)?;
        Ok(body.json.data)
    }

    pub async fn edit_post_text(
        &self,
        access_token: &str,
        fullname: &str,
        text: &str,
    ) -> Result<(), CoreError> {
        let form = [("api_type", "json"), ("thing_id", fullname), ("text", text)];
        let response = self
            .make_request(
                Method::POST,
                "/api/editusertext",
                access_token,
                None,
                Some(&form[..]),
            )
            .await?;

        let body: RedditJsonResponse<serde_json::Value> =
            parse_json(response, "edit response").await?;
        check_json_errors(&body.json.errors)?;
        debug!("Edited text of {}", fullname);
        Ok(())
    }

    pub async fn delete_thing(&self, access_token: &str, fullname: &str) -> Result<(), CoreError> {
        let form = [("id", fullname)];
        self.make_request(Method::POST, "/api/del", access_token, None, Some(&form[..]))
            .await?;
        debug!("Deleted {}", fullname);
        Ok(())
    }

    pub async fn request_media_lease(
        &self,
        access_token: &str,
        file_name: &str,
        mime_type: &str,
    ) -> Result<MediaLease, CoreError> {
        let form = [("filepath", file_name), ("mimetype", mime_type)];
        let response = self
            .make_request(
                Method::POST,
                "/api/media/asset.json",
                access_token,
                None,
                Some(&form[..]),
            )
            .await?;

        let lease: MediaLease = parse_json(response, "media upload lease").await?;
        debug!("Obtained media lease {} for {}", lease.asset.asset_id, file_name);
        Ok(lease)
    }

    /// Posts the file to the storage bucket named in `lease` and returns the
    /// URL Reddit expects in the submit call.
    pub async fn upload_to_lease(
        &self,
        lease: &MediaLease,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CoreError> {
        let upload_url = self.lease_url(&lease.args.action);

        let mut key = None;
        let mut form = Form::new();
        for field in &lease.args.fields {
            if field.name == "key" {
                key = Some(field.value.clone());
            }
            form = form.text(field.name.clone(), field.value.clone());
        }
        let key = key.ok_or_else(|| {
            CoreError::RedditApi(RedditApiError::MediaUploadFailed {
                details: "upload lease carried no storage key".to_string(),
            })
        })?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        form = form.part("file", part);

        info!("Uploading {} ({}) to Reddit media storage", file_name, mime_type);
        let response = self
            .http_client
            .post(&upload_url)
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Media upload of {} failed: {}", file_name, e);
                CoreError::RedditApi(RedditApiError::MediaUploadFailed {
                    details: e.to_string(),
                })
            })?;

        if !response.status().is_success() {
            error!("Media storage rejected {} with {}", file_name, response.status());
            return Err(CoreError::RedditApi(RedditApiError::MediaUploadFailed {
                details: format!("storage responded with {}", response.status()),
            }));
        }

        Ok(format!("{}/{}", upload_url, key))
    }

    fn lease_url(&self, action: &str) -> String {
        // Leases come back scheme-relative ("//bucket.host/...").
        if action.starts_with("//") {
            format!("{}:{}", self.media_scheme, action)
        } else {
            action.to_string()
        }
    }
}

async fn ensure_success(response: Response, endpoint: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("Request successful: {} {}", status, endpoint);
        return Ok(response);
    }

    error!("Request failed with status: {} for {}", status, endpoint);
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    let reddit_error = match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditApiError::InvalidResponse {
            details: format!("Resource not found: {}", endpoint),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::Rejected {
            message: format!("HTTP {}: {}", code, summarize_body(&body)),
        },
    };
    Err(CoreError::RedditApi(reddit_error))
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, CoreError> {
    response.json::<T>().await.map_err(|e| {
        error!("Failed to parse {}: {}", what, e);
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Failed to parse {}", what),
        })
    })
}

/// Turns the `[code, message, field]` triples of a write response into one
/// error.
pub(crate) fn check_json_errors(errors: &[Vec<serde_json::Value>]) -> Result<(), CoreError> {
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|triple| {
            triple
                .iter()
                .take(2)
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(": ")
        })
        .collect::<Vec<_>>()
        .join("; ");

    warn!("Reddit rejected the request: {}", message);
    Err(CoreError::RedditApi(RedditApiError::Rejected { message }))
}

fn summarize_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["explanation", "message", "reason"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.chars().take(200).collect()
}

impl From<RedditPostData> for RedditPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            content: if post_data.is_self && !post_data.selftext.is_empty() {
                Some(post_data.selftext)
            } else {
                None
            },
            author: post_data.author,
            subreddit: post_data.subreddit,
            url: post_data.url,
            created_utc: post_data.created_utc as i64,
        }
    }
}

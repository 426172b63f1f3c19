use chrono::{DateTime, Utc};
use crudpanel_core::{CoreError, Secret, Video, YouTubeApiError, YouTubeEndpoints};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<VideoSnippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
    pub next_page_token: Option<String>,
}

/// Google's error envelope: `{"error": {"code", "message", "errors": [...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorBody {
    pub error: GoogleError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl TryFrom<VideoResource> for Video {
    type Error = CoreError;

    fn try_from(resource: VideoResource) -> Result<Self, Self::Error> {
        let id = resource.id.ok_or_else(|| {
            CoreError::YouTubeApi(YouTubeApiError::InvalidResponse {
                details: "video resource without an id".to_string(),
            })
        })?;
        let snippet = resource.snippet.unwrap_or_default();

        Ok(Video {
            id,
            title: snippet.title,
            description: snippet.description,
            tags: snippet.tags,
            category_id: snippet.category_id,
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
        })
    }
}

/// Thin wrapper over the YouTube Data API v3. Every request carries the API
/// key as the `key` query parameter.
#[derive(Debug)]
pub struct YouTubeApiClient {
    http_client: Client,
    api_key: Secret,
    api_base: String,
    upload_base: String,
    upload_timeout: Duration,
}

impl YouTubeApiClient {
    pub fn new(
        api_key: Secret,
        endpoints: &YouTubeEndpoints,
        timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
            upload_base: endpoints.upload_base.trim_end_matches('/').to_string(),
            upload_timeout,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .query(&[("key", self.api_key.expose())])
    }

    /// Starts a resumable upload session and returns the session URI.
    async fn start_resumable_upload(
        &self,
        metadata: &VideoResource,
        mime_type: &str,
        content_length: usize,
    ) -> Result<String, CoreError> {
        let url = format!("{}/videos", self.upload_base);
        let request = self
            .request(Method::POST, &url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(metadata);

        info!("Starting resumable YouTube upload ({} bytes)", content_length);
        let response = send(request, "videos.insert").await?;
        let response = ensure_success(response, "videos.insert").await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                error!("Resumable upload session came back without a Location header");
                CoreError::YouTubeApi(YouTubeApiError::UploadFailed {
                    details: "no upload session URI in response".to_string(),
                })
            })
    }

    /// `videos.insert` through the resumable protocol: one metadata request,
    /// then the whole file in a single PUT.
    pub async fn insert_video(
        &self,
        metadata: &VideoResource,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<VideoResource, CoreError> {
        let session_uri = self
            .start_resumable_upload(metadata, mime_type, bytes.len())
            .await?;
        debug!("Upload session URI obtained");

        let request = self
            .http_client
            .put(&session_uri)
            .header(CONTENT_TYPE, mime_type)
            .timeout(self.upload_timeout)
            .body(bytes);

        let response = send(request, "videos.insert upload").await?;
        let response = ensure_success(response, "videos.insert upload").await?;
        let video: VideoResource = parse_json(response, "uploaded video").await?;

        info!(
            "YouTube accepted upload as {}",
            video.id.as_deref().unwrap_or("<no id>")
        );
        Ok(video)
    }

    pub async fn delete_video(&self, video_id: &str) -> Result<(), CoreError> {
        let url = format!("{}/videos", self.api_base);
        let request = self.request(Method::DELETE, &url).query(&[("id", video_id)]);

        info!("Deleting YouTube video {}", video_id);
        let response = send(request, "videos.delete").await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!("YouTube has no video {}", video_id);
            return Err(CoreError::YouTubeApi(YouTubeApiError::VideoNotFound {
                video_id: video_id.to_string(),
            }));
        }
        ensure_success(response, "videos.delete").await?;
        Ok(())
    }

    /// One page of the `mostPopular` chart.
    pub async fn list_most_popular(
        &self,
        max_results: u32,
    ) -> Result<VideoListResponse, CoreError> {
        let url = format!("{}/videos", self.api_base);
        let max_results = max_results.to_string();
        let request = self.request(Method::GET, &url).query(&[
            ("part", "snippet"),
            ("chart", "mostPopular"),
            ("maxResults", max_results.as_str()),
        ]);

        info!("Listing most popular YouTube videos (max {})", max_results);
        let response = send(request, "videos.list").await?;
        let response = ensure_success(response, "videos.list").await?;
        let list: VideoListResponse = parse_json(response, "video list").await?;

        debug!("videos.list returned {} items", list.items.len());
        Ok(list)
    }
}

async fn send(request: RequestBuilder, operation: &str) -> Result<Response, CoreError> {
    request.send().await.map_err(|e| {
        error!("Network error during {}: {}", operation, e);
        if e.is_timeout() {
            CoreError::YouTubeApi(YouTubeApiError::RequestTimeout)
        } else {
            CoreError::Network(e)
        }
    })
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("{} succeeded with {}", operation, status);
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let api_error = classify_error(status, &body);
    error!("{} failed with {}: {}", operation, status, api_error);
    Err(CoreError::YouTubeApi(api_error))
}

/// Maps a failed response onto the error it represents, preferring the
/// machine-readable `reason` over the status code.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> YouTubeApiError {
    let parsed = serde_json::from_str::<GoogleErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let reason = parsed
        .as_ref()
        .and_then(|b| b.error.errors.first())
        .map(|detail| detail.reason.as_str())
        .unwrap_or("");

    match reason {
        "keyInvalid" | "keyExpired" => YouTubeApiError::InvalidApiKey { reason: message },
        "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded" => {
            YouTubeApiError::QuotaExceeded { reason: message }
        }
        _ if status == StatusCode::FORBIDDEN => YouTubeApiError::Forbidden { reason: message },
        _ if status.is_server_error() => YouTubeApiError::ServerError {
            status_code: status.as_u16(),
        },
        _ => YouTubeApiError::Rejected {
            status_code: status.as_u16(),
            message,
        },
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, CoreError> {
    response.json::<T>().await.map_err(|e| {
        error!("Failed to parse {}: {}", what, e);
        CoreError::YouTubeApi(YouTubeApiError::InvalidResponse {
            details: format!("Failed to parse {}", what),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn google_error(code: u16, reason: &str, message: &str) -> String {
        json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{"reason": reason, "message": message, "domain": "global"}]
            }
        })
        .to_string()
    }

    #[test]
    fn test_classify_invalid_key() {
        let body = google_error(400, "keyInvalid", "API key not valid. Please pass a valid API key.");
        match classify_error(StatusCode::BAD_REQUEST, &body) {
            YouTubeApiError::InvalidApiKey { reason } => assert!(reason.contains("API key")),
            other => panic!("Expected InvalidApiKey, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_quota_and_forbidden() {
        let body = google_error(403, "quotaExceeded", "quota");
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, &body),
            YouTubeApiError::QuotaExceeded { .. }
        ));

        let body = google_error(403, "forbidden", "not your video");
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, &body),
            YouTubeApiError::Forbidden { ref reason } if reason == "not your video"
        ));
    }

    #[test]
    fn test_classify_unstructured_bodies() {
        assert!(matches!(
            classify_error(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            YouTubeApiError::ServerError { status_code: 502 }
        ));
        match classify_error(StatusCode::BAD_REQUEST, "plain") {
            YouTubeApiError::Rejected {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(message, "plain");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_metadata_shape() {
        let metadata = VideoResource {
            id: None,
            snippet: Some(VideoSnippet {
                title: "T".to_string(),
                description: "D".to_string(),
                tags: vec!["a".to_string(), "b".to_string()],
                category_id: Some("22".to_string()),
                ..Default::default()
            }),
            status: Some(VideoStatus {
                privacy_status: "public".to_string(),
            }),
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            json!({
                "snippet": {
                    "title": "T",
                    "description": "D",
                    "tags": ["a", "b"],
                    "categoryId": "22"
                },
                "status": {"privacyStatus": "public"}
            })
        );
    }

    #[test]
    fn test_video_from_resource() {
        let resource: VideoResource = serde_json::from_value(json!({
            "kind": "youtube#video",
            "id": "vid1",
            "snippet": {
                "title": "Trending",
                "description": "desc",
                "categoryId": "10",
                "channelTitle": "Some Channel",
                "publishedAt": "2024-01-02T03:04:05Z"
            }
        }))
        .unwrap();

        let video = Video::try_from(resource).unwrap();
        assert_eq!(video.id, "vid1");
        assert_eq!(video.category_id.as_deref(), Some("10"));
        assert!(video.tags.is_empty());
        assert!(video.published_at.is_some());

        assert!(Video::try_from(VideoResource::default()).is_err());
    }
}

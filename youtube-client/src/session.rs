use crate::api::{VideoResource, VideoSnippet, VideoStatus, YouTubeApiClient};
use crudpanel_core::{AppConfig, CoreError, Video, YouTubeApiError, YouTubeCredentials};
use std::path::Path;
use tracing::{debug, info};

const PRIVACY_STATUS: &str = "public";

/// Splits a comma-separated tag list without trimming or dropping empties,
/// so `""` yields one empty tag.
pub fn split_tags(tags_csv: &str) -> Vec<String> {
    tags_csv.split(',').map(str::to_string).collect()
}

/// An API-key session. Construction never touches the network; a bad key
/// surfaces on the first call.
#[derive(Debug)]
pub struct YouTubeSession {
    api: YouTubeApiClient,
    list_cap: u32,
}

impl YouTubeSession {
    pub fn new(credentials: &YouTubeCredentials, config: &AppConfig) -> Result<Self, CoreError> {
        let api = YouTubeApiClient::new(
            credentials.api_key().clone(),
            &config.youtube,
            config.request_timeout(),
            config.upload_timeout(),
        )?;
        info!("YouTube session ready");

        Ok(Self {
            api,
            list_cap: config.youtube.list_cap,
        })
    }

    /// Uploads the file at `media_path` as a public video and returns its id.
    pub async fn upload(
        &self,
        title: &str,
        description: &str,
        tags_csv: &str,
        category_id: u32,
        media_path: &Path,
    ) -> Result<String, CoreError> {
        if title.trim().is_empty() {
            return Err(CoreError::missing_field("title"));
        }
        if !media_path.is_file() {
            return Err(CoreError::invalid_input(format!(
                "video file {} does not exist",
                media_path.display()
            )));
        }

        let mime = mime_guess::from_path(media_path).first_or_octet_stream();
        let bytes = tokio::fs::read(media_path).await?;
        debug!(
            "Read {} bytes ({}) from {}",
            bytes.len(),
            mime,
            media_path.display()
        );

        let metadata = VideoResource {
            id: None,
            snippet: Some(VideoSnippet {
                title: title.to_string(),
                description: description.to_string(),
                tags: split_tags(tags_csv),
                category_id: Some(category_id.to_string()),
                ..Default::default()
            }),
            status: Some(VideoStatus {
                privacy_status: PRIVACY_STATUS.to_string(),
            }),
        };

        let video = self
            .api
            .insert_video(&metadata, mime.essence_str(), bytes)
            .await?;
        let video_id = video.id.ok_or_else(|| {
            CoreError::YouTubeApi(YouTubeApiError::UploadFailed {
                details: "upload finished without a video id".to_string(),
            })
        })?;

        info!("Uploaded video {}", video_id);
        Ok(video_id)
    }

    pub async fn delete(&self, video_id: &str) -> Result<(), CoreError> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(CoreError::missing_field("video_id"));
        }

        self.api.delete_video(video_id).await?;
        info!("Deleted video {}", video_id);
        Ok(())
    }

    /// Lists up to `limit` videos from the global most-popular chart. This is
    /// not the caller's own uploads. Capped at one API page.
    pub async fn list(&self, limit: u32) -> Result<Vec<Video>, CoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let response = self.api.list_most_popular(limit.min(self.list_cap)).await?;
        response
            .items
            .into_iter()
            .map(Video::try_from)
            .collect()
    }
}

//! Everything the front end can ask for, one variant per form.
//!
//! Constructors check required fields so a malformed action never reaches
//! the dispatcher, let alone the network.

use crudpanel_core::{CoreError, MediaPayload, Provider};
use reddit_client::extract_post_id;

#[derive(Debug, Clone)]
pub enum Action {
    CreateTextPost {
        subreddit: String,
        title: String,
        body: String,
    },
    CreateImagePost {
        subreddit: String,
        title: String,
        image: MediaPayload,
    },
    CreateVideoPost {
        subreddit: String,
        title: String,
        video: MediaPayload,
    },
    ReadPosts {
        subreddit: String,
        username: String,
        limit: Option<usize>,
    },
    UpdatePost {
        post_id: String,
        new_title: String,
        new_body: String,
    },
    DeletePost {
        post_id: String,
    },
    UploadVideo {
        title: String,
        description: String,
        tags_csv: String,
        category_id: u32,
        video: MediaPayload,
    },
    DeleteVideo {
        video_id: String,
    },
    ListVideos {
        limit: u32,
    },
}

fn required(field: &str, value: impl Into<String>) -> Result<String, CoreError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(CoreError::missing_field(field));
    }
    Ok(value)
}

impl Action {
    pub fn create_text_post(
        subreddit: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Ok(Action::CreateTextPost {
            subreddit: required("subreddit", subreddit)?,
            title: required("title", title)?,
            body: required("body", body)?,
        })
    }

    pub fn create_image_post(
        subreddit: impl Into<String>,
        title: impl Into<String>,
        image: MediaPayload,
    ) -> Result<Self, CoreError> {
        Ok(Action::CreateImagePost {
            subreddit: required("subreddit", subreddit)?,
            title: required("title", title)?,
            image,
        })
    }

    pub fn create_video_post(
        subreddit: impl Into<String>,
        title: impl Into<String>,
        video: MediaPayload,
    ) -> Result<Self, CoreError> {
        Ok(Action::CreateVideoPost {
            subreddit: required("subreddit", subreddit)?,
            title: required("title", title)?,
            video,
        })
    }

    /// `limit = None` scans the whole listing window.
    pub fn read_posts(
        subreddit: impl Into<String>,
        username: impl Into<String>,
        limit: Option<usize>,
    ) -> Result<Self, CoreError> {
        Ok(Action::ReadPosts {
            subreddit: required("subreddit", subreddit)?,
            username: required("username", username)?,
            limit,
        })
    }

    /// The title is required but Reddit only lets the body change. Any
    /// non-empty title counts, whitespace included.
    pub fn update_post(
        post_id: impl Into<String>,
        new_title: impl Into<String>,
        new_body: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let post_id = required("post_id", post_id)?;
        let new_title = new_title.into();
        if new_title.is_empty() {
            return Err(CoreError::missing_field("new_title"));
        }
        Ok(Action::UpdatePost {
            post_id,
            new_title,
            new_body: new_body.into(),
        })
    }

    pub fn delete_post(post_id: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Action::DeletePost {
            post_id: required("post_id", post_id)?,
        })
    }

    /// Deletes the post a permalink points at.
    pub fn delete_post_by_url(url: &str) -> Result<Self, CoreError> {
        let post_id = extract_post_id(url)?;
        Ok(Action::DeletePost { post_id })
    }

    pub fn upload_video(
        title: impl Into<String>,
        description: impl Into<String>,
        tags_csv: impl Into<String>,
        category_id: u32,
        video: MediaPayload,
    ) -> Result<Self, CoreError> {
        Ok(Action::UploadVideo {
            title: required("title", title)?,
            description: description.into(),
            tags_csv: tags_csv.into(),
            category_id,
            video,
        })
    }

    pub fn delete_video(video_id: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Action::DeleteVideo {
            video_id: required("video_id", video_id)?,
        })
    }

    pub fn list_videos(limit: u32) -> Self {
        Action::ListVideos { limit }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Action::CreateTextPost { .. }
            | Action::CreateImagePost { .. }
            | Action::CreateVideoPost { .. }
            | Action::ReadPosts { .. }
            | Action::UpdatePost { .. }
            | Action::DeletePost { .. } => Provider::Reddit,
            Action::UploadVideo { .. } | Action::DeleteVideo { .. } | Action::ListVideos { .. } => {
                Provider::YouTube
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateTextPost { .. } => "create_text_post",
            Action::CreateImagePost { .. } => "create_image_post",
            Action::CreateVideoPost { .. } => "create_video_post",
            Action::ReadPosts { .. } => "read_posts",
            Action::UpdatePost { .. } => "update_post",
            Action::DeletePost { .. } => "delete_post",
            Action::UploadVideo { .. } => "upload_video",
            Action::DeleteVideo { .. } => "delete_video",
            Action::ListVideos { .. } => "list_videos",
        }
    }
}

use crate::action::Action;
use crate::staging::StagedMedia;
use crate::store::CredentialStore;
use crudpanel_core::{CoreError, PostKind, RedditPost, Video};
use reddit_client::PostContent;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Result of one successful action, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    PostCreated {
        kind: PostKind,
        post_id: Option<String>,
    },
    Posts {
        posts: Vec<RedditPost>,
    },
    PostUpdated,
    PostDeleted,
    VideoUploaded {
        video_id: String,
    },
    VideoDeleted {
        video_id: String,
    },
    Videos {
        videos: Vec<Video>,
    },
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::PostCreated {
                kind,
                post_id: Some(id),
            } => write!(f, "{} post created with ID: {}", capitalized(*kind), id),
            ActionOutcome::PostCreated {
                kind,
                post_id: None,
            } => write!(
                f,
                "{} post submitted. Reddit did not return an ID yet.",
                capitalized(*kind)
            ),
            ActionOutcome::Posts { posts } if posts.is_empty() => {
                write!(f, "No posts found for this user in this subreddit.")
            }
            ActionOutcome::Posts { posts } => {
                for post in posts {
                    writeln!(f, "Post Title: {}", post.title)?;
                    writeln!(f, "Post ID: {}", post.id)?;
                    writeln!(f, "URL: {}", post.url)?;
                    writeln!(f, "--------")?;
                }
                Ok(())
            }
            ActionOutcome::PostUpdated => write!(f, "Post updated successfully"),
            ActionOutcome::PostDeleted => write!(f, "Post deleted successfully"),
            ActionOutcome::VideoUploaded { video_id } => {
                write!(f, "Video uploaded with ID: {}", video_id)
            }
            ActionOutcome::VideoDeleted { video_id } => {
                write!(f, "Video {} deleted successfully", video_id)
            }
            ActionOutcome::Videos { videos } if videos.is_empty() => {
                write!(f, "No videos found.")
            }
            ActionOutcome::Videos { videos } => {
                for video in videos {
                    writeln!(f, "Title: {}", video.title)?;
                    writeln!(f, "Video ID: {}", video.id)?;
                    writeln!(f, "URL: {}", video.watch_url())?;
                    writeln!(f, "--------")?;
                }
                Ok(())
            }
        }
    }
}

fn capitalized(kind: PostKind) -> &'static str {
    match kind {
        PostKind::Text => "Text",
        PostKind::Image => "Image",
        PostKind::Video => "Video",
    }
}

/// Runs one action against the matching session.
///
/// Fails with `NoActiveSession` before anything else happens if the
/// provider has no session. Media payloads are staged to disk for the
/// duration of the call and removed afterwards whatever the outcome.
pub async fn execute(store: &CredentialStore, action: Action) -> Result<ActionOutcome, CoreError> {
    info!("Executing {} against {}", action.name(), action.provider());
    let staging_dir = store.config().staging_dir.as_deref();
    match action {
        Action::CreateTextPost {
            subreddit,
            title,
            body,
        } => {
            let session = store.reddit()?;
            let post_id = session
                .create_post(&subreddit, &title, PostContent::Text(&body))
                .await?;
            Ok(ActionOutcome::PostCreated {
                kind: PostKind::Text,
                post_id,
            })
        }
        Action::CreateImagePost {
            subreddit,
            title,
            image,
        } => {
            let session = store.reddit()?;
            let staged = StagedMedia::write(&image, staging_dir)?;
            let content = PostContent::Image {
                path: staged.path(),
                file_name: Some(image.file_name.as_str()),
            };
            let result = session.create_post(&subreddit, &title, content).await;
            staged.remove();
            Ok(ActionOutcome::PostCreated {
                kind: PostKind::Image,
                post_id: result?,
            })
        }
        Action::CreateVideoPost {
            subreddit,
            title,
            video,
        } => {
            let session = store.reddit()?;
            let staged = StagedMedia::write(&video, staging_dir)?;
            let content = PostContent::Video {
                path: staged.path(),
                file_name: Some(video.file_name.as_str()),
            };
            let result = session.create_post(&subreddit, &title, content).await;
            staged.remove();
            Ok(ActionOutcome::PostCreated {
                kind: PostKind::Video,
                post_id: result?,
            })
        }
        Action::ReadPosts {
            subreddit,
            username,
            limit,
        } => {
            let session = store.reddit()?;
            let posts = session.read_posts(&subreddit, &username, limit).await?;
            Ok(ActionOutcome::Posts { posts })
        }
        Action::UpdatePost {
            post_id,
            new_title,
            new_body,
        } => {
            let session = store.reddit()?;
            session.update_post(&post_id, &new_title, &new_body).await?;
            Ok(ActionOutcome::PostUpdated)
        }
        Action::DeletePost { post_id } => {
            let session = store.reddit()?;
            session.delete_post(&post_id).await?;
            Ok(ActionOutcome::PostDeleted)
        }
        Action::UploadVideo {
            title,
            description,
            tags_csv,
            category_id,
            video,
        } => {
            let session = store.youtube()?;
            let staged = StagedMedia::write(&video, staging_dir)?;
            let result = session
                .upload(&title, &description, &tags_csv, category_id, staged.path())
                .await;
            staged.remove();
            Ok(ActionOutcome::VideoUploaded { video_id: result? })
        }
        Action::DeleteVideo { video_id } => {
            let session = store.youtube()?;
            session.delete(&video_id).await?;
            Ok(ActionOutcome::VideoDeleted { video_id })
        }
        Action::ListVideos { limit } => {
            let session = store.youtube()?;
            let videos = session.list(limit).await?;
            Ok(ActionOutcome::Videos { videos })
        }
    }
}

use crate::api::RedditApiClient;
use crudpanel_core::{CoreError, PostKind};
use std::path::Path;
use tracing::debug;

/// 1x1 transparent PNG used as the poster frame for video posts.
pub(crate) const DEFAULT_VIDEO_POSTER: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub(crate) const DEFAULT_VIDEO_POSTER_NAME: &str = "video_poster.png";

/// A local file checked against the post kind it is meant for.
#[derive(Debug)]
pub struct MediaFile<'a> {
    pub path: &'a Path,
    pub file_name: String,
    pub mime_type: String,
}

impl<'a> MediaFile<'a> {
    /// Validates that `path` is a readable file whose guessed MIME type fits
    /// `kind`. Runs before any remote call.
    pub fn inspect(path: &'a Path, kind: PostKind) -> Result<Self, CoreError> {
        if !path.is_file() {
            return Err(CoreError::invalid_input(format!(
                "media file {} does not exist",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CoreError::invalid_input(format!("media path {} has no file name", path.display()))
            })?
            .to_string();

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let expected = match kind {
            PostKind::Image => mime_guess::mime::IMAGE,
            PostKind::Video => mime_guess::mime::VIDEO,
            PostKind::Text => {
                return Err(CoreError::invalid_input("text posts carry no media"));
            }
        };
        if mime.type_() != expected {
            return Err(CoreError::invalid_input(format!(
                "{} is not a {} file ({})",
                file_name, kind, mime
            )));
        }

        Ok(Self {
            path,
            file_name,
            mime_type: mime.essence_str().to_string(),
        })
    }

    /// Reports the upload to Reddit under `file_name` instead of the name on
    /// disk. The MIME type stays the one guessed from the path.
    pub fn named(mut self, file_name: Option<&str>) -> Self {
        if let Some(name) = file_name.map(str::trim).filter(|name| !name.is_empty()) {
            self.file_name = name.to_string();
        }
        self
    }
}

/// Leases an upload slot, pushes the file into it and returns the hosted URL.
pub async fn upload_media_file(
    api: &RedditApiClient,
    access_token: &str,
    media: &MediaFile<'_>,
) -> Result<String, CoreError> {
    let bytes = tokio::fs::read(media.path).await?;
    debug!("Read {} bytes from {}", bytes.len(), media.path.display());
    upload_media_bytes(api, access_token, &media.file_name, &media.mime_type, bytes).await
}

pub async fn upload_default_poster(
    api: &RedditApiClient,
    access_token: &str,
) -> Result<String, CoreError> {
    upload_media_bytes(
        api,
        access_token,
        DEFAULT_VIDEO_POSTER_NAME,
        "image/png",
        DEFAULT_VIDEO_POSTER.to_vec(),
    )
    .await
}

async fn upload_media_bytes(
    api: &RedditApiClient,
    access_token: &str,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> Result<String, CoreError> {
    let lease = api
        .request_media_lease(access_token, file_name, mime_type)
        .await?;
    api.upload_to_lease(&lease, file_name, mime_type, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file_with_suffix(suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(b"not really media").unwrap();
        file
    }

    #[test]
    fn test_inspect_image() {
        let file = temp_file_with_suffix(".png");
        let media = MediaFile::inspect(file.path(), PostKind::Image).unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert!(media.file_name.ends_with(".png"));
    }

    #[test]
    fn test_inspect_video() {
        let file = temp_file_with_suffix(".mp4");
        let media = MediaFile::inspect(file.path(), PostKind::Video).unwrap();
        assert_eq!(media.mime_type, "video/mp4");
    }

    #[test]
    fn test_inspect_rejects_kind_mismatch() {
        let file = temp_file_with_suffix(".mp4");
        assert!(MediaFile::inspect(file.path(), PostKind::Image).is_err());

        let file = temp_file_with_suffix(".txt");
        assert!(MediaFile::inspect(file.path(), PostKind::Video).is_err());
    }

    #[test]
    fn test_named_overrides_file_name() {
        let file = temp_file_with_suffix(".png");
        let media = MediaFile::inspect(file.path(), PostKind::Image)
            .unwrap()
            .named(Some("cat.png"));
        assert_eq!(media.file_name, "cat.png");
        assert_eq!(media.mime_type, "image/png");

        let media = MediaFile::inspect(file.path(), PostKind::Image)
            .unwrap()
            .named(Some("  "));
        assert!(media.file_name.ends_with(".png"));
        assert_ne!(media.file_name, "  ");
    }

    #[test]
    fn test_inspect_rejects_missing_file() {
        let result = MediaFile::inspect(Path::new("/no/such/clip.mp4"), PostKind::Video);
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
    }

    #[test]
    fn test_default_poster_is_png() {
        assert_eq!(&DEFAULT_VIDEO_POSTER[1..4], b"PNG");
    }
}

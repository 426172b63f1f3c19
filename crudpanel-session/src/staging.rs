use crudpanel_core::{CoreError, MediaPayload};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// An uploaded payload written to a temporary file for the length of one
/// provider call.
///
/// The file keeps the payload's extension so MIME detection downstream sees
/// the same type the user uploaded. Call [`remove`](StagedMedia::remove) when
/// the call is done; dropping the value deletes the file as well.
#[derive(Debug)]
pub struct StagedMedia {
    file: NamedTempFile,
}

impl StagedMedia {
    /// Writes `payload` under `dir`, or the system temp dir when `None`.
    pub fn write(payload: &MediaPayload, dir: Option<&Path>) -> Result<Self, CoreError> {
        let suffix = payload
            .extension()
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix("crudpanel-").suffix(&suffix);
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&payload.bytes)?;
        file.flush()?;

        debug!(
            "Staged {} ({} bytes) at {}",
            payload.file_name,
            payload.bytes.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the staged file. Failure is logged, not returned: the
    /// provider call's own result is what the user needs to see.
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed staged file {}", path.display()),
            Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> MediaPayload {
        MediaPayload::new(name, b"fake media bytes".to_vec()).unwrap()
    }

    #[test]
    fn test_staged_file_keeps_extension_and_bytes() {
        let staged = StagedMedia::write(&payload("Holiday.MP4"), None).unwrap();
        let path = staged.path().to_path_buf();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake media bytes");

        staged.remove();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let path = {
            let staged = StagedMedia::write(&payload("photo.png"), None).unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_payload_without_extension() {
        let staged = StagedMedia::write(&payload("README"), None).unwrap();
        assert!(staged.path().extension().is_none());
    }

    #[test]
    fn test_stages_into_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedMedia::write(&payload("photo.png"), Some(dir.path())).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));

        staged.remove();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

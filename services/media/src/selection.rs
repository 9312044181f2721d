use std::path::Path;
use tracing::{error, info};

use crate::error::CaptureError;
use crate::models::{ContentKind, MediaBlob};

pub struct FileSelector;

impl FileSelector {
    /// Load an existing file as the payload of `kind`
    ///
    /// The MIME type is guessed from the extension and must match the kind;
    /// files above `max_bytes` are refused before being read.
    pub async fn load(
        path: &Path,
        kind: ContentKind,
        max_bytes: u64,
    ) -> Result<MediaBlob, CaptureError> {
        info!("Loading {} file: {}", kind, path.display());

        let file_error = |reason: String| CaptureError::File {
            path: path.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            error!("Failed to stat {}: {}", path.display(), e);
            file_error(e.to_string())
        })?;

        if !metadata.is_file() {
            return Err(file_error("not a regular file".to_string()));
        }

        if metadata.len() > max_bytes {
            return Err(CaptureError::FileTooLarge {
                size: metadata.len(),
                limit: max_bytes,
            });
        }

        let mime = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !kind.accepts_mime(&mime) {
            return Err(CaptureError::UnsupportedFileType { mime, kind });
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| file_error(e.to_string()))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("upload.{}", kind));

        Ok(MediaBlob::new(data, mime, file_name))
    }
}

/// Scoped temp files and upload validation helpers
///
/// Uploaded bytes are staged in a local file before going anywhere
/// durable. [`TempUpload`] ties that file's lifetime to a guard value:
/// whatever path the request takes — success, Drive failure, persistence
/// failure, panic unwinding — the file is removed when the guard drops,
/// unless the caller explicitly keeps it.

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Error type for staging an upload locally
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Upload exceeds the configured size ceiling
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge {
        /// The ceiling in bytes
        limit: u64,
    },

    /// The multipart stream failed mid-read
    #[error("Failed to read upload stream: {0}")]
    Stream(String),

    /// Local file I/O failed
    #[error("Upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// MIME types accepted for video uploads
pub const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
];

/// MIME types accepted for profile pictures
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// MIME types accepted for verification documents
pub const DOCUMENT_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// A temp file removed on drop
///
/// Call [`TempUpload::keep`] to detach the file and keep it on disk
/// (profile pictures are served from the upload directory directly).
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    kept: bool,
}

impl TempUpload {
    /// Path to the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detaches the guard, leaving the file on disk
    pub fn keep(mut self) -> PathBuf {
        self.kept = true;
        self.path.clone()
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "Failed to remove temp upload: {}", e);
            }
        }
    }
}

/// Builds a collision-resistant stored file name
///
/// `{millis}-{random}-{sanitized original}`: the timestamp orders files,
/// the random component breaks same-millisecond collisions, and the
/// sanitized original name keeps uploads recognizable.
pub fn unique_file_name(original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();

    let random: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    format!("{}-{}-{}", millis, random, sanitize_file_name(original))
}

/// Strips path separators and shell-hostile characters from a file name
///
/// Keeps alphanumerics, dots, dashes, and underscores; everything else
/// becomes an underscore. An empty result falls back to "upload".
pub fn sanitize_file_name(original: &str) -> String {
    let sanitized: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches(['.', '_'].as_slice());
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether a content type is in the given allow-list
pub fn is_allowed_mime(content_type: Option<&str>, allowed: &[&str]) -> bool {
    match content_type {
        Some(ct) => allowed.iter().any(|a| ct.eq_ignore_ascii_case(a)),
        None => false,
    }
}

/// Streams a multipart field into a temp file under `dir`
///
/// Enforces `max_bytes` while streaming so an oversized upload is cut off
/// early rather than fully buffered. Returns the guard and the number of
/// bytes written. The directory is created if missing.
pub async fn stream_field_to_temp(
    field: &mut Field<'_>,
    dir: &Path,
    stored_name: &str,
    max_bytes: u64,
) -> Result<(TempUpload, u64), UploadError> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(stored_name);
    let guard = TempUpload {
        path: path.clone(),
        kept: false,
    };

    let mut file = tokio::fs::File::create(&path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| UploadError::Stream(e.to_string()))?
    {
        written += chunk.len() as u64;
        if written > max_bytes {
            // Guard removes the partial file
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok((guard, written))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("match-video.mp4"), "match-video.mp4");
        assert_eq!(
            sanitize_file_name("../../../etc/passwd"),
            "etc_passwd"
        );
        assert_eq!(sanitize_file_name("my video (1).mp4"), "my_video__1_.mp4");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("...."), "upload");
    }

    #[test]
    fn test_unique_file_name_shape() {
        let name = unique_file_name("clip.mp4");
        let parts: Vec<&str> = name.splitn(3, '-').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "clip.mp4");
    }

    #[test]
    fn test_unique_file_names_differ() {
        assert_ne!(unique_file_name("a.mp4"), unique_file_name("a.mp4"));
    }

    #[test]
    fn test_mime_allow_lists() {
        assert!(is_allowed_mime(Some("video/mp4"), VIDEO_MIME_TYPES));
        assert!(is_allowed_mime(Some("VIDEO/MP4"), VIDEO_MIME_TYPES));
        assert!(!is_allowed_mime(Some("application/pdf"), VIDEO_MIME_TYPES));
        assert!(!is_allowed_mime(None, VIDEO_MIME_TYPES));

        assert!(is_allowed_mime(Some("image/png"), IMAGE_MIME_TYPES));
        assert!(!is_allowed_mime(Some("image/gif"), IMAGE_MIME_TYPES));

        // Documents additionally accept PDF; pictures never do
        assert!(is_allowed_mime(Some("application/pdf"), DOCUMENT_MIME_TYPES));
        assert!(is_allowed_mime(Some("image/jpeg"), DOCUMENT_MIME_TYPES));
        assert!(!is_allowed_mime(Some("application/pdf"), IMAGE_MIME_TYPES));
        assert!(!is_allowed_mime(Some("video/mp4"), DOCUMENT_MIME_TYPES));
    }

    #[tokio::test]
    async fn test_guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged.bin");
        tokio::fs::write(&path, b"bytes").await.unwrap();

        {
            let _guard = TempUpload {
                path: path.clone(),
                kept: false,
            };
        }

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_keep_detaches_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.bin");
        tokio::fs::write(&path, b"bytes").await.unwrap();

        let guard = TempUpload {
            path: path.clone(),
            kept: false,
        };
        let kept_path = guard.keep();

        assert_eq!(kept_path, path);
        assert!(path.exists());
    }
}

//! Filesystem blob store for uploaded images.
//!
//! Blobs are keyed by filename under the configured uploads directory and
//! referenced from photo/user rows as `/uploads/<name>` path strings.

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Supported upload formats, detected from content, never from the client
/// filename or declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }
}

/// Sniff the image format from magic bytes. `None` means the payload is not
/// an accepted image.
pub fn detect_image(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else {
        None
    }
}

/// Write an upload under the uploads directory. Returns the filesystem path
/// of the stored blob; the caller persists the `/uploads/<name>` reference.
pub fn save_upload(uploads_dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(uploads_dir)?;
    let path = uploads_dir.join(file_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Compensating cleanup: drop a blob whose database write failed, or whose
/// owning row was deleted. Best-effort by design; a leftover file is logged,
/// not fatal.
pub fn remove_upload(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to remove blob {}: {}", path.display(), e);
    }
}

/// Resolve a `/uploads/<name>` reference back to a file under the uploads
/// directory. Rejects traversal outside the directory.
pub fn resolve_upload(uploads_dir: &Path, name: &str) -> AppResult<PathBuf> {
    let candidate = Path::new(name);
    if candidate
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
        return Err(AppError::NotFound);
    }
    Ok(uploads_dir.join(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[test]
    fn detects_known_formats() {
        assert_eq!(detect_image(JPEG_HEADER), Some(ImageFormat::Jpeg));
        assert_eq!(detect_image(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(detect_image(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(detect_image(b"GIF87a..."), Some(ImageFormat::Gif));
    }

    #[test]
    fn rejects_non_images() {
        assert_eq!(detect_image(b"<html></html>"), None);
        assert_eq!(detect_image(b""), None);
        assert_eq!(detect_image(b"GIF"), None);
    }

    #[test]
    fn save_and_remove_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("uploads");

        let path = save_upload(&dir, "a.png", PNG_HEADER).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), PNG_HEADER);

        remove_upload(&path);
        assert!(!path.exists());
    }

    #[test]
    fn resolve_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(resolve_upload(tmp.path(), "../etc/passwd").is_err());
        assert!(resolve_upload(tmp.path(), "/etc/passwd").is_err());
        assert!(resolve_upload(tmp.path(), "photo.jpg").is_ok());
    }

    #[test]
    fn resolve_allows_nested_names() {
        let tmp = tempfile::tempdir().unwrap();
        let path = resolve_upload(tmp.path(), "2024/photo.jpg").unwrap();
        assert_eq!(path, tmp.path().join("2024/photo.jpg"));
    }
}

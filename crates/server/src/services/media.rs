//! Media storage for uploaded product images.
//!
//! Files are stored under the configured products directory with
//! collision-resistant UUID names, preserving the original extension. File
//! writes and deletes are not atomic with the corresponding database rows;
//! a crash between the two can leave an orphaned file or a dangling
//! reference (accepted gap).

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::MediaConfig;

/// A file persisted by the media store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated filename on disk.
    pub filename: String,
    /// Relative URL under the media mount.
    pub url: String,
}

/// Filesystem-backed store for product images.
#[derive(Debug, Clone)]
pub struct MediaStore {
    products_dir: PathBuf,
}

impl MediaStore {
    /// Create a media store rooted at the configured products directory.
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            products_dir: config.products_dir.clone(),
        }
    }

    /// Ensure the storage directory exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.products_dir).await
    }

    /// Write uploaded bytes under a generated filename.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredFile> {
        self.ensure_dirs().await?;

        let filename = generate_filename(original_name);
        tokio::fs::write(self.products_dir.join(&filename), bytes).await?;

        Ok(StoredFile {
            url: format!("/media/products/{filename}"),
            filename,
        })
    }

    /// Remove a stored file referenced by its relative URL.
    ///
    /// Silently succeeds if the file is already gone.
    ///
    /// # Errors
    ///
    /// Returns an I/O error for failures other than the file being absent.
    pub async fn delete_by_url(&self, url: &str) -> std::io::Result<()> {
        let Some(filename) = filename_from_url(url) else {
            return Ok(());
        };
        let path = self.products_dir.join(filename);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Resolve a served filename to its on-disk path.
    ///
    /// Returns `None` for names that attempt path traversal.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.products_dir.join(filename))
    }
}

/// Generate a collision-resistant filename preserving the original extension.
fn generate_filename(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{id}.{ext}"),
        _ => id.to_string(),
    }
}

/// Extract the trailing filename from a stored relative URL.
fn filename_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Guess a content type from a filename extension.
#[must_use]
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename_preserves_extension() {
        let name = generate_filename("photo.JPG");
        assert!(name.ends_with(".JPG"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_generate_filename_without_extension() {
        let name = generate_filename("photo");
        assert_eq!(name.len(), 36);
    }

    #[test]
    fn test_generated_filenames_are_unique() {
        assert_ne!(generate_filename("a.png"), generate_filename("a.png"));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("/media/products/abc.png"),
            Some("abc.png")
        );
        assert_eq!(filename_from_url("bare.png"), Some("bare.png"));
        assert_eq!(filename_from_url("/media/products/"), None);
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let store = MediaStore {
            products_dir: PathBuf::from("media/products"),
        };
        assert!(store.path_for("../secret").is_none());
        assert!(store.path_for("a/b.png").is_none());
        assert!(store.path_for("ok.png").is_some());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("shoplite-media-{}", Uuid::new_v4()));
        let store = MediaStore {
            products_dir: dir.clone(),
        };

        let stored = store.save("pic.png", b"bytes").await.unwrap();
        assert!(stored.url.starts_with("/media/products/"));
        let path = store.path_for(&stored.filename).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"bytes");

        store.delete_by_url(&stored.url).await.unwrap();
        assert!(tokio::fs::read(&path).await.is_err());

        // Deleting again is a no-op
        store.delete_by_url(&stored.url).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}

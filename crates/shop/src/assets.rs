//! Image asset storage.
//!
//! Product images are uploaded bytes stored outside the database. The
//! store accepts png/jpg/jpeg only and hands back an opaque path string
//! that is persisted on the product row and passed back for deletion.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Extensions accepted for product images.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Errors from asset store operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The uploaded file is not a png/jpg/jpeg.
    #[error("unsupported image type (expected png, jpg or jpeg)")]
    UnsupportedType,

    /// Filesystem operation failed.
    #[error("asset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for uploaded image assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under a unique name derived from `suggested_name`.
    ///
    /// Returns the stored path, which the caller persists and later passes
    /// to [`AssetStore::delete`].
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, AssetError>;

    /// Delete a previously stored asset.
    async fn delete(&self, path: &str) -> Result<(), AssetError>;
}

/// Filesystem-backed asset store rooted at a configured upload directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, AssetError> {
        let extension = allowed_extension(suggested_name)?;

        tokio::fs::create_dir_all(&self.root).await?;

        // Uuid prefix keeps concurrent uploads of same-named files apart.
        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored image asset");

        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, path: &str) -> Result<(), AssetError> {
        tokio::fs::remove_file(path).await?;
        tracing::debug!(path, "deleted image asset");
        Ok(())
    }
}

/// Extract and check the lowercase file extension.
fn allowed_extension(name: &str) -> Result<String, AssetError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or(AssetError::UnsupportedType)?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(AssetError::UnsupportedType)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(allowed_extension("photo.png").unwrap(), "png");
        assert_eq!(allowed_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(allowed_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(matches!(
            allowed_extension("script.exe"),
            Err(AssetError::UnsupportedType)
        ));
        assert!(matches!(
            allowed_extension("no-extension"),
            Err(AssetError::UnsupportedType)
        ));
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path());

        let path = store.save(b"fake-png-bytes", "upload.png").await.unwrap();
        assert!(path.ends_with(".png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake-png-bytes");

        store.delete(&path).await.unwrap();
        assert!(tokio::fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_save_rejects_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path());
        let err = store.save(b"data", "notes.txt").await.unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedType));
    }

    #[tokio::test]
    async fn test_saved_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path());
        let first = store.save(b"a", "same.png").await.unwrap();
        let second = store.save(b"b", "same.png").await.unwrap();
        assert_ne!(first, second);
    }
}

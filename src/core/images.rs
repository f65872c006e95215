//! Image blob storage.
//!
//! Uploaded images live as individual files in one directory, named
//! `<uuid>-<original name>` so uploads never collide. Records refer to
//! them by public reference (`<url prefix>/<file name>`).

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::error::CatalogError;

/// Default public prefix for stored images
pub const DEFAULT_URL_PREFIX: &str = "/public/images";

/// Reference used when a video is created without an image
pub const DEFAULT_PLACEHOLDER: &str = "/public/images/Upload-video-preview.jpg";

/// An image already saved into the images directory, awaiting dedup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Where the uploader saved the blob
    pub path: PathBuf,

    /// File name as supplied by the client
    pub original_name: String,
}

/// Location and addressing of stored images
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
    placeholder: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Reference for videos without an image
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Save an uploaded blob under a collision-free name
    pub async fn stage(&self, bytes: &[u8], original_name: &str) -> Result<ImageUpload, CatalogError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CatalogError::io(&self.dir, e))?;

        let path = self.dir.join(format!(
            "{}-{}",
            Uuid::new_v4(),
            sanitize_file_name(original_name)
        ));

        fs::write(&path, bytes)
            .await
            .map_err(|e| CatalogError::io(&path, e))?;

        debug!(path = %path.display(), size = bytes.len(), "Staged image");

        Ok(ImageUpload {
            path,
            original_name: original_name.to_string(),
        })
    }

    /// Copy a file from elsewhere on disk into the images directory
    pub async fn stage_file(&self, source: &Path) -> Result<ImageUpload, CatalogError> {
        let bytes = fs::read(source)
            .await
            .map_err(|e| CatalogError::io(source, e))?;

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.stage(&bytes, &name).await
    }

    /// Public reference for a file in the images directory
    pub fn reference_for(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}/{}", self.url_prefix, name)
    }

    /// Map a public reference back to its file, if it points into this store
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = reference
            .strip_prefix(self.url_prefix.as_str())?
            .strip_prefix('/')?;

        if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
            return None;
        }

        Some(self.dir.join(name))
    }
}

/// Keep only the final path component and replace anything unusual
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("cat.jpg"), "cat.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name(""), "image");
        assert_eq!(sanitize_file_name(".."), "image");
    }

    #[test]
    fn test_reference_round_trip() {
        let store = ImageStore::new("/srv/images").with_url_prefix("/static/img/");
        let reference = store.reference_for(Path::new("/srv/images/abc-cat.jpg"));

        assert_eq!(reference, "/static/img/abc-cat.jpg");
        assert_eq!(
            store.resolve(&reference),
            Some(PathBuf::from("/srv/images/abc-cat.jpg"))
        );
    }

    #[test]
    fn test_resolve_rejects_foreign_references() {
        let store = ImageStore::new("/srv/images");

        assert_eq!(store.resolve("https://cdn.example/cat.jpg"), None);
        assert_eq!(store.resolve("/public/images/"), None);
        assert_eq!(store.resolve("/public/images/../secret"), None);
        assert_eq!(store.resolve("/public/imagesX/cat.jpg"), None);
    }

    #[tokio::test]
    async fn test_stage_uses_unique_names() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path().join("images"));

        let a = store.stage(b"pixels", "thumb.jpg").await.unwrap();
        let b = store.stage(b"pixels", "thumb.jpg").await.unwrap();

        assert_ne!(a.path, b.path);
        assert!(a.path.exists());
        assert!(a
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-thumb.jpg"));
        assert_eq!(a.original_name, "thumb.jpg");
    }
}

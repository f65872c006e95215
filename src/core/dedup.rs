//! Image deduplication by content digest.
//!
//! A new upload whose digest matches an existing record reuses that
//! record's image reference and the staged copy is removed. Removal is
//! best-effort and sits outside the catalog transaction: a leaked file is
//! harmless, only the digest-to-image relation must hold.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::Catalog;

use super::error::CatalogError;
use super::hasher::{hash_file, ContentDigest};
use super::images::{ImageStore, ImageUpload};

/// Outcome of deduplicating an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResolution {
    /// No match: the staged file becomes the canonical copy
    Stored { image: String, digest: ContentDigest },

    /// Matched an existing record; `discard` is the redundant staged file
    Reused {
        image: String,
        digest: ContentDigest,
        discard: PathBuf,
    },

    /// No image was uploaded
    Placeholder { image: String },
}

impl ImageResolution {
    /// Image reference to store on the record
    pub fn image(&self) -> &str {
        match self {
            Self::Stored { image, .. }
            | Self::Reused { image, .. }
            | Self::Placeholder { image } => image,
        }
    }

    pub fn digest(&self) -> Option<&ContentDigest> {
        match self {
            Self::Stored { digest, .. } | Self::Reused { digest, .. } => Some(digest),
            Self::Placeholder { .. } => None,
        }
    }

    /// File to reclaim after commit, if any
    pub fn discarded(&self) -> Option<&Path> {
        match self {
            Self::Reused { discard, .. } => Some(discard),
            _ => None,
        }
    }
}

/// Decides whether an upload duplicates a stored image
#[derive(Debug, Clone)]
pub struct ImageDeduplicator {
    images: ImageStore,
}

impl ImageDeduplicator {
    pub fn new(images: ImageStore) -> Self {
        Self { images }
    }

    /// Digest the staged file. I/O failures propagate as storage errors.
    pub async fn digest(&self, upload: &ImageUpload) -> Result<ContentDigest, CatalogError> {
        hash_file(&upload.path).await
    }

    /// Resolve the image for a new record against the current catalog.
    ///
    /// Must be called on the catalog snapshot of the same transaction that
    /// will insert the record.
    pub fn resolve(
        &self,
        catalog: &Catalog,
        upload: Option<(&ImageUpload, ContentDigest)>,
    ) -> ImageResolution {
        let Some((upload, digest)) = upload else {
            return ImageResolution::Placeholder {
                image: self.images.placeholder().to_string(),
            };
        };

        let staged_ref = self.images.reference_for(&upload.path);

        match catalog.find_by_image_hash(&digest) {
            Some(existing) if existing.image != staged_ref => {
                debug!(
                    digest = %digest,
                    video_id = %existing.id,
                    "Upload duplicates an existing image"
                );
                ImageResolution::Reused {
                    image: existing.image.clone(),
                    digest,
                    discard: upload.path.clone(),
                }
            }
            _ => ImageResolution::Stored {
                image: staged_ref,
                digest,
            },
        }
    }

    /// Remove the redundant staged file. Never fails; returns whether a file was removed.
    pub async fn reclaim(&self, resolution: &ImageResolution) -> bool {
        let Some(path) = resolution.discarded() else {
            return false;
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Reclaimed duplicate image");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove duplicate image");
                false
            }
        }
    }
}

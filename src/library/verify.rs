//! Integrity check of stored images against their recorded digests.
//!
//! Read-only: reports problems, never repairs them.

use std::collections::HashMap;

use crate::core::{hash_file, CatalogError, CatalogStore, ContentDigest, ImageStore};

/// A single integrity problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageProblem {
    /// Canonical image file does not exist
    Missing { video_id: String, image: String },

    /// Reference does not point into the images directory
    Unresolvable { video_id: String, image: String },

    /// File content no longer matches the recorded digest
    DigestMismatch {
        video_id: String,
        image: String,
        expected: ContentDigest,
        actual: ContentDigest,
    },

    /// A duplicate record does not share its canonical record's image
    DivergentReference {
        video_id: String,
        image: String,
        canonical: String,
    },
}

impl std::fmt::Display for ImageProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { video_id, image } => {
                write!(f, "{}: image file missing ({})", video_id, image)
            }
            Self::Unresolvable { video_id, image } => {
                write!(f, "{}: image reference outside image store ({})", video_id, image)
            }
            Self::DigestMismatch {
                video_id,
                image,
                expected,
                actual,
            } => write!(
                f,
                "{}: digest mismatch for {} (recorded {}, found {})",
                video_id, image, expected, actual
            ),
            Self::DivergentReference {
                video_id,
                image,
                canonical,
            } => write!(
                f,
                "{}: references {} but canonical image is {}",
                video_id, image, canonical
            ),
        }
    }
}

/// Result of an integrity check
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Number of distinct digests checked
    pub checked: usize,
    pub problems: Vec<ImageProblem>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    /// Turn a report with problems into a storage error
    pub fn ensure_clean(&self) -> Result<(), CatalogError> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(CatalogError::IntegrityCheckFailed {
                problems: self.problems.len(),
            })
        }
    }
}

/// Re-hash each canonical image and check duplicates point at it
pub async fn verify_images(
    store: &CatalogStore,
    images: &ImageStore,
) -> Result<VerifyReport, CatalogError> {
    let catalog = store.load().await?;
    let mut report = VerifyReport::default();
    let mut canonical: HashMap<&ContentDigest, &str> = HashMap::new();

    for video in catalog.videos() {
        let Some(digest) = video.image_hash.as_ref() else {
            continue;
        };

        if let Some(image) = canonical.get(digest) {
            if video.image != *image {
                report.problems.push(ImageProblem::DivergentReference {
                    video_id: video.id.clone(),
                    image: video.image.clone(),
                    canonical: image.to_string(),
                });
            }
            continue;
        }
        canonical.insert(digest, &video.image);
        report.checked += 1;

        let Some(path) = images.resolve(&video.image) else {
            report.problems.push(ImageProblem::Unresolvable {
                video_id: video.id.clone(),
                image: video.image.clone(),
            });
            continue;
        };

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| CatalogError::io(&path, e))?
        {
            report.problems.push(ImageProblem::Missing {
                video_id: video.id.clone(),
                image: video.image.clone(),
            });
            continue;
        }

        let actual = hash_file(&path).await?;
        if &actual != digest {
            report.problems.push(ImageProblem::DigestMismatch {
                video_id: video.id.clone(),
                image: video.image.clone(),
                expected: digest.clone(),
                actual,
            });
        }
    }

    Ok(report)
}

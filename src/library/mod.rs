//! Catalog operations exposed to the routing layer.
//!
//! Every manager shares one [`CatalogStore`], so all mutations of the
//! document are serialized through the same writer locks.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.vidcat/
//! ├── videos.json               # The catalog: JSON array of videos
//! ├── videos.json.lock          # Advisory writer lock
//! └── images/
//!     └── <uuid>-<name>.jpg     # One file per distinct image
//! ```

pub mod comments;
pub mod counters;
pub mod verify;
pub mod videos;

use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::core::{CatalogError, CatalogStore, ImageDeduplicator, ImageStore};

pub use comments::CommentManager;
pub use counters::CounterUpdater;
pub use verify::{verify_images, ImageProblem, VerifyReport};
pub use videos::VideoManager;

/// The managers over one shared store
#[derive(Debug, Clone)]
pub struct Library {
    store: Arc<CatalogStore>,
    images: ImageStore,
    videos: VideoManager,
    comments: CommentManager,
    counters: CounterUpdater,
}

impl Library {
    pub fn new(store: CatalogStore, images: ImageStore) -> Self {
        let store = Arc::new(store);
        Self {
            videos: VideoManager::new(store.clone(), ImageDeduplicator::new(images.clone())),
            comments: CommentManager::new(store.clone()),
            counters: CounterUpdater::new(store.clone()),
            store,
            images,
        }
    }

    /// Build from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let store = CatalogStore::new(&config.catalog).with_lock_timeout(config.lock_timeout);
        let images = ImageStore::new(&config.images)
            .with_url_prefix(config.image_url_prefix.clone())
            .with_placeholder(config.default_image.clone());
        Self::new(store, images)
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn videos(&self) -> &VideoManager {
        &self.videos
    }

    pub fn comments(&self) -> &CommentManager {
        &self.comments
    }

    pub fn counters(&self) -> &CounterUpdater {
        &self.counters
    }

    /// Check stored images against their digests
    pub async fn verify(&self) -> Result<VerifyReport, CatalogError> {
        verify_images(&self.store, &self.images).await
    }
}

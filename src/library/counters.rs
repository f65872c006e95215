//! Counter updater: likes on a video.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::core::{CatalogError, CatalogStore};
use crate::domain::{format_display_count, parse_display_count};

#[derive(Debug, Clone)]
pub struct CounterUpdater {
    store: Arc<CatalogStore>,
}

impl CounterUpdater {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    /// Add one like and return the new display value.
    ///
    /// Absent or unparsable counts start from 0.
    #[instrument(skip(self))]
    pub async fn increment_likes(&self, video_id: &str) -> Result<String, CatalogError> {
        let likes = self
            .store
            .mutate(|catalog| {
                let video = catalog
                    .get_mut(video_id)
                    .ok_or_else(|| CatalogError::VideoNotFound(video_id.to_string()))?;

                let base = match video.likes.as_deref() {
                    None => 0,
                    Some(raw) => parse_display_count(raw).unwrap_or_else(|| {
                        warn!(likes = raw, "Unparsable likes count, counting from 0");
                        0
                    }),
                };

                let next = format_display_count(base.saturating_add(1));
                video.likes = Some(next.clone());
                Ok(next)
            })
            .await?;

        info!(%likes, "Likes incremented");
        Ok(likes)
    }
}

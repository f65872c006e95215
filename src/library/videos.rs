//! Video manager: list, fetch and create video records.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::core::{CatalogError, CatalogStore, ImageDeduplicator, ImageResolution, ImageUpload};
use crate::domain::{
    format_display_count, generate_id, now_millis, parse_comment_import, parse_display_count,
    Catalog, Comment, NewVideo, Video, VideoSummary,
};

/// CRUD over video records
#[derive(Debug, Clone)]
pub struct VideoManager {
    store: Arc<CatalogStore>,
    dedup: ImageDeduplicator,
}

impl VideoManager {
    pub fn new(store: Arc<CatalogStore>, dedup: ImageDeduplicator) -> Self {
        Self { store, dedup }
    }

    /// All videos, summary view
    pub async fn list(&self) -> Result<Vec<VideoSummary>, CatalogError> {
        Ok(self.store.load().await?.summaries())
    }

    /// Full record for one video
    pub async fn get(&self, id: &str) -> Result<Video, CatalogError> {
        self.store
            .load()
            .await?
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::VideoNotFound(id.to_string()))
    }

    /// Create a video.
    ///
    /// Input is validated and the image digested before the catalog is
    /// locked. The duplicate check, title numbering and id draw all run on
    /// the snapshot of the same transaction that inserts the record.
    #[instrument(skip(self, input), fields(title = ?input.title))]
    pub async fn create(&self, input: NewVideo) -> Result<Video, CatalogError> {
        let draft = VideoDraft::validate(input, now_millis())?;

        let digest = match &draft.image {
            Some(upload) => Some(self.dedup.digest(upload).await?),
            None => None,
        };

        let mut txn = self.store.begin().await?;
        let resolution = self
            .dedup
            .resolve(txn.catalog(), draft.image.as_ref().zip(digest));
        let video = draft.into_video(txn.catalog(), &resolution);

        txn.catalog_mut().push(video.clone());
        txn.commit().await?;

        // Still under the writer locks
        self.dedup.reclaim(&resolution).await;
        drop(txn);

        info!(
            video_id = %video.id,
            title = %video.title,
            image = %video.image,
            deduplicated = resolution.discarded().is_some(),
            "Video created"
        );

        Ok(video)
    }
}

/// Validated create input, not yet bound to a catalog snapshot
struct VideoDraft {
    title: Option<String>,
    description: Option<String>,
    channel: Option<String>,
    duration: Option<String>,
    media_url: Option<String>,
    image: Option<ImageUpload>,
    views: String,
    likes: String,
    timestamp: i64,
    comments: Vec<Comment>,
}

impl VideoDraft {
    fn validate(input: NewVideo, now: i64) -> Result<Self, CatalogError> {
        let comments = match input.comments.as_deref() {
            Some(json) if !json.trim().is_empty() => parse_comment_import(json, now)?,
            _ => Vec::new(),
        };

        let timestamp = match input.timestamp {
            Some(ts) if ts < 0 => {
                return Err(CatalogError::BadInput(format!(
                    "timestamp must not be negative: {}",
                    ts
                )))
            }
            Some(ts) => ts,
            None => now,
        };

        Ok(Self {
            title: input.title.filter(|t| !t.trim().is_empty()),
            description: input.description,
            channel: input.channel,
            duration: input.duration,
            media_url: input.media_url,
            image: input.image,
            views: normalize_count("views", input.views)?,
            likes: normalize_count("likes", input.likes)?,
            timestamp,
            comments,
        })
    }

    fn into_video(self, catalog: &Catalog, resolution: &ImageResolution) -> Video {
        let title = self
            .title
            .unwrap_or_else(|| catalog.next_untitled_title());

        Video {
            id: generate_id(|candidate| catalog.contains_id(candidate)),
            title,
            description: self.description,
            channel: self.channel,
            duration: self.duration,
            media_url: self.media_url,
            image: resolution.image().to_string(),
            image_hash: resolution.digest().cloned(),
            views: Some(self.views),
            likes: Some(self.likes),
            timestamp: self.timestamp,
            comments: self.comments,
            extra: Default::default(),
        }
    }
}

/// Explicit counts must parse; absent ones start at zero
fn normalize_count(field: &str, raw: Option<String>) -> Result<String, CatalogError> {
    match raw {
        None => Ok(format_display_count(0)),
        Some(raw) => parse_display_count(&raw)
            .map(format_display_count)
            .ok_or_else(|| CatalogError::BadInput(format!("{} is not a count: {:?}", field, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_count() {
        assert_eq!(normalize_count("likes", None).unwrap(), "0");
        assert_eq!(
            normalize_count("likes", Some("12345".to_string())).unwrap(),
            "12,345"
        );
        assert!(matches!(
            normalize_count("views", Some("lots".to_string())),
            Err(CatalogError::BadInput(_))
        ));
    }

    #[test]
    fn test_blank_title_counts_as_absent() {
        let draft = VideoDraft::validate(NewVideo::new().with_title("   "), 1).unwrap();
        assert!(draft.title.is_none());
        assert_eq!(draft.timestamp, 1);
    }

    #[test]
    fn test_bad_comments_json_rejected() {
        let input = NewVideo::new().with_comments_json("not json");
        assert!(matches!(
            VideoDraft::validate(input, 0),
            Err(CatalogError::BadInput(_))
        ));
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        let input = NewVideo {
            timestamp: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            VideoDraft::validate(input, 0),
            Err(CatalogError::BadInput(_))
        ));
    }
}

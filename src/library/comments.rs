//! Comment manager: comments nested inside a video.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::core::{CatalogError, CatalogStore};
use crate::domain::{generate_id, now_millis, Comment, NewComment};

/// Add, list and delete comments on a video
#[derive(Debug, Clone)]
pub struct CommentManager {
    store: Arc<CatalogStore>,
}

impl CommentManager {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    /// Comments of a video in display order
    pub async fn list(&self, video_id: &str) -> Result<Vec<Comment>, CatalogError> {
        self.store
            .load()
            .await?
            .get(video_id)
            .map(|v| v.comments.clone())
            .ok_or_else(|| CatalogError::VideoNotFound(video_id.to_string()))
    }

    /// Append a comment to a video
    #[instrument(skip(self, input))]
    pub async fn add(&self, video_id: &str, input: NewComment) -> Result<Comment, CatalogError> {
        let (name, text) = input.validate()?;
        let timestamp = now_millis();

        let comment = self
            .store
            .mutate(|catalog| {
                let video = catalog
                    .get_mut(video_id)
                    .ok_or_else(|| CatalogError::VideoNotFound(video_id.to_string()))?;

                let id = generate_id(|candidate| video.has_comment(candidate));
                let comment = Comment::new(id, name, text, timestamp);
                video.comments.push(comment.clone());
                Ok(comment)
            })
            .await?;

        info!(comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Remove a comment by id, keeping the order of the rest
    #[instrument(skip(self))]
    pub async fn delete(&self, video_id: &str, comment_id: &str) -> Result<Comment, CatalogError> {
        let removed = self
            .store
            .mutate(|catalog| {
                let video = catalog
                    .get_mut(video_id)
                    .ok_or_else(|| CatalogError::VideoNotFound(video_id.to_string()))?;

                let pos = video
                    .comments
                    .iter()
                    .position(|c| c.id == comment_id)
                    .ok_or_else(|| CatalogError::CommentNotFound {
                        video_id: video_id.to_string(),
                        comment_id: comment_id.to_string(),
                    })?;

                Ok(video.comments.remove(pos))
            })
            .await?;

        info!("Comment deleted");
        Ok(removed)
    }
}

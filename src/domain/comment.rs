//! Comments nested inside a video record.
//!
//! Comments have no lifecycle of their own: they are created, listed and
//! deleted only through their parent video, and are addressed by id rather
//! than position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::CatalogError;

use super::generate_id;

/// Author name used when none is supplied
pub const ANONYMOUS: &str = "Anonymous";

/// A single comment on a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique within the parent video
    pub id: String,

    /// Author display name
    #[serde(default = "default_name")]
    pub name: String,

    /// Comment body
    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub likes: u64,

    /// Creation time (epoch milliseconds)
    #[serde(default)]
    pub timestamp: i64,
}

fn default_name() -> String {
    ANONYMOUS.to_string()
}

impl Comment {
    /// Create a fresh comment with zero likes
    pub fn new(id: String, name: Option<String>, comment: String, timestamp: i64) -> Self {
        Self {
            id,
            name: name.unwrap_or_else(default_name),
            comment,
            likes: 0,
            timestamp,
        }
    }
}

/// Input for adding a comment
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    /// Author name (defaults to "Anonymous")
    pub name: Option<String>,

    /// Comment body (required, non-blank)
    pub comment: String,
}

impl NewComment {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            name: None,
            comment: comment.into(),
        }
    }

    /// Set the author name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the input and normalize the author name.
    ///
    /// Returns `(name, body)` ready to be stored.
    pub fn validate(self) -> Result<(Option<String>, String), CatalogError> {
        if self.comment.trim().is_empty() {
            return Err(CatalogError::BadInput(
                "comment text must not be empty".to_string(),
            ));
        }

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok((name, self.comment))
    }
}

/// Shape of comments supplied as JSON when importing a video.
///
/// Missing ids, likes and timestamps are filled in on import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentImport {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "text")]
    pub comment: String,
    pub likes: Option<u64>,
    pub timestamp: Option<i64>,
}

/// Parse an embedded JSON comment list into stored comments.
///
/// Fails with `BadInput` when the JSON is malformed or two comments share an id.
pub fn parse_comment_import(json: &str, now: i64) -> Result<Vec<Comment>, CatalogError> {
    let imports: Vec<CommentImport> = serde_json::from_str(json)
        .map_err(|e| CatalogError::BadInput(format!("comments are not a valid JSON list: {}", e)))?;

    let mut seen: HashSet<String> = imports.iter().filter_map(|c| c.id.clone()).collect();
    let explicit = imports.iter().filter(|c| c.id.is_some()).count();
    if seen.len() != explicit {
        return Err(CatalogError::BadInput(
            "comments contain duplicate ids".to_string(),
        ));
    }

    let comments = imports
        .into_iter()
        .map(|import| {
            let id = import.id.unwrap_or_else(|| {
                let id = generate_id(|candidate| seen.contains(candidate));
                seen.insert(id.clone());
                id
            });

            Comment {
                id,
                name: import
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(default_name),
                comment: import.comment,
                likes: import.likes.unwrap_or(0),
                timestamp: import.timestamp.unwrap_or(now),
            }
        })
        .collect();

    Ok(comments)
}

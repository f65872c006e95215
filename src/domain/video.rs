//! Video records and the catalog document that holds them.
//!
//! The catalog serializes as a bare JSON array of videos. Fields the
//! catalog does not know about are kept in `extra` so rewriting the
//! document never drops data written by other tools.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{ContentDigest, ImageUpload};

use super::comment::Comment;

/// Title prefix for videos created without a title
pub const UNTITLED_PREFIX: &str = "Untitled_Video_";

/// A video record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Server-generated, immutable
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Public reference to the stored display image
    #[serde(default)]
    pub image: String,

    /// Digest of the image, `null` when the placeholder is used
    #[serde(default)]
    pub image_hash: Option<ContentDigest>,

    /// Display count, e.g. "12,345"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,

    /// Display count, e.g. "1,000"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,

    /// Creation time (epoch milliseconds)
    #[serde(default)]
    pub timestamp: i64,

    /// Display order = insertion order
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Unrecognized fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Video {
    /// Project to the list view
    pub fn summary(&self) -> VideoSummary {
        VideoSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            channel: self.channel.clone(),
            image: self.image.clone(),
            views: self.views.clone(),
            likes: self.likes.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Check whether a comment id is already used on this video
    pub fn has_comment(&self, comment_id: &str) -> bool {
        self.comments.iter().any(|c| c.id == comment_id)
    }
}

/// List projection of a video (no description or comments)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
    pub timestamp: i64,
}

/// Input for creating a video.
///
/// Everything is optional. `views`, `likes`, `timestamp` and `comments`
/// exist for import scenarios; `comments` is a JSON list as received from
/// the upload form.
#[derive(Debug, Clone, Default)]
pub struct NewVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<String>,
    pub media_url: Option<String>,

    /// Image already saved to the images directory by the uploader
    pub image: Option<ImageUpload>,

    pub views: Option<String>,
    pub likes: Option<String>,
    pub timestamp: Option<i64>,
    pub comments: Option<String>,
}

impl NewVideo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_likes(mut self, likes: impl Into<String>) -> Self {
        self.likes = Some(likes.into());
        self
    }

    pub fn with_comments_json(mut self, json: impl Into<String>) -> Self {
        self.comments = Some(json.into());
        self
    }
}

/// The whole persisted catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    videos: Vec<Video>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_videos(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    /// All videos in document order
    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    /// Get a video by ID
    pub fn get(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Video> {
        self.videos.iter_mut().find(|v| v.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a video (caller guarantees the id is fresh)
    pub fn push(&mut self, video: Video) {
        self.videos.push(video);
    }

    /// First (canonical) video whose image has this digest
    pub fn find_by_image_hash(&self, digest: &ContentDigest) -> Option<&Video> {
        self.videos
            .iter()
            .find(|v| v.image_hash.as_ref() == Some(digest))
    }

    /// Next free `Untitled_Video_NN` title (max existing NN + 1, at least two digits)
    pub fn next_untitled_title(&self) -> String {
        let highest = self
            .videos
            .iter()
            .filter_map(|v| untitled_number(&v.title))
            .max()
            .unwrap_or(0);

        format!("{}{:02}", UNTITLED_PREFIX, highest.saturating_add(1))
    }

    /// Summary view of every video
    pub fn summaries(&self) -> Vec<VideoSummary> {
        self.videos.iter().map(Video::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

fn untitled_number(title: &str) -> Option<u64> {
    let digits = title.strip_prefix(UNTITLED_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

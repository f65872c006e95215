//! Domain types for the video catalog.
//!
//! This module contains the persisted data structures:
//! - Video: A catalog record and its summary projection
//! - Comment: Sub-resources nested inside a video
//! - Counter: Locale-grouped display counts (views, likes)

pub mod comment;
pub mod counter;
pub mod video;

use chrono::Utc;
use uuid::Uuid;

// Re-export commonly used types
pub use comment::{parse_comment_import, Comment, CommentImport, NewComment, ANONYMOUS};
pub use counter::{format_display_count, parse_display_count};
pub use video::{Catalog, NewVideo, Video, VideoSummary, UNTITLED_PREFIX};

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Draw a fresh UUID v4 string that `is_taken` does not already claim.
pub fn generate_id<F>(is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let id = Uuid::new_v4().to_string();
        if !is_taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_skips_taken() {
        let first = generate_id(|_| false);
        let second = generate_id(|candidate| candidate == first);

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&second).is_ok());
    }
}

//! vidcat - Video catalog backed by a single JSON document
//!
//! Stores video records with nested comments in one persisted document
//! and deduplicates uploaded images by content digest.
//!
//! # Architecture
//!
//! The catalog document is the whole state:
//! - Every mutation is a transaction: lock, read, mutate, persist, unlock
//! - Persisting replaces the document atomically, readers never see a partial write
//! - Images are content-addressed: byte-identical uploads share one stored file
//!
//! # Modules
//!
//! - `core`: Persistence and content addressing (CatalogStore, hashing, dedup)
//! - `domain`: Data structures (Video, Comment, display counters)
//! - `library`: Operations (VideoManager, CommentManager, CounterUpdater)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create a video with a display image
//! vidcat create --title "Trip" --image ./thumb.jpg
//!
//! # Comment on it and like it
//! vidcat comment add <video-id> "Nice!" --name Sam
//! vidcat like <video-id>
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use crate::core::{CatalogError, CatalogStore, ContentDigest, ErrorKind, ImageStore, ImageUpload};
pub use crate::domain::{Catalog, Comment, NewComment, NewVideo, Video, VideoSummary};
pub use crate::library::{CommentManager, CounterUpdater, Library, VideoManager};

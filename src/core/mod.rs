//! Persistence and content addressing.
//!
//! This module contains:
//! - CatalogStore: Atomic load/mutate/save of the catalog document
//! - Hasher: SHA-256 content digests
//! - ImageStore: Where image blobs live and how records refer to them
//! - ImageDeduplicator: Reuse of byte-identical images

pub mod dedup;
pub mod error;
pub mod hasher;
pub mod images;
pub mod store;

// Re-export commonly used types
pub use dedup::{ImageDeduplicator, ImageResolution};
pub use error::{CatalogError, ErrorKind};
pub use hasher::{hash_bytes, hash_file, ContentDigest};
pub use images::{ImageStore, ImageUpload};
pub use store::{CatalogStore, CatalogTxn, DEFAULT_LOCK_TIMEOUT};

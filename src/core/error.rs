//! Error taxonomy for catalog operations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors returned by the catalog store and managers
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Comment {comment_id} not found on video {video_id}")]
    CommentNotFound {
        video_id: String,
        comment_id: String,
    },

    #[error("Bad input: {0}")]
    BadInput(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog document is unreadable: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timed out after {waited:?} waiting for catalog lock {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Image integrity check found {problems} problem(s)")]
    IntegrityCheckFailed { problems: usize },
}

/// How the caller should treat a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced video or comment does not exist
    NotFound,

    /// Malformed client payload, nothing was mutated
    BadInput,

    /// Read/write/hash failure of the underlying storage
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::BadInput => write!(f, "bad-input"),
            ErrorKind::Storage => write!(f, "storage-error"),
        }
    }
}

impl CatalogError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VideoNotFound(_) | Self::CommentNotFound { .. } => ErrorKind::NotFound,
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::Io { .. }
            | Self::Serialization(_)
            | Self::LockTimeout { .. }
            | Self::Task(_)
            | Self::IntegrityCheckFailed { .. } => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

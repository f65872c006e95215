//! Content hashing for uploaded blobs.
//!
//! Digests are full SHA-256, hex-encoded (64 chars). Files are streamed in
//! fixed-size chunks so large uploads are never held in memory.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::error::CatalogError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 of a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest an in-memory blob
pub fn hash_bytes(bytes: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentDigest::from_hasher(hasher)
}

/// Digest a file by streaming its contents
pub async fn hash_file(path: &Path) -> Result<ContentDigest, CatalogError> {
    let mut file = File::open(path)
        .await
        .map_err(|e| CatalogError::io(path, e))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| CatalogError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(ContentDigest::from_hasher(hasher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_bytes_consistency() {
        let a = hash_bytes(b"frame data");
        let b = hash_bytes(b"frame data");
        let c = hash_bytes(b"other data");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_bytes(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_hash_file_matches_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.bin");

        // Spans several chunks
        let content: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(&path, &content).await.unwrap();

        assert_eq!(hash_file(&path).await.unwrap(), hash_bytes(&content));
    }

    #[tokio::test]
    async fn test_hash_missing_file_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let err = hash_file(&temp.path().join("nope.jpg")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}

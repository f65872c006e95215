//! Counter Updater Integration Tests
//!
//! Tests for incrementing the display-formatted like counter.

use std::sync::Arc;

use tempfile::TempDir;
use vidcat::{Catalog, CatalogStore, ErrorKind, ImageStore, Library, NewVideo};

fn create_test_library() -> (Library, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = CatalogStore::new(temp.path().join("videos.json"));
    let images = ImageStore::new(temp.path().join("images"));
    (Library::new(store, images), temp)
}

/// Write a raw document so tests can start from arbitrary stored values
fn seed(temp: &TempDir, json: serde_json::Value) {
    let catalog: Catalog = serde_json::from_value(json).unwrap();
    std::fs::write(
        temp.path().join("videos.json"),
        serde_json::to_vec_pretty(&catalog).unwrap(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_increment_crosses_thousands() {
    let (library, _temp) = create_test_library();
    let video = library
        .videos()
        .create(NewVideo::new().with_likes("999"))
        .await
        .unwrap();

    let likes = library.counters().increment_likes(&video.id).await.unwrap();
    assert_eq!(likes, "1,000");

    let stored = library.videos().get(&video.id).await.unwrap();
    assert_eq!(stored.likes.as_deref(), Some("1,000"));
}

#[tokio::test]
async fn test_increment_grouped_value() {
    let (library, temp) = create_test_library();
    seed(&temp, serde_json::json!([{"id": "v1", "likes": "12,345"}]));

    let likes = library.counters().increment_likes("v1").await.unwrap();
    assert_eq!(likes, "12,346");
}

#[tokio::test]
async fn test_increment_saturates_past_u64_max() {
    let (library, temp) = create_test_library();
    seed(
        &temp,
        serde_json::json!([{"id": "v1", "likes": "18,446,744,073,709,551,616"}]),
    );

    let likes = library.counters().increment_likes("v1").await.unwrap();
    assert_eq!(likes, "18,446,744,073,709,551,615");
}

#[tokio::test]
async fn test_absent_or_invalid_likes_start_from_zero() {
    let (library, temp) = create_test_library();
    seed(
        &temp,
        serde_json::json!([
            {"id": "absent"},
            {"id": "invalid", "likes": "lots"},
            {"id": "decimal", "likes": "1.5"}
        ]),
    );

    for id in ["absent", "invalid", "decimal"] {
        assert_eq!(library.counters().increment_likes(id).await.unwrap(), "1");
    }
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let (library, _temp) = create_test_library();

    let err = library
        .counters()
        .increment_likes("missing")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_all_count() {
    let (library, _temp) = create_test_library();
    let video = library.videos().create(NewVideo::new()).await.unwrap();
    let counters = Arc::new(library.counters().clone());

    let mut handles = Vec::new();
    for _ in 0..25 {
        let counters = counters.clone();
        let id = video.id.clone();
        handles.push(tokio::spawn(async move {
            counters.increment_likes(&id).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = library.videos().get(&video.id).await.unwrap();
    assert_eq!(stored.likes.as_deref(), Some("25"));
}

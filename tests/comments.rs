//! Comment Manager Integration Tests
//!
//! Tests for adding and deleting nested comments, including concurrent
//! additions against the same video.

use std::sync::Arc;

use tempfile::TempDir;
use vidcat::{CatalogStore, CommentManager, ErrorKind, ImageStore, Library, NewComment, NewVideo};

fn create_test_library() -> (Library, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = CatalogStore::new(temp.path().join("videos.json"));
    let images = ImageStore::new(temp.path().join("images"));
    (Library::new(store, images), temp)
}

async fn create_video(library: &Library) -> String {
    library
        .videos()
        .create(NewVideo::new().with_title("Host"))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_add_comment_defaults() {
    let (library, _temp) = create_test_library();
    let video_id = create_video(&library).await;

    let comment = library
        .comments()
        .add(&video_id, NewComment::new("Love it"))
        .await
        .unwrap();

    assert_eq!(comment.name, "Anonymous");
    assert_eq!(comment.comment, "Love it");
    assert_eq!(comment.likes, 0);
    assert!(comment.timestamp > 0);

    let stored = library.videos().get(&video_id).await.unwrap();
    assert_eq!(stored.comments, vec![comment]);
}

#[tokio::test]
async fn test_add_then_delete_restores_list() {
    let (library, _temp) = create_test_library();
    let video_id = create_video(&library).await;

    library
        .comments()
        .add(&video_id, NewComment::new("first").with_name("Ada"))
        .await
        .unwrap();
    let before = library.comments().list(&video_id).await.unwrap();

    let added = library
        .comments()
        .add(&video_id, NewComment::new("second"))
        .await
        .unwrap();
    let removed = library
        .comments()
        .delete(&video_id, &added.id)
        .await
        .unwrap();

    assert_eq!(removed, added);
    assert_eq!(library.comments().list(&video_id).await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_keeps_relative_order() {
    let (library, _temp) = create_test_library();
    let video_id = create_video(&library).await;

    let mut ids = Vec::new();
    for text in ["a", "b", "c", "d"] {
        let c = library
            .comments()
            .add(&video_id, NewComment::new(text))
            .await
            .unwrap();
        ids.push(c.id);
    }

    library.comments().delete(&video_id, &ids[1]).await.unwrap();

    let remaining: Vec<_> = library
        .comments()
        .list(&video_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.comment)
        .collect();
    assert_eq!(remaining, vec!["a", "c", "d"]);
}

#[tokio::test]
async fn test_delete_unknown_comment_is_not_found() {
    let (library, _temp) = create_test_library();
    let video_id = create_video(&library).await;
    library
        .comments()
        .add(&video_id, NewComment::new("stay"))
        .await
        .unwrap();
    let before = library.comments().list(&video_id).await.unwrap();

    let err = library
        .comments()
        .delete(&video_id, "no-such-comment")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(library.comments().list(&video_id).await.unwrap(), before);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let (library, _temp) = create_test_library();

    let err = library
        .comments()
        .add("missing", NewComment::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = library
        .comments()
        .delete("missing", "c1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_blank_comment_is_bad_input() {
    let (library, _temp) = create_test_library();
    let video_id = create_video(&library).await;

    let err = library
        .comments()
        .add(&video_id, NewComment::new("   "))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadInput);
    assert!(library.comments().list(&video_id).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_lose_nothing() {
    const N: usize = 32;

    let (library, temp) = create_test_library();
    let video_id = create_video(&library).await;
    let comments: Arc<CommentManager> = Arc::new(library.comments().clone());

    let mut handles = Vec::new();
    for i in 0..N {
        let comments = comments.clone();
        let video_id = video_id.clone();
        handles.push(tokio::spawn(async move {
            comments
                .add(&video_id, NewComment::new(format!("comment {}", i)))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Read back through a fresh store to check what actually reached disk
    let reopened = CatalogStore::new(temp.path().join("videos.json"));
    let catalog = reopened.load().await.unwrap();
    let stored = &catalog.get(&video_id).unwrap().comments;

    assert_eq!(stored.len(), N);
    let unique: std::collections::HashSet<_> = stored.iter().map(|c| &c.id).collect();
    assert_eq!(unique.len(), N);
}

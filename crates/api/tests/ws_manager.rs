//! Unit tests for `WsManager`.
//!
//! These exercise the live page connection registry directly, without
//! performing any HTTP upgrades.

use axum::extract::ws::Message;
use beyond_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
    assert!(manager.page_counts().await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_count() {
    let manager = WsManager::new();

    let _conn = manager.add("conn-1".to_string(), "hero").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _conn = manager.add("conn-1".to_string(), "hero").await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: page_counts() groups connections by page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_counts_group_by_page() {
    let manager = WsManager::new();

    let _a = manager.add("a".to_string(), "hero").await;
    let _b = manager.add("b".to_string(), "hero").await;
    let _c = manager.add("c".to_string(), "contact").await;

    let counts = manager.page_counts().await;
    assert_eq!(counts.get("hero"), Some(&2));
    assert_eq!(counts.get("contact"), Some(&1));
    assert_eq!(counts.get("about"), None);
}

// ---------------------------------------------------------------------------
// Test: the returned sender feeds the connection's receiver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sender_reaches_receiver() {
    let manager = WsManager::new();

    let (tx, mut rx) = manager.add("conn-1".to_string(), "about").await;
    tx.send(Message::Text("hello".into())).unwrap();

    match rx.recv().await {
        Some(Message::Text(text)) => assert_eq!(text.as_str(), "hello"),
        other => panic!("Expected Text message, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping to every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();

    let (_tx1, mut rx1) = manager.add("conn-1".to_string(), "hero").await;
    let (_tx2, mut rx2) = manager.add("conn-2".to_string(), "services").await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close frames and clears connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let (_tx1, mut rx1) = manager.add("conn-1".to_string(), "hero").await;
    let (_tx2, mut rx2) = manager.add("conn-2".to_string(), "gallery").await;

    manager.shutdown_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
    assert_eq!(manager.connection_count().await, 0);
}

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use beyond_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single live page connection.
pub struct WsConnection {
    /// Name of the mounted page.
    pub page: String,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open live page connections.
///
/// Wrapped in `Arc` and shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection showing `page`.
    ///
    /// Returns both halves of its outbound channel: the sender for the page
    /// session, the receiver for the socket writer.
    pub async fn add(
        &self,
        conn_id: String,
        page: impl Into<String>,
    ) -> (WsSender, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            page: page.into(),
            sender: tx.clone(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        (tx, rx)
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Open connections per page name.
    pub async fn page_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for conn in self.connections.read().await.values() {
            *counts.entry(conn.page.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all live page connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Long-lived task that feeds realtime row changes into the change bus.
//!
//! Lifecycle: connect -> join one channel per table -> pump frames and
//! heartbeats -> on disconnect, reconnect with backoff and re-join. After
//! every reconnect each watched table gets a synthetic `Any` event, since
//! changes made while disconnected were never delivered.

use std::sync::Arc;
use std::time::Duration;

use beyond_events::{ChangeBus, ChangeEvent, ChangeKind};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::client::{RealtimeClient, RealtimeStream};
use super::messages::{parse_message, PhoenixMessage, RealtimeMessage, TOPIC_PREFIX};
use super::reconnect::{reconnect_loop, ReconnectConfig};

/// Default interval between Phoenix heartbeats.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(25);

/// Configured bridge, not yet running.
pub struct RealtimeBridge {
    client: RealtimeClient,
    bus: Arc<ChangeBus>,
    tables: Vec<String>,
    heartbeat: Duration,
    reconnect: ReconnectConfig,
}

/// Handle to a running bridge.
pub struct RealtimeHandle {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl RealtimeHandle {
    /// Stop the bridge, waiting up to 5 seconds for a clean exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
        tracing::info!("Realtime bridge stopped");
    }
}

/// Why a session ended.
enum SessionEnd {
    Cancelled,
    Disconnected,
}

impl RealtimeBridge {
    pub fn new(url: String, bus: Arc<ChangeBus>, tables: Vec<String>) -> Self {
        Self {
            client: RealtimeClient::new(url),
            bus,
            tables,
            heartbeat: DEFAULT_HEARTBEAT,
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Channel topic used for `table`.
    pub fn topic_for(table: &str) -> String {
        format!("{TOPIC_PREFIX}beyond-{table}")
    }

    /// Spawn the bridge task.
    pub fn start(self) -> RealtimeHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            tracing::info!(tables = ?self.tables, "Starting realtime bridge");
            self.run(&task_cancel).await;
            tracing::info!("Realtime bridge task exited");
        });
        RealtimeHandle { cancel, task }
    }

    async fn run(&self, cancel: &CancellationToken) {
        let mut stream = match self.client.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Realtime connection failed, entering reconnect loop");
                match reconnect_loop(&self.client, &self.reconnect, cancel).await {
                    Some(stream) => stream,
                    None => return,
                }
            }
        };

        loop {
            match self.session(&mut stream, cancel).await {
                SessionEnd::Cancelled => return,
                SessionEnd::Disconnected => {}
            }
            if cancel.is_cancelled() {
                return;
            }

            tracing::info!("Realtime connection lost, entering reconnect loop");
            stream = match reconnect_loop(&self.client, &self.reconnect, cancel).await {
                Some(stream) => stream,
                None => return,
            };
            for table in &self.tables {
                self.bus.publish(ChangeEvent::new(table.clone(), ChangeKind::Any));
            }
        }
    }

    /// Join every channel, then pump frames until the socket drops.
    async fn session(&self, stream: &mut RealtimeStream, cancel: &CancellationToken) -> SessionEnd {
        let mut next_ref: u64 = 0;

        for table in &self.tables {
            next_ref += 1;
            let join = PhoenixMessage::join(&Self::topic_for(table), table, next_ref);
            if let Err(e) = stream.send(Message::Text(join.to_text())).await {
                tracing::error!(table = %table, error = %e, "Failed to join realtime channel");
                return SessionEnd::Disconnected;
            }
        }

        let mut ticker = tokio::time::interval(self.heartbeat);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = stream.close(None).await;
                    return SessionEnd::Cancelled;
                }
                _ = ticker.tick() => {
                    next_ref += 1;
                    let beat = PhoenixMessage::heartbeat(next_ref);
                    if let Err(e) = stream.send(Message::Text(beat.to_text())).await {
                        tracing::warn!(error = %e, "Heartbeat send failed");
                        return SessionEnd::Disconnected;
                    }
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_frame(&text, &self.tables, &self.bus);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Realtime socket closed by server");
                        return SessionEnd::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Realtime receive error");
                        return SessionEnd::Disconnected;
                    }
                    None => return SessionEnd::Disconnected,
                }
            }
        }
    }
}

/// Handle one text frame. Returns the event published, if any.
pub fn dispatch_frame(text: &str, watched: &[String], bus: &ChangeBus) -> Option<ChangeEvent> {
    let message = match parse_message(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed realtime frame");
            return None;
        }
    };

    match message.classify() {
        RealtimeMessage::Change(event) => {
            if !watched.iter().any(|t| *t == event.table) {
                tracing::trace!(table = %event.table, "Change for unwatched table");
                return None;
            }
            bus.publish(event.clone());
            Some(event)
        }
        RealtimeMessage::Reply { topic, ok: false, .. } => {
            tracing::warn!(topic = %topic, payload = %message.payload, "Realtime request rejected");
            None
        }
        RealtimeMessage::ChannelError { topic } => {
            tracing::warn!(topic = %topic, "Realtime channel error");
            None
        }
        RealtimeMessage::ChannelClosed { topic } => {
            tracing::info!(topic = %topic, "Realtime channel closed");
            None
        }
        RealtimeMessage::Reply { .. } | RealtimeMessage::Other { .. } => None,
    }
}

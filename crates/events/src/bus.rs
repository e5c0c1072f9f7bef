//! Table-scoped change notifications over a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is shared via `Arc<ChangeBus>`. Each consumer holds a
//! [`Subscription`] registered under a unique channel name; the name is
//! released when the guard is dropped, whichever way the owner exits.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// The kind of row mutation reported for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Unknown or coalesced mutation; consumers should refetch.
    Any,
}

impl ChangeKind {
    /// Parse the upper-case names used on the realtime wire
    /// (`INSERT`, `UPDATE`, `DELETE`, `*`).
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => ChangeKind::Insert,
            "UPDATE" => ChangeKind::Update,
            "DELETE" => ChangeKind::Delete,
            _ => ChangeKind::Any,
        }
    }
}

/// A mutation of some row in `table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            table: table.into(),
            kind,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} on {}", self.kind, self.table)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventError {
    /// Another live subscription already uses this channel name.
    #[error("Channel '{0}' is already subscribed")]
    DuplicateChannel(String),
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

type ChannelRegistry = Arc<Mutex<HashSet<String>>>;

/// In-process fan-out of [`ChangeEvent`]s.
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
    channels: ChannelRegistry,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow subscriptions observe a synthetic [`ChangeKind::Any`].
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            channels: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Publish an event to all current subscriptions.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(table = %event.table, kind = ?event.kind, "Change published");
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Register `channel` and receive change events for `table`.
    pub fn subscribe(
        &self,
        channel: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Subscription, EventError> {
        let channel = channel.into();
        {
            let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
            if !channels.insert(channel.clone()) {
                return Err(EventError::DuplicateChannel(channel));
            }
        }
        let table = table.into();
        tracing::debug!(channel = %channel, table = %table, "Subscription opened");
        Ok(Subscription {
            receiver: ChangeReceiver {
                receiver: self.sender.subscribe(),
                table,
                channel: channel.clone(),
            },
            guard: ChannelGuard {
                channel,
                registry: Arc::clone(&self.channels),
            },
        })
    }

    /// Names of the channels currently subscribed.
    pub fn active_channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(channel)
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live, table-filtered view of the bus. Dropping it unsubscribes.
///
/// [`Subscription::split`] separates the event stream from the channel
/// registration, so the name can be released by one owner while another
/// is still winding down.
#[derive(Debug)]
pub struct Subscription {
    receiver: ChangeReceiver,
    guard: ChannelGuard,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        self.guard.channel()
    }

    pub fn table(&self) -> &str {
        &self.receiver.table
    }

    /// Wait for the next change to this subscription's table.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Split into the event stream and the registration guard.
    pub fn split(self) -> (ChangeReceiver, ChannelGuard) {
        (self.receiver, self.guard)
    }
}

/// Table-filtered event stream of a [`Subscription`]. Holds no
/// registration; dropping it leaves the channel name in place.
pub struct ChangeReceiver {
    receiver: broadcast::Receiver<ChangeEvent>,
    table: String,
    channel: String,
}

impl ChangeReceiver {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Wait for the next change to this receiver's table.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.table == self.table => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        channel = %self.channel,
                        missed,
                        "Subscription lagged, coalescing into a refetch",
                    );
                    return Some(ChangeEvent::new(self.table.clone(), ChangeKind::Any));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl fmt::Debug for ChangeReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeReceiver")
            .field("channel", &self.channel)
            .field("table", &self.table)
            .finish()
    }
}

/// Registration of a channel name. Dropping it frees the name.
pub struct ChannelGuard {
    channel: String,
    registry: ChannelRegistry,
}

impl ChannelGuard {
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.channel);
        tracing::debug!(channel = %self.channel, "Subscription released");
    }
}

impl fmt::Debug for ChannelGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelGuard")
            .field("channel", &self.channel)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn subscription_only_sees_its_table() {
        let bus = ChangeBus::default();
        let mut sub = bus.subscribe("hero-page", "hero_content").unwrap();

        bus.publish(ChangeEvent::new("services", ChangeKind::Insert));
        bus.publish(ChangeEvent::new("hero_content", ChangeKind::Update));

        let event = sub.recv().await.expect("should receive hero change");
        assert_eq!(event.table, "hero_content");
        assert_eq!(event.kind, ChangeKind::Update);
    }

    #[test]
    fn duplicate_channel_is_rejected() {
        let bus = ChangeBus::default();
        let _first = bus.subscribe("about", "about_content").unwrap();
        assert_matches!(
            bus.subscribe("about", "about_content"),
            Err(EventError::DuplicateChannel(name)) if name == "about"
        );
    }

    #[test]
    fn drop_releases_channel_name() {
        let bus = ChangeBus::default();
        let sub = bus.subscribe("contact", "contact_content").unwrap();
        assert!(bus.is_subscribed("contact"));
        drop(sub);
        assert!(!bus.is_subscribed("contact"));
        assert!(bus.subscribe("contact", "contact_content").is_ok());
    }

    #[test]
    fn panic_while_holding_subscription_still_releases() {
        let bus = Arc::new(ChangeBus::default());
        let inner = Arc::clone(&bus);
        let result = std::thread::spawn(move || {
            let _sub = inner.subscribe("doomed", "services").unwrap();
            panic!("page crashed");
        })
        .join();
        assert!(result.is_err());
        assert!(bus.active_channels().is_empty());
    }

    #[tokio::test]
    async fn split_guard_owns_the_name() {
        let bus = ChangeBus::default();
        let sub = bus.subscribe("split", "services").unwrap();
        let (mut receiver, guard) = sub.split();

        drop(guard);
        assert!(!bus.is_subscribed("split"));
        let _again = bus.subscribe("split", "services").unwrap();

        bus.publish(ChangeEvent::new("services", ChangeKind::Delete));
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn lagged_subscription_yields_any() {
        let bus = ChangeBus::new(2);
        let mut sub = bus.subscribe("slow", "services").unwrap();
        for _ in 0..5 {
            bus.publish(ChangeEvent::new("services", ChangeKind::Insert));
        }
        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Any);
        assert_eq!(event.table, "services");
    }

    #[tokio::test]
    async fn recv_returns_none_when_bus_dropped() {
        let bus = ChangeBus::default();
        let mut sub = bus.subscribe("orphan", "services").unwrap();
        drop(bus);
        let got = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("recv should not hang");
        assert!(got.is_none());
    }

    #[test]
    fn wire_kinds_parse() {
        assert_eq!(ChangeKind::from_wire("INSERT"), ChangeKind::Insert);
        assert_eq!(ChangeKind::from_wire("delete"), ChangeKind::Delete);
        assert_eq!(ChangeKind::from_wire("*"), ChangeKind::Any);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = ChangeBus::default();
        bus.publish(ChangeEvent::new("portfolio", ChangeKind::Insert));
    }
}

//! Phoenix channel frames and their classification.
//!
//! Every frame is a JSON object `{"topic", "event", "payload", "ref"}`.
//! Row changes arrive either as `postgres_changes` events carrying
//! `payload.data.{table, type}`, or, on older servers, as bare
//! `INSERT`/`UPDATE`/`DELETE` events carrying `payload.{table, type}`.

use beyond_events::{ChangeEvent, ChangeKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Topic used for socket-level heartbeats.
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// Prefix of every realtime channel topic.
pub const TOPIC_PREFIX: &str = "realtime:";

/// A raw Phoenix frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub msg_ref: Option<String>,
}

/// What a frame means to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeMessage {
    /// A row in a watched table changed.
    Change(ChangeEvent),
    /// Reply to a join or heartbeat.
    Reply {
        topic: String,
        msg_ref: Option<String>,
        ok: bool,
    },
    /// The server reported a channel error.
    ChannelError { topic: String },
    /// The server closed a channel.
    ChannelClosed { topic: String },
    /// Anything else (presence, system notices).
    Other { topic: String, event: String },
}

impl PhoenixMessage {
    /// Join `topic`, asking for every change to `public.{table}`.
    pub fn join(topic: &str, table: &str, msg_ref: u64) -> Self {
        Self {
            topic: topic.to_string(),
            event: "phx_join".into(),
            payload: json!({
                "config": {
                    "broadcast": { "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": "public", "table": table }
                    ],
                }
            }),
            msg_ref: Some(msg_ref.to_string()),
        }
    }

    pub fn heartbeat(msg_ref: u64) -> Self {
        Self {
            topic: HEARTBEAT_TOPIC.into(),
            event: "heartbeat".into(),
            payload: json!({}),
            msg_ref: Some(msg_ref.to_string()),
        }
    }

    pub fn to_text(&self) -> String {
        // Serializing a struct of strings and a Value cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn classify(&self) -> RealtimeMessage {
        match self.event.as_str() {
            "postgres_changes" => {
                let data = &self.payload["data"];
                match change_from(data) {
                    Some(change) => RealtimeMessage::Change(change),
                    None => self.other(),
                }
            }
            "INSERT" | "UPDATE" | "DELETE" => match change_from(&self.payload) {
                Some(change) => RealtimeMessage::Change(change),
                None => self.other(),
            },
            "phx_reply" => RealtimeMessage::Reply {
                topic: self.topic.clone(),
                msg_ref: self.msg_ref.clone(),
                ok: self.payload["status"] == "ok",
            },
            "phx_error" => RealtimeMessage::ChannelError {
                topic: self.topic.clone(),
            },
            "phx_close" => RealtimeMessage::ChannelClosed {
                topic: self.topic.clone(),
            },
            _ => self.other(),
        }
    }

    fn other(&self) -> RealtimeMessage {
        RealtimeMessage::Other {
            topic: self.topic.clone(),
            event: self.event.clone(),
        }
    }
}

fn change_from(data: &Value) -> Option<ChangeEvent> {
    let table = data.get("table")?.as_str()?;
    let kind = data
        .get("type")
        .or_else(|| data.get("eventType"))
        .and_then(Value::as_str)
        .map(ChangeKind::from_wire)
        .unwrap_or(ChangeKind::Any);
    Some(ChangeEvent::new(table, kind))
}

/// Parse a text frame.
///
/// Returns `Err` for malformed JSON. Callers should log and continue.
pub fn parse_message(text: &str) -> Result<PhoenixMessage, serde_json::Error> {
    serde_json::from_str(text)
}

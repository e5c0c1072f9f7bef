//! Bridge from the hosted realtime service to the in-process
//! [`ChangeBus`](beyond_events::ChangeBus).
//!
//! The service speaks the Phoenix channel protocol over a websocket: one
//! channel is joined per watched table with a `postgres_changes` config,
//! and a heartbeat keeps the socket alive.

pub mod bridge;
pub mod client;
pub mod messages;
pub mod reconnect;

pub use bridge::{RealtimeBridge, RealtimeHandle};

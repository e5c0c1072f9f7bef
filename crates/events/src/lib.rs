//! Change notification fan-out.
//!
//! - [`ChangeBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, fed by the realtime bridge and by admin
//!   writes.
//! - [`Subscription`] -- a scoped, table-filtered receiver that releases its
//!   channel name when dropped. It splits into a [`ChangeReceiver`] and a
//!   [`ChannelGuard`] when the two need different owners.

pub mod bus;

pub use bus::{
    ChangeBus, ChangeEvent, ChangeKind, ChangeReceiver, ChannelGuard, EventError, Subscription,
};

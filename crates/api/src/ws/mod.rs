//! Live page sessions over WebSocket.
//!
//! Each connection mounts one [`beyond_site::LivePage`] and receives every
//! state it applies as a JSON frame.

mod handler;
mod heartbeat;
pub mod manager;
pub mod session;

pub use handler::page_session;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;

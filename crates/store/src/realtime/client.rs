//! Websocket connection to the realtime service.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::StoreError;

pub type RealtimeStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection settings for the realtime endpoint.
pub struct RealtimeClient {
    url: String,
}

impl RealtimeClient {
    /// `url` is the full websocket URL including `apikey` and `vsn`.
    pub fn new(url: String) -> Self {
        Self { url }
    }

    /// The endpoint with the API key elided, for logs.
    pub fn display_url(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub async fn connect(&self) -> Result<RealtimeStream, StoreError> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            StoreError::Connection(format!(
                "Failed to connect to realtime at {}: {e}",
                self.display_url()
            ))
        })?;
        tracing::info!(url = self.display_url(), "Connected to realtime service");
        Ok(stream)
    }
}

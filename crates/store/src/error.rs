/// Errors from the hosted backend clients.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote returned a non-2xx status code.
    #[error("Remote store error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A row did not match the expected shape.
    #[error("Failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),

    /// A single-row query matched zero or several rows.
    #[error("Cardinality violation: {0}")]
    Cardinality(String),

    /// Failed to establish the realtime connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an established realtime connection.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid client configuration (bad base URL and the like).
    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// HTTP status reported by the remote, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            StoreError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

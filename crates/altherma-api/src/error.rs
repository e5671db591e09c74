use thiserror::Error;

/// Top-level error type for the `altherma-api` crate.
///
/// Covers every failure mode of the wire layer: opening the websocket,
/// sending and receiving frames, decoding JSON, and walking decoded
/// documents. `altherma-core` propagates these unchanged as
/// transport failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// The host could not be turned into a websocket URL.
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// Websocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    Connect(String),

    /// The unit closed the websocket (close frame or end of stream).
    #[error("WebSocket closed by peer")]
    ConnectionClosed,

    /// Writing a request frame failed.
    #[error("Failed to send request: {0}")]
    Send(String),

    /// Reading a response frame failed.
    #[error("Failed to receive response: {0}")]
    Receive(String),

    /// No response arrived in time.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON decoding failed, with the raw text for debugging.
    #[error("Deserialization error: {message}")]
    Decode { message: String, body: String },

    /// Request envelope could not be serialized.
    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A strict path query hit a missing key.
    #[error("{path} step: {step} not found in object")]
    PathNotFound { path: String, step: String },
}

impl Error {
    /// Returns `true` if the failure came from the connection itself
    /// rather than from the content of a response.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect(_)
                | Self::ConnectionClosed
                | Self::Send(_)
                | Self::Receive(_)
                | Self::Timeout { .. }
        )
    }

    /// Returns `true` if retrying the same exchange could succeed.
    ///
    /// Nothing in this workspace retries; callers decide.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::ConnectionClosed | Self::Timeout { .. }
        )
    }

    /// Returns `true` if this is a strict path-query miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }
}

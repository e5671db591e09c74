// Transport seam and shared connection configuration.
//
// The core only ever talks to the unit through `Transport`: one request,
// one response, strictly in sequence. `Connection` (websocket.rs) is the
// real implementation; tests substitute scripted stubs.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::envelope::{Content, DEFAULT_AGENT};
use crate::error::Error;

/// Single-connection request/response exchange with a unit.
///
/// Implementations own exactly one connection and must not let a second
/// exchange start before the first resolves.
pub trait Transport: Send + Sync {
    /// Open the connection. A no-op when already connected.
    fn connect(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Send one request to `destination` and, when `expect_response` is set,
    /// await and decode exactly one response.
    ///
    /// Connects implicitly when not connected or after the connection
    /// dropped. Returns `None` when no response was awaited.
    fn exchange(
        &self,
        destination: &str,
        payload: Option<&Content>,
        expect_response: bool,
    ) -> impl Future<Output = Result<Option<Value>, Error>> + Send;

    /// Release the connection.
    fn close(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Connection settings for a single unit.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Host name or address of the LAN adapter, optionally with port.
    pub host: String,
    /// How long to wait for a response. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Originator name sent with every request.
    pub agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.10".into(),
            timeout: Some(Duration::from_secs(30)),
            agent: DEFAULT_AGENT.into(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// Websocket endpoint: `ws://<host>/mca`.
    pub fn ws_url(&self) -> Result<Url, Error> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() || host.contains("://") {
            return Err(Error::InvalidHost(self.host.clone()));
        }
        Url::parse(&format!("ws://{host}/mca")).map_err(|e| Error::InvalidHost(format!("{host}: {e}")))
    }
}

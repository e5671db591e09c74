//! Websocket transport to the unit's LAN adapter.
//!
//! Opens `ws://<host>/mca` and runs strictly sequential request/response
//! exchanges over it. The stream sits behind a [`tokio::sync::Mutex`] held
//! for the whole send + receive, so two exchanges never overlap on the
//! wire. A dropped or timed-out connection is discarded and reopened by
//! the next exchange.
//!
//! # Example
//!
//! ```rust,ignore
//! use altherma_api::{Connection, ConnectionConfig, Transport};
//!
//! let conn = Connection::new(ConnectionConfig::new("192.168.1.10"))?;
//! let response = conn
//!     .exchange("/[0]/MNAE/1/Sensor/IndoorTemperature/la", None, true)
//!     .await?;
//! conn.close().await?;
//! ```

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use crate::envelope::{Content, Request};
use crate::error::Error;
use crate::query::decode;
use crate::transport::{ConnectionConfig, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Connection ───────────────────────────────────────────────────────

/// The single persistent connection to one unit.
///
/// Share it between unit controllers with an `Arc`; every exchange takes
/// the inner lock for its full duration.
pub struct Connection {
    config: ConnectionConfig,
    url: Url,
    stream: Mutex<Option<WsStream>>,
}

impl Connection {
    /// Validate the host and prepare a connection. Does NOT connect --
    /// the first exchange (or [`Transport::connect`]) opens the socket.
    pub fn new(config: ConnectionConfig) -> Result<Self, Error> {
        let url = config.ws_url()?;
        Ok(Self {
            config,
            url,
            stream: Mutex::new(None),
        })
    }

    /// The connection settings.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The websocket endpoint this connection targets.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether a socket is currently open.
    pub async fn is_connected(&self) -> bool {
        self.stream.lock().await.is_some()
    }
}

impl Transport for Connection {
    async fn connect(&self) -> Result<(), Error> {
        let mut guard = self.stream.lock().await;
        if guard.is_none() {
            *guard = Some(open(&self.url).await?);
        }
        Ok(())
    }

    async fn exchange(
        &self,
        destination: &str,
        payload: Option<&Content>,
        expect_response: bool,
    ) -> Result<Option<Value>, Error> {
        let request = Request::new(&self.config.agent, destination, payload);
        let data = request.serialize()?;

        let mut guard = self.stream.lock().await;
        if guard.is_none() {
            *guard = Some(open(&self.url).await?);
        }
        let ws = guard.as_mut().ok_or(Error::ConnectionClosed)?;

        debug!(destination, request = %data, "[OUT]");
        let sent = ws.send(Message::text(data)).await;
        if let Err(e) = sent {
            *guard = None;
            return Err(Error::Send(e.to_string()));
        }

        if !expect_response {
            return Ok(None);
        }

        let result = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, read_response(ws))
                .await
                .unwrap_or(Err(Error::Timeout {
                    timeout_secs: limit.as_secs(),
                })),
            None => read_response(ws).await,
        };

        match result {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                // A late answer would be taken for the next request's
                // response, so the socket is not reused after a failure.
                if e.is_connection_error() {
                    *guard = None;
                }
                Err(e)
            }
        }
    }

    async fn close(&self) -> Result<(), Error> {
        let Some(mut ws) = self.stream.lock().await.take() else {
            return Ok(());
        };
        if let Err(e) = ws.close(None).await {
            debug!(error = %e, "WebSocket close handshake failed");
        }
        info!("WebSocket closed");
        Ok(())
    }
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn open(url: &Url) -> Result<WsStream, Error> {
    info!(url = %url, "Connecting to WebSocket");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::Connect(e.to_string()))?;

    info!("WebSocket connected");
    Ok(ws_stream)
}

/// Read frames until the first text frame and decode it.
async fn read_response(ws: &mut WsStream) -> Result<Value, Error> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(response = text.as_str(), "[IN]");
                return decode(text.as_str());
            }
            Some(Ok(Message::Close(frame))) => {
                if let Some(ref cf) = frame {
                    info!(code = %cf.code, reason = %cf.reason, "WebSocket close frame received");
                } else {
                    info!("WebSocket close frame received (no payload)");
                }
                return Err(Error::ConnectionClosed);
            }
            Some(Ok(Message::Ping(_))) => {
                // tungstenite handles pong replies automatically
                trace!("WebSocket ping");
            }
            Some(Ok(_)) => {
                // Binary, Pong, Frame -- ignore
            }
            Some(Err(e)) => return Err(Error::Receive(e.to_string())),
            None => {
                info!("WebSocket stream ended");
                return Err(Error::ConnectionClosed);
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

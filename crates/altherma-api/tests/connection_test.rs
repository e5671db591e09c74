#![allow(clippy::unwrap_used)]
// Integration tests for the websocket `Connection` against a loopback unit.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use altherma_api::{CONTENT_PATH, Connection, ConnectionConfig, Content, Error, Transport, lookup};

// ── Helpers ─────────────────────────────────────────────────────────

/// How the fake unit answers one request.
#[derive(Clone, Copy)]
enum Reply {
    /// Echo `con` back in a 2000 response.
    Content,
    /// Say nothing.
    Silent,
    /// Answer, then close the socket.
    ContentThenClose,
}

/// Serve websocket connections on a loopback port. `script` picks the reply
/// for each request (numbered across connections). Returns the host string
/// and a handle yielding every request the unit received.
async fn spawn_unit(script: fn(usize, &Value) -> Reply) -> (String, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        while let Ok(Ok((tcp, _))) =
            tokio::time::timeout(Duration::from_secs(2), listener.accept()).await
        {
            let mut ws = accept_async(tcp).await.unwrap();
            while let Some(Ok(frame)) = ws.next().await {
                let Message::Text(text) = frame else {
                    continue;
                };
                let request: Value = serde_json::from_str(text.as_str()).unwrap();
                let reply = script(received.len(), &request);
                let rqp = request["m2m:rqp"].clone();
                received.push(request);

                let response = json!({
                    "m2m:rsp": {
                        "rsc": 2000,
                        "rqi": rqp["rqi"],
                        "to": rqp["fr"],
                        "fr": rqp["to"],
                        "pc": { "m2m:cin": { "con": format!("reply to {}", rqp["to"].as_str().unwrap()) } }
                    }
                });
                match reply {
                    Reply::Content => {
                        ws.send(Message::text(response.to_string())).await.unwrap();
                    }
                    Reply::ContentThenClose => {
                        ws.send(Message::text(response.to_string())).await.unwrap();
                        let _ = ws.close(None).await;
                        break;
                    }
                    Reply::Silent => {}
                }
            }
        }
        received
    });

    (host, handle)
}

fn connection(host: &str, timeout: Duration) -> Connection {
    Connection::new(ConnectionConfig::new(host).with_timeout(Some(timeout))).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_round_trip() {
    let (host, unit) = spawn_unit(|_, _| Reply::Content).await;
    let conn = connection(&host, Duration::from_secs(2));

    let response = conn
        .exchange("/[0]/MNAE/1/Sensor/IndoorTemperature/la", None, true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        lookup(&response, CONTENT_PATH).unwrap(),
        json!("reply to /[0]/MNAE/1/Sensor/IndoorTemperature/la")
    );
    assert!(conn.is_connected().await);

    conn.close().await.unwrap();
    let received = unit.await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["m2m:rqp"]["op"], 2);
    assert_eq!(received[0]["m2m:rqp"]["fr"], "altherma");
    assert_eq!(
        received[0]["m2m:rqp"]["to"],
        "/[0]/MNAE/1/Sensor/IndoorTemperature/la"
    );
}

#[tokio::test]
async fn test_fire_and_forget_write() {
    let (host, unit) = spawn_unit(|_, request| {
        if request["m2m:rqp"]["op"] == 1 {
            Reply::Silent
        } else {
            Reply::Content
        }
    })
    .await;
    let conn = connection(&host, Duration::from_secs(2));

    let payload = Content::plain(json!("on"));
    let none = conn
        .exchange("/[0]/MNAE/1/Operation/Power", Some(&payload), false)
        .await
        .unwrap();
    assert!(none.is_none());

    // The next read gets its own answer, not a stale one.
    let response = conn
        .exchange("/[0]/MNAE/1/Operation/Power/la", None, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        lookup(&response, CONTENT_PATH).unwrap(),
        json!("reply to /[0]/MNAE/1/Operation/Power/la")
    );

    conn.close().await.unwrap();
    let received = unit.await.unwrap();
    assert_eq!(received[0]["m2m:rqp"]["op"], 1);
    assert_eq!(received[0]["m2m:rqp"]["ty"], 4);
    assert_eq!(
        received[0]["m2m:rqp"]["pc"]["m2m:cin"],
        json!({ "con": "on", "cnf": "text/plain:0" })
    );
}

#[tokio::test]
async fn test_reconnects_after_peer_close() {
    let (host, unit) = spawn_unit(|n, _| {
        if n == 0 {
            Reply::ContentThenClose
        } else {
            Reply::Content
        }
    })
    .await;
    let conn = connection(&host, Duration::from_secs(2));

    conn.exchange("[0]/MNAE/0", None, true).await.unwrap();

    // The unit hung up after the first answer; the next exchange either
    // notices the closed socket or transparently reconnects.
    let second = conn.exchange("[0]/MNAE/1", None, true).await;
    let response = match second {
        Ok(response) => response.unwrap(),
        Err(e) => {
            assert!(e.is_connection_error(), "unexpected error: {e:?}");
            conn.exchange("[0]/MNAE/1", None, true).await.unwrap().unwrap()
        }
    };
    assert_eq!(
        lookup(&response, CONTENT_PATH).unwrap(),
        json!("reply to [0]/MNAE/1")
    );

    conn.close().await.unwrap();
    let received = unit.await.unwrap();
    assert!(received.len() >= 2);
}

#[tokio::test]
async fn test_timeout_drops_connection() {
    let (host, _unit) = spawn_unit(|_, _| Reply::Silent).await;
    let conn = connection(&host, Duration::from_millis(100));

    let result = conn.exchange("[0]/MNAE/0/UnitProfile/la", None, true).await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
    assert!(!conn.is_connected().await);
}

#[tokio::test]
async fn test_connect_failure() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let conn = connection(&host, Duration::from_secs(1));
    let result = conn.connect().await;

    assert!(
        matches!(result, Err(Error::Connect(_))),
        "expected Connect error, got: {result:?}"
    );
}

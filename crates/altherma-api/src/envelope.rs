// Request/response envelope for the oneM2M-style control protocol.
//
// Every request is wrapped as `{"m2m:rqp": {...}}` and every response comes
// back as `{"m2m:rsp": {"rsc": <code>, "pc": {...}}}`. Reads carry no
// payload (`op = 2`); writes carry a content instance (`op = 1`, `ty = 4`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::query::{RESPONSE_CODE_PATH, lookup};

/// Canonical success code.
pub const RESPONSE_OK: i64 = 2000;

/// Every result code treated as success.
pub const SUCCESS_CODES: [i64; 2] = [RESPONSE_OK, 2001];

/// Encoding tag the unit expects on written content.
pub const PLAIN_TEXT_ENCODING: &str = "text/plain:0";

/// Default originator name sent in the `fr` field.
pub const DEFAULT_AGENT: &str = "altherma";

const OP_CREATE: u8 = 1;
const OP_RETRIEVE: u8 = 2;
const TYPE_CONTENT_INSTANCE: u8 = 4;

// ── Content ──────────────────────────────────────────────────────────

/// A write payload: `{"con": <value>, "cnf": "text/plain:0"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "con")]
    pub content: Value,
    #[serde(rename = "cnf")]
    pub encoding: String,
}

impl Content {
    /// Plain-text content, the only encoding the unit accepts for writes.
    pub fn plain(content: Value) -> Self {
        Self {
            content,
            encoding: PLAIN_TEXT_ENCODING.to_string(),
        }
    }
}

// ── Request ──────────────────────────────────────────────────────────

/// Request envelope: `{"m2m:rqp": {"fr", "rqi", "op", "to", ["ty", "pc"]}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    #[serde(rename = "m2m:rqp")]
    pub primitive: RequestPrimitive,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPrimitive {
    /// Originator (agent name).
    pub fr: String,
    /// Request id: five random hex characters. The unit echoes it but
    /// nothing here demultiplexes on it.
    pub rqi: String,
    pub op: u8,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pc: Option<PrimitiveContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveContent {
    #[serde(rename = "m2m:cin")]
    pub cin: Content,
}

impl Request {
    /// Build a read (no payload) or write (payload) request addressed to
    /// `destination`.
    pub fn new(agent: &str, destination: &str, payload: Option<&Content>) -> Self {
        let mut primitive = RequestPrimitive {
            fr: agent.to_string(),
            rqi: request_id(),
            op: OP_RETRIEVE,
            to: destination.to_string(),
            ty: None,
            pc: None,
        };
        if let Some(content) = payload {
            primitive.op = OP_CREATE;
            primitive.ty = Some(TYPE_CONTENT_INSTANCE);
            primitive.pc = Some(PrimitiveContent {
                cin: content.clone(),
            });
        }
        Self { primitive }
    }

    /// Whether this request writes content.
    pub fn is_write(&self) -> bool {
        self.primitive.pc.is_some()
    }

    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(5);
    id
}

// ── Response helpers ─────────────────────────────────────────────────

/// Result code of a decoded response, if it carries one.
pub fn response_code(response: &Value) -> Option<i64> {
    lookup(response, RESPONSE_CODE_PATH)
        .ok()
        .and_then(|code| code.as_i64())
}

/// `true` for 2000 and 2001.
pub fn is_success(code: i64) -> bool {
    SUCCESS_CODES.contains(&code)
}

//! Slash-separated lookups into decoded response documents.
//!
//! The unit answers every request with a nested JSON document and the
//! interesting value usually sits a few levels deep
//! (`m2m:rsp/pc/m2m:cin/con`). [`query`] walks such a path one key at a
//! time with a three-way policy for missing keys:
//!
//! - `raise_on_missing` fails immediately with [`Error::PathNotFound`];
//! - otherwise a missing *terminal* key becomes `null` when
//!   `convert_to_none` is set (the default);
//! - any other missing key yields an empty object and the walk goes on,
//!   so an absent intermediate only becomes visible at the terminal step.
//!
//! Callers rely on the difference between `null` and `{}` to tell
//! "field absent" from "no response body".

use serde_json::{Map, Value};

use crate::error::Error;

/// Fixed location of the payload in every response.
pub const CONTENT_PATH: &str = "m2m:rsp/pc/m2m:cin/con";

/// Fixed location of the result code in every response.
pub const RESPONSE_CODE_PATH: &str = "m2m:rsp/rsc";

/// Missing-key policy for [`query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Fail with [`Error::PathNotFound`] on the first missing key.
    pub raise_on_missing: bool,
    /// Return `null` instead of `{}` when the terminal key is missing.
    pub convert_to_none: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            raise_on_missing: false,
            convert_to_none: true,
        }
    }
}

impl QueryOptions {
    /// Fail on any missing key.
    pub fn strict() -> Self {
        Self {
            raise_on_missing: true,
            ..Self::default()
        }
    }

    /// Keep the empty-object sentinel for a missing terminal key.
    pub fn keep_empty() -> Self {
        Self {
            convert_to_none: false,
            ..Self::default()
        }
    }
}

/// Look up `path` in `document`.
///
/// A `Value::String` document is treated as serialized JSON and decoded
/// first, which is how the unit nests documents inside `con`.
pub fn query(document: &Value, path: &str, options: QueryOptions) -> Result<Value, Error> {
    let decoded;
    let mut current = match document {
        Value::String(text) => {
            decoded = decode(text)?;
            &decoded
        }
        other => other,
    };

    let empty = Value::Object(Map::new());
    let steps: Vec<&str> = path.split('/').collect();
    let last = steps.len() - 1;

    for (idx, step) in steps.iter().enumerate() {
        match current.get(*step) {
            Some(next) => current = next,
            None => {
                if options.raise_on_missing {
                    return Err(Error::PathNotFound {
                        path: path.to_string(),
                        step: (*step).to_string(),
                    });
                }
                if idx == last && options.convert_to_none {
                    return Ok(Value::Null);
                }
                current = &empty;
            }
        }
    }

    Ok(current.clone())
}

/// Shorthand for [`query`] with the default policy.
pub fn lookup(document: &Value, path: &str) -> Result<Value, Error> {
    query(document, path, QueryOptions::default())
}

/// Decode a serialized JSON document.
pub fn decode(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|e| Error::Decode {
        message: e.to_string(),
        body: text.to_string(),
    })
}

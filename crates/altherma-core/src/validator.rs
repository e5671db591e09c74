//! Write validation against a unit's declared constraints.
//!
//! [`validate`] is a pure predicate: it never fails and never touches the
//! profile. Callers turn `false` into
//! [`CoreError::InvalidOperationValue`](crate::CoreError::InvalidOperationValue).
//!
//! The `powerful` operation is special on the wire: the capability profile
//! lists it lower-case with string choices (`["0", "1"]`) while its
//! destination segment is `Powerful`. The helpers here are the only place
//! that knows about it.

use serde_json::Value;

use crate::constraint::Constraint;

const POWERFUL_PROFILE_KEY: &str = "powerful";
const POWERFUL_WIRE_NAME: &str = "Powerful";

/// Whether `name` is the powerful-family operation, in either casing.
pub fn is_powerful(name: &str) -> bool {
    name == POWERFUL_PROFILE_KEY || name == POWERFUL_WIRE_NAME
}

/// Name to use as a destination path segment.
pub fn wire_name(name: &str) -> &str {
    if is_powerful(name) {
        POWERFUL_WIRE_NAME
    } else {
        name
    }
}

/// Key under which the profile declares the operation's constraint.
pub fn profile_key(name: &str) -> &str {
    if is_powerful(name) {
        POWERFUL_PROFILE_KEY
    } else {
        name
    }
}

/// Decide whether `candidate` may be written to `operation`.
///
/// With `relaxed`, a range constraint that omits `settable` counts as
/// settable; otherwise the flag must be present and true.
pub fn validate(operation: &str, constraint: &Constraint, candidate: &Value, relaxed: bool) -> bool {
    match constraint.effective() {
        Constraint::Enumerated { values } => {
            let coerced = if is_powerful(operation) {
                Value::String(coerce_to_string(candidate))
            } else {
                candidate.clone()
            };
            values.iter().any(|allowed| scalar_eq(allowed, &coerced))
        }
        Constraint::Range(range) => {
            let settable = match range.settable {
                Some(flag) => flag,
                None => relaxed,
            };
            settable && candidate.as_f64().is_some_and(|v| range.contains(v))
        }
        Constraint::NestedHeating { .. } | Constraint::Unsupported { .. } => false,
    }
}

/// String form used for enumerated membership of the powerful family.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".into(),
        Value::Bool(false) => "0".into(),
        other => other.to_string(),
    }
}

/// Equality that treats `45` and `45.0` as the same number.
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Truthiness of a scalar the unit returns for a status flag.
///
/// `null`, `false`, zero, the empty string and empty containers are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

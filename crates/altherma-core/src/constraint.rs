// ── Operation constraints ──
//
// Each entry of a capability document's `Operation` section declares how the
// operation may be written. The unit uses a handful of loose JSON shapes for
// this; they are decoded once, at parse time, into the closed `Constraint`
// variant so nothing downstream inspects raw JSON.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validator::truthy;

/// Numeric write bounds with a settable flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConstraint {
    /// `None` when the unit omitted the key; a present value is coerced
    /// like a status flag (`0` and `""` are false).
    pub settable: Option<bool>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step_value: Option<f64>,
}

impl RangeConstraint {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            settable: object.get("settable").map(truthy),
            min_value: object.get("minValue").and_then(Value::as_f64),
            max_value: object.get("maxValue").and_then(Value::as_f64),
            step_value: object.get("stepValue").and_then(Value::as_f64),
        }
    }

    /// Whether `value` lies within both bounds. Missing bounds never match.
    pub fn contains(&self, value: f64) -> bool {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => min <= value && value <= max,
            _ => false,
        }
    }
}

/// Declared validity rule for writing one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// `{"settable", "minValue", "maxValue"}`.
    Range(RangeConstraint),
    /// A list of allowed scalars, e.g. `["on", "standby"]` or `["0", "1"]`.
    Enumerated { values: Vec<Value> },
    /// An object whose real writable bounds live in a `heating` sub-object.
    NestedHeating {
        outer: RangeConstraint,
        heating: RangeConstraint,
    },
    /// Any other shape. Never writable.
    Unsupported { raw: Value },
}

impl Constraint {
    /// Decode one `Operation` entry.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(values) => Self::Enumerated {
                values: values.clone(),
            },
            Value::Object(object) => {
                let outer = RangeConstraint::from_object(object);
                match object.get("heating") {
                    Some(Value::Object(heating)) => Self::NestedHeating {
                        outer,
                        heating: RangeConstraint::from_object(heating),
                    },
                    _ => Self::Range(outer),
                }
            }
            other => Self::Unsupported { raw: other.clone() },
        }
    }

    /// The constraint that governs writes.
    ///
    /// For [`Constraint::NestedHeating`] that is the `heating` sub-object,
    /// forced settable whatever it declares. The stored constraint is left
    /// untouched.
    pub fn effective(&self) -> Constraint {
        match self {
            Self::NestedHeating { heating, .. } => Self::Range(RangeConstraint {
                settable: Some(true),
                ..heating.clone()
            }),
            other => other.clone(),
        }
    }

    /// The declared top-level `settable` flag. Enumerated operations are
    /// always settable; missing flags read as `false`.
    pub fn is_settable(&self) -> bool {
        match self {
            Self::Range(range) | Self::NestedHeating { outer: range, .. } => {
                range.settable.unwrap_or(false)
            }
            Self::Enumerated { .. } => true,
            Self::Unsupported { .. } => false,
        }
    }

    /// Allowed values of an enumerated constraint.
    pub fn choices(&self) -> Option<&[Value]> {
        match self {
            Self::Enumerated { values } => Some(values),
            _ => None,
        }
    }
}

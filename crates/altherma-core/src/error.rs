// ── Core error types ──
//
// Errors raised by the profile model and the unit/device controllers.
// Transport failures from `altherma-api` pass through unchanged in
// `CoreError::Transport`; everything else is a decision made here.
// Nothing is retried: each variant is terminal for the call that raised it.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Exchange errors ──────────────────────────────────────────────
    /// Connect/send/receive/timeout failure from the transport.
    #[error(transparent)]
    Transport(#[from] altherma_api::Error),

    /// The unit answered with a non-success result code.
    #[error("Unit answered {destination} with result code {code}")]
    ProtocolFailure { destination: String, code: i64 },

    /// The payload could not be extracted from a read response.
    #[error("Failed to read {category} {name} data")]
    ReadFailure { category: String, name: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The write was rejected by the unit's declared constraint.
    #[error("Invalid argument {value} for operation {operation} or operation is not settable")]
    InvalidOperationValue { operation: String, value: Value },

    /// The unit's profile does not declare this operation.
    #[error("Operation {operation} is not declared by this unit")]
    UnknownOperation { operation: String },

    /// A typed accessor got a value it cannot interpret.
    #[error("Unexpected value {value} for {field}")]
    UnexpectedValue { field: String, value: Value },

    // ── Device errors ────────────────────────────────────────────────
    /// Device-wide query without an adapter (or slot 0) unit.
    #[error("No base unit discovered -- run discovery first")]
    NoBaseUnit,

    /// Refetching a capability document returned a non-OK code.
    #[error("Failed to refresh profile of unit {unit_id}: result code {code}")]
    RefreshFailure { unit_id: u8, code: i64 },

    /// A capability document did not have the expected shape.
    #[error("Invalid capability document for unit {unit_id}: {message}")]
    InvalidProfile { unit_id: u8, message: String },
}

impl CoreError {
    /// Returns `true` if the failure happened on the connection rather
    /// than in the unit's answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if the call was rejected before anything was sent.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperationValue { .. } | Self::UnknownOperation { .. } | Self::NoBaseUnit
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn invalid_value_names_operation_and_value() {
        let err = CoreError::InvalidOperationValue {
            operation: "TargetTemperature".into(),
            value: json!(56),
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument 56 for operation TargetTemperature or operation is not settable"
        );
        assert!(err.is_rejected_locally());
    }

    #[test]
    fn transport_errors_pass_through() {
        let err = CoreError::from(altherma_api::Error::ConnectionClosed);
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "WebSocket closed by peer");
    }

    #[test]
    fn read_failure_names_category_and_property() {
        let err = CoreError::ReadFailure {
            category: "Sensor".into(),
            name: "IndoorTemperature".into(),
        };
        assert_eq!(err.to_string(), "Failed to read Sensor IndoorTemperature data");
    }
}

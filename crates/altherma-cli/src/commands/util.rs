//! Shared helpers for command handlers.

use serde_json::Value;

use altherma_core::{Connection, CoreError, UnitController};

use super::Device;
use crate::cli::UnitSelector;
use crate::error::CliError;

/// Run discovery, classifying units unless `--no-guess` was given.
pub async fn discover(device: &mut Device, no_guess: bool) -> Result<usize, CliError> {
    let found = device.discover_units(!no_guess).await?;
    tracing::debug!(found, "discovery finished");
    Ok(found)
}

/// Resolve one unit by registry key.
pub fn select<'a>(device: &'a Device, key: &str) -> Result<&'a UnitController<Connection>, CliError> {
    device.unit(key).ok_or_else(|| unit_not_found(key))
}

/// The units a selector names: the one given by `--unit`, or all of them.
pub fn selected<'a>(
    device: &'a Device,
    selector: &UnitSelector,
) -> Result<Vec<(&'a str, &'a UnitController<Connection>)>, CliError> {
    match selector.unit.as_deref() {
        Some(key) => {
            let (key, unit) = device
                .units()
                .get_key_value(key)
                .ok_or_else(|| unit_not_found(key))?;
            Ok(vec![(key.as_str(), unit)])
        }
        None => Ok(device
            .units()
            .iter()
            .map(|(key, unit)| (key.as_str(), unit))
            .collect()),
    }
}

/// Resolve the single unit a command acts on: `--unit` when given,
/// otherwise the only unit when exactly one exists.
pub fn single<'a>(
    device: &'a Device,
    selector: &UnitSelector,
) -> Result<&'a UnitController<Connection>, CliError> {
    if let Some(key) = selector.unit.as_deref() {
        return select(device, key);
    }
    let mut units = device.units().values();
    match (units.next(), units.next()) {
        (Some(unit), None) => Ok(unit),
        (None, _) => Err(CliError::NotFound {
            resource_type: "Unit".into(),
            identifier: "(any)".into(),
            list_command: "discover".into(),
        }),
        (Some(_), Some(_)) => Err(CliError::Validation {
            field: "unit".into(),
            reason: "several units found; pick one with --unit".into(),
        }),
    }
}

pub fn unit_not_found(key: &str) -> CliError {
    CliError::NotFound {
        resource_type: "Unit".into(),
        identifier: key.into(),
        list_command: "discover".into(),
    }
}

/// Treat a value the unit does not carry as absent rather than failing.
pub fn optional<V>(read: Result<V, CoreError>) -> Result<Option<V>, CliError> {
    match read {
        Ok(value) => Ok(Some(value)),
        Err(e @ (CoreError::ReadFailure { .. } | CoreError::ProtocolFailure { .. })) => {
            tracing::debug!(error = %e, "value unavailable");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a command-line value: JSON when it parses, otherwise a string.
///
/// `48` becomes a number, `"on"` and `on` both become the string `on`.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

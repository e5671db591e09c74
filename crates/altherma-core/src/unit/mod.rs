// ── Unit controller ──
//
// Per-unit facade: turns "read sensor X", "write operation Y = v" or
// "read status flag Z" into a destination, gates writes through the
// validator, and hands the exchange to the shared transport.

mod climate;
mod tank;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use tokio::sync::OnceCell;
use tracing::debug;

use altherma_api::{
    CONTENT_PATH, Content, QueryOptions, RESPONSE_OK, Transport, is_success, lookup, query,
    response_code,
};

use crate::error::CoreError;
use crate::paths;
use crate::profile::CapabilityProfile;
use crate::validator::{self, truthy, wire_name};

pub use climate::{ClimateControl, ClimateControlMode, ControlConfiguration};
pub use tank::HotWaterTank;

pub const SPACE_HEATING_LABEL: &str = "function/SpaceHeating";
pub const HOT_WATER_LABEL_PREFIX: &str = "function/DomesticHotWater";
pub const ADAPTER_LABEL: &str = "function/Adapter";

// ── FunctionKind ─────────────────────────────────────────────────────

/// Behavior set of a unit, chosen once from its function label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumString, IntoStaticStr,
)]
pub enum FunctionKind {
    #[default]
    Generic,
    ClimateControl,
    HotWaterTank,
}

impl FunctionKind {
    /// Map a function label to its behavior set. Adapter and unknown labels
    /// are both `Generic`; see [`is_known_label`](Self::is_known_label).
    pub fn classify(label: &str) -> Self {
        if label == SPACE_HEATING_LABEL {
            Self::ClimateControl
        } else if label.starts_with(HOT_WATER_LABEL_PREFIX) {
            Self::HotWaterTank
        } else {
            Self::Generic
        }
    }

    /// Whether `label` is one of the function labels the unit is known to report.
    pub fn is_known_label(label: &str) -> bool {
        label == ADAPTER_LABEL || Self::classify(label) != Self::Generic
    }
}

// ── Category ─────────────────────────────────────────────────────────

/// Resource category segment of a read destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum Category {
    Sensor,
    Operation,
    UnitStatus,
    UnitIdentifier,
    UnitInfo,
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Everything a unit reports, read in one sequential pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSnapshot {
    pub unit_id: u8,
    pub label: String,
    pub sensors: IndexMap<String, Value>,
    pub operations: IndexMap<String, Value>,
    pub status_flags: IndexMap<String, bool>,
    /// Raw counters, only for units whose profile declares consumption.
    pub consumption: Option<Value>,
}

// ── UnitController ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Identity {
    name: OnceCell<Value>,
    model_number: OnceCell<Value>,
    indoor_settings: OnceCell<Value>,
    indoor_software: OnceCell<Value>,
    outdoor_software: OnceCell<Value>,
    remocon_settings: OnceCell<Value>,
    remocon_software: OnceCell<Value>,
}

/// Controller for one unit behind the adapter.
///
/// Owns the unit's [`CapabilityProfile`] and shares the device transport.
/// Identity strings (name, model, versions) are fetched on first use and
/// memoized for the controller's lifetime.
pub struct UnitController<T> {
    profile: CapabilityProfile,
    kind: FunctionKind,
    transport: Arc<T>,
    identity: Identity,
}

impl<T> fmt::Debug for UnitController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitController")
            .field("unit_id", &self.profile.unit_id())
            .field("label", &self.profile.function_label())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> UnitController<T> {
    /// Wrap `profile` with an explicit behavior set.
    pub fn new(profile: CapabilityProfile, kind: FunctionKind, transport: Arc<T>) -> Self {
        Self {
            profile,
            kind,
            transport,
            identity: Identity::default(),
        }
    }

    /// Wrap `profile`, classifying it by its function label.
    pub fn classified(profile: CapabilityProfile, transport: Arc<T>) -> Self {
        let kind = FunctionKind::classify(profile.function_label());
        Self::new(profile, kind, transport)
    }

    pub fn unit_id(&self) -> u8 {
        self.profile.unit_id()
    }

    pub fn label(&self) -> &str {
        self.profile.function_label()
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// Climate-control accessors, when this is a space-heating unit.
    pub fn as_climate_control(&self) -> Option<ClimateControl<'_, T>> {
        (self.kind == FunctionKind::ClimateControl).then(|| ClimateControl::new(self))
    }

    /// Hot-water-tank accessors, when this is a domestic hot water unit.
    pub fn as_hot_water_tank(&self) -> Option<HotWaterTank<'_, T>> {
        (self.kind == FunctionKind::HotWaterTank).then(|| HotWaterTank::new(self))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Read the latest value of `<category>/<name>`.
    pub async fn read(&self, category: Category, name: &str) -> Result<Value, CoreError> {
        let destination = paths::read(self.unit_id(), category.as_ref(), name);
        let failure = || CoreError::ReadFailure {
            category: category.to_string(),
            name: name.to_string(),
        };

        let response = self
            .transport
            .exchange(&destination, None, true)
            .await?
            .ok_or_else(failure)?;
        check_code(&destination, &response)?;
        // An answer without `con` is an absent value, not a failed read.
        lookup(&response, CONTENT_PATH).map_err(|_| failure())
    }

    pub async fn read_sensor(&self, name: &str) -> Result<Value, CoreError> {
        self.read(Category::Sensor, name).await
    }

    /// Read an operation's current value. `powerful` is read as `Powerful`.
    pub async fn read_operation(&self, name: &str) -> Result<Value, CoreError> {
        self.read(Category::Operation, wire_name(name)).await
    }

    /// Read a status flag, coerced to a boolean.
    pub async fn read_status_flag(&self, name: &str) -> Result<bool, CoreError> {
        let value = self.read(Category::UnitStatus, name).await?;
        Ok(truthy(&value))
    }

    pub async fn read_all_sensors(&self) -> Result<IndexMap<String, Value>, CoreError> {
        let mut values = IndexMap::new();
        for name in self.profile.sensors() {
            values.insert(name.clone(), self.read_sensor(name).await?);
        }
        Ok(values)
    }

    /// Read every declared operation, keyed as the profile declares them.
    pub async fn read_all_operations(&self) -> Result<IndexMap<String, Value>, CoreError> {
        let mut values = IndexMap::new();
        for name in self.profile.operation_names() {
            values.insert(name.to_string(), self.read_operation(name).await?);
        }
        Ok(values)
    }

    pub async fn read_all_status_flags(&self) -> Result<IndexMap<String, bool>, CoreError> {
        let mut values = IndexMap::new();
        for name in self.profile.status_flags() {
            values.insert(name.clone(), self.read_status_flag(name).await?);
        }
        Ok(values)
    }

    /// Raw consumption counters. A string payload is decoded as JSON.
    pub async fn read_consumption(&self) -> Result<Value, CoreError> {
        let destination = paths::consumption(self.unit_id());
        let failure = || CoreError::ReadFailure {
            category: "Consumption".into(),
            name: "la".into(),
        };

        let response = self
            .transport
            .exchange(&destination, None, true)
            .await?
            .ok_or_else(failure)?;
        check_code(&destination, &response)?;
        let content = lookup(&response, CONTENT_PATH).map_err(|_| failure())?;
        match content {
            Value::String(text) => Ok(altherma_api::query::decode(&text)?),
            other => Ok(other),
        }
    }

    /// Sensors, operations, status flags and (when declared) consumption.
    pub async fn current_snapshot(&self) -> Result<UnitSnapshot, CoreError> {
        let sensors = self.read_all_sensors().await?;
        let operations = self.read_all_operations().await?;
        let status_flags = self.read_all_status_flags().await?;
        let consumption = if self.profile.has_consumption() {
            Some(self.read_consumption().await?)
        } else {
            None
        };

        Ok(UnitSnapshot {
            unit_id: self.unit_id(),
            label: self.label().to_string(),
            sensors,
            operations,
            status_flags,
            consumption,
        })
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Call an operation and await the unit's answer.
    ///
    /// Without a value the bare destination is sent. With a value, the
    /// write is checked against the declared constraint first; a rejected
    /// value never reaches the transport. `relaxed` lets a range constraint
    /// without a `settable` flag count as settable.
    pub async fn call_operation(
        &self,
        name: &str,
        value: Option<Value>,
        relaxed: bool,
    ) -> Result<Option<Value>, CoreError> {
        let (destination, payload) = self.prepare_call(name, value, relaxed)?;
        let response = self
            .transport
            .exchange(&destination, payload.as_ref(), true)
            .await?;
        if let Some(response) = &response {
            check_code(&destination, response)?;
        }
        Ok(response)
    }

    /// Like [`call_operation`](Self::call_operation) without waiting for an answer.
    pub async fn call_operation_no_wait(
        &self,
        name: &str,
        value: Option<Value>,
        relaxed: bool,
    ) -> Result<(), CoreError> {
        let (destination, payload) = self.prepare_call(name, value, relaxed)?;
        self.transport
            .exchange(&destination, payload.as_ref(), false)
            .await?;
        Ok(())
    }

    fn prepare_call(
        &self,
        name: &str,
        value: Option<Value>,
        relaxed: bool,
    ) -> Result<(String, Option<Content>), CoreError> {
        let destination = paths::operation(self.unit_id(), wire_name(name));
        let Some(value) = value else {
            return Ok((destination, None));
        };

        let constraint = self
            .profile
            .constraint(name)
            .ok_or_else(|| CoreError::UnknownOperation {
                operation: name.to_string(),
            })?;
        if !validator::validate(name, constraint, &value, relaxed) {
            return Err(CoreError::InvalidOperationValue {
                operation: name.to_string(),
                value,
            });
        }
        debug!(unit_id = self.unit_id(), operation = name, %value, "writing operation");
        Ok((destination, Some(Content::plain(value))))
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Refetch the capability document and reparse the profile in place.
    pub async fn refresh_profile(&mut self) -> Result<(), CoreError> {
        let unit_id = self.unit_id();
        let response = self
            .transport
            .exchange(&paths::unit_profile(unit_id), None, true)
            .await?
            .ok_or_else(|| CoreError::InvalidProfile {
                unit_id,
                message: "no response".into(),
            })?;
        match response_code(&response) {
            Some(RESPONSE_OK) => {}
            Some(code) => return Err(CoreError::RefreshFailure { unit_id, code }),
            None => {
                return Err(CoreError::InvalidProfile {
                    unit_id,
                    message: "response carries no result code".into(),
                });
            }
        }
        let document = profile_document(unit_id, &response)?;
        self.profile.parse(&document)?;
        debug!(unit_id, "profile refreshed");
        Ok(())
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub async fn unit_name(&self) -> Result<&Value, CoreError> {
        self.memoized(&self.identity.name, Category::UnitIdentifier, "Name")
            .await
    }

    pub async fn model_number(&self) -> Result<&Value, CoreError> {
        self.memoized(&self.identity.model_number, Category::UnitInfo, "ModelNumber")
            .await
    }

    pub async fn indoor_settings(&self) -> Result<&Value, CoreError> {
        self.memoized(
            &self.identity.indoor_settings,
            Category::UnitInfo,
            "Version/IndoorSettings",
        )
        .await
    }

    pub async fn indoor_software(&self) -> Result<&Value, CoreError> {
        self.memoized(
            &self.identity.indoor_software,
            Category::UnitInfo,
            "Version/IndoorSoftware",
        )
        .await
    }

    pub async fn outdoor_software(&self) -> Result<&Value, CoreError> {
        self.memoized(
            &self.identity.outdoor_software,
            Category::UnitInfo,
            "Version/OutdoorSoftware",
        )
        .await
    }

    /// Settings version of the remote controller.
    pub async fn remocon_settings(&self) -> Result<&Value, CoreError> {
        self.memoized(
            &self.identity.remocon_settings,
            Category::UnitInfo,
            "Version/RemoconSettings",
        )
        .await
    }

    /// Software version of the remote controller.
    pub async fn remocon_software(&self) -> Result<&Value, CoreError> {
        self.memoized(
            &self.identity.remocon_software,
            Category::UnitInfo,
            "Version/RemoconSoftware",
        )
        .await
    }

    async fn memoized<'a>(
        &'a self,
        cell: &'a OnceCell<Value>,
        category: Category,
        name: &str,
    ) -> Result<&'a Value, CoreError> {
        cell.get_or_try_init(|| self.read(category, name)).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Fail with `ProtocolFailure` when `response` carries a non-success code.
pub(crate) fn check_code(destination: &str, response: &Value) -> Result<(), CoreError> {
    match response_code(response) {
        Some(code) if !is_success(code) => Err(CoreError::ProtocolFailure {
            destination: destination.to_string(),
            code,
        }),
        _ => Ok(()),
    }
}

/// Capability document carried by a `UnitProfile` response. The unit sends
/// it as a JSON string inside `con`.
pub(crate) fn profile_document(unit_id: u8, response: &Value) -> Result<Value, CoreError> {
    let content = query(response, CONTENT_PATH, QueryOptions::strict()).map_err(|e| {
        CoreError::InvalidProfile {
            unit_id,
            message: e.to_string(),
        }
    })?;
    match content {
        Value::String(text) => {
            altherma_api::query::decode(&text).map_err(|e| CoreError::InvalidProfile {
                unit_id,
                message: e.to_string(),
            })
        }
        other => Ok(other),
    }
}

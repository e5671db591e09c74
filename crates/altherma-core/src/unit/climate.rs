// ── Climate control accessors ──
//
// Typed view over a space-heating unit. Every accessor is a single read or
// write through the borrowed `UnitController`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use altherma_api::Transport;

use super::{Category, UnitController};
use crate::error::CoreError;

const POWER: &str = "Power";
const POWER_ON: &str = "on";
const POWER_OFF: &str = "standby";
const OPERATION_MODE: &str = "OperationMode";
const OFFSET_HEATING: &str = "LeavingWaterTemperatureOffsetHeating";
const OFFSET_COOLING: &str = "LeavingWaterTemperatureOffsetCooling";
const OFFSET_AUTO: &str = "LeavingWaterTemperatureOffsetAuto";

/// Operation mode of the space-heating loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClimateControlMode {
    Auto,
    Cooling,
    Heating,
}

/// How the leaving water temperature is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum ControlConfiguration {
    /// Follows the outdoor temperature; only an offset is settable.
    WeatherDependent,
    /// A fixed setpoint.
    Fixed,
}

/// Climate-control view of a [`UnitController`].
#[derive(Debug)]
pub struct ClimateControl<'a, T> {
    unit: &'a UnitController<T>,
}

impl<'a, T: Transport> ClimateControl<'a, T> {
    pub(super) fn new(unit: &'a UnitController<T>) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &'a UnitController<T> {
        self.unit
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Weather dependent when the heating offset is declared settable.
    pub fn heating_configuration(&self) -> ControlConfiguration {
        self.configuration(OFFSET_HEATING)
    }

    /// Weather dependent when the cooling offset is declared settable.
    pub fn cooling_configuration(&self) -> ControlConfiguration {
        self.configuration(OFFSET_COOLING)
    }

    fn configuration(&self, offset: &str) -> ControlConfiguration {
        match self.unit.profile().operations().get(offset) {
            Some(constraint) if constraint.is_settable() => ControlConfiguration::WeatherDependent,
            _ => ControlConfiguration::Fixed,
        }
    }

    // ── Sensors ──────────────────────────────────────────────────────

    pub async fn indoor_temperature(&self) -> Result<Value, CoreError> {
        self.unit.read_sensor("IndoorTemperature").await
    }

    pub async fn outdoor_temperature(&self) -> Result<Value, CoreError> {
        self.unit.read_sensor("OutdoorTemperature").await
    }

    pub async fn leaving_water_temperature_current(&self) -> Result<Value, CoreError> {
        self.unit.read_sensor("LeavingWaterTemperatureCurrent").await
    }

    // ── Power / mode ─────────────────────────────────────────────────

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.write(POWER, Value::from(POWER_ON)).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.write(POWER, Value::from(POWER_OFF)).await
    }

    pub async fn is_turned_on(&self) -> Result<bool, CoreError> {
        Ok(self.unit.read_operation(POWER).await? == POWER_ON)
    }

    pub async fn operation_mode(&self) -> Result<ClimateControlMode, CoreError> {
        let value = self.unit.read_operation(OPERATION_MODE).await?;
        match value.as_str().map(str::parse) {
            Some(Ok(mode)) => Ok(mode),
            _ => Err(CoreError::UnexpectedValue {
                field: OPERATION_MODE.into(),
                value,
            }),
        }
    }

    pub async fn set_operation_mode(&self, mode: ClimateControlMode) -> Result<(), CoreError> {
        self.write(OPERATION_MODE, Value::from(mode.as_ref())).await
    }

    // ── Leaving water temperature ────────────────────────────────────

    pub async fn leaving_water_temperature_heating(&self) -> Result<Value, CoreError> {
        self.unit
            .read_operation("LeavingWaterTemperatureHeating")
            .await
    }

    pub async fn set_leaving_water_temperature_heating(&self, value: i64) -> Result<(), CoreError> {
        self.write("LeavingWaterTemperatureHeating", Value::from(value))
            .await
    }

    pub async fn leaving_water_temperature_cooling(&self) -> Result<Value, CoreError> {
        self.unit
            .read_operation("LeavingWaterTemperatureCooling")
            .await
    }

    pub async fn set_leaving_water_temperature_cooling(&self, value: i64) -> Result<(), CoreError> {
        self.write("LeavingWaterTemperatureCooling", Value::from(value))
            .await
    }

    pub async fn leaving_water_temperature_auto(&self) -> Result<Value, CoreError> {
        self.unit.read_operation("LeavingWaterTemperatureAuto").await
    }

    pub async fn leaving_water_temperature_offset_heating(&self) -> Result<Value, CoreError> {
        self.unit.read_operation(OFFSET_HEATING).await
    }

    pub async fn set_leaving_water_temperature_offset_heating(
        &self,
        value: i64,
    ) -> Result<(), CoreError> {
        self.write(OFFSET_HEATING, Value::from(value)).await
    }

    pub async fn leaving_water_temperature_offset_cooling(&self) -> Result<Value, CoreError> {
        self.unit.read_operation(OFFSET_COOLING).await
    }

    pub async fn set_leaving_water_temperature_offset_cooling(
        &self,
        value: i64,
    ) -> Result<(), CoreError> {
        self.write(OFFSET_COOLING, Value::from(value)).await
    }

    pub async fn leaving_water_temperature_offset_auto(&self) -> Result<Value, CoreError> {
        self.unit.read_operation(OFFSET_AUTO).await
    }

    pub async fn set_leaving_water_temperature_offset_auto(
        &self,
        value: i64,
    ) -> Result<(), CoreError> {
        self.write(OFFSET_AUTO, Value::from(value)).await
    }

    // ── Status flags ─────────────────────────────────────────────────

    pub async fn states(&self) -> Result<IndexMap<String, bool>, CoreError> {
        self.unit.read_all_status_flags().await
    }

    pub async fn error_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("ErrorState").await
    }

    pub async fn installer_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("InstallerState").await
    }

    pub async fn target_temperature_overruled_state(&self) -> Result<bool, CoreError> {
        self.unit
            .read_status_flag("TargetTemperatureOverruledState")
            .await
    }

    pub async fn warning_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("WarningState").await
    }

    pub async fn emergency_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("EmergencyState").await
    }

    /// Raw `ControlModeState`, which is not a boolean.
    pub async fn control_mode_state(&self) -> Result<Value, CoreError> {
        self.unit
            .read(Category::UnitStatus, "ControlModeState")
            .await
    }

    async fn write(&self, operation: &str, value: Value) -> Result<(), CoreError> {
        self.unit
            .call_operation(operation, Some(value), true)
            .await
            .map(drop)
    }
}

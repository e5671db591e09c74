// ── Hot water tank accessors ──

use indexmap::IndexMap;
use serde_json::Value;

use altherma_api::Transport;

use super::UnitController;
use crate::error::CoreError;

const POWER: &str = "Power";
const POWER_ON: &str = "on";
const POWER_OFF: &str = "standby";
const POWERFUL: &str = "Powerful";
const TARGET_TEMPERATURE: &str = "TargetTemperature";
const DHW_HEATING: &str = "DomesticHotWaterTemperatureHeating";

/// Hot-water-tank view of a [`UnitController`].
#[derive(Debug)]
pub struct HotWaterTank<'a, T> {
    unit: &'a UnitController<T>,
}

impl<'a, T: Transport> HotWaterTank<'a, T> {
    pub(super) fn new(unit: &'a UnitController<T>) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &'a UnitController<T> {
        self.unit
    }

    pub async fn tank_temperature(&self) -> Result<Value, CoreError> {
        self.unit.read_sensor("TankTemperature").await
    }

    pub async fn target_temperature(&self) -> Result<Value, CoreError> {
        self.unit.read_operation(TARGET_TEMPERATURE).await
    }

    pub async fn set_target_temperature(&self, value: f64) -> Result<(), CoreError> {
        self.write(TARGET_TEMPERATURE, Value::from(value)).await
    }

    /// Whether powerful (boost) mode is active. The unit reports `"1"` or `1`.
    pub async fn powerful(&self) -> Result<bool, CoreError> {
        let value = self.unit.read_operation(POWERFUL).await?;
        Ok(match &value {
            Value::String(s) => s == "1",
            Value::Number(n) => n.as_i64() == Some(1),
            _ => false,
        })
    }

    pub async fn set_powerful(&self, on: bool) -> Result<(), CoreError> {
        self.write(POWERFUL, Value::from(i64::from(on))).await
    }

    pub async fn domestic_hot_water_temperature_heating(&self) -> Result<Value, CoreError> {
        self.unit.read_operation(DHW_HEATING).await
    }

    pub async fn set_domestic_hot_water_temperature_heating(
        &self,
        value: f64,
    ) -> Result<(), CoreError> {
        self.write(DHW_HEATING, Value::from(value)).await
    }

    pub async fn turn_on(&self) -> Result<(), CoreError> {
        self.write(POWER, Value::from(POWER_ON)).await
    }

    pub async fn turn_off(&self) -> Result<(), CoreError> {
        self.write(POWER, Value::from(POWER_OFF)).await
    }

    pub async fn is_turned_on(&self) -> Result<bool, CoreError> {
        Ok(self.unit.read_operation(POWER).await? == POWER_ON)
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

    pub async fn weather_dependent_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("WeatherDependentState").await
    }

    pub async fn warning_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("WarningState").await
    }

    pub async fn emergency_state(&self) -> Result<bool, CoreError> {
        self.unit.read_status_flag("EmergencyState").await
    }

    async fn write(&self, operation: &str, value: Value) -> Result<(), CoreError> {
        self.unit
            .call_operation(operation, Some(value), true)
            .await
            .map(drop)
    }
}

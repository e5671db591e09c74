// ── Device controller ──
//
// Top-level orchestrator for one adapter. Scans the unit slots, builds a
// classified `UnitController` per unit, and answers device-wide questions
// through the base (adapter) unit.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use altherma_api::{RESPONSE_OK, Transport, lookup, response_code};

use crate::error::CoreError;
use crate::observer::{DeviceObserver, ScanStop, TracingObserver};
use crate::paths;
use crate::profile::CapabilityProfile;
use crate::unit::{
    ADAPTER_LABEL, ClimateControl, FunctionKind, HotWaterTank, UnitController, UnitSnapshot,
    check_code, profile_document,
};

/// Slots probed during discovery. The protocol has no unit count.
pub const MAX_UNITS: u8 = 10;

const BASE_UNIT_KEY: &str = "0";
const ERROR_STATE: &str = "ErrorState";

// ── Device-wide documents ────────────────────────────────────────────

/// Identity of the adapter node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub duty: Option<String>,
}

/// Adapter firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FirmwareInfo {
    pub firmware_id: Option<String>,
    pub version: Option<String>,
}

// ── DeviceController ─────────────────────────────────────────────────

/// All units behind one adapter, sharing one transport.
///
/// Units are registered by function label, or by slot index when type
/// guessing is off. The climate-control, hot-water-tank and base-unit
/// designations are keys into that registry.
pub struct DeviceController<T> {
    transport: Arc<T>,
    observer: Arc<dyn DeviceObserver>,
    units: IndexMap<String, UnitController<T>>,
    base_unit: Option<String>,
    climate_control: Option<String>,
    hot_water_tank: Option<String>,
}

impl<T> fmt::Debug for DeviceController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceController")
            .field("units", &self.units)
            .field("base_unit", &self.base_unit)
            .field("climate_control", &self.climate_control)
            .field("hot_water_tank", &self.hot_water_tank)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> DeviceController<T> {
    /// A controller with no units yet, reporting through `tracing`.
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_observer(transport, Arc::new(TracingObserver))
    }

    pub fn with_observer(transport: Arc<T>, observer: Arc<dyn DeviceObserver>) -> Self {
        Self {
            transport,
            observer,
            units: IndexMap::new(),
            base_unit: None,
            climate_control: None,
            hot_water_tank: None,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Probe slots `0..MAX_UNITS` and register every unit that answers.
    ///
    /// The scan ends at the first slot that fails, whether the unit
    /// answered with an error code or the exchange itself failed; the
    /// reason goes to the observer. With `guess_types`, units are
    /// classified by label and registered under it; otherwise every unit
    /// is generic and registered under its slot index. Any previous
    /// registry is discarded. Returns the number of units found.
    pub async fn discover_units(&mut self, guess_types: bool) -> Result<usize, CoreError> {
        self.units.clear();
        self.base_unit = None;
        self.climate_control = None;
        self.hot_water_tank = None;
        let mut adapter = None;

        for slot in 0..MAX_UNITS {
            let response = match self
                .transport
                .exchange(&paths::unit_profile(slot), None, true)
                .await
            {
                Ok(Some(response)) => response,
                Ok(None) => {
                    self.observer.scan_stopped(slot, &ScanStop::NoResponse);
                    break;
                }
                Err(e) => {
                    let error = CoreError::from(e);
                    self.observer
                        .scan_stopped(slot, &ScanStop::Transport(&error));
                    break;
                }
            };
            match response_code(&response) {
                Some(RESPONSE_OK) => {}
                Some(code) => {
                    self.observer.scan_stopped(slot, &ScanStop::Code(code));
                    break;
                }
                None => {
                    self.observer.scan_stopped(slot, &ScanStop::NoResponse);
                    break;
                }
            }

            let document = profile_document(slot, &response)?;
            let label = self.fetch_label(slot).await;
            let profile = CapabilityProfile::from_document(slot, label.clone(), &document)?;

            let kind = if guess_types {
                if !FunctionKind::is_known_label(&label) {
                    self.observer.discovery_warning(
                        slot,
                        &format!("unrecognized function label {label:?}, registering as generic"),
                    );
                }
                FunctionKind::classify(&label)
            } else {
                FunctionKind::Generic
            };

            let mut key = if guess_types && !label.is_empty() {
                label.clone()
            } else {
                slot.to_string()
            };
            if self.units.contains_key(&key) {
                self.observer.discovery_warning(
                    slot,
                    &format!("label {key:?} already registered, registering under slot index"),
                );
                key = slot.to_string();
            }

            if label == ADAPTER_LABEL && adapter.is_none() {
                adapter = Some(key.clone());
            }
            match kind {
                FunctionKind::ClimateControl if self.climate_control.is_none() => {
                    self.climate_control = Some(key.clone());
                }
                FunctionKind::HotWaterTank if self.hot_water_tank.is_none() => {
                    self.hot_water_tank = Some(key.clone());
                }
                _ => {}
            }

            self.observer.unit_discovered(slot, &key, &label, kind);
            self.units.insert(
                key,
                UnitController::new(profile, kind, Arc::clone(&self.transport)),
            );
        }

        self.base_unit = adapter.or_else(|| self.fallback_base_unit());
        debug!(
            units = self.units.len(),
            base_unit = ?self.base_unit,
            "discovery finished"
        );
        Ok(self.units.len())
    }

    /// The unit registered as `"0"`, else the unit at slot 0.
    fn fallback_base_unit(&self) -> Option<String> {
        if self.units.contains_key(BASE_UNIT_KEY) {
            return Some(BASE_UNIT_KEY.to_string());
        }
        self.units
            .iter()
            .find(|(_, unit)| unit.unit_id() == 0)
            .map(|(key, _)| key.clone())
    }

    /// Function label of `slot`, or an empty label if it cannot be read.
    async fn fetch_label(&self, slot: u8) -> String {
        let destination = paths::unit(slot);
        let label = match self.transport.exchange(&destination, None, true).await {
            Ok(Some(response)) => match check_code(&destination, &response) {
                Ok(()) => lookup(&response, paths::LABEL_PATH)
                    .ok()
                    .and_then(|label| label.as_str().map(String::from)),
                Err(_) => None,
            },
            Ok(None) | Err(_) => None,
        };
        label.unwrap_or_else(|| {
            self.observer
                .discovery_warning(slot, "function label unavailable, using an empty label");
            String::new()
        })
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn units(&self) -> &IndexMap<String, UnitController<T>> {
        &self.units
    }

    pub fn unit(&self, key: &str) -> Option<&UnitController<T>> {
        self.units.get(key)
    }

    pub fn unit_mut(&mut self, key: &str) -> Option<&mut UnitController<T>> {
        self.units.get_mut(key)
    }

    /// Unit used for device-wide status queries.
    pub fn base_unit(&self) -> Option<&UnitController<T>> {
        self.base_unit.as_deref().and_then(|key| self.units.get(key))
    }

    pub fn climate_control(&self) -> Option<ClimateControl<'_, T>> {
        self.climate_control
            .as_deref()
            .and_then(|key| self.units.get(key))
            .and_then(UnitController::as_climate_control)
    }

    pub fn hot_water_tank(&self) -> Option<HotWaterTank<'_, T>> {
        self.hot_water_tank
            .as_deref()
            .and_then(|key| self.units.get(key))
            .and_then(UnitController::as_hot_water_tank)
    }

    // ── Device-wide queries ──────────────────────────────────────────

    /// `ErrorState` flag of the base unit.
    pub async fn device_error_state(&self) -> Result<bool, CoreError> {
        let base = self.base_unit().ok_or(CoreError::NoBaseUnit)?;
        base.read_status_flag(ERROR_STATE).await
    }

    pub async fn device_info(&self) -> Result<DeviceInfo, CoreError> {
        let response = self.node_document(paths::DEVICE_INFO, "deviceInfo").await?;
        let field = |name: &str| text_field(&response, &format!("m2m:rsp/pc/m2m:dvi/{name}"));
        Ok(DeviceInfo {
            serial_number: field("dlb"),
            manufacturer: field("man"),
            model: field("mod"),
            duty: field("dty"),
        })
    }

    pub async fn firmware_info(&self) -> Result<FirmwareInfo, CoreError> {
        let response = self.node_document(paths::FIRMWARE, "firmware").await?;
        let field = |name: &str| text_field(&response, &format!("m2m:rsp/pc/m2m:fwr/{name}"));
        Ok(FirmwareInfo {
            firmware_id: field("fwnnam"),
            version: field("vr"),
        })
    }

    async fn node_document(&self, destination: &str, name: &str) -> Result<Value, CoreError> {
        let response = self
            .transport
            .exchange(destination, None, true)
            .await?
            .ok_or_else(|| CoreError::ReadFailure {
                category: "MNCSE-node".into(),
                name: name.into(),
            })?;
        check_code(destination, &response)?;
        Ok(response)
    }

    // ── Batch operations ─────────────────────────────────────────────

    /// Refresh every unit's profile in registry order.
    ///
    /// A failing unit is reported to the observer and skipped. Returns the
    /// number of units that failed.
    pub async fn refresh_all(&mut self) -> usize {
        let mut failed = 0;
        for (key, unit) in &mut self.units {
            if let Err(error) = unit.refresh_profile().await {
                self.observer.refresh_failed(key, &error);
                failed += 1;
            }
        }
        failed
    }

    /// Snapshot of every unit, keyed like the registry. Stops at the first
    /// failing read.
    pub async fn snapshot(&self) -> Result<IndexMap<String, UnitSnapshot>, CoreError> {
        let mut snapshots = IndexMap::new();
        for (key, unit) in &self.units {
            snapshots.insert(key.clone(), unit.current_snapshot().await?);
        }
        Ok(snapshots)
    }

    /// Close the shared connection.
    pub async fn close(&self) -> Result<(), CoreError> {
        self.transport.close().await?;
        Ok(())
    }
}

/// String form of a scalar field; `None` when absent or null.
fn text_field(response: &Value, path: &str) -> Option<String> {
    match lookup(response, path).ok()? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// altherma-core: capability profiles, write validation and unit/device controllers.

pub mod constraint;
pub mod device;
pub mod error;
pub mod observer;
pub mod paths;
pub mod profile;
pub mod unit;
pub mod validator;

// ── Primary re-exports ──────────────────────────────────────────────
pub use constraint::{Constraint, RangeConstraint};
pub use device::{DeviceController, DeviceInfo, FirmwareInfo, MAX_UNITS};
pub use error::CoreError;
pub use observer::{DeviceObserver, NoopObserver, ScanStop, TracingObserver};
pub use profile::{CapabilityProfile, ConsumptionAction, ConsumptionContent, ConsumptionType};
pub use unit::{
    Category, ClimateControl, ClimateControlMode, ControlConfiguration, FunctionKind,
    HotWaterTank, UnitController, UnitSnapshot,
};

// The transport seam, so consumers need only this crate.
pub use altherma_api::{Connection, ConnectionConfig, Transport};

// Scripted transport and canned documents shared by the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use altherma_api::{Content, Error, Transport};
use altherma_core::{CoreError, DeviceObserver, FunctionKind, ScanStop};

// ── Responses ───────────────────────────────────────────────────────

/// A 2000 response carrying `con`.
pub fn content(con: Value) -> Value {
    json!({ "m2m:rsp": { "rsc": 2000, "pc": { "m2m:cin": { "con": con } } } })
}

/// A response with only a result code.
pub fn code(rsc: i64) -> Value {
    json!({ "m2m:rsp": { "rsc": rsc } })
}

/// A capability document response; the unit sends the document as a string.
pub fn profile(document: &Value) -> Value {
    content(Value::String(document.to_string()))
}

/// A unit resource response carrying its function label.
pub fn label(label: &str) -> Value {
    json!({ "m2m:rsp": { "rsc": 2000, "pc": { "m2m:cnt": { "lbl": label } } } })
}

// ── Documents ───────────────────────────────────────────────────────

pub fn adapter_document() -> Value {
    json!({
        "SyncStatus": "reg",
        "Sensor": [],
        "UnitStatus": ["ErrorState"],
        "Operation": {}
    })
}

pub fn climate_document() -> Value {
    json!({
        "SyncStatus": "reg",
        "Sensor": ["IndoorTemperature", "OutdoorTemperature", "LeavingWaterTemperatureCurrent"],
        "UnitStatus": ["ErrorState", "WarningState"],
        "Operation": {
            "Power": ["on", "standby"],
            "OperationMode": ["auto", "cooling", "heating"],
            "LeavingWaterTemperatureOffsetHeating": {
                "settable": true, "maxValue": 10, "minValue": -10, "stepValue": 1
            },
            "LeavingWaterTemperatureOffsetCooling": {
                "settable": false, "maxValue": 10, "minValue": -10, "stepValue": 1
            },
            "LeavingWaterTemperatureHeating": {
                "settable": false,
                "heating": { "settable": false, "maxValue": 55, "minValue": 25, "stepValue": 1 }
            }
        }
    })
}

pub fn tank_document() -> Value {
    json!({
        "SyncStatus": "reg",
        "Sensor": ["TankTemperature"],
        "UnitStatus": ["ErrorState", "InstallerState", "WeatherDependentState"],
        "Operation": {
            "Power": ["on", "standby"],
            "TargetTemperature": { "settable": true, "maxValue": 60, "minValue": 30, "stepValue": 1 },
            "powerful": ["0", "1"],
            "DomesticHotWaterTemperatureHeating": { "maxValue": 60, "minValue": 30 }
        },
        "Consumption": {
            "Electrical": {
                "unit": "kWh",
                "Heating": { "D": { "contentCount": 24, "resolution": 1 } }
            }
        }
    })
}

// ── StubTransport ───────────────────────────────────────────────────

/// How the stub answers one destination.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(Value),
    /// Answer nothing.
    Silent,
    /// Fail the exchange as if the peer hung up.
    Closed,
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub destination: String,
    pub payload: Option<Value>,
    pub expect_response: bool,
}

/// Transport that answers from a destination table and records every call.
/// Unscripted destinations answer with result code 4004.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
    closed: Mutex<bool>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, destination: &str, reply: Reply) -> Self {
        self.set(destination, reply);
        self
    }

    pub fn respond(self, destination: &str, response: Value) -> Self {
        self.on(destination, Reply::Respond(response))
    }

    /// Script a unit at `slot`: its capability document and function label.
    pub fn unit(self, slot: u8, function_label: &str, document: &Value) -> Self {
        self.respond(&format!("[0]/MNAE/{slot}/UnitProfile/la"), profile(document))
            .respond(&format!("[0]/MNAE/{slot}"), label(function_label))
    }

    pub fn set(&self, destination: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert(destination.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn destinations(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.destination).collect()
    }

    pub fn count(&self, destination: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.destination == destination)
            .count()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl Transport for StubTransport {
    async fn connect(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn exchange(
        &self,
        destination: &str,
        payload: Option<&Content>,
        expect_response: bool,
    ) -> Result<Option<Value>, Error> {
        self.calls.lock().unwrap().push(Call {
            destination: destination.to_string(),
            payload: payload.map(|p| serde_json::to_value(p).unwrap()),
            expect_response,
        });
        let reply = self.routes.lock().unwrap().get(destination).cloned();
        match reply {
            Some(Reply::Respond(response)) if expect_response => Ok(Some(response)),
            Some(Reply::Respond(_) | Reply::Silent) => Ok(None),
            Some(Reply::Closed) => Err(Error::ConnectionClosed),
            None if expect_response => Ok(Some(code(4004))),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Error> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

// ── RecordingObserver ───────────────────────────────────────────────

/// Observer that keeps a line per event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl DeviceObserver for RecordingObserver {
    fn unit_discovered(&self, slot: u8, key: &str, _label: &str, kind: FunctionKind) {
        self.push(format!("discovered {slot} {key} {kind}"));
    }

    fn scan_stopped(&self, slot: u8, reason: &ScanStop<'_>) {
        let reason = match reason {
            ScanStop::Code(code) => format!("code {code}"),
            ScanStop::Transport(_) => "transport".to_string(),
            ScanStop::NoResponse => "no response".to_string(),
        };
        self.push(format!("stopped {slot} {reason}"));
    }

    fn discovery_warning(&self, slot: u8, message: &str) {
        self.push(format!("warning {slot} {message}"));
    }

    fn refresh_failed(&self, key: &str, _error: &CoreError) {
        self.push(format!("refresh failed {key}"));
    }
}

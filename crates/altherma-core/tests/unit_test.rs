#![allow(clippy::unwrap_used)]
// UnitController reads, writes, refresh and snapshots against a scripted transport.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use altherma_core::{CapabilityProfile, CoreError, FunctionKind, UnitController};
use common::{Call, Reply, StubTransport, climate_document, code, content, profile, tank_document};

fn tank(stub: StubTransport) -> (Arc<StubTransport>, UnitController<StubTransport>) {
    let stub = Arc::new(stub);
    let profile =
        CapabilityProfile::from_document(2, "function/DomesticHotWaterTank", &tank_document())
            .unwrap();
    let unit = UnitController::classified(profile, Arc::clone(&stub));
    (stub, unit)
}

fn climate(stub: StubTransport) -> (Arc<StubTransport>, UnitController<StubTransport>) {
    let stub = Arc::new(stub);
    let profile =
        CapabilityProfile::from_document(1, "function/SpaceHeating", &climate_document()).unwrap();
    let unit = UnitController::classified(profile, Arc::clone(&stub));
    (stub, unit)
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_sensor_extracts_content() {
    let stub = StubTransport::new().respond("/[0]/MNAE/2/Sensor/TankTemperature/la", content(json!(48)));
    let (stub, unit) = tank(stub);

    assert_eq!(unit.read_sensor("TankTemperature").await.unwrap(), json!(48));
    assert_eq!(
        stub.calls(),
        vec![Call {
            destination: "/[0]/MNAE/2/Sensor/TankTemperature/la".into(),
            payload: None,
            expect_response: true,
        }]
    );
}

#[tokio::test]
async fn test_read_operation_normalizes_powerful() {
    let stub = StubTransport::new().respond("/[0]/MNAE/2/Operation/Powerful/la", content(json!("0")));
    let (_stub, unit) = tank(stub);

    assert_eq!(unit.read_operation("powerful").await.unwrap(), json!("0"));
    assert_eq!(unit.read_operation("Powerful").await.unwrap(), json!("0"));
}

#[tokio::test]
async fn test_read_status_flag_coerces_to_bool() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/2/UnitStatus/ErrorState/la", content(json!(0)))
        .respond("/[0]/MNAE/2/UnitStatus/InstallerState/la", content(json!(1)))
        .respond("/[0]/MNAE/2/UnitStatus/WeatherDependentState/la", content(json!(null)));
    let (_stub, unit) = tank(stub);

    let flags = unit.read_all_status_flags().await.unwrap();

    assert_eq!(
        flags.into_iter().collect::<Vec<_>>(),
        vec![
            ("ErrorState".to_string(), false),
            ("InstallerState".to_string(), true),
            ("WeatherDependentState".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_missing_content_reads_as_null() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/2/Sensor/TankTemperature/la", code(2000))
        .respond("/[0]/MNAE/2/UnitStatus/ErrorState/la", code(2000))
        .respond("/[0]/MNAE/2/UnitStatus/InstallerState/la", code(2000))
        .respond("/[0]/MNAE/2/UnitStatus/WeatherDependentState/la", code(2000));
    let (_stub, unit) = tank(stub);

    assert_eq!(unit.read_sensor("TankTemperature").await.unwrap(), Value::Null);
    assert!(!unit.read_status_flag("InstallerState").await.unwrap());

    let flags = unit.read_all_status_flags().await.unwrap();
    assert!(flags.values().all(|flag| !flag));
}

#[tokio::test]
async fn test_silent_read_is_read_failure() {
    let stub = StubTransport::new().on("/[0]/MNAE/2/Sensor/TankTemperature/la", Reply::Silent);
    let (_stub, unit) = tank(stub);

    let err = unit.read_sensor("TankTemperature").await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to read Sensor TankTemperature data");
}

#[tokio::test]
async fn test_error_code_is_protocol_failure() {
    let (_stub, unit) = tank(StubTransport::new());

    let err = unit.read_sensor("TankTemperature").await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::ProtocolFailure { ref destination, code: 4004 }
            if destination == "/[0]/MNAE/2/Sensor/TankTemperature/la"
    ));
}

#[tokio::test]
async fn test_transport_error_propagates_unchanged() {
    let stub = StubTransport::new().on("/[0]/MNAE/2/Sensor/TankTemperature/la", Reply::Closed);
    let (_stub, unit) = tank(stub);

    let err = unit.read_sensor("TankTemperature").await.unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn test_batch_read_aborts_on_first_failure() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/1/Sensor/IndoorTemperature/la", content(json!(21.5)))
        .respond("/[0]/MNAE/1/Sensor/LeavingWaterTemperatureCurrent/la", content(json!(35)));
    let (stub, unit) = climate(stub);

    let err = unit.read_all_sensors().await.unwrap_err();

    assert!(matches!(err, CoreError::ProtocolFailure { .. }));
    assert_eq!(stub.count("/[0]/MNAE/1/Sensor/LeavingWaterTemperatureCurrent/la"), 0);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_write_never_reaches_transport() {
    let (stub, unit) = tank(StubTransport::new());

    let err = unit
        .call_operation("TargetTemperature", Some(json!(75)), true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::InvalidOperationValue { ref operation, ref value }
            if operation == "TargetTemperature" && *value == json!(75)
    ));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_unsettable_write_is_rejected_locally() {
    let (stub, unit) = climate(StubTransport::new());

    let err = unit
        .call_operation("LeavingWaterTemperatureOffsetCooling", Some(json!(2)), true)
        .await
        .unwrap_err();

    assert!(err.is_rejected_locally());
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_operation_is_rejected_locally() {
    let (stub, unit) = tank(StubTransport::new());

    let err = unit
        .call_operation("FanSpeed", Some(json!(3)), true)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::UnknownOperation { ref operation } if operation == "FanSpeed"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_valid_write_sends_plain_payload() {
    let stub = StubTransport::new().respond("/[0]/MNAE/2/Operation/TargetTemperature", code(2001));
    let (stub, unit) = tank(stub);

    let response = unit
        .call_operation("TargetTemperature", Some(json!(50)), true)
        .await
        .unwrap();

    assert_eq!(response, Some(code(2001)));
    assert_eq!(
        stub.calls(),
        vec![Call {
            destination: "/[0]/MNAE/2/Operation/TargetTemperature".into(),
            payload: Some(json!({ "con": 50, "cnf": "text/plain:0" })),
            expect_response: true,
        }]
    );
}

#[tokio::test]
async fn test_relaxed_controls_missing_settable() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/2/Operation/DomesticHotWaterTemperatureHeating", code(2001));
    let (stub, unit) = tank(stub);

    let strict = unit
        .call_operation("DomesticHotWaterTemperatureHeating", Some(json!(45)), false)
        .await;
    assert!(matches!(strict, Err(CoreError::InvalidOperationValue { .. })));
    assert!(stub.calls().is_empty());

    unit.call_operation("DomesticHotWaterTemperatureHeating", Some(json!(45)), true)
        .await
        .unwrap();
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn test_nested_heating_write_uses_heating_bounds() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/1/Operation/LeavingWaterTemperatureHeating", code(2001));
    let (stub, unit) = climate(stub);

    unit.call_operation("LeavingWaterTemperatureHeating", Some(json!(40)), false)
        .await
        .unwrap();
    let err = unit
        .call_operation("LeavingWaterTemperatureHeating", Some(json!(60)), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidOperationValue { .. }));
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn test_rejected_write_is_protocol_failure() {
    let stub = StubTransport::new().respond("/[0]/MNAE/2/Operation/Power", code(4000));
    let (_stub, unit) = tank(stub);

    let err = unit
        .call_operation("Power", Some(json!("on")), true)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProtocolFailure { code: 4000, .. }));
}

#[tokio::test]
async fn test_bare_call_sends_no_payload() {
    let stub = StubTransport::new().respond("/[0]/MNAE/2/Operation/Power", content(json!("on")));
    let (stub, unit) = tank(stub);

    unit.call_operation("Power", None, true).await.unwrap();

    let calls = stub.calls();
    assert_eq!(calls[0].payload, None);
    assert!(calls[0].expect_response);
}

#[tokio::test]
async fn test_no_wait_write_does_not_expect_response() {
    let (stub, unit) = tank(StubTransport::new());

    unit.call_operation_no_wait("powerful", Some(json!(1)), true)
        .await
        .unwrap();

    assert_eq!(
        stub.calls(),
        vec![Call {
            destination: "/[0]/MNAE/2/Operation/Powerful".into(),
            payload: Some(json!({ "con": 1, "cnf": "text/plain:0" })),
            expect_response: false,
        }]
    );
}

// ── Profile refresh ─────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_reparses_in_place() {
    let stub = StubTransport::new().respond(
        "[0]/MNAE/2/UnitProfile/la",
        profile(&json!({ "Sensor": ["TankTemperature", "TankTemperatureLower"] })),
    );
    let (_stub, mut unit) = tank(stub);
    let operations_before = unit.profile().operations().clone();

    unit.refresh_profile().await.unwrap();

    assert_eq!(
        unit.profile().sensors(),
        ["TankTemperature", "TankTemperatureLower"]
    );
    assert_eq!(unit.profile().operations(), &operations_before);
    assert_eq!(unit.unit_id(), 2);
    assert_eq!(unit.label(), "function/DomesticHotWaterTank");
}

#[tokio::test]
async fn test_refresh_requires_ok_code() {
    let stub = StubTransport::new().respond("[0]/MNAE/2/UnitProfile/la", code(2001));
    let (_stub, mut unit) = tank(stub);

    let err = unit.refresh_profile().await.unwrap_err();

    assert!(matches!(err, CoreError::RefreshFailure { unit_id: 2, code: 2001 }));
    assert_eq!(unit.profile().sensors(), ["TankTemperature"]);
}

// ── Snapshot and identity ───────────────────────────────────────────

#[tokio::test]
async fn test_snapshot_includes_declared_consumption() {
    let consumption = json!({ "Electrical": { "Heating": { "D": [0, 1, 2] } } });
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/2/Sensor/TankTemperature/la", content(json!(47)))
        .respond("/[0]/MNAE/2/Operation/Power/la", content(json!("on")))
        .respond("/[0]/MNAE/2/Operation/TargetTemperature/la", content(json!(50)))
        .respond("/[0]/MNAE/2/Operation/Powerful/la", content(json!("0")))
        .respond(
            "/[0]/MNAE/2/Operation/DomesticHotWaterTemperatureHeating/la",
            content(json!(45)),
        )
        .respond("/[0]/MNAE/2/UnitStatus/ErrorState/la", content(json!(0)))
        .respond("/[0]/MNAE/2/UnitStatus/InstallerState/la", content(json!(0)))
        .respond("/[0]/MNAE/2/UnitStatus/WeatherDependentState/la", content(json!(1)))
        .respond(
            "/[0]/MNAE/2/Consumption/la",
            content(Value::String(consumption.to_string())),
        );
    let (_stub, unit) = tank(stub);

    let snapshot = unit.current_snapshot().await.unwrap();

    assert_eq!(snapshot.unit_id, 2);
    assert_eq!(snapshot.label, "function/DomesticHotWaterTank");
    assert_eq!(snapshot.sensors["TankTemperature"], json!(47));
    assert_eq!(
        snapshot.operations.keys().collect::<Vec<_>>(),
        ["Power", "TargetTemperature", "powerful", "DomesticHotWaterTemperatureHeating"]
    );
    assert!(snapshot.status_flags["WeatherDependentState"]);
    assert_eq!(snapshot.consumption, Some(consumption));
}

#[tokio::test]
async fn test_snapshot_skips_consumption_when_undeclared() {
    let stub = StubTransport::new();
    let profile = CapabilityProfile::from_document(5, "function/Adapter", &json!({})).unwrap();
    let stub = Arc::new(stub);
    let unit = UnitController::new(profile, FunctionKind::Generic, Arc::clone(&stub));

    let snapshot = unit.current_snapshot().await.unwrap();

    assert_eq!(snapshot.consumption, None);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_identity_is_memoized() {
    let stub = StubTransport::new()
        .respond("/[0]/MNAE/2/UnitIdentifier/Name/la", content(json!("Tank")))
        .respond(
            "/[0]/MNAE/2/UnitInfo/Version/IndoorSoftware/la",
            content(json!("ID66F2")),
        );
    let (stub, unit) = tank(stub);

    assert_eq!(unit.unit_name().await.unwrap(), &json!("Tank"));
    assert_eq!(unit.unit_name().await.unwrap(), &json!("Tank"));
    assert_eq!(unit.indoor_software().await.unwrap(), &json!("ID66F2"));

    assert_eq!(stub.count("/[0]/MNAE/2/UnitIdentifier/Name/la"), 1);
}

#[tokio::test]
async fn test_failed_identity_read_is_retried_next_call() {
    let (stub, unit) = tank(StubTransport::new());

    assert!(unit.model_number().await.is_err());
    stub.set(
        "/[0]/MNAE/2/UnitInfo/ModelNumber/la",
        Reply::Respond(content(json!("EHBH08D6V"))),
    );

    assert_eq!(unit.model_number().await.unwrap(), &json!("EHBH08D6V"));
}

// ── Typed views ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_views_follow_kind() {
    let (_stub, tank_unit) = tank(StubTransport::new());
    assert!(tank_unit.as_hot_water_tank().is_some());
    assert!(tank_unit.as_climate_control().is_none());

    let (_stub, climate_unit) = climate(StubTransport::new());
    assert!(climate_unit.as_climate_control().is_some());
    assert!(climate_unit.as_hot_water_tank().is_none());
}

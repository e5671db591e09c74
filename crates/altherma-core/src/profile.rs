// ── Capability profile ──
//
// A unit's self-description: which sensors it exposes, which operations can
// be read/written (and within which constraints), which status flags it
// reports and which energy counters it keeps. Parsed from the `con` payload
// of `[0]/MNAE/<id>/UnitProfile/la`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constraint::Constraint;
use crate::error::CoreError;
use crate::validator::profile_key;

const SYNC_STATUS: &str = "SyncStatus";
const SENSOR: &str = "Sensor";
const UNIT_STATUS: &str = "UnitStatus";
const OPERATION: &str = "Operation";
const CONSUMPTION: &str = "Consumption";

// ── CapabilityProfile ────────────────────────────────────────────────

/// Parsed capability document of one unit.
///
/// `unit_id` and `function_label` are fixed at construction; every other
/// field is replaced by [`parse`](Self::parse) when the corresponding
/// section is present and kept otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityProfile {
    unit_id: u8,
    function_label: String,
    sync_status: Option<Value>,
    sensors: Vec<String>,
    operations: IndexMap<String, Constraint>,
    status_flags: Vec<String>,
    consumption_types: IndexMap<String, ConsumptionType>,
}

impl CapabilityProfile {
    /// An empty profile for `unit_id`, to be filled by [`parse`](Self::parse).
    pub fn new(unit_id: u8, function_label: impl Into<String>) -> Self {
        Self {
            unit_id,
            function_label: function_label.into(),
            sync_status: None,
            sensors: Vec::new(),
            operations: IndexMap::new(),
            status_flags: Vec::new(),
            consumption_types: IndexMap::new(),
        }
    }

    /// Build a profile from a capability document in one go.
    pub fn from_document(
        unit_id: u8,
        function_label: impl Into<String>,
        document: &Value,
    ) -> Result<Self, CoreError> {
        let mut profile = Self::new(unit_id, function_label);
        profile.parse(document)?;
        Ok(profile)
    }

    /// Replace derived fields from the sections present in `document`.
    ///
    /// Idempotent. Sections missing from `document` leave their field
    /// untouched, so a partial document is an incremental update.
    pub fn parse(&mut self, document: &Value) -> Result<(), CoreError> {
        let Value::Object(sections) = document else {
            return Err(CoreError::InvalidProfile {
                unit_id: self.unit_id,
                message: format!("expected an object, got {}", type_name(document)),
            });
        };

        if let Some(sync) = sections.get(SYNC_STATUS) {
            self.sync_status = Some(sync.clone());
        }
        if let Some(sensors) = sections.get(SENSOR) {
            self.sensors = string_list(sensors);
        }
        if let Some(flags) = sections.get(UNIT_STATUS) {
            self.status_flags = string_list(flags);
        }
        if let Some(Value::Object(operations)) = sections.get(OPERATION) {
            self.operations = operations
                .iter()
                .map(|(name, spec)| (name.clone(), Constraint::from_value(spec)))
                .collect();
        }
        if let Some(consumption) = sections.get(CONSUMPTION) {
            self.consumption_types = match parse_consumption(consumption) {
                Ok(types) => types,
                Err(reason) => {
                    tracing::debug!(unit_id = self.unit_id, reason, "ignoring malformed consumption section");
                    IndexMap::new()
                }
            };
        }
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    pub fn function_label(&self) -> &str {
        &self.function_label
    }

    /// Raw `SyncStatus` section, if the unit reported one.
    pub fn sync_status(&self) -> Option<&Value> {
        self.sync_status.as_ref()
    }

    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    pub fn has_sensor(&self, name: &str) -> bool {
        self.sensors.iter().any(|s| s == name)
    }

    pub fn status_flags(&self) -> &[String] {
        &self.status_flags
    }

    pub fn operations(&self) -> &IndexMap<String, Constraint> {
        &self.operations
    }

    /// Operation names in device order, as declared (`powerful` stays lower-case).
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Constraint for `name`, resolving the powerful-family casing first
    /// and falling back to the name as given.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.operations
            .get(profile_key(name))
            .or_else(|| self.operations.get(name))
    }

    pub fn consumption_types(&self) -> &IndexMap<String, ConsumptionType> {
        &self.consumption_types
    }

    pub fn has_consumption(&self) -> bool {
        !self.consumption_types.is_empty()
    }
}

fn string_list(section: &Value) -> Vec<String> {
    section
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Consumption model ────────────────────────────────────────────────

/// Energy counters kept for one source (e.g. `Electrical`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionType {
    pub source: String,
    /// Measurement unit, when the unit reports one (e.g. `kWh`).
    pub unit: Option<String>,
    pub actions: IndexMap<String, ConsumptionAction>,
}

/// Counters for one action (e.g. `Heating`), one entry per period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionAction {
    pub action: String,
    pub contents: IndexMap<String, ConsumptionContent>,
}

/// Shape of one period's counter array (e.g. `D` = 24 hourly slots).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionContent {
    pub period: String,
    pub content_count: u64,
    pub resolution: u64,
}

fn parse_consumption(section: &Value) -> Result<IndexMap<String, ConsumptionType>, &'static str> {
    let sources = section.as_object().ok_or("section is not an object")?;
    let mut types = IndexMap::new();
    for (source, profile) in sources {
        let profile = profile.as_object().ok_or("source is not an object")?;
        types.insert(source.clone(), parse_consumption_type(source, profile)?);
    }
    Ok(types)
}

fn parse_consumption_type(
    source: &str,
    profile: &Map<String, Value>,
) -> Result<ConsumptionType, &'static str> {
    let mut actions = IndexMap::new();
    let mut unit = None;
    for (action, details) in profile {
        match details {
            Value::Object(periods) => {
                let mut contents = IndexMap::new();
                for (period, content) in periods {
                    contents.insert(period.clone(), parse_consumption_content(period, content)?);
                }
                actions.insert(
                    action.clone(),
                    ConsumptionAction {
                        action: action.clone(),
                        contents,
                    },
                );
            }
            Value::String(s) if action == "unit" => unit = Some(s.clone()),
            _ => {}
        }
    }
    Ok(ConsumptionType {
        source: source.to_string(),
        unit,
        actions,
    })
}

fn parse_consumption_content(period: &str, content: &Value) -> Result<ConsumptionContent, &'static str> {
    let count = content
        .get("contentCount")
        .and_then(Value::as_u64)
        .ok_or("missing contentCount")?;
    let resolution = content
        .get("resolution")
        .and_then(Value::as_u64)
        .ok_or("missing resolution")?;
    Ok(ConsumptionContent {
        period: period.to_string(),
        content_count: count,
        resolution,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn document() -> Value {
        json!({
            "SyncStatus": "reg",
            "Sensor": ["TankTemperature"],
            "UnitStatus": ["ErrorState", "InstallerState", "WarningState"],
            "Operation": {
                "Power": ["on", "standby"],
                "TargetTemperature": { "settable": true, "minValue": 30, "maxValue": 60, "stepValue": 1 },
                "powerful": ["0", "1"]
            },
            "Consumption": {
                "Electrical": {
                    "unit": "kWh",
                    "Heating": {
                        "D": { "contentCount": 24, "resolution": 1 },
                        "W": { "contentCount": 14, "resolution": 1 },
                        "M": { "contentCount": 24, "resolution": 1 }
                    }
                }
            }
        })
    }

    #[test]
    fn parses_every_section() {
        let profile = CapabilityProfile::from_document(2, "function/DomesticHotWaterTank", &document()).unwrap();

        assert_eq!(profile.unit_id(), 2);
        assert_eq!(profile.function_label(), "function/DomesticHotWaterTank");
        assert_eq!(profile.sync_status(), Some(&json!("reg")));
        assert_eq!(profile.sensors(), ["TankTemperature"]);
        assert_eq!(
            profile.status_flags(),
            ["ErrorState", "InstallerState", "WarningState"]
        );
        assert_eq!(
            profile.operation_names().collect::<Vec<_>>(),
            ["Power", "TargetTemperature", "powerful"]
        );

        let electrical = &profile.consumption_types()["Electrical"];
        assert_eq!(electrical.unit.as_deref(), Some("kWh"));
        let daily = &electrical.actions["Heating"].contents["D"];
        assert_eq!(daily.content_count, 24);
        assert_eq!(daily.resolution, 1);
        assert!(profile.has_consumption());
    }

    #[test]
    fn constraint_lookup_resolves_powerful_casing() {
        let profile = CapabilityProfile::from_document(2, "", &document()).unwrap();
        assert!(profile.constraint("Powerful").is_some());
        assert!(profile.constraint("powerful").is_some());
        assert!(profile.constraint("TargetTemperature").is_some());
        assert!(profile.constraint("Nope").is_none());
    }

    #[test]
    fn reparse_is_idempotent() {
        let mut once = CapabilityProfile::new(1, "function/SpaceHeating");
        once.parse(&document()).unwrap();

        let mut twice = once.clone();
        twice.parse(&document()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn absent_sections_keep_previous_values() {
        let mut profile = CapabilityProfile::from_document(1, "function/SpaceHeating", &document()).unwrap();
        let operations_before = profile.operations().clone();

        profile
            .parse(&json!({ "Sensor": ["IndoorTemperature", "OutdoorTemperature"] }))
            .unwrap();

        assert_eq!(profile.sensors(), ["IndoorTemperature", "OutdoorTemperature"]);
        assert_eq!(profile.operations(), &operations_before);
        assert_eq!(profile.status_flags().len(), 3);
        assert_eq!(profile.unit_id(), 1);
        assert_eq!(profile.function_label(), "function/SpaceHeating");
    }

    #[test]
    fn malformed_consumption_yields_empty_map() {
        let mut profile = CapabilityProfile::from_document(1, "", &document()).unwrap();
        assert!(profile.has_consumption());

        profile
            .parse(&json!({
                "Consumption": { "Electrical": { "Heating": { "D": { "resolution": 1 } } } }
            }))
            .unwrap();

        assert!(!profile.has_consumption());
        assert_eq!(profile.sensors(), ["TankTemperature"]);
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = CapabilityProfile::from_document(4, "", &json!(["Sensor"])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidProfile { unit_id: 4, .. }));
    }

    #[test]
    fn non_string_list_entries_are_skipped() {
        let profile =
            CapabilityProfile::from_document(0, "", &json!({ "Sensor": ["A", 3, null, "B"] })).unwrap();
        assert_eq!(profile.sensors(), ["A", "B"]);
    }
}

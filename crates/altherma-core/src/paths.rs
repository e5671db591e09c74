// Destination strings understood by the unit's control endpoint.
//
// Unit resources live under `[0]/MNAE/<id>`; device-wide resources under
// `[0]/MNCSE-node`. The leading slash is significant to nothing but is kept
// exactly as the unit's own clients send it.

/// Device identity document (serial, manufacturer, model, duty).
pub const DEVICE_INFO: &str = "/[0]/MNCSE-node/deviceInfo";

/// Adapter firmware document.
pub const FIRMWARE: &str = "/[0]/MNCSE-node/firmware";

/// Label path inside a unit resource response.
pub const LABEL_PATH: &str = "m2m:rsp/pc/m2m:cnt/lbl";

/// The unit resource itself; its response carries the function label.
pub fn unit(unit_id: u8) -> String {
    format!("[0]/MNAE/{unit_id}")
}

/// Latest capability document.
pub fn unit_profile(unit_id: u8) -> String {
    format!("[0]/MNAE/{unit_id}/UnitProfile/la")
}

/// Latest value of `<category>/<name>`.
pub fn read(unit_id: u8, category: &str, name: &str) -> String {
    format!("/[0]/MNAE/{unit_id}/{category}/{name}/la")
}

/// Write target for an operation. `name` must already be wire-normalized.
pub fn operation(unit_id: u8, name: &str) -> String {
    format!("/[0]/MNAE/{unit_id}/Operation/{name}")
}

/// Latest consumption counters.
pub fn consumption(unit_id: u8) -> String {
    format!("/[0]/MNAE/{unit_id}/Consumption/la")
}

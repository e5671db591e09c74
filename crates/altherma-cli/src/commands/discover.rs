//! `altherma discover`: list the registered units.

use serde::Serialize;
use tabled::Tabled;

use altherma_core::FunctionKind;

use super::{Device, util};
use crate::cli::{DiscoverArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct UnitSummary<'a> {
    key: &'a str,
    unit_id: u8,
    label: &'a str,
    kind: FunctionKind,
    sensors: &'a [String],
    operations: Vec<&'a str>,
    status_flags: &'a [String],
    consumption: bool,
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Slot")]
    slot: u8,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Sensors")]
    sensors: usize,
    #[tabled(rename = "Operations")]
    operations: usize,
    #[tabled(rename = "Flags")]
    flags: usize,
}

pub async fn handle(
    device: &mut Device,
    args: DiscoverArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, args.no_guess).await?;

    let summaries: Vec<UnitSummary<'_>> = device
        .units()
        .iter()
        .map(|(key, unit)| {
            let profile = unit.profile();
            UnitSummary {
                key,
                unit_id: unit.unit_id(),
                label: unit.label(),
                kind: unit.kind(),
                sensors: profile.sensors(),
                operations: profile.operation_names().collect(),
                status_flags: profile.status_flags(),
                consumption: profile.has_consumption(),
            }
        })
        .collect();

    let rendered = output::render_list(
        global.output,
        &summaries,
        |s| UnitRow {
            key: s.key.to_owned(),
            slot: s.unit_id,
            kind: s.kind.to_string(),
            sensors: s.sensors.len(),
            operations: s.operations.len(),
            flags: s.status_flags.len(),
        },
        |s| s.key.to_owned(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

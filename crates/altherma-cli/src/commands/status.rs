//! `altherma status`: one full read of every selected unit.

use indexmap::IndexMap;
use serde_json::Value;

use altherma_core::UnitSnapshot;

use super::{Device, util};
use crate::cli::{GlobalOpts, OutputFormat, UnitSelector};
use crate::error::CliError;
use crate::output::{self, display_value};

pub async fn handle(
    device: &mut Device,
    args: UnitSelector,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, args.no_guess).await?;

    let mut snapshots: IndexMap<String, UnitSnapshot> = IndexMap::new();
    for (key, unit) in util::selected(device, &args)? {
        snapshots.insert(key.to_owned(), unit.current_snapshot().await?);
    }

    let rendered = match global.output {
        OutputFormat::Table => snapshots
            .iter()
            .map(|(key, snapshot)| section(key, snapshot, OutputFormat::Table))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n\n"),
        OutputFormat::Plain => snapshots
            .iter()
            .map(|(key, snapshot)| section(key, snapshot, OutputFormat::Plain))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
        other => output::render_single(other, &snapshots, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn section(key: &str, snapshot: &UnitSnapshot, format: OutputFormat) -> Result<String, CliError> {
    let mut fields: IndexMap<String, Value> = IndexMap::new();
    for (name, value) in &snapshot.sensors {
        fields.insert(format!("Sensor/{name}"), value.clone());
    }
    for (name, value) in &snapshot.operations {
        fields.insert(format!("Operation/{name}"), value.clone());
    }
    for (name, state) in &snapshot.status_flags {
        fields.insert(format!("UnitStatus/{name}"), Value::Bool(*state));
    }

    let body = output::render_fields(format, &fields)?;
    Ok(match format {
        OutputFormat::Plain => body
            .lines()
            .map(|line| format!("{key}/{line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            let consumption = snapshot
                .consumption
                .as_ref()
                .map_or_else(String::new, |c| {
                    format!("\nConsumption: {}", display_value(c))
                });
            format!("{key} (slot {})\n{body}{consumption}", snapshot.unit_id)
        }
    })
}

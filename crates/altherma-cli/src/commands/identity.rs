//! `altherma identity`: memoized unit name, model and software versions.

use indexmap::IndexMap;
use serde_json::Value;

use altherma_core::{Connection, CoreError, UnitController};

use super::{Device, util};
use crate::cli::{GlobalOpts, UnitSelector};
use crate::error::CliError;
use crate::output;

/// Identity fields the unit does not carry are left out rather than failing.
async fn identity(unit: &UnitController<Connection>) -> Result<IndexMap<String, Value>, CliError> {
    let mut fields = IndexMap::new();
    let reads = [
        ("Name", unit.unit_name().await),
        ("ModelNumber", unit.model_number().await),
        ("IndoorSettings", unit.indoor_settings().await),
        ("IndoorSoftware", unit.indoor_software().await),
        ("OutdoorSoftware", unit.outdoor_software().await),
        ("RemoconSettings", unit.remocon_settings().await),
        ("RemoconSoftware", unit.remocon_software().await),
    ];
    for (name, read) in reads {
        match read {
            Ok(value) => {
                fields.insert(name.to_owned(), value.clone());
            }
            Err(CoreError::ReadFailure { .. } | CoreError::ProtocolFailure { .. }) => {
                tracing::debug!(unit = unit.unit_id(), field = name, "identity field unavailable");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(fields)
}

pub async fn handle(
    device: &mut Device,
    args: UnitSelector,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, args.no_guess).await?;

    let mut identities: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();
    for (key, unit) in util::selected(device, &args)? {
        identities.insert(key.to_owned(), identity(unit).await?);
    }

    let rendered = match global.output {
        crate::cli::OutputFormat::Table | crate::cli::OutputFormat::Plain => identities
            .iter()
            .map(|(key, fields)| {
                output::render_fields(global.output, fields).map(|body| format!("{key}\n{body}"))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join("\n\n"),
        other => output::render_single(other, &identities, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

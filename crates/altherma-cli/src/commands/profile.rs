//! `altherma profile`: what a unit declares it can do.

use tabled::{Table, Tabled, settings::Style};

use altherma_core::{CapabilityProfile, Constraint, RangeConstraint};

use super::{Device, util};
use crate::cli::{GlobalOpts, OutputFormat, ProfileArgs};
use crate::error::CliError;
use crate::output::{self, display_value};

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "Operation")]
    name: String,
    #[tabled(rename = "Settable")]
    settable: bool,
    #[tabled(rename = "Accepts")]
    accepts: String,
}

fn bounds(range: &RangeConstraint) -> String {
    let edge = |v: Option<f64>| v.map_or_else(|| "?".into(), |v| v.to_string());
    let mut text = format!("{}..{}", edge(range.min_value), edge(range.max_value));
    if let Some(step) = range.step_value {
        text.push_str(&format!(" step {step}"));
    }
    text
}

fn describe(constraint: &Constraint) -> String {
    match constraint {
        Constraint::Range(range) => bounds(range),
        Constraint::Enumerated { values } => values
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" | "),
        Constraint::NestedHeating { heating, .. } => format!("heating {}", bounds(heating)),
        Constraint::Unsupported { .. } => "(not writable)".into(),
    }
}

fn detail(profile: &CapabilityProfile) -> String {
    let rows: Vec<OperationRow> = profile
        .operations()
        .iter()
        .map(|(name, constraint)| OperationRow {
            name: name.clone(),
            settable: constraint.is_settable(),
            accepts: describe(constraint),
        })
        .collect();

    let mut lines = vec![output::detail_block([
        ("Slot", profile.unit_id().to_string()),
        ("Label", profile.function_label().to_owned()),
        ("Sensors", profile.sensors().join(", ")),
        ("Status", profile.status_flags().join(", ")),
        (
            "Consumption",
            profile
                .consumption_types()
                .values()
                .map(|t| match &t.unit {
                    Some(unit) => format!("{} ({unit})", t.source),
                    None => t.source.clone(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ])];
    if !rows.is_empty() {
        lines.push(Table::new(&rows).with(Style::rounded()).to_string());
    }
    lines.join("\n")
}

pub async fn handle(
    device: &mut Device,
    args: ProfileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, args.selector.no_guess).await?;

    let keys: Vec<String> = util::selected(device, &args.selector)?
        .into_iter()
        .map(|(key, _)| key.to_owned())
        .collect();

    if args.refresh {
        for key in &keys {
            let unit = device.unit_mut(key).ok_or_else(|| util::unit_not_found(key))?;
            unit.refresh_profile().await?;
        }
    }

    let profiles: Vec<&CapabilityProfile> = keys
        .iter()
        .filter_map(|key| device.unit(key).map(|unit| unit.profile()))
        .collect();

    let rendered = match global.output {
        OutputFormat::Table => profiles
            .iter()
            .copied()
            .map(detail)
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Plain => profiles
            .iter()
            .flat_map(|p| p.operation_names().map(|name| format!("{}/{name}", p.unit_id())))
            .collect::<Vec<_>>()
            .join("\n"),
        other => output::render_single(other, &profiles, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

//! `altherma read`: one sensor, operation or status flag.

use serde_json::Value;

use super::{Device, util};
use crate::cli::{GlobalOpts, ReadArgs, ReadKind};
use crate::error::CliError;
use crate::output::{self, display_value};

pub async fn handle(
    device: &mut Device,
    args: ReadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, args.selector.no_guess).await?;
    let unit = util::single(device, &args.selector)?;

    let value = match args.kind {
        ReadKind::Sensor => unit.read_sensor(&args.name).await?,
        ReadKind::Operation => unit.read_operation(&args.name).await?,
        ReadKind::Flag => Value::Bool(unit.read_status_flag(&args.name).await?),
    };

    let rendered = output::render_single(global.output, &value, display_value, display_value)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

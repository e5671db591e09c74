//! `altherma set`: validated write of one operation.

use super::{Device, util};
use crate::cli::{GlobalOpts, SetArgs};
use crate::error::CliError;
use crate::output::display_value;

pub async fn handle(device: &mut Device, args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::discover(device, args.selector.no_guess).await?;
    let unit = util::single(device, &args.selector)?;
    let value = util::parse_value(&args.value);

    if args.no_wait {
        unit.call_operation_no_wait(&args.operation, Some(value.clone()), !args.strict)
            .await?;
    } else {
        unit.call_operation(&args.operation, Some(value.clone()), !args.strict)
            .await?;
    }

    tracing::info!(
        unit = unit.unit_id(),
        operation = %args.operation,
        value = %value,
        "operation written"
    );
    if !global.quiet {
        eprintln!("{} = {}", args.operation, display_value(&value));
    }
    Ok(())
}

//! `altherma info`: adapter identity, firmware and error state.

use serde::Serialize;

use altherma_core::{CoreError, DeviceInfo, FirmwareInfo};

use super::{Device, util};
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct AdapterInfo {
    device: DeviceInfo,
    firmware: FirmwareInfo,
    /// `None` when no base unit answered discovery.
    error_state: Option<bool>,
}

fn text(value: Option<&String>) -> String {
    value.map_or_else(|| "-".into(), Clone::clone)
}

pub async fn handle(device: &mut Device, global: &GlobalOpts) -> Result<(), CliError> {
    util::discover(device, false).await?;

    let info = AdapterInfo {
        device: device.device_info().await?,
        firmware: device.firmware_info().await?,
        error_state: match device.device_error_state().await {
            Ok(state) => Some(state),
            Err(CoreError::NoBaseUnit) => None,
            Err(e) => return Err(e.into()),
        },
    };

    let rendered = output::render_single(
        global.output,
        &info,
        |i| {
            output::detail_block([
                ("Serial", text(i.device.serial_number.as_ref())),
                ("Manufacturer", text(i.device.manufacturer.as_ref())),
                ("Model", text(i.device.model.as_ref())),
                ("Duty", text(i.device.duty.as_ref())),
                ("Firmware", text(i.firmware.firmware_id.as_ref())),
                ("Version", text(i.firmware.version.as_ref())),
                (
                    "Error",
                    i.error_state.map_or_else(|| "-".into(), |e| e.to_string()),
                ),
            ])
        },
        |i| text(i.device.serial_number.as_ref()),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

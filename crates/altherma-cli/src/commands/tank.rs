//! `altherma tank`: domestic hot water tank unit.

use indexmap::IndexMap;
use serde_json::Value;

use altherma_core::{Connection, HotWaterTank, unit::HOT_WATER_LABEL_PREFIX};

use super::{Device, util};
use crate::cli::{GlobalOpts, Switch, TankArgs, TankCommand};
use crate::error::CliError;
use crate::output;

fn view(device: &Device) -> Result<HotWaterTank<'_, Connection>, CliError> {
    device.hot_water_tank().ok_or_else(|| CliError::NotFound {
        resource_type: "Hot water tank unit".into(),
        identifier: format!("{HOT_WATER_LABEL_PREFIX}*"),
        list_command: "discover".into(),
    })
}

async fn show(tank: &HotWaterTank<'_, Connection>) -> Result<IndexMap<String, Value>, CliError> {
    let mut fields = IndexMap::new();
    let mut put = |name: &str, value: Option<Value>| {
        if let Some(value) = value {
            fields.insert(name.to_owned(), value);
        }
    };

    put("TankTemperature", util::optional(tank.tank_temperature().await)?);
    put("TargetTemperature", util::optional(tank.target_temperature().await)?);
    put(
        "DomesticHotWaterTemperatureHeating",
        util::optional(tank.domestic_hot_water_temperature_heating().await)?,
    );
    put("Power", util::optional(tank.is_turned_on().await)?.map(Value::Bool));
    put("Powerful", util::optional(tank.powerful().await)?.map(Value::Bool));
    Ok(fields)
}

pub async fn handle(device: &mut Device, args: TankArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::discover(device, false).await?;
    let tank = view(device)?;

    match args.command {
        TankCommand::Show => {
            let fields = show(&tank).await?;
            let rendered = output::render_fields(global.output, &fields)?;
            output::print_output(&rendered, global.quiet);
        }
        TankCommand::States => {
            let fields: IndexMap<String, Value> = tank
                .states()
                .await?
                .into_iter()
                .map(|(name, state)| (name, Value::Bool(state)))
                .collect();
            let rendered = output::render_fields(global.output, &fields)?;
            output::print_output(&rendered, global.quiet);
        }
        TankCommand::Power { state } => match state {
            Switch::On => tank.turn_on().await?,
            Switch::Off => tank.turn_off().await?,
        },
        TankCommand::Powerful { state } => tank.set_powerful(matches!(state, Switch::On)).await?,
        TankCommand::Target { value } => tank.set_target_temperature(value).await?,
        TankCommand::Heating { value } => {
            tank.set_domestic_hot_water_temperature_heating(value).await?;
        }
    }
    Ok(())
}

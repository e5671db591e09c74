//! `altherma climate`: space heating unit.

use indexmap::IndexMap;
use serde_json::{Value, json};

use altherma_core::{ClimateControl, ClimateControlMode, Connection, unit::SPACE_HEATING_LABEL};

use super::{Device, util};
use crate::cli::{ClimateArgs, ClimateCommand, GlobalOpts, HeatCool, ModeArg, Switch};
use crate::error::CliError;
use crate::output;

impl From<ModeArg> for ClimateControlMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => Self::Auto,
            ModeArg::Cooling => Self::Cooling,
            ModeArg::Heating => Self::Heating,
        }
    }
}

fn view(device: &Device) -> Result<ClimateControl<'_, Connection>, CliError> {
    device.climate_control().ok_or_else(|| CliError::NotFound {
        resource_type: "Climate control unit".into(),
        identifier: SPACE_HEATING_LABEL.into(),
        list_command: "discover".into(),
    })
}

async fn show(climate: &ClimateControl<'_, Connection>) -> Result<IndexMap<String, Value>, CliError> {
    let mut fields = IndexMap::new();
    let mut put = |name: &str, value: Option<Value>| {
        if let Some(value) = value {
            fields.insert(name.to_owned(), value);
        }
    };

    put("IndoorTemperature", util::optional(climate.indoor_temperature().await)?);
    put("OutdoorTemperature", util::optional(climate.outdoor_temperature().await)?);
    put(
        "LeavingWaterTemperatureCurrent",
        util::optional(climate.leaving_water_temperature_current().await)?,
    );
    put("Power", util::optional(climate.is_turned_on().await)?.map(Value::Bool));
    put(
        "OperationMode",
        util::optional(climate.operation_mode().await)?.map(|m| json!(m.as_ref())),
    );
    put("HeatingConfiguration", Some(json!(climate.heating_configuration().to_string())));
    put("CoolingConfiguration", Some(json!(climate.cooling_configuration().to_string())));
    put(
        "LeavingWaterTemperatureOffsetHeating",
        util::optional(climate.leaving_water_temperature_offset_heating().await)?,
    );
    put(
        "LeavingWaterTemperatureOffsetCooling",
        util::optional(climate.leaving_water_temperature_offset_cooling().await)?,
    );
    put(
        "LeavingWaterTemperatureHeating",
        util::optional(climate.leaving_water_temperature_heating().await)?,
    );
    put(
        "LeavingWaterTemperatureCooling",
        util::optional(climate.leaving_water_temperature_cooling().await)?,
    );
    put("ControlModeState", util::optional(climate.control_mode_state().await)?);
    Ok(fields)
}

pub async fn handle(
    device: &mut Device,
    args: ClimateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover(device, false).await?;
    let climate = view(device)?;

    match args.command {
        ClimateCommand::Show => {
            let fields = show(&climate).await?;
            let rendered = output::render_fields(global.output, &fields)?;
            output::print_output(&rendered, global.quiet);
        }
        ClimateCommand::States => {
            let states = climate.states().await?;
            let fields: IndexMap<String, Value> = states
                .into_iter()
                .map(|(name, state)| (name, Value::Bool(state)))
                .collect();
            let rendered = output::render_fields(global.output, &fields)?;
            output::print_output(&rendered, global.quiet);
        }
        ClimateCommand::Power { state } => match state {
            Switch::On => climate.turn_on().await?,
            Switch::Off => climate.turn_off().await?,
        },
        ClimateCommand::Mode { mode } => climate.set_operation_mode(mode.into()).await?,
        ClimateCommand::Offset { mode, value } => match mode {
            ModeArg::Auto => climate.set_leaving_water_temperature_offset_auto(value).await?,
            ModeArg::Cooling => climate.set_leaving_water_temperature_offset_cooling(value).await?,
            ModeArg::Heating => climate.set_leaving_water_temperature_offset_heating(value).await?,
        },
        ClimateCommand::LeavingWater { mode, value } => match mode {
            HeatCool::Heating => climate.set_leaving_water_temperature_heating(value).await?,
            HeatCool::Cooling => climate.set_leaving_water_temperature_cooling(value).await?,
        },
    }
    Ok(())
}

//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { name, make_default } => {
            let host = global.host.clone().ok_or_else(|| CliError::Validation {
                field: "host".into(),
                reason: "pass --host (or set ALTHERMA_HOST) to save a profile".into(),
            })?;

            let mut cfg = config::load_config()?;
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    host,
                    timeout: global.timeout,
                    agent: global.agent.clone(),
                },
            );
            if make_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            let path = config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Saved profile '{name}' to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let rendered = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

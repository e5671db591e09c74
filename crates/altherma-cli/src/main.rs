mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use altherma_core::{Connection, DeviceController, Transport};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "altherma", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config()?;
            let connection_config = config::resolve_connection(&cfg, &cli.global)?;
            let host = connection_config.host.clone();

            let connection = Connection::new(connection_config).map_err(|e| {
                CliError::ConnectionFailed {
                    host: host.clone(),
                    source: Box::new(e),
                }
            })?;
            connection
                .connect()
                .await
                .map_err(|e| CliError::ConnectionFailed {
                    host: host.clone(),
                    source: Box::new(e),
                })?;

            let mut device = DeviceController::new(Arc::new(connection));

            tracing::debug!(command = ?cmd, %host, "dispatching command");
            let result = commands::dispatch(cmd, &mut device, &cli.global).await;

            if let Err(e) = device.close().await {
                tracing::debug!(error = %e, "closing connection failed");
            }
            result
        }
    }
}

//! Command dispatch: bridges CLI args -> device controller -> output formatting.

pub mod climate;
pub mod config_cmd;
pub mod discover;
pub mod identity;
pub mod info;
pub mod profile;
pub mod read;
pub mod set;
pub mod status;
pub mod tank;
pub mod util;

use altherma_core::{Connection, DeviceController};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The device controller every connected command works against.
pub type Device = DeviceController<Connection>;

/// Dispatch a connection-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    device: &mut Device,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Discover(args) => discover::handle(device, args, global).await,
        Command::Info => info::handle(device, global).await,
        Command::Status(args) => status::handle(device, args, global).await,
        Command::Read(args) => read::handle(device, args, global).await,
        Command::Set(args) => set::handle(device, args, global).await,
        Command::Profile(args) => profile::handle(device, args, global).await,
        Command::Identity(args) => identity::handle(device, args, global).await,
        Command::Climate(args) => climate::handle(device, args, global).await,
        Command::Tank(args) => tank::handle(device, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

//! Clap derive structures for the `altherma` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// altherma -- control a Daikin Altherma heat pump over its LAN adapter
#[derive(Debug, Parser)]
#[command(
    name = "altherma",
    version,
    about = "Read and control Daikin Altherma heat pumps from the command line",
    long_about = "Talks to the LAN adapter's websocket control endpoint.\n\n\
        Units (climate control, hot water tank, adapter) are discovered on\n\
        every invocation; writes are checked against each unit's capability\n\
        profile before they are sent.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "ALTHERMA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Adapter host or address, optionally with port (overrides profile)
    #[arg(long, short = 'H', env = "ALTHERMA_HOST", global = true)]
    pub host: Option<String>,

    /// Originator name sent with every request
    #[arg(long, env = "ALTHERMA_AGENT", global = true)]
    pub agent: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ALTHERMA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Response timeout in seconds (overrides profile)
    #[arg(long, env = "ALTHERMA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the units behind the adapter
    #[command(alias = "units")]
    Discover(DiscoverArgs),

    /// Adapter identity and firmware
    Info,

    /// Read every sensor, operation and status flag
    #[command(alias = "st")]
    Status(UnitSelector),

    /// Read a single value
    Read(ReadArgs),

    /// Write an operation
    Set(SetArgs),

    /// Show a unit's capability profile
    Profile(ProfileArgs),

    /// Unit name, model number and software versions
    Identity(UnitSelector),

    /// Climate control (space heating) unit
    #[command(alias = "cc")]
    Climate(ClimateArgs),

    /// Domestic hot water tank unit
    #[command(alias = "dhw")]
    Tank(TankArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared arguments ─────────────────────────────────────────────────

/// Selects one unit by registry key (function label or slot index).
#[derive(Debug, Args)]
pub struct UnitSelector {
    /// Unit key, e.g. `function/SpaceHeating` or `1`; all units when omitted
    #[arg(long, short = 'u')]
    pub unit: Option<String>,

    /// Register units by slot index instead of classifying them
    #[arg(long)]
    pub no_guess: bool,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Register units by slot index instead of classifying them
    #[arg(long)]
    pub no_guess: bool,
}

// ── Read / Set ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReadKind {
    /// Read-only telemetry
    Sensor,
    /// Current value of a writable operation
    Operation,
    /// Boolean status flag
    Flag,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[command(flatten)]
    pub selector: UnitSelector,

    /// What to read
    pub kind: ReadKind,

    /// Sensor, operation or flag name as listed by `altherma profile`
    pub name: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub selector: UnitSelector,

    /// Operation name as listed by `altherma profile`
    pub operation: String,

    /// New value; parsed as JSON when possible, otherwise sent as a string
    pub value: String,

    /// Require an explicit settable flag on range constraints
    #[arg(long)]
    pub strict: bool,

    /// Do not wait for the unit's answer
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub selector: UnitSelector,

    /// Refetch the capability document before showing it
    #[arg(long, short = 'r')]
    pub refresh: bool,
}

// ── Climate ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClimateArgs {
    #[command(subcommand)]
    pub command: ClimateCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClimateCommand {
    /// Temperatures, power, mode and configuration
    Show,

    /// Switch the space heating loop on or off
    Power { state: Switch },

    /// Set the operation mode
    Mode { mode: ModeArg },

    /// Set the leaving water temperature offset for a mode
    Offset {
        mode: ModeArg,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Set the leaving water temperature for a mode (fixed configuration)
    LeavingWater { mode: HeatCool, value: i64 },

    /// All status flags
    States,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Auto,
    Cooling,
    Heating,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeatCool {
    Heating,
    Cooling,
}

// ── Tank ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TankArgs {
    #[command(subcommand)]
    pub command: TankCommand,
}

#[derive(Debug, Subcommand)]
pub enum TankCommand {
    /// Temperatures, power and powerful mode
    Show,

    /// Switch hot water production on or off
    Power { state: Switch },

    /// Switch powerful (boost) mode on or off
    Powerful { state: Switch },

    /// Set the tank target temperature
    Target { value: f64 },

    /// Set the domestic hot water heating temperature
    Heating { value: f64 },

    /// All status flags
    States,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Save --host (and --timeout, --agent) as a profile in the config file
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Make this the default profile
        #[arg(long)]
        make_default: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

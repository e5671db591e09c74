//! CLI-owned configuration: TOML profiles and translation to
//! `altherma_core::ConnectionConfig`.
//!
//! Core never sees these types -- it receives a pre-built `ConnectionConfig`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use altherma_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name (used when --profile is not specified).
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_agent")]
    pub agent: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            agent: default_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_agent() -> String {
    "altherma".into()
}

/// One heat pump.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// LAN adapter host or address, optionally with port.
    pub host: String,

    /// Override the default timeout.
    pub timeout: Option<u64>,

    /// Override the default originator name.
    pub agent: Option<String>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "altherma", "altherma").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("altherma");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from defaults, file and `ALTHERMA_` environment.
pub fn load_config() -> Result<Config, CliError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("ALTHERMA_").only(&["default_profile"]))
        .merge(Env::prefixed("ALTHERMA_DEFAULTS_").map(|key| format!("defaults.{key}").into()));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Write `config` to the config file, creating its directory.
pub fn save_config(config: &Config) -> Result<PathBuf, CliError> {
    let path = config_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let text = toml::to_string_pretty(config).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })?;
    std::fs::write(&path, text)?;
    Ok(path)
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection settings from config, profile and CLI overrides.
///
/// Precedence is flag/env > profile > defaults. A host given on the
/// command line works without any config file.
pub fn resolve_connection(config: &Config, global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profiles.get(&profile_name);

    if global.profile.is_some() && profile.is_none() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(config),
        });
    }

    let host = global
        .host
        .clone()
        .or_else(|| profile.map(|p| p.host.clone()))
        .ok_or_else(|| CliError::NoHost {
            path: config_path().display().to_string(),
        })?;
    if host.trim().is_empty() {
        return Err(CliError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let timeout = global
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(config.defaults.timeout);
    let agent = global
        .agent
        .clone()
        .or_else(|| profile.and_then(|p| p.agent.clone()))
        .unwrap_or_else(|| config.defaults.agent.clone());

    Ok(ConnectionConfig::new(host)
        .with_timeout((timeout > 0).then(|| Duration::from_secs(timeout)))
        .with_agent(agent))
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

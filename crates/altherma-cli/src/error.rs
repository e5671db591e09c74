//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use altherma_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the adapter at {host}")]
    #[diagnostic(
        code(altherma::connection_failed),
        help(
            "Check that the LAN adapter is powered and reachable.\n\
             Host: {host}\n\
             Try: altherma --host <address> info"
        )
    )]
    ConnectionFailed {
        host: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No answer from the adapter within {seconds}s")]
    #[diagnostic(
        code(altherma::timeout),
        help("Increase the timeout with --timeout, or pass --timeout 0 to wait indefinitely.")
    )]
    Timeout { seconds: u64 },

    // ── Units ────────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(altherma::not_found),
        help("Run: altherma {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No base unit was discovered")]
    #[diagnostic(
        code(altherma::no_base_unit),
        help("The adapter exposes no function/Adapter unit and nothing answered in slot 0.")
    )]
    NoBaseUnit,

    #[error("Unit rejected the request to {destination} (result code {code})")]
    #[diagnostic(code(altherma::protocol))]
    Protocol { destination: String, code: i64 },

    #[error("{0}")]
    #[diagnostic(code(altherma::device))]
    Device(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(altherma::validation),
        help("Run: altherma profile to see the accepted values")
    )]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(altherma::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: altherma --host <address> config init --name <profile>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No adapter host configured")]
    #[diagnostic(
        code(altherma::no_host),
        help(
            "Pass --host, set ALTHERMA_HOST, or save a profile with:\n\
             altherma --host <address> config init\n\
             Expected config at: {path}"
        )
    )]
    NoHost { path: String },

    #[error(transparent)]
    #[diagnostic(code(altherma::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON rendering failed: {0}")]
    #[diagnostic(code(altherma::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(altherma::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::NoBaseUnit => exit_code::NOT_FOUND,
            Self::Protocol { .. } => exit_code::REJECTED,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoHost { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::Device(_) | Self::Io(_) | Self::Json(_) | Self::Yaml(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(altherma_api::Error::Timeout { timeout_secs }) => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Transport(inner)
                if inner.is_connection_error()
                    || matches!(inner, altherma_api::Error::InvalidHost(_)) =>
            {
                Self::ConnectionFailed {
                    host: host_of(&inner),
                    source: Box::new(inner),
                }
            }
            CoreError::InvalidOperationValue { operation, value } => Self::Validation {
                field: operation,
                reason: format!("{value} is outside the declared constraint or not settable"),
            },
            CoreError::UnknownOperation { operation } => Self::NotFound {
                resource_type: "Operation".into(),
                identifier: operation,
                list_command: "profile".into(),
            },
            CoreError::ProtocolFailure { destination, code } => Self::Protocol { destination, code },
            CoreError::NoBaseUnit => Self::NoBaseUnit,
            other => Self::Device(other.to_string()),
        }
    }
}

fn host_of(err: &altherma_api::Error) -> String {
    match err {
        altherma_api::Error::InvalidHost(host) => host.clone(),
        _ => "the configured host".into(),
    }
}

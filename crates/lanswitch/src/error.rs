//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use lanswitch_config::ConfigError;
use lanswitch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const SYSTEM: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(lanswitch::no_config),
        help(
            "Expected at: {path}\n\
             Pass --config <FILE> or set LANSWITCH_CONFIG."
        )
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lanswitch::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(lanswitch::config),
        help("Check the TOML syntax and the LANSWITCH_* environment overrides.")
    )]
    Config(ConfigError),

    // ── Networks ─────────────────────────────────────────────────────
    #[error("Network '{name}' not found")]
    #[diagnostic(
        code(lanswitch::network_not_found),
        help("Configured networks: {available}")
    )]
    NetworkNotFound { name: String, available: String },

    // ── Dataplane ────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(lanswitch::dataplane))]
    Core(#[from] CoreError),

    #[error("Worker task failed: {reason}")]
    #[diagnostic(code(lanswitch::runtime))]
    Runtime { reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(lanswitch::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(lanswitch::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::Validation { .. } | Self::Core(CoreError::InvalidOutput { .. }) => {
                exit_code::USAGE
            }
            Self::NetworkNotFound { .. } | Self::Core(CoreError::LinkNotFound { .. }) => {
                exit_code::NOT_FOUND
            }
            Self::Core(_) | Self::Io(_) => exit_code::SYSTEM,
            Self::Runtime { .. } | Self::Json(_) | Self::Yaml(_) => exit_code::GENERAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn config_errors_keep_their_shape() {
        let err = CliError::from(ConfigError::NotFound {
            path: PathBuf::from("/etc/lanswitch/switch.toml"),
        });
        assert!(matches!(err, CliError::NoConfig { ref path } if path == "/etc/lanswitch/switch.toml"));
        assert_eq!(err.exit_code(), exit_code::CONFIG);

        let err = CliError::from(ConfigError::Validation {
            field: "networks.name".into(),
            reason: "must not be empty".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn core_errors_map_to_exit_codes() {
        let missing = CliError::from(CoreError::LinkNotFound {
            name: "eth9".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let invalid = CliError::from(CoreError::InvalidOutput {
            spec: "gre:x".into(),
            reason: "bad remote address".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
    }
}

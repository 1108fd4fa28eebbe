//! Command handlers, one module per subcommand.

pub mod check;
pub mod run;
pub mod tunnels;

use lanswitch_config::{SwitchConfig, config_path, load_config};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the configuration named by `--config`, or the default location.
pub fn load(global: &GlobalOpts) -> Result<SwitchConfig, CliError> {
    let path = global.config.clone().unwrap_or_else(config_path);
    debug!(path = %path.display(), "using config");
    Ok(load_config(&path)?)
}

/// Fail with the list of known networks when `name` is not configured.
pub fn require_network(config: &SwitchConfig, name: &str) -> Result<(), CliError> {
    if config.network(name).is_some() {
        return Ok(());
    }
    Err(CliError::NetworkNotFound {
        name: name.to_owned(),
        available: available(config),
    })
}

fn available(config: &SwitchConfig) -> String {
    if config.networks.is_empty() {
        return "(none)".into();
    }
    config
        .networks
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

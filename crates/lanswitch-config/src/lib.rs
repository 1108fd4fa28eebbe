//! Configuration for the lanswitch daemon.
//!
//! A single TOML file (plus an optional directory of one-network files),
//! layered under `LANSWITCH_` environment overrides, validated into the
//! read-only [`NetworkConfig`] values the workers consume.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use lanswitch_core::{NetworkConfig, TunnelSet};
use lanswitch_core::dataplane::DEFAULT_IPSEC_DIR;

/// Environment prefix; nested keys are separated by `__`
/// (`LANSWITCH_SWITCH__IPSEC_DIR`).
pub const ENV_PREFIX: &str = "LANSWITCH_";

/// Config file used by system daemons.
pub const SYSTEM_CONFIG: &str = "/etc/lanswitch/switch.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwitchConfig {
    #[serde(default)]
    pub switch: SwitchSection,

    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwitchSection {
    /// Switch identity handed to workers on start.
    #[serde(default)]
    pub uuid: String,

    /// Where IPSec secrets and connection files are written.
    #[serde(default = "default_ipsec_dir")]
    pub ipsec_dir: PathBuf,

    /// Directory of extra `*.toml` files, one network each.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_dir: Option<PathBuf>,
}

impl Default for SwitchSection {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            ipsec_dir: default_ipsec_dir(),
            network_dir: None,
        }
    }
}

fn default_ipsec_dir() -> PathBuf {
    PathBuf::from(DEFAULT_IPSEC_DIR)
}

impl SwitchConfig {
    /// Fill derived defaults and reject inconsistent networks.
    pub fn correct(&mut self) -> Result<(), ConfigError> {
        if self.switch.uuid.is_empty() {
            self.switch.uuid = Uuid::new_v4().to_string();
        }
        let mut seen = HashSet::new();
        for net in &mut self.networks {
            if net.name.is_empty() {
                return Err(ConfigError::Validation {
                    field: "networks.name".into(),
                    reason: "must not be empty".into(),
                });
            }
            if !seen.insert(net.name.clone()) {
                return Err(ConfigError::Validation {
                    field: "networks.name".into(),
                    reason: format!("duplicate network '{}'", net.name),
                });
            }
            net.correct();
            check_tunnel_names(net)?;
        }
        Ok(())
    }

    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.name == name)
    }

    /// Effective configuration as TOML. Tunnel secrets are redacted.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Each tunnel of a network needs its own name: the name picks the
/// secrets and connection files.
fn check_tunnel_names(net: &NetworkConfig) -> Result<(), ConfigError> {
    let Some(spec) = &net.ipsec else {
        return Ok(());
    };
    let mut tunnels = TunnelSet::default();
    for tunnel in &spec.tunnels {
        if let Some(owner) = tunnels.name_conflict(tunnel) {
            return Err(ConfigError::Validation {
                field: format!("networks.{}.ipsec.tunnels.name", net.name),
                reason: format!(
                    "duplicate tunnel name '{}' ({} and {})",
                    tunnel.name, owner.right, tunnel.right
                ),
            });
        }
        tunnels.add(tunnel.clone());
    }
    Ok(())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: the system file when present, otherwise
/// the per-user platform location.
pub fn config_path() -> PathBuf {
    let system = PathBuf::from(SYSTEM_CONFIG);
    if system.exists() {
        return system;
    }
    ProjectDirs::from("io", "lanswitch", "lanswitch")
        .map_or(system, |dirs| dirs.config_dir().join("switch.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate the configuration at `path`, with env overrides.
pub fn load_config(path: &Path) -> Result<SwitchConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), "loading config");

    let mut config: SwitchConfig = Figment::new()
        .merge(Serialized::defaults(SwitchConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    if let Some(dir) = config.switch.network_dir.clone() {
        let dir = if dir.is_relative() {
            path.parent().map_or(dir.clone(), |base| base.join(&dir))
        } else {
            dir
        };
        config.networks.extend(load_network_dir(&dir)?);
    }
    config.correct()?;
    Ok(config)
}

/// Read every `*.toml` in `dir` as one network, in file-name order.
pub fn load_network_dir(dir: &Path) -> Result<Vec<NetworkConfig>, ConfigError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();

    files
        .iter()
        .map(|file| {
            debug!(path = %file.display(), "loading network");
            Figment::from(Toml::file(file))
                .extract::<NetworkConfig>()
                .map_err(ConfigError::from)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use lanswitch_core::model::IpSecSpecifies;
    use lanswitch_core::{IpSecTunnel, Provider, Transport};

    use super::*;

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "switch.toml",
                r#"
                [switch]
                uuid = "from-file"

                [[networks]]
                name = "net1"
                "#,
            )?;
            jail.set_env("LANSWITCH_SWITCH__UUID", "from-env");
            jail.set_env("LANSWITCH_SWITCH__IPSEC_DIR", "/run/ipsec.d");

            let config = load_config(Path::new("switch.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.switch.uuid, "from-env");
            assert_eq!(config.switch.ipsec_dir, PathBuf::from("/run/ipsec.d"));
            assert_eq!(config.networks[0].provider, Provider::OpenLan);
            Ok(())
        });
    }

    #[test]
    fn missing_uuid_is_generated() {
        let mut config = SwitchConfig::default();
        config.correct().unwrap();
        assert!(Uuid::parse_str(&config.switch.uuid).is_ok());
    }

    #[test]
    fn rejects_duplicate_networks() {
        let net = NetworkConfig {
            name: "net1".into(),
            ..NetworkConfig::default()
        };
        let mut config = SwitchConfig {
            networks: vec![net.clone(), net],
            ..SwitchConfig::default()
        };
        assert!(matches!(
            config.correct(),
            Err(ConfigError::Validation { ref reason, .. }) if reason.contains("duplicate")
        ));
    }

    #[test]
    fn rejects_tunnels_sharing_a_name() {
        let tunnel = |left: &str| IpSecTunnel::new(left, "198.51.100.7", "psk", Transport::Gre);
        let mut config = SwitchConfig {
            networks: vec![NetworkConfig {
                name: "site".into(),
                provider: Provider::Ipsec,
                ipsec: Some(IpSecSpecifies {
                    tunnels: vec![tunnel("192.0.2.1"), tunnel("192.0.2.2")],
                }),
                ..NetworkConfig::default()
            }],
            ..SwitchConfig::default()
        };
        let err = config.correct().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, ref reason }
                if field == "networks.site.ipsec.tunnels.name" && reason.contains("198.51.100.7-gre")
        ));

        config.networks[0].ipsec.as_mut().unwrap().tunnels[1].name = "hq-backup".into();
        config.correct().unwrap();
    }

    #[test]
    fn rejects_unnamed_networks() {
        let mut config = SwitchConfig {
            networks: vec![NetworkConfig::default()],
            ..SwitchConfig::default()
        };
        assert!(config.correct().is_err());
    }
}

// ── Network domain types ──
//
// Read-only view of one configured logical network. Owned by the
// configuration layer; a worker keeps its own copy for its lifetime and
// only picks up changes through `reload`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::tunnel::IpSecTunnel;

/// Provider tag selecting the worker variant for a network.
///
/// The set is closed: unknown tags fall back to [`Provider::OpenLan`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
#[serde(from = "String", into = "&'static str")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    #[default]
    OpenLan,
    Esp,
    Vxlan,
    Fabric,
    Router,
    Ipsec,
}

impl Provider {
    /// Resolve a configuration tag, defaulting anything unrecognised.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl From<String> for Provider {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

/// Bridge the network's ports are attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Kernel bridge device name.
    pub name: String,
    /// Bridge address in prefix form (e.g. `172.32.10.1/24`).
    #[serde(default)]
    pub address: String,
    /// TCP MSS clamp value, 0 disables clamping.
    #[serde(default)]
    pub mss: u16,
}

/// Address pool handed out by DHCP and the lease cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfig {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub netmask: String,
}

/// One configured dataplane attachment for the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Raw specification: `eth1`, `gre:<remote>` or `vxlan:<remote>:<vni>[:<port>]`.
    pub interface: String,
    /// VLAN id; 0 attaches the link untagged.
    #[serde(default)]
    pub vlan: u16,
}

/// Site-to-site tunnel settings for the `ipsec` provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpSecSpecifies {
    #[serde(default)]
    pub tunnels: Vec<IpSecTunnel>,
}

/// The canonical per-network configuration consumed by workers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub subnet: SubnetConfig,

    /// ACL chain the bridge's pre-routing traffic jumps into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,

    #[serde(default)]
    pub dhcp: bool,

    #[serde(default)]
    pub outputs: Vec<OutputConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipsec: Option<IpSecSpecifies>,
}

impl NetworkConfig {
    /// Fill derived defaults: bridge name and normalised tunnel records.
    pub fn correct(&mut self) {
        if self.bridge.name.is_empty() {
            self.bridge.name = format!("br-{}", self.name);
        }
        if let Some(spec) = self.ipsec.as_mut() {
            for tunnel in &mut spec.tunnels {
                tunnel.correct();
            }
        }
    }

    /// ACL chain name, ignoring an empty string.
    pub fn acl_chain(&self) -> Option<&str> {
        self.acl.as_deref().filter(|acl| !acl.is_empty())
    }
}

/// Reduced view handed to DHCP/VPN sub-services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub subnet: SubnetConfig,
    pub bridge: BridgeConfig,
}

impl From<&NetworkConfig> for ServiceConfig {
    fn from(cfg: &NetworkConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            subnet: cfg.subnet.clone(),
            bridge: cfg.bridge.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn provider_tags_resolve() {
        assert_eq!(Provider::from_tag("esp"), Provider::Esp);
        assert_eq!(Provider::from_tag("IPSec"), Provider::Ipsec);
        assert_eq!(Provider::from_tag("router"), Provider::Router);
    }

    #[test]
    fn unknown_provider_falls_back_to_default() {
        assert_eq!(Provider::from_tag("something-else"), Provider::OpenLan);
        assert_eq!(Provider::from_tag(""), Provider::OpenLan);
    }

    #[test]
    fn correct_fills_bridge_name() {
        let mut cfg = NetworkConfig {
            name: "net1".into(),
            ..NetworkConfig::default()
        };
        cfg.correct();
        assert_eq!(cfg.bridge.name, "br-net1");
    }

    #[test]
    fn empty_acl_is_ignored() {
        let cfg = NetworkConfig {
            acl: Some(String::new()),
            ..NetworkConfig::default()
        };
        assert!(cfg.acl_chain().is_none());
    }
}

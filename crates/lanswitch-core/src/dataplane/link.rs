// ── Link manager seam and output specifications ──

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::CoreError;

/// Default VXLAN UDP destination port (Linux legacy port).
pub const DEFAULT_VXLAN_PORT: u16 = 8472;

/// Creates, deletes and wires kernel links.
pub trait LinkManager: Send + Sync {
    /// Resolve a link by name, returning its interface index.
    fn link_index(&self, name: &str) -> Result<u32, CoreError>;
    fn set_up(&self, name: &str) -> Result<(), CoreError>;
    fn add_vlan(&self, name: &str, parent: &str, vlan: u16) -> Result<(), CoreError>;
    fn add_gretap(&self, name: &str, local: Ipv4Addr, remote: Ipv4Addr) -> Result<(), CoreError>;
    fn add_vxlan(&self, name: &str, vni: u32, group: Ipv4Addr, port: u16)
    -> Result<(), CoreError>;
    fn delete_link(&self, name: &str) -> Result<(), CoreError>;
    fn add_bridge_port(&self, bridge: &str, port: &str) -> Result<(), CoreError>;
    fn del_bridge_port(&self, bridge: &str, port: &str) -> Result<(), CoreError>;
}

/// Parsed form of an output specification string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    /// A pre-existing interface, attached as is.
    Physical(String),
    /// `gre:<remote>`: a GRE-tap device towards `remote`.
    Gre { remote: Ipv4Addr },
    /// `vxlan:<group>:<vni>[:<port>]`.
    Vxlan { group: Ipv4Addr, vni: u32, port: u16 },
}

impl OutputKind {
    /// Prefix for generated device names, `None` for physical links.
    pub fn name_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Physical(_) => None,
            Self::Gre { .. } => Some("ge-"),
            Self::Vxlan { .. } => Some("vn-"),
        }
    }

    /// Whether provisioning creates a device that teardown must delete.
    pub fn creates_device(&self) -> bool {
        !matches!(self, Self::Physical(_))
    }
}

impl FromStr for OutputKind {
    type Err = CoreError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidOutput {
            spec: spec.to_owned(),
            reason: reason.to_owned(),
        };
        let fields: Vec<&str> = spec.splitn(6, ':').collect();
        match fields.as_slice() {
            ["gre", remote] => Ok(Self::Gre {
                remote: remote.parse().map_err(|_| invalid("bad remote address"))?,
            }),
            ["gre", ..] => Err(invalid("expected gre:<remote>")),
            ["vxlan", group, vni, rest @ ..] => {
                let group = group.parse().map_err(|_| invalid("bad group address"))?;
                let vni = vni.parse().map_err(|_| invalid("bad vni"))?;
                let port = match rest.first() {
                    Some(port) => port.parse().map_err(|_| invalid("bad udp port"))?,
                    None => DEFAULT_VXLAN_PORT,
                };
                Ok(Self::Vxlan { group, vni, port })
            }
            ["vxlan", ..] => Err(invalid("expected vxlan:<group>:<vni>[:<port>]")),
            [""] => Err(invalid("empty interface name")),
            _ => Ok(Self::Physical(spec.to_owned())),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical(name) => write!(f, "{name}"),
            Self::Gre { remote } => write!(f, "gre:{remote}"),
            Self::Vxlan { group, vni, port } => write!(f, "vxlan:{group}:{vni}:{port}"),
        }
    }
}

/// Name of the VLAN sub-interface stacked on `parent`.
pub fn vlan_link_name(parent: &str, vlan: u16) -> String {
    format!("{parent}.{vlan}")
}

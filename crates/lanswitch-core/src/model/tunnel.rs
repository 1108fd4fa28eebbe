// ── IPSec tunnel domain types ──
//
// A tunnel's identity is the normalised (left, right, secret, transport)
// tuple. Everything else (IKE ports, identities) rides along but never
// participates in add/remove/find. The name picks the artifact files and
// daemon connections, so no two registered identities may share one.

use std::fmt;

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};
use tracing::warn;

/// Local endpoint used when a tunnel does not pin one.
pub const DEFAULT_LEFT: &str = "%defaultroute";

/// The IKE port; configuring it explicitly is the same as not configuring it.
pub const DEFAULT_IKE_PORT: u16 = 500;

/// Encapsulation protected by the tunnel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Transport {
    #[default]
    Gre,
    Vxlan,
}

impl Transport {
    /// Daemon connection names backing a tunnel of this transport.
    pub fn connections(self, name: &str) -> Vec<String> {
        match self {
            Self::Vxlan => vec![format!("{name}-c1"), format!("{name}-c2")],
            Self::Gre => vec![format!("{name}-c1")],
        }
    }
}

/// Site-to-site tunnel record as configured or requested.
#[derive(Clone, Deserialize, Serialize)]
pub struct IpSecTunnel {
    /// Logical name; `<right>-<transport>` unless configured.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub left: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_port: Option<u16>,

    pub right: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_port: Option<u16>,

    #[serde(serialize_with = "redact")]
    pub secret: SecretString,

    #[serde(default)]
    pub transport: Transport,
}

fn redact<S: Serializer>(_: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("<redacted>")
}

impl IpSecTunnel {
    pub fn new(left: &str, right: &str, secret: &str, transport: Transport) -> Self {
        let mut tunnel = Self {
            name: String::new(),
            left: left.to_owned(),
            left_id: None,
            left_port: None,
            right: right.to_owned(),
            right_id: None,
            right_port: None,
            secret: SecretString::from(secret.to_owned()),
            transport,
        };
        tunnel.correct();
        tunnel
    }

    /// Apply defaults so that equal requests produce equal records.
    pub fn correct(&mut self) {
        if self.left.is_empty() {
            DEFAULT_LEFT.clone_into(&mut self.left);
        }
        self.left_port = self.left_port.filter(|p| *p != 0 && *p != DEFAULT_IKE_PORT);
        self.right_port = self.right_port.filter(|p| *p != 0 && *p != DEFAULT_IKE_PORT);
        self.left_id = self.left_id.take().filter(|id| !id.is_empty());
        self.right_id = self.right_id.take().filter(|id| !id.is_empty());
        if self.name.is_empty() {
            self.name = format!("{}-{}", self.right, self.transport);
        }
    }

    pub fn key(&self) -> TunnelKey {
        TunnelKey {
            left: self.left.clone(),
            right: self.right.clone(),
            secret: self.secret.expose_secret().to_owned(),
            transport: self.transport,
        }
    }

    /// Read-only descriptor for external listing.
    pub fn info(&self) -> TunnelInfo {
        TunnelInfo {
            name: self.name.clone(),
            left: self.left.clone(),
            left_id: self.left_id.clone(),
            left_port: self.left_port,
            right: self.right.clone(),
            right_id: self.right_id.clone(),
            right_port: self.right_port,
            secret: self.secret.expose_secret().to_owned(),
            transport: self.transport,
        }
    }
}

impl fmt::Debug for IpSecTunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpSecTunnel")
            .field("name", &self.name)
            .field("left", &self.left)
            .field("right", &self.right)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl PartialEq for IpSecTunnel {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
            && self.left_id == other.left_id
            && self.left_port == other.left_port
            && self.right_id == other.right_id
            && self.right_port == other.right_port
    }
}

/// Identity tuple of a tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TunnelKey {
    pub left: String,
    pub right: String,
    pub secret: String,
    pub transport: Transport,
}

/// Snapshot of a tunnel handed out by `list_tunnels`, secret included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelInfo {
    pub name: String,
    pub left: String,
    pub left_id: Option<String>,
    pub left_port: Option<u16>,
    pub right: String,
    pub right_id: Option<String>,
    pub right_port: Option<u16>,
    pub secret: String,
    pub transport: Transport,
}

// ── Ordered tunnel collection ───────────────────────────────────────

/// Insertion-ordered tunnel set keyed by [`TunnelKey`].
#[derive(Debug, Clone, Default)]
pub struct TunnelSet {
    tunnels: IndexMap<TunnelKey, IpSecTunnel>,
}

impl TunnelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tunnel. Returns `false` when an equal identity already
    /// exists or another identity already uses its name.
    pub fn add(&mut self, tunnel: IpSecTunnel) -> bool {
        let key = tunnel.key();
        if self.tunnels.contains_key(&key) || self.name_conflict(&tunnel).is_some() {
            return false;
        }
        self.tunnels.insert(key, tunnel);
        true
    }

    /// Remove a tunnel, preserving the order of the rest.
    pub fn remove(&mut self, tunnel: &IpSecTunnel) -> Option<IpSecTunnel> {
        self.tunnels.shift_remove(&tunnel.key())
    }

    /// A registered tunnel with a different identity but the same name.
    pub fn name_conflict(&self, tunnel: &IpSecTunnel) -> Option<&IpSecTunnel> {
        let key = tunnel.key();
        self.tunnels
            .iter()
            .find(|(k, t)| **k != key && t.name == tunnel.name)
            .map(|(_, t)| t)
    }

    /// The registered record for `tunnel`'s identity.
    pub fn get(&self, tunnel: &IpSecTunnel) -> Option<&IpSecTunnel> {
        self.tunnels.get(&tunnel.key())
    }

    /// Position of a tunnel in insertion order.
    pub fn find(&self, tunnel: &IpSecTunnel) -> Option<usize> {
        self.tunnels.get_index_of(&tunnel.key())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpSecTunnel> {
        self.tunnels.values()
    }

    pub fn len(&self) -> usize {
        self.tunnels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tunnels.is_empty()
    }
}

impl FromIterator<IpSecTunnel> for TunnelSet {
    fn from_iter<I: IntoIterator<Item = IpSecTunnel>>(iter: I) -> Self {
        let mut set = Self::new();
        for mut tunnel in iter {
            tunnel.correct();
            if set.name_conflict(&tunnel).is_some() {
                warn!(tunnel = %tunnel.name, right = %tunnel.right, "tunnel name already taken, skipping");
                continue;
            }
            set.add(tunnel);
        }
        set
    }
}

// ── Lease domain types ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a lease came to exist.
///
/// Static leases are registered explicitly and survive `delete_lease`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaseType {
    #[default]
    Dynamic,
    Static,
}

/// An alias-to-address binding scoped to one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub alias: String,
    pub address: Ipv4Addr,
    pub network: String,
    #[serde(rename = "type")]
    pub lease_type: LeaseType,
    pub created_at: DateTime<Utc>,
}

impl Lease {
    /// Key of the alias index (`alias@network`).
    pub fn alias_key(&self) -> String {
        alias_key(&self.alias, &self.network)
    }

    /// Key of the address index (`address@network`).
    pub fn address_key(&self) -> String {
        address_key(self.address, &self.network)
    }

    pub fn is_static(&self) -> bool {
        self.lease_type == LeaseType::Static
    }
}

pub(crate) fn alias_key(alias: &str, network: &str) -> String {
    format!("{alias}@{network}")
}

pub(crate) fn address_key(address: Ipv4Addr, network: &str) -> String {
    format!("{address}@{network}")
}

/// Address range registered for a network in the lease cache.
///
/// Bounds are kept as configured text; a bound that does not parse as
/// IPv4 simply yields no allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseNetwork {
    pub name: String,
    pub ip_start: String,
    pub ip_end: String,
    #[serde(default)]
    pub netmask: String,
}

impl From<&super::NetworkConfig> for LeaseNetwork {
    fn from(cfg: &super::NetworkConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            ip_start: cfg.subnet.start.clone(),
            ip_end: cfg.subnet.end.clone(),
            netmask: cfg.subnet.netmask.clone(),
        }
    }
}

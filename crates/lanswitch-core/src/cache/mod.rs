// ── Lease cache ──
//
// Dual-indexed concurrent lease storage. Three `DashMap` stores:
// networks by name, leases by `alias@network`, leases by
// `address@network`. Both lease indices hold the same `Arc<Lease>`.
//
// Each store is safe for concurrent use on its own. Compound updates
// across the two lease indices are NOT atomic: a reader racing an
// `add_lease`/`delete_lease` may briefly see one index updated and the
// other stale. Callers needing linearizable lease mutation for a network
// must serialize those calls themselves.

mod snapshot;

use std::net::Ipv4Addr;
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::model::lease::{address_key, alias_key};
use crate::model::{Lease, LeaseNetwork, LeaseType};

pub use snapshot::Snapshot;

const NETWORK_CAPACITY: usize = 128;
const LEASE_CAPACITY: usize = 1024;

/// Process-wide lease storage.
pub struct LeaseCache {
    networks: DashMap<String, Arc<LeaseNetwork>>,
    by_alias: DashMap<String, Arc<Lease>>,
    by_address: DashMap<String, Arc<Lease>>,
}

impl LeaseCache {
    pub fn new() -> Self {
        Self {
            networks: DashMap::with_capacity(NETWORK_CAPACITY),
            by_alias: DashMap::with_capacity(LEASE_CAPACITY),
            by_address: DashMap::with_capacity(LEASE_CAPACITY),
        }
    }

    /// The shared instance, created on first use.
    pub fn global() -> &'static LeaseCache {
        static GLOBAL: OnceLock<LeaseCache> = OnceLock::new();
        GLOBAL.get_or_init(LeaseCache::new)
    }

    // ── Networks ─────────────────────────────────────────────────────

    /// Register a network's address range, replacing any previous entry.
    pub fn add_network(&self, network: LeaseNetwork) {
        debug!(network = %network.name, "lease cache: add network");
        self.networks
            .insert(network.name.clone(), Arc::new(network));
    }

    pub fn delete_network(&self, name: &str) {
        debug!(network = %name, "lease cache: delete network");
        self.networks.remove(name);
    }

    pub fn get_network(&self, name: &str) -> Option<Arc<LeaseNetwork>> {
        self.networks.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn list_networks(&self) -> Snapshot<LeaseNetwork> {
        Snapshot::new(self.networks.iter().map(|r| Arc::clone(r.value())).collect())
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    // ── Leases ───────────────────────────────────────────────────────

    pub fn list_leases(&self) -> Snapshot<Lease> {
        Snapshot::new(self.by_alias.iter().map(|r| Arc::clone(r.value())).collect())
    }

    pub fn lease_count(&self) -> usize {
        self.by_alias.len()
    }

    /// Return the alias's lease, allocating the lowest free address of the
    /// network's range when it has none.
    ///
    /// An existing lease is returned unchanged even if the requester wanted
    /// a different address; no conflict resolution policy is applied.
    /// Returns `None` for an unknown network, an empty alias, unparseable
    /// or inverted bounds, or an exhausted range.
    pub fn allocate_lease(&self, alias: &str, network: &str) -> Option<Arc<Lease>> {
        if alias.is_empty() {
            return None;
        }
        let net = self.get_network(network)?;
        if let Some(existing) = self.get_lease_by_alias(alias, network) {
            return Some(existing);
        }
        let address = self.first_free_address(&net.ip_start, &net.ip_end, network)?;
        self.add_lease(alias, address, network, LeaseType::Dynamic)
    }

    /// Insert or replace the alias's lease. Any address previously bound
    /// to the alias is released from the address index first.
    pub fn add_lease(
        &self,
        alias: &str,
        address: Ipv4Addr,
        network: &str,
        lease_type: LeaseType,
    ) -> Option<Arc<Lease>> {
        if alias.is_empty() {
            return None;
        }
        let lease = Arc::new(Lease {
            alias: alias.to_owned(),
            address,
            network: network.to_owned(),
            lease_type,
            created_at: Utc::now(),
        });
        info!(alias = %lease.alias_key(), %address, %lease_type, "lease cache: add lease");

        let akey = alias_key(alias, network);
        if let Some(old) = self.by_alias.get(&akey).map(|r| Arc::clone(r.value())) {
            self.by_address.remove(&old.address_key());
        }
        self.by_alias.insert(akey, Arc::clone(&lease));
        self.by_address
            .insert(address_key(address, network), Arc::clone(&lease));
        Some(lease)
    }

    /// Remove a non-static lease from both indices.
    ///
    /// Static leases are left untouched. Returns the lease removed from
    /// the alias index, if any.
    pub fn delete_lease(&self, alias: &str, network: &str) -> Option<Arc<Lease>> {
        let akey = alias_key(alias, network);
        debug!(alias = %akey, "lease cache: delete lease");

        let lease = self.get_lease_by_alias(alias, network)?;
        info!(alias = %akey, address = %lease.address, "lease cache: delete lease by alias");
        let removed = if lease.is_static() {
            None
        } else {
            self.by_alias.remove(&akey).map(|(_, v)| v)
        };

        let rkey = lease.address_key();
        if let Some(by_addr) = self.get_lease_by_address(lease.address, network) {
            if by_addr.alias == alias && !by_addr.is_static() {
                info!(address = %rkey, alias = %alias, "lease cache: delete lease by address");
                self.by_address.remove(&rkey);
            }
        }
        removed
    }

    pub fn get_lease_by_alias(&self, alias: &str, network: &str) -> Option<Arc<Lease>> {
        self.by_alias
            .get(&alias_key(alias, network))
            .map(|r| Arc::clone(r.value()))
    }

    pub fn get_lease_by_address(&self, address: Ipv4Addr, network: &str) -> Option<Arc<Lease>> {
        self.by_address
            .get(&address_key(address, network))
            .map(|r| Arc::clone(r.value()))
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Scan `[start, end]` in numeric order for an address with no lease.
    fn first_free_address(&self, start: &str, end: &str, network: &str) -> Option<Ipv4Addr> {
        let start = u32::from(start.parse::<Ipv4Addr>().ok()?);
        let end = u32::from(end.parse::<Ipv4Addr>().ok()?);
        (start..=end)
            .map(Ipv4Addr::from)
            .find(|addr| self.get_lease_by_address(*addr, network).is_none())
    }
}

impl Default for LeaseCache {
    fn default() -> Self {
        Self::new()
    }
}

//! Control plane of the lanswitch overlay switch.
//!
//! For each configured network this crate provisions the local dataplane
//! and tracks per-network address leases:
//!
//! - **[`LeaseCache`]**: Dual-indexed concurrent lease store (`alias@net`
//!   and `address@net` over the same `Arc<Lease>`), with first-free
//!   allocation over a network's configured range.
//!
//! - **[`WorkerRegistry`]**: Builds one [`Worker`] per network from its
//!   provider tag and keeps a name-keyed directory of them.
//!
//! - **[`BaseWorker`]**: `initialize → start → stop` dataplane lifecycle:
//!   firewall table, address sets, bridge outputs (physical, GRE-tap,
//!   VXLAN, VLAN sub-interfaces) and the DHCP sub-service.
//!
//! - **[`IpSecWorker`]**: Tunnel sub-controller rendering IPSec daemon
//!   secrets and connection files and driving the daemon through
//!   fire-and-forget tasks.
//!
//! Every host interaction goes through the traits in [`dataplane`], bundled
//! as a [`Dataplane`]. [`Dataplane::system`] wires the command-backed
//! implementations in [`sys`].

pub mod cache;
pub mod dataplane;
pub mod error;
pub mod model;
pub mod sys;
pub mod worker;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{LeaseCache, Snapshot};
pub use dataplane::Dataplane;
pub use error::CoreError;
pub use model::{
    IpSecTunnel, Lease, LeaseNetwork, LeaseType, NetworkConfig, Provider, TunnelInfo, TunnelSet, Transport,
};
pub use worker::{
    BaseWorker, IpSecWorker, LocalSwitch, Networker, SharedWorker, Switcher, Worker,
    WorkerRegistry, WorkerState,
};

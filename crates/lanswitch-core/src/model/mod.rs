// ── Domain model ──
//
// Configuration views, lease records and IPSec tunnel records shared by
// the cache and the workers.

pub mod lease;
pub mod network;
pub mod tunnel;

pub use lease::{Lease, LeaseNetwork, LeaseType};
pub use network::{
    BridgeConfig, IpSecSpecifies, NetworkConfig, OutputConfig, Provider, ServiceConfig,
    SubnetConfig,
};
pub use tunnel::{IpSecTunnel, TunnelInfo, TunnelKey, TunnelSet, Transport};

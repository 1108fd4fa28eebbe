// ── Dataplane collaborators ──
//
// Narrow seams to everything a worker touches on the host: links,
// firewall rules, address sets, sub-services, external commands and
// detached task execution. A `Dataplane` bundles one implementation of
// each; `Dataplane::system` wires the command-backed ones from `sys`.

pub mod firewall;
pub mod ipset;
pub mod link;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CoreError;
use crate::model::ServiceConfig;
use crate::sys;

pub use firewall::{Chain, FirewallBackend, FirewallTable, IpRule, Table};
pub use ipset::{AddressSet, AddressSetStore};
pub use link::{LinkManager, OutputKind};

/// Default directory for IPSec daemon connection and secret files.
pub const DEFAULT_IPSEC_DIR: &str = "/etc/ipsec.d";

/// A long-running helper owned by a worker (DHCP server, VPN server).
pub trait SubService: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Builds sub-services from the reduced network view.
pub trait ServiceFactory: Send + Sync {
    fn dhcp(&self, cfg: &ServiceConfig) -> Box<dyn SubService>;
}

/// Runs an external program to completion.
pub trait CommandRunner: Send + Sync {
    /// Returns combined stdout and stderr; a non-zero exit is an error.
    fn run(&self, program: &str, args: &[String]) -> Result<String, CoreError>;
}

/// Unit of work handed to a [`TaskSpawner`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Executes fire-and-forget work off the caller's path.
///
/// Submitters get no completion signal; outcomes are only logged.
pub trait TaskSpawner: Send + Sync {
    fn submit(&self, task: Task);
}

/// Everything a worker needs from the host.
#[derive(Clone)]
pub struct Dataplane {
    pub links: Arc<dyn LinkManager>,
    pub firewall: Arc<dyn FirewallBackend>,
    pub sets: Arc<dyn AddressSetStore>,
    pub services: Arc<dyn ServiceFactory>,
    pub runner: Arc<dyn CommandRunner>,
    pub spawner: Arc<dyn TaskSpawner>,
    pub ipsec_dir: PathBuf,
}

impl Dataplane {
    /// Command-backed collaborators sharing one runner.
    ///
    /// Fire-and-forget work runs on the current tokio runtime when there
    /// is one, otherwise on a plain thread.
    pub fn system(ipsec_dir: impl Into<PathBuf>) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(sys::SystemRunner);
        Self {
            links: Arc::new(sys::IpRoute2::new(Arc::clone(&runner))),
            firewall: Arc::new(sys::Iptables::new(Arc::clone(&runner))),
            sets: Arc::new(sys::Ipset::new(Arc::clone(&runner))),
            services: Arc::new(sys::DnsmasqFactory),
            spawner: Arc::new(sys::TokioSpawner::current()),
            runner,
            ipsec_dir: ipsec_dir.into(),
        }
    }
}

impl Default for Dataplane {
    fn default() -> Self {
        Self::system(DEFAULT_IPSEC_DIR)
    }
}

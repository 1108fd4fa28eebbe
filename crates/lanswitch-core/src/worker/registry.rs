// ── Worker registry ──
//
// Builds one worker per network from its provider tag and keeps a
// name-keyed directory of them. It never drives lifecycles itself.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::{BaseWorker, IpSecWorker, Networker, Switcher, WorkerState};
use crate::dataplane::Dataplane;
use crate::model::{NetworkConfig, Provider};

/// A worker as handed out by the registry.
pub type SharedWorker = Arc<Mutex<Worker>>;

/// Closed set of worker variants.
///
/// Providers without a dedicated variant run the base lifecycle under
/// their own tag.
pub enum Worker {
    Base(BaseWorker),
    IpSec(IpSecWorker),
}

impl Worker {
    pub fn new(cfg: NetworkConfig, dataplane: Dataplane) -> Self {
        match cfg.provider {
            Provider::Ipsec => Self::IpSec(IpSecWorker::new(cfg, dataplane)),
            Provider::OpenLan
            | Provider::Esp
            | Provider::Vxlan
            | Provider::Fabric
            | Provider::Router => Self::Base(BaseWorker::new(cfg, dataplane)),
        }
    }

    pub fn as_ipsec(&self) -> Option<&IpSecWorker> {
        match self {
            Self::IpSec(w) => Some(w),
            Self::Base(_) => None,
        }
    }

    pub fn as_ipsec_mut(&mut self) -> Option<&mut IpSecWorker> {
        match self {
            Self::IpSec(w) => Some(w),
            Self::Base(_) => None,
        }
    }

    fn inner(&self) -> &dyn Networker {
        match self {
            Self::Base(w) => w,
            Self::IpSec(w) => w,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Networker {
        match self {
            Self::Base(w) => w,
            Self::IpSec(w) => w,
        }
    }
}

impl Networker for Worker {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn id(&self) -> &str {
        self.inner().id()
    }

    fn provider(&self) -> Provider {
        self.inner().provider()
    }

    fn state(&self) -> WorkerState {
        self.inner().state()
    }

    fn initialize(&mut self) {
        self.inner_mut().initialize();
    }

    fn start(&mut self, switch: &dyn Switcher) {
        self.inner_mut().start(switch);
    }

    fn stop(&mut self) {
        self.inner_mut().stop();
    }

    fn reload(&mut self, switch: &dyn Switcher) {
        self.inner_mut().reload(switch);
    }

    fn bridge(&self) -> Option<&str> {
        self.inner().bridge()
    }

    fn config(&self) -> &NetworkConfig {
        self.inner().config()
    }

    fn subnet(&self) -> Option<String> {
        self.inner().subnet()
    }
}

static GLOBAL: OnceLock<WorkerRegistry> = OnceLock::new();

/// Directory of live workers keyed by network name.
pub struct WorkerRegistry {
    workers: DashMap<String, SharedWorker>,
    dataplane: Dataplane,
}

impl WorkerRegistry {
    pub fn new(dataplane: Dataplane) -> Self {
        Self {
            workers: DashMap::new(),
            dataplane,
        }
    }

    /// The shared instance, on the system dataplane unless
    /// [`WorkerRegistry::init_global`] ran first.
    pub fn global() -> &'static WorkerRegistry {
        GLOBAL.get_or_init(|| WorkerRegistry::new(Dataplane::default()))
    }

    /// Create the shared instance on `dataplane`. A no-op once it exists.
    pub fn init_global(dataplane: Dataplane) -> &'static WorkerRegistry {
        GLOBAL.get_or_init(|| WorkerRegistry::new(dataplane))
    }

    pub fn dataplane(&self) -> &Dataplane {
        &self.dataplane
    }

    /// Build the worker for `cfg` and register it, replacing any worker
    /// already registered under the same name.
    pub fn new_networker(&self, cfg: NetworkConfig) -> SharedWorker {
        info!(network = %cfg.name, provider = %cfg.provider, "registry: new worker");
        let name = cfg.name.clone();
        let worker = Arc::new(Mutex::new(Worker::new(cfg, self.dataplane.clone())));
        self.workers.insert(name, Arc::clone(&worker));
        worker
    }

    pub fn get_worker(&self, name: &str) -> Option<SharedWorker> {
        self.workers.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Visit every registered worker, in no particular order.
    pub fn list_workers(&self, mut visit: impl FnMut(&SharedWorker)) {
        let workers: Vec<SharedWorker> = self
            .workers
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect();
        for worker in &workers {
            visit(worker);
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

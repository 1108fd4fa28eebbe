// ── Network workers ──
//
// One worker per configured network drives its dataplane through
// `initialize → start → stop`. Variants are a closed set selected by the
// network's provider tag; see [`registry`].

pub mod base;
pub mod ipsec;
pub mod port;
pub mod registry;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::model::{NetworkConfig, Provider};

pub use base::BaseWorker;
pub use ipsec::IpSecWorker;
pub use port::LinuxPort;
pub use registry::{SharedWorker, Worker, WorkerRegistry};

/// The switch instance workers run under.
pub trait Switcher: Send + Sync {
    fn uuid(&self) -> &str;
}

/// Switch identity for a single-process deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSwitch {
    uuid: String,
}

impl LocalSwitch {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}

impl Switcher for LocalSwitch {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

/// Lifecycle position of a worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkerState {
    #[default]
    Created,
    Initialized,
    Started,
    Stopped,
}

/// Capability set shared by every network worker variant.
///
/// Callers must not drive lifecycle methods of one worker concurrently;
/// the registry hands workers out behind a mutex for that reason.
pub trait Networker: Send {
    /// Network name the worker serves.
    fn name(&self) -> &str;

    /// Switch identity recorded by the last `start`; empty before that.
    fn id(&self) -> &str;

    fn provider(&self) -> Provider;

    fn state(&self) -> WorkerState;

    fn initialize(&mut self);

    fn start(&mut self, switch: &dyn Switcher);

    fn stop(&mut self);

    fn reload(&mut self, switch: &dyn Switcher);

    /// Bridge handle; variants that own a bridge device return its name.
    fn bridge(&self) -> Option<&str> {
        None
    }

    fn config(&self) -> &NetworkConfig;

    fn subnet(&self) -> Option<String> {
        None
    }
}

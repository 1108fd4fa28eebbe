// ── IPSec worker ──
//
// Wraps a base worker and replaces its lifecycle with a tunnel
// sub-controller. Every tunnel in the collection has a secrets file, a
// connection file and at least one attempt to bring its daemon
// connections up. Every daemon call (secrets reload, connection start and
// delete) is fire-and-forget through the dataplane's task spawner; file
// writes are synchronous and their errors go back to whoever asked for
// the tunnel.

mod conf;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use self::conf::{Connections, Secrets};
use super::{BaseWorker, Networker, Switcher, WorkerState};
use crate::dataplane::Dataplane;
use crate::error::CoreError;
use crate::model::{IpSecTunnel, NetworkConfig, Provider, TunnelInfo, TunnelSet};
use crate::sys::argv;

const IPSEC: &str = "ipsec";

pub struct IpSecWorker {
    base: BaseWorker,
    tunnels: TunnelSet,
}

impl IpSecWorker {
    pub fn new(cfg: NetworkConfig, dataplane: Dataplane) -> Self {
        let tunnels = cfg
            .ipsec
            .as_ref()
            .map(|spec| spec.tunnels.iter().cloned().collect())
            .unwrap_or_default();
        Self {
            base: BaseWorker::new(cfg, dataplane),
            tunnels,
        }
    }

    pub fn base(&self) -> &BaseWorker {
        &self.base
    }

    pub fn tunnel_count(&self) -> usize {
        self.tunnels.len()
    }

    // ── Tunnel API ───────────────────────────────────────────────────

    /// Register a tunnel and provision it if it was not already known.
    ///
    /// Returns whether the collection grew. A tunnel whose files cannot be
    /// written stays registered; `reload` retries it. A different tunnel
    /// that already owns the same name is refused with
    /// [`CoreError::TunnelConflict`].
    pub fn add_tunnel(&mut self, mut tunnel: IpSecTunnel) -> Result<bool, CoreError> {
        tunnel.correct();
        if let Some(owner) = self.tunnels.name_conflict(&tunnel) {
            warn!(network = self.base.name(), tunnel = %tunnel.name, owner = %owner.left, "ipsec: tunnel name in use");
            return Err(CoreError::TunnelConflict { name: tunnel.name });
        }
        if !self.tunnels.add(tunnel.clone()) {
            return Ok(false);
        }
        self.install(&tunnel)?;
        Ok(true)
    }

    /// Forget a tunnel and withdraw it if it was known.
    pub fn del_tunnel(&mut self, mut tunnel: IpSecTunnel) -> Result<bool, CoreError> {
        tunnel.correct();
        match self.tunnels.remove(&tunnel) {
            Some(removed) => {
                self.uninstall(&removed)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-issue daemon starts for a known tunnel. Files are left alone.
    pub fn restart_tunnel(&self, mut tunnel: IpSecTunnel) -> bool {
        tunnel.correct();
        match self.tunnels.get(&tunnel) {
            Some(known) => {
                self.activate(known);
                true
            }
            None => false,
        }
    }

    /// Visit a snapshot of every registered tunnel, secrets included.
    pub fn list_tunnels(&self, mut visit: impl FnMut(TunnelInfo)) {
        let snapshot: Vec<TunnelInfo> = self.tunnels.iter().map(IpSecTunnel::info).collect();
        for info in snapshot {
            visit(info);
        }
    }

    // ── Artifacts and daemon ─────────────────────────────────────────

    fn dir(&self) -> &Path {
        &self.base.dataplane().ipsec_dir
    }

    fn secrets_path(&self, name: &str) -> PathBuf {
        self.dir().join(format!("{name}.secrets"))
    }

    fn conf_path(&self, name: &str) -> PathBuf {
        self.dir().join(format!("{name}.conf"))
    }

    fn install(&self, tunnel: &IpSecTunnel) -> Result<(), CoreError> {
        let network = self.base.name();

        let secrets = self.secrets_path(&tunnel.name);
        fs::write(&secrets, Secrets(tunnel).to_string()).map_err(|e| {
            error!(network, tunnel = %tunnel.name, path = %secrets.display(), error = %e, "ipsec: write secrets failed");
            CoreError::io(&secrets, e)
        })?;
        self.submit(argv(["auto", "--rereadsecrets"]));

        let conf = self.conf_path(&tunnel.name);
        fs::write(&conf, Connections(tunnel).to_string()).map_err(|e| {
            error!(network, tunnel = %tunnel.name, path = %conf.display(), error = %e, "ipsec: write connection failed");
            CoreError::io(&conf, e)
        })?;
        self.activate(tunnel);
        Ok(())
    }

    fn uninstall(&self, tunnel: &IpSecTunnel) -> Result<(), CoreError> {
        for conn in tunnel.transport.connections(&tunnel.name) {
            self.connection("--delete", &conn);
        }
        let mut result = Ok(());
        for path in [self.conf_path(&tunnel.name), self.secrets_path(&tunnel.name)] {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    warn!(network = self.base.name(), path = %path.display(), error = %e, "ipsec: remove failed");
                    if result.is_ok() {
                        result = Err(CoreError::io(path, e));
                    }
                }
                _ => {}
            }
        }
        result
    }

    fn activate(&self, tunnel: &IpSecTunnel) {
        for conn in tunnel.transport.connections(&tunnel.name) {
            self.connection("--start", &conn);
        }
    }

    fn connection(&self, action: &str, conn: &str) {
        self.submit(argv(["auto", action, "--asynchronous", conn]));
    }

    /// Hand one `ipsec <args>` invocation to the spawner.
    fn submit(&self, args: Vec<String>) {
        let dataplane = self.base.dataplane();
        let runner = Arc::clone(&dataplane.runner);
        let network = self.base.name().to_owned();
        dataplane.spawner.submit(Box::new(move || {
            let command = args.join(" ");
            match runner.run(IPSEC, &args) {
                Ok(_) => info!(%network, %command, "ipsec: daemon call done"),
                Err(e) => warn!(%network, %command, error = %e, "ipsec: daemon call failed"),
            }
        }));
    }
}

impl Networker for IpSecWorker {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn id(&self) -> &str {
        self.base.id()
    }

    fn provider(&self) -> Provider {
        self.base.provider()
    }

    fn state(&self) -> WorkerState {
        self.base.state()
    }

    fn initialize(&mut self) {
        info!(network = self.base.name(), "ipsec: initialize");
        self.base.set_state(WorkerState::Initialized);
    }

    fn start(&mut self, switch: &dyn Switcher) {
        self.base.set_uuid(switch.uuid());
        info!(network = self.base.name(), tunnels = self.tunnels.len(), "ipsec: start");
        for tunnel in self.tunnels.iter() {
            // install logs its own failures
            let _ = self.install(tunnel);
        }
        self.base.set_state(WorkerState::Started);
    }

    fn stop(&mut self) {
        info!(network = self.base.name(), "ipsec: stop");
        for tunnel in self.tunnels.iter() {
            let _ = self.uninstall(tunnel);
        }
        self.base.set_state(WorkerState::Stopped);
    }

    fn reload(&mut self, switch: &dyn Switcher) {
        self.stop();
        self.initialize();
        self.start(switch);
    }

    fn config(&self) -> &NetworkConfig {
        self.base.config()
    }
}

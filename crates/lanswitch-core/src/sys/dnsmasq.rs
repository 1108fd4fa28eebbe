// ── DHCP sub-service ──
//
// One supervised `dnsmasq` child per network, bound to the bridge and
// serving the configured pool. Running as a child keeps its lifetime tied
// to the worker: `stop` kills and reaps it.

use std::process::{Child, Command, Stdio};

use tracing::{info, warn};

use crate::dataplane::{ServiceFactory, SubService};
use crate::model::ServiceConfig;

const DNSMASQ: &str = "dnsmasq";

/// Lease time handed to clients.
const LEASE_TIME: &str = "12h";

pub struct Dnsmasq {
    cfg: ServiceConfig,
    child: Option<Child>,
}

impl Dnsmasq {
    pub fn new(cfg: ServiceConfig) -> Self {
        Self { cfg, child: None }
    }

    fn args(&self) -> Vec<String> {
        let subnet = &self.cfg.subnet;
        let mut range = format!("{},{}", subnet.start, subnet.end);
        if !subnet.netmask.is_empty() {
            range.push(',');
            range.push_str(&subnet.netmask);
        }
        range.push(',');
        range.push_str(LEASE_TIME);

        vec![
            "--keep-in-foreground".to_owned(),
            "--bind-interfaces".to_owned(),
            "--except-interface=lo".to_owned(),
            "--port=0".to_owned(),
            format!("--interface={}", self.cfg.bridge.name),
            format!("--dhcp-range={range}"),
            format!("--dhcp-leasefile=/var/lib/misc/dnsmasq.{}.leases", self.cfg.name),
        ]
    }
}

impl SubService for Dnsmasq {
    fn start(&mut self) {
        if self.child.is_some() {
            return;
        }
        let args = self.args();
        match Command::new(DNSMASQ)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                info!(network = %self.cfg.name, pid = child.id(), "dhcp: started");
                self.child = Some(child);
            }
            Err(e) => {
                warn!(network = %self.cfg.name, error = %e, "dhcp: spawn failed");
            }
        }
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            warn!(network = %self.cfg.name, error = %e, "dhcp: kill failed");
        }
        match child.wait() {
            Ok(status) => info!(network = %self.cfg.name, %status, "dhcp: stopped"),
            Err(e) => warn!(network = %self.cfg.name, error = %e, "dhcp: reap failed"),
        }
    }
}

impl Drop for Dnsmasq {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builds [`Dnsmasq`] DHCP services.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsmasqFactory;

impl ServiceFactory for DnsmasqFactory {
    fn dhcp(&self, cfg: &ServiceConfig) -> Box<dyn SubService> {
        Box::new(Dnsmasq::new(cfg.clone()))
    }
}

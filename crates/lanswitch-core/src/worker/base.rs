// ── Base worker: dataplane provisioning ──
//
// Owns one network's firewall table, its two address sets and the ports
// it attached to the bridge. `start` provisions, `stop` mirrors it in
// reverse. Every OS step is best-effort: a failure is logged against the
// affected object and the remaining steps still run.

use std::net::Ipv4Addr;

use tracing::{debug, error, info, warn};

use super::{LinuxPort, Networker, Switcher, WorkerState};
use crate::dataplane::firewall::{MASQUERADE, TCPMSS};
use crate::dataplane::ipset::HASH_NET;
use crate::dataplane::link::vlan_link_name;
use crate::dataplane::{
    AddressSet, Chain, Dataplane, FirewallTable, IpRule, OutputKind, SubService, Table,
};
use crate::model::{NetworkConfig, Provider, ServiceConfig};

/// `Some` for a non-empty rule field.
fn opt(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

fn mss_clamp(mss: u16) -> IpRule {
    IpRule {
        proto: opt("tcp"),
        matcher: opt("tcp"),
        tcp_flags: Some(("SYN,RST".to_owned(), "SYN".to_owned())),
        jump: opt(TCPMSS),
        set_mss: Some(mss),
        ..IpRule::default()
    }
}

pub struct BaseWorker {
    uuid: String,
    cfg: NetworkConfig,
    dataplane: Dataplane,
    state: WorkerState,
    dhcp: Option<Box<dyn SubService>>,
    vpn: Option<Box<dyn SubService>>,
    outputs: Vec<LinuxPort>,
    fire: FirewallTable,
    set_r: AddressSet,
    set_v: AddressSet,
}

impl BaseWorker {
    pub fn new(cfg: NetworkConfig, dataplane: Dataplane) -> Self {
        let set_r = AddressSet::new(format!("{}_r", cfg.name), HASH_NET, dataplane.sets.clone());
        let set_v = AddressSet::new(format!("{}_v", cfg.name), HASH_NET, dataplane.sets.clone());
        let fire = FirewallTable::new(&cfg.name, dataplane.firewall.clone());
        Self {
            uuid: String::new(),
            cfg,
            dataplane,
            state: WorkerState::Created,
            dhcp: None,
            vpn: None,
            outputs: Vec::new(),
            fire,
            set_r,
            set_v,
        }
    }

    /// Attach a VPN service; started and stopped with the worker.
    pub fn attach_vpn(&mut self, vpn: Box<dyn SubService>) {
        self.vpn = Some(vpn);
    }

    pub fn dataplane(&self) -> &Dataplane {
        &self.dataplane
    }

    pub fn firewall(&self) -> &FirewallTable {
        &self.fire
    }

    /// Ports recorded by the last `start`.
    pub fn outputs(&self) -> &[LinuxPort] {
        &self.outputs
    }

    /// Route-side (`_r`) and VPN-side (`_v`) prefix sets.
    pub fn address_sets(&self) -> (&AddressSet, &AddressSet) {
        (&self.set_r, &self.set_v)
    }

    pub(crate) fn set_uuid(&mut self, uuid: &str) {
        uuid.clone_into(&mut self.uuid);
    }

    pub(crate) fn set_state(&mut self, state: WorkerState) {
        self.state = state;
    }

    // ── Output provisioning ──────────────────────────────────────────

    /// Create the link behind `port` and attach it to `bridge`.
    ///
    /// A bad specification or a failed device creation abandons this
    /// port only; the resolved name stays recorded for teardown.
    pub fn add_output(&self, bridge: &str, port: &mut LinuxPort) {
        let kind = match port.kind() {
            Ok(kind) => kind,
            Err(e) => {
                error!(network = %self.cfg.name, error = %e, "add output: invalid specification");
                return;
            }
        };
        let link = port.resolve(&kind).to_owned();
        let links = &self.dataplane.links;
        let created = match kind {
            OutputKind::Physical(_) => Ok(()),
            OutputKind::Gre { remote } => links.add_gretap(&link, Ipv4Addr::UNSPECIFIED, remote),
            OutputKind::Vxlan { group, vni, port: udp } => links.add_vxlan(&link, vni, group, udp),
        };
        if let Err(e) = created {
            error!(network = %self.cfg.name, %link, output = port.name(), error = %e, "add output: link add failed");
            return;
        }
        info!(network = %self.cfg.name, %link, output = port.name(), "add output");
        self.add_physical(bridge, port.vlan(), &link);
    }

    /// Attach an existing link to `bridge`, through a VLAN sub-interface
    /// when `vlan` is non-zero.
    pub fn add_physical(&self, bridge: &str, vlan: u16, output: &str) {
        let links = &self.dataplane.links;
        if let Err(e) = links.link_index(output) {
            error!(network = %self.cfg.name, link = output, error = %e, "add physical: link lookup failed");
            return;
        }
        let mut slave = output.to_owned();
        if vlan > 0 {
            if let Err(e) = links.set_up(output) {
                warn!(network = %self.cfg.name, link = output, error = %e, "add physical: link up failed");
            }
            let sub = vlan_link_name(output, vlan);
            if let Err(e) = links.add_vlan(&sub, output, vlan) {
                error!(network = %self.cfg.name, link = %sub, error = %e, "add physical: vlan add failed");
                return;
            }
            slave = sub;
        }
        if let Err(e) = links.add_bridge_port(bridge, &slave) {
            warn!(network = %self.cfg.name, %bridge, link = %slave, error = %e, "add physical: attach failed");
        }
    }

    /// Detach `output` from `bridge`, deleting its VLAN sub-interface if any.
    pub fn del_physical(&self, bridge: &str, vlan: u16, output: &str) {
        let links = &self.dataplane.links;
        if vlan > 0 {
            let sub = vlan_link_name(output, vlan);
            if let Err(e) = links.delete_link(&sub) {
                error!(network = %self.cfg.name, link = %sub, error = %e, "del physical: vlan delete failed");
            }
        } else if let Err(e) = links.del_bridge_port(bridge, output) {
            warn!(network = %self.cfg.name, %bridge, link = output, error = %e, "del physical: detach failed");
        }
    }

    /// Undo [`BaseWorker::add_output`] for one recorded port.
    pub fn del_output(&self, bridge: &str, port: &LinuxPort) {
        info!(network = %self.cfg.name, link = port.link(), output = port.name(), "del output");
        if port.link().is_empty() {
            return;
        }
        self.del_physical(bridge, port.vlan(), port.link());
        if port.kind().is_ok_and(|kind| kind.creates_device()) {
            if let Err(e) = self.dataplane.links.delete_link(port.link()) {
                error!(network = %self.cfg.name, link = port.link(), error = %e, "del output: link delete failed");
            }
        }
    }

    // ── Rule builders ────────────────────────────────────────────────

    /// Send traffic entering on `input` through the `acl` chain.
    pub fn acl_jump(&mut self, acl: &str, input: &str) {
        if input.is_empty() || acl.is_empty() {
            return;
        }
        self.fire.add_rule(
            Table::Raw,
            Chain::Pre,
            IpRule {
                input: opt(input),
                jump: opt(acl),
                ..IpRule::default()
            },
        );
    }

    /// Accept local traffic to `ports` (comma separated) over `protocol`.
    pub fn open_port(&mut self, protocol: &str, ports: &str, comment: &str) {
        info!(network = %self.cfg.name, protocol, ports, "open port");
        self.fire.add_rule(
            Table::Filter,
            Chain::In,
            IpRule {
                proto: opt(protocol),
                matcher: opt("multiport"),
                dst_port: opt(ports),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }

    /// Forward from `source` towards any prefix in set `pfx_set`.
    pub fn forward_to_set(&mut self, input: &str, source: &str, pfx_set: &str, comment: &str) {
        debug!(network = %self.cfg.name, input, source, pfx_set, "forward to set");
        self.fire.add_rule(
            Table::Filter,
            Chain::For,
            IpRule {
                input: opt(input),
                source: opt(source),
                dest_set: opt(pfx_set),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }

    /// Forward from any prefix in set `src_set` towards `prefix`.
    pub fn forward_from_set(&mut self, input: &str, src_set: &str, prefix: &str, comment: &str) {
        debug!(network = %self.cfg.name, input, src_set, prefix, "forward from set");
        self.fire.add_rule(
            Table::Filter,
            Chain::For,
            IpRule {
                input: opt(input),
                src_set: opt(src_set),
                dest: opt(prefix),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }

    /// Masquerade `source` when heading to a prefix in `pfx_set`.
    pub fn masq_to_set(&mut self, source: &str, pfx_set: &str, comment: &str) {
        self.fire.add_rule(
            Table::Nat,
            Chain::Post,
            IpRule {
                source: opt(source),
                dest_set: opt(pfx_set),
                jump: opt(MASQUERADE),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }

    /// Masquerade prefixes in `src_set` when heading to `prefix`.
    pub fn masq_from_set(&mut self, src_set: &str, prefix: &str, comment: &str) {
        self.fire.add_rule(
            Table::Nat,
            Chain::Post,
            IpRule {
                src_set: opt(src_set),
                dest: opt(prefix),
                jump: opt(MASQUERADE),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }

    /// Let return traffic of established flows out through `output`.
    pub fn allow_related(&mut self, output: &str, comment: &str) {
        debug!(network = %self.cfg.name, output, "allow related");
        self.fire.add_rule(
            Table::Filter,
            Chain::For,
            IpRule {
                output: opt(output),
                ct_state: opt("RELATED,ESTABLISHED"),
                comment: opt(comment),
                ..IpRule::default()
            },
        );
    }
}

impl Networker for BaseWorker {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn id(&self) -> &str {
        &self.uuid
    }

    fn provider(&self) -> Provider {
        self.cfg.provider
    }

    fn state(&self) -> WorkerState {
        self.state
    }

    fn initialize(&mut self) {
        info!(network = %self.cfg.name, "initialize");
        self.dhcp = self
            .cfg
            .dhcp
            .then(|| self.dataplane.services.dhcp(&ServiceConfig::from(&self.cfg)));
        self.fire = FirewallTable::new(&self.cfg.name, self.dataplane.firewall.clone());
        for set in [&self.set_v, &self.set_r] {
            if let Err(e) = set.clear() {
                error!(network = %self.cfg.name, set = set.name(), error = %e, "initialize: address set clear failed");
            }
        }
        self.state = WorkerState::Initialized;
    }

    fn start(&mut self, switch: &dyn Switcher) {
        if self.state != WorkerState::Initialized {
            warn!(network = %self.cfg.name, state = %self.state, "start: not initialized, initializing first");
            self.initialize();
        }
        self.set_uuid(switch.uuid());
        info!(network = %self.cfg.name, "start");

        let bridge = self.cfg.bridge.name.clone();
        if let Some(acl) = self.cfg.acl_chain().map(str::to_owned) {
            self.acl_jump(&acl, &bridge);
        }
        self.fire.add_rule(
            Table::Filter,
            Chain::For,
            IpRule {
                input: opt(&bridge),
                output: opt(&bridge),
                ..IpRule::default()
            },
        );
        let mss = self.cfg.bridge.mss;
        if mss > 0 {
            // towards remote
            self.fire.add_rule(
                Table::Mangle,
                Chain::Post,
                IpRule {
                    output: opt(&bridge),
                    ..mss_clamp(mss)
                },
            );
            // from local
            self.fire.add_rule(
                Table::Mangle,
                Chain::In,
                IpRule {
                    input: opt(&bridge),
                    ..mss_clamp(mss)
                },
            );
        }

        for output in &self.cfg.outputs {
            let mut port = LinuxPort::from(output);
            self.add_output(&bridge, &mut port);
            self.outputs.push(port);
        }

        if let Some(dhcp) = self.dhcp.as_mut() {
            dhcp.start();
            let address = self.cfg.bridge.address.clone();
            self.fire.add_rule(
                Table::Nat,
                Chain::Post,
                IpRule {
                    source: opt(&address),
                    no_dest: opt(&address),
                    jump: opt(MASQUERADE),
                    comment: opt("Default Gateway for DHCP"),
                    ..IpRule::default()
                },
            );
        }
        if let Some(vpn) = self.vpn.as_mut() {
            vpn.start();
        }
        self.fire.start();
        self.state = WorkerState::Started;
    }

    fn stop(&mut self) {
        info!(network = %self.cfg.name, "stop");
        self.fire.stop();
        if let Some(vpn) = self.vpn.as_mut() {
            vpn.stop();
        }
        if let Some(dhcp) = self.dhcp.as_mut() {
            dhcp.stop();
        }
        let outputs = std::mem::take(&mut self.outputs);
        for port in &outputs {
            self.del_output(&self.cfg.bridge.name, port);
        }
        for set in [&self.set_r, &self.set_v] {
            if let Err(e) = set.destroy() {
                warn!(network = %self.cfg.name, set = set.name(), error = %e, "stop: address set destroy failed");
            }
        }
        self.state = WorkerState::Stopped;
    }

    fn reload(&mut self, switch: &dyn Switcher) {
        self.stop();
        self.initialize();
        self.start(switch);
    }

    fn config(&self) -> &NetworkConfig {
        &self.cfg
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{BridgeConfig, OutputConfig};
    use crate::testing::{self, RecordingRunner, RecordingServices, RunnerService, RunnerServices};
    use crate::worker::LocalSwitch;

    struct Fixture {
        runner: Arc<RecordingRunner>,
        services: RecordingServices,
        _dir: tempfile::TempDir,
        worker: BaseWorker,
    }

    fn fixture(cfg: NetworkConfig) -> Fixture {
        let runner = Arc::new(RecordingRunner::new());
        let services = RecordingServices::default();
        let dir = tempfile::tempdir().unwrap();
        let worker = BaseWorker::new(cfg, testing::dataplane(&runner, &services, dir.path()));
        Fixture {
            runner,
            services,
            _dir: dir,
            worker,
        }
    }

    fn network(outputs: Vec<OutputConfig>) -> NetworkConfig {
        let mut cfg = NetworkConfig {
            name: "net1".into(),
            bridge: BridgeConfig {
                address: "172.32.10.1/24".into(),
                ..BridgeConfig::default()
            },
            outputs,
            ..NetworkConfig::default()
        };
        cfg.correct();
        cfg
    }

    fn output(interface: &str, vlan: u16) -> OutputConfig {
        OutputConfig {
            interface: interface.into(),
            vlan,
        }
    }

    #[test]
    fn initialize_clears_both_sets() {
        let mut fx = fixture(network(vec![]));
        fx.worker.initialize();
        assert_eq!(
            fx.runner.calls_to("ipset"),
            vec![
                "ipset create net1_v hash:net -exist",
                "ipset flush net1_v",
                "ipset create net1_r hash:net -exist",
                "ipset flush net1_r",
            ]
        );
        assert_eq!(fx.worker.state(), WorkerState::Initialized);
    }

    #[test]
    fn initialize_survives_set_failures() {
        let mut fx = fixture(network(vec![]));
        fx.runner.fail_on("ipset create");
        fx.worker.initialize();
        assert_eq!(fx.worker.state(), WorkerState::Initialized);
    }

    #[test]
    fn stop_without_start_destroys_sets() {
        let mut fx = fixture(network(vec![]));
        fx.worker.initialize();
        fx.runner.clear();
        fx.worker.stop();
        assert_eq!(
            fx.runner.calls(),
            vec!["ipset destroy net1_r", "ipset destroy net1_v"]
        );
        assert_eq!(fx.worker.state(), WorkerState::Stopped);
    }

    #[test]
    fn start_installs_baseline_rules() {
        let mut cfg = network(vec![]);
        cfg.acl = Some("acl-net1".into());
        cfg.bridge.mss = 1332;
        let mut fx = fixture(cfg);
        fx.worker.initialize();
        fx.runner.clear();
        fx.worker.start(&LocalSwitch::new("sw-1"));

        assert_eq!(
            fx.runner.calls_to("iptables"),
            vec![
                "iptables -t raw -A PREROUTING -i br-net1 -j acl-net1",
                "iptables -t filter -A FORWARD -i br-net1 -o br-net1 -j ACCEPT",
                "iptables -t mangle -A POSTROUTING -o br-net1 -p tcp -m tcp --tcp-flags SYN,RST SYN -j TCPMSS --set-mss 1332",
                "iptables -t mangle -A INPUT -i br-net1 -p tcp -m tcp --tcp-flags SYN,RST SYN -j TCPMSS --set-mss 1332",
            ]
        );
        assert_eq!(fx.worker.id(), "sw-1");
        assert!(fx.worker.firewall().is_active());
    }

    #[test]
    fn gre_output_without_vlan_attaches_directly() {
        let mut fx = fixture(network(vec![output("gre:10.1.1.1", 0)]));
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));

        let link = fx.worker.outputs()[0].link().to_owned();
        assert!(link.starts_with("ge-"));
        let ip = fx.runner.calls_to("ip");
        assert!(ip.contains(&format!(
            "ip link add {link} type gretap local any remote 10.1.1.1 pmtudisc"
        )));
        assert!(ip.contains(&format!("ip link set dev {link} master br-net1")));
        assert!(!ip.iter().any(|c| c.contains("type vlan")));
    }

    #[test]
    fn gre_output_with_vlan_attaches_sub_interface() {
        let mut fx = fixture(network(vec![output("gre:10.1.1.1", 50)]));
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));

        let link = fx.worker.outputs()[0].link().to_owned();
        let ip = fx.runner.calls_to("ip");
        assert!(ip.contains(&format!("ip link set dev {link} up")));
        assert!(ip.contains(&format!(
            "ip link add link {link} name {link}.50 type vlan id 50"
        )));
        assert!(ip.contains(&format!("ip link set dev {link}.50 master br-net1")));
        assert!(!ip.contains(&format!("ip link set dev {link} master br-net1")));
    }

    #[test]
    fn failed_output_does_not_abort_start() {
        let mut fx = fixture(network(vec![output("eth9", 0), output("eth1", 0)]));
        fx.runner.fail_on("ip -o link show dev eth9");
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));

        assert_eq!(fx.worker.outputs().len(), 2);
        let ip = fx.runner.calls_to("ip");
        assert!(ip.contains(&"ip link set dev eth1 master br-net1".to_owned()));
        assert!(!ip.iter().any(|c| c.contains("dev eth9 master")));
        assert_eq!(fx.worker.state(), WorkerState::Started);
    }

    #[test]
    fn invalid_output_is_skipped() {
        let mut fx = fixture(network(vec![output("vxlan:192.168.1.1", 0)]));
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));
        assert!(fx.runner.calls_to("ip").is_empty());
        fx.worker.stop();
        assert!(fx.worker.outputs().is_empty());
    }

    #[test]
    fn stop_mirrors_start() {
        let mut cfg = network(vec![output("vxlan:192.168.1.1:4000", 0), output("eth1", 10)]);
        cfg.dhcp = true;
        let mut fx = fixture(cfg);
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));
        let vxlan = fx.worker.outputs()[0].link().to_owned();
        fx.runner.clear();

        fx.worker.stop();

        assert_eq!(
            fx.runner.calls(),
            vec![
                "iptables -t nat -D POSTROUTING -s 172.32.10.1/24 ! -d 172.32.10.1/24 -j MASQUERADE -m comment --comment Default Gateway for DHCP".to_owned(),
                "iptables -t filter -D FORWARD -i br-net1 -o br-net1 -j ACCEPT".to_owned(),
                format!("ip link set dev {vxlan} nomaster"),
                format!("ip link delete dev {vxlan}"),
                "ip link delete dev eth1.10".to_owned(),
                "ipset destroy net1_r".to_owned(),
                "ipset destroy net1_v".to_owned(),
            ]
        );
        assert_eq!(
            *fx.services.log.lock().unwrap(),
            vec!["start:net1", "stop:net1"]
        );
        assert!(fx.worker.outputs().is_empty());
    }

    #[test]
    fn vpn_starts_after_dhcp_and_stops_before_it() {
        let runner = Arc::new(RecordingRunner::new());
        let dir = tempfile::tempdir().unwrap();
        let dataplane = Dataplane {
            services: Arc::new(RunnerServices(Arc::clone(&runner))),
            ..testing::dataplane(&runner, &RecordingServices::default(), dir.path())
        };
        let mut cfg = network(vec![]);
        cfg.dhcp = true;
        let mut worker = BaseWorker::new(cfg, dataplane);
        worker.attach_vpn(Box::new(RunnerService::new("vpn-net1", &runner)));
        worker.initialize();
        runner.clear();

        worker.start(&LocalSwitch::new("sw-1"));
        assert_eq!(
            runner.calls(),
            vec![
                "svc start net1",
                "svc start vpn-net1",
                "iptables -t filter -A FORWARD -i br-net1 -o br-net1 -j ACCEPT",
                "iptables -t nat -A POSTROUTING -s 172.32.10.1/24 ! -d 172.32.10.1/24 -j MASQUERADE -m comment --comment Default Gateway for DHCP",
            ]
        );

        runner.clear();
        worker.stop();
        assert_eq!(
            runner.calls(),
            vec![
                "iptables -t nat -D POSTROUTING -s 172.32.10.1/24 ! -d 172.32.10.1/24 -j MASQUERADE -m comment --comment Default Gateway for DHCP",
                "iptables -t filter -D FORWARD -i br-net1 -o br-net1 -j ACCEPT",
                "svc stop vpn-net1",
                "svc stop net1",
                "ipset destroy net1_r",
                "ipset destroy net1_v",
            ]
        );
    }

    #[test]
    fn teardown_continues_past_failures() {
        let mut fx = fixture(network(vec![output("eth1", 0), output("eth2", 0)]));
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));
        fx.runner.fail_on("ip link set dev eth1 nomaster");
        fx.runner.clear();

        fx.worker.stop();

        let calls = fx.runner.calls();
        assert!(calls.contains(&"ip link set dev eth2 nomaster".to_owned()));
        assert!(calls.contains(&"ipset destroy net1_v".to_owned()));
    }

    #[test]
    fn start_without_initialize_initializes() {
        let mut fx = fixture(network(vec![]));
        fx.worker.start(&LocalSwitch::new("sw-1"));
        assert_eq!(fx.worker.state(), WorkerState::Started);
        assert!(fx.runner.calls().contains(&"ipset flush net1_r".to_owned()));
    }

    #[test]
    fn reload_restarts_cleanly() {
        let mut fx = fixture(network(vec![output("eth1", 0)]));
        fx.worker.initialize();
        fx.worker.start(&LocalSwitch::new("sw-1"));
        fx.worker.reload(&LocalSwitch::new("sw-2"));

        assert_eq!(fx.worker.state(), WorkerState::Started);
        assert_eq!(fx.worker.id(), "sw-2");
        assert_eq!(fx.worker.outputs().len(), 1);
        assert_eq!(fx.worker.firewall().rules().count(), 1);
    }

    #[test]
    fn rule_builders_queue_into_table() {
        let mut fx = fixture(network(vec![]));
        fx.worker.open_port("udp", "500,4500", "ipsec");
        fx.worker.forward_to_set("br-net1", "172.32.10.0/24", "net1_r", "");
        fx.worker.masq_from_set("net1_v", "10.0.0.0/8", "");
        fx.worker.allow_related("br-net1", "");
        fx.worker.acl_jump("", "br-net1");

        let rules: Vec<String> = fx
            .worker
            .firewall()
            .rules()
            .map(|(t, c, r)| format!("{t} {c} {r}"))
            .collect();
        assert_eq!(
            rules,
            vec![
                "filter INPUT -p udp -m multiport --dports 500,4500 -j ACCEPT -m comment --comment ipsec",
                "filter FORWARD -i br-net1 -s 172.32.10.0/24 -m set --match-set net1_r dst -j ACCEPT",
                "nat POSTROUTING -d 10.0.0.0/8 -m set --match-set net1_v src -j MASQUERADE",
                "filter FORWARD -o br-net1 -m conntrack --ctstate RELATED,ESTABLISHED -j ACCEPT",
            ]
        );
        assert!(fx.runner.calls().is_empty());
    }
}

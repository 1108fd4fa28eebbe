// ── iproute2 link manager ──

use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::debug;

use super::argv;
use crate::dataplane::{CommandRunner, LinkManager};
use crate::error::CoreError;

const IP: &str = "ip";

/// [`LinkManager`] driving the `ip` tool.
pub struct IpRoute2 {
    runner: Arc<dyn CommandRunner>,
}

impl IpRoute2 {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn ip(&self, args: Vec<String>) -> Result<String, CoreError> {
        self.runner.run(IP, &args)
    }
}

/// Interface index from the first line of `ip -o link show`.
fn parse_index(output: &str) -> Option<u32> {
    let (index, _) = output.trim_start().split_once(':')?;
    index.trim().parse().ok()
}

impl LinkManager for IpRoute2 {
    fn link_index(&self, name: &str) -> Result<u32, CoreError> {
        let not_found = || CoreError::LinkNotFound {
            name: name.to_owned(),
        };
        let output = self
            .ip(argv(["-o", "link", "show", "dev", name]))
            .map_err(|e| {
                debug!(link = name, error = %e, "link lookup failed");
                not_found()
            })?;
        parse_index(&output).ok_or_else(not_found)
    }

    fn set_up(&self, name: &str) -> Result<(), CoreError> {
        self.ip(argv(["link", "set", "dev", name, "up"]))?;
        Ok(())
    }

    fn add_vlan(&self, name: &str, parent: &str, vlan: u16) -> Result<(), CoreError> {
        let id = vlan.to_string();
        self.ip(argv([
            "link", "add", "link", parent, "name", name, "type", "vlan", "id", &id,
        ]))?;
        Ok(())
    }

    fn add_gretap(&self, name: &str, local: Ipv4Addr, remote: Ipv4Addr) -> Result<(), CoreError> {
        let local = if local.is_unspecified() {
            "any".to_owned()
        } else {
            local.to_string()
        };
        let remote = remote.to_string();
        self.ip(argv([
            "link", "add", name, "type", "gretap", "local", &local, "remote", &remote, "pmtudisc",
        ]))?;
        Ok(())
    }

    fn add_vxlan(
        &self,
        name: &str,
        vni: u32,
        group: Ipv4Addr,
        port: u16,
    ) -> Result<(), CoreError> {
        let peer = if group.is_multicast() {
            "group"
        } else {
            "remote"
        };
        let (vni, group, port) = (vni.to_string(), group.to_string(), port.to_string());
        self.ip(argv([
            "link", "add", name, "type", "vxlan", "id", &vni, peer, &group, "dstport", &port,
        ]))?;
        Ok(())
    }

    fn delete_link(&self, name: &str) -> Result<(), CoreError> {
        self.ip(argv(["link", "delete", "dev", name]))?;
        Ok(())
    }

    fn add_bridge_port(&self, bridge: &str, port: &str) -> Result<(), CoreError> {
        self.ip(argv(["link", "set", "dev", port, "master", bridge]))?;
        self.set_up(port)
    }

    fn del_bridge_port(&self, _bridge: &str, port: &str) -> Result<(), CoreError> {
        self.ip(argv(["link", "set", "dev", port, "nomaster"]))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn parses_link_index() {
        assert_eq!(
            parse_index("3: eth1: <BROADCAST,MULTICAST,UP> mtu 1500 qdisc fq_codel"),
            Some(3)
        );
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn link_index_reads_ip_output() {
        let runner = Arc::new(RecordingRunner::new());
        runner.reply(
            "ip -o link show dev eth1",
            "7: eth1: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq master br-lan",
        );
        let links = IpRoute2::new(runner);
        assert_eq!(links.link_index("eth1").unwrap(), 7);
    }

    #[test]
    fn missing_link_is_not_found() {
        let runner = Arc::new(RecordingRunner::new());
        runner.fail_on("ip -o link show dev eth9");
        let links = IpRoute2::new(runner);
        assert!(matches!(
            links.link_index("eth9"),
            Err(CoreError::LinkNotFound { name }) if name == "eth9"
        ));
    }

    #[test]
    fn vxlan_picks_group_or_remote() {
        let runner = Arc::new(RecordingRunner::new());
        let links = IpRoute2::new(runner.clone());
        links
            .add_vxlan("vn-1", 4000, "192.168.1.1".parse().unwrap(), 8472)
            .unwrap();
        links
            .add_vxlan("vn-2", 10, "239.1.1.1".parse().unwrap(), 4789)
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "ip link add vn-1 type vxlan id 4000 remote 192.168.1.1 dstport 8472",
                "ip link add vn-2 type vxlan id 10 group 239.1.1.1 dstport 4789",
            ]
        );
    }

    #[test]
    fn gretap_binds_wildcard_local() {
        let runner = Arc::new(RecordingRunner::new());
        IpRoute2::new(runner.clone())
            .add_gretap("ge-1", Ipv4Addr::UNSPECIFIED, "10.1.1.1".parse().unwrap())
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["ip link add ge-1 type gretap local any remote 10.1.1.1 pmtudisc"]
        );
    }
}

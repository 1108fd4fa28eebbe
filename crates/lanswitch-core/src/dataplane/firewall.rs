// ── Firewall table ──
//
// Rules are queued per (table, chain) while a worker starts and become
// effective together on `start`. `stop` withdraws them in reverse order.
// Both directions are best-effort: a rule the backend rejects is logged
// and the rest still apply.

use std::fmt;
use std::sync::Arc;

use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Target used when a rule names none.
pub const ACCEPT: &str = "ACCEPT";

/// Jump target for source NAT to the outgoing interface address.
pub const MASQUERADE: &str = "MASQUERADE";

/// Jump target for MSS clamping.
pub const TCPMSS: &str = "TCPMSS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Table {
    Filter,
    Nat,
    Mangle,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Chain {
    #[strum(serialize = "PREROUTING")]
    Pre,
    #[strum(serialize = "INPUT")]
    In,
    #[strum(serialize = "FORWARD")]
    For,
    #[strum(serialize = "POSTROUTING")]
    Post,
}

/// One firewall rule. Empty fields do not participate in matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpRule {
    pub input: Option<String>,
    pub output: Option<String>,
    pub source: Option<String>,
    /// Negated destination match.
    pub no_dest: Option<String>,
    pub dest: Option<String>,
    /// Address-set name matched against the source address.
    pub src_set: Option<String>,
    /// Address-set name matched against the destination address.
    pub dest_set: Option<String>,
    pub proto: Option<String>,
    /// Match extension (`tcp`, `multiport`, ...).
    pub matcher: Option<String>,
    pub dst_port: Option<String>,
    /// `--tcp-flags <mask> <comp>`.
    pub tcp_flags: Option<(String, String)>,
    pub ct_state: Option<String>,
    /// Target chain; [`ACCEPT`] when unset.
    pub jump: Option<String>,
    pub set_mss: Option<u16>,
    pub comment: Option<String>,
}

impl IpRule {
    /// Render the match/target part of an `iptables` invocation.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        if let Some(v) = &self.input {
            args.extend(["-i".into(), v.clone()]);
        }
        if let Some(v) = &self.output {
            args.extend(["-o".into(), v.clone()]);
        }
        if let Some(v) = &self.source {
            args.extend(["-s".into(), v.clone()]);
        }
        if let Some(v) = &self.no_dest {
            args.extend(["!".into(), "-d".into(), v.clone()]);
        }
        if let Some(v) = &self.dest {
            args.extend(["-d".into(), v.clone()]);
        }
        if let Some(v) = &self.src_set {
            args.extend(set_match(v, "src"));
        }
        if let Some(v) = &self.dest_set {
            args.extend(set_match(v, "dst"));
        }
        if let Some(v) = &self.proto {
            args.extend(["-p".into(), v.clone()]);
        }
        if let Some(v) = &self.matcher {
            args.extend(["-m".into(), v.clone()]);
        }
        if let Some(v) = &self.dst_port {
            let flag = if self.matcher.as_deref() == Some("multiport") {
                "--dports"
            } else {
                "--dport"
            };
            args.extend([flag.into(), v.clone()]);
        }
        if let Some((mask, comp)) = &self.tcp_flags {
            args.extend(["--tcp-flags".into(), mask.clone(), comp.clone()]);
        }
        if let Some(v) = &self.ct_state {
            args.extend(["-m".into(), "conntrack".into(), "--ctstate".into(), v.clone()]);
        }
        let jump = self.jump.as_deref().unwrap_or(ACCEPT);
        args.extend(["-j".into(), jump.to_owned()]);
        if let Some(mss) = self.set_mss {
            args.extend(["--set-mss".into(), mss.to_string()]);
        }
        if let Some(v) = &self.comment {
            args.extend(["-m".into(), "comment".into(), "--comment".into(), v.clone()]);
        }
        args
    }
}

fn set_match(name: &str, dir: &str) -> [String; 5] {
    [
        "-m".into(),
        "set".into(),
        "--match-set".into(),
        name.to_owned(),
        dir.to_owned(),
    ]
}

impl fmt::Display for IpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}

/// Applies and withdraws single rules on the host.
pub trait FirewallBackend: Send + Sync {
    fn insert(&self, table: Table, chain: Chain, rule: &IpRule) -> Result<(), CoreError>;
    fn delete(&self, table: Table, chain: Chain, rule: &IpRule) -> Result<(), CoreError>;
}

/// Per-network rule set activated and deactivated as a unit.
pub struct FirewallTable {
    name: String,
    rules: Vec<(Table, Chain, IpRule)>,
    active: bool,
    backend: Arc<dyn FirewallBackend>,
}

impl FirewallTable {
    pub fn new(name: &str, backend: Arc<dyn FirewallBackend>) -> Self {
        Self {
            name: name.to_owned(),
            rules: Vec::new(),
            active: false,
            backend,
        }
    }

    /// Queue a rule; it takes effect on the next `start`.
    pub fn add_rule(&mut self, table: Table, chain: Chain, rule: IpRule) {
        debug!(network = %self.name, %table, %chain, %rule, "firewall: queue rule");
        self.rules.push((table, chain, rule));
    }

    pub fn rules(&self) -> impl Iterator<Item = (Table, Chain, &IpRule)> {
        self.rules.iter().map(|(t, c, r)| (*t, *c, r))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply every queued rule in insertion order.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        for (table, chain, rule) in &self.rules {
            if let Err(e) = self.backend.insert(*table, *chain, rule) {
                warn!(network = %self.name, %table, %chain, %rule, error = %e, "firewall: insert failed");
            }
        }
        self.active = true;
    }

    /// Withdraw every applied rule in reverse order.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        for (table, chain, rule) in self.rules.iter().rev() {
            if let Err(e) = self.backend.delete(*table, *chain, rule) {
                warn!(network = %self.name, %table, %chain, %rule, error = %e, "firewall: delete failed");
            }
        }
        self.active = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_owned())
    }

    #[test]
    fn renders_mss_clamp_rule() {
        let rule = IpRule {
            output: s("br-net1"),
            proto: s("tcp"),
            matcher: s("tcp"),
            tcp_flags: Some(("SYN,RST".into(), "SYN".into())),
            jump: s(TCPMSS),
            set_mss: Some(1332),
            ..IpRule::default()
        };
        assert_eq!(
            rule.to_string(),
            "-o br-net1 -p tcp -m tcp --tcp-flags SYN,RST SYN -j TCPMSS --set-mss 1332"
        );
    }

    #[test]
    fn renders_negated_destination_and_comment() {
        let rule = IpRule {
            source: s("172.32.10.1/24"),
            no_dest: s("172.32.10.1/24"),
            jump: s(MASQUERADE),
            comment: s("Default Gateway for DHCP"),
            ..IpRule::default()
        };
        let args = rule.to_args();
        assert_eq!(&args[..5], &["-s", "172.32.10.1/24", "!", "-d", "172.32.10.1/24"]);
        assert_eq!(args.last().unwrap(), "Default Gateway for DHCP");
    }

    #[test]
    fn renders_set_matches() {
        let rule = IpRule {
            input: s("br-net1"),
            src_set: s("net1_r"),
            dest: s("10.0.0.0/8"),
            ..IpRule::default()
        };
        assert_eq!(
            rule.to_args(),
            vec![
                "-i", "br-net1", "-d", "10.0.0.0/8", "-m", "set", "--match-set", "net1_r", "src",
                "-j", "ACCEPT"
            ]
        );
    }

    #[test]
    fn rules_without_target_accept() {
        let rule = IpRule {
            input: s("br-net1"),
            output: s("br-net1"),
            ..IpRule::default()
        };
        assert_eq!(rule.to_string(), "-i br-net1 -o br-net1 -j ACCEPT");
    }

    #[test]
    fn multiport_uses_dports() {
        let rule = IpRule {
            proto: s("udp"),
            matcher: s("multiport"),
            dst_port: s("500,4500"),
            ..IpRule::default()
        };
        assert!(rule.to_string().contains("--dports 500,4500"));
    }

    #[test]
    fn chain_names_match_iptables() {
        assert_eq!(Chain::Pre.to_string(), "PREROUTING");
        assert_eq!(Chain::For.to_string(), "FORWARD");
        assert_eq!(Table::Mangle.to_string(), "mangle");
    }
}

// ── iptables firewall backend ──

use std::sync::Arc;

use crate::dataplane::{Chain, CommandRunner, FirewallBackend, IpRule, Table};
use crate::error::CoreError;

const IPTABLES: &str = "iptables";

/// [`FirewallBackend`] appending and deleting rules with `iptables`.
pub struct Iptables {
    runner: Arc<dyn CommandRunner>,
}

impl Iptables {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn exec(&self, op: &str, table: Table, chain: Chain, rule: &IpRule) -> Result<(), CoreError> {
        let mut args = vec![
            "-t".to_owned(),
            table.to_string(),
            op.to_owned(),
            chain.to_string(),
        ];
        args.extend(rule.to_args());
        self.runner.run(IPTABLES, &args)?;
        Ok(())
    }
}

impl FirewallBackend for Iptables {
    fn insert(&self, table: Table, chain: Chain, rule: &IpRule) -> Result<(), CoreError> {
        self.exec("-A", table, chain, rule)
    }

    fn delete(&self, table: Table, chain: Chain, rule: &IpRule) -> Result<(), CoreError> {
        self.exec("-D", table, chain, rule)
    }
}

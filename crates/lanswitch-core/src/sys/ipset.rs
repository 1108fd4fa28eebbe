// ── ipset address-set store ──

use std::sync::Arc;

use super::argv;
use crate::dataplane::{AddressSetStore, CommandRunner};
use crate::error::CoreError;

const IPSET: &str = "ipset";

/// [`AddressSetStore`] backed by kernel ipsets.
pub struct Ipset {
    runner: Arc<dyn CommandRunner>,
}

impl Ipset {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl AddressSetStore for Ipset {
    fn clear(&self, name: &str, kind: &str) -> Result<String, CoreError> {
        let mut out = self.runner.run(IPSET, &argv(["create", name, kind, "-exist"]))?;
        out.push_str(&self.runner.run(IPSET, &argv(["flush", name]))?);
        Ok(out)
    }

    fn destroy(&self, name: &str) -> Result<String, CoreError> {
        self.runner.run(IPSET, &argv(["destroy", name]))
    }
}

// ── Output ports ──

use uuid::Uuid;

use crate::dataplane::OutputKind;
use crate::error::CoreError;
use crate::model::OutputConfig;

/// An output attached to a started worker's bridge.
///
/// `link` is filled in while provisioning. For GRE and VXLAN outputs it
/// holds a generated device name that cannot be recovered from the
/// specification, so teardown relies on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxPort {
    name: String,
    vlan: u16,
    link: String,
}

impl LinuxPort {
    pub fn new(spec: &str, vlan: u16) -> Self {
        Self {
            name: spec.to_owned(),
            vlan,
            link: String::new(),
        }
    }

    /// Raw output specification.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vlan(&self) -> u16 {
        self.vlan
    }

    /// Resolved link name, empty until provisioned.
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn kind(&self) -> Result<OutputKind, CoreError> {
        self.name.parse()
    }

    /// Resolve the link name for `kind`, generating one for tunnel devices.
    pub(crate) fn resolve(&mut self, kind: &OutputKind) -> &str {
        match (kind, kind.name_prefix()) {
            (OutputKind::Physical(name), _) => name.clone_into(&mut self.link),
            (_, Some(prefix)) if self.link.is_empty() => self.link = gen_name(prefix),
            _ => {}
        }
        &self.link
    }
}

impl From<&OutputConfig> for LinuxPort {
    fn from(cfg: &OutputConfig) -> Self {
        Self::new(&cfg.interface, cfg.vlan)
    }
}

/// Short random device name: prefix plus 8 hex digits, within IFNAMSIZ.
fn gen_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..8])
}

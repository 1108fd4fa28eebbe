// ── Address sets ──

use std::sync::Arc;

use crate::error::CoreError;

/// Set type for network-prefix members.
pub const HASH_NET: &str = "hash:net";

/// Named, bulk-updatable address collections used by firewall matches.
pub trait AddressSetStore: Send + Sync {
    /// Create the set if missing, then empty it. Returns tool output.
    fn clear(&self, name: &str, kind: &str) -> Result<String, CoreError>;
    fn destroy(&self, name: &str) -> Result<String, CoreError>;
}

/// Handle to one named set in a store.
#[derive(Clone)]
pub struct AddressSet {
    name: String,
    kind: String,
    store: Arc<dyn AddressSetStore>,
}

impl AddressSet {
    pub fn new(name: String, kind: &str, store: Arc<dyn AddressSetStore>) -> Self {
        Self {
            name,
            kind: kind.to_owned(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clear(&self) -> Result<String, CoreError> {
        self.store.clear(&self.name, &self.kind)
    }

    pub fn destroy(&self) -> Result<String, CoreError> {
        self.store.destroy(&self.name)
    }
}

impl std::fmt::Debug for AddressSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSet")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

//! Arena of registry instances.
//!
//! Subregistry pointers in the datastore are plain registry ids; this
//! arena maps ids to live instances. Ids can be derived deterministically
//! from (deployer, salt), so a subregistry can be addressed, and lazily
//! deployed, before anything exists at that id. This is what lets a
//! locked migration move a single name now and its subtree later.

use crate::datastore::Datastore;
use crate::errors::Result;
use crate::registry::{NameRegistry, Registry};
use namechain_types::{Address, RegistryId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
pub struct RegistryArena {
    registries: RwLock<HashMap<RegistryId, Arc<Registry>>>,
}

impl RegistryArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a registry id to its live instance.
    pub fn get(&self, id: RegistryId) -> Option<Arc<Registry>> {
        self.registries.read().get(&id).cloned()
    }

    /// Track an externally created registry.
    pub fn insert(&self, registry: Arc<Registry>) {
        self.registries.write().insert(registry.id(), registry);
    }

    /// Deploy a registry at the deterministic id for (deployer, salt),
    /// or return the existing instance. Idempotent per id.
    pub fn get_or_deploy(
        &self,
        deployer: &Address,
        salt: &[u8; 32],
        datastore: Arc<Datastore>,
        root_admin: Address,
    ) -> Result<Arc<Registry>> {
        let id = RegistryId::deterministic(deployer, salt);
        if let Some(existing) = self.get(id) {
            return Ok(existing);
        }
        let registry = Registry::new(id, datastore, root_admin)?;
        self.registries.write().insert(id, registry.clone());
        info!(registry = %id, deployer = %deployer, "deployed subregistry");
        Ok(registry)
    }
}

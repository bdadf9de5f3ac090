//! Namespaced key-value storage for name entries.
//!
//! The datastore holds every registry's name records under that
//! registry's namespace. Writes require the namespace's [`NamespaceToken`],
//! handed out exactly once per registry id, so only the owning registry
//! instance can mutate its records; a registry implementation can be
//! replaced without migrating storage. No business rules live here.

use crate::errors::{RegistryError, Result};
use namechain_types::{Address, CanonicalId, RegistryId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Stored record for one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub owner: Address,
    pub resolver: Address,
    pub expiry: u64,
    pub version: u32,
    /// Held by a controller pending cross-chain relay; non-transferable.
    pub locked: bool,
}

/// Write capability for one registry's namespace. Not clonable.
#[derive(Debug)]
pub struct NamespaceToken {
    registry: RegistryId,
}

impl NamespaceToken {
    /// The namespace this token writes into.
    pub fn registry(&self) -> RegistryId {
        self.registry
    }
}

/// Per-registry-namespaced store of name entries and subregistry pointers.
#[derive(Debug, Default)]
pub struct Datastore {
    entries: RwLock<HashMap<(RegistryId, CanonicalId), NameEntry>>,
    subregistries: RwLock<HashMap<(RegistryId, CanonicalId), RegistryId>>,
    namespaces: RwLock<HashSet<RegistryId>>,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a namespace, yielding its write token. Fails if the
    /// namespace was already claimed.
    pub fn register_namespace(&self, registry: RegistryId) -> Result<NamespaceToken> {
        let mut namespaces = self.namespaces.write();
        if !namespaces.insert(registry) {
            return Err(RegistryError::NamespaceTaken { id: registry });
        }
        Ok(NamespaceToken { registry })
    }

    /// Read a name entry from any namespace.
    pub fn entry(&self, registry: RegistryId, id: CanonicalId) -> Option<NameEntry> {
        self.entries.read().get(&(registry, id)).cloned()
    }

    /// Write a name entry into the token's namespace.
    pub fn set_entry(&self, token: &NamespaceToken, id: CanonicalId, entry: NameEntry) {
        self.entries.write().insert((token.registry, id), entry);
    }

    /// Remove a name entry from the token's namespace.
    pub fn remove_entry(&self, token: &NamespaceToken, id: CanonicalId) {
        self.entries.write().remove(&(token.registry, id));
    }

    /// Read a subregistry pointer from any namespace.
    pub fn subregistry(&self, registry: RegistryId, id: CanonicalId) -> Option<RegistryId> {
        self.subregistries.read().get(&(registry, id)).copied()
    }

    /// Write or clear a subregistry pointer in the token's namespace.
    pub fn set_subregistry(
        &self,
        token: &NamespaceToken,
        id: CanonicalId,
        subregistry: Option<RegistryId>,
    ) {
        let mut subregistries = self.subregistries.write();
        match subregistry {
            Some(target) => {
                subregistries.insert((token.registry, id), target);
            }
            None => {
                subregistries.remove(&(token.registry, id));
            }
        }
    }
}

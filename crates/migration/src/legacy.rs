//! Seams toward the legacy registrar and wrapped-name registry.
//!
//! Both collaborators live outside this system. Reads cover everything
//! the migration paths need; the only writes are the locked path's
//! terminal fuse burn and resolver clear. The stubs back tests and
//! enforce the fuse monotonicity invariant the real wrapper guarantees.

use namechain_types::{Address, FuseSet, Node};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A legacy holding as transferred into a migration controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyToken {
    /// Wrapped name; the token id is the name's node.
    Wrapped(Node),
    /// Unwrapped registrar token; the token id is the labelhash.
    Unwrapped([u8; 32]),
}

/// Read-only view of the legacy second-level registrar.
pub trait LegacyRegistrar: Send + Sync {
    /// Expiry of a second-level name by labelhash; 0 when unknown.
    fn name_expires(&self, labelhash: [u8; 32]) -> u64;
    fn owner_of(&self, labelhash: [u8; 32]) -> Option<Address>;
}

/// The legacy wrapped-name registry.
pub trait LegacyNameWrapper: Send + Sync {
    /// Owner, fuses and expiry of a wrapped name.
    fn get_data(&self, node: Node) -> Option<(Address, FuseSet, u64)>;
    /// Burn fuses into a wrapped name. Set-only.
    fn burn_fuses(&self, node: Node, fuses: FuseSet);
    fn set_resolver(&self, node: Node, resolver: Address);
    fn resolver(&self, node: Node) -> Address;
    /// Account identity of the wrapper contract.
    fn address(&self) -> Address;
}

/// In-memory legacy registrar for tests and local wiring.
#[derive(Default)]
pub struct StubLegacyRegistrar {
    names: RwLock<HashMap<[u8; 32], (Address, u64)>>,
}

impl StubLegacyRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, labelhash: [u8; 32], owner: Address, expires: u64) {
        self.names.write().insert(labelhash, (owner, expires));
    }
}

impl LegacyRegistrar for StubLegacyRegistrar {
    fn name_expires(&self, labelhash: [u8; 32]) -> u64 {
        self.names
            .read()
            .get(&labelhash)
            .map(|(_, expires)| *expires)
            .unwrap_or(0)
    }

    fn owner_of(&self, labelhash: [u8; 32]) -> Option<Address> {
        self.names.read().get(&labelhash).map(|(owner, _)| *owner)
    }
}

#[derive(Debug, Clone)]
struct WrappedRecord {
    owner: Address,
    fuses: FuseSet,
    expiry: u64,
    resolver: Address,
}

/// In-memory wrapped-name registry for tests and local wiring.
pub struct StubLegacyWrapper {
    address: Address,
    records: RwLock<HashMap<Node, WrappedRecord>>,
}

impl StubLegacyWrapper {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(
        &self,
        node: Node,
        owner: Address,
        fuses: FuseSet,
        expiry: u64,
        resolver: Address,
    ) {
        self.records.write().insert(
            node,
            WrappedRecord {
                owner,
                fuses,
                expiry,
                resolver,
            },
        );
    }

    pub fn fuses(&self, node: Node) -> FuseSet {
        self.records
            .read()
            .get(&node)
            .map(|r| r.fuses)
            .unwrap_or(FuseSet::empty())
    }
}

impl LegacyNameWrapper for StubLegacyWrapper {
    fn get_data(&self, node: Node) -> Option<(Address, FuseSet, u64)> {
        self.records
            .read()
            .get(&node)
            .map(|r| (r.owner, r.fuses, r.expiry))
    }

    fn burn_fuses(&self, node: Node, fuses: FuseSet) {
        if let Some(record) = self.records.write().get_mut(&node) {
            // Fuses only ever accumulate.
            record.fuses |= fuses;
        }
    }

    fn set_resolver(&self, node: Node, resolver: Address) {
        if let Some(record) = self.records.write().get_mut(&node) {
            record.resolver = resolver;
        }
    }

    fn resolver(&self, node: Node) -> Address {
        self.records
            .read()
            .get(&node)
            .map(|r| r.resolver)
            .unwrap_or(Address::ZERO)
    }

    fn address(&self) -> Address {
        self.address
    }
}

//! Registry tree nodes.
//!
//! Every node of the name hierarchy (root, TLD, per-name subregistry) is
//! a [`Registry`] over the shared [`Datastore`], satisfying the same
//! [`NameRegistry`] trait. Children are referenced by registry id and
//! resolved through the arena; the tree is composed by reference, never
//! inheritance.

use crate::datastore::{Datastore, NameEntry, NamespaceToken};
use crate::errors::{RegistryError, Result};
use crate::roles::RoleStore;
use namechain_types::{
    unix_now, Address, CanonicalId, Label, RegistryId, RoleSet, TokenId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Assembled view of one name's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameData {
    pub owner: Address,
    pub subregistry: Option<RegistryId>,
    pub resolver: Address,
    pub expiry: u64,
}

/// Operations every node of the registry tree exposes.
pub trait NameRegistry: Send + Sync {
    fn id(&self) -> RegistryId;

    /// Register a name. Fails with `NameNotAvailable` unless the label
    /// is unregistered or expired. Returns the freshly versioned token.
    #[allow(clippy::too_many_arguments)]
    fn register(
        &self,
        caller: Address,
        label: &Label,
        owner: Address,
        subregistry: Option<RegistryId>,
        resolver: Address,
        roles: RoleSet,
        expiry: u64,
    ) -> Result<TokenId>;

    /// Extend a name's expiry. Requires the RENEW role.
    fn renew(&self, caller: Address, token: TokenId, new_expiry: u64) -> Result<()>;

    /// Replace a name's resolver. Requires the SET_RESOLVER role.
    fn set_resolver(&self, caller: Address, token: TokenId, resolver: Address) -> Result<()>;

    /// Replace or clear a name's subregistry pointer. Requires the
    /// SET_SUBREGISTRY role.
    fn set_subregistry(
        &self,
        caller: Address,
        token: TokenId,
        subregistry: Option<RegistryId>,
    ) -> Result<()>;

    /// Destroy a name's entry. Requires the BURN role.
    fn burn(&self, caller: Address, token: TokenId) -> Result<()>;

    fn get_name_data(&self, label: &Label) -> Option<NameData>;
    fn get_resolver(&self, label: &Label) -> Option<Address>;
    fn get_subregistry(&self, label: &Label) -> Option<RegistryId>;
    fn owner_of(&self, token: TokenId) -> Result<Address>;
    /// Current token of a label, if registered (expired or not).
    fn token_of(&self, label: &Label) -> Option<TokenId>;

    fn has_roles(&self, resource: CanonicalId, account: Address, roles: RoleSet) -> bool;
    fn grant_roles(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()>;
    fn revoke_roles(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()>;

    /// Approve an operator for one versioned token. A version bump on
    /// re-registration invalidates the approval with the old token.
    fn approve(&self, caller: Address, token: TokenId, operator: Address) -> Result<()>;

    /// Move token ownership. The only way ownership ever changes.
    fn transfer(&self, caller: Address, token: TokenId, from: Address, to: Address) -> Result<()>;
}

/// One node of the registry tree.
pub struct Registry {
    token: NamespaceToken,
    datastore: Arc<Datastore>,
    roles: RoleStore,
    approvals: RwLock<HashMap<TokenId, Address>>,
}

impl Registry {
    /// Create a registry over its claimed datastore namespace, granting
    /// the full role set registry-wide to `root_admin`.
    pub fn new(
        id: RegistryId,
        datastore: Arc<Datastore>,
        root_admin: Address,
    ) -> Result<Arc<Self>> {
        let token = datastore.register_namespace(id)?;
        let roles = RoleStore::new();
        roles_bootstrap(&roles, root_admin);
        Ok(Arc::new(Self {
            token,
            datastore,
            roles,
            approvals: RwLock::new(HashMap::new()),
        }))
    }

    /// Whether the label is free for a fresh registration: no entry, or
    /// the existing entry has expired.
    pub fn is_available(&self, label: &Label) -> bool {
        let id = CanonicalId::from_label(label);
        match self.datastore.entry(self.token.registry(), id) {
            None => true,
            Some(entry) => unix_now() > entry.expiry,
        }
    }

    /// Mark a name held-by-controller: non-transferable pending relay.
    /// The caller must own the token.
    pub fn lock(&self, caller: Address, token: TokenId) -> Result<()> {
        let mut entry = self.current_entry(token)?;
        if entry.owner != caller {
            return Err(RegistryError::NotTokenOwner {
                from: caller,
                id: token,
            });
        }
        entry.locked = true;
        self.datastore.set_entry(&self.token, token.canonical(), entry);
        debug!(token = %token, "name locked pending relay");
        Ok(())
    }

    /// Reissue a name the caller holds locked (an inbound cross-chain
    /// credit completing a round trip). Writes the delivered record,
    /// bumps the version so approvals from before the ejection die, and
    /// releases the lock.
    #[allow(clippy::too_many_arguments)]
    pub fn release(
        &self,
        caller: Address,
        token: TokenId,
        owner: Address,
        subregistry: Option<RegistryId>,
        resolver: Address,
        roles: RoleSet,
        expiry: u64,
    ) -> Result<TokenId> {
        let entry = self.current_entry(token)?;
        if entry.owner != caller {
            return Err(RegistryError::NotTokenOwner {
                from: caller,
                id: token,
            });
        }
        if !entry.locked {
            return Err(RegistryError::NameNotHeld { id: token });
        }

        let id = token.canonical();
        let version = entry.version + 1;
        self.datastore.set_entry(
            &self.token,
            id,
            NameEntry {
                owner,
                resolver,
                expiry,
                version,
                locked: false,
            },
        );
        self.datastore.set_subregistry(&self.token, id, subregistry);
        self.roles.clear_resource(id);
        self.roles.grant_unchecked(id, owner, roles);
        self.approvals
            .write()
            .retain(|t, _| t.canonical() != id);

        info!(token = %token, owner = %owner, version, "released held name");
        Ok(id.with_version(version))
    }

    fn current_entry(&self, token: TokenId) -> Result<NameEntry> {
        let entry = self
            .datastore
            .entry(self.token.registry(), token.canonical())
            .ok_or(RegistryError::NameNotFound { id: token })?;
        if entry.version != token.version() {
            return Err(RegistryError::TokenVersionStale { id: token });
        }
        Ok(entry)
    }
}

fn roles_bootstrap(roles: &RoleStore, root_admin: Address) {
    if !root_admin.is_zero() {
        roles.grant_unchecked(CanonicalId::ROOT, root_admin, RoleSet::all());
    }
}

impl NameRegistry for Registry {
    fn id(&self) -> RegistryId {
        self.token.registry()
    }

    fn register(
        &self,
        caller: Address,
        label: &Label,
        owner: Address,
        subregistry: Option<RegistryId>,
        resolver: Address,
        roles: RoleSet,
        expiry: u64,
    ) -> Result<TokenId> {
        if !label.is_valid() {
            return Err(RegistryError::InvalidLabel {
                label: label.as_str().to_string(),
            });
        }
        self.roles.check(CanonicalId::ROOT, caller, RoleSet::REGISTRAR)?;

        let id = CanonicalId::from_label(label);
        let previous = self.datastore.entry(self.token.registry(), id);
        if let Some(ref entry) = previous {
            if unix_now() <= entry.expiry {
                return Err(RegistryError::NameNotAvailable {
                    label: label.as_str().to_string(),
                });
            }
        }

        // Version bump on re-registration kills approvals and stale
        // references held against the old token.
        let version = previous.map(|e| e.version + 1).unwrap_or(1);
        let token = id.with_version(version);

        self.datastore.set_entry(
            &self.token,
            id,
            NameEntry {
                owner,
                resolver,
                expiry,
                version,
                locked: false,
            },
        );
        self.datastore.set_subregistry(&self.token, id, subregistry);
        self.roles.clear_resource(id);
        self.roles.grant_unchecked(id, owner, roles);

        info!(label = %label, owner = %owner, version, "registered name");
        Ok(token)
    }

    fn renew(&self, caller: Address, token: TokenId, new_expiry: u64) -> Result<()> {
        let mut entry = self.current_entry(token)?;
        if unix_now() > entry.expiry {
            return Err(RegistryError::NameExpired { id: token });
        }
        self.roles.check(token.canonical(), caller, RoleSet::RENEW)?;
        if new_expiry <= entry.expiry {
            return Err(RegistryError::CannotReduceExpiry {
                current: entry.expiry,
                requested: new_expiry,
            });
        }
        entry.expiry = new_expiry;
        self.datastore.set_entry(&self.token, token.canonical(), entry);
        info!(token = %token, new_expiry, "renewed name");
        Ok(())
    }

    fn set_resolver(&self, caller: Address, token: TokenId, resolver: Address) -> Result<()> {
        let mut entry = self.current_entry(token)?;
        self.roles
            .check(token.canonical(), caller, RoleSet::SET_RESOLVER)?;
        entry.resolver = resolver;
        self.datastore.set_entry(&self.token, token.canonical(), entry);
        Ok(())
    }

    fn set_subregistry(
        &self,
        caller: Address,
        token: TokenId,
        subregistry: Option<RegistryId>,
    ) -> Result<()> {
        self.current_entry(token)?;
        self.roles
            .check(token.canonical(), caller, RoleSet::SET_SUBREGISTRY)?;
        self.datastore
            .set_subregistry(&self.token, token.canonical(), subregistry);
        Ok(())
    }

    fn burn(&self, caller: Address, token: TokenId) -> Result<()> {
        self.current_entry(token)?;
        self.roles.check(token.canonical(), caller, RoleSet::BURN)?;
        self.datastore.remove_entry(&self.token, token.canonical());
        self.datastore
            .set_subregistry(&self.token, token.canonical(), None);
        self.roles.clear_resource(token.canonical());
        self.approvals
            .write()
            .retain(|t, _| t.canonical() != token.canonical());
        info!(token = %token, "burned name");
        Ok(())
    }

    fn get_name_data(&self, label: &Label) -> Option<NameData> {
        let id = CanonicalId::from_label(label);
        let entry = self.datastore.entry(self.token.registry(), id)?;
        Some(NameData {
            owner: entry.owner,
            subregistry: self.datastore.subregistry(self.token.registry(), id),
            resolver: entry.resolver,
            expiry: entry.expiry,
        })
    }

    fn get_resolver(&self, label: &Label) -> Option<Address> {
        self.get_name_data(label).map(|data| data.resolver)
    }

    fn get_subregistry(&self, label: &Label) -> Option<RegistryId> {
        let id = CanonicalId::from_label(label);
        self.datastore.subregistry(self.token.registry(), id)
    }

    fn owner_of(&self, token: TokenId) -> Result<Address> {
        Ok(self.current_entry(token)?.owner)
    }

    fn token_of(&self, label: &Label) -> Option<TokenId> {
        let id = CanonicalId::from_label(label);
        let entry = self.datastore.entry(self.token.registry(), id)?;
        Some(id.with_version(entry.version))
    }

    fn has_roles(&self, resource: CanonicalId, account: Address, roles: RoleSet) -> bool {
        self.roles.has(resource, account, roles)
    }

    fn grant_roles(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()> {
        self.roles.grant(caller, resource, account, roles)
    }

    fn revoke_roles(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()> {
        self.roles.revoke(caller, resource, account, roles)
    }

    fn approve(&self, caller: Address, token: TokenId, operator: Address) -> Result<()> {
        let entry = self.current_entry(token)?;
        if entry.owner != caller {
            return Err(RegistryError::NotTokenOwner {
                from: caller,
                id: token,
            });
        }
        self.approvals.write().insert(token, operator);
        Ok(())
    }

    fn transfer(&self, caller: Address, token: TokenId, from: Address, to: Address) -> Result<()> {
        let mut entry = self.current_entry(token)?;
        if entry.owner != from {
            return Err(RegistryError::NotTokenOwner { from, id: token });
        }
        if entry.locked {
            return Err(RegistryError::NameLocked { id: token });
        }
        let approved = self.approvals.read().get(&token).copied();
        if caller != from && approved != Some(caller) {
            return Err(RegistryError::NotTransferAuthorized { caller, id: token });
        }
        entry.owner = to;
        self.datastore.set_entry(&self.token, token.canonical(), entry);
        self.approvals.write().remove(&token);
        info!(token = %token, from = %from, to = %to, "transferred name token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = Address([0xaa; 20]);
    const ALICE: Address = Address([1u8; 20]);
    const BOB: Address = Address([2u8; 20]);

    fn future(secs: u64) -> u64 {
        unix_now() + secs
    }

    fn past(secs: u64) -> u64 {
        unix_now().saturating_sub(secs)
    }

    fn registry() -> Arc<Registry> {
        let datastore = Arc::new(Datastore::new());
        Registry::new(RegistryId([1u8; 32]), datastore, ADMIN).unwrap()
    }

    fn register(registry: &Registry, label: &str, owner: Address, expiry: u64) -> TokenId {
        registry
            .register(
                ADMIN,
                &Label::new(label),
                owner,
                None,
                Address::ZERO,
                RoleSet::RENEW | RoleSet::SET_RESOLVER | RoleSet::SET_SUBREGISTRY,
                expiry,
            )
            .unwrap()
    }

    #[test]
    fn register_requires_registrar_role() {
        let registry = registry();
        let result = registry.register(
            ALICE,
            &Label::new("test"),
            ALICE,
            None,
            Address::ZERO,
            RoleSet::empty(),
            future(3600),
        );
        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
    }

    #[test]
    fn live_name_is_not_available() {
        let registry = registry();
        register(&registry, "test", ALICE, future(3600));

        assert!(!registry.is_available(&Label::new("test")));
        let result = registry.register(
            ADMIN,
            &Label::new("test"),
            BOB,
            None,
            Address::ZERO,
            RoleSet::empty(),
            future(3600),
        );
        assert!(matches!(
            result,
            Err(RegistryError::NameNotAvailable { .. })
        ));
    }

    #[test]
    fn expired_name_reregisters_with_bumped_version() {
        let registry = registry();
        let first = register(&registry, "test", ALICE, past(10));

        assert!(registry.is_available(&Label::new("test")));
        let second = register(&registry, "test", BOB, future(3600));

        assert_eq!(second.canonical(), first.canonical());
        assert_eq!(second.version(), first.version() + 1);
        assert_eq!(registry.owner_of(second).unwrap(), BOB);
    }

    #[test]
    fn version_bump_invalidates_stale_approvals() {
        let registry = registry();
        let first = register(&registry, "test", ALICE, past(10));
        registry.approve(ALICE, first, BOB).unwrap();

        let second = register(&registry, "test", ALICE, future(3600));

        // The approval rode on the old version and died with it.
        assert!(matches!(
            registry.transfer(BOB, first, ALICE, BOB),
            Err(RegistryError::TokenVersionStale { .. })
        ));
        assert!(matches!(
            registry.transfer(BOB, second, ALICE, BOB),
            Err(RegistryError::NotTransferAuthorized { .. })
        ));
    }

    #[test]
    fn expired_name_cannot_be_renewed() {
        let registry = registry();
        let token = register(&registry, "gone", ALICE, past(10));
        assert!(matches!(
            registry.renew(ALICE, token, future(3600)),
            Err(RegistryError::NameExpired { .. })
        ));
    }

    #[test]
    fn renew_requires_role_and_extension() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));

        assert!(matches!(
            registry.renew(BOB, token, future(7200)),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert!(matches!(
            registry.renew(ALICE, token, past(10)),
            Err(RegistryError::CannotReduceExpiry { .. })
        ));

        registry.renew(ALICE, token, future(7200)).unwrap();
        let data = registry.get_name_data(&Label::new("test")).unwrap();
        assert!(data.expiry > future(3600) - 2);
    }

    #[test]
    fn set_resolver_requires_role() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));

        assert!(registry
            .set_resolver(BOB, token, Address::new([9u8; 20]))
            .is_err());
        registry
            .set_resolver(ALICE, token, Address::new([9u8; 20]))
            .unwrap();
        assert_eq!(
            registry.get_resolver(&Label::new("test")),
            Some(Address::new([9u8; 20]))
        );
    }

    #[test]
    fn transfer_is_the_only_ownership_change() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));

        // Stranger cannot move it.
        assert!(matches!(
            registry.transfer(BOB, token, ALICE, BOB),
            Err(RegistryError::NotTransferAuthorized { .. })
        ));

        registry.transfer(ALICE, token, ALICE, BOB).unwrap();
        assert_eq!(registry.owner_of(token).unwrap(), BOB);
    }

    #[test]
    fn approved_operator_may_transfer_once() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));

        registry.approve(ALICE, token, BOB).unwrap();
        registry.transfer(BOB, token, ALICE, BOB).unwrap();

        // Approval was consumed with the transfer.
        assert!(registry.transfer(ALICE, token, BOB, ALICE).is_err());
    }

    #[test]
    fn locked_name_cannot_be_transferred() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));

        registry.lock(ALICE, token).unwrap();
        assert!(matches!(
            registry.transfer(ALICE, token, ALICE, BOB),
            Err(RegistryError::NameLocked { .. })
        ));
    }

    #[test]
    fn stale_token_version_is_rejected() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));
        let stale = token.canonical().with_version(token.version() + 1);

        assert!(matches!(
            registry.owner_of(stale),
            Err(RegistryError::TokenVersionStale { .. })
        ));
    }

    #[test]
    fn burn_clears_entry_roles_and_pointer() {
        let registry = registry();
        let token = registry
            .register(
                ADMIN,
                &Label::new("test"),
                ALICE,
                Some(RegistryId([5u8; 32])),
                Address::ZERO,
                RoleSet::RENEW,
                future(3600),
            )
            .unwrap();
        registry
            .grant_roles(ADMIN, token.canonical(), ALICE, RoleSet::BURN)
            .unwrap();

        registry.burn(ALICE, token).unwrap();
        assert!(registry.get_name_data(&Label::new("test")).is_none());
        assert_eq!(registry.get_subregistry(&Label::new("test")), None);
        assert!(!registry.has_roles(token.canonical(), ALICE, RoleSet::RENEW));
    }

    #[test]
    fn release_reissues_a_held_name() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));
        let controller = Address([0xcc; 20]);
        registry.transfer(ALICE, token, ALICE, controller).unwrap();
        registry.lock(controller, token).unwrap();

        // Only the holding controller may release.
        assert!(registry
            .release(
                ALICE,
                token,
                BOB,
                None,
                Address::ZERO,
                RoleSet::empty(),
                future(100),
            )
            .is_err());

        let released = registry
            .release(
                controller,
                token,
                BOB,
                None,
                Address::ZERO,
                RoleSet::RENEW,
                future(7200),
            )
            .unwrap();
        assert_eq!(released.version(), token.version() + 1);
        assert_eq!(registry.owner_of(released).unwrap(), BOB);
        assert!(registry.has_roles(released.canonical(), BOB, RoleSet::RENEW));

        // Lock is gone, so the new owner can transfer freely.
        registry.transfer(BOB, released, BOB, ALICE).unwrap();
    }

    #[test]
    fn release_requires_the_lock() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));
        assert!(matches!(
            registry.release(
                ALICE,
                token,
                BOB,
                None,
                Address::ZERO,
                RoleSet::empty(),
                future(100),
            ),
            Err(RegistryError::NameNotHeld { .. })
        ));
    }

    #[test]
    fn registration_grants_requested_roles_to_owner() {
        let registry = registry();
        let token = register(&registry, "test", ALICE, future(3600));
        assert!(registry.has_roles(token.canonical(), ALICE, RoleSet::RENEW));
        assert!(!registry.has_roles(token.canonical(), BOB, RoleSet::RENEW));
    }
}

//! Per-resource role assignments.
//!
//! An explicit (resource, account) → roles map. Roles granted on
//! [`CanonicalId::ROOT`] apply registry-wide. Granting or revoking a
//! role requires the caller to hold its paired admin bit on the same
//! resource (or root-scoped).

use crate::errors::{RegistryError, Result};
use namechain_types::{Address, CanonicalId, RoleSet};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RoleStore {
    roles: RwLock<HashMap<(CanonicalId, Address), RoleSet>>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective roles of an account on a resource, including
    /// root-scoped roles.
    pub fn roles_of(&self, resource: CanonicalId, account: Address) -> RoleSet {
        let roles = self.roles.read();
        let mut held = roles
            .get(&(resource, account))
            .copied()
            .unwrap_or(RoleSet::empty());
        if resource != CanonicalId::ROOT {
            held |= roles
                .get(&(CanonicalId::ROOT, account))
                .copied()
                .unwrap_or(RoleSet::empty());
        }
        held
    }

    /// Whether the account holds every bit of `required` on the resource.
    pub fn has(&self, resource: CanonicalId, account: Address, required: RoleSet) -> bool {
        self.roles_of(resource, account).contains(required)
    }

    /// Role check that fails with `Unauthorized`.
    pub fn check(&self, resource: CanonicalId, account: Address, required: RoleSet) -> Result<()> {
        if self.has(resource, account, required) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized { account, resource })
        }
    }

    /// Grant roles, requiring the caller to hold the matching admin bits.
    pub fn grant(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()> {
        self.check_admin(caller, resource, roles)?;
        self.grant_unchecked(resource, account, roles);
        Ok(())
    }

    /// Revoke roles, requiring the caller to hold the matching admin bits.
    pub fn revoke(
        &self,
        caller: Address,
        resource: CanonicalId,
        account: Address,
        roles: RoleSet,
    ) -> Result<()> {
        self.check_admin(caller, resource, roles)?;
        let mut map = self.roles.write();
        if let Some(held) = map.get_mut(&(resource, account)) {
            held.remove(roles);
            if held.is_empty() {
                map.remove(&(resource, account));
            }
        }
        Ok(())
    }

    /// Grant without an admin check. Reserved for the registry itself
    /// (initial grants at registration time).
    pub(crate) fn grant_unchecked(&self, resource: CanonicalId, account: Address, roles: RoleSet) {
        if roles.is_empty() {
            return;
        }
        let mut map = self.roles.write();
        *map.entry((resource, account)).or_insert(RoleSet::empty()) |= roles;
    }

    /// Drop every assignment scoped to a resource. Used when a name's
    /// entry is burned.
    pub(crate) fn clear_resource(&self, resource: CanonicalId) {
        self.roles.write().retain(|(r, _), _| *r != resource);
    }

    fn check_admin(&self, caller: Address, resource: CanonicalId, roles: RoleSet) -> Result<()> {
        if self.roles_of(resource, caller).can_administer(roles) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                account: caller,
                resource,
            })
        }
    }
}

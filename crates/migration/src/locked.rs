//! Migration of fuse-locked legacy names.
//!
//! The locked path is the trust boundary of the whole migration: the
//! legacy name is already immutable, so the mover must not come out of
//! the move with more authority than the lock encoded. The destination
//! role bitmask is therefore derived purely from the fuse state; the
//! payload cannot even carry a role field. The path ends with an
//! irreversible freeze of the legacy record.

use crate::config::MigrationConfig;
use crate::errors::{MigrationError, Result};
use crate::legacy::{LegacyNameWrapper, LegacyRegistrar};
use namechain_registry::{Datastore, NameRegistry, Registry, RegistryArena};
use namechain_types::{
    labelhash, Address, CanonicalId, FuseSet, Label, LockedMigrationData, Node, RoleSet, TokenId,
};
use std::sync::Arc;
use tracing::info;

/// Derive the destination roles of a locked name purely from its fuse
/// bitmask. Capabilities the lock already denied stay denied; the
/// mover's wishes never enter.
pub fn roles_from_fuses(fuses: FuseSet) -> RoleSet {
    let mut roles = RoleSet::empty();
    if fuses.contains(FuseSet::CAN_EXTEND_EXPIRY) {
        roles |= RoleSet::RENEW;
    }
    if !fuses.contains(FuseSet::CANNOT_APPROVE) {
        roles |= RoleSet::RENEW_ADMIN;
    }
    if !fuses.contains(FuseSet::CANNOT_SET_RESOLVER) {
        roles |= RoleSet::SET_RESOLVER | RoleSet::SET_RESOLVER_ADMIN;
    }
    if !fuses.contains(FuseSet::CANNOT_CREATE_SUBDOMAIN) {
        roles |= RoleSet::REGISTRAR | RoleSet::REGISTRAR_ADMIN;
    }
    roles
}

pub struct LockedMigrationController {
    config: MigrationConfig,
    address: Address,
    registrar: Arc<dyn LegacyRegistrar>,
    wrapper: Arc<dyn LegacyNameWrapper>,
    registry: Arc<Registry>,
    arena: Arc<RegistryArena>,
    datastore: Arc<Datastore>,
}

struct MigrationPlan {
    node: Node,
    label: Label,
    owner: Address,
    resolver: Address,
    resolver_fuse_burned: bool,
    roles: RoleSet,
    salt: [u8; 32],
    expiry: u64,
}

impl LockedMigrationController {
    pub fn new(
        config: MigrationConfig,
        address: Address,
        registrar: Arc<dyn LegacyRegistrar>,
        wrapper: Arc<dyn LegacyNameWrapper>,
        registry: Arc<Registry>,
        arena: Arc<RegistryArena>,
        datastore: Arc<Datastore>,
    ) -> Self {
        Self {
            config,
            address,
            registrar,
            wrapper,
            registry,
            arena,
            datastore,
        }
    }

    /// Migrate one locked name. Only the legacy wrapper may deliver the
    /// transfer.
    pub fn migrate(
        &self,
        caller: Address,
        token: Node,
        amount: u64,
        data: LockedMigrationData,
    ) -> Result<TokenId> {
        Ok(self
            .migrate_batch(caller, &[token], &[amount], &[data])?
            .remove(0))
    }

    /// Migrate a batch of locked names atomically: every token is
    /// validated before the first one is registered or frozen, so a bad
    /// item rejects the whole batch with no partial application.
    pub fn migrate_batch(
        &self,
        caller: Address,
        tokens: &[Node],
        amounts: &[u64],
        payloads: &[LockedMigrationData],
    ) -> Result<Vec<TokenId>> {
        if caller != self.wrapper.address() {
            return Err(MigrationError::UnauthorizedCaller { caller });
        }
        if tokens.len() != amounts.len() || tokens.len() != payloads.len() {
            return Err(MigrationError::BatchLengthMismatch {
                tokens: tokens.len(),
                amounts: amounts.len(),
                payloads: payloads.len(),
            });
        }

        let mut plans = Vec::with_capacity(tokens.len());
        for ((token, amount), data) in tokens.iter().zip(amounts).zip(payloads) {
            plans.push(self.validate(*token, *amount, data)?);
        }

        plans.into_iter().map(|plan| self.apply(plan)).collect()
    }

    fn validate(
        &self,
        token: Node,
        amount: u64,
        data: &LockedMigrationData,
    ) -> Result<MigrationPlan> {
        if amount != 1 {
            return Err(MigrationError::InvalidTokenAmount { amount });
        }

        let name = data.name.to_string();

        // The transferred token id must be the node the payload names.
        let expected = data.name.node();
        if token != expected {
            return Err(MigrationError::TokenNodeMismatch {
                expected,
                actual: token,
            });
        }

        // Only direct children of the legacy TLD take this path;
        // subdomains of a locked name stay where they are.
        if data.name.tld().as_str() != self.config.legacy_tld {
            return Err(MigrationError::NameNotETH2LD { name });
        }

        let (_, fuses, _) = self
            .wrapper
            .get_data(expected)
            .ok_or(MigrationError::LegacyNameNotFound { name: name.clone() })?;

        if !fuses.contains(FuseSet::CANNOT_UNWRAP) {
            return Err(MigrationError::NameNotLocked { name });
        }
        if !fuses.contains(FuseSet::IS_DOT_ETH) {
            return Err(MigrationError::NotDotEthName { name });
        }
        // The freeze step must still be able to burn fuses itself.
        if fuses.contains(FuseSet::CANNOT_BURN_FUSES) {
            return Err(MigrationError::InconsistentFusesState { name });
        }

        let label_hash = labelhash(data.name.label().as_str());
        let expiry = self.registrar.name_expires(label_hash);
        if expiry == 0 {
            return Err(MigrationError::LegacyNameNotFound { name });
        }

        if !self.registry.is_available(data.name.label()) {
            return Err(MigrationError::Registry(
                namechain_registry::RegistryError::NameNotAvailable {
                    label: data.name.label().as_str().to_string(),
                },
            ));
        }

        Ok(MigrationPlan {
            node: expected,
            label: data.name.label().clone(),
            owner: data.owner,
            resolver: data.resolver,
            resolver_fuse_burned: fuses.contains(FuseSet::CANNOT_SET_RESOLVER),
            roles: roles_from_fuses(fuses),
            salt: data.salt,
            expiry,
        })
    }

    fn apply(&self, plan: MigrationPlan) -> Result<TokenId> {
        // Dedicated subregistry at the salt-derived id; the subtree
        // migrates lazily into it later. The owner gets UPGRADE (and
        // its admin bit) there, and nothing else.
        let subregistry = self.arena.get_or_deploy(
            &self.address,
            &plan.salt,
            self.datastore.clone(),
            self.address,
        )?;
        subregistry.grant_roles(
            self.address,
            CanonicalId::ROOT,
            plan.owner,
            RoleSet::UPGRADE | RoleSet::UPGRADE_ADMIN,
        )?;

        let token = self.registry.register(
            self.address,
            &plan.label,
            plan.owner,
            Some(subregistry.id()),
            plan.resolver,
            plan.roles,
            plan.expiry,
        )?;

        // Irreversible freeze: the legacy record can never diverge from
        // its new-model counterpart again.
        self.wrapper.burn_fuses(plan.node, FuseSet::FREEZE);
        if !plan.resolver_fuse_burned {
            self.wrapper.set_resolver(plan.node, Address::ZERO);
        }

        info!(
            label = %plan.label,
            owner = %plan.owner,
            roles = ?plan.roles,
            "migrated locked name and froze legacy record"
        );
        Ok(token)
    }
}

//! Migration of still-mutable legacy names.
//!
//! Consumes an unwrapped registrar token, or a wrapped token whose
//! cannot-unwrap fuse is clear, and produces the equivalent v2
//! registration. The caller-supplied role bitmask is used verbatim:
//! the legacy name was still fully mutable, so the mover could have
//! arranged any state anyway.

use crate::config::MigrationConfig;
use crate::errors::{MigrationError, Result};
use crate::legacy::{LegacyNameWrapper, LegacyRegistrar, LegacyToken};
use namechain_bridge::{BridgeController, MessageId};
use namechain_registry::{Datastore, NameRegistry, Registry, RegistryArena};
use namechain_types::{labelhash, Address, FuseSet, Label, MigrationData, Node, TokenId};
use std::sync::Arc;
use tracing::info;

/// Where a migration landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Registered into the local registry.
    Registered(TokenId),
    /// Relayed toward the remote chain.
    Relayed(MessageId),
}

pub struct UnlockedMigrationController {
    config: MigrationConfig,
    address: Address,
    registrar: Arc<dyn LegacyRegistrar>,
    wrapper: Arc<dyn LegacyNameWrapper>,
    registry: Arc<Registry>,
    arena: Arc<RegistryArena>,
    datastore: Arc<Datastore>,
    bridge: Arc<BridgeController>,
}

impl UnlockedMigrationController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: MigrationConfig,
        address: Address,
        registrar: Arc<dyn LegacyRegistrar>,
        wrapper: Arc<dyn LegacyNameWrapper>,
        registry: Arc<Registry>,
        arena: Arc<RegistryArena>,
        datastore: Arc<Datastore>,
        bridge: Arc<BridgeController>,
    ) -> Self {
        Self {
            config,
            address,
            registrar,
            wrapper,
            registry,
            arena,
            datastore,
            bridge,
        }
    }

    /// Migrate one legacy holding transferred into the controller.
    pub async fn migrate(
        &self,
        caller: Address,
        token: LegacyToken,
        amount: u64,
        data: MigrationData,
    ) -> Result<MigrationOutcome> {
        let expiry = self.validate(token, amount, &data)?;

        let mut transfer = data.transfer.clone();
        // The legacy registrar's expiry is authoritative.
        transfer.expiry = expiry;

        if data.to_l1 {
            let subregistry = match transfer.subregistry {
                Some(existing) => Some(existing),
                None if data.salt != [0u8; 32] => {
                    let registry = self.arena.get_or_deploy(
                        &self.address,
                        &data.salt,
                        self.datastore.clone(),
                        transfer.owner,
                    )?;
                    Some(registry.id())
                }
                None => None,
            };
            let new_token = self.registry.register(
                self.address,
                &transfer.label,
                transfer.owner,
                subregistry,
                transfer.resolver,
                transfer.roles,
                transfer.expiry,
            )?;
            info!(
                label = %transfer.label,
                owner = %transfer.owner,
                caller = %caller,
                "migrated unlocked name locally"
            );
            Ok(MigrationOutcome::Registered(new_token))
        } else {
            let message_id = self
                .bridge
                .relay_migration(MigrationData { transfer, ..data })
                .await?;
            info!(caller = %caller, message = %message_id, "relayed unlocked migration");
            Ok(MigrationOutcome::Relayed(message_id))
        }
    }

    /// Batch form over parallel arrays. Lengths are checked before any
    /// item is processed.
    pub async fn migrate_batch(
        &self,
        caller: Address,
        tokens: &[LegacyToken],
        amounts: &[u64],
        payloads: &[MigrationData],
    ) -> Result<Vec<MigrationOutcome>> {
        if tokens.len() != amounts.len() || tokens.len() != payloads.len() {
            return Err(MigrationError::BatchLengthMismatch {
                tokens: tokens.len(),
                amounts: amounts.len(),
                payloads: payloads.len(),
            });
        }
        let mut outcomes = Vec::with_capacity(tokens.len());
        for ((token, amount), data) in tokens.iter().zip(amounts).zip(payloads) {
            outcomes.push(self.migrate(caller, *token, *amount, data.clone()).await?);
        }
        Ok(outcomes)
    }

    /// Check the holding is migratable and return its legacy expiry.
    fn validate(&self, token: LegacyToken, amount: u64, data: &MigrationData) -> Result<u64> {
        if amount != 1 {
            return Err(MigrationError::InvalidTokenAmount { amount });
        }

        let label = &data.transfer.label;
        let label_hash = labelhash(label.as_str());
        let expected_node = Node::ROOT
            .child(&Label::new(self.config.legacy_tld.clone()))
            .child(label);

        match token {
            LegacyToken::Unwrapped(id) => {
                if id != label_hash {
                    return Err(MigrationError::TokenNodeMismatch {
                        expected: Node(label_hash),
                        actual: Node(id),
                    });
                }
            }
            LegacyToken::Wrapped(node) => {
                if node != expected_node {
                    return Err(MigrationError::TokenNodeMismatch {
                        expected: expected_node,
                        actual: node,
                    });
                }
                let (_, fuses, _) = self.wrapper.get_data(node).ok_or_else(|| {
                    MigrationError::LegacyNameNotFound {
                        name: label.as_str().to_string(),
                    }
                })?;
                if fuses.contains(FuseSet::CANNOT_UNWRAP) {
                    return Err(MigrationError::NameIsLocked {
                        name: label.as_str().to_string(),
                    });
                }
            }
        }

        let expiry = self.registrar.name_expires(label_hash);
        if expiry == 0 {
            return Err(MigrationError::LegacyNameNotFound {
                name: label.as_str().to_string(),
            });
        }
        Ok(expiry)
    }
}

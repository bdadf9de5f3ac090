//! Per-chain ejection controller.
//!
//! The controller is where a name-token transfer turns into an
//! ejection. Phase 1 (source chain) commits unconditionally: the token
//! is handed to the controller and locked before the message is given
//! to the bridge, so the name is never live on both chains at once.
//! Phase 2 (destination chain) credits the declared owner later and
//! independently; a rejected credit becomes a terminal bounce receipt
//! because the source debit cannot be rolled back.
//!
//! The controller must hold the registry-wide REGISTRAR role on its
//! local registry to complete inbound credits.

use crate::errors::{BridgeError, Result};
use crate::messages::{BridgeMessage, MessageId};
use crate::outbox::{DeliveryOutcome, Inbox, Outbox};
use crate::transport::Bridge;
use namechain_registry::{Datastore, NameRegistry, Registry, RegistryArena};
use namechain_types::{
    Address, CanonicalId, ChainId, MigrationData, RegistryId, TokenId, TransferData,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct BridgeController {
    chain: ChainId,
    address: Address,
    registry: Arc<Registry>,
    arena: Arc<RegistryArena>,
    datastore: Arc<Datastore>,
    bridge: Arc<dyn Bridge>,
    outbox: Outbox,
    inbox: Inbox,
}

impl BridgeController {
    pub fn new(
        chain: ChainId,
        address: Address,
        registry: Arc<Registry>,
        arena: Arc<RegistryArena>,
        datastore: Arc<Datastore>,
        bridge: Arc<dyn Bridge>,
    ) -> Self {
        Self {
            chain,
            address,
            registry,
            arena,
            datastore,
            bridge,
            outbox: Outbox::new(),
            inbox: Inbox::new(),
        }
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// The account identity under which the controller holds ejected
    /// names on its own chain.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// Ejection intent: a name token transferred into the controller
    /// with an attached [`TransferData`] payload.
    ///
    /// If the bridge send itself fails, the local debit has still
    /// committed; the outbox record stays `Pending` for the relay to
    /// pick up.
    pub async fn on_name_transferred(
        &self,
        caller: Address,
        token: TokenId,
        payload: &[u8],
    ) -> Result<MessageId> {
        let data = TransferData::from_bytes(payload)?;

        let expected = CanonicalId::from_label(&data.label);
        if expected != token.canonical() {
            return Err(BridgeError::TokenIdMismatch {
                expected,
                actual: token.canonical(),
            });
        }
        if self.registry.owner_of(token)? != caller {
            return Err(BridgeError::NotTokenOwner { caller, token });
        }

        // Phase 1 debit: held by the controller and non-transferable
        // before the message exists anywhere.
        self.registry.transfer(caller, token, caller, self.address)?;
        self.registry.lock(self.address, token)?;

        let message = BridgeMessage::Ejection(data);
        let message_id = message.message_id()?;
        self.outbox
            .record_pending(message_id, message.kind(), message.label().clone());

        self.bridge.send_message(message.to_bytes()?).await?;
        self.outbox.mark_sent(message_id);

        info!(
            chain = self.chain.as_str(),
            label = %message.label(),
            message = %message_id,
            "ejected name toward remote chain"
        );
        Ok(message_id)
    }

    /// Batch ejection. Array lengths are checked before anything is
    /// mutated; a mismatch rejects the whole batch.
    pub async fn on_batch_transferred(
        &self,
        caller: Address,
        tokens: &[TokenId],
        payloads: &[Vec<u8>],
    ) -> Result<Vec<MessageId>> {
        if tokens.len() != payloads.len() {
            return Err(BridgeError::BatchLengthMismatch {
                tokens: tokens.len(),
                payloads: payloads.len(),
            });
        }
        let mut message_ids = Vec::with_capacity(tokens.len());
        for (token, payload) in tokens.iter().zip(payloads) {
            message_ids.push(self.on_name_transferred(caller, *token, payload).await?);
        }
        Ok(message_ids)
    }

    /// Relay a legacy migration toward the remote chain on behalf of a
    /// migration controller. The legacy-side debit has already been
    /// taken by the caller.
    pub async fn relay_migration(&self, data: MigrationData) -> Result<MessageId> {
        let message = BridgeMessage::Migration(data);
        let message_id = message.message_id()?;
        self.outbox
            .record_pending(message_id, message.kind(), message.label().clone());

        self.bridge.send_message(message.to_bytes()?).await?;
        self.outbox.mark_sent(message_id);

        info!(
            chain = self.chain.as_str(),
            label = %message.label(),
            message = %message_id,
            "relayed migration toward remote chain"
        );
        Ok(message_id)
    }

    /// Inbound delivery entry point.
    ///
    /// Replay of an already-consumed message id is a no-op. A credit
    /// that cannot be applied is recorded as a terminal bounce, never
    /// an error: the source debit has already committed, so the
    /// negative outcome must stay observable for manual reconciliation.
    pub fn receive_message(&self, bytes: &[u8]) -> Result<DeliveryOutcome> {
        let message = BridgeMessage::from_bytes(bytes)?;
        let message_id = message.message_id()?;

        if self.inbox.is_consumed(message_id) {
            warn!(
                chain = self.chain.as_str(),
                message = %message_id,
                "dropping replayed bridge message"
            );
            return Ok(DeliveryOutcome::Duplicate);
        }

        let applied = match &message {
            BridgeMessage::Ejection(data) => self.apply_credit(data, data.subregistry),
            BridgeMessage::Migration(data) => self.apply_migration(data),
        };

        match applied {
            Ok(()) => {
                self.inbox.mark_applied(message_id);
                info!(
                    chain = self.chain.as_str(),
                    label = %message.label(),
                    message = %message_id,
                    "applied inbound credit"
                );
                Ok(DeliveryOutcome::Applied)
            }
            Err(reason) => {
                self.inbox.record_bounce(message_id, &reason, bytes.to_vec());
                warn!(
                    chain = self.chain.as_str(),
                    label = %message.label(),
                    message = %message_id,
                    reason = %reason,
                    "bounced inbound credit"
                );
                Ok(DeliveryOutcome::Bounced { reason })
            }
        }
    }

    fn apply_migration(&self, data: &MigrationData) -> std::result::Result<(), String> {
        if data.transfer.owner.is_zero() {
            return Err("zero recipient".to_string());
        }
        // Resolve the destination subregistry before crediting: either
        // the payload names one, or the salt addresses a deterministic
        // deploy owned by the migrated name's owner.
        let subregistry = match data.transfer.subregistry {
            Some(existing) => Some(existing),
            None if data.salt != [0u8; 32] => {
                let registry = self
                    .arena
                    .get_or_deploy(
                        &self.address,
                        &data.salt,
                        self.datastore.clone(),
                        data.transfer.owner,
                    )
                    .map_err(|e| e.to_string())?;
                Some(registry.id())
            }
            None => None,
        };
        self.apply_credit(&data.transfer, subregistry)
    }

    fn apply_credit(
        &self,
        data: &TransferData,
        subregistry: Option<RegistryId>,
    ) -> std::result::Result<(), String> {
        if data.owner.is_zero() {
            return Err("zero recipient".to_string());
        }

        if self.registry.is_available(&data.label) {
            self.registry
                .register(
                    self.address,
                    &data.label,
                    data.owner,
                    subregistry,
                    data.resolver,
                    data.roles,
                    data.expiry,
                )
                .map(|_| ())
                .map_err(|e| e.to_string())
        } else {
            // A live local entry can only be the controller's own held
            // copy, i.e. this credit completes a round trip.
            let existing = self
                .registry
                .token_of(&data.label)
                .ok_or_else(|| format!("no token for live name {}", data.label))?;
            let holder = self.registry.owner_of(existing).map_err(|e| e.to_string())?;
            if holder != self.address {
                return Err(format!("name already live on this chain: {}", data.label));
            }
            self.registry
                .release(
                    self.address,
                    existing,
                    data.owner,
                    subregistry,
                    data.resolver,
                    data.roles,
                    data.expiry,
                )
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    }
}

//! Saga state for the two-phase cross-chain commit.
//!
//! The outbox records every debit the local chain has committed; the
//! inbox makes credits idempotent and turns rejected credits into
//! terminal bounce receipts the relay/operator layer can observe.

use crate::messages::MessageId;
use namechain_types::Label;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Lifecycle of an outbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundStatus {
    /// Local debit committed, message not yet handed to the bridge.
    Pending,
    /// Message handed to the bridge transport.
    Sent,
}

/// Durable record of one outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub message_id: MessageId,
    pub kind: String,
    pub label: Label,
    pub status: OutboundStatus,
}

/// Outbound side of the saga.
#[derive(Debug, Default)]
pub struct Outbox {
    records: RwLock<HashMap<MessageId, OutboundRecord>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed debit before the message leaves the chain.
    pub fn record_pending(&self, message_id: MessageId, kind: &str, label: Label) {
        self.records.write().insert(
            message_id,
            OutboundRecord {
                message_id,
                kind: kind.to_string(),
                label,
                status: OutboundStatus::Pending,
            },
        );
    }

    /// Mark a record as handed to the bridge.
    pub fn mark_sent(&self, message_id: MessageId) {
        if let Some(record) = self.records.write().get_mut(&message_id) {
            record.status = OutboundStatus::Sent;
        }
    }

    /// Look up one record.
    pub fn record(&self, message_id: MessageId) -> Option<OutboundRecord> {
        self.records.read().get(&message_id).cloned()
    }

    /// All records, in no particular order.
    pub fn records(&self) -> Vec<OutboundRecord> {
        self.records.read().values().cloned().collect()
    }
}

/// Terminal negative receipt for an undeliverable credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BounceRecord {
    pub message_id: MessageId,
    pub reason: String,
    /// The undelivered message bytes, kept for manual reconciliation.
    pub payload: Vec<u8>,
}

/// Outcome of one inbound delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Credit applied to the local registry.
    Applied,
    /// Message id was already consumed; nothing happened.
    Duplicate,
    /// Credit rejected; a bounce receipt was recorded.
    Bounced { reason: String },
}

/// Inbound side of the saga.
#[derive(Debug, Default)]
pub struct Inbox {
    consumed: RwLock<HashSet<MessageId>>,
    bounces: RwLock<Vec<BounceRecord>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this message id was already applied or bounced.
    pub fn is_consumed(&self, message_id: MessageId) -> bool {
        self.consumed.read().contains(&message_id)
    }

    /// Consume a message id after a successful apply.
    pub fn mark_applied(&self, message_id: MessageId) {
        self.consumed.write().insert(message_id);
    }

    /// Consume a message id with a terminal bounce receipt.
    pub fn record_bounce(&self, message_id: MessageId, reason: &str, payload: Vec<u8>) {
        self.consumed.write().insert(message_id);
        self.bounces.write().push(BounceRecord {
            message_id,
            reason: reason.to_string(),
            payload,
        });
    }

    /// All bounce receipts, oldest first.
    pub fn bounces(&self) -> Vec<BounceRecord> {
        self.bounces.read().clone()
    }
}

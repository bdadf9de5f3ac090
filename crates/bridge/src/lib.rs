//! Cross-chain ejection machinery.
//!
//! Moving a name's authoritative record between the chains is a
//! two-phase, non-atomic commit: the source controller debits locally
//! (marks the name held and non-transferable) before the message is
//! even sent, and the destination controller credits independently,
//! later. The outbox/inbox pair keeps that asynchrony honest: outbound
//! records are durable, inbound delivery is idempotent by message id,
//! and an undeliverable credit becomes a terminal bounce receipt rather
//! than a silent loss.

pub mod controller;
pub mod errors;
pub mod messages;
pub mod outbox;
pub mod transport;

pub use controller::BridgeController;
pub use errors::*;
pub use messages::{BridgeMessage, MessageId};
pub use outbox::{
    BounceRecord, DeliveryOutcome, Inbox, Outbox, OutboundRecord, OutboundStatus,
};
pub use transport::{Bridge, CaptureBridge, ChannelBridge, TransportError};

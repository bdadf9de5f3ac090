//! Wire messages exchanged between the two chains' controllers.

use namechain_types::{CodecError, Label, MigrationData, TransferData};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of one bridge message; the idempotence key for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub [u8; 32]);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A message in flight between the chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BridgeMessage {
    /// A name ejected toward the receiving chain.
    Ejection(TransferData),
    /// A legacy migration relayed toward the receiving chain.
    Migration(MigrationData),
}

impl BridgeMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(CodecError::Decode)
    }

    /// Message identity: hash of the encoded form, so a replayed
    /// delivery carries the same id as the original.
    pub fn message_id(&self) -> Result<MessageId, CodecError> {
        let bytes = self.to_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(MessageId(hasher.finalize().into()))
    }

    /// Label the message is about.
    pub fn label(&self) -> &Label {
        match self {
            BridgeMessage::Ejection(data) => &data.label,
            BridgeMessage::Migration(data) => &data.transfer.label,
        }
    }

    /// String tag used for records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMessage::Ejection(_) => "ejection",
            BridgeMessage::Migration(_) => "migration",
        }
    }
}

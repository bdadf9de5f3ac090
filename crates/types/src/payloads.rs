//! Wire payloads carried through the transfer hooks and the bridge.
//!
//! Payloads travel as opaque bytes: attached to a name-token transfer on
//! the way into a controller, and inside bridge messages between the
//! chains. The binary form is bincode over the serde representation.

use crate::address::Address;
use crate::label::{Label, Node};
use crate::roles::RoleSet;
use crate::token::RegistryId;
use serde::{Deserialize, Serialize};

/// Which chain a controller lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainId {
    L1,
    L2,
}

impl ChainId {
    /// The other chain.
    pub fn remote(&self) -> ChainId {
        match self {
            ChainId::L1 => ChainId::L2,
            ChainId::L2 => ChainId::L1,
        }
    }

    /// String representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::L1 => "l1",
            ChainId::L2 => "l2",
        }
    }
}

/// Errors raised while encoding or decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode payload: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode payload: {0}")]
    Decode(bincode::Error),
}

/// Description of a name to create or update on the receiving side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferData {
    pub label: Label,
    pub owner: Address,
    #[serde(default)]
    pub subregistry: Option<RegistryId>,
    pub resolver: Address,
    pub roles: RoleSet,
    pub expiry: u64,
}

impl TransferData {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(CodecError::Decode)
    }
}

/// Payload for migrating a still-mutable legacy name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationData {
    pub transfer: TransferData,
    /// Whether the new registration lands on L1 rather than locally.
    pub to_l1: bool,
    /// Seed for the deterministic subregistry id on the destination.
    pub salt: [u8; 32],
}

impl MigrationData {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(CodecError::Decode)
    }
}

/// Minimal payload for migrating an already-locked legacy name.
///
/// Deliberately carries no role bitmask: the destination roles are
/// derived from the name's fuse state, never from the mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedMigrationData {
    pub name: DotEthName,
    pub owner: Address,
    pub resolver: Address,
    /// Seed for the deterministic subregistry id.
    pub salt: [u8; 32],
}

impl LockedMigrationData {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(CodecError::Encode)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(CodecError::Decode)
    }
}

/// A fully-qualified second-level name, `<label>.<tld>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DotEthName {
    label: Label,
    tld: Label,
}

/// Errors raised while parsing a fully-qualified name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NameParseError {
    #[error("name must have exactly two labels, got {got}: {name}")]
    WrongDepth { name: String, got: usize },
    #[error("invalid label in name: {label}")]
    InvalidLabel { label: String },
}

impl DotEthName {
    /// Build from an already-validated label under the `eth` TLD.
    pub fn new(label: Label) -> Self {
        Self {
            label,
            tld: Label::new("eth"),
        }
    }

    /// Parse a dotted two-label name such as `test.eth`.
    pub fn parse(name: &str) -> Result<Self, NameParseError> {
        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() != 2 {
            return Err(NameParseError::WrongDepth {
                name: name.to_string(),
                got: labels.len(),
            });
        }
        for part in &labels {
            let label = Label::new(*part);
            if !label.is_valid() {
                return Err(NameParseError::InvalidLabel {
                    label: part.to_string(),
                });
            }
        }
        Ok(Self {
            label: Label::new(labels[0]),
            tld: Label::new(labels[1]),
        })
    }

    /// The second-level label.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The top-level label.
    pub fn tld(&self) -> &Label {
        &self.tld
    }

    /// Whether the name sits directly under the legacy `eth` TLD.
    pub fn is_eth_2ld(&self) -> bool {
        self.tld.as_str() == "eth"
    }

    /// The node of this name in the hierarchy.
    pub fn node(&self) -> Node {
        Node::ROOT.child(&self.tld).child(&self.label)
    }
}

impl std::fmt::Display for DotEthName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.label, self.tld)
    }
}

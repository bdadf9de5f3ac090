//! Error types for the migration crate.

use namechain_bridge::BridgeError;
use namechain_registry::RegistryError;
use namechain_types::{Address, Node};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("name is locked and cannot take the unlocked path: {name}")]
    NameIsLocked { name: String },

    #[error("name is not locked and cannot take the locked path: {name}")]
    NameNotLocked { name: String },

    #[error("token does not match the payload node: expected {expected}, got {actual}")]
    TokenNodeMismatch { expected: Node, actual: Node },

    #[error("name is not a second-level name under the legacy TLD: {name}")]
    NameNotETH2LD { name: String },

    #[error("name is missing the two-level-eth fuse: {name}")]
    NotDotEthName { name: String },

    #[error("fuse state is inconsistent: cannot-burn-fuses already set on {name}")]
    InconsistentFusesState { name: String },

    #[error("caller {caller} is not the legacy wrapper")]
    UnauthorizedCaller { caller: Address },

    #[error("legacy tokens are single-copy; got amount {amount}")]
    InvalidTokenAmount { amount: u64 },

    #[error("batch arrays differ in length: {tokens} tokens, {amounts} amounts, {payloads} payloads")]
    BatchLengthMismatch {
        tokens: usize,
        amounts: usize,
        payloads: usize,
    },

    #[error("no legacy record for name: {name}")]
    LegacyNameNotFound { name: String },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

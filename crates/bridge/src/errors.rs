//! Error types for the bridge crate.

use namechain_registry::RegistryError;
use namechain_types::{Address, CanonicalId, CodecError, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("payload does not describe the transferred token: expected {expected}, got {actual}")]
    TokenIdMismatch {
        expected: CanonicalId,
        actual: CanonicalId,
    },

    #[error("batch arrays differ in length: {tokens} tokens vs {payloads} payloads")]
    BatchLengthMismatch { tokens: usize, payloads: usize },

    #[error("caller {caller} does not own token {token}")]
    NotTokenOwner { caller: Address, token: TokenId },

    #[error("payload codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("bridge transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

//! Error types for the registry crate.

use namechain_types::{Address, CanonicalId, RegistryId, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("name not available: {label}")]
    NameNotAvailable { label: String },

    #[error("invalid label format: {label}")]
    InvalidLabel { label: String },

    #[error("name not found: {id}")]
    NameNotFound { id: TokenId },

    #[error("name expired: {id}")]
    NameExpired { id: TokenId },

    #[error("token version is stale: {id}")]
    TokenVersionStale { id: TokenId },

    #[error("name is locked and cannot be transferred: {id}")]
    NameLocked { id: TokenId },

    #[error("name is not held by a controller: {id}")]
    NameNotHeld { id: TokenId },

    #[error("unauthorized: account {account} lacks required roles on resource {resource}")]
    Unauthorized {
        account: Address,
        resource: CanonicalId,
    },

    #[error("caller {caller} is neither owner nor approved for token {id}")]
    NotTransferAuthorized { caller: Address, id: TokenId },

    #[error("transfer sender {from} does not own token {id}")]
    NotTokenOwner { from: Address, id: TokenId },

    #[error("new expiry {requested} does not extend current expiry {current}")]
    CannotReduceExpiry { current: u64, requested: u64 },

    #[error("datastore namespace already registered: {id}")]
    NamespaceTaken { id: RegistryId },

    #[error("unknown registry: {id}")]
    UnknownRegistry { id: RegistryId },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

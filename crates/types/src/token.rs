//! Token identifiers for registered names.
//!
//! A name's full token id carries a version sub-field in its low bits.
//! Re-registering an expired label bumps the version, which invalidates
//! stale approvals held against the old token, while the canonical id
//! (version bits masked off) stays stable across re-registration.

use crate::label::{labelhash, Label};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width in bytes of the version sub-field at the low end of a token id.
const VERSION_BYTES: usize = 4;

/// Full versioned token id of a registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub [u8; 32]);

impl TokenId {
    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The stable per-label identifier with the version bits masked off.
    pub fn canonical(&self) -> CanonicalId {
        let mut bytes = self.0;
        for byte in bytes[32 - VERSION_BYTES..].iter_mut() {
            *byte = 0;
        }
        CanonicalId(bytes)
    }

    /// The version sub-field of this token id.
    pub fn version(&self) -> u32 {
        let mut tail = [0u8; VERSION_BYTES];
        tail.copy_from_slice(&self.0[32 - VERSION_BYTES..]);
        u32::from_be_bytes(tail)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Stable per-label identifier excluding the version sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalId(pub [u8; 32]);

impl CanonicalId {
    /// Registry-wide role resource: roles granted here apply to every
    /// name in the registry.
    pub const ROOT: CanonicalId = CanonicalId([0u8; 32]);

    /// Derive the canonical id of a label.
    pub fn from_label(label: &Label) -> Self {
        let mut bytes = labelhash(label.as_str());
        for byte in bytes[32 - VERSION_BYTES..].iter_mut() {
            *byte = 0;
        }
        CanonicalId(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Attach a version sub-field, producing the full token id.
    pub fn with_version(&self, version: u32) -> TokenId {
        let mut bytes = self.0;
        bytes[32 - VERSION_BYTES..].copy_from_slice(&version.to_be_bytes());
        TokenId(bytes)
    }
}

impl std::fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identifier of a registry instance in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub [u8; 32]);

impl RegistryId {
    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic registry id derived from a deployer and salt.
    ///
    /// The same (deployer, salt) pair always addresses the same
    /// registry, so a subregistry can be referenced before it exists.
    pub fn deterministic(deployer: &crate::Address, salt: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(deployer.as_bytes());
        hasher.update(salt);
        RegistryId(hasher.finalize().into())
    }
}

impl std::fmt::Display for RegistryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

//! Shared types for the two-chain name registry.
//!
//! Labels and their hash-derived identifiers, the role and fuse bitmask
//! tables, account addresses, and the wire payloads carried between the
//! chains. Behavior lives in the registry, bridge, and migration crates;
//! this crate only defines the data they exchange.

pub mod address;
pub mod fuses;
pub mod label;
pub mod payloads;
pub mod roles;
pub mod token;

pub use address::*;
pub use fuses::*;
pub use label::*;
pub use payloads::*;
pub use roles::*;
pub use token::*;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in seconds since UNIX_EPOCH.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

//! One-way migration of legacy name holdings into the v2 model.
//!
//! Two paths, one per legacy source type: the unlocked path trusts the
//! mover because the legacy name was still fully mutable; the locked
//! path derives the new roles purely from the legacy fuse state and
//! ends by freezing the legacy record so it can never again diverge
//! from its new-model counterpart.

pub mod config;
pub mod errors;
pub mod legacy;
pub mod locked;
pub mod unlocked;

pub use config::MigrationConfig;
pub use errors::*;
pub use legacy::{
    LegacyNameWrapper, LegacyRegistrar, LegacyToken, StubLegacyRegistrar, StubLegacyWrapper,
};
pub use locked::{roles_from_fuses, LockedMigrationController};
pub use unlocked::{MigrationOutcome, UnlockedMigrationController};

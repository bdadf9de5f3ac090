//! Hierarchical permissioned name registry.
//!
//! A tree of registry instances (root, per-TLD, per-name subregistries)
//! over a shared namespaced datastore. Each registry enforces the role
//! model, issues versioned name tokens, and references its children's
//! subregistries by id through the arena.

pub mod arena;
pub mod datastore;
pub mod errors;
pub mod registry;
pub mod roles;

pub use arena::RegistryArena;
pub use datastore::{Datastore, NameEntry, NamespaceToken};
pub use errors::*;
pub use registry::{NameData, NameRegistry, Registry};
pub use roles::RoleStore;

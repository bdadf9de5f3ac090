//! Legacy wrapped-name fuse flags.
//!
//! Fuses are immutable-once-set permission locks carried by pre-v2
//! wrapped names. They are a read-only input to migration; the only
//! write this system ever performs is the locked path's terminal burn
//! of [`FuseSet::FREEZE`], which moves a name monotonically toward full
//! lock-down.

use bitflags::bitflags;

bitflags! {
    /// Fuse bitmask of a legacy wrapped name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FuseSet: u32 {
        const CANNOT_UNWRAP = 1;
        const CANNOT_BURN_FUSES = 2;
        const CANNOT_TRANSFER = 4;
        const CANNOT_SET_RESOLVER = 8;
        const CANNOT_SET_TTL = 16;
        const CANNOT_CREATE_SUBDOMAIN = 32;
        const CANNOT_APPROVE = 64;
        /// The parent burned its control over this name.
        const PARENT_CANNOT_CONTROL = 1 << 16;
        /// Set on second-level names under the legacy `eth` TLD.
        const IS_DOT_ETH = 1 << 17;
        /// The holder may extend the name's expiry.
        const CAN_EXTEND_EXPIRY = 1 << 18;
    }
}

impl FuseSet {
    /// The fixed lock-down set burned by the locked migration's terminal
    /// freeze step.
    pub const FREEZE: FuseSet = FuseSet::CANNOT_UNWRAP
        .union(FuseSet::CANNOT_BURN_FUSES)
        .union(FuseSet::CANNOT_TRANSFER)
        .union(FuseSet::CANNOT_SET_RESOLVER)
        .union(FuseSet::CANNOT_SET_TTL)
        .union(FuseSet::CANNOT_CREATE_SUBDOMAIN)
        .union(FuseSet::CANNOT_APPROVE);
}

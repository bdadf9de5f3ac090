//! The role bitmask table.
//!
//! Every capability bit has a paired ADMIN bit in the high half of the
//! word; holding the admin bit grants the right to grant or revoke the
//! capability to others. All bit meanings live in this one table.

use bitflags::bitflags;

/// Bit distance between a capability and its paired admin bit.
pub const ADMIN_SHIFT: u32 = 32;

bitflags! {
    /// Per (resource, account) set of permitted actions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct RoleSet: u64 {
        /// Replace the name's subregistry pointer.
        const SET_SUBREGISTRY = 1 << 0;
        /// Replace the name's resolver.
        const SET_RESOLVER = 1 << 1;
        /// Extend the name's expiry.
        const RENEW = 1 << 2;
        /// Register child names.
        const REGISTRAR = 1 << 3;
        /// Destroy the name's entry.
        const BURN = 1 << 4;
        /// Upgrade a migrated subregistry to a full implementation.
        const UPGRADE = 1 << 5;

        /// Grant/revoke SET_SUBREGISTRY.
        const SET_SUBREGISTRY_ADMIN = 1 << ADMIN_SHIFT;
        /// Grant/revoke SET_RESOLVER.
        const SET_RESOLVER_ADMIN = 1 << (ADMIN_SHIFT + 1);
        /// Grant/revoke RENEW.
        const RENEW_ADMIN = 1 << (ADMIN_SHIFT + 2);
        /// Grant/revoke REGISTRAR.
        const REGISTRAR_ADMIN = 1 << (ADMIN_SHIFT + 3);
        /// Grant/revoke BURN.
        const BURN_ADMIN = 1 << (ADMIN_SHIFT + 4);
        /// Grant/revoke UPGRADE.
        const UPGRADE_ADMIN = 1 << (ADMIN_SHIFT + 5);
    }
}

impl RoleSet {
    /// The admin bits paired with the capability bits of `self`.
    ///
    /// Admin bits already present in `self` map to nothing further; the
    /// admin hierarchy is one level deep.
    pub fn admin_of(self) -> RoleSet {
        RoleSet::from_bits_truncate((self.bits() & CAPABILITY_MASK) << ADMIN_SHIFT)
    }

    /// Whether a holder of `self` may grant or revoke every bit of
    /// `roles`: it must hold the paired admin bit for each capability,
    /// and the admin bit itself for each admin bit being delegated.
    pub fn can_administer(self, roles: RoleSet) -> bool {
        let needed = roles.admin_of() | (roles & ADMIN_MASK);
        self.contains(needed)
    }

    /// `self` together with the paired admin bits of its capabilities.
    pub fn with_admins(self) -> RoleSet {
        self | self.admin_of()
    }
}

const CAPABILITY_MASK: u64 = (1u64 << ADMIN_SHIFT) - 1;
const ADMIN_MASK: RoleSet = RoleSet::from_bits_truncate(!CAPABILITY_MASK);

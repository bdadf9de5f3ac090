//! End-to-end locked migration: fuse-derived roles, deterministic
//! subregistry deployment, and the terminal freeze of the legacy record.

use namechain_migration::{
    roles_from_fuses, LegacyNameWrapper, LockedMigrationController, MigrationConfig,
    MigrationError, StubLegacyRegistrar, StubLegacyWrapper,
};
use namechain_registry::{Datastore, NameRegistry, Registry, RegistryArena};
use namechain_types::{
    labelhash, unix_now, Address, CanonicalId, DotEthName, FuseSet, Label, LockedMigrationData,
    RegistryId, RoleSet,
};
use std::sync::Arc;

const ADMIN: Address = Address([0xaa; 20]);
const WRAPPER: Address = Address([0xee; 20]);
const CONTROLLER: Address = Address([0xcc; 20]);
const ALICE: Address = Address([1u8; 20]);

struct Env {
    registry: Arc<Registry>,
    arena: Arc<RegistryArena>,
    registrar: Arc<StubLegacyRegistrar>,
    wrapper: Arc<StubLegacyWrapper>,
    controller: LockedMigrationController,
}

fn env() -> Env {
    let datastore = Arc::new(Datastore::new());
    let registry = Registry::new(RegistryId([1u8; 32]), datastore.clone(), ADMIN).unwrap();
    registry
        .grant_roles(ADMIN, CanonicalId::ROOT, CONTROLLER, RoleSet::REGISTRAR)
        .unwrap();

    let arena = Arc::new(RegistryArena::new());
    let registrar = Arc::new(StubLegacyRegistrar::new());
    let wrapper = Arc::new(StubLegacyWrapper::new(WRAPPER));

    let controller = LockedMigrationController::new(
        MigrationConfig::default(),
        CONTROLLER,
        registrar.clone(),
        wrapper.clone(),
        registry.clone(),
        arena.clone(),
        datastore,
    );

    Env {
        registry,
        arena,
        registrar,
        wrapper,
        controller,
    }
}

/// Seed a wrapped, locked legacy name and return its payload.
fn seed(env: &Env, label: &str, fuses: FuseSet, resolver: Address) -> LockedMigrationData {
    let name = DotEthName::parse(&format!("{label}.eth")).unwrap();
    env.registrar
        .insert(labelhash(label), ALICE, unix_now() + 86_400);
    env.wrapper
        .insert(name.node(), ALICE, fuses, unix_now() + 86_400, resolver);
    LockedMigrationData {
        name,
        owner: ALICE,
        resolver: Address::ZERO,
        salt: [7u8; 32],
    }
}

const LOCKED: FuseSet = FuseSet::CANNOT_UNWRAP.union(FuseSet::IS_DOT_ETH);

#[test]
fn locked_test_name_migrates_with_fuse_derived_roles() {
    let env = env();
    let data = seed(&env, "test", LOCKED, Address::new([3u8; 20]));
    let node = data.name.node();

    let token = env
        .controller
        .migrate(WRAPPER, node, 1, data)
        .unwrap();

    // No CAN_EXTEND_EXPIRY: REGISTRAR and SET_RESOLVER but not RENEW.
    let resource = token.canonical();
    assert!(env
        .registry
        .has_roles(resource, ALICE, RoleSet::REGISTRAR | RoleSet::SET_RESOLVER));
    assert!(!env.registry.has_roles(resource, ALICE, RoleSet::RENEW));

    // The legacy record ends with all seven freeze fuses set.
    assert!(env.wrapper.fuses(node).contains(FuseSet::FREEZE));
    // Resolver fuse was clear, so the legacy resolver was zeroed.
    assert_eq!(env.wrapper.resolver(node), Address::ZERO);
}

#[test]
fn fuse_monotonicity_holds_across_migration() {
    let env = env();
    let before = LOCKED | FuseSet::CAN_EXTEND_EXPIRY | FuseSet::CANNOT_SET_TTL;
    let data = seed(&env, "test", before, Address::ZERO);
    let node = data.name.node();

    env.controller.migrate(WRAPPER, node, 1, data).unwrap();

    let after = env.wrapper.fuses(node);
    assert!(after.contains(before));
}

#[test]
fn roles_depend_only_on_fuses() {
    let env = env();
    let fuses = LOCKED | FuseSet::CANNOT_SET_RESOLVER | FuseSet::CAN_EXTEND_EXPIRY;
    let data = seed(&env, "test", fuses, Address::ZERO);
    let node = data.name.node();

    let token = env.controller.migrate(WRAPPER, node, 1, data).unwrap();

    // The payload cannot carry roles; what lands is exactly the pure
    // derivation from the fuse bitmask.
    let expected = roles_from_fuses(fuses);
    let resource = token.canonical();
    assert!(env.registry.has_roles(resource, ALICE, expected));
    assert!(!env
        .registry
        .has_roles(resource, ALICE, RoleSet::SET_RESOLVER));
    assert!(!env.registry.has_roles(resource, ALICE, RoleSet::BURN));
}

#[test]
fn preburned_resolver_fuse_leaves_legacy_resolver_alone() {
    let env = env();
    let legacy_resolver = Address::new([3u8; 20]);
    let data = seed(
        &env,
        "test",
        LOCKED | FuseSet::CANNOT_SET_RESOLVER,
        legacy_resolver,
    );
    let node = data.name.node();

    env.controller.migrate(WRAPPER, node, 1, data).unwrap();

    // Freeze burned the full set, but the resolver pointer stands:
    // clearing it is skipped when its fuse was already burned.
    assert!(env.wrapper.fuses(node).contains(FuseSet::FREEZE));
    assert_eq!(env.wrapper.resolver(node), legacy_resolver);
}

#[test]
fn owner_gets_upgrade_scoped_to_the_new_subregistry() {
    let env = env();
    let data = seed(&env, "test", LOCKED, Address::ZERO);
    let salt = data.salt;
    let node = data.name.node();

    env.controller.migrate(WRAPPER, node, 1, data).unwrap();

    let subregistry_id = env
        .registry
        .get_subregistry(&Label::new("test"))
        .expect("subregistry pointer set");
    assert_eq!(subregistry_id, RegistryId::deterministic(&CONTROLLER, &salt));

    let subregistry = env.arena.get(subregistry_id).expect("deployed");
    assert!(subregistry.has_roles(
        CanonicalId::ROOT,
        ALICE,
        RoleSet::UPGRADE | RoleSet::UPGRADE_ADMIN
    ));
    // ...and nothing else on the subregistry.
    assert!(!subregistry.has_roles(CanonicalId::ROOT, ALICE, RoleSet::REGISTRAR));
}

#[test]
fn expiry_comes_from_the_legacy_registrar() {
    let env = env();
    let name = DotEthName::parse("test.eth").unwrap();
    let expires = unix_now() + 1234;
    env.registrar.insert(labelhash("test"), ALICE, expires);
    env.wrapper
        .insert(name.node(), ALICE, LOCKED, expires, Address::ZERO);

    env.controller
        .migrate(
            WRAPPER,
            name.node(),
            1,
            LockedMigrationData {
                name,
                owner: ALICE,
                resolver: Address::ZERO,
                salt: [1u8; 32],
            },
        )
        .unwrap();

    let data = env.registry.get_name_data(&Label::new("test")).unwrap();
    assert_eq!(data.expiry, expires);
}

#[test]
fn batch_length_mismatch_registers_nothing() {
    let env = env();
    let a = seed(&env, "alpha", LOCKED, Address::ZERO);
    let b = seed(&env, "beta", LOCKED, Address::ZERO);
    let c = seed(&env, "gamma", LOCKED, Address::ZERO);
    let tokens = [a.name.node(), b.name.node(), c.name.node()];

    // Three tokens, two amounts: the whole batch must revert.
    let result = env
        .controller
        .migrate_batch(WRAPPER, &tokens, &[1, 1], &[a, b, c]);
    assert!(matches!(
        result,
        Err(MigrationError::BatchLengthMismatch {
            tokens: 3,
            amounts: 2,
            payloads: 3
        })
    ));

    for label in ["alpha", "beta", "gamma"] {
        assert!(env.registry.get_name_data(&Label::new(label)).is_none());
        assert!(!env
            .wrapper
            .fuses(DotEthName::parse(&format!("{label}.eth")).unwrap().node())
            .contains(FuseSet::CANNOT_TRANSFER));
    }
}

#[test]
fn one_bad_item_rejects_the_whole_batch() {
    let env = env();
    let good = seed(&env, "alpha", LOCKED, Address::ZERO);
    // Unlocked name in a locked batch.
    let bad = seed(&env, "beta", FuseSet::IS_DOT_ETH, Address::ZERO);
    let tokens = [good.name.node(), bad.name.node()];

    let result = env
        .controller
        .migrate_batch(WRAPPER, &tokens, &[1, 1], &[good, bad]);
    assert!(matches!(result, Err(MigrationError::NameNotLocked { .. })));

    // The valid item was not applied either.
    assert!(env.registry.get_name_data(&Label::new("alpha")).is_none());
}

#[test]
fn only_the_wrapper_may_deliver() {
    let env = env();
    let data = seed(&env, "test", LOCKED, Address::ZERO);
    let node = data.name.node();

    let result = env.controller.migrate(ALICE, node, 1, data);
    assert!(matches!(
        result,
        Err(MigrationError::UnauthorizedCaller { caller: ALICE })
    ));
}

#[test]
fn validation_rejections_are_specific() {
    let env = env();

    // Token/node mismatch.
    let data = seed(&env, "test", LOCKED, Address::ZERO);
    let wrong_node = DotEthName::parse("other.eth").unwrap().node();
    assert!(matches!(
        env.controller.migrate(WRAPPER, wrong_node, 1, data.clone()),
        Err(MigrationError::TokenNodeMismatch { .. })
    ));

    // Multi-copy amounts are not a thing for legacy tokens.
    assert!(matches!(
        env.controller
            .migrate(WRAPPER, data.name.node(), 2, data.clone()),
        Err(MigrationError::InvalidTokenAmount { amount: 2 })
    ));

    // Not under the legacy TLD.
    let foreign = DotEthName::parse("test.xyz").unwrap();
    let foreign_data = LockedMigrationData {
        name: foreign.clone(),
        owner: ALICE,
        resolver: Address::ZERO,
        salt: [7u8; 32],
    };
    assert!(matches!(
        env.controller
            .migrate(WRAPPER, foreign.node(), 1, foreign_data),
        Err(MigrationError::NameNotETH2LD { .. })
    ));

    // Missing the two-level-eth fuse.
    let no_2ld = seed(&env, "plain", FuseSet::CANNOT_UNWRAP, Address::ZERO);
    assert!(matches!(
        env.controller
            .migrate(WRAPPER, no_2ld.name.node(), 1, no_2ld),
        Err(MigrationError::NotDotEthName { .. })
    ));

    // Pre-frozen fuse state would make the freeze step impossible.
    let frozen = seed(
        &env,
        "frozen",
        LOCKED | FuseSet::CANNOT_BURN_FUSES,
        Address::ZERO,
    );
    assert!(matches!(
        env.controller
            .migrate(WRAPPER, frozen.name.node(), 1, frozen),
        Err(MigrationError::InconsistentFusesState { .. })
    ));
}

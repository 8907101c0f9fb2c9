use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regionguard_flags::{FlagDefaults, FlagRegistry, FlagSetting, FlagValue, SettingPart};
use regionguard_geometry::{Cuboid, Shape};
use regionguard_index::IndexConfig;
use regionguard_resolve::{FlagResolver, Resolution, UndefinedReason, ValueSource};
use regionguard_store::{Region, WorldRegionSet};
use regionguard_types::{ActorId, BlockVector, RegionId, Subject, WorldId};

fn world() -> WorldId {
    WorldId::new("world").unwrap()
}

fn id(s: &str) -> RegionId {
    RegionId::new(s).unwrap()
}

fn v(x: i32, y: i32, z: i32) -> BlockVector {
    BlockVector::new(x, y, z)
}

fn cuboid(a: (i32, i32, i32), b: (i32, i32, i32)) -> Shape {
    Cuboid::new(v(a.0, a.1, a.2), v(b.0, b.1, b.2)).unwrap().into()
}

fn region(name: &str, a: (i32, i32, i32), b: (i32, i32, i32)) -> Region {
    Region::new(id(name), world(), cuboid(a, b))
}

struct Fixture {
    registry: FlagRegistry,
    defaults: FlagDefaults,
}

impl Fixture {
    fn new() -> Self {
        Self {
            registry: FlagRegistry::with_builtins(),
            defaults: FlagDefaults::new(),
        }
    }

    fn resolver(&self) -> FlagResolver<'_> {
        FlagResolver::new(&self.registry, &self.defaults)
    }
}

fn explicit(value: impl Into<FlagValue>, region: &str, defined_on: &str, part: SettingPart) -> Resolution {
    Resolution::Explicit {
        value: value.into(),
        region: id(region),
        source: ValueSource {
            defined_on: id(defined_on),
            part,
        },
    }
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn no_regions_returns_flag_default() {
    let fx = Fixture::new();
    let set = WorldRegionSet::new(world());
    let r = fx.resolver().resolve(&set, v(0, 0, 0), "pvp", &Subject::Nobody);
    assert_eq!(r, Resolution::Default(FlagValue::Boolean(true)));
}

#[test]
fn configured_default_overrides_definition_default() {
    let mut fx = Fixture::new();
    let def = fx.registry.get("pvp").unwrap().clone();
    fx.defaults.set(&def, FlagValue::Boolean(false)).unwrap();
    let set = WorldRegionSet::new(world());
    let r = fx.resolver().resolve(&set, v(0, 0, 0), "pvp", &Subject::Nobody);
    assert_eq!(r, Resolution::Default(FlagValue::Boolean(false)));
}

#[test]
fn flag_without_default_is_undefined() {
    let fx = Fixture::new();
    let set = WorldRegionSet::new(world());
    let r = fx.resolver().resolve(&set, v(0, 0, 0), "greeting", &Subject::Nobody);
    assert_eq!(r, Resolution::Undefined(UndefinedReason::NoValue));
}

#[test]
fn unknown_flag_is_undefined() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("a", (0, 0, 0), (10, 10, 10))).unwrap();
    let r = fx.resolver().resolve(&set, v(1, 1, 1), "no-such-flag", &Subject::Nobody);
    assert_eq!(r, Resolution::Undefined(UndefinedReason::UnknownFlag));
}

#[test]
fn region_without_the_flag_falls_through_to_default() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("a", (0, 0, 0), (10, 10, 10)).with_flag("tnt", FlagSetting::plain(false)))
        .unwrap();
    let r = fx.resolver().resolve(&set, v(1, 1, 1), "pvp", &Subject::Nobody);
    assert_eq!(r, Resolution::Default(FlagValue::Boolean(true)));
}

// ── Priority ─────────────────────────────────────────────────────

#[test]
fn higher_priority_wins() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(
        region("a", (0, 0, 0), (10, 10, 10))
            .with_priority(10)
            .with_flag("pvp", FlagSetting::plain(false)),
    )
    .unwrap();
    set.define(
        region("b", (0, 0, 0), (10, 10, 10))
            .with_priority(5)
            .with_flag("pvp", FlagSetting::plain(true)),
    )
    .unwrap();

    let r = fx.resolver().resolve(&set, v(5, 5, 5), "pvp", &Subject::Nobody);
    assert_eq!(r, explicit(false, "a", "a", SettingPart::Value));
}

#[test]
fn equal_priority_first_defined_wins() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("zeta", (0, 0, 0), (10, 10, 10)).with_flag("pvp", FlagSetting::plain(false)))
        .unwrap();
    set.define(region("alpha", (0, 0, 0), (10, 10, 10)).with_flag("pvp", FlagSetting::plain(true)))
        .unwrap();

    let r = fx.resolver().resolve(&set, v(5, 5, 5), "pvp", &Subject::Nobody);
    assert_eq!(r.region(), Some(&id("zeta")));
    assert_eq!(r.as_bool(), Some(false));
}

#[test]
fn higher_priority_without_value_does_not_block_lower() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("high", (0, 0, 0), (10, 10, 10)).with_priority(50))
        .unwrap();
    set.define(region("low", (0, 0, 0), (10, 10, 10)).with_flag("pvp", FlagSetting::plain(false)))
        .unwrap();
    let r = fx.resolver().resolve(&set, v(5, 5, 5), "pvp", &Subject::Nobody);
    assert_eq!(r.region(), Some(&id("low")));
}

// ── Inheritance ──────────────────────────────────────────────────

#[test]
fn child_inherits_parent_value() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("p", (0, 0, 0), (100, 10, 100)).with_flag("pvp", FlagSetting::plain(false)))
        .unwrap();
    set.define(region("c", (200, 0, 200), (210, 10, 210)).with_parent(id("p")))
        .unwrap();

    // The child does not lie inside its parent; inheritance follows the link.
    let r = fx.resolver().resolve(&set, v(205, 5, 205), "pvp", &Subject::Nobody);
    assert_eq!(r, explicit(false, "c", "p", SettingPart::Value));
}

#[test]
fn child_value_overrides_parent_regardless_of_priority() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(
        region("p", (0, 0, 0), (100, 10, 100))
            .with_priority(100)
            .with_flag("pvp", FlagSetting::plain(false)),
    )
    .unwrap();
    set.define(
        region("c", (0, 0, 0), (10, 10, 10))
            .with_parent(id("p"))
            .with_flag("pvp", FlagSetting::plain(true)),
    )
    .unwrap();

    let r = fx.resolver().resolve(&set, v(5, 5, 5), "pvp", &Subject::Nobody);
    assert_eq!(r, explicit(true, "c", "c", SettingPart::Value));

    let outside_child = fx.resolver().resolve(&set, v(50, 5, 50), "pvp", &Subject::Nobody);
    assert_eq!(outside_child, explicit(false, "p", "p", SettingPart::Value));
}

#[test]
fn parent_never_inherits_from_child() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("p", (0, 0, 0), (100, 10, 100))).unwrap();
    set.define(
        region("c", (0, 0, 0), (10, 10, 10))
            .with_parent(id("p"))
            .with_flag("pvp", FlagSetting::plain(false)),
    )
    .unwrap();
    let r = fx.resolver().resolve(&set, v(50, 5, 50), "pvp", &Subject::Nobody);
    assert_eq!(r, Resolution::Default(FlagValue::Boolean(true)));
}

#[test]
fn grandparent_value_reaches_grandchild() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("g", (0, 0, 0), (1, 1, 1)).with_flag("greeting", FlagSetting::plain(FlagValue::Text("hi".into()))))
        .unwrap();
    set.define(region("p", (0, 0, 0), (1, 1, 1)).with_parent(id("g"))).unwrap();
    set.define(region("c", (50, 0, 50), (60, 10, 60)).with_parent(id("p")))
        .unwrap();
    let r = fx.resolver().resolve(&set, v(55, 5, 55), "greeting", &Subject::Nobody);
    assert_eq!(r, explicit(FlagValue::Text("hi".into()), "c", "g", SettingPart::Value));
}

// ── Owner / member overrides ─────────────────────────────────────

#[test]
fn owner_and_member_overrides_for_scoped_flag() {
    let fx = Fixture::new();
    let owner = ActorId::new();
    let member = ActorId::new();
    let mut set = WorldRegionSet::new(world());
    set.define(
        region("home", (0, 0, 0), (10, 10, 10))
            .with_owner(owner)
            .with_member(member)
            .with_flag(
                "build",
                FlagSetting::plain(false).with_members(true),
            ),
    )
    .unwrap();

    let resolver = fx.resolver();
    let at = v(1, 1, 1);
    assert_eq!(
        resolver.resolve(&set, at, "build", &Subject::player(owner)),
        explicit(true, "home", "home", SettingPart::Members)
    );
    assert_eq!(
        resolver.resolve(&set, at, "build", &Subject::player(member)),
        explicit(true, "home", "home", SettingPart::Members)
    );
    assert_eq!(
        resolver.resolve(&set, at, "build", &Subject::player(ActorId::new())),
        explicit(false, "home", "home", SettingPart::Value)
    );
    assert_eq!(
        resolver.resolve(&set, at, "build", &Subject::Nobody),
        explicit(false, "home", "home", SettingPart::Value)
    );
}

#[test]
fn overrides_are_ignored_for_unscoped_flags() {
    let fx = Fixture::new();
    let owner = ActorId::new();
    let mut set = WorldRegionSet::new(world());
    set.define(
        region("arena", (0, 0, 0), (10, 10, 10))
            .with_owner(owner)
            .with_flag("pvp", FlagSetting::plain(true).with_owners(false)),
    )
    .unwrap();
    let r = fx.resolver().resolve(&set, v(1, 1, 1), "pvp", &Subject::player(owner));
    assert_eq!(r.as_bool(), Some(true));
}

#[test]
fn owner_of_parent_gets_override_in_child() {
    let fx = Fixture::new();
    let mayor = ActorId::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("town", (0, 0, 0), (100, 10, 100)).with_owner(mayor))
        .unwrap();
    set.define(
        region("shop", (0, 0, 0), (10, 10, 10))
            .with_parent(id("town"))
            .with_flag("chest-access", FlagSetting::plain(false).with_owners(true)),
    )
    .unwrap();
    let r = fx.resolver().resolve(&set, v(1, 1, 1), "chest-access", &Subject::player(mayor));
    assert_eq!(r, explicit(true, "shop", "shop", SettingPart::Owners));
}

#[test]
fn group_membership_counts() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(region("guild", (0, 0, 0), (10, 10, 10)).with_flag(
        "entry",
        FlagSetting::plain(false).with_members(true),
    ))
    .unwrap();
    set.members_mut(&id("guild")).unwrap().add_group("knights");

    let knight = Subject::player_in_groups(ActorId::new(), ["Knights"]);
    let r = fx.resolver().resolve(&set, v(1, 1, 1), "entry", &knight);
    assert_eq!(r.as_bool(), Some(true));
}

// ── Global region ────────────────────────────────────────────────

#[test]
fn global_region_is_lowest_precedence_fallback() {
    let fx = Fixture::new();
    let mut set = WorldRegionSet::new(world());
    set.define(Region::global(world()).with_flag("pvp", FlagSetting::plain(false)))
        .unwrap();
    set.define(region("arena", (0, 0, 0), (10, 10, 10)).with_flag("pvp", FlagSetting::plain(true)))
        .unwrap();
    set.define(region("quiet", (20, 0, 20), (30, 10, 30))).unwrap();

    let resolver = fx.resolver();
    assert_eq!(
        resolver.resolve(&set, v(1, 1, 1), "pvp", &Subject::Nobody).as_bool(),
        Some(true)
    );
    assert_eq!(
        resolver.resolve(&set, v(25, 1, 25), "pvp", &Subject::Nobody),
        explicit(false, "__global__", "__global__", SettingPart::Value)
    );
    assert_eq!(
        resolver.resolve(&set, v(-500, 1, -500), "pvp", &Subject::Nobody),
        explicit(false, "__global__", "__global__", SettingPart::Value)
    );
}

// ── Applicable regions ───────────────────────────────────────────

#[test]
fn applicable_regions_combine_states() {
    let fx = Fixture::new();
    let owner = ActorId::new();
    let mut set = WorldRegionSet::new(world());
    set.define(
        region("a", (0, 0, 0), (10, 10, 10))
            .with_owner(owner)
            .with_flag("tnt", FlagSetting::plain(false)),
    )
    .unwrap();
    set.define(region("b", (5, 0, 5), (15, 10, 15)).with_priority(1).with_owner(owner))
        .unwrap();

    let resolver = fx.resolver();
    let here = resolver.applicable(&set, v(6, 1, 6));
    assert_eq!(here.len(), 2);
    assert_eq!(here.regions()[0].id(), &id("b"));
    assert!(!here.is_virtual());
    assert!(here.is_owner_of_all(&Subject::player(owner)));
    assert!(here.is_member_of_all(&Subject::player(owner)));
    assert!(!here.is_owner_of_all(&Subject::player(ActorId::new())));

    assert_eq!(here.query_state(&Subject::Nobody, &["tnt", "pvp"]), Some(false));
    assert!(here.test_state(&Subject::Nobody, &["pvp"]));
    assert_eq!(here.query_state(&Subject::Nobody, &["passthrough"]), None);

    let nowhere = resolver.applicable(&set, v(100, 1, 100));
    assert!(nowhere.is_virtual());
    assert!(nowhere.is_owner_of_all(&Subject::Nobody));
    assert_eq!(
        nowhere.query_value("pvp", &Subject::Nobody),
        Resolution::Default(FlagValue::Boolean(true))
    );
}

#[test]
fn resolution_display_is_readable() {
    assert_eq!(
        explicit(false, "c", "p", SettingPart::Value).to_string(),
        "deny (region c, inherited from p)"
    );
    assert_eq!(
        Resolution::Undefined(UndefinedReason::UnknownWorld).to_string(),
        "undefined (unknown world)"
    );
}

// ── Properties ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Plot {
    rect: (i32, i32, i32, i32),
    priority: i32,
    pvp: Option<bool>,
}

fn plot_strategy() -> impl Strategy<Value = Plot> {
    (
        (-30i32..30, -30i32..30, 1i32..25, 1i32..25),
        -3i32..4,
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(rect, priority, pvp)| Plot { rect, priority, pvp })
}

fn build(plots: &[Plot], config: IndexConfig) -> WorldRegionSet {
    let mut set = WorldRegionSet::with_index_config(world(), config);
    for (i, s) in plots.iter().enumerate() {
        let (x, z, dx, dz) = s.rect;
        let mut r = region(&format!("r{i}"), (x, 0, z), (x + dx, 4, z + dz)).with_priority(s.priority);
        if let Some(pvp) = s.pvp {
            r = r.with_flag("pvp", FlagSetting::plain(pvp));
        }
        set.define(r).unwrap();
    }
    set
}

proptest! {
    #[test]
    fn flat_resolution_matches_reference(
        plots in prop::collection::vec(plot_strategy(), 0..20),
        samples in prop::collection::vec((-35i32..60, -35i32..60), 1..20),
    ) {
        let fx = Fixture::new();
        let set = build(&plots, IndexConfig::new(3, 10));
        for (x, z) in samples {
            let p = v(x, 1, z);
            // Highest priority, then lowest definition index, among
            // containing regions with a value.
            let expected = plots
                .iter()
                .enumerate()
                .filter(|(_, s)| {
                    let (rx, rz, dx, dz) = s.rect;
                    s.pvp.is_some() && x >= rx && x < rx + dx && z >= rz && z < rz + dz
                })
                .min_by_key(|(i, s)| (-s.priority, *i))
                .map(|(i, s)| (format!("r{i}"), s.pvp));

            let got = fx.resolver().resolve(&set, p, "pvp", &Subject::Nobody);
            match expected {
                Some((name, pvp)) => {
                    prop_assert_eq!(got.region().map(ToString::to_string), Some(name));
                    prop_assert_eq!(got.as_bool(), pvp);
                }
                None => prop_assert_eq!(got, Resolution::Default(FlagValue::Boolean(true))),
            }
        }
    }

    #[test]
    fn resolution_is_deterministic_across_rebuilds(
        plots in prop::collection::vec(plot_strategy(), 1..20),
        samples in prop::collection::vec((-35i32..60, -35i32..60), 1..20),
    ) {
        let fx = Fixture::new();
        let incremental = build(&plots, IndexConfig::default());
        let rebuilt = WorldRegionSet::from_regions(
            world(),
            IndexConfig::new(2, 3),
            incremental.regions().into_iter().cloned(),
        )
        .unwrap();
        for (x, z) in samples {
            let p = v(x, 1, z);
            let a = fx.resolver().resolve(&incremental, p, "pvp", &Subject::Nobody);
            let b = fx.resolver().resolve(&incremental, p, "pvp", &Subject::Nobody);
            let c = fx.resolver().resolve(&rebuilt, p, "pvp", &Subject::Nobody);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(&a, &c);
        }
    }
}

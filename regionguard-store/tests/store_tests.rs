use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regionguard_flags::{FlagSetting, Membership};
use regionguard_geometry::{Cuboid, Polygon, Shape};
use regionguard_index::IndexConfig;
use regionguard_store::{Region, StoreError, WorldRegionSet};
use regionguard_types::{ActorId, BlockVector, BlockVector2, RegionId, Subject, WorldId};

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

fn ids<'a>(regions: impl IntoIterator<Item = &'a Region>) -> Vec<String> {
    regions.into_iter().map(|r| r.id().to_string()).collect()
}

fn nested() -> WorldRegionSet {
    let mut set = WorldRegionSet::new(world());
    set.define(region("town", (0, 0, 0), (100, 256, 100))).unwrap();
    set.define(region("district", (0, 0, 0), (50, 256, 50)).with_parent(id("town")))
        .unwrap();
    set.define(region("plot", (0, 0, 0), (10, 256, 10)).with_parent(id("district")))
        .unwrap();
    set
}

// ── Define / get ─────────────────────────────────────────────────

#[test]
fn define_assigns_increasing_sequence() {
    let set = nested();
    let seqs: Vec<u64> = set.regions().iter().map(|r| r.seq()).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert_eq!(ids(set.regions()), vec!["town", "district", "plot"]);
}

#[test]
fn duplicate_identifier_is_rejected_case_insensitively() {
    let mut set = WorldRegionSet::new(world());
    set.define(region("Spawn", (0, 0, 0), (1, 1, 1))).unwrap();
    let err = set
        .define(region("SPAWN", (5, 0, 5), (6, 1, 6)))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentifier { .. }));
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(&id("spawn")).unwrap().bounding_box().unwrap().min(), v(0, 0, 0));
}

#[test]
fn define_with_unknown_parent_fails() {
    let mut set = WorldRegionSet::new(world());
    let err = set
        .define(region("child", (0, 0, 0), (1, 1, 1)).with_parent(id("ghost")))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(set.is_empty());
    assert!(set.index().is_empty());
}

#[test]
fn define_with_self_parent_is_a_cycle() {
    let mut set = WorldRegionSet::new(world());
    let err = set
        .define(region("a", (0, 0, 0), (1, 1, 1)).with_parent(id("a")))
        .unwrap_err();
    assert!(matches!(err, StoreError::CycleDetected { .. }));
}

#[test]
fn region_from_other_world_is_rejected() {
    let mut set = WorldRegionSet::new(world());
    let other = Region::new(id("a"), WorldId::new("nether").unwrap(), cuboid((0, 0, 0), (1, 1, 1)));
    assert!(matches!(
        set.define(other),
        Err(StoreError::WorldMismatch { .. })
    ));
}

// ── Global region ────────────────────────────────────────────────

#[test]
fn global_region_requires_global_shape() {
    let mut set = WorldRegionSet::new(world());
    let wrong = Region::new(RegionId::global(), world(), cuboid((0, 0, 0), (1, 1, 1)));
    assert!(matches!(set.define(wrong), Err(StoreError::GlobalShape(_))));

    let also_wrong = Region::new(id("everything"), world(), Shape::Global);
    assert!(matches!(set.define(also_wrong), Err(StoreError::GlobalShape(_))));

    set.define(Region::global(world())).unwrap();
    assert!(set.global().is_some());
    assert!(set.index().is_empty());
    assert!(set.containing(v(0, 0, 0)).is_empty());
}

#[test]
fn global_region_cannot_take_part_in_parent_links() {
    let mut set = nested();
    set.define(Region::global(world())).unwrap();
    assert!(matches!(
        set.set_parent(&id("plot"), Some(&RegionId::global())),
        Err(StoreError::GlobalParent(_))
    ));
    assert!(matches!(
        set.set_parent(&RegionId::global(), Some(&id("town"))),
        Err(StoreError::GlobalParent(_))
    ));
}

// ── Remove ───────────────────────────────────────────────────────

#[test]
fn remove_detaches_children() {
    let mut set = nested();
    let removed = set.remove(&id("district")).unwrap();
    assert_eq!(removed.region.id(), &id("district"));
    assert_eq!(removed.detached_children, vec![id("plot")]);

    assert_eq!(set.get(&id("plot")).unwrap().parent(), None);
    assert!(set.list_children(&id("town")).unwrap().is_empty());
    assert!(set.iter().all(|r| r.parent() != Some(&id("district"))));
    assert!(matches!(
        set.list_children(&id("district")),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn remove_unknown_region_fails() {
    let mut set = nested();
    assert!(matches!(
        set.remove(&id("nope")),
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(set.len(), 3);
}

#[test]
fn removed_region_leaves_index() {
    let mut set = nested();
    set.remove(&id("plot")).unwrap();
    assert_eq!(ids(set.containing(v(5, 5, 5))), vec!["town", "district"]);
    assert!(!set.index().contains(&id("plot")));
}

// ── Parents ──────────────────────────────────────────────────────

#[test]
fn set_parent_rejects_descendant_and_leaves_store_unchanged() {
    let mut set = nested();
    let before: Vec<_> = set.regions().iter().map(|r| (r.id().clone(), r.parent().cloned())).collect();

    let err = set.set_parent(&id("town"), Some(&id("plot"))).unwrap_err();
    assert_eq!(
        err,
        StoreError::CycleDetected {
            id: id("town"),
            parent: id("plot"),
        }
    );
    assert!(matches!(
        set.set_parent(&id("town"), Some(&id("town"))),
        Err(StoreError::CycleDetected { .. })
    ));

    let after: Vec<_> = set.regions().iter().map(|r| (r.id().clone(), r.parent().cloned())).collect();
    assert_eq!(before, after);
    assert_eq!(set.list_children(&id("town")).unwrap(), vec![&id("district")]);
}

#[test]
fn set_parent_moves_child_between_parents() {
    let mut set = nested();
    set.set_parent(&id("plot"), Some(&id("town"))).unwrap();
    assert_eq!(set.list_children(&id("town")).unwrap(), vec![&id("district"), &id("plot")]);
    assert!(set.list_children(&id("district")).unwrap().is_empty());

    set.set_parent(&id("plot"), None).unwrap();
    assert_eq!(set.get(&id("plot")).unwrap().parent(), None);
    assert_eq!(set.list_children(&id("town")).unwrap(), vec![&id("district")]);
}

#[test]
fn set_parent_unknown_ids_fail() {
    let mut set = nested();
    assert!(matches!(
        set.set_parent(&id("ghost"), Some(&id("town"))),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        set.set_parent(&id("plot"), Some(&id("ghost"))),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn ancestors_are_nearest_first() {
    let set = nested();
    assert_eq!(ids(set.ancestors(&id("plot")).unwrap()), vec!["district", "town"]);
    assert!(set.ancestors(&id("town")).unwrap().is_empty());
    assert!(set.is_ancestor(&id("town"), &id("plot")));
    assert!(!set.is_ancestor(&id("plot"), &id("town")));
    assert!(!set.is_ancestor(&id("plot"), &id("plot")));
}

// ── Updates ──────────────────────────────────────────────────────

#[test]
fn set_shape_reindexes() {
    let mut set = nested();
    set.set_shape(&id("plot"), cuboid((500, 0, 500), (510, 10, 510)))
        .unwrap();
    assert_eq!(ids(set.containing(v(5, 5, 5))), vec!["town", "district"]);
    assert_eq!(ids(set.containing(v(505, 5, 505))), vec!["plot"]);

    assert!(matches!(
        set.set_shape(&id("plot"), Shape::Global),
        Err(StoreError::GlobalShape(_))
    ));
}

#[test]
fn priority_orders_containing_regions() {
    let mut set = nested();
    set.set_priority(&id("town"), 10).unwrap();
    assert_eq!(set.get(&id("town")).unwrap().priority(), 10);
    assert_eq!(ids(set.containing(v(1, 1, 1))), vec!["town", "district", "plot"]);
}

#[test]
fn flags_set_and_clear() {
    let mut set = nested();
    set.set_flag(&id("plot"), "PvP", FlagSetting::plain(false)).unwrap();
    assert_eq!(
        set.get(&id("plot")).unwrap().flag("pvp"),
        Some(&FlagSetting::plain(false))
    );
    assert_eq!(
        set.clear_flag(&id("plot"), "pvp").unwrap(),
        Some(FlagSetting::plain(false))
    );
    assert_eq!(set.clear_flag(&id("plot"), "pvp").unwrap(), None);

    set.set_flag(&id("plot"), "build", FlagSetting::plain(true)).unwrap();
    set.set_flag(&id("plot"), "build", FlagSetting::default()).unwrap();
    assert!(set.get(&id("plot")).unwrap().flags().is_empty());
}

#[test]
fn owners_and_members() {
    let mut set = nested();
    let alice = ActorId::new();
    assert!(set.add_owner(&id("plot"), alice).unwrap());
    assert!(!set.add_owner(&id("plot"), alice).unwrap());
    set.add_owner(&id("town"), alice).unwrap();
    assert_eq!(set.count_owned_by(&alice), 2);

    assert!(set.remove_owner(&id("plot"), &alice).unwrap());
    assert_eq!(set.count_owned_by(&alice), 1);

    let bob = ActorId::new();
    set.add_member(&id("district"), bob).unwrap();
    assert!(set.get(&id("district")).unwrap().members().contains_player(&bob));
    assert!(set.remove_member(&id("district"), &bob).unwrap());
}

// ── Membership ───────────────────────────────────────────────────

#[test]
fn membership_inherits_from_ancestors() {
    let mut set = nested();
    let mayor = ActorId::new();
    let resident = ActorId::new();
    set.add_owner(&id("town"), mayor).unwrap();
    set.add_member(&id("district"), resident).unwrap();
    set.members_mut(&id("plot")).unwrap().add_group("Builders");

    let plot = set.get(&id("plot")).unwrap();
    assert_eq!(set.membership(plot, &Subject::player(mayor)), Membership::Owner);
    assert_eq!(set.membership(plot, &Subject::player(resident)), Membership::Member);
    assert_eq!(
        set.membership(plot, &Subject::player_in_groups(ActorId::new(), ["builders"])),
        Membership::Member
    );
    assert_eq!(set.membership(plot, &Subject::player(ActorId::new())), Membership::NonMember);
    assert_eq!(set.membership(plot, &Subject::Nobody), Membership::Unassociated);

    let town = set.get(&id("town")).unwrap();
    assert_eq!(set.membership(town, &Subject::player(resident)), Membership::NonMember);
}

// ── Spatial queries ──────────────────────────────────────────────

#[test]
fn intersecting_uses_exact_geometry() {
    let mut set = WorldRegionSet::new(world());
    let triangle = Polygon::new(
        vec![
            BlockVector2::new(0, 0),
            BlockVector2::new(20, 0),
            BlockVector2::new(0, 20),
        ],
        0,
        10,
    )
    .unwrap();
    set.define(Region::new(id("tri"), world(), triangle.into())).unwrap();
    set.define(region("far", (100, 0, 100), (110, 10, 110))).unwrap();
    set.define(Region::global(world())).unwrap();

    // Inside the triangle's bounding box but past its hypotenuse.
    assert!(set.intersecting(&cuboid((15, 0, 15), (20, 10, 20))).is_empty());
    assert_eq!(ids(set.intersecting(&cuboid((0, 0, 0), (2, 1, 2)))), vec!["tri"]);
    assert_eq!(ids(set.intersecting(&Shape::Global)), vec!["tri", "far"]);
}

// ── Bulk load ────────────────────────────────────────────────────

#[test]
fn from_regions_keeps_sequence_and_links() {
    let regions = vec![
        region("plot", (0, 0, 0), (10, 10, 10)).with_parent(id("town")).with_seq(7),
        region("town", (0, 0, 0), (100, 10, 100)).with_seq(3),
        region("new", (50, 0, 50), (60, 10, 60)),
    ];
    let mut set = WorldRegionSet::from_regions(world(), IndexConfig::default(), regions).unwrap();
    assert_eq!(ids(set.regions()), vec!["town", "plot", "new"]);
    assert_eq!(set.get(&id("new")).unwrap().seq(), 8);
    assert_eq!(set.list_children(&id("town")).unwrap(), vec![&id("plot")]);
    assert_eq!(ids(set.containing(v(5, 5, 5))), vec!["town", "plot"]);

    set.define(region("later", (0, 0, 0), (1, 1, 1))).unwrap();
    assert_eq!(set.get(&id("later")).unwrap().seq(), 9);
}

#[test]
fn from_regions_rejects_cycles_and_duplicates() {
    let cyclic = vec![
        region("a", (0, 0, 0), (1, 1, 1)).with_parent(id("b")),
        region("b", (0, 0, 0), (1, 1, 1)).with_parent(id("a")),
    ];
    assert!(matches!(
        WorldRegionSet::from_regions(world(), IndexConfig::default(), cyclic),
        Err(StoreError::CycleDetected { .. })
    ));

    let duplicated = vec![
        region("a", (0, 0, 0), (1, 1, 1)),
        region("A", (5, 0, 5), (6, 1, 6)),
    ];
    assert!(matches!(
        WorldRegionSet::from_regions(world(), IndexConfig::default(), duplicated),
        Err(StoreError::DuplicateIdentifier { .. })
    ));

    let dangling = vec![region("a", (0, 0, 0), (1, 1, 1)).with_parent(id("zzz"))];
    assert!(matches!(
        WorldRegionSet::from_regions(world(), IndexConfig::default(), dangling),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn from_regions_rejects_exhausted_sequence() {
    let stored = vec![region("a", (0, 0, 0), (1, 1, 1)).with_seq(u64::MAX)];
    assert!(matches!(
        WorldRegionSet::from_regions(world(), IndexConfig::default(), stored),
        Err(StoreError::SequenceExhausted { .. })
    ));
}

#[test]
fn define_fails_cleanly_when_sequence_runs_out() {
    let stored = vec![region("a", (0, 0, 0), (1, 1, 1)).with_seq(u64::MAX - 1)];
    let mut set = WorldRegionSet::from_regions(world(), IndexConfig::default(), stored).unwrap();

    let err = set
        .define(region("b", (0, 0, 0), (1, 1, 1)).with_parent(id("a")))
        .unwrap_err();
    assert!(matches!(err, StoreError::SequenceExhausted { .. }));
    assert!(set.get(&id("b")).is_none());
    assert!(set.list_children(&id("a")).unwrap().is_empty());
    assert!(!set.index().contains(&id("b")));
}

// ── Index consistency ────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Define(u8, (i32, i32, i32, i32)),
    Remove(u8),
    Reshape(u8, (i32, i32, i32, i32)),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let rect = (-40i32..40, -40i32..40, 1i32..30, 1i32..30);
    prop_oneof![
        (0u8..12, rect.clone()).prop_map(|(n, r)| Op::Define(n, r)),
        (0u8..12).prop_map(Op::Remove),
        (0u8..12, rect).prop_map(|(n, r)| Op::Reshape(n, r)),
    ]
}

fn rect_shape((x, z, dx, dz): (i32, i32, i32, i32)) -> Shape {
    cuboid((x, 0, z), (x + dx, 4, z + dz))
}

proptest! {
    #[test]
    fn containing_matches_linear_scan_after_any_mutations(
        ops in prop::collection::vec(op_strategy(), 1..40),
        samples in prop::collection::vec((-45i32..75, 0i32..5, -45i32..75), 1..30),
    ) {
        let mut set = WorldRegionSet::with_index_config(world(), IndexConfig::new(3, 6));
        for op in ops {
            match op {
                Op::Define(n, r) => {
                    let _ = set.define(Region::new(id(&format!("r{n}")), world(), rect_shape(r)));
                }
                Op::Remove(n) => {
                    let _ = set.remove(&id(&format!("r{n}")));
                }
                Op::Reshape(n, r) => {
                    let _ = set.set_shape(&id(&format!("r{n}")), rect_shape(r));
                }
            }
        }
        for (x, y, z) in samples {
            let p = v(x, y, z);
            let mut expected: Vec<&Region> = set.iter().filter(|r| r.contains(p)).collect();
            expected.sort_by(|a, b| a.precedence_cmp(b));
            prop_assert_eq!(ids(set.containing(p)), ids(expected));
        }
    }
}

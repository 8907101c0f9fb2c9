use proptest::prelude::*;
use regionguard_geometry::BoundingBox;
use regionguard_index::{IndexConfig, SpatialIndex};
use regionguard_types::{BlockVector, RegionId};
use std::collections::BTreeSet;

fn id(s: &str) -> RegionId {
    RegionId::new(s).unwrap()
}

fn bbox(a: (i32, i32, i32), b: (i32, i32, i32)) -> BoundingBox {
    BoundingBox::new(BlockVector::new(a.0, a.1, a.2), BlockVector::new(b.0, b.1, b.2)).unwrap()
}

fn at(index: &SpatialIndex, x: i32, y: i32, z: i32) -> BTreeSet<String> {
    index
        .query_point(BlockVector::new(x, y, z))
        .map(|id| id.to_string())
        .collect()
}

// ── Point queries ────────────────────────────────────────────────

#[test]
fn empty_index_returns_nothing() {
    let index = SpatialIndex::default();
    assert!(index.is_empty());
    assert_eq!(index.query_point(BlockVector::ZERO).count(), 0);
}

#[test]
fn point_query_respects_half_open_bounds() {
    let mut index = SpatialIndex::default();
    index.insert(id("a"), bbox((0, 0, 0), (16, 256, 16)));
    assert_eq!(at(&index, 0, 0, 0), BTreeSet::from(["a".to_string()]));
    assert_eq!(at(&index, 15, 255, 15), BTreeSet::from(["a".to_string()]));
    assert!(at(&index, 16, 0, 0).is_empty());
    assert!(at(&index, 0, 256, 0).is_empty());
}

#[test]
fn regions_spanning_cells_are_found_everywhere() {
    let mut index = SpatialIndex::default();
    index.insert(id("wide"), bbox((-40, 0, -40), (40, 10, 40)));
    for (x, z) in [(-40, -40), (-1, -1), (0, 0), (39, 39), (20, -33)] {
        assert_eq!(at(&index, x, 5, z).len(), 1, "missed at {x},{z}");
    }
    assert!(at(&index, 40, 5, 0).is_empty());
}

#[test]
fn negative_coordinates_use_floor_cells() {
    let mut index = SpatialIndex::new(IndexConfig::new(4, 4096));
    index.insert(id("neg"), bbox((-17, 0, -1), (-16, 1, 0)));
    assert_eq!(at(&index, -17, 0, -1).len(), 1);
    assert!(at(&index, -16, 0, -1).is_empty());
}

#[test]
fn oversized_regions_are_listed_separately() {
    let mut index = SpatialIndex::new(IndexConfig::new(4, 4));
    index.insert(id("huge"), bbox((0, 0, 0), (1000, 10, 1000)));
    index.insert(id("small"), bbox((0, 0, 0), (8, 10, 8)));
    assert_eq!(index.oversized_len(), 1);
    assert_eq!(index.occupied_cells(), 1);
    assert_eq!(at(&index, 999, 0, 999), BTreeSet::from(["huge".to_string()]));
    assert_eq!(at(&index, 1, 1, 1).len(), 2);
}

#[test]
fn config_clamps_out_of_range_values() {
    let config = IndexConfig::new(40, 0);
    assert_eq!(config.cell_shift(), IndexConfig::MAX_CELL_SHIFT);
    assert_eq!(config.max_cells_per_region(), 1);

    let mut index = SpatialIndex::new(config);
    assert_eq!(index.config(), &config);
    index.insert(id("a"), bbox((-5, 0, -5), (5, 10, 5)));
    index.insert(id("edge"), bbox((i32::MAX - 1, 0, i32::MIN), (i32::MAX, 1, i32::MIN + 1)));
    assert_eq!(at(&index, 0, 0, 0), BTreeSet::from(["a".to_string()]));
    assert_eq!(at(&index, i32::MAX - 1, 0, i32::MIN), BTreeSet::from(["edge".to_string()]));
    assert!(at(&index, i32::MIN, 0, i32::MAX).is_empty());
}

// ── Updates ──────────────────────────────────────────────────────

#[test]
fn insert_replaces_existing_entry() {
    let mut index = SpatialIndex::default();
    index.insert(id("a"), bbox((0, 0, 0), (10, 10, 10)));
    index.insert(id("a"), bbox((100, 0, 100), (110, 10, 110)));
    assert_eq!(index.len(), 1);
    assert!(at(&index, 5, 5, 5).is_empty());
    assert_eq!(at(&index, 105, 5, 105).len(), 1);
    assert_eq!(index.bounds(&id("a")), Some(bbox((100, 0, 100), (110, 10, 110))));
}

#[test]
fn remove_clears_cells() {
    let mut index = SpatialIndex::default();
    index.insert(id("a"), bbox((0, 0, 0), (40, 10, 40)));
    assert!(index.remove(&id("a")));
    assert!(!index.remove(&id("a")));
    assert_eq!(index.occupied_cells(), 0);
    assert!(!index.contains(&id("a")));
}

#[test]
fn slots_are_reused_after_removal() {
    let mut index = SpatialIndex::default();
    for i in 0..10 {
        index.insert(id(&format!("r{i}")), bbox((i, 0, 0), (i + 1, 1, 1)));
    }
    for i in 0..10 {
        index.remove(&id(&format!("r{i}")));
    }
    index.insert(id("again"), bbox((3, 0, 0), (4, 1, 1)));
    assert_eq!(index.len(), 1);
    assert_eq!(at(&index, 3, 0, 0), BTreeSet::from(["again".to_string()]));
}

#[test]
fn rebuild_replaces_contents() {
    let mut index = SpatialIndex::default();
    index.insert(id("old"), bbox((0, 0, 0), (1, 1, 1)));
    index.rebuild([
        (id("x"), bbox((0, 0, 0), (5, 5, 5))),
        (id("y"), bbox((3, 0, 3), (9, 5, 9))),
    ]);
    assert!(!index.contains(&id("old")));
    assert_eq!(at(&index, 4, 0, 4).len(), 2);
}

// ── Box queries ──────────────────────────────────────────────────

#[test]
fn box_query_deduplicates() {
    let mut index = SpatialIndex::default();
    index.insert(id("a"), bbox((0, 0, 0), (64, 10, 64)));
    index.insert(id("b"), bbox((100, 0, 100), (101, 10, 101)));
    let found = index.query_box(&bbox((-10, 0, -10), (70, 10, 70)));
    assert_eq!(found, vec![&id("a")]);
}

#[test]
fn huge_box_query_scans_entries() {
    let mut index = SpatialIndex::default();
    index.insert(id("a"), bbox((0, 0, 0), (1, 1, 1)));
    let found = index.query_box(&bbox((-1_000_000, 0, -1_000_000), (1_000_000, 10, 1_000_000)));
    assert_eq!(found.len(), 1);
}

// ── Soundness ────────────────────────────────────────────────────

fn box_strategy() -> impl Strategy<Value = BoundingBox> {
    (-60i32..60, 0i32..8, -60i32..60, 1i32..50, 1i32..8, 1i32..50)
        .prop_map(|(x, y, z, dx, dy, dz)| bbox((x, y, z), (x + dx, y + dy, z + dz)))
}

proptest! {
    #[test]
    fn point_queries_match_linear_scan(
        boxes in prop::collection::vec(box_strategy(), 1..25),
        samples in prop::collection::vec((-70i32..110, 0i32..16, -70i32..110), 1..40),
        shift in 2u8..6,
        max_cells in 1usize..20,
    ) {
        let mut index = SpatialIndex::new(IndexConfig::new(shift, max_cells));
        for (i, b) in boxes.iter().enumerate() {
            index.insert(id(&format!("r{i}")), *b);
        }
        for (x, y, z) in samples {
            let p = BlockVector::new(x, y, z);
            let expected: BTreeSet<String> = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.contains(p))
                .map(|(i, _)| format!("r{i}"))
                .collect();
            let got: Vec<String> = index.query_point(p).map(|r| r.to_string()).collect();
            prop_assert_eq!(got.len(), expected.len(), "duplicates or misses at {}", p);
            prop_assert_eq!(got.into_iter().collect::<BTreeSet<_>>(), expected);
        }
    }

    #[test]
    fn box_queries_match_linear_scan(
        boxes in prop::collection::vec(box_strategy(), 1..25),
        area in box_strategy(),
        removed in prop::collection::vec(any::<bool>(), 25),
    ) {
        let mut index = SpatialIndex::new(IndexConfig::new(3, 8));
        for (i, b) in boxes.iter().enumerate() {
            index.insert(id(&format!("r{i}")), *b);
        }
        for (i, gone) in removed.iter().enumerate().take(boxes.len()) {
            if *gone {
                index.remove(&id(&format!("r{i}")));
            }
        }
        let expected: BTreeSet<String> = boxes
            .iter()
            .enumerate()
            .filter(|(i, b)| !removed[*i] && b.intersects(&area))
            .map(|(i, _)| format!("r{i}"))
            .collect();
        let got: BTreeSet<String> = index.query_box(&area).into_iter().map(|r| r.to_string()).collect();
        prop_assert_eq!(got, expected);
    }
}

//! Uniform column grid.
//!
//! The x/z plane is cut into square cells of `1 << cell_shift` blocks (a
//! Minecraft chunk at the default shift of 4). Height is ignored: a region
//! is listed in every cell its bounding box touches, and candidates are
//! filtered by their full 3D box on the way out.
//!
//! A region whose box would cover more than `max_cells_per_region` cells is
//! kept on a separate oversized list instead, scanned on every query. This
//! bounds insert cost for world-spanning regions while keeping per-query
//! work at one hash lookup plus the bucket and the (usually tiny) list.

use crate::config::IndexConfig;
use regionguard_geometry::BoundingBox;
use regionguard_types::{BlockVector, RegionId};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::debug;

type Slot = u32;
type CellKey = (i32, i32);

#[derive(Debug, Clone)]
struct Entry {
    id: RegionId,
    bounds: BoundingBox,
    oversized: bool,
}

/// Acceleration structure mapping block positions to candidate regions.
///
/// Holds region identifiers only; the region store remains the source of
/// truth. Answers over-approximate by bounding box and never miss a region
/// whose box contains the query.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    config: IndexConfig,
    slots: Vec<Option<Entry>>,
    free: Vec<Slot>,
    by_id: HashMap<RegionId, Slot>,
    cells: HashMap<CellKey, SmallVec<[Slot; 4]>>,
    oversized: Vec<Slot>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl SpatialIndex {
    #[must_use]
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            by_id: HashMap::new(),
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of indexed regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of non-empty grid cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of regions on the oversized list.
    #[must_use]
    pub fn oversized_len(&self) -> usize {
        self.oversized.len()
    }

    #[must_use]
    pub fn contains(&self, id: &RegionId) -> bool {
        self.by_id.contains_key(id)
    }

    /// The box the index holds for `id`.
    #[must_use]
    pub fn bounds(&self, id: &RegionId) -> Option<BoundingBox> {
        let slot = *self.by_id.get(id)?;
        self.entry(slot).map(|e| e.bounds)
    }

    /// Adds a region, replacing any previous entry for the same id.
    pub fn insert(&mut self, id: RegionId, bounds: BoundingBox) {
        self.remove(&id);

        let oversized = self.cell_count(&bounds) > self.config.max_cells_per_region() as u64;
        let entry = Entry {
            id: id.clone(),
            bounds,
            oversized,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                (self.slots.len() - 1) as Slot
            }
        };
        self.by_id.insert(id, slot);

        if oversized {
            self.oversized.push(slot);
        } else {
            for key in self.cell_keys(&bounds) {
                self.cells.entry(key).or_default().push(slot);
            }
        }
    }

    /// Removes a region. Returns false if it was not indexed.
    pub fn remove(&mut self, id: &RegionId) -> bool {
        let Some(slot) = self.by_id.remove(id) else {
            return false;
        };
        let Some(entry) = self.slots[slot as usize].take() else {
            return false;
        };
        if entry.oversized {
            self.oversized.retain(|s| *s != slot);
        } else {
            for key in self.cell_keys(&entry.bounds) {
                if let Some(bucket) = self.cells.get_mut(&key) {
                    bucket.retain(|s| *s != slot);
                    if bucket.is_empty() {
                        self.cells.remove(&key);
                    }
                }
            }
        }
        self.free.push(slot);
        true
    }

    /// Drops every entry and indexes `entries` from scratch.
    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (RegionId, BoundingBox)>,
    {
        self.slots.clear();
        self.free.clear();
        self.by_id.clear();
        self.cells.clear();
        self.oversized.clear();
        for (id, bounds) in entries {
            self.insert(id, bounds);
        }
        debug!(
            regions = self.len(),
            cells = self.cells.len(),
            oversized = self.oversized.len(),
            "spatial index rebuilt"
        );
    }

    /// Regions whose bounding box contains `p`. Each id appears once.
    pub fn query_point(&self, p: BlockVector) -> impl Iterator<Item = &RegionId> + '_ {
        let bucket: &[Slot] = match self.cells.get(&self.cell_of(p.x, p.z)) {
            Some(b) => b.as_slice(),
            None => &[],
        };
        bucket
            .iter()
            .chain(self.oversized.iter())
            .filter_map(move |slot| self.entry(*slot))
            .filter(move |e| e.bounds.contains(p))
            .map(|e| &e.id)
    }

    /// Regions whose bounding box shares a block with `area`, in slot order
    /// without duplicates.
    #[must_use]
    pub fn query_box(&self, area: &BoundingBox) -> Vec<&RegionId> {
        let mut slots: Vec<Slot> = if self.cell_count(area) > self.slots.len() as u64 {
            // Cheaper to scan every entry than every cell of a huge query.
            (0..self.slots.len() as Slot).collect()
        } else {
            let mut found: Vec<Slot> = self
                .cell_keys(area)
                .filter_map(|key| self.cells.get(&key))
                .flat_map(|bucket| bucket.iter().copied())
                .collect();
            found.extend_from_slice(&self.oversized);
            found
        };
        slots.sort_unstable();
        slots.dedup();
        slots
            .into_iter()
            .filter_map(|slot| self.entry(slot))
            .filter(|e| e.bounds.intersects(area))
            .map(|e| &e.id)
            .collect()
    }

    fn entry(&self, slot: Slot) -> Option<&Entry> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    fn cell_of(&self, x: i32, z: i32) -> CellKey {
        let shift = self.config.cell_shift();
        (x >> shift, z >> shift)
    }

    /// Inclusive cell range covered by a half-open box.
    fn cell_range(&self, bounds: &BoundingBox) -> (CellKey, CellKey) {
        let (min, max) = (bounds.min(), bounds.max());
        (
            self.cell_of(min.x, min.z),
            self.cell_of(max.x - 1, max.z - 1),
        )
    }

    fn cell_count(&self, bounds: &BoundingBox) -> u64 {
        let ((x0, z0), (x1, z1)) = self.cell_range(bounds);
        let w = (i64::from(x1) - i64::from(x0) + 1) as u64;
        let d = (i64::from(z1) - i64::from(z0) + 1) as u64;
        w.saturating_mul(d)
    }

    fn cell_keys(&self, bounds: &BoundingBox) -> impl Iterator<Item = CellKey> + use<> {
        let ((x0, z0), (x1, z1)) = self.cell_range(bounds);
        (x0..=x1).flat_map(move |x| (z0..=z1).map(move |z| (x, z)))
    }
}

//! All regions of one world.

use crate::domain::Domain;
use crate::error::{StoreError, StoreResult};
use crate::region::Region;
use regionguard_flags::{FlagSetting, Membership};
use regionguard_geometry::Shape;
use regionguard_index::{IndexConfig, SpatialIndex};
use regionguard_types::{ActorId, BlockVector, RegionId, Subject, WorldId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A region removed from a world, with the children it left parentless.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedRegion {
    pub region: Region,
    pub detached_children: Vec<RegionId>,
}

/// The authoritative region set of one world.
///
/// Invariants kept by every mutation:
/// - region ids are unique
/// - parent ids resolve inside this set and never form a cycle
/// - the spatial index holds exactly the bounded regions with their
///   current bounding boxes
///
/// Mutations validate before changing anything, so a failed call leaves
/// the set untouched. Cloning produces an independent copy, which the
/// engine uses for copy-on-write updates.
#[derive(Debug, Clone)]
pub struct WorldRegionSet {
    world: WorldId,
    regions: HashMap<RegionId, Region>,
    children: HashMap<RegionId, BTreeSet<RegionId>>,
    index: SpatialIndex,
    next_seq: u64,
}

impl WorldRegionSet {
    #[must_use]
    pub fn new(world: WorldId) -> Self {
        Self::with_index_config(world, IndexConfig::default())
    }

    #[must_use]
    pub fn with_index_config(world: WorldId, config: IndexConfig) -> Self {
        Self {
            world,
            regions: HashMap::new(),
            children: HashMap::new(),
            index: SpatialIndex::new(config),
            next_seq: 1,
        }
    }

    /// Builds a set from stored regions in one pass.
    ///
    /// Sequence numbers are kept as given (zero is replaced with the next
    /// free number); parents are checked once every region is present and
    /// the index is rebuilt at the end.
    pub fn from_regions<I>(world: WorldId, config: IndexConfig, regions: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = Region>,
    {
        let mut set = Self::with_index_config(world, config);
        let mut unsequenced = Vec::new();

        for region in regions {
            set.check_new(&region)?;
            if region.seq == 0 {
                unsequenced.push(region.id.clone());
            }
            let after = region
                .seq
                .checked_add(1)
                .ok_or_else(|| set.exhausted(&region.id))?;
            set.next_seq = set.next_seq.max(after);
            set.regions.insert(region.id.clone(), region);
        }
        for id in unsequenced {
            let seq = set.take_seq(&id)?;
            if let Some(r) = set.regions.get_mut(&id) {
                r.seq = seq;
            }
        }

        let links: Vec<(RegionId, RegionId)> = set
            .regions
            .values()
            .filter_map(|r| r.parent.clone().map(|p| (r.id.clone(), p)))
            .collect();
        for (id, parent) in &links {
            set.check_parent_target(id, parent)?;
            set.children.entry(parent.clone()).or_default().insert(id.clone());
        }
        for (id, parent) in &links {
            if set.lineage_ids(parent).any(|a| a == id) {
                return Err(StoreError::CycleDetected {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let entries: Vec<_> = set
            .regions
            .values()
            .filter_map(|r| r.bounding_box().map(|b| (r.id.clone(), b)))
            .collect();
        set.index.rebuild(entries);
        debug!(world = %set.world, regions = set.regions.len(), "Built region set");
        Ok(set)
    }

    #[must_use]
    pub fn world(&self) -> &WorldId {
        &self.world
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    #[must_use]
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &RegionId) -> bool {
        self.regions.contains_key(id)
    }

    /// The `__global__` region, if defined.
    #[must_use]
    pub fn global(&self) -> Option<&Region> {
        self.regions.get(&RegionId::global())
    }

    /// Every region in definition order.
    #[must_use]
    pub fn regions(&self) -> Vec<&Region> {
        let mut all: Vec<&Region> = self.regions.values().collect();
        all.sort_by(|a, b| a.seq.cmp(&b.seq).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Unordered iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Adds a region, assigning it the next definition sequence number.
    pub fn define(&mut self, mut region: Region) -> StoreResult<()> {
        self.check_new(&region)?;
        if self.next_seq == u64::MAX {
            return Err(self.exhausted(&region.id));
        }
        if let Some(parent) = region.parent.clone() {
            if parent == region.id {
                return Err(StoreError::CycleDetected {
                    id: region.id.clone(),
                    parent,
                });
            }
            self.check_parent_target(&region.id, &parent)?;
            self.children.entry(parent).or_default().insert(region.id.clone());
        }

        region.seq = self.take_seq(&region.id)?;
        if let Some(bounds) = region.bounding_box() {
            self.index.insert(region.id.clone(), bounds);
        }
        debug!(world = %self.world, id = %region.id, seq = region.seq, shape = %region.shape.kind(), "Defined region");
        self.regions.insert(region.id.clone(), region);
        Ok(())
    }

    /// Removes a region. Its children become parentless; nothing is
    /// reparented.
    pub fn remove(&mut self, id: &RegionId) -> StoreResult<RemovedRegion> {
        let region = self.regions.remove(id).ok_or_else(|| self.not_found(id))?;

        if let Some(parent) = &region.parent {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.remove(id);
                if siblings.is_empty() {
                    self.children.remove(parent);
                }
            }
        }

        let detached: Vec<RegionId> = self
            .children
            .remove(id)
            .map(|c| c.into_iter().collect())
            .unwrap_or_default();
        for child in &detached {
            if let Some(r) = self.regions.get_mut(child) {
                r.parent = None;
            }
        }

        self.index.remove(id);
        debug!(world = %self.world, id = %id, detached = detached.len(), "Removed region");
        Ok(RemovedRegion {
            region,
            detached_children: detached,
        })
    }

    /// Sets or clears the parent of a region.
    ///
    /// Fails with [`StoreError::CycleDetected`] when `parent` is the region
    /// itself or one of its descendants.
    pub fn set_parent(&mut self, id: &RegionId, parent: Option<&RegionId>) -> StoreResult<()> {
        let current = self.require(id)?.parent.clone();

        if let Some(parent) = parent {
            self.check_parent_target(id, parent)?;
            if self.lineage_ids(parent).any(|a| a == id) {
                return Err(StoreError::CycleDetected {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        if let Some(old) = &current {
            if let Some(siblings) = self.children.get_mut(old) {
                siblings.remove(id);
                if siblings.is_empty() {
                    self.children.remove(old);
                }
            }
        }
        if let Some(parent) = parent {
            self.children.entry(parent.clone()).or_default().insert(id.clone());
        }
        if let Some(r) = self.regions.get_mut(id) {
            r.parent = parent.cloned();
        }
        debug!(world = %self.world, id = %id, parent = ?parent.map(RegionId::as_str), "Set parent");
        Ok(())
    }

    pub fn set_priority(&mut self, id: &RegionId, priority: i32) -> StoreResult<()> {
        self.require_mut(id)?.priority = priority;
        debug!(world = %self.world, id = %id, priority, "Set priority");
        Ok(())
    }

    /// Replaces the shape and re-indexes the region.
    pub fn set_shape(&mut self, id: &RegionId, shape: Shape) -> StoreResult<()> {
        if id.is_global() != shape.is_global() {
            return Err(StoreError::GlobalShape(id.clone()));
        }
        let region = self.require_mut(id)?;
        region.shape = shape;
        let bounds = region.bounding_box();
        self.index.remove(id);
        if let Some(bounds) = bounds {
            self.index.insert(id.clone(), bounds);
        }
        debug!(world = %self.world, id = %id, "Set shape");
        Ok(())
    }

    /// Stores a flag setting; an empty setting clears the flag.
    pub fn set_flag(&mut self, id: &RegionId, flag: &str, setting: FlagSetting) -> StoreResult<()> {
        let region = self.require_mut(id)?;
        let flag = flag.to_ascii_lowercase();
        if setting.is_empty() {
            region.flags.remove(&flag);
        } else {
            region.flags.insert(flag, setting);
        }
        Ok(())
    }

    pub fn clear_flag(&mut self, id: &RegionId, flag: &str) -> StoreResult<Option<FlagSetting>> {
        let region = self.require_mut(id)?;
        Ok(region.flags.remove(&flag.to_ascii_lowercase()))
    }

    pub fn owners_mut(&mut self, id: &RegionId) -> StoreResult<&mut Domain> {
        Ok(&mut self.require_mut(id)?.owners)
    }

    pub fn members_mut(&mut self, id: &RegionId) -> StoreResult<&mut Domain> {
        Ok(&mut self.require_mut(id)?.members)
    }

    pub fn add_owner(&mut self, id: &RegionId, actor: ActorId) -> StoreResult<bool> {
        Ok(self.owners_mut(id)?.add_player(actor))
    }

    pub fn remove_owner(&mut self, id: &RegionId, actor: &ActorId) -> StoreResult<bool> {
        Ok(self.owners_mut(id)?.remove_player(actor))
    }

    pub fn add_member(&mut self, id: &RegionId, actor: ActorId) -> StoreResult<bool> {
        Ok(self.members_mut(id)?.add_player(actor))
    }

    pub fn remove_member(&mut self, id: &RegionId, actor: &ActorId) -> StoreResult<bool> {
        Ok(self.members_mut(id)?.remove_player(actor))
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Direct children of a region, sorted by id.
    pub fn list_children(&self, id: &RegionId) -> StoreResult<Vec<&RegionId>> {
        self.require(id)?;
        Ok(self
            .children
            .get(id)
            .map(|c| c.iter().collect())
            .unwrap_or_default())
    }

    /// Parent, grandparent and so on, nearest first. Excludes the region.
    pub fn ancestors(&self, id: &RegionId) -> StoreResult<Vec<&Region>> {
        let region = self.require(id)?;
        Ok(self.lineage(region).skip(1).collect())
    }

    /// The region followed by its ancestors, nearest first.
    pub fn lineage<'a>(&'a self, region: &'a Region) -> impl Iterator<Item = &'a Region> + 'a {
        let limit = self.regions.len().max(1);
        std::iter::successors(Some(region), move |r| {
            r.parent.as_ref().and_then(|p| self.regions.get(p))
        })
        .take(limit)
    }

    /// True when `ancestor` appears strictly above `id` in its lineage.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &RegionId, id: &RegionId) -> bool {
        self.lineage_ids(id).skip(1).any(|a| a == ancestor)
    }

    /// Regions whose shape contains `p`, excluding `__global__`, in
    /// precedence order.
    #[must_use]
    pub fn containing(&self, p: BlockVector) -> Vec<&Region> {
        let mut found: Vec<&Region> = self
            .index
            .query_point(p)
            .filter_map(|id| self.regions.get(id))
            .filter(|r| r.contains(p))
            .collect();
        found.sort_by(|a, b| a.precedence_cmp(b));
        found
    }

    /// Regions sharing at least one block with `shape`, excluding
    /// `__global__`, in definition order.
    #[must_use]
    pub fn intersecting(&self, shape: &Shape) -> Vec<&Region> {
        let mut found: Vec<&Region> = match shape.bounding_box() {
            Some(area) => self
                .index
                .query_box(&area)
                .into_iter()
                .filter_map(|id| self.regions.get(id))
                .filter(|r| r.shape.intersects(shape))
                .collect(),
            None => self.regions.values().filter(|r| !r.is_global()).collect(),
        };
        found.sort_by(|a, b| a.seq.cmp(&b.seq).then_with(|| a.id.cmp(&b.id)));
        found
    }

    /// Number of regions listing `actor` as an owner player.
    #[must_use]
    pub fn count_owned_by(&self, actor: &ActorId) -> usize {
        self.regions
            .values()
            .filter(|r| r.owners.contains_player(actor))
            .count()
    }

    /// How `subject` relates to a region. Owners and members of ancestors
    /// count for the region too.
    #[must_use]
    pub fn membership(&self, region: &Region, subject: &Subject) -> Membership {
        if matches!(subject, Subject::Nobody) {
            return Membership::Unassociated;
        }
        let mut member = false;
        for level in self.lineage(region) {
            if level.owners.contains(subject) {
                return Membership::Owner;
            }
            member |= level.members.contains(subject);
        }
        if member {
            Membership::Member
        } else {
            Membership::NonMember
        }
    }

    // ── Internal ─────────────────────────────────────────────────

    fn take_seq(&mut self, id: &RegionId) -> StoreResult<u64> {
        let seq = self.next_seq;
        self.next_seq = seq.checked_add(1).ok_or_else(|| self.exhausted(id))?;
        Ok(seq)
    }

    fn exhausted(&self, id: &RegionId) -> StoreError {
        StoreError::SequenceExhausted {
            world: self.world.clone(),
            id: id.clone(),
        }
    }

    fn lineage_ids<'a>(&'a self, id: &'a RegionId) -> impl Iterator<Item = &'a RegionId> + 'a {
        let limit = self.regions.len() + 1;
        std::iter::successors(Some(id), move |current| {
            self.regions.get(*current).and_then(|r| r.parent.as_ref())
        })
        .take(limit)
    }

    fn check_new(&self, region: &Region) -> StoreResult<()> {
        if region.world != self.world {
            return Err(StoreError::WorldMismatch {
                expected: self.world.clone(),
                actual: region.world.clone(),
            });
        }
        if region.id.is_global() != region.shape.is_global() {
            return Err(StoreError::GlobalShape(region.id.clone()));
        }
        if self.regions.contains_key(&region.id) {
            return Err(StoreError::DuplicateIdentifier {
                world: self.world.clone(),
                id: region.id.clone(),
            });
        }
        Ok(())
    }

    fn check_parent_target(&self, id: &RegionId, parent: &RegionId) -> StoreResult<()> {
        if id.is_global() {
            return Err(StoreError::GlobalParent(id.clone()));
        }
        if parent.is_global() {
            return Err(StoreError::GlobalParent(parent.clone()));
        }
        if !self.regions.contains_key(parent) {
            return Err(self.not_found(parent));
        }
        Ok(())
    }

    fn require(&self, id: &RegionId) -> StoreResult<&Region> {
        self.regions.get(id).ok_or_else(|| self.not_found(id))
    }

    fn require_mut(&mut self, id: &RegionId) -> StoreResult<&mut Region> {
        let world = self.world.clone();
        self.regions.get_mut(id).ok_or_else(|| StoreError::NotFound {
            world,
            id: id.clone(),
        })
    }

    fn not_found(&self, id: &RegionId) -> StoreError {
        StoreError::NotFound {
            world: self.world.clone(),
            id: id.clone(),
        }
    }
}

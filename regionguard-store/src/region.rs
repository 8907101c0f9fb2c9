//! The region entity.

use crate::domain::Domain;
use regionguard_flags::FlagSetting;
use regionguard_geometry::{BoundingBox, Shape};
use regionguard_types::{ActorId, BlockVector, RegionId, WorldId};
use std::collections::BTreeMap;

/// A named, shaped area of one world carrying flag overrides.
///
/// Build a draft with the `with_*` methods and hand it to
/// [`WorldRegionSet::define`](crate::WorldRegionSet::define). Once defined,
/// a region is changed only through its world set, which keeps the parent
/// links and the spatial index consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) world: WorldId,
    pub(crate) shape: Shape,
    pub(crate) priority: i32,
    pub(crate) owners: Domain,
    pub(crate) members: Domain,
    pub(crate) flags: BTreeMap<String, FlagSetting>,
    pub(crate) parent: Option<RegionId>,
    pub(crate) seq: u64,
}

impl Region {
    #[must_use]
    pub fn new(id: RegionId, world: WorldId, shape: Shape) -> Self {
        Self {
            id,
            world,
            shape,
            priority: 0,
            owners: Domain::new(),
            members: Domain::new(),
            flags: BTreeMap::new(),
            parent: None,
            seq: 0,
        }
    }

    /// The `__global__` region of a world.
    #[must_use]
    pub fn global(world: WorldId) -> Self {
        Self::new(RegionId::global(), world, Shape::Global)
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: RegionId) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, id: ActorId) -> Self {
        self.owners.add_player(id);
        self
    }

    #[must_use]
    pub fn with_member(mut self, id: ActorId) -> Self {
        self.members.add_player(id);
        self
    }

    #[must_use]
    pub fn with_owners(mut self, owners: Domain) -> Self {
        self.owners = owners;
        self
    }

    #[must_use]
    pub fn with_members(mut self, members: Domain) -> Self {
        self.members = members;
        self
    }

    /// Adds a flag setting. Empty settings are ignored.
    #[must_use]
    pub fn with_flag(mut self, name: &str, setting: FlagSetting) -> Self {
        if !setting.is_empty() {
            self.flags.insert(name.to_ascii_lowercase(), setting);
        }
        self
    }

    /// Sets the definition order explicitly; used when restoring stored
    /// regions, otherwise assigned on define.
    #[must_use]
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    #[must_use]
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    #[must_use]
    pub fn world(&self) -> &WorldId {
        &self.world
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn owners(&self) -> &Domain {
        &self.owners
    }

    #[must_use]
    pub fn members(&self) -> &Domain {
        &self.members
    }

    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, FlagSetting> {
        &self.flags
    }

    /// The setting this region stores for `flag`, ignoring ancestors.
    #[must_use]
    pub fn flag(&self, flag: &str) -> Option<&FlagSetting> {
        self.flags.get(flag)
    }

    #[must_use]
    pub fn parent(&self) -> Option<&RegionId> {
        self.parent.as_ref()
    }

    /// Definition order within the world; lower was defined earlier.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.id.is_global()
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.shape.bounding_box()
    }

    #[must_use]
    pub fn contains(&self, p: BlockVector) -> bool {
        self.shape.contains(p)
    }

    /// Precedence order among overlapping regions: higher priority first,
    /// then earlier definition, then id.
    #[must_use]
    pub fn precedence_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then(self.seq.cmp(&other.seq))
            .then_with(|| self.id.cmp(&other.id))
    }
}

use crate::bounds::BoundingBox;
use crate::error::{GeometryError, GeometryResult};
use regionguard_types::BlockVector;

/// An axis-aligned cuboid, half-open on its upper corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cuboid {
    bounds: BoundingBox,
}

impl Cuboid {
    /// Builds a cuboid from corners where `max` is exclusive.
    pub fn new(min: BlockVector, max: BlockVector) -> GeometryResult<Self> {
        Ok(Self {
            bounds: BoundingBox::new(min, max)?,
        })
    }

    /// Builds a cuboid covering every block between two inclusive corners,
    /// the way a player marks a selection.
    pub fn from_blocks(a: BlockVector, b: BlockVector) -> GeometryResult<Self> {
        let min = a.min(b);
        let max = a.max(b);
        let bump = |v: i32| v.checked_add(1).ok_or(GeometryError::CoordinateOverflow);
        let max = BlockVector::new(bump(max.x)?, bump(max.y)?, bump(max.z)?);
        Self::new(min, max)
    }

    #[must_use]
    pub const fn min(&self) -> BlockVector {
        self.bounds.min()
    }

    /// Exclusive upper corner.
    #[must_use]
    pub const fn max(&self) -> BlockVector {
        self.bounds.max()
    }

    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn contains(&self, p: BlockVector) -> bool {
        self.bounds.contains(p)
    }

    #[must_use]
    pub fn volume(&self) -> u64 {
        self.bounds.volume()
    }
}

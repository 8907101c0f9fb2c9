//! Axis-aligned bounding boxes.

use crate::error::{GeometryError, GeometryResult};
use regionguard_types::BlockVector;

/// A half-open axis-aligned box: `min` is inclusive, `max` exclusive.
///
/// Two boxes that share a face (`a.max.x == b.min.x`) do not overlap, so
/// adjacent regions never claim the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    min: BlockVector,
    max: BlockVector,
}

impl BoundingBox {
    /// Builds a box from two opposite corners in any order.
    pub fn new(a: BlockVector, b: BlockVector) -> GeometryResult<Self> {
        let min = a.min(b);
        let max = a.max(b);
        if min.x == max.x || min.y == max.y || min.z == max.z {
            return Err(GeometryError::DegenerateCuboid {
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower corner.
    #[must_use]
    pub const fn min(&self) -> BlockVector {
        self.min
    }

    /// Exclusive upper corner.
    #[must_use]
    pub const fn max(&self) -> BlockVector {
        self.max
    }

    #[must_use]
    pub fn contains(&self, p: BlockVector) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }

    /// True when the boxes share at least one block.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// The shared blocks of two boxes, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Smallest box covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Number of blocks inside the box.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let dx = i64::from(self.max.x) - i64::from(self.min.x);
        let dy = i64::from(self.max.y) - i64::from(self.min.y);
        let dz = i64::from(self.max.z) - i64::from(self.min.z);
        (dx as u64).saturating_mul(dy as u64).saturating_mul(dz as u64)
    }
}

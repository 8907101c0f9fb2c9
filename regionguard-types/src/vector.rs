//! Integer block coordinates.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A block position in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockVector {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockVector {
    pub const ZERO: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Drops the y component.
    #[must_use]
    pub const fn to_2d(self) -> BlockVector2 {
        BlockVector2 { x: self.x, z: self.z }
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Adds `n` to every component, saturating at the `i32` range.
    #[must_use]
    pub fn saturating_offset(self, n: i32) -> Self {
        Self::new(
            self.x.saturating_add(n),
            self.y.saturating_add(n),
            self.z.saturating_add(n),
        )
    }
}

impl fmt::Display for BlockVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Parses `x,y,z` (whitespace around components is ignored).
impl FromStr for BlockVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(Error::InvalidVector(s.to_string()));
        };
        let parse = |v: &str| v.parse::<i32>().map_err(|_| Error::InvalidVector(s.to_string()));
        Ok(Self::new(parse(x)?, parse(y)?, parse(z)?))
    }
}

/// A block column (x/z) used by polygon footprints and the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockVector2 {
    pub x: i32,
    pub z: i32,
}

impl BlockVector2 {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[must_use]
    pub const fn to_3d(self, y: i32) -> BlockVector {
        BlockVector::new(self.x, y, self.z)
    }
}

impl fmt::Display for BlockVector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

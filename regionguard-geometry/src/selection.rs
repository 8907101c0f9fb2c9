//! Conversion from world-edit selections.
//!
//! Selections arrive in the editor's convention: every coordinate is an
//! inclusive block position. Shapes here are half-open, so the upper bounds
//! move up by one block during conversion, and a polygon footprint grows to
//! cover the whole of every block its outline touches.

use crate::cuboid::Cuboid;
use crate::error::{GeometryError, GeometryResult};
use crate::polygon::{Polygon, doubled_area};
use crate::shape::Shape;
use regionguard_types::{BlockVector, BlockVector2};

/// A player's selection as handed over by the world-editing library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Two opposite corner blocks, both included.
    Cuboid { pos1: BlockVector, pos2: BlockVector },
    /// Footprint vertices plus an inclusive height range.
    ///
    /// Vertices are block positions and the blocks on the outline are
    /// inside, so a rectangle selects the same blocks as the cuboid with
    /// the same corners.
    Polygon {
        points: Vec<BlockVector2>,
        min_y: i32,
        max_y: i32,
    },
}

impl TryFrom<Selection> for Shape {
    type Error = GeometryError;

    fn try_from(selection: Selection) -> GeometryResult<Self> {
        match selection {
            Selection::Cuboid { pos1, pos2 } => Ok(Cuboid::from_blocks(pos1, pos2)?.into()),
            Selection::Polygon {
                points,
                min_y,
                max_y,
            } => {
                let (lo, hi) = (min_y.min(max_y), min_y.max(max_y));
                let top = hi.checked_add(1).ok_or(GeometryError::CoordinateOverflow)?;
                Ok(Polygon::new(block_corner_ring(points)?, lo, top)?.into())
            }
        }
    }
}

/// Corners of the unit block square, counter-clockwise.
const CORNERS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// Traces the outline of the footprint swept by a unit block square along
/// the ring of block positions.
///
/// Each edge is shifted to the square corner furthest along its outward
/// normal; at each vertex the ring walks around the square from the
/// previous edge's corner to the next one. Reflex vertices walk backwards
/// and leave a loop the winding rule still counts as inside.
fn block_corner_ring(mut points: Vec<BlockVector2>) -> GeometryResult<Vec<BlockVector2>> {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let area = doubled_area(&points);
    if points.len() < 3 || area == 0 {
        // Left for `Polygon::new` to reject.
        return Ok(points);
    }
    let sign = area.signum() as i64;

    let n = points.len();
    let dir = |i: usize| {
        let (a, b) = (points[i], points[(i + 1) % n]);
        (i64::from(b.x) - i64::from(a.x), i64::from(b.z) - i64::from(a.z))
    };
    let corners: Vec<usize> = (0..n)
        .map(|i| {
            let (dx, dz) = dir(i);
            support_corner(sign * dz, -sign * dx)
        })
        .collect();

    let mut ring = Vec::with_capacity(n * 2);
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let (d1, d2) = (dir(prev), dir(i));
        let step = if d1.0 * d2.1 - d1.1 * d2.0 < 0 { 3 } else { 1 };

        let mut corner = corners[prev];
        loop {
            let (cx, cz) = CORNERS[corner];
            let x = points[i].x.checked_add(cx).ok_or(GeometryError::CoordinateOverflow)?;
            let z = points[i].z.checked_add(cz).ok_or(GeometryError::CoordinateOverflow)?;
            ring.push(BlockVector2::new(x, z));
            if corner == corners[i] {
                break;
            }
            corner = (corner + step) % 4;
        }
    }
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    Ok(ring)
}

/// Index into [`CORNERS`] of the square corner furthest along `(nx, nz)`.
/// Ties on an axis resolve as if the normal were turned slightly clockwise.
fn support_corner(nx: i64, nz: i64) -> usize {
    let east = nx > 0 || (nx == 0 && nz > 0);
    let south = nz > 0 || (nz == 0 && nx < 0);
    match (east, south) {
        (false, false) => 0,
        (true, false) => 1,
        (true, true) => 2,
        (false, true) => 3,
    }
}

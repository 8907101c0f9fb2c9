//! Extruded polygons.
//!
//! Vertices are block-corner coordinates on the x/z plane. A block belongs
//! to the polygon when the centre of its column has a non-zero winding
//! number. All arithmetic runs on doubled coordinates so block centres
//! (`2x + 1`) and vertices (`2v`) are both integers; the centre row of a
//! block can therefore never pass through a vertex, which removes the usual
//! vertex-on-ray special cases.

use crate::bounds::BoundingBox;
use crate::error::{GeometryError, GeometryResult};
use regionguard_types::{BlockVector, BlockVector2};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// An inclusive run of block x coordinates on one z row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: i32,
    pub end: i32,
}

impl Span {
    #[must_use]
    pub fn len(&self) -> u64 {
        (i64::from(self.end) - i64::from(self.start) + 1) as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

pub(crate) type Spans = SmallVec<[Span; 4]>;

/// Where an edge crosses a row centre line, as the fraction `num / den`
/// in doubled coordinates (`den > 0`).
#[derive(Debug, Clone, Copy)]
struct Crossing {
    num: i128,
    den: i128,
    dir: i32,
}

impl Crossing {
    fn cmp_x(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }

    /// True when the crossing lies strictly right of doubled x `xp`.
    fn right_of(&self, xp: i128) -> bool {
        self.num > xp * self.den
    }

    /// Smallest block x whose centre is at or right of the crossing.
    fn first_block_at_or_after(&self) -> i64 {
        // 2x + 1 >= num/den  <=>  x >= (num - den) / (2 den)
        let a = self.num - self.den;
        let b = 2 * self.den;
        let ceil = -((-a).div_euclid(b));
        ceil.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

/// A 2D vertex ring extruded over the half-open height range `[min_y, max_y)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polygon {
    points: Vec<BlockVector2>,
    min_y: i32,
    max_y: i32,
    bounds: BoundingBox,
}

impl Polygon {
    pub fn new(points: Vec<BlockVector2>, min_y: i32, max_y: i32) -> GeometryResult<Self> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewVertices(points.len()));
        }
        if max_y <= min_y {
            return Err(GeometryError::EmptyHeight { min_y, max_y });
        }
        if doubled_area(&points) == 0 {
            return Err(GeometryError::ZeroArea);
        }

        let (mut min, mut max) = (points[0], points[0]);
        for p in &points[1..] {
            min = BlockVector2::new(min.x.min(p.x), min.z.min(p.z));
            max = BlockVector2::new(max.x.max(p.x), max.z.max(p.z));
        }
        let bounds = BoundingBox::new(min.to_3d(min_y), max.to_3d(max_y))?;

        Ok(Self {
            points,
            min_y,
            max_y,
            bounds,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[BlockVector2] {
        &self.points
    }

    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Exclusive upper height.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn contains(&self, p: BlockVector) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }
        let xp = 2 * i128::from(p.x) + 1;
        let winding: i32 = self
            .crossings(p.z)
            .iter()
            .filter(|c| c.right_of(xp))
            .map(|c| c.dir)
            .sum();
        winding != 0
    }

    /// Block x runs inside the footprint on row `z`, sorted and merged.
    pub(crate) fn row_spans(&self, z: i32) -> Spans {
        let mut spans = Spans::new();
        if z < self.bounds.min().z || z >= self.bounds.max().z {
            return spans;
        }

        let mut crossings = self.crossings(z);
        crossings.sort_by(Crossing::cmp_x);

        let mut winding: i32 = crossings.iter().map(|c| c.dir).sum();
        for pair in crossings.windows(2) {
            winding -= pair[0].dir;
            if winding == 0 {
                continue;
            }
            let start = pair[0].first_block_at_or_after();
            let end = pair[1].first_block_at_or_after() - 1;
            if end < start {
                continue;
            }
            let span = Span {
                start: clamp_i32(start),
                end: clamp_i32(end),
            };
            match spans.last_mut() {
                Some(last) if i64::from(span.start) <= i64::from(last.end) + 1 => {
                    last.end = last.end.max(span.end);
                }
                _ => spans.push(span),
            }
        }
        spans
    }

    /// Number of blocks inside the polygon.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let height = (i64::from(self.max_y) - i64::from(self.min_y)) as u64;
        let area: u64 = (self.bounds.min().z..self.bounds.max().z)
            .flat_map(|z| self.row_spans(z))
            .map(|s| s.len())
            .sum();
        area.saturating_mul(height)
    }

    fn crossings(&self, z: i32) -> SmallVec<[Crossing; 8]> {
        let zc = 2 * i128::from(z) + 1;
        let n = self.points.len();
        let mut out = SmallVec::new();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let (x1, z1) = (2 * i128::from(a.x), 2 * i128::from(a.z));
            let (x2, z2) = (2 * i128::from(b.x), 2 * i128::from(b.z));
            if (z1 < zc) == (z2 < zc) {
                continue;
            }
            let mut den = z2 - z1;
            let mut num = x1 * den + (zc - z1) * (x2 - x1);
            let dir = if den > 0 { 1 } else { -1 };
            if den < 0 {
                den = -den;
                num = -num;
            }
            out.push(Crossing { num, den, dir });
        }
        out
    }
}

pub(crate) fn doubled_area(points: &[BlockVector2]) -> i128 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            i128::from(a.x) * i128::from(b.z) - i128::from(b.x) * i128::from(a.z)
        })
        .sum()
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

use crate::bounds::BoundingBox;
use crate::cuboid::Cuboid;
use crate::polygon::{Polygon, Span, Spans};
use regionguard_types::BlockVector;
use std::fmt;

/// Discriminant of a [`Shape`], used in storage records and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cuboid,
    Polygon,
    Global,
}

impl ShapeKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cuboid => "cuboid",
            Self::Polygon => "polygon",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The geometry of a region.
///
/// `Global` covers the whole world and has no bounding box; it is never
/// placed in the spatial index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Cuboid(Cuboid),
    Polygon(Polygon),
    Global,
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Cuboid(_) => ShapeKind::Cuboid,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::Global => ShapeKind::Global,
        }
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    #[must_use]
    pub fn contains(&self, p: BlockVector) -> bool {
        match self {
            Self::Cuboid(c) => c.contains(p),
            Self::Polygon(poly) => poly.contains(p),
            Self::Global => true,
        }
    }

    /// `None` for the unbounded global shape.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Self::Cuboid(c) => Some(c.bounds()),
            Self::Polygon(poly) => Some(poly.bounds()),
            Self::Global => None,
        }
    }

    /// True when at least one block lies inside both shapes.
    #[must_use]
    pub fn intersects(&self, other: &Shape) -> bool {
        let (Some(a), Some(b)) = (self.bounding_box(), other.bounding_box()) else {
            return true;
        };
        let Some(overlap) = a.intersection(&b) else {
            return false;
        };
        if let (Self::Cuboid(_), Self::Cuboid(_)) = (self, other) {
            return true;
        }
        // Height ranges already overlap; sweep the shared rows.
        (overlap.min().z..overlap.max().z)
            .any(|z| spans_overlap(&self.row_spans(z), &other.row_spans(z)))
    }

    /// Number of blocks covered; `u64::MAX` for the global shape.
    #[must_use]
    pub fn volume(&self) -> u64 {
        match self {
            Self::Cuboid(c) => c.volume(),
            Self::Polygon(poly) => poly.volume(),
            Self::Global => u64::MAX,
        }
    }

    fn row_spans(&self, z: i32) -> Spans {
        match self {
            Self::Cuboid(c) => {
                let mut spans = Spans::new();
                if z >= c.min().z && z < c.max().z {
                    spans.push(Span {
                        start: c.min().x,
                        end: c.max().x - 1,
                    });
                }
                spans
            }
            Self::Polygon(poly) => poly.row_spans(z),
            Self::Global => Spans::new(),
        }
    }
}

impl From<Cuboid> for Shape {
    fn from(c: Cuboid) -> Self {
        Self::Cuboid(c)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Self::Polygon(p)
    }
}

fn spans_overlap(a: &[Span], b: &[Span]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].end < b[j].start {
            i += 1;
        } else if b[j].end < a[i].start {
            j += 1;
        } else {
            return true;
        }
    }
    false
}

//! Spatial indexes for neighbor search.
//!
//! The world rebuilds its index from predicted particle positions every
//! substep, then asks it for all particles within the smoothing radius of
//! each particle. Three interchangeable structures are provided; `AnyIndex`
//! picks one at runtime from configuration.

mod quad_tree;
mod rtree;
mod zorder;

pub use quad_tree::QuadTree;
pub use rtree::RTreeIndex;
pub use zorder::{ZOrderIndex, morton};

use crate::math::V2;
use crate::particle::Positioned;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rebuildable point index answering radius queries.
pub trait SpatialIndex<T: Positioned> {
    /// Replace the contents. `extent` is the world size; items outside it
    /// are still indexed.
    fn rebuild(&mut self, items: Vec<T>, extent: V2);

    /// Visit every item whose distance to `point` is at most `radius`.
    fn query_radius(&self, point: V2, radius: f64, f: impl FnMut(&T));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit the regions the index partitions space into (for overlays).
    fn regions(&self, f: impl FnMut(Rect));

    fn kind(&self) -> IndexKind;
}

/// Which spatial index backs a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    QuadTree,
    ZOrder,
    RTree,
}

impl IndexKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKind::QuadTree => "quadtree",
            IndexKind::ZOrder => "zorder",
            IndexKind::RTree => "rtree",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quadtree" | "quad" => Ok(IndexKind::QuadTree),
            "zorder" | "morton" => Ok(IndexKind::ZOrder),
            "rtree" | "rstar" => Ok(IndexKind::RTree),
            other => Err(format!(
                "unknown index `{other}` (expected quadtree, zorder or rtree)"
            )),
        }
    }
}

/// Runtime-selected index.
pub enum AnyIndex<T: Positioned> {
    QuadTree(QuadTree<T>),
    ZOrder(ZOrderIndex<T>),
    RTree(RTreeIndex<T>),
}

impl<T: Positioned> AnyIndex<T> {
    pub fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::QuadTree => AnyIndex::QuadTree(QuadTree::new()),
            IndexKind::ZOrder => AnyIndex::ZOrder(ZOrderIndex::new()),
            IndexKind::RTree => AnyIndex::RTree(RTreeIndex::new()),
        }
    }

    /// Items in Morton order, when backed by a Z-order index.
    pub fn curve(&self) -> Option<impl Iterator<Item = &T>> {
        match self {
            AnyIndex::ZOrder(z) => Some(z.curve()),
            _ => None,
        }
    }
}

impl<T: Positioned> Default for AnyIndex<T> {
    fn default() -> Self {
        Self::new(IndexKind::default())
    }
}

impl<T: Positioned> SpatialIndex<T> for AnyIndex<T> {
    fn rebuild(&mut self, items: Vec<T>, extent: V2) {
        match self {
            AnyIndex::QuadTree(i) => i.rebuild(items, extent),
            AnyIndex::ZOrder(i) => i.rebuild(items, extent),
            AnyIndex::RTree(i) => i.rebuild(items, extent),
        }
    }

    fn query_radius(&self, point: V2, radius: f64, f: impl FnMut(&T)) {
        match self {
            AnyIndex::QuadTree(i) => i.query_radius(point, radius, f),
            AnyIndex::ZOrder(i) => i.query_radius(point, radius, f),
            AnyIndex::RTree(i) => i.query_radius(point, radius, f),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyIndex::QuadTree(i) => i.len(),
            AnyIndex::ZOrder(i) => i.len(),
            AnyIndex::RTree(i) => i.len(),
        }
    }

    fn regions(&self, f: impl FnMut(Rect)) {
        match self {
            AnyIndex::QuadTree(i) => i.regions(f),
            AnyIndex::ZOrder(i) => i.regions(f),
            AnyIndex::RTree(i) => i.regions(f),
        }
    }

    fn kind(&self) -> IndexKind {
        match self {
            AnyIndex::QuadTree(_) => IndexKind::QuadTree,
            AnyIndex::ZOrder(_) => IndexKind::ZOrder,
            AnyIndex::RTree(_) => IndexKind::RTree,
        }
    }
}

/// Smallest rect containing the world extent and every item.
pub(crate) fn covering_rect<T: Positioned>(items: &[T], extent: V2) -> Rect {
    items.iter().fold(
        Rect::new(0.0, 0.0, extent.x.max(0.0), extent.y.max(0.0)),
        |rect, item| {
            let p = item.position();
            if p.is_finite() {
                rect.union_pt(kurbo::Point::from(p))
            } else {
                rect
            }
        },
    )
}

/// Whether a circle overlaps an axis-aligned rect (boundary included).
pub(crate) fn rect_intersects_circle(rect: &Rect, center: V2, radius: f64) -> bool {
    let closest_x = center.x.clamp(rect.x0, rect.x1);
    let closest_y = center.y.clamp(rect.y0, rect.y1);
    let dx = center.x - closest_x;
    let dy = center.y - closest_y;
    dx * dx + dy * dy <= radius * radius
}

//! Bucketed point quad tree.

use super::{IndexKind, SpatialIndex, covering_rect, rect_intersects_circle};
use crate::math::V2;
use crate::particle::Positioned;
use kurbo::Rect;
use smallvec::SmallVec;

/// Items per leaf before it splits.
const BUCKET_SIZE: usize = 8;
/// Leaves at this depth never split, so coincident points cannot recurse forever.
const MAX_DEPTH: u32 = 12;

enum QuadNode<T> {
    Leaf(SmallVec<[T; BUCKET_SIZE]>),
    /// Children in NW, NE, SW, SE order (y grows downward).
    Split(Box<[QuadTree<T>; 4]>),
}

pub struct QuadTree<T> {
    bounds: Rect,
    depth: u32,
    node: QuadNode<T>,
    len: usize,
}

impl<T: Positioned> QuadTree<T> {
    pub fn new() -> Self {
        Self::with_bounds(Rect::ZERO, 0)
    }

    fn with_bounds(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            node: QuadNode::Leaf(SmallVec::new()),
            len: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Depth of the deepest node below (and including) this one.
    pub fn height(&self) -> u32 {
        match &self.node {
            QuadNode::Leaf(_) => self.depth,
            QuadNode::Split(children) => children.iter().map(QuadTree::height).max().unwrap_or(self.depth),
        }
    }

    pub fn insert(&mut self, value: T) {
        self.len += 1;
        match &mut self.node {
            QuadNode::Leaf(items) if items.len() < BUCKET_SIZE || self.depth >= MAX_DEPTH => {
                items.push(value);
            }
            QuadNode::Leaf(items) => {
                let items = std::mem::take(items);
                self.node = QuadNode::Split(Box::new(self.children()));
                for item in items {
                    self.child_for(item.position()).insert(item);
                }
                self.child_for(value.position()).insert(value);
            }
            QuadNode::Split(_) => {
                self.child_for(value.position()).insert(value);
            }
        }
    }

    fn children(&self) -> [QuadTree<T>; 4] {
        let Rect { x0, y0, x1, y1 } = self.bounds;
        let c = self.bounds.center();
        let depth = self.depth + 1;
        [
            QuadTree::with_bounds(Rect::new(x0, y0, c.x, c.y), depth),
            QuadTree::with_bounds(Rect::new(c.x, y0, x1, c.y), depth),
            QuadTree::with_bounds(Rect::new(x0, c.y, c.x, y1), depth),
            QuadTree::with_bounds(Rect::new(c.x, c.y, x1, y1), depth),
        ]
    }

    fn child_for(&mut self, point: V2) -> &mut QuadTree<T> {
        let c = self.bounds.center();
        let slot = match (point.x < c.x, point.y < c.y) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        };
        match &mut self.node {
            QuadNode::Split(children) => &mut children[slot],
            QuadNode::Leaf(_) => unreachable!("child_for on a leaf"),
        }
    }

    fn query_into<F: FnMut(&T)>(&self, point: V2, radius: f64, f: &mut F) {
        if !rect_intersects_circle(&self.bounds, point, radius) {
            return;
        }
        match &self.node {
            QuadNode::Leaf(items) => {
                let r2 = radius * radius;
                for item in items {
                    if (item.position() - point).norm_sqr() <= r2 {
                        f(item);
                    }
                }
            }
            QuadNode::Split(children) => {
                for child in children.iter() {
                    child.query_into(point, radius, f);
                }
            }
        }
    }

    fn leaves_into<F: FnMut(Rect)>(&self, f: &mut F) {
        match &self.node {
            QuadNode::Leaf(items) if !items.is_empty() => f(self.bounds),
            QuadNode::Leaf(_) => {}
            QuadNode::Split(children) => {
                for child in children.iter() {
                    child.leaves_into(f);
                }
            }
        }
    }
}

impl<T: Positioned> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Positioned> SpatialIndex<T> for QuadTree<T> {
    fn rebuild(&mut self, items: Vec<T>, extent: V2) {
        *self = Self::with_bounds(covering_rect(&items, extent), 0);
        for item in items {
            self.insert(item);
        }
    }

    fn query_radius(&self, point: V2, radius: f64, mut f: impl FnMut(&T)) {
        self.query_into(point, radius, &mut f);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn regions(&self, mut f: impl FnMut(Rect)) {
        self.leaves_into(&mut f);
    }

    fn kind(&self) -> IndexKind {
        IndexKind::QuadTree
    }
}

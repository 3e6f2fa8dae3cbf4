//! Bulk-loaded R*-tree backed by `rstar`.

use super::{IndexKind, SpatialIndex};
use crate::math::V2;
use crate::particle::Positioned;
use kurbo::Rect;
use rstar::{AABB, PointDistance, RTree, RTreeNode, RTreeObject};

struct Entry<T> {
    value: T,
    at: [f64; 2],
}

impl<T> RTreeObject for Entry<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.at)
    }
}

impl<T> PointDistance for Entry<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.at[0] - point[0];
        let dy = self.at[1] - point[1];
        dx * dx + dy * dy
    }
}

pub struct RTreeIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T: Positioned> RTreeIndex<T> {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }
}

impl<T: Positioned> Default for RTreeIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn envelope_rect(envelope: &AABB<[f64; 2]>) -> Rect {
    let lower = envelope.lower();
    let upper = envelope.upper();
    Rect::new(lower[0], lower[1], upper[0], upper[1])
}

fn parents_into<T>(node: &RTreeNode<Entry<T>>, f: &mut impl FnMut(Rect)) {
    if let RTreeNode::Parent(parent) = node {
        f(envelope_rect(&parent.envelope()));
        for child in parent.children() {
            parents_into(child, f);
        }
    }
}

impl<T: Positioned> SpatialIndex<T> for RTreeIndex<T> {
    fn rebuild(&mut self, items: Vec<T>, _extent: V2) {
        let entries = items
            .into_iter()
            .map(|value| {
                let p = value.position();
                Entry {
                    value,
                    at: [p.x, p.y],
                }
            })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    fn query_radius(&self, point: V2, radius: f64, mut f: impl FnMut(&T)) {
        for entry in self
            .tree
            .locate_within_distance([point.x, point.y], radius * radius)
        {
            f(&entry.value);
        }
    }

    fn len(&self) -> usize {
        self.tree.size()
    }

    fn regions(&self, mut f: impl FnMut(Rect)) {
        for child in self.tree.root().children() {
            parents_into(child, &mut f);
        }
    }

    fn kind(&self) -> IndexKind {
        IndexKind::RTree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_within_distance_is_exact() {
        let mut index = RTreeIndex::new();
        index.rebuild(
            vec![V2::new(0.0, 0.0), V2::new(3.0, 4.0), V2::new(3.0, 4.1)],
            V2::new(10.0, 10.0),
        );
        let mut hits = Vec::new();
        index.query_radius(V2::ZERO, 5.0, |p| hits.push(*p));
        hits.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(hits, vec![V2::new(0.0, 0.0), V2::new(3.0, 4.0)]);
    }

    #[test]
    fn large_tree_exposes_parent_regions() {
        let mut index = RTreeIndex::new();
        let points: Vec<V2> = (0..500).map(|i| V2::new((i % 25) as f64, (i / 25) as f64)).collect();
        index.rebuild(points, V2::new(25.0, 20.0));
        assert_eq!(index.len(), 500);
        let mut regions = 0;
        index.regions(|_| regions += 1);
        assert!(regions > 0);
    }
}

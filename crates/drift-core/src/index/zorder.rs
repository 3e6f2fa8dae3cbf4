//! Z-order (Morton) index: items sorted along a space-filling curve.
//!
//! A radius query scans the code range between the Morton codes of the
//! query box's corners. Morton codes are monotone in each axis, so every
//! point inside the box falls in that range; points outside it are
//! filtered by exact distance.

use super::{IndexKind, SpatialIndex, covering_rect};
use crate::math::V2;
use crate::particle::Positioned;
use kurbo::Rect;

/// Grid cells per axis.
const GRID_BITS: u32 = 16;
const GRID_MAX: f64 = ((1u32 << GRID_BITS) - 1) as f64;

/// Interleave the bits of `x` (even positions) and `y` (odd positions).
pub fn morton(x: u32, y: u32) -> u64 {
    spread(x) | (spread(y) << 1)
}

fn spread(v: u32) -> u64 {
    let mut v = v as u64;
    v = (v | (v << 16)) & 0x0000_FFFF_0000_FFFF;
    v = (v | (v << 8)) & 0x00FF_00FF_00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333_3333_3333;
    v = (v | (v << 1)) & 0x5555_5555_5555_5555;
    v
}

pub struct ZOrderIndex<T> {
    entries: Vec<(u64, T)>,
    bounds: Rect,
    /// World units per grid cell (square cells).
    cell: f64,
}

impl<T: Positioned> ZOrderIndex<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            bounds: Rect::ZERO,
            cell: 1.0,
        }
    }

    /// Items in curve order.
    pub fn curve(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    fn cell_of(&self, p: V2) -> (u32, u32) {
        let gx = ((p.x - self.bounds.x0) / self.cell).clamp(0.0, GRID_MAX);
        let gy = ((p.y - self.bounds.y0) / self.cell).clamp(0.0, GRID_MAX);
        // NaN clamps to NaN and casts to 0.
        (gx as u32, gy as u32)
    }

    fn code_of(&self, p: V2) -> u64 {
        let (x, y) = self.cell_of(p);
        morton(x, y)
    }
}

impl<T: Positioned> Default for ZOrderIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Positioned> SpatialIndex<T> for ZOrderIndex<T> {
    fn rebuild(&mut self, items: Vec<T>, extent: V2) {
        self.bounds = covering_rect(&items, extent);
        let span = self.bounds.width().max(self.bounds.height());
        self.cell = if span > 0.0 { span / GRID_MAX } else { 1.0 };
        let mut entries: Vec<(u64, T)> = items
            .into_iter()
            .map(|value| (self.code_of(value.position()), value))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        self.entries = entries;
    }

    fn query_radius(&self, point: V2, radius: f64, mut f: impl FnMut(&T)) {
        let lo = self.code_of(V2::new(point.x - radius, point.y - radius));
        let hi = self.code_of(V2::new(point.x + radius, point.y + radius));
        let start = self.entries.partition_point(|(code, _)| *code < lo);
        let end = self.entries.partition_point(|(code, _)| *code <= hi);
        let r2 = radius * radius;
        for (_, value) in &self.entries[start..end.max(start)] {
            if (value.position() - point).norm_sqr() <= r2 {
                f(value);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn regions(&self, mut f: impl FnMut(Rect)) {
        if !self.entries.is_empty() {
            f(self.bounds);
        }
    }

    fn kind(&self) -> IndexKind {
        IndexKind::ZOrder
    }
}

//! Particle world → display list.
//!
//! Paints the background, one circle per particle (faded by speed), the
//! optional index overlay around the pointer, and an optional HUD line.

use crate::scene::{Color, DisplayList, DrawCmd};
use drift_core::{
    AnyIndex, Neighbor, Positioned, QuadTree, RTreeIndex, SpatialIndex, World, ZOrderIndex,
};
use kurbo::{Affine, BezPath, Circle, Point};

/// Speed at which a particle is drawn fully opaque.
const FULL_ALPHA_SPEED: f64 = 50.0;
const MIN_PARTICLE_ALPHA: f64 = 0.3;
const HIGHLIGHT_RADIUS: f64 = 1.0;
const HUD_ORIGIN: Point = Point::new(10.0, 10.0);
const HUD_SIZE: f64 = 12.0;

// ─── Options ─────────────────────────────────────────────────────────────

/// Colors for one rendering target.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// `None` leaves the surface transparent so the page shows through.
    pub background: Option<Color>,
    pub particle: Color,
    pub overlay: Color,
    pub query: Color,
    pub highlight: Color,
    pub hud: Color,
}

impl Theme {
    /// Opaque black background, for standalone images.
    pub fn dark() -> Self {
        Self {
            background: Some(Color::BLACK),
            ..Self::transparent()
        }
    }

    /// Cleared to transparent, for a canvas layered on a page.
    pub fn transparent() -> Self {
        Self {
            background: None,
            particle: Color::WHITE,
            overlay: Color::from_rgba32_u32(0xffff0055),
            query: Color::RED.with_alpha(0.5),
            highlight: Color::RED.with_alpha(0.8),
            hud: Color::WHITE,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaintOptions {
    /// Surface pixels per world unit.
    pub scale: f64,
    /// Screen-space status line, e.g. the last evolve duration.
    pub hud: Option<String>,
    pub theme: Theme,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            hud: None,
            theme: Theme::default(),
        }
    }
}

// ─── Index overlays ──────────────────────────────────────────────────────

/// Visualizes how an index partitions space.
pub trait IndexOverlay {
    fn paint_overlay(&self, color: Color, list: &mut DisplayList);
}

fn stroke_regions<T: Positioned, I: SpatialIndex<T>>(index: &I, color: Color, list: &mut DisplayList) {
    index.regions(|rect| {
        list.push(DrawCmd::StrokeRect {
            rect,
            color,
            width: 1.0,
        })
    });
}

fn stroke_curve<'a, T: Positioned + 'a>(
    mut points: impl Iterator<Item = &'a T>,
    color: Color,
    list: &mut DisplayList,
) {
    let Some(first) = points.next() else {
        return;
    };
    let mut path = BezPath::new();
    path.move_to(Point::from(first.position()));
    for p in points {
        path.line_to(Point::from(p.position()));
    }
    list.push(DrawCmd::StrokePath {
        path,
        color,
        width: 1.0,
    });
}

impl<T: Positioned> IndexOverlay for QuadTree<T> {
    fn paint_overlay(&self, color: Color, list: &mut DisplayList) {
        stroke_regions::<T, _>(self, color, list);
    }
}

impl<T: Positioned> IndexOverlay for RTreeIndex<T> {
    fn paint_overlay(&self, color: Color, list: &mut DisplayList) {
        stroke_regions::<T, _>(self, color, list);
    }
}

impl<T: Positioned> IndexOverlay for ZOrderIndex<T> {
    fn paint_overlay(&self, color: Color, list: &mut DisplayList) {
        stroke_curve(self.curve(), color, list);
    }
}

impl<T: Positioned> IndexOverlay for AnyIndex<T> {
    fn paint_overlay(&self, color: Color, list: &mut DisplayList) {
        match self.curve() {
            Some(curve) => stroke_curve(curve, color, list),
            None => stroke_regions::<T, _>(self, color, list),
        }
    }
}

// ─── World ───────────────────────────────────────────────────────────────

/// Paint one frame of `world`.
pub fn paint_world<I>(world: &World<I>, options: &PaintOptions) -> DisplayList
where
    I: SpatialIndex<Neighbor> + IndexOverlay,
{
    let theme = &options.theme;
    let mut list = DisplayList::with_transform(Affine::scale(options.scale));
    list.push(DrawCmd::Clear {
        color: theme.background,
    });

    let radius = world.config().particle_radius;
    for particle in &world.particles {
        let alpha = (particle.speed() / FULL_ALPHA_SPEED).clamp(MIN_PARTICLE_ALPHA, 1.0);
        list.push(DrawCmd::FillCircle {
            circle: Circle::new(Point::from(particle.position), radius),
            color: theme.particle.with_alpha(alpha),
        });
    }

    if world.show_overlay()
        && let Some(pointer) = world.pointer()
    {
        paint_pointer_overlay(world, pointer.position.into(), theme, &mut list);
    }

    if let Some(text) = &options.hud {
        list.push(DrawCmd::Text {
            origin: HUD_ORIGIN,
            text: text.clone(),
            color: theme.hud,
            size: HUD_SIZE,
        });
    }
    log::trace!("painted {} commands", list.len());
    list
}

fn paint_pointer_overlay<I>(world: &World<I>, pointer: Point, theme: &Theme, list: &mut DisplayList)
where
    I: SpatialIndex<Neighbor> + IndexOverlay,
{
    world.index().paint_overlay(theme.overlay, list);

    let h = world.config().smoothing_radius;
    list.push(DrawCmd::StrokeCircle {
        circle: Circle::new(pointer, h),
        color: theme.query,
        width: 1.0,
    });
    for n in world.neighbors(pointer.into(), h) {
        // Entries past the end come from an index older than the particle list.
        let Some(at) = world.particles.get(n.index).map(|p| p.position) else {
            continue;
        };
        list.push(DrawCmd::FillCircle {
            circle: Circle::new(Point::from(at), HIGHLIGHT_RADIUS),
            color: theme.highlight,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{Particle, V2, WorldConfig};
    use pretty_assertions::assert_eq;

    fn world_with(particles: &[(V2, V2)]) -> World {
        let mut world = World::from_config(V2::new(100.0, 100.0), WorldConfig::default());
        for &(p, v) in particles {
            world.add_particle(Particle::new(p, v));
        }
        world
    }

    #[test]
    fn alpha_follows_speed() {
        let world = world_with(&[
            (V2::new(10.0, 10.0), V2::ZERO),
            (V2::new(20.0, 10.0), V2::new(25.0, 0.0)),
            (V2::new(30.0, 10.0), V2::new(0.0, 500.0)),
        ]);
        let list = paint_world(&world, &PaintOptions::default());
        let alphas: Vec<u8> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillCircle { color, .. } => Some(color.a),
                _ => None,
            })
            .collect();
        assert_eq!(alphas, vec![77, 128, 255]);
    }

    #[test]
    fn clear_comes_first() {
        let world = world_with(&[(V2::new(10.0, 10.0), V2::ZERO)]);
        let list = paint_world(&world, &PaintOptions::default());
        assert_eq!(
            list.commands()[0],
            DrawCmd::Clear {
                color: Some(Color::BLACK)
            }
        );
    }

    #[test]
    fn overlay_needs_flag_and_pointer() {
        let mut world = world_with(&[(V2::new(50.0, 50.0), V2::ZERO)]);
        world.set_pointer(Some(V2::new(50.0, 50.0)), false);
        let plain = paint_world(&world, &PaintOptions::default()).len();
        assert_eq!(plain, 2);

        world.set_show_overlay(true);
        let list = paint_world(&world, &PaintOptions::default());
        let highlights = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillCircle { circle, .. } if circle.radius == HIGHLIGHT_RADIUS))
            .count();
        assert_eq!(highlights, 1);
        assert!(
            list.commands()
                .iter()
                .any(|c| matches!(c, DrawCmd::StrokeCircle { .. }))
        );
    }

    #[test]
    fn overlay_skips_particles_missing_from_a_stale_index() {
        let mut world = world_with(&[
            (V2::new(50.0, 50.0), V2::ZERO),
            (V2::new(52.0, 50.0), V2::ZERO),
        ]);
        world.set_pointer(Some(V2::new(51.0, 50.0)), false);
        world.set_show_overlay(true);
        world.particles.truncate(1);
        let list = paint_world(&world, &PaintOptions::default());
        let highlights = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillCircle { circle, .. } if circle.radius == HIGHLIGHT_RADIUS))
            .count();
        assert_eq!(highlights, 1);
    }

    #[test]
    fn zorder_overlay_is_a_single_path() {
        let config = WorldConfig {
            index: drift_core::IndexKind::ZOrder,
            ..WorldConfig::default()
        };
        let mut world = World::from_config(V2::new(100.0, 100.0), config);
        world.add_particle(Particle::new(V2::new(10.0, 10.0), V2::ZERO));
        world.add_particle(Particle::new(V2::new(90.0, 90.0), V2::ZERO));
        let mut list = DisplayList::new();
        world.index().paint_overlay(Color::WHITE, &mut list);
        assert_eq!(list.len(), 1);
        assert!(matches!(list.commands()[0], DrawCmd::StrokePath { .. }));
    }

    #[test]
    fn hud_is_last() {
        let world = world_with(&[]);
        let options = PaintOptions {
            hud: Some("Evolve: 1.2ms".into()),
            ..PaintOptions::default()
        };
        let list = paint_world(&world, &options);
        assert!(matches!(
            list.commands().last(),
            Some(DrawCmd::Text { text, .. }) if text == "Evolve: 1.2ms"
        ));
    }
}

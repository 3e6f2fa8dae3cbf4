//! Particle world: a bounded box of fluid particles under gravity.
//!
//! Each substep follows a position-based double-density relaxation:
//!
//! 1. accelerate velocities (gravity and the pressed pointer),
//! 2. predict positions and rebuild the spatial index from them,
//! 3. relax predicted positions with pressure and near pressure,
//! 4. keep predictions inside the box,
//! 5. derive velocities from the displacement, bounce off walls,
//! 6. apply viscosity between approaching neighbors.
//!
//! Densities are weighted neighbor counts `Σ (1 - d/h)²` over neighbors
//! closer than the smoothing radius `h`, so `target_density` reads as
//! "about this many close neighbors".

use crate::config::WorldConfig;
use crate::index::{AnyIndex, SpatialIndex};
use crate::math::V2;
use crate::particle::{Particle, Positioned};
use smallvec::SmallVec;

/// Index entry: a particle slot and where it was when the index was built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub position: V2,
}

impl Positioned for Neighbor {
    fn position(&self) -> V2 {
        self.position
    }
}

/// Pointer state fed in by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: V2,
    pub pressed: bool,
}

type NeighborBuf = SmallVec<[usize; 32]>;

pub struct World<I: SpatialIndex<Neighbor> = AnyIndex<Neighbor>> {
    pub particles: Vec<Particle>,
    dimensions: V2,
    config: WorldConfig,
    index: I,
    pointer: Option<Pointer>,
    show_overlay: bool,
    /// Completed `evolve` calls.
    steps: u64,
    /// Neighbor pairs `(i, j)` with `i < j` found in the last relaxation.
    pairs: Vec<(usize, usize)>,
}

impl World<AnyIndex<Neighbor>> {
    /// Build a world whose index kind comes from `config.index`.
    pub fn from_config(dimensions: V2, config: WorldConfig) -> Self {
        let index = AnyIndex::new(config.index);
        Self::with_index(dimensions, config, index)
    }
}

impl<I: SpatialIndex<Neighbor> + Default> World<I> {
    pub fn new(dimensions: V2, config: WorldConfig) -> Self {
        Self::with_index(dimensions, config, I::default())
    }
}

impl<I: SpatialIndex<Neighbor>> World<I> {
    pub fn with_index(dimensions: V2, config: WorldConfig, index: I) -> Self {
        log::debug!(
            "world {}x{} with {} index",
            dimensions.x,
            dimensions.y,
            index.kind()
        );
        Self {
            particles: Vec::new(),
            dimensions,
            config,
            index,
            pointer: None,
            show_overlay: false,
            steps: 0,
            pairs: Vec::new(),
        }
    }

    /// Spawn `n` particles uniformly in the box with velocities in `[-50, 50)`.
    ///
    /// `rng` must yield values in `[0, 1)`.
    pub fn add_random_particles(&mut self, n: usize, mut rng: impl FnMut() -> f64) {
        self.particles.reserve(n);
        for _ in 0..n {
            let x = rng() * self.dimensions.x;
            let y = rng() * self.dimensions.y;
            let vx = rng() * 100.0 - 50.0;
            let vy = rng() * 100.0 - 50.0;
            self.particles.push(Particle::new(V2::new(x, y), V2::new(vx, vy)));
        }
        self.refresh_index();
    }

    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
        self.refresh_index();
    }

    pub fn dimensions(&self) -> V2 {
        self.dimensions
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    /// Move or clear the pointer. Only a pressed pointer exerts force.
    pub fn set_pointer(&mut self, position: Option<V2>, pressed: bool) {
        self.pointer = position.map(|position| Pointer { position, pressed });
    }

    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    pub fn set_show_overlay(&mut self, show: bool) {
        self.show_overlay = show;
    }

    /// Change the box size; particles outside the new box are clamped into it.
    pub fn resize(&mut self, dimensions: V2) {
        log::debug!("world resized to {}x{}", dimensions.x, dimensions.y);
        self.dimensions = dimensions;
        for p in &mut self.particles {
            p.position = p.position.clamp_to(dimensions);
            p.predicted = p.position;
        }
        self.refresh_index();
    }

    /// Advance by `config.time_step`, split into `substeps` equal substeps.
    pub fn evolve(&mut self, substeps: u32) {
        if substeps == 0 {
            return;
        }
        let dt = self.config.time_step / substeps as f64;
        for _ in 0..substeps {
            self.substep(dt);
        }
        // Queries between steps see settled positions, not the last prediction.
        self.refresh_index();
        self.steps += 1;
    }

    /// Advance with the configured substep count.
    pub fn step(&mut self) {
        self.evolve(self.config.substeps);
    }

    /// Index entries within `radius` of `point`.
    pub fn neighbors(&self, point: V2, radius: f64) -> Vec<Neighbor> {
        let mut out = Vec::new();
        self.index.query_radius(point, radius, |n| out.push(*n));
        out
    }

    /// Weighted neighbor count at an arbitrary point.
    pub fn density_at(&self, point: V2) -> f64 {
        let h = self.config.smoothing_radius;
        let mut density = 0.0;
        self.index.query_radius(point, h, |n| {
            let q = n.position.distance(point) / h;
            density += (1.0 - q).powi(2);
        });
        density
    }

    /// Gradient of [`density_at`](Self::density_at): points toward denser fluid.
    pub fn gradient_at(&self, point: V2) -> V2 {
        let h = self.config.smoothing_radius;
        let mut gradient = V2::ZERO;
        self.index.query_radius(point, h, |n| {
            let offset = n.position - point;
            let d = offset.len();
            if d > 0.0 {
                let slope = 2.0 * (1.0 - d / h) / h;
                gradient += offset.scale(slope / d);
            }
        });
        gradient
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| 0.5 * p.velocity.norm_sqr()).sum()
    }

    // ─── Substep ─────────────────────────────────────────────────────────

    fn substep(&mut self, dt: f64) {
        self.apply_external_forces(dt);
        for p in &mut self.particles {
            p.predicted = p.position + p.velocity.scale(dt);
        }
        self.rebuild_index_from_predicted();
        self.relax(dt);
        self.integrate(dt);
        self.apply_viscosity(dt);
    }

    fn apply_external_forces(&mut self, dt: f64) {
        let gravity = self.config.gravity;
        let pull = self.pointer.filter(|p| p.pressed).map(|p| p.position);
        let radius = self.config.interaction_radius;
        let strength = self.config.interaction_strength;
        for p in &mut self.particles {
            let mut accel = gravity;
            if let Some(target) = pull {
                let offset = target - p.position;
                let d = offset.len();
                if d < radius {
                    let falloff = 1.0 - d / radius;
                    // Cancel part of gravity so particles can be lifted.
                    accel = gravity.scale(1.0 - falloff) + offset.normalized().scale(strength * falloff);
                }
            }
            p.velocity += accel.scale(dt);
        }
    }

    fn rebuild_index_from_predicted(&mut self) {
        let entries = self
            .particles
            .iter()
            .enumerate()
            .map(|(index, p)| Neighbor {
                index,
                position: p.predicted,
            })
            .collect();
        self.index.rebuild(entries, self.dimensions);
    }

    /// Rebuild the index from settled positions (after spawning or resizing).
    fn refresh_index(&mut self) {
        for p in &mut self.particles {
            p.predicted = p.position;
        }
        self.rebuild_index_from_predicted();
    }

    /// Double-density relaxation over predicted positions (Gauss-Seidel order).
    fn relax(&mut self, dt: f64) {
        let h = self.config.smoothing_radius;
        let rest = self.config.target_density;
        let k = self.config.pressure_multiplier;
        let k_near = self.config.near_pressure_multiplier;
        let max_shift = h * 0.5;
        let dt2 = dt * dt;

        self.pairs.clear();
        let mut buf = NeighborBuf::new();
        for i in 0..self.particles.len() {
            let pi = self.particles[i].predicted;
            buf.clear();
            self.index.query_radius(pi, h, |n| {
                if n.index != i {
                    buf.push(n.index);
                }
            });

            let mut density = 0.0;
            let mut near_density = 0.0;
            for &j in &buf {
                let q = self.particles[j].predicted.distance(pi) / h;
                if q < 1.0 {
                    let w = 1.0 - q;
                    density += w * w;
                    near_density += w * w * w;
                }
            }
            // Negative pressure would pull isolated pairs together; keep it repulsive.
            let pressure = k * (density - rest).max(0.0);
            let near_pressure = k_near * near_density;

            let mut shift = V2::ZERO;
            for &j in &buf {
                let offset = self.particles[j].predicted - pi;
                let d = offset.len();
                let q = d / h;
                if q >= 1.0 {
                    continue;
                }
                if i < j {
                    self.pairs.push((i, j));
                }
                let w = 1.0 - q;
                let dir = if d > 0.0 {
                    offset.scale(1.0 / d)
                } else {
                    separation_hint(i, j)
                };
                let push = dir.scale(dt2 * (pressure * w + near_pressure * w * w) * 0.5);
                self.particles[j].predicted += push;
                shift -= push;
            }

            let p = &mut self.particles[i];
            p.density = density;
            p.near_density = near_density;
            if shift.len() > max_shift {
                shift = shift.normalized().scale(max_shift);
            }
            p.predicted += shift;
        }
    }

    fn integrate(&mut self, dt: f64) {
        let bounds = self.dimensions;
        let damping = self.config.collision_damping;
        for p in &mut self.particles {
            if !p.predicted.is_finite() {
                log::warn!("non-finite particle position discarded");
                p.predicted = p.position;
                p.velocity = V2::ZERO;
            }
            let clamped = p.predicted.clamp_to(bounds);
            let mut velocity = (clamped - p.position).scale(1.0 / dt);
            if clamped.x != p.predicted.x {
                velocity.x = bounce(p.velocity.x, damping);
            }
            if clamped.y != p.predicted.y {
                velocity.y = bounce(p.velocity.y, damping);
            }
            p.position = clamped;
            p.predicted = clamped;
            p.velocity = velocity;
        }
    }

    fn apply_viscosity(&mut self, dt: f64) {
        let sigma = self.config.viscosity;
        if sigma == 0.0 {
            return;
        }
        let h = self.config.smoothing_radius;
        for &(i, j) in &self.pairs {
            let offset = self.particles[j].position - self.particles[i].position;
            let d = offset.len();
            if d <= 0.0 || d >= h {
                continue;
            }
            let dir = offset.scale(1.0 / d);
            let approach = (self.particles[i].velocity - self.particles[j].velocity).dot(dir);
            if approach > 0.0 {
                let impulse = dir.scale((dt * (1.0 - d / h) * sigma * approach * 0.5).min(approach * 0.5));
                self.particles[i].velocity -= impulse;
                self.particles[j].velocity += impulse;
            }
        }
    }
}

/// Reverse a wall-bound velocity component, keeping `damping` of its speed.
fn bounce(v: f64, damping: f64) -> f64 {
    -v * damping
}

/// Deterministic direction for particles sharing a position.
fn separation_hint(i: usize, j: usize) -> V2 {
    let angle = (i.wrapping_mul(7919) ^ j) as f64;
    V2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{QuadTree, RTreeIndex, ZOrderIndex};

    fn calm() -> WorldConfig {
        WorldConfig {
            gravity: V2::ZERO,
            viscosity: 0.0,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn zero_substeps_is_noop() {
        let mut world: World = World::from_config(V2::new(100.0, 100.0), WorldConfig::default());
        world.add_particle(Particle::new(V2::new(50.0, 50.0), V2::new(1.0, 0.0)));
        world.evolve(0);
        assert_eq!(world.particles[0].position, V2::new(50.0, 50.0));
        assert_eq!(world.steps(), 0);
    }

    #[test]
    fn free_fall_gains_gravity_times_step() {
        let config = WorldConfig::default();
        let mut world: World<QuadTree<Neighbor>> = World::new(V2::new(100.0, 1000.0), config.clone());
        world.add_particle(Particle::new(V2::new(50.0, 10.0), V2::ZERO));
        world.evolve(4);
        let v = world.particles[0].velocity;
        assert!((v.y - config.gravity.y * config.time_step).abs() < 1e-9, "vy = {}", v.y);
        assert!(world.particles[0].position.y > 10.0);
    }

    #[test]
    fn overlapping_particles_separate() {
        let mut world: World<ZOrderIndex<Neighbor>> = World::new(V2::new(100.0, 100.0), calm());
        world.add_particle(Particle::new(V2::new(50.0, 50.0), V2::ZERO));
        world.add_particle(Particle::new(V2::new(51.0, 50.0), V2::ZERO));
        world.evolve(4);
        let d = world.particles[0].position.distance(world.particles[1].position);
        assert!(d > 1.0, "distance {d} should grow");
    }

    #[test]
    fn coincident_particles_separate() {
        let mut world: World<RTreeIndex<Neighbor>> = World::new(V2::new(100.0, 100.0), calm());
        world.add_particle(Particle::new(V2::new(20.0, 20.0), V2::ZERO));
        world.add_particle(Particle::new(V2::new(20.0, 20.0), V2::ZERO));
        world.evolve(4);
        assert_ne!(world.particles[0].position, world.particles[1].position);
    }

    #[test]
    fn wall_bounce_reverses_and_damps() {
        let mut world: World = World::from_config(V2::new(100.0, 100.0), calm());
        world.add_particle(Particle::new(V2::new(99.9, 50.0), V2::new(60.0, 0.0)));
        world.evolve(1);
        let p = &world.particles[0];
        assert_eq!(p.position.x, 100.0);
        assert!((p.velocity.x + 60.0 * 0.8).abs() < 1e-9, "vx = {}", p.velocity.x);
    }

    #[test]
    fn pressed_pointer_pulls_particles_in() {
        let mut world: World = World::from_config(V2::new(200.0, 200.0), calm());
        world.add_particle(Particle::new(V2::new(100.0, 100.0), V2::ZERO));
        world.set_pointer(Some(V2::new(110.0, 100.0)), true);
        world.evolve(4);
        assert!(world.particles[0].position.x > 100.0);

        let mut idle: World = World::from_config(V2::new(200.0, 200.0), calm());
        idle.add_particle(Particle::new(V2::new(100.0, 100.0), V2::ZERO));
        idle.set_pointer(Some(V2::new(110.0, 100.0)), false);
        idle.evolve(4);
        assert_eq!(idle.particles[0].position, V2::new(100.0, 100.0));
    }

    #[test]
    fn density_and_gradient_follow_cluster() {
        let mut world: World = World::from_config(V2::new(100.0, 100.0), calm());
        for i in 0..5 {
            world.add_particle(Particle::new(V2::new(30.0 + i as f64, 30.0), V2::ZERO));
        }
        assert!(world.density_at(V2::new(32.0, 30.0)) > world.density_at(V2::new(80.0, 80.0)));
        let g = world.gradient_at(V2::new(25.0, 30.0));
        assert!(g.x > 0.0, "gradient {g:?} should point toward the cluster");
    }

    #[test]
    fn resize_clamps_particles() {
        let mut world: World = World::from_config(V2::new(100.0, 100.0), calm());
        world.add_particle(Particle::new(V2::new(90.0, 90.0), V2::ZERO));
        world.resize(V2::new(50.0, 60.0));
        assert_eq!(world.particles[0].position, V2::new(50.0, 60.0));
        assert_eq!(world.neighbors(V2::new(50.0, 60.0), 0.5).len(), 1);
    }
}

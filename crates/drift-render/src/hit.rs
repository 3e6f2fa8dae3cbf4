//! Hit testing: point → particle lookup.

use drift_core::{Neighbor, SpatialIndex, V2, World};

/// Index of the particle closest to `point` within `radius`.
///
/// Candidates come from the spatial index; distances are measured against
/// current particle positions. Ties go to the lower index.
pub fn pick_particle<I: SpatialIndex<Neighbor>>(
    world: &World<I>,
    point: V2,
    radius: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    world.index().query_radius(point, radius, |n| {
        let Some(particle) = world.particles.get(n.index) else {
            return;
        };
        let d = particle.position.distance(point);
        if d > radius {
            return;
        }
        let closer = match best {
            Some((index, best_d)) => d < best_d || (d == best_d && n.index < index),
            None => true,
        };
        if closer {
            best = Some((n.index, d));
        }
    });
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{Particle, WorldConfig};

    fn world() -> World {
        let mut world = World::from_config(V2::new(100.0, 100.0), WorldConfig::default());
        world.add_particle(Particle::new(V2::new(10.0, 10.0), V2::ZERO));
        world.add_particle(Particle::new(V2::new(14.0, 10.0), V2::ZERO));
        world.add_particle(Particle::new(V2::new(60.0, 60.0), V2::ZERO));
        world
    }

    #[test]
    fn picks_closest() {
        assert_eq!(pick_particle(&world(), V2::new(13.0, 10.0), 5.0), Some(1));
        assert_eq!(pick_particle(&world(), V2::new(11.0, 10.0), 5.0), Some(0));
    }

    #[test]
    fn tie_goes_to_lower_index() {
        assert_eq!(pick_particle(&world(), V2::new(12.0, 10.0), 5.0), Some(0));
    }

    #[test]
    fn truncated_particles_are_skipped() {
        let mut world = world();
        world.particles.truncate(1);
        assert_eq!(pick_particle(&world, V2::new(60.0, 60.0), 5.0), None);
        assert_eq!(pick_particle(&world, V2::new(13.0, 10.0), 5.0), Some(0));
    }

    #[test]
    fn background_is_none() {
        assert_eq!(pick_particle(&world(), V2::new(90.0, 10.0), 5.0), None);
    }
}

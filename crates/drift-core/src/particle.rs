use crate::math::V2;

/// Anything with a location in world space. Spatial indexes store these.
pub trait Positioned {
    fn position(&self) -> V2;
}

impl Positioned for V2 {
    fn position(&self) -> V2 {
        *self
    }
}

/// One fluid particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: V2,
    pub velocity: V2,
    /// Look-ahead position used for neighbor search within a substep.
    pub predicted: V2,
    pub density: f64,
    pub near_density: f64,
}

impl Particle {
    pub fn new(position: V2, velocity: V2) -> Self {
        Self {
            position,
            velocity,
            predicted: position,
            density: 0.0,
            near_density: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.len()
    }
}

impl Positioned for Particle {
    fn position(&self) -> V2 {
        self.position
    }
}

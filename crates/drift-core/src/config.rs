//! World configuration.
//!
//! Every field has a default, so a JSON file only needs to name the values
//! it changes. Two presets exist: [`WorldConfig::default`] for the native
//! runner and [`WorldConfig::browser`] for the canvas bridge.

use crate::index::IndexKind;
use crate::math::V2;
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Particles spawned at construction.
    pub particle_count: usize,

    /// Constant acceleration, world units / s².
    pub gravity: V2,

    /// Simulated seconds per `evolve` call, split evenly across substeps.
    pub time_step: f64,

    /// Substeps per `evolve` call.
    pub substeps: u32,

    /// Neighbor cut-off for density and pressure.
    pub smoothing_radius: f64,

    /// Rest density (weighted neighbor count) the pressure pushes toward.
    pub target_density: f64,

    /// Pressure stiffness, 1/s².
    pub pressure_multiplier: f64,

    /// Short-range repulsion keeping particles from clumping, 1/s².
    pub near_pressure_multiplier: f64,

    /// Linear viscosity between approaching neighbors, 1/s.
    pub viscosity: f64,

    /// Fraction of speed kept after bouncing off a wall.
    pub collision_damping: f64,

    /// Pointer influence radius.
    pub interaction_radius: f64,

    /// Pointer acceleration at the center of the influence radius.
    pub interaction_strength: f64,

    /// Drawn radius of a particle.
    pub particle_radius: f64,

    pub index: IndexKind,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            gravity: V2::new(0.0, 100.0),
            time_step: 1.0 / 60.0,
            substeps: 4,
            smoothing_radius: 8.0,
            target_density: 3.0,
            pressure_multiplier: 4000.0,
            near_pressure_multiplier: 8000.0,
            viscosity: 20.0,
            collision_damping: 0.8,
            interaction_radius: 30.0,
            interaction_strength: 400.0,
            particle_radius: 2.0,
            index: IndexKind::QuadTree,
        }
    }
}

impl WorldConfig {
    /// Settings for the canvas bridge: a light world on a full-page canvas.
    pub fn browser() -> Self {
        Self {
            particle_count: 100,
            gravity: V2::new(0.0, 10.0),
            index: IndexKind::RTree,
            smoothing_radius: 24.0,
            interaction_radius: 80.0,
            ..Self::default()
        }
    }

    /// Parse a JSON config, then validate it.
    ///
    /// # Errors
    /// Returns a message for malformed JSON, unknown fields, or invalid values.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: WorldConfig =
            serde_json::from_str(json).map_err(|e| format!("invalid world config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Reject values the physics cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("time_step", self.time_step),
            ("smoothing_radius", self.smoothing_radius),
            ("interaction_radius", self.interaction_radius),
            ("particle_radius", self.particle_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        let finite = [
            ("target_density", self.target_density),
            ("pressure_multiplier", self.pressure_multiplier),
            ("near_pressure_multiplier", self.near_pressure_multiplier),
            ("viscosity", self.viscosity),
            ("interaction_strength", self.interaction_strength),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if !self.gravity.is_finite() {
            return Err("gravity must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.collision_damping) {
            return Err(format!(
                "collision_damping must be within 0..=1, got {}",
                self.collision_damping
            ));
        }
        if self.substeps == 0 {
            return Err("substeps must be at least 1".to_string());
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        assert!(WorldConfig::default().validate().is_ok());
        assert!(WorldConfig::browser().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = WorldConfig::from_json(r#"{ "particle_count": 10, "index": "zorder" }"#)
            .expect("config should parse");
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.index, IndexKind::ZOrder);
        assert_eq!(config.gravity, WorldConfig::default().gravity);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = WorldConfig::from_json(r#"{ "particles": 10 }"#).unwrap_err();
        assert!(err.contains("unknown field"), "got: {err}");
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = WorldConfig::from_json(r#"{ "smoothing_radius": -1.0 }"#).unwrap_err();
        assert!(err.contains("smoothing_radius"), "got: {err}");
    }

    #[test]
    fn zero_substeps_is_rejected() {
        let err = WorldConfig::from_json(r#"{ "substeps": 0 }"#).unwrap_err();
        assert!(err.contains("substeps"), "got: {err}");
    }
}

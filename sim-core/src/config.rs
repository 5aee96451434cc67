//! Simulation configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the nearest-attached search treats particles that attach during the
/// same step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Search only the particles that were attached when the step began.
    /// New attachments are merged once every free particle has been processed,
    /// so the processing order never changes the outcome.
    #[default]
    StepSnapshot,
    /// Search the live set: a particle attached earlier in the pass is
    /// immediately a target (with its grown radius) for later particles.
    LiveScan,
}

/// Reasons a [`Config`] is rejected at construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("particle_radius must be positive and finite, got {0}")]
    ParticleRadius(f32),
    #[error("attraction_range must be non-negative and finite, got {0}")]
    AttractionRange(f32),
    #[error("boundary must be positive and finite, got {0}")]
    Boundary(f32),
    #[error("attach_threshold_factor must lie in (0, 1], got {0}")]
    AttachThresholdFactor(f32),
    /// A rate or magnitude that must be non-negative was not.
    #[error("{name} must be non-negative and finite, got {value}")]
    NegativeMagnitude { name: &'static str, value: f32 },
    /// A half-width whose full sampling range `2 * value` overflows `f32`.
    #[error("{name} is too large to sample from, got {value}")]
    UnsampleableRange { name: &'static str, value: f32 },
    #[error("particle {index} lies outside the boundary of {boundary}")]
    OutOfBounds { index: usize, boundary: f32 },
    #[error("particle {index} has a non-finite position or velocity")]
    NonFiniteParticle { index: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of free particles; the seed is added on top.
    pub particle_count: usize,
    /// Initial radius of free particles. The seed starts at twice this.
    pub particle_radius: f32,
    /// Nearest-attached distance below which a free particle feels attraction.
    pub attraction_range: f32,
    /// Radius gained once, at the moment a particle attaches.
    pub growth_increment: f32,
    /// Half-width of the uniform per-axis velocity perturbation applied each step.
    pub brownian_scale: f32,
    /// Velocity added per step toward the nearest attached particle.
    pub attraction_force: f32,
    /// Half-width of the cubic domain.
    pub boundary: f32,
    /// Fraction of the summed radii below which contact counts as attachment.
    pub attach_threshold_factor: f32,
    /// Half-width of the uniform per-axis initial velocity range.
    pub initial_speed: f32,
    /// RNG seed. `None` draws one from entropy.
    pub seed: Option<u64>,
    pub neighbor_policy: NeighborPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: 200,
            particle_radius: 0.02,
            attraction_range: 0.15,
            growth_increment: 0.005,
            brownian_scale: 0.05,
            attraction_force: 0.0005,
            boundary: 1.0,
            attach_threshold_factor: 0.9,
            initial_speed: 0.001,
            seed: None,
            neighbor_policy: NeighborPolicy::StepSnapshot,
        }
    }
}

impl Config {
    /// Checks every value against its domain.
    ///
    /// ### Returns
    /// - `Ok(())` if a simulator can be built from this configuration and
    ///   stepped without failing.
    /// - `Err` naming the first offending field otherwise.
    ///
    /// An `attraction_range` of exactly `0.0` is accepted: it switches off
    /// attraction and, with it, attachment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.particle_radius.is_finite() && self.particle_radius > 0.0) {
            return Err(ConfigError::ParticleRadius(self.particle_radius));
        }
        if !(self.attraction_range.is_finite() && self.attraction_range >= 0.0) {
            return Err(ConfigError::AttractionRange(self.attraction_range));
        }
        if !(self.boundary.is_finite() && self.boundary > 0.0) {
            return Err(ConfigError::Boundary(self.boundary));
        }
        if !(self.attach_threshold_factor > 0.0 && self.attach_threshold_factor <= 1.0) {
            return Err(ConfigError::AttachThresholdFactor(
                self.attach_threshold_factor,
            ));
        }

        let magnitudes = [
            ("growth_increment", self.growth_increment),
            ("brownian_scale", self.brownian_scale),
            ("attraction_force", self.attraction_force),
            ("initial_speed", self.initial_speed),
        ];
        for (name, value) in magnitudes {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeMagnitude { name, value });
            }
        }

        // Both are sampled as `-v..=v`, whose width must stay finite.
        let half_widths = [
            ("brownian_scale", self.brownian_scale),
            ("initial_speed", self.initial_speed),
        ];
        for (name, value) in half_widths {
            if !(2.0 * value).is_finite() {
                return Err(ConfigError::UnsampleableRange { name, value });
            }
        }
        Ok(())
    }

    /// Radius of the seed particle.
    #[inline]
    pub fn seed_radius(&self) -> f32 {
        self.particle_radius * 2.0
    }

    /// Half-width of the cube free particles are spawned in.
    ///
    /// Spawning happens in `[-1, 1]³`, shrunk to the boundary when the domain
    /// is smaller so every particle starts inside it.
    #[inline]
    pub fn spawn_half_extent(&self) -> f32 {
        self.boundary.min(1.0)
    }
}

//! The aggregation simulator: owns the particles and advances them.

use crate::{
    attachment::AttachmentMask,
    config::{Config, ConfigError},
    particle::{Particle, ParticleSet, ParticleView},
    phases,
    types::ParticleId,
};
use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

/// Diffusion-limited aggregation around a single seed.
///
/// The simulator exclusively owns its particles. Callers advance it with
/// [`Simulator::step`] and read it back through [`Simulator::snapshot`] or
/// the other read-only accessors; there is no way to obtain mutable access to
/// a particle from outside.
///
/// The population is fixed at construction: one seed at index `0` plus the
/// free particles, none ever added or removed.
#[derive(Debug)]
pub struct Simulator {
    particles: ParticleSet,
    mask: AttachmentMask,
    cfg: Config,
    rng: StdRng,
    seed: u64,
    tick: u64,
    last_attached: Vec<ParticleId>,
}

impl Simulator {
    /// Validates `cfg` and builds a simulator with `cfg.particle_count` free
    /// particles spread uniformly through the spawn cube.
    ///
    /// The RNG is seeded from `cfg.seed`, or from entropy when it is `None`.
    /// The seed in use is available from [`Simulator::seed`].
    ///
    /// ### Parameters
    /// - `cfg` - Simulation parameters; kept for the simulator's lifetime.
    ///
    /// ### Returns
    /// - `Ok` with a simulator at tick `0`.
    /// - `Err` if [`Config::validate`] rejects `cfg`.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let seed = cfg.seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = ParticleSet::random_in_cube(&cfg, &mut rng);

        Ok(Self::assemble(particles, cfg, rng, seed))
    }

    /// Builds a simulator whose free particles start at the given
    /// `(position, velocity)` pairs instead of random ones.
    ///
    /// `cfg.particle_count` is ignored in favour of `free.len()`.
    ///
    /// ### Parameters
    /// - `cfg` - Simulation parameters.
    /// - `free` - `(position, velocity)` of each free particle. Every
    ///   component must be finite and every position inside the domain.
    ///
    /// ### Returns
    /// - `Ok` with a simulator at tick `0`.
    /// - `Err` if `cfg` is invalid, or with the index into `free` of the
    ///   first particle that is non-finite or out of bounds.
    pub fn from_free_particles(cfg: Config, free: Vec<(Vec3, Vec3)>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        if let Some(index) = free
            .iter()
            .position(|(pos, vel)| !pos.is_finite() || !vel.is_finite())
        {
            return Err(ConfigError::NonFiniteParticle { index });
        }
        if let Some(index) = free
            .iter()
            .position(|(pos, _)| pos.abs().max_element() > cfg.boundary)
        {
            return Err(ConfigError::OutOfBounds {
                index,
                boundary: cfg.boundary,
            });
        }

        let seed = cfg.seed.unwrap_or_else(rand::random::<u64>);
        let rng = StdRng::seed_from_u64(seed);
        let particles = ParticleSet::from_free(cfg.seed_radius(), cfg.particle_radius, free);
        let cfg = Config {
            particle_count: particles.len() - 1,
            ..cfg
        };

        Ok(Self::assemble(particles, cfg, rng, seed))
    }

    fn assemble(particles: ParticleSet, cfg: Config, rng: StdRng, seed: u64) -> Self {
        info!(
            seed,
            particles = cfg.particle_count,
            policy = ?cfg.neighbor_policy,
            "aggregation simulator initialized"
        );

        Self {
            mask: AttachmentMask::capture(&particles),
            particles,
            cfg,
            rng,
            seed,
            tick: 0,
            last_attached: Vec::new(),
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Captures which particles are attached, runs
    /// [`phases::motion_phase`] and then [`phases::interaction_phase`]
    /// against that capture. The ids attached during this tick are kept
    /// for [`Simulator::last_attached`].
    pub fn step(&mut self) {
        self.mask.recapture(&self.particles);
        phases::motion_phase(&mut self.particles, &self.cfg, &mut self.rng);
        self.last_attached = phases::interaction_phase(&mut self.particles, &mut self.mask, &self.cfg);
        self.tick += 1;

        if !self.last_attached.is_empty() {
            debug!(
                tick = self.tick,
                ids = ?self.last_attached,
                attached = self.attached_count(),
                "particles joined the cluster"
            );
        }
    }

    /// Advances the simulation by `n` ticks.
    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Position, radius and attachment flag of every particle, seed first.
    pub fn snapshot(&self) -> Vec<ParticleView> {
        self.particles.as_slice().iter().map(Particle::view).collect()
    }

    /// Full read-only particle state, velocities included.
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// Configuration the simulator was built with.
    ///
    /// After [`Simulator::from_free_particles`], `particle_count` reflects
    /// the number of particles actually supplied.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Seed the RNG was initialized with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of attached particles, seed included.
    pub fn attached_count(&self) -> usize {
        self.particles.attached_count()
    }

    /// Number of particles still drifting.
    pub fn free_count(&self) -> usize {
        self.particles.len() - self.attached_count()
    }

    /// Ids attached during the most recent step.
    pub fn last_attached(&self) -> &[ParticleId] {
        &self.last_attached
    }
}

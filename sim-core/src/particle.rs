use crate::config::Config;
use glam::Vec3;
use rand::Rng;

/// One sphere in the simulation, either drifting freely or part of the cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Center, always inside the cubic domain.
    pub pos: Vec3,
    /// Displacement applied per step. Exactly zero once attached.
    pub vel: Vec3,
    /// Grows once, when the particle attaches.
    pub radius: f32,
    /// `true` once the particle has joined the cluster; never reverts.
    pub attached: bool,
}

/// Read-only record of one particle as handed to renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
    pub pos: Vec3,
    pub radius: f32,
    pub attached: bool,
}

impl Particle {
    /// Creates the cluster seed: attached, at rest at the origin.
    ///
    /// ### Parameters
    /// - `radius` - Radius of the seed sphere.
    pub fn seed(radius: f32) -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            radius,
            attached: true,
        }
    }

    /// Creates a free particle.
    ///
    /// ### Parameters
    /// - `pos` - Initial position.
    /// - `vel` - Initial velocity (displacement per step).
    /// - `radius` - Radius before attachment.
    pub fn free(pos: Vec3, vel: Vec3, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            attached: false,
        }
    }

    /// Joins the cluster: grows once by `growth` and stops moving.
    pub fn attach(&mut self, growth: f32) {
        debug_assert!(!self.attached, "particle attached twice");
        self.attached = true;
        self.radius += growth;
        self.vel = Vec3::ZERO;
    }

    /// Copies the fields a renderer needs.
    pub fn view(&self) -> ParticleView {
        ParticleView {
            pos: self.pos,
            radius: self.radius,
            attached: self.attached,
        }
    }
}

/// Fixed population of one seed (index [`crate::types::SEED_ID`]) plus free particles.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    /// Builds a set from explicit free particle states.
    ///
    /// ### Parameters
    /// - `seed_radius` - Radius of the seed placed at index [`crate::types::SEED_ID`].
    /// - `free_radius` - Radius given to every free particle.
    /// - `free` - `(position, velocity)` pairs, one per free particle, in
    ///   id order starting at `1`.
    ///
    /// ### Returns
    /// A set of `free.len() + 1` particles.
    pub fn from_free(seed_radius: f32, free_radius: f32, free: Vec<(Vec3, Vec3)>) -> Self {
        let mut particles = Vec::with_capacity(free.len() + 1);
        particles.push(Particle::seed(seed_radius));
        particles.extend(
            free.into_iter()
                .map(|(pos, vel)| Particle::free(pos, vel, free_radius)),
        );

        Self { particles }
    }

    /// Seed at the origin plus `cfg.particle_count` free particles placed
    /// uniformly in the spawn cube with small uniform velocities.
    ///
    /// ### Parameters
    /// - `cfg` - A validated configuration; it supplies the count, radii,
    ///   spawn extent and initial speed.
    /// - `rng` - Source of randomness. Each particle draws three position
    ///   components, then three velocity components.
    pub fn random_in_cube(cfg: &Config, rng: &mut impl Rng) -> Self {
        let h = cfg.spawn_half_extent();
        let s = cfg.initial_speed;
        let free = (0..cfg.particle_count)
            .map(|_| {
                let pos = Vec3::new(
                    rng.random_range(-h..=h),
                    rng.random_range(-h..=h),
                    rng.random_range(-h..=h),
                );
                let vel = Vec3::new(
                    rng.random_range(-s..=s),
                    rng.random_range(-s..=s),
                    rng.random_range(-s..=s),
                );
                (pos, vel)
            })
            .collect();

        Self::from_free(cfg.seed_radius(), cfg.particle_radius, free)
    }

    /// Number of particles, seed included. Never zero.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn attached_count(&self) -> usize {
        self.particles.iter().filter(|p| p.attached).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SEED_ID;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn from_free_puts_seed_first() {
        let set = ParticleSet::from_free(
            0.04,
            0.02,
            vec![(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.1, 0.0))],
        );

        assert_eq!(set.len(), 2);
        let seed = set.as_slice()[SEED_ID];
        assert_eq!(seed.pos, Vec3::ZERO);
        assert_eq!(seed.vel, Vec3::ZERO);
        assert_eq!(seed.radius, 0.04);
        assert!(seed.attached);

        let p = set.as_slice()[1];
        assert_eq!(p.pos, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(p.vel, Vec3::new(0.0, 0.1, 0.0));
        assert_eq!(p.radius, 0.02);
        assert!(!p.attached);
    }

    #[test]
    fn random_in_cube_respects_count_and_ranges() {
        let mut cfg = Config::default();
        cfg.particle_count = 500;
        cfg.boundary = 0.5;
        let mut rng = StdRng::seed_from_u64(7);

        let set = ParticleSet::random_in_cube(&cfg, &mut rng);

        assert_eq!(set.len(), 501);
        assert_eq!(set.attached_count(), 1);
        for p in &set.as_slice()[1..] {
            assert!(p.pos.abs().max_element() <= 0.5);
            assert!(p.vel.abs().max_element() <= cfg.initial_speed);
            assert_eq!(p.radius, cfg.particle_radius);
            assert!(!p.attached);
        }
    }

    #[test]
    fn random_in_cube_is_deterministic_for_a_seed() {
        let cfg = Config::default();
        let a = ParticleSet::random_in_cube(&cfg, &mut StdRng::seed_from_u64(3));
        let b = ParticleSet::random_in_cube(&cfg, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn attach_grows_once_and_stops_motion() {
        let mut p = Particle::free(Vec3::ONE, Vec3::new(0.1, -0.2, 0.3), 0.02);
        p.attach(0.005);

        assert!(p.attached);
        assert_eq!(p.radius, 0.02 + 0.005);
        assert_eq!(p.vel, Vec3::ZERO);
        assert_eq!(p.pos, Vec3::ONE);
    }
}

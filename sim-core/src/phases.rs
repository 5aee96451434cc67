//! Per-step phases of the aggregation simulation.
//!
//! A step runs:
//! 1. [`motion_phase`] — every free particle receives a Brownian velocity
//!    kick, moves by its velocity and soft-bounces off the domain walls.
//! 2. [`interaction_phase`] — every free particle looks up its nearest
//!    cluster member, is pulled toward it when in range and attaches when
//!    close enough.
//!
//! Running all motion before any interaction gives the same result as
//! handling each particle start to finish: attached particles never move,
//! and the search only ever looks at attached particles.

use crate::{
    attachment::AttachmentMask,
    config::{Config, NeighborPolicy},
    neighbors::nearest_attached,
    particle::ParticleSet,
    types::ParticleId,
};
use glam::Vec3;
use rand::Rng;

/// Moves every free particle one tick.
///
/// For each free particle:
///
/// 1. Adds a uniform draw from `[-cfg.brownian_scale, cfg.brownian_scale]`
///    to each velocity axis independently.
/// 2. Adds the velocity to the position.
/// 3. Clamps each axis to `[-cfg.boundary, cfg.boundary]`. An axis that had
///    to be clamped has its velocity component reversed and halved.
///
/// Attached particles are left untouched and consume no randomness.
///
/// ### Parameters
/// - `particles` - The particle set; free particles are moved in place.
/// - `cfg` - Supplies `brownian_scale` and `boundary`.
/// - `rng` - Source of the Brownian kicks, drawn x, y, z per particle in
///   id order.
pub fn motion_phase(particles: &mut ParticleSet, cfg: &Config, rng: &mut impl Rng) {
    let b = cfg.brownian_scale;
    let bound = cfg.boundary;

    for p in particles
        .as_mut_slice()
        .iter_mut()
        .filter(|p| !p.attached)
    {
        p.vel += Vec3::new(
            rng.random_range(-b..=b),
            rng.random_range(-b..=b),
            rng.random_range(-b..=b),
        );
        p.pos += p.vel;

        for axis in 0..3 {
            if p.pos[axis] < -bound {
                p.pos[axis] = -bound;
                p.vel[axis] *= -0.5;
            } else if p.pos[axis] > bound {
                p.pos[axis] = bound;
                p.vel[axis] *= -0.5;
            }
        }
    }
}

/// Applies attraction and attachment to every free particle.
///
/// For each free particle, in index order:
///
/// 1. Finds the nearest cluster member visible in `mask` with
///    [`nearest_attached`].
/// 2. If it is closer than `cfg.attraction_range`, adds
///    `cfg.attraction_force` along the unit vector toward it. A zero
///    distance has no direction and adds nothing.
/// 3. If it is also closer than `cfg.attach_threshold_factor` times the sum
///    of both radii, the particle attaches.
///
/// With [`NeighborPolicy::StepSnapshot`] attachments are deferred in `mask`
/// and applied after the loop. With [`NeighborPolicy::LiveScan`] they are
/// applied and published on the spot, so later particles in the same pass
/// can attach to them.
///
/// ### Parameters
/// - `particles` - The particle set; free particles get new velocities and
///   may attach.
/// - `mask` - Must reflect the attachment state at the start of the step.
///   On return it also contains every attachment made here.
/// - `cfg` - Supplies range, force, threshold, growth and the
///   [`NeighborPolicy`].
///
/// ### Returns
/// Ids of the particles that attached, in the order they were applied.
pub fn interaction_phase(
    particles: &mut ParticleSet,
    mask: &mut AttachmentMask,
    cfg: &Config,
) -> Vec<ParticleId> {
    let mut attached_now = Vec::new();

    for id in 0..particles.len() {
        let all = particles.as_slice();
        let p = all[id];
        if p.attached {
            continue;
        }

        let Some((near_id, dist)) = nearest_attached(all, mask, p.pos) else {
            continue;
        };
        if dist >= cfg.attraction_range {
            continue;
        }
        let near = all[near_id];

        let dir = (near.pos - p.pos).normalize_or_zero();
        let touching = dist < cfg.attach_threshold_factor * (p.radius + near.radius);

        let p = &mut particles.as_mut_slice()[id];
        p.vel += dir * cfg.attraction_force;

        if touching {
            match cfg.neighbor_policy {
                NeighborPolicy::StepSnapshot => mask.defer(id),
                NeighborPolicy::LiveScan => {
                    p.attach(cfg.growth_increment);
                    mask.publish(id);
                    attached_now.push(id);
                }
            }
        }
    }

    let slots = particles.as_mut_slice();
    for id in mask.take_deferred() {
        slots[id].attach(cfg.growth_increment);
        attached_now.push(id);
    }

    attached_now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use rand::{SeedableRng, rngs::StdRng};

    fn still_config() -> Config {
        Config {
            brownian_scale: 0.0,
            ..Config::default()
        }
    }

    fn set_with(free: Vec<(Vec3, Vec3)>, cfg: &Config) -> ParticleSet {
        ParticleSet::from_free(cfg.seed_radius(), cfg.particle_radius, free)
    }

    #[test]
    fn motion_phase_integrates_velocity_without_noise() {
        let cfg = still_config();
        let mut set = set_with(
            vec![(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.1, -0.2, 0.0))],
            &cfg,
        );

        motion_phase(&mut set, &cfg, &mut StdRng::seed_from_u64(1));

        let p = set.as_slice()[1];
        assert!((p.pos - Vec3::new(0.6, 0.3, 0.5)).length() < 1e-6);
        assert_eq!(p.vel, Vec3::new(0.1, -0.2, 0.0));
    }

    #[test]
    fn motion_phase_bounces_softly_on_clamped_axes_only() {
        let cfg = still_config();
        let mut set = set_with(
            vec![(Vec3::new(0.95, -0.95, 0.0), Vec3::new(0.1, -0.2, 0.3))],
            &cfg,
        );

        motion_phase(&mut set, &cfg, &mut StdRng::seed_from_u64(1));

        let p = set.as_slice()[1];
        assert_eq!(p.pos.x, 1.0);
        assert_eq!(p.pos.y, -1.0);
        assert!((p.pos.z - 0.3).abs() < 1e-6);
        assert_eq!(p.vel, Vec3::new(-0.05, 0.1, 0.3));
    }

    #[test]
    fn motion_phase_keeps_noise_within_scale_and_leaves_seed_alone() {
        let cfg = Config {
            brownian_scale: 0.01,
            ..Config::default()
        };
        let mut set = set_with(vec![(Vec3::ZERO + 0.5, Vec3::ZERO); 32], &cfg);
        let mut rng = StdRng::seed_from_u64(11);

        motion_phase(&mut set, &cfg, &mut rng);

        assert_eq!(set.as_slice()[0], Particle::seed(cfg.seed_radius()));
        for p in &set.as_slice()[1..] {
            assert!(p.vel.abs().max_element() <= 0.01);
        }
    }

    #[test]
    fn interaction_phase_pulls_toward_seed_within_range() {
        let cfg = still_config();
        let mut set = set_with(vec![(Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO)], &cfg);
        let mut mask = AttachmentMask::capture(&set);

        let attached = interaction_phase(&mut set, &mut mask, &cfg);

        assert!(attached.is_empty());
        let p = set.as_slice()[1];
        assert!(!p.attached);
        assert!((p.vel - Vec3::new(-cfg.attraction_force, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn interaction_phase_ignores_particles_out_of_range() {
        let cfg = still_config();
        let mut set = set_with(vec![(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO)], &cfg);
        let mut mask = AttachmentMask::capture(&set);

        interaction_phase(&mut set, &mut mask, &cfg);

        assert_eq!(set.as_slice()[1].vel, Vec3::ZERO);
    }

    #[test]
    fn interaction_phase_attaches_on_contact() {
        let cfg = still_config();
        let mut set = set_with(vec![(Vec3::new(0.05, 0.0, 0.0), Vec3::new(0.01, 0.0, 0.0))], &cfg);
        let mut mask = AttachmentMask::capture(&set);

        let attached = interaction_phase(&mut set, &mut mask, &cfg);

        assert_eq!(attached, vec![1]);
        let p = set.as_slice()[1];
        assert!(p.attached);
        assert_eq!(p.vel, Vec3::ZERO);
        assert_eq!(p.radius, cfg.particle_radius + cfg.growth_increment);
        assert!(mask.is_attached(1));
    }

    #[test]
    fn zero_distance_attaches_without_force() {
        let cfg = Config {
            attach_threshold_factor: 1.0,
            ..still_config()
        };
        let mut set = set_with(vec![(Vec3::ZERO, Vec3::ZERO)], &cfg);
        let mut mask = AttachmentMask::capture(&set);

        assert_eq!(interaction_phase(&mut set, &mut mask, &cfg), vec![1]);
        assert!(set.as_slice()[1].attached);
    }

    // Particle 1 touches the seed. Particle 2 only touches particle 1 once
    // particle 1 has attached and grown.
    fn chain() -> Vec<(Vec3, Vec3)> {
        vec![
            (Vec3::new(0.05, 0.0, 0.0), Vec3::ZERO),
            (Vec3::new(0.085, 0.0, 0.0), Vec3::ZERO),
        ]
    }

    // Straight single-pass loop: each particle moves, searches the live set
    // and attaches before the next one is touched.
    fn interleaved_step(particles: &mut [Particle], cfg: &Config, rng: &mut impl Rng) {
        let b = cfg.brownian_scale;
        let bound = cfg.boundary;

        for i in 0..particles.len() {
            let mut p = particles[i];
            if p.attached {
                continue;
            }

            p.vel += Vec3::new(
                rng.random_range(-b..=b),
                rng.random_range(-b..=b),
                rng.random_range(-b..=b),
            );
            p.pos += p.vel;
            for axis in 0..3 {
                if p.pos[axis] < -bound {
                    p.pos[axis] = -bound;
                    p.vel[axis] *= -0.5;
                } else if p.pos[axis] > bound {
                    p.pos[axis] = bound;
                    p.vel[axis] *= -0.5;
                }
            }

            let mut best = None;
            let mut best_d2 = f32::INFINITY;
            for (j, other) in particles.iter().enumerate() {
                if !other.attached {
                    continue;
                }
                let d2 = other.pos.distance_squared(p.pos);
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = Some(j);
                }
            }

            if let Some(j) = best {
                let dist = best_d2.sqrt();
                if dist < cfg.attraction_range {
                    let near = particles[j];
                    p.vel += (near.pos - p.pos).normalize_or_zero() * cfg.attraction_force;
                    if dist < cfg.attach_threshold_factor * (p.radius + near.radius) {
                        p.attach(cfg.growth_increment);
                    }
                }
            }

            particles[i] = p;
        }
    }

    #[test]
    fn live_scan_phases_match_a_single_interleaved_pass() {
        let cfg = Config {
            particle_count: 300,
            boundary: 0.2,
            brownian_scale: 0.002,
            neighbor_policy: NeighborPolicy::LiveScan,
            ..Config::default()
        };
        let mut set = ParticleSet::random_in_cube(&cfg, &mut StdRng::seed_from_u64(21));
        let mut reference: Vec<Particle> = set.as_slice().to_vec();
        let mut mask = AttachmentMask::capture(&set);

        let mut rng = StdRng::seed_from_u64(22);
        let mut reference_rng = StdRng::seed_from_u64(22);

        for tick in 0..200 {
            mask.recapture(&set);
            motion_phase(&mut set, &cfg, &mut rng);
            interaction_phase(&mut set, &mut mask, &cfg);

            interleaved_step(&mut reference, &cfg, &mut reference_rng);

            assert_eq!(set.as_slice(), reference.as_slice(), "diverged at tick {tick}");
        }

        // Make sure the comparison covered actual attachments.
        assert!(set.attached_count() > 1);
    }

    #[test]
    fn step_snapshot_hides_attachments_made_in_the_same_pass() {
        let cfg = still_config();
        let mut set = set_with(chain(), &cfg);
        let mut mask = AttachmentMask::capture(&set);

        let attached = interaction_phase(&mut set, &mut mask, &cfg);

        assert_eq!(attached, vec![1]);
        assert!(!set.as_slice()[2].attached);
    }

    #[test]
    fn live_scan_lets_later_particles_attach_to_fresh_members() {
        let cfg = Config {
            neighbor_policy: NeighborPolicy::LiveScan,
            ..still_config()
        };
        let mut set = set_with(chain(), &cfg);
        let mut mask = AttachmentMask::capture(&set);

        let attached = interaction_phase(&mut set, &mut mask, &cfg);

        assert_eq!(attached, vec![1, 2]);
        assert!(set.as_slice()[2].attached);
    }
}

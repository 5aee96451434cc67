use crate::{attachment::AttachmentMask, particle::Particle, types::ParticleId};
use glam::Vec3;

/// Finds the cluster member closest to `pos` by scanning every particle.
///
/// Only particles flagged in `mask` are considered. Ties keep the first
/// particle found in index order.
///
/// ### Parameters
/// - `particles` - All particles, indexed by [`ParticleId`].
/// - `mask` - Which particles count as cluster members.
/// - `pos` - Query position.
///
/// ### Returns
/// The id of the nearest member and the Euclidean distance to it, or `None`
/// when the mask has no members.
pub fn nearest_attached(
    particles: &[Particle],
    mask: &AttachmentMask,
    pos: Vec3,
) -> Option<(ParticleId, f32)> {
    let mut best = None;
    let mut best_d2 = f32::INFINITY;
    for id in mask.attached_indices() {
        let d2 = particles[id].pos.distance_squared(pos);
        if d2 < best_d2 {
            best_d2 = d2;
            best = Some(id);
        }
    }
    best.map(|id| (id, best_d2.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleSet;

    #[test]
    fn finds_seed_when_it_is_the_only_member() {
        let set = ParticleSet::from_free(
            0.04,
            0.02,
            vec![(Vec3::new(0.3, 0.4, 0.0), Vec3::ZERO)],
        );
        let mask = AttachmentMask::capture(&set);

        let (id, d) = nearest_attached(set.as_slice(), &mask, set.as_slice()[1].pos).unwrap();
        assert_eq!(id, 0);
        assert!((d - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ignores_free_particles_even_when_closer() {
        let set = ParticleSet::from_free(
            0.04,
            0.02,
            vec![
                (Vec3::new(0.9, 0.0, 0.0), Vec3::ZERO),
                (Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
            ],
        );
        let mask = AttachmentMask::capture(&set);

        let (id, _) = nearest_attached(set.as_slice(), &mask, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(id, 0);
    }

    #[test]
    fn picks_closest_member_and_first_on_ties() {
        let set = ParticleSet::from_free(
            0.04,
            0.02,
            vec![
                (Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
                (Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO),
            ],
        );
        let mut mask = AttachmentMask::capture(&set);
        mask.publish(1);
        mask.publish(2);

        let (id, d) = nearest_attached(set.as_slice(), &mask, Vec3::new(0.8, 0.0, 0.0)).unwrap();
        assert_eq!(id, 1);
        assert!((d - 0.2).abs() < 1e-6);

        // (1, 1, 0) is equidistant from particles 1 and 2.
        let (id, _) = nearest_attached(set.as_slice(), &mask, Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn empty_mask_yields_none() {
        let set = ParticleSet::from_free(0.04, 0.02, Vec::new());
        let mask = AttachmentMask::default();
        assert!(nearest_attached(set.as_slice(), &mask, Vec3::ZERO).is_none());
    }
}

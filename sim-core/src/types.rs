/// Identifier for a particle in a [`crate::particle::ParticleSet`].
///
/// This is an index into the set's particle list. Index `0` is always the
/// seed, and because the population is fixed at construction an id stays
/// valid for the lifetime of the simulator that issued it.
pub type ParticleId = usize;

/// Id of the seed particle anchoring the cluster.
pub const SEED_ID: ParticleId = 0;

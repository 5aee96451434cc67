//! Core 3-D diffusion-limited aggregation library.
//!
//! Main components:
//! - [`simulator`] — the [`Simulator`] owning and advancing the particles.
//! - [`particle`] — particles, read-only views and the fixed particle set.
//! - [`config`] — simulation parameters and their validation.
//! - [`attachment`] — the per-step capture of which particles are attached.
//! - [`neighbors`] — brute-force nearest cluster member search.
//! - [`phases`] — motion and interaction phases making up one step.
//! - [`types`] — shared type aliases and IDs.

pub mod attachment;
pub mod config;
pub mod neighbors;
pub mod particle;
pub mod phases;
pub mod simulator;
pub mod types;

pub use config::{Config, ConfigError, NeighborPolicy};
pub use particle::{Particle, ParticleView};
pub use simulator::Simulator;

//! Flurry Particles - Snow particle simulation state
//!
//! Provides the fixed-size particle set driven by the simulation loop:
//! - Uniform generation of size, fall speed, drift, opacity and motif
//! - Constant-velocity drift with bottom-to-top recycling
//! - Horizontal torus wrap so particles never leave the surface band

pub mod particle;

pub use particle::{sample_range, Particle, ParticleRanges, ParticleSet};

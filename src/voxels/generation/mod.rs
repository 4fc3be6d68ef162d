//! # Generation Module
//!
//! Procedural terrain: a seeded gradient noise field and the generator that
//! thresholds one field per material into a material grid.

pub mod noise_field;
pub mod terrain_generator;

pub use noise_field::NoiseField;
pub use terrain_generator::{MaterialTable, TerrainGenerator};

//! # Core Module
//!
//! Resource-sharing primitives used throughout the terrain engine.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted handle with interior mutability,
//!   used to share chunks between their container and neighbor lookups

pub mod st_resource;

pub use st_resource::StResource;

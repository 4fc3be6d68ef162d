//! # Voxel Terrain Core
//!
//! This module contains the terrain itself: materials, chunks of material
//! cells, their marching-squares tessellation, and the two containers that own
//! chunks.
//!
//! ## Architecture
//!
//! * **Material**: The closed set of terrain materials and their registry
//! * **Generation**: Seeded noise fields thresholded into material grids
//! * **Chunk**: Fixed-size blocks of cells that cache their own tiles
//! * **WorldGrid**: A finite world built eagerly from a material array
//! * **ChunkStore**: An infinite world paged in from disk or the generator
//! * **Collaborators**: The render and physics traits tiles are pushed to
//!
//! ## Data Flow
//!
//! 1. A container receives a read or write for a world cell
//! 2. The container routes it to the owning chunk, paging the chunk in if needed
//! 3. Writes mark the owning chunk, and the chunks sharing its low edges, dirty
//! 4. The next draw flushes dirty visible chunks, re-registering their tiles
//!
//! ## Threading
//!
//! Everything here runs on the frame thread. Chunks are shared through
//! [`StResource`](crate::core::StResource) handles and refer to each other by
//! origin only.

pub mod camera;
pub mod chunk;
pub mod chunk_store;
pub mod collaborators;
pub mod generation;
pub mod material;
pub mod material_grid;
pub mod world_grid;

pub use chunk::Chunk;
pub use chunk_store::ChunkStore;
pub use material::Material;
pub use material_grid::MaterialGrid;
pub use world_grid::{DrawStats, WorldGrid};

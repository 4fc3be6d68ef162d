//! # Configuration Module
//!
//! `TerrainConfig` gathers every tunable of the terrain engine. It is read from
//! JSON, and any field missing from the document takes its default:
//!
//! ```json
//! {
//!     "chunk_width": 8,
//!     "chunk_height": 8,
//!     "cell_size": 32.0,
//!     "seed": 0,
//!     "cache_capacity": 1024,
//!     "state_dir": "./data/state",
//!     "base_material": "Dirt",
//!     "materials": { "Dirt": 1.0, "Marble": 0.1, "Iron": 0.06, "Diamond": 0.001 }
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TerrainError},
    voxels::{
        chunk::{DEFAULT_CHUNK_HEIGHT, DEFAULT_CHUNK_WIDTH},
        generation::{terrain_generator::processing_order, MaterialTable},
        material::Material,
    },
};

/// Smallest accepted chunk cache.
pub const MIN_CACHE_CAPACITY: usize = 4;

/// Settings of a terrain world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Chunk width in cells
    pub chunk_width: usize,
    /// Chunk height in cells
    pub chunk_height: usize,
    /// Side length of one cell in world units
    pub cell_size: f32,
    /// Generator seed
    pub seed: u64,
    /// Maximum number of chunks a `ChunkStore` keeps in memory
    pub cache_capacity: usize,
    /// Directory holding persisted chunks
    pub state_dir: PathBuf,
    /// Material generated terrain starts from, `Empty` when `None`
    pub base_material: Option<Material>,
    /// Scarcity of every generated material
    pub materials: MaterialTable,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            chunk_width: DEFAULT_CHUNK_WIDTH as usize,
            chunk_height: DEFAULT_CHUNK_HEIGHT as usize,
            cell_size: 32.0,
            seed: 0,
            cache_capacity: 1024,
            state_dir: PathBuf::from("./data/state"),
            base_material: Some(Material::Dirt),
            materials: [
                (Material::Dirt, 1.0),
                (Material::Marble, 0.1),
                (Material::Iron, 0.06),
                (Material::Diamond, 0.001),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl TerrainConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TerrainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    /// [`TerrainError::InvalidConfig`] for a non-positive dimension or cell
    /// size or a cache below [`MIN_CACHE_CAPACITY`], and
    /// [`TerrainError::InvalidScarcity`] for a bad material entry.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_width == 0 || self.chunk_height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "chunk dimensions must be positive, got {}x{}",
                self.chunk_width, self.chunk_height
            )));
        }
        if self.chunk_width > i32::MAX as usize || self.chunk_height > i32::MAX as usize {
            return Err(TerrainError::InvalidConfig(
                "chunk dimensions must fit in an i32".to_string(),
            ));
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(TerrainError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.cache_capacity < MIN_CACHE_CAPACITY {
            return Err(TerrainError::InvalidConfig(format!(
                "cache capacity must be at least {MIN_CACHE_CAPACITY}, got {}",
                self.cache_capacity
            )));
        }
        processing_order(&self.materials)?;
        Ok(())
    }
}

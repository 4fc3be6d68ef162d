//! # Error Module
//!
//! The crate-wide error type. Terrain lookups are total and never fail, so the
//! variants here come from configuration, generation tables, and the
//! persistence directory.

use std::path::PathBuf;

use thiserror::Error;

use crate::voxels::material::Material;

/// Errors produced by the terrain engine.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// A filesystem operation on the persistence directory failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A chunk image could not be encoded or decoded.
    #[error("failed to read or write chunk image {path}: {source}")]
    Image {
        /// The chunk file involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: image::ImageError,
    },

    /// A chunk file does not have the dimensions of the store's chunks.
    #[error("chunk file {path} is {found_width}x{found_height}, expected {width}x{height}")]
    DimensionMismatch {
        /// The chunk file involved
        path: PathBuf,
        /// Expected width in cells
        width: u32,
        /// Expected height in cells
        height: u32,
        /// Width found in the file
        found_width: u32,
        /// Height found in the file
        found_height: u32,
    },

    /// A chunk file holds a pixel that is not any registered material's color.
    #[error("chunk file {path} holds unknown material color {color:?} at ({x}, {y})")]
    UnknownColor {
        /// The chunk file involved
        path: PathBuf,
        /// The offending RGB value
        color: [u8; 3],
        /// Local x of the pixel
        x: u32,
        /// Local y of the pixel
        y: u32,
    },

    /// A generation table entry is outside `(0, 1]`.
    #[error("scarcity for {material:?} must lie in (0, 1], got {scarcity}")]
    InvalidScarcity {
        /// The material with the bad entry
        material: Material,
        /// The rejected value
        scarcity: f32,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A chunk was requested at an origin that is not a multiple of the chunk size.
    #[error("chunk origin ({x}, {y}) is not aligned to the {width}x{height} chunk grid")]
    MisalignedOrigin {
        /// Requested origin x
        x: i32,
        /// Requested origin y
        y: i32,
        /// Chunk width in cells
        width: i32,
        /// Chunk height in cells
        height: i32,
    },
}

/// Shorthand for results carrying a [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;

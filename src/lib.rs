#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! A chunked, procedurally generated 2D voxel terrain engine for platform games.
//!
//! The world is a grid of material cells. Every cell is drawn as one of 16
//! marching-squares tiles picked from its four corner cells, and solid tiles
//! get a matching collider. Edits are cheap: they only mark chunks dirty, and
//! tiles are rebuilt for visible chunks on the next draw.
//!
//! ## Key Modules
//!
//! * `voxels` - Materials, chunks, tessellation, generation and the two world containers
//! * `config` - JSON configuration of a terrain world
//! * `core` - The shared handle chunks are passed around in
//! * `error` - The crate's error type
//!
//! ## Architecture
//!
//! The engine keeps a clear line between terrain state and its consumers:
//! * Terrain data lives in chunks owned by a `WorldGrid` or a `ChunkStore`
//! * Renderers and physics solvers only see tile instances, through traits
//! * Cameras only contribute the world rectangle they show
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(error) = voxel_terrain::run() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use std::env;

use log::info;

use crate::{
    config::TerrainConfig,
    error::Result,
    voxels::{
        camera::{Camera2D, Viewport},
        chunk_store::ChunkStore,
        collaborators::{ColliderRegistry, SpriteRegistry, TileSinks},
        material::Material,
    },
};

pub mod config;
pub mod core;
pub mod error;
pub mod voxels;

/// Environment variable naming the JSON configuration file of [`run`].
pub const CONFIG_ENV_VAR: &str = "TERRAIN_CONFIG";

/// Installs the stdout logger, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

/// Runs a headless session over a [`ChunkStore`].
///
/// The configuration is read from the file named by [`CONFIG_ENV_VAR`], or
/// defaults when it is unset. The session draws a 1280×720 view, pans it, digs
/// and fills a few cells under fixed screen positions, draws again and logs the
/// resulting tile totals.
pub fn run() -> Result<()> {
    init_logging();
    info!("Logger initialized");

    let config = match env::var_os(CONFIG_ENV_VAR) {
        Some(path) => TerrainConfig::from_json_file(path)?,
        None => TerrainConfig::default(),
    };

    let mut store = ChunkStore::new(&config)?;
    let mut sprites = SpriteRegistry::new();
    let mut colliders = ColliderRegistry::new();
    let mut camera = Camera2D::new(0.0, 0.0, 1280.0, 720.0);

    let stats = store.draw(&camera, &mut TileSinks::new(&mut sprites, &mut colliders))?;
    info!(
        "Initial view: {} chunks drawn, {} flushed, {} sprites, {} colliders",
        stats.chunks_drawn,
        stats.chunks_flushed,
        sprites.len(),
        colliders.len()
    );

    camera.left += 300.0;
    camera.bottom -= 150.0;
    camera = camera.with_zoom(1.2);

    for (screen_x, screen_y, material) in [
        (640.0, 360.0, Material::Empty),
        (672.0, 360.0, Material::Empty),
        (640.0, 392.0, Material::Empty),
        (100.0, 100.0, Material::Dirt),
        (132.0, 100.0, Material::Dirt),
    ] {
        let world = camera.screen_to_world(screen_x, screen_y);
        let x = (world.x / config.cell_size).floor() as i32;
        let y = (world.y / config.cell_size).floor() as i32;
        store.write(x, y, material)?;
    }

    let stats = store.draw(&camera, &mut TileSinks::new(&mut sprites, &mut colliders))?;
    let bounds = camera.scaled_bounds();
    info!(
        "View ({:.0}, {:.0})-({:.0}, {:.0}): {} chunks drawn, {} flushed, {} sprites, {} colliders",
        bounds.left,
        bounds.bottom,
        bounds.right,
        bounds.top,
        stats.chunks_drawn,
        stats.chunks_flushed,
        sprites.len(),
        colliders.len()
    );

    let (registered, unregistered) = sprites.traffic();
    info!(
        "Session done: {} sprites registered, {} unregistered, {} chunks cached",
        registered,
        unregistered,
        store.cached_len()
    );
    Ok(())
}

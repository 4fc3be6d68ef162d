//! # Voxel Terrain Entry Point
//!
//! Runs the library's headless session. Set `TERRAIN_CONFIG` to a JSON file to
//! override the default world, and `RUST_LOG` to choose the log level.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_terrain::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            eprintln!("voxel-terrain: {error}");
            ExitCode::FAILURE
        }
    }
}

//! # Chunk Persistence Module
//!
//! Stores one RGB image per chunk in the state directory, named
//! `"{x}_{y}_{width}_{height}.png"` after the chunk's origin and size. Each pixel
//! holds the color key of one cell; pixel row 0 is local `y = 0`.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use cgmath::Point2;
use image::{Rgb, RgbImage};
use log::debug;
use web_time::Instant;

use crate::{
    error::{Result, TerrainError},
    voxels::{material::Material, material_grid::MaterialGrid},
};

/// Reads and writes chunk images in one directory.
#[derive(Clone, Debug)]
pub struct ChunkPersistence {
    dir: PathBuf,
    chunk_width: u32,
    chunk_height: u32,
}

impl ChunkPersistence {
    /// Opens `dir`, creating it if needed.
    ///
    /// # Errors
    /// [`TerrainError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, chunk_width: u32, chunk_height: u32) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TerrainError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(ChunkPersistence {
            dir,
            chunk_width,
            chunk_height,
        })
    }

    /// The state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing the chunk at `origin`.
    pub fn path_for(&self, origin: Point2<i32>) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}_{}.png",
            origin.x, origin.y, self.chunk_width, self.chunk_height
        ))
    }

    /// Returns `true` if the chunk at `origin` has a backing file.
    pub fn exists(&self, origin: Point2<i32>) -> bool {
        self.path_for(origin).is_file()
    }

    /// Loads the chunk at `origin`.
    ///
    /// # Returns
    /// `None` if the chunk was never saved.
    ///
    /// # Errors
    /// The file cannot be decoded, has the wrong dimensions, or holds a color
    /// that is no material's key.
    pub fn load(&self, origin: Point2<i32>) -> Result<Option<MaterialGrid>> {
        let path = self.path_for(origin);
        if !path.is_file() {
            return Ok(None);
        }

        let start = Instant::now();
        let image = image::open(&path)
            .map_err(|source| TerrainError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgb8();

        if image.width() != self.chunk_width || image.height() != self.chunk_height {
            return Err(TerrainError::DimensionMismatch {
                path,
                width: self.chunk_width,
                height: self.chunk_height,
                found_width: image.width(),
                found_height: image.height(),
            });
        }

        let mut grid = MaterialGrid::filled(
            self.chunk_width as usize,
            self.chunk_height as usize,
            Material::Empty,
        );
        for (x, y, pixel) in image.enumerate_pixels() {
            let material = Material::by_color(pixel.0).ok_or_else(|| TerrainError::UnknownColor {
                path: path.clone(),
                color: pixel.0,
                x,
                y,
            })?;
            grid.set(x as usize, y as usize, material);
        }

        debug!("Loaded chunk {:?} in {:?}", origin, start.elapsed());
        Ok(Some(grid))
    }

    /// Writes the chunk at `origin`, replacing any previous file.
    pub fn save(&self, origin: Point2<i32>, grid: &MaterialGrid) -> Result<()> {
        let start = Instant::now();
        let path = self.path_for(origin);
        let mut image = RgbImage::new(grid.width() as u32, grid.height() as u32);
        for (y, row) in grid.rows().enumerate() {
            for (x, material) in row.iter().enumerate() {
                image.put_pixel(x as u32, y as u32, Rgb(material.color()));
            }
        }
        image
            .save(&path)
            .map_err(|source| TerrainError::Image { path, source })?;

        debug!("Saved chunk {:?} in {:?}", origin, start.elapsed());
        Ok(())
    }

    /// Deletes the file backing the chunk at `origin`.
    ///
    /// # Returns
    /// `false` if there was no file.
    pub fn remove(&self, origin: Point2<i32>) -> Result<bool> {
        let path = self.path_for(origin);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(TerrainError::Io { path, source }),
        }
    }
}

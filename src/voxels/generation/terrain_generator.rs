//! # Terrain Generator Module
//!
//! Converts noise fields and a material scarcity table into material grids.
//!
//! ## Algorithm
//!
//! 1. Every cell starts as the base material (`Empty` when none is given).
//! 2. Materials are processed in descending scarcity. Each one gets its own
//!    noise field, sampled so that a region spans [`NOISE_DOMAIN_SPAN`] noise
//!    units whatever its size in cells.
//! 3. Samples are mapped to `0..=255` and every cell at or above
//!    `255 − 255 × scarcity` is painted with the material.
//!
//! A cell that qualifies for several materials keeps the one painted last. With
//! descending-scarcity processing that is the rarest qualifying material.
//! Equal scarcities are ordered by ascending material priority, then id, so the
//! output is fully determined by the seed and the table.

use std::{cmp::Ordering, collections::BTreeMap};

use cgmath::Point2;
use log::trace;

use crate::{
    error::{Result, TerrainError},
    voxels::{generation::noise_field::NoiseField, material::Material, material_grid::MaterialGrid},
};

/// Number of noise units a generated region spans along each axis.
pub const NOISE_DOMAIN_SPAN: f64 = 5.0;

/// Maps each material to its scarcity in `(0, 1]`. Higher means more common.
pub type MaterialTable = BTreeMap<Material, f32>;

/// Seeded generator of material grids.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: u64,
}

impl TerrainGenerator {
    /// Creates a generator whose output is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        TerrainGenerator { seed }
    }

    /// The generator's seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates a `width × height` region anchored at the world origin.
    ///
    /// # Arguments
    /// * `width` - Region width in cells
    /// * `height` - Region height in cells
    /// * `table` - Scarcity per material
    /// * `base_material` - Initial material of every cell, `Empty` when `None`
    ///
    /// # Errors
    /// [`TerrainError::InvalidScarcity`] if a table entry lies outside `(0, 1]`.
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        table: &MaterialTable,
        base_material: Option<Material>,
    ) -> Result<MaterialGrid> {
        self.generate_region(Point2::new(0, 0), width, height, table, base_material)
    }

    /// Generates a `width × height` region whose first cell sits at `origin`.
    ///
    /// Noise coordinates are offset by `origin`, so regions of the same size
    /// generated side by side continue each other's features.
    pub fn generate_region(
        &self,
        origin: Point2<i32>,
        width: usize,
        height: usize,
        table: &MaterialTable,
        base_material: Option<Material>,
    ) -> Result<MaterialGrid> {
        let mut grid =
            MaterialGrid::filled(width, height, base_material.unwrap_or(Material::Empty));
        if width == 0 || height == 0 {
            return Ok(grid);
        }

        let scale_x = NOISE_DOMAIN_SPAN / width as f64;
        let scale_y = NOISE_DOMAIN_SPAN / height as f64;

        for (material, scarcity) in processing_order(table)? {
            let field = NoiseField::new(self.material_seed(material));
            let threshold = 255.0 - 255.0 * scarcity;
            let mut painted = 0usize;

            for y in 0..height {
                let noise_y = (origin.y as f64 + y as f64) * scale_y;
                for x in 0..width {
                    let noise_x = (origin.x as f64 + x as f64) * scale_x;
                    let level = to_level(field.sample(noise_x, noise_y));
                    if f32::from(level) >= threshold {
                        grid.set(x, y, material);
                        painted += 1;
                    }
                }
            }

            trace!(
                "Painted {} cells of {:?} (scarcity {}) in region at {:?}",
                painted,
                material,
                scarcity,
                origin
            );
        }

        Ok(grid)
    }

    /// Seed of the noise field used for `material`.
    ///
    /// Depends only on the generator seed and the material, never on the
    /// region, so every region samples the same per-material field.
    fn material_seed(&self, material: Material) -> u64 {
        self.seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(material.id() as u64 + 1)
    }
}

/// Returns the table's entries in painting order.
///
/// # Errors
/// [`TerrainError::InvalidScarcity`] if an entry lies outside `(0, 1]`.
pub fn processing_order(table: &MaterialTable) -> Result<Vec<(Material, f32)>> {
    let mut order = Vec::with_capacity(table.len());
    for (&material, &scarcity) in table {
        if !(scarcity > 0.0 && scarcity <= 1.0) {
            return Err(TerrainError::InvalidScarcity { material, scarcity });
        }
        order.push((material, scarcity));
    }

    order.sort_by(|(a, a_scarcity), (b, b_scarcity)| {
        b_scarcity
            .partial_cmp(a_scarcity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.priority().cmp(&b.priority()))
            .then_with(|| a.cmp(b))
    });
    Ok(order)
}

/// Maps a noise sample in `[-1, 1]` onto `0..=255`.
fn to_level(sample: f64) -> u8 {
    (((sample + 1.0) / 2.0) * 255.0).clamp(0.0, 255.0) as u8
}

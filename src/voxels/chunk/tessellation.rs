//! # Tessellation Module
//!
//! Marching-squares tile resolution for a single cell.
//!
//! The tile of cell `(x, y)` spans the square whose corners are the cells
//! `(x, y)`, `(x + 1, y)`, `(x + 1, y + 1)` and `(x, y + 1)`, contributing the
//! mask bits 1, 2, 4 and 8 respectively when they hold a material.
//!
//! When more than one material meets in a tile, every material present yields a
//! layer. Layers are ordered by descending material priority; the first layer
//! takes the union of all solid corners and each following layer drops the
//! corners of the materials before it:
//!
//! ```text
//!  corners: (x,y)=Dirt  (x+1,y)=Iron  (x+1,y+1)=Iron  (x,y+1)=Empty
//!  layers:  Iron mask 7, then Dirt mask 1
//! ```
//!
//! The first layer is the cell's representative tile. It is the only one that
//! may carry a collider.

use super::{Chunk, ChunkLookup};
use crate::voxels::material::Material;

/// Bit weight and cell offset of each sampled corner.
pub const CORNERS: [(u8, (i32, i32)); 4] = [(1, (0, 0)), (2, (1, 0)), (4, (1, 1)), (8, (0, 1))];

/// One drawable layer of a cell's tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    /// Material drawn by this layer
    pub material: Material,
    /// Tile variant to draw, in `1..16`
    pub mask: u8,
}

impl Chunk {
    /// Computes the 4-bit corner mask of the cell at world `(x, y)`.
    ///
    /// A bit is set when its corner holds any non-empty material.
    pub fn compute_mask(&self, x: i32, y: i32, lookup: &mut dyn ChunkLookup) -> u8 {
        let mut mask = 0;
        for (bit, (dx, dy)) in CORNERS {
            if self.read(x + dx, y + dy, lookup).is_present() {
                mask |= bit;
            }
        }
        mask
    }

    /// Resolves the tile layers of the cell at world `(x, y)`.
    ///
    /// # Returns
    /// No layers for an all-empty neighborhood, otherwise one layer per distinct
    /// material, representative tile first.
    pub fn tile_layers(&self, x: i32, y: i32, lookup: &mut dyn ChunkLookup) -> Vec<TileLayer> {
        let mut corners_by_material: Vec<(Material, u8)> = Vec::with_capacity(4);
        for (bit, (dx, dy)) in CORNERS {
            let material = self.read(x + dx, y + dy, lookup);
            if !material.is_present() {
                continue;
            }
            match corners_by_material.iter_mut().find(|(m, _)| *m == material) {
                Some((_, bits)) => *bits |= bit,
                None => corners_by_material.push((material, bit)),
            }
        }

        corners_by_material.sort_by(|(a, _), (b, _)| {
            b.priority().cmp(&a.priority()).then_with(|| b.cmp(a))
        });

        let mut remaining = corners_by_material
            .iter()
            .fold(0u8, |mask, (_, bits)| mask | bits);
        corners_by_material
            .into_iter()
            .map(|(material, bits)| {
                let layer = TileLayer {
                    material,
                    mask: remaining,
                };
                remaining &= !bits;
                layer
            })
            .collect()
    }
}

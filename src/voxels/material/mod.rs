//! # Material Module
//!
//! This module defines the closed set of terrain materials and the registry that
//! maps each of them to its color key, tile-set, and physical properties.
//!
//! The registry is an eagerly-built static table indexed by material id, with a
//! compile-time perfect hash map for the reverse lookup from color key to
//! material. The color key is what persisted chunk images store per cell.

use num_derive::FromPrimitive;
use phf::phf_map;
use serde::{Deserialize, Serialize};

pub mod tile_shape;

/// The underlying integer type used to represent materials in memory.
pub type MaterialId = u8;

/// Enumerates every terrain material.
///
/// `Empty` is the sentinel: it never produces a tile or a collision shape.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    FromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum Material {
    /// No material. Reads outside any chunk resolve to this.
    #[default]
    Empty = 0,
    /// Common soil, usually the base of generated terrain.
    Dirt = 1,
    /// Veins of marble.
    Marble = 2,
    /// Iron ore.
    Iron = 3,
    /// Rare diamond deposits.
    Diamond = 4,
}

/// Number of registered materials, `Empty` included.
pub const MATERIAL_COUNT: usize = 5;

/// A reference to a 16-variant tile image, one variant per mask value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileSet {
    /// Path of the tile-set image, relative to the asset root.
    pub image_path: &'static str,
    /// Bit `m` is set when the tile-set has a variant for mask `m`.
    pub variants: u16,
}

impl TileSet {
    /// A tile-set that provides a variant for every mask.
    pub const fn complete(image_path: &'static str) -> Self {
        TileSet {
            image_path,
            variants: u16::MAX,
        }
    }

    /// Returns `true` if the tile-set has a variant for `mask`.
    ///
    /// Mask 0 never has a variant: it is the fully empty configuration.
    pub fn contains(&self, mask: u8) -> bool {
        mask != 0 && mask < 16 && self.variants & (1 << mask) != 0
    }
}

/// Everything the engine needs to know about a material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaterialProperties {
    /// RGB color key, used as the per-cell value in persisted chunk images.
    pub color: [u8; 3],
    /// Tile-set used to draw the material, `None` for `Empty`.
    pub tile_set: Option<TileSet>,
    /// Surface friction handed to the physics backend.
    pub friction: f32,
    /// Restitution handed to the physics backend.
    pub elasticity: f32,
    /// Whether tiles of this material get a collider.
    pub collides: bool,
    /// Layering priority. When several materials meet in one tile, the one with
    /// the highest priority is drawn as the representative tile.
    pub priority: u8,
}

/// Registry entries, indexed by `Material as usize`.
static MATERIAL_PROPERTIES: [MaterialProperties; MATERIAL_COUNT] = [
    // EMPTY
    MaterialProperties {
        color: [255, 255, 255],
        tile_set: None,
        friction: 0.0,
        elasticity: 0.0,
        collides: false,
        priority: 0,
    },
    // DIRT
    MaterialProperties {
        color: [0, 0, 0],
        tile_set: Some(TileSet::complete("data/images/voxels/dirt.png")),
        friction: 0.9,
        elasticity: 0.0,
        collides: true,
        priority: 1,
    },
    // MARBLE
    MaterialProperties {
        color: [18, 56, 94],
        tile_set: Some(TileSet::complete("data/images/voxels/marble.png")),
        friction: 0.5,
        elasticity: 0.1,
        collides: true,
        priority: 2,
    },
    // IRON
    MaterialProperties {
        color: [128, 128, 128],
        tile_set: Some(TileSet::complete("data/images/voxels/iron.png")),
        friction: 0.7,
        elasticity: 0.05,
        collides: true,
        priority: 3,
    },
    // DIAMOND
    MaterialProperties {
        color: [185, 242, 255],
        tile_set: Some(TileSet::complete("data/images/voxels/diamond.png")),
        friction: 0.4,
        elasticity: 0.2,
        collides: true,
        priority: 4,
    },
];

/// Reverse lookup from packed `0xRRGGBB` color key to material.
static MATERIALS_BY_COLOR: phf::Map<u32, Material> = phf_map! {
    0xFFFFFFu32 => Material::Empty,
    0x000000u32 => Material::Dirt,
    0x12385Eu32 => Material::Marble,
    0x808080u32 => Material::Iron,
    0xB9F2FFu32 => Material::Diamond,
};

impl Material {
    /// Converts a raw id back into a material.
    ///
    /// # Returns
    /// `None` if no material has that id.
    pub fn from_id(id: MaterialId) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The material's raw id.
    pub fn id(self) -> MaterialId {
        self as MaterialId
    }

    /// Iterates over every registered material in id order, `Empty` first.
    pub fn all() -> impl Iterator<Item = Material> {
        (0..MATERIAL_COUNT as MaterialId).filter_map(Material::from_id)
    }

    /// Returns the registry entry for this material.
    pub fn properties(self) -> &'static MaterialProperties {
        &MATERIAL_PROPERTIES[self as usize]
    }

    /// Returns `true` for every material except `Empty`.
    pub fn is_present(self) -> bool {
        self != Material::Empty
    }

    /// The material's RGB color key.
    pub fn color(self) -> [u8; 3] {
        self.properties().color
    }

    /// Looks up the material registered for an RGB color key.
    ///
    /// # Returns
    /// `None` if the color is not any material's key.
    pub fn by_color(color: [u8; 3]) -> Option<Self> {
        let key = (color[0] as u32) << 16 | (color[1] as u32) << 8 | color[2] as u32;
        MATERIALS_BY_COLOR.get(&key).copied()
    }

    /// The material's layering priority.
    pub fn priority(self) -> u8 {
        self.properties().priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_keys_round_trip_for_every_material() {
        for material in Material::all() {
            assert_eq!(Material::by_color(material.color()), Some(material));
        }
        assert_eq!(Material::all().count(), MATERIAL_COUNT);
    }

    #[test]
    fn color_keys_are_unique() {
        let mut colors: Vec<_> = Material::all().map(Material::color).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), MATERIAL_COUNT);
    }

    #[test]
    fn unknown_color_and_id_resolve_to_none() {
        assert_eq!(Material::by_color([1, 2, 3]), None);
        assert_eq!(Material::from_id(MATERIAL_COUNT as MaterialId), None);
        assert_eq!(Material::from_id(3), Some(Material::Iron));
    }

    #[test]
    fn only_empty_lacks_a_tile_set() {
        for material in Material::all() {
            assert_eq!(
                material.properties().tile_set.is_some(),
                material.is_present()
            );
        }
    }

    #[test]
    fn tile_set_never_contains_mask_zero() {
        let tile_set = TileSet::complete("any.png");
        assert!(!tile_set.contains(0));
        assert!((1..16).all(|mask| tile_set.contains(mask)));
        assert!(!tile_set.contains(16));

        let sparse = TileSet {
            image_path: "sparse.png",
            variants: 1 << 15,
        };
        assert!(sparse.contains(15));
        assert!(!sparse.contains(5));
    }
}

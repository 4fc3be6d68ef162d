//! # Tile Shape Module
//!
//! Static collider outlines for the 16 marching-squares tile shapes.
//!
//! Each outline is a convex, counter-clockwise polygon in the unit square of the
//! tile. The tile's four sampled corners sit at the square's corners:
//!
//! ```text
//!  8 (0,1) ---- 4 (1,1)
//!    |            |
//!    |            |
//!  1 (0,0) ---- 2 (1,0)
//! ```
//!
//! Boundary crossings sit at edge midpoints. The opposite-corner masks 5 and 10
//! resolve the saddle as connected, giving a hexagon.

use cgmath::Point2;

/// A vertex of a unit-square outline.
type UnitVertex = (f32, f32);

/// Collider outlines indexed by mask.
#[rustfmt::skip]
static TILE_OUTLINES: [&[UnitVertex]; 16] = [
    // 0: nothing solid
    &[],
    // 1: bottom-left corner
    &[(0.0, 0.0), (0.5, 0.0), (0.0, 0.5)],
    // 2: bottom-right corner
    &[(0.5, 0.0), (1.0, 0.0), (1.0, 0.5)],
    // 3: bottom half
    &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.0, 0.5)],
    // 4: top-right corner
    &[(1.0, 0.5), (1.0, 1.0), (0.5, 1.0)],
    // 5: bottom-left and top-right, connected
    &[(0.0, 0.0), (0.5, 0.0), (1.0, 0.5), (1.0, 1.0), (0.5, 1.0), (0.0, 0.5)],
    // 6: right half
    &[(0.5, 0.0), (1.0, 0.0), (1.0, 1.0), (0.5, 1.0)],
    // 7: all but top-left
    &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.5, 1.0), (0.0, 0.5)],
    // 8: top-left corner
    &[(0.0, 0.5), (0.5, 1.0), (0.0, 1.0)],
    // 9: left half
    &[(0.0, 0.0), (0.5, 0.0), (0.5, 1.0), (0.0, 1.0)],
    // 10: bottom-right and top-left, connected
    &[(0.5, 0.0), (1.0, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 1.0), (0.0, 0.5)],
    // 11: all but top-right
    &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 1.0)],
    // 12: top half
    &[(0.0, 0.5), (1.0, 0.5), (1.0, 1.0), (0.0, 1.0)],
    // 13: all but bottom-right
    &[(0.0, 0.0), (0.5, 0.0), (1.0, 0.5), (1.0, 1.0), (0.0, 1.0)],
    // 14: all but bottom-left
    &[(0.5, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.5)],
    // 15: full square
    &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
];

/// Returns the unit-square outline for `mask`.
///
/// Masks above 15 have no outline.
pub fn unit_outline(mask: u8) -> &'static [(f32, f32)] {
    TILE_OUTLINES.get(mask as usize).copied().unwrap_or(&[])
}

/// Returns the outline for `mask` scaled to `cell_size` and translated so the
/// tile's bottom-left corner sits at `origin` in world space.
///
/// # Arguments
/// * `mask` - The tile's 4-bit corner mask
/// * `origin` - World position of the tile's bottom-left corner
/// * `cell_size` - Side length of one tile in world units
pub fn world_outline(mask: u8, origin: Point2<f32>, cell_size: f32) -> Vec<Point2<f32>> {
    unit_outline(mask)
        .iter()
        .map(|&(u, v)| Point2::new(origin.x + u * cell_size, origin.y + v * cell_size))
        .collect()
}

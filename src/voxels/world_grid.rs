//! # World Grid Module
//!
//! This module provides the `WorldGrid` struct: a finite world built eagerly
//! from a pre-supplied material array and cut into a regular grid of chunks.
//!
//! ## Layout
//!
//! Chunks are stored row-major in a `Vec`, chunk `(column, row)` covering the
//! cells `column * chunk_width ..` and `row * chunk_height ..`. When the world
//! size is not a multiple of the chunk size, the last column and row of chunks
//! are padded with `Empty` cells. Neighbor links are the origins of the +x and
//! +y chunks and are resolved by index.
//!
//! ## Edge Propagation
//!
//! The tile of a cell depends on the cells to its +x and +y, so a write on a
//! chunk's low edge changes tiles owned by the chunk to its −x side, the chunk
//! to its −y side and, at a corner, the diagonal chunk. Those chunks are marked
//! dirty alongside the written one.
//!
//! ## Culling
//!
//! `draw` converts the camera rectangle into the range of chunk columns and rows
//! it overlaps. Only those chunks are flushed and rendered, so draw cost follows
//! the visible area rather than the world size.

use cgmath::Point2;
use log::{info, trace};

use crate::{
    core::StResource,
    error::{Result, TerrainError},
    voxels::{
        camera::Viewport,
        chunk::{Chunk, ChunkLookup},
        collaborators::TileSinks,
        material::Material,
        material_grid::MaterialGrid,
    },
};

/// What a draw call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Chunks handed to the renderer
    pub chunks_drawn: usize,
    /// Chunks whose tile cache was rebuilt
    pub chunks_flushed: usize,
}

/// A finite, eagerly-built world of chunks.
///
/// # Examples
///
/// ```
/// use voxel_terrain::voxels::{
///     camera::CameraBounds,
///     collaborators::{SpriteRegistry, TileSinks},
///     material::Material,
///     material_grid::MaterialGrid,
///     world_grid::WorldGrid,
/// };
///
/// let mut sprites = SpriteRegistry::new();
/// let cells = MaterialGrid::filled(16, 16, Material::Dirt);
/// let mut world =
///     WorldGrid::build(&cells, 8, 8, 32.0, &mut TileSinks::render_only(&mut sprites)).unwrap();
///
/// assert!(world.write(3, 4, Material::Iron));
/// assert_eq!(world.read(3, 4), Material::Iron);
/// assert!(!world.write(16, 0, Material::Iron));
///
/// let view = CameraBounds { left: 0.0, right: 100.0, bottom: 0.0, top: 100.0 };
/// let stats = world.draw(&view, &mut TileSinks::render_only(&mut sprites));
/// assert_eq!(stats.chunks_drawn, 1);
/// ```
pub struct WorldGrid {
    chunks: Vec<StResource<Chunk>>,
    columns: usize,
    rows: usize,
    width: i32,
    height: i32,
    chunk_width: i32,
    chunk_height: i32,
    cell_size: f32,
}

/// Resolves neighbor origins to chunks by grid index.
struct GridLookup<'a> {
    chunks: &'a [StResource<Chunk>],
    columns: usize,
    rows: usize,
    chunk_width: i32,
    chunk_height: i32,
}

impl ChunkLookup for GridLookup<'_> {
    fn chunk_at(&mut self, origin: Point2<i32>) -> Option<StResource<Chunk>> {
        if origin.x < 0 || origin.y < 0 {
            return None;
        }
        let column = (origin.x / self.chunk_width) as usize;
        let row = (origin.y / self.chunk_height) as usize;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.chunks.get(row * self.columns + column).cloned()
    }
}

impl WorldGrid {
    /// Partitions `materials` into chunks, links them, and flushes every chunk.
    ///
    /// Chunks are flushed in reverse creation order.
    ///
    /// # Arguments
    /// * `materials` - The world's cells; its dimensions become the world's
    /// * `chunk_width` - Chunk width in cells
    /// * `chunk_height` - Chunk height in cells
    /// * `cell_size` - Side length of one cell in world units
    /// * `sinks` - Collaborators receiving the initial tiles
    ///
    /// # Errors
    /// [`TerrainError::InvalidConfig`] if a chunk dimension or the cell size is
    /// not positive.
    pub fn build(
        materials: &MaterialGrid,
        chunk_width: usize,
        chunk_height: usize,
        cell_size: f32,
        sinks: &mut TileSinks<'_>,
    ) -> Result<Self> {
        if chunk_width == 0 || chunk_height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "chunk dimensions must be positive, got {chunk_width}x{chunk_height}"
            )));
        }
        if !(cell_size > 0.0) {
            return Err(TerrainError::InvalidConfig(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        let columns = materials.width().div_ceil(chunk_width);
        let rows = materials.height().div_ceil(chunk_height);
        let cw = chunk_width as i32;
        let ch = chunk_height as i32;

        let mut chunks = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let cells = materials.window(
                    column * chunk_width,
                    row * chunk_height,
                    chunk_width,
                    chunk_height,
                );
                let origin = Point2::new(column as i32 * cw, row as i32 * ch);
                let mut chunk = Chunk::new(origin, cells, cell_size);
                chunk.set_neighbors(
                    (column + 1 < columns).then(|| Point2::new(origin.x + cw, origin.y)),
                    (row + 1 < rows).then(|| Point2::new(origin.x, origin.y + ch)),
                );
                chunks.push(StResource::new(chunk));
            }
        }

        let world = WorldGrid {
            chunks,
            columns,
            rows,
            width: materials.width() as i32,
            height: materials.height() as i32,
            chunk_width: cw,
            chunk_height: ch,
            cell_size,
        };

        let mut lookup = world.lookup();
        for chunk in world.chunks.iter().rev() {
            chunk.get_mut().flush(&mut lookup, sinks);
        }

        info!(
            "Built {}x{} world of {} chunks",
            world.width,
            world.height,
            world.chunks.len()
        );
        Ok(world)
    }

    fn lookup(&self) -> GridLookup<'_> {
        GridLookup {
            chunks: &self.chunks,
            columns: self.columns,
            rows: self.rows,
            chunk_width: self.chunk_width,
            chunk_height: self.chunk_height,
        }
    }

    /// World width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// World height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of chunks as `(columns, rows)`.
    pub fn chunk_counts(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Iterates over the chunks, row-major.
    pub fn chunks(&self) -> impl Iterator<Item = &StResource<Chunk>> {
        self.chunks.iter()
    }

    /// Returns the chunk owning world `(x, y)`.
    ///
    /// # Returns
    /// `None` outside `[0, width) × [0, height)`.
    pub fn locate(&self, x: i32, y: i32) -> Option<StResource<Chunk>> {
        if !(0..self.width).contains(&x) || !(0..self.height).contains(&y) {
            return None;
        }
        let column = (x / self.chunk_width) as usize;
        let row = (y / self.chunk_height) as usize;
        self.chunks.get(row * self.columns + column).cloned()
    }

    /// Reads the material at world `(x, y)`, `Empty` outside the world.
    pub fn read(&self, x: i32, y: i32) -> Material {
        match self.locate(x, y) {
            Some(chunk) => chunk.get().read(x, y, &mut self.lookup()),
            None => Material::Empty,
        }
    }

    /// Writes `material` at world `(x, y)`.
    ///
    /// The owning chunk is marked dirty, and so are the chunks sharing the
    /// written cell's edge when it lies on a chunk's low edge.
    ///
    /// # Returns
    /// `false` (and nothing changes) outside the world.
    pub fn write(&mut self, x: i32, y: i32, material: Material) -> bool {
        let Some(chunk) = self.locate(x, y) else {
            return false;
        };
        chunk.get_mut().write(x, y, material);

        let low_x = x % self.chunk_width == 0 && x > 0;
        let low_y = y % self.chunk_height == 0 && y > 0;
        let mut touched = Vec::with_capacity(3);
        if low_x {
            touched.push((x - 1, y));
        }
        if low_y {
            touched.push((x, y - 1));
        }
        if low_x && low_y {
            touched.push((x - 1, y - 1));
        }
        for (nx, ny) in touched {
            if let Some(neighbor) = self.locate(nx, ny) {
                neighbor.get_mut().mark_dirty();
            }
        }
        true
    }

    /// Flushes and renders the chunks overlapping the camera's view.
    ///
    /// A view entirely outside the world flushes and draws nothing.
    pub fn draw(&mut self, camera: &dyn Viewport, sinks: &mut TileSinks<'_>) -> DrawStats {
        let mut stats = DrawStats::default();
        let Some((columns, rows)) = self.visible_range(camera) else {
            trace!("View misses the world, nothing to draw");
            return stats;
        };

        let mut lookup = self.lookup();
        for row in rows {
            for column in columns.clone() {
                let chunk = &self.chunks[row * self.columns + column];
                if chunk.get_mut().flush(&mut lookup, sinks) {
                    stats.chunks_flushed += 1;
                }
                chunk.get().render(&mut *sinks.render);
                stats.chunks_drawn += 1;
            }
        }
        stats
    }

    /// Column and row ranges of the chunks the camera's view overlaps.
    fn visible_range(
        &self,
        camera: &dyn Viewport,
    ) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let (min, max) = camera.scaled_bounds().to_cell_range(self.cell_size);
        if max.x < 0 || max.y < 0 || min.x >= self.width || min.y >= self.height {
            return None;
        }
        let first_column = min.x.max(0) / self.chunk_width;
        let last_column = max.x.min(self.width - 1) / self.chunk_width;
        let first_row = min.y.max(0) / self.chunk_height;
        let last_row = max.y.min(self.height - 1) / self.chunk_height;
        Some((
            first_column as usize..last_column as usize + 1,
            first_row as usize..last_row as usize + 1,
        ))
    }

    /// Flushes every dirty chunk, visible or not.
    ///
    /// # Returns
    /// The number of chunks rebuilt.
    pub fn flush_all(&mut self, sinks: &mut TileSinks<'_>) -> usize {
        let mut lookup = self.lookup();
        self.chunks
            .iter()
            .filter(|chunk| chunk.get_mut().flush(&mut lookup, sinks))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::{
        camera::{Camera2D, CameraBounds},
        collaborators::{ColliderRegistry, SpriteRegistry},
    };
    use Material::{Dirt, Empty, Iron};

    fn bounds(left: f32, right: f32, bottom: f32, top: f32) -> CameraBounds {
        CameraBounds {
            left,
            right,
            bottom,
            top,
        }
    }

    fn built(cells: &MaterialGrid, sprites: &mut SpriteRegistry) -> WorldGrid {
        WorldGrid::build(cells, 4, 4, 1.0, &mut TileSinks::render_only(sprites)).unwrap()
    }

    #[test]
    fn single_solid_cell_world_has_one_tile() {
        let mut sprites = SpriteRegistry::new();
        let mut colliders = ColliderRegistry::new();
        let cells = MaterialGrid::from_rows(&[[Dirt, Empty], [Empty, Empty]]);
        let world = WorldGrid::build(
            &cells,
            8,
            8,
            32.0,
            &mut TileSinks::new(&mut sprites, &mut colliders),
        )
        .unwrap();

        let chunk = world.locate(0, 0).unwrap();
        assert_eq!(chunk.get().compute_mask(0, 0, &mut world.lookup()), 1);
        assert_eq!(chunk.get().tile_count(), 1);
        assert_eq!(sprites.len(), 1);
        assert_eq!(colliders.len(), 1);
    }

    #[test]
    fn partial_chunks_are_padded_and_linked() {
        let mut sprites = SpriteRegistry::new();
        let world = built(&MaterialGrid::filled(6, 5, Dirt), &mut sprites);

        assert_eq!(world.chunk_counts(), (2, 2));
        let corner = world.locate(5, 4).unwrap();
        assert_eq!(corner.get().origin(), Point2::new(4, 4));
        assert_eq!(corner.get().width(), 4);
        assert_eq!(corner.get().cells().count(Dirt), 2);
        assert_eq!(corner.get().neighbors(), (None, None));

        let first = world.locate(0, 0).unwrap();
        assert_eq!(
            first.get().neighbors(),
            (Some(Point2::new(4, 0)), Some(Point2::new(0, 4)))
        );
        assert!(world.chunks().all(|chunk| !chunk.get().is_dirty()));
    }

    #[test]
    fn out_of_range_access_is_total() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(4, 4, Dirt), &mut sprites);

        assert!(world.locate(-1, 0).is_none());
        assert!(world.locate(0, 4).is_none());
        assert_eq!(world.read(-1, 2), Empty);
        assert_eq!(world.read(4, 0), Empty);
        assert!(!world.write(4, 0, Iron));
        assert!(!world.write(0, -1, Iron));
        assert!(world.chunks().all(|chunk| !chunk.get().is_dirty()));
    }

    #[test]
    fn reads_cross_chunk_boundaries() {
        let mut sprites = SpriteRegistry::new();
        let mut cells = MaterialGrid::filled(8, 8, Empty);
        cells.set(4, 0, Iron);
        cells.set(0, 4, Dirt);
        let world = built(&cells, &mut sprites);

        let first = world.locate(0, 0).unwrap();
        assert_eq!(first.get().read(4, 0, &mut world.lookup()), Iron);
        assert_eq!(first.get().read(0, 4, &mut world.lookup()), Dirt);
        assert_eq!(world.read(4, 0), Iron);
        assert_eq!(first.get().compute_mask(3, 0, &mut world.lookup()), 2);
    }

    #[test]
    fn low_edge_write_dirties_the_chunks_sharing_it() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(8, 8, Empty), &mut sprites);

        assert!(world.write(4, 4, Dirt));
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            assert!(world.locate(x, y).unwrap().get().is_dirty(), "chunk at ({x}, {y})");
        }
        assert_eq!(world.flush_all(&mut TileSinks::render_only(&mut sprites)), 4);

        // The −x, −y and diagonal chunks each picked up one corner of the cell.
        let left = world.locate(0, 4).unwrap();
        assert_eq!(left.get().tiles_at(3, 4)[0].mask, 2);
        let below = world.locate(4, 0).unwrap();
        assert_eq!(below.get().tiles_at(4, 3)[0].mask, 8);
        let diagonal = world.locate(0, 0).unwrap();
        assert_eq!(diagonal.get().tiles_at(3, 3)[0].mask, 4);
        assert_eq!(sprites.len(), 4);
    }

    #[test]
    fn interior_write_dirties_only_the_owner() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(8, 8, Empty), &mut sprites);

        assert!(world.write(5, 2, Dirt));
        let dirty: Vec<_> = world
            .chunks()
            .filter(|chunk| chunk.get().is_dirty())
            .map(|chunk| chunk.get().origin())
            .collect();
        assert_eq!(dirty, vec![Point2::new(4, 0)]);
    }

    #[test]
    fn draw_flushes_and_renders_only_visible_chunks() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(12, 12, Dirt), &mut sprites);
        world.write(1, 1, Empty);
        world.write(9, 9, Empty);

        let stats = world.draw(
            &bounds(0.0, 3.5, 0.0, 3.5),
            &mut TileSinks::render_only(&mut sprites),
        );
        assert_eq!(
            stats,
            DrawStats {
                chunks_drawn: 1,
                chunks_flushed: 1
            }
        );
        assert_eq!(sprites.take_draw_calls(), vec![Point2::new(0, 0)]);
        assert!(world.locate(9, 9).unwrap().get().is_dirty());

        let stats = world.draw(
            &bounds(-10.0, 100.0, 5.0, 6.0),
            &mut TileSinks::render_only(&mut sprites),
        );
        assert_eq!(stats.chunks_drawn, 3);
        assert_eq!(stats.chunks_flushed, 0);
    }

    #[test]
    fn zoom_widens_the_culled_range() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(12, 12, Dirt), &mut sprites);

        let camera = Camera2D::new(4.0, 4.0, 3.0, 3.0);
        let unzoomed = world.draw(&camera, &mut TileSinks::render_only(&mut sprites));
        let zoomed = world.draw(&camera.with_zoom(3.0), &mut TileSinks::render_only(&mut sprites));
        assert_eq!(unzoomed.chunks_drawn, 1);
        assert_eq!(zoomed.chunks_drawn, 9);
    }

    #[test]
    fn draw_outside_the_world_does_nothing() {
        let mut sprites = SpriteRegistry::new();
        let mut world = built(&MaterialGrid::filled(8, 8, Dirt), &mut sprites);
        world.write(0, 0, Iron);
        let traffic = sprites.traffic();

        for view in [
            bounds(100.0, 200.0, 0.0, 8.0),
            bounds(-50.0, -0.5, 0.0, 8.0),
            bounds(0.0, 8.0, -9.0, -1.0),
        ] {
            let stats = world.draw(&view, &mut TileSinks::render_only(&mut sprites));
            assert_eq!(stats, DrawStats::default());
        }
        assert!(sprites.take_draw_calls().is_empty());
        assert_eq!(sprites.traffic(), traffic);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut sprites = SpriteRegistry::new();
        let result = WorldGrid::build(
            &MaterialGrid::filled(4, 4, Dirt),
            0,
            4,
            1.0,
            &mut TileSinks::render_only(&mut sprites),
        );
        assert!(matches!(result, Err(TerrainError::InvalidConfig(_))));
    }
}

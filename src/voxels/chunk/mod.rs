//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size rectangular block of
//! material cells, the unit of tessellation and caching.
//!
//! ## Neighbors
//!
//! A chunk's tiles depend on one row and one column of cells beyond its own
//! +x and +y edges. Rather than holding references to the adjacent chunks, a
//! chunk stores the *origins* of its +x and +y neighbors and resolves them
//! through a [`ChunkLookup`] supplied by whichever container owns it. Reads
//! before the chunk's origin are never resolved: the container always
//! addresses the chunk that owns a coordinate.
//!
//! ## Dirty Tracking
//!
//! Writes only flip the dirty flag. The tile cache is rebuilt on the next
//! [`Chunk::flush`], so a burst of edits between two draws costs one rebuild.
//!
//! ## Orphaned Colliders
//!
//! Clearing tiles without a physics backend cannot unregister their colliders.
//! Their handles are kept and unregistered by the next clear that has one.

use std::collections::HashMap;

use cgmath::Point2;
use log::{debug, trace};

use crate::{
    core::StResource,
    voxels::{
        collaborators::{
            ColliderHandle, ColliderRequest, RenderBackend, SpriteHandle, SpriteRequest, TileSinks,
        },
        material::{tile_shape, Material},
        material_grid::MaterialGrid,
    },
};

pub mod tessellation;

pub use tessellation::TileLayer;

/// Default chunk width in cells.
pub const DEFAULT_CHUNK_WIDTH: i32 = 8;
/// Default chunk height in cells.
pub const DEFAULT_CHUNK_HEIGHT: i32 = 8;

/// Resolves chunks by origin on behalf of a chunk reading past its own edge.
pub trait ChunkLookup {
    /// Returns the chunk whose origin is `origin`, if there is one.
    fn chunk_at(&mut self, origin: Point2<i32>) -> Option<StResource<Chunk>>;
}

/// A lookup for a chunk with no neighbors at all.
pub struct NoNeighbors;

impl ChunkLookup for NoNeighbors {
    fn chunk_at(&mut self, _origin: Point2<i32>) -> Option<StResource<Chunk>> {
        None
    }
}

impl ChunkLookup for HashMap<Point2<i32>, StResource<Chunk>> {
    fn chunk_at(&mut self, origin: Point2<i32>) -> Option<StResource<Chunk>> {
        self.get(&origin).cloned()
    }
}

/// A live tile: the sprite (and optional collider) registered for one layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileInstance {
    /// Material of the layer
    pub material: Material,
    /// Tile variant of the layer
    pub mask: u8,
    /// The registered sprite
    pub sprite: SpriteHandle,
    /// The registered collider, if the layer has one
    pub collider: Option<ColliderHandle>,
}

/// A fixed-size block of cells with its tile cache.
pub struct Chunk {
    /// World cell coordinate of the chunk's first cell.
    origin: Point2<i32>,
    /// The chunk's cells; local `(0, 0)` is `origin`.
    cells: MaterialGrid,
    /// Origin of the chunk lying immediately past the +x edge.
    neighbor_x: Option<Point2<i32>>,
    /// Origin of the chunk lying immediately past the +y edge.
    neighbor_y: Option<Point2<i32>>,
    /// Side length of one cell in world units.
    cell_size: f32,
    /// Set when `tiles` is stale relative to `cells`.
    dirty: bool,
    /// Live tile instances keyed by world cell.
    tiles: HashMap<Point2<i32>, Vec<TileInstance>>,
    /// Colliders of cleared tiles still registered with the physics backend.
    orphaned_colliders: Vec<ColliderHandle>,
}

impl Chunk {
    /// Creates a dirty chunk with no neighbors.
    ///
    /// # Arguments
    /// * `origin` - World cell coordinate of the chunk's first cell
    /// * `cells` - The chunk's cells; its dimensions become the chunk's
    /// * `cell_size` - Side length of one cell in world units
    pub fn new(origin: Point2<i32>, cells: MaterialGrid, cell_size: f32) -> Self {
        Chunk {
            origin,
            cells,
            neighbor_x: None,
            neighbor_y: None,
            cell_size,
            dirty: true,
            tiles: HashMap::new(),
            orphaned_colliders: Vec::new(),
        }
    }

    /// Links the chunks lying past the +x and +y edges.
    pub fn set_neighbors(
        &mut self,
        neighbor_x: Option<Point2<i32>>,
        neighbor_y: Option<Point2<i32>>,
    ) {
        self.neighbor_x = neighbor_x;
        self.neighbor_y = neighbor_y;
    }

    /// Origins of the `(+x, +y)` neighbors.
    pub fn neighbors(&self) -> (Option<Point2<i32>>, Option<Point2<i32>>) {
        (self.neighbor_x, self.neighbor_y)
    }

    /// World cell coordinate of the chunk's first cell.
    pub fn origin(&self) -> Point2<i32> {
        self.origin
    }

    /// Width in cells.
    pub fn width(&self) -> i32 {
        self.cells.width() as i32
    }

    /// Height in cells.
    pub fn height(&self) -> i32 {
        self.cells.height() as i32
    }

    /// The chunk's cells.
    pub fn cells(&self) -> &MaterialGrid {
        &self.cells
    }

    /// Returns `true` if world `(x, y)` is one of this chunk's cells.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.local(x, y).is_some()
    }

    fn local(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let lx = x - self.origin.x;
        let ly = y - self.origin.y;
        if (0..self.width()).contains(&lx) && (0..self.height()).contains(&ly) {
            Some((lx as usize, ly as usize))
        } else {
            None
        }
    }

    /// Reads the material at world `(x, y)`.
    ///
    /// Past the +x edge the read is delegated to the +x neighbor, past the +y
    /// edge to the +y neighbor. Unlinked or unresolvable neighbors and
    /// coordinates before the origin read as `Empty`.
    pub fn read(&self, x: i32, y: i32, lookup: &mut dyn ChunkLookup) -> Material {
        let lx = x - self.origin.x;
        let ly = y - self.origin.y;
        if lx < 0 || ly < 0 {
            Material::Empty
        } else if lx >= self.width() {
            Self::read_through(self.neighbor_x, x, y, lookup)
        } else if ly >= self.height() {
            Self::read_through(self.neighbor_y, x, y, lookup)
        } else {
            self.cells
                .get(lx as usize, ly as usize)
                .unwrap_or(Material::Empty)
        }
    }

    fn read_through(
        link: Option<Point2<i32>>,
        x: i32,
        y: i32,
        lookup: &mut dyn ChunkLookup,
    ) -> Material {
        match link.and_then(|origin| lookup.chunk_at(origin)) {
            Some(neighbor) => neighbor.get().read(x, y, lookup),
            None => Material::Empty,
        }
    }

    /// Writes `material` at world `(x, y)` and marks the chunk dirty.
    ///
    /// Neighboring chunks are left alone; dirtying them is the container's job.
    ///
    /// # Returns
    /// `false` (and nothing changes) if the cell is not in this chunk.
    pub fn write(&mut self, x: i32, y: i32, material: Material) -> bool {
        match self.local(x, y) {
            Some((lx, ly)) => {
                self.cells.set(lx, ly, material);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Marks the tile cache stale. Nothing is recomputed until the next flush.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns `true` if the tile cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds the tile cache if the chunk is dirty.
    ///
    /// Every cached instance is unregistered from the collaborators, every cell
    /// is re-tessellated, and one sprite per layer (plus a collider for the
    /// representative layer of a colliding material, when physics is present)
    /// is registered and cached.
    ///
    /// # Returns
    /// `true` if the cache was rebuilt.
    pub fn flush(&mut self, lookup: &mut dyn ChunkLookup, sinks: &mut TileSinks<'_>) -> bool {
        if !self.dirty {
            return false;
        }
        self.clear_tiles(sinks);

        let mut tiles = HashMap::new();
        for ly in 0..self.height() {
            for lx in 0..self.width() {
                let cell = Point2::new(self.origin.x + lx, self.origin.y + ly);
                let layers = self.tile_layers(cell.x, cell.y, lookup);
                let instances = self.instantiate(cell, &layers, sinks);
                if !instances.is_empty() {
                    tiles.insert(cell, instances);
                }
            }
        }

        trace!(
            "Flushed chunk at {:?}: {} cells with tiles",
            self.origin,
            tiles.len()
        );
        self.tiles = tiles;
        self.dirty = false;
        true
    }

    /// Registers the instances for one cell's layers.
    fn instantiate(
        &self,
        cell: Point2<i32>,
        layers: &[TileLayer],
        sinks: &mut TileSinks<'_>,
    ) -> Vec<TileInstance> {
        let position = Point2::new(cell.x as f32 * self.cell_size, cell.y as f32 * self.cell_size);
        let mut instances = Vec::with_capacity(layers.len());

        for (index, layer) in layers.iter().enumerate() {
            let properties = layer.material.properties();
            match properties.tile_set {
                Some(tile_set) if tile_set.contains(layer.mask) => {}
                _ => continue,
            }

            let sprite = sinks.render.register_sprite(SpriteRequest {
                chunk_origin: self.origin,
                cell,
                position,
                material: layer.material,
                tile_index: layer.mask,
            });

            let collider = match sinks.physics.as_deref_mut() {
                Some(physics) if index == 0 && properties.collides => {
                    Some(physics.register_collider(ColliderRequest {
                        cell,
                        material: layer.material,
                        mask: layer.mask,
                        outline: tile_shape::world_outline(layer.mask, position, self.cell_size),
                        friction: properties.friction,
                        elasticity: properties.elasticity,
                    }))
                }
                _ => None,
            };

            instances.push(TileInstance {
                material: layer.material,
                mask: layer.mask,
                sprite,
                collider,
            });
        }

        instances
    }

    /// Unregisters every cached instance.
    ///
    /// Colliders that cannot be unregistered for lack of a physics backend are
    /// kept as orphans until a clear with one.
    fn clear_tiles(&mut self, sinks: &mut TileSinks<'_>) {
        if let Some(physics) = sinks.physics.as_deref_mut() {
            for collider in self.orphaned_colliders.drain(..) {
                physics.unregister_collider(collider);
            }
        }

        let orphaned_before = self.orphaned_colliders.len();
        for (_, instances) in self.tiles.drain() {
            for instance in instances {
                sinks.render.unregister_sprite(instance.sprite);
                if let Some(collider) = instance.collider {
                    match sinks.physics.as_deref_mut() {
                        Some(physics) => physics.unregister_collider(collider),
                        None => self.orphaned_colliders.push(collider),
                    }
                }
            }
        }

        let orphaned = self.orphaned_colliders.len() - orphaned_before;
        if orphaned > 0 {
            debug!(
                "Chunk {:?} keeps {} colliders until a physics backend is given",
                self.origin, orphaned
            );
        }
    }

    /// Colliders of cleared tiles that are still registered with physics.
    pub fn orphaned_colliders(&self) -> &[ColliderHandle] {
        &self.orphaned_colliders
    }

    /// Hands over the orphaned colliders, leaving none behind.
    ///
    /// Containers call it before dropping a chunk so the handles outlive it.
    pub fn take_orphaned_colliders(&mut self) -> Vec<ColliderHandle> {
        std::mem::take(&mut self.orphaned_colliders)
    }

    /// Unregisters every cached instance and marks the chunk dirty, so a later
    /// flush rebuilds it from scratch.
    pub fn release(&mut self, sinks: &mut TileSinks<'_>) {
        self.clear_tiles(sinks);
        self.dirty = true;
    }

    /// Hands the chunk's batch to the renderer.
    pub fn render(&self, render: &mut dyn RenderBackend) {
        render.draw_batch(self.origin);
    }

    /// Live instances of the cell at world `(x, y)`.
    pub fn tiles_at(&self, x: i32, y: i32) -> &[TileInstance] {
        self.tiles
            .get(&Point2::new(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of live instances in the chunk.
    pub fn tile_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }
}

//! # Chunk Store Module
//!
//! This module provides the `ChunkStore` struct: an effectively infinite world
//! whose chunks are paged in on demand and kept in a bounded LRU cache.
//!
//! ## Paging
//!
//! Chunks are keyed by origin, a cell coordinate that is a multiple of the chunk
//! size. The first access to an origin loads the chunk's file from the state
//! directory, or generates the chunk and saves it right away, so generation
//! happens once per origin. Every edit is saved before `write` returns, which
//! makes any cached chunk safe to drop at any time.
//!
//! ## Lazy Neighbors
//!
//! A chunk's +x and +y links name origins that may not be cached yet. The store
//! is itself the chunk's [`ChunkLookup`]: resolving a link goes through
//! [`ChunkStore::get`], so a neighbor is paged in only when tessellation
//! actually reads from it. A failure while resolving is kept and returned by
//! the enclosing [`ChunkStore::draw`].
//!
//! ## Eviction
//!
//! Chunks pushed out of the cache may still own registered tiles. They are
//! queued and released the next time the store is handed the collaborators.
//! Colliders a chunk could not unregister, because it was released without a
//! physics backend, outlive the chunk in the store and are unregistered by the
//! next release that has one.

use std::num::NonZeroUsize;

use cgmath::Point2;
use log::{debug, info, trace, warn};
use lru::LruCache;
use web_time::Instant;

use crate::{
    config::TerrainConfig,
    core::StResource,
    error::{Result, TerrainError},
    voxels::{
        camera::Viewport,
        chunk::{Chunk, ChunkLookup, NoNeighbors},
        collaborators::{ColliderHandle, TileSinks},
        generation::{MaterialTable, TerrainGenerator},
        material::Material,
        world_grid::DrawStats,
    },
};

pub mod persistence;

pub use persistence::ChunkPersistence;

/// A lazily-paged, disk-backed world of chunks.
pub struct ChunkStore {
    cache: LruCache<Point2<i32>, StResource<Chunk>>,
    persistence: ChunkPersistence,
    generator: TerrainGenerator,
    materials: MaterialTable,
    base_material: Option<Material>,
    chunk_width: i32,
    chunk_height: i32,
    cell_size: f32,
    /// Evicted chunks whose tiles are still registered.
    pending_release: Vec<StResource<Chunk>>,
    /// Colliders left registered by chunks dropped from memory.
    orphaned_colliders: Vec<ColliderHandle>,
    /// First failure met while resolving a neighbor.
    deferred_error: Option<TerrainError>,
    generated: usize,
    loaded: usize,
}

impl ChunkStore {
    /// Opens a store over `config.state_dir`, creating the directory if needed.
    ///
    /// # Errors
    /// The configuration is invalid or the directory cannot be created.
    pub fn new(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or_else(|| {
            TerrainError::InvalidConfig("cache capacity must be positive".to_string())
        })?;
        let persistence = ChunkPersistence::open(
            &config.state_dir,
            config.chunk_width as u32,
            config.chunk_height as u32,
        )?;

        info!(
            "Opened chunk store at {} (seed {}, {}x{} chunks, cache of {})",
            persistence.dir().display(),
            config.seed,
            config.chunk_width,
            config.chunk_height,
            capacity
        );

        Ok(ChunkStore {
            cache: LruCache::new(capacity),
            persistence,
            generator: TerrainGenerator::new(config.seed),
            materials: config.materials.clone(),
            base_material: config.base_material,
            chunk_width: config.chunk_width as i32,
            chunk_height: config.chunk_height as i32,
            cell_size: config.cell_size,
            pending_release: Vec::new(),
            orphaned_colliders: Vec::new(),
            deferred_error: None,
            generated: 0,
            loaded: 0,
        })
    }

    /// Origin of the chunk owning world `(x, y)`.
    pub fn chunk_origin_of(&self, x: i32, y: i32) -> Point2<i32> {
        Point2::new(
            x.div_euclid(self.chunk_width) * self.chunk_width,
            y.div_euclid(self.chunk_height) * self.chunk_height,
        )
    }

    /// The file store backing the chunks.
    pub fn persistence(&self) -> &ChunkPersistence {
        &self.persistence
    }

    /// Number of chunks currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if the chunk at `origin` is cached.
    pub fn is_cached(&self, origin: Point2<i32>) -> bool {
        self.cache.contains(&origin)
    }

    /// Number of colliders of dropped chunks still waiting for a physics backend.
    pub fn orphaned_collider_count(&self) -> usize {
        self.orphaned_colliders.len()
    }

    /// Number of chunks generated since the store was opened.
    pub fn generated_count(&self) -> usize {
        self.generated
    }

    /// Number of chunks loaded from disk since the store was opened.
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    /// Returns the chunk at `origin`, paging it in if needed.
    ///
    /// A cache miss loads the chunk's file, or generates the chunk and saves it
    /// when there is no file. The chunk is linked to its +x and +y origins,
    /// which stay unresolved until read.
    ///
    /// # Errors
    /// [`TerrainError::MisalignedOrigin`] if `origin` is not on the chunk grid,
    /// or any persistence error.
    pub fn get(&mut self, origin: Point2<i32>) -> Result<StResource<Chunk>> {
        if origin.x.rem_euclid(self.chunk_width) != 0
            || origin.y.rem_euclid(self.chunk_height) != 0
        {
            return Err(TerrainError::MisalignedOrigin {
                x: origin.x,
                y: origin.y,
                width: self.chunk_width,
                height: self.chunk_height,
            });
        }
        if let Some(chunk) = self.cache.get(&origin) {
            return Ok(chunk.clone());
        }

        let cells = match self.persistence.load(origin)? {
            Some(cells) => {
                self.loaded += 1;
                cells
            }
            None => {
                let start = Instant::now();
                let cells = self.generator.generate_region(
                    origin,
                    self.chunk_width as usize,
                    self.chunk_height as usize,
                    &self.materials,
                    self.base_material,
                )?;
                self.persistence.save(origin, &cells)?;
                self.generated += 1;
                debug!("Generated chunk {:?} in {:?}", origin, start.elapsed());
                cells
            }
        };

        let mut chunk = Chunk::new(origin, cells, self.cell_size);
        chunk.set_neighbors(
            Some(Point2::new(origin.x + self.chunk_width, origin.y)),
            Some(Point2::new(origin.x, origin.y + self.chunk_height)),
        );
        let chunk = StResource::new(chunk);

        if let Some((evicted_origin, evicted)) = self.cache.push(origin, chunk.clone()) {
            debug!("Evicted chunk {:?}", evicted_origin);
            self.pending_release.push(evicted);
        }
        Ok(chunk)
    }

    /// Reads the material at world `(x, y)`.
    pub fn read(&mut self, x: i32, y: i32) -> Result<Material> {
        let chunk = self.get(self.chunk_origin_of(x, y))?;
        let material = chunk.get().read(x, y, &mut NoNeighbors);
        Ok(material)
    }

    /// Writes `material` at world `(x, y)` and saves the owning chunk.
    ///
    /// The edited cells are saved before the cached chunk changes, so a failed
    /// save leaves memory and disk agreeing on the old material.
    ///
    /// When the cell lies on its chunk's low edge, the cached chunks sharing
    /// that edge are marked dirty. Chunks that are not cached are left alone:
    /// they tessellate from the saved state when paged in.
    ///
    /// # Errors
    /// Any error paging in the owning chunk or saving it.
    pub fn write(&mut self, x: i32, y: i32, material: Material) -> Result<()> {
        let origin = self.chunk_origin_of(x, y);
        let chunk = self.get(origin)?;

        let mut edited = chunk.get().cells().clone();
        edited.set((x - origin.x) as usize, (y - origin.y) as usize, material);
        self.persistence.save(origin, &edited)?;
        chunk.get_mut().write(x, y, material);

        self.dirty_cached_neighbors(origin, x == origin.x, y == origin.y);
        Ok(())
    }

    /// Marks the cached −x, −y and diagonal neighbors of `origin` dirty.
    fn dirty_cached_neighbors(&mut self, origin: Point2<i32>, low_x: bool, low_y: bool) {
        let mut touched = Vec::with_capacity(3);
        if low_x {
            touched.push(Point2::new(origin.x - self.chunk_width, origin.y));
        }
        if low_y {
            touched.push(Point2::new(origin.x, origin.y - self.chunk_height));
        }
        if low_x && low_y {
            touched.push(Point2::new(
                origin.x - self.chunk_width,
                origin.y - self.chunk_height,
            ));
        }
        for neighbor in touched {
            if let Some(chunk) = self.cache.peek(&neighbor) {
                chunk.get_mut().mark_dirty();
            }
        }
    }

    /// Pages in, flushes and renders every chunk in the camera's view, padded
    /// by one chunk on each side.
    ///
    /// # Errors
    /// Any error met paging in a chunk, including neighbors resolved during
    /// tessellation.
    pub fn draw(&mut self, camera: &dyn Viewport, sinks: &mut TileSinks<'_>) -> Result<DrawStats> {
        self.release_evicted(sinks);
        self.deferred_error = None;

        let (min, max) = camera.scaled_bounds().to_cell_range(self.cell_size);
        let first = self.chunk_origin_of(min.x, min.y);
        let last = self.chunk_origin_of(max.x, max.y);
        let mut origins = Vec::new();
        let mut y = first.y - self.chunk_height;
        while y <= last.y + self.chunk_height {
            let mut x = first.x - self.chunk_width;
            while x <= last.x + self.chunk_width {
                origins.push(Point2::new(x, y));
                x += self.chunk_width;
            }
            y += self.chunk_height;
        }

        if origins.len() > self.cache.cap().get() {
            warn!(
                "View needs {} chunks but the cache holds {}",
                origins.len(),
                self.cache.cap()
            );
        }

        let chunks = origins
            .into_iter()
            .map(|origin| self.get(origin))
            .collect::<Result<Vec<_>>>()?;

        let mut stats = DrawStats::default();
        for chunk in &chunks {
            if chunk.get_mut().flush(self, sinks) {
                stats.chunks_flushed += 1;
            }
            chunk.get().render(&mut *sinks.render);
            stats.chunks_drawn += 1;
        }
        trace!(
            "Drew {} chunks, flushed {}",
            stats.chunks_drawn,
            stats.chunks_flushed
        );

        self.release_evicted(sinks);
        match self.deferred_error.take() {
            Some(error) => Err(error),
            None => Ok(stats),
        }
    }

    /// Releases the tiles of chunks evicted since the last call.
    ///
    /// # Returns
    /// The number of chunks released.
    pub fn release_evicted(&mut self, sinks: &mut TileSinks<'_>) -> usize {
        let pending = std::mem::take(&mut self.pending_release);
        let released = pending.len();
        for chunk in pending {
            self.retire(&chunk, sinks);
        }
        if let Some(physics) = sinks.physics.as_deref_mut() {
            for collider in self.orphaned_colliders.drain(..) {
                physics.unregister_collider(collider);
            }
        }
        released
    }

    /// Releases a chunk that is leaving memory and keeps its orphaned colliders.
    fn retire(&mut self, chunk: &StResource<Chunk>, sinks: &mut TileSinks<'_>) {
        let mut chunk = chunk.get_mut();
        chunk.release(sinks);
        self.orphaned_colliders.extend(chunk.take_orphaned_colliders());
    }

    /// Drops the chunk at `origin` from memory, releasing its tiles.
    ///
    /// Its saved state is untouched, so the next `get` loads it back.
    ///
    /// # Returns
    /// `false` if the chunk was not cached.
    pub fn evict(&mut self, origin: Point2<i32>, sinks: &mut TileSinks<'_>) -> bool {
        self.release_evicted(sinks);
        match self.cache.pop(&origin) {
            Some(chunk) => {
                self.retire(&chunk, sinks);
                debug!("Evicted chunk {:?}", origin);
                true
            }
            None => false,
        }
    }

    /// Forgets the chunk at `origin` entirely: it is dropped from memory, its
    /// file is deleted, and the next `get` generates it afresh.
    ///
    /// The cached chunks whose tiles read from it are marked dirty.
    pub fn invalidate(&mut self, origin: Point2<i32>, sinks: &mut TileSinks<'_>) -> Result<()> {
        self.evict(origin, sinks);
        if self.persistence.remove(origin)? {
            debug!("Deleted saved chunk {:?}", origin);
        }
        self.dirty_cached_neighbors(origin, true, true);
        Ok(())
    }
}

impl ChunkLookup for ChunkStore {
    fn chunk_at(&mut self, origin: Point2<i32>) -> Option<StResource<Chunk>> {
        match self.get(origin) {
            Ok(chunk) => Some(chunk),
            Err(error) => {
                warn!("Could not resolve neighbor chunk {:?}: {}", origin, error);
                if self.deferred_error.is_none() {
                    self.deferred_error = Some(error);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::voxels::{
        camera::CameraBounds,
        collaborators::{ColliderRegistry, SpriteRegistry},
    };
    use Material::{Diamond, Dirt, Empty, Iron};

    fn config(dir: &std::path::Path, cache_capacity: usize) -> TerrainConfig {
        TerrainConfig {
            chunk_width: 4,
            chunk_height: 4,
            cell_size: 1.0,
            seed: 9,
            cache_capacity,
            state_dir: dir.join("state"),
            base_material: Some(Dirt),
            materials: [(Iron, 0.3)].into_iter().collect(),
        }
    }

    fn view(left: f32, right: f32, bottom: f32, top: f32) -> CameraBounds {
        CameraBounds {
            left,
            right,
            bottom,
            top,
        }
    }

    #[test]
    fn chunk_origins_floor_negative_cells() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        assert_eq!(store.chunk_origin_of(0, 3), Point2::new(0, 0));
        assert_eq!(store.chunk_origin_of(-1, -4), Point2::new(-4, -4));
        assert_eq!(store.chunk_origin_of(-5, 9), Point2::new(-8, 8));
    }

    #[test]
    fn misaligned_origins_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        assert!(matches!(
            store.get(Point2::new(2, 0)),
            Err(TerrainError::MisalignedOrigin { x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn chunks_are_generated_once_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        let origin = Point2::new(-4, 8);

        let first = store.get(origin).unwrap();
        assert!(store.persistence().exists(origin));
        let again = store.get(origin).unwrap();
        assert!(first.ptr_eq(&again));
        assert_eq!(store.generated_count(), 1);
        assert_eq!(
            first.get().neighbors(),
            (Some(Point2::new(0, 8)), Some(Point2::new(-4, 12)))
        );

        let mut sprites = SpriteRegistry::new();
        assert!(store.evict(origin, &mut TileSinks::render_only(&mut sprites)));
        let reloaded = store.get(origin).unwrap();
        assert_eq!(store.generated_count(), 1);
        assert_eq!(store.loaded_count(), 1);
        assert_eq!(reloaded.get().cells(), first.get().cells());
    }

    #[test]
    fn writes_survive_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        let mut sprites = SpriteRegistry::new();

        store.write(-3, 5, Diamond).unwrap();
        store.write(-2, 6, Empty).unwrap();
        let written = store.get(Point2::new(-4, 4)).unwrap().get().cells().clone();

        assert!(store.evict(Point2::new(-4, 4), &mut TileSinks::render_only(&mut sprites)));
        assert!(!store.is_cached(Point2::new(-4, 4)));
        assert_eq!(store.read(-3, 5).unwrap(), Diamond);
        assert_eq!(store.read(-2, 6).unwrap(), Empty);
        assert_eq!(store.get(Point2::new(-4, 4)).unwrap().get().cells(), &written);
    }

    #[test]
    fn reopened_store_serves_saved_chunks() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
            store.write(1, 1, Diamond).unwrap();
        }
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        assert_eq!(store.read(1, 1).unwrap(), Diamond);
        assert_eq!(store.generated_count(), 0);
    }

    #[test]
    fn low_edge_writes_dirty_only_cached_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        let mut sprites = SpriteRegistry::new();

        let left = store.get(Point2::new(0, 4)).unwrap();
        left.get_mut().flush(&mut store, &mut TileSinks::render_only(&mut sprites));
        assert!(!left.get().is_dirty());

        store.write(4, 4, Iron).unwrap();
        assert!(left.get().is_dirty());
        // the −y and diagonal chunks are not paged in by the write
        assert!(!store.is_cached(Point2::new(4, 0)));
        assert!(!store.is_cached(Point2::new(0, 0)));
    }

    #[test]
    fn corner_writes_dirty_all_three_cached_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), 16);
        config.base_material = None;
        config.materials = MaterialTable::new();
        let mut store = ChunkStore::new(&config).unwrap();
        let mut sprites = SpriteRegistry::new();

        let neighbors: Vec<_> = [(0, 4), (4, 0), (0, 0)]
            .into_iter()
            .map(|(x, y)| store.get(Point2::new(x, y)).unwrap())
            .collect();
        store.get(Point2::new(4, 4)).unwrap();
        for chunk in &neighbors {
            chunk
                .get_mut()
                .flush(&mut store, &mut TileSinks::render_only(&mut sprites));
            assert!(!chunk.get().is_dirty());
        }
        assert!(sprites.is_empty());

        store.write(4, 4, Dirt).unwrap();
        for chunk in &neighbors {
            assert!(chunk.get().is_dirty(), "chunk {:?}", chunk.get().origin());
            chunk
                .get_mut()
                .flush(&mut store, &mut TileSinks::render_only(&mut sprites));
        }

        // −x chunk: (4, 4) is the bottom-right corner of cell (3, 4)
        assert_eq!(neighbors[0].get().tiles_at(3, 4)[0].mask, 2);
        // −y chunk: top-left corner of cell (4, 3)
        assert_eq!(neighbors[1].get().tiles_at(4, 3)[0].mask, 8);
        // diagonal chunk: top-right corner of cell (3, 3)
        assert_eq!(neighbors[2].get().tiles_at(3, 3)[0].mask, 4);
        assert_eq!(sprites.len(), 3);
    }

    #[test]
    fn failed_saves_leave_the_cached_chunk_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        store.write(1, 2, Diamond).unwrap();

        let path = store.persistence().path_for(Point2::new(0, 0));
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            store.write(1, 2, Empty),
            Err(TerrainError::Image { .. })
        ));
        assert_eq!(store.read(1, 2).unwrap(), Diamond);

        fs::remove_dir(&path).unwrap();
        store.write(1, 2, Iron).unwrap();
        assert_eq!(store.read(1, 2).unwrap(), Iron);
        assert!(store.persistence().exists(Point2::new(0, 0)));
    }

    #[test]
    fn draw_pages_in_the_padded_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 64)).unwrap();
        let mut sprites = SpriteRegistry::new();
        let mut colliders = ColliderRegistry::new();

        let stats = store
            .draw(
                &view(0.0, 3.5, 0.0, 3.5),
                &mut TileSinks::new(&mut sprites, &mut colliders),
            )
            .unwrap();
        assert_eq!(stats.chunks_drawn, 9);
        assert_eq!(stats.chunks_flushed, 9);
        for y in [-4, 0, 4] {
            for x in [-4, 0, 4] {
                assert!(store.is_cached(Point2::new(x, y)), "chunk ({x}, {y})");
            }
        }
        // the padded edge reads one more column and row through its links
        assert!(store.is_cached(Point2::new(8, 0)));
        assert!(!sprites.is_empty());
        assert_eq!(sprites.take_draw_calls().len(), 9);

        let again = store
            .draw(
                &view(0.0, 3.5, 0.0, 3.5),
                &mut TileSinks::new(&mut sprites, &mut colliders),
            )
            .unwrap();
        assert_eq!(again.chunks_flushed, 0);
    }

    #[test]
    fn written_cells_show_up_on_the_next_draw() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 64)).unwrap();
        let mut sprites = SpriteRegistry::new();
        let camera = view(0.0, 3.5, 0.0, 3.5);

        store
            .draw(&camera, &mut TileSinks::render_only(&mut sprites))
            .unwrap();
        store.write(1, 1, Diamond).unwrap();
        let stats = store
            .draw(&camera, &mut TileSinks::render_only(&mut sprites))
            .unwrap();
        assert_eq!(stats.chunks_flushed, 1);
        assert!(sprites
            .sprites_at(Point2::new(1, 1))
            .iter()
            .any(|sprite| sprite.material == Diamond));
    }

    #[test]
    fn evicted_chunks_release_their_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 64)).unwrap();
        let mut sprites = SpriteRegistry::new();
        let mut colliders = ColliderRegistry::new();

        store
            .draw(
                &view(0.0, 3.5, 0.0, 3.5),
                &mut TileSinks::new(&mut sprites, &mut colliders),
            )
            .unwrap();
        for y in [-4, 0, 4] {
            for x in [-4, 0, 4] {
                assert!(store.evict(
                    Point2::new(x, y),
                    &mut TileSinks::new(&mut sprites, &mut colliders)
                ));
            }
        }
        assert!(sprites.is_empty());
        assert!(colliders.is_empty());
    }

    #[test]
    fn colliders_of_render_only_evictions_wait_for_physics() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 64)).unwrap();
        let mut sprites = SpriteRegistry::new();
        let mut colliders = ColliderRegistry::new();
        let camera = view(0.0, 3.5, 0.0, 3.5);

        store
            .draw(&camera, &mut TileSinks::new(&mut sprites, &mut colliders))
            .unwrap();
        let origin = Point2::new(0, 0);
        let registered = colliders.len();
        let owned = {
            let chunk = store.get(origin).unwrap();
            let chunk = chunk.get();
            (0..4)
                .flat_map(|y| (0..4).map(move |x| (x, y)))
                .flat_map(|(x, y)| chunk.tiles_at(x, y).to_vec())
                .filter(|tile| tile.collider.is_some())
                .count()
        };
        assert!(owned > 0);

        assert!(store.evict(origin, &mut TileSinks::render_only(&mut sprites)));
        assert_eq!(colliders.len(), registered);
        assert_eq!(store.orphaned_collider_count(), owned);

        store.release_evicted(&mut TileSinks::new(&mut sprites, &mut colliders));
        assert_eq!(store.orphaned_collider_count(), 0);
        assert_eq!(colliders.len(), registered - owned);
    }

    #[test]
    fn small_caches_queue_evictions_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 4)).unwrap();
        let mut sprites = SpriteRegistry::new();

        store
            .draw(
                &view(0.0, 3.5, 0.0, 3.5),
                &mut TileSinks::render_only(&mut sprites),
            )
            .unwrap();
        assert_eq!(store.cached_len(), 4);

        let live: usize = [-4, 0, 4, 8]
            .iter()
            .flat_map(|&y| [-4, 0, 4, 8].map(|x| Point2::new(x, y)))
            .filter_map(|origin| store.cache.peek(&origin).cloned())
            .map(|chunk| chunk.get().tile_count())
            .sum();
        assert_eq!(sprites.len(), live);
    }

    #[test]
    fn invalidated_chunks_regenerate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 16)).unwrap();
        let mut sprites = SpriteRegistry::new();

        store.write(5, 5, Diamond).unwrap();
        let left = store.get(Point2::new(0, 4)).unwrap();
        left.get_mut().flush(&mut store, &mut TileSinks::render_only(&mut sprites));

        store
            .invalidate(Point2::new(4, 4), &mut TileSinks::render_only(&mut sprites))
            .unwrap();
        assert!(!store.persistence().exists(Point2::new(4, 4)));
        assert!(left.get().is_dirty());

        let generated = store.generated_count();
        assert_ne!(store.read(5, 5).unwrap(), Diamond);
        assert_eq!(store.generated_count(), generated + 1);
    }

    #[test]
    fn corrupt_neighbor_files_fail_the_draw() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::new(&config(dir.path(), 64)).unwrap();
        let mut sprites = SpriteRegistry::new();

        // just past the padded view, only reached through a +x link
        fs::write(store.persistence().path_for(Point2::new(8, 0)), b"not a png").unwrap();

        let result = store.draw(
            &view(0.0, 3.5, 0.0, 3.5),
            &mut TileSinks::render_only(&mut sprites),
        );
        assert!(matches!(result, Err(TerrainError::Image { .. })));
    }
}

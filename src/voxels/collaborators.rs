//! # Collaborators Module
//!
//! The terrain engine never talks to a renderer or a physics solver directly.
//! It registers and unregisters tile instances through the two traits in this
//! module, and only ever does so while a chunk is flushed or released.
//!
//! [`SpriteRegistry`] and [`ColliderRegistry`] are in-memory implementations
//! that keep every live instance. The headless demo and the tests run on them.

use std::collections::HashMap;

use cgmath::Point2;
use log::{trace, warn};

use crate::voxels::material::Material;

/// Identifies a sprite registered with a [`RenderBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u64);

/// Identifies a collider registered with a [`PhysicsBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub u64);

/// A sprite the renderer should add to a chunk's batch.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteRequest {
    /// Origin of the chunk whose batch the sprite belongs to
    pub chunk_origin: Point2<i32>,
    /// The cell the tile was computed for
    pub cell: Point2<i32>,
    /// World position of the tile's bottom-left corner
    pub position: Point2<f32>,
    /// Material whose tile-set is drawn
    pub material: Material,
    /// Tile variant (the mask), in `1..16`
    pub tile_index: u8,
}

/// A static collider the physics solver should add for a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderRequest {
    /// The cell the tile was computed for
    pub cell: Point2<i32>,
    /// Material of the tile
    pub material: Material,
    /// The mask the outline was taken from
    pub mask: u8,
    /// Counter-clockwise outline in world space
    pub outline: Vec<Point2<f32>>,
    /// Surface friction
    pub friction: f32,
    /// Restitution
    pub elasticity: f32,
}

/// The render side of the engine's collaborators.
pub trait RenderBackend {
    /// Adds a sprite to its chunk's batch.
    fn register_sprite(&mut self, request: SpriteRequest) -> SpriteHandle;

    /// Removes a previously registered sprite.
    fn unregister_sprite(&mut self, handle: SpriteHandle);

    /// Draws the batch of the chunk at `chunk_origin`.
    fn draw_batch(&mut self, chunk_origin: Point2<i32>);
}

/// The physics side of the engine's collaborators.
pub trait PhysicsBackend {
    /// Adds a static collider and returns its handle.
    fn register_collider(&mut self, request: ColliderRequest) -> ColliderHandle;

    /// Removes a previously registered collider.
    fn unregister_collider(&mut self, handle: ColliderHandle);
}

/// The collaborators a flush pushes tile instances to.
///
/// Physics is optional; without it no colliders are created. Colliders that
/// are already registered when tiles are cleared without physics stay
/// registered and are unregistered by the next clear that has it.
pub struct TileSinks<'a> {
    /// Receives one sprite per tile layer
    pub render: &'a mut dyn RenderBackend,
    /// Receives one collider per representative tile of a colliding material
    pub physics: Option<&'a mut dyn PhysicsBackend>,
}

impl<'a> TileSinks<'a> {
    /// Sinks that render and collide.
    pub fn new(render: &'a mut dyn RenderBackend, physics: &'a mut dyn PhysicsBackend) -> Self {
        TileSinks {
            render,
            physics: Some(physics),
        }
    }

    /// Sinks that only render.
    pub fn render_only(render: &'a mut dyn RenderBackend) -> Self {
        TileSinks {
            render,
            physics: None,
        }
    }
}

/// A render registry that records every live sprite it is handed.
#[derive(Debug, Default)]
pub struct SpriteRegistry {
    next_handle: u64,
    sprites: HashMap<SpriteHandle, SpriteRequest>,
    draw_calls: Vec<Point2<i32>>,
    registered: usize,
    unregistered: usize,
}

impl SpriteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the live sprites.
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteRequest> {
        self.sprites.values()
    }

    /// Number of live sprites.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Returns `true` when no sprite is live.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Live sprites registered for `cell`.
    pub fn sprites_at(&self, cell: Point2<i32>) -> Vec<&SpriteRequest> {
        self.sprites.values().filter(|s| s.cell == cell).collect()
    }

    /// Chunk origins drawn since the last call.
    pub fn take_draw_calls(&mut self) -> Vec<Point2<i32>> {
        std::mem::take(&mut self.draw_calls)
    }

    /// Total `(register, unregister)` calls so far.
    pub fn traffic(&self) -> (usize, usize) {
        (self.registered, self.unregistered)
    }
}

impl RenderBackend for SpriteRegistry {
    fn register_sprite(&mut self, request: SpriteRequest) -> SpriteHandle {
        self.next_handle += 1;
        let handle = SpriteHandle(self.next_handle);
        trace!("Register sprite {:?} for cell {:?}", handle, request.cell);
        self.registered += 1;
        self.sprites.insert(handle, request);
        handle
    }

    fn unregister_sprite(&mut self, handle: SpriteHandle) {
        if self.sprites.remove(&handle).is_some() {
            self.unregistered += 1;
        } else {
            warn!("Unregistering unknown sprite {:?}", handle);
        }
    }

    fn draw_batch(&mut self, chunk_origin: Point2<i32>) {
        self.draw_calls.push(chunk_origin);
    }
}

/// A physics registry that records every live collider it is handed.
#[derive(Debug, Default)]
pub struct ColliderRegistry {
    next_handle: u64,
    colliders: HashMap<ColliderHandle, ColliderRequest>,
}

impl ColliderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the live colliders.
    pub fn colliders(&self) -> impl Iterator<Item = &ColliderRequest> {
        self.colliders.values()
    }

    /// Number of live colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Returns `true` when no collider is live.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl PhysicsBackend for ColliderRegistry {
    fn register_collider(&mut self, request: ColliderRequest) -> ColliderHandle {
        self.next_handle += 1;
        let handle = ColliderHandle(self.next_handle);
        self.colliders.insert(handle, request);
        handle
    }

    fn unregister_collider(&mut self, handle: ColliderHandle) {
        if self.colliders.remove(&handle).is_none() {
            warn!("Unregistering unknown collider {:?}", handle);
        }
    }
}

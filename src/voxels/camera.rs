//! # Camera Module
//!
//! The only thing the terrain engine needs from a camera is the rectangle of
//! world space it currently shows, already scaled by zoom. Containers use it to
//! cull chunks before flushing and drawing them.

use cgmath::Point2;

/// A world-space rectangle, in world units (cells are `cell_size` units wide).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraBounds {
    /// Left edge
    pub left: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Top edge
    pub top: f32,
}

impl CameraBounds {
    /// Converts the bounds into an inclusive cell range `(min, max)`.
    ///
    /// # Arguments
    /// * `cell_size` - Side length of one cell in world units
    pub fn to_cell_range(&self, cell_size: f32) -> (Point2<i32>, Point2<i32>) {
        let to_cell = |v: f32| (v / cell_size).floor() as i32;
        (
            Point2::new(to_cell(self.left), to_cell(self.bottom)),
            Point2::new(to_cell(self.right), to_cell(self.top)),
        )
    }
}

/// Anything that can report the world rectangle it shows.
pub trait Viewport {
    /// The visible rectangle, with zoom applied.
    fn scaled_bounds(&self) -> CameraBounds;
}

impl Viewport for CameraBounds {
    fn scaled_bounds(&self) -> CameraBounds {
        *self
    }
}

/// An orthographic 2D camera.
///
/// Zoom scales the visible rectangle around its center: a zoom of 2 shows
/// twice the width and height of the unzoomed view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera2D {
    /// Left edge of the unzoomed view
    pub left: f32,
    /// Bottom edge of the unzoomed view
    pub bottom: f32,
    /// Width of the unzoomed view
    pub width: f32,
    /// Height of the unzoomed view
    pub height: f32,
    /// Scale applied around the view's center
    pub zoom: f32,
}

impl Camera2D {
    /// Creates an unzoomed camera.
    pub fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Camera2D {
            left,
            bottom,
            width,
            height,
            zoom: 1.0,
        }
    }

    /// Returns the camera with its zoom replaced.
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Converts a screen pixel (origin bottom-left) to world coordinates.
    pub fn screen_to_world(&self, x: f32, y: f32) -> Point2<f32> {
        let bounds = self.scaled_bounds();
        Point2::new(
            x * (bounds.right - bounds.left) / self.width + bounds.left,
            y * (bounds.top - bounds.bottom) / self.height + bounds.bottom,
        )
    }
}

impl Viewport for Camera2D {
    fn scaled_bounds(&self) -> CameraBounds {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let center_x = self.left + half_width;
        let center_y = self.bottom + half_height;
        let scaled_half_width = half_width * self.zoom;
        let scaled_half_height = half_height * self.zoom;

        CameraBounds {
            left: center_x - scaled_half_width,
            right: center_x + scaled_half_width,
            bottom: center_y - scaled_half_height,
            top: center_y + scaled_half_height,
        }
    }
}

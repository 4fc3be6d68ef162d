//! # Material Grid Module
//!
//! A dense, row-major 2D array of materials. This is the interchange format
//! between the terrain generator, chunk construction, and chunk persistence.

use crate::voxels::material::Material;

/// A `width × height` array of materials, indexed `(x, y)` with `y` as the row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialGrid {
    width: usize,
    height: usize,
    cells: Vec<Material>,
}

impl MaterialGrid {
    /// Creates a grid with every cell set to `material`.
    pub fn filled(width: usize, height: usize, material: Material) -> Self {
        MaterialGrid {
            width,
            height,
            cells: vec![material; width * height],
        }
    }

    /// Builds a grid from rows, the first row being `y = 0`.
    ///
    /// Short rows are padded with `Empty`; the grid is as wide as the longest row.
    pub fn from_rows<R: AsRef<[Material]>>(rows: &[R]) -> Self {
        let width = rows.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);
        let mut grid = MaterialGrid::filled(width, rows.len(), Material::Empty);
        for (y, row) in rows.iter().enumerate() {
            for (x, &material) in row.as_ref().iter().enumerate() {
                grid.set(x, y, material);
            }
        }
        grid
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the material at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<Material> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Sets the material at `(x, y)`.
    ///
    /// # Returns
    /// `false` (and nothing changes) if the coordinate is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, material: Material) -> bool {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = material;
            true
        } else {
            false
        }
    }

    /// Copies the `width × height` window starting at `(x0, y0)` into a new grid.
    ///
    /// Parts of the window that fall outside this grid are `Empty`.
    pub fn window(&self, x0: usize, y0: usize, width: usize, height: usize) -> MaterialGrid {
        let mut window = MaterialGrid::filled(width, height, Material::Empty);
        for y in 0..height {
            for x in 0..width {
                if let Some(material) = self.get(x0 + x, y0 + y) {
                    window.set(x, y, material);
                }
            }
        }
        window
    }

    /// Iterates over the rows, `y = 0` first.
    pub fn rows(&self) -> impl Iterator<Item = &[Material]> {
        // chunks() panics on zero
        self.cells.chunks(self.width.max(1))
    }

    /// Counts the cells holding `material`.
    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|&&cell| cell == material).count()
    }
}

//! GridSink - writes edits into a shared fixed-size cell grid

use std::sync::Arc;

use contracts::{Edit, EditSink, GridConfig};
use parking_lot::RwLock;
use tracing::debug;

/// Shared cell buffer addressed as `row * row_width + col`
///
/// Cloning yields another handle to the same cells. The grid is owned by the
/// caller; a [`GridSink`] only borrows it through one of these handles.
#[derive(Debug, Clone)]
pub struct Grid {
    row_width: usize,
    cells: Arc<RwLock<Vec<u32>>>,
}

impl Grid {
    /// Create a zeroed grid
    pub fn new(row_width: usize, capacity: usize) -> Self {
        Self {
            row_width,
            cells: Arc::new(RwLock::new(vec![0; capacity])),
        }
    }

    /// Create a zeroed grid from configuration
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.row_width, config.capacity)
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    pub fn capacity(&self) -> usize {
        self.cells.read().len()
    }

    /// Cell index for a coordinate, `None` if it falls outside the grid
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        let index = row.checked_mul(self.row_width)?.checked_add(col)?;
        (index < self.capacity()).then_some(index)
    }

    /// Value of a single cell
    pub fn get(&self, index: usize) -> Option<u32> {
        self.cells.read().get(index).copied()
    }

    /// Copy of every cell
    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.read().clone()
    }

    /// Render the grid as rows of characters, `.` for empty cells
    pub fn render(&self) -> String {
        let cells = self.cells.read();
        let width = self.row_width.max(1);
        let mut out = String::with_capacity(cells.len() + cells.len() / width + 1);
        for row in cells.chunks(width) {
            for &cell in row {
                out.push(match cell {
                    0 => '.',
                    c => char::from_u32(c).unwrap_or('?'),
                });
            }
            out.push('\n');
        }
        out
    }

    fn set(&self, row: usize, col: usize, value: u32) -> bool {
        match self.index_of(row, col) {
            Some(index) => {
                self.cells.write()[index] = value;
                true
            }
            None => false,
        }
    }
}

/// Sink that applies edits to a [`Grid`]
///
/// `Add` stores the edit's character, `Delete` resets the cell to zero.
/// Coordinates outside the grid are rejected.
pub struct GridSink {
    name: String,
    grid: Grid,
}

impl GridSink {
    /// Create a new GridSink writing into `grid`
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Handle to the target grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

impl EditSink for GridSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_add(&mut self, edit: Edit) -> bool {
        self.grid.set(edit.row, edit.col, edit.character)
    }

    fn apply_delete(&mut self, edit: Edit) -> bool {
        self.grid.set(edit.row, edit.col, 0)
    }

    fn close(&mut self) {
        debug!(sink = %self.name, "GridSink closed");
    }
}

//! Dataset-level algorithms built on the cell kernel.

pub mod contour;
pub mod probe;

pub use contour::{contour_by_array, contour_dataset};
pub use probe::{find_cell, intersect_with_line, CellHit, CellLocation};

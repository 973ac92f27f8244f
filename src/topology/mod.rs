//! Top-level module for mesh connectivity.
//!
//! This module provides the bulk topology structures that the datasets own:
//! - [`CellArray`]: flat `(count, ids…)*` connectivity buffer
//! - [`CellTypes`]: cell id → (shape tag, connectivity location) registry
//! - [`CellLinks`]: point id → incident cell ids
//!
//! These structures are pre-sized, unchecked-by-design containers: callers own
//! the preconditions (prior `allocate`, `build_links`, …). The datasets in
//! [`crate::data`] wrap them into consistency-checked editing operations.

pub mod cell_array;
pub mod cell_links;
pub mod cell_type;
pub mod cell_types;

pub use cell_array::{CellArray, CellBuilder, CellEntries, Cells};
pub use cell_links::CellLinks;
pub use cell_type::CellType;
pub use cell_types::{CellTypeEntry, CellTypes};

/// Integer type of point and cell ids, and of connectivity words.
pub type IdType = usize;

/// Default extend increment for growable topology buffers.
pub const DEFAULT_EXTEND: usize = 1000;

/// Reserve room for `additional` more elements, growing by at least the
/// current length (doubling) or `extend`, whichever is larger.
pub(crate) fn grow_for<T>(buf: &mut Vec<T>, additional: usize, extend: usize) {
    let needed = buf.len() + additional;
    if needed <= buf.capacity() {
        return;
    }
    let target = needed.max(buf.len() * 2).max(buf.len() + extend.max(1));
    buf.reserve_exact(target - buf.len());
}

#[cfg(test)]
mod tests;

//! CellArray: flat, self-describing connectivity buffer.
//!
//! Cells are stored back to back as `(count, id_0 … id_{count-1})` records in
//! a single `Vec<IdType>`. The cell id is implicit: the Nth record inserted is
//! cell N of this array. The *location* of a record is the index of its count
//! word in the buffer; it is what the [`CellTypes`](super::CellTypes) registry
//! stores for O(1) random access.
//!
//! # Invariants
//!
//! - `Σ(count_i + 1) == number_of_connectivity_entries()`.
//! - `number_of_cells()` equals the number of records in the buffer.
//!
//! Traversal never mutates the array: [`CellArray::iter`] and
//! [`CellArray::entries`] hand out iterators that own their cursor, so any
//! number of traversals may run side by side.
//!
//! # Example
//! ```rust
//! use mesh_cells::topology::CellArray;
//!
//! let mut cells = CellArray::with_capacity(CellArray::estimate_size(2, 4), 100);
//! cells.insert_next_cell(&[0, 1, 2]);
//! let mut quad = cells.begin_cell();
//! quad.extend([2, 3, 4, 5]);
//! assert_eq!(quad.finish(), 1);
//!
//! assert_eq!(cells.number_of_cells(), 2);
//! assert_eq!(cells.number_of_connectivity_entries(), 9);
//! assert_eq!(cells.as_slice(), &[3, 0, 1, 2, 4, 2, 3, 4, 5]);
//! ```

use super::{DEFAULT_EXTEND, IdType, grow_for};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Flat connectivity buffer of variable-length cell records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellArray {
    /// `(count, ids…)*` records.
    ia: Vec<IdType>,
    /// Number of records in `ia`.
    number_of_cells: usize,
    /// Location of the most recently inserted record.
    last_location: usize,
    /// Minimum growth step when the buffer reallocates.
    extend: usize,
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

impl CellArray {
    /// Empty array with the default extend increment.
    pub fn new() -> Self {
        Self {
            ia: Vec::new(),
            number_of_cells: 0,
            last_location: 0,
            extend: DEFAULT_EXTEND,
        }
    }

    /// Empty array pre-sized for `size` connectivity words.
    pub fn with_capacity(size: usize, extend: usize) -> Self {
        let mut array = Self::new();
        array.allocate(size, extend);
        array
    }

    /// Number of connectivity words needed for `num_cells` cells of at most
    /// `max_pts_per_cell` points each.
    #[inline]
    pub const fn estimate_size(num_cells: usize, max_pts_per_cell: usize) -> usize {
        num_cells * (1 + max_pts_per_cell)
    }

    /// Reserve room for `size` connectivity words and set the extend
    /// increment. Existing cells are kept.
    pub fn allocate(&mut self, size: usize, extend: usize) {
        self.extend = extend.max(1);
        if size > self.ia.len() {
            self.ia.reserve_exact(size - self.ia.len());
        }
    }

    /// Append a cell and return its index within this array.
    pub fn insert_next_cell(&mut self, pts: &[IdType]) -> IdType {
        grow_for(&mut self.ia, pts.len() + 1, self.extend);
        self.last_location = self.ia.len();
        self.ia.push(pts.len());
        self.ia.extend_from_slice(pts);
        self.number_of_cells += 1;
        self.number_of_cells - 1
    }

    /// Start a cell whose size is not known up front.
    ///
    /// The record's count word is written when the builder is finished or
    /// dropped, so the array never exposes a half-written record.
    pub fn begin_cell(&mut self) -> CellBuilder<'_> {
        grow_for(&mut self.ia, 1, self.extend);
        let location = self.ia.len();
        let cell_id = self.number_of_cells;
        self.ia.push(0);
        CellBuilder {
            array: self,
            location,
            cell_id,
            count: 0,
        }
    }

    /// Resize the most recently inserted record to `npts` points.
    ///
    /// Growing pads the record with zeros; the caller is expected to write the
    /// new ids through [`CellArray::cell_mut`].
    pub fn update_cell_count(&mut self, npts: usize) {
        if self.number_of_cells == 0 {
            return;
        }
        let loc = self.last_location;
        self.ia.resize(loc + 1 + npts, 0);
        self.ia[loc] = npts;
    }

    /// Location of the most recently inserted record.
    #[inline]
    pub fn last_location(&self) -> usize {
        self.last_location
    }

    /// Caller-owned traversal over the point lists in insertion order.
    pub fn iter(&self) -> Cells<'_> {
        Cells {
            ia: &self.ia,
            location: 0,
            remaining: self.number_of_cells,
        }
    }

    /// Caller-owned traversal yielding `(location, points)` pairs.
    pub fn entries(&self) -> CellEntries<'_> {
        CellEntries { inner: self.iter() }
    }

    /// Point list of the record starting at `location`.
    ///
    /// # Panics
    /// Panics if `location` does not address a record inside the buffer.
    #[inline]
    pub fn cell(&self, location: usize) -> &[IdType] {
        let npts = self.ia[location];
        &self.ia[location + 1..location + 1 + npts]
    }

    /// Mutable point list of the record starting at `location`.
    #[inline]
    pub fn cell_mut(&mut self, location: usize) -> &mut [IdType] {
        let npts = self.ia[location];
        &mut self.ia[location + 1..location + 1 + npts]
    }

    /// Number of points in the record starting at `location`.
    #[inline]
    pub fn cell_size(&self, location: usize) -> usize {
        self.ia[location]
    }

    /// Reverse the point order of the record at `location` in place.
    pub fn reverse_cell(&mut self, location: usize) {
        self.cell_mut(location).reverse();
    }

    /// Overwrite the record at `location`. The point count must not change.
    pub fn replace_cell(&mut self, location: usize, pts: &[IdType]) -> Result<(), MeshError> {
        let expected = self.cell_size(location);
        if expected != pts.len() {
            return Err(MeshError::CellSizeMismatch {
                expected,
                found: pts.len(),
            });
        }
        self.cell_mut(location).copy_from_slice(pts);
        Ok(())
    }

    /// Number of records.
    #[inline]
    pub fn number_of_cells(&self) -> usize {
        self.number_of_cells
    }

    /// Logical length of the flat buffer (counts included).
    #[inline]
    pub fn number_of_connectivity_entries(&self) -> usize {
        self.ia.len()
    }

    /// Allocated capacity of the flat buffer, in words.
    #[inline]
    pub fn size(&self) -> usize {
        self.ia.capacity()
    }

    /// Whether the array holds no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.number_of_cells == 0
    }

    /// Largest point count over all records.
    pub fn max_cell_size(&self) -> usize {
        self.iter().map(<[IdType]>::len).max().unwrap_or(0)
    }

    /// Bytes held by the buffer allocation.
    pub fn actual_memory_size(&self) -> usize {
        self.ia.capacity() * std::mem::size_of::<IdType>()
    }

    /// The raw `(count, ids…)*` layout.
    #[inline]
    pub fn as_slice(&self) -> &[IdType] {
        &self.ia
    }

    /// The raw layout as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.ia)
    }

    /// Resize the buffer to exactly `size` words and declare it as holding
    /// `ncells` records, returning the buffer for bulk writing.
    ///
    /// The caller must fill the slice with a valid layout; nothing is checked.
    pub fn write_slice(&mut self, ncells: usize, size: usize) -> &mut [IdType] {
        self.ia.clear();
        self.ia.resize(size, 0);
        self.number_of_cells = ncells;
        self.last_location = 0;
        &mut self.ia
    }

    /// Adopt a flat buffer holding `ncells` records, validating the layout.
    pub fn from_raw(ncells: usize, ia: Vec<IdType>) -> Result<Self, MeshError> {
        let mut array = Self {
            ia,
            number_of_cells: ncells,
            last_location: 0,
            extend: DEFAULT_EXTEND,
        };
        array.validate_invariants()?;
        array.last_location = array.entries().last().map(|(loc, _)| loc).unwrap_or(0);
        Ok(array)
    }

    /// Consume the array and return its flat buffer.
    pub fn into_raw(self) -> Vec<IdType> {
        self.ia
    }

    /// Release capacity beyond the logical length.
    pub fn squeeze(&mut self) {
        self.ia.shrink_to_fit();
    }

    /// Drop all cells but keep the allocation.
    pub fn reset(&mut self) {
        self.ia.clear();
        self.number_of_cells = 0;
        self.last_location = 0;
    }

    /// Drop all cells and release the allocation.
    pub fn initialize(&mut self) {
        self.reset();
        self.ia = Vec::new();
    }
}

impl DebugInvariants for CellArray {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellArray");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        let mut loc = 0usize;
        let mut cells = 0usize;
        while loc < self.ia.len() {
            let npts = self.ia[loc];
            let next = loc
                .checked_add(npts + 1)
                .ok_or_else(|| MeshError::InvalidConnectivity(format!("overflow at {loc}")))?;
            if next > self.ia.len() {
                return Err(MeshError::InvalidConnectivity(format!(
                    "record at {loc} declares {npts} points but only {} words remain",
                    self.ia.len() - loc - 1
                )));
            }
            loc = next;
            cells += 1;
        }
        if cells != self.number_of_cells {
            return Err(MeshError::InvalidConnectivity(format!(
                "buffer holds {cells} records, expected {}",
                self.number_of_cells
            )));
        }
        Ok(())
    }
}

/// In-progress record created by [`CellArray::begin_cell`].
pub struct CellBuilder<'a> {
    array: &'a mut CellArray,
    location: usize,
    cell_id: IdType,
    count: usize,
}

impl CellBuilder<'_> {
    /// Append one point id to the record.
    pub fn push(&mut self, id: IdType) {
        self.array.ia.push(id);
        self.count += 1;
    }

    /// Append several point ids to the record.
    pub fn extend<I: IntoIterator<Item = IdType>>(&mut self, ids: I) {
        for id in ids {
            self.push(id);
        }
    }

    /// Points pushed so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no point has been pushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Location of the record being built.
    #[inline]
    pub fn location(&self) -> usize {
        self.location
    }

    /// Finalize the record and return its cell index.
    pub fn finish(self) -> IdType {
        self.cell_id
    }
}

impl Drop for CellBuilder<'_> {
    fn drop(&mut self) {
        self.array.ia[self.location] = self.count;
        self.array.last_location = self.location;
        self.array.number_of_cells += 1;
    }
}

/// Iterator over the point lists of a [`CellArray`].
#[derive(Clone, Debug)]
pub struct Cells<'a> {
    ia: &'a [IdType],
    location: usize,
    remaining: usize,
}

impl Cells<'_> {
    /// Location of the record the next call to `next` will return.
    #[inline]
    pub fn location(&self) -> usize {
        self.location
    }
}

impl<'a> Iterator for Cells<'a> {
    type Item = &'a [IdType];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.location >= self.ia.len() {
            return None;
        }
        let npts = self.ia[self.location];
        let start = self.location + 1;
        self.location = start + npts;
        self.remaining -= 1;
        Some(&self.ia[start..start + npts])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Iterator over `(location, points)` pairs of a [`CellArray`].
#[derive(Clone, Debug)]
pub struct CellEntries<'a> {
    inner: Cells<'a>,
}

impl<'a> Iterator for CellEntries<'a> {
    type Item = (usize, &'a [IdType]);

    fn next(&mut self) -> Option<Self::Item> {
        let loc = self.inner.location();
        self.inner.next().map(|pts| (loc, pts))
    }
}

impl<'a> IntoIterator for &'a CellArray {
    type Item = &'a [IdType];
    type IntoIter = Cells<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

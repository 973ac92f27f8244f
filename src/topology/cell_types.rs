//! CellTypes: cell id → (shape tag, connectivity location) registry.
//!
//! The registry is a parallel array to the connectivity stream: entry `i`
//! records the shape of cell `i` and the location of its record in a
//! [`CellArray`](super::CellArray). It is what turns the sequential
//! connectivity encoding into an O(1) random-access structure.
//!
//! Deleting a cell writes the [`CellType::Empty`] tombstone in place; ids of
//! the other cells stay stable and [`CellTypes::number_of_types`] keeps
//! counting the tombstone until the owner compacts.

use super::cell_type::CellType;
use super::{DEFAULT_EXTEND, IdType, grow_for};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One registry slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellTypeEntry {
    /// Shape of the cell; `Empty` marks a tombstone.
    pub cell_type: CellType,
    /// Location of the cell's record, or `None` when only the
    /// classification is tracked.
    pub location: Option<usize>,
}

/// Registry of cell shapes and connectivity locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellTypes {
    entries: Vec<CellTypeEntry>,
    extend: usize,
}

impl Default for CellTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl CellTypes {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            extend: DEFAULT_EXTEND,
        }
    }

    /// Empty registry pre-sized for `size` cells.
    pub fn with_capacity(size: usize, extend: usize) -> Self {
        let mut types = Self::new();
        types.allocate(size, extend);
        types
    }

    /// Reserve room for `size` entries and set the extend increment.
    pub fn allocate(&mut self, size: usize, extend: usize) {
        self.extend = extend.max(1);
        if size > self.entries.len() {
            self.entries.reserve_exact(size - self.entries.len());
        }
    }

    /// Append an entry and return the new cell id.
    pub fn insert_next_cell(&mut self, cell_type: CellType, location: Option<usize>) -> IdType {
        grow_for(&mut self.entries, 1, self.extend);
        self.entries.push(CellTypeEntry {
            cell_type,
            location,
        });
        self.entries.len() - 1
    }

    /// Write an entry at `id`, padding any gap with tombstones.
    pub fn insert_cell(&mut self, id: IdType, cell_type: CellType, location: Option<usize>) {
        if id >= self.entries.len() {
            let additional = id + 1 - self.entries.len();
            grow_for(&mut self.entries, additional, self.extend);
            self.entries.resize(id + 1, CellTypeEntry::default());
        }
        self.entries[id] = CellTypeEntry {
            cell_type,
            location,
        };
    }

    /// Shape of cell `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    #[inline]
    pub fn cell_type(&self, id: IdType) -> CellType {
        self.entries[id].cell_type
    }

    /// Connectivity location of cell `id`.
    #[inline]
    pub fn cell_location(&self, id: IdType) -> Option<usize> {
        self.entries[id].location
    }

    /// Full entry of cell `id`, if in range.
    #[inline]
    pub fn get(&self, id: IdType) -> Option<CellTypeEntry> {
        self.entries.get(id).copied()
    }

    /// Tombstone cell `id`. The slot is not reclaimed.
    pub fn delete_cell(&mut self, id: IdType) {
        self.entries[id].cell_type = CellType::Empty;
    }

    /// Whether cell `id` is a tombstone.
    #[inline]
    pub fn is_deleted(&self, id: IdType) -> bool {
        self.entries[id].cell_type == CellType::Empty
    }

    /// Whether any entry has shape `cell_type`. Linear scan.
    pub fn is_type(&self, cell_type: CellType) -> bool {
        self.entries.iter().any(|e| e.cell_type == cell_type)
    }

    /// Number of entries, tombstones included.
    #[inline]
    pub fn number_of_types(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted set of the distinct live shapes.
    pub fn distinct_types(&self) -> Vec<CellType> {
        self.entries
            .iter()
            .map(|e| e.cell_type)
            .filter(|t| *t != CellType::Empty)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Iterate entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CellTypeEntry> + '_ {
        self.entries.iter()
    }

    /// Release unused capacity.
    pub fn squeeze(&mut self) {
        self.entries.shrink_to_fit();
    }

    /// Drop all entries, keeping the allocation.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl DebugInvariants for CellTypes {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellTypes");
    }

    /// Live entries must carry distinct locations.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        let mut seen = BTreeSet::new();
        for (id, e) in self.entries.iter().enumerate() {
            if e.cell_type == CellType::Empty {
                continue;
            }
            if let Some(loc) = e.location {
                if !seen.insert(loc) {
                    return Err(MeshError::InconsistentTopology(format!(
                        "cell {id} shares location {loc} with another cell"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_and_tombstone() {
        let mut ct = CellTypes::with_capacity(4, 2);
        let a = ct.insert_next_cell(CellType::Triangle, Some(0));
        let b = ct.insert_next_cell(CellType::Quad, Some(4));
        let c = ct.insert_next_cell(CellType::Vertex, None);
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(ct.cell_type(1), CellType::Quad);
        assert_eq!(ct.cell_location(1), Some(4));
        assert_eq!(ct.cell_location(2), None);

        ct.delete_cell(1);
        assert!(ct.is_deleted(1));
        assert_eq!(ct.number_of_types(), 3);
        assert!(!ct.is_type(CellType::Quad));
        assert!(ct.is_type(CellType::Triangle));
        assert_eq!(ct.distinct_types(), vec![CellType::Vertex, CellType::Triangle]);
    }

    #[test]
    fn insert_cell_pads_with_tombstones() {
        let mut ct = CellTypes::new();
        ct.insert_cell(3, CellType::Line, Some(10));
        assert_eq!(ct.number_of_types(), 4);
        assert!(ct.is_deleted(0));
        assert_eq!(ct.cell_type(3), CellType::Line);
    }

    #[test]
    fn duplicate_locations_are_reported() {
        let mut ct = CellTypes::new();
        ct.insert_next_cell(CellType::Line, Some(0));
        ct.insert_next_cell(CellType::Line, Some(0));
        assert!(ct.validate_invariants().is_err());
        ct.delete_cell(1);
        assert!(ct.validate_invariants().is_ok());
    }
}

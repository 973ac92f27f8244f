//! CellLinks: point id → incident cell ids.
//!
//! Built from a dataset's connectivity in two passes, the same way a CSR
//! adjacency is frozen: (1) count the cells touching each point, (2) allocate
//! each point's list with exactly that capacity and walk the connectivity
//! again, appending every cell id to the lists of its points. A point repeated
//! within one cell is counted once.
//!
//! After a build, for every cell `C` and every point `P` it references, `P`'s
//! list holds `C` exactly once, and no other list holds `C`. Editing the
//! dataset's cells does not touch the links; the reference primitives here
//! ([`CellLinks::add_cell_reference`], [`CellLinks::remove_cell_reference`],
//! [`CellLinks::resize_cell_list`]) act on one (cell, point) pair at a time and
//! the datasets sequence them.

use super::cell_array::CellArray;
use super::cell_type::CellType;
use super::IdType;
use crate::data::dataset::DataSet;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Incident cells of one point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Link {
    cells: Vec<IdType>,
    deleted: bool,
}

/// Point → cell adjacency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLinks {
    links: Vec<Link>,
}

impl CellLinks {
    /// Empty links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links for `num_points` points, each with an empty list.
    pub fn allocate(&mut self, num_points: usize) {
        self.links.clear();
        self.links.resize_with(num_points, Link::default);
    }

    /// Build links for every cell of `dataset`. Tombstoned cells are skipped.
    pub fn build<D: DataSet + ?Sized>(&mut self, dataset: &D) {
        let num_points = dataset.number_of_points();
        let num_cells = dataset.number_of_cells();
        let mut pts = Vec::new();

        // 1) degree counts
        let mut counts = vec![0usize; num_points];
        for cell_id in 0..num_cells {
            if dataset.cell_type(cell_id) == CellType::Empty {
                continue;
            }
            dataset.cell_points_into(cell_id, &mut pts);
            for &p in pts.iter().unique() {
                counts[p] += 1;
            }
        }

        // 2) exact-size lists, then fill
        self.links = counts
            .into_iter()
            .map(|n| Link {
                cells: Vec::with_capacity(n),
                deleted: false,
            })
            .collect();
        for cell_id in 0..num_cells {
            if dataset.cell_type(cell_id) == CellType::Empty {
                continue;
            }
            dataset.cell_points_into(cell_id, &mut pts);
            for &p in pts.iter().unique() {
                self.links[p].cells.push(cell_id);
            }
        }
        log::debug!("built cell links: {num_points} points, {num_cells} cells");
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
    }

    /// Build links straight from a connectivity array whose record order is
    /// the cell id order.
    pub fn build_from_cell_array(&mut self, num_points: usize, cells: &CellArray) {
        let mut counts = vec![0usize; num_points];
        for pts in cells {
            for &p in pts.iter().unique() {
                counts[p] += 1;
            }
        }
        self.links = counts
            .into_iter()
            .map(|n| Link {
                cells: Vec::with_capacity(n),
                deleted: false,
            })
            .collect();
        for (cell_id, pts) in cells.iter().enumerate() {
            for &p in pts.iter().unique() {
                self.links[p].cells.push(cell_id);
            }
        }
        log::debug!(
            "built cell links: {num_points} points, {} cells",
            cells.number_of_cells()
        );
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
    }

    /// Number of points covered by the links.
    #[inline]
    pub fn number_of_points(&self) -> usize {
        self.links.len()
    }

    /// Number of cells using point `pt`.
    #[inline]
    pub fn ncells(&self, pt: IdType) -> usize {
        self.links[pt].cells.len()
    }

    /// Cells using point `pt`, in no particular order.
    #[inline]
    pub fn cells(&self, pt: IdType) -> &[IdType] {
        &self.links[pt].cells
    }

    /// Whether point `pt` is covered and not deleted.
    #[inline]
    pub fn is_point_active(&self, pt: IdType) -> bool {
        self.links.get(pt).is_some_and(|l| !l.deleted)
    }

    /// Append a point with room for `num_cells_estimate` references.
    pub fn insert_next_point(&mut self, num_cells_estimate: usize) -> IdType {
        self.links.push(Link {
            cells: Vec::with_capacity(num_cells_estimate),
            deleted: false,
        });
        self.links.len() - 1
    }

    /// Append `cell_id` to `pt`'s list, growing the links to cover `pt`.
    pub fn insert_next_cell_reference(&mut self, pt: IdType, cell_id: IdType) {
        if pt >= self.links.len() {
            self.links.resize_with(pt + 1, Link::default);
        }
        let link = &mut self.links[pt];
        link.deleted = false;
        link.cells.push(cell_id);
    }

    /// Add `cell_id` to the list of `pt`.
    ///
    /// Room is expected to have been made with [`CellLinks::resize_cell_list`];
    /// the list grows if it was not.
    pub fn add_cell_reference(&mut self, cell_id: IdType, pt: IdType) {
        self.links[pt].cells.push(cell_id);
    }

    /// Remove `cell_id` from the list of `pt`. Order of the remaining
    /// references is preserved; a missing reference is ignored.
    pub fn remove_cell_reference(&mut self, cell_id: IdType, pt: IdType) {
        let cells = &mut self.links[pt].cells;
        if let Some(i) = cells.iter().position(|&c| c == cell_id) {
            cells.remove(i);
        }
    }

    /// Set the capacity of `pt`'s list to `new_size` references. Shrinking
    /// below the current count drops the trailing references.
    pub fn resize_cell_list(&mut self, pt: IdType, new_size: usize) {
        let cells = &mut self.links[pt].cells;
        if new_size < cells.len() {
            cells.truncate(new_size);
            cells.shrink_to_fit();
        } else {
            cells.reserve_exact(new_size - cells.len());
        }
    }

    /// Clear `pt`'s list, release it and mark the point inactive.
    pub fn delete_point(&mut self, pt: IdType) {
        let link = &mut self.links[pt];
        link.cells = Vec::new();
        link.deleted = true;
    }

    /// Release unused capacity of every list.
    pub fn squeeze(&mut self) {
        for link in &mut self.links {
            link.cells.shrink_to_fit();
        }
        self.links.shrink_to_fit();
    }

    /// Drop all links.
    pub fn reset(&mut self) {
        self.links.clear();
    }

    /// Check that these links match the connectivity of `dataset` exactly.
    pub fn validate_against<D: DataSet + ?Sized>(&self, dataset: &D) -> Result<(), MeshError> {
        if self.links.len() < dataset.number_of_points() {
            return Err(MeshError::InconsistentTopology(format!(
                "links cover {} points, dataset has {}",
                self.links.len(),
                dataset.number_of_points()
            )));
        }
        let mut expected: Vec<Vec<IdType>> = vec![Vec::new(); self.links.len()];
        let mut pts = Vec::new();
        for cell_id in 0..dataset.number_of_cells() {
            if dataset.cell_type(cell_id) == CellType::Empty {
                continue;
            }
            dataset.cell_points_into(cell_id, &mut pts);
            for &p in pts.iter().unique() {
                expected[p].push(cell_id);
            }
        }
        for (pt, (link, want)) in self.links.iter().zip(expected.iter_mut()).enumerate() {
            if link.deleted {
                continue;
            }
            let mut got = link.cells.clone();
            got.sort_unstable();
            want.sort_unstable();
            if &got != want {
                return Err(MeshError::InconsistentTopology(format!(
                    "point {pt}: links hold {got:?}, connectivity says {want:?}"
                )));
            }
        }
        Ok(())
    }
}

impl DebugInvariants for CellLinks {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellLinks");
    }

    /// No list may hold the same cell twice.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        for (pt, link) in self.links.iter().enumerate() {
            let mut cells = link.cells.clone();
            cells.sort_unstable();
            if let Some(w) = cells.windows(2).find(|w| w[0] == w[1]) {
                return Err(MeshError::InconsistentTopology(format!(
                    "point {pt} references cell {} twice",
                    w[0]
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> CellArray {
        let mut ca = CellArray::new();
        ca.insert_next_cell(&[0, 1, 2]);
        ca.insert_next_cell(&[1, 3, 2]);
        ca
    }

    #[test]
    fn build_from_array() {
        let mut links = CellLinks::new();
        links.build_from_cell_array(4, &two_triangles());
        assert_eq!(links.cells(0), &[0]);
        assert_eq!(links.cells(1), &[0, 1]);
        assert_eq!(links.cells(2), &[0, 1]);
        assert_eq!(links.cells(3), &[1]);
    }

    #[test]
    fn reference_editing() {
        let mut links = CellLinks::new();
        links.build_from_cell_array(4, &two_triangles());
        links.remove_cell_reference(0, 1);
        assert_eq!(links.cells(1), &[1]);
        links.remove_cell_reference(42, 1);
        assert_eq!(links.ncells(1), 1);
        links.resize_cell_list(3, 2);
        links.add_cell_reference(7, 3);
        assert_eq!(links.cells(3), &[1, 7]);
        links.resize_cell_list(3, 1);
        assert_eq!(links.cells(3), &[1]);
    }

    #[test]
    fn repeated_point_is_listed_once() {
        let mut ca = CellArray::new();
        ca.insert_next_cell(&[0, 0, 1]);
        ca.insert_next_cell(&[0, 1, 2, 0]);
        let mut links = CellLinks::new();
        links.build_from_cell_array(3, &ca);
        assert_eq!(links.cells(0), &[0, 1]);
        assert_eq!(links.cells(1), &[0, 1]);
        assert_eq!(links.cells(2), &[1]);
        assert!(links.validate_invariants().is_ok());
    }

    #[test]
    fn delete_and_insert_points() {
        let mut links = CellLinks::new();
        links.build_from_cell_array(4, &two_triangles());
        links.delete_point(0);
        assert!(!links.is_point_active(0));
        assert_eq!(links.ncells(0), 0);
        let p = links.insert_next_point(2);
        assert_eq!(p, 4);
        links.insert_next_cell_reference(6, 3);
        assert_eq!(links.number_of_points(), 7);
        assert_eq!(links.cells(6), &[3]);
        assert!(links.is_point_active(6));
    }
}

//! UnstructuredGrid: points plus one connectivity array of cells of any shape.
//!
//! The registry is kept up to date on every insertion, so random access is
//! always O(1). Links are built on demand with [`UnstructuredGrid::build_links`];
//! when no cell is tombstoned the build reads the connectivity array directly,
//! since record order is id order.

use super::attributes::Attributes;
use super::dataset::{DataSet, add_reference, first_bad_point, neighbors_from_links};
use super::points::Points;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::{CellArray, CellLinks, CellType, CellTypes, DEFAULT_EXTEND, IdType};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Volumetric dataset of mixed cell shapes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnstructuredGrid {
    points: Points,
    connectivity: CellArray,
    types: CellTypes,
    links: Option<CellLinks>,
    point_data: Attributes,
    cell_data: Attributes,
}

impl UnstructuredGrid {
    /// Empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `num_cells` cells of up to `max_cell_size` points.
    pub fn allocate(&mut self, num_cells: usize, max_cell_size: usize) {
        self.connectivity.allocate(
            CellArray::estimate_size(num_cells, max_cell_size),
            DEFAULT_EXTEND,
        );
        self.types.allocate(num_cells, DEFAULT_EXTEND);
    }

    #[inline]
    pub fn points(&self) -> &Points {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut Points {
        &mut self.points
    }

    /// Replace the coordinates. Links sized for the old points are dropped.
    pub fn set_points(&mut self, points: Points) {
        self.points = points;
        self.links = None;
    }

    /// Append a point and return its id.
    pub fn insert_next_point(&mut self, x: [f64; 3]) -> IdType {
        self.points.insert_next_point(x)
    }

    #[inline]
    pub fn connectivity(&self) -> &CellArray {
        &self.connectivity
    }

    #[inline]
    pub fn cell_types(&self) -> &CellTypes {
        &self.types
    }

    /// The links, if built.
    pub fn links(&self) -> Option<&CellLinks> {
        self.links.as_ref()
    }

    pub fn point_data_mut(&mut self) -> &mut Attributes {
        &mut self.point_data
    }

    pub fn cell_data_mut(&mut self) -> &mut Attributes {
        &mut self.cell_data
    }

    /// Insert a cell and return its id. Links are not updated.
    pub fn insert_next_cell(
        &mut self,
        cell_type: CellType,
        pts: &[IdType],
    ) -> Result<IdType, MeshError> {
        if cell_type == CellType::Empty {
            return Err(MeshError::UnsupportedCellType(cell_type));
        }
        cell_type.validate_point_count(pts.len())?;
        self.connectivity.insert_next_cell(pts);
        Ok(self
            .types
            .insert_next_cell(cell_type, Some(self.connectivity.last_location())))
    }

    /// Adopt `cells` with one shape per record. `Empty` entries are kept as
    /// tombstones. Links are dropped.
    pub fn set_cells(&mut self, types: &[CellType], cells: CellArray) -> Result<(), MeshError> {
        if types.len() != cells.number_of_cells() {
            return Err(MeshError::InconsistentTopology(format!(
                "{} cell types for {} cells",
                types.len(),
                cells.number_of_cells()
            )));
        }
        let mut registry = CellTypes::with_capacity(types.len(), DEFAULT_EXTEND);
        for (&cell_type, (loc, pts)) in types.iter().zip(cells.entries()) {
            if cell_type != CellType::Empty {
                cell_type.validate_point_count(pts.len())?;
            }
            registry.insert_next_cell(cell_type, Some(loc));
        }
        self.connectivity = cells;
        self.types = registry;
        self.links = None;
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Build point → cell links.
    pub fn build_links(&mut self) -> Result<(), MeshError> {
        let npts = self.points.number_of_points();
        if let Some(bad) = first_bad_point(self.connectivity.iter().flatten(), npts) {
            return Err(MeshError::PointOutOfRange(bad));
        }
        let mut links = CellLinks::new();
        if self.types.is_type(CellType::Empty) {
            links.build(&*self);
        } else {
            links.build_from_cell_array(npts, &self.connectivity);
        }
        self.links = Some(links);
        Ok(())
    }

    /// Drop the links.
    pub fn delete_links(&mut self) {
        self.links = None;
    }

    fn checked_point(&self, pt: IdType) -> Result<&CellLinks, MeshError> {
        let links = self.links.as_ref().ok_or(MeshError::LinksNotBuilt)?;
        if pt >= links.number_of_points() {
            return Err(MeshError::PointOutOfRange(pt));
        }
        Ok(links)
    }

    fn links_mut(&mut self) -> Result<&mut CellLinks, MeshError> {
        self.links.as_mut().ok_or(MeshError::LinksNotBuilt)
    }

    /// Cells using point `pt`.
    pub fn point_cells(&self, pt: IdType) -> Result<&[IdType], MeshError> {
        Ok(self.checked_point(pt)?.cells(pt))
    }

    /// Remove `cell_id` from the links of point `pt`.
    pub fn remove_reference_to_cell(&mut self, pt: IdType, cell_id: IdType) -> Result<(), MeshError> {
        self.checked_point(pt)?;
        self.links_mut()?.remove_cell_reference(cell_id, pt);
        Ok(())
    }

    /// Add `cell_id` to the links of point `pt`.
    pub fn add_reference_to_cell(&mut self, pt: IdType, cell_id: IdType) -> Result<(), MeshError> {
        add_reference(self.links_mut()?, cell_id, pt);
        Ok(())
    }

    /// Resize the link list of point `pt`.
    pub fn resize_cell_list(&mut self, pt: IdType, size: usize) -> Result<(), MeshError> {
        self.checked_point(pt)?;
        self.links_mut()?.resize_cell_list(pt, size);
        Ok(())
    }

    /// Overwrite the points of cell `id`; the point count must not change.
    /// Links are not updated.
    pub fn replace_cell(&mut self, id: IdType, pts: &[IdType]) -> Result<(), MeshError> {
        let entry = self.types.get(id).ok_or(MeshError::CellOutOfRange(id))?;
        if entry.cell_type == CellType::Empty {
            return Err(MeshError::DeletedCell(id));
        }
        let loc = entry.location.ok_or(MeshError::MissingLocation(id))?;
        self.connectivity.replace_cell(loc, pts)
    }

    /// Cells other than `id` that use every point of `pts`.
    pub fn cell_neighbors(&self, id: IdType, pts: &[IdType]) -> Result<Vec<IdType>, MeshError> {
        let links = self.links.as_ref().ok_or(MeshError::LinksNotBuilt)?;
        if let Some(bad) = first_bad_point(pts, links.number_of_points()) {
            return Err(MeshError::PointOutOfRange(bad));
        }
        Ok(neighbors_from_links(links, id, pts))
    }

    /// Whether every live cell has the same shape. An empty grid is not
    /// homogeneous.
    pub fn is_homogeneous(&self) -> bool {
        let mut live = self
            .types
            .iter()
            .map(|e| e.cell_type)
            .filter(|&t| t != CellType::Empty);
        match live.next() {
            Some(first) => live.all(|t| t == first),
            None => false,
        }
    }

    /// Sorted distinct shapes of the live cells.
    pub fn distinct_cell_types(&self) -> Vec<CellType> {
        self.types.distinct_types()
    }

    /// Ids of the cells of shape `cell_type`, ascending.
    pub fn ids_of_cells_of_type(&self, cell_type: CellType) -> Vec<IdType> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, e)| e.cell_type == cell_type)
            .map(|(id, _)| id)
            .collect()
    }

    /// Drop all points, cells and attribute values, keeping allocations.
    pub fn reset(&mut self) {
        self.points.reset();
        self.connectivity.reset();
        self.types.reset();
        self.links = None;
        self.point_data.reset();
        self.cell_data.reset();
    }

    /// Drop everything and release memory.
    pub fn initialize(&mut self) {
        self.points.initialize();
        self.connectivity.initialize();
        self.types = CellTypes::new();
        self.links = None;
        self.point_data.initialize();
        self.cell_data.initialize();
    }

    /// Release unused capacity.
    pub fn squeeze(&mut self) {
        self.points.squeeze();
        self.connectivity.squeeze();
        self.types.squeeze();
        if let Some(links) = self.links.as_mut() {
            links.squeeze();
        }
    }
}

impl DataSet for UnstructuredGrid {
    fn number_of_points(&self) -> usize {
        self.points.number_of_points()
    }

    fn number_of_cells(&self) -> usize {
        self.types.number_of_types()
    }

    fn point(&self, id: IdType) -> [f64; 3] {
        self.points.point(id)
    }

    fn cell_type(&self, id: IdType) -> CellType {
        self.types.get(id).map_or(CellType::Empty, |e| e.cell_type)
    }

    fn cell_points_into(&self, id: IdType, out: &mut Vec<IdType>) {
        out.clear();
        if let Some(e) = self.types.get(id) {
            if let (false, Some(loc)) = (e.cell_type == CellType::Empty, e.location) {
                out.extend_from_slice(self.connectivity.cell(loc));
            }
        }
    }

    fn point_data(&self) -> &Attributes {
        &self.point_data
    }

    fn cell_data(&self) -> &Attributes {
        &self.cell_data
    }
}

impl DebugInvariants for UnstructuredGrid {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "UnstructuredGrid");
    }

    /// One registry entry per record, each live entry pointing at a record
    /// start whose length suits its shape.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        self.connectivity.validate_invariants()?;
        self.types.validate_invariants()?;
        if self.types.number_of_types() != self.connectivity.number_of_cells() {
            return Err(MeshError::InconsistentTopology(format!(
                "{} registry entries for {} records",
                self.types.number_of_types(),
                self.connectivity.number_of_cells()
            )));
        }
        let starts: HashSet<usize> = self.connectivity.entries().map(|(loc, _)| loc).collect();
        for (id, e) in self.types.iter().enumerate() {
            if e.cell_type == CellType::Empty {
                continue;
            }
            let loc = e.location.ok_or(MeshError::MissingLocation(id))?;
            if !starts.contains(&loc) {
                return Err(MeshError::InconsistentTopology(format!(
                    "cell {id} location {loc} is not a record start"
                )));
            }
            e.cell_type
                .validate_point_count(self.connectivity.cell_size(loc))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit tets sharing the face `1-2-3`, plus a pyramid on `1-2`.
    fn grid() -> UnstructuredGrid {
        let mut ug = UnstructuredGrid::new();
        ug.allocate(3, 5);
        for x in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
        ] {
            ug.insert_next_point(x);
        }
        ug.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3]).unwrap();
        ug.insert_next_cell(CellType::Tetra, &[1, 4, 2, 3]).unwrap();
        ug.insert_next_cell(CellType::Pyramid, &[1, 6, 5, 2, 4]).unwrap();
        ug
    }

    #[test]
    fn random_access_and_type_queries() {
        let ug = grid();
        assert_eq!(ug.number_of_cells(), 3);
        assert_eq!(ug.cell_points(2), vec![1, 6, 5, 2, 4]);
        let cell = ug.cell(1).unwrap();
        assert_eq!(cell.cell_type(), CellType::Tetra);
        assert_eq!(cell.points()[1], [1.0, 1.0, 1.0]);
        assert!(!ug.is_homogeneous());
        assert_eq!(
            ug.distinct_cell_types(),
            vec![CellType::Tetra, CellType::Pyramid]
        );
        assert_eq!(ug.ids_of_cells_of_type(CellType::Tetra), vec![0, 1]);
        assert_eq!(ug.validate_invariants(), Ok(()));
        assert!(matches!(ug.cell(3), Err(MeshError::CellOutOfRange(3))));
    }

    #[test]
    fn neighbors_through_links() {
        let mut ug = grid();
        assert_eq!(ug.cell_neighbors(0, &[1, 2, 3]), Err(MeshError::LinksNotBuilt));
        ug.build_links().unwrap();
        assert_eq!(ug.cell_neighbors(0, &[1, 2, 3]).unwrap(), vec![1]);
        let mut around = ug.cell_neighbors(0, &[1, 2]).unwrap();
        around.sort_unstable();
        assert_eq!(around, vec![1, 2]);
        assert_eq!(ug.point_cells(4).unwrap(), &[1, 2]);
        assert_eq!(ug.links().unwrap().validate_against(&ug), Ok(()));
    }

    #[test]
    fn reference_editing_follows_replace() {
        let mut ug = grid();
        ug.build_links().unwrap();
        let old = ug.cell_points(1);
        let new = [1, 4, 2, 5];
        ug.replace_cell(1, &new).unwrap();
        for &p in &old {
            ug.remove_reference_to_cell(p, 1).unwrap();
        }
        for &p in &new {
            ug.resize_cell_list(p, ug.point_cells(p).unwrap().len() + 1).unwrap();
            ug.add_reference_to_cell(p, 1).unwrap();
        }
        assert_eq!(ug.links().unwrap().validate_against(&ug), Ok(()));
        assert_eq!(
            ug.replace_cell(1, &[1, 2]),
            Err(MeshError::CellSizeMismatch {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn set_cells_checks_shapes() {
        let mut ug = grid();
        let mut cells = CellArray::new();
        cells.insert_next_cell(&[0, 1, 2]);
        cells.insert_next_cell(&[0, 1, 2, 3]);
        assert!(matches!(
            ug.set_cells(&[CellType::Triangle], cells.clone()),
            Err(MeshError::InconsistentTopology(_))
        ));
        assert!(matches!(
            ug.set_cells(&[CellType::Triangle, CellType::Hexahedron], cells.clone()),
            Err(MeshError::InvalidPointCount { .. })
        ));
        ug.set_cells(&[CellType::Triangle, CellType::Tetra], cells).unwrap();
        assert_eq!(ug.number_of_cells(), 2);
        assert_eq!(ug.cell_type(1), CellType::Tetra);
        assert_eq!(ug.cell_types().cell_location(1), Some(4));
    }

    #[test]
    fn tombstones_take_the_generic_build() {
        let mut ug = grid();
        let mut cells = ug.connectivity().clone();
        cells.insert_next_cell(&[0, 6]);
        ug.set_cells(
            &[
                CellType::Tetra,
                CellType::Empty,
                CellType::Pyramid,
                CellType::Line,
            ],
            cells,
        )
        .unwrap();
        ug.build_links().unwrap();
        assert_eq!(ug.point_cells(3).unwrap(), &[0]);
        assert_eq!(ug.point_cells(6).unwrap(), &[2, 3]);
        assert!(!ug.is_homogeneous());
        assert_eq!(ug.cell(1).unwrap().cell_type(), CellType::Empty);
    }

    #[test]
    fn homogeneous_grid() {
        let mut ug = UnstructuredGrid::new();
        assert!(!ug.is_homogeneous());
        ug.insert_next_cell(CellType::Vertex, &[0]).unwrap();
        assert!(ug.is_homogeneous());
        assert_eq!(
            ug.insert_next_cell(CellType::Empty, &[]),
            Err(MeshError::UnsupportedCellType(CellType::Empty))
        );
    }
}

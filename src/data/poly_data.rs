//! PolyData: points with vertex, line, polygon and strip connectivity.
//!
//! Cells live in four [`CellArray`]s, one per primitive kind. Without a
//! registry, cell ids run through the arrays in the order verts, lines, polys,
//! strips and are resolved by a linear walk. [`PolyData::build_cells`]
//! materializes a [`CellTypes`] registry for O(1) access, and
//! [`PolyData::build_links`] adds the point → cell links that the editing
//! and neighbor queries need.
//!
//! Editing entry points check that the structures they touch exist and
//! return [`MeshError::CellsNotBuilt`] / [`MeshError::LinksNotBuilt`]
//! otherwise. The plain editors ([`PolyData::replace_cell`],
//! [`PolyData::delete_cell`]) leave the links alone; the `linked` variants
//! keep both structures in step.
//!
//! ```
//! use mesh_cells::data::PolyData;
//! use mesh_cells::topology::CellType;
//!
//! let mut pd = PolyData::new();
//! for x in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
//!     pd.insert_next_point(x);
//! }
//! pd.insert_next_cell(CellType::Triangle, &[0, 1, 2])?;
//! pd.insert_next_cell(CellType::Triangle, &[0, 2, 3])?;
//! pd.build_links()?;
//! assert_eq!(pd.cell_edge_neighbors(0, 0, 2)?, vec![1]);
//! assert!(pd.is_edge(0, 2)?);
//! # Ok::<(), mesh_cells::mesh_error::MeshError>(())
//! ```

use super::attributes::Attributes;
use super::dataset::{DataSet, add_reference, first_bad_point, neighbors_from_links};
use super::points::Points;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::{CellArray, CellLinks, CellType, CellTypes, DEFAULT_EXTEND, IdType};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Which of the four arrays a cell lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Verts,
    Lines,
    Polys,
    Strips,
}

impl Kind {
    const ALL: [Kind; 4] = [Kind::Verts, Kind::Lines, Kind::Polys, Kind::Strips];

    fn of(cell_type: CellType) -> Option<Kind> {
        match cell_type {
            CellType::Vertex | CellType::PolyVertex => Some(Kind::Verts),
            CellType::Line | CellType::PolyLine => Some(Kind::Lines),
            CellType::Triangle | CellType::Quad | CellType::Polygon => Some(Kind::Polys),
            CellType::TriangleStrip => Some(Kind::Strips),
            _ => None,
        }
    }

    /// Shape of a record of `npts` points when no registry says otherwise.
    fn infer(self, npts: usize) -> CellType {
        match (self, npts) {
            (Kind::Verts, 1) => CellType::Vertex,
            (Kind::Verts, _) => CellType::PolyVertex,
            (Kind::Lines, 2) => CellType::Line,
            (Kind::Lines, _) => CellType::PolyLine,
            (Kind::Polys, 3) => CellType::Triangle,
            (Kind::Polys, 4) => CellType::Quad,
            (Kind::Polys, _) => CellType::Polygon,
            (Kind::Strips, _) => CellType::TriangleStrip,
        }
    }
}

/// Surface dataset of 0D, 1D and 2D cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyData {
    points: Points,
    verts: CellArray,
    lines: CellArray,
    polys: CellArray,
    strips: CellArray,
    cells: Option<CellTypes>,
    links: Option<CellLinks>,
    point_data: Attributes,
    cell_data: Attributes,
}

impl PolyData {
    /// Empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room in every connectivity array for `num_cells` cells of up
    /// to `max_cell_size` points.
    pub fn allocate(&mut self, num_cells: usize, max_cell_size: usize) {
        let size = CellArray::estimate_size(num_cells, max_cell_size);
        for kind in Kind::ALL {
            self.array_mut(kind).allocate(size, DEFAULT_EXTEND);
        }
    }

    fn array(&self, kind: Kind) -> &CellArray {
        match kind {
            Kind::Verts => &self.verts,
            Kind::Lines => &self.lines,
            Kind::Polys => &self.polys,
            Kind::Strips => &self.strips,
        }
    }

    fn array_mut(&mut self, kind: Kind) -> &mut CellArray {
        match kind {
            Kind::Verts => &mut self.verts,
            Kind::Lines => &mut self.lines,
            Kind::Polys => &mut self.polys,
            Kind::Strips => &mut self.strips,
        }
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
    pub fn verts(&self) -> &CellArray {
        &self.verts
    }

    #[inline]
    pub fn lines(&self) -> &CellArray {
        &self.lines
    }

    #[inline]
    pub fn polys(&self) -> &CellArray {
        &self.polys
    }

    #[inline]
    pub fn strips(&self) -> &CellArray {
        &self.strips
    }

    /// Replace the vertex cells; the registry and links are dropped.
    pub fn set_verts(&mut self, verts: CellArray) {
        self.verts = verts;
        self.delete_cells();
    }

    /// Replace the line cells; the registry and links are dropped.
    pub fn set_lines(&mut self, lines: CellArray) {
        self.lines = lines;
        self.delete_cells();
    }

    /// Replace the polygon cells; the registry and links are dropped.
    pub fn set_polys(&mut self, polys: CellArray) {
        self.polys = polys;
        self.delete_cells();
    }

    /// Replace the strip cells; the registry and links are dropped.
    pub fn set_strips(&mut self, strips: CellArray) {
        self.strips = strips;
        self.delete_cells();
    }

    pub fn point_data_mut(&mut self) -> &mut Attributes {
        &mut self.point_data
    }

    pub fn cell_data_mut(&mut self) -> &mut Attributes {
        &mut self.cell_data
    }

    /// The registry, if built.
    pub fn cell_types(&self) -> Option<&CellTypes> {
        self.cells.as_ref()
    }

    /// The links, if built.
    pub fn links(&self) -> Option<&CellLinks> {
        self.links.as_ref()
    }

    /// Insert a cell of a 0D, 1D or 2D shape into the matching array.
    ///
    /// With a registry the new cell gets the next registry id. Without one
    /// the returned id is the cell's position in the verts, lines, polys,
    /// strips order at the time of insertion; inserting into an earlier
    /// array later shifts it.
    pub fn insert_next_cell(
        &mut self,
        cell_type: CellType,
        pts: &[IdType],
    ) -> Result<IdType, MeshError> {
        let kind = Kind::of(cell_type).ok_or(MeshError::UnsupportedCellType(cell_type))?;
        cell_type.validate_point_count(pts.len())?;
        let offset = self.cells_before(kind);
        let array = self.array_mut(kind);
        let index = array.insert_next_cell(pts);
        let location = array.last_location();
        Ok(match self.cells.as_mut() {
            Some(cells) => cells.insert_next_cell(cell_type, Some(location)),
            None => offset + index,
        })
    }

    fn cells_before(&self, kind: Kind) -> usize {
        Kind::ALL
            .iter()
            .take_while(|&&k| k != kind)
            .map(|&k| self.array(k).number_of_cells())
            .sum()
    }

    /// Array and record location of live cell `id`.
    fn locate(&self, id: IdType) -> Option<(Kind, usize)> {
        match &self.cells {
            Some(cells) => {
                let entry = cells.get(id)?;
                Some((Kind::of(entry.cell_type)?, entry.location?))
            }
            None => {
                let mut rest = id;
                for kind in Kind::ALL {
                    let array = self.array(kind);
                    if rest < array.number_of_cells() {
                        return array.entries().nth(rest).map(|(loc, _)| (kind, loc));
                    }
                    rest -= array.number_of_cells();
                }
                None
            }
        }
    }

    /// Build the cell registry from the four arrays. Existing links are
    /// dropped since they may refer to other ids.
    pub fn build_cells(&mut self) {
        let total = Kind::ALL
            .iter()
            .map(|&k| self.array(k).number_of_cells())
            .sum();
        let mut cells = CellTypes::with_capacity(total, DEFAULT_EXTEND);
        for kind in Kind::ALL {
            for (loc, pts) in self.array(kind).entries() {
                cells.insert_next_cell(kind.infer(pts.len()), Some(loc));
            }
        }
        log::debug!("built poly data registry: {total} cells");
        self.cells = Some(cells);
        self.links = None;
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
    }

    /// Drop the registry, and with it the links.
    pub fn delete_cells(&mut self) {
        self.cells = None;
        self.links = None;
    }

    /// Build point → cell links, building the registry first when needed.
    pub fn build_links(&mut self) -> Result<(), MeshError> {
        if self.cells.is_none() {
            self.build_cells();
        }
        let npts = self.points.number_of_points();
        for kind in Kind::ALL {
            if let Some(bad) = first_bad_point(self.array(kind).iter().flatten(), npts) {
                return Err(MeshError::PointOutOfRange(bad));
            }
        }
        let mut links = CellLinks::new();
        links.build(&*self);
        self.links = Some(links);
        Ok(())
    }

    /// Drop the links.
    pub fn delete_links(&mut self) {
        self.links = None;
    }

    fn links_ref(&self) -> Result<&CellLinks, MeshError> {
        self.links.as_ref().ok_or(MeshError::LinksNotBuilt)
    }

    fn links_mut(&mut self) -> Result<&mut CellLinks, MeshError> {
        self.links.as_mut().ok_or(MeshError::LinksNotBuilt)
    }

    fn checked_point(&self, pt: IdType) -> Result<&CellLinks, MeshError> {
        let links = self.links_ref()?;
        if pt >= links.number_of_points() {
            return Err(MeshError::PointOutOfRange(pt));
        }
        Ok(links)
    }

    /// Array and location of live cell `id`, through the registry.
    fn registered(&self, id: IdType) -> Result<(Kind, usize), MeshError> {
        let cells = self.cells.as_ref().ok_or(MeshError::CellsNotBuilt)?;
        let entry = cells.get(id).ok_or(MeshError::CellOutOfRange(id))?;
        if entry.cell_type == CellType::Empty {
            return Err(MeshError::DeletedCell(id));
        }
        let location = entry.location.ok_or(MeshError::MissingLocation(id))?;
        let kind = Kind::of(entry.cell_type).ok_or(MeshError::UnsupportedCellType(entry.cell_type))?;
        Ok((kind, location))
    }

    /// Cells using point `pt`.
    pub fn point_cells(&self, pt: IdType) -> Result<&[IdType], MeshError> {
        Ok(self.checked_point(pt)?.cells(pt))
    }

    /// Reverse the point order of cell `id`.
    pub fn reverse_cell(&mut self, id: IdType) -> Result<(), MeshError> {
        let (kind, loc) = self.registered(id)?;
        self.array_mut(kind).reverse_cell(loc);
        Ok(())
    }

    /// Overwrite the points of cell `id`; the point count must not change.
    /// Links are not updated.
    pub fn replace_cell(&mut self, id: IdType, pts: &[IdType]) -> Result<(), MeshError> {
        let (kind, loc) = self.registered(id)?;
        self.array_mut(kind).replace_cell(loc, pts)
    }

    /// Replace point `old` by `new` in cell `id` and move the link reference.
    /// Returns `false` when the cell does not use `old`.
    pub fn replace_cell_point(
        &mut self,
        id: IdType,
        old: IdType,
        new: IdType,
    ) -> Result<bool, MeshError> {
        self.links_ref()?;
        let (kind, loc) = self.registered(id)?;
        let Some(i) = self.array(kind).cell(loc).iter().position(|&p| p == old) else {
            return Ok(false);
        };
        self.array_mut(kind).cell_mut(loc)[i] = new;
        let links = self.links_mut()?;
        links.remove_cell_reference(id, old);
        add_reference(links, id, new);
        Ok(true)
    }

    /// Insert a cell and register it in the links of its points.
    pub fn insert_next_linked_cell(
        &mut self,
        cell_type: CellType,
        pts: &[IdType],
    ) -> Result<IdType, MeshError> {
        self.links_ref()?;
        let id = self.insert_next_cell(cell_type, pts)?;
        let links = self.links_mut()?;
        for &p in pts.iter().unique() {
            add_reference(links, id, p);
        }
        Ok(id)
    }

    /// Overwrite cell `id` with `pts` (same point count) and move its link
    /// references from the old points to the new ones.
    pub fn replace_linked_cell(&mut self, id: IdType, pts: &[IdType]) -> Result<(), MeshError> {
        self.links_ref()?;
        let (kind, loc) = self.registered(id)?;
        let old = self.array(kind).cell(loc).to_vec();
        self.array_mut(kind).replace_cell(loc, pts)?;
        let links = self.links_mut()?;
        for &p in old.iter().unique() {
            if p < links.number_of_points() {
                links.remove_cell_reference(id, p);
            }
        }
        for &p in pts.iter().unique() {
            add_reference(links, id, p);
        }
        Ok(())
    }

    /// Remove cell `id` from the links of all its points. Call before
    /// [`PolyData::delete_cell`]; a deleted cell has no points to walk.
    pub fn remove_cell_reference(&mut self, id: IdType) -> Result<(), MeshError> {
        self.links_ref()?;
        let pts = self.cell_points(id);
        let links = self.links_mut()?;
        for &p in pts.iter().unique() {
            if p < links.number_of_points() {
                links.remove_cell_reference(id, p);
            }
        }
        Ok(())
    }

    /// Add cell `id` to the links of all its points that do not hold it yet.
    pub fn add_cell_reference(&mut self, id: IdType) -> Result<(), MeshError> {
        self.links_ref()?;
        let pts = self.cell_points(id);
        let links = self.links_mut()?;
        for &p in pts.iter().unique() {
            if p >= links.number_of_points() || !links.cells(p).contains(&id) {
                add_reference(links, id, p);
            }
        }
        Ok(())
    }

    /// Resize the link list of point `pt`.
    pub fn resize_cell_list(&mut self, pt: IdType, size: usize) -> Result<(), MeshError> {
        self.checked_point(pt)?;
        self.links_mut()?.resize_cell_list(pt, size);
        Ok(())
    }

    /// Tombstone cell `id` in the registry. Its record stays in the
    /// connectivity until [`PolyData::remove_deleted_cells`].
    pub fn delete_cell(&mut self, id: IdType) -> Result<(), MeshError> {
        let cells = self.cells.as_mut().ok_or(MeshError::CellsNotBuilt)?;
        if id >= cells.number_of_types() {
            return Err(MeshError::CellOutOfRange(id));
        }
        cells.delete_cell(id);
        Ok(())
    }

    /// Mark point `pt` unused in the links.
    pub fn delete_point(&mut self, pt: IdType) -> Result<(), MeshError> {
        self.checked_point(pt)?;
        self.links_mut()?.delete_point(pt);
        Ok(())
    }

    /// Compact away tombstoned cells, renumbering the survivors in id order
    /// and carrying their cell data along. Links are rebuilt if they existed.
    /// Returns the number of cells removed.
    pub fn remove_deleted_cells(&mut self) -> Result<usize, MeshError> {
        let cells = self.cells.take().ok_or(MeshError::CellsNotBuilt)?;
        let had_links = self.links.take().is_some();

        let mut arrays = Kind::ALL.map(|_| CellArray::new());
        let mut registry = CellTypes::with_capacity(cells.number_of_types(), DEFAULT_EXTEND);
        let mut cell_data = Attributes::new();
        cell_data.interpolate_allocate(&self.cell_data);
        let tuples = self.cell_data.number_of_tuples();
        let mut removed = 0;

        for (id, entry) in cells.iter().enumerate() {
            let (Some(kind), Some(loc)) = (Kind::of(entry.cell_type), entry.location) else {
                removed += 1;
                continue;
            };
            let out = &mut arrays[kind as usize];
            out.insert_next_cell(self.array(kind).cell(loc));
            let new_id = registry.insert_next_cell(entry.cell_type, Some(out.last_location()));
            if id < tuples {
                cell_data.copy_data(&self.cell_data, id, new_id);
            }
        }

        let [verts, lines, polys, strips] = arrays;
        self.verts = verts;
        self.lines = lines;
        self.polys = polys;
        self.strips = strips;
        self.cells = Some(registry);
        self.cell_data = cell_data;
        log::debug!("removed {removed} deleted cells");
        if had_links {
            self.build_links()?;
        }
        Ok(removed)
    }

    /// Whether some triangle uses all of `v1`, `v2`, `v3`.
    pub fn is_triangle(&self, v1: IdType, v2: IdType, v3: IdType) -> Result<bool, MeshError> {
        let links = self.links_ref()?;
        if v1 >= links.number_of_points() {
            return Ok(false);
        }
        Ok(links.cells(v1).iter().any(|&c| {
            self.cell_type(c) == CellType::Triangle && {
                let pts = self.cell_points(c);
                pts.contains(&v2) && pts.contains(&v3)
            }
        }))
    }

    /// Whether `p1` and `p2` are joined by an edge of some cell.
    pub fn is_edge(&self, p1: IdType, p2: IdType) -> Result<bool, MeshError> {
        let links = self.links_ref()?;
        if p1 >= links.number_of_points() {
            return Ok(false);
        }
        let joins = |a: IdType, b: IdType| (a == p1 && b == p2) || (a == p2 && b == p1);
        let mut pts = Vec::new();
        for &c in links.cells(p1) {
            self.cell_points_into(c, &mut pts);
            let adjacent = match self.cell_type(c) {
                CellType::Line | CellType::PolyLine => pts.windows(2).any(|w| joins(w[0], w[1])),
                CellType::Triangle | CellType::Quad | CellType::Polygon => pts
                    .iter()
                    .circular_tuple_windows()
                    .any(|(&a, &b)| joins(a, b)),
                CellType::TriangleStrip => {
                    pts.windows(2).any(|w| joins(w[0], w[1]))
                        || pts.windows(3).any(|w| joins(w[0], w[2]))
                }
                _ => false,
            };
            if adjacent {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether cell `id` uses point `pt`.
    pub fn is_point_used_by_cell(&self, pt: IdType, id: IdType) -> bool {
        self.cell_points(id).contains(&pt)
    }

    /// Cells other than `id` that use both `p1` and `p2`.
    pub fn cell_edge_neighbors(
        &self,
        id: IdType,
        p1: IdType,
        p2: IdType,
    ) -> Result<Vec<IdType>, MeshError> {
        self.checked_point(p1)?;
        let links = self.checked_point(p2)?;
        Ok(neighbors_from_links(links, id, &[p1, p2]))
    }

    /// Cells other than `id` that use every point of `pts`.
    pub fn cell_neighbors(&self, id: IdType, pts: &[IdType]) -> Result<Vec<IdType>, MeshError> {
        let links = self.links_ref()?;
        if let Some(bad) = first_bad_point(pts, links.number_of_points()) {
            return Err(MeshError::PointOutOfRange(bad));
        }
        Ok(neighbors_from_links(links, id, pts))
    }

    /// Drop all points, cells and attribute values, keeping allocations.
    pub fn reset(&mut self) {
        self.points.reset();
        for kind in Kind::ALL {
            self.array_mut(kind).reset();
        }
        self.delete_cells();
        self.point_data.reset();
        self.cell_data.reset();
    }

    /// Drop everything and release memory.
    pub fn initialize(&mut self) {
        self.points.initialize();
        for kind in Kind::ALL {
            self.array_mut(kind).initialize();
        }
        self.delete_cells();
        self.point_data.initialize();
        self.cell_data.initialize();
    }

    /// Release unused capacity.
    pub fn squeeze(&mut self) {
        self.points.squeeze();
        for kind in Kind::ALL {
            self.array_mut(kind).squeeze();
        }
        if let Some(cells) = self.cells.as_mut() {
            cells.squeeze();
        }
        if let Some(links) = self.links.as_mut() {
            links.squeeze();
        }
    }
}

impl DataSet for PolyData {
    fn number_of_points(&self) -> usize {
        self.points.number_of_points()
    }

    fn number_of_cells(&self) -> usize {
        match &self.cells {
            Some(cells) => cells.number_of_types(),
            None => Kind::ALL
                .iter()
                .map(|&k| self.array(k).number_of_cells())
                .sum(),
        }
    }

    fn point(&self, id: IdType) -> [f64; 3] {
        self.points.point(id)
    }

    fn cell_type(&self, id: IdType) -> CellType {
        match &self.cells {
            Some(cells) => cells.get(id).map_or(CellType::Empty, |e| e.cell_type),
            None => self
                .locate(id)
                .map_or(CellType::Empty, |(kind, loc)| {
                    kind.infer(self.array(kind).cell_size(loc))
                }),
        }
    }

    fn cell_points_into(&self, id: IdType, out: &mut Vec<IdType>) {
        out.clear();
        if let Some((kind, loc)) = self.locate(id) {
            out.extend_from_slice(self.array(kind).cell(loc));
        }
    }

    fn point_data(&self) -> &Attributes {
        &self.point_data
    }

    fn cell_data(&self) -> &Attributes {
        &self.cell_data
    }
}

impl DebugInvariants for PolyData {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PolyData");
    }

    /// Every live registry entry must address a record of its kind's array
    /// whose length suits the recorded shape.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        let Some(cells) = &self.cells else {
            return Ok(());
        };
        for (id, entry) in cells.iter().enumerate() {
            let Some(kind) = Kind::of(entry.cell_type) else {
                continue;
            };
            let array = self.array(kind);
            let loc = entry.location.ok_or(MeshError::MissingLocation(id))?;
            if loc >= array.number_of_connectivity_entries() {
                return Err(MeshError::InconsistentTopology(format!(
                    "cell {id} points past the end of its array (location {loc})"
                )));
            }
            entry.cell_type.validate_point_count(array.cell_size(loc))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::attributes::DataArray;

    /// Unit square as two triangles, plus a vertex, a line and a strip.
    fn mixed() -> PolyData {
        let mut pd = PolyData::new();
        for x in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
        ] {
            pd.insert_next_point(x);
        }
        pd.insert_next_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
        pd.insert_next_cell(CellType::Triangle, &[0, 2, 3]).unwrap();
        pd.insert_next_cell(CellType::Vertex, &[4]).unwrap();
        pd.insert_next_cell(CellType::Line, &[1, 4]).unwrap();
        pd
    }

    #[test]
    fn ids_follow_kind_order_without_registry() {
        let pd = mixed();
        assert_eq!(pd.number_of_cells(), 4);
        assert_eq!(pd.cell_type(0), CellType::Vertex);
        assert_eq!(pd.cell_type(1), CellType::Line);
        assert_eq!(pd.cell_points(3), vec![0, 2, 3]);
        assert_eq!(pd.cell_type(4), CellType::Empty);
        assert!(pd.cell_points(4).is_empty());
    }

    #[test]
    fn registry_keeps_declared_types() {
        let mut pd = mixed();
        pd.build_cells();
        let id = pd.insert_next_cell(CellType::Polygon, &[0, 1, 2, 3]).unwrap();
        assert_eq!(id, 4);
        assert_eq!(pd.cell_type(id), CellType::Polygon);
        assert_eq!(pd.cell(id).unwrap().number_of_points(), 4);
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        let mut pd = PolyData::new();
        assert_eq!(
            pd.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3]),
            Err(MeshError::UnsupportedCellType(CellType::Tetra))
        );
    }

    #[test]
    fn editing_requires_built_structures() {
        let mut pd = mixed();
        assert_eq!(pd.reverse_cell(0), Err(MeshError::CellsNotBuilt));
        assert_eq!(pd.point_cells(0), Err(MeshError::LinksNotBuilt));
        assert_eq!(pd.delete_point(0), Err(MeshError::LinksNotBuilt));
        pd.build_cells();
        assert!(pd.reverse_cell(2).is_ok());
        assert_eq!(pd.cell_points(2), vec![2, 1, 0]);
        assert_eq!(pd.is_edge(0, 1), Err(MeshError::LinksNotBuilt));
    }

    #[test]
    fn links_and_topology_queries() {
        let mut pd = mixed();
        pd.build_links().unwrap();
        assert_eq!(pd.point_cells(4).unwrap(), &[0, 1]);
        assert!(pd.is_edge(1, 4).unwrap());
        assert!(pd.is_edge(0, 2).unwrap());
        assert!(!pd.is_edge(1, 3).unwrap());
        assert!(pd.is_triangle(2, 0, 3).unwrap());
        assert!(!pd.is_triangle(1, 2, 3).unwrap());
        assert!(pd.is_point_used_by_cell(3, 3));
        assert_eq!(pd.cell_edge_neighbors(2, 0, 2).unwrap(), vec![3]);
        assert!(pd.cell_neighbors(2, &[1, 2]).unwrap().is_empty());
        assert_eq!(pd.links().unwrap().validate_against(&pd), Ok(()));
    }

    #[test]
    fn linked_editing_keeps_links_consistent() {
        let mut pd = mixed();
        pd.build_links().unwrap();
        let p = pd.insert_next_point([3.0, 3.0, 0.0]);
        let id = pd.insert_next_linked_cell(CellType::Triangle, &[1, 4, p]).unwrap();
        assert_eq!(id, 4);
        assert!(pd.replace_cell_point(id, 1, 2).unwrap());
        assert!(!pd.replace_cell_point(id, 1, 2).unwrap());
        pd.replace_linked_cell(3, &[0, 2, p]).unwrap();
        assert_eq!(pd.links().unwrap().validate_against(&pd), Ok(()));
        assert_eq!(pd.point_cells(p).unwrap(), &[4, 3]);
    }

    #[test]
    fn delete_and_compact() {
        let mut pd = mixed();
        pd.cell_data_mut()
            .add_array(DataArray::from_values("tag", 1, vec![0.0, 1.0, 2.0, 3.0]).unwrap());
        pd.build_links().unwrap();
        pd.remove_cell_reference(2).unwrap();
        pd.delete_cell(2).unwrap();
        assert_eq!(pd.cell(2).unwrap().cell_type(), CellType::Empty);
        assert_eq!(pd.links().unwrap().validate_against(&pd), Ok(()));

        assert_eq!(pd.remove_deleted_cells().unwrap(), 1);
        assert_eq!(pd.number_of_cells(), 3);
        assert_eq!(pd.cell_points(2), vec![0, 2, 3]);
        assert_eq!(pd.cell_data().array("tag").unwrap().values(), &[0.0, 1.0, 3.0]);
        assert!(pd.links().is_some());
        assert_eq!(pd.point_cells(1).unwrap(), &[1]);
    }

    #[test]
    fn build_links_rejects_dangling_ids() {
        let mut pd = PolyData::new();
        pd.insert_next_point([0.0; 3]);
        pd.insert_next_cell(CellType::Line, &[0, 7]).unwrap();
        assert_eq!(pd.build_links(), Err(MeshError::PointOutOfRange(7)));
    }

    #[test]
    fn reset_keeps_nothing() {
        let mut pd = mixed();
        pd.build_links().unwrap();
        pd.reset();
        assert_eq!(pd.number_of_cells(), 0);
        assert_eq!(pd.number_of_points(), 0);
        assert!(pd.links().is_none());
        assert!(pd.cell_types().is_none());
    }
}

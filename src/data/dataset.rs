//! The read-side contract shared by every dataset.

use crate::cell::Cell;
use crate::data::attributes::Attributes;
use crate::geometry::bounds::Bounds;
use crate::mesh_error::MeshError;
use crate::topology::{CellLinks, CellType, IdType};

/// A collection of points and cells over them.
///
/// Implementors expose raw per-id access; the provided methods assemble
/// value-owned [`Cell`]s from it.
pub trait DataSet {
    /// Number of points.
    fn number_of_points(&self) -> usize;

    /// Number of cell ids, including deleted ones.
    fn number_of_cells(&self) -> usize;

    /// Coordinates of point `id`.
    ///
    /// # Panics
    /// May panic if `id` is out of range.
    fn point(&self, id: IdType) -> [f64; 3];

    /// Shape of cell `id`; [`CellType::Empty`] for deleted or unknown cells.
    fn cell_type(&self, id: IdType) -> CellType;

    /// Overwrite `out` with the point ids of cell `id` (empty when the cell
    /// has no connectivity).
    fn cell_points_into(&self, id: IdType, out: &mut Vec<IdType>);

    /// Point attributes.
    fn point_data(&self) -> &Attributes;

    /// Cell attributes.
    fn cell_data(&self) -> &Attributes;

    /// Point ids of cell `id`.
    fn cell_points(&self, id: IdType) -> Vec<IdType> {
        let mut out = Vec::new();
        self.cell_points_into(id, &mut out);
        out
    }

    /// Assemble cell `id` with its point ids and coordinates.
    fn cell(&self, id: IdType) -> Result<Cell, MeshError> {
        if id >= self.number_of_cells() {
            return Err(MeshError::CellOutOfRange(id));
        }
        let cell_type = self.cell_type(id);
        if cell_type == CellType::Empty {
            return Ok(Cell::empty());
        }
        let ids = self.cell_points(id);
        let npts = self.number_of_points();
        if let Some(&bad) = ids.iter().find(|&&p| p >= npts) {
            return Err(MeshError::PointOutOfRange(bad));
        }
        let points = ids.iter().map(|&p| self.point(p)).collect();
        Cell::new(cell_type, ids, points)
    }

    /// Bounds of all points.
    fn bounds(&self) -> Bounds {
        let mut b = Bounds::empty();
        for id in 0..self.number_of_points() {
            b.add_point(self.point(id));
        }
        b
    }

    /// Bounds of cell `id`'s points.
    fn cell_bounds(&self, id: IdType) -> Bounds {
        let mut b = Bounds::empty();
        let mut ids = Vec::new();
        self.cell_points_into(id, &mut ids);
        for p in ids {
            b.add_point(self.point(p));
        }
        b
    }
}

/// Add `cell_id` to the list of `pt`, making room first. Points past the end
/// of the links (inserted after the build) get a fresh list.
pub(crate) fn add_reference(links: &mut CellLinks, cell_id: IdType, pt: IdType) {
    if pt < links.number_of_points() {
        links.resize_cell_list(pt, links.ncells(pt) + 1);
        links.add_cell_reference(cell_id, pt);
    } else {
        links.insert_next_cell_reference(pt, cell_id);
    }
}

/// First id in `pts` that is not a valid point id.
pub(crate) fn first_bad_point<'a, I>(pts: I, num_points: usize) -> Option<IdType>
where
    I: IntoIterator<Item = &'a IdType>,
{
    pts.into_iter().copied().find(|&p| p >= num_points)
}

/// Cells other than `cell_id` that use every point of `pt_ids`.
///
/// Intersects the link lists, starting from the shortest one.
pub(crate) fn neighbors_from_links(
    links: &CellLinks,
    cell_id: IdType,
    pt_ids: &[IdType],
) -> Vec<IdType> {
    let Some(&seed) = pt_ids.iter().min_by_key(|&&p| links.ncells(p)) else {
        return Vec::new();
    };
    links
        .cells(seed)
        .iter()
        .copied()
        .filter(|&c| c != cell_id)
        .filter(|&c| pt_ids.iter().all(|&p| links.cells(p).contains(&c)))
        .collect()
}

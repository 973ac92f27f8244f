//! Point and segment probes over a dataset.
//!
//! Both probes are brute-force scans with a bounding-box pre-filter: a cell
//! is only assembled when its bounds, inflated by the tolerance, can contain
//! the answer.

use crate::cell::{LineHit, PositionEval};
use crate::data::DataSet;
use crate::geometry::bounds::hit_bbox;
use crate::geometry::math::sub;
use crate::mesh_error::MeshError;
use crate::topology::IdType;

/// A segment hit on a specific cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellHit {
    pub cell_id: IdType,
    pub hit: LineHit,
}

/// A cell containing a query point.
#[derive(Clone, Debug, PartialEq)]
pub struct CellLocation {
    pub cell_id: IdType,
    /// The cell's evaluation of the query point.
    pub eval: PositionEval,
}

/// First cell hit by the segment `p1-p2`, ordered by segment parameter.
/// Ties keep the lower cell id.
pub fn intersect_with_line<D>(
    dataset: &D,
    p1: [f64; 3],
    p2: [f64; 3],
    tol: f64,
) -> Result<Option<CellHit>, MeshError>
where
    D: DataSet + ?Sized,
{
    let dir = sub(p2, p1);
    let mut best: Option<CellHit> = None;
    for id in 0..dataset.number_of_cells() {
        let bounds = dataset.cell_bounds(id);
        if bounds.is_empty() || hit_bbox(&bounds.inflated(tol), p1, dir).is_none() {
            continue;
        }
        let cell = dataset.cell(id)?;
        if let Some(hit) = cell.intersect_with_line(p1, p2, tol) {
            if best.map_or(true, |b| hit.t < b.hit.t) {
                best = Some(CellHit { cell_id: id, hit });
            }
        }
    }
    Ok(best)
}

/// First cell, by id, that contains `x` within `tol`.
///
/// A cell whose evaluation fails (singular or non-converging map) is skipped.
pub fn find_cell<D>(dataset: &D, x: [f64; 3], tol: f64) -> Result<Option<CellLocation>, MeshError>
where
    D: DataSet + ?Sized,
{
    let tol2 = tol * tol;
    for id in 0..dataset.number_of_cells() {
        let bounds = dataset.cell_bounds(id);
        if bounds.is_empty() || !bounds.inflated(tol).contains(x) {
            continue;
        }
        let cell = dataset.cell(id)?;
        match cell.evaluate_position(x) {
            Ok(eval) if eval.inside || eval.dist2 <= tol2 => {
                return Ok(Some(CellLocation { cell_id: id, eval }));
            }
            Ok(_) => {}
            Err(e) => log::debug!("cell {id} skipped while locating {x:?}: {e}"),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PolyData;
    use crate::topology::CellType;
    use approx::assert_relative_eq;

    /// Unit square split into two triangles plus a stray vertex.
    fn square() -> PolyData {
        let mut pd = PolyData::new();
        for p in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 5.0, 5.0],
        ] {
            pd.insert_next_point(p);
        }
        pd.insert_next_cell(CellType::Vertex, &[4]).unwrap();
        pd.insert_next_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
        pd.insert_next_cell(CellType::Triangle, &[0, 2, 3]).unwrap();
        pd
    }

    #[test]
    fn finds_containing_triangle() {
        let pd = square();
        let loc = find_cell(&pd, [0.2, 0.7, 0.0], 1e-9).unwrap().unwrap();
        assert_eq!(loc.cell_id, 2);
        assert!(loc.eval.inside);
        let total: f64 = loc.eval.weights.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);

        assert!(find_cell(&pd, [2.0, 2.0, 0.0], 1e-9).unwrap().is_none());
    }

    #[test]
    fn line_probe_reports_first_hit() {
        let pd = square();
        let hit = intersect_with_line(&pd, [0.75, 0.25, 1.0], [0.75, 0.25, -1.0], 1e-9)
            .unwrap()
            .unwrap();
        assert_eq!(hit.cell_id, 1);
        assert_relative_eq!(hit.hit.t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hit.hit.x[2], 0.0, epsilon = 1e-12);

        let miss = intersect_with_line(&pd, [3.0, 3.0, 1.0], [3.0, 3.0, -1.0], 1e-9).unwrap();
        assert!(miss.is_none());
    }
}

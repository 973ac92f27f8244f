//! Iso-surface extraction over a whole dataset.
//!
//! Every cell is assembled, handed the scalars at its points and contoured
//! into a shared [`ContourOutput`]. Crossing points are merged through
//! [`MergePoints`], so neighbouring cells share output points. The result is
//! a [`PolyData`] whose vertices, lines and polygons carry the cell data of the
//! cell they came from.

use crate::cell::{ContourAttributes, ContourOutput};
use crate::data::{Attributes, DataSet, PolyData};
use crate::geometry::locator::{MergePoints, PointLocator};
use crate::mesh_error::MeshError;

/// Contour `dataset` at each of `values`.
///
/// `scalars` holds one value per point. Point data is interpolated onto the
/// output points and cell data copied onto the output cells, provided each
/// attribute set has a record for every point (resp. cell); otherwise that
/// set is not transferred.
pub fn contour_dataset<D>(dataset: &D, scalars: &[f64], values: &[f64]) -> Result<PolyData, MeshError>
where
    D: DataSet + ?Sized,
{
    let npts = dataset.number_of_points();
    let ncells = dataset.number_of_cells();
    if scalars.len() != npts {
        return Err(MeshError::Attribute(format!(
            "{} scalars given for {npts} points",
            scalars.len()
        )));
    }

    let none = Attributes::new();
    let in_point_data = complete_or_empty(dataset.point_data(), npts, "point", &none);
    let in_cell_data = complete_or_empty(dataset.cell_data(), ncells, "cell", &none);

    let mut out_point_data = Attributes::new();
    out_point_data.interpolate_allocate(in_point_data);
    let mut output = ContourOutput::with_cell_data_like(in_cell_data);
    let mut locator = MergePoints::with_capacity(ncells);
    let mut cell_scalars = Vec::new();

    for id in 0..ncells {
        let cell = dataset.cell(id)?;
        if cell.number_of_points() == 0 {
            continue;
        }
        cell_scalars.clear();
        cell_scalars.extend(cell.point_ids().iter().map(|&p| scalars[p]));
        let mut attrs = ContourAttributes {
            in_point_data,
            out_point_data: &mut out_point_data,
            in_cell_data,
            cell_id: id,
        };
        for &value in values {
            cell.contour(value, &cell_scalars, &mut locator, &mut output, Some(&mut attrs))?;
        }
    }

    log::debug!(
        "contoured {ncells} cells at {} values: {} points, {} cells",
        values.len(),
        locator.points().number_of_points(),
        output.number_of_cells()
    );

    let ContourOutput {
        verts,
        lines,
        polys,
        vert_data,
        line_data,
        poly_data,
    } = output;
    let mut result = PolyData::new();
    result.set_points(locator.into_points());
    result.set_verts(verts);
    result.set_lines(lines);
    result.set_polys(polys);
    *result.point_data_mut() = out_point_data;

    // PolyData numbers cells verts first, then lines, then polys.
    let cell_data = result.cell_data_mut();
    cell_data.interpolate_allocate(in_cell_data);
    cell_data.append(&vert_data);
    cell_data.append(&line_data);
    cell_data.append(&poly_data);
    Ok(result)
}

/// Contour on the first component of the named point data array.
pub fn contour_by_array<D>(dataset: &D, name: &str, values: &[f64]) -> Result<PolyData, MeshError>
where
    D: DataSet + ?Sized,
{
    let array = dataset
        .point_data()
        .array(name)
        .ok_or_else(|| MeshError::Attribute(format!("no point array named {name:?}")))?;
    let scalars: Vec<f64> = array.component(0).collect();
    contour_dataset(dataset, &scalars, values)
}

fn complete_or_empty<'a>(
    attrs: &'a Attributes,
    records: usize,
    what: &str,
    none: &'a Attributes,
) -> &'a Attributes {
    if attrs.is_empty() || attrs.number_of_tuples() >= records {
        attrs
    } else {
        log::warn!(
            "{what} data has {} records for {records} {what}s; not transferred",
            attrs.number_of_tuples()
        );
        none
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataArray, UnstructuredGrid};
    use crate::topology::CellType;
    use approx::assert_relative_eq;

    /// Two unit quads side by side, sharing the edge x = 1.
    fn strip_of_quads() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        for p in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [2.0, 1.0, 0.0],
        ] {
            grid.insert_next_point(p);
        }
        grid.insert_next_cell(CellType::Quad, &[0, 1, 4, 3]).unwrap();
        grid.insert_next_cell(CellType::Quad, &[1, 2, 5, 4]).unwrap();
        grid
    }

    #[test]
    fn horizontal_cut_merges_shared_points() {
        let mut grid = strip_of_quads();
        let ys = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        grid.point_data_mut()
            .add_array(DataArray::from_values("y", 1, ys.to_vec()).unwrap());
        grid.cell_data_mut()
            .add_array(DataArray::from_values("region", 1, vec![3.0, 4.0]).unwrap());

        let out = contour_by_array(&grid, "y", &[0.5]).unwrap();
        assert_eq!(out.lines().number_of_cells(), 2);
        assert_eq!(out.number_of_points(), 3);
        for id in 0..out.number_of_points() {
            assert_relative_eq!(out.point(id)[1], 0.5);
        }
        let y = out.point_data().array("y").unwrap();
        assert!(y.values().iter().all(|&v| (v - 0.5).abs() < 1e-12));
        assert_eq!(out.cell_data().array("region").unwrap().values(), &[3.0, 4.0]);
    }

    #[test]
    fn several_values_and_no_crossing() {
        let grid = strip_of_quads();
        let xs = [0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let out = contour_dataset(&grid, &xs, &[0.5, 1.5, 7.0]).unwrap();
        assert_eq!(out.lines().number_of_cells(), 2);
        assert_eq!(out.number_of_points(), 4);
    }

    #[test]
    fn incomplete_cell_data_is_dropped() {
        let mut grid = strip_of_quads();
        grid.cell_data_mut()
            .add_array(DataArray::from_values("region", 1, vec![3.0]).unwrap());
        let xs = [0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let out = contour_dataset(&grid, &xs, &[0.5]).unwrap();
        assert_eq!(out.lines().number_of_cells(), 1);
        assert!(out.cell_data().is_empty());
    }

    #[test]
    fn scalar_count_must_match_points() {
        let grid = strip_of_quads();
        assert!(matches!(
            contour_dataset(&grid, &[0.0; 3], &[0.5]),
            Err(MeshError::Attribute(_))
        ));
    }
}

//! Cell quality measures over assembled [`Cell`]s.
//!
//! # Supported cell types
//! - **Triangle**, **Quad**, **Polygon**: areas and angles are taken in the
//!   plane of the points; the signed Jacobian is the shoelace area projected
//!   on XY, positive for counter-clockwise loops.
//! - **Tetra**, **Pyramid**, **Wedge**, **Hexahedron**: the signed Jacobian is
//!   the volume of the cell's tetrahedral decomposition, positive when the
//!   points follow the shape's reference ordering.
//!
//! The radius ratio is defined for triangles and tetrahedra only and is
//! normalized so that the equilateral triangle and the regular tetrahedron
//! score exactly 1.
//!
//! # Examples
//! ```rust
//! use mesh_cells::cell::Cell;
//! use mesh_cells::geometry::quality::{cell_quality, validate_cell_geometry};
//! use mesh_cells::topology::CellType;
//!
//! let tri = Cell::from_points(
//!     CellType::Triangle,
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//! )?;
//! let quality = cell_quality(&tri)?;
//! assert!(quality.jacobian_sign > 0.0);
//! assert!(quality.radius_ratio.unwrap() > 1.0);
//!
//! // Use the validator to error on inverted or degenerate elements.
//! validate_cell_geometry(&tri)?;
//! # Ok::<(), mesh_cells::mesh_error::MeshError>(())
//! ```

use crate::cell::Cell;
use crate::data::DataSet;
use crate::geometry::math::{cross, dot, norm, sub};
use crate::mesh_error::MeshError;
use crate::topology::CellType;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EPS: f64 = 1e-12;

/// Basic quality metrics for a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellQuality {
    /// Ratio of the longest edge length to the shortest edge length.
    pub aspect_ratio: f64,
    /// Minimum corner angle (degrees) across all faces.
    pub min_angle_deg: f64,
    /// Signed Jacobian (area for 2D, volume for 3D). Negative values indicate
    /// inverted orientation; zero indicates degenerate geometry.
    pub jacobian_sign: f64,
    /// Circumradius over inradius, scaled to 1 for the regular simplex.
    /// `None` for non-simplicial cells.
    pub radius_ratio: Option<f64>,
}

/// Scalar selected from [`CellQuality`] by [`mesh_quality`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityMeasure {
    /// [`CellQuality::radius_ratio`].
    RadiusRatio,
    /// [`CellQuality::aspect_ratio`].
    AspectRatio,
    /// [`CellQuality::min_angle_deg`].
    MinAngle,
    /// [`CellQuality::jacobian_sign`].
    Jacobian,
}

impl QualityMeasure {
    fn pick(self, q: &CellQuality) -> Option<f64> {
        match self {
            Self::RadiusRatio => q.radius_ratio,
            Self::AspectRatio => Some(q.aspect_ratio),
            Self::MinAngle => Some(q.min_angle_deg),
            Self::Jacobian => Some(q.jacobian_sign),
        }
    }
}

/// Per-cell values of one measure with summary statistics over the cells
/// where it is defined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Measure that was evaluated.
    pub measure: QualityMeasure,
    /// Value per cell id; `None` for deleted, unsupported or degenerate cells.
    pub values: Vec<Option<f64>>,
    /// Smallest value, `NaN` when no cell was measured.
    pub min: f64,
    /// Largest value, `NaN` when no cell was measured.
    pub max: f64,
    /// Mean value, `NaN` when no cell was measured.
    pub average: f64,
    /// Number of measured cells.
    pub count: usize,
}

/// Compute quality metrics for a cell.
///
/// Returns an error for unsupported cell types or degenerate geometry
/// (zero-length edges, collapsed simplices).
pub fn cell_quality(cell: &Cell) -> Result<CellQuality, MeshError> {
    let cell_type = cell.cell_type();
    if cell.dimension() < 2 || cell_type == CellType::TriangleStrip {
        return Err(MeshError::UnsupportedCellType(cell_type));
    }
    let aspect_ratio = aspect_ratio(cell)?;
    let min_angle_deg = min_angle(cell)?;
    let jacobian_sign = jacobian_sign(cell)?;
    let p = cell.points();
    let radius_ratio = match cell_type {
        CellType::Triangle => Some(triangle_radius_ratio(p[0], p[1], p[2])?),
        CellType::Tetra => Some(tet_radius_ratio(p[0], p[1], p[2], p[3])?),
        _ => None,
    };
    Ok(CellQuality {
        aspect_ratio,
        min_angle_deg,
        jacobian_sign,
        radius_ratio,
    })
}

/// Validate that a cell is not inverted or degenerate.
///
/// Returns the computed quality metrics on success.
pub fn validate_cell_geometry(cell: &Cell) -> Result<CellQuality, MeshError> {
    let quality = cell_quality(cell)?;
    if !quality.jacobian_sign.is_finite() || quality.jacobian_sign.abs() <= EPS {
        return Err(MeshError::InvalidGeometry(format!(
            "degenerate geometry: jacobian sign = {}",
            quality.jacobian_sign
        )));
    }
    if quality.jacobian_sign < 0.0 {
        return Err(MeshError::InvalidGeometry(format!(
            "inverted geometry: jacobian sign = {}",
            quality.jacobian_sign
        )));
    }
    if !quality.min_angle_deg.is_finite() || quality.min_angle_deg <= 0.0 {
        return Err(MeshError::InvalidGeometry(format!(
            "invalid geometry: min angle = {}",
            quality.min_angle_deg
        )));
    }
    Ok(quality)
}

/// Evaluate `measure` on every cell of `dataset`.
///
/// Cells the measure does not apply to are recorded as `None`; degenerate
/// cells are logged and skipped as well.
pub fn mesh_quality<D>(dataset: &D, measure: QualityMeasure) -> Result<QualityReport, MeshError>
where
    D: DataSet + ?Sized,
{
    let n = dataset.number_of_cells();
    let mut values = Vec::with_capacity(n);
    let (mut min, mut max, mut sum, mut count) = (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize);
    for id in 0..n {
        let cell = dataset.cell(id)?;
        let value = match cell_quality(&cell) {
            Ok(q) => measure.pick(&q),
            Err(MeshError::UnsupportedCellType(_)) => None,
            Err(e) => {
                log::warn!("cell {id} skipped by quality pass: {e}");
                None
            }
        };
        if let Some(v) = value {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
        values.push(value);
    }
    let (min, max, average) = if count == 0 {
        (f64::NAN, f64::NAN, f64::NAN)
    } else {
        (min, max, sum / count as f64)
    };
    Ok(QualityReport {
        measure,
        values,
        min,
        max,
        average,
        count,
    })
}

/// Circumradius over twice the inradius of a triangle.
pub fn triangle_radius_ratio(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Result<f64, MeshError> {
    let la = norm(sub(b, c));
    let lb = norm(sub(c, a));
    let lc = norm(sub(a, b));
    let area = 0.5 * norm(cross(sub(b, a), sub(c, a)));
    if area <= EPS {
        return Err(MeshError::DegenerateCell("triangle has zero area".into()));
    }
    let circumradius = la * lb * lc / (4.0 * area);
    let inradius = 2.0 * area / (la + lb + lc);
    Ok(circumradius / (2.0 * inradius))
}

/// Circumradius over three times the inradius of a tetrahedron.
pub fn tet_radius_ratio(
    p0: [f64; 3],
    p1: [f64; 3],
    p2: [f64; 3],
    p3: [f64; 3],
) -> Result<f64, MeshError> {
    let a = sub(p1, p0);
    let b = sub(p2, p0);
    let c = sub(p3, p0);
    let volume6 = dot(a, cross(b, c)).abs();
    if volume6 <= EPS {
        return Err(MeshError::DegenerateCell("tetrahedron has zero volume".into()));
    }
    let (a2, b2, c2) = (dot(a, a), dot(b, b), dot(c, c));
    let bc = cross(b, c);
    let ca = cross(c, a);
    let ab = cross(a, b);
    let num = [
        a2 * bc[0] + b2 * ca[0] + c2 * ab[0],
        a2 * bc[1] + b2 * ca[1] + c2 * ab[1],
        a2 * bc[2] + b2 * ca[2] + c2 * ab[2],
    ];
    let circumradius = norm(num) / (2.0 * volume6);
    let faces = [(p0, p1, p2), (p0, p1, p3), (p0, p2, p3), (p1, p2, p3)];
    let surface: f64 = faces
        .iter()
        .map(|&(x, y, z)| 0.5 * norm(cross(sub(y, x), sub(z, x))))
        .sum();
    let inradius = (volume6 / 2.0) / surface;
    Ok(circumradius / (3.0 * inradius))
}

fn aspect_ratio(cell: &Cell) -> Result<f64, MeshError> {
    let mut min_len = f64::INFINITY;
    let mut max_len = 0.0f64;
    for i in 0..cell.number_of_edges() {
        let Some(edge) = cell.edge(i) else { continue };
        let p = edge.points();
        let len = norm(sub(p[0], p[1]));
        if len <= EPS {
            return Err(MeshError::InvalidGeometry(
                "zero-length edge detected".into(),
            ));
        }
        min_len = min_len.min(len);
        max_len = max_len.max(len);
    }
    Ok(max_len / min_len)
}

fn min_angle(cell: &Cell) -> Result<f64, MeshError> {
    let loops: Vec<Vec<[f64; 3]>> = if cell.dimension() == 2 {
        vec![cell.points().to_vec()]
    } else {
        (0..cell.number_of_faces())
            .filter_map(|i| cell.face(i))
            .map(|f| f.points().to_vec())
            .collect()
    };
    let mut min_angle = f64::INFINITY;
    for face in &loops {
        let n = face.len();
        for i in 0..n {
            let prev = face[(i + n - 1) % n];
            let curr = face[i];
            let next = face[(i + 1) % n];
            let angle = angle_deg(sub(prev, curr), sub(next, curr))?;
            min_angle = min_angle.min(angle);
        }
    }
    Ok(min_angle)
}

fn jacobian_sign(cell: &Cell) -> Result<f64, MeshError> {
    if cell.dimension() == 2 {
        return Ok(shoelace_xy(cell.points()));
    }
    let volume = tet_volume_sum(cell)?;
    // Reference orientation differs between shapes; score against it.
    let reference = match cell.parametric_coords() {
        Some(pcoords) => {
            let unit = Cell::from_points(cell.cell_type(), pcoords.to_vec())?;
            tet_volume_sum(&unit)?.signum()
        }
        None => 1.0,
    };
    Ok(volume * reference)
}

fn tet_volume_sum(cell: &Cell) -> Result<f64, MeshError> {
    let tets = cell.triangulate(0)?;
    Ok(tets
        .points
        .chunks_exact(4)
        .map(|t| signed_volume(t[0], t[1], t[2], t[3]))
        .sum())
}

fn shoelace_xy(points: &[[f64; 3]]) -> f64 {
    let n = points.len();
    0.5 * (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum::<f64>()
}

fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    dot(sub(b, a), cross(sub(c, a), sub(d, a))) / 6.0
}

fn angle_deg(a: [f64; 3], b: [f64; 3]) -> Result<f64, MeshError> {
    let na = norm(a);
    let nb = norm(b);
    if na <= EPS || nb <= EPS {
        return Err(MeshError::InvalidGeometry(
            "zero-length edge detected".into(),
        ));
    }
    let cos = (dot(a, b) / (na * nb)).clamp(-1.0, 1.0);
    Ok(cos.acos() * 180.0 / PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Points, UnstructuredGrid};
    use approx::assert_relative_eq;

    fn regular_tet() -> Vec<[f64; 3]> {
        vec![
            [1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ]
    }

    fn unit_hex() -> Vec<[f64; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]
    }

    #[test]
    fn regular_tet_radius_ratio_is_one() {
        let p = regular_tet();
        let r = tet_radius_ratio(p[0], p[1], p[2], p[3]).unwrap();
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn equilateral_triangle_radius_ratio_is_one() {
        let h = 3f64.sqrt() / 2.0;
        let r = triangle_radius_ratio([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, h, 0.0]).unwrap();
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn right_triangle_metrics() {
        let tri = Cell::from_points(
            CellType::Triangle,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        let q = cell_quality(&tri).unwrap();
        assert_relative_eq!(q.jacobian_sign, 0.5, epsilon = 1e-12);
        assert_relative_eq!(q.min_angle_deg, 45.0, epsilon = 1e-9);
        assert_relative_eq!(q.aspect_ratio, 2f64.sqrt(), epsilon = 1e-12);
        assert!(q.radius_ratio.unwrap() > 1.0);
    }

    #[test]
    fn unit_hex_is_valid_and_positive() {
        let hex = Cell::from_points(CellType::Hexahedron, unit_hex()).unwrap();
        let q = validate_cell_geometry(&hex).unwrap();
        assert_relative_eq!(q.jacobian_sign, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.aspect_ratio, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.min_angle_deg, 90.0, epsilon = 1e-9);
        assert!(q.radius_ratio.is_none());
    }

    #[test]
    fn reversed_quad_is_inverted() {
        let quad = Cell::from_points(
            CellType::Quad,
            vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        )
        .unwrap();
        let err = validate_cell_geometry(&quad).unwrap_err();
        assert!(matches!(err, MeshError::InvalidGeometry(_)));
    }

    #[test]
    fn collapsed_edge_is_rejected() {
        let tri = Cell::from_points(
            CellType::Triangle,
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        assert!(cell_quality(&tri).is_err());
    }

    #[test]
    fn mesh_quality_skips_lines() {
        let mut grid = UnstructuredGrid::new();
        let mut pts = Points::new();
        for p in regular_tet() {
            pts.insert_next_point(p);
        }
        grid.set_points(pts);
        grid.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3]).unwrap();
        grid.insert_next_cell(CellType::Line, &[0, 1]).unwrap();
        grid.insert_next_cell(CellType::Triangle, &[0, 1, 2]).unwrap();

        let report = mesh_quality(&grid, QualityMeasure::RadiusRatio).unwrap();
        assert_eq!(report.count, 2);
        assert!(report.values[1].is_none());
        assert_relative_eq!(report.min, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.values[0].unwrap(), 1.0, epsilon = 1e-12);
    }
}

//! Linear tetrahedron.

use super::case_table::CaseTable;
use super::iso::Shape;
use super::{Cell, ContourContext, PositionEval, better};
use crate::geometry::math::{det3, sub};
use crate::mesh_error::EvalError;
use crate::topology::IdType;
use once_cell::sync::Lazy;

const PCOORDS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];
const EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
const FACES: [&[usize]; 4] = [&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &PCOORDS,
    center: [0.25, 0.25, 0.25],
    edges: &EDGES,
    faces: &FACES,
    functions,
    derivs,
    inside,
    clamp,
};

static CASES: Lazy<CaseTable> = Lazy::new(|| CaseTable::polyhedron(&EDGES, &FACES, &PCOORDS));

fn functions(p: [f64; 3], w: &mut [f64]) {
    w[0] = 1.0 - p[0] - p[1] - p[2];
    w[1] = p[0];
    w[2] = p[1];
    w[3] = p[2];
}

fn derivs(_: [f64; 3], d: &mut [f64]) {
    d[..4].copy_from_slice(&[-1.0, 1.0, 0.0, 0.0]);
    d[4..8].copy_from_slice(&[-1.0, 0.0, 1.0, 0.0]);
    d[8..12].copy_from_slice(&[-1.0, 0.0, 0.0, 1.0]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    p.iter().all(|&v| v >= -tol) && p[0] + p[1] + p[2] <= 1.0 + tol
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    let mut q = p.map(|v| v.max(0.0));
    let sum = q[0] + q[1] + q[2];
    if sum > 1.0 {
        q = q.map(|v| v / sum);
    }
    q
}

/// Direct solve of the affine map. Inside means every barycentric weight lies
/// in `[0, 1]`; outside, the closest point is found on the nearest face.
pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let p = cell.points();
    let (c1, c2, c3) = (sub(p[1], p[0]), sub(p[2], p[0]), sub(p[3], p[0]));
    let rhs = sub(x, p[0]);
    let det = det3(c1, c2, c3);
    if det == 0.0 || !det.is_finite() {
        return Err(EvalError::SingularJacobian { determinant: det });
    }
    let pcoords = [
        det3(rhs, c2, c3) / det,
        det3(c1, rhs, c3) / det,
        det3(c1, c2, rhs) / det,
    ];
    let mut weights = vec![0.0; 4];
    functions(pcoords, &mut weights);

    if weights.iter().all(|w| (0.0..=1.0).contains(w)) {
        return Ok(PositionEval {
            inside: true,
            closest_point: x,
            sub_id: 0,
            pcoords,
            dist2: 0.0,
            weights,
        });
    }

    let mut best: Option<PositionEval> = None;
    for i in 0..FACES.len() {
        if let Some(face) = cell.face(i) {
            if let Ok(eval) = face.evaluate_position(x) {
                best = better(best, eval);
            }
        }
    }
    let face = best.ok_or(EvalError::DegenerateCell)?;
    Ok(PositionEval {
        inside: false,
        closest_point: face.closest_point,
        sub_id: 0,
        pcoords,
        dist2: face.dist2,
        weights,
    })
}

/// The face opposite the vertex with the smallest barycentric weight.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let mut w = [0.0; 4];
    functions(pcoords, &mut w);
    let min = (0..4)
        .min_by(|&i, &j| w[i].total_cmp(&w[j]))
        .unwrap_or(0);
    // face k of FACES omits vertex OPPOSITE[k]
    let face = match min {
        0 => 1,
        1 => 2,
        2 => 0,
        _ => 3,
    };
    let ids = cell.point_ids();
    let inside = w.iter().all(|v| (0.0..=1.0).contains(v));
    (inside, FACES[face].iter().map(|&i| ids[i]).collect())
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    CASES.contour(cell, &EDGES, value, scalars, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::CellType;

    fn unit() -> Cell {
        Cell::from_points(CellType::Tetra, PCOORDS.to_vec()).unwrap()
    }

    #[test]
    fn outside_point_projects_onto_face() {
        let e = unit().evaluate_position([0.2, 0.2, -1.0]).unwrap();
        assert!(!e.inside);
        assert_eq!(e.closest_point, [0.2, 0.2, 0.0]);
        assert!((e.dist2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_face_choice() {
        let t = unit();
        // nearest to the slanted face opposite the origin
        let (inside, face) = t.cell_boundary(0, [0.3, 0.3, 0.3]);
        assert!(inside);
        assert_eq!(face, vec![1, 2, 3]);
        let (_, face) = t.cell_boundary(0, [0.05, 0.3, 0.3]);
        assert_eq!(face, vec![2, 0, 3]);
    }

    #[test]
    fn case_table_single_corner_is_triangle() {
        // only vertex 3 above
        let prims = CASES.primitives(0b1000);
        assert_eq!(prims.len(), 1);
        let mut edges = prims[0].clone();
        edges.sort_unstable();
        assert_eq!(edges, vec![3, 4, 5]);
        // two above, two below: a quad
        let prims = CASES.primitives(0b0011);
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].len(), 4);
    }
}

//! Pyramid: quadrilateral base `0-1-2-3`, apex `4`.
//!
//! The parametric domain is the unit cube collapsed onto the apex at `t = 1`.

use super::case_table::CaseTable;
use super::iso::Shape;
use super::{Cell, ContourContext};
use crate::topology::IdType;
use once_cell::sync::Lazy;

const PCOORDS: [[f64; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.5, 0.5, 1.0],
];
const EDGES: [[usize; 2]; 8] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [0, 4],
    [1, 4],
    [2, 4],
    [3, 4],
];
const FACES: [&[usize]; 5] = [&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]];

/// Positive-volume split along the base diagonal `0-2`.
pub(crate) const TETS: [[usize; 4]; 2] = [[0, 1, 2, 4], [0, 2, 3, 4]];

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &PCOORDS,
    center: [0.4, 0.4, 0.2],
    edges: &EDGES,
    faces: &FACES,
    functions,
    derivs,
    inside,
    clamp,
};

static CASES: Lazy<CaseTable> = Lazy::new(|| CaseTable::polyhedron(&EDGES, &FACES, &PCOORDS));

fn functions(p: [f64; 3], w: &mut [f64]) {
    let [r, s, t] = p;
    let (rm, sm, tm) = (1.0 - r, 1.0 - s, 1.0 - t);
    w[0] = rm * sm * tm;
    w[1] = r * sm * tm;
    w[2] = r * s * tm;
    w[3] = rm * s * tm;
    w[4] = t;
}

fn derivs(p: [f64; 3], d: &mut [f64]) {
    let [r, s, t] = p;
    let (rm, sm, tm) = (1.0 - r, 1.0 - s, 1.0 - t);
    d[..5].copy_from_slice(&[-sm * tm, sm * tm, s * tm, -s * tm, 0.0]);
    d[5..10].copy_from_slice(&[-rm * tm, -r * tm, r * tm, rm * tm, 0.0]);
    d[10..15].copy_from_slice(&[-rm * sm, -r * sm, -r * s, -rm * s, 1.0]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    p.iter().all(|&v| v >= -tol && v <= 1.0 + tol)
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    p.map(|v| v.clamp(0.0, 1.0))
}

/// Face with the smallest parametric distance: base (`t`), then the lateral
/// faces at `s = 0`, `r = 1`, `s = 1`, `r = 0`.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let [r, s, t] = pcoords;
    let dist = [t, s, 1.0 - r, 1.0 - s, r];
    let face = (0..5)
        .min_by(|&i, &j| dist[i].total_cmp(&dist[j]))
        .unwrap_or(0);
    let ids = cell.point_ids();
    (
        inside(pcoords, 0.0),
        FACES[face].iter().map(|&i| ids[i]).collect(),
    )
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    CASES.contour(cell, &EDGES, value, scalars, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::CellType;

    #[test]
    fn apex_case_is_one_quad() {
        let prims = CASES.primitives(0b10000);
        assert_eq!(prims.len(), 1);
        let mut e = prims[0].clone();
        e.sort_unstable();
        assert_eq!(e, vec![4, 5, 6, 7]);
    }

    #[test]
    fn weights_partition_unity() {
        let mut w = [0.0; 5];
        functions([0.3, 0.8, 0.45], &mut w);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn boundary_picks_lateral_face() {
        let cell = Cell::from_points(CellType::Pyramid, PCOORDS.to_vec()).unwrap();
        let (inside, face) = cell.cell_boundary(0, [0.9, 0.5, 0.3]);
        assert!(inside);
        assert_eq!(face, vec![1, 2, 4]);
    }
}

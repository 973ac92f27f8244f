//! Wedge (triangular prism): triangles `0-1-2` at `t = 0` and `3-4-5` at
//! `t = 1`.

use super::case_table::CaseTable;
use super::iso::Shape;
use super::{Cell, ContourContext, triangle};
use crate::topology::IdType;
use once_cell::sync::Lazy;

const PCOORDS: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];
const EDGES: [[usize; 2]; 9] = [
    [0, 1],
    [1, 2],
    [2, 0],
    [3, 4],
    [4, 5],
    [5, 3],
    [0, 3],
    [1, 4],
    [2, 5],
];
const FACES: [&[usize]; 5] = [
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];

pub(crate) const TETS: [[usize; 4]; 3] = [[0, 1, 2, 3], [1, 4, 2, 3], [2, 4, 5, 3]];

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &PCOORDS,
    center: [1.0 / 3.0, 1.0 / 3.0, 0.5],
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
    let u = 1.0 - r - s;
    let tm = 1.0 - t;
    w[0] = u * tm;
    w[1] = r * tm;
    w[2] = s * tm;
    w[3] = u * t;
    w[4] = r * t;
    w[5] = s * t;
}

fn derivs(p: [f64; 3], d: &mut [f64]) {
    let [r, s, t] = p;
    let u = 1.0 - r - s;
    let tm = 1.0 - t;
    d[..6].copy_from_slice(&[-tm, tm, 0.0, -t, t, 0.0]);
    d[6..12].copy_from_slice(&[-tm, 0.0, tm, -t, 0.0, t]);
    d[12..18].copy_from_slice(&[-u, -r, -s, u, r, s]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    let [r, s, t] = p;
    r >= -tol && s >= -tol && r + s <= 1.0 + tol && t >= -tol && t <= 1.0 + tol
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    let (r, s) = triangle::clamp_to_triangle(p[0], p[1]);
    [r, s, p[2].clamp(0.0, 1.0)]
}

/// Face with the smallest parametric distance.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let [r, s, t] = pcoords;
    let dist = [t, 1.0 - t, s, 1.0 - r - s, r];
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

    fn unit() -> Cell {
        Cell::from_points(CellType::Wedge, PCOORDS.to_vec()).unwrap()
    }

    #[test]
    fn position_round_trip() {
        let w = unit();
        let e = w.evaluate_position([0.2, 0.3, 0.7]).unwrap();
        assert!(e.inside);
        assert!((e.pcoords[0] - 0.2).abs() < 1e-3);
        assert!((e.pcoords[2] - 0.7).abs() < 1e-3);
    }

    #[test]
    fn boundary_on_slanted_face() {
        let (inside, face) = unit().cell_boundary(0, [0.5, 0.45, 0.5]);
        assert!(inside);
        assert_eq!(face, vec![1, 4, 5, 2]);
    }

    #[test]
    fn mid_height_cut_is_triangle() {
        // top triangle above
        let prims = CASES.primitives(0b111000);
        assert_eq!(prims.len(), 1);
        let mut e = prims[0].clone();
        e.sort_unstable();
        assert_eq!(e, vec![6, 7, 8]);
    }
}

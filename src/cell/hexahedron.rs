//! Trilinear hexahedron: bottom `0-1-2-3`, top `4-5-6-7`.

use super::case_table::CaseTable;
use super::iso::Shape;
use super::{Cell, ContourContext};
use crate::topology::IdType;
use once_cell::sync::Lazy;

const PCOORDS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];
const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [3, 2],
    [0, 3],
    [4, 5],
    [5, 6],
    [7, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [3, 7],
    [2, 6],
];
const FACES: [&[usize]; 6] = [
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];

/// Five-tet split with the central tet on `1-3-4-6`.
const TETS_EVEN: [[usize; 4]; 5] = [
    [0, 1, 3, 4],
    [1, 2, 3, 6],
    [1, 3, 4, 6],
    [1, 4, 5, 6],
    [3, 4, 6, 7],
];
/// Five-tet split with the central tet on `0-2-5-7`.
const TETS_ODD: [[usize; 4]; 5] = [
    [0, 1, 2, 5],
    [0, 2, 3, 7],
    [0, 5, 7, 4],
    [2, 7, 5, 6],
    [0, 2, 7, 5],
];

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &PCOORDS,
    center: [0.5, 0.5, 0.5],
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
    w[4] = rm * sm * t;
    w[5] = r * sm * t;
    w[6] = r * s * t;
    w[7] = rm * s * t;
}

fn derivs(p: [f64; 3], d: &mut [f64]) {
    let [r, s, t] = p;
    let (rm, sm, tm) = (1.0 - r, 1.0 - s, 1.0 - t);
    d[..8].copy_from_slice(&[
        -sm * tm,
        sm * tm,
        s * tm,
        -s * tm,
        -sm * t,
        sm * t,
        s * t,
        -s * t,
    ]);
    d[8..16].copy_from_slice(&[
        -rm * tm,
        -r * tm,
        r * tm,
        rm * tm,
        -rm * t,
        -r * t,
        r * t,
        rm * t,
    ]);
    d[16..24].copy_from_slice(&[
        -rm * sm,
        -r * sm,
        -r * s,
        -rm * s,
        rm * sm,
        r * sm,
        r * s,
        rm * s,
    ]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    p.iter().all(|&v| v >= -tol && v <= 1.0 + tol)
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    p.map(|v| v.clamp(0.0, 1.0))
}

/// Decomposition for `index`: the two splits alternate by parity so that
/// neighbouring hexahedra of a structured block agree on shared face
/// diagonals.
pub(crate) fn tets(index: usize) -> &'static [[usize; 4]] {
    if index % 2 == 0 { &TETS_EVEN } else { &TETS_ODD }
}

/// Face with the smallest parametric distance, in face-table order
/// `r = 0, r = 1, s = 0, s = 1, t = 0, t = 1`.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let [r, s, t] = pcoords;
    let dist = [r, 1.0 - r, s, 1.0 - s, t, 1.0 - t];
    let face = (0..6)
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

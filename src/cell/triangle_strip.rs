//! Strip of triangles sharing edges; triangle `j` is built on points
//! `j, j + 1, j + 2` with every other triangle flipped to keep a consistent
//! orientation.

use super::iso;
use super::{Cell, ContourContext, LineHit, PositionEval, better, gather_values, nearer, triangle};
use crate::mesh_error::EvalError;
use crate::topology::{CellType, IdType};

/// Local index triples of the strip's triangles.
pub(crate) fn sub_triangles(n: usize) -> Vec<[usize; 3]> {
    (0..n.saturating_sub(2)).map(local_triangle).collect()
}

fn local_triangle(j: usize) -> [usize; 3] {
    if j % 2 == 0 {
        [j, j + 1, j + 2]
    } else {
        [j + 1, j, j + 2]
    }
}

/// Boundary edge `i`: the first and last rungs, and the two rails in between.
pub(crate) fn edge_local(n: usize, i: usize) -> Option<[usize; 2]> {
    match i {
        _ if i >= n => None,
        0 => Some([0, 1]),
        _ if i == n - 1 => Some([n - 2, n - 1]),
        _ => Some([i - 1, i + 1]),
    }
}

fn sub(cell: &Cell, sub_id: usize) -> (usize, [usize; 3], Cell) {
    let j = sub_id.min(cell.number_of_points() - 3);
    let tri = local_triangle(j);
    (j, tri, cell.sub_cell(CellType::Triangle, &tri))
}

fn spread(n: usize, tri: [usize; 3], w: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; n];
    for (i, &l) in tri.iter().enumerate() {
        out[l] = w[i];
    }
    out
}

pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let n = cell.number_of_points();
    let mut best: Option<PositionEval> = None;
    for j in 0..n - 2 {
        let (_, _, tri) = sub(cell, j);
        let Ok(mut eval) = triangle::evaluate_position(&tri, x) else {
            continue;
        };
        eval.sub_id = j;
        best = better(best, eval);
    }
    let mut best = best.ok_or(EvalError::DegenerateCell)?;
    best.weights = spread(n, local_triangle(best.sub_id), &best.weights);
    Ok(best)
}

pub(crate) fn evaluate_location(cell: &Cell, sub_id: usize, pcoords: [f64; 3]) -> ([f64; 3], Vec<f64>) {
    let (_, local, tri) = sub(cell, sub_id);
    let (x, w) = tri.evaluate_location(0, pcoords);
    (x, spread(cell.number_of_points(), local, &w))
}

pub(crate) fn cell_boundary(cell: &Cell, sub_id: usize, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    triangle::cell_boundary(&sub(cell, sub_id).2, pcoords)
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    for local in sub_triangles(cell.number_of_points()) {
        let tri = cell.sub_cell(CellType::Triangle, &local);
        let s = local.map(|i| scalars[i]);
        triangle::contour(&tri, value, &s, ctx);
    }
}

pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let mut best = None;
    for j in 0..cell.number_of_points() - 2 {
        let (_, _, tri) = sub(cell, j);
        let hit = triangle::intersect_with_line(&tri, p1, p2, tol).map(|h| LineHit { sub_id: j, ..h });
        best = nearer(best, hit);
    }
    best
}

pub(crate) fn derivatives(
    cell: &Cell,
    sub_id: usize,
    pcoords: [f64; 3],
    values: &[f64],
    dim: usize,
) -> Result<Vec<f64>, EvalError> {
    let (_, local, tri) = sub(cell, sub_id);
    iso::derivatives_2d(&tri, &triangle::SHAPE, pcoords, &gather_values(values, dim, &local), dim)
}

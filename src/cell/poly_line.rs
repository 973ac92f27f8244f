//! Chain of segments; segment `i` joins points `i` and `i + 1`.

use super::{Cell, ContourContext, LineHit, PositionEval, better, gather_values, line, nearer};
use crate::mesh_error::EvalError;
use crate::topology::{CellType, IdType};

fn segment(cell: &Cell, i: usize) -> Cell {
    cell.sub_cell(CellType::Line, &[i, i + 1])
}

fn clamp_sub(cell: &Cell, sub_id: usize) -> usize {
    sub_id.min(cell.number_of_points() - 2)
}

pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let n = cell.number_of_points();
    let mut best: Option<PositionEval> = None;
    for i in 0..n - 1 {
        // zero-length segments cannot be closest in a useful sense
        let Ok(mut eval) = line::evaluate_position(&segment(cell, i), x) else {
            continue;
        };
        eval.sub_id = i;
        best = better(best, eval);
    }
    let mut best = best.ok_or(EvalError::DegenerateCell)?;
    let (w0, w1) = (best.weights[0], best.weights[1]);
    best.weights = vec![0.0; n];
    best.weights[best.sub_id] = w0;
    best.weights[best.sub_id + 1] = w1;
    Ok(best)
}

pub(crate) fn evaluate_location(cell: &Cell, sub_id: usize, pcoords: [f64; 3]) -> ([f64; 3], Vec<f64>) {
    let i = clamp_sub(cell, sub_id);
    let (x, w) = segment(cell, i).evaluate_location(0, pcoords);
    let mut weights = vec![0.0; cell.number_of_points()];
    weights[i] = w[0];
    weights[i + 1] = w[1];
    (x, weights)
}

pub(crate) fn cell_boundary(cell: &Cell, sub_id: usize, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    line::cell_boundary(&segment(cell, clamp_sub(cell, sub_id)), pcoords)
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    for i in 0..cell.number_of_points() - 1 {
        line::contour(&segment(cell, i), value, &scalars[i..i + 2], ctx);
    }
}

pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let mut best = None;
    for i in 0..cell.number_of_points() - 1 {
        let hit = line::intersect_with_line(&segment(cell, i), p1, p2, tol).map(|h| LineHit { sub_id: i, ..h });
        best = nearer(best, hit);
    }
    best
}

pub(crate) fn derivatives(cell: &Cell, sub_id: usize, values: &[f64], dim: usize) -> Result<Vec<f64>, EvalError> {
    let i = clamp_sub(cell, sub_id);
    line::derivatives(&segment(cell, i), &gather_values(values, dim, &[i, i + 1]), dim)
}

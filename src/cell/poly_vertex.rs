//! Unordered set of points; every point is a sub-cell.

use super::{Cell, ContourContext, LineHit, PositionEval, better, nearer, vertex};
use crate::mesh_error::EvalError;
use crate::topology::{CellType, IdType};

pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let n = cell.number_of_points();
    let mut best: Option<PositionEval> = None;
    for i in 0..n {
        let mut eval = vertex::evaluate_position(&cell.sub_cell(CellType::Vertex, &[i]), x)?;
        eval.sub_id = i;
        best = better(best, eval);
    }
    let mut best = best.ok_or(EvalError::EmptyCell)?;
    best.weights = vec![0.0; n];
    best.weights[best.sub_id] = 1.0;
    Ok(best)
}

pub(crate) fn evaluate_location(cell: &Cell, sub_id: usize) -> ([f64; 3], Vec<f64>) {
    let n = cell.number_of_points();
    let i = sub_id.min(n - 1);
    let mut w = vec![0.0; n];
    w[i] = 1.0;
    (cell.points()[i], w)
}

pub(crate) fn cell_boundary(cell: &Cell, sub_id: usize, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let i = sub_id.min(cell.number_of_points() - 1);
    (pcoords[0] == 0.0, vec![cell.point_ids()[i]])
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    for (i, &s) in scalars.iter().enumerate() {
        if s == value {
            let id = ctx.vertex_point(cell, i);
            ctx.emit_vertex(id);
        }
    }
}

pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let mut best = None;
    for i in 0..cell.number_of_points() {
        let sub = cell.sub_cell(CellType::Vertex, &[i]);
        let hit = vertex::intersect_with_line(&sub, p1, p2, tol).map(|h| LineHit { sub_id: i, ..h });
        best = nearer(best, hit);
    }
    best
}

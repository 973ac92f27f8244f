//! Straight segment.

use super::iso::Shape;
use super::{Cell, ContourContext, LineHit, PositionEval};
use crate::geometry::math::{distance2, dot, lerp, segment_segment_params, sub};
use crate::mesh_error::EvalError;
use crate::topology::IdType;

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
    center: [0.5, 0.0, 0.0],
    edges: &[],
    faces: &[],
    functions,
    derivs,
    inside,
    clamp,
};

fn functions(p: [f64; 3], w: &mut [f64]) {
    w[0] = 1.0 - p[0];
    w[1] = p[0];
}

fn derivs(_: [f64; 3], d: &mut [f64]) {
    d.fill(0.0);
    d[0] = -1.0;
    d[1] = 1.0;
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    p[0] >= -tol && p[0] <= 1.0 + tol
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    [p[0].clamp(0.0, 1.0), 0.0, 0.0]
}

/// Orthogonal projection onto the supporting line; outside the segment the
/// nearer end point is the closest point.
pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let [a, b] = [cell.points()[0], cell.points()[1]];
    let ab = sub(b, a);
    let len2 = dot(ab, ab);
    if len2 == 0.0 {
        return Err(EvalError::DegenerateCell);
    }
    let t = dot(sub(x, a), ab) / len2;
    let inside = (0.0..=1.0).contains(&t);
    let closest_point = if inside {
        lerp(a, b, t)
    } else if t < 0.0 {
        a
    } else {
        b
    };
    Ok(PositionEval {
        inside,
        closest_point,
        sub_id: 0,
        pcoords: [t, 0.0, 0.0],
        dist2: distance2(closest_point, x),
        weights: vec![1.0 - t, t],
    })
}

/// Nearest end point.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let r = pcoords[0];
    let end = if r >= 0.5 { 1 } else { 0 };
    ((0.0..=1.0).contains(&r), vec![cell.point_ids()[end]])
}

/// A crossing emits one vertex.
pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    if (scalars[0] >= value) != (scalars[1] >= value) {
        let id = ctx.edge_point(cell, 0, 1, value, scalars);
        ctx.emit_vertex(id);
    }
}

/// Closest approach of the two segments; a hit when within `tol`.
pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let [a, b] = [cell.points()[0], cell.points()[1]];
    let (u, v) = segment_segment_params(p1, p2, a, b);
    let on_query = lerp(p1, p2, u);
    let on_cell = lerp(a, b, v);
    (distance2(on_query, on_cell) <= tol * tol).then_some(LineHit {
        t: u,
        x: on_cell,
        pcoords: [v, 0.0, 0.0],
        sub_id: 0,
    })
}

/// Gradient along the segment direction.
pub(crate) fn derivatives(cell: &Cell, values: &[f64], dim: usize) -> Result<Vec<f64>, EvalError> {
    let dir = sub(cell.points()[1], cell.points()[0]);
    let len2 = dot(dir, dir);
    if len2 == 0.0 {
        return Err(EvalError::DegenerateCell);
    }
    let mut out = Vec::with_capacity(3 * dim);
    for k in 0..dim {
        let df = values[dim + k] - values[k];
        out.extend(dir.iter().map(|c| df * c / len2));
    }
    Ok(out)
}

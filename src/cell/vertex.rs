//! Single point.

use super::iso::Shape;
use super::{Cell, ContourContext, LineHit, PositionEval};
use crate::geometry::math::{closest_point_on_segment, distance2};
use crate::mesh_error::EvalError;
use crate::topology::IdType;

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &[[0.0, 0.0, 0.0]],
    center: [0.0, 0.0, 0.0],
    edges: &[],
    faces: &[],
    functions,
    derivs,
    inside,
    clamp,
};

fn functions(_: [f64; 3], w: &mut [f64]) {
    w[0] = 1.0;
}

fn derivs(_: [f64; 3], d: &mut [f64]) {
    d.fill(0.0);
}

fn inside(p: [f64; 3], _: f64) -> bool {
    p[0] == 0.0
}

fn clamp(_: [f64; 3]) -> [f64; 3] {
    [0.0; 3]
}

/// Inside only when `x` coincides with the point; pcoords are `-1` otherwise.
pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let p = cell.points()[0];
    let dist2 = distance2(p, x);
    let inside = dist2 == 0.0;
    Ok(PositionEval {
        inside,
        closest_point: p,
        sub_id: 0,
        pcoords: [if inside { 0.0 } else { -1.0 }, 0.0, 0.0],
        dist2,
        weights: vec![1.0],
    })
}

pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    (pcoords[0] == 0.0, vec![cell.point_ids()[0]])
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    if scalars[0] == value {
        let id = ctx.vertex_point(cell, 0);
        ctx.emit_vertex(id);
    }
}

/// Hit when the segment passes within `tol` of the point.
pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let p = cell.points()[0];
    let (q, t) = closest_point_on_segment(p, p1, p2);
    (distance2(q, p) <= tol * tol).then_some(LineHit {
        t,
        x: p,
        pcoords: [0.0; 3],
        sub_id: 0,
    })
}

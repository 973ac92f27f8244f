//! Planar n-gon.
//!
//! Parametric coordinates come from a rectangle spanned in the polygon's plane
//! over its extent; interpolation weights are inverse squared distances to the
//! points. Contouring and derivatives go through an ear-clipped
//! triangulation.

use super::iso;
use super::{Cell, ContourContext, LineHit, PositionEval, gather_values, triangle};
use crate::geometry::math::{
    EPS, add, closest_point_on_segment, distance2, dot, lerp, plane_frame, project_to_plane, scale,
    sub,
};
use crate::mesh_error::{EvalError, MeshError};
use crate::topology::{CellType, IdType};
use itertools::Itertools;

/// Parametric rectangle of a polygon.
struct Frame {
    origin: [f64; 3],
    p10: [f64; 3],
    p20: [f64; 3],
    normal: [f64; 3],
    e1: [f64; 3],
    e2: [f64; 3],
}

impl Frame {
    fn new(points: &[[f64; 3]]) -> Option<Self> {
        let (e1, e2, normal) = plane_frame(points)?;
        let p0 = points[0];
        let (mut smin, mut smax, mut tmin, mut tmax) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for p in points {
            let v = sub(*p, p0);
            let (s, t) = (dot(v, e1), dot(v, e2));
            smin = smin.min(s);
            smax = smax.max(s);
            tmin = tmin.min(t);
            tmax = tmax.max(t);
        }
        if smax - smin <= EPS || tmax - tmin <= EPS {
            return None;
        }
        Some(Self {
            origin: add(p0, add(scale(e1, smin), scale(e2, tmin))),
            p10: scale(e1, smax - smin),
            p20: scale(e2, tmax - tmin),
            normal,
            e1,
            e2,
        })
    }

    fn pcoords(&self, x: [f64; 3]) -> [f64; 3] {
        let v = sub(x, self.origin);
        [
            dot(v, self.p10) / dot(self.p10, self.p10),
            dot(v, self.p20) / dot(self.p20, self.p20),
            0.0,
        ]
    }

    fn location(&self, pcoords: [f64; 3]) -> [f64; 3] {
        add(
            self.origin,
            add(scale(self.p10, pcoords[0]), scale(self.p20, pcoords[1])),
        )
    }

    fn to_2d(&self, x: [f64; 3]) -> (f64, f64) {
        let v = sub(x, self.origin);
        (dot(v, self.e1), dot(v, self.e2))
    }

    /// Even-odd crossing test of the in-plane projection of `x`.
    fn contains(&self, points: &[[f64; 3]], x: [f64; 3]) -> bool {
        let (px, py) = self.to_2d(x);
        let mut inside = false;
        for (a, b) in points.iter().circular_tuple_windows() {
            let (ax, ay) = self.to_2d(*a);
            let (bx, by) = self.to_2d(*b);
            if (ay > py) != (by > py) {
                let xc = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < xc {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Inverse squared distance weights; a coincident point takes all the weight.
fn weights(points: &[[f64; 3]], x: [f64; 3]) -> Vec<f64> {
    let d2: Vec<f64> = points.iter().map(|p| distance2(*p, x)).collect();
    if let Some(hit) = d2.iter().position(|&d| d == 0.0) {
        let mut w = vec![0.0; points.len()];
        w[hit] = 1.0;
        return w;
    }
    let inv: Vec<f64> = d2.iter().map(|d| 1.0 / d).collect();
    let sum: f64 = inv.iter().sum();
    inv.into_iter().map(|w| w / sum).collect()
}

/// Closest boundary point to `x` and the index of its edge.
fn closest_on_boundary(points: &[[f64; 3]], x: [f64; 3]) -> ([f64; 3], usize) {
    points
        .iter()
        .circular_tuple_windows()
        .enumerate()
        .map(|(i, (a, b))| (closest_point_on_segment(x, *a, *b).0, i))
        .min_by(|(p, _), (q, _)| distance2(*p, x).total_cmp(&distance2(*q, x)))
        .unwrap_or((points[0], 0))
}

pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let pts = cell.points();
    let frame = Frame::new(pts).ok_or(EvalError::DegenerateCell)?;
    let xp = project_to_plane(x, pts[0], frame.normal);
    let inside = frame.contains(pts, xp);
    let closest_point = if inside {
        xp
    } else {
        closest_on_boundary(pts, x).0
    };
    Ok(PositionEval {
        inside,
        closest_point,
        sub_id: 0,
        pcoords: frame.pcoords(xp),
        dist2: distance2(closest_point, x),
        weights: weights(pts, xp),
    })
}

pub(crate) fn evaluate_location(cell: &Cell, pcoords: [f64; 3]) -> ([f64; 3], Vec<f64>) {
    let pts = cell.points();
    match Frame::new(pts) {
        Some(frame) => {
            let x = frame.location(pcoords);
            (x, weights(pts, x))
        }
        None => {
            log::warn!("polygon with {} points has no parametric frame", pts.len());
            (pts[0], weights(pts, pts[0]))
        }
    }
}

/// Nearest edge to the location of `pcoords`.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let pts = cell.points();
    let Some(frame) = Frame::new(pts) else {
        return (false, Vec::new());
    };
    let x = frame.location(pcoords);
    let (_, edge) = closest_on_boundary(pts, x);
    let ids = cell.point_ids();
    (
        frame.contains(pts, x),
        vec![ids[edge], ids[(edge + 1) % ids.len()]],
    )
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    let tris = match ear_clip(cell) {
        Ok(tris) => tris,
        Err(e) => {
            log::warn!("skipping polygon in contour: {e}");
            return;
        }
    };
    for tri in tris {
        let sub = cell.sub_cell(CellType::Triangle, &tri);
        let s: Vec<f64> = tri.iter().map(|&i| scalars[i]).collect();
        triangle::contour(&sub, value, &s, ctx);
    }
}

/// Plane crossing followed by an inside test; a boundary within `tol` of the
/// crossing also counts. Segments parallel to the plane never hit.
pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let pts = cell.points();
    let frame = Frame::new(pts)?;
    let d = sub(p2, p1);
    let denom = dot(frame.normal, d);
    if denom.abs() <= EPS * dot(d, d).sqrt() {
        return None;
    }
    let t = dot(frame.normal, sub(pts[0], p1)) / denom;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let x = lerp(p1, p2, t);
    let near_boundary = || distance2(closest_on_boundary(pts, x).0, x) <= tol * tol;
    (frame.contains(pts, x) || near_boundary()).then(|| LineHit {
        t,
        x,
        pcoords: frame.pcoords(x),
        sub_id: 0,
    })
}

/// Gradient of the triangle of the ear-clipped decomposition containing the
/// location of `pcoords`.
pub(crate) fn derivatives(
    cell: &Cell,
    pcoords: [f64; 3],
    values: &[f64],
    dim: usize,
) -> Result<Vec<f64>, EvalError> {
    let tris = ear_clip(cell).map_err(|_| EvalError::DegenerateCell)?;
    let (x, _) = evaluate_location(cell, pcoords);
    let mut best: Option<([usize; 3], PositionEval)> = None;
    for tri in tris {
        let sub = cell.sub_cell(CellType::Triangle, &tri);
        let Ok(eval) = triangle::evaluate_position(&sub, x) else {
            continue;
        };
        let keep = match &best {
            Some((_, b)) => (eval.inside && !b.inside) || (eval.inside == b.inside && eval.dist2 < b.dist2),
            None => true,
        };
        if keep {
            best = Some((tri, eval));
        }
    }
    let (tri, eval) = best.ok_or(EvalError::DegenerateCell)?;
    let sub = cell.sub_cell(CellType::Triangle, &tri);
    iso::derivatives_2d(
        &sub,
        &triangle::SHAPE,
        eval.pcoords,
        &gather_values(values, dim, &tri),
        dim,
    )
}

/// Ear-clipped triangulation in the polygon's plane, as local index triples.
pub(crate) fn ear_clip(cell: &Cell) -> Result<Vec<[usize; 3]>, MeshError> {
    let pts = cell.points();
    let frame = Frame::new(pts)
        .ok_or_else(|| MeshError::DegenerateCell("polygon has no supporting plane".into()))?;
    let flat: Vec<f64> = pts
        .iter()
        .flat_map(|p| {
            let (u, v) = frame.to_2d(*p);
            [u, v]
        })
        .collect();
    let indices = earcutr::earcut(&flat, &[], 2)
        .map_err(|e| MeshError::DegenerateCell(format!("ear clipping failed: {e:?}")))?;
    if indices.len() < 3 {
        return Err(MeshError::DegenerateCell(
            "ear clipping produced no triangles".into(),
        ));
    }
    Ok(indices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

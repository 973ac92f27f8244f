//! Linear triangle.

use super::case_table::CaseTable;
use super::iso::Shape;
use super::{Cell, ContourContext, LineHit, PositionEval, line, nearer};
use crate::geometry::math::{
    EPS, closest_point_on_segment, cross, distance2, dot, lerp, norm, project_to_plane, scale, sub,
};
use crate::mesh_error::EvalError;
use crate::topology::{CellType, IdType};
use once_cell::sync::Lazy;

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    center: [1.0 / 3.0, 1.0 / 3.0, 0.0],
    edges: &[[0, 1], [1, 2], [2, 0]],
    faces: &[],
    functions,
    derivs,
    inside,
    clamp,
};

static CASES: Lazy<CaseTable> = Lazy::new(|| CaseTable::polygon(3));

fn functions(p: [f64; 3], w: &mut [f64]) {
    w[0] = 1.0 - p[0] - p[1];
    w[1] = p[0];
    w[2] = p[1];
}

fn derivs(_: [f64; 3], d: &mut [f64]) {
    d.fill(0.0);
    d[..3].copy_from_slice(&[-1.0, 1.0, 0.0]);
    d[3..6].copy_from_slice(&[-1.0, 0.0, 1.0]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    p[0] >= -tol && p[1] >= -tol && p[0] + p[1] <= 1.0 + tol
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    let (r, s) = clamp_to_triangle(p[0], p[1]);
    [r, s, p[2]]
}

/// Nearest point of the unit parametric triangle.
pub(crate) fn clamp_to_triangle(r: f64, s: f64) -> (f64, f64) {
    let (mut r, mut s) = (r.max(0.0), s.max(0.0));
    if r + s > 1.0 {
        let r2 = ((r - s + 1.0) * 0.5).clamp(0.0, 1.0);
        r = r2;
        s = 1.0 - r2;
    }
    (r, s)
}

/// Barycentric solve in the triangle's plane. Inside means every weight lies
/// in `[0, 1]`; outside, the closest point lies on the nearest edge.
pub(crate) fn evaluate_position(cell: &Cell, x: [f64; 3]) -> Result<PositionEval, EvalError> {
    let [a, b, c] = [cell.points()[0], cell.points()[1], cell.points()[2]];
    let (ab, ac) = (sub(b, a), sub(c, a));
    let n = cross(ab, ac);
    let nn2 = dot(n, n);
    if nn2 <= EPS * EPS {
        return Err(EvalError::DegenerateCell);
    }
    let xp = project_to_plane(x, a, scale(n, 1.0 / nn2.sqrt()));
    let ap = sub(xp, a);
    let r = dot(cross(ap, ac), n) / nn2;
    let s = dot(cross(ab, ap), n) / nn2;
    let weights = vec![1.0 - r - s, r, s];
    let inside = weights.iter().all(|w| (0.0..=1.0).contains(w));

    let closest_point = if inside {
        xp
    } else {
        [(a, b), (b, c), (c, a)]
            .into_iter()
            .map(|(p, q)| closest_point_on_segment(x, p, q).0)
            .min_by(|p, q| distance2(*p, x).total_cmp(&distance2(*q, x)))
            .unwrap_or(xp)
    };
    Ok(PositionEval {
        inside,
        closest_point,
        sub_id: 0,
        pcoords: [r, s, 0.0],
        dist2: distance2(closest_point, x),
        weights,
    })
}

/// Nearest edge, split by the half-planes through the parametric centroid.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let [r, s, _] = pcoords;
    let t1 = r - s;
    let t2 = 0.5 * (1.0 - r) - s;
    let t3 = 2.0 * r + s - 1.0;
    let ids = cell.point_ids();
    let edge = if t1 >= 0.0 && t2 >= 0.0 {
        vec![ids[0], ids[1]]
    } else if t2 < 0.0 && t3 >= 0.0 {
        vec![ids[1], ids[2]]
    } else {
        vec![ids[2], ids[0]]
    };
    let inside = r >= 0.0 && s >= 0.0 && 1.0 - r - s >= 0.0;
    (inside, edge)
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    CASES.contour(cell, SHAPE.edges, value, scalars, ctx);
}

/// Plane crossing followed by an inside test; a segment lying in the plane is
/// tested against the edges. `tol` is an absolute distance.
pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let a = cell.points()[0];
    let n = cross(sub(cell.points()[1], a), sub(cell.points()[2], a));
    let nn = norm(n);
    if nn <= EPS {
        return None;
    }
    let n = scale(n, 1.0 / nn);
    let d = sub(p2, p1);
    let denom = dot(n, d);

    if denom.abs() > EPS * norm(d) {
        let t = dot(n, sub(a, p1)) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let x = lerp(p1, p2, t);
        let eval = evaluate_position(cell, x).ok()?;
        return (eval.inside || eval.dist2 <= tol * tol).then_some(LineHit {
            t,
            x,
            pcoords: eval.pcoords,
            sub_id: 0,
        });
    }

    // segment parallel to the plane
    if dot(n, sub(p1, a)).abs() > tol {
        return None;
    }
    if let Ok(eval) = evaluate_position(cell, p1) {
        if eval.inside {
            return Some(LineHit {
                t: 0.0,
                x: p1,
                pcoords: eval.pcoords,
                sub_id: 0,
            });
        }
    }
    let mut best = None;
    for [i, j] in SHAPE.edges {
        let edge = cell.sub_cell(CellType::Line, &[*i, *j]);
        best = nearer(best, line::intersect_with_line(&edge, p1, p2, tol));
    }
    let mut hit = best?;
    hit.pcoords = evaluate_position(cell, hit.x).map_or(SHAPE.center, |e| e.pcoords);
    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Cell {
        Cell::from_points(
            CellType::Triangle,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn position_above_plane() {
        let e = tri().evaluate_position([0.25, 0.25, 2.0]).unwrap();
        assert!(e.inside);
        assert_eq!(e.closest_point, [0.25, 0.25, 0.0]);
        assert!((e.dist2 - 4.0).abs() < 1e-12);
        assert!((e.pcoords[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn position_outside_snaps_to_edge() {
        let e = tri().evaluate_position([1.0, 1.0, 0.0]).unwrap();
        assert!(!e.inside);
        assert!(distance2(e.closest_point, [0.5, 0.5, 0.0]) < 1e-24);
        assert!((e.dist2 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn boundary_edges() {
        let t = tri();
        assert_eq!(t.cell_boundary(0, [0.5, 0.1, 0.0]), (true, vec![0, 1]));
        assert_eq!(t.cell_boundary(0, [0.45, 0.45, 0.0]), (true, vec![1, 2]));
        assert_eq!(t.cell_boundary(0, [0.05, 0.5, 0.0]), (true, vec![2, 0]));
        assert!(!t.cell_boundary(0, [0.8, 0.8, 0.0]).0);
    }

    #[test]
    fn line_through_interior() {
        let hit = tri()
            .intersect_with_line([0.2, 0.2, -1.0], [0.2, 0.2, 1.0], 1e-6)
            .unwrap();
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert!(tri().intersect_with_line([2.0, 2.0, -1.0], [2.0, 2.0, 1.0], 1e-6).is_none());
    }

    #[test]
    fn in_plane_segment_hits_edge() {
        let hit = tri()
            .intersect_with_line([-1.0, 0.5, 0.0], [1.0, 0.5, 0.0], 1e-9)
            .unwrap();
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!(distance2(hit.x, [0.0, 0.5, 0.0]) < 1e-18);
    }
}

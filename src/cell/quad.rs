//! Bilinear quadrilateral.

use super::case_table::CaseTable;
use super::iso::{self, Shape};
use super::{Cell, ContourContext, LineHit, PositionEval, SolverConfig, nearer, triangle};
use crate::geometry::math::{distance2, newell_normal, normalize, project_to_plane};
use crate::mesh_error::EvalError;
use crate::topology::{CellType, IdType};
use once_cell::sync::Lazy;

pub(crate) static SHAPE: Shape = Shape {
    pcoords: &[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ],
    center: [0.5, 0.5, 0.0],
    edges: &[[0, 1], [1, 2], [2, 3], [3, 0]],
    faces: &[],
    functions,
    derivs,
    inside,
    clamp,
};

static CASES: Lazy<CaseTable> = Lazy::new(|| CaseTable::polygon(4));

fn functions(p: [f64; 3], w: &mut [f64]) {
    let (r, s) = (p[0], p[1]);
    let (rm, sm) = (1.0 - r, 1.0 - s);
    w[0] = rm * sm;
    w[1] = r * sm;
    w[2] = r * s;
    w[3] = rm * s;
}

fn derivs(p: [f64; 3], d: &mut [f64]) {
    let (r, s) = (p[0], p[1]);
    let (rm, sm) = (1.0 - r, 1.0 - s);
    d.fill(0.0);
    d[..4].copy_from_slice(&[-sm, sm, s, -s]);
    d[4..8].copy_from_slice(&[-rm, -r, r, rm]);
}

fn inside(p: [f64; 3], tol: f64) -> bool {
    (0..2).all(|i| p[i] >= -tol && p[i] <= 1.0 + tol)
}

fn clamp(p: [f64; 3]) -> [f64; 3] {
    [p[0].clamp(0.0, 1.0), p[1].clamp(0.0, 1.0), 0.0]
}

/// Newton inversion in the plane of the quad, on the two coordinates the
/// normal is least aligned with.
pub(crate) fn evaluate_position(
    cell: &Cell,
    x: [f64; 3],
    config: &SolverConfig,
) -> Result<PositionEval, EvalError> {
    let pts = cell.points();
    let normal = normalize(newell_normal(pts)).ok_or(EvalError::DegenerateCell)?;
    let mut centroid = [0.0; 3];
    for p in pts {
        for k in 0..3 {
            centroid[k] += 0.25 * p[k];
        }
    }
    let xp = project_to_plane(x, centroid, normal);

    let drop = (0..3)
        .max_by(|&i, &j| normal[i].abs().total_cmp(&normal[j].abs()))
        .unwrap_or(2);
    let idx: [usize; 2] = match drop {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    };

    let mut w = [0.0; 4];
    let mut d = [0.0; 12];
    let mut params = [0.5, 0.5];
    let mut pc = params;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        functions([pc[0], pc[1], 0.0], &mut w);
        derivs([pc[0], pc[1], 0.0], &mut d);
        let mut fcol = [0.0; 2];
        let mut rcol = [0.0; 2];
        let mut scol = [0.0; 2];
        for i in 0..4 {
            for (k, &c) in idx.iter().enumerate() {
                fcol[k] += pts[i][c] * w[i];
                rcol[k] += pts[i][c] * d[i];
                scol[k] += pts[i][c] * d[4 + i];
            }
        }
        for (k, &c) in idx.iter().enumerate() {
            fcol[k] -= xp[c];
        }
        let det = rcol[0] * scol[1] - rcol[1] * scol[0];
        if det.abs() <= config.singular_determinant {
            return Err(EvalError::SingularJacobian { determinant: det });
        }
        pc = [
            params[0] - (fcol[0] * scol[1] - fcol[1] * scol[0]) / det,
            params[1] - (rcol[0] * fcol[1] - rcol[1] * fcol[0]) / det,
        ];
        if (pc[0] - params[0]).abs() < config.convergence && (pc[1] - params[1]).abs() < config.convergence {
            converged = true;
            break;
        }
        if pc.iter().any(|v| v.abs() > config.divergence || !v.is_finite()) {
            return Err(EvalError::Diverged);
        }
        params = pc;
    }
    if !converged {
        return Err(EvalError::NoConvergence {
            iterations: config.max_iterations,
        });
    }

    let pcoords = [pc[0], pc[1], 0.0];
    functions(pcoords, &mut w);
    let inside = inside(pcoords, config.inside_tolerance);
    let closest_point = if inside {
        xp
    } else {
        iso::location(&SHAPE, pts, clamp(pcoords)).0
    };
    Ok(PositionEval {
        inside,
        closest_point,
        sub_id: 0,
        pcoords,
        dist2: distance2(closest_point, x),
        weights: w.to_vec(),
    })
}

/// Nearest edge, split by the two parametric diagonals.
pub(crate) fn cell_boundary(cell: &Cell, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
    let [r, s, _] = pcoords;
    let t1 = r - s;
    let t2 = 1.0 - r - s;
    let ids = cell.point_ids();
    let edge = match (t1 >= 0.0, t2 >= 0.0) {
        (true, true) => [0, 1],
        (true, false) => [1, 2],
        (false, false) => [2, 3],
        (false, true) => [3, 0],
    };
    let inside = (0.0..=1.0).contains(&r) && (0.0..=1.0).contains(&s);
    (inside, vec![ids[edge[0]], ids[edge[1]]])
}

pub(crate) fn contour(cell: &Cell, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
    CASES.contour(cell, SHAPE.edges, value, scalars, ctx);
}

pub(crate) fn intersect_with_line(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let mut best = None;
    for tri in [[0, 1, 2], [0, 2, 3]] {
        let sub = cell.sub_cell(CellType::Triangle, &tri);
        best = nearer(best, triangle::intersect_with_line(&sub, p1, p2, tol));
    }
    let mut hit = best?;
    hit.sub_id = 0;
    hit.pcoords = evaluate_position(cell, hit.x, &SolverConfig::default())
        .map_or(SHAPE.center, |e| e.pcoords);
    Some(hit)
}

/// Two triangles split along the shorter diagonal; on a tie `index` parity
/// picks the diagonal.
pub(crate) fn split(cell: &Cell, index: usize) -> [[usize; 3]; 2] {
    let p = cell.points();
    let d02 = distance2(p[0], p[2]);
    let d13 = distance2(p[1], p[3]);
    if d02 < d13 || (d02 == d13 && index % 2 == 0) {
        [[0, 1, 2], [0, 2, 3]]
    } else {
        [[0, 1, 3], [1, 2, 3]]
    }
}

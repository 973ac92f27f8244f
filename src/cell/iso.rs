//! Machinery shared by the fixed-size (isoparametric) shapes: the shape
//! descriptor, the forward map, the Newton inversion, Jacobian-based
//! derivatives and face-wise line intersection.

use super::{Cell, LineHit, PositionEval, SolverConfig, nearer};
use crate::geometry::math::{det3, distance2, dot, invert3, mat_vec, plane_frame, sub};
use crate::mesh_error::EvalError;

/// Static description of a fixed-size shape.
pub(crate) struct Shape {
    /// Parametric coordinates of each point.
    pub pcoords: &'static [[f64; 3]],
    /// Starting point of the inversion.
    pub center: [f64; 3],
    pub edges: &'static [[usize; 2]],
    pub faces: &'static [&'static [usize]],
    /// Interpolation weights at a parametric point.
    pub functions: fn([f64; 3], &mut [f64]),
    /// Weight derivatives: all `d/dr`, then all `d/ds`, then all `d/dt`.
    pub derivs: fn([f64; 3], &mut [f64]),
    /// Whether a parametric point is in the domain, with slack.
    pub inside: fn([f64; 3], f64) -> bool,
    /// Nearest point of the parametric domain.
    pub clamp: fn([f64; 3]) -> [f64; 3],
}

/// Forward map: weighted sum of `points` at `pcoords`.
pub(crate) fn location(shape: &Shape, points: &[[f64; 3]], pcoords: [f64; 3]) -> ([f64; 3], Vec<f64>) {
    let mut w = vec![0.0; points.len()];
    (shape.functions)(pcoords, &mut w);
    let mut x = [0.0; 3];
    for (p, wi) in points.iter().zip(&w) {
        for k in 0..3 {
            x[k] += p[k] * wi;
        }
    }
    (x, w)
}

/// Rows `dx/dr`, `dx/ds`, `dx/dt`.
fn jacobian(points: &[[f64; 3]], derivs: &[f64]) -> [[f64; 3]; 3] {
    let n = points.len();
    let mut jac = [[0.0; 3]; 3];
    for (i, p) in points.iter().enumerate() {
        for (row, jrow) in jac.iter_mut().enumerate() {
            let d = derivs[row * n + i];
            for k in 0..3 {
                jrow[k] += p[k] * d;
            }
        }
    }
    jac
}

/// Newton inversion of a 3D shape.
///
/// Starts at the parametric center; each step solves the 3×3 Jacobian system
/// by Cramer's rule. A converged point outside the domain is reported with
/// `inside == false`, the location of the clamped parametric point as
/// `closest_point` and the unclamped solution as `pcoords`.
pub(crate) fn evaluate_position(
    cell: &Cell,
    shape: &Shape,
    x: [f64; 3],
    config: &SolverConfig,
) -> Result<PositionEval, EvalError> {
    let points = cell.points();
    let n = points.len();
    let mut weights = vec![0.0; n];
    let mut derivs = vec![0.0; 3 * n];
    let mut params = shape.center;
    let mut pcoords = params;
    let mut converged = false;

    for _ in 0..config.max_iterations {
        (shape.functions)(pcoords, &mut weights);
        (shape.derivs)(pcoords, &mut derivs);

        let mut fcol = [0.0; 3];
        for (p, w) in points.iter().zip(&weights) {
            for k in 0..3 {
                fcol[k] += p[k] * w;
            }
        }
        let fcol = sub(fcol, x);
        let [rcol, scol, tcol] = jacobian(points, &derivs);

        let d = det3(rcol, scol, tcol);
        if d.abs() <= config.singular_determinant {
            return Err(EvalError::SingularJacobian { determinant: d });
        }

        pcoords = [
            params[0] - det3(fcol, scol, tcol) / d,
            params[1] - det3(rcol, fcol, tcol) / d,
            params[2] - det3(rcol, scol, fcol) / d,
        ];

        if (0..3).all(|i| (pcoords[i] - params[i]).abs() < config.convergence) {
            converged = true;
            break;
        }
        if pcoords.iter().any(|v| v.abs() > config.divergence || !v.is_finite()) {
            return Err(EvalError::Diverged);
        }
        params = pcoords;
    }

    if !converged {
        return Err(EvalError::NoConvergence {
            iterations: config.max_iterations,
        });
    }

    (shape.functions)(pcoords, &mut weights);
    if (shape.inside)(pcoords, config.inside_tolerance) {
        return Ok(PositionEval {
            inside: true,
            closest_point: x,
            sub_id: 0,
            pcoords,
            dist2: 0.0,
            weights,
        });
    }
    let (closest, _) = location(shape, points, (shape.clamp)(pcoords));
    Ok(PositionEval {
        inside: false,
        closest_point: closest,
        sub_id: 0,
        pcoords,
        dist2: distance2(closest, x),
        weights,
    })
}

/// Physical gradients for a 3D shape: `J^-1` applied to the parametric
/// gradient of every component.
pub(crate) fn derivatives_3d(
    cell: &Cell,
    shape: &Shape,
    pcoords: [f64; 3],
    values: &[f64],
    dim: usize,
) -> Result<Vec<f64>, EvalError> {
    let points = cell.points();
    let n = points.len();
    let mut d = vec![0.0; 3 * n];
    (shape.derivs)(pcoords, &mut d);
    let jac = jacobian(points, &d);
    let (inv, _) = invert3(jac).ok_or(EvalError::SingularJacobian { determinant: 0.0 })?;

    let mut out = Vec::with_capacity(3 * dim);
    for k in 0..dim {
        let mut pgrad = [0.0; 3];
        for i in 0..n {
            let v = values[i * dim + k];
            for (j, g) in pgrad.iter_mut().enumerate() {
                *g += d[j * n + i] * v;
            }
        }
        out.extend_from_slice(&mat_vec(inv, pgrad));
    }
    Ok(out)
}

/// Physical gradients for a planar shape, computed in an in-plane frame and
/// mapped back to 3D.
pub(crate) fn derivatives_2d(
    cell: &Cell,
    shape: &Shape,
    pcoords: [f64; 3],
    values: &[f64],
    dim: usize,
) -> Result<Vec<f64>, EvalError> {
    let points = cell.points();
    let n = points.len();
    let (e1, e2, _) = plane_frame(points).ok_or(EvalError::DegenerateCell)?;
    let uv: Vec<(f64, f64)> = points
        .iter()
        .map(|p| {
            let v = sub(*p, points[0]);
            (dot(v, e1), dot(v, e2))
        })
        .collect();

    let mut d = vec![0.0; 3 * n];
    (shape.derivs)(pcoords, &mut d);
    let (mut j00, mut j01, mut j10, mut j11) = (0.0, 0.0, 0.0, 0.0);
    for (i, &(u, v)) in uv.iter().enumerate() {
        j00 += d[i] * u;
        j01 += d[i] * v;
        j10 += d[n + i] * u;
        j11 += d[n + i] * v;
    }
    let det = j00 * j11 - j01 * j10;
    if det == 0.0 || !det.is_finite() {
        return Err(EvalError::SingularJacobian { determinant: det });
    }

    let mut out = Vec::with_capacity(3 * dim);
    for k in 0..dim {
        let (mut sr, mut ss) = (0.0, 0.0);
        for i in 0..n {
            let f = values[i * dim + k];
            sr += d[i] * f;
            ss += d[n + i] * f;
        }
        let gu = (j11 * sr - j01 * ss) / det;
        let gv = (-j10 * sr + j00 * ss) / det;
        for c in 0..3 {
            out.push(gu * e1[c] + gv * e2[c]);
        }
    }
    Ok(out)
}

/// Intersect a 3D cell with a segment through its faces.
pub(crate) fn intersect_faces(cell: &Cell, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
    let mut best = None;
    for i in 0..cell.number_of_faces() {
        let Some(face) = cell.face(i) else { continue };
        best = nearer(best, face.intersect_with_line(p1, p2, tol));
    }
    let mut hit = best?;
    hit.sub_id = 0;
    hit.pcoords = match cell.evaluate_position(hit.x) {
        Ok(eval) => eval.pcoords,
        Err(_) => cell.parametric_center(),
    };
    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::CellType;

    #[test]
    fn linear_field_gradient_on_sheared_hex() {
        let pts = vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.5, 1.0, 0.0],
            [0.5, 1.0, 0.0],
            [0.0, 0.0, 3.0],
            [2.0, 0.0, 3.0],
            [2.5, 1.0, 3.0],
            [0.5, 1.0, 3.0],
        ];
        // f = x + 2y - z
        let values: Vec<f64> = pts.iter().map(|p| p[0] + 2.0 * p[1] - p[2]).collect();
        let hex = Cell::from_points(CellType::Hexahedron, pts).unwrap();
        let g = hex.derivatives(0, [0.3, 0.6, 0.2], &values, 1).unwrap();
        assert!((g[0] - 1.0).abs() < 1e-10);
        assert!((g[1] - 2.0).abs() < 1e-10);
        assert!((g[2] + 1.0).abs() < 1e-10);
    }

    #[test]
    fn flat_hex_is_singular() {
        let pts = vec![[0.0; 3]; 8];
        let hex = Cell::from_points(CellType::Hexahedron, pts).unwrap();
        assert!(matches!(
            hex.evaluate_position([0.5, 0.5, 0.5]),
            Err(EvalError::SingularJacobian { .. })
        ));
    }
}

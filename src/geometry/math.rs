//! Small fixed-size vector and matrix helpers on `[f64; 3]`.

pub(crate) const EPS: f64 = 1e-12;

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance2(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = sub(a, b);
    dot(d, d)
}

/// `a + t (b - a)`.
#[inline]
pub fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ]
}

/// Unit vector along `a`, or `None` when `a` is (numerically) zero.
pub fn normalize(a: [f64; 3]) -> Option<[f64; 3]> {
    let n = norm(a);
    (n > EPS).then(|| scale(a, 1.0 / n))
}

/// Determinant of the matrix with columns `c0, c1, c2`.
#[inline]
pub fn det3(c0: [f64; 3], c1: [f64; 3], c2: [f64; 3]) -> f64 {
    dot(c0, cross(c1, c2))
}

/// Inverse of a row-major 3×3 matrix, with its determinant.
pub fn invert3(m: [[f64; 3]; 3]) -> Option<([[f64; 3]; 3], f64)> {
    let det = det3(
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    );
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inv = 1.0 / det;
    Some((
        [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
            ],
        ],
        det,
    ))
}

/// Row-major matrix-vector product.
#[inline]
pub fn mat_vec(m: [[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [dot(m[0], v), dot(m[1], v), dot(m[2], v)]
}

/// Newell normal of a closed loop of points (unnormalized; its length is
/// twice the projected area).
pub fn newell_normal(points: &[[f64; 3]]) -> [f64; 3] {
    let n = points.len();
    let mut normal = [0.0; 3];
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal[0] += (a[1] - b[1]) * (a[2] + b[2]);
        normal[1] += (a[2] - b[2]) * (a[0] + b[0]);
        normal[2] += (a[0] - b[0]) * (a[1] + b[1]);
    }
    normal
}

/// Orthogonal projection of `x` onto the plane through `origin` with unit
/// normal `normal`.
#[inline]
pub fn project_to_plane(x: [f64; 3], origin: [f64; 3], normal: [f64; 3]) -> [f64; 3] {
    let d = dot(sub(x, origin), normal);
    sub(x, scale(normal, d))
}

/// Closest point to `x` on segment `a-b`, with its parameter in `[0, 1]`.
pub fn closest_point_on_segment(x: [f64; 3], a: [f64; 3], b: [f64; 3]) -> ([f64; 3], f64) {
    let ab = sub(b, a);
    let len2 = dot(ab, ab);
    if len2 <= 0.0 {
        return (a, 0.0);
    }
    let t = (dot(sub(x, a), ab) / len2).clamp(0.0, 1.0);
    (lerp(a, b, t), t)
}

/// Parameters `(u, v)` of the closest approach between lines `a1-a2` and
/// `b1-b2`, each clamped to `[0, 1]`.
pub fn segment_segment_params(
    a1: [f64; 3],
    a2: [f64; 3],
    b1: [f64; 3],
    b2: [f64; 3],
) -> (f64, f64) {
    let d1 = sub(a2, a1);
    let d2 = sub(b2, b1);
    let r = sub(a1, b1);
    let a = dot(d1, d1);
    let e = dot(d2, d2);
    let f = dot(d2, r);
    if a <= EPS && e <= EPS {
        return (0.0, 0.0);
    }
    if a <= EPS {
        return (0.0, (f / e).clamp(0.0, 1.0));
    }
    let c = dot(d1, r);
    if e <= EPS {
        return ((-c / a).clamp(0.0, 1.0), 0.0);
    }
    let b = dot(d1, d2);
    let denom = a * e - b * b;
    let mut u = if denom > EPS * a * e {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut v = (b * u + f) / e;
    if v < 0.0 {
        v = 0.0;
        u = (-c / a).clamp(0.0, 1.0);
    } else if v > 1.0 {
        v = 1.0;
        u = ((b - c) / a).clamp(0.0, 1.0);
    }
    (u, v)
}

/// Orthonormal in-plane frame `(e1, e2, n)` for a planar point set, with `e1`
/// along the first non-degenerate edge from `points[0]`.
pub fn plane_frame(points: &[[f64; 3]]) -> Option<([f64; 3], [f64; 3], [f64; 3])> {
    let n = normalize(newell_normal(points))?;
    let e1 = points[1..]
        .iter()
        .find_map(|p| normalize(sub(*p, points[0])))?;
    let e1 = normalize(sub(e1, scale(n, dot(e1, n))))?;
    let e2 = cross(n, e1);
    Some((e1, e2, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_round_trip() {
        let m = [[2.0, 0.0, 1.0], [1.0, 3.0, 0.0], [0.0, 1.0, 4.0]];
        let (inv, det) = invert3(m).unwrap();
        assert!((det - 25.0).abs() < 1e-12);
        let e = mat_vec(inv, mat_vec(m, [1.0, -2.0, 0.5]));
        assert!(distance2(e, [1.0, -2.0, 0.5]) < 1e-24);
    }

    #[test]
    fn singular_matrix() {
        assert!(invert3([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]).is_none());
    }

    #[test]
    fn segment_params_crossing() {
        let (u, v) = segment_segment_params(
            [-1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 3.0, 0.0],
        );
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.25).abs() < 1e-12);
    }

    #[test]
    fn newell_of_unit_square() {
        let n = newell_normal(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        assert_eq!(n, [0.0, 0.0, 2.0]);
    }
}

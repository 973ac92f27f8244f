//! Axis-aligned bounds and the slab ray/box test used to pre-filter precise
//! per-cell intersection.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Box containing nothing.
    pub const fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Box from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub const fn from_array(b: [f64; 6]) -> Self {
        Self {
            min: [b[0], b[2], b[4]],
            max: [b[1], b[3], b[5]],
        }
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub const fn to_array(&self) -> [f64; 6] {
        [
            self.min[0],
            self.max[0],
            self.min[1],
            self.max[1],
            self.min[2],
            self.max[2],
        ]
    }

    /// Smallest box containing all `points`.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64; 3]>,
    {
        let mut b = Self::empty();
        for p in points {
            b.add_point(*p);
        }
        b
    }

    /// Whether the box contains no point.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Grow the box to contain `p`.
    pub fn add_point(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Grow the box to contain `other`.
    pub fn add_bounds(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.add_point(other.min);
        self.add_point(other.max);
    }

    /// Box grown by `delta` on every side.
    pub fn inflated(&self, delta: f64) -> Self {
        Self {
            min: [self.min[0] - delta, self.min[1] - delta, self.min[2] - delta],
            max: [self.max[0] + delta, self.max[1] + delta, self.max[2] + delta],
        }
    }

    /// Whether `p` lies inside or on the box.
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// Center point.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    /// Squared length of the diagonal (0 for an empty box).
    pub fn length2(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (0..3)
            .map(|i| (self.max[i] - self.min[i]).powi(2))
            .sum()
    }
}

/// Where a segment enters a box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxHit {
    /// Entry point.
    pub coord: [f64; 3],
    /// Segment parameter of the entry point, in `[0, 1]`.
    pub t: f64,
}

#[derive(Clone, Copy, PartialEq)]
enum Quadrant {
    Left,
    Right,
    Middle,
}

/// Intersect the segment `origin + t * dir`, `t ∈ [0, 1]`, with `bounds`.
///
/// For each axis the candidate plane is the slab face facing the origin; the
/// largest entry parameter across axes selects the entry plane, and the entry
/// point is re-validated against the remaining slabs. An origin inside the
/// box hits at `t = 0`.
pub fn hit_bbox(bounds: &Bounds, origin: [f64; 3], dir: [f64; 3]) -> Option<BoxHit> {
    let mut inside = true;
    let mut quadrant = [Quadrant::Middle; 3];
    let mut candidate = [0.0f64; 3];

    for i in 0..3 {
        if origin[i] < bounds.min[i] {
            quadrant[i] = Quadrant::Left;
            candidate[i] = bounds.min[i];
            inside = false;
        } else if origin[i] > bounds.max[i] {
            quadrant[i] = Quadrant::Right;
            candidate[i] = bounds.max[i];
            inside = false;
        }
    }

    if inside {
        return Some(BoxHit { coord: origin, t: 0.0 });
    }

    let mut max_t = [-1.0f64; 3];
    for i in 0..3 {
        if quadrant[i] != Quadrant::Middle && dir[i] != 0.0 {
            max_t[i] = (candidate[i] - origin[i]) / dir[i];
        }
    }

    let mut which = 0;
    for i in 1..3 {
        if max_t[which] < max_t[i] {
            which = i;
        }
    }

    let t = max_t[which];
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let mut coord = [0.0f64; 3];
    for i in 0..3 {
        if which == i {
            coord[i] = candidate[i];
        } else {
            coord[i] = origin[i] + t * dir[i];
            if coord[i] < bounds.min[i] || coord[i] > bounds.max[i] {
                return None;
            }
        }
    }
    Some(BoxHit { coord, t })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_box_hit_and_miss() {
        let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let hit = hit_bbox(&b, [-1.0, 0.5, 0.5], [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(hit.t, 1.0);
        assert_eq!(hit.coord, [0.0, 0.5, 0.5]);
        assert!(hit_bbox(&b, [-1.0, 0.5, 0.5], [0.0, 1.0, 0.0]).is_none());
    }

    #[test]
    fn origin_inside() {
        let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let hit = hit_bbox(&b, [0.5, 0.5, 0.5], [3.0, 0.0, 0.0]).unwrap();
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn segment_too_short() {
        let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert!(hit_bbox(&b, [-2.0, 0.5, 0.5], [1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn entry_point_outside_other_slab() {
        let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert!(hit_bbox(&b, [-1.0, 5.0, 0.5], [2.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn bounds_accumulate() {
        let b = Bounds::from_points(&[[1.0, 2.0, 3.0], [-1.0, 0.0, 4.0]]);
        assert_eq!(b.to_array(), [-1.0, 1.0, 0.0, 2.0, 3.0, 4.0]);
        assert!((b.length2() - 9.0).abs() < 1e-12);
        assert!(Bounds::empty().is_empty());
    }
}

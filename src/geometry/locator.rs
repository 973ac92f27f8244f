//! Point de-duplication during contouring.
//!
//! Contour crossings computed independently by adjacent cells land on the
//! same coordinates; inserting them through a [`PointLocator`] merges them into
//! a single output point.

use crate::data::points::Points;
use crate::topology::IdType;
use hashbrown::HashMap;

/// Spatial structure that hands out output point ids.
pub trait PointLocator {
    /// Id of a previously inserted point with coordinates `x`, if any.
    fn is_inserted_point(&self, x: [f64; 3]) -> Option<IdType>;

    /// Insert `x` unconditionally and return its id.
    fn insert_next_point(&mut self, x: [f64; 3]) -> IdType;

    /// Insert `x` unless already present. Returns the id and whether the
    /// point was newly inserted.
    fn insert_unique_point(&mut self, x: [f64; 3]) -> (IdType, bool) {
        match self.is_inserted_point(x) {
            Some(id) => (id, false),
            None => (self.insert_next_point(x), true),
        }
    }

    /// Points inserted so far.
    fn points(&self) -> &Points;
}

/// Locator merging points with bit-identical coordinates.
#[derive(Clone, Debug, Default)]
pub struct MergePoints {
    points: Points,
    index: HashMap<[u64; 3], IdType>,
}

impl MergePoints {
    /// Empty locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty locator with room for `n` points.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Points::with_capacity(n),
            index: HashMap::with_capacity(n),
        }
    }

    /// Number of distinct points inserted.
    pub fn len(&self) -> usize {
        self.points.number_of_points()
    }

    /// Whether no point was inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Give up the inserted points.
    pub fn into_points(self) -> Points {
        self.points
    }

    fn key(x: [f64; 3]) -> [u64; 3] {
        // +0.0 so that -0.0 and 0.0 merge
        [
            (x[0] + 0.0).to_bits(),
            (x[1] + 0.0).to_bits(),
            (x[2] + 0.0).to_bits(),
        ]
    }
}

impl PointLocator for MergePoints {
    fn is_inserted_point(&self, x: [f64; 3]) -> Option<IdType> {
        self.index.get(&Self::key(x)).copied()
    }

    fn insert_next_point(&mut self, x: [f64; 3]) -> IdType {
        let id = self.points.insert_next_point(x);
        self.index.entry(Self::key(x)).or_insert(id);
        id
    }

    fn points(&self) -> &Points {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_identical_points() {
        let mut loc = MergePoints::new();
        let (a, new_a) = loc.insert_unique_point([0.5, 0.0, 1.0]);
        let (b, new_b) = loc.insert_unique_point([0.5, -0.0, 1.0]);
        let (c, new_c) = loc.insert_unique_point([0.5, 0.0, 1.0 + 1e-9]);
        assert!(new_a && !new_b && new_c);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(loc.len(), 2);
        assert_eq!(loc.is_inserted_point([0.5, 0.0, 1.0]), Some(a));
    }
}

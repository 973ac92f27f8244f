//! Point coordinate storage.
//!
//! Coordinates are stored as `[f64; 3]` triples indexed by point id. The
//! array grows by append and only shrinks through `reset`/`initialize`.

use crate::geometry::bounds::Bounds;
use crate::mesh_error::MeshError;
use crate::topology::IdType;
use serde::{Deserialize, Serialize};

/// Ordered 3D point coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Points {
    coords: Vec<[f64; 3]>,
}

impl Points {
    /// Empty point set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty point set with room for `n` points.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            coords: Vec::with_capacity(n),
        }
    }

    /// Reserve room for `n` points in total.
    pub fn allocate(&mut self, n: usize) {
        if n > self.coords.len() {
            self.coords.reserve_exact(n - self.coords.len());
        }
    }

    /// Append a point and return its id.
    pub fn insert_next_point(&mut self, x: [f64; 3]) -> IdType {
        self.coords.push(x);
        self.coords.len() - 1
    }

    /// Write point `id`, growing the array with origin points if needed.
    pub fn insert_point(&mut self, id: IdType, x: [f64; 3]) {
        if id >= self.coords.len() {
            self.coords.resize(id + 1, [0.0; 3]);
        }
        self.coords[id] = x;
    }

    /// Coordinates of point `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    #[inline]
    pub fn point(&self, id: IdType) -> [f64; 3] {
        self.coords[id]
    }

    /// Coordinates of point `id`, checked.
    pub fn try_point(&self, id: IdType) -> Result<[f64; 3], MeshError> {
        self.coords
            .get(id)
            .copied()
            .ok_or(MeshError::PointOutOfRange(id))
    }

    /// Overwrite an existing point.
    pub fn set_point(&mut self, id: IdType, x: [f64; 3]) -> Result<(), MeshError> {
        let slot = self
            .coords
            .get_mut(id)
            .ok_or(MeshError::PointOutOfRange(id))?;
        *slot = x;
        Ok(())
    }

    /// Number of points.
    #[inline]
    pub fn number_of_points(&self) -> usize {
        self.coords.len()
    }

    /// Whether there are no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// All coordinates.
    #[inline]
    pub fn as_slice(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// All coordinates as a flat `x0 y0 z0 x1 …` slice.
    pub fn as_flat(&self) -> &[f64] {
        bytemuck::cast_slice(&self.coords)
    }

    /// Bounding box of all points.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.coords)
    }

    /// Release unused capacity.
    pub fn squeeze(&mut self) {
        self.coords.shrink_to_fit();
    }

    /// Drop all points, keeping the allocation.
    pub fn reset(&mut self) {
        self.coords.clear();
    }

    /// Drop all points and release the allocation.
    pub fn initialize(&mut self) {
        self.coords = Vec::new();
    }
}

impl From<Vec<[f64; 3]>> for Points {
    fn from(coords: Vec<[f64; 3]>) -> Self {
        Self { coords }
    }
}

impl FromIterator<[f64; 3]> for Points {
    fn from_iter<I: IntoIterator<Item = [f64; 3]>>(iter: I) -> Self {
        Self {
            coords: iter.into_iter().collect(),
        }
    }
}

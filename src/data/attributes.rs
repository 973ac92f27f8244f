//! Point/cell attribute containers.
//!
//! Only the interpolation surface needed by the cell kernel is provided:
//! [`Attributes::interpolate_edge`] blends two source tuples into a new
//! record, [`Attributes::copy_data`] copies one. Arrays are matched by
//! position; [`Attributes::interpolate_allocate`] prepares an output
//! container with the same layout as a source.

use crate::mesh_error::MeshError;
use crate::topology::IdType;
use serde::{Deserialize, Serialize};

/// Named array of fixed-width `f64` tuples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    name: String,
    components: usize,
    values: Vec<f64>,
}

impl DataArray {
    /// Empty array with `components` values per tuple.
    pub fn new(name: impl Into<String>, components: usize) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            values: Vec::new(),
        }
    }

    /// Array adopting `values`; the length must be a multiple of `components`.
    pub fn from_values(
        name: impl Into<String>,
        components: usize,
        values: Vec<f64>,
    ) -> Result<Self, MeshError> {
        let components = components.max(1);
        if values.len() % components != 0 {
            return Err(MeshError::Attribute(format!(
                "{} values do not form {components}-component tuples",
                values.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            components,
            values,
        })
    }

    /// Array name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values per tuple.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of tuples.
    pub fn number_of_tuples(&self) -> usize {
        self.values.len() / self.components
    }

    /// Tuple `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn tuple(&self, id: IdType) -> &[f64] {
        &self.values[id * self.components..(id + 1) * self.components]
    }

    /// Component `c` of every tuple.
    pub fn component(&self, c: usize) -> impl Iterator<Item = f64> + '_ {
        self.values.chunks_exact(self.components).map(move |t| t[c])
    }

    /// Raw values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Write tuple `id`, growing the array with zeros if needed.
    pub fn insert_tuple(&mut self, id: IdType, tuple: &[f64]) {
        let start = id * self.components;
        if self.values.len() < start + self.components {
            self.values.resize(start + self.components, 0.0);
        }
        let n = tuple.len().min(self.components);
        self.values[start..start + n].copy_from_slice(&tuple[..n]);
    }

    /// Append a tuple and return its id.
    pub fn insert_next_tuple(&mut self, tuple: &[f64]) -> IdType {
        let id = self.number_of_tuples();
        self.insert_tuple(id, tuple);
        id
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

/// Ordered collection of attribute arrays over points or cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    arrays: Vec<DataArray>,
}

impl Attributes {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an array and return its index.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        self.arrays.push(array);
        self.arrays.len() - 1
    }

    /// Array by name.
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Array by index.
    pub fn array_at(&self, index: usize) -> Option<&DataArray> {
        self.arrays.get(index)
    }

    /// Number of arrays.
    pub fn number_of_arrays(&self) -> usize {
        self.arrays.len()
    }

    /// Whether there are no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Replace this collection's arrays with empty arrays shaped like `src`'s.
    pub fn interpolate_allocate(&mut self, src: &Attributes) {
        self.arrays = src
            .arrays
            .iter()
            .map(|a| DataArray::new(a.name.clone(), a.components))
            .collect();
    }

    /// Write record `dst_id` as the linear blend `(1 - t) * src[p1] + t * src[p2]`
    /// of every source array.
    pub fn interpolate_edge(
        &mut self,
        src: &Attributes,
        dst_id: IdType,
        p1: IdType,
        p2: IdType,
        t: f64,
    ) {
        for (out, input) in self.arrays.iter_mut().zip(&src.arrays) {
            let a = input.tuple(p1);
            let b = input.tuple(p2);
            let blended: Vec<f64> = a
                .iter()
                .zip(b)
                .map(|(x, y)| x + t * (y - x))
                .collect();
            out.insert_tuple(dst_id, &blended);
        }
    }

    /// Write record `dst_id` as the weighted sum of source records `ids`.
    pub fn interpolate_point(
        &mut self,
        src: &Attributes,
        dst_id: IdType,
        ids: &[IdType],
        weights: &[f64],
    ) {
        for (out, input) in self.arrays.iter_mut().zip(&src.arrays) {
            let mut acc = vec![0.0; input.components];
            for (&id, &w) in ids.iter().zip(weights) {
                for (a, v) in acc.iter_mut().zip(input.tuple(id)) {
                    *a += w * v;
                }
            }
            out.insert_tuple(dst_id, &acc);
        }
    }

    /// Copy record `src_id` of `src` into record `dst_id`.
    pub fn copy_data(&mut self, src: &Attributes, src_id: IdType, dst_id: IdType) {
        for (out, input) in self.arrays.iter_mut().zip(&src.arrays) {
            out.insert_tuple(dst_id, input.tuple(src_id));
        }
    }

    /// Number of complete records: the shortest array's tuple count (0 with
    /// no arrays).
    pub fn number_of_tuples(&self) -> usize {
        self.arrays
            .iter()
            .map(DataArray::number_of_tuples)
            .min()
            .unwrap_or(0)
    }

    /// Append `other`'s tuples to the arrays at the same positions.
    pub fn append(&mut self, other: &Attributes) {
        for (out, input) in self.arrays.iter_mut().zip(&other.arrays) {
            let n = input.components.min(out.components);
            for t in input.values.chunks_exact(input.components) {
                out.insert_next_tuple(&t[..n]);
            }
        }
    }

    /// Empty every array, keeping names and layouts.
    pub fn reset(&mut self) {
        for a in &mut self.arrays {
            a.reset();
        }
    }

    /// Drop all arrays.
    pub fn initialize(&mut self) {
        self.arrays.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_and_copy() {
        let mut src = Attributes::new();
        src.add_array(DataArray::from_values("s", 1, vec![0.0, 10.0, 20.0]).unwrap());
        src.add_array(DataArray::from_values("v", 2, vec![0.0, 0.0, 2.0, 4.0, 0.0, 0.0]).unwrap());

        let mut out = Attributes::new();
        out.interpolate_allocate(&src);
        out.interpolate_edge(&src, 0, 0, 1, 0.25);
        out.copy_data(&src, 2, 1);
        assert_eq!(out.array("s").unwrap().values(), &[2.5, 20.0]);
        assert_eq!(out.array("v").unwrap().tuple(0), &[0.5, 1.0]);

        out.interpolate_point(&src, 2, &[1, 2], &[0.5, 0.5]);
        assert_eq!(out.array("s").unwrap().tuple(2), &[15.0]);
    }

    #[test]
    fn append_concatenates_by_position() {
        let mut a = Attributes::new();
        a.add_array(DataArray::from_values("s", 1, vec![1.0]).unwrap());
        a.add_array(DataArray::from_values("v", 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        assert_eq!(a.number_of_tuples(), 1);

        let mut b = Attributes::new();
        b.interpolate_allocate(&a);
        b.append(&a);
        b.append(&a);
        assert_eq!(b.array("s").unwrap().values(), &[1.0, 1.0]);
        assert_eq!(b.array("v").unwrap().number_of_tuples(), 4);
        assert_eq!(b.number_of_tuples(), 2);
    }

    #[test]
    fn rejects_ragged_values() {
        assert!(DataArray::from_values("v", 3, vec![1.0, 2.0]).is_err());
    }
}

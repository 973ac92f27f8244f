//! Datasets and the collaborators they own: point coordinates and attribute
//! arrays.

pub mod attributes;
pub mod dataset;
pub mod points;
pub mod poly_data;
pub mod unstructured_grid;

pub use attributes::{Attributes, DataArray};
pub use dataset::DataSet;
pub use points::Points;
pub use poly_data::PolyData;
pub use unstructured_grid::UnstructuredGrid;

#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-cells
//!
//! mesh-cells is the connectivity and cell-geometry layer of a visualization
//! pipeline. It stores polygonal and unstructured meshes compactly, answers
//! point-to-cell topology queries, and evaluates every linear cell shape:
//! interpolation, inversion of the coordinate map, contouring, line
//! intersection, triangulation and derivatives.
//!
//! ## Features
//! - Flat `(count, ids…)` connectivity arrays with caller-owned traversal
//! - A cell-type registry and point→cell links, each built in one O(N) pass
//! - [`PolyData`](data::PolyData) and [`UnstructuredGrid`](data::UnstructuredGrid)
//!   datasets with consistency-checked editing
//! - Vertex, line, triangle, quad, polygon, strip, tetra, pyramid, wedge and
//!   hexahedron shapes behind one owned [`Cell`](cell::Cell) value
//! - Dataset contouring with merged output points and attribute transfer
//!
//! ## Invariant checks
//!
//! Bulk structures validate themselves after one-time builds in debug builds,
//! or in release builds with the `check-invariants` feature. See
//! [`DebugInvariants`].
//!
//! ## Usage
//! ```rust
//! use mesh_cells::prelude::*;
//!
//! let mut grid = UnstructuredGrid::new();
//! for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
//!     grid.insert_next_point(p);
//! }
//! grid.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3])?;
//! grid.build_links()?;
//! assert_eq!(grid.point_cells(3)?, &[0]);
//!
//! let tet = grid.cell(0)?;
//! assert!(tet.evaluate_position([0.1, 0.1, 0.1])?.inside);
//! # Ok::<(), mesh_cells::mesh_error::MeshError>(())
//! ```

pub mod algs;
pub mod cell;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::contour::contour_dataset;
    pub use crate::algs::probe::{find_cell, intersect_with_line};
    pub use crate::cell::{Cell, SolverConfig};
    pub use crate::data::{Attributes, DataArray, DataSet, Points, PolyData, UnstructuredGrid};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::bounds::{hit_bbox, Bounds};
    pub use crate::geometry::locator::{MergePoints, PointLocator};
    pub use crate::mesh_error::{EvalError, MeshError};
    pub use crate::topology::{CellArray, CellLinks, CellType, CellTypes, IdType};
}

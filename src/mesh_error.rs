//! MeshError: unified error type for mesh-cells public APIs
//!
//! Bulk structures (connectivity arrays, registry, links) report the few
//! conditions that can be detected cheaply; geometric evaluation failures are
//! reported through [`EvalError`], which keeps numerical failure modes apart
//! instead of folding them into a single "outside" answer.

use crate::topology::IdType;
use crate::topology::cell_type::CellType;
use thiserror::Error;

/// Unified error type for mesh-cells operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// The operation is not defined for this cell type.
    #[error("unsupported cell type {0:?} for this operation")]
    UnsupportedCellType(CellType),
    /// A raw `u8` tag did not name a known cell type.
    #[error("invalid cell type tag {0}")]
    InvalidCellTypeTag(u8),
    /// A fixed-size cell was given the wrong number of points.
    #[error("{cell_type:?} expects {expected} points, got {found}")]
    InvalidPointCount {
        cell_type: CellType,
        expected: usize,
        found: usize,
    },
    /// In-place replacement must keep the record length.
    #[error("cell size mismatch: record holds {expected} points, replacement has {found}")]
    CellSizeMismatch { expected: usize, found: usize },
    /// A cell id was past the end of the registry or connectivity.
    #[error("cell {0} is out of range")]
    CellOutOfRange(IdType),
    /// A point id was past the end of the coordinate array.
    #[error("point {0} is out of range")]
    PointOutOfRange(IdType),
    /// The cell has been deleted (tombstoned) in the registry.
    #[error("cell {0} has been deleted")]
    DeletedCell(IdType),
    /// The registry does not track a connectivity location for this cell.
    #[error("cell {0} has no connectivity location")]
    MissingLocation(IdType),
    /// Random-access topology requires `build_cells` first.
    #[error("cell-type registry has not been built (call build_cells)")]
    CellsNotBuilt,
    /// Point→cell queries require `build_links` first.
    #[error("point-to-cell links have not been built (call build_links)")]
    LinksNotBuilt,
    /// A flat connectivity buffer does not decode into the declared cells.
    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(String),
    /// A registry/links/connectivity consistency check failed.
    #[error("topology inconsistency: {0}")]
    InconsistentTopology(String),
    /// Geometry that cannot produce a meaningful answer.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Decomposition or evaluation hit a numerically degenerate cell.
    #[error("degenerate cell: {0}")]
    DegenerateCell(String),
    /// A named attribute array was missing or had a mismatched layout.
    #[error("attribute error: {0}")]
    Attribute(String),
    /// Wrapped evaluation failure.
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Failure kinds of the per-cell geometric solvers.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EvalError {
    /// The parametric Jacobian is singular at the current iterate.
    #[error("singular Jacobian (determinant {determinant:e})")]
    SingularJacobian { determinant: f64 },
    /// Newton iteration ran out of iterations before converging.
    #[error("Newton iteration did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
    /// Newton iterate left the divergence bound.
    #[error("Newton iteration diverged")]
    Diverged,
    /// The cell geometry is degenerate (zero length/area/volume).
    #[error("degenerate cell geometry")]
    DegenerateCell,
    /// The cell is the tombstone shape and has no geometry.
    #[error("cell has no geometry (empty cell)")]
    EmptyCell,
    /// A per-point value array does not cover every cell point.
    #[error("expected {expected} point values, got {found}")]
    ValueCount { expected: usize, found: usize },
}

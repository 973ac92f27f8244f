//! Structural self-checks for the topology containers and datasets.
//!
//! `CellArray`, `CellTypes`, `CellLinks`, `PolyData` and `UnstructuredGrid`
//! validate their layout after one-time builds (`build_cells`, `build_links`,
//! `set_cells`). The checks run in debug builds, or in release builds with the
//! `check-invariants` feature, and cost nothing otherwise.

use crate::mesh_error::MeshError;

/// Layout rules a mesh container can verify about itself.
pub trait DebugInvariants {
    /// Panic on the first violated rule when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Check every rule and report the first violation as a `MeshError`.
    fn validate_invariants(&self) -> Result<(), MeshError>;
}

/// Run a `Result`-returning check and panic with `ctx` on error, only when
/// invariant checking is compiled in.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[mesh-cells invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

//! Tunables of the parametric inversion.

use serde::{Deserialize, Serialize};

/// Newton iteration settings used by [`Cell::evaluate_position_with`].
///
/// [`Cell::evaluate_position_with`]: super::Cell::evaluate_position_with
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Largest parametric step still counted as converged.
    pub convergence: f64,
    /// Parametric magnitude past which the iteration is abandoned.
    pub divergence: f64,
    /// Jacobian determinants at or below this magnitude are singular.
    pub singular_determinant: f64,
    /// Slack on the parametric domain when classifying inside/outside.
    pub inside_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            convergence: 1e-3,
            divergence: 1e6,
            singular_determinant: 1e-20,
            inside_tolerance: 1e-3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SolverConfig = serde_json::from_str(r#"{ "max_iterations": 25 }"#).unwrap();
        assert_eq!(cfg.max_iterations, 25);
        assert_eq!(cfg.convergence, 1e-3);
    }
}

//! Error types for peprust.

use thiserror::Error;

use crate::solver::SolveStatus;

/// Error type for peprust operations.
#[derive(Debug, Error)]
pub enum PepError {
    /// The problem is structurally invalid (e.g. no performance metric).
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// The solver proved the compiled SDP infeasible.
    #[error("Problem is infeasible")]
    Infeasible,

    /// The solver proved the compiled SDP unbounded.
    #[error("Problem is unbounded")]
    Unbounded,

    /// The solver stopped without reaching optimality.
    #[error("Solver error: {status:?}")]
    SolverError {
        /// Status reported by the backend, surfaced verbatim.
        status: SolveStatus,
    },

    /// The solver encountered numerical difficulties.
    #[error("Numerical error: {0}")]
    NumericalError(String),
}

/// Result type for peprust operations.
pub type Result<T> = std::result::Result<T, PepError>;

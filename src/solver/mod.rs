//! Solver interface for peprust.
//!
//! This module provides:
//! - Matrix stuffing to convert the registered constraints to conic form
//! - The [`ConicBackend`] trait isolating the external solver
//! - Clarabel backend implementation

pub mod clarabel;
pub mod stuffing;

pub use self::clarabel::ClarabelBackend;
pub use stuffing::{stuff_pep, ConeDims, SlotMap, StuffedSdp};

/// Solution status from the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Maximum iterations or time limit reached.
    MaxIterations,
    /// Numerical difficulties.
    NumericalError,
    /// Unknown status.
    Unknown,
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Verbosity level: 0 silent, 1 compilation summary, 2 also solver
    /// output.
    pub verbose: u32,
    /// Maximum iterations.
    pub max_iter: u32,
    /// Time limit in seconds.
    pub time_limit: f64,
    /// Absolute tolerance.
    pub tol_gap_abs: f64,
    /// Relative tolerance.
    pub tol_gap_rel: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            verbose: 0,
            max_iter: 200,
            time_limit: f64::INFINITY,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
        }
    }
}

/// Raw solution returned by a conic backend.
#[derive(Debug, Clone)]
pub struct BackendSolution {
    /// Solution status.
    pub status: SolveStatus,
    /// Primal decision vector (empty unless solved).
    pub x: Vec<f64>,
    /// Dual vector over the constraint rows (empty unless solved).
    pub z: Vec<f64>,
    /// Solve time in seconds.
    pub solve_time: f64,
    /// Number of iterations.
    pub iterations: u32,
}

/// A conic solver capable of handling the compiled SDPs.
///
/// Backends receive the stuffed problem
/// `minimize q'x subject to Ax + s = b, s in K`
/// where `K` stacks a zero cone, a nonnegative cone and one PSD triangle
/// cone, in that row order. Any solver supporting that cone list can stand
/// in for the built-in [`ClarabelBackend`].
pub trait ConicBackend {
    /// Solve the stuffed problem.
    fn solve(&self, sdp: &StuffedSdp, settings: &Settings) -> BackendSolution;
}

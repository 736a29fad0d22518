//! Clarabel solver integration.
//!
//! The built-in [`ConicBackend`] implementation over the Clarabel interior
//! point solver.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};

use super::stuffing::{ConeDims, StuffedSdp};
use super::{BackendSolution, ConicBackend, Settings, SolveStatus};

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved => SolveStatus::Optimal,
            SolverStatus::AlmostSolved => SolveStatus::Optimal,
            SolverStatus::PrimalInfeasible => SolveStatus::Infeasible,
            SolverStatus::AlmostPrimalInfeasible => SolveStatus::Infeasible,
            SolverStatus::DualInfeasible => SolveStatus::Unbounded,
            SolverStatus::AlmostDualInfeasible => SolveStatus::Unbounded,
            SolverStatus::MaxIterations => SolveStatus::MaxIterations,
            SolverStatus::MaxTime => SolveStatus::MaxIterations,
            SolverStatus::NumericalError => SolveStatus::NumericalError,
            SolverStatus::InsufficientProgress => SolveStatus::NumericalError,
            _ => SolveStatus::Unknown,
        }
    }
}

/// The Clarabel backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelBackend;

impl ConicBackend for ClarabelBackend {
    fn solve(&self, sdp: &StuffedSdp, settings: &Settings) -> BackendSolution {
        let n = sdp.a.ncols();
        let p = ClarabelCsc::zeros((n, n));
        let a = to_clarabel_csc(&sdp.a);
        let cones = to_clarabel_cones(&sdp.cone_dims);

        let clarabel_settings = DefaultSettingsBuilder::default()
            .verbose(settings.verbose >= 2)
            .max_iter(settings.max_iter)
            .time_limit(settings.time_limit)
            .tol_gap_abs(settings.tol_gap_abs)
            .tol_gap_rel(settings.tol_gap_rel)
            .build()
            .unwrap();

        let mut solver = DefaultSolver::new(&p, &sdp.q, &a, &sdp.b, &cones, clarabel_settings);
        solver.solve();

        let status: SolveStatus = solver.solution.status.into();
        let solved = status == SolveStatus::Optimal;

        BackendSolution {
            status,
            x: if solved {
                solver.solution.x.clone()
            } else {
                Vec::new()
            },
            z: if solved {
                solver.solution.z.clone()
            } else {
                Vec::new()
            },
            solve_time: solver.solution.solve_time,
            iterations: solver.info.iterations,
        }
    }
}

/// Convert nalgebra CSC to Clarabel CSC.
fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

/// Convert cone dimensions to Clarabel cones.
fn to_clarabel_cones(dims: &ConeDims) -> Vec<SupportedConeT<f64>> {
    let mut cones = Vec::new();

    if dims.zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(dims.zero));
    }

    if dims.nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(dims.nonneg));
    }

    if dims.psd_side > 0 {
        cones.push(SupportedConeT::PSDTriangleConeT(dims.psd_side));
    }

    cones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.verbose, 0);
        assert_eq!(settings.max_iter, 200);
    }

    #[test]
    fn test_to_clarabel_cones() {
        let dims = ConeDims {
            zero: 2,
            nonneg: 3,
            psd_side: 4,
        };
        let cones = to_clarabel_cones(&dims);
        assert_eq!(cones.len(), 3);
        assert!(matches!(cones[2], SupportedConeT::PSDTriangleConeT(4)));
    }

    #[test]
    fn test_empty_cones_are_skipped() {
        let dims = ConeDims {
            zero: 0,
            nonneg: 1,
            psd_side: 2,
        };
        assert_eq!(to_clarabel_cones(&dims).len(), 2);
    }
}

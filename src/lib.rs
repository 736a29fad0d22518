//! # peprust
//!
//! A Rust implementation of Performance Estimation Problems (PEPs).
//!
//! peprust computes *worst-case* guarantees of first-order optimization
//! methods over entire function classes (smooth, convex, strongly convex,
//! Lipschitz, ...). The algorithm is described symbolically: iterates,
//! gradients and function values are abstract linear combinations of unknown
//! basis elements. The worst-case question is compiled into a
//! semidefinite program whose decision variables are the Gram matrix of all
//! basis vectors and the vector of function values. The SDP is handed to a
//! conic solver (Clarabel) and the dual values of the interpolation
//! constraints form a machine-checked proof of the bound.
//!
//! ## Quick start
//!
//! ```ignore
//! use peprust::prelude::*;
//!
//! let mut problem = Pep::new();
//!
//! // A mu-strongly convex, L-smooth function and its minimizer.
//! let func = problem.declare_function(SmoothStronglyConvexFunction::new(0.1, 1.0));
//! let xs = func.stationary_point();
//!
//! // One step of gradient descent with step size 1/L.
//! let x0 = problem.set_initial_point();
//! let x1 = &x0 - &(1.0 * func.gradient(&x0));
//!
//! problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));
//! problem.set_performance_metric((&x1 - &xs).squared_norm());
//!
//! let solution = problem.solve(&Settings::default())?;
//! println!("worst case ||x1 - x*||^2 = {}", solution.objective_value);
//! ```
//!
//! ## Architecture
//!
//! - **Symbolic algebra**: `Point` and `Expression` hold flat decompositions
//!   over leaf basis ids; arithmetic merges coefficient maps and never
//!   evaluates anything numerically.
//! - **Function classes** implement the [`FunctionClass`] trait, generating
//!   the interpolation constraints that characterize class membership over
//!   every pair of recorded oracle triples (quadratic in the number of
//!   oracle calls, the dominant cost driver of the compiled SDP).
//! - **Compilation** linearizes every expression into a functional over the
//!   packed Gram matrix and the scalar slots, then stuffs a single SDP.
//! - **Solver boundary**: the [`solver::ConicBackend`] trait; Clarabel is the
//!   built-in backend, any conic solver with PSD-cone support substitutes.

pub mod constraints;
pub mod error;
pub mod expr;
pub mod functions;
pub mod operators;
pub mod partition;
pub mod pep;
pub mod solver;
pub mod sparse;
pub mod steps;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use peprust::prelude::*;
/// ```
pub mod prelude {
    // Symbolic algebra
    pub use crate::expr::{Expression, Point};

    // Constraints
    pub use crate::constraints::{Constraint, ConstraintExt, ConstraintKind};

    // Function classes and operators
    pub use crate::functions::{
        ConvexFunction, ConvexIndicatorFunction, Function, FunctionClass, OracleTriple,
        SmoothConvexFunction, SmoothStronglyConvexFunction, StronglyConvexFunction,
    };
    pub use crate::operators::LipschitzOperator;

    // Primitive algorithmic steps
    pub use crate::steps::{bregman_gradient_step, proximal_step};

    // Coordinate partitions
    pub use crate::partition::BlockPartition;

    // Problem
    pub use crate::pep::{Pep, PepSolution};

    // Solver
    pub use crate::solver::{ConicBackend, Settings, SolveStatus};

    // Errors
    pub use crate::error::{PepError, Result};
}

// Re-export main types at crate root
pub use error::{PepError, Result};
pub use functions::{Function, FunctionClass};
pub use pep::{Pep, PepSolution};
pub use solver::{Settings, SolveStatus};

//! Smooth convex functions.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of convex functions with `L`-Lipschitz gradient.
#[derive(Debug, Clone, Copy)]
pub struct SmoothConvexFunction {
    l: f64,
}

impl SmoothConvexFunction {
    /// An `L`-smooth convex function.
    ///
    /// # Panics
    ///
    /// Panics if `l` is not finite and strictly positive.
    pub fn new(l: f64) -> Self {
        assert!(
            l.is_finite() && l > 0.0,
            "smoothness constant L must be finite and positive, got {l}"
        );
        SmoothConvexFunction { l }
    }

    /// The smoothness constant.
    pub fn smoothness(&self) -> f64 {
        self.l
    }
}

impl FunctionClass for SmoothConvexFunction {
    fn name(&self) -> &'static str {
        "smooth convex"
    }

    fn reuse_gradient(&self) -> bool {
        true
    }

    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (i, ti) in triples.iter().enumerate() {
            for (j, tj) in triples.iter().enumerate() {
                if i == j {
                    continue;
                }
                // f_i - f_j >= <g_j, x_i - x_j> + 1/(2L) ||g_i - g_j||^2
                let rhs = &tj.gradient.dot(&(&ti.point - &tj.point))
                    + &((&ti.gradient - &tj.gradient).squared_norm() / (2.0 * self.l));
                constraints.push((&ti.value - &tj.value).geq(rhs));
            }
        }
        constraints
    }
}

//! Strongly convex (possibly nonsmooth) functions.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of closed `mu`-strongly convex functions, queried through a
/// subgradient oracle.
#[derive(Debug, Clone, Copy)]
pub struct StronglyConvexFunction {
    mu: f64,
}

impl StronglyConvexFunction {
    /// A `mu`-strongly convex function.
    ///
    /// # Panics
    ///
    /// Panics if `mu` is not finite and strictly positive.
    pub fn new(mu: f64) -> Self {
        assert!(
            mu.is_finite() && mu > 0.0,
            "strong convexity constant mu must be finite and positive, got {mu}"
        );
        StronglyConvexFunction { mu }
    }

    /// The strong convexity constant.
    pub fn strong_convexity(&self) -> f64 {
        self.mu
    }
}

impl FunctionClass for StronglyConvexFunction {
    fn name(&self) -> &'static str {
        "strongly convex"
    }

    fn reuse_gradient(&self) -> bool {
        false
    }

    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (i, ti) in triples.iter().enumerate() {
            for (j, tj) in triples.iter().enumerate() {
                if i == j {
                    continue;
                }
                // f_i - f_j >= <g_j, x_i - x_j> + mu/2 ||x_i - x_j||^2
                let difference = &ti.point - &tj.point;
                let rhs =
                    &tj.gradient.dot(&difference) + &(difference.squared_norm() * (self.mu / 2.0));
                constraints.push((&ti.value - &tj.value).geq(rhs));
            }
        }
        constraints
    }
}

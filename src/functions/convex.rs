//! Closed convex proper functions.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of closed convex proper functions.
///
/// By default the oracle returns subgradients: repeated queries at the same
/// point may record distinct subgradients (the value stays unique). Use
/// [`ConvexFunction::differentiable`] for the single-valued variant.
#[derive(Debug, Clone, Copy)]
pub struct ConvexFunction {
    reuse_gradient: bool,
}

impl ConvexFunction {
    /// A convex function queried through a subgradient oracle.
    pub fn new() -> Self {
        ConvexFunction {
            reuse_gradient: false,
        }
    }

    /// A differentiable convex function (one gradient per point).
    pub fn differentiable() -> Self {
        ConvexFunction {
            reuse_gradient: true,
        }
    }
}

impl Default for ConvexFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionClass for ConvexFunction {
    fn name(&self) -> &'static str {
        "convex"
    }

    fn reuse_gradient(&self) -> bool {
        self.reuse_gradient
    }

    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (i, ti) in triples.iter().enumerate() {
            for (j, tj) in triples.iter().enumerate() {
                if i == j {
                    continue;
                }
                // f_i - f_j >= <g_j, x_i - x_j>
                let linearization = tj.gradient.dot(&(&ti.point - &tj.point));
                constraints.push((&ti.value - &tj.value).geq(linearization));
            }
        }
        constraints
    }
}

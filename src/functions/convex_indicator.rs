//! Indicator functions of convex sets.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of indicator functions of closed convex sets, optionally with a
/// bounded diameter.
///
/// Oracle values are constrained to zero (every queried point is feasible)
/// and gradients act as normal-cone elements.
#[derive(Debug, Clone, Copy)]
pub struct ConvexIndicatorFunction {
    diameter: f64,
}

impl ConvexIndicatorFunction {
    /// The indicator of an unbounded closed convex set.
    pub fn new() -> Self {
        ConvexIndicatorFunction {
            diameter: f64::INFINITY,
        }
    }

    /// The indicator of a closed convex set with diameter at most `d`.
    ///
    /// # Panics
    ///
    /// Panics if `d` is not strictly positive.
    pub fn with_diameter(d: f64) -> Self {
        assert!(d > 0.0, "set diameter must be positive, got {d}");
        ConvexIndicatorFunction { diameter: d }
    }

    /// The diameter bound (infinite when unbounded).
    pub fn diameter(&self) -> f64 {
        self.diameter
    }
}

impl Default for ConvexIndicatorFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionClass for ConvexIndicatorFunction {
    fn name(&self) -> &'static str {
        "convex indicator"
    }

    fn reuse_gradient(&self) -> bool {
        false
    }

    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (i, ti) in triples.iter().enumerate() {
            // Every queried point lies in the set, where the indicator is 0.
            constraints.push(ti.value.equals(0.0));

            for (j, tj) in triples.iter().enumerate() {
                if i == j {
                    continue;
                }
                // g_i is in the normal cone at x_i: <g_i, x_j - x_i> <= 0.
                constraints.push(ti.gradient.dot(&(&tj.point - &ti.point)).leq(0.0));
                if j > i && self.diameter.is_finite() {
                    let dx = &ti.point - &tj.point;
                    constraints.push(dx.squared_norm().leq(self.diameter * self.diameter));
                }
            }
        }
        constraints
    }
}

//! Lipschitz-continuous operators.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of `L`-Lipschitz operators.
///
/// `L = 1` gives a nonexpansive operator, `L < 1` a contraction.
#[derive(Debug, Clone, Copy)]
pub struct LipschitzOperator {
    l: f64,
}

impl LipschitzOperator {
    /// An `L`-Lipschitz operator.
    ///
    /// # Panics
    ///
    /// Panics if `l` is not finite and strictly positive.
    pub fn new(l: f64) -> Self {
        assert!(
            l.is_finite() && l > 0.0,
            "Lipschitz constant L must be finite and positive, got {l}"
        );
        LipschitzOperator { l }
    }

    /// The Lipschitz constant.
    pub fn lipschitz(&self) -> f64 {
        self.l
    }
}

impl FunctionClass for LipschitzOperator {
    fn name(&self) -> &'static str {
        "Lipschitz operator"
    }

    fn reuse_gradient(&self) -> bool {
        true
    }

    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (i, ti) in triples.iter().enumerate() {
            for (j, tj) in triples.iter().enumerate() {
                if i == j || (ti.point == tj.point && ti.gradient == tj.gradient) {
                    continue;
                }
                // ||T(x_i) - T(x_j)||^2 <= L^2 ||x_i - x_j||^2
                let images = (&ti.gradient - &tj.gradient).squared_norm();
                let arguments = (&ti.point - &tj.point).squared_norm();
                constraints.push(images.leq(arguments * (self.l * self.l)));
            }
        }
        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Context, Point};
    use crate::functions::Function;

    #[test]
    fn test_pair_count_skips_identical_triples() {
        let ctx = Context::new();
        let op = Function::leaf(&ctx, Box::new(LipschitzOperator::new(1.0)));
        let x = Point::fresh(&ctx);
        let y = Point::fresh(&ctx);
        op.gradient(&x);
        op.gradient(&y);
        // Cached repeat: no third triple.
        op.gradient(&x);

        assert_eq!(op.num_triples(), 2);
        assert_eq!(op.generate_class_constraints().len(), 2);
    }
}

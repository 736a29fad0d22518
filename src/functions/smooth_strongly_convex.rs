//! Smooth strongly convex functions.

use crate::constraints::{Constraint, ConstraintExt};
use crate::functions::{FunctionClass, OracleTriple};

/// The class of `mu`-strongly convex functions with `L`-Lipschitz gradient.
///
/// The interpolation conditions are necessary *and* sufficient: a set of
/// triples satisfies them iff some member of the class passes through all of
/// them, which is what makes the computed worst case tight.
#[derive(Debug, Clone, Copy)]
pub struct SmoothStronglyConvexFunction {
    mu: f64,
    l: f64,
}

impl SmoothStronglyConvexFunction {
    /// A `mu`-strongly convex, `L`-smooth function.
    ///
    /// # Panics
    ///
    /// Panics unless `0 <= mu < L` with `L` finite and positive.
    pub fn new(mu: f64, l: f64) -> Self {
        assert!(
            l.is_finite() && l > 0.0,
            "smoothness constant L must be finite and positive, got {l}"
        );
        assert!(
            mu.is_finite() && (0.0..l).contains(&mu),
            "strong convexity constant mu must satisfy 0 <= mu < L, got mu={mu}, L={l}"
        );
        SmoothStronglyConvexFunction { mu, l }
    }

    /// The strong convexity constant.
    pub fn strong_convexity(&self) -> f64 {
        self.mu
    }

    /// The smoothness constant.
    pub fn smoothness(&self) -> f64 {
        self.l
    }
}

impl FunctionClass for SmoothStronglyConvexFunction {
    fn name(&self) -> &'static str {
        "smooth strongly convex"
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
                // f_i - f_j >= <g_j, x_i - x_j>
                //            + 1/(2L) ||g_i - g_j||^2
                //            + mu/(2(1 - mu/L)) ||x_i - x_j - (g_i - g_j)/L||^2
                let dx = &ti.point - &tj.point;
                let dg = &ti.gradient - &tj.gradient;
                let rhs = &(&tj.gradient.dot(&dx) + &(dg.squared_norm() / (2.0 * self.l)))
                    + &((&dx - &(&dg / self.l)).squared_norm()
                        * (self.mu / (2.0 * (1.0 - self.mu / self.l))));
                constraints.push((&ti.value - &tj.value).geq(rhs));
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
    fn test_emits_exactly_k_times_k_minus_one_constraints() {
        let ctx = Context::new();
        let f = Function::leaf(&ctx, Box::new(SmoothStronglyConvexFunction::new(0.1, 1.0)));

        let k = 5;
        for _ in 0..k {
            f.gradient(&Point::fresh(&ctx));
        }
        assert_eq!(f.num_triples(), k);
        assert_eq!(f.generate_class_constraints().len(), k * (k - 1));
    }

    #[test]
    #[should_panic(expected = "0 <= mu < L")]
    fn test_rejects_mu_not_below_l() {
        SmoothStronglyConvexFunction::new(1.0, 1.0);
    }
}

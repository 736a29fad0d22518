//! Primitive algorithmic steps.
//!
//! Small symbolic subroutines combining points, expressions and oracle
//! bookkeeping into the building blocks algorithms are assembled from.
//! A plain gradient step needs no helper, it is point arithmetic:
//! `x1 = &x0 - &(gamma * f.gradient(&x0))`.

use crate::expr::{Expression, Point};
use crate::functions::{Function, OracleTriple};

/// Proximal step: `x = prox_{gamma f}(x0)`.
///
/// The proximal point satisfies `x0 - x = gamma * g` for some subgradient
/// `g` of `f` at `x`, so the step introduces a fresh subgradient and value,
/// defines `x` from the optimality condition, and records the triple on `f`.
///
/// Returns `(x, g, fx)`: the proximal point, the subgradient of `f` at `x`,
/// and the value of `f` at `x`.
pub fn proximal_step(x0: &Point, f: &Function, gamma: f64) -> (Point, Point, Expression) {
    let g = Point::fresh(f.ctx());
    let fx = Expression::fresh(f.ctx());
    let x = x0 - &(gamma * &g);
    f.add_point(OracleTriple {
        point: x.clone(),
        gradient: g.clone(),
        value: fx.clone(),
    });
    (x, g, fx)
}

/// Bregman gradient (mirror descent / NoLips) step.
///
/// Solves `x = argmin_u [ <gx0, u> + (1/gamma) D_h(u; x0) ]` for the mirror
/// map `h`, whose optimality condition reads `∇h(x) = ∇h(x0) - gamma * gx0`.
/// The iterate `x` is a fresh point, its mirror-map gradient `sx` is defined
/// from the condition, and the triple is recorded on `mirror_map`.
///
/// Arguments: `gx0` the objective (sub)gradient at `x0`, `sx0` the mirror-map
/// gradient at `x0`, `mirror_map` the map `h` (possibly a sum including an
/// indicator for constrained steps), `gamma` the step size.
///
/// Returns `(x, sx, hx)`: the new iterate, the mirror-map (sub)gradient at
/// `x`, and the mirror-map value at `x`.
pub fn bregman_gradient_step(
    gx0: &Point,
    sx0: &Point,
    mirror_map: &Function,
    gamma: f64,
) -> (Point, Point, Expression) {
    let sx = sx0 - &(gamma * gx0);
    let x = Point::fresh(mirror_map.ctx());
    let hx = Expression::fresh(mirror_map.ctx());
    mirror_map.add_point(OracleTriple {
        point: x.clone(),
        gradient: sx.clone(),
        value: hx.clone(),
    });
    (x, sx, hx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Context;
    use crate::functions::{ConvexFunction, Function};

    #[test]
    fn test_proximal_step_optimality_condition() {
        let ctx = Context::new();
        let f = Function::leaf(&ctx, Box::new(ConvexFunction::new()));
        let x0 = Point::fresh(&ctx);

        let gamma = 0.5;
        let (x, g, _fx) = proximal_step(&x0, &f, gamma);

        // x0 - x = gamma * g, and the triple is on f's history.
        assert_eq!(&x0 - &x, gamma * &g);
        assert_eq!(f.num_triples(), 1);
        assert_eq!(f.triples()[0].point, x);
    }

    #[test]
    fn test_bregman_step_records_on_mirror_map() {
        let ctx = Context::new();
        let h = Function::leaf(&ctx, Box::new(ConvexFunction::new()));
        let x0 = Point::fresh(&ctx);
        let gx0 = Point::fresh(&ctx);
        let (sx0, _h0) = h.oracle(&x0);

        let gamma = 2.0;
        let (x, sx, _hx) = bregman_gradient_step(&gx0, &sx0, &h, gamma);

        assert_eq!(sx, &sx0 - &(gamma * &gx0));
        assert!(x.is_leaf());
        assert_eq!(h.num_triples(), 2);
        assert_eq!(h.triples()[1].gradient, sx);
    }
}

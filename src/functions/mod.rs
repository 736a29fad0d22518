//! Symbolic functions and operators queried through first-order oracles.
//!
//! A [`Function`] stands for one member of a structural class (convex,
//! smooth, strongly convex, ...) or a positive-weighted sum of such members.
//! Every oracle query records a `(point, gradient, value)` triple; at compile
//! time each leaf's [`FunctionClass`] turns the recorded triples into the
//! interpolation constraints that characterize class membership. The number
//! of generated constraints grows quadratically with the number of recorded
//! triples, which is the dominant cost driver of the compiled SDP.

mod convex;
mod convex_indicator;
mod smooth_convex;
mod smooth_strongly_convex;
mod strongly_convex;

pub use convex::ConvexFunction;
pub use convex_indicator::ConvexIndicatorFunction;
pub use smooth_convex::SmoothConvexFunction;
pub use smooth_strongly_convex::SmoothStronglyConvexFunction;
pub use strongly_convex::StronglyConvexFunction;

use std::cell::RefCell;
use std::ops::{Add, Div, Mul};
use std::rc::Rc;

use crate::constraints::Constraint;
use crate::expr::{Context, Expression, Point};

/// One recorded oracle call: a point, the (sub)gradient returned there, and
/// the function value.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleTriple {
    /// Where the oracle was queried.
    pub point: Point,
    /// The gradient or subgradient returned by the oracle.
    pub gradient: Point,
    /// The function value at the point.
    pub value: Expression,
}

/// Interpolation-constraint generator for one structural function class.
///
/// Implementations receive every oracle triple recorded on a leaf function
/// and return the complete set of constraints a set of triples must satisfy
/// to be consistent with some member of the class. The trait is open:
/// downstream crates add classes by implementing it and passing the value to
/// [`crate::Pep::declare_function`].
pub trait FunctionClass {
    /// Human-readable class name, used in verbose output.
    fn name(&self) -> &'static str;

    /// Whether the class is single-valued: repeated oracle queries at the
    /// same point return the cached gradient instead of a fresh subgradient.
    fn reuse_gradient(&self) -> bool;

    /// Generate the interpolation constraints over the recorded triples.
    fn interpolation_constraints(&self, triples: &[OracleTriple]) -> Vec<Constraint>;
}

#[derive(Debug)]
enum FunctionKind {
    /// A basis member of a structural class.
    Leaf(Box<dyn FunctionClass>),
    /// A positive-weighted sum, flattened over leaf handles.
    Combination(Vec<(f64, Function)>),
}

impl std::fmt::Debug for dyn FunctionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FunctionClass({})", self.name())
    }
}

#[derive(Debug)]
struct FunctionData {
    reuse_gradient: bool,
    triples: Vec<OracleTriple>,
    class_constraints: Vec<Constraint>,
    kind: FunctionKind,
}

/// A symbolic function or operator.
///
/// `Function` is a shared handle: clones refer to the same oracle history,
/// so a gradient recorded through one handle is visible through all of them.
/// Handles are created by [`crate::Pep::declare_function`] or by arithmetic
/// on existing functions (`&f + &g`, `2.0 * &f`, `&f / 3.0`).
#[derive(Debug, Clone)]
pub struct Function {
    ctx: Context,
    data: Rc<RefCell<FunctionData>>,
}

impl Function {
    pub(crate) fn leaf(ctx: &Context, class: Box<dyn FunctionClass>) -> Function {
        let reuse_gradient = class.reuse_gradient();
        Function {
            ctx: ctx.clone(),
            data: Rc::new(RefCell::new(FunctionData {
                reuse_gradient,
                triples: Vec::new(),
                class_constraints: Vec::new(),
                kind: FunctionKind::Leaf(class),
            })),
        }
    }

    fn combination(ctx: &Context, terms: Vec<(f64, Function)>) -> Function {
        let reuse_gradient = terms.iter().all(|(_, f)| f.reuse_gradient());
        Function {
            ctx: ctx.clone(),
            data: Rc::new(RefCell::new(FunctionData {
                reuse_gradient,
                triples: Vec::new(),
                class_constraints: Vec::new(),
                kind: FunctionKind::Combination(terms),
            })),
        }
    }

    pub(crate) fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Whether this function is a basis class member rather than a sum.
    pub fn is_leaf(&self) -> bool {
        matches!(self.data.borrow().kind, FunctionKind::Leaf(_))
    }

    /// Whether repeated queries at the same point reuse the cached gradient.
    pub fn reuse_gradient(&self) -> bool {
        self.data.borrow().reuse_gradient
    }

    /// The leaf terms `weight * leaf` this function decomposes into.
    fn leaf_terms(&self) -> Vec<(f64, Function)> {
        match &self.data.borrow().kind {
            FunctionKind::Leaf(_) => vec![(1.0, self.clone())],
            FunctionKind::Combination(terms) => terms.clone(),
        }
    }

    fn same_handle(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    fn cached_triple(&self, point: &Point) -> Option<OracleTriple> {
        self.data
            .borrow()
            .triples
            .iter()
            .find(|t| t.point == *point)
            .cloned()
    }

    /// Query the first-order oracle at `point`.
    ///
    /// Returns the (sub)gradient and the value as fresh basis elements and
    /// records the triple. With `reuse_gradient` set, a repeated query at a
    /// point already in the history returns the cached pair; without it, a
    /// fresh subgradient is recorded but the (unique) value is reused.
    pub fn oracle(&self, point: &Point) -> (Point, Expression) {
        if let Some(cached) = self.cached_triple(point) {
            if self.reuse_gradient() {
                return (cached.gradient, cached.value);
            }
            let gradient = Point::fresh(&self.ctx);
            let triple = OracleTriple {
                point: point.clone(),
                gradient: gradient.clone(),
                value: cached.value.clone(),
            };
            self.add_point(triple);
            return (gradient, cached.value);
        }

        let gradient = Point::fresh(&self.ctx);
        let value = Expression::fresh(&self.ctx);
        self.add_point(OracleTriple {
            point: point.clone(),
            gradient: gradient.clone(),
            value: value.clone(),
        });
        (gradient, value)
    }

    /// The (sub)gradient at `point` (records the triple).
    pub fn gradient(&self, point: &Point) -> Point {
        self.oracle(point).0
    }

    /// The function value at `point` (records the triple).
    pub fn value(&self, point: &Point) -> Expression {
        self.oracle(point).1
    }

    /// Create a stationary point of this function.
    ///
    /// The recorded triple carries the symbolically zero gradient (empty
    /// decomposition), so no extra constraint is needed to pin it down.
    pub fn stationary_point(&self) -> Point {
        let point = Point::fresh(&self.ctx);
        let value = Expression::fresh(&self.ctx);
        self.add_point(OracleTriple {
            point: point.clone(),
            gradient: Point::zero(),
            value,
        });
        point
    }

    /// Record an oracle triple on this function.
    ///
    /// On a combination the triple is distributed over the leaves: every leaf
    /// but the last answers through its own (cached) oracle, and the last
    /// leaf receives the algebraic residual, so the weighted sum of the leaf
    /// triples reproduces the recorded one exactly.
    pub fn add_point(&self, triple: OracleTriple) {
        self.data.borrow_mut().triples.push(triple.clone());

        let terms = match &self.data.borrow().kind {
            FunctionKind::Leaf(_) => return,
            FunctionKind::Combination(terms) => terms.clone(),
        };

        let mut residual_gradient = triple.gradient;
        let mut residual_value = triple.value;
        let (last, others) = terms.split_last().expect("combination has no terms");
        for (weight, leaf) in others {
            let (gradient, value) = leaf.oracle(&triple.point);
            residual_gradient = &residual_gradient - &(*weight * &gradient);
            residual_value = &residual_value - &(*weight * &value);
        }
        let (weight, leaf) = last;
        leaf.add_point(OracleTriple {
            point: triple.point,
            gradient: &residual_gradient / *weight,
            value: &residual_value / *weight,
        });
    }

    /// The oracle triples recorded so far.
    pub fn triples(&self) -> Vec<OracleTriple> {
        self.data.borrow().triples.clone()
    }

    /// Number of oracle triples recorded so far.
    pub fn num_triples(&self) -> usize {
        self.data.borrow().triples.len()
    }

    /// The class name, for leaves.
    pub fn class_name(&self) -> Option<&'static str> {
        match &self.data.borrow().kind {
            FunctionKind::Leaf(class) => Some(class.name()),
            FunctionKind::Combination(_) => None,
        }
    }

    /// The interpolation constraints generated at compile time.
    ///
    /// Empty before [`crate::Pep::solve`]; afterwards each handle carries the
    /// dual value of its constraint, which together form the worst-case
    /// proof.
    pub fn class_constraints(&self) -> Vec<Constraint> {
        self.data.borrow().class_constraints.clone()
    }

    /// Run the leaf's interpolation generator over the recorded triples and
    /// store the resulting handles for later dual queries.
    pub(crate) fn generate_class_constraints(&self) -> Vec<Constraint> {
        let constraints = match &self.data.borrow().kind {
            FunctionKind::Leaf(class) => {
                class.interpolation_constraints(&self.data.borrow().triples)
            }
            // Combinations contribute through their declared leaves.
            FunctionKind::Combination(_) => Vec::new(),
        };
        self.data.borrow_mut().class_constraints = constraints.clone();
        constraints
    }

    fn scaled(&self, weight: f64) -> Function {
        assert!(
            weight.is_finite() && weight > 0.0,
            "function scaling requires a positive finite weight, got {weight}"
        );
        let terms = self
            .leaf_terms()
            .into_iter()
            .map(|(w, f)| (w * weight, f))
            .collect();
        Function::combination(&self.ctx, terms)
    }

    fn sum(&self, other: &Function) -> Function {
        let mut terms = self.leaf_terms();
        for (weight, leaf) in other.leaf_terms() {
            match terms.iter_mut().find(|(_, f)| f.same_handle(&leaf)) {
                Some((w, _)) => *w += weight,
                None => terms.push((weight, leaf)),
            }
        }
        Function::combination(&self.ctx, terms)
    }
}

// ============================================================================
// Operator overloading for Function
// ============================================================================

impl Add for &Function {
    type Output = Function;

    fn add(self, rhs: &Function) -> Function {
        self.sum(rhs)
    }
}

impl Add for Function {
    type Output = Function;

    fn add(self, rhs: Function) -> Function {
        &self + &rhs
    }
}

impl Mul<&Function> for f64 {
    type Output = Function;

    fn mul(self, rhs: &Function) -> Function {
        rhs.scaled(self)
    }
}

impl Mul<Function> for f64 {
    type Output = Function;

    fn mul(self, rhs: Function) -> Function {
        self * &rhs
    }
}

impl Div<f64> for &Function {
    type Output = Function;

    fn div(self, rhs: f64) -> Function {
        self.scaled(1.0 / rhs)
    }
}

impl Div<f64> for Function {
    type Output = Function;

    fn div(self, rhs: f64) -> Function {
        &self / rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(ctx: &Context, reuse: bool) -> Function {
        let class = if reuse {
            ConvexFunction::differentiable()
        } else {
            ConvexFunction::new()
        };
        Function::leaf(ctx, Box::new(class))
    }

    #[test]
    fn test_oracle_records_fresh_triple() {
        let ctx = Context::new();
        let f = leaf(&ctx, true);
        let x = Point::fresh(&ctx);

        let (g, v) = f.oracle(&x);
        assert!(g.is_leaf());
        assert!(v.is_leaf());
        assert_eq!(f.num_triples(), 1);
    }

    #[test]
    fn test_oracle_caching_with_reuse() {
        let ctx = Context::new();
        let f = leaf(&ctx, true);
        let x = Point::fresh(&ctx);

        let (g1, v1) = f.oracle(&x);
        let (g2, v2) = f.oracle(&x);
        assert_eq!(g1, g2);
        assert_eq!(v1, v2);
        assert_eq!(f.num_triples(), 1);
    }

    #[test]
    fn test_subgradients_without_reuse_share_the_value() {
        let ctx = Context::new();
        let f = leaf(&ctx, false);
        let x = Point::fresh(&ctx);

        let (g1, v1) = f.oracle(&x);
        let (g2, v2) = f.oracle(&x);
        assert_ne!(g1, g2);
        assert_eq!(v1, v2);
        assert_eq!(f.num_triples(), 2);
    }

    #[test]
    fn test_stationary_point_gradient_is_symbolically_zero() {
        let ctx = Context::new();
        let f = leaf(&ctx, true);
        let xs = f.stationary_point();

        let triples = f.triples();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].point, xs);
        assert!(triples[0].gradient.decomposition().is_empty());
    }

    #[test]
    fn test_combination_splits_triples_over_leaves() {
        let ctx = Context::new();
        let f1 = leaf(&ctx, true);
        let f2 = leaf(&ctx, true);
        let f = &f1 + &(2.0 * &f2);

        let x = Point::fresh(&ctx);
        let (g, v) = f.oracle(&x);

        assert_eq!(f1.num_triples(), 1);
        assert_eq!(f2.num_triples(), 1);

        // The weighted leaf triples reconstruct the recorded one.
        let t1 = &f1.triples()[0];
        let t2 = &f2.triples()[0];
        assert_eq!(&t1.gradient + &(2.0 * &t2.gradient), g);
        assert_eq!(&t1.value + &(2.0 * &t2.value), v);
    }

    #[test]
    fn test_sum_merges_repeated_leaves() {
        let ctx = Context::new();
        let f1 = leaf(&ctx, true);
        let f2 = leaf(&ctx, true);
        let f = &(&f1 + &f2) + &f1;

        let terms = f.leaf_terms();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].0, 2.0);
        assert_eq!(terms[1].0, 1.0);
    }

    #[test]
    #[should_panic(expected = "positive finite weight")]
    fn test_nonpositive_scaling_is_rejected() {
        let ctx = Context::new();
        let f = leaf(&ctx, true);
        let _ = -1.0 * &f;
    }
}

//! Constraint handles with dual-value slots.
//!
//! Comparisons never evaluate anything: `e.leq(rhs)` stores the expression
//! `e - rhs` together with a kind tag. The compiled SDP maps each constraint
//! to one row of the zero cone (equalities) or the nonnegative cone
//! (inequalities); after a successful solve the row's dual value is written
//! back into the handle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::expr::Expression;

/// Kind of a constraint on an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `expression == 0`, mapped to the zero cone.
    Equality,
    /// `expression <= 0`, mapped to the nonnegative cone.
    Inequality,
}

#[derive(Debug)]
struct ConstraintData {
    expression: Expression,
    kind: ConstraintKind,
    /// Sequence id, assigned when the constraint is registered with a
    /// problem. Stable ordering of compiled rows.
    id: Option<usize>,
    /// Dual value, written exactly once after a successful solve.
    dual: Option<f64>,
}

/// An equality or inequality between an [`Expression`] and zero.
///
/// `Constraint` is a shared handle: clones refer to the same underlying
/// record, so the copy kept by the caller observes the dual value that the
/// problem writes after solving.
#[derive(Debug, Clone)]
pub struct Constraint {
    inner: Rc<RefCell<ConstraintData>>,
}

impl Constraint {
    /// Create a constraint `expression (==|<=) 0`.
    pub fn new(expression: Expression, kind: ConstraintKind) -> Constraint {
        Constraint {
            inner: Rc::new(RefCell::new(ConstraintData {
                expression,
                kind,
                id: None,
                dual: None,
            })),
        }
    }

    /// The constrained expression.
    pub fn expression(&self) -> Expression {
        self.inner.borrow().expression.clone()
    }

    /// The constraint kind.
    pub fn kind(&self) -> ConstraintKind {
        self.inner.borrow().kind
    }

    /// The sequence id assigned at registration, if any.
    pub fn id(&self) -> Option<usize> {
        self.inner.borrow().id
    }

    /// The dual value from the solved SDP, if the problem has been solved.
    ///
    /// For inequality constraints the sign convention (`expression <= 0`)
    /// makes the dual nonnegative.
    pub fn dual_value(&self) -> Option<f64> {
        self.inner.borrow().dual
    }

    pub(crate) fn assign_id(&self, id: usize) {
        self.inner.borrow_mut().id = Some(id);
    }

    pub(crate) fn set_dual_value(&self, dual: f64) {
        self.inner.borrow_mut().dual = Some(dual);
    }
}

/// Extension trait for building constraints from expressions.
pub trait ConstraintExt {
    /// Equality constraint: `self == rhs`.
    fn equals(&self, rhs: impl Into<Expression>) -> Constraint;

    /// Inequality constraint: `self <= rhs`.
    fn leq(&self, rhs: impl Into<Expression>) -> Constraint;

    /// Inequality constraint: `self >= rhs`.
    fn geq(&self, rhs: impl Into<Expression>) -> Constraint;
}

impl ConstraintExt for Expression {
    fn equals(&self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self - &rhs.into(), ConstraintKind::Equality)
    }

    fn leq(&self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(self - &rhs.into(), ConstraintKind::Inequality)
    }

    fn geq(&self, rhs: impl Into<Expression>) -> Constraint {
        // lhs >= rhs  <=>  rhs - lhs <= 0
        Constraint::new(&rhs.into() - self, ConstraintKind::Inequality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Context;

    #[test]
    fn test_leq_stores_difference() {
        let ctx = Context::new();
        let f = Expression::fresh(&ctx);
        let c = f.leq(1.0);

        assert_eq!(c.kind(), ConstraintKind::Inequality);
        assert_eq!(c.expression(), &f - 1.0);
        assert_eq!(c.dual_value(), None);
        assert_eq!(c.id(), None);
    }

    #[test]
    fn test_geq_flips_sides() {
        let ctx = Context::new();
        let f = Expression::fresh(&ctx);
        let g = Expression::fresh(&ctx);
        let c = f.geq(&g);

        // f >= g stored as g - f <= 0.
        assert_eq!(c.expression(), &g - &f);
        assert_eq!(c.kind(), ConstraintKind::Inequality);
    }

    #[test]
    fn test_equality_kind() {
        let ctx = Context::new();
        let f = Expression::fresh(&ctx);
        let c = f.equals(0.0);
        assert_eq!(c.kind(), ConstraintKind::Equality);
    }

    #[test]
    fn test_clones_share_dual_slot() {
        let ctx = Context::new();
        let f = Expression::fresh(&ctx);
        let c = f.leq(0.0);
        let copy = c.clone();

        c.assign_id(3);
        c.set_dual_value(0.25);
        assert_eq!(copy.id(), Some(3));
        assert_eq!(copy.dual_value(), Some(0.25));
    }
}

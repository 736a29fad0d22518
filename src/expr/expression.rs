//! Abstract scalars: linear forms in leaf scalars and pairwise inner products.

use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nalgebra::DMatrix;

use super::id::{Context, PointId, ScalarId};
use super::point::Point;

/// One term of an expression decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpressionTerm {
    /// A leaf basis scalar (typically a function value).
    Scalar(ScalarId),
    /// The inner product of two leaf basis vectors, stored as an unordered
    /// pair with the smaller id first.
    InnerProduct(PointId, PointId),
}

impl ExpressionTerm {
    fn inner_product(a: PointId, b: PointId) -> ExpressionTerm {
        if a <= b {
            ExpressionTerm::InnerProduct(a, b)
        } else {
            ExpressionTerm::InnerProduct(b, a)
        }
    }
}

/// An abstract scalar.
///
/// An `Expression` is affine in leaf scalars and quadratic in leaf points:
/// it stores a coefficient for each leaf scalar and for each unordered pair
/// of leaf points (their inner product), plus an additive constant. Like
/// [`Point`], it is a pure decomposition: no number exists until the
/// problem is compiled and solved.
#[derive(Debug, Clone)]
pub struct Expression {
    leaf: Option<ScalarId>,
    terms: BTreeMap<ExpressionTerm, f64>,
    constant: f64,
}

impl Expression {
    /// Allocate a fresh basis scalar from the context.
    pub(crate) fn fresh(ctx: &Context) -> Expression {
        let id = ctx.next_scalar_id();
        let mut terms = BTreeMap::new();
        terms.insert(ExpressionTerm::Scalar(id), 1.0);
        Expression {
            leaf: Some(id),
            terms,
            constant: 0.0,
        }
    }

    /// The constant zero expression.
    pub fn zero() -> Expression {
        Expression {
            leaf: None,
            terms: BTreeMap::new(),
            constant: 0.0,
        }
    }

    /// Build the expression `<p, q>` from two point decompositions.
    pub(crate) fn from_inner_product(p: &Point, q: &Point) -> Expression {
        let mut terms = BTreeMap::new();
        for (&i, &a) in p.decomposition() {
            for (&j, &b) in q.decomposition() {
                let key = ExpressionTerm::inner_product(i, j);
                let entry = terms.entry(key).or_insert(0.0);
                *entry += a * b;
                if *entry == 0.0 {
                    terms.remove(&key);
                }
            }
        }
        Expression {
            leaf: None,
            terms,
            constant: 0.0,
        }
    }

    /// Whether this expression is a basis scalar rather than a combination.
    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    /// The basis id, if this expression is a leaf.
    pub fn leaf_id(&self) -> Option<ScalarId> {
        self.leaf
    }

    /// The decomposition over leaf scalars and inner-product pairs.
    pub fn terms(&self) -> &BTreeMap<ExpressionTerm, f64> {
        &self.terms
    }

    /// The additive constant.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Linear combination `a * self + b * other`.
    fn combine(&self, a: f64, other: &Expression, b: f64) -> Expression {
        let mut terms = BTreeMap::new();
        for (&key, &coeff) in &self.terms {
            let value = a * coeff;
            if value != 0.0 {
                terms.insert(key, value);
            }
        }
        for (&key, &coeff) in &other.terms {
            let entry = terms.entry(key).or_insert(0.0);
            *entry += b * coeff;
            if *entry == 0.0 {
                terms.remove(&key);
            }
        }
        Expression {
            leaf: None,
            terms,
            constant: a * self.constant + b * other.constant,
        }
    }

    fn scale(&self, scalar: f64) -> Expression {
        let terms = self
            .terms
            .iter()
            .filter(|(_, &coeff)| scalar * coeff != 0.0)
            .map(|(&key, &coeff)| (key, scalar * coeff))
            .collect();
        Expression {
            leaf: None,
            terms,
            constant: scalar * self.constant,
        }
    }

    /// Evaluate against a solved Gram matrix and scalar-slot values.
    pub(crate) fn evaluate(&self, gram: &DMatrix<f64>, scalars: &[f64]) -> f64 {
        let mut value = self.constant;
        for (key, &coeff) in &self.terms {
            value += coeff
                * match *key {
                    ExpressionTerm::Scalar(id) => scalars[id.raw() as usize],
                    ExpressionTerm::InnerProduct(i, j) => {
                        gram[(i.raw() as usize, j.raw() as usize)]
                    }
                };
        }
        value
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Expression) -> bool {
        self.terms == other.terms && self.constant == other.constant
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression {
            leaf: None,
            terms: BTreeMap::new(),
            constant: value,
        }
    }
}

impl From<&Expression> for Expression {
    fn from(expr: &Expression) -> Self {
        expr.clone()
    }
}

// ============================================================================
// Operator overloading for Expression
// ============================================================================

impl Add for &Expression {
    type Output = Expression;

    fn add(self, rhs: &Expression) -> Expression {
        self.combine(1.0, rhs, 1.0)
    }
}

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        &self + &rhs
    }
}

impl Add<&Expression> for Expression {
    type Output = Expression;

    fn add(self, rhs: &Expression) -> Expression {
        &self + rhs
    }
}

impl Add<Expression> for &Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        self + &rhs
    }
}

impl Sub for &Expression {
    type Output = Expression;

    fn sub(self, rhs: &Expression) -> Expression {
        self.combine(1.0, rhs, -1.0)
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        &self - &rhs
    }
}

impl Sub<&Expression> for Expression {
    type Output = Expression;

    fn sub(self, rhs: &Expression) -> Expression {
        &self - rhs
    }
}

impl Sub<Expression> for &Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        self - &rhs
    }
}

impl Neg for &Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scale(-1.0)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        -&self
    }
}

impl Mul<f64> for &Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scale(rhs)
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        &self * rhs
    }
}

impl Mul<&Expression> for f64 {
    type Output = Expression;

    fn mul(self, rhs: &Expression) -> Expression {
        rhs.scale(self)
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        self * &rhs
    }
}

impl Div<f64> for &Expression {
    type Output = Expression;

    fn div(self, rhs: f64) -> Expression {
        self.scale(1.0 / rhs)
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(self, rhs: f64) -> Expression {
        &self / rhs
    }
}

impl Add<f64> for &Expression {
    type Output = Expression;

    fn add(self, rhs: f64) -> Expression {
        let mut result = self.clone();
        result.leaf = None;
        result.constant += rhs;
        result
    }
}

impl Add<f64> for Expression {
    type Output = Expression;

    fn add(self, rhs: f64) -> Expression {
        &self + rhs
    }
}

impl Sub<f64> for &Expression {
    type Output = Expression;

    fn sub(self, rhs: f64) -> Expression {
        self + (-rhs)
    }
}

impl Sub<f64> for Expression {
    type Output = Expression;

    fn sub(self, rhs: f64) -> Expression {
        &self + (-rhs)
    }
}

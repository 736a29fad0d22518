//! Abstract vectors of implicit, unknown dimension.

use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::expression::Expression;
use super::id::{Context, PointId};

/// An abstract vector: a linear combination of leaf basis vectors.
///
/// A `Point` never holds numbers; it holds a flat decomposition
/// `leaf id -> coefficient`. A fresh basis vector decomposes as itself with
/// coefficient one, the zero vector as the empty map, and any arithmetic
/// result as the merged map of its operands. The map is keyed by leaf ids
/// only, so expanding a decomposition recursively is never necessary; the
/// linearity closure of the data model holds by construction.
///
/// Points are cheap to clone and compare equal when their decompositions
/// coincide.
#[derive(Debug, Clone)]
pub struct Point {
    leaf: Option<PointId>,
    decomposition: BTreeMap<PointId, f64>,
}

impl Point {
    /// Allocate a fresh basis vector from the context.
    pub(crate) fn fresh(ctx: &Context) -> Point {
        let id = ctx.next_point_id();
        let mut decomposition = BTreeMap::new();
        decomposition.insert(id, 1.0);
        Point {
            leaf: Some(id),
            decomposition,
        }
    }

    /// The symbolically zero vector (empty decomposition).
    pub fn zero() -> Point {
        Point {
            leaf: None,
            decomposition: BTreeMap::new(),
        }
    }

    /// Whether this point is a basis vector rather than a combination.
    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    /// The basis id, if this point is a leaf.
    pub fn leaf_id(&self) -> Option<PointId> {
        self.leaf
    }

    /// Whether this is the symbolically zero vector.
    pub fn is_zero(&self) -> bool {
        self.decomposition.is_empty()
    }

    /// The decomposition over leaf basis vectors.
    pub fn decomposition(&self) -> &BTreeMap<PointId, f64> {
        &self.decomposition
    }

    /// Linear combination `a * self + b * other`, merging coefficients on
    /// shared leaves and dropping exact zeros.
    fn combine(&self, a: f64, other: &Point, b: f64) -> Point {
        let mut decomposition = BTreeMap::new();
        for (&id, &coeff) in &self.decomposition {
            let value = a * coeff;
            if value != 0.0 {
                decomposition.insert(id, value);
            }
        }
        for (&id, &coeff) in &other.decomposition {
            let entry = decomposition.entry(id).or_insert(0.0);
            *entry += b * coeff;
            if *entry == 0.0 {
                decomposition.remove(&id);
            }
        }
        Point {
            leaf: None,
            decomposition,
        }
    }

    /// Scale every coefficient by `scalar`.
    fn scale(&self, scalar: f64) -> Point {
        let decomposition = self
            .decomposition
            .iter()
            .filter(|(_, &coeff)| scalar * coeff != 0.0)
            .map(|(&id, &coeff)| (id, scalar * coeff))
            .collect();
        Point {
            leaf: None,
            decomposition,
        }
    }

    /// Inner product with another point, as a symbolic [`Expression`].
    ///
    /// The result is quadratic in the leaf coefficients: every pair of leaves
    /// contributes its coefficient product to the unordered-pair term of the
    /// expression.
    pub fn dot(&self, other: &Point) -> Expression {
        Expression::from_inner_product(self, other)
    }

    /// Squared Euclidean norm `<self, self>`, as a symbolic [`Expression`].
    pub fn squared_norm(&self) -> Expression {
        self.dot(self)
    }
}

impl PartialEq for Point {
    /// Two points are the same abstract vector iff their decompositions over
    /// the leaf basis coincide exactly.
    fn eq(&self, other: &Point) -> bool {
        self.decomposition == other.decomposition
    }
}

// ============================================================================
// Operator overloading for Point
// ============================================================================

impl Add for &Point {
    type Output = Point;

    fn add(self, rhs: &Point) -> Point {
        self.combine(1.0, rhs, 1.0)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        &self + &rhs
    }
}

impl Add<&Point> for Point {
    type Output = Point;

    fn add(self, rhs: &Point) -> Point {
        &self + rhs
    }
}

impl Add<Point> for &Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        self + &rhs
    }
}

impl Sub for &Point {
    type Output = Point;

    fn sub(self, rhs: &Point) -> Point {
        self.combine(1.0, rhs, -1.0)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        &self - &rhs
    }
}

impl Sub<&Point> for Point {
    type Output = Point;

    fn sub(self, rhs: &Point) -> Point {
        &self - rhs
    }
}

impl Sub<Point> for &Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        self - &rhs
    }
}

impl Neg for &Point {
    type Output = Point;

    fn neg(self) -> Point {
        self.scale(-1.0)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        -&self
    }
}

impl Mul<f64> for &Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        self.scale(rhs)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        &self * rhs
    }
}

impl Mul<&Point> for f64 {
    type Output = Point;

    fn mul(self, rhs: &Point) -> Point {
        rhs.scale(self)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        self * &rhs
    }
}

impl Div<f64> for &Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        self.scale(1.0 / rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        &self / rhs
    }
}

/// Inner product of two points, mirroring `x * y` in the modeling notation.
impl Mul for &Point {
    type Output = Expression;

    fn mul(self, rhs: &Point) -> Expression {
        self.dot(rhs)
    }
}

impl Mul for Point {
    type Output = Expression;

    fn mul(self, rhs: Point) -> Expression {
        self.dot(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_is_leaf() {
        let ctx = Context::new();
        let p = Point::fresh(&ctx);
        assert!(p.is_leaf());
        assert_eq!(p.decomposition().len(), 1);
        assert_eq!(p.decomposition()[&p.leaf_id().unwrap()], 1.0);
    }

    #[test]
    fn test_zero_has_empty_decomposition() {
        let z = Point::zero();
        assert!(z.is_zero());
        assert!(!z.is_leaf());
    }

    #[test]
    fn test_linearity_of_combinations() {
        let ctx = Context::new();
        let p = Point::fresh(&ctx);
        let q = Point::fresh(&ctx);

        // 2p + 3q decomposes coefficient-wise.
        let r = &(2.0 * &p) + &(3.0 * &q);
        assert_eq!(r.decomposition()[&p.leaf_id().unwrap()], 2.0);
        assert_eq!(r.decomposition()[&q.leaf_id().unwrap()], 3.0);
        assert!(!r.is_leaf());
    }

    #[test]
    fn test_cancellation_drops_entries() {
        let ctx = Context::new();
        let p = Point::fresh(&ctx);
        let q = Point::fresh(&ctx);
        let r = &(&p + &q) - &p;
        assert_eq!(r.decomposition().len(), 1);
        assert_eq!(r, q);

        let s = &r - &q;
        assert!(s.is_zero());
        assert_eq!(s, Point::zero());
    }

    #[test]
    fn test_equality_is_structural() {
        let ctx = Context::new();
        let p = Point::fresh(&ctx);
        let q = Point::fresh(&ctx);
        assert_ne!(p, q);
        assert_eq!(p, (2.0 * &p) / 2.0);
        assert_eq!(-&p, -1.0 * &p);
    }

    #[test]
    fn test_division() {
        let ctx = Context::new();
        let p = Point::fresh(&ctx);
        let half = &p / 2.0;
        assert_eq!(half.decomposition()[&p.leaf_id().unwrap()], 0.5);
    }
}

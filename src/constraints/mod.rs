//! Constraints between symbolic expressions and zero.

mod constraint;

pub use constraint::{Constraint, ConstraintExt, ConstraintKind};

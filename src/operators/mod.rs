//! Operator classes: single-valued maps queried through an evaluation oracle.
//!
//! Operators reuse the [`crate::functions::Function`] machinery: the
//! "gradient" of a recorded triple is the operator's image at the point and
//! the value slot is unused by the interpolation conditions.

mod lipschitz;

pub use lipschitz::LipschitzOperator;

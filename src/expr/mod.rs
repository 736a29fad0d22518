//! Symbolic algebra: abstract vectors ([`Point`]) and scalars ([`Expression`]).
//!
//! Nothing in this module computes a number. Arithmetic merges flat
//! coefficient maps over leaf basis ids; the numeric meaning of every leaf is
//! fixed only when the problem is compiled into an SDP.

mod expression;
mod id;
mod point;

pub use expression::{Expression, ExpressionTerm};
pub use id::{Context, PointId, ScalarId};
pub use point::Point;

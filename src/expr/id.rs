//! Basis ids and the per-problem allocation context.
//!
//! The original formulation of the problem needs a stable identity for every
//! *leaf* basis element: each leaf point becomes one row/column of the Gram
//! matrix, each leaf scalar one free slot of the SDP. Ids are allocated from
//! a context owned by the problem instance, so independent problems never
//! share ids and compiled output is deterministic without any global reset
//! discipline.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifier of a leaf basis vector (one Gram matrix dimension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub(crate) u64);

impl PointId {
    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Identifier of a leaf basis scalar (one free SDP slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScalarId(pub(crate) u64);

impl ScalarId {
    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Counters {
    points: u64,
    scalars: u64,
}

/// Per-problem monotonic id allocator, shared by the problem, its functions
/// and its partitions.
///
/// Cloning yields another handle to the same counters.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Rc<RefCell<Counters>>,
}

impl Context {
    /// Create a fresh context with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next leaf point id.
    pub fn next_point_id(&self) -> PointId {
        let mut counters = self.inner.borrow_mut();
        let id = PointId(counters.points);
        counters.points += 1;
        id
    }

    /// Allocate the next leaf scalar id.
    pub fn next_scalar_id(&self) -> ScalarId {
        let mut counters = self.inner.borrow_mut();
        let id = ScalarId(counters.scalars);
        counters.scalars += 1;
        id
    }

    /// Number of leaf points allocated so far (the Gram matrix side).
    pub fn num_points(&self) -> usize {
        self.inner.borrow().points as usize
    }

    /// Number of leaf scalars allocated so far.
    pub fn num_scalars(&self) -> usize {
        self.inner.borrow().scalars as usize
    }

    /// Whether two handles share the same counters.
    pub fn same_as(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

//! Block partitions of the ambient space, for coordinate-wise algorithms.

use std::cell::RefCell;
use std::rc::Rc;

use crate::constraints::{Constraint, ConstraintExt};
use crate::expr::{Context, Point};

#[derive(Debug)]
struct PartitionData {
    num_blocks: usize,
    /// Each processed point together with its per-block projections.
    entries: Vec<(Point, Vec<Point>)>,
}

/// A partition of the (implicit, unknown-dimensional) ambient space into
/// disjoint blocks of coordinates.
///
/// [`BlockPartition::get_block`] returns the projection of a point onto one
/// block. The projections are fresh basis vectors; what makes them
/// projections is a set of compile-time constraints: for every processed
/// point the blocks sum back to the point, and blocks of distinct indices
/// are mutually orthogonal across all processed points. Expectations over a
/// uniformly random block choice are then plain averages of the per-block
/// outcomes at the symbolic level.
#[derive(Debug, Clone)]
pub struct BlockPartition {
    ctx: Context,
    data: Rc<RefCell<PartitionData>>,
}

impl BlockPartition {
    pub(crate) fn new(ctx: &Context, num_blocks: usize) -> BlockPartition {
        assert!(num_blocks >= 1, "a partition needs at least one block");
        BlockPartition {
            ctx: ctx.clone(),
            data: Rc::new(RefCell::new(PartitionData {
                num_blocks,
                entries: Vec::new(),
            })),
        }
    }

    /// Number of blocks in the partition.
    pub fn num_blocks(&self) -> usize {
        self.data.borrow().num_blocks
    }

    /// Number of points processed through [`BlockPartition::get_block`].
    pub fn num_points(&self) -> usize {
        self.data.borrow().entries.len()
    }

    /// The projection of `point` onto block `index`.
    ///
    /// Projections are cached per point: repeated calls for the same point
    /// return the same blocks. A single-block partition is the identity.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_blocks()`.
    pub fn get_block(&self, point: &Point, index: usize) -> Point {
        let num_blocks = self.num_blocks();
        assert!(
            index < num_blocks,
            "block index {index} out of range for {num_blocks} blocks"
        );
        if num_blocks == 1 {
            return point.clone();
        }

        if let Some((_, blocks)) = self
            .data
            .borrow()
            .entries
            .iter()
            .find(|(p, _)| p == point)
        {
            return blocks[index].clone();
        }

        let blocks: Vec<Point> = (0..num_blocks).map(|_| Point::fresh(&self.ctx)).collect();
        let block = blocks[index].clone();
        self.data.borrow_mut().entries.push((point.clone(), blocks));
        block
    }

    /// Generate the constraints that make the cached blocks an actual
    /// partition: per-point reconstruction (`sum of blocks == point`, as a
    /// vanishing squared norm, which the PSD Gram matrix extends to all
    /// inner products) and cross-point orthogonality of distinct blocks.
    pub(crate) fn partition_constraints(&self) -> Vec<Constraint> {
        let data = self.data.borrow();
        let d = data.num_blocks;
        let mut constraints = Vec::new();
        if d == 1 {
            return constraints;
        }

        for (point, blocks) in &data.entries {
            let mut sum = Point::zero();
            for block in blocks {
                sum = &sum + block;
            }
            constraints.push((&sum - point).squared_norm().equals(0.0));
        }

        for (a, (_, blocks_a)) in data.entries.iter().enumerate() {
            for (b, (_, blocks_b)) in data.entries.iter().enumerate().skip(a) {
                for i in 0..d {
                    for j in 0..d {
                        if i == j || (a == b && j < i) {
                            continue;
                        }
                        constraints.push(blocks_a[i].dot(&blocks_b[j]).equals(0.0));
                    }
                }
            }
        }
        constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintKind;

    #[test]
    fn test_blocks_are_cached_per_point() {
        let ctx = Context::new();
        let partition = BlockPartition::new(&ctx, 3);
        let x = Point::fresh(&ctx);

        let b0 = partition.get_block(&x, 0);
        let b0_again = partition.get_block(&x, 0);
        let b1 = partition.get_block(&x, 1);

        assert_eq!(b0, b0_again);
        assert_ne!(b0, b1);
        assert_eq!(partition.num_points(), 1);
        assert_eq!(ctx.num_points(), 1 + 3);
    }

    #[test]
    fn test_single_block_is_identity() {
        let ctx = Context::new();
        let partition = BlockPartition::new(&ctx, 1);
        let x = Point::fresh(&ctx);
        assert_eq!(partition.get_block(&x, 0), x);
        assert!(partition.partition_constraints().is_empty());
    }

    #[test]
    fn test_constraint_count_single_point() {
        let ctx = Context::new();
        let partition = BlockPartition::new(&ctx, 3);
        let x = Point::fresh(&ctx);
        partition.get_block(&x, 0);

        // 1 reconstruction + C(3,2) orthogonality pairs.
        let constraints = partition.partition_constraints();
        assert_eq!(constraints.len(), 1 + 3);
        assert!(constraints.iter().all(|c| c.kind() == ConstraintKind::Equality));
    }

    #[test]
    fn test_constraint_count_two_points() {
        let ctx = Context::new();
        let partition = BlockPartition::new(&ctx, 2);
        let x = Point::fresh(&ctx);
        let y = Point::fresh(&ctx);
        partition.get_block(&x, 0);
        partition.get_block(&y, 1);

        // 2 reconstructions, 1 orthogonality pair per point, and both
        // ordered cross-point pairs.
        assert_eq!(partition.partition_constraints().len(), 2 + 1 + 1 + 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_block_index_out_of_range() {
        let ctx = Context::new();
        let partition = BlockPartition::new(&ctx, 2);
        let x = Point::fresh(&ctx);
        partition.get_block(&x, 2);
    }
}

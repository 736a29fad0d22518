//! Matrix stuffing: converts the registered constraints to solver format.
//!
//! The decision vector is `x = [svec(G) | F | t]`: the packed upper triangle
//! of the Gram matrix in column-major order, the scalar slots (function
//! values), and the hypograph variable `t` standing for the worst-case
//! objective. The compiled problem is
//!
//! `minimize -t  subject to  Ax + s = b,  s in (Zero, NonNeg, PSDTriangle)`
//!
//! with one zero-cone row per equality, one nonnegative row per inequality,
//! one hypograph row `t - metric <= 0` per performance metric, and a PSD
//! triangle block tying the Gram columns to a positive semidefinite matrix.

use nalgebra_sparse::CscMatrix;

use crate::constraints::{Constraint, ConstraintKind};
use crate::expr::{Expression, ExpressionTerm};
use crate::sparse::csc_from_triplets;

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// Cone dimensions for the stuffed problem, in row order.
#[derive(Debug, Clone, Default)]
pub struct ConeDims {
    /// Number of zero cone (equality) rows.
    pub zero: usize,
    /// Number of nonnegative cone (inequality + hypograph) rows.
    pub nonneg: usize,
    /// Side of the PSD triangle block (the Gram matrix dimension).
    pub psd_side: usize,
}

impl ConeDims {
    /// Total number of constraint rows.
    pub fn total(&self) -> usize {
        self.zero + self.nonneg + self.psd_side * (self.psd_side + 1) / 2
    }
}

/// Mapping from leaf ids to columns of the decision vector.
///
/// Leaf ids are allocated densely from zero per problem, so the map is
/// arithmetic: the packed triangle entry of Gram pair `(i, j)` with `i <= j`
/// sits at column `j(j+1)/2 + i`, scalar slots follow the triangle, and the
/// hypograph variable is the last column.
#[derive(Debug, Clone, Copy)]
pub struct SlotMap {
    /// Gram matrix side: the number of leaf points.
    pub side: usize,
    /// Number of scalar slots.
    pub num_scalars: usize,
}

impl SlotMap {
    /// Create a map for `side` leaf points and `num_scalars` scalar slots.
    pub fn new(side: usize, num_scalars: usize) -> SlotMap {
        SlotMap { side, num_scalars }
    }

    /// Length of the packed Gram triangle.
    pub fn tri_len(&self) -> usize {
        self.side * (self.side + 1) / 2
    }

    /// Column of the Gram entry `(i, j)` (order-insensitive).
    pub fn gram_col(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        j * (j + 1) / 2 + i
    }

    /// Column of scalar slot `s`.
    pub fn scalar_col(&self, s: usize) -> usize {
        self.tri_len() + s
    }

    /// Column of the hypograph variable `t`.
    pub fn hypograph_col(&self) -> usize {
        self.tri_len() + self.num_scalars
    }

    /// Total number of decision variables.
    pub fn total_vars(&self) -> usize {
        self.tri_len() + self.num_scalars + 1
    }
}

/// Stuffed SDP ready for a conic backend.
#[derive(Debug)]
pub struct StuffedSdp {
    /// Constraint matrix A (m x n).
    pub a: CscMatrix<f64>,
    /// Constraint vector b (m).
    pub b: Vec<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Cone dimensions.
    pub cone_dims: ConeDims,
    /// Column mapping for solution recovery.
    pub map: SlotMap,
    /// Row index of each input constraint, for dual recovery.
    pub constraint_rows: Vec<usize>,
}

/// Build the stuffed SDP from the registered constraints and metrics.
///
/// `constraint_rows[i]` is the row constraint `i` landed on; the backend's
/// dual vector indexed by it yields the constraint's multiplier.
pub fn stuff_pep(constraints: &[Constraint], metrics: &[Expression], map: SlotMap) -> StuffedSdp {
    let n = map.total_vars();

    let equalities: Vec<usize> = (0..constraints.len())
        .filter(|&i| constraints[i].kind() == ConstraintKind::Equality)
        .collect();
    let inequalities: Vec<usize> = (0..constraints.len())
        .filter(|&i| constraints[i].kind() == ConstraintKind::Inequality)
        .collect();

    let cone_dims = ConeDims {
        zero: equalities.len(),
        nonneg: inequalities.len() + metrics.len(),
        psd_side: map.side,
    };
    let total_rows = cone_dims.total();

    let mut a_rows = Vec::new();
    let mut a_cols = Vec::new();
    let mut a_vals = Vec::new();
    let mut b = vec![0.0; total_rows];
    let mut constraint_rows = vec![0; constraints.len()];

    let mut row = 0;

    // Zero cone: expr == 0, so Ax = b with A the linear part and b the
    // negated constant.
    for &i in &equalities {
        constraint_rows[i] = row;
        stuff_expression(
            &constraints[i].expression(),
            &map,
            row,
            1.0,
            &mut a_rows,
            &mut a_cols,
            &mut a_vals,
            &mut b,
        );
        row += 1;
    }

    // Nonnegative cone: expr <= 0 gives s = b - Ax = -expr >= 0 with the
    // same stuffing, and a nonnegative dual multiplier.
    for &i in &inequalities {
        constraint_rows[i] = row;
        stuff_expression(
            &constraints[i].expression(),
            &map,
            row,
            1.0,
            &mut a_rows,
            &mut a_cols,
            &mut a_vals,
            &mut b,
        );
        row += 1;
    }

    // Hypograph rows: t - metric <= 0 for every performance metric, making
    // t the minimum over the metric list at the optimum.
    for metric in metrics {
        stuff_expression(
            metric, &map, row, -1.0, &mut a_rows, &mut a_cols, &mut a_vals, &mut b,
        );
        a_rows.push(row);
        a_cols.push(map.hypograph_col());
        a_vals.push(1.0);
        row += 1;
    }

    // PSD triangle block: s = D x_gram with off-diagonal entries scaled by
    // sqrt(2), the svec convention of the PSD triangle cone.
    for j in 0..map.side {
        for i in 0..=j {
            let scale = if i == j { 1.0 } else { SQRT2 };
            a_rows.push(row);
            a_cols.push(map.gram_col(i, j));
            a_vals.push(-scale);
            row += 1;
        }
    }

    let a = csc_from_triplets(total_rows, n, a_rows, a_cols, a_vals);

    // Maximize t.
    let mut q = vec![0.0; n];
    q[map.hypograph_col()] = -1.0;

    StuffedSdp {
        a,
        b,
        q,
        cone_dims,
        map,
        constraint_rows,
    }
}

/// Stuff one expression row: A entries `sign * coeff` and `b = -sign * k`.
fn stuff_expression(
    expr: &Expression,
    map: &SlotMap,
    row: usize,
    sign: f64,
    a_rows: &mut Vec<usize>,
    a_cols: &mut Vec<usize>,
    a_vals: &mut Vec<f64>,
    b: &mut [f64],
) {
    for (&term, &coeff) in expr.terms() {
        let col = match term {
            ExpressionTerm::Scalar(id) => map.scalar_col(id.raw() as usize),
            ExpressionTerm::InnerProduct(i, j) => {
                map.gram_col(i.raw() as usize, j.raw() as usize)
            }
        };
        a_rows.push(row);
        a_cols.push(col);
        a_vals.push(sign * coeff);
    }
    b[row] = -sign * expr.constant();
}

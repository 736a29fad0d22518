//! Problem definition and solving API.
//!
//! [`Pep`] collects the symbolic description of a worst-case analysis:
//! declared functions, initial points and conditions, extra constraints and
//! performance metrics. [`Pep::solve`] compiles everything into one SDP over
//! the Gram matrix of the leaf points and the vector of scalar slots, hands
//! it to a conic backend and unpacks the certified worst case.

use nalgebra::{DMatrix, DVector};

use crate::constraints::Constraint;
use crate::error::{PepError, Result};
use crate::expr::{Context, Expression, Point};
use crate::functions::{Function, FunctionClass};
use crate::partition::BlockPartition;
use crate::solver::{
    stuff_pep, BackendSolution, ClarabelBackend, ConicBackend, Settings, SlotMap, SolveStatus,
    StuffedSdp,
};

/// A performance estimation problem.
///
/// The worst case is the largest value the smallest performance metric can
/// take over all functions consistent with the declared classes and all
/// initial conditions; a single metric makes that simply the metric's worst
/// value.
#[derive(Debug, Default)]
pub struct Pep {
    ctx: Context,
    functions: Vec<Function>,
    partitions: Vec<BlockPartition>,
    initial_conditions: Vec<Constraint>,
    constraints: Vec<Constraint>,
    metrics: Vec<Expression>,
    solved: std::cell::Cell<bool>,
}

impl Pep {
    /// Create an empty problem.
    pub fn new() -> Pep {
        Pep::default()
    }

    /// Declarations are frozen once the problem has been solved.
    fn assert_building(&self) {
        assert!(
            !self.solved.get(),
            "the problem has already been solved; declarations are frozen"
        );
    }

    /// Declare a function belonging to a structural class.
    ///
    /// The returned handle is used to query oracles, create stationary
    /// points and build sums; its interpolation constraints are generated
    /// when the problem is solved.
    pub fn declare_function(&mut self, class: impl FunctionClass + 'static) -> Function {
        self.assert_building();
        let function = Function::leaf(&self.ctx, Box::new(class));
        self.functions.push(function.clone());
        function
    }

    /// Declare a partition of the ambient space into `num_blocks` blocks.
    pub fn declare_block_partition(&mut self, num_blocks: usize) -> BlockPartition {
        self.assert_building();
        let partition = BlockPartition::new(&self.ctx, num_blocks);
        self.partitions.push(partition.clone());
        partition
    }

    /// Create a fresh starting point for an algorithm.
    pub fn set_initial_point(&self) -> Point {
        self.assert_building();
        Point::fresh(&self.ctx)
    }

    /// Add an initial condition, typically a bound such as
    /// `(&x0 - &xs).squared_norm().leq(1.0)`.
    pub fn set_initial_condition(&mut self, condition: Constraint) {
        self.assert_building();
        self.initial_conditions.push(condition);
    }

    /// Add a general constraint on the iterates.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.assert_building();
        self.constraints.push(constraint);
    }

    /// Add a performance metric.
    ///
    /// With several metrics the compiled problem maximizes the minimum of
    /// the list, through a hypograph variable bounded by every metric.
    pub fn set_performance_metric(&mut self, metric: impl Into<Expression>) {
        self.assert_building();
        self.metrics.push(metric.into());
    }

    /// Compile and solve the problem with the built-in Clarabel backend.
    pub fn solve(&self, settings: &Settings) -> Result<PepSolution> {
        self.solve_with(&ClarabelBackend, settings)
    }

    /// Compile and solve the problem with a custom conic backend.
    pub fn solve_with(
        &self,
        backend: &dyn ConicBackend,
        settings: &Settings,
    ) -> Result<PepSolution> {
        if self.metrics.is_empty() {
            return Err(PepError::InvalidProblem(
                "no performance metric has been set".into(),
            ));
        }

        let (all_constraints, sdp) = self.compile(settings);
        let solution = backend.solve(&sdp, settings);

        match solution.status {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => return Err(PepError::Infeasible),
            SolveStatus::Unbounded => return Err(PepError::Unbounded),
            SolveStatus::NumericalError => {
                return Err(PepError::NumericalError(
                    "solver encountered numerical difficulties".into(),
                ))
            }
            status => return Err(PepError::SolverError { status }),
        }

        // Write the dual multipliers back into the constraint handles.
        for (constraint, &row) in all_constraints.iter().zip(&sdp.constraint_rows) {
            constraint.set_dual_value(solution.z[row]);
        }

        self.solved.set(true);
        Ok(self.unpack(&sdp, &solution, settings))
    }

    /// Gather the constraints in registration order, generate interpolation
    /// and partition constraints, and stuff the SDP.
    fn compile(&self, settings: &Settings) -> (Vec<Constraint>, StuffedSdp) {
        let mut all_constraints = Vec::new();
        all_constraints.extend(self.initial_conditions.iter().cloned());
        all_constraints.extend(self.constraints.iter().cloned());

        if settings.verbose >= 1 {
            println!(
                "compiling PEP: {} leaf point(s), {} scalar slot(s)",
                self.ctx.num_points(),
                self.ctx.num_scalars()
            );
            println!(
                "  {} initial condition(s), {} general constraint(s)",
                self.initial_conditions.len(),
                self.constraints.len()
            );
        }

        for function in &self.functions {
            let interpolation = function.generate_class_constraints();
            if settings.verbose >= 1 {
                println!(
                    "  {}: {} oracle triple(s), {} interpolation constraint(s)",
                    function.class_name().unwrap_or("combination"),
                    function.num_triples(),
                    interpolation.len()
                );
            }
            all_constraints.extend(interpolation);
        }

        for partition in &self.partitions {
            all_constraints.extend(partition.partition_constraints());
        }

        for (id, constraint) in all_constraints.iter().enumerate() {
            constraint.assign_id(id);
        }

        let map = SlotMap::new(self.ctx.num_points(), self.ctx.num_scalars());
        let sdp = stuff_pep(&all_constraints, &self.metrics, map);
        (all_constraints, sdp)
    }

    /// Rebuild the Gram matrix, its factor and the scalar slots from the
    /// backend's decision vector.
    fn unpack(
        &self,
        sdp: &StuffedSdp,
        solution: &BackendSolution,
        settings: &Settings,
    ) -> PepSolution {
        let map = &sdp.map;
        let side = map.side;

        let mut gram = DMatrix::zeros(side, side);
        for j in 0..side {
            for i in 0..=j {
                let value = solution.x[map.gram_col(i, j)];
                gram[(i, j)] = value;
                gram[(j, i)] = value;
            }
        }

        let scalars = solution.x[map.tri_len()..map.tri_len() + map.num_scalars].to_vec();
        let objective_value = solution.x[map.hypograph_col()];

        // G = Q diag(l) Q', so R = Q diag(sqrt(l)) reproduces G = R R'.
        // Tiny negative eigenvalues from the solver tolerance are clamped.
        let eigen = gram.clone().symmetric_eigen();
        let sqrt_eigenvalues = eigen.eigenvalues.map(|l| l.max(0.0).sqrt());
        let factor = &eigen.eigenvectors * DMatrix::from_diagonal(&sqrt_eigenvalues);

        if settings.verbose >= 1 {
            println!(
                "solved in {} iteration(s), worst case {objective_value:.6e}",
                solution.iterations
            );
        }

        PepSolution {
            status: solution.status,
            objective_value,
            gram,
            scalars,
            factor,
            solve_time: solution.solve_time,
            iterations: solution.iterations,
        }
    }
}

/// A solved performance estimation problem.
///
/// Holds the worst-case value together with the numeric reconstruction of
/// the optimal Gram matrix, from which every symbolic point and expression
/// gets a concrete value: the worst-case function and starting point the
/// SDP found.
#[derive(Debug, Clone)]
pub struct PepSolution {
    /// Solution status (always optimal when obtained from a solve call).
    pub status: SolveStatus,
    /// The worst-case value of the (smallest) performance metric.
    pub objective_value: f64,
    /// The optimal Gram matrix of the leaf points.
    pub gram: DMatrix<f64>,
    /// The optimal scalar slot values (function values).
    pub scalars: Vec<f64>,
    /// A factor R with `gram = R R'`; row `i` holds the coordinates of leaf
    /// point `i` in the reconstructed ambient space.
    pub factor: DMatrix<f64>,
    /// Solve time in seconds.
    pub solve_time: f64,
    /// Number of solver iterations.
    pub iterations: u32,
}

impl PepSolution {
    /// Numeric value of an expression at the worst-case instance.
    pub fn expression_value(&self, expression: &Expression) -> f64 {
        expression.evaluate(&self.gram, &self.scalars)
    }

    /// Coordinates of a point in the reconstructed ambient space.
    ///
    /// The dimension equals the number of leaf points, the largest the
    /// worst-case instance can need.
    pub fn point_value(&self, point: &Point) -> DVector<f64> {
        let mut coordinates = DVector::zeros(self.factor.nrows());
        for (&id, &coeff) in point.decomposition() {
            coordinates += self.factor.row(id.raw() as usize).transpose() * coeff;
        }
        coordinates
    }
}

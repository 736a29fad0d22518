//! End-to-end solve tests against analytically known worst-case values.

use peprust::prelude::*;

fn assert_close(value: f64, expected: f64, tol: f64) {
    assert!(
        (value - expected).abs() < tol,
        "Expected ~{}, got {}",
        expected,
        value
    );
}

/// One step of gradient descent on a mu-strongly convex, L-smooth function
/// with step size 1/L contracts the distance to the minimizer by
/// (1 - mu/L)^2. The bound is tight.
#[test]
fn test_gradient_descent_strongly_convex_one_step() {
    let (mu, l) = (0.1, 1.0);

    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(mu, l));
    let xs = func.stationary_point();
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));

    let x1 = &x0 - &(func.gradient(&x0) / l);
    problem.set_performance_metric((&x1 - &xs).squared_norm());

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_close(solution.objective_value, (1.0 - mu / l).powi(2), 1e-4);
}

#[test]
fn test_gradient_descent_strongly_convex_two_steps() {
    let (mu, l) = (0.1, 1.0);

    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(mu, l));
    let xs = func.stationary_point();
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));

    let mut x = x0;
    for _ in 0..2 {
        x = &x - &(func.gradient(&x) / l);
    }
    problem.set_performance_metric((&x - &xs).squared_norm());

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, (1.0 - mu / l).powi(4), 1e-4);
}

/// Gradient descent on an L-smooth convex function with step size 1/L:
/// f(x_n) - f_* <= L ||x_0 - x_*||^2 / (4n + 2), tight.
#[test]
fn test_gradient_descent_smooth_convex_function_value() {
    let l = 1.0;
    let n = 2;

    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothConvexFunction::new(l));
    let xs = func.stationary_point();
    let fs = func.value(&xs);
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));

    let mut x = x0;
    for _ in 0..n {
        x = &x - &(func.gradient(&x) / l);
    }
    problem.set_performance_metric(&func.value(&x) - &fs);

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, l / (4.0 * n as f64 + 2.0), 1e-4);
}

/// The proximal point method on a closed convex function:
/// f(x_n) - f_* <= ||x_0 - x_*||^2 / (4 n gamma), tight.
#[test]
fn test_proximal_point_method() {
    let gamma = 1.0;
    let n = 2;

    let mut problem = Pep::new();
    let func = problem.declare_function(ConvexFunction::new());
    let xs = func.stationary_point();
    let fs = func.value(&xs);
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));

    let mut x = x0;
    let mut fx = fs.clone();
    for _ in 0..n {
        let (next, _, value) = proximal_step(&x, &func, gamma);
        x = next;
        fx = value;
    }
    problem.set_performance_metric(&fx - &fs);

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, 1.0 / (4.0 * gamma * n as f64), 1e-4);
}

/// An L-Lipschitz operator can stretch distances by exactly L.
#[test]
fn test_lipschitz_operator_contraction() {
    let l = 0.5;

    let mut problem = Pep::new();
    let op = problem.declare_function(LipschitzOperator::new(l));
    let x = problem.set_initial_point();
    let y = problem.set_initial_point();
    problem.set_initial_condition((&x - &y).squared_norm().leq(1.0));

    let tx = op.gradient(&x);
    let ty = op.gradient(&y);
    problem.set_performance_metric((&tx - &ty).squared_norm());

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, l * l, 1e-5);
}

/// NoLips (Bregman gradient) on a composite problem, f relatively L-smooth
/// with respect to the mirror map h: F(x_n) - F_* <= D_h(x_*; x_0) / (gamma n).
#[test]
fn test_no_lips_function_value() {
    let l = 1.0;
    let gamma = 1.0 / (2.0 * l);
    let n = 3;

    let mut problem = Pep::new();
    // d = L h - f1 convex encodes the relative smoothness of f1.
    let d = problem.declare_function(ConvexFunction::differentiable());
    let f1 = problem.declare_function(ConvexFunction::differentiable());
    let h = &(&d + &f1) / l;
    let f2 = problem.declare_function(ConvexIndicatorFunction::new());
    let func = &f1 + &f2;

    let xs = func.stationary_point();
    let (_ghs, hs) = h.oracle(&xs);
    let (_gfs, fs) = f1.oracle(&xs);

    let x0 = problem.set_initial_point();
    let (gh0, h0) = h.oracle(&x0);
    let (gf0, f0) = f1.oracle(&x0);

    // D_h(x_*; x_0) <= 1
    let bregman = &(&hs - &h0) - &gh0.dot(&(&xs - &x0));
    problem.set_initial_condition(bregman.leq(1.0));

    let mut gfx = gf0;
    let mut ffx = f0;
    let mut ghx = gh0;
    for _ in 0..n {
        let (x, _, _) = bregman_gradient_step(&gfx, &ghx, &(&f2 + &h), gamma);
        let (g, f) = f1.oracle(&x);
        gfx = g;
        ffx = f;
        let gdx = d.gradient(&x);
        ghx = &(&gdx + &gfx) / l;
    }
    problem.set_performance_metric(&ffx - &fs);

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, 1.0 / (gamma * n as f64), 5e-3);
}

/// With several metrics the compiled problem maximizes their minimum, so a
/// looser second metric leaves the worst case unchanged.
#[test]
fn test_multiple_metrics_take_the_minimum() {
    let (mu, l) = (0.1, 1.0);

    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(mu, l));
    let xs = func.stationary_point();
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));

    let x1 = &x0 - &(func.gradient(&x0) / l);
    problem.set_performance_metric((&x1 - &xs).squared_norm());
    problem.set_performance_metric((&x0 - &xs).squared_norm());

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, (1.0 - mu / l).powi(2), 1e-4);
}

/// The dual of the initial condition is the sensitivity of the worst case to
/// the radius bound, which equals the rate itself for gradient descent.
#[test]
fn test_dual_values_certify_the_rate() {
    let (mu, l) = (0.1, 1.0);

    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(mu, l));
    let xs = func.stationary_point();
    let x0 = problem.set_initial_point();
    let initial = (&x0 - &xs).squared_norm().leq(1.0);
    problem.set_initial_condition(initial.clone());

    let x1 = &x0 - &(func.gradient(&x0) / l);
    problem.set_performance_metric((&x1 - &xs).squared_norm());

    problem.solve(&Settings::default()).expect("solve failed");

    let dual = initial.dual_value().expect("no dual written back");
    assert_close(dual, (1.0 - mu / l).powi(2), 1e-3);

    for constraint in func.class_constraints() {
        let multiplier = constraint.dual_value().expect("no dual written back");
        assert!(multiplier > -1e-6, "negative multiplier {multiplier}");
    }
}

/// The reconstructed Gram matrix of the worst-case instance is PSD, and the
/// factor reproduces it.
#[test]
fn test_solution_gram_is_psd() {
    let mut problem = Pep::new();
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(0.1, 1.0));
    let xs = func.stationary_point();
    let x0 = problem.set_initial_point();
    problem.set_initial_condition((&x0 - &xs).squared_norm().leq(1.0));
    let x1 = &x0 - &func.gradient(&x0);
    problem.set_performance_metric((&x1 - &xs).squared_norm());

    let solution = problem.solve(&Settings::default()).expect("solve failed");

    let eigenvalues = solution.gram.clone().symmetric_eigen().eigenvalues;
    assert!(eigenvalues.iter().all(|&e| e > -1e-6));

    let reproduced = &solution.factor * solution.factor.transpose();
    assert!((&reproduced - &solution.gram).norm() < 1e-6);

    // The evaluated metric agrees with the reported objective.
    let metric = (&x1 - &xs).squared_norm();
    assert_close(
        solution.expression_value(&metric),
        solution.objective_value,
        1e-6,
    );

    // Point coordinates reproduce the symbolic inner products.
    let diff = solution.point_value(&(&x0 - &xs));
    assert_close(
        diff.norm_squared(),
        solution.expression_value(&(&x0 - &xs).squared_norm()),
        1e-6,
    );
}

/// Blocks of a partition reconstruct the point: the sum of the squared block
/// norms equals the squared norm of the point itself.
#[test]
fn test_block_partition_reconstruction() {
    let mut problem = Pep::new();
    let partition = problem.declare_block_partition(3);
    let x = problem.set_initial_point();
    problem.set_initial_condition(x.squared_norm().leq(1.0));

    let mut metric = Expression::zero();
    for k in 0..partition.num_blocks() {
        metric = &metric + &partition.get_block(&x, k).squared_norm();
    }
    problem.set_performance_metric(metric);

    let solution = problem.solve(&Settings::default()).expect("solve failed");
    assert_close(solution.objective_value, 1.0, 1e-5);
}

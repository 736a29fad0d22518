//! Worst-case analysis of gradient descent.
//!
//! Computes the tight contraction factor of n steps of gradient descent with
//! step size 1/L on mu-strongly convex, L-smooth functions:
//!
//! ||x_n - x_*||^2 <= (1 - mu/L)^(2n) ||x_0 - x_*||^2

use peprust::prelude::*;

fn main() -> Result<()> {
    println!("=== Gradient descent on smooth strongly convex functions ===\n");

    let mu = 0.1;
    let l = 1.0;
    let n = 3;

    let mut problem = Pep::new();

    // The objective function and its minimizer.
    let func = problem.declare_function(SmoothStronglyConvexFunction::new(mu, l));
    let xs = func.stationary_point();

    // n steps of gradient descent from a point at distance at most 1.
    let x0 = problem.set_initial_point();
    let initial = (&x0 - &xs).squared_norm().leq(1.0);
    problem.set_initial_condition(initial.clone());

    let mut x = x0.clone();
    for _ in 0..n {
        x = &x - &(func.gradient(&x) / l);
    }
    problem.set_performance_metric((&x - &xs).squared_norm());

    let settings = Settings {
        verbose: 1,
        ..Settings::default()
    };
    let solution = problem.solve(&settings)?;

    let theoretical = (1.0 - mu / l).powi(2 * n);
    println!("\nResults (mu = {mu}, L = {l}, n = {n}):");
    println!("  Status: {:?}", solution.status);
    println!("  Worst case ||x_n - x_*||^2: {:.6}", solution.objective_value);
    println!("  Theoretical (1 - mu/L)^(2n): {theoretical:.6}");

    // The dual of the initial condition is the sensitivity of the worst
    // case to the radius bound, i.e. the rate itself.
    println!("  Initial condition multiplier: {:.6}", initial.dual_value().unwrap_or(f64::NAN));

    println!("\nWorst-case instance:");
    println!("  x_0 coordinates: {:.4}", solution.point_value(&x0).transpose());
    println!("  x_n coordinates: {:.4}", solution.point_value(&x).transpose());

    Ok(())
}

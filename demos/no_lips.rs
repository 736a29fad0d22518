//! Worst-case analysis of the NoLips (Bregman gradient) method.
//!
//! Minimizes F(x) = f1(x) + f2(x) where f1 is convex and L-smooth relative
//! to a convex mirror map h, and f2 is the indicator of a closed convex set.
//! The tight guarantee, for any step size gamma <= 1/L, is
//!
//! F(x_n) - F_* <= D_h(x_*; x_0) / (gamma n)

use peprust::prelude::*;

fn main() -> Result<()> {
    println!("=== NoLips on relatively smooth composite problems ===\n");

    let l = 1.0;
    let gamma = 1.0 / (2.0 * l);
    let n = 3;

    let mut problem = Pep::new();

    // Relative smoothness of f1 with respect to h is encoded by declaring
    // d = L h - f1 as a convex function, so h = (d + f1) / L.
    let d = problem.declare_function(ConvexFunction::differentiable());
    let f1 = problem.declare_function(ConvexFunction::differentiable());
    let h = &(&d + &f1) / l;
    let f2 = problem.declare_function(ConvexIndicatorFunction::new());
    let func = &f1 + &f2;

    // Minimizer of the composite objective and its value.
    let xs = func.stationary_point();
    let (_ghs, hs) = h.oracle(&xs);
    let (_gfs, fs) = f1.oracle(&xs);

    // Starting point, with bounded Bregman divergence D_h(x_*; x_0) <= 1.
    let x0 = problem.set_initial_point();
    let (gh0, h0) = h.oracle(&x0);
    let (gf0, f0) = f1.oracle(&x0);
    let bregman = &(&hs - &h0) - &gh0.dot(&(&xs - &x0));
    problem.set_initial_condition(bregman.leq(1.0));

    // n NoLips steps with mirror map f2 + h.
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

    let settings = Settings {
        verbose: 1,
        ..Settings::default()
    };
    let solution = problem.solve(&settings)?;

    let theoretical = 1.0 / (gamma * n as f64);
    println!("\nResults (L = {l}, gamma = {gamma}, n = {n}):");
    println!("  Status: {:?}", solution.status);
    println!("  Worst case F(x_n) - F_*: {:.6}", solution.objective_value);
    println!("  Theoretical 1/(gamma n): {theoretical:.6}");

    Ok(())
}

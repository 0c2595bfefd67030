//! A basic example for how to use the constraint solver:
//! make a rough quadrilateral into a square.
use geosolve::{Config, Problem};

fn main() -> Result<(), geosolve::Error> {
    // Define the geometry. Each line after the first starts where the last one ended,
    // so the corners stay joined while the solver moves them.
    let mut problem = Problem::new();
    problem.add_line("a", (0.0, 0.0), (30.0, 0.0))?;
    let a_end = problem.line("a")?.end().id();
    problem.add_line("b", a_end, (30.0, 31.0))?;
    let b_end = problem.line("b")?.end().id();
    problem.add_line("c", b_end, (-1.0, 29.0))?;
    let c_end = problem.line("c")?.end().id();
    let a_start = problem.line("a")?.start().id();
    problem.add_line("d", c_end, a_start)?;

    // Define constraints on the geometry.
    problem.constrain_position("a")?;
    problem.constrain_line_length("b", 30.0)?;
    problem.constrain_angle_between_lines("a", "b", -90.0)?;
    problem.constrain_angle_between_lines("b", "c", -90.0)?;
    problem.constrain_angle_between_lines("c", "d", -90.0)?;
    problem.constrain_angle_between_lines("d", "a", -90.0)?;

    // Run the solver!
    let outcome = problem.solve(Config::default())?;
    if !outcome.success() {
        eprintln!("Did not converge, showing the best attempt");
    }
    for warning in outcome.warnings() {
        eprintln!("{warning}");
    }

    println!("{problem}");
    for primitive in problem.primitives() {
        println!("{primitive}");
    }
    Ok(())
}

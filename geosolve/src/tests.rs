use std::cell::Cell;

use super::*;


#[track_caller]
pub(crate) fn assert_nearly_eq(actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < 1e-9,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

#[track_caller]
fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff < tolerance,
        "expected {expected} within {tolerance}, got {actual} (diff {diff})"
    );
}

/// Three lines, end to end, starting as a right triangle with legs of 1.
fn right_triangle() -> Problem {
    let mut problem = Problem::new();
    problem.add_line("l1", (0.0, 0.0), (1.0, 0.0)).unwrap();
    let l1_start = problem.line("l1").unwrap().start().id();
    let l1_end = problem.line("l1").unwrap().end().id();
    problem.add_line("l2", l1_end, (1.0, 1.0)).unwrap();
    let l2_end = problem.line("l2").unwrap().end().id();
    problem.add_line("l3", l2_end, l1_start).unwrap();
    problem
}

fn angle(problem: &Problem, a: &str, b: &str) -> f64 {
    problem
        .line(a)
        .unwrap()
        .angle_to(&problem.line(b).unwrap())
}

/// Snapshot every parameter, bit for bit.
fn all_bits(problem: &Problem) -> Vec<(ParamId, u64)> {
    problem
        .points()
        .iter()
        .flat_map(|(id, point)| {
            [
                (ParamId::x(id), point.x().value().to_bits()),
                (ParamId::y(id), point.y().value().to_bits()),
            ]
        })
        .collect()
}

/// Evaluates the objective a few times, then breaks.
struct FailingMinimizer;

impl Minimizer for FailingMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        _config: &Config,
    ) -> Result<Minimum, Error> {
        let far_away: Vec<_> = x0.iter().map(|x| x + 100.0).collect();
        objective(&far_away);
        objective(&[f64::NAN; 64][..x0.len()]);
        Err(Error::SolverFailure("injected fault".into()))
    }
}

/// Tries a bad candidate, then gives up on a different point without converging.
struct GiveUpMinimizer;

impl Minimizer for GiveUpMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        _config: &Config,
    ) -> Result<Minimum, Error> {
        let bad: Vec<_> = x0.iter().map(|x| x - 7.0).collect();
        objective(&bad);
        let x: Vec<_> = x0.iter().map(|x| x + 0.5).collect();
        let error = objective(&x);
        Ok(Minimum {
            x,
            success: false,
            iterations: 3,
            evaluations: 2,
            error,
        })
    }
}

/// Counts how often it's called, and never moves anything.
#[derive(Default)]
struct CountingMinimizer {
    calls: Cell<usize>,
}

impl Minimizer for CountingMinimizer {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        _config: &Config,
    ) -> Result<Minimum, Error> {
        self.calls.set(self.calls.get() + 1);
        let error = objective(&x0);
        Ok(Minimum {
            x: x0,
            success: false,
            iterations: 7,
            evaluations: 1,
            error,
        })
    }
}

#[test]
fn triangle_becomes_equilateral() {
    let mut problem = right_triangle();
    problem.constrain_line_length("l1", 1.0).unwrap();
    problem.constrain_line_length("l2", 1.0).unwrap();
    problem.constrain_line_length("l3", 1.0).unwrap();

    let outcome = problem.solve(Config::default()).unwrap();

    assert!(outcome.success());
    assert_close(problem.error(), 0.0, 1e-6);
    // Either orientation is a solution.
    assert_close(angle(&problem, "l1", "l2").abs(), 120.0, 1e-3);
    assert_close(angle(&problem, "l2", "l3").abs(), 120.0, 1e-3);
    assert_close(angle(&problem, "l3", "l1").abs(), 120.0, 1e-3);
}

#[test]
fn quadrilateral_becomes_square() {
    let mut problem = Problem::new();
    problem.add_line("l1", (0.0, 0.0), (1.0, 0.0)).unwrap();
    let l1_end = problem.line("l1").unwrap().end().id();
    problem.add_line("l2", l1_end, (1.0, 1.0)).unwrap();
    let l2_end = problem.line("l2").unwrap().end().id();
    problem.add_line("l3", l2_end, (1.5, 0.75)).unwrap();
    let l3_end = problem.line("l3").unwrap().end().id();
    let l1_start = problem.line("l1").unwrap().start().id();
    problem.add_line("l4", l3_end, l1_start).unwrap();
    for line in ["l1", "l2", "l3", "l4"] {
        problem.constrain_line_length(line, 1.0).unwrap();
    }
    for (a, b) in [("l1", "l2"), ("l2", "l3"), ("l3", "l4"), ("l4", "l1")] {
        problem.constrain_angle_between_lines(a, b, -90.0).unwrap();
    }

    let outcome = problem.solve(Config::default()).unwrap();

    assert!(outcome.success());
    for line in ["l1", "l2", "l3", "l4"] {
        assert_close(problem.line(line).unwrap().length(), 1.0, 1e-3);
    }
    for (a, b) in [("l1", "l2"), ("l2", "l3"), ("l3", "l4"), ("l4", "l1")] {
        assert_close(angle(&problem, a, b), -90.0, 1e-3);
    }
}

#[test]
fn fixed_line_stays_put() {
    let mut problem = Problem::new();
    problem.add_line("l1", (0.0, 0.0), (1.0, 0.0)).unwrap();
    let l1_end = problem.line("l1").unwrap().end().id();
    problem
        .add_line("l2", l1_end, (0.5, 3f64.sqrt() / 2.0))
        .unwrap();
    let l2_end = problem.line("l2").unwrap().end().id();
    let l1_start = problem.line("l1").unwrap().start().id();
    problem.add_line("l3", l2_end, l1_start).unwrap();
    problem.constrain_position("l1").unwrap();
    problem.constrain_line_length("l2", 1.0).unwrap();
    problem.constrain_angle_between_lines("l1", "l2", -90.0).unwrap();
    let l1_before = problem.line("l1").unwrap();
    let (start_before, end_before) = (l1_before.start().coords(), l1_before.end().coords());

    let outcome = problem.solve(Config::default()).unwrap();

    assert!(outcome.success());
    // Only the far corner was free.
    assert_eq!(outcome.parameters(), &ParamId::both(l2_end));
    let l1 = problem.line("l1").unwrap();
    assert_eq!(l1.start().x().to_bits(), start_before.0.to_bits());
    assert_eq!(l1.start().y().to_bits(), start_before.1.to_bits());
    assert_eq!(l1.end().x().to_bits(), end_before.0.to_bits());
    assert_eq!(l1.end().y().to_bits(), end_before.1.to_bits());
    assert_close(angle(&problem, "l1", "l2"), -90.0, 1e-3);
    assert_close(angle(&problem, "l2", "l3"), -135.0, 1e-3);
    assert_close(problem.line("l2").unwrap().length(), 1.0, 1e-3);
}

#[test]
fn zero_length_line_is_never_solved() {
    let mut problem = right_triangle();
    problem.add_line("dot", (4.0, 4.0), (4.0, 4.0)).unwrap();
    problem.constrain_line_length("l1", 2.0).unwrap();
    let before = all_bits(&problem);

    let minimizer = CountingMinimizer::default();
    let err = problem
        .solve_with(&minimizer, Config::default())
        .unwrap_err();

    let Error::InvalidGeometry(invalid) = &err else {
        panic!("expected invalid geometry, got {err}");
    };
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].primitive, "dot");
    assert_eq!(invalid[0].reason, InvalidReason::ZeroLength);
    assert_eq!(minimizer.calls.get(), 0);
    assert_eq!(all_bits(&problem), before);
}

#[test]
fn failed_minimizer_rolls_back() {
    let mut problem = right_triangle();
    problem.constrain_line_length("l1", 3.0).unwrap();
    problem
        .constrain_angle_between_lines("l1", "l2", 45.0)
        .unwrap();
    let before = all_bits(&problem);
    let error_before = problem.error();

    let err = problem
        .solve_with(&FailingMinimizer, Config::default())
        .unwrap_err();

    assert!(matches!(err, Error::SolverFailure(_)));
    assert_eq!(err.to_string(), "Minimizer failed: injected fault");
    assert_eq!(all_bits(&problem), before);
    assert_eq!(problem.error().to_bits(), error_before.to_bits());
}

#[test]
fn non_convergence_keeps_best_values() {
    let mut problem = right_triangle();
    problem.constrain_line_length("l1", 3.0).unwrap();
    let minimizer = CountingMinimizer::default();

    let outcome = problem.solve_with(&minimizer, Config::default()).unwrap();

    assert_eq!(minimizer.calls.get(), 1);
    assert!(!outcome.success());
    assert_eq!(outcome.iterations(), 7);
    assert_nearly_eq(outcome.error(), 4.0);
    assert!(outcome.warnings().iter().any(|w| matches!(
        w.content,
        WarningContent::DidNotConverge { iterations: 7, .. }
    )));
}

#[test]
fn non_convergence_writes_back_moved_values() {
    let mut problem = right_triangle();
    problem.constrain_position("l1").unwrap();
    problem.constrain_line_length("l2", 1.0).unwrap();
    let corner = problem.line("l2").unwrap().end().id();
    assert_eq!(problem.point("l2.end").unwrap().coords(), (1.0, 1.0));

    let outcome = problem.solve_with(&GiveUpMinimizer, Config::default()).unwrap();

    assert!(!outcome.success());
    // Neither the starting point nor the last candidate tried.
    assert_eq!(problem.point("l2.end").unwrap().coords(), (1.5, 1.5));
    assert_eq!(outcome.final_value(ParamId::x(corner)), Some(1.5));
    assert_eq!(outcome.final_value(ParamId::y(corner)), Some(1.5));
    let expected = (2.5f64.sqrt() - 1.0).powi(2);
    assert_nearly_eq(problem.error(), expected);
    assert_nearly_eq(outcome.error(), expected);
    assert!(outcome.warnings().iter().any(|w| matches!(
        w.content,
        WarningContent::DidNotConverge { iterations: 3, .. }
    )));
}

#[test]
fn fixed_parameters_never_move() {
    let mut problem = right_triangle();
    problem.add_point("anchor", 5.0, 5.0).unwrap();
    problem.constrain_position("anchor").unwrap();
    problem.constrain_line_length("l1", 2.5).unwrap();
    problem.constrain_line_length("l2", 2.0).unwrap();
    problem
        .constrain_point_distance("anchor", "l1.end", 1.0)
        .unwrap();
    // Fix one coordinate directly, rather than by position.
    let l2_end = problem.line("l2").unwrap().end().id();
    problem
        .parameter_mut(ParamId::y(l2_end))
        .unwrap()
        .set_fixed(true);
    let anchor = problem.point("anchor").unwrap().coords();
    let pinned = problem.parameter(ParamId::y(l2_end)).unwrap().value();

    problem.solve(Config::default()).unwrap();

    let after = problem.point("anchor").unwrap().coords();
    assert_eq!(after.0.to_bits(), anchor.0.to_bits());
    assert_eq!(after.1.to_bits(), anchor.1.to_bits());
    assert_eq!(
        problem
            .parameter(ParamId::y(l2_end))
            .unwrap()
            .value()
            .to_bits(),
        pinned.to_bits()
    );
}

#[test]
fn solving_twice_is_idempotent() {
    let mut problem = right_triangle();
    problem.constrain_position("l1").unwrap();
    problem.constrain_line_length("l2", 1.0).unwrap();
    problem
        .constrain_angle_between_lines("l1", "l2", -90.0)
        .unwrap();
    let config = Config::default();
    problem.solve(config).unwrap();
    let first = problem.error();

    problem.solve(config).unwrap();

    assert!((problem.error() - first).abs() < 1e-9);
}

#[test]
fn nothing_free_skips_the_minimizer() {
    let mut problem = right_triangle();
    problem.constrain_line_length("l1", 2.0).unwrap();
    for line in ["l1", "l2", "l3"] {
        problem.constrain_position(line).unwrap();
    }
    let minimizer = CountingMinimizer::default();

    let outcome = problem.solve_with(&minimizer, Config::default()).unwrap();

    assert_eq!(minimizer.calls.get(), 0);
    assert!(outcome.success());
    assert!(outcome.final_values().is_empty());
    assert_nearly_eq(outcome.error(), 1.0);
    assert_eq!(
        outcome.warnings()[0].content,
        WarningContent::NoFreeParameters
    );
}

#[test]
fn zero_angle_target_is_flagged() {
    let mut problem = right_triangle();
    problem.constrain_line_length("l1", 1.0).unwrap();
    problem
        .constrain_angle_between_lines("l1", "l2", 0.0)
        .unwrap();
    let minimizer = CountingMinimizer::default();

    let outcome = problem.solve_with(&minimizer, Config::default()).unwrap();

    assert!(outcome.warnings().contains(&Warning {
        about_constraint: Some(1),
        content: WarningContent::ZeroAngleTarget,
    }));
}

#[test]
fn distance_between_shared_points() {
    let mut problem = right_triangle();
    problem.constrain_position("l1").unwrap();
    problem
        .constrain_point_distance("l1.start", "l2.end", 2.0)
        .unwrap();
    problem
        .constrain_angle_between_lines("l1", "l2", -90.0)
        .unwrap();

    let outcome = problem.solve(Config::default()).unwrap();

    assert!(outcome.success());
    let corner = problem.point("l2.end").unwrap();
    assert_close(corner.x(), 1.0, 1e-3);
    assert_close(corner.y(), 3f64.sqrt(), 1e-3);
}

#[test]
fn test_cases_never_get_worse() {
    let cases = [
        include_str!("../test_cases/triangle/problem.md"),
        include_str!("../test_cases/square/problem.md"),
        include_str!("../test_cases/polygon/problem.md"),
        include_str!("../test_cases/right_angle/problem.md"),
    ];
    for txt in cases {
        let sketch: crate::textual::Sketch = txt.parse().unwrap();
        let mut problem = sketch.to_problem().unwrap();
        let before = problem.error();

        let outcome = problem.solve(Config::default()).unwrap();

        assert!(outcome.error() <= before, "{problem}");
        assert_nearly_eq(problem.error(), outcome.error());
    }
}

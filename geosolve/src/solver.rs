//! The minimizer which drives a solve, and its settings.

use std::cell::RefCell;

use argmin::{
    core::{CostFunction, Executor, State, TerminationReason, TerminationStatus},
    solver::neldermead::NelderMead as ArgminNelderMead,
};

use crate::Error;

/// Relative step for each coordinate of the initial simplex.
const DEFAULT_INITIAL_STEP: f64 = 0.05;
/// Absolute step used instead when a coordinate starts at zero.
const ZERO_COORDINATE_STEP: f64 = 0.00025;

/// Settings for a solve. Passed through to the [`Minimizer`] untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Stop once the standard deviation of the costs across the simplex
    /// falls below this.
    pub tolerance: f64,
    /// Maximum iterations for each minimizer run.
    pub max_iterations: u64,
    /// Extra runs, each restarted from the previous run's best point.
    pub restarts: usize,
    /// Relative size of the initial simplex around the starting point.
    pub initial_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10_000,
            restarts: 3,
            initial_step: DEFAULT_INITIAL_STEP,
        }
    }
}

impl Config {
    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration limit for each run.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set how many times to restart after the first run.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the relative size of the initial simplex.
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }
}

/// What a [`Minimizer`] found.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found. Same length as the starting point.
    pub x: Vec<f64>,
    /// Did the minimizer converge, rather than e.g. run out of iterations?
    pub success: bool,
    /// Iterations used.
    pub iterations: usize,
    /// Objective evaluations used.
    pub evaluations: usize,
    /// Objective value at `x`.
    pub error: f64,
}

/// Minimizes a scalar function of a vector, starting from an initial guess.
///
/// Implementations may evaluate the objective as many times as they like,
/// one call at a time. Returning `Err` means the minimizer itself broke;
/// failing to converge should be `Ok` with `success: false`.
pub trait Minimizer {
    /// Find the `x` near `x0` which minimizes `objective`.
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        config: &Config,
    ) -> Result<Minimum, Error>;
}

/// The default minimizer: Nelder-Mead simplex search, via `argmin`.
/// Needs no derivatives, so it copes with the non-smooth distance error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NelderMead;

/// Adapts a closure to argmin's cost function interface.
struct Objective<F> {
    f: RefCell<F>,
}

impl<F> CostFunction for Objective<F>
where
    F: FnMut(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let cost = (*self.f.borrow_mut())(param.as_slice());
        // The simplex has to be totally ordered by cost.
        Ok(if cost.is_nan() { f64::INFINITY } else { cost })
    }
}

/// Result of a single argmin run.
struct Run {
    x: Vec<f64>,
    cost: f64,
    converged: bool,
    iterations: usize,
    evaluations: usize,
}

impl NelderMead {
    fn run_once(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        config: &Config,
    ) -> Result<Run, Error> {
        let simplex = initial_simplex(&x0, config.initial_step);
        let solver = ArgminNelderMead::new(simplex)
            .with_sd_tolerance(config.tolerance)
            .map_err(|e| Error::SolverFailure(e.into()))?;
        let problem = Objective {
            f: RefCell::new(objective),
        };
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(config.max_iterations))
            .run()
            .map_err(|e| Error::SolverFailure(e.into()))?;

        let state = result.state();
        let Some(x) = state.get_best_param().cloned() else {
            return Err(Error::SolverFailure(
                "Nelder-Mead finished without a best point".into(),
            ));
        };
        let converged = matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let evaluations = state
            .get_func_counts()
            .get("cost_count")
            .copied()
            .unwrap_or_default();
        Ok(Run {
            x,
            cost: state.get_best_cost(),
            converged,
            iterations: state.get_iter() as usize,
            evaluations: evaluations as usize,
        })
    }
}

impl Minimizer for NelderMead {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: Vec<f64>,
        config: &Config,
    ) -> Result<Minimum, Error> {
        if x0.is_empty() {
            let error = objective(&x0);
            return Ok(Minimum {
                x: x0,
                success: true,
                iterations: 0,
                evaluations: 1,
                error,
            });
        }

        keep_best(x0, config, |x| self.run_once(&mut *objective, x, config))
    }
}

/// Run the minimizer up to `1 + config.restarts` times, each run starting
/// from the best point so far. `success` describes the run which found the
/// returned point.
fn keep_best(
    x0: Vec<f64>,
    config: &Config,
    mut run_from: impl FnMut(Vec<f64>) -> Result<Run, Error>,
) -> Result<Minimum, Error> {
    let mut best = Minimum {
        x: x0,
        success: false,
        iterations: 0,
        evaluations: 0,
        error: f64::INFINITY,
    };
    for run_number in 0..=config.restarts {
        let run = run_from(best.x.clone())?;
        best.iterations += run.iterations;
        best.evaluations += run.evaluations;
        tracing::trace!(
            run_number,
            cost = run.cost,
            converged = run.converged,
            "Nelder-Mead run finished"
        );
        let improved = best.error - run.cost > config.tolerance;
        if run.cost <= best.error {
            best.x = run.x;
            best.error = run.cost;
            best.success = run.converged;
        }
        // A converged run that restarts can't improve on is done.
        if run.converged && !improved {
            break;
        }
    }
    Ok(best)
}

/// The starting point, plus one vertex per dimension nudged along that axis.
fn initial_simplex(x0: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] = if vertex[i] == 0.0 {
            ZERO_COORDINATE_STEP
        } else {
            vertex[i] * (1.0 + step)
        };
        simplex.push(vertex);
    }
    simplex
}

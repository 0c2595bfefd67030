use crate::{Warning, id::ParamId};

/// Data from a solve which ran to completion, converged or not.
#[derive(Debug)]
#[non_exhaustive]
pub struct SolveOutcome {
    /// Which parameters were free, in the order the minimizer saw them.
    pub(crate) parameters: Vec<ParamId>,
    /// Each free parameter's final value, in the same order as `parameters`.
    pub(crate) final_values: Vec<f64>,
    /// Did the minimizer report convergence?
    pub(crate) success: bool,
    /// How many iterations the minimizer ran.
    pub(crate) iterations: usize,
    /// How many times the minimizer evaluated the total error.
    pub(crate) evaluations: usize,
    /// Total constraint error after writing back the final values.
    pub(crate) error: f64,
    /// Anything that went wrong either in problem definition or during solving it.
    pub(crate) warnings: Vec<Warning>,
}

impl SolveOutcome {
    /// Which parameters were free, in the order the minimizer saw them.
    pub fn parameters(&self) -> &[ParamId] {
        &self.parameters
    }

    /// Each free parameter's final value, in the same order as [`Self::parameters`].
    pub fn final_values(&self) -> &[f64] {
        &self.final_values
    }

    /// Look up the solved value of one free parameter.
    /// None if that parameter wasn't free during the solve.
    pub fn final_value(&self, param: ParamId) -> Option<f64> {
        self.parameters
            .iter()
            .position(|p| *p == param)
            .map(|i| self.final_values[i])
    }

    /// Did the minimizer report convergence?
    /// Even if not, the best values it found were written back.
    pub fn success(&self) -> bool {
        self.success
    }

    /// How many iterations the minimizer ran.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// How many times the minimizer evaluated the total error.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Total constraint error after writing back the final values.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Anything that went wrong either in problem definition or during solving it.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

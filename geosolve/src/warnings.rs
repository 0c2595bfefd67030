use crate::Constraint;

/// Something that might be wrong with a problem, but didn't stop it being solved.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Warning {
    /// Index of the constraint this is about, in the order constraints were added.
    pub about_constraint: Option<usize>,
    /// What's wrong.
    pub content: WarningContent,
}

/// Each kind of warning.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub enum WarningContent {
    /// The minimizer stopped before it converged.
    /// The best values it found were still written back.
    DidNotConverge {
        /// Iterations the minimizer ran for.
        iterations: usize,
        /// Total constraint error at the best values found.
        error: f64,
    },
    /// An angle constraint targets zero degrees. Its error divides by the
    /// target, so it's undefined there.
    ZeroAngleTarget,
    /// Every parameter is fixed, so there was nothing to minimize.
    NoFreeParameters,
}

/// Check constraints for problems which can be spotted before solving.
pub fn lint<'a>(constraints: impl IntoIterator<Item = &'a Constraint>) -> Vec<Warning> {
    let mut warnings = Vec::default();
    for (i, constraint) in constraints.into_iter().enumerate() {
        match constraint {
            Constraint::LineAngle(_, _, target) if *target == 0.0 => {
                warnings.push(Warning {
                    about_constraint: Some(i),
                    content: WarningContent::ZeroAngleTarget,
                });
            }
            _ => {}
        }
    }
    warnings
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::DidNotConverge { iterations, error } => write!(
                f,
                "The minimizer did not converge after {iterations} iterations. Best total error was {error}. Try raising the iteration limit or loosening the tolerance."
            ),
            WarningContent::ZeroAngleTarget => write!(
                f,
                "This angle constraint targets 0 degrees, where its error is undefined. Try a small nonzero angle instead."
            ),
            WarningContent::NoFreeParameters => {
                write!(f, "Every parameter is fixed, so there was nothing to solve")
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.about_constraint {
            Some(i) => write!(f, "Constraint {i}: {}", self.content),
            None => write!(f, "{}", self.content),
        }
    }
}

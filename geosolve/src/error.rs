use crate::{datatypes::Invalid, id::PointId};

/// Errors from building or solving a [`crate::Problem`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Parameters must always hold a finite number.
    #[error("Parameter values must be finite, but got {value}")]
    InvalidValue {
        /// The rejected value.
        value: f64,
    },
    /// A constraint was given an argument it can't use, e.g. a negative length.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),
    /// Names are unique across every primitive and point in a problem.
    #[error("The name {0} is already taken")]
    DuplicateName(String),
    /// Nothing in the problem has this name.
    #[error("Nothing named {0} was found")]
    NotFound(String),
    /// This point handle doesn't belong to the problem it was used with.
    #[error("{0} does not belong to this problem")]
    UnknownPoint(PointId),
    /// Point handles are `u32`, so a problem can't hold any more points.
    #[error("Too many points for one problem")]
    TooManyPoints,
    /// The name refers to something, but it isn't a line.
    #[error("{0} is not a line")]
    NotALine(String),
    /// The name refers to something, but it isn't a point.
    #[error("{0} is not a point")]
    NotAPoint(String),
    /// Some primitives can't be solved. Every one of them is listed.
    #[error("Invalid geometry: {}", list_invalid(.0))]
    InvalidGeometry(Vec<Invalid>),
    /// The minimizer gave up with an error instead of returning a result.
    /// Parameters were rolled back to their pre-solve values.
    #[error("Minimizer failed: {0}")]
    SolverFailure(Box<dyn std::error::Error + Send + Sync>),
    /// Could not read a sketch in the textual format.
    #[error(transparent)]
    Textual(#[from] TextualError),
}

fn list_invalid(invalid: &[Invalid]) -> String {
    invalid
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from parsing geosolve's textual sketch format.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TextualError {
    /// A line couldn't be parsed.
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// A required section header (e.g. `# geometry`) was missing or out of order.
    #[error("Expected a `# {header}` header")]
    MissingHeader {
        /// The header which was expected.
        header: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::InvalidReason;

    #[test]
    fn messages() {
        let err = Error::InvalidGeometry(vec![
            Invalid {
                primitive: "a".to_owned(),
                reason: InvalidReason::ZeroLength,
            },
            Invalid {
                primitive: "b".to_owned(),
                reason: InvalidReason::ZeroLength,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid geometry: a (zero length), b (zero length)"
        );
        let err = Error::SolverFailure("out of memory".into());
        assert_eq!(err.to_string(), "Minimizer failed: out of memory");
        let err: Error = TextualError::Parse {
            line: 3,
            message: "expected a number".to_owned(),
        }
        .into();
        assert_eq!(err.to_string(), "Line 3: expected a number");
    }
}

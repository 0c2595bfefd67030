//! Geometric constraint solver for 2D sketches.
//!
//! Describe a sketch as named points and lines, constrain their lengths,
//! angles and distances, then [`Problem::solve`] moves every free coordinate
//! to minimize the total constraint error.
//!
//! ```
//! use geosolve::{Config, Problem};
//!
//! let mut problem = Problem::new();
//! problem.add_line("base", (0.0, 0.0), (2.0, 0.0))?;
//! let corner = problem.line("base")?.end().id();
//! problem.add_line("side", corner, (2.5, 1.5))?;
//! problem.constrain_position("base")?;
//! problem.constrain_line_length("side", 1.0)?;
//! problem.constrain_angle_between_lines("base", "side", -90.0)?;
//!
//! let outcome = problem.solve(Config::default())?;
//! assert!(outcome.error() < 1e-6);
//! # Ok::<(), geosolve::Error>(())
//! ```

pub use crate::constraints::Constraint;
pub use crate::datatypes::{
    Endpoint, Invalid, InvalidReason, Line, LineRef, Point, PointArena, PointRef, Primitive,
    PrimitiveRef,
};
pub use crate::error::{Error, TextualError};
pub use crate::id::{ParamId, PointId};
pub use crate::parameter::{Component, Parameter};
pub use crate::problem::Problem;
pub use crate::solve_outcome::SolveOutcome;
pub use crate::solver::{Config, Minimizer, Minimum, NelderMead};
pub use crate::warnings::{Warning, WarningContent};

/// Normalizing angles into (-180, 180] degrees.
pub mod angle;
/// Each kind of constraint we support.
mod constraints;
/// Geometric data (lines, points, etc).
mod datatypes;
mod error;
/// Handles for points and their parameters.
mod id;
mod parameter;
mod problem;
mod solve_outcome;
/// Minimizers which can drive a solve.
mod solver;
/// Unit tests
#[cfg(test)]
mod tests;
/// Parser for a textual representation of sketches.
pub mod textual;
mod vector;
mod warnings;

/// Lines shorter than this are treated as zero-length.
const EPSILON: f64 = 1e-8;

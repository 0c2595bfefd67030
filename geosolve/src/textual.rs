//! A plain-text format for sketches.
//!
//! ```text
//! # geometry
//! point p (0, 0)
//! line a (0, 0) (30, 0)
//! line b a.end (30, 31)
//!
//! # constraints
//! fixed(a)
//! length(b) = 30
//! angle(a, b) = -90
//! distance(p, b.end) = 12
//! ```
//!
//! Line endpoints are either coordinates or the name of an existing point,
//! including the implicit `<line>.start` and `<line>.end` points.
//! Blank lines and `//` comments are ignored.

mod executor;
mod instruction;
mod parser;

use std::str::FromStr;

pub use instruction::{
    Angle, DeclareLine, DeclarePoint, Distance, EndpointSpec, Instruction, Length,
};

use crate::TextualError;

/// A parsed sketch, ready to be turned into a [`crate::Problem`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    instructions: Vec<Instruction>,
}

impl Sketch {
    /// Everything the sketch declares, in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl FromStr for Sketch {
    type Err = TextualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_sketch(s).map(|instructions| Self { instructions })
    }
}

/// Name of a primitive or point in a sketch.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct Label(String);

impl Label {
    /// The name as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        &self.0 == other
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

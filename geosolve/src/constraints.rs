use indexmap::IndexSet;

use crate::{
    Error,
    angle::normalize_degrees,
    datatypes::{Line, PointArena, Primitive},
    id::{ParamId, PointId},
};

/// Each geometric constraint we support.
/// Build these through `Problem::constrain_*`, which validates the targets.
///
/// Each constraint's error is non-negative and is zero exactly when the
/// geometry satisfies it. The problem's objective is the plain sum of these
/// errors, so each kind's error scale sets its weight relative to the others.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constraint {
    /// This line should have the given length.
    /// Error is the squared difference.
    LineLength(Line, f64),
    /// The signed angle from the first line's direction to the second's should
    /// be this many degrees. Error is the squared difference relative to the target,
    /// which is undefined for a target of zero.
    LineAngle(Line, Line, f64),
    /// These two points should be a given distance apart.
    /// Error is the absolute (not squared) difference.
    PointDistance(PointId, PointId, f64),
}

impl Constraint {
    /// Constrain a line's length. The length can't be negative.
    pub fn line_length(line: Line, length: f64) -> Result<Self, Error> {
        if !(length >= 0.0) || length.is_infinite() {
            return Err(Error::InvalidConstraint(format!(
                "line length must be finite and >= 0, but was {length}"
            )));
        }
        Ok(Self::LineLength(line, length))
    }

    /// Constrain the angle from one line to another.
    /// The angle is in degrees and gets normalized into (-180, 180].
    pub fn line_angle(a: Line, b: Line, degrees: f64) -> Result<Self, Error> {
        if !degrees.is_finite() {
            return Err(Error::InvalidConstraint(format!(
                "angle must be finite, but was {degrees}"
            )));
        }
        Ok(Self::LineAngle(a, b, normalize_degrees(degrees)))
    }

    /// Constrain the distance between two points. The distance can't be negative.
    pub fn point_distance(a: PointId, b: PointId, distance: f64) -> Result<Self, Error> {
        if !(distance >= 0.0) || distance.is_infinite() {
            return Err(Error::InvalidConstraint(format!(
                "distance must be finite and >= 0, but was {distance}"
            )));
        }
        Ok(Self::PointDistance(a, b, distance))
    }

    /// Short name for this kind of constraint.
    pub fn constraint_kind(&self) -> &'static str {
        match self {
            Constraint::LineLength(..) => "LineLength",
            Constraint::LineAngle(..) => "LineAngle",
            Constraint::PointDistance(..) => "PointDistance",
        }
    }

    /// The value this constraint wants `value()` to reach.
    pub fn target(&self) -> f64 {
        match self {
            Constraint::LineLength(_, length) => *length,
            Constraint::LineAngle(_, _, angle) => *angle,
            Constraint::PointDistance(_, _, distance) => *distance,
        }
    }

    /// The primitives this constraint refers to, in order.
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            Constraint::LineLength(line, _) => vec![Primitive::Line(*line)],
            Constraint::LineAngle(a, b, _) => vec![Primitive::Line(*a), Primitive::Line(*b)],
            Constraint::PointDistance(a, b, _) => {
                vec![Primitive::Point(*a), Primitive::Point(*b)]
            }
        }
    }

    /// Every point of every referenced primitive, concatenated.
    /// May repeat a point when the primitives share it.
    pub fn points(&self) -> Vec<PointId> {
        self.primitives()
            .iter()
            .flat_map(|primitive| primitive.points().iter().copied())
            .collect()
    }

    /// Every parameter this constraint depends on, each once, in first-seen order.
    pub fn params(&self) -> IndexSet<ParamId> {
        self.points().into_iter().flat_map(ParamId::both).collect()
    }

    /// The quantity this constraint measures, given the current geometry.
    /// NaN for an angle involving a zero-length line.
    pub fn value(&self, points: &PointArena) -> f64 {
        match self {
            Constraint::LineLength(line, _) => line.length(points),
            Constraint::LineAngle(a, b, _) => a.angle_to(b, points),
            Constraint::PointDistance(a, b, _) => {
                points.position(*a).euclidean_distance(points.position(*b))
            }
        }
    }

    /// How far the current geometry is from satisfying this constraint.
    /// Never negative, but may be NaN or infinite for degenerate input
    /// (zero-length lines, or an angle target of zero).
    pub fn error(&self, points: &PointArena) -> f64 {
        let value = self.value(points);
        match self {
            Constraint::LineLength(_, target) => (value - target).powi(2),
            Constraint::LineAngle(_, _, target) => ((value - target) / target).powi(2),
            Constraint::PointDistance(_, _, target) => (value - target).abs(),
        }
    }
}

use super::Label;

/// One line of a sketch.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `point p (0, 0)`
    DeclarePoint(DeclarePoint),
    /// `line l (0, 0) p`
    DeclareLine(DeclareLine),
    /// `fixed(l)`
    Fixed(Label),
    /// `length(l) = 3`
    Length(Length),
    /// `angle(a, b) = -90`
    Angle(Angle),
    /// `distance(p, q) = 5`
    Distance(Distance),
}

/// Where a declared line's endpoint is.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointSpec {
    /// New coordinates.
    At(f64, f64),
    /// An existing point, by name.
    Named(Label),
}

/// Declares a standalone point.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarePoint {
    /// Name of the new point.
    pub label: Label,
    /// Initial X.
    pub x: f64,
    /// Initial Y.
    pub y: f64,
}

/// Declares a line.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareLine {
    /// Name of the new line.
    pub label: Label,
    /// Where it starts.
    pub start: EndpointSpec,
    /// Where it ends.
    pub end: EndpointSpec,
}

/// Constrains a line's length.
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    /// The line.
    pub line: Label,
    /// Its target length.
    pub length: f64,
}

/// Constrains the angle from one line to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Angle {
    /// Angle is measured from this line's direction...
    pub line0: Label,
    /// ...to this line's.
    pub line1: Label,
    /// Target angle in degrees.
    pub degrees: f64,
}

/// Constrains the distance between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    /// One point.
    pub point0: Label,
    /// The other point.
    pub point1: Label,
    /// Target distance.
    pub distance: f64,
}

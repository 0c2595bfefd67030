//! Geometric entities that can be constrained and solved by geosolve.
//!
//! Points live in a [`PointArena`] owned by the problem. Primitives refer to
//! them by [`PointId`], so two lines can share an endpoint and both see the
//! solver move it.

use indexmap::IndexMap;

use crate::{
    Error,
    angle::{angle_between_degrees, direction_degrees},
    id::{ParamId, PointId},
    parameter::{Component, Parameter},
    vector::V,
};

/// A 2D point with a unique name and two solver parameters.
#[derive(Clone, Debug)]
pub struct Point {
    name: String,
    x: Parameter,
    y: Parameter,
}

impl Point {
    pub(crate) fn new(name: String, x: f64, y: f64) -> Result<Self, Error> {
        Ok(Self {
            name,
            x: Parameter::new(x)?,
            y: Parameter::new(y)?,
        })
    }

    /// Name of the point, unique within its problem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The X parameter.
    pub fn x(&self) -> &Parameter {
        &self.x
    }

    /// The Y parameter.
    pub fn y(&self) -> &Parameter {
        &self.y
    }

    /// Current (x, y) values.
    pub fn coords(&self) -> (f64, f64) {
        (self.x.value(), self.y.value())
    }

    /// Look up a parameter by component.
    pub fn param(&self, component: Component) -> &Parameter {
        match component {
            Component::X => &self.x,
            Component::Y => &self.y,
        }
    }

    pub(crate) fn param_mut(&mut self, component: Component) -> &mut Parameter {
        match component {
            Component::X => &mut self.x,
            Component::Y => &mut self.y,
        }
    }

    /// True iff both parameters are fixed.
    pub fn is_fixed(&self) -> bool {
        self.x.is_fixed() && self.y.is_fixed()
    }

    #[inline(always)]
    pub(crate) fn position(&self) -> V {
        V::new(self.x.value(), self.y.value())
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Point({}, ({}, {}))",
            self.name,
            self.x.value(),
            self.y.value()
        )
    }
}

/// Owns every point in a problem, indexed by [`PointId`] and by name.
/// Points are never removed, so IDs stay valid for the arena's lifetime.
#[derive(Clone, Debug, Default)]
pub struct PointArena {
    points: IndexMap<String, Point>,
}

impl PointArena {
    /// How many points are stored?
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Are there no points at all?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Does this ID refer to a point in this arena?
    pub fn contains(&self, id: PointId) -> bool {
        id.index() < self.points.len()
    }

    /// Look up a point by ID.
    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get_index(id.index()).map(|(_name, point)| point)
    }

    pub(crate) fn get_mut(&mut self, id: PointId) -> Option<&mut Point> {
        self.points
            .get_index_mut(id.index())
            .map(|(_name, point)| point)
    }

    /// Find a point's ID from its name.
    pub fn id_of(&self, name: &str) -> Option<PointId> {
        self.points.get_index_of(name).and_then(point_id_for_index)
    }

    /// Iterate over all points, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &Point)> {
        self.points
            .values()
            .enumerate()
            .filter_map(|(i, point)| Some((point_id_for_index(i)?, point)))
    }

    /// Look up a single parameter.
    pub fn param(&self, id: ParamId) -> Option<&Parameter> {
        self.get(id.point).map(|point| point.param(id.component))
    }

    pub(crate) fn param_mut(&mut self, id: ParamId) -> Option<&mut Parameter> {
        self.get_mut(id.point)
            .map(|point| point.param_mut(id.component))
    }

    /// Is this name already taken by some point?
    pub(crate) fn is_taken(&self, name: &str) -> bool {
        self.points.contains_key(name)
    }

    /// Store a new point. Fails if the name is taken.
    pub(crate) fn insert(&mut self, point: Point) -> Result<PointId, Error> {
        if self.is_taken(&point.name) {
            return Err(Error::DuplicateName(point.name));
        }
        let id = point_id_for_index(self.points.len()).ok_or(Error::TooManyPoints)?;
        self.points.insert(point.name.clone(), point);
        Ok(id)
    }

    /// Position of a point known to be in this arena.
    #[inline(always)]
    pub(crate) fn position(&self, id: PointId) -> V {
        self[id].position()
    }
}

impl std::ops::Index<PointId> for PointArena {
    type Output = Point;

    fn index(&self, id: PointId) -> &Self::Output {
        &self.points[id.index()]
    }
}

fn point_id_for_index(i: usize) -> Option<PointId> {
    u32::try_from(i).ok().map(PointId)
}

/// Finite segment of a line, from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    points: [PointId; 2],
}

impl Line {
    /// Create a new `Line`.
    pub fn new(start: PointId, end: PointId) -> Self {
        Self {
            points: [start, end],
        }
    }

    /// Point at the start of the line.
    pub fn start(&self) -> PointId {
        self.points[0]
    }

    /// Point at the end of the line.
    pub fn end(&self) -> PointId {
        self.points[1]
    }

    /// Both points, start first.
    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    /// Vector from start to end.
    pub(crate) fn vector(&self, points: &PointArena) -> V {
        points.position(self.end()) - points.position(self.start())
    }

    pub(crate) fn length(&self, points: &PointArena) -> f64 {
        self.vector(points).magnitude()
    }

    pub(crate) fn angle(&self, points: &PointArena) -> f64 {
        direction_degrees(self.vector(points))
    }

    pub(crate) fn angle_to(&self, other: &Line, points: &PointArena) -> f64 {
        angle_between_degrees(self.vector(points), other.vector(points))
    }

    pub(crate) fn validate(&self, name: &str, points: &PointArena) -> Result<(), Invalid> {
        if self.length(points) < crate::EPSILON {
            return Err(Invalid {
                primitive: name.to_owned(),
                reason: InvalidReason::ZeroLength,
            });
        }
        Ok(())
    }
}

/// Each kind of primitive geometry we support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// A lone point.
    Point(PointId),
    /// A line segment between two points.
    Line(Line),
}

impl Primitive {
    /// Every point making up this primitive. A point primitive is made of itself.
    pub fn points(&self) -> &[PointId] {
        match self {
            Primitive::Point(id) => std::slice::from_ref(id),
            Primitive::Line(line) => line.points(),
        }
    }

    /// Human-readable name of this kind of primitive.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Point(_) => "point",
            Primitive::Line(_) => "line",
        }
    }
}

/// Where a new line's endpoint should be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    /// A brand new point at these coordinates.
    At(f64, f64),
    /// An existing point, shared with whatever else uses it.
    Shared(PointId),
}

impl From<(f64, f64)> for Endpoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::At(x, y)
    }
}

impl From<PointId> for Endpoint {
    fn from(id: PointId) -> Self {
        Self::Shared(id)
    }
}

/// A primitive which can't be solved, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invalid {
    /// Name of the offending primitive.
    pub primitive: String,
    /// What's wrong with it.
    pub reason: InvalidReason,
}

/// Why a primitive is invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidReason {
    /// Start and end of a line coincide, so its direction is undefined.
    ZeroLength,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::ZeroLength => write!(f, "zero length"),
        }
    }
}

impl std::fmt::Display for Invalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.primitive, self.reason)
    }
}

/// Read-only view of a point in a problem.
#[derive(Clone, Copy, Debug)]
pub struct PointRef<'p> {
    id: PointId,
    point: &'p Point,
}

impl<'p> PointRef<'p> {
    pub(crate) fn new(id: PointId, points: &'p PointArena) -> Self {
        Self {
            id,
            point: &points[id],
        }
    }

    /// Handle to this point, e.g. for sharing it as another line's endpoint.
    pub fn id(&self) -> PointId {
        self.id
    }

    /// Name of the point.
    pub fn name(&self) -> &'p str {
        self.point.name()
    }

    /// Current X value.
    pub fn x(&self) -> f64 {
        self.point.x().value()
    }

    /// Current Y value.
    pub fn y(&self) -> f64 {
        self.point.y().value()
    }

    /// Current (x, y) values.
    pub fn coords(&self) -> (f64, f64) {
        self.point.coords()
    }

    /// Are both coordinates' own fixed flags set?
    /// Doesn't know about [`crate::Problem::constrain_position`].
    pub fn is_fixed(&self) -> bool {
        self.point.is_fixed()
    }

    /// The underlying point.
    pub fn point(&self) -> &'p Point {
        self.point
    }
}

/// Read-only view of a line in a problem, for reading back its geometry.
#[derive(Clone, Copy, Debug)]
pub struct LineRef<'p> {
    name: &'p str,
    line: Line,
    points: &'p PointArena,
}

impl<'p> LineRef<'p> {
    pub(crate) fn new(name: &'p str, line: Line, points: &'p PointArena) -> Self {
        Self { name, line, points }
    }

    /// Name of the line.
    pub fn name(&self) -> &'p str {
        self.name
    }

    /// The line's handles.
    pub fn line(&self) -> Line {
        self.line
    }

    /// Point at the start of the line.
    pub fn start(&self) -> PointRef<'p> {
        PointRef::new(self.line.start(), self.points)
    }

    /// Point at the end of the line.
    pub fn end(&self) -> PointRef<'p> {
        PointRef::new(self.line.end(), self.points)
    }

    /// `end.x - start.x`
    pub fn dx(&self) -> f64 {
        self.line.vector(self.points).x
    }

    /// `end.y - start.y`
    pub fn dy(&self) -> f64 {
        self.line.vector(self.points).y
    }

    /// Euclidean length. Never negative.
    pub fn length(&self) -> f64 {
        self.line.length(self.points)
    }

    /// Direction from start to end in degrees, in (-180, 180],
    /// measured as `atan2(dx, dy)`.
    pub fn angle(&self) -> f64 {
        self.line.angle(self.points)
    }

    /// Signed angle in degrees, in (-180, 180], from this line's direction to
    /// the other's. NaN if either line has zero length.
    pub fn angle_to(&self, other: &LineRef<'_>) -> f64 {
        // Only the coordinates matter, so lines from different arenas compare fine.
        angle_between_degrees(
            self.line.vector(self.points),
            other.line.vector(other.points),
        )
    }

    /// Are all the line's parameters fixed?
    pub fn is_fixed(&self) -> bool {
        self.start().is_fixed() && self.end().is_fixed()
    }

    /// Lines of zero length are invalid.
    pub fn validate(&self) -> Result<(), Invalid> {
        self.line.validate(self.name, self.points)
    }
}

impl std::fmt::Display for LineRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Line({}, [{}, {}])",
            self.name,
            self.start().point(),
            self.end().point()
        )
    }
}

/// Read-only view of any primitive in a problem.
#[derive(Clone, Copy, Debug)]
pub enum PrimitiveRef<'p> {
    /// A registered point.
    Point(PointRef<'p>),
    /// A registered line.
    Line(LineRef<'p>),
}

impl<'p> PrimitiveRef<'p> {
    pub(crate) fn new(name: &'p str, primitive: Primitive, points: &'p PointArena) -> Self {
        match primitive {
            Primitive::Point(id) => PrimitiveRef::Point(PointRef::new(id, points)),
            Primitive::Line(line) => PrimitiveRef::Line(LineRef::new(name, line, points)),
        }
    }

    /// Name this primitive was registered under.
    pub fn name(&self) -> &'p str {
        match self {
            PrimitiveRef::Point(point) => point.name(),
            PrimitiveRef::Line(line) => line.name(),
        }
    }

    /// All the points making up this primitive.
    pub fn points(&self) -> Vec<PointRef<'p>> {
        match self {
            PrimitiveRef::Point(point) => vec![*point],
            PrimitiveRef::Line(line) => vec![line.start(), line.end()],
        }
    }

    /// True iff every parameter of every point is fixed.
    pub fn is_fixed(&self) -> bool {
        match self {
            PrimitiveRef::Point(point) => point.is_fixed(),
            PrimitiveRef::Line(line) => line.is_fixed(),
        }
    }

    /// Check this primitive can be solved.
    pub fn validate(&self) -> Result<(), Invalid> {
        match self {
            PrimitiveRef::Point(_) => Ok(()),
            PrimitiveRef::Line(line) => line.validate(),
        }
    }

    /// This primitive, if it's a line.
    pub fn as_line(&self) -> Option<LineRef<'p>> {
        match self {
            PrimitiveRef::Line(line) => Some(*line),
            PrimitiveRef::Point(_) => None,
        }
    }

    /// This primitive, if it's a point.
    pub fn as_point(&self) -> Option<PointRef<'p>> {
        match self {
            PrimitiveRef::Point(point) => Some(*point),
            PrimitiveRef::Line(_) => None,
        }
    }
}

impl std::fmt::Display for PrimitiveRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveRef::Point(point) => write!(f, "{}", point.point()),
            PrimitiveRef::Line(line) => write!(f, "{line}"),
        }
    }
}

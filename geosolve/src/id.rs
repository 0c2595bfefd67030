use crate::parameter::Component;

/// Handle to a point stored in a [`crate::Problem`].
/// Lines which share an endpoint hold the same `PointId`, so they mutate
/// the same parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub(crate) u32);

impl PointId {
    /// Position of this point in its problem's point arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "point#{}", self.0)
    }
}

/// Identity of a single scalar parameter: one component of one point.
/// Two `ParamId`s are equal iff they name the same storage, regardless of the
/// values stored there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId {
    /// The point which owns this parameter.
    pub point: PointId,
    /// Which of the point's two coordinates.
    pub component: Component,
}

impl ParamId {
    /// The X parameter of this point.
    pub fn x(point: PointId) -> Self {
        Self {
            point,
            component: Component::X,
        }
    }

    /// The Y parameter of this point.
    pub fn y(point: PointId) -> Self {
        Self {
            point,
            component: Component::Y,
        }
    }

    /// Both parameters of this point, X first.
    pub fn both(point: PointId) -> [Self; 2] {
        [Self::x(point), Self::y(point)]
    }
}

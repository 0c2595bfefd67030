//! Angles, in degrees.

use crate::vector::V;

/// Map an angle in degrees into the half-open interval (-180, 180].
/// NaN stays NaN.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid lands on -180 for odd multiples of 180, which belongs at the other end.
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Direction of the vector, measured by `atan2(dx, dy)`, in degrees.
pub(crate) fn direction_degrees(v: V) -> f64 {
    normalize_degrees(libm::atan2(v.x, v.y).to_degrees())
}

/// Signed angle from direction A to direction B, in degrees.
/// Undefined (NaN) if either direction has zero length.
pub(crate) fn angle_between_degrees(a: V, b: V) -> f64 {
    if a.magnitude() < crate::EPSILON || b.magnitude() < crate::EPSILON {
        return f64::NAN;
    }
    let dot = a.dot(&b);
    // dy_a * dx_b - dx_a * dy_b
    let det = b.cross_2d(&a);
    normalize_degrees(libm::atan2(det, dot).to_degrees())
}

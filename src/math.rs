//! Small vector and angle helpers shared by the rest of the crate.

use core::f64::consts::{PI, TAU};

use glam::{DQuat, DVec3};

/// Get the hyperbolic sine and cosine of a number.
///
/// Usually faster than calling `x.sinh()` and `x.cosh()` separately.
///
/// Returns a tuple which contains:
/// - 0: The hyperbolic sine of the number.
/// - 1: The hyperbolic cosine of the number.
pub fn sinhcosh(x: f64) -> (f64, f64) {
    let e_x = x.exp();
    let e_neg_x = (-x).exp();

    ((e_x - e_neg_x) * 0.5, (e_x + e_neg_x) * 0.5)
}

/// Wraps an angle into the range [-π, π).
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Gets the rotation that takes `normal` onto the +Z axis.
///
/// Applying it to any vector within the plane perpendicular to `normal`
/// lands that vector in the XY plane. The inverse of the returned
/// quaternion takes the XY plane back into the original frame.
///
/// # Unchecked Operation
/// `normal` must be finite and non-zero.
pub fn plane_alignment(normal: DVec3) -> DQuat {
    DQuat::from_rotation_arc(normal.normalize(), DVec3::Z)
}

/// Gravitational acceleration felt at `offset` away from a point mass
/// with gravitational parameter `mu`, pointing towards the mass.
///
/// `offset` is the position of the attracting mass minus the position of
/// the attracted one.
#[inline]
pub fn point_mass_acceleration(mu: f64, offset: DVec3) -> DVec3 {
    let distance_squared = offset.length_squared();

    offset * (mu / (distance_squared * distance_squared.sqrt()))
}

/// Whether every component of the vector is finite.
#[inline]
pub(crate) fn is_finite_vec(vec: DVec3) -> bool {
    vec.x.is_finite() && vec.y.is_finite() && vec.z.is_finite()
}

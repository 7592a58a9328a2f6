//! Ground-plane helpers shared by target synthesis and the PD controller.

use glam::{Affine3A, Quat, Vec3};

use crate::errors::{Result, StrideError};

/// World "up" axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// World "forward" axis; also the local forward of bodies and motion tracks.
pub const WORLD_FORWARD: Vec3 = Vec3::Z;

const DEGENERATE_LENGTH: f32 = 1e-6;
const DEGENERATE_DETERMINANT: f32 = 1e-8;

/// Removes the component of `v` along `normal` (assumed unit length).
#[inline]
#[must_use]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Forward vector of `rotation`, flattened onto the plane orthogonal to `up`
/// and renormalized. Falls back to [`WORLD_FORWARD`] when the forward vector
/// points along `up`.
#[must_use]
pub fn forward_on_plane(rotation: Quat, up: Vec3) -> Vec3 {
    let forward = project_on_plane(rotation * WORLD_FORWARD, up);
    let length = forward.length();
    if length > DEGENERATE_LENGTH {
        forward / length
    } else {
        WORLD_FORWARD
    }
}

/// Signed angle about `up` turning `from` into `to`, in `(-π, π]`.
///
/// Uses `atan2(sin, cos)` so that the sign stays correct near ±180°, where a
/// plain dot product cannot tell left from right.
#[must_use]
pub fn signed_yaw(from: Vec3, to: Vec3, up: Vec3) -> f32 {
    let cos = from.dot(to).clamp(-1.0, 1.0);
    let sin = from.cross(to).dot(up);
    sin.atan2(cos)
}

/// Rescales `v` uniformly so its length does not exceed `max_length`.
#[must_use]
pub fn clamp_magnitude(v: Vec3, max_length: f32) -> Vec3 {
    let length_squared = v.length_squared();
    if length_squared > max_length * max_length && length_squared > 0.0 {
        v * (max_length / length_squared.sqrt())
    } else {
        v
    }
}

/// Splits a rigid transform into rotation and translation, ignoring scale.
#[must_use]
pub fn rotation_translation(transform: &Affine3A) -> (Quat, Vec3) {
    let (_scale, rotation, translation) = transform.to_scale_rotation_translation();
    (rotation.normalize(), translation)
}

/// Interpolates from identity towards `transform` by `weight`
/// (translation lerp, rotation slerp, unit scale).
#[must_use]
pub fn interpolate_from_identity(transform: &Affine3A, weight: f32) -> Affine3A {
    if weight >= 1.0 {
        return *transform;
    }
    let (rotation, translation) = rotation_translation(transform);
    Affine3A::from_rotation_translation(
        Quat::IDENTITY.slerp(rotation, weight),
        Vec3::ZERO.lerp(translation, weight),
    )
}

/// Inverts `transform`, failing on a (near-)singular linear part.
pub fn try_inverse(transform: &Affine3A, context: &'static str) -> Result<Affine3A> {
    let determinant = transform.matrix3.determinant();
    if !determinant.is_finite() || determinant.abs() < DEGENERATE_DETERMINANT {
        return Err(StrideError::NonInvertibleTransform { context });
    }
    Ok(transform.inverse())
}

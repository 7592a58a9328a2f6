//! Locomotion Target Synthesis
//!
//! # Overview
//!
//! Turns this tick's root-motion deltas into world-space goals for the PD
//! controller. Each delta is rotated into the world by the body's current
//! orientation, flattened onto the ground plane and reduced to a yaw change.
//! Several active tracks are averaged by their count.
//!
//! Targets are always relative to the body's *current* physical pose, read
//! fresh from the simulation, so the character follows the animation without
//! accumulating drift between the visual and the physical state.

use glam::{Quat, Vec3};

use crate::animation::MotionDelta;
use crate::math::{forward_on_plane, project_on_plane, signed_yaw};
use crate::physics::world::{BodyPose, PhysicsBody};

/// Per-tick goal of a dynamic body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionTarget {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Default for LocomotionTarget {
    fn default() -> Self {
        Self::hold(BodyPose::new(Vec3::ZERO, Quat::IDENTITY))
    }
}

impl LocomotionTarget {
    /// Stay at `pose` with zero velocity.
    #[must_use]
    pub fn hold(pose: BodyPose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Target yaw rate about `up`, in radians per second.
    #[inline]
    #[must_use]
    pub fn yaw_rate(&self, up: Vec3) -> f32 {
        self.angular_velocity.dot(up)
    }
}

/// Ground-plane displacement and yaw of one delta, seen from `rotation`.
fn planar_motion(delta: &MotionDelta, rotation: Quat, up: Vec3) -> (Vec3, f32) {
    let displacement = project_on_plane(rotation * delta.translation(), up);

    let forward_before = forward_on_plane(rotation, up);
    let forward_after = forward_on_plane(rotation * delta.rotation(), up);
    let yaw = signed_yaw(forward_before, forward_after, up);

    (displacement, yaw)
}

/// Builds the target of this tick from the body's current `pose`.
///
/// Without deltas (or with a non-positive `dt`) the body is asked to hold
/// its pose.
#[must_use]
pub fn synthesize_target(pose: BodyPose, deltas: &[MotionDelta], up: Vec3, dt: f32) -> LocomotionTarget {
    if deltas.is_empty() || dt <= 0.0 {
        return LocomotionTarget::hold(pose);
    }

    let (displacement_sum, yaw_sum) = deltas.iter().fold((Vec3::ZERO, 0.0), |(disp, yaw), delta| {
        let (d, y) = planar_motion(delta, pose.rotation, up);
        (disp + d, yaw + y)
    });

    let count = deltas.len() as f32;
    let displacement = displacement_sum / count;
    let yaw = yaw_sum / count;
    let yaw_rate = yaw / dt;

    LocomotionTarget {
        position: pose.position + displacement,
        rotation: (Quat::from_axis_angle(up, yaw_rate * dt) * pose.rotation).normalize(),
        linear_velocity: displacement / dt,
        angular_velocity: up * yaw_rate,
    }
}

/// Places `body` at `pose` at rest and returns the matching target, so that
/// no correction force fires on the teleport tick.
pub fn snap_body<B: PhysicsBody>(body: &mut B, pose: BodyPose) -> LocomotionTarget {
    body.set_pose(pose);
    body.set_linear_velocity(Vec3::ZERO);
    body.set_angular_velocity(Vec3::ZERO);
    body.clear_forces();
    LocomotionTarget::hold(pose)
}

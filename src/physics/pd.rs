//! PD Locomotion Controller
//!
//! Converts a [`LocomotionTarget`] into a horizontal force and a yaw torque.
//! Both are clamped by rescaling the whole vector, which keeps their
//! direction intact.

use glam::Vec3;

use crate::locomotion::LocomotionTarget;
use crate::math::{clamp_magnitude, forward_on_plane, project_on_plane, signed_yaw};
use crate::physics::world::BodyPose;
use crate::settings::{LocomotionSettings, PdGains};

/// Body state read from the simulation this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pose: BodyPose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdController {
    pub linear: PdGains,
    pub angular: PdGains,
    /// Multiplier of the yaw gains while airborne.
    pub airborne_scale: f32,
}

impl Default for PdController {
    fn default() -> Self {
        Self::from_settings(&LocomotionSettings::default())
    }
}

impl PdController {
    #[must_use]
    pub const fn new(linear: PdGains, angular: PdGains, airborne_scale: f32) -> Self {
        Self {
            linear,
            angular,
            airborne_scale,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &LocomotionSettings) -> Self {
        Self {
            linear: settings.linear,
            angular: settings.angular,
            airborne_scale: settings.airborne_angular_scale,
        }
    }

    /// `kp * position_error + kd * velocity_error`, both on the ground plane.
    #[must_use]
    pub fn linear_force(&self, target: &LocomotionTarget, state: &BodyState, up: Vec3) -> Vec3 {
        let position_error = project_on_plane(target.position - state.pose.position, up);
        let velocity_error = project_on_plane(target.linear_velocity - state.linear_velocity, up);

        let force = position_error * self.linear.kp + velocity_error * self.linear.kd;
        clamp_magnitude(force, self.linear.max_magnitude)
    }

    /// Torque about `up` correcting the yaw error and yaw-rate error.
    #[must_use]
    pub fn yaw_torque(&self, target: &LocomotionTarget, state: &BodyState, up: Vec3, grounded: bool) -> Vec3 {
        let forward_now = forward_on_plane(state.pose.rotation, up);
        let forward_target = forward_on_plane(target.rotation, up);
        let yaw_error = signed_yaw(forward_now, forward_target, up);

        let yaw_rate_error = target.yaw_rate(up) - state.angular_velocity.dot(up);

        let scale = if grounded { 1.0 } else { self.airborne_scale };
        let kp = self.angular.kp * scale;
        let kd = self.angular.kd * scale;

        let torque = up * (kp * yaw_error + kd * yaw_rate_error);
        clamp_magnitude(torque, self.angular.max_magnitude)
    }
}

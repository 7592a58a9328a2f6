use glam::Vec3;

use crate::physics::world::{CollisionLayers, PhysicsBody, PhysicsWorld};
use crate::settings::GroundProbeSettings;

/// Extra ray length past `max_distance`, covering the body's own half height.
const RAY_MARGIN: f32 = 1.0;

/// Downward raycast support test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    pub max_distance: f32,
    cos_slope_limit: f32,
}

impl GroundProbe {
    #[must_use]
    pub fn new(max_distance: f32, slope_limit_degrees: f32) -> Self {
        Self {
            max_distance,
            cos_slope_limit: slope_limit_degrees.to_radians().cos(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &GroundProbeSettings) -> Self {
        Self::new(settings.max_distance, settings.slope_limit_degrees)
    }

    /// Whether the body behind `handle` stands on something in `mask`.
    ///
    /// Fails closed: an unknown body or no hit means "not grounded".
    pub fn is_grounded<W: PhysicsWorld>(
        &self,
        world: &W,
        handle: W::Handle,
        mask: CollisionLayers,
        up: Vec3,
    ) -> bool {
        let Some(body) = world.body(handle) else {
            return false;
        };
        let origin = body.pose().position;
        let to = origin - up * (self.max_distance + RAY_MARGIN);

        world
            .cast_ray(origin, to, mask, Some(handle))
            .is_some_and(|hit| hit.normal.normalize_or_zero().dot(up) > self.cos_slope_limit)
    }
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self::from_settings(&GroundProbeSettings::default())
    }
}

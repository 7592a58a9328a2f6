//! Physics Collaborator Interface
//!
//! The rigid-body simulation is owned by the host. Locomotion only needs a
//! narrow slice of it, described by the [`PhysicsWorld`] and [`PhysicsBody`]
//! traits: reading body state, applying forces and impulses, a bitmask
//! filtered ray test and stepping the world.

use std::fmt;

use bitflags::bitflags;
use glam::{Quat, Vec3};

bitflags! {
    /// Collision layer bits, used as ray-test masks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        const GROUND     = 1 << 0;
        const WALL       = 1 << 1;
        const CHARACTER  = 1 << 2;
        const DYNAMIC    = 1 << 3;
        const KINEMATIC  = 1 << 4;
        const TRIGGER    = 1 << 5;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::all()
    }
}

/// World-space position and orientation of a body's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyPose {
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Nearest hit of a ray test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub position: Vec3,
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// A simulated body, as seen by locomotion.
pub trait PhysicsBody {
    fn pose(&self) -> BodyPose;

    /// Moves the body without simulating the motion. Used for teleports and
    /// for bodies whose pose is driven by their transform.
    fn set_pose(&mut self, pose: BodyPose);

    fn linear_velocity(&self) -> Vec3;
    fn angular_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);

    fn apply_central_force(&mut self, force: Vec3);
    fn apply_torque(&mut self, torque: Vec3);
    fn apply_central_impulse(&mut self, impulse: Vec3);
    fn apply_torque_impulse(&mut self, impulse: Vec3);

    /// Discards forces and torques applied since the last step.
    fn clear_forces(&mut self);
}

/// The host's simulation world.
pub trait PhysicsWorld {
    type Handle: Copy + Eq + fmt::Debug;
    type Body: PhysicsBody;

    fn body(&self, handle: Self::Handle) -> Option<&Self::Body>;
    fn body_mut(&mut self, handle: Self::Handle) -> Option<&mut Self::Body>;

    /// Nearest hit between `from` and `to` against colliders in `mask`,
    /// ignoring `exclude`.
    fn cast_ray(
        &self,
        from: Vec3,
        to: Vec3,
        mask: CollisionLayers,
        exclude: Option<Self::Handle>,
    ) -> Option<RayHit>;

    /// Integrates the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

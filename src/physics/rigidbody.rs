//! Rigid-Body Components
//!
//! # Overview
//!
//! [`RigidBody`] ties an entity's visual transform to a body in the host's
//! physics world. Its three variants differ in who drives whom:
//!
//! - `Passive`: a static collider placed where the transform is.
//! - `Kinematic`: follows the transform every tick, never simulated.
//! - `Dynamic`: simulated and driven by forces. Root motion reaches it only
//!   through the PD controller; after the step its pose is copied back into
//!   the transform.
//!
//! Every variant can be read (pose, velocities). Only [`DynamicBody`] exposes
//! force, torque and impulse accumulators, reached through
//! [`RigidBody::as_dynamic_mut`].

use glam::Vec3;

use crate::locomotion::LocomotionTarget;
use crate::math::WORLD_UP;
use crate::physics::pd::{BodyState, PdController};
use crate::physics::world::{BodyPose, CollisionLayers, PhysicsBody, PhysicsWorld};
use crate::scene::Transform;
use crate::settings::PdGains;

// ============================================================================
// BodyBinding
// ============================================================================

/// Link between an entity and a body in the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyBinding<H> {
    pub handle: H,
    /// Body center relative to the transform's feet origin, in model space.
    pub center_offset: Vec3,
    /// Layers the grounding probe hits.
    pub mask: CollisionLayers,
}

impl<H> BodyBinding<H> {
    #[must_use]
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            center_offset: Vec3::ZERO,
            mask: CollisionLayers::default(),
        }
    }

    #[must_use]
    pub fn with_center_offset(mut self, center_offset: Vec3) -> Self {
        self.center_offset = center_offset;
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: CollisionLayers) -> Self {
        self.mask = mask;
        self
    }

    /// Body pose for a given feet transform.
    #[must_use]
    pub fn body_pose_for(&self, transform: &Transform) -> BodyPose {
        BodyPose::new(
            transform.position + transform.rotation * self.center_offset,
            transform.rotation,
        )
    }

    /// Writes the feet transform matching a body pose.
    pub fn write_transform(&self, pose: &BodyPose, transform: &mut Transform) {
        transform.rotation = pose.rotation;
        transform.position = pose.position - pose.rotation * self.center_offset;
    }
}

// ============================================================================
// DynamicBody
// ============================================================================

/// A force-driven body following root motion.
#[derive(Debug, Clone)]
pub struct DynamicBody<H> {
    pub binding: BodyBinding<H>,
    pub up: Vec3,
    target: LocomotionTarget,
    grounded: bool,
    /// Gains used instead of the pipeline's, when set.
    pd: Option<PdController>,

    linear_force: Vec3,
    angular_force: Vec3,
    linear_impulse: Vec3,
    angular_impulse: Vec3,

    /// Transform position written by the last copy-back.
    last_synced_position: Option<Vec3>,
    teleport_requested: bool,
    snapped_this_tick: bool,
}

impl<H> DynamicBody<H> {
    #[must_use]
    pub fn new(binding: BodyBinding<H>) -> Self {
        Self {
            binding,
            up: WORLD_UP,
            target: LocomotionTarget::default(),
            grounded: false,
            pd: None,
            linear_force: Vec3::ZERO,
            angular_force: Vec3::ZERO,
            linear_impulse: Vec3::ZERO,
            angular_impulse: Vec3::ZERO,
            last_synced_position: None,
            teleport_requested: false,
            snapped_this_tick: false,
        }
    }

    // ========================================================================
    // PD tuning
    // ========================================================================

    #[must_use]
    pub fn with_pd(mut self, pd: PdController) -> Self {
        self.pd = Some(pd);
        self
    }

    /// Per-body gains, if this body overrides the pipeline's.
    #[inline]
    #[must_use]
    pub fn pd(&self) -> Option<&PdController> {
        self.pd.as_ref()
    }

    /// Gains this body is driven with.
    #[must_use]
    pub fn effective_pd(&self, fallback: &PdController) -> PdController {
        self.pd.unwrap_or(*fallback)
    }

    pub fn set_pd(&mut self, pd: Option<PdController>) {
        self.pd = pd;
    }

    /// Overrides the linear gains; unset values start from the defaults.
    pub fn set_linear_pd(&mut self, kp: f32, kd: f32, max_force: f32) {
        self.pd.get_or_insert_default().linear = PdGains::new(kp, kd, max_force);
    }

    pub fn set_angular_pd(&mut self, kp: f32, kd: f32, max_torque: f32) {
        self.pd.get_or_insert_default().angular = PdGains::new(kp, kd, max_torque);
    }

    pub fn set_angular_airborne_scale(&mut self, scale: f32) {
        self.pd.get_or_insert_default().airborne_scale = scale;
    }

    // ========================================================================
    // Accumulators
    // ========================================================================

    pub fn add_linear_force(&mut self, force: Vec3) {
        self.linear_force += force;
    }

    pub fn add_angular_force(&mut self, torque: Vec3) {
        self.angular_force += torque;
    }

    pub fn add_linear_impulse(&mut self, impulse: Vec3) {
        self.linear_impulse += impulse;
    }

    pub fn add_angular_impulse(&mut self, impulse: Vec3) {
        self.angular_impulse += impulse;
    }

    /// Pending `(force, torque, linear impulse, angular impulse)`.
    #[must_use]
    pub fn accumulated(&self) -> (Vec3, Vec3, Vec3, Vec3) {
        (
            self.linear_force,
            self.angular_force,
            self.linear_impulse,
            self.angular_impulse,
        )
    }

    /// Applies the accumulated contributions to `body` and resets them.
    pub fn flush_accumulators<B: PhysicsBody>(&mut self, body: &mut B) {
        if self.linear_force != Vec3::ZERO {
            body.apply_central_force(self.linear_force);
        }
        if self.angular_force != Vec3::ZERO {
            body.apply_torque(self.angular_force);
        }
        if self.linear_impulse != Vec3::ZERO {
            body.apply_central_impulse(self.linear_impulse);
        }
        if self.angular_impulse != Vec3::ZERO {
            body.apply_torque_impulse(self.angular_impulse);
        }
        self.clear_accumulators();
    }

    pub fn clear_accumulators(&mut self) {
        self.linear_force = Vec3::ZERO;
        self.angular_force = Vec3::ZERO;
        self.linear_impulse = Vec3::ZERO;
        self.angular_impulse = Vec3::ZERO;
    }

    // ========================================================================
    // Targets & teleports
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn target(&self) -> &LocomotionTarget {
        &self.target
    }

    pub(crate) fn set_target(&mut self, target: LocomotionTarget) {
        self.target = target;
    }

    /// Result of the last grounding probe.
    #[inline]
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub(crate) fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    /// Forces a snap to the transform on the next tick.
    pub fn request_teleport(&mut self) {
        self.teleport_requested = true;
    }

    /// Whether the transform was moved by something other than the
    /// simulation since the last copy-back (or never synced at all).
    #[must_use]
    pub fn needs_teleport(&self, transform: &Transform) -> bool {
        self.teleport_requested
            || self
                .last_synced_position
                .is_none_or(|synced| synced != transform.position)
    }

    /// Whether the body was snapped to its transform during this tick.
    #[inline]
    #[must_use]
    pub fn snapped_this_tick(&self) -> bool {
        self.snapped_this_tick
    }

    pub(crate) fn begin_snap(&mut self) {
        self.teleport_requested = false;
        self.snapped_this_tick = true;
    }

    pub(crate) fn mark_synced(&mut self, position: Vec3) {
        self.last_synced_position = Some(position);
        self.snapped_this_tick = false;
    }
}

// ============================================================================
// RigidBody
// ============================================================================

#[derive(Debug, Clone)]
pub enum RigidBody<H> {
    Passive(BodyBinding<H>),
    Kinematic(BodyBinding<H>),
    Dynamic(DynamicBody<H>),
}

impl<H: Copy> RigidBody<H> {
    #[must_use]
    pub fn passive(handle: H) -> Self {
        Self::Passive(BodyBinding::new(handle))
    }

    #[must_use]
    pub fn kinematic(handle: H) -> Self {
        Self::Kinematic(BodyBinding::new(handle))
    }

    #[must_use]
    pub fn dynamic(handle: H) -> Self {
        Self::Dynamic(DynamicBody::new(BodyBinding::new(handle)))
    }

    #[must_use]
    pub fn binding(&self) -> &BodyBinding<H> {
        match self {
            Self::Passive(binding) | Self::Kinematic(binding) => binding,
            Self::Dynamic(body) => &body.binding,
        }
    }

    #[must_use]
    pub fn binding_mut(&mut self) -> &mut BodyBinding<H> {
        match self {
            Self::Passive(binding) | Self::Kinematic(binding) => binding,
            Self::Dynamic(body) => &mut body.binding,
        }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> H {
        self.binding().handle
    }

    /// Current state of the body in `world`, if it still exists.
    pub fn read_state<W>(&self, world: &W) -> Option<BodyState>
    where
        W: PhysicsWorld<Handle = H>,
    {
        let body = world.body(self.handle())?;
        Some(BodyState {
            pose: body.pose(),
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
        })
    }

    #[must_use]
    pub fn as_dynamic(&self) -> Option<&DynamicBody<H>> {
        match self {
            Self::Dynamic(body) => Some(body),
            _ => None,
        }
    }

    /// Write access to forces, only for dynamic bodies.
    #[must_use]
    pub fn as_dynamic_mut(&mut self) -> Option<&mut DynamicBody<H>> {
        match self {
            Self::Dynamic(body) => Some(body),
            _ => None,
        }
    }
}

//! Shared fixtures: an in-memory physics world, a test entity and a small
//! walking character.

#![allow(dead_code)]

use glam::{Quat, Vec3};
use slotmap::{SlotMap, new_key_type};

use stride::animation::{InterpolationMode, KeyframeTrack};
use stride::physics::{BodyPose, CollisionLayers, PhysicsBody, PhysicsWorld, RayHit};
use stride::{
    AnimatedEntity, AnimationClip, Animator, EntityParts, Fetched, JointTrack, JointTransform,
    MotionTrack, RigidBody, Skeleton, Transform,
};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Physics double
// ============================================================================

new_key_type! {
    pub struct BodyKey;
}

#[derive(Debug, Clone)]
pub struct TestBody {
    pub pose: BodyPose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub inertia: f32,
    pub simulated: bool,
    force: Vec3,
    torque: Vec3,
    /// Force applied during the last step
    pub last_force: Vec3,
    /// Torque applied during the last step
    pub last_torque: Vec3,
    pub pose_writes: u32,
}

impl TestBody {
    pub fn dynamic(position: Vec3) -> Self {
        Self {
            pose: BodyPose::new(position, Quat::IDENTITY),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 70.0,
            inertia: 10.0,
            simulated: true,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            last_force: Vec3::ZERO,
            last_torque: Vec3::ZERO,
            pose_writes: 0,
        }
    }

    pub fn fixed(position: Vec3) -> Self {
        Self {
            simulated: false,
            ..Self::dynamic(position)
        }
    }

    pub fn pending_force(&self) -> Vec3 {
        self.force
    }
}

impl PhysicsBody for TestBody {
    fn pose(&self) -> BodyPose {
        self.pose
    }

    fn set_pose(&mut self, pose: BodyPose) {
        self.pose = pose;
        self.pose_writes += 1;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn apply_central_force(&mut self, force: Vec3) {
        self.force += force;
    }

    fn apply_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    fn apply_central_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse / self.mass;
    }

    fn apply_torque_impulse(&mut self, impulse: Vec3) {
        self.angular_velocity += impulse / self.inertia;
    }

    fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}

/// Infinite plane collider.
#[derive(Debug, Clone, Copy)]
pub struct Floor {
    pub point: Vec3,
    pub normal: Vec3,
    pub layers: CollisionLayers,
}

impl Floor {
    pub fn flat(height: f32) -> Self {
        Self {
            point: Vec3::new(0.0, height, 0.0),
            normal: Vec3::Y,
            layers: CollisionLayers::GROUND,
        }
    }
}

/// Semi-implicit Euler world with an optional floor plane.
#[derive(Debug, Default)]
pub struct TestWorld {
    pub bodies: SlotMap<BodyKey, TestBody>,
    pub floor: Option<Floor>,
    pub gravity: Vec3,
    pub steps: u32,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(floor: Floor) -> Self {
        Self {
            floor: Some(floor),
            ..Self::default()
        }
    }

    pub fn add(&mut self, body: TestBody) -> BodyKey {
        self.bodies.insert(body)
    }

    pub fn get(&self, key: BodyKey) -> &TestBody {
        &self.bodies[key]
    }

    pub fn get_mut(&mut self, key: BodyKey) -> &mut TestBody {
        &mut self.bodies[key]
    }
}

impl PhysicsWorld for TestWorld {
    type Handle = BodyKey;
    type Body = TestBody;

    fn body(&self, handle: BodyKey) -> Option<&TestBody> {
        self.bodies.get(handle)
    }

    fn body_mut(&mut self, handle: BodyKey) -> Option<&mut TestBody> {
        self.bodies.get_mut(handle)
    }

    fn cast_ray(
        &self,
        from: Vec3,
        to: Vec3,
        mask: CollisionLayers,
        _exclude: Option<BodyKey>,
    ) -> Option<RayHit> {
        let floor = self.floor?;
        if !mask.intersects(floor.layers) {
            return None;
        }

        let direction = to - from;
        let denominator = floor.normal.dot(direction);
        if denominator.abs() < 1e-6 {
            return None;
        }
        let t = floor.normal.dot(floor.point - from) / denominator;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        Some(RayHit {
            position: from + direction * t,
            normal: floor.normal,
            distance: direction.length() * t,
        })
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            body.last_force = body.force;
            body.last_torque = body.torque;
            if body.simulated {
                body.linear_velocity += (body.force / body.mass + self.gravity) * dt;
                body.angular_velocity += body.torque / body.inertia * dt;
                body.pose.position += body.linear_velocity * dt;
                body.pose.rotation =
                    (Quat::from_scaled_axis(body.angular_velocity * dt) * body.pose.rotation).normalize();
            }
            body.clear_forces();
        }
        self.steps += 1;
    }
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Default)]
pub struct Character {
    pub animator: Option<Animator>,
    pub transform: Transform,
    pub rigidbody: Option<RigidBody<BodyKey>>,
}

impl AnimatedEntity for Character {
    type Handle = BodyKey;

    fn parts(&mut self) -> EntityParts<'_, BodyKey> {
        EntityParts {
            animator: self.animator.as_mut(),
            transform: &mut self.transform,
            rigidbody: self.rigidbody.as_mut(),
        }
    }
}

// ============================================================================
// Assets
// ============================================================================

/// Root + hip + knee chain, one unit apart along "up".
pub fn leg_skeleton() -> Skeleton {
    Skeleton::new(
        "leg",
        vec!["root".to_string(), "hip".to_string(), "knee".to_string()],
        vec![None, Some(0), Some(1)],
        vec![
            JointTransform::IDENTITY,
            JointTransform::from_translation(Vec3::Y),
            JointTransform::from_translation(Vec3::Y),
        ],
    )
    .expect("valid skeleton")
}

/// Clip swinging the hip by `angle` about X, other joints held at rest.
pub fn swing_clip(name: &str, angle: f32) -> AnimationClip {
    let skeleton = leg_skeleton();
    let rest = skeleton.rest_pose();
    AnimationClip::new(
        name,
        1.0,
        vec![
            JointTrack::constant(rest[0]),
            JointTrack::new(
                KeyframeTrack::constant(rest[1].translation),
                KeyframeTrack::new(
                    vec![0.0, 0.5, 1.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_x(angle), Quat::IDENTITY],
                    InterpolationMode::Linear,
                ),
                KeyframeTrack::constant(Vec3::ONE),
            ),
            JointTrack::constant(rest[2]),
        ],
    )
}

/// Straight walk: `distance` meters along +Z per loop.
pub fn walk_motion(distance: f32) -> MotionTrack {
    MotionTrack::new(
        KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, distance)],
            InterpolationMode::Linear,
        ),
        KeyframeTrack::constant(Quat::IDENTITY),
    )
    .expect("valid motion track")
}

/// Animator playing `walk` with a ready skeleton, clip and motion track.
pub fn walking_animator(distance: f32) -> Animator {
    let mut animator = Animator::new();
    animator.use_skeleton(Fetched::ready("leg", leg_skeleton()));
    animator
        .use_animation("walk", Fetched::ready("walk", swing_clip("walk", 0.5)))
        .play();
    animator
        .use_motion_track("walk", Fetched::ready("walk_motion", walk_motion(distance)))
        .expect("walk slot exists");
    animator
}

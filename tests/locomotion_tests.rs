//! Locomotion Tests
//!
//! Tests for:
//! - PD force/torque clamping
//! - Per-body PD gains sharing one pipeline
//! - Grounding probe (floor, no floor, layer masks, steep normals)
//! - Teleport snapping
//! - Force/impulse accumulators
//! - End-to-end walk at different fixed timesteps

mod common;

use glam::{Quat, Vec3};

use common::{BodyKey, Character, Floor, TestBody, TestWorld, approx_vec3, walking_animator};
use stride::physics::{BodyBinding, BodyState};
use stride::settings::PdGains;
use stride::{
    BodyPose, CollisionLayers, GroundProbe, LocomotionSettings, LocomotionTarget, PdController,
    PhysicsWorld, RigidBody, TickPipeline,
};

fn at_rest(position: Vec3, rotation: Quat) -> BodyState {
    BodyState {
        pose: BodyPose::new(position, rotation),
        linear_velocity: Vec3::ZERO,
        angular_velocity: Vec3::ZERO,
    }
}

fn dynamic_character(world: &mut TestWorld, animator: Option<stride::Animator>) -> (Character, BodyKey) {
    let key = world.add(TestBody::dynamic(Vec3::ZERO));
    let character = Character {
        animator,
        rigidbody: Some(RigidBody::dynamic(key)),
        ..Character::default()
    };
    (character, key)
}

fn dynamic_mut(character: &mut Character) -> &mut stride::DynamicBody<BodyKey> {
    character
        .rigidbody
        .as_mut()
        .and_then(RigidBody::as_dynamic_mut)
        .unwrap()
}

// ============================================================================
// PD controller
// ============================================================================

#[test]
fn linear_force_never_exceeds_limit() {
    let pd = PdController::from_settings(&LocomotionSettings::default());
    let state = at_rest(Vec3::ZERO, Quat::IDENTITY);
    let direction = Vec3::new(3.0, 0.0, -4.0).normalize();

    for magnitude in [0.0, 0.001, 0.5, 3.0, 3.4, 10.0, 1e3, 1e6] {
        let target = LocomotionTarget::hold(BodyPose::new(direction * magnitude, Quat::IDENTITY));
        let force = pd.linear_force(&target, &state, Vec3::Y);

        let expected = (1800.0 * magnitude).min(6000.0);
        assert!(force.length() <= 6000.0 + 1e-2, "{magnitude}: {force}");
        assert!((force.length() - expected).abs() <= expected * 1e-5 + 1e-3);
        if magnitude > 0.0 {
            assert!(force.normalize().abs_diff_eq(direction, 1e-5));
        }
    }
}

#[test]
fn torque_sign_holds_near_half_turn() {
    let pd = PdController::from_settings(&LocomotionSettings::default());
    let state = at_rest(Vec3::ZERO, Quat::IDENTITY);

    let left = LocomotionTarget::hold(BodyPose::new(Vec3::ZERO, Quat::from_rotation_y(3.1)));
    let right = LocomotionTarget::hold(BodyPose::new(Vec3::ZERO, Quat::from_rotation_y(-3.1)));

    let left_torque = pd.yaw_torque(&left, &state, Vec3::Y, true);
    let right_torque = pd.yaw_torque(&right, &state, Vec3::Y, true);
    assert!(left_torque.y > 0.0);
    assert!(right_torque.y < 0.0);
    assert!(left_torque.length() <= 1200.0 + 1e-3);
    assert!(right_torque.length() <= 1200.0 + 1e-3);
}

#[test]
fn airborne_scales_yaw_gains() {
    let pd = PdController::from_settings(&LocomotionSettings::default());
    let state = at_rest(Vec3::ZERO, Quat::IDENTITY);
    let target = LocomotionTarget::hold(BodyPose::new(Vec3::ZERO, Quat::from_rotation_y(0.5)));

    let grounded = pd.yaw_torque(&target, &state, Vec3::Y, true);
    let airborne = pd.yaw_torque(&target, &state, Vec3::Y, false);
    assert!((airborne.y - grounded.y * 0.35).abs() < 1e-3);
}

// ============================================================================
// Grounding
// ============================================================================

#[test]
fn body_near_floor_is_grounded() {
    let mut world = TestWorld::with_floor(Floor::flat(0.0));
    let low = world.add(TestBody::dynamic(Vec3::new(0.0, 1.0, 0.0)));
    let high = world.add(TestBody::dynamic(Vec3::new(0.0, 2.0, 0.0)));
    let probe = GroundProbe::default();

    assert!(probe.is_grounded(&world, low, CollisionLayers::all(), Vec3::Y));
    assert!(!probe.is_grounded(&world, high, CollisionLayers::all(), Vec3::Y));
}

#[test]
fn no_floor_means_airborne() {
    let mut world = TestWorld::new();
    let key = world.add(TestBody::dynamic(Vec3::new(0.0, 0.2, 0.0)));
    assert!(!GroundProbe::default().is_grounded(&world, key, CollisionLayers::all(), Vec3::Y));
}

#[test]
fn mask_filters_floor() {
    let mut world = TestWorld::with_floor(Floor::flat(0.0));
    let key = world.add(TestBody::dynamic(Vec3::new(0.0, 1.0, 0.0)));
    let probe = GroundProbe::default();

    assert!(!probe.is_grounded(&world, key, CollisionLayers::WALL, Vec3::Y));
    assert!(probe.is_grounded(&world, key, CollisionLayers::GROUND | CollisionLayers::WALL, Vec3::Y));
}

#[test]
fn slope_limit_rejects_downward_normals() {
    let probe = GroundProbe::default();

    let mut slope = TestWorld::with_floor(Floor {
        normal: Quat::from_rotation_x(60f32.to_radians()) * Vec3::Y,
        ..Floor::flat(0.0)
    });
    let key = slope.add(TestBody::dynamic(Vec3::new(0.0, 1.0, 0.0)));
    assert!(probe.is_grounded(&slope, key, CollisionLayers::all(), Vec3::Y));

    let mut ceiling = TestWorld::with_floor(Floor {
        normal: -Vec3::Y,
        ..Floor::flat(0.0)
    });
    let key = ceiling.add(TestBody::dynamic(Vec3::new(0.0, 1.0, 0.0)));
    assert!(!probe.is_grounded(&ceiling, key, CollisionLayers::all(), Vec3::Y));
}

#[test]
fn missing_body_is_not_grounded() {
    let mut world = TestWorld::with_floor(Floor::flat(0.0));
    let key = world.add(TestBody::dynamic(Vec3::new(0.0, 1.0, 0.0)));
    world.bodies.remove(key);
    assert!(world.body(key).is_none());
    assert!(!GroundProbe::default().is_grounded(&world, key, CollisionLayers::all(), Vec3::Y));
}

#[test]
fn per_body_gains_override_pipeline_gains() {
    let mut world = TestWorld::new();
    let (stock, stock_key) = dynamic_character(&mut world, Some(walking_animator(2.0)));

    let tuned_key = world.add(TestBody::dynamic(Vec3::new(5.0, 0.0, 0.0)));
    let gentle = PdController::new(
        PdGains::new(1800.0, 0.0, 10.0),
        PdGains::new(400.0, 0.0, 5.0),
        0.35,
    );
    let tuned = Character {
        animator: Some(walking_animator(2.0)),
        transform: stride::Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
        rigidbody: Some(RigidBody::Dynamic(
            stride::DynamicBody::new(BodyBinding::new(tuned_key)).with_pd(gentle),
        )),
    };

    let mut characters = vec![stock, tuned];
    let mut pipeline = TickPipeline::new(LocomotionSettings::default()).unwrap();
    // snap, then one driven tick
    pipeline.tick(&mut world, &mut characters).unwrap();
    pipeline.tick(&mut world, &mut characters).unwrap();

    let stock_force = world.get(stock_key).last_force.length();
    let tuned_force = world.get(tuned_key).last_force.length();
    assert!(stock_force > 10.0, "default gains gave {stock_force}");
    assert!(tuned_force > 0.0);
    assert!(tuned_force <= 10.0 + 1e-3, "override gave {tuned_force}");

    // the override is per body: clearing it restores the pipeline gains
    dynamic_mut(&mut characters[1]).set_pd(None);
    pipeline.tick(&mut world, &mut characters).unwrap();
    assert!(world.get(tuned_key).last_force.length() > 10.0);
}

// ============================================================================
// Teleport
// ============================================================================

#[test]
fn teleport_snaps_without_correction_force() {
    common::init_logging();
    let mut world = TestWorld::new();
    let (mut character, key) = dynamic_character(&mut world, Some(walking_animator(2.0)));
    let mut pipeline = TickPipeline::new(LocomotionSettings::default()).unwrap();

    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    assert!(world.get(key).last_force.length() > 0.0);

    let destination = Vec3::new(10.0, 0.0, -4.0);
    character.transform.position = destination;
    world.get_mut(key).linear_velocity = Vec3::new(5.0, 0.0, 5.0);
    world.get_mut(key).angular_velocity = Vec3::new(0.0, 2.0, 0.0);
    dynamic_mut(&mut character).add_linear_force(Vec3::X * 100.0);

    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();

    let body = world.get(key);
    assert_eq!(body.last_force, Vec3::ZERO);
    assert_eq!(body.last_torque, Vec3::ZERO);
    assert_eq!(body.linear_velocity, Vec3::ZERO);
    assert_eq!(body.angular_velocity, Vec3::ZERO);
    assert!(approx_vec3(body.pose.position, destination));

    let dynamic = character.rigidbody.as_ref().and_then(RigidBody::as_dynamic).unwrap();
    assert!(approx_vec3(dynamic.target().position, destination));
    assert_eq!(dynamic.target().linear_velocity, Vec3::ZERO);
    assert_eq!(dynamic.accumulated().0, Vec3::ZERO);
    assert!(!dynamic.snapped_this_tick());
    assert!(approx_vec3(character.transform.position, destination));
}

#[test]
fn requested_teleport_snaps_in_place() {
    let mut world = TestWorld::new();
    let (mut character, key) = dynamic_character(&mut world, None);
    let mut pipeline = TickPipeline::new(LocomotionSettings::default()).unwrap();

    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    let writes = world.get(key).pose_writes;

    world.get_mut(key).linear_velocity = Vec3::Z;
    dynamic_mut(&mut character).request_teleport();
    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();

    assert_eq!(world.get(key).pose_writes, writes + 1);
    assert_eq!(world.get(key).linear_velocity, Vec3::ZERO);
}

// ============================================================================
// Accumulators
// ============================================================================

#[test]
fn accumulated_forces_apply_once() {
    let mut world = TestWorld::new();
    let (mut character, key) = dynamic_character(&mut world, None);
    let mut pipeline = TickPipeline::new(LocomotionSettings::default()).unwrap();
    let dt = pipeline.settings().fixed_timestep;

    // first tick only snaps
    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();

    let force = Vec3::new(70.0, 0.0, 0.0);
    let impulse = Vec3::new(0.0, 0.0, 7.0);
    {
        let dynamic = dynamic_mut(&mut character);
        dynamic.add_linear_force(force * 0.5);
        dynamic.add_linear_force(force * 0.5);
        dynamic.add_linear_impulse(impulse);
        assert_eq!(dynamic.accumulated().0, force);
    }

    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    let body = world.get(key);
    assert_eq!(body.last_force, force);
    let expected_velocity = impulse / body.mass + force / body.mass * dt;
    assert!(approx_vec3(body.linear_velocity, expected_velocity));
    assert_eq!(dynamic_mut(&mut character).accumulated(), (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO));

    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    assert_eq!(world.get(key).last_force, Vec3::ZERO);
    assert!(approx_vec3(world.get(key).linear_velocity, expected_velocity));
}

// ============================================================================
// End to end
// ============================================================================

/// Walks one loop of a 2 m clip with the body tracking every target exactly.
fn walk_one_loop_at(dt: f32) -> Vec3 {
    let settings = LocomotionSettings {
        fixed_timestep: dt,
        ..LocomotionSettings::default()
    };
    let ticks = (1.0 / dt).round() as usize;

    let mut world = TestWorld::new();
    let mut animator = walking_animator(2.0);
    animator.controller_mut("walk").unwrap().pause();
    let (mut character, key) = dynamic_character(&mut world, Some(animator));
    let mut pipeline = TickPipeline::new(settings).unwrap();

    // settle: the first tick snaps the never-synced body
    pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    let start = dynamic_mut(&mut character).target().position;

    character
        .animator
        .as_mut()
        .and_then(|animator| animator.controller_mut("walk"))
        .unwrap()
        .play();

    for _ in 0..ticks {
        pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
        let target = *dynamic_mut(&mut character).target();
        let body = world.get_mut(key);
        body.pose = BodyPose::new(target.position, target.rotation);
    }

    dynamic_mut(&mut character).target().position - start
}

#[test]
fn walk_covers_clip_distance_at_30hz() {
    let displacement = walk_one_loop_at(1.0 / 30.0);
    assert!(
        displacement.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-3),
        "moved {displacement}"
    );
}

#[test]
fn walk_covers_clip_distance_at_240hz() {
    let displacement = walk_one_loop_at(1.0 / 240.0);
    assert!(
        displacement.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-3),
        "moved {displacement}"
    );
}

#[test]
fn pd_pushes_body_toward_walk() {
    let mut world = TestWorld::new();
    let (mut character, key) = dynamic_character(&mut world, Some(walking_animator(2.0)));
    let mut pipeline = TickPipeline::new(LocomotionSettings::default()).unwrap();

    for _ in 0..30 {
        pipeline.tick(&mut world, std::slice::from_mut(&mut character)).unwrap();
    }

    let body = world.get(key);
    assert!(body.pose.position.z > 0.05, "body at {}", body.pose.position);
    assert!(body.last_force.length() <= 6000.0 + 1e-2);
    assert!(body.last_force.y.abs() < 1e-3);
    assert!(approx_vec3(character.transform.position, body.pose.position));
}

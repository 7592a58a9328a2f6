use glam::Vec3;

use crate::errors::Result;
use crate::locomotion::{snap_body, synthesize_target};
use crate::physics::{BodyState, GroundProbe, PdController, PhysicsBody, PhysicsWorld, RigidBody};
use crate::systems::pipeline::AnimatedEntity;

/// Places passive and kinematic bodies at their transform, and snaps dynamic
/// bodies whose transform was moved from outside the simulation.
pub fn sync_bodies<W, E>(world: &mut W, entities: &mut [E])
where
    W: PhysicsWorld,
    E: AnimatedEntity<Handle = W::Handle>,
{
    for entity in entities.iter_mut() {
        let parts = entity.parts();
        let Some(rigidbody) = parts.rigidbody else {
            continue;
        };

        match rigidbody {
            RigidBody::Passive(binding) | RigidBody::Kinematic(binding) => {
                if let Some(body) = world.body_mut(binding.handle) {
                    body.set_pose(binding.body_pose_for(parts.transform));
                }
            }
            RigidBody::Dynamic(dynamic) => {
                if !dynamic.needs_teleport(parts.transform) {
                    continue;
                }
                let Some(body) = world.body_mut(dynamic.binding.handle) else {
                    continue;
                };
                let pose = dynamic.binding.body_pose_for(parts.transform);
                log::debug!(
                    "Snapping body {:?} to {}",
                    dynamic.binding.handle,
                    pose.position
                );
                let target = snap_body(body, pose);
                dynamic.clear_accumulators();
                dynamic.set_target(target);
                dynamic.begin_snap();
            }
        }
    }
}

/// Derives this tick's locomotion target of every animated dynamic body.
pub fn synthesize_targets<W, E>(world: &W, entities: &mut [E], dt: f32) -> Result<()>
where
    W: PhysicsWorld,
    E: AnimatedEntity<Handle = W::Handle>,
{
    for entity in entities.iter_mut() {
        let parts = entity.parts();
        let (Some(animator), Some(rigidbody)) = (parts.animator, parts.rigidbody) else {
            continue;
        };
        let Some(state) = rigidbody.read_state(world) else {
            continue;
        };
        let Some(dynamic) = rigidbody.as_dynamic_mut() else {
            continue;
        };
        if dynamic.snapped_this_tick() {
            continue;
        }

        let deltas = animator.motion_deltas()?;
        dynamic.set_target(synthesize_target(state.pose, &deltas, dynamic.up, dt));
    }
    Ok(())
}

/// Probes the ground, adds the PD force and torque of animated bodies to
/// their accumulators and applies every accumulator once.
///
/// `pd` drives every body without gains of its own.
pub fn apply_forces<W, E>(world: &mut W, entities: &mut [E], pd: &PdController, probe: &GroundProbe)
where
    W: PhysicsWorld,
    E: AnimatedEntity<Handle = W::Handle>,
{
    for entity in entities.iter_mut() {
        let parts = entity.parts();
        let animated = parts.animator.is_some();
        let Some(dynamic) = parts.rigidbody.and_then(RigidBody::as_dynamic_mut) else {
            continue;
        };

        if dynamic.snapped_this_tick() {
            dynamic.clear_accumulators();
            continue;
        }

        let handle = dynamic.binding.handle;
        let up = dynamic.up;
        let grounded = probe.is_grounded(&*world, handle, dynamic.binding.mask, up);
        dynamic.set_grounded(grounded);

        let Some(body) = world.body_mut(handle) else {
            log::trace!("Body {handle:?} is gone, dropping its forces");
            dynamic.clear_accumulators();
            continue;
        };

        if animated {
            let state = BodyState {
                pose: body.pose(),
                linear_velocity: body.linear_velocity(),
                angular_velocity: body.angular_velocity(),
            };
            let pd = dynamic.effective_pd(pd);
            let force = pd.linear_force(dynamic.target(), &state, up);
            let torque = pd.yaw_torque(dynamic.target(), &state, up, grounded);
            if force != Vec3::ZERO {
                dynamic.add_linear_force(force);
            }
            if torque != Vec3::ZERO {
                dynamic.add_angular_force(torque);
            }
        }

        dynamic.flush_accumulators(body);
    }
}

/// Writes the simulated pose of every dynamic body back into its transform.
pub fn copy_back<W, E>(world: &W, entities: &mut [E])
where
    W: PhysicsWorld,
    E: AnimatedEntity<Handle = W::Handle>,
{
    for entity in entities.iter_mut() {
        let parts = entity.parts();
        let Some(dynamic) = parts.rigidbody.and_then(RigidBody::as_dynamic_mut) else {
            continue;
        };
        let Some(body) = world.body(dynamic.binding.handle) else {
            continue;
        };
        dynamic.binding.write_transform(&body.pose(), parts.transform);
        dynamic.mark_synced(parts.transform.position);
    }
}

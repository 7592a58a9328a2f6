use crate::errors::Result;
use crate::physics::RigidBody;
use crate::systems::pipeline::AnimatedEntity;

/// Observes resource readiness on every animator.
pub fn poll_resources<E: AnimatedEntity>(entities: &mut [E]) -> Result<()> {
    for entity in entities.iter_mut() {
        if let Some(animator) = entity.parts().animator {
            animator.poll_resources()?;
        }
    }
    Ok(())
}

/// Advances every controller by `dt` and fires crossed events.
pub fn advance_controllers<E: AnimatedEntity>(entities: &mut [E], dt: f32) {
    for entity in entities.iter_mut() {
        if let Some(animator) = entity.parts().animator {
            animator.advance(dt);
        }
    }
}

/// Samples, blends and propagates the render pose of every animator.
pub fn apply_animations<E: AnimatedEntity>(entities: &mut [E], blend_threshold: f32) -> Result<()> {
    for entity in entities.iter_mut() {
        if let Some(animator) = entity.parts().animator {
            animator.update_pose(blend_threshold)?;
        }
    }
    Ok(())
}

/// Moves the transform of every entity that is not driven by a dynamic body
/// by this tick's weighted root motion.
pub fn apply_motion_tracks<E: AnimatedEntity>(entities: &mut [E]) -> Result<()> {
    for entity in entities.iter_mut() {
        let parts = entity.parts();
        let Some(animator) = parts.animator else {
            continue;
        };
        if matches!(parts.rigidbody.as_deref(), Some(RigidBody::Dynamic(_))) {
            continue;
        }
        for delta in animator.motion_deltas()? {
            parts.transform.apply_local_delta(&delta.transform);
        }
    }
    Ok(())
}

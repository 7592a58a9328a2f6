//! Fixed-Tick Pipeline
//!
//! # Overview
//!
//! [`TickPipeline`] runs every locomotion stage once per fixed tick, in this
//! order, each stage consuming the previous stage's output of the same tick:
//!
//! 1. resource readiness polling
//! 2. controller advance and event firing
//! 3. sampling, blending and local-to-model propagation
//! 4. root motion on kinematic entities
//! 5. body sync (passive / kinematic bodies follow their transform, dynamic
//!    bodies snap on teleport)
//! 6. target synthesis for dynamic bodies
//! 7. grounding probe and PD force/torque application
//! 8. simulation step
//! 9. copy-back of dynamic body poses into their transforms
//!
//! Entity storage belongs to the host. It hands the pipeline a slice of
//! values implementing [`AnimatedEntity`], each lending out its components
//! as [`EntityParts`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut pipeline = TickPipeline::new(LocomotionSettings::default())?;
//!
//! // once per rendered frame
//! let ticks = pipeline.update(frame_seconds, &mut physics, &mut characters)?;
//! ```

use crate::animation::Animator;
use crate::errors::{Result, StrideError};
use crate::physics::{GroundProbe, PdController, PhysicsWorld, RigidBody};
use crate::scene::Transform;
use crate::settings::LocomotionSettings;
use crate::systems::{dynamics, motion};

// ============================================================================
// Entity access
// ============================================================================

/// Components of one entity, borrowed for a single stage.
pub struct EntityParts<'a, H> {
    pub animator: Option<&'a mut Animator>,
    pub transform: &'a mut Transform,
    pub rigidbody: Option<&'a mut RigidBody<H>>,
}

/// Host-side view of an entity taking part in locomotion.
pub trait AnimatedEntity {
    type Handle: Copy;

    fn parts(&mut self) -> EntityParts<'_, Self::Handle>;
}

// ============================================================================
// FixedTimestep
// ============================================================================

/// Turns variable frame times into a bounded number of fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
    /// Total number of ticks handed out
    pub tick_count: u64,
}

impl FixedTimestep {
    /// Fails unless `step` is a positive, finite number of seconds.
    pub fn new(step: f32, max_substeps: u32) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(StrideError::InvalidSettings(format!(
                "fixed timestep must be positive, got {step}"
            )));
        }
        Ok(Self {
            step,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            tick_count: 0,
        })
    }

    pub fn from_settings(settings: &LocomotionSettings) -> Result<Self> {
        Self::new(settings.fixed_timestep, settings.max_substeps)
    }

    /// Adds `frame_delta` seconds and returns how many ticks are due.
    ///
    /// Time beyond `max_substeps` ticks is dropped rather than carried over,
    /// so a long stall does not trigger a spiral of catch-up frames.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        self.accumulator += frame_delta.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= self.step {
            if ticks == self.max_substeps {
                log::warn!(
                    "Dropping {:.3}s of simulation time after {} substeps",
                    self.accumulator,
                    self.max_substeps
                );
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= self.step;
            ticks += 1;
        }

        self.tick_count += u64::from(ticks);
        ticks
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

// ============================================================================
// TickPipeline
// ============================================================================

#[derive(Debug, Clone)]
pub struct TickPipeline {
    settings: LocomotionSettings,
    pd: PdController,
    probe: GroundProbe,
    timestep: FixedTimestep,
}

impl TickPipeline {
    pub fn new(settings: LocomotionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            pd: PdController::from_settings(&settings),
            probe: GroundProbe::from_settings(&settings.probe),
            timestep: FixedTimestep::from_settings(&settings)?,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &LocomotionSettings {
        &self.settings
    }

    #[must_use]
    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Runs every fixed tick that became due during `frame_delta` seconds.
    /// Returns the number of ticks run.
    pub fn update<W, E>(&mut self, frame_delta: f32, world: &mut W, entities: &mut [E]) -> Result<u32>
    where
        W: PhysicsWorld,
        E: AnimatedEntity<Handle = W::Handle>,
    {
        let ticks = self.timestep.advance(frame_delta);
        for _ in 0..ticks {
            self.tick(world, entities)?;
        }
        Ok(ticks)
    }

    /// Runs a single fixed tick.
    pub fn tick<W, E>(&mut self, world: &mut W, entities: &mut [E]) -> Result<()>
    where
        W: PhysicsWorld,
        E: AnimatedEntity<Handle = W::Handle>,
    {
        let dt = self.settings.fixed_timestep;

        motion::poll_resources(entities)?;
        motion::advance_controllers(entities, dt);
        motion::apply_animations(entities, self.settings.blend_threshold)?;
        motion::apply_motion_tracks(entities)?;

        dynamics::sync_bodies(world, entities);
        dynamics::synthesize_targets(&*world, entities, dt)?;
        dynamics::apply_forces(world, entities, &self.pd, &self.probe);
        world.step(dt);
        dynamics::copy_back(&*world, entities);

        Ok(())
    }
}

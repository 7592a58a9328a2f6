//! Animator Component
//!
//! # Overview
//!
//! The [`Animator`] is the per-entity owner of everything animation needs:
//! the skeleton, named clip slots (each with its own controller and optional
//! motion/event tracks) and the pose buffers consumed by rendering.
//!
//! All resources arrive as [`Fetched`] handles. [`Animator::poll_resources`]
//! observes their readiness once per tick; the skeleton transition sizes the
//! pose buffers exactly once, and a clip is checked against the skeleton's
//! joint count as soon as both are available.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut animator = Animator::new();
//! animator.use_skeleton(Fetched::spawn("hero", load_skeleton));
//! animator.use_animation("walk", Fetched::spawn("walk", load_walk)).play();
//! animator.use_motion_track("walk", Fetched::spawn("walk_motion", load_walk_motion))?;
//!
//! // every tick
//! animator.poll_resources()?;
//! animator.advance(dt);
//! animator.update_pose(settings.blend_threshold)?;
//! let hand = animator.bone_transform("hand_r");
//! ```

use glam::Affine3A;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::clip::AnimationClip;
use crate::animation::controller::AnimationController;
use crate::animation::events::EventTrack;
use crate::animation::motion::{MotionDelta, MotionTrack};
use crate::animation::pose::{
    BlendLayer, JointTransform, PoseBuffers, blend_layers, local_to_model, sample_clip,
};
use crate::animation::skeleton::Skeleton;
use crate::assets::Fetched;
use crate::errors::{Result, StrideError};

struct ClipSlot {
    name: String,
    clip: Fetched<AnimationClip>,
    controller: AnimationController,
    motion_track: Option<Fetched<MotionTrack>>,
    event_track: Option<Fetched<EventTrack>>,
    local_transforms: Vec<JointTransform>,
    compatible: bool,
}

impl ClipSlot {
    /// Bind-time check of a ready clip against a ready skeleton.
    fn check_against(&mut self, skeleton: &Skeleton) -> Result<()> {
        let Some(clip) = self.clip.get() else {
            return Ok(());
        };
        if clip.num_tracks() != skeleton.num_joints() {
            return Err(StrideError::JointCountMismatch {
                clip: self.name.clone(),
                tracks: clip.num_tracks(),
                joints: skeleton.num_joints(),
            });
        }
        clip.validate()?;
        self.local_transforms.clear();
        self.local_transforms
            .resize(skeleton.num_joints(), JointTransform::IDENTITY);
        self.compatible = true;
        Ok(())
    }
}

/// Per-entity animation state.
#[derive(Default)]
pub struct Animator {
    skeleton: Option<Fetched<Skeleton>>,
    slots: Vec<ClipSlot>,
    slot_lookup: FxHashMap<String, usize>,
    buffers: PoseBuffers,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Sets the skeleton. Pose buffers are (re)sized when it becomes ready.
    pub fn use_skeleton(&mut self, skeleton: Fetched<Skeleton>) -> &mut Self {
        self.skeleton = Some(skeleton);
        self.buffers = PoseBuffers::default();
        for slot in &mut self.slots {
            slot.compatible = false;
            slot.local_transforms.clear();
        }
        self
    }

    /// Binds `clip` to the slot `name` and returns the slot's controller.
    ///
    /// Rebinding an existing slot keeps its controller and tracks.
    pub fn use_animation(
        &mut self,
        name: impl Into<String>,
        clip: Fetched<AnimationClip>,
    ) -> &mut AnimationController {
        let name = name.into();
        let index = match self.slot_lookup.get(&name) {
            Some(&index) => {
                let slot = &mut self.slots[index];
                slot.clip = clip;
                slot.compatible = false;
                slot.local_transforms.clear();
                index
            }
            None => {
                let index = self.slots.len();
                self.slot_lookup.insert(name.clone(), index);
                self.slots.push(ClipSlot {
                    name,
                    clip,
                    controller: AnimationController::new(),
                    motion_track: None,
                    event_track: None,
                    local_transforms: Vec::new(),
                    compatible: false,
                });
                index
            }
        };
        &mut self.slots[index].controller
    }

    /// Attaches a root-motion curve to an existing clip slot.
    pub fn use_motion_track(&mut self, name: &str, track: Fetched<MotionTrack>) -> Result<()> {
        self.slot_mut(name)?.motion_track = Some(track);
        Ok(())
    }

    /// Attaches event markers to an existing clip slot.
    pub fn use_event_track(&mut self, name: &str, track: Fetched<EventTrack>) -> Result<()> {
        self.slot_mut(name)?.event_track = Some(track);
        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut ClipSlot> {
        let index = *self
            .slot_lookup
            .get(name)
            .ok_or_else(|| StrideError::UnknownClip(name.to_string()))?;
        Ok(&mut self.slots[index])
    }

    // ========================================================================
    // Resource readiness
    // ========================================================================

    /// Observes readiness transitions of every bound resource.
    ///
    /// Never blocks. Fails on a fetch that resolved without a value and on a
    /// clip that does not fit the skeleton.
    pub fn poll_resources(&mut self) -> Result<()> {
        let mut skeleton_arrived = false;
        if let Some(skeleton) = &mut self.skeleton
            && skeleton.poll()?
        {
            skeleton_arrived = true;
        }

        let skeleton = self.skeleton.as_ref().and_then(Fetched::get);

        if skeleton_arrived && let Some(skeleton) = skeleton {
            log::debug!(
                "Skeleton '{}' ready with {} joints",
                skeleton.name,
                skeleton.num_joints()
            );
            self.buffers.resize(skeleton.num_joints());
        }

        for slot in &mut self.slots {
            let clip_arrived = slot.clip.poll()?;
            if clip_arrived {
                log::debug!("Animation '{}' ready", slot.name);
            }
            if let Some(skeleton) = skeleton
                && !slot.compatible
            {
                slot.check_against(skeleton)?;
            }

            if let Some(track) = &mut slot.motion_track
                && track.poll()?
            {
                log::debug!("Motion track of '{}' ready", slot.name);
            }
            if let Some(track) = &mut slot.event_track
                && track.poll()?
            {
                log::debug!("Event track of '{}' ready", slot.name);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Advances every controller and fires crossed event markers.
    pub fn advance(&mut self, dt: f32) {
        for slot in &mut self.slots {
            slot.controller.advance(dt);
            if let Some(track) = slot.event_track.as_ref().and_then(Fetched::get) {
                slot.controller.fire_events(track);
            }
        }
    }

    /// Samples, blends and propagates the pose of this tick.
    ///
    /// A no-op until the skeleton is ready. Slots whose clip is still loading
    /// (or whose weight is zero) contribute nothing.
    pub fn update_pose(&mut self, blend_threshold: f32) -> Result<()> {
        let Some(skeleton) = self.skeleton.as_ref().and_then(Fetched::get) else {
            return Ok(());
        };
        if self.buffers.len() != skeleton.num_joints() {
            return Ok(());
        }

        let mut active: SmallVec<[bool; 8]> = SmallVec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let weight = slot.controller.computed_weight();
            if weight <= 0.0 || !slot.compatible {
                active.push(false);
                continue;
            }
            match sample_clip(
                Some(skeleton),
                slot.clip.get(),
                slot.controller.time_ratio(),
                &mut slot.local_transforms,
            ) {
                Ok(()) => active.push(true),
                Err(err) if err.is_transient() => {
                    log::trace!("Skipping '{}' this tick: {err}", slot.name);
                    active.push(false);
                }
                Err(err) => return Err(err),
            }
        }

        let layers: SmallVec<[BlendLayer<'_>; 4]> = self
            .slots
            .iter()
            .zip(&active)
            .filter(|(_, active)| **active)
            .map(|(slot, _)| BlendLayer::new(&slot.local_transforms, slot.controller.computed_weight()))
            .collect();

        blend_layers(
            &layers,
            skeleton.rest_pose(),
            blend_threshold,
            &mut self.buffers.blended_local,
        );
        local_to_model(skeleton, &self.buffers.blended_local, &mut self.buffers.model);
        Ok(())
    }

    /// This tick's weighted root-motion delta of every slot with a ready
    /// motion track and a positive weight.
    pub fn motion_deltas(&self) -> Result<SmallVec<[MotionDelta; 4]>> {
        let mut deltas = SmallVec::new();
        for slot in &self.slots {
            let Some(track) = slot.motion_track.as_ref().and_then(Fetched::get) else {
                continue;
            };
            if slot.controller.computed_weight() <= 0.0 {
                continue;
            }
            deltas.push(track.delta_for(&slot.controller)?);
        }
        Ok(deltas)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn controller(&self, name: &str) -> Option<&AnimationController> {
        self.slot_lookup
            .get(name)
            .map(|&index| &self.slots[index].controller)
    }

    #[must_use]
    pub fn controller_mut(&mut self, name: &str) -> Option<&mut AnimationController> {
        self.slot_lookup
            .get(name)
            .map(|&index| &mut self.slots[index].controller)
    }

    #[must_use]
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref().and_then(Fetched::get)
    }

    /// Model-space transform of every joint. Empty until the skeleton is ready.
    #[must_use]
    pub fn model_transforms(&self) -> &[Affine3A] {
        &self.buffers.model
    }

    #[must_use]
    pub fn blended_local_transforms(&self) -> &[JointTransform] {
        &self.buffers.blended_local
    }

    /// Model-space transform of the joint called `name`.
    #[must_use]
    pub fn bone_transform(&self, name: &str) -> Option<Affine3A> {
        let index = self.skeleton()?.find_joint(name)?;
        self.buffers.model.get(index).copied()
    }
}

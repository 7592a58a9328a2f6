use glam::{Quat, Vec3};

use crate::animation::pose::JointTransform;
use crate::animation::tracks::KeyframeTrack;
use crate::errors::Result;

/// Translation, rotation and scale curves of one joint.
///
/// An empty curve leaves that component at the joint's rest value.
#[derive(Debug, Clone)]
pub struct JointTrack {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl JointTrack {
    #[must_use]
    pub fn new(
        translation: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// A joint held at `pose` for the whole clip.
    #[must_use]
    pub fn constant(pose: JointTransform) -> Self {
        Self::new(
            KeyframeTrack::constant(pose.translation),
            KeyframeTrack::constant(pose.rotation),
            KeyframeTrack::constant(pose.scale),
        )
    }

    #[must_use]
    pub fn sample(&self, ratio: f32, rest: &JointTransform) -> JointTransform {
        JointTransform {
            translation: self.translation.sample_or(ratio, rest.translation),
            rotation: self.rotation.sample_or(ratio, rest.rotation).normalize(),
            scale: self.scale.sample_or(ratio, rest.scale),
        }
    }
}

/// Immutable sampled curve data, one [`JointTrack`] per skeleton joint.
///
/// Shared through `Arc` between every animator that plays it.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds; playback speed is expressed relative to it.
    pub duration: f32,
    pub joint_tracks: Vec<JointTrack>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, duration: f32, joint_tracks: Vec<JointTrack>) -> Self {
        Self {
            name: name.into(),
            duration,
            joint_tracks,
        }
    }

    #[inline]
    #[must_use]
    pub fn num_tracks(&self) -> usize {
        self.joint_tracks.len()
    }

    /// Checks every non-empty curve for consistent keys.
    pub fn validate(&self) -> Result<()> {
        for (index, track) in self.joint_tracks.iter().enumerate() {
            if !track.translation.is_empty() {
                track
                    .translation
                    .validate(&format!("{}[{index}].translation", self.name))?;
            }
            if !track.rotation.is_empty() {
                track
                    .rotation
                    .validate(&format!("{}[{index}].rotation", self.name))?;
            }
            if !track.scale.is_empty() {
                track.scale.validate(&format!("{}[{index}].scale", self.name))?;
            }
        }
        Ok(())
    }
}

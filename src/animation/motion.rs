//! Root Motion Extraction
//!
//! # Overview
//!
//! A [`MotionTrack`] is a translation/rotation curve authored alongside a
//! clip but stored separately from the joint tracks. It is sampled with the
//! same playback ratio as its clip.
//!
//! The per-tick motion is the relative transform between two samples:
//!
//! ```text
//! delta = sample(time_ratio) * inverse(sample(last_time_ratio))
//! ```
//!
//! When playback wrapped during the tick, the naive delta would jump back to
//! the start of the curve. Each wrap instead splices in the authored
//! end-to-start motion `sample(1) * inverse(sample(0))`, so summing deltas
//! over any number of loops equals walking the unrolled curve.

use glam::{Affine3A, Quat, Vec3};

use crate::animation::controller::AnimationController;
use crate::animation::tracks::KeyframeTrack;
use crate::errors::Result;
use crate::math::{interpolate_from_identity, rotation_translation, try_inverse};

// ============================================================================
// MotionDelta
// ============================================================================

/// Root displacement over one tick, in track space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDelta {
    pub transform: Affine3A,
}

impl MotionDelta {
    pub const IDENTITY: Self = Self {
        transform: Affine3A::IDENTITY,
    };

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.transform.translation.into()
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        rotation_translation(&self.transform).0
    }

    /// Interpolates the delta from identity by `weight`.
    #[must_use]
    pub fn weighted(&self, weight: f32) -> Self {
        Self {
            transform: interpolate_from_identity(&self.transform, weight.clamp(0.0, 1.0)),
        }
    }
}

// ============================================================================
// MotionTrack
// ============================================================================

#[derive(Debug, Clone)]
pub struct MotionTrack {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
}

impl MotionTrack {
    pub fn new(translation: KeyframeTrack<Vec3>, rotation: KeyframeTrack<Quat>) -> Result<Self> {
        translation.validate("motion translation")?;
        rotation.validate("motion rotation")?;
        Ok(Self {
            translation,
            rotation,
        })
    }

    /// Samples the curves into a unit-scale affine transform.
    #[must_use]
    pub fn sample(&self, ratio: f32) -> Affine3A {
        let ratio = ratio.clamp(0.0, 1.0);
        let translation = self.translation.sample_or(ratio, Vec3::ZERO);
        let rotation = self.rotation.sample_or(ratio, Quat::IDENTITY).normalize();
        Affine3A::from_rotation_translation(rotation, translation)
    }

    /// Authored motion of one full loop: `sample(1) * inverse(sample(0))`.
    pub fn loop_delta(&self) -> Result<Affine3A> {
        Ok(self.sample(1.0) * try_inverse(&self.sample(0.0), "inverting the motion track start")?)
    }

    /// Motion between `last_time_ratio` and `time_ratio`, with `loops` signed
    /// end-to-start wraps spliced in.
    pub fn compute_delta(&self, time_ratio: f32, last_time_ratio: f32, loops: i32) -> Result<MotionDelta> {
        let current = self.sample(time_ratio);
        let last = self.sample(last_time_ratio);
        let mut delta = current * try_inverse(&last, "inverting the previous motion sample")?;

        if loops != 0 {
            let mut splice = self.loop_delta()?;
            if loops < 0 {
                splice = try_inverse(&splice, "inverting the loop delta")?;
            }
            for _ in 0..loops.unsigned_abs() {
                delta = splice * delta;
            }
        }

        Ok(MotionDelta { transform: delta })
    }

    /// Delta of this tick for `controller`, interpolated by its computed weight.
    pub fn delta_for(&self, controller: &AnimationController) -> Result<MotionDelta> {
        let delta = self.compute_delta(
            controller.time_ratio(),
            controller.last_time_ratio(),
            controller.loops_completed(),
        )?;
        Ok(delta.weighted(controller.computed_weight()))
    }
}

//! Skeletal Sampling and Pose Blending
//!
//! # Overview
//!
//! A pose is produced in three stages, each consuming the previous stage's
//! output of the same tick:
//!
//! 1. [`sample_clip`] evaluates one clip at a playback ratio into a
//!    joint-count-sized buffer of local transforms.
//! 2. [`blend_layers`] merges the sampled layers by weight. Joints whose
//!    accumulated weight is below the blend threshold are completed with the
//!    skeleton's rest pose, so an unanimated joint never degenerates.
//! 3. [`local_to_model`] walks the hierarchy parent-before-child and
//!    composes `model[i] = model[parent] * local[i]`.
//!
//! # Usage
//!
//! ```rust,ignore
//! sample_clip(Some(&skeleton), Some(&clip), controller.time_ratio(), &mut layer)?;
//! blend_layers(&[BlendLayer::new(&layer, 1.0)], skeleton.rest_pose(), 0.1, &mut buffers.blended_local);
//! local_to_model(&skeleton, &buffers.blended_local, &mut buffers.model);
//! ```

use glam::{Affine3A, Quat, Vec3, Vec4};

use crate::animation::clip::AnimationClip;
use crate::animation::skeleton::Skeleton;
use crate::errors::{Result, StrideError};

const MIN_TOTAL_WEIGHT: f32 = 1e-6;

// ============================================================================
// JointTransform
// ============================================================================

/// Local transform of a single joint relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub const fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

// ============================================================================
// PoseBuffers
// ============================================================================

/// Per-entity scratch space for the blended pose.
///
/// Starts empty and is sized once, when the skeleton becomes available.
/// Until then every pose stage is a no-op over zero joints.
#[derive(Debug, Clone, Default)]
pub struct PoseBuffers {
    pub blended_local: Vec<JointTransform>,
    pub model: Vec<Affine3A>,
}

impl PoseBuffers {
    pub fn resize(&mut self, joint_count: usize) {
        self.blended_local.clear();
        self.blended_local.resize(joint_count, JointTransform::IDENTITY);
        self.model.clear();
        self.model.resize(joint_count, Affine3A::IDENTITY);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.model.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Samples `clip` at `ratio` into `out`, one local transform per joint.
///
/// Returns [`StrideError::ResourceNotReady`] while the skeleton or clip is
/// still loading or `out` has not been sized yet; callers skip the layer for
/// this tick. A clip whose track count differs from the skeleton's joint count
/// is a content error.
pub fn sample_clip(
    skeleton: Option<&Skeleton>,
    clip: Option<&AnimationClip>,
    ratio: f32,
    out: &mut [JointTransform],
) -> Result<()> {
    let skeleton = skeleton.ok_or(StrideError::ResourceNotReady("skeleton"))?;
    let clip = clip.ok_or(StrideError::ResourceNotReady("animation clip"))?;

    if clip.num_tracks() != skeleton.num_joints() {
        return Err(StrideError::JointCountMismatch {
            clip: clip.name.clone(),
            tracks: clip.num_tracks(),
            joints: skeleton.num_joints(),
        });
    }
    if out.len() != skeleton.num_joints() {
        return Err(StrideError::ResourceNotReady("pose buffer"));
    }

    let ratio = ratio.clamp(0.0, 1.0);
    for ((slot, track), rest) in out
        .iter_mut()
        .zip(&clip.joint_tracks)
        .zip(skeleton.rest_pose())
    {
        *slot = track.sample(ratio, rest);
    }
    Ok(())
}

// ============================================================================
// Blending
// ============================================================================

/// One sampled pose taking part in a blend.
#[derive(Debug, Clone, Copy)]
pub struct BlendLayer<'a> {
    pub transforms: &'a [JointTransform],
    pub weight: f32,
    /// Optional per-joint multipliers of `weight` (missing entries count as 1).
    pub joint_weights: Option<&'a [f32]>,
}

impl<'a> BlendLayer<'a> {
    #[must_use]
    pub fn new(transforms: &'a [JointTransform], weight: f32) -> Self {
        Self {
            transforms,
            weight,
            joint_weights: None,
        }
    }

    #[must_use]
    pub fn with_joint_weights(mut self, joint_weights: &'a [f32]) -> Self {
        self.joint_weights = Some(joint_weights);
        self
    }

    #[inline]
    fn weight_for(&self, joint: usize) -> f32 {
        let scale = self
            .joint_weights
            .and_then(|weights| weights.get(joint).copied())
            .unwrap_or(1.0);
        (self.weight * scale).max(0.0)
    }
}

#[derive(Clone, Copy)]
struct Accumulator {
    translation: Vec3,
    rotation: Vec4,
    scale: Vec3,
    weight: f32,
}

impl Accumulator {
    const ZERO: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec4::ZERO,
        scale: Vec3::ZERO,
        weight: 0.0,
    };

    fn add(&mut self, transform: &JointTransform, weight: f32) {
        let mut rotation = Vec4::from(transform.rotation);
        // Keep every contribution in the hemisphere of the first one
        if self.rotation.dot(rotation) < 0.0 {
            rotation = -rotation;
        }
        self.translation += transform.translation * weight;
        self.rotation += rotation * weight;
        self.scale += transform.scale * weight;
        self.weight += weight;
    }

    fn resolve(&self, rest: &JointTransform) -> JointTransform {
        if self.weight <= MIN_TOTAL_WEIGHT {
            return *rest;
        }
        let inv = self.weight.recip();
        let rotation = if self.rotation.length_squared() > MIN_TOTAL_WEIGHT {
            Quat::from_vec4(self.rotation).normalize()
        } else {
            rest.rotation
        };
        JointTransform {
            translation: self.translation * inv,
            rotation,
            scale: self.scale * inv,
        }
    }
}

/// Weighted average of `layers` into `out`.
///
/// Per joint, the contributions are normalized by their total weight. When
/// that total is below `threshold`, the rest pose is mixed in with the
/// remaining `threshold - total`, so weights `(0, 0)` reproduce the rest pose
/// exactly while a single layer at full weight is reproduced unchanged.
///
/// Layers shorter than `out` only contribute to the joints they cover.
pub fn blend_layers(
    layers: &[BlendLayer<'_>],
    rest_pose: &[JointTransform],
    threshold: f32,
    out: &mut [JointTransform],
) {
    for (joint, (slot, rest)) in out.iter_mut().zip(rest_pose).enumerate() {
        let mut acc = Accumulator::ZERO;

        for layer in layers {
            let weight = layer.weight_for(joint);
            if weight <= 0.0 {
                continue;
            }
            if let Some(transform) = layer.transforms.get(joint) {
                acc.add(transform, weight);
            }
        }

        if acc.weight < threshold {
            acc.add(rest, threshold - acc.weight);
        }

        *slot = acc.resolve(rest);
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Composes local transforms into model space, parents before children.
///
/// Parentless joints use their local transform directly.
pub fn local_to_model(skeleton: &Skeleton, locals: &[JointTransform], models: &mut [Affine3A]) {
    let count = skeleton.num_joints().min(locals.len()).min(models.len());
    let parents = skeleton.parents();

    for index in 0..count {
        let local = locals[index].to_affine();
        models[index] = match parents[index] {
            Some(parent) => models[usize::from(parent)] * local,
            None => local,
        };
    }
}

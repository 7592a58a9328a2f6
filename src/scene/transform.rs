use glam::{Affine3A, Quat, Vec3};

use crate::math::rotation_translation;

/// Visual transform of an entity (feet origin, world space).
///
/// Written by root motion on kinematic entities and by the physics copy-back
/// on dynamic ones. Gameplay may also write it directly; for a dynamic body
/// such a write is treated as a teleport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Sets position and rotation from a rigid transform, keeping the scale.
    pub fn set_rigid(&mut self, matrix: &Affine3A) {
        let (rotation, translation) = rotation_translation(matrix);
        self.rotation = rotation;
        self.position = translation;
    }

    /// Applies `delta` in the transform's local frame: `self = self * delta`.
    ///
    /// Scale is left untouched; only the rigid part of `delta` is used.
    pub fn apply_local_delta(&mut self, delta: &Affine3A) {
        let (delta_rotation, delta_translation) = rotation_translation(delta);
        self.position += self.rotation * (self.scale * delta_translation);
        self.rotation = (self.rotation * delta_rotation).normalize();
    }
}

use crate::animation::pose::JointTransform;
use crate::errors::{Result, StrideError};

/// Joint hierarchy and rest pose.
///
/// Joints are stored parent-before-child: `parents[i]`, when present, is
/// always smaller than `i`. A single forward pass therefore visits every
/// parent before its children.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    joint_names: Vec<String>,
    parents: Vec<Option<u16>>,
    rest_pose: Vec<JointTransform>,
}

impl Skeleton {
    pub fn new(
        name: impl Into<String>,
        joint_names: Vec<String>,
        parents: Vec<Option<u16>>,
        rest_pose: Vec<JointTransform>,
    ) -> Result<Self> {
        let name = name.into();
        let count = joint_names.len();

        if parents.len() != count || rest_pose.len() != count {
            return Err(StrideError::InvalidSkeleton(format!(
                "'{name}': {count} names, {} parents, {} rest transforms",
                parents.len(),
                rest_pose.len()
            )));
        }
        if count > usize::from(u16::MAX) {
            return Err(StrideError::InvalidSkeleton(format!(
                "'{name}': {count} joints exceed the index range"
            )));
        }
        for (index, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent
                && usize::from(*parent) >= index
            {
                return Err(StrideError::InvalidSkeleton(format!(
                    "'{name}': joint {index} has parent {parent}, parents must precede children"
                )));
            }
        }

        Ok(Self {
            name,
            joint_names,
            parents,
            rest_pose,
        })
    }

    #[inline]
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[Option<u16>] {
        &self.parents
    }

    #[inline]
    #[must_use]
    pub fn rest_pose(&self) -> &[JointTransform] {
        &self.rest_pose
    }

    #[inline]
    #[must_use]
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// Linear scan by name.
    #[must_use]
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|joint| joint == name)
    }
}

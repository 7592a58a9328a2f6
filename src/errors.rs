//! Error Types
//!
//! This module defines the error types used throughout the locomotion stack.
//!
//! # Overview
//!
//! The main error type [`StrideError`] separates three classes of trouble:
//! - Content errors (joint-count mismatch, non-invertible sampled transform,
//!   malformed skeleton). These are fatal: the host is expected to terminate
//!   with the diagnostic instead of rendering or simulating a corrupt pose.
//! - Transient unavailability ([`StrideError::ResourceNotReady`]). Only the
//!   low-level sampler reports it; systems absorb it as "skip this tick".
//! - Fetch failures, reported once by the polling consumer (fail-fast).
//!
//! Numerical degeneracies never surface here; they are substituted locally.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stride::errors::{StrideError, Result};
//!
//! fn bind() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the locomotion stack.
#[derive(Error, Debug)]
pub enum StrideError {
    // ========================================================================
    // Transient
    // ========================================================================
    /// A skeleton, clip or motion track is still loading.
    #[error("Resource not ready: {0}")]
    ResourceNotReady(&'static str),

    // ========================================================================
    // Content Errors
    // ========================================================================
    /// A bound clip animates a different number of joints than its skeleton has.
    #[error("Incompatible animation '{clip}' with {tracks} tracks and skeleton with {joints} joints")]
    JointCountMismatch {
        /// Clip slot name
        clip: String,
        /// Number of joint tracks in the clip
        tracks: usize,
        /// Number of joints in the skeleton
        joints: usize,
    },

    /// A sampled transform could not be inverted.
    #[error("Non-invertible transform while {context}")]
    NonInvertibleTransform {
        /// What was being computed
        context: &'static str,
    },

    /// A clip slot name was referenced before a clip was bound to it.
    #[error("Unknown animation slot: {0}")]
    UnknownClip(String),

    /// Skeleton data violates the parent-before-child ordering or is inconsistent.
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// A keyframe track has no keys.
    #[error("Empty keyframe track: {0}")]
    EmptyTrack(String),

    // ========================================================================
    // Fetch & Configuration
    // ========================================================================
    /// A background fetch resolved without a value.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Settings could not be parsed or are out of range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<serde_json::Error> for StrideError {
    fn from(err: serde_json::Error) -> Self {
        StrideError::InvalidSettings(err.to_string())
    }
}

impl StrideError {
    /// Returns `true` for errors that only mean "try again next tick".
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StrideError::ResourceNotReady(_))
    }
}

/// Alias for `Result<T, StrideError>`.
pub type Result<T> = std::result::Result<T, StrideError>;

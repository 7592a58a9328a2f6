//! Locomotion Settings
//!
//! Tuning values for the PD controller, the grounding probe, pose blending and
//! the fixed simulation tick.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stride::settings::LocomotionSettings;
//!
//! // Defaults tuned for a ~70 kg humanoid capsule
//! let settings = LocomotionSettings::default();
//!
//! // Partial overrides from JSON; missing fields keep their defaults
//! let settings = LocomotionSettings::from_json_str(r#"{ "airborne_angular_scale": 0.2 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StrideError};

// ---------------------------------------------------------------------------
// PdGains
// ---------------------------------------------------------------------------

/// Proportional-derivative gains with an output magnitude limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdGains {
    /// Proportional gain (applied to the position / yaw error).
    pub kp: f32,
    /// Derivative gain (applied to the velocity / yaw-rate error).
    pub kd: f32,
    /// Maximum output magnitude. Larger outputs are rescaled uniformly.
    pub max_magnitude: f32,
}

impl PdGains {
    #[must_use]
    pub const fn new(kp: f32, kd: f32, max_magnitude: f32) -> Self {
        Self { kp, kd, max_magnitude }
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.kp < 0.0 || self.kd < 0.0 || self.max_magnitude < 0.0 {
            return Err(StrideError::InvalidSettings(format!(
                "{label} gains must be non-negative (kp={}, kd={}, max={})",
                self.kp, self.kd, self.max_magnitude
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GroundProbeSettings
// ---------------------------------------------------------------------------

/// Grounding probe parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbeSettings {
    /// Probe distance below the body origin. The ray extends one extra meter
    /// past it so that the body's own half-height is covered.
    pub max_distance: f32,
    /// Most permissive accepted angle between the hit normal and "up".
    ///
    /// The default (160°) accepts nearly anything that faces upward at all:
    /// the probe answers "is there a floor", not "is it walkable".
    pub slope_limit_degrees: f32,
}

impl Default for GroundProbeSettings {
    fn default() -> Self {
        Self {
            max_distance: 0.5,
            slope_limit_degrees: 160.0,
        }
    }
}

// ---------------------------------------------------------------------------
// LocomotionSettings
// ---------------------------------------------------------------------------

/// Top-level tuning for animation-driven locomotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionSettings {
    /// Horizontal position/velocity PD (output: force in newtons).
    pub linear: PdGains,
    /// Yaw PD about "up" (output: torque in newton-meters).
    pub angular: PdGains,
    /// Multiplier applied to both yaw gains while the body is airborne.
    pub airborne_angular_scale: f32,
    /// Grounding probe parameters.
    pub probe: GroundProbeSettings,
    /// Below this accumulated layer weight the rest pose is mixed in.
    pub blend_threshold: f32,
    /// Fixed simulation tick, in seconds.
    pub fixed_timestep: f32,
    /// Maximum number of fixed ticks run for a single frame.
    pub max_substeps: u32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            linear: PdGains::new(1800.0, 0.0, 6000.0),
            angular: PdGains::new(400.0, 0.0, 1200.0),
            airborne_angular_scale: 0.35,
            probe: GroundProbeSettings::default(),
            blend_threshold: 0.1,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 8,
        }
    }
}

impl LocomotionSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks ranges that would otherwise produce nonsensical control output.
    pub fn validate(&self) -> Result<()> {
        self.linear.validate("linear")?;
        self.angular.validate("angular")?;

        if !(0.0..=1.0).contains(&self.airborne_angular_scale) {
            return Err(StrideError::InvalidSettings(format!(
                "airborne_angular_scale must lie in [0, 1], got {}",
                self.airborne_angular_scale
            )));
        }
        if self.probe.max_distance < 0.0 {
            return Err(StrideError::InvalidSettings(format!(
                "probe.max_distance must be non-negative, got {}",
                self.probe.max_distance
            )));
        }
        if self.probe.slope_limit_degrees <= 0.0 || self.probe.slope_limit_degrees > 180.0 {
            return Err(StrideError::InvalidSettings(format!(
                "probe.slope_limit_degrees must lie in (0, 180], got {}",
                self.probe.slope_limit_degrees
            )));
        }
        if self.blend_threshold < 0.0 {
            return Err(StrideError::InvalidSettings(format!(
                "blend_threshold must be non-negative, got {}",
                self.blend_threshold
            )));
        }
        if self.fixed_timestep <= 0.0 {
            return Err(StrideError::InvalidSettings(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(StrideError::InvalidSettings(
                "max_substeps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

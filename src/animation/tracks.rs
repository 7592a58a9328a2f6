// src/animation/tracks.rs
use crate::animation::values::Interpolatable;
use crate::errors::{Result, StrideError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// Keyframes parametrized by playback ratio.
///
/// `ratios` are ascending values in `[0, 1]`. Sampling before the first or
/// after the last key clamps to that key.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub ratios: Vec<f32>,
    pub values: Vec<T>, // For CubicSpline, length is ratios.len() * 3
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(ratios: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            ratios,
            values,
            interpolation,
        }
    }

    /// Single-key track holding `value` for the whole clip.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self::new(vec![0.0], vec![value], InterpolationMode::Step)
    }

    /// Checks key/value counts and key ordering.
    pub fn validate(&self, label: &str) -> Result<()> {
        if self.ratios.is_empty() {
            return Err(StrideError::EmptyTrack(label.to_string()));
        }
        let expected_values = match self.interpolation {
            InterpolationMode::CubicSpline => self.ratios.len() * 3,
            _ => self.ratios.len(),
        };
        if self.values.len() != expected_values {
            return Err(StrideError::EmptyTrack(format!(
                "{label}: {} keys but {} values",
                self.ratios.len(),
                self.values.len()
            )));
        }
        if self.ratios.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(StrideError::EmptyTrack(format!(
                "{label}: key ratios are not ascending"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    /// Samples the track at `ratio`. Empty tracks yield `fallback`.
    #[must_use]
    pub fn sample_or(&self, ratio: f32, fallback: T) -> T {
        let len = self.ratios.len();
        if len == 0 {
            return fallback;
        }
        if len == 1 {
            return self.value_at(0);
        }

        // First key strictly after `ratio`
        let next_idx = self.ratios.partition_point(|&r| r <= ratio);
        if next_idx == 0 {
            return self.value_at(0);
        }
        if next_idx >= len {
            return self.value_at(len - 1);
        }

        let index = next_idx - 1;
        let r0 = self.ratios[index];
        let r1 = self.ratios[next_idx];
        let dr = r1 - r0;
        let t = if dr > 1e-6 { ((ratio - r0) / dr).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;
                T::interpolate_cubic(
                    self.values[i_prev + 1],
                    self.values[i_prev + 2],
                    self.values[i_next],
                    self.values[i_next + 1],
                    t,
                    dr,
                )
            }
        }
    }

    /// For CubicSpline the value sits between the in- and out-tangent.
    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_linear_midpoint_and_clamping() {
        let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);
        assert!((track.sample_or(0.5, 0.0) - 5.0).abs() < 1e-5);
        assert!((track.sample_or(-1.0, 0.0) - 0.0).abs() < 1e-5);
        assert!((track.sample_or(2.0, 0.0) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_step_holds_previous_key() {
        let track = KeyframeTrack::new(
            vec![0.0, 0.5, 1.0],
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            InterpolationMode::Step,
        );
        assert_eq!(track.sample_or(0.49, Vec3::ZERO), Vec3::ZERO);
        assert_eq!(track.sample_or(0.5, Vec3::ZERO), Vec3::X);
        assert_eq!(track.sample_or(0.99, Vec3::ZERO), Vec3::X);
    }

    #[test]
    fn test_quat_linear_is_slerp() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
            InterpolationMode::Linear,
        );
        let mid = track.sample_or(0.5, Quat::IDENTITY);
        assert!(mid.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2 * 0.5), 1e-5));
    }

    #[test]
    fn test_cubic_hits_keys() {
        let track = KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![0.0_f32, 2.0, 1.0, 1.0, 4.0, 0.0],
            InterpolationMode::CubicSpline,
        );
        assert!((track.sample_or(0.0, 0.0) - 2.0).abs() < 1e-5);
        assert!((track.sample_or(1.0, 0.0) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_validate() {
        let empty: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
        assert!(empty.validate("empty").is_err());
        let unordered = KeyframeTrack::new(vec![0.5, 0.2], vec![0.0_f32, 1.0], InterpolationMode::Linear);
        assert!(unordered.validate("unordered").is_err());
        assert!(KeyframeTrack::constant(1.0_f32).validate("constant").is_ok());
    }
}

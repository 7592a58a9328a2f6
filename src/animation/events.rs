use serde::{Deserialize, Serialize};

/// A named marker at a normalized clip time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub name: String,
    pub time_normalized: f32,
}

impl AnimationEvent {
    #[must_use]
    pub fn new(name: impl Into<String>, time_normalized: f32) -> Self {
        Self {
            name: name.into(),
            time_normalized,
        }
    }
}

/// Markers tied to one clip, ordered by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTrack {
    pub events: Vec<AnimationEvent>,
}

impl EventTrack {
    #[must_use]
    pub fn new(mut events: Vec<AnimationEvent>) -> Self {
        events.sort_by(|a, b| a.time_normalized.total_cmp(&b.time_normalized));
        Self { events }
    }

    /// Parses a JSON array of `{ "name", "time_normalized" }` objects.
    pub fn from_json_str(json: &str) -> crate::errors::Result<Self> {
        let events: Vec<AnimationEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Events whose marker was crossed while moving from `last` to `current`.
    pub fn crossed(
        &self,
        last: f32,
        current: f32,
        direction: PlaybackDirection,
    ) -> impl Iterator<Item = &AnimationEvent> {
        self.events.iter().filter(move |event| {
            is_crossed(last, current, event.time_normalized.clamp(0.0, 1.0), direction)
        })
    }
}

/// Which way the playback ratio moved during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackDirection {
    #[default]
    Forward,
    Backward,
}

impl PlaybackDirection {
    #[inline]
    #[must_use]
    pub fn of_speed(speed: f32) -> Self {
        if speed < 0.0 { Self::Backward } else { Self::Forward }
    }
}

/// Circular interval test over a wrapping ratio.
///
/// Playing forward, the marker must lie in `(last, current]`, or after a wrap
/// (`last > current`) in `(last, 1]` or `[0, current]`. Playing backward the
/// interval is mirrored: `[current, last)`, or after a wrap (`last < current`)
/// `[0, last)` or `[current, 1]`.
#[inline]
#[must_use]
pub fn is_crossed(last: f32, current: f32, marker: f32, direction: PlaybackDirection) -> bool {
    match direction {
        PlaybackDirection::Forward if last <= current => last < marker && marker <= current,
        PlaybackDirection::Forward => last < marker || marker <= current,
        PlaybackDirection::Backward if last >= current => current <= marker && marker < last,
        PlaybackDirection::Backward => marker < last || marker >= current,
    }
}

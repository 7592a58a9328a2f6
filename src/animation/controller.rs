//! Per-clip playback state.
//!
//! An [`AnimationController`] tracks where one clip slot is in its playback,
//! expressed as a ratio in `[0, 1)` rather than seconds. `last_time_ratio`
//! keeps the value of the previous tick so that later stages can measure what
//! was crossed (events) or travelled (root motion) during this tick.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::animation::events::{EventTrack, PlaybackDirection};

/// Callback invoked when a named event marker is crossed.
pub type EventCallback = Box<dyn FnMut() + Send>;

/// Largest ratio a non-looping controller stops at.
const LAST_RATIO: f32 = 1.0 - f32::EPSILON;

pub struct AnimationController {
    time_ratio: f32,
    last_time_ratio: f32,
    is_playing: bool,
    is_looping: bool,
    playback_speed: f32,
    weight: f32,
    /// Fade duration in seconds. Stored only; `computed_weight` does not ramp yet.
    fade_duration: f32,
    computed_weight: f32,
    has_looped: bool,
    loops_completed: i32,
    direction: PlaybackDirection,
    /// Set on the tick a non-looping clip reaches its end.
    reached_end: bool,
    event_callbacks: FxHashMap<String, EventCallback>,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    /// Stopped at ratio 0, looping, speed 1, weight 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_ratio: 0.0,
            last_time_ratio: 0.0,
            is_playing: false,
            is_looping: true,
            playback_speed: 1.0,
            weight: 1.0,
            fade_duration: 0.0,
            computed_weight: 1.0,
            has_looped: false,
            loops_completed: 0,
            direction: PlaybackDirection::Forward,
            reached_end: false,
            event_callbacks: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Gameplay-facing setters
    // ========================================================================

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Pauses and rewinds to ratio 0.
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.time_ratio = 0.0;
        self.last_time_ratio = 0.0;
        self.has_looped = false;
        self.loops_completed = 0;
        self.reached_end = false;
    }

    /// Jumps to `ratio` (wrapped into `[0, 1)`).
    ///
    /// The jump itself produces no root motion: the next `advance` measures
    /// travel from the new position.
    pub fn set_time(&mut self, ratio: f32) {
        self.time_ratio = wrap_ratio(ratio);
    }

    pub fn set_loop(&mut self, is_looping: bool) {
        self.is_looping = is_looping;
    }

    /// Ratio units per second. Negative values play backwards.
    pub fn set_speed(&mut self, playback_speed: f32) {
        self.playback_speed = playback_speed;
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.max(0.0);
        self.computed_weight = self.weight;
    }

    pub fn set_fade(&mut self, seconds: f32) {
        self.fade_duration = seconds.max(0.0);
    }

    pub fn set_event_callback(&mut self, name: impl Into<String>, callback: impl FnMut() + Send + 'static) {
        self.event_callbacks.insert(name.into(), Box::new(callback));
    }

    pub fn remove_event_callback(&mut self, name: &str) -> bool {
        self.event_callbacks.remove(name).is_some()
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Advances playback by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.last_time_ratio = self.time_ratio;
        self.has_looped = false;
        self.loops_completed = 0;
        self.reached_end = false;
        self.computed_weight = self.weight;

        if !self.is_playing {
            return;
        }

        self.direction = PlaybackDirection::of_speed(self.playback_speed);
        let advanced = self.time_ratio + self.playback_speed * dt;

        if self.is_looping {
            let loops = advanced.floor();
            self.loops_completed = loops as i32;
            self.has_looped = advanced >= 1.0;
            self.time_ratio = wrap_ratio(advanced);
        } else if advanced >= LAST_RATIO {
            self.time_ratio = LAST_RATIO;
            self.is_playing = false;
            self.reached_end = true;
        } else if advanced <= 0.0 {
            self.time_ratio = 0.0;
            self.is_playing = false;
        } else {
            self.time_ratio = advanced;
        }
    }

    /// Invokes the callbacks of every marker crossed during the last advance.
    ///
    /// A non-looping clip that reached its end this tick counts as having
    /// reached ratio 1, so end-of-clip markers fire.
    pub fn fire_events(&mut self, track: &EventTrack) {
        let current = if self.reached_end { 1.0 } else { self.time_ratio };
        for event in track.crossed(self.last_time_ratio, current, self.direction) {
            if let Some(callback) = self.event_callbacks.get_mut(&event.name) {
                callback();
            }
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn time_ratio(&self) -> f32 {
        self.time_ratio
    }

    #[inline]
    #[must_use]
    pub fn last_time_ratio(&self) -> f32 {
        self.last_time_ratio
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[inline]
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    #[inline]
    #[must_use]
    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    #[must_use]
    pub fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    /// Effective blend weight. Equal to `weight` until fading is implemented.
    #[inline]
    #[must_use]
    pub fn computed_weight(&self) -> f32 {
        self.computed_weight
    }

    /// Whether the last advance wrapped past the end of the clip.
    #[inline]
    #[must_use]
    pub fn has_looped(&self) -> bool {
        self.has_looped
    }

    /// Direction of travel during the last advance.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> PlaybackDirection {
        self.direction
    }

    /// Signed number of end-to-start wraps during the last advance
    /// (negative when playing backwards).
    #[inline]
    #[must_use]
    pub fn loops_completed(&self) -> i32 {
        self.loops_completed
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("time_ratio", &self.time_ratio)
            .field("last_time_ratio", &self.last_time_ratio)
            .field("is_playing", &self.is_playing)
            .field("is_looping", &self.is_looping)
            .field("playback_speed", &self.playback_speed)
            .field("weight", &self.weight)
            .field("has_looped", &self.has_looped)
            .field("callbacks", &self.event_callbacks.len())
            .finish()
    }
}

#[inline]
fn wrap_ratio(ratio: f32) -> f32 {
    let wrapped = ratio.rem_euclid(1.0);
    // rem_euclid rounds tiny negative inputs up to exactly 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

pub mod animator;
pub mod clip;
pub mod controller;
pub mod events;
pub mod motion;
pub mod pose;
pub mod skeleton;
pub mod tracks;
pub mod values;

pub use animator::Animator;
pub use clip::{AnimationClip, JointTrack};
pub use controller::{AnimationController, EventCallback};
pub use events::{AnimationEvent, EventTrack, PlaybackDirection};
pub use motion::{MotionDelta, MotionTrack};
pub use pose::{BlendLayer, JointTransform, PoseBuffers};
pub use skeleton::Skeleton;
pub use tracks::{InterpolationMode, KeyframeTrack};
pub use values::Interpolatable;

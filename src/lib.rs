#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Stride
//!
//! Animation-driven locomotion: skeletal clips are sampled and blended into a
//! render pose, their root-motion curves are differenced into loop-safe
//! per-tick deltas, and a clamped PD controller turns those deltas into forces
//! on a simulated body.
//!
//! The physics world, entity storage and resource loading belong to the host
//! and are reached through [`physics::PhysicsWorld`],
//! [`systems::AnimatedEntity`] and [`assets::Fetched`].

pub mod animation;
pub mod assets;
pub mod errors;
pub mod locomotion;
pub mod math;
pub mod physics;
pub mod scene;
pub mod settings;
pub mod systems;

pub use animation::{
    AnimationClip, AnimationController, AnimationEvent, Animator, EventTrack, JointTrack,
    JointTransform, MotionTrack, Skeleton,
};
pub use assets::{FetchPromise, Fetched};
pub use errors::{Result, StrideError};
pub use locomotion::LocomotionTarget;
pub use physics::{
    BodyPose, CollisionLayers, DynamicBody, GroundProbe, PdController, PhysicsBody,
    PhysicsWorld, RayHit, RigidBody,
};
pub use scene::Transform;
pub use settings::LocomotionSettings;
pub use systems::{AnimatedEntity, EntityParts, FixedTimestep, TickPipeline};

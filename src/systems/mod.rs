//! Per-tick systems.
//!
//! Each system is a free function over the host's entity slice; the
//! [`TickPipeline`] calls them in their required order.

pub mod dynamics;
pub mod motion;
pub mod pipeline;

pub use pipeline::{AnimatedEntity, EntityParts, FixedTimestep, TickPipeline};

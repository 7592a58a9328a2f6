pub mod grounding;
pub mod pd;
pub mod rigidbody;
pub mod world;

pub use grounding::GroundProbe;
pub use pd::{BodyState, PdController};
pub use rigidbody::{BodyBinding, DynamicBody, RigidBody};
pub use world::{BodyPose, CollisionLayers, PhysicsBody, PhysicsWorld, RayHit};

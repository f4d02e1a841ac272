// Impulse-based rigid body physics: integration, brute-force pair collision
// detection, contact events, and debug geometry extraction

pub mod body;
mod collider;
mod collision;
mod debug;
mod world;

pub use body::RigidBody;
pub use collider::{Collider, ColliderShape};
pub use collision::{CollisionInfo, CollisionListener, ListenerHandle};
pub use debug::{DebugLines, DebugVertex};
pub use world::{ColliderHandle, PhysicsWorld, RigidBodyHandle, DEFAULT_GRAVITY};

// Re-export the vector type used throughout the physics API
pub use glam::Vec2;

//! A lightweight 2D physics engine with impulse-based collision resolution.
//!
//! Bodies and colliders live in a [`PhysicsWorld`] and are addressed by
//! generational handles. The world advances with semi-implicit Euler
//! integration, detects box and circle contacts with a brute-force pair scan,
//! resolves them with impulses plus positional correction, and reports
//! enter/stay/exit contact events to per-collider listeners.
//!
//! Drive the world at a fixed timestep, either directly or with
//! [`engine::game_loop::GameLoop`]:
//!
//! ```
//! use glam::Vec2;
//! use pebble2d::PhysicsWorld;
//!
//! let mut world = PhysicsWorld::new();
//! let floor = world.create_rigid_body(Vec2::new(0.0, 100.0));
//! world.get_rigid_body_mut(floor).unwrap().set_static(true);
//! world.create_box_collider(floor, Vec2::new(200.0, 10.0));
//!
//! let ball = world.create_rigid_body(Vec2::ZERO);
//! world.create_circle_collider(ball, 5.0);
//!
//! // Gravity points down the +Y axis, so the ball falls toward the floor
//! for _ in 0..60 {
//!     world.update(1.0 / 60.0);
//! }
//! assert!(world.get_rigid_body(ball).unwrap().position().y > 0.0);
//! ```

pub mod core;
pub mod engine;

pub use engine::physics::{
    Collider, ColliderHandle, ColliderShape, CollisionInfo, CollisionListener, ListenerHandle,
    PhysicsWorld, RigidBody, RigidBodyHandle,
};

use glam::Vec2;

use super::world::ColliderHandle;

const DEFAULT_MASS: f32 = 1.0;
const DEFAULT_RESTITUTION: f32 = 0.2;
const DEFAULT_FRICTION: f32 = 0.1;

/// A rigid body advanced with semi-implicit Euler integration.
///
/// Bodies own their kinematic state plus the handles of their attached
/// colliders. They are created through the world's `create_rigid_body`
/// factory and addressed by handle; a body removed from the world takes its
/// colliders with it.
///
/// Rotation and angular velocity are in degrees. Collisions apply linear
/// impulses only, so angular state changes only through `apply_torque` and
/// the setters.
#[derive(Debug)]
pub struct RigidBody {
    position: Vec2,
    velocity: Vec2,
    force: Vec2,

    rotation: f32,
    angular_velocity: f32,
    torque: f32,

    mass: f32,
    inverse_mass: f32,
    inertia: f32,
    inverse_inertia: f32,
    /// Sum of the attached shapes' mass-normalized inertia contributions,
    /// maintained by the world on attach/detach
    inertia_factor: f32,

    restitution: f32,
    friction: f32,
    is_static: bool,

    colliders: Vec<ColliderHandle>,
}

impl RigidBody {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            torque: 0.0,
            mass: DEFAULT_MASS,
            inverse_mass: 1.0 / DEFAULT_MASS,
            inertia: 0.0,
            inverse_inertia: 0.0,
            inertia_factor: 0.0,
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            is_static: false,
            colliders: Vec::new(),
        }
    }

    /// Accumulate a force for the next integration step. Static bodies
    /// ignore forces.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_static {
            return;
        }
        self.force += force;
    }

    /// Instantaneous velocity change scaled by inverse mass. Static bodies
    /// ignore impulses.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity += impulse * self.inverse_mass;
    }

    /// Accumulate a torque for the next integration step. Static bodies
    /// ignore torques.
    pub fn apply_torque(&mut self, torque: f32) {
        if self.is_static {
            return;
        }
        self.torque += torque;
    }

    /// Semi-implicit Euler step: velocity is updated from the accumulated
    /// force first, then position from the new velocity. The angular state
    /// follows the same order. Accumulators are cleared afterwards.
    pub fn integrate(&mut self, dt: f32) {
        if self.is_static {
            return;
        }

        self.velocity += self.force * (self.inverse_mass * dt);
        self.position += self.velocity * dt;

        self.angular_velocity += self.torque * (self.inverse_inertia * dt);
        self.rotation += self.angular_velocity * dt;

        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Set the body's mass and recompute inverse mass and inertia.
    /// Non-positive mass yields an infinite-mass body (inverse mass zero).
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        self.recompute_inertia();
    }

    /// Flag the body as static. Static bodies are immovable: velocities are
    /// zeroed and inverse mass/inertia become zero so impulses have no
    /// effect. Un-flagging restores both from the stored mass and shapes.
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.inverse_mass = 0.0;
            self.inertia = 0.0;
            self.inverse_inertia = 0.0;
        } else {
            self.inverse_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
            self.recompute_inertia();
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Force accumulated since the last integration step
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Angular velocity in degrees per second
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    /// Torque accumulated since the last integration step
    pub fn torque(&self) -> f32 {
        self.torque
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; zero for static or infinite-mass bodies
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Moment of inertia summed over the attached collider shapes
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inverse_inertia(&self) -> f32 {
        self.inverse_inertia
    }

    /// Bounciness used in collision response; the pair's minimum wins
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Handles of the colliders attached to this body, in attach order
    pub fn colliders(&self) -> &[ColliderHandle] {
        &self.colliders
    }

    pub(crate) fn attach_collider(&mut self, handle: ColliderHandle) {
        if !self.colliders.contains(&handle) {
            self.colliders.push(handle);
        }
    }

    pub(crate) fn detach_collider(&mut self, handle: ColliderHandle) {
        self.colliders.retain(|&c| c != handle);
    }

    pub(crate) fn set_inertia_factor(&mut self, factor: f32) {
        self.inertia_factor = factor;
        self.recompute_inertia();
    }

    fn recompute_inertia(&mut self) {
        if self.is_static {
            self.inertia = 0.0;
            self.inverse_inertia = 0.0;
            return;
        }
        self.inertia = self.mass * self.inertia_factor;
        self.inverse_inertia = if self.inertia > 0.0 {
            1.0 / self.inertia
        } else {
            0.0
        };
    }
}

use glam::Vec2;

use super::collision::ListenerHandle;
use super::world::RigidBodyHandle;

/// Shape of a collider.
///
/// The set is closed: collision dispatch matches exhaustively on the pair of
/// shapes, so adding a shape means extending every narrow-phase match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Axis-aligned box with full width/height `size`
    Box { size: Vec2 },
    /// Circle with the given radius
    Circle { radius: f32 },
}

impl ColliderShape {
    /// Mass-normalized moment of inertia. Multiplied by the owning body's
    /// mass this gives the shape's contribution to the body's inertia.
    pub(crate) fn inertia_factor(&self) -> f32 {
        match *self {
            ColliderShape::Circle { radius } => 0.5 * radius * radius,
            ColliderShape::Box { size } => (size.x * size.x + size.y * size.y) / 12.0,
        }
    }
}

/// A collision shape attached to a rigid body.
///
/// Colliders are created through the world's factories and keep a handle to
/// their owning body. Shape data is fixed at creation; the local offset and
/// the listener slot are mutable.
#[derive(Debug)]
pub struct Collider {
    body: RigidBodyHandle,
    shape: ColliderShape,
    offset: Vec2,
    listener: Option<ListenerHandle>,
}

impl Collider {
    pub(crate) fn new(body: RigidBodyHandle, shape: ColliderShape) -> Self {
        Self {
            body,
            shape,
            offset: Vec2::ZERO,
            listener: None,
        }
    }

    /// Handle of the rigid body this collider is attached to
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    /// Local offset from the body's position
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// World-space center: body position plus offset. Body rotation does not
    /// affect collider placement.
    pub fn world_position(&self, body_position: Vec2) -> Vec2 {
        body_position + self.offset
    }

    /// Attach a listener for contact events on this collider. The collider
    /// holds only a weak handle; dropping the listener detaches it.
    pub fn set_listener(&mut self, listener: ListenerHandle) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener.clone()
    }
}

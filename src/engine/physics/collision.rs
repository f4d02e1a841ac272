use std::cell::RefCell;
use std::rc::Weak;

use glam::Vec2;

use super::world::ColliderHandle;

/// Non-owning reference to a collision listener.
///
/// The world upgrades the weak handle at dispatch time and silently skips
/// listeners that have been dropped, so attaching a listener never extends
/// its lifetime.
pub type ListenerHandle = Weak<RefCell<dyn CollisionListener>>;

/// Contact data for one collider pair, from collider A's perspective.
#[derive(Debug, Clone, Copy)]
pub struct CollisionInfo {
    /// Unit normal pointing from collider A toward collider B
    pub normal: Vec2,
    /// Overlap depth along the normal, never negative
    pub penetration: f32,
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
}

impl CollisionInfo {
    /// The same contact seen from collider B's side: the normal is negated
    /// and the collider roles swap.
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            penetration: self.penetration,
            collider_a: self.collider_b,
            collider_b: self.collider_a,
        }
    }
}

/// Receives contact lifecycle events for colliders it is attached to.
///
/// All methods default to no-ops so implementers only override the events
/// they care about. `own` is always the collider this listener is attached
/// to; the info each side receives is oriented from its own perspective.
/// Callbacks run synchronously inside the world's step.
pub trait CollisionListener {
    /// A contact that did not exist the previous step
    fn on_collision_enter(
        &mut self,
        _own: ColliderHandle,
        _other: ColliderHandle,
        _info: &CollisionInfo,
    ) {
    }

    /// A contact persisting from the previous step, while the bodies still
    /// move relative to each other
    fn on_collision_stay(
        &mut self,
        _own: ColliderHandle,
        _other: ColliderHandle,
        _info: &CollisionInfo,
    ) {
    }

    /// A contact from the previous step that no longer exists
    fn on_collision_exit(&mut self, _own: ColliderHandle, _other: ColliderHandle) {}
}

/// Box-box overlap test over world-space centers and half extents.
///
/// Returns the contact normal (from A toward B) and penetration depth,
/// separating along the axis of least overlap. Touching boxes count as
/// colliding with zero penetration.
pub fn box_box(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> Option<(Vec2, f32)> {
    let delta = pos_b - pos_a;
    let overlap_x = half_a.x + half_b.x - delta.x.abs();
    let overlap_y = half_a.y + half_b.y - delta.y.abs();
    if overlap_x < 0.0 || overlap_y < 0.0 {
        return None;
    }

    if overlap_x < overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        Some((Vec2::new(sign, 0.0), overlap_x))
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        Some((Vec2::new(0.0, sign), overlap_y))
    }
}

/// Circle-circle overlap test. Touching circles count as colliding.
/// Concentric centers fall back to a +X normal with full penetration.
pub fn circle_circle(
    pos_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    radius_b: f32,
) -> Option<(Vec2, f32)> {
    let delta = pos_b - pos_a;
    let radius_sum = radius_a + radius_b;
    let distance = delta.length();
    if distance > radius_sum {
        return None;
    }

    let normal = if distance > 0.0 { delta / distance } else { Vec2::X };
    Some((normal, radius_sum - distance))
}

/// Box-circle overlap test; the normal points from the box toward the
/// circle.
///
/// The closest point on the box to the circle center is found by clamping.
/// When the center is inside the box the closest point is pushed out to the
/// nearest face (ties go to the Y face) and the normal is flipped so it
/// still points from the box outward. A center exactly on the closest point
/// falls back to a +X normal with penetration equal to the radius.
pub fn box_circle(box_pos: Vec2, half: Vec2, circle_pos: Vec2, radius: f32) -> Option<(Vec2, f32)> {
    let delta = circle_pos - box_pos;
    let mut closest = delta.clamp(-half, half);

    let inside = closest == delta;
    if inside {
        if delta.x.abs() > delta.y.abs() {
            closest.x = if closest.x > 0.0 { half.x } else { -half.x };
        } else {
            closest.y = if closest.y > 0.0 { half.y } else { -half.y };
        }
    }

    let to_center = delta - closest;
    let distance = to_center.length();
    if distance > radius && !inside {
        return None;
    }

    if distance == 0.0 {
        return Some((Vec2::X, radius));
    }

    let normal = to_center / distance;
    if inside {
        Some((-normal, radius + distance))
    } else {
        Some((normal, radius - distance))
    }
}

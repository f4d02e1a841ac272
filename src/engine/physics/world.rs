use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use log::warn;
use slotmap::SlotMap;

use super::body::RigidBody;
use super::collider::{Collider, ColliderShape};
use super::collision::{self, CollisionInfo, CollisionListener};

slotmap::new_key_type! {
    /// Stable handle to a rigid body owned by a physics world
    pub struct RigidBodyHandle;

    /// Stable handle to a collider owned by a physics world
    pub struct ColliderHandle;
}

/// Default gravity; +Y points down
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 9.8);

/// Penetration depth tolerated before positional correction kicks in
const PENETRATION_SLOP: f32 = 0.001;

/// Fraction of the remaining penetration corrected per step
const CORRECTION_PERCENT: f32 = 0.8;

/// Squared relative speed below which a persisting contact counts as at
/// rest and stay events are suppressed
const REST_VELOCITY_SQUARED: f32 = 0.001;

/// Owns every rigid body and collider and advances the simulation.
///
/// Storage is arena-based: objects are addressed by generational handles
/// that survive unrelated insertions and removals and resolve to `None` once
/// their object is gone. Pair iteration runs in creation order, which fixes
/// the A/B roles in contact events: the earlier-created collider is always
/// side A.
///
/// Contact pair tracking is owned by the world, so independent worlds never
/// see each other's enter/stay/exit state.
pub struct PhysicsWorld {
    gravity: Vec2,

    bodies: SlotMap<RigidBodyHandle, RigidBody>,
    colliders: SlotMap<ColliderHandle, Collider>,

    /// Creation order of live bodies, maintained across removals
    body_order: Vec<RigidBodyHandle>,
    /// Creation order of live colliders; drives pair iteration
    collider_order: Vec<ColliderHandle>,

    /// Collider pairs in contact this step
    current_contacts: Vec<(ColliderHandle, ColliderHandle)>,
    /// Collider pairs in contact the previous step
    previous_contacts: Vec<(ColliderHandle, ColliderHandle)>,
}

impl PhysicsWorld {
    /// Create an empty world with default gravity
    pub fn new() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            bodies: SlotMap::with_key(),
            colliders: SlotMap::with_key(),
            body_order: Vec::new(),
            collider_order: Vec::new(),
            current_contacts: Vec::new(),
            previous_contacts: Vec::new(),
        }
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.step(dt);
    }

    /// Advance one physics step: apply gravity as a force, integrate every
    /// non-static body in creation order, then detect and resolve collisions
    pub fn step(&mut self, dt: f32) {
        for i in 0..self.body_order.len() {
            let handle = self.body_order[i];
            if let Some(body) = self.bodies.get_mut(handle) {
                if body.is_static() {
                    continue;
                }
                let gravity_force = self.gravity * body.mass();
                body.apply_force(gravity_force);
                body.integrate(dt);
            }
        }

        self.resolve_collisions();
    }

    /// Create a body at `position` with default mass and no colliders
    pub fn create_rigid_body(&mut self, position: Vec2) -> RigidBodyHandle {
        let handle = self.bodies.insert(RigidBody::new(position));
        self.body_order.push(handle);
        handle
    }

    /// Create a box collider attached to `body`. Fails soft with `None` when
    /// the body handle is stale. Negative size components are clamped to
    /// zero.
    pub fn create_box_collider(
        &mut self,
        body: RigidBodyHandle,
        size: Vec2,
    ) -> Option<ColliderHandle> {
        if size.x < 0.0 || size.y < 0.0 {
            warn!("box collider size {size} has negative components, clamping to zero");
        }
        let size = size.max(Vec2::ZERO);
        self.create_collider(body, ColliderShape::Box { size })
    }

    /// Create a circle collider attached to `body`. Fails soft with `None`
    /// when the body handle is stale. A negative radius is clamped to zero.
    pub fn create_circle_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
    ) -> Option<ColliderHandle> {
        if radius < 0.0 {
            warn!("circle collider radius {radius} is negative, clamping to zero");
        }
        let radius = radius.max(0.0);
        self.create_collider(body, ColliderShape::Circle { radius })
    }

    fn create_collider(
        &mut self,
        body: RigidBodyHandle,
        shape: ColliderShape,
    ) -> Option<ColliderHandle> {
        if !self.bodies.contains_key(body) {
            warn!("cannot create collider: rigid body handle is stale");
            return None;
        }

        let handle = self.colliders.insert(Collider::new(body, shape));
        self.collider_order.push(handle);
        if let Some(body_ref) = self.bodies.get_mut(body) {
            body_ref.attach_collider(handle);
        }
        self.refresh_body_inertia(body);
        Some(handle)
    }

    /// Remove a body and every collider attached to it. A stale handle is a
    /// logged no-op.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        let Some(body) = self.bodies.get(handle) else {
            warn!("remove_rigid_body: handle is stale, ignoring");
            return;
        };

        let attached: Vec<ColliderHandle> = body.colliders().to_vec();
        for &collider in &attached {
            self.colliders.remove(collider);
        }
        self.collider_order.retain(|c| !attached.contains(c));

        self.bodies.remove(handle);
        self.body_order.retain(|&b| b != handle);
    }

    /// Remove a single collider, detaching it from its body and refreshing
    /// the body's inertia. A stale handle is a logged no-op.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        let Some(collider) = self.colliders.remove(handle) else {
            warn!("remove_collider: handle is stale, ignoring");
            return;
        };

        self.collider_order.retain(|&c| c != handle);
        if let Some(body) = self.bodies.get_mut(collider.body()) {
            body.detach_collider(handle);
        }
        self.refresh_body_inertia(collider.body());
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn get_collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Iterate live bodies in creation order
    pub fn bodies(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> + '_ {
        self.body_order
            .iter()
            .filter_map(|&h| self.bodies.get(h).map(|b| (h, b)))
    }

    /// Iterate live colliders in creation order
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> + '_ {
        self.collider_order
            .iter()
            .filter_map(|&h| self.colliders.get(h).map(|c| (h, c)))
    }

    /// Detect contacts for every collider pair, dispatch lifecycle events,
    /// and resolve the detected contacts.
    fn resolve_collisions(&mut self) {
        std::mem::swap(&mut self.current_contacts, &mut self.previous_contacts);
        self.current_contacts.clear();

        for i in 0..self.collider_order.len() {
            for j in (i + 1)..self.collider_order.len() {
                let a = self.collider_order[i];
                let b = self.collider_order[j];

                let (Some(collider_a), Some(collider_b)) =
                    (self.colliders.get(a), self.colliders.get(b))
                else {
                    continue;
                };

                let body_a_handle = collider_a.body();
                let body_b_handle = collider_b.body();
                if body_a_handle == body_b_handle {
                    continue;
                }

                let (Some(body_a), Some(body_b)) = (
                    self.bodies.get(body_a_handle),
                    self.bodies.get(body_b_handle),
                ) else {
                    continue;
                };
                if body_a.is_static() && body_b.is_static() {
                    continue;
                }

                // Relative velocity before resolution, used for the at-rest
                // check
                let relative_velocity = body_b.velocity() - body_a.velocity();

                let Some(info) = self.check_collision(a, b) else {
                    continue;
                };

                let was_colliding = self
                    .previous_contacts
                    .iter()
                    .any(|&(x, y)| (x == a && y == b) || (x == b && y == a));
                let at_rest = relative_velocity.length_squared() < REST_VELOCITY_SQUARED;

                self.current_contacts.push((a, b));

                if !was_colliding {
                    self.dispatch_enter(a, b, &info);
                } else if !at_rest {
                    self.dispatch_stay(a, b, &info);
                }

                self.resolve_collision(&info);
            }
        }

        for i in 0..self.previous_contacts.len() {
            let (a, b) = self.previous_contacts[i];
            let still_colliding = self
                .current_contacts
                .iter()
                .any(|&(x, y)| (x == a && y == b) || (x == b && y == a));
            if !still_colliding {
                self.dispatch_exit(a, b);
            }
        }
    }

    /// Narrow-phase dispatch for one collider pair. The returned info is
    /// from A's perspective regardless of shape order.
    fn check_collision(&self, a: ColliderHandle, b: ColliderHandle) -> Option<CollisionInfo> {
        let collider_a = self.colliders.get(a)?;
        let collider_b = self.colliders.get(b)?;
        let pos_a = collider_a.world_position(self.bodies.get(collider_a.body())?.position());
        let pos_b = collider_b.world_position(self.bodies.get(collider_b.body())?.position());

        let (normal, penetration) = match (collider_a.shape(), collider_b.shape()) {
            (ColliderShape::Box { size: size_a }, ColliderShape::Box { size: size_b }) => {
                collision::box_box(pos_a, size_a * 0.5, pos_b, size_b * 0.5)?
            }
            (
                ColliderShape::Circle { radius: radius_a },
                ColliderShape::Circle { radius: radius_b },
            ) => collision::circle_circle(pos_a, radius_a, pos_b, radius_b)?,
            (ColliderShape::Box { size }, ColliderShape::Circle { radius }) => {
                collision::box_circle(pos_a, size * 0.5, pos_b, radius)?
            }
            (ColliderShape::Circle { radius }, ColliderShape::Box { size }) => {
                // Run the box-first test, then flip the normal back into A's
                // perspective
                let (normal, penetration) =
                    collision::box_circle(pos_b, size * 0.5, pos_a, radius)?;
                (-normal, penetration)
            }
        };

        Some(CollisionInfo {
            normal,
            penetration,
            collider_a: a,
            collider_b: b,
        })
    }

    /// Apply the collision impulse and positional correction for one contact
    fn resolve_collision(&mut self, info: &CollisionInfo) {
        let Some(collider_a) = self.colliders.get(info.collider_a) else {
            return;
        };
        let Some(collider_b) = self.colliders.get(info.collider_b) else {
            return;
        };
        let body_a_handle = collider_a.body();
        let body_b_handle = collider_b.body();

        let (Some(body_a), Some(body_b)) = (
            self.bodies.get(body_a_handle),
            self.bodies.get(body_b_handle),
        ) else {
            return;
        };

        let inv_mass_a = body_a.inverse_mass();
        let inv_mass_b = body_b.inverse_mass();
        let inv_mass_sum = inv_mass_a + inv_mass_b;
        if inv_mass_sum <= 0.0 {
            // Two infinite-mass bodies; impulses cannot move either
            return;
        }

        let relative_velocity = body_b.velocity() - body_a.velocity();
        let velocity_along_normal = relative_velocity.dot(info.normal);
        if velocity_along_normal > 0.0 {
            // Already separating
            return;
        }

        let restitution = body_a.restitution().min(body_b.restitution());
        let impulse_magnitude = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;
        let impulse = info.normal * impulse_magnitude;

        let static_a = body_a.is_static();
        let static_b = body_b.is_static();

        // Positional correction pushes the pair apart proportionally to
        // inverse mass, ignoring the slop margin
        let correction = info.normal
            * (CORRECTION_PERCENT * (info.penetration - PENETRATION_SLOP).max(0.0) / inv_mass_sum);

        if let Some(body_a) = self.bodies.get_mut(body_a_handle) {
            body_a.apply_impulse(-impulse);
            if !static_a {
                let corrected = body_a.position() - correction * inv_mass_a;
                body_a.set_position(corrected);
            }
        }
        if let Some(body_b) = self.bodies.get_mut(body_b_handle) {
            body_b.apply_impulse(impulse);
            if !static_b {
                let corrected = body_b.position() + correction * inv_mass_b;
                body_b.set_position(corrected);
            }
        }
    }

    fn listener_for(&self, handle: ColliderHandle) -> Option<Rc<RefCell<dyn CollisionListener>>> {
        self.colliders.get(handle)?.listener()?.upgrade()
    }

    fn dispatch_enter(&self, a: ColliderHandle, b: ColliderHandle, info: &CollisionInfo) {
        if let Some(listener) = self.listener_for(a) {
            listener.borrow_mut().on_collision_enter(a, b, info);
        }
        if let Some(listener) = self.listener_for(b) {
            listener.borrow_mut().on_collision_enter(b, a, &info.reversed());
        }
    }

    fn dispatch_stay(&self, a: ColliderHandle, b: ColliderHandle, info: &CollisionInfo) {
        if let Some(listener) = self.listener_for(a) {
            listener.borrow_mut().on_collision_stay(a, b, info);
        }
        if let Some(listener) = self.listener_for(b) {
            listener.borrow_mut().on_collision_stay(b, a, &info.reversed());
        }
    }

    fn dispatch_exit(&self, a: ColliderHandle, b: ColliderHandle) {
        if let Some(listener) = self.listener_for(a) {
            listener.borrow_mut().on_collision_exit(a, b);
        }
        if let Some(listener) = self.listener_for(b) {
            listener.borrow_mut().on_collision_exit(b, a);
        }
    }

    /// Recompute a body's moment of inertia from its attached collider
    /// shapes
    fn refresh_body_inertia(&mut self, body: RigidBodyHandle) {
        let Some(body_ref) = self.bodies.get(body) else {
            return;
        };
        let factor: f32 = body_ref
            .colliders()
            .iter()
            .filter_map(|&c| self.colliders.get(c))
            .map(|c| c.shape().inertia_factor())
            .sum();

        if let Some(body_ref) = self.bodies.get_mut(body) {
            body_ref.set_inertia_factor(factor);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingListener {
        enters: Vec<(ColliderHandle, ColliderHandle)>,
        stays: Vec<(ColliderHandle, ColliderHandle)>,
        exits: Vec<(ColliderHandle, ColliderHandle)>,
        last_normal: Option<Vec2>,
    }

    impl CollisionListener for RecordingListener {
        fn on_collision_enter(
            &mut self,
            own: ColliderHandle,
            other: ColliderHandle,
            info: &CollisionInfo,
        ) {
            self.enters.push((own, other));
            self.last_normal = Some(info.normal);
        }

        fn on_collision_stay(
            &mut self,
            own: ColliderHandle,
            other: ColliderHandle,
            info: &CollisionInfo,
        ) {
            self.stays.push((own, other));
            self.last_normal = Some(info.normal);
        }

        fn on_collision_exit(&mut self, own: ColliderHandle, other: ColliderHandle) {
            self.exits.push((own, other));
        }
    }

    fn listen(
        world: &mut PhysicsWorld,
        collider: ColliderHandle,
    ) -> Rc<RefCell<RecordingListener>> {
        let listener = Rc::new(RefCell::new(RecordingListener::default()));
        // Unsize the strong Rc first; downgrade cannot coerce behind the reference
        let as_dyn: Rc<RefCell<dyn CollisionListener>> = listener.clone();
        world
            .get_collider_mut(collider)
            .unwrap()
            .set_listener(Rc::downgrade(&as_dyn));
        listener
    }

    fn static_box(
        world: &mut PhysicsWorld,
        position: Vec2,
        size: Vec2,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = world.create_rigid_body(position);
        world.get_rigid_body_mut(body).unwrap().set_static(true);
        let collider = world.create_box_collider(body, size).unwrap();
        (body, collider)
    }

    fn dynamic_box(
        world: &mut PhysicsWorld,
        position: Vec2,
        size: Vec2,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = world.create_rigid_body(position);
        let collider = world.create_box_collider(body, size).unwrap();
        (body, collider)
    }

    #[test]
    fn test_create_rigid_body() {
        let mut world = PhysicsWorld::new();
        let handle = world.create_rigid_body(Vec2::new(1.0, 2.0));

        assert_eq!(world.body_count(), 1);
        let body = world.get_rigid_body(handle).unwrap();
        assert_eq!(body.position(), Vec2::new(1.0, 2.0));
        assert_eq!(body.mass(), 1.0);
        assert!(!body.is_static());
    }

    #[test]
    fn test_create_colliders_registers_and_attaches() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        let box_collider = world.create_box_collider(body, Vec2::new(2.0, 2.0)).unwrap();
        let circle_collider = world.create_circle_collider(body, 1.0).unwrap();

        assert_eq!(world.collider_count(), 2);
        assert_eq!(
            world.get_rigid_body(body).unwrap().colliders(),
            &[box_collider, circle_collider]
        );
        assert_eq!(world.get_collider(box_collider).unwrap().body(), body);
    }

    #[test]
    fn test_create_collider_with_stale_body_fails_soft() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        world.remove_rigid_body(body);

        assert!(world.create_box_collider(body, Vec2::new(1.0, 1.0)).is_none());
        assert!(world.create_circle_collider(body, 1.0).is_none());
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_negative_shape_params_clamp_to_zero() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        let box_collider = world
            .create_box_collider(body, Vec2::new(-2.0, 3.0))
            .unwrap();
        let circle_collider = world.create_circle_collider(body, -1.0).unwrap();

        assert_eq!(
            world.get_collider(box_collider).unwrap().shape(),
            ColliderShape::Box {
                size: Vec2::new(0.0, 3.0),
            }
        );
        assert_eq!(
            world.get_collider(circle_collider).unwrap().shape(),
            ColliderShape::Circle { radius: 0.0 }
        );
    }

    #[test]
    fn test_remove_rigid_body_removes_attached_colliders() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        let collider = world.create_box_collider(body, Vec2::new(1.0, 1.0)).unwrap();

        world.remove_rigid_body(body);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(world.get_rigid_body(body).is_none());
        assert!(world.get_collider(collider).is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        let collider = world.create_circle_collider(body, 1.0).unwrap();

        world.remove_collider(collider);
        world.remove_collider(collider);
        world.remove_rigid_body(body);
        world.remove_rigid_body(body);

        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_remove_collider_detaches_and_refreshes_inertia() {
        let mut world = PhysicsWorld::new();
        let body = world.create_rigid_body(Vec2::ZERO);
        let collider = world.create_box_collider(body, Vec2::new(2.0, 2.0)).unwrap();
        assert_relative_eq!(world.get_rigid_body(body).unwrap().inertia(), 8.0 / 12.0);

        world.remove_collider(collider);
        assert!(world.get_rigid_body(body).unwrap().colliders().is_empty());
        assert_eq!(world.get_rigid_body(body).unwrap().inertia(), 0.0);
    }

    #[test]
    fn test_handles_stay_valid_after_unrelated_removal() {
        let mut world = PhysicsWorld::new();
        let a = world.create_rigid_body(Vec2::new(1.0, 0.0));
        let b = world.create_rigid_body(Vec2::new(2.0, 0.0));
        let c = world.create_rigid_body(Vec2::new(3.0, 0.0));

        world.remove_rigid_body(b);
        let d = world.create_rigid_body(Vec2::new(4.0, 0.0));

        assert_eq!(world.get_rigid_body(a).unwrap().position().x, 1.0);
        assert_eq!(world.get_rigid_body(c).unwrap().position().x, 3.0);
        assert_eq!(world.get_rigid_body(d).unwrap().position().x, 4.0);
        // The removed handle never comes back, even after the slot is reused
        assert!(world.get_rigid_body(b).is_none());
    }

    #[test]
    fn test_default_gravity_points_down() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.gravity(), Vec2::new(0.0, 9.8));

        world.set_gravity(Vec2::new(0.0, -1.0));
        assert_eq!(world.gravity(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_step_applies_gravity_as_force() {
        let mut world = PhysicsWorld::new();
        let handle = world.create_rigid_body(Vec2::ZERO);

        world.step(1.0);
        let body = world.get_rigid_body(handle).unwrap();
        assert_relative_eq!(body.velocity().y, 9.8);
        assert_relative_eq!(body.position().y, 9.8);
    }

    #[test]
    fn test_gravity_acceleration_is_mass_independent() {
        let mut world = PhysicsWorld::new();
        let light = world.create_rigid_body(Vec2::ZERO);
        let heavy = world.create_rigid_body(Vec2::new(100.0, 0.0));
        world.get_rigid_body_mut(heavy).unwrap().set_mass(10.0);

        world.step(0.5);
        let light_velocity = world.get_rigid_body(light).unwrap().velocity();
        let heavy_velocity = world.get_rigid_body(heavy).unwrap().velocity();
        assert_eq!(light_velocity, heavy_velocity);
    }

    #[test]
    fn test_static_bodies_do_not_fall() {
        let mut world = PhysicsWorld::new();
        let handle = world.create_rigid_body(Vec2::new(0.0, 10.0));
        world.get_rigid_body_mut(handle).unwrap().set_static(true);

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let body = world.get_rigid_body(handle).unwrap();
        assert_eq!(body.position(), Vec2::new(0.0, 10.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_enter_fires_once_for_resting_contact() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (_, crate_collider) =
            dynamic_box(&mut world, Vec2::new(0.0, 9.5), Vec2::new(10.0, 10.0));

        let floor_events = listen(&mut world, floor);
        let crate_events = listen(&mut world, crate_collider);

        for _ in 0..3 {
            world.step(1.0 / 60.0);
        }

        let floor_events = floor_events.borrow();
        let crate_events = crate_events.borrow();
        assert_eq!(floor_events.enters, vec![(floor, crate_collider)]);
        assert_eq!(crate_events.enters, vec![(crate_collider, floor)]);
        // At rest, so the persisting contact produces no stay events
        assert!(floor_events.stays.is_empty());
        assert!(crate_events.stays.is_empty());
        assert!(floor_events.exits.is_empty());
    }

    #[test]
    fn test_each_side_sees_its_own_perspective() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (_, crate_collider) =
            dynamic_box(&mut world, Vec2::new(0.0, 9.0), Vec2::new(10.0, 10.0));

        let floor_events = listen(&mut world, floor);
        let crate_events = listen(&mut world, crate_collider);

        world.step(1.0 / 60.0);

        // The floor was created first, so it is side A and its normal points
        // toward the crate (+Y); the crate sees the negation
        assert_eq!(floor_events.borrow().last_normal, Some(Vec2::new(0.0, 1.0)));
        assert_eq!(crate_events.borrow().last_normal, Some(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn test_stay_fires_while_moving_then_exit_on_teleport() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (crate_body, crate_collider) =
            dynamic_box(&mut world, Vec2::new(0.0, 4.0), Vec2::new(10.0, 10.0));
        world
            .get_rigid_body_mut(crate_body)
            .unwrap()
            .set_velocity(Vec2::new(0.5, 0.0));

        let events = listen(&mut world, crate_collider);

        for _ in 0..4 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(events.borrow().enters.len(), 1);
        assert!(events.borrow().stays.len() >= 2);
        assert!(events.borrow().exits.is_empty());

        world
            .get_rigid_body_mut(crate_body)
            .unwrap()
            .set_position(Vec2::new(500.0, 500.0));
        world.step(1.0 / 60.0);
        assert_eq!(events.borrow().exits, vec![(crate_collider, floor)]);
    }

    #[test]
    fn test_exit_fires_for_survivor_after_collider_removal() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (_, crate_collider) =
            dynamic_box(&mut world, Vec2::new(0.0, 9.0), Vec2::new(10.0, 10.0));

        let floor_events = listen(&mut world, floor);
        let removed_events = listen(&mut world, crate_collider);

        world.step(1.0 / 60.0);
        assert_eq!(floor_events.borrow().enters.len(), 1);

        world.remove_collider(crate_collider);
        world.step(1.0 / 60.0);

        // The survivor hears the exit; the removed side no longer resolves to
        // a listener and is skipped
        assert_eq!(floor_events.borrow().exits, vec![(floor, crate_collider)]);
        assert!(removed_events.borrow().exits.is_empty());
    }

    #[test]
    fn test_contact_lifecycle_as_body_passes_through() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (mover_body, mover) =
            dynamic_box(&mut world, Vec2::new(0.0, -7.0), Vec2::new(10.0, 10.0));
        // Moving away from the floor at one unit per step
        world
            .get_rigid_body_mut(mover_body)
            .unwrap()
            .set_velocity(Vec2::new(0.0, -60.0));

        let events = listen(&mut world, mover);

        for _ in 0..4 {
            world.step(1.0 / 60.0);
        }

        let events = events.borrow();
        assert_eq!(events.enters, vec![(mover, floor)]);
        assert_eq!(events.stays, vec![(mover, floor), (mover, floor)]);
        assert_eq!(events.exits, vec![(mover, floor)]);
        // Separating contact: the impulse step never touched the velocity
        assert_eq!(
            world.get_rigid_body(mover_body).unwrap().velocity(),
            Vec2::new(0.0, -60.0)
        );
    }

    #[test]
    fn test_same_body_pairs_are_skipped() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let body = world.create_rigid_body(Vec2::ZERO);
        let first = world.create_box_collider(body, Vec2::new(4.0, 4.0)).unwrap();
        world.create_box_collider(body, Vec2::new(4.0, 4.0)).unwrap();

        let events = listen(&mut world, first);
        world.step(1.0 / 60.0);

        assert!(events.borrow().enters.is_empty());
    }

    #[test]
    fn test_static_static_pairs_are_skipped() {
        let mut world = PhysicsWorld::new();
        let (_, first) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (_, _second) = static_box(&mut world, Vec2::new(1.0, 0.0), Vec2::new(10.0, 10.0));

        let events = listen(&mut world, first);
        world.step(1.0 / 60.0);

        assert!(events.borrow().enters.is_empty());
    }

    #[test]
    fn test_head_on_impulse_reverses_approach() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let a = world.create_rigid_body(Vec2::ZERO);
        world.create_circle_collider(a, 2.0).unwrap();
        let b = world.create_rigid_body(Vec2::new(3.0, 0.0));
        world.create_circle_collider(b, 2.0).unwrap();

        world.get_rigid_body_mut(a).unwrap().set_velocity(Vec2::new(1.0, 0.0));
        world.get_rigid_body_mut(b).unwrap().set_velocity(Vec2::new(-1.0, 0.0));

        world.step(1.0 / 60.0);

        // Equal masses, restitution 0.2: the approach reverses at 20% speed
        let va = world.get_rigid_body(a).unwrap().velocity();
        let vb = world.get_rigid_body(b).unwrap().velocity();
        assert_relative_eq!(va.x, -0.2, epsilon = 1e-5);
        assert_relative_eq!(vb.x, 0.2, epsilon = 1e-5);
        assert_eq!(va.y, 0.0);
        assert_eq!(vb.y, 0.0);
    }

    #[test]
    fn test_positional_correction_pushes_overlap_out() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        let (crate_body, _) = dynamic_box(&mut world, Vec2::new(0.0, 5.0), Vec2::new(10.0, 10.0));

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        let body = world.get_rigid_body(crate_body).unwrap();
        // Deep initial overlap converges to within the slop of full
        // separation without gaining velocity
        assert!(body.position().y > 9.95 && body.position().y < 10.0);
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_infinite_mass_pair_skips_resolution() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let a = world.create_rigid_body(Vec2::ZERO);
        let collider_a = world.create_circle_collider(a, 1.0).unwrap();
        let b = world.create_rigid_body(Vec2::new(0.5, 0.0));
        world.create_circle_collider(b, 1.0).unwrap();

        world.get_rigid_body_mut(a).unwrap().set_mass(0.0);
        world.get_rigid_body_mut(b).unwrap().set_mass(0.0);
        world.get_rigid_body_mut(a).unwrap().set_velocity(Vec2::new(1.0, 0.0));
        world.get_rigid_body_mut(b).unwrap().set_velocity(Vec2::new(-1.0, 0.0));

        let listener = listen(&mut world, collider_a);
        let dt = 1.0 / 60.0;
        world.step(dt);

        // No impulse or correction can move either body; positions advance
        // by plain integration and the contact still fires its event
        let body_a = world.get_rigid_body(a).unwrap();
        let body_b = world.get_rigid_body(b).unwrap();
        assert_eq!(body_a.velocity(), Vec2::new(1.0, 0.0));
        assert_eq!(body_b.velocity(), Vec2::new(-1.0, 0.0));
        assert_eq!(body_a.position(), Vec2::new(dt, 0.0));
        assert_eq!(body_b.position(), Vec2::new(0.5 - dt, 0.0));
        assert_eq!(listener.borrow().enters.len(), 1);
    }

    #[test]
    fn test_circle_first_pair_keeps_collider_order() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let circle_body = world.create_rigid_body(Vec2::ZERO);
        let circle = world.create_circle_collider(circle_body, 3.0).unwrap();
        let box_body = world.create_rigid_body(Vec2::new(4.0, 0.0));
        let box_collider = world.create_box_collider(box_body, Vec2::new(4.0, 4.0)).unwrap();

        let info = world.check_collision(circle, box_collider).unwrap();
        assert_eq!(info.collider_a, circle);
        assert_eq!(info.collider_b, box_collider);
        // Normal still points from A (the circle) toward B (the box)
        assert_eq!(info.normal, Vec2::new(1.0, 0.0));
        assert_relative_eq!(info.penetration, 1.0);
    }

    #[test]
    fn test_collider_offset_shifts_contact() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let a = world.create_rigid_body(Vec2::ZERO);
        let offset_collider = world.create_circle_collider(a, 1.0).unwrap();
        world
            .get_collider_mut(offset_collider)
            .unwrap()
            .set_offset(Vec2::new(10.0, 0.0));
        let b = world.create_rigid_body(Vec2::new(11.0, 0.0));
        let target = world.create_circle_collider(b, 1.0).unwrap();

        // Body centers are 11 apart, but the offset collider sits at x=10
        let info = world.check_collision(offset_collider, target).unwrap();
        assert_relative_eq!(info.penetration, 1.0);
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(Vec2::ZERO);
        let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
        dynamic_box(&mut world, Vec2::new(0.0, 9.0), Vec2::new(10.0, 10.0));

        let events = listen(&mut world, floor);
        drop(events);

        // Dead weak handle; the step must simply skip it
        world.step(1.0 / 60.0);
    }

    #[test]
    fn test_worlds_track_contacts_independently() {
        let build = || {
            let mut world = PhysicsWorld::new();
            world.set_gravity(Vec2::ZERO);
            let (_, floor) = static_box(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0));
            dynamic_box(&mut world, Vec2::new(0.0, 9.0), Vec2::new(10.0, 10.0));
            let events = listen(&mut world, floor);
            (world, events)
        };
        let (mut world_one, events_one) = build();
        let (mut world_two, events_two) = build();

        world_one.step(1.0 / 60.0);
        assert_eq!(events_one.borrow().enters.len(), 1);
        assert!(events_two.borrow().enters.is_empty());

        world_two.step(1.0 / 60.0);
        assert_eq!(events_two.borrow().enters.len(), 1);
    }

    #[test]
    fn test_crate_settles_on_floor() {
        let mut world = PhysicsWorld::new();
        static_box(&mut world, Vec2::new(0.0, 1000.0), Vec2::new(2000.0, 50.0));
        let (crate_body, _) = dynamic_box(&mut world, Vec2::ZERO, Vec2::new(50.0, 50.0));

        for _ in 0..1800 {
            world.step(1.0 / 60.0);
        }

        // Floor top is at y=975; the crate's center comes to rest half its
        // height above that
        let body = world.get_rigid_body(crate_body).unwrap();
        assert!((body.position().y - 950.0).abs() < 1.0, "y = {}", body.position().y);
        assert!(body.velocity().length() < 0.5, "velocity = {}", body.velocity());
        assert_eq!(body.position().x, 0.0);
    }
}

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;

use pebble2d::core::math;
use pebble2d::engine::game_loop::GameLoop;
use pebble2d::engine::physics::DebugLines;
use pebble2d::{ColliderHandle, CollisionInfo, CollisionListener, PhysicsWorld};

/// Counts and logs the crate's contact lifecycle. Stay events are left on
/// the default no-op, they fire every step during resting contact.
struct ContactLogger {
    enters: u32,
    exits: u32,
}

impl CollisionListener for ContactLogger {
    fn on_collision_enter(
        &mut self,
        _own: ColliderHandle,
        _other: ColliderHandle,
        info: &CollisionInfo,
    ) {
        self.enters += 1;
        info!(
            "contact enter #{}: normal ({:.2}, {:.2}), penetration {:.4}",
            self.enters, info.normal.x, info.normal.y, info.penetration
        );
    }

    fn on_collision_exit(&mut self, _own: ColliderHandle, _other: ColliderHandle) {
        self.exits += 1;
        info!("contact exit #{}", self.exits);
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting pebble2d demo: dropping a crate onto the floor");

    let mut world = PhysicsWorld::new();
    // Pixel-scale gravity; the default 9.8 reads as slow motion at this scene size
    world.set_gravity(Vec2::new(0.0, 196.0));

    // Static floor near the bottom of the scene (y grows downward)
    let floor = world.create_rigid_body(Vec2::new(0.0, 1000.0));
    world
        .get_rigid_body_mut(floor)
        .context("floor body missing")?
        .set_static(true);
    world
        .create_box_collider(floor, Vec2::new(2000.0, 50.0))
        .context("floor collider rejected")?;

    // Dynamic crate dropped from the origin
    let crate_body = world.create_rigid_body(Vec2::ZERO);
    let crate_collider = world
        .create_box_collider(crate_body, Vec2::new(50.0, 50.0))
        .context("crate collider rejected")?;

    let logger = Rc::new(RefCell::new(ContactLogger { enters: 0, exits: 0 }));
    // Unsize the strong Rc first; downgrade cannot coerce behind the reference
    let listener: Rc<RefCell<dyn CollisionListener>> = logger.clone();
    world
        .get_collider_mut(crate_collider)
        .context("crate collider missing")?
        .set_listener(Rc::downgrade(&listener));

    let mut game_loop = GameLoop::new();
    let timestep = game_loop.fixed_timestep();
    let mut previous_y = 0.0_f32;
    let mut settled_frames = 0_u32;

    loop {
        let updates = game_loop.begin_frame();
        for _ in 0..updates {
            previous_y = world
                .get_rigid_body(crate_body)
                .context("crate body missing")?
                .position()
                .y;
            world.update(timestep);
        }

        let body = world
            .get_rigid_body(crate_body)
            .context("crate body missing")?;
        let position = body.position();
        let velocity = body.velocity();

        // Interpolate between the last two physics states for smooth output
        let display_y = math::lerp(previous_y, position.y, game_loop.alpha());

        if game_loop.frame_count() % 60 == 0 {
            info!(
                "frame {}: crate at y = {:.1}, velocity ({:.1}, {:.1})",
                game_loop.frame_count(),
                display_y,
                velocity.x,
                velocity.y
            );
        }

        // Settled means slow and near the floor for a sustained stretch;
        // bounce apexes are briefly slow too, the frame count filters them out
        if math::nearly_zero(velocity, 1.0) && position.y > 900.0 {
            settled_frames += 1;
            if settled_frames > 120 {
                info!(
                    "crate settled at y = {:.2} after {} physics steps",
                    position.y,
                    game_loop.update_count()
                );
                break;
            }
        } else {
            settled_frames = 0;
        }

        if game_loop.elapsed_secs() > 30.0 {
            info!("timed out waiting for the crate to settle");
            break;
        }

        thread::sleep(Duration::from_millis(4));
    }

    // Show what a renderer would draw for this scene
    let mut debug = DebugLines::new();
    debug.set_enabled(true);
    debug.rebuild(&world);
    info!(
        "debug geometry: {} vertices, {} line indices",
        debug.vertices().len(),
        debug.indices().len()
    );

    let contacts = logger.borrow();
    info!(
        "done: {} contact enters, {} contact exits, {} bodies in the world",
        contacts.enters,
        contacts.exits,
        world.body_count()
    );

    Ok(())
}

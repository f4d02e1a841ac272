//! Fixed timestep frame pacing.
//!
//! Physics advances at a constant rate no matter how fast the caller's outer
//! loop runs: wall-clock time is accumulated and drained in fixed slices,
//! with a cap on how many slices one frame may drain so a long stall cannot
//! turn into an update burst.

use std::time::{Duration, Instant};

/// Physics update rate (60 steps per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum physics steps drained per frame
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Frame pacing state for driving a physics world at a fixed timestep
pub struct GameLoop {
    /// Accumulated wall-clock time not yet consumed by fixed updates
    accumulator: Duration,
    last_frame: Instant,
    started: Instant,
    paused: bool,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            accumulator: Duration::ZERO,
            last_frame: now,
            started: now,
            paused: false,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Start a new frame and return how many fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;

        // While paused, frame time is consumed without accumulating
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && updates < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            updates += 1;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Fixed timestep in seconds, the `dt` to pass into the physics world
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Interpolation alpha for rendering between fixed updates: the
    /// accumulated remainder divided by the fixed timestep. Exceeds 1 only
    /// after a frame hit the per-frame update cap.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / FIXED_TIMESTEP
    }

    /// Total elapsed time since the loop started
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.started)
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Total frames begun
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total fixed updates handed out
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume stepping. The accumulator restarts empty, so there is no
    /// catch-up burst for time spent paused.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

//! Save the Planet - a fixed-target arcade defense game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, progression)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const SIM_HZ: u64 = 60;
    /// Fixed simulation timestep (60 Hz, one hazard interpolation step per tick)
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Same timestep truncated to whole milliseconds (use [`crate::tick_time_ms`]
    /// to place many ticks on the clock without drift)
    pub const SIM_DT_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Lives at the start of every game
    pub const INITIAL_LIVES: u32 = 10;
    /// Interpolation factor per tick at level 1
    pub const INITIAL_HAZARD_SPEED: f32 = 0.005;
    /// Added to the hazard speed on every level-up
    pub const SPEED_STEP_PER_LEVEL: f32 = 0.001;
    /// Upper bound of the spawn speed jitter, as a fraction of the current hazard speed
    pub const MAX_SPEED_JITTER_RATIO: f32 = 0.2;

    /// Spawn interval for a fresh game (ms)
    pub const INITIAL_SPAWN_INTERVAL_MS: u64 = 2000;
    /// Level-up interval formula: max(floor, base - step * level)
    pub const SPAWN_INTERVAL_BASE_MS: u64 = 3000;
    pub const SPAWN_INTERVAL_STEP_MS: u64 = 100;
    pub const SPAWN_INTERVAL_FLOOR_MS: u64 = 1000;
    /// Cap on hazards created per spawn wave
    pub const MAX_SPAWN_PER_WAVE: u32 = 5;

    /// Level durations (ms); the last entry is reused past the end of the table
    pub const LEVEL_DURATIONS_MS: [u64; 5] = [20_000, 25_000, 30_000, 35_000, 40_000];

    /// The planet
    pub const TARGET_POSITION: [f32; 3] = [0.0, -100.0, 0.0];
    pub const TARGET_RADIUS: f32 = 100.0;
    /// Hazards closer than this to the target center hit it
    pub const COLLISION_RADIUS: f32 = 110.0;
    /// Cosmetic planet rotation (radians per tick)
    pub const TARGET_SPIN: f32 = -0.0005;

    /// Spawn region (hazards appear on the z = 0 plane above the planet)
    pub const SPAWN_HALF_WIDTH: f32 = 400.0;
    pub const SPAWN_MIN_HEIGHT: f32 = 100.0;
    pub const SPAWN_MAX_HEIGHT: f32 = 300.0;
    /// Hazard picking sphere radius range
    pub const HAZARD_MIN_RADIUS: f32 = 10.0;
    pub const HAZARD_MAX_RADIUS: f32 = 20.0;
    /// Cosmetic hazard spin range (radians per tick)
    pub const HAZARD_MIN_SPIN: f32 = 0.01;
    pub const HAZARD_MAX_SPIN: f32 = 0.03;

    /// How long the game-over banner stays up before the game resets (ms)
    pub const GAME_OVER_DELAY_MS: u64 = 3000;
    /// How long the level-up banner stays up (ms)
    pub const LEVEL_BANNER_MS: u64 = 2000;

    /// Camera defaults
    pub const CAMERA_POSITION: [f32; 3] = [0.0, 200.0, -400.0];
    pub const CAMERA_FOV_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 10_000.0;
    pub const CAMERA_ASPECT: f32 = 16.0 / 9.0;
}

/// Wrap an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Clock time of the start of fixed tick `tick`, rounded down to whole ms.
///
/// Computed from the tick count rather than summed, so the millisecond clock
/// tracks `tick * SIM_DT` exactly over long runs.
pub fn tick_time_ms(tick: u64) -> u64 {
    tick.saturating_mul(1000) / consts::SIM_HZ
}

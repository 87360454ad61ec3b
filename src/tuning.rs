//! Data-driven game balance
//!
//! Every number the simulation uses lives in [`Tuning`]. Defaults come from
//! [`crate::consts`]; a JSON file may override any subset of fields.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level duration table is empty")]
    EmptyDurationTable,
    #[error("level durations must be ascending")]
    DurationsNotAscending,
    #[error("hazard speed {0} is outside [0, 1)")]
    SpeedOutOfRange(f32),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} range is empty (min above max)")]
    InvalidRange(&'static str),
}

/// Camera parameters used to turn pointer positions into rays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(CAMERA_POSITION),
            look_at: Vec3::ZERO,
            fov_deg: CAMERA_FOV_DEG,
            aspect: CAMERA_ASPECT,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

/// Game balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Levels ===
    /// Level durations (ms), ascending; clamped to the last entry past the end
    pub level_durations_ms: Vec<u64>,
    pub initial_lives: u32,

    // === Hazard speed ===
    pub initial_hazard_speed: f32,
    pub speed_step_per_level: f32,
    /// Spawn jitter is drawn from [0, hazard_speed * ratio]
    pub max_speed_jitter_ratio: f32,

    // === Spawning ===
    pub initial_spawn_interval_ms: u64,
    pub spawn_interval_base_ms: u64,
    pub spawn_interval_step_ms: u64,
    pub spawn_interval_floor_ms: u64,
    pub max_spawn_per_wave: u32,
    pub spawn_half_width: f32,
    pub spawn_min_height: f32,
    pub spawn_max_height: f32,
    pub hazard_min_radius: f32,
    pub hazard_max_radius: f32,
    pub hazard_min_spin: f32,
    pub hazard_max_spin: f32,

    // === Target ===
    pub target_position: Vec3,
    pub target_radius: f32,
    pub collision_radius: f32,

    // === Timers ===
    pub game_over_delay_ms: u64,
    pub level_banner_ms: u64,

    pub camera: CameraTuning,

    /// Fixed RNG seed for reproducible runs (random when absent)
    pub seed: Option<u64>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            level_durations_ms: LEVEL_DURATIONS_MS.to_vec(),
            initial_lives: INITIAL_LIVES,

            initial_hazard_speed: INITIAL_HAZARD_SPEED,
            speed_step_per_level: SPEED_STEP_PER_LEVEL,
            max_speed_jitter_ratio: MAX_SPEED_JITTER_RATIO,

            initial_spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            spawn_interval_base_ms: SPAWN_INTERVAL_BASE_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            spawn_interval_floor_ms: SPAWN_INTERVAL_FLOOR_MS,
            max_spawn_per_wave: MAX_SPAWN_PER_WAVE,
            spawn_half_width: SPAWN_HALF_WIDTH,
            spawn_min_height: SPAWN_MIN_HEIGHT,
            spawn_max_height: SPAWN_MAX_HEIGHT,
            hazard_min_radius: HAZARD_MIN_RADIUS,
            hazard_max_radius: HAZARD_MAX_RADIUS,
            hazard_min_spin: HAZARD_MIN_SPIN,
            hazard_max_spin: HAZARD_MAX_SPIN,

            target_position: Vec3::from_array(TARGET_POSITION),
            target_radius: TARGET_RADIUS,
            collision_radius: COLLISION_RADIUS,

            game_over_delay_ms: GAME_OVER_DELAY_MS,
            level_banner_ms: LEVEL_BANNER_MS,

            camera: CameraTuning::default(),

            seed: None,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.level_durations_ms.is_empty() {
            return Err(TuningError::EmptyDurationTable);
        }
        if self.level_durations_ms.windows(2).any(|w| w[0] > w[1]) {
            return Err(TuningError::DurationsNotAscending);
        }
        if self.level_durations_ms[0] == 0 {
            return Err(TuningError::NonPositive("level_durations_ms"));
        }
        if !(0.0..1.0).contains(&self.initial_hazard_speed) {
            return Err(TuningError::SpeedOutOfRange(self.initial_hazard_speed));
        }
        if self.initial_lives == 0 {
            return Err(TuningError::NonPositive("initial_lives"));
        }
        if self.spawn_interval_floor_ms == 0 {
            return Err(TuningError::NonPositive("spawn_interval_floor_ms"));
        }
        if self.max_spawn_per_wave == 0 {
            return Err(TuningError::NonPositive("max_spawn_per_wave"));
        }
        if self.target_radius <= 0.0 {
            return Err(TuningError::NonPositive("target_radius"));
        }
        if self.collision_radius <= 0.0 {
            return Err(TuningError::NonPositive("collision_radius"));
        }
        if self.hazard_min_radius <= 0.0 {
            return Err(TuningError::NonPositive("hazard_min_radius"));
        }
        if self.camera.aspect <= 0.0 {
            return Err(TuningError::NonPositive("camera.aspect"));
        }
        if self.camera.near <= 0.0 {
            return Err(TuningError::NonPositive("camera.near"));
        }

        // Spawning samples from these ranges and the camera needs near <= far
        let ranges = [
            ("spawn_half_width", -self.spawn_half_width, self.spawn_half_width),
            ("spawn_height", self.spawn_min_height, self.spawn_max_height),
            ("hazard_radius", self.hazard_min_radius, self.hazard_max_radius),
            ("hazard_spin", self.hazard_min_spin, self.hazard_max_spin),
            ("camera.near/far", self.camera.near, self.camera.far),
        ];
        for (name, min, max) in ranges {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(TuningError::InvalidRange(name));
            }
        }
        Ok(())
    }

    /// Duration of a level, clamping past the end of the table
    pub fn level_duration_ms(&self, level: u32) -> u64 {
        let last = self.level_durations_ms.len().saturating_sub(1);
        let index = (level.max(1) as usize - 1).min(last);
        self.level_durations_ms.get(index).copied().unwrap_or(0)
    }

    /// Spawn interval once `level` has been reached through a level-up
    pub fn spawn_interval_for_level(&self, level: u32) -> u64 {
        self.spawn_interval_base_ms
            .saturating_sub(self.spawn_interval_step_ms.saturating_mul(level as u64))
            .max(self.spawn_interval_floor_ms)
    }

    /// Hazards created per spawn wave at `level`
    pub fn spawn_count(&self, level: u32) -> u32 {
        level.min(self.max_spawn_per_wave)
    }
}

//! Timed hazard spawning
//!
//! Each tick the spawner either signals that the level timer ran out, emits a
//! wave of new hazard specs, or does nothing.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{GameState, RngState};
use crate::tuning::Tuning;

/// Highest interpolation factor a hazard may have (speed stays below 1)
const MAX_HAZARD_SPEED: f32 = 1.0 - f32::EPSILON;

/// Everything needed to create a hazard
#[derive(Debug, Clone, PartialEq)]
pub struct HazardSpec {
    pub position: Vec3,
    pub speed: f32,
    pub radius: f32,
    pub spin: f32,
}

/// What the spawner decided this tick
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnDecision {
    /// Level time is up; advance the level instead of spawning
    LevelUp,
    /// Create these hazards
    Spawn(Vec<HazardSpec>),
    /// Too soon since the last wave
    Wait,
}

/// Decides when and how many hazards to create
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    last_spawn_ms: Option<u64>,
}

impl Spawner {
    pub fn new(rng_state: &RngState) -> Self {
        Self {
            rng: rng_state.to_rng(),
            last_spawn_ms: None,
        }
    }

    /// Forget the last wave time so a new game spawns immediately
    pub fn reset(&mut self) {
        self.last_spawn_ms = None;
    }

    pub fn last_spawn_ms(&self) -> Option<u64> {
        self.last_spawn_ms
    }

    /// Run the spawn timer for one tick
    pub fn tick(&mut self, now_ms: u64, state: &GameState, tuning: &Tuning) -> SpawnDecision {
        if state.time_left_ms(tuning, now_ms) <= 0 {
            return SpawnDecision::LevelUp;
        }

        let due = match self.last_spawn_ms {
            Some(last) => now_ms.saturating_sub(last) >= state.spawn_interval_ms,
            None => true,
        };
        if !due {
            return SpawnDecision::Wait;
        }

        let count = tuning.spawn_count(state.level);
        let specs: Vec<HazardSpec> = (0..count)
            .map(|_| self.random_spec(state.hazard_speed, tuning))
            .collect();
        self.last_spawn_ms = Some(now_ms);

        log::debug!(
            "Spawned {} hazards at level {} (t={}ms)",
            specs.len(),
            state.level,
            now_ms
        );
        SpawnDecision::Spawn(specs)
    }

    fn random_spec(&mut self, hazard_speed: f32, tuning: &Tuning) -> HazardSpec {
        let x = self
            .rng
            .random_range(-tuning.spawn_half_width..=tuning.spawn_half_width);
        let y = self
            .rng
            .random_range(tuning.spawn_min_height..=tuning.spawn_max_height);
        let radius = self
            .rng
            .random_range(tuning.hazard_min_radius..=tuning.hazard_max_radius);
        let spin = self
            .rng
            .random_range(tuning.hazard_min_spin..=tuning.hazard_max_spin);

        // Small positive jitter so a wave doesn't arrive in lockstep
        let jitter = self.rng.random::<f32>() * hazard_speed * tuning.max_speed_jitter_ratio;

        HazardSpec {
            position: Vec3::new(x, y, 0.0),
            speed: (hazard_speed + jitter).clamp(0.0, MAX_HAZARD_SPEED),
            radius,
            spin,
        }
    }
}

//! Game state and core simulation types

use glam::Vec3;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Hazard identifier, unique for the lifetime of a game
pub type HazardId = u32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// The tick a level-up happened in; settles back to Playing next tick
    LevelTransition,
    /// Lives exhausted; everything is frozen until the reset timer fires
    GameOver,
    /// The tick the game was reinitialized in; settles to Playing next tick
    Resetting,
}

impl GamePhase {
    /// Whether spawning, movement and collisions run in this phase
    pub fn is_active(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::LevelTransition)
    }
}

/// An asteroid heading for the planet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub position: Vec3,
    /// Fraction of the remaining distance covered per tick, in [0, 1)
    pub speed: f32,
    /// Picking sphere radius for hit-actions
    pub radius: f32,
    /// Cosmetic rotation rate (radians per tick)
    pub spin: f32,
    /// Accumulated cosmetic rotation
    pub rotation: f32,
}

/// Banner text shown by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Banner {
    /// "LEVEL n!"
    LevelUp(u32),
    /// "GAME OVER - Reached Level n"
    GameOver(u32),
}

/// Notifications for the presentation layer, collected during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new level started; show the level banner
    LevelUp { level: u32 },
    /// A hazard was shot down (explosion effect at `position`)
    Destroy { id: HazardId, position: Vec3 },
    /// A hazard reached the target
    TargetHit { id: HazardId, lives: u32 },
    /// Lives ran out; show the game-over banner
    GameOver { level: u32 },
    /// The game was reinitialized
    Reset,
    /// A banner's display time ran out
    BannerCleared(Banner),
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Level, lives and difficulty for the running game.
///
/// Owned by the progression state machine; other components only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Current level (1-based)
    pub level: u32,
    /// Remaining lives (never increases during a game)
    pub lives: u32,
    /// Clock time the current level's countdown started
    pub level_start_ms: u64,
    /// Minimum time between spawn waves
    pub spawn_interval_ms: u64,
    /// Base interpolation factor for newly spawned hazards
    pub hazard_speed: f32,
    /// Current phase
    pub phase: GamePhase,
}

impl GameState {
    /// Fresh game starting at `now_ms`
    pub fn new(tuning: &Tuning, now_ms: u64) -> Self {
        Self {
            level: 1,
            lives: tuning.initial_lives,
            level_start_ms: now_ms,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            hazard_speed: tuning.initial_hazard_speed,
            phase: GamePhase::Playing,
        }
    }

    /// Milliseconds the current level has been running
    pub fn level_elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.level_start_ms)
    }

    /// Signed time left in the current level (negative when overdue)
    pub fn time_left_ms(&self, tuning: &Tuning, now_ms: u64) -> i64 {
        tuning.level_duration_ms(self.level) as i64 - self.level_elapsed_ms(now_ms) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_state() {
        let tuning = Tuning::default();
        let state = GameState::new(&tuning, 500);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 10);
        assert_eq!(state.level_start_ms, 500);
        assert_eq!(state.spawn_interval_ms, 2000);
        assert!((state.hazard_speed - 0.005).abs() < 1e-6);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_time_left_goes_negative() {
        let tuning = Tuning::default();
        let state = GameState::new(&tuning, 0);
        assert_eq!(state.time_left_ms(&tuning, 5_000), 15_000);
        assert_eq!(state.time_left_ms(&tuning, 25_000), -5_000);
    }

    #[test]
    fn test_active_phases() {
        assert!(GamePhase::Playing.is_active());
        assert!(GamePhase::LevelTransition.is_active());
        assert!(!GamePhase::GameOver.is_active());
        assert!(!GamePhase::Resetting.is_active());
    }

    #[test]
    fn test_rng_state_is_reproducible() {
        use rand::Rng;
        let a: u32 = RngState::new(42).to_rng().random();
        let b: u32 = RngState::new(42).to_rng().random();
        assert_eq!(a, b);
    }
}

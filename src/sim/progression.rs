//! Level, lives and phase transitions
//!
//! Playing -> LevelTransition -> Playing when the level timer runs out.
//! Playing -> GameOver -> Resetting -> Playing when lives run out.
//! The machine never terminates; it cycles until the host stops ticking.

use super::registry::ThreatRegistry;
use super::schedule::{DeferredAction, Schedule, TimerId};
use super::state::{Banner, GameEvent, GamePhase, GameState, HazardId};
use crate::tuning::Tuning;

/// Sole owner of the [`GameState`]
#[derive(Debug, Clone)]
pub struct ProgressionStateMachine {
    state: GameState,
    schedule: Schedule,
    level_banner: Option<TimerId>,
}

impl ProgressionStateMachine {
    pub fn new(tuning: &Tuning, now_ms: u64) -> Self {
        Self {
            state: GameState::new(tuning, now_ms),
            schedule: Schedule::new(),
            level_banner: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Pending deferred actions (banners, reset)
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Leave the one-tick transient phases
    pub fn settle(&mut self, now_ms: u64) {
        match self.state.phase {
            GamePhase::LevelTransition => self.state.phase = GamePhase::Playing,
            GamePhase::Resetting => {
                self.state.level_start_ms = now_ms;
                self.state.phase = GamePhase::Playing;
            }
            GamePhase::Playing | GamePhase::GameOver => {}
        }
    }

    /// Advance to the next level. Only valid while active.
    pub fn level_up(&mut self, now_ms: u64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if !self.state.phase.is_active() {
            return;
        }

        let state = &mut self.state;
        state.level += 1;
        state.hazard_speed += tuning.speed_step_per_level;
        state.spawn_interval_ms = tuning.spawn_interval_for_level(state.level);
        state.level_start_ms = now_ms;
        state.phase = GamePhase::LevelTransition;

        log::info!(
            "Level {}: speed={:.4}, spawn interval={}ms",
            state.level,
            state.hazard_speed,
            state.spawn_interval_ms
        );
        events.push(GameEvent::LevelUp { level: state.level });

        // A new banner replaces the old one, so only the newest timer survives
        if let Some(id) = self.level_banner.take() {
            self.schedule.cancel(id);
        }
        let level = self.state.level;
        self.level_banner = Some(self.schedule.schedule(
            now_ms,
            tuning.level_banner_ms,
            DeferredAction::ClearBanner(Banner::LevelUp(level)),
        ));
    }

    /// Charge one life per hazard that reached the target.
    ///
    /// Lives stop at zero; the first hit that empties them ends the game.
    pub fn apply_target_hits(
        &mut self,
        hits: &[HazardId],
        now_ms: u64,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        for &id in hits {
            if !self.state.phase.is_active() {
                break;
            }
            self.state.lives = self.state.lives.saturating_sub(1);
            log::debug!("Hazard {} hit the target, {} lives left", id, self.state.lives);
            events.push(GameEvent::TargetHit {
                id,
                lives: self.state.lives,
            });
            if self.state.lives == 0 {
                self.game_over(now_ms, tuning, events);
            }
        }
    }

    fn game_over(&mut self, now_ms: u64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.state.phase = GamePhase::GameOver;
        log::info!("Game over at level {}", self.state.level);
        events.push(GameEvent::GameOver {
            level: self.state.level,
        });
        self.schedule
            .schedule(now_ms, tuning.game_over_delay_ms, DeferredAction::BeginReset);
    }

    /// Fire due timers. Returns true when the game was reset this call.
    pub fn poll_timers(
        &mut self,
        now_ms: u64,
        tuning: &Tuning,
        registry: &mut ThreatRegistry,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let mut reset = false;
        for action in self.schedule.drain_due(now_ms) {
            match action {
                DeferredAction::ClearBanner(banner) => {
                    if matches!(banner, Banner::LevelUp(_)) {
                        self.level_banner = None;
                    }
                    events.push(GameEvent::BannerCleared(banner));
                }
                DeferredAction::BeginReset => {
                    if self.state.phase == GamePhase::GameOver {
                        self.reset(now_ms, tuning, registry, events);
                        reset = true;
                    }
                }
            }
        }
        reset
    }

    fn reset(
        &mut self,
        now_ms: u64,
        tuning: &Tuning,
        registry: &mut ThreatRegistry,
        events: &mut Vec<GameEvent>,
    ) {
        let reached = self.state.level;
        events.push(GameEvent::BannerCleared(Banner::GameOver(reached)));

        self.schedule
            .cancel_where(|a| matches!(a, DeferredAction::ClearBanner(_)));
        self.level_banner = None;
        registry.clear();

        self.state = GameState::new(tuning, now_ms);
        self.state.phase = GamePhase::Resetting;

        log::info!("Game reset (previous run reached level {})", reached);
        events.push(GameEvent::Reset);
    }
}

//! Simulation tick
//!
//! One tick runs to completion before the next: drain queued hit-actions,
//! fire due timers, spawn, move, collide, progress, then hand a snapshot to
//! the presentation layer.

use glam::{Vec2, Vec3};
use rand::RngCore;
use serde::Serialize;

use super::camera::Camera;
use super::clock::Clock;
use super::collision::CollisionDetector;
use super::progression::ProgressionStateMachine;
use super::registry::ThreatRegistry;
use super::spawner::{SpawnDecision, Spawner};
use super::state::{GameEvent, GamePhase, GameState, HazardId, RngState};
use crate::consts::TARGET_SPIN;
use crate::normalize_angle;
use crate::tuning::Tuning;

/// A hit-action request in normalized pointer coordinates
/// (x, y in [-1, 1], y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
}

impl PointerInput {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert a window-space position (pixels, y down) to pointer coordinates
    pub fn from_screen(px: f32, py: f32, width: f32, height: f32) -> Self {
        Self {
            x: (px / width) * 2.0 - 1.0,
            y: -(py / height) * 2.0 + 1.0,
        }
    }

    fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Read-only view of one hazard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardView {
    pub id: HazardId,
    pub position: Vec3,
    pub radius: f32,
    pub rotation: f32,
}

/// Everything the presentation layer needs after a tick
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub lives: u32,
    /// Level countdown, clamped at zero
    pub time_left_ms: u64,
    /// HUD countdown in whole seconds (rounded up)
    pub seconds_left: u64,
    pub target_position: Vec3,
    /// Planet render radius
    pub target_radius: f32,
    pub target_rotation: f32,
    pub hazards: Vec<HazardView>,
    pub events: Vec<GameEvent>,
}

/// Consumer of per-tick snapshots (renderer, HUD, audio, logger)
pub trait PresentationSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Sink that discards snapshots
#[derive(Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn present(&mut self, _snapshot: &Snapshot) {}
}

impl<F: FnMut(&Snapshot)> PresentationSink for F {
    fn present(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// The whole game core, driven by a [`Clock`]
pub struct Simulation<C: Clock> {
    clock: C,
    tuning: Tuning,
    registry: ThreatRegistry,
    spawner: Spawner,
    collisions: CollisionDetector,
    progression: ProgressionStateMachine,
    camera: Camera,
    pending_hits: Vec<PointerInput>,
    /// Events raised outside a tick (immediate hits), reported with the next snapshot
    carried_events: Vec<GameEvent>,
    target_rotation: f32,
    time_ticks: u64,
}

impl<C: Clock> Simulation<C> {
    pub fn new(clock: C, tuning: Tuning) -> Self {
        let seed = tuning.seed.unwrap_or_else(|| rand::rng().next_u64());
        log::info!("New simulation with seed {}", seed);

        let now = clock.now_ms();
        Self {
            spawner: Spawner::new(&RngState::new(seed)),
            collisions: CollisionDetector::from_tuning(&tuning),
            progression: ProgressionStateMachine::new(&tuning, now),
            camera: Camera::new(&tuning.camera),
            registry: ThreatRegistry::new(),
            pending_hits: Vec::new(),
            carried_events: Vec::new(),
            target_rotation: 0.0,
            time_ticks: 0,
            clock,
            tuning,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &GameState {
        self.progression.state()
    }

    pub fn registry(&self) -> &ThreatRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the camera (e.g. after the viewport aspect changes)
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Queue a hit-action for the start of the next tick
    pub fn queue_hit(&mut self, pointer: PointerInput) {
        self.pending_hits.push(pointer);
    }

    /// Resolve a hit-action right away; returns the destroyed hazard
    pub fn hit_now(&mut self, pointer: PointerInput) -> Option<HazardId> {
        let mut events = std::mem::take(&mut self.carried_events);
        let hit = self.resolve_hit(pointer, &mut events);
        self.carried_events = events;
        hit
    }

    fn resolve_hit(
        &mut self,
        pointer: PointerInput,
        events: &mut Vec<GameEvent>,
    ) -> Option<HazardId> {
        if !self.progression.phase().is_active() {
            return None;
        }
        let ray = self.camera.ray(pointer.as_vec2());
        match self.collisions.resolve_hit(&mut self.registry, &ray) {
            Some(hit) => {
                log::debug!("Hit hazard {} at {:?}", hit.id, hit.point);
                events.push(GameEvent::Destroy {
                    id: hit.id,
                    position: hit.point,
                });
                Some(hit.id)
            }
            None => {
                log::trace!("Hit-action at ({}, {}) missed", pointer.x, pointer.y);
                None
            }
        }
    }

    /// Advance one tick and return the resulting snapshot
    pub fn step(&mut self) -> Snapshot {
        let now = self.clock.now_ms();
        self.time_ticks += 1;
        let mut events = std::mem::take(&mut self.carried_events);

        self.progression.settle(now);

        // Input first, so no stage of this tick sees a half-applied hit
        for pointer in std::mem::take(&mut self.pending_hits) {
            self.resolve_hit(pointer, &mut events);
        }

        if self
            .progression
            .poll_timers(now, &self.tuning, &mut self.registry, &mut events)
        {
            self.spawner.reset();
        }

        self.target_rotation = normalize_angle(self.target_rotation + TARGET_SPIN);

        if self.progression.phase().is_active() {
            let decision = self
                .spawner
                .tick(now, self.progression.state(), &self.tuning);

            let level_up = match decision {
                SpawnDecision::LevelUp => true,
                SpawnDecision::Spawn(specs) => {
                    for spec in specs {
                        self.registry.spawn(spec);
                    }
                    false
                }
                SpawnDecision::Wait => false,
            };

            self.registry.advance(self.collisions.target(), 1.0);

            let hits = self.collisions.collide_with_target(&mut self.registry);
            self.progression
                .apply_target_hits(&hits, now, &self.tuning, &mut events);

            // A game over in this tick takes precedence over the level-up
            if level_up && self.progression.phase().is_active() {
                self.progression.level_up(now, &self.tuning, &mut events);
            }
        }

        self.snapshot(now, events)
    }

    /// Advance one tick and hand the snapshot to `sink`
    pub fn tick(&mut self, sink: &mut dyn PresentationSink) {
        let snapshot = self.step();
        sink.present(&snapshot);
    }

    fn snapshot(&self, now: u64, events: Vec<GameEvent>) -> Snapshot {
        let state = self.progression.state();
        let time_left_ms = state.time_left_ms(&self.tuning, now).max(0) as u64;
        Snapshot {
            phase: state.phase,
            level: state.level,
            lives: state.lives,
            time_left_ms,
            seconds_left: time_left_ms.div_ceil(1000),
            target_position: self.collisions.target(),
            target_radius: self.tuning.target_radius,
            target_rotation: self.target_rotation,
            hazards: self
                .registry
                .iter()
                .map(|h| HazardView {
                    id: h.id,
                    position: h.position,
                    radius: h.radius,
                    rotation: h.rotation,
                })
                .collect(),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::sim::clock::ManualClock;
    use crate::sim::spawner::HazardSpec;

    fn seeded_tuning() -> Tuning {
        Tuning {
            seed: Some(12345),
            ..Default::default()
        }
    }

    fn sim() -> Simulation<ManualClock> {
        Simulation::new(ManualClock::new(0), seeded_tuning())
    }

    /// Tuning where spawned hazards never move and never spawn after the first wave
    fn frozen_tuning() -> Tuning {
        Tuning {
            seed: Some(1),
            initial_hazard_speed: 0.0,
            initial_spawn_interval_ms: u64::MAX,
            ..Default::default()
        }
    }

    fn add_hazard(sim: &mut Simulation<ManualClock>, position: Vec3, speed: f32) -> HazardId {
        sim.registry.spawn(HazardSpec {
            position,
            speed,
            radius: 15.0,
            spin: 0.0,
        })
    }

    #[test]
    fn test_first_tick_spawns_one_hazard() {
        let mut sim = sim();
        let snap = sim.step();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.hazards.len(), 1);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.lives, 10);
        assert_eq!(snap.seconds_left, 20);
        assert_eq!(snap.target_radius, 100.0);
    }

    #[test]
    fn test_level_up_after_duration_without_collisions() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();

        sim.clock_mut().set(19_999);
        let snap = sim.step();
        assert_eq!(snap.level, 1);
        assert_eq!(snap.seconds_left, 1);

        sim.clock_mut().set(20_000);
        let snap = sim.step();
        assert_eq!(snap.phase, GamePhase::LevelTransition);
        assert_eq!(snap.level, 2);
        assert!(snap.events.contains(&GameEvent::LevelUp { level: 2 }));

        let state = sim.state();
        assert!((state.hazard_speed - 0.001).abs() < 1e-6);
        assert_eq!(state.spawn_interval_ms, 2800);
        assert_eq!(state.level_start_ms, 20_000);
        assert_eq!(state.lives, 10);

        sim.clock_mut().advance(SIM_DT_MS);
        assert_eq!(sim.step().phase, GamePhase::Playing);
    }

    #[test]
    fn test_stall_levels_up_once_per_tick() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        // Stall far past several level durations
        sim.clock_mut().set(500_000);
        assert_eq!(sim.step().level, 2);
        // The new level started at the stalled time, so no further jump
        sim.clock_mut().advance(SIM_DT_MS);
        assert_eq!(sim.step().level, 2);
    }

    #[test]
    fn test_collision_costs_lives() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        let target = sim.tuning().target_position;
        let a = add_hazard(&mut sim, target + Vec3::new(50.0, 0.0, 0.0), 0.0);
        let b = add_hazard(&mut sim, target + Vec3::new(0.0, 50.0, 0.0), 0.0);

        sim.clock_mut().advance(SIM_DT_MS);
        let snap = sim.step();
        assert_eq!(snap.lives, 8);
        assert!(!sim.registry().contains(a));
        assert!(!sim.registry().contains(b));
        assert!(snap.events.contains(&GameEvent::TargetHit { id: a, lives: 9 }));
        assert!(snap.events.contains(&GameEvent::TargetHit { id: b, lives: 8 }));
    }

    #[test]
    fn test_game_over_freezes_then_resets() {
        let tuning = Tuning {
            initial_lives: 1,
            ..frozen_tuning()
        };
        let mut sim = Simulation::new(ManualClock::new(0), tuning);
        sim.step();
        let target = sim.tuning().target_position;
        add_hazard(&mut sim, target + Vec3::new(0.0, 50.0, 0.0), 0.0);
        let far = add_hazard(&mut sim, Vec3::new(0.0, 300.0, 0.0), 0.5);

        sim.clock_mut().set(1000);
        let snap = sim.step();
        assert_eq!(snap.lives, 0);
        assert_eq!(snap.phase, GamePhase::GameOver);
        assert!(snap.events.contains(&GameEvent::GameOver { level: 1 }));
        let frozen_pos = sim.registry().get(far).unwrap().position;

        // Frozen: no movement, no hits accepted
        sim.clock_mut().set(2000);
        let snap = sim.step();
        assert_eq!(snap.phase, GamePhase::GameOver);
        assert_eq!(sim.registry().get(far).unwrap().position, frozen_pos);
        let pointer = sim.camera().project(frozen_pos).unwrap();
        assert_eq!(sim.hit_now(PointerInput::new(pointer.x, pointer.y)), None);

        sim.clock_mut().set(4000);
        let snap = sim.step();
        assert_eq!(snap.phase, GamePhase::Resetting);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.lives, 1);
        assert!(snap.hazards.is_empty());
        assert!(snap.events.contains(&GameEvent::Reset));

        sim.clock_mut().advance(SIM_DT_MS);
        let snap = sim.step();
        assert_eq!(snap.phase, GamePhase::Playing);
        // Spawner was reset, so a fresh wave arrives immediately
        assert_eq!(snap.hazards.len(), 1);
    }

    #[test]
    fn test_hit_now_destroys_nearest_hazard() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        let spawned: Vec<HazardId> = sim.registry().iter().map(|h| h.id).collect();
        for id in spawned {
            sim.registry.remove_by_id(id);
        }

        let ray = sim.camera().ray(Vec2::new(0.1, 0.1));
        let far = add_hazard(&mut sim, ray.at(500.0), 0.0);
        let near = add_hazard(&mut sim, ray.at(300.0), 0.0);

        assert_eq!(sim.hit_now(PointerInput::new(0.1, 0.1)), Some(near));
        assert!(sim.registry().contains(far));

        // Destroy event is reported with the next snapshot
        sim.clock_mut().advance(SIM_DT_MS);
        let snap = sim.step();
        assert!(snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Destroy { id, .. } if *id == near)));
    }

    #[test]
    fn test_queued_hits_drain_next_tick() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        let ray = sim.camera().ray(Vec2::ZERO);
        let id = add_hazard(&mut sim, ray.at(400.0), 0.0);

        sim.queue_hit(PointerInput::new(0.0, 0.0));
        // A second click on the same spot finds nothing left on that ray
        sim.queue_hit(PointerInput::new(0.0, 0.0));
        assert!(sim.registry().contains(id));

        sim.clock_mut().advance(SIM_DT_MS);
        let snap = sim.step();
        assert!(!sim.registry().contains(id));
        let destroys = snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Destroy { .. }))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn test_hit_and_collision_on_same_hazard_costs_nothing() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        let spawned: Vec<HazardId> = sim.registry().iter().map(|h| h.id).collect();
        for id in spawned {
            sim.registry.remove_by_id(id);
        }

        // Inside the collision radius, so this tick would also count it as an impact
        let position = sim.tuning().target_position + Vec3::new(0.0, 105.0, 0.0);
        let id = add_hazard(&mut sim, position, 0.0);
        let pointer = sim.camera().project(position).unwrap();
        sim.queue_hit(PointerInput::new(pointer.x, pointer.y));

        sim.clock_mut().advance(SIM_DT_MS);
        let snap = sim.step();
        assert_eq!(snap.lives, 10);
        assert!(!sim.registry().contains(id));
        let destroys = snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Destroy { id: hit, .. } if *hit == id))
            .count();
        assert_eq!(destroys, 1);
        assert!(!snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::TargetHit { .. })));
    }

    #[test]
    fn test_miss_is_noop() {
        let mut sim = Simulation::new(ManualClock::new(0), frozen_tuning());
        sim.step();
        let before = sim.registry().len();
        // Corner of the screen, far from the spawn band
        assert_eq!(sim.hit_now(PointerInput::new(-1.0, -1.0)), None);
        assert_eq!(sim.registry().len(), before);
    }

    #[test]
    fn test_hazards_approach_target() {
        let mut sim = sim();
        let snap = sim.step();
        let id = snap.hazards[0].id;
        let target = sim.tuning().target_position;
        let start = snap.hazards[0].position.distance(target);

        for _ in 0..10 {
            sim.clock_mut().advance(SIM_DT_MS);
            sim.step();
        }
        let now = sim.registry().get(id).unwrap().position.distance(target);
        assert!(now < start);
    }

    #[test]
    fn test_sink_receives_every_tick() {
        let mut sim = sim();
        let mut seen = Vec::new();
        let mut sink = |s: &Snapshot| seen.push(s.lives);
        for _ in 0..3 {
            sim.clock_mut().advance(SIM_DT_MS);
            sim.tick(&mut sink);
        }
        assert_eq!(seen, vec![10, 10, 10]);
    }

    #[test]
    fn test_determinism() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..600 {
            a.clock_mut().advance(SIM_DT_MS);
            b.clock_mut().advance(SIM_DT_MS);
            a.step();
            b.step();
        }
        let pa: Vec<Vec3> = a.registry().iter().map(|h| h.position).collect();
        let pb: Vec<Vec3> = b.registry().iter().map(|h| h.position).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.state().lives, b.state().lives);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn prop_lives_never_increase_while_playing(
            seed in proptest::prelude::any::<u64>(),
            frames in proptest::collection::vec(
                (1u64..400, proptest::option::of((-1.0f32..1.0, -1.0f32..1.0))),
                1..300,
            ),
        ) {
            let tuning = Tuning {
                seed: Some(seed),
                initial_hazard_speed: 0.2,
                initial_lives: 3,
                ..Default::default()
            };
            let mut sim = Simulation::new(ManualClock::new(0), tuning);
            let mut last = sim.step();

            for (dt, click) in frames {
                if let Some((x, y)) = click {
                    sim.queue_hit(PointerInput::new(x, y));
                }
                sim.clock_mut().advance(dt);
                let snap = sim.step();

                if last.phase.is_active() && snap.phase.is_active() {
                    proptest::prop_assert!(snap.lives <= last.lives);
                }
                proptest::prop_assert_eq!(snap.phase == GamePhase::GameOver, snap.lives == 0);
                let game_overs = snap
                    .events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                    .count();
                proptest::prop_assert!(game_overs <= 1);
                last = snap;
            }
        }
    }

    #[test]
    fn test_pointer_from_screen() {
        let p = PointerInput::from_screen(0.0, 0.0, 800.0, 600.0);
        assert_eq!((p.x, p.y), (-1.0, 1.0));
        let p = PointerInput::from_screen(400.0, 300.0, 800.0, 600.0);
        assert_eq!((p.x, p.y), (0.0, 0.0));
    }
}

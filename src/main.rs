//! Save the Planet headless runner
//!
//! Drives the simulation with a fixed-timestep loop and an autopilot player,
//! logging what a renderer would show. Pass a tuning JSON path as the first
//! argument to override game balance.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use save_the_planet::consts::*;
    use save_the_planet::{Tuning, tick_time_ms};
    use save_the_planet::sim::{
        Banner, GameEvent, GamePhase, ManualClock, PointerInput, PresentationSink, Simulation,
        Snapshot,
    };

    /// Simulated play time
    const RUN_SECONDS: f32 = 180.0;
    /// Render frame time the loop pretends to get (a bit slower than the sim)
    const FRAME_DT: f32 = 1.0 / 55.0;
    /// Ticks between autopilot clicks
    const AUTOPILOT_INTERVAL: u64 = 20;

    /// Logs what a HUD would display
    #[derive(Default)]
    struct LogSink {
        last: Option<Snapshot>,
        last_seconds_left: Option<u64>,
        destroyed: u32,
        games_over: u32,
        best_level: u32,
    }

    impl PresentationSink for LogSink {
        fn present(&mut self, snapshot: &Snapshot) {
            for event in &snapshot.events {
                match event {
                    GameEvent::LevelUp { level } => log::info!("LEVEL {}!", level),
                    GameEvent::Destroy { id, position } => {
                        self.destroyed += 1;
                        log::debug!("Boom: hazard {} at {:?}", id, position);
                    }
                    GameEvent::TargetHit { lives, .. } => log::info!("Lives: {}", lives),
                    GameEvent::GameOver { level } => {
                        self.games_over += 1;
                        log::info!("GAME OVER - Reached Level {}", level);
                    }
                    GameEvent::Reset => log::info!("Level 1 / Lives: {}", snapshot.lives),
                    GameEvent::BannerCleared(Banner::LevelUp(_)) => {}
                    GameEvent::BannerCleared(Banner::GameOver(_)) => {}
                }
            }
            self.best_level = self.best_level.max(snapshot.level);

            if snapshot.phase == GamePhase::Playing
                && self.last_seconds_left != Some(snapshot.seconds_left)
            {
                self.last_seconds_left = Some(snapshot.seconds_left);
                if snapshot.seconds_left % 5 == 0 {
                    log::debug!(
                        "Time Left: {}s ({} hazards)",
                        snapshot.seconds_left,
                        snapshot.hazards.len()
                    );
                }
            }
            self.last = Some(snapshot.clone());
        }
    }

    /// Click the hazard closest to the planet, if it is on screen
    fn autopilot(sim: &mut Simulation<ManualClock>) {
        let target = sim.tuning().target_position;
        let Some(hazard) = sim.registry().iter().min_by(|a, b| {
            a.position
                .distance(target)
                .partial_cmp(&b.position.distance(target))
                .unwrap_or(std::cmp::Ordering::Equal)
        }) else {
            return;
        };
        if let Some(pointer) = sim.camera().project(hazard.position) {
            sim.queue_hit(PointerInput::new(pointer.x, pointer.y));
        }
    }

    fn load_tuning() -> Tuning {
        match std::env::args().nth(1) {
            Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
                log::warn!("{}; using default tuning", e);
                Tuning::default()
            }),
            None => Tuning::default(),
        }
    }

    pub fn run() {
        let mut sim = Simulation::new(ManualClock::new(0), load_tuning());
        let mut sink = LogSink::default();

        let mut accumulator = 0.0f32;
        let mut elapsed = 0.0f32;
        while elapsed < RUN_SECONDS {
            elapsed += FRAME_DT;
            accumulator += FRAME_DT.min(0.1);

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let tick = sim.time_ticks() + 1;
                sim.clock_mut().set(tick_time_ms(tick));
                if sim.time_ticks() % AUTOPILOT_INTERVAL == 0 {
                    autopilot(&mut sim);
                }
                sim.tick(&mut sink);
                accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        log::info!(
            "Ran {} ticks: destroyed {}, {} game(s) over, best level {}",
            sim.time_ticks(),
            sink.destroyed,
            sink.games_over,
            sink.best_level
        );
        let Some(last) = sink.last.as_ref() else {
            return;
        };
        match serde_json::to_string_pretty(last) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize final snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Save the Planet (headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is driven by the host page
}

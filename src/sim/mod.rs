//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes only from the injected clock
//! - Seeded RNG only
//! - Stable iteration order (by hazard ID)
//! - No rendering or platform dependencies

pub mod camera;
pub mod clock;
pub mod collision;
pub mod progression;
pub mod registry;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use camera::{Camera, Ray};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collision::{CollisionDetector, RayHit, ray_sphere_intersection};
pub use progression::ProgressionStateMachine;
pub use registry::ThreatRegistry;
pub use schedule::{DeferredAction, Schedule, TimerId};
pub use spawner::{HazardSpec, SpawnDecision, Spawner};
pub use state::{Banner, GameEvent, GamePhase, GameState, Hazard, HazardId, RngState};
pub use tick::{HazardView, NullSink, PointerInput, PresentationSink, Simulation, Snapshot};

//! Live hazard storage and movement
//!
//! Hazards are kept sorted by id so iteration order is stable across runs.

use glam::Vec3;

use super::spawner::HazardSpec;
use super::state::{Hazard, HazardId};

/// Owns every live hazard
#[derive(Debug, Clone)]
pub struct ThreatRegistry {
    hazards: Vec<Hazard>,
    next_id: HazardId,
}

impl Default for ThreatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatRegistry {
    pub fn new() -> Self {
        Self {
            hazards: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new hazard ID
    fn next_hazard_id(&mut self) -> HazardId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a hazard from a spawn spec and return its id
    pub fn spawn(&mut self, spec: HazardSpec) -> HazardId {
        let id = self.next_hazard_id();
        self.hazards.push(Hazard {
            id,
            position: spec.position,
            speed: spec.speed,
            radius: spec.radius,
            spin: spec.spin,
            rotation: 0.0,
        });
        id
    }

    /// Move every hazard toward `target` by interpolation.
    ///
    /// `ticks` is the elapsed time in simulation ticks; one tick moves a hazard
    /// `speed` of the way to the target, so approach slows as it gets close.
    pub fn advance(&mut self, target: Vec3, ticks: f32) {
        for hazard in &mut self.hazards {
            let t = if ticks == 1.0 {
                hazard.speed
            } else {
                1.0 - (1.0 - hazard.speed).powf(ticks)
            };
            hazard.position = hazard.position.lerp(target, t);
            hazard.rotation = crate::normalize_angle(hazard.rotation + hazard.spin * ticks);
        }
    }

    /// Remove a hazard. Absent ids are ignored; returns the removed hazard.
    pub fn remove_by_id(&mut self, id: HazardId) -> Option<Hazard> {
        let index = self.hazards.binary_search_by_key(&id, |h| h.id).ok()?;
        Some(self.hazards.remove(index))
    }

    /// Remove every hazard. Ids keep counting up.
    pub fn clear(&mut self) {
        self.hazards.clear();
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards
            .binary_search_by_key(&id, |h| h.id)
            .ok()
            .map(|i| &self.hazards[i])
    }

    pub fn contains(&self, id: HazardId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over live hazards in id order
    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

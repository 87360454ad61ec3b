//! Collision detection against the target and player hit-actions
//!
//! Both checks scan first and remove afterwards, so the registry is never
//! mutated while it is being iterated.

use glam::Vec3;

use super::camera::Ray;
use super::registry::ThreatRegistry;
use super::state::HazardId;
use crate::tuning::Tuning;

/// Result of a hit-action that found a hazard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub id: HazardId,
    /// Distance along the ray to the entry point
    pub distance: f32,
    /// Entry point on the hazard's sphere
    pub point: Vec3,
}

/// Distance along `ray` to where it enters a sphere, if it does.
///
/// A ray starting inside the sphere hits at distance 0.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray.origin;
    let c = to_center.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = to_center.dot(ray.dir);
    if b <= 0.0 {
        // Sphere is behind the origin
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(b - discriminant.sqrt())
}

/// Evaluates hazard-vs-target proximity and hit-action queries
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    target: Vec3,
    radius: f32,
}

impl CollisionDetector {
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self { target, radius }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.target_position, tuning.collision_radius)
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Hazards currently inside the collision radius, in id order
    pub fn target_overlaps(&self, registry: &ThreatRegistry) -> Vec<HazardId> {
        registry
            .iter()
            .filter(|h| h.position.distance(self.target) < self.radius)
            .map(|h| h.id)
            .collect()
    }

    /// Remove every hazard touching the target; returns the removed ids.
    ///
    /// Each returned id costs the player one life.
    pub fn collide_with_target(&self, registry: &mut ThreatRegistry) -> Vec<HazardId> {
        let overlapping = self.target_overlaps(registry);
        overlapping
            .into_iter()
            .filter(|&id| registry.remove_by_id(id).is_some())
            .collect()
    }

    /// Nearest hazard whose sphere the ray passes through
    pub fn pick(&self, registry: &ThreatRegistry, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for hazard in registry.iter() {
            let Some(distance) = ray_sphere_intersection(ray, hazard.position, hazard.radius)
            else {
                continue;
            };
            // Strictly closer wins, so equal distances keep the first found
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(RayHit {
                    id: hazard.id,
                    distance,
                    point: ray.at(distance),
                });
            }
        }
        best
    }

    /// Destroy the nearest hazard on the ray, if any
    pub fn resolve_hit(&self, registry: &mut ThreatRegistry, ray: &Ray) -> Option<RayHit> {
        let hit = self.pick(registry, ray)?;
        registry.remove_by_id(hit.id)?;
        Some(hit)
    }
}

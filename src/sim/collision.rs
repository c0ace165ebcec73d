//! Collision detection between the vehicle and track entities
//!
//! Plain axis-aligned boxes. Both boxes are shrunk by a small margin first so
//! that touching edges (or anti-aliased fringes on screen) don't count.

use glam::Vec2;

use super::track::{EntityKind, TrackEntity};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Shrink on every side, collapsing to the center when too small
    pub fn inset(&self, margin: f32) -> Self {
        let center = (self.min + self.max) * 0.5;
        let min = (self.min + Vec2::splat(margin)).min(center);
        let max = (self.max - Vec2::splat(margin)).max(center);
        Self { min, max }
    }

    /// Strict overlap; shared edges don't count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// A detected vehicle/entity contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
}

/// Find every live entity overlapping the vehicle this tick
pub fn detect_hits(vehicle: Aabb, entities: &[TrackEntity], margin: f32) -> Vec<Hit> {
    let vehicle = vehicle.inset(margin);
    entities
        .iter()
        .filter(|e| e.live)
        .filter(|e| vehicle.overlaps(&e.bounds().inset(margin)))
        .map(|e| Hit {
            id: e.id,
            kind: e.kind,
            pos: e.pos,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u32, x: f32, y: f32) -> TrackEntity {
        TrackEntity {
            id,
            kind: EntityKind::Collectible,
            pos: Vec2::new(x, y),
            live: true,
        }
    }

    #[test]
    fn test_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(8.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        // Touching edges only
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_margin_rejects_grazing_contact() {
        let vehicle = Aabb::from_center(Vec2::ZERO, Vec2::new(60.0, 40.0));
        // Boxes overlap by 4px horizontally
        let grazing = [entity(1, 38.0, 0.0)];
        assert_eq!(detect_hits(vehicle, &grazing, 0.0).len(), 1);
        assert!(detect_hits(vehicle, &grazing, 4.0).is_empty());

        let solid = [entity(2, 20.0, 0.0)];
        assert_eq!(detect_hits(vehicle, &solid, 4.0)[0].id, 2);
    }

    #[test]
    fn test_destroyed_entities_ignored() {
        let vehicle = Aabb::from_center(Vec2::ZERO, Vec2::new(60.0, 40.0));
        let mut dead = entity(3, 0.0, 0.0);
        dead.live = false;
        assert!(detect_hits(vehicle, &[dead], 4.0).is_empty());
    }

    #[test]
    fn test_inset_never_inverts() {
        let small = Aabb::from_center(Vec2::new(5.0, 5.0), Vec2::splat(2.0));
        let shrunk = small.inset(10.0);
        assert!(shrunk.min.x <= shrunk.max.x);
        assert_eq!(shrunk.min, Vec2::new(5.0, 5.0));
    }
}

//! Track entities: spawning, scrolling and expiry
//!
//! Entities appear past the right edge of the lane and scroll left at the
//! current speed. One that leaves on the left without being hit simply
//! disappears; missed stars and dodged obstacles do not score.

use glam::Vec2;

use super::collision::Aabb;
use super::state::Layout;
use crate::consts::ENTITY_SIZE;

/// Entity variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Star, +1 on contact
    Collectible,
    /// Roadblock, counts a hit on contact
    Obstacle,
}

/// A scrolling entity on the track
#[derive(Debug, Clone)]
pub struct TrackEntity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Cleared on the first hit so an entity can never score twice
    pub live: bool,
}

impl TrackEntity {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(ENTITY_SIZE))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    entities: Vec<TrackEntity>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new entity at the right edge of the lane
    pub fn spawn(&mut self, id: u32, kind: EntityKind, layout: &Layout) {
        self.entities.push(TrackEntity {
            id,
            kind,
            pos: Vec2::new(layout.spawn_x(), layout.lane_y()),
            live: true,
        });
    }

    /// Scroll every live entity left and drop those past `despawn_x`.
    /// Returns how many expired unhit.
    pub fn advance(&mut self, speed: f32, dt: f32, despawn_x: f32) -> usize {
        let dx = speed * dt;
        for entity in self.entities.iter_mut().filter(|e| e.live) {
            entity.pos.x -= dx;
        }

        let before = self.entities.len();
        self.entities.retain(|e| e.live && e.pos.x >= despawn_x);
        before - self.entities.len()
    }

    /// Mark an entity destroyed. Returns it only if it was still live.
    pub fn destroy(&mut self, id: u32) -> Option<TrackEntity> {
        let entity = self.entities.iter_mut().find(|e| e.id == id && e.live)?;
        entity.live = false;
        Some(entity.clone())
    }

    /// Remove destroyed entities
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.live);
    }

    /// Keep entities on the lane after a resize
    pub fn relayout(&mut self, layout: &Layout) {
        let y = layout.lane_y();
        for entity in &mut self.entities {
            entity.pos.y = y;
        }
    }

    pub fn entities(&self) -> &[TrackEntity] {
        &self.entities
    }

    pub fn live_count(&self) -> usize {
        self.entities.iter().filter(|e| e.live).count()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(800.0, 400.0).unwrap()
    }

    #[test]
    fn test_spawn_at_right_edge_on_lane() {
        let layout = layout();
        let mut track = Track::new();
        track.spawn(1, EntityKind::Collectible, &layout);

        let entity = &track.entities()[0];
        assert!(entity.pos.x > layout.width);
        assert_eq!(entity.pos.y, layout.lane_y());
        assert!(entity.live);
    }

    #[test]
    fn test_advance_scrolls_and_expires() {
        let layout = layout();
        let mut track = Track::new();
        track.spawn(1, EntityKind::Obstacle, &layout);
        let start_x = track.entities()[0].pos.x;

        assert_eq!(track.advance(100.0, 0.5, layout.despawn_x()), 0);
        assert!((track.entities()[0].pos.x - (start_x - 50.0)).abs() < 1e-3);

        // Far enough to leave the screen: silently removed
        assert_eq!(track.advance(100.0, 20.0, layout.despawn_x()), 1);
        assert_eq!(track.live_count(), 0);
    }

    #[test]
    fn test_destroy_only_once() {
        let layout = layout();
        let mut track = Track::new();
        track.spawn(4, EntityKind::Collectible, &layout);

        assert!(track.destroy(4).is_some());
        assert!(track.destroy(4).is_none());
        assert_eq!(track.live_count(), 0);
        track.sweep();
        assert!(track.entities().is_empty());
    }

    #[test]
    fn test_zero_speed_freezes() {
        let layout = layout();
        let mut track = Track::new();
        track.spawn(1, EntityKind::Obstacle, &layout);
        let x = track.entities()[0].pos.x;
        track.advance(0.0, 1.0, layout.despawn_x());
        assert_eq!(track.entities()[0].pos.x, x);
    }
}

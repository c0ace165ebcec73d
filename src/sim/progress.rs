//! Score to progress mapping
//!
//! Progress drives two things: the reveal boundary (applied immediately) and
//! the vehicle's x position (eased). Only x is touched here; the jump owns y.

use super::state::Layout;
use super::tween::{Easing, Tween};
use crate::clamp01;
use crate::consts::PROGRESS_TWEEN_SECS;
use crate::settings::effective_goal;

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    star_count: u32,
    hit_count: u32,
    goal: u32,
    max_hits: u32,
    progress: f32,
    reveal_x: f32,
    /// At most one x tween in flight; retargeting replaces it
    x_tween: Option<Tween>,
}

impl ProgressTracker {
    pub fn new(goal: u32, max_hits: u32) -> Self {
        Self {
            star_count: 0,
            hit_count: 0,
            goal: effective_goal(goal),
            max_hits: max_hits.max(1),
            progress: 0.0,
            reveal_x: 0.0,
            x_tween: None,
        }
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn max_hits(&self) -> u32 {
        self.max_hits
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Right edge of the "completed" region, in pixels
    pub fn reveal_x(&self) -> f32 {
        self.reveal_x
    }

    pub fn is_tweening(&self) -> bool {
        self.x_tween.is_some()
    }

    /// Count a star and retarget the vehicle from `current_x`
    pub fn record_star(&mut self, current_x: f32, layout: &Layout) -> f32 {
        self.star_count += 1;
        self.retarget(current_x, layout);
        self.progress
    }

    /// Count a hit. Returns true once the hit limit has been reached.
    pub fn record_hit(&mut self) -> bool {
        self.hit_count += 1;
        self.hit_count >= self.max_hits
    }

    /// Recompute progress, update the reveal boundary and (re)start the x tween
    pub fn retarget(&mut self, current_x: f32, layout: &Layout) {
        self.progress = clamp01(self.star_count as f32 / self.goal as f32);
        self.reveal_x = layout.width * self.progress;

        let target = layout.vehicle_x(self.progress);
        self.x_tween = if (target - current_x).abs() < f32::EPSILON {
            None
        } else {
            Some(Tween::new(
                current_x,
                target,
                PROGRESS_TWEEN_SECS,
                Easing::EaseOutCubic,
            ))
        };
    }

    /// Advance the x tween. Returns the new x while one is running.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        let tween = self.x_tween.as_mut()?;
        let x = tween.advance(dt);
        if tween.is_finished() {
            self.x_tween = None;
        }
        Some(x)
    }

    pub fn cancel_tween(&mut self) {
        self.x_tween = None;
    }

    pub fn reset(&mut self) {
        self.star_count = 0;
        self.hit_count = 0;
        self.progress = 0.0;
        self.reveal_x = 0.0;
        self.x_tween = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(1000.0, 500.0).unwrap()
    }

    #[test]
    fn test_small_goal_coerced() {
        assert_eq!(ProgressTracker::new(5, 3).goal(), 50);
        assert_eq!(ProgressTracker::new(20, 3).goal(), 20);
    }

    #[test]
    fn test_progress_clamped() {
        let layout = layout();
        let mut tracker = ProgressTracker::new(20, 3);
        for _ in 0..10 {
            tracker.record_star(layout.start_x, &layout);
        }
        assert!((tracker.progress() - 0.5).abs() < 1e-6);
        assert!((tracker.reveal_x() - 500.0).abs() < 1e-3);

        for _ in 0..30 {
            tracker.record_star(layout.start_x, &layout);
        }
        assert_eq!(tracker.star_count(), 40);
        assert_eq!(tracker.progress(), 1.0);
        assert!((tracker.reveal_x() - layout.width).abs() < 1e-3);
    }

    #[test]
    fn test_retarget_replaces_running_tween() {
        let layout = layout();
        let mut tracker = ProgressTracker::new(20, 3);
        let mut x = layout.start_x;

        tracker.record_star(x, &layout);
        x = tracker.advance(0.1).unwrap();

        // Retarget midway; the new tween starts where the old one was
        tracker.record_star(x, &layout);
        let next = tracker.advance(0.0).unwrap();
        assert!((next - x).abs() < 1e-3);

        while let Some(v) = tracker.advance(0.1) {
            x = v;
        }
        assert!((x - layout.vehicle_x(2.0 / 20.0)).abs() < 1e-3);
        assert!(!tracker.is_tweening());
    }

    #[test]
    fn test_hit_limit() {
        let mut tracker = ProgressTracker::new(50, 2);
        assert!(!tracker.record_hit());
        assert!(tracker.record_hit());
        assert_eq!(tracker.hit_count(), 2);

        tracker.reset();
        assert_eq!(tracker.hit_count(), 0);
        assert_eq!(tracker.progress(), 0.0);
    }
}

//! Quiz answers and debug triggers into world commands

use rand::Rng;

use super::state::World;
use super::track::EntityKind;
use crate::consts::FLYOVER_MIN_PROGRESS;

/// Manual triggers for testing the scene without a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTrigger {
    Flyover,
    Star,
    Hit,
}

impl DebugTrigger {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flyover" => Some(DebugTrigger::Flyover),
            "star" => Some(DebugTrigger::Star),
            "hit" => Some(DebugTrigger::Hit),
            _ => None,
        }
    }
}

impl World {
    /// React to one quiz answer
    pub fn handle_answer(&mut self, correct: bool) {
        let broken = self.speed.is_broken();

        if correct {
            if broken {
                // Frozen track: nothing could reach the car, so credit directly
                let pos = self.vehicle.pos;
                self.collect_star(pos);
            } else {
                self.spawn(EntityKind::Collectible);
                self.start_boost();
            }

            if self.progress.progress() >= FLYOVER_MIN_PROGRESS {
                let chance = f64::from(self.settings().flyover_chance).clamp(0.0, 1.0);
                if self.rng.random_bool(chance) {
                    self.start_flyover();
                }
            }
        } else if broken {
            let pos = self.vehicle.pos;
            self.take_hit(pos);
        } else {
            self.spawn(EntityKind::Obstacle);
            self.schedule_penalty();
        }
    }

    pub fn trigger(&mut self, trigger: DebugTrigger) {
        match trigger {
            DebugTrigger::Flyover => self.start_flyover(),
            DebugTrigger::Star => {
                self.spawn(EntityKind::Collectible);
            }
            DebugTrigger::Hit => {
                self.spawn(EntityKind::Obstacle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::speed::SpeedState;
    use crate::sim::state::{Layout, SimEvent};

    fn world(settings: Settings) -> World {
        World::new(&settings, Layout::new(800.0, 400.0).unwrap())
    }

    #[test]
    fn test_correct_spawns_star_and_boosts() {
        let mut world = world(Settings::default());
        world.handle_answer(true);
        assert_eq!(world.track.live_count(), 1);
        assert_eq!(world.track.entities()[0].kind, EntityKind::Collectible);
        assert_eq!(world.speed.state(), SpeedState::Boosted);
        assert!(world.vehicle.is_jumping());
    }

    #[test]
    fn test_incorrect_spawns_obstacle_and_delays_penalty() {
        let mut world = world(Settings::default());
        world.handle_answer(false);
        assert_eq!(world.track.entities()[0].kind, EntityKind::Obstacle);
        // Penalty waits for the hit flash
        assert_eq!(world.speed.state(), SpeedState::Baseline);
        world.fire_due(0.5);
        assert_eq!(world.speed.state(), SpeedState::Penalized);
    }

    #[test]
    fn test_answers_while_broken_still_score() {
        let mut world = world(Settings::default());
        world.enter_broken();
        world.drain_events();

        world.handle_answer(true);
        world.handle_answer(false);
        assert_eq!(world.track.live_count(), 0);
        assert_eq!(world.progress.star_count(), 1);
        assert_eq!(world.progress.hit_count(), 1);
        assert_eq!(world.speed.state(), SpeedState::Broken);
        assert!(!world.drain_events().contains(&SimEvent::Broken));
    }

    #[test]
    fn test_flyover_only_past_halfway() {
        let settings = Settings {
            flyover_chance: 1.0,
            ..Default::default()
        };
        let mut world = world(settings);
        world.handle_answer(true);
        assert!(world.flyover.is_none());

        let pos = world.vehicle.pos;
        for _ in 0..25 {
            world.collect_star(pos);
        }
        world.handle_answer(true);
        assert!(world.flyover.is_some());
    }

    #[test]
    fn test_debug_triggers() {
        let mut world = world(Settings::default());
        world.trigger(DebugTrigger::Star);
        world.trigger(DebugTrigger::Hit);
        world.trigger(DebugTrigger::Flyover);
        assert_eq!(world.track.live_count(), 2);
        assert!(world.flyover.is_some());
        // Triggers spawn only; no speed change
        assert_eq!(world.speed.state(), SpeedState::Baseline);
        assert_eq!(DebugTrigger::from_str("HIT"), Some(DebugTrigger::Hit));
        assert_eq!(DebugTrigger::from_str("nope"), None);
    }
}

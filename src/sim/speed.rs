//! Scroll speed state machine
//!
//! Every speed request bumps a generation counter. Deferred reversions carry
//! the generation they belong to and only apply while it is still the latest,
//! so the most recent request always wins and Broken swallows everything.

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedState {
    #[default]
    Baseline,
    Boosted,
    Penalized,
    /// Terminal until reset: no motion, no spawning
    Broken,
}

impl SpeedState {
    pub fn label(&self) -> &'static str {
        match self {
            SpeedState::Baseline => "Cruising",
            SpeedState::Boosted => "Boost!",
            SpeedState::Penalized => "Slowed",
            SpeedState::Broken => "Broken down",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedController {
    state: SpeedState,
    generation: u64,
    base_speed: f32,
    boost_multiplier: f32,
    penalty_multiplier: f32,
}

impl SpeedController {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: SpeedState::Baseline,
            generation: 0,
            base_speed: settings.base_speed,
            boost_multiplier: settings.boost_multiplier,
            penalty_multiplier: settings.penalty_multiplier,
        }
    }

    pub fn state(&self) -> SpeedState {
        self.state
    }

    pub fn is_broken(&self) -> bool {
        self.state == SpeedState::Broken
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current scroll speed in pixels/sec
    pub fn speed(&self) -> f32 {
        match self.state {
            SpeedState::Baseline => self.base_speed,
            SpeedState::Boosted => self.base_speed * self.boost_multiplier,
            SpeedState::Penalized => self.base_speed * self.penalty_multiplier,
            SpeedState::Broken => 0.0,
        }
    }

    /// Enter Boosted now. Returns the generation its reversion must carry.
    pub fn request_boost(&mut self) -> Option<u64> {
        if self.is_broken() {
            return None;
        }
        self.generation += 1;
        self.state = SpeedState::Boosted;
        Some(self.generation)
    }

    /// Claim the next generation for a penalty that starts later.
    /// Any boost reversion in flight is superseded.
    pub fn reserve_penalty(&mut self) -> Option<u64> {
        if self.is_broken() {
            return None;
        }
        self.generation += 1;
        Some(self.generation)
    }

    /// Enter Penalized if `generation` is still the latest request
    pub fn begin_penalty(&mut self, generation: u64) -> bool {
        if self.is_broken() || generation != self.generation {
            return false;
        }
        self.state = SpeedState::Penalized;
        true
    }

    /// Return to Baseline if `generation` is still the latest request
    pub fn revert(&mut self, generation: u64) -> bool {
        if self.is_broken() || generation != self.generation {
            return false;
        }
        if self.state == SpeedState::Baseline {
            return false;
        }
        self.state = SpeedState::Baseline;
        true
    }

    /// Enter Broken. Returns true only on the transition itself.
    pub fn enter_broken(&mut self) -> bool {
        if self.is_broken() {
            return false;
        }
        self.generation += 1;
        self.state = SpeedState::Broken;
        true
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SpeedState::Baseline;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SpeedController {
        SpeedController::new(&Settings::default())
    }

    #[test]
    fn test_speeds_per_state() {
        let mut speed = controller();
        assert_eq!(speed.speed(), 180.0);
        speed.request_boost();
        assert_eq!(speed.speed(), 360.0);
        let generation = speed.reserve_penalty().unwrap();
        assert!(speed.begin_penalty(generation));
        assert_eq!(speed.speed(), 90.0);
        speed.enter_broken();
        assert_eq!(speed.speed(), 0.0);
    }

    #[test]
    fn test_boost_reverts_after_matching_generation() {
        let mut speed = controller();
        let generation = speed.request_boost().unwrap();
        assert_eq!(speed.state(), SpeedState::Boosted);
        assert!(speed.revert(generation));
        assert_eq!(speed.state(), SpeedState::Baseline);
        assert!(!speed.revert(generation));
    }

    #[test]
    fn test_last_request_wins() {
        let mut speed = controller();
        let boost = speed.request_boost().unwrap();
        let penalty = speed.reserve_penalty().unwrap();

        // The superseded boost reversion must not touch the state
        assert!(!speed.revert(boost));
        assert!(speed.begin_penalty(penalty));
        assert_eq!(speed.state(), SpeedState::Penalized);

        // A later boost overrides the running penalty
        let boost = speed.request_boost().unwrap();
        assert!(!speed.revert(penalty));
        assert_eq!(speed.state(), SpeedState::Boosted);
        assert!(speed.revert(boost));
    }

    #[test]
    fn test_pending_penalty_superseded_by_boost() {
        let mut speed = controller();
        let penalty = speed.reserve_penalty().unwrap();
        speed.request_boost();
        assert!(!speed.begin_penalty(penalty));
        assert_eq!(speed.state(), SpeedState::Boosted);
    }

    #[test]
    fn test_broken_is_absorbing() {
        let mut speed = controller();
        let boost = speed.request_boost().unwrap();
        assert!(speed.enter_broken());
        assert!(!speed.enter_broken());

        assert_eq!(speed.request_boost(), None);
        assert_eq!(speed.reserve_penalty(), None);
        assert!(!speed.revert(boost));
        assert!(!speed.begin_penalty(speed.generation()));
        assert_eq!(speed.state(), SpeedState::Broken);

        speed.reset();
        assert_eq!(speed.state(), SpeedState::Baseline);
        assert!(speed.request_boost().is_some());
    }
}

//! Engine settings and tuning
//!
//! Supplied by the quiz layer, usually as JSON alongside the rest of its
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GOAL, DEFAULT_MAX_HITS, MIN_GOAL};
use crate::error::ConfigError;

/// Visual detail level. Only bounds how much smoke and fire is alive at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "med")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl QualityPreset {
    pub fn max_particles(self) -> usize {
        match self {
            QualityPreset::Low => 32,
            QualityPreset::Medium => 128,
            QualityPreset::High => 256,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Scoring ===
    /// Stars needed for full progress (small values fall back to the default)
    pub goal: u32,
    /// Obstacle hits before the vehicle breaks down
    pub max_hits: u32,
    /// RNG seed
    pub seed: u64,

    // === Speed ===
    /// Baseline scroll speed (pixels/sec)
    pub base_speed: f32,
    pub boost_multiplier: f32,
    pub penalty_multiplier: f32,
    /// How long a boost lasts
    pub boost_secs: f32,
    /// Delay between a wrong answer and the slowdown (lets the hit flash play)
    pub penalty_delay_secs: f32,
    /// How long the slowdown lasts
    pub penalty_secs: f32,
    /// Chance per tick of a spontaneous boost while cruising
    pub random_boost_chance: f32,
    /// Chance of a flyover on a correct answer past the halfway mark
    pub flyover_chance: f32,

    // === Visual Effects ===
    pub quality: QualityPreset,
    /// Particle effects (smoke, fire)
    pub particles: bool,
    /// Reduced motion (no jump, squash or flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL,
            max_hits: DEFAULT_MAX_HITS,
            seed: 0x5EED_CA75,

            base_speed: 180.0,
            boost_multiplier: 2.0,
            penalty_multiplier: 0.5,
            boost_secs: 2.0,
            penalty_delay_secs: 0.3,
            penalty_secs: 1.5,
            random_boost_chance: 0.002,
            flyover_chance: 0.3,

            quality: QualityPreset::Medium,
            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Read and validate a JSON settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hits == 0 {
            return Err(ConfigError::Invalid(
                "max_hits must be greater than 0".to_string(),
            ));
        }

        let positive = [
            ("base_speed", self.base_speed),
            ("boost_multiplier", self.boost_multiplier),
            ("penalty_multiplier", self.penalty_multiplier),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }

        let durations = [
            ("boost_secs", self.boost_secs),
            ("penalty_delay_secs", self.penalty_delay_secs),
            ("penalty_secs", self.penalty_secs),
        ];
        for (name, value) in durations {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }

        let chances = [
            ("random_boost_chance", self.random_boost_chance),
            ("flyover_chance", self.flyover_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1]")));
            }
        }

        Ok(())
    }

    /// Goal actually used for progress
    pub fn effective_goal(&self) -> u32 {
        effective_goal(self.goal)
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }
}

/// Tiny goals would fill the road after a couple of answers
pub fn effective_goal(goal: u32) -> u32 {
    if goal <= MIN_GOAL { DEFAULT_GOAL } else { goal }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_coercion() {
        assert_eq!(effective_goal(5), 50);
        assert_eq!(effective_goal(10), 50);
        assert_eq!(effective_goal(0), 50);
        assert_eq!(effective_goal(11), 11);
        let settings = Settings {
            goal: 5,
            ..Default::default()
        };
        assert_eq!(settings.effective_goal(), 50);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "goal": 80, "quality": "High" }"#).unwrap();
        assert_eq!(settings.goal, 80);
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.max_hits, DEFAULT_MAX_HITS);
        assert_eq!(settings.max_particles(), 256);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{ "max_hits": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "flyover_chance": 1.5 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "base_speed": -3.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_quality_names() {
        let low = Settings::from_json(r#"{ "quality": "low" }"#).unwrap();
        assert_eq!(low.max_particles(), 32);
        let med = Settings::from_json(r#"{ "quality": "med" }"#).unwrap();
        assert_eq!(med.quality, QualityPreset::Medium);
        assert_eq!(
            serde_json::to_string(&QualityPreset::High).unwrap(),
            r#""high""#
        );
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("quiz-road-{}.json", std::process::id()));
        fs::write(&path, r#"{ "goal": 20, "max_hits": 5 }"#).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(settings.goal, 20);
        assert_eq!(settings.max_hits, 5);

        assert!(matches!(
            Settings::from_file(path.with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_particles_toggle() {
        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }
}

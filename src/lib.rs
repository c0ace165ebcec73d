//! Quiz Road - progress visualization for a geography quiz
//!
//! Quiz answers drive a small scrolling-road scene: correct answers send stars
//! down the lane, wrong answers send obstacles, and the car's position along
//! the road mirrors how far the player is toward the goal.
//!
//! Core modules:
//! - `sim`: Simulation (track, collisions, speed states, particles, progress)
//! - `engine`: Public surface and frame loop driving the simulation
//! - `render`: Retained scene / host abstractions and node bookkeeping
//! - `settings`: Data-driven tuning

pub mod engine;
pub mod error;
pub mod render;
pub mod settings;
pub mod sim;

pub use engine::{DebugTrigger, Engine};
pub use error::{ConfigError, EngineError};
pub use settings::{QualityPreset, Settings};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted from the host (tab switches etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Goal used when the configured one is too small to be meaningful
    pub const DEFAULT_GOAL: u32 = 50;
    /// Goals at or below this are replaced by `DEFAULT_GOAL`
    pub const MIN_GOAL: u32 = 10;
    pub const DEFAULT_MAX_HITS: u32 = 3;

    /// Vehicle body size (pixels, unscaled)
    pub const VEHICLE_WIDTH: f32 = 60.0;
    pub const VEHICLE_HEIGHT: f32 = 40.0;

    /// Stars and obstacles share one footprint
    pub const ENTITY_SIZE: f32 = 24.0;
    /// Height of an entity's center above the road surface
    pub const ENTITY_LIFT: f32 = 30.0;
    /// Distance past the lane edges where entities appear / vanish
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Inward shrink applied to both boxes before the overlap test
    pub const HIT_MARGIN: f32 = 4.0;

    /// Road surface as a fraction of container height
    pub const GROUND_FRACTION: f32 = 0.75;
    /// Vehicle x at progress 0 and 1, as fractions of container width
    pub const VEHICLE_START_FRACTION: f32 = 0.1;
    pub const VEHICLE_END_FRACTION: f32 = 0.8;
    /// Duration of the eased move toward a new progress target
    pub const PROGRESS_TWEEN_SECS: f32 = 0.6;

    pub const JUMP_HEIGHT: f32 = 16.0;
    pub const JUMP_SECS: f32 = 0.5;
    /// Per-tick factor pulling squash/stretch back to 1
    pub const SCALE_RELAX: f32 = 0.92;
    /// Per-tick factor fading the hit flash
    pub const FLASH_DECAY: f32 = 0.95;

    pub const MARKER_SECS: f32 = 0.8;
    pub const MARKER_RISE_SPEED: f32 = 40.0;

    pub const FLYOVER_SECS: f32 = 4.0;
    /// Progress needed before a flyover may be rolled
    pub const FLYOVER_MIN_PROGRESS: f32 = 0.5;

    /// Seconds between smoke puffs while broken down
    pub const BROKEN_SMOKE_INTERVAL: f32 = 0.2;
}

/// Clamp to the unit interval, mapping NaN to 0
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
    }
}

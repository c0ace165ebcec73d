//! Road simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or host dependencies

pub mod collision;
pub mod gateway;
pub mod particles;
pub mod progress;
pub mod speed;
pub mod state;
pub mod tick;
pub mod timers;
pub mod track;
pub mod tween;

pub use collision::{Aabb, Hit, detect_hits};
pub use gateway::DebugTrigger;
pub use particles::{Particle, ParticleKind, ParticleSystem};
pub use progress::ProgressTracker;
pub use speed::{SpeedController, SpeedState};
pub use state::{FeedbackMarker, Flyover, Hud, Layout, MarkerKind, SimEvent, Vehicle, World};
pub use tick::tick;
pub use timers::{DeferredAction, TimerHandle, TimerQueue};
pub use track::{EntityKind, Track, TrackEntity};
pub use tween::{Easing, Tween};

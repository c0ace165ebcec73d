//! Simulation state
//!
//! Everything the road scene needs between frames lives in [`World`]. It is
//! owned by a single engine instance and never shared.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::particles::ParticleSystem;
use super::progress::ProgressTracker;
use super::speed::SpeedController;
use super::timers::{DeferredAction, TimerHandle, TimerQueue};
use super::track::{EntityKind, Track};
use super::tween::{Easing, Tween};
use crate::consts::*;
use crate::settings::Settings;

/// Squash/stretch applied when a boost starts
pub const BOOST_SQUASH: Vec2 = Vec2::new(1.2, 0.85);
/// Squash/stretch applied when a penalty starts
pub const PENALTY_SQUASH: Vec2 = Vec2::new(0.85, 1.1);

/// Container-derived geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    /// Road surface y
    pub ground_y: f32,
    /// Vehicle x at progress 0
    pub start_x: f32,
    /// Vehicle x at progress 1
    pub end_x: f32,
}

impl Layout {
    /// None for empty or non-finite sizes
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        if !usable(width) || !usable(height) {
            return None;
        }
        Some(Self {
            width,
            height,
            ground_y: height * GROUND_FRACTION,
            start_x: width * VEHICLE_START_FRACTION,
            end_x: width * VEHICLE_END_FRACTION,
        })
    }

    pub fn spawn_x(&self) -> f32 {
        self.width + SPAWN_MARGIN
    }

    pub fn despawn_x(&self) -> f32 {
        -SPAWN_MARGIN
    }

    /// Center y of track entities
    pub fn lane_y(&self) -> f32 {
        self.ground_y - ENTITY_LIFT
    }

    /// Center y of the vehicle resting on the road
    pub fn vehicle_home_y(&self) -> f32 {
        self.ground_y - VEHICLE_HEIGHT / 2.0
    }

    pub fn vehicle_home(&self) -> Vec2 {
        Vec2::new(self.start_x, self.vehicle_home_y())
    }

    pub fn vehicle_x(&self, progress: f32) -> f32 {
        self.start_x + (self.end_x - self.start_x) * crate::clamp01(progress)
    }
}

/// Hop state (owns vehicle y while active)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jump {
    elapsed: f32,
}

impl Jump {
    /// Parabolic height above the road
    pub fn offset(&self) -> f32 {
        let t = (self.elapsed / JUMP_SECS).clamp(0.0, 1.0);
        JUMP_HEIGHT * 4.0 * t * (1.0 - t)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= JUMP_SECS
    }
}

/// The player's car
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Center position
    pub pos: Vec2,
    /// Resting y comes from here; x is driven by progress
    pub home: Vec2,
    /// Transient squash/stretch
    pub scale: Vec2,
    /// Flipped on its side after breaking down
    pub rotated: bool,
    /// Hit flash intensity (0-1, decays over time)
    pub flash: f32,
    jump: Option<Jump>,
}

impl Vehicle {
    pub fn new(home: Vec2) -> Self {
        Self {
            pos: home,
            home,
            scale: Vec2::ONE,
            rotated: false,
            flash: 0.0,
            jump: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(
            self.pos,
            Vec2::new(VEHICLE_WIDTH, VEHICLE_HEIGHT) * self.scale,
        )
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    pub fn start_jump(&mut self) {
        if self.jump.is_none() {
            self.jump = Some(Jump { elapsed: 0.0 });
        }
    }

    pub fn cancel_jump(&mut self) {
        self.jump = None;
        self.pos.y = self.home.y;
    }

    pub fn squash(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Jump, squash relaxation and flash decay for one tick
    pub fn advance(&mut self, dt: f32) {
        if let Some(jump) = self.jump.as_mut() {
            jump.elapsed += dt;
            if jump.is_finished() {
                self.jump = None;
            }
        }
        let offset = self.jump.map(|j| j.offset()).unwrap_or(0.0);
        self.pos.y = self.home.y - offset;

        self.scale = Vec2::ONE + (self.scale - Vec2::ONE) * SCALE_RELAX;
        if (self.scale - Vec2::ONE).abs().max_element() < 0.001 {
            self.scale = Vec2::ONE;
        }

        self.flash *= FLASH_DECAY;
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
    }

    /// Rendered opacity (dips while flashing)
    pub fn opacity(&self) -> f32 {
        1.0 - self.flash * 0.7
    }

    /// Rear of the car, where smoke comes from
    pub fn exhaust(&self) -> Vec2 {
        self.pos + Vec2::new(-VEHICLE_WIDTH / 2.0, -VEHICLE_HEIGHT / 4.0)
    }

    pub fn reset(&mut self, home: Vec2) {
        *self = Self::new(home);
    }
}

/// Floating feedback text kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// "+1" over a collected star
    PlusOne,
    /// "hit" over a struck obstacle
    Hit,
}

impl MarkerKind {
    pub fn text(&self) -> &'static str {
        match self {
            MarkerKind::PlusOne => "+1",
            MarkerKind::Hit => "hit",
        }
    }
}

/// Transient floating marker, removed by a deferred timer
#[derive(Debug, Clone)]
pub struct FeedbackMarker {
    pub id: u32,
    pub kind: MarkerKind,
    pub pos: Vec2,
    pub age: f32,
}

impl FeedbackMarker {
    pub fn opacity(&self) -> f32 {
        crate::clamp01(1.0 - self.age / MARKER_SECS)
    }
}

/// Decorative plane crossing the sky
#[derive(Debug, Clone)]
pub struct Flyover {
    pub id: u32,
    pub pos: Vec2,
    tween: Tween,
}

impl Flyover {
    fn new(id: u32, layout: &Layout) -> Self {
        let y = layout.height * 0.15;
        Self {
            id,
            pos: Vec2::new(-SPAWN_MARGIN * 2.0, y),
            tween: Tween::new(
                -SPAWN_MARGIN * 2.0,
                layout.width + SPAWN_MARGIN * 2.0,
                FLYOVER_SECS,
                Easing::Linear,
            ),
        }
    }

    /// Returns false once it has left the screen
    fn advance(&mut self, dt: f32) -> bool {
        self.pos.x = self.tween.advance(dt);
        !self.tween.is_finished()
    }
}

/// Things that happened inside the simulation, drained by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    StarCollected { stars: u32 },
    ObstacleHit { hits: u32 },
    Broken,
    BoostStarted,
    PenaltyStarted,
    SpeedRestored,
    FlyoverStarted,
}

/// Text mirrored into HUD nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub stars: String,
    pub hits: String,
    pub speed: &'static str,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    settings: Settings,
    pub layout: Layout,
    pub vehicle: Vehicle,
    pub track: Track,
    pub particles: ParticleSystem,
    pub speed: SpeedController,
    pub progress: ProgressTracker,
    pub markers: Vec<FeedbackMarker>,
    pub flyover: Option<Flyover>,
    pub timers: TimerQueue,
    pub rng: Pcg32,
    /// Host clock (seconds) as of the last frame or timer pump
    pub now: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Countdown to the next smoke puff while broken
    pub smoke_timer: f32,
    /// Pending timer of the latest speed request
    speed_timer: Option<TimerHandle>,
    events: Vec<SimEvent>,
    next_id: u32,
}

impl World {
    pub fn new(settings: &Settings, layout: Layout) -> Self {
        Self {
            settings: settings.clone(),
            layout,
            vehicle: Vehicle::new(layout.vehicle_home()),
            track: Track::new(),
            particles: ParticleSystem::new(settings.max_particles()),
            speed: SpeedController::new(settings),
            progress: ProgressTracker::new(settings.goal, settings.max_hits),
            markers: Vec::new(),
            flyover: None,
            timers: TimerQueue::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            now: 0.0,
            time_ticks: 0,
            smoke_timer: 0.0,
            speed_timer: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Put a new entity on the track. Nothing spawns while broken down.
    pub fn spawn(&mut self, kind: EntityKind) -> Option<u32> {
        if self.speed.is_broken() {
            return None;
        }
        let id = self.next_entity_id();
        self.track.spawn(id, kind, &self.layout);
        Some(id)
    }

    pub fn start_boost(&mut self) -> bool {
        let Some(generation) = self.speed.request_boost() else {
            return false;
        };
        self.replace_speed_timer(
            self.settings.boost_secs,
            DeferredAction::EndBoost { generation },
        );
        if !self.settings.reduced_motion {
            self.vehicle.squash(BOOST_SQUASH);
            self.vehicle.start_jump();
        }
        self.events.push(SimEvent::BoostStarted);
        true
    }

    /// Queue a slowdown after the hit flash has had time to play
    pub fn schedule_penalty(&mut self) -> bool {
        let Some(generation) = self.speed.reserve_penalty() else {
            return false;
        };
        self.replace_speed_timer(
            self.settings.penalty_delay_secs,
            DeferredAction::BeginPenalty { generation },
        );
        true
    }

    /// A newer speed request supersedes whatever the previous one left queued
    fn replace_speed_timer(&mut self, delay: f32, action: DeferredAction) {
        if let Some(handle) = self.speed_timer.take() {
            self.timers.cancel(handle);
        }
        self.speed_timer = Some(self.timers.schedule(self.now, delay, action));
    }

    /// Starts (or restarts) the decorative flyover
    pub fn start_flyover(&mut self) {
        let id = self.next_entity_id();
        self.flyover = Some(Flyover::new(id, &self.layout));
        self.events.push(SimEvent::FlyoverStarted);
    }

    pub fn advance_flyover(&mut self, dt: f32) {
        if let Some(flyover) = self.flyover.as_mut() {
            if !flyover.advance(dt) {
                self.flyover = None;
            }
        }
    }

    /// Star picked up at `pos`
    pub fn collect_star(&mut self, pos: Vec2) {
        self.progress.record_star(self.vehicle.pos.x, &self.layout);
        self.spawn_marker(MarkerKind::PlusOne, pos);
        self.events.push(SimEvent::StarCollected {
            stars: self.progress.star_count(),
        });
    }

    /// Obstacle struck at `pos`
    pub fn take_hit(&mut self, pos: Vec2) {
        let limit_reached = self.progress.record_hit();
        self.spawn_marker(MarkerKind::Hit, pos);
        if !self.settings.reduced_motion {
            self.vehicle.flash = 1.0;
        }
        let origin = self.vehicle.exhaust();
        self.particles.burst(origin, &mut self.rng);
        self.events.push(SimEvent::ObstacleHit {
            hits: self.progress.hit_count(),
        });

        if limit_reached {
            self.enter_broken();
        }
    }

    /// Break down. Only the first call has any effect.
    pub fn enter_broken(&mut self) -> bool {
        if !self.speed.enter_broken() {
            return false;
        }
        self.vehicle.rotated = true;
        self.vehicle.cancel_jump();
        self.smoke_timer = 0.0;
        self.events.push(SimEvent::Broken);
        log::info!(
            "Vehicle broke down after {} hits",
            self.progress.hit_count()
        );
        true
    }

    fn spawn_marker(&mut self, kind: MarkerKind, pos: Vec2) {
        let id = self.next_entity_id();
        self.markers.push(FeedbackMarker {
            id,
            kind,
            pos,
            age: 0.0,
        });
        self.timers
            .schedule(self.now, MARKER_SECS, DeferredAction::ExpireMarker { id });
    }

    /// Run every deferred action due at `now`
    pub fn fire_due(&mut self, now: f64) {
        while let Some((due, action)) = self.timers.pop_due(now) {
            // Chained timers are scheduled relative to when their parent was due
            self.now = due.max(self.now);
            self.apply_deferred(action);
        }
        self.now = now.max(self.now);
    }

    fn apply_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::EndBoost { generation } | DeferredAction::EndPenalty { generation } => {
                self.speed_timer = None;
                if self.speed.revert(generation) {
                    self.events.push(SimEvent::SpeedRestored);
                }
            }
            DeferredAction::BeginPenalty { generation } => {
                self.speed_timer = None;
                if self.speed.begin_penalty(generation) {
                    self.replace_speed_timer(
                        self.settings.penalty_secs,
                        DeferredAction::EndPenalty { generation },
                    );
                    if !self.settings.reduced_motion {
                        self.vehicle.squash(PENALTY_SQUASH);
                    }
                    self.events.push(SimEvent::PenaltyStarted);
                }
            }
            DeferredAction::ExpireMarker { id } => {
                self.markers.retain(|m| m.id != id);
            }
        }
    }

    /// Adopt a new container layout, keeping gameplay state
    pub fn resize(&mut self, layout: Layout) {
        self.layout = layout;
        self.vehicle.home = layout.vehicle_home();
        if !self.vehicle.is_jumping() {
            self.vehicle.pos.y = self.vehicle.home.y;
        }
        self.track.relayout(&layout);
        self.progress.retarget(self.vehicle.pos.x, &layout);
    }

    /// Back to a fresh run. Timers scheduled before this point become inert.
    pub fn reset(&mut self) {
        self.timers.bump_epoch();
        self.speed_timer = None;
        self.speed.reset();
        self.progress.reset();
        self.track.clear();
        self.particles.clear();
        self.markers.clear();
        self.flyover = None;
        self.vehicle.reset(self.layout.vehicle_home());
        self.smoke_timer = 0.0;
        self.events.clear();
    }

    pub fn hud(&self) -> Hud {
        Hud {
            stars: format!("{}/{}", self.progress.star_count(), self.progress.goal()),
            hits: format!("{}/{}", self.progress.hit_count(), self.progress.max_hits()),
            speed: self.speed.state().label(),
        }
    }
}

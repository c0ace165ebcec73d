//! Public surface of the road scene
//!
//! The quiz layer owns one [`Engine`], forwards answers to it and drives its
//! frame loop. Deferred timers run at the start of every frame and whenever
//! the host calls [`Engine::pump_timers`].

use crate::consts::*;
use crate::error::EngineError;
use crate::render::{Host, Scene, SceneSync, Size};
use crate::settings::Settings;
use crate::sim::{Layout, SimEvent, SpeedState, World, tick};

pub use crate::sim::DebugTrigger;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Waiting for a usable surface
    Inert,
    Running,
    /// Final; nothing runs any more
    Disposed,
}

type BrokenCallback = Box<dyn FnMut()>;

pub struct Engine<S: Scene, H: Host> {
    settings: Settings,
    scene: S,
    host: H,
    world: Option<World>,
    lifecycle: Lifecycle,
    sync: SceneSync,
    broken_callbacks: Vec<BrokenCallback>,
    accumulator: f32,
    last_time: Option<f64>,
    warned_no_surface: bool,
}

impl<S: Scene, H: Host> Engine<S, H> {
    pub fn new(settings: Settings, scene: S, host: H) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self {
            settings,
            scene,
            host,
            world: None,
            lifecycle: Lifecycle::Inert,
            sync: SceneSync::new(),
            broken_callbacks: Vec::new(),
            accumulator: 0.0,
            last_time: None,
            warned_no_surface: false,
        })
    }

    /// Start the scene in a container of the given size.
    ///
    /// Without a usable surface the engine stays inert and may be initialized
    /// again later.
    pub fn init(&mut self, container: Option<Size>) -> Result<(), EngineError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Err(EngineError::Disposed);
        }

        let size = match container {
            Some(size) => size,
            None => {
                self.warn_inert("no render surface");
                return Err(EngineError::MissingSurface);
            }
        };
        let Some(layout) = Layout::new(size.width, size.height) else {
            self.warn_inert("empty container");
            return Err(EngineError::EmptyContainer {
                width: size.width,
                height: size.height,
            });
        };

        let world = World::new(&self.settings, layout);
        self.sync.build(&mut self.scene, &world);
        self.world = Some(world);
        self.accumulator = 0.0;
        self.last_time = None;
        self.warned_no_surface = false;

        if self.lifecycle != Lifecycle::Running {
            self.host.observe_resize(true);
            self.scene.set_frame_loop(true);
            self.lifecycle = Lifecycle::Running;
        }
        log::info!(
            "Road scene initialized at {}x{} (goal {}, max hits {})",
            size.width,
            size.height,
            self.settings.effective_goal(),
            self.settings.max_hits
        );
        Ok(())
    }

    fn warn_inert(&mut self, reason: &str) {
        if !self.warned_no_surface {
            log::warn!("Road scene stays inert: {}", reason);
            self.warned_no_surface = true;
        }
    }

    fn running_world(&mut self) -> Option<&mut World> {
        if self.lifecycle == Lifecycle::Running {
            self.world.as_mut()
        } else {
            None
        }
    }

    /// React to one quiz answer
    pub fn handle_state_result(&mut self, correct: bool) {
        let Some(world) = self.running_world() else {
            log::debug!("Ignoring answer while not running");
            return;
        };
        world.handle_answer(correct);
        self.dispatch_events();
    }

    /// Manually fire one of the spawn/event paths
    pub fn debug_trigger(&mut self, trigger: DebugTrigger) {
        let Some(world) = self.running_world() else {
            return;
        };
        log::debug!("Debug trigger: {:?}", trigger);
        world.trigger(trigger);
        self.dispatch_events();
    }

    /// Start over: zero scores, clear the track and invalidate pending timers
    pub fn reset(&mut self) {
        let Some(world) = self.running_world() else {
            return;
        };
        world.reset();
        self.accumulator = 0.0;
        if let Some(world) = self.world.as_ref() {
            self.sync.sync(&mut self.scene, world);
        }
        log::info!("Road scene reset");
    }

    /// Tear everything down. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        let was_running = self.lifecycle == Lifecycle::Running;
        self.lifecycle = Lifecycle::Disposed;

        if was_running {
            self.scene.set_frame_loop(false);
        }
        if let Some(world) = self.world.as_mut() {
            world.timers.bump_epoch();
            world.timers.clear();
            world.progress.cancel_tween();
            world.vehicle.cancel_jump();
        }
        self.sync.release(&mut self.scene);
        if was_running {
            self.host.observe_resize(false);
        }
        self.broken_callbacks.clear();
        self.world = None;
        log::info!("Road scene disposed");
    }

    /// Register a callback run once per breakdown
    pub fn on_broken(&mut self, callback: impl FnMut() + 'static) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.broken_callbacks.push(Box::new(callback));
    }

    /// Re-read the container size. Empty sizes keep the previous layout.
    pub fn resize(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let size = self.host.container_size();
        let Some(layout) = size.and_then(|s| Layout::new(s.width, s.height)) else {
            log::debug!("Ignoring resize to {:?}", size);
            return;
        };
        let Some(world) = self.world.as_mut() else {
            return;
        };
        if world.layout == layout {
            return;
        }
        world.resize(layout);
        self.sync.build(&mut self.scene, world);
        log::debug!("Resized to {}x{}", layout.width, layout.height);
    }

    /// Per-frame callback. `now` is the host clock in seconds.
    pub fn frame(&mut self, now: f64) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };

        let dt = match self.last_time {
            Some(last) => ((now - last) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_time = Some(now);

        world.fire_due(now);

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(world, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.sync.sync(&mut self.scene, world);
        self.dispatch_events();
    }

    /// Run deferred timers due at `now` without advancing the simulation
    pub fn pump_timers(&mut self, now: f64) {
        let Some(world) = self.running_world() else {
            return;
        };
        world.fire_due(now);
        if let Some(world) = self.world.as_ref() {
            self.sync.sync(&mut self.scene, world);
        }
        self.dispatch_events();
    }

    fn dispatch_events(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        for event in world.drain_events() {
            match event {
                SimEvent::Broken => {
                    log::warn!("Vehicle broken down");
                    for callback in &mut self.broken_callbacks {
                        callback();
                    }
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Goal in effect (after coercion of tiny goals)
    pub fn goal(&self) -> u32 {
        self.settings.effective_goal()
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn star_count(&self) -> u32 {
        self.world.as_ref().map_or(0, |w| w.progress.star_count())
    }

    pub fn hit_count(&self) -> u32 {
        self.world.as_ref().map_or(0, |w| w.progress.hit_count())
    }

    pub fn progress(&self) -> f32 {
        self.world.as_ref().map_or(0.0, |w| w.progress.progress())
    }

    pub fn speed_state(&self) -> Option<SpeedState> {
        self.world.as_ref().map(|w| w.speed.state())
    }

    pub fn is_broken(&self) -> bool {
        self.speed_state() == Some(SpeedState::Broken)
    }
}

//! Quiz Road headless demo
//!
//! Plays a scripted quiz session against the in-memory scene and logs what
//! happens. Run with `RUST_LOG=debug` for per-event detail.

use std::cell::Cell;
use std::rc::Rc;

use quiz_road::render::{HeadlessScene, Layer, Size, StaticHost};
use quiz_road::{DebugTrigger, Engine, EngineError, Settings};

/// Frame rate of the simulated host
const FRAME_SECS: f64 = 1.0 / 60.0;
/// Seconds between two quiz answers
const ANSWER_INTERVAL: f64 = 1.5;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Quiz Road (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), EngineError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {}", path);
            Settings::from_file(&path)?
        }
        None => Settings::default(),
    };

    let size = Size::new(960.0, 540.0);
    let mut engine = Engine::new(settings, HeadlessScene::new(), StaticHost::new(Some(size)))?;

    let breakdowns = Rc::new(Cell::new(0u32));
    let counter = breakdowns.clone();
    engine.on_broken(move || {
        counter.set(counter.get() + 1);
        log::warn!("The car broke down!");
    });

    engine.init(Some(size))?;

    // Mostly right, with a bad streak near the end
    let answers = [
        true, true, false, true, true, true, false, true, true, true, true, false, false,
        true, false,
    ];

    let mut now = 0.0;
    let mut next_answer = 0.5;
    let mut script = answers.iter();
    let end = ANSWER_INTERVAL * answers.len() as f64 + 8.0;

    engine.debug_trigger(DebugTrigger::Flyover);
    while now < end {
        if now >= next_answer {
            if let Some(&correct) = script.next() {
                engine.handle_state_result(correct);
                log::info!(
                    "t={:.1}s answer {} -> stars {}, hits {}",
                    now,
                    if correct { "correct" } else { "wrong" },
                    engine.star_count(),
                    engine.hit_count()
                );
            }
            next_answer += ANSWER_INTERVAL;
        }
        engine.frame(now);
        now += FRAME_SECS;
    }

    log::info!(
        "Session over: {} stars of {} ({:.0}%), {} hits, {} breakdowns, {} live nodes",
        engine.star_count(),
        engine.goal(),
        engine.progress() * 100.0,
        engine.hit_count(),
        breakdowns.get(),
        engine.scene().node_count()
    );

    if let Some(vehicle) = engine.scene().transforms_in(Layer::Vehicle).first() {
        log::info!(
            "Vehicle ended at ({:.0}, {:.0}), opacity {:.2}",
            vehicle.pos.x,
            vehicle.pos.y,
            vehicle.opacity
        );
    }

    engine.reset();
    engine.dispose();
    engine.dispose();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build embeds the library directly; no standalone entry point
}

//! Fixed timestep simulation tick
//!
//! One call advances every subsystem by `dt`. Nothing outside the world can
//! observe it half-applied.

use rand::Rng;

use super::collision::detect_hits;
use super::speed::SpeedState;
use super::state::World;
use super::track::EntityKind;
use crate::consts::*;

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, dt: f32) {
    world.time_ticks += 1;

    // Spontaneous boost while cruising on the road
    if world.speed.state() == SpeedState::Baseline && !world.vehicle.is_jumping() {
        let chance = f64::from(world.settings().random_boost_chance).clamp(0.0, 1.0);
        if chance > 0.0 && world.rng.random_bool(chance) {
            log::debug!("Spontaneous boost at tick {}", world.time_ticks);
            world.start_boost();
        }
    }

    // Scroll the track (speed is zero once broken)
    let speed = world.speed.speed();
    let despawn_x = world.layout.despawn_x();
    let expired = world.track.advance(speed, dt, despawn_x);
    if expired > 0 {
        log::trace!("{} entities left the track unhit", expired);
    }

    // Collisions: each entity resolves at most once
    let hits = detect_hits(world.vehicle.bounds(), world.track.entities(), HIT_MARGIN);
    for hit in hits {
        if world.track.destroy(hit.id).is_none() {
            continue;
        }
        match hit.kind {
            EntityKind::Collectible => world.collect_star(hit.pos),
            EntityKind::Obstacle => world.take_hit(hit.pos),
        }
    }
    world.track.sweep();

    // Particles keep going regardless of speed state
    if world.speed.is_broken() {
        world.smoke_timer -= dt;
        if world.smoke_timer <= 0.0 {
            world.smoke_timer += BROKEN_SMOKE_INTERVAL;
            let origin = world.vehicle.exhaust();
            world.particles.spawn_smoke(origin, &mut world.rng);
        }
    }
    world.particles.advance(dt);

    // Vehicle: progress owns x, jump owns y
    if let Some(x) = world.progress.advance(dt) {
        world.vehicle.pos.x = x;
    }
    world.vehicle.advance(dt);

    for marker in &mut world.markers {
        marker.age += dt;
        marker.pos.y -= MARKER_RISE_SPEED * dt;
    }
    world.advance_flyover(dt);
}

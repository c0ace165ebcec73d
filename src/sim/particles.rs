//! Smoke and fire particles
//!
//! Purely visual and never gated by the speed state: a broken-down car keeps
//! smoking.

use glam::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Smoke,
    Fire,
}

impl ParticleKind {
    /// Drift velocity (pixels/sec)
    pub fn velocity(self) -> Vec2 {
        match self {
            ParticleKind::Smoke => Vec2::new(-30.0, -20.0),
            ParticleKind::Fire => Vec2::new(-20.0, -40.0),
        }
    }

    /// Opacity lost per second
    pub fn decay_rate(self) -> f32 {
        match self {
            ParticleKind::Smoke => 0.8,
            ParticleKind::Fire => 1.2,
        }
    }

    fn start_opacity(self) -> f32 {
        match self {
            ParticleKind::Smoke => 0.8,
            ParticleKind::Fire => 1.0,
        }
    }

    fn radius_range(self) -> std::ops::Range<f32> {
        match self {
            ParticleKind::Smoke => 4.0..10.0,
            ParticleKind::Fire => 3.0..7.0,
        }
    }
}

/// A single particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub opacity: f32,
    pub kind: ParticleKind,
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    cap: usize,
    next_id: u32,
}

impl ParticleSystem {
    /// Fire cools into smoke once it fades below this
    pub const FIRE_TO_SMOKE: f32 = 0.5;
    /// Spawn scatter around the emitter
    pub const JITTER: f32 = 6.0;

    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::new(),
            cap,
            next_id: 1,
        }
    }

    pub fn spawn_smoke(&mut self, origin: Vec2, rng: &mut impl Rng) -> Option<u32> {
        self.spawn(ParticleKind::Smoke, origin, rng)
    }

    pub fn spawn_fire(&mut self, origin: Vec2, rng: &mut impl Rng) -> Option<u32> {
        self.spawn(ParticleKind::Fire, origin, rng)
    }

    /// Mixed fire and smoke for an impact
    pub fn burst(&mut self, origin: Vec2, rng: &mut impl Rng) {
        for _ in 0..3 {
            self.spawn_fire(origin, rng);
        }
        for _ in 0..4 {
            self.spawn_smoke(origin, rng);
        }
    }

    fn spawn(&mut self, kind: ParticleKind, origin: Vec2, rng: &mut impl Rng) -> Option<u32> {
        if self.cap == 0 {
            return None;
        }
        if self.particles.len() >= self.cap {
            // Remove oldest particles to make room
            self.particles.remove(0);
        }

        let id = self.next_id;
        self.next_id += 1;
        let jitter = Vec2::new(
            rng.random_range(-Self::JITTER..=Self::JITTER),
            rng.random_range(-Self::JITTER..=Self::JITTER),
        );
        self.particles.push(Particle {
            id,
            pos: origin + jitter,
            radius: rng.random_range(kind.radius_range()),
            opacity: kind.start_opacity(),
            kind,
        });
        Some(id)
    }

    /// Drift, fade and cull
    pub fn advance(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.pos += particle.kind.velocity() * dt;
            particle.opacity -= particle.kind.decay_rate() * dt;
            if particle.kind == ParticleKind::Fire && particle.opacity < Self::FIRE_TO_SMOKE {
                particle.kind = ParticleKind::Smoke;
            }
        }
        self.particles.retain(|p| p.opacity > 0.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

//! Short-lived cosmetic particles spawned in reaction to gameplay events.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::events::{EventKind, GameEvent};
use crate::math::{Rect, Vec2};
use crate::render::{Canvas, Color, COLOR_WHITE};

/// Projectile and explosion palette.
pub const EMBER_COLORS: [Color; 3] = [
    [0.408, 0.220, 0.424, 1.0],
    [0.710, 0.314, 0.533, 1.0],
    [0.965, 0.459, 0.478, 1.0],
];

const BURST_COUNT: usize = 40;
/// Particle sizes are in pixels of a 16px tile.
const PIXELS_PER_TILE: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    pub age: f64,
    pub lifetime: f64,
    /// Initial size in pixels; shrinks linearly to zero over the lifetime.
    pub start_size: f64,
    pub color: Color,
}

impl Particle {
    /// Advance one frame; `false` once expired.
    pub fn update(&mut self, dt: f64) -> bool {
        self.pos += self.vel * dt;
        self.vel += self.accel * dt;
        self.age += dt;
        self.age < self.lifetime
    }

    /// Current size in pixels.
    pub fn size(&self) -> f64 {
        let remaining = (1.0 - self.age / self.lifetime).max(0.0);
        (self.start_size * remaining).round()
    }
}

#[derive(Debug, Default)]
pub struct ParticleManager {
    particles: Vec<Particle>,
}

impl ParticleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn add(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles.extend(particles);
    }

    pub fn update(&mut self, dt: f64) {
        self.particles.retain_mut(|p| p.update(dt));
    }

    /// Spawn the burst matching `event`, if it has one.
    pub fn react(&mut self, event: &GameEvent, gravity: Vec2, rng: &mut Pcg32) {
        match event.kind {
            EventKind::ProjectileExplosion => self.explosion(event.pos, gravity, rng),
            EventKind::PlayerDash => self.dash_trail(event.pos, event.vel, event.vec, rng),
            EventKind::PlayerJump | EventKind::PlayerGrounded => {}
        }
    }

    /// Embers thrown up and out, falling a little slower than gravity.
    pub fn explosion(&mut self, pos: Vec2, gravity: Vec2, rng: &mut Pcg32) {
        let burst: Vec<Particle> = (0..BURST_COUNT)
            .map(|_| {
                let jitter = Vec2::new(rng.gen_range(0.0..0.1), rng.gen_range(0.0..0.1));
                let spread = random_direction(rng) * (3.0 * rng.gen::<f64>());
                Particle {
                    pos: pos + jitter,
                    vel: spread - Vec2::new(0.0, 3.0),
                    accel: gravity / 1.5,
                    age: 0.0,
                    lifetime: 1.0 + rng.gen_range(-0.3..0.5),
                    start_size: 5.0 + rng.gen_range(-2..=2) as f64,
                    color: EMBER_COLORS[rng.gen_range(0..EMBER_COLORS.len())],
                }
            })
            .collect();
        self.add(burst);
    }

    /// A fan of white particles streaming behind a dash.
    pub fn dash_trail(&mut self, pos: Vec2, vel: Vec2, dash: Vec2, rng: &mut Pcg32) {
        let back = Vec2::new(-vel.x - dash.x, -vel.y / 2.0).normalize_or_random(rng) * 5.0;
        let burst: Vec<Particle> = (0..BURST_COUNT)
            .map(|i| {
                let fan = (back + Vec2::new(0.0, i as f64 / 8.0 - 2.0)).normalize_or_random(rng);
                Particle {
                    pos: pos
                        + Vec2::new(rng.gen_range(-0.1..0.1), rng.gen_range(-0.2..0.2)),
                    vel: fan * 10.0 + random_direction(rng) * 2.0,
                    accel: Vec2::ZERO,
                    age: 0.0,
                    lifetime: 0.5 + rng.gen_range(-0.2..0.2),
                    start_size: 6.0,
                    color: COLOR_WHITE,
                }
            })
            .collect();
        self.add(burst);
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for particle in &self.particles {
            let side = particle.size() / PIXELS_PER_TILE;
            if side <= 0.0 {
                continue;
            }
            canvas.draw_rect(Rect::new(particle.pos.x, particle.pos.y, side, side), particle.color);
        }
    }
}

fn random_direction(rng: &mut Pcg32) -> Vec2 {
    Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)).normalize_or_random(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use burrow_ecs::entity::EntityId;
    use rand::SeedableRng;

    fn event(kind: EventKind) -> GameEvent {
        GameEvent {
            kind,
            entity: EntityId::new(0, 0),
            pos: Vec2::new(4.0, 4.0),
            vel: Vec2::ZERO,
            vec: Vec2::new(10.0, 0.0),
        }
    }

    #[test]
    fn explosions_and_dashes_spawn_bursts() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pm = ParticleManager::new();
        pm.react(&event(EventKind::ProjectileExplosion), Vec2::new(0.0, 15.0), &mut rng);
        assert_eq!(pm.len(), BURST_COUNT);
        pm.react(&event(EventKind::PlayerDash), Vec2::ZERO, &mut rng);
        assert_eq!(pm.len(), 2 * BURST_COUNT);
        pm.react(&event(EventKind::PlayerJump), Vec2::ZERO, &mut rng);
        assert_eq!(pm.len(), 2 * BURST_COUNT);
        assert!(pm.iter().all(|p| p.vel.x.is_finite() && p.vel.y.is_finite()));
    }

    #[test]
    fn dash_trail_streams_backwards() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut pm = ParticleManager::new();
        pm.dash_trail(Vec2::ZERO, Vec2::ZERO, Vec2::new(10.0, 0.0), &mut rng);
        let mean_vx: f64 = pm.iter().map(|p| p.vel.x).sum::<f64>() / pm.len() as f64;
        assert!(mean_vx < 0.0);
    }

    #[test]
    fn particles_shrink_and_expire() {
        let mut pm = ParticleManager::new();
        pm.add([Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            accel: Vec2::ZERO,
            age: 0.0,
            lifetime: 1.0,
            start_size: 6.0,
            color: COLOR_WHITE,
        }]);

        pm.update(0.5);
        assert_eq!(pm.iter().next().unwrap().size(), 3.0);
        let mut list = DrawList::new();
        pm.draw(&mut list);
        assert_eq!(list.len(), 1);

        pm.update(0.5);
        assert!(pm.is_empty());
    }
}

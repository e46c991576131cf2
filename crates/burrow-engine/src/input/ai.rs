use burrow_ecs::entity::EntityId;
use rand::Rng;
use rand_pcg::Pcg32;

use super::InputContext;
use crate::config::AiTuning;
use crate::math::Vec2;
use crate::timer::Timer;

/// Walks toward the player and hops when close, at random, or when a wall is
/// directly ahead.
///
/// Between decisions the last chosen direction keeps being pushed as a
/// target force; decisions happen every `decision_period` seconds from a
/// random starting phase so enemies spawned together do not act in lockstep.
#[derive(Debug, Clone)]
pub struct SimpleAi {
    decision_timer: Timer,
    speed_x: f64,
}

impl SimpleAi {
    pub fn new(tuning: &AiTuning, rng: &mut Pcg32) -> Self {
        let phase = rng.gen::<f64>() * tuning.decision_period;
        Self {
            decision_timer: Timer::with_phase(tuning.decision_period, phase),
            speed_x: 0.0,
        }
    }

    /// Target horizontal speed chosen at the last decision.
    pub fn speed_x(&self) -> f64 {
        self.speed_x
    }

    pub(super) fn update(&mut self, owner: EntityId, ctx: &mut InputContext<'_>) {
        let tuning = ctx.ai_tuning;
        let Some(pos) = ctx.entities.get(owner).map(|e| e.pos) else {
            return;
        };
        let Some(body) = ctx.physics.get_mut(owner) else {
            return;
        };
        body.apply_force_target(
            Vec2::new(self.speed_x * tuning.force_scale, 0.0),
            Vec2::new(self.speed_x, 0.0),
        );

        if !self.decision_timer.tick(ctx.dt) {
            return;
        }
        let Some(player) = ctx.player.and_then(|id| ctx.entities.get(id)).map(|e| e.pos) else {
            return;
        };

        let sign = 1f64.copysign(player.x - pos.x);
        self.speed_x = tuning.speed * sign;
        if !body.grounded() {
            return;
        }

        let ahead = (pos + Vec2::new(sign, 0.0)).cell();
        let jump = if pos.distance_squared(player) <= 1.0
            && ctx.rng.gen::<f64>() < tuning.near_player_jump_chance
        {
            true
        } else if ctx.rng.gen::<f64>() < tuning.hazard_jump_chance {
            true
        } else if ctx.tilemap.is_tile_collidable(ahead) {
            ctx.colliders.get(owner).is_some_and(|c| {
                let tile_x = ahead.0 as f64;
                tile_x + 1.0 - c.rect.left() < tuning.obstacle_margin
                    || c.rect.right() - tile_x < tuning.obstacle_margin
            })
        } else {
            false
        };

        if jump {
            body.apply_impulse(Vec2::new(0.0, -tuning.jump_impulse));
            tracing::trace!(entity = %owner, "ai hop");
        }
    }
}

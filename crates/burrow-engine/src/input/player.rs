//! Keyboard and mouse control of the player entity.

use burrow_ecs::entity::EntityId;

use super::{InputContext, Key, MouseButton};
use crate::command::CausalReason;
use crate::config::PlayerTuning;
use crate::events::{EventKind, GameEvent};
use crate::math::Vec2;
use crate::tilemap::Cell;
use crate::timer::Timer;

/// Movement, dash, jump, shooting, and block break/place for the player.
///
/// Dash starts unavailable and becomes available once `dash_timer` elapses;
/// dashing makes it unavailable again. The timer only runs while waiting.
#[derive(Debug, Clone)]
pub struct PlayerController {
    dash_timer: Timer,
    can_dash: bool,
    shoot_timer: Timer,
    /// Seconds the current tile has been mined.
    break_timer: f64,
    prev_tile: Option<Cell>,
}

impl PlayerController {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            dash_timer: Timer::new(tuning.dash_cooldown),
            can_dash: false,
            shoot_timer: Timer::new(tuning.shoot_cooldown),
            break_timer: 0.0,
            prev_tile: None,
        }
    }

    pub fn can_dash(&self) -> bool {
        self.can_dash
    }

    pub fn break_progress(&self) -> f64 {
        self.break_timer
    }

    pub(super) fn update(&mut self, owner: EntityId, ctx: &mut InputContext<'_>) {
        if !self.can_dash && self.dash_timer.tick(ctx.dt) {
            self.can_dash = true;
        }
        self.handle_keys(owner, ctx);
        self.handle_mouse(owner, ctx);
    }

    fn handle_keys(&mut self, owner: EntityId, ctx: &mut InputContext<'_>) {
        let Some(entity) = ctx.entities.get(owner) else {
            return;
        };
        let Some(body) = ctx.physics.get_mut(owner) else {
            return;
        };
        let tuning = ctx.player_tuning;
        let input = ctx.input;

        if input.is_key_held(Key::MoveRight) {
            body.apply_force_target(
                Vec2::new(tuning.run_force, 0.0),
                Vec2::new(tuning.run_speed, 0.0),
            );
        }
        if input.is_key_held(Key::MoveLeft) {
            body.apply_force_target(
                Vec2::new(-tuning.run_force, 0.0),
                Vec2::new(-tuning.run_speed, 0.0),
            );
        }

        let mut dash = None;
        if input.is_key_held(Key::DashRight) && self.can_dash {
            dash = Some(Vec2::new(tuning.dash_impulse, 0.0));
        } else if input.is_key_held(Key::DashLeft) && self.can_dash {
            dash = Some(Vec2::new(-tuning.dash_impulse, 0.0));
        }
        if let Some(vec) = dash {
            self.can_dash = false;
            body.apply_impulse(vec);
            ctx.events.post(GameEvent {
                kind: EventKind::PlayerDash,
                entity: owner,
                pos: entity.pos,
                vel: entity.vel,
                vec,
            });
        }

        if input.is_key_held(Key::Jump) && body.grounded() {
            let vec = Vec2::new(0.0, -tuning.jump_impulse);
            body.apply_impulse(vec);
            ctx.events.post(GameEvent {
                kind: EventKind::PlayerJump,
                entity: owner,
                pos: entity.pos,
                vel: entity.vel,
                vec,
            });
        }
    }

    fn handle_mouse(&mut self, owner: EntityId, ctx: &mut InputContext<'_>) {
        let Some(pos) = ctx.entities.get(owner).map(|e| e.pos) else {
            return;
        };
        if ctx.input.is_mouse_held(MouseButton::Left) {
            self.left_click(pos, ctx);
        } else {
            self.break_timer = 0.0;
        }
        if ctx.input.is_mouse_held(MouseButton::Right) {
            place_block(pos, ctx);
        }
    }

    /// Shoot toward the mouse, then mine the tile under it if in reach.
    fn left_click(&mut self, pos: Vec2, ctx: &mut InputContext<'_>) {
        let mouse = ctx.input.mouse_pos();
        if self.shoot_timer.tick(ctx.dt) {
            let dir = (mouse - pos).normalize_or_random(&mut *ctx.rng);
            ctx.commands.spawn_projectile(
                pos,
                dir * ctx.player_tuning.projectile_speed,
                CausalReason::PlayerInput("shoot"),
            );
        }

        let cell = mouse.cell();
        if !in_reach(pos, cell, ctx.player_tuning.reach) {
            return;
        }
        let Some(tile) = ctx.tilemap.get_tile(cell) else {
            self.break_timer = 0.0;
            return;
        };
        let (id, break_time, max_stack) = (tile.id, tile.break_time, tile.max_stack);

        self.break_timer += ctx.dt;
        if self.prev_tile != Some(cell) {
            self.break_timer = 0.0;
        }
        if self.break_timer >= break_time {
            ctx.inventory.add(id, 1, max_stack);
            ctx.tilemap.set_tile(cell, None, true);
            tracing::debug!(x = cell.0, y = cell.1, tile = id.0, "tile broken");
            self.break_timer = 0.0;
        }
        self.prev_tile = Some(cell);
    }
}

fn in_reach(pos: Vec2, cell: Cell, reach: f64) -> bool {
    pos.distance(Vec2::new(cell.0 as f64, cell.1 as f64)) <= reach
}

/// Place one of the selected hotbar item on the empty cell under the mouse.
fn place_block(pos: Vec2, ctx: &mut InputContext<'_>) {
    let Some(item) = ctx.inventory.selected_item() else {
        return;
    };
    let cell = ctx.input.mouse_pos().cell();
    if !in_reach(pos, cell, ctx.player_tuning.reach) {
        return;
    }
    if ctx.colliders.is_cell_occupied(cell.0, cell.1) {
        return;
    }
    if ctx.tilemap.set_tile(cell, Some(item), false) {
        ctx.inventory.remove_one_selected();
        tracing::debug!(x = cell.0, y = cell.1, tile = item.0, "tile placed");
    }
}

//! Ballistic projectiles fired by the player.
//!
//! Projectiles skip the physics system: they fly under gravity and explode on
//! the first solid tile they touch. Their collider only accepts enemies, so
//! they shove enemies through the repulsion force without bumping the player.

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::system::ComponentSystem;
use burrow_ecs::EcsError;

use crate::command::{CausalReason, CommandQueue};
use crate::entity::Entities;
use crate::events::{EventBus, EventKind, GameEvent};
use crate::math::{Rect, Vec2};
use crate::tilemap::Tilemap;

/// Side length of a projectile, in tiles.
pub const PROJECTILE_SIZE: f64 = 0.5;
/// Projectiles this far outside the map are discarded.
const OUT_OF_BOUNDS_MARGIN: f64 = 16.0;

#[derive(Debug, Clone)]
pub struct ProjectileComponent {
    owner: EntityId,
    alive: bool,
}

impl ProjectileComponent {
    pub fn new(owner: EntityId) -> Self {
        Self { owner, alive: true }
    }
}

impl Component for ProjectileComponent {
    const KIND: ComponentKind = ComponentKind::Projectile;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn kill(&mut self) {
        self.alive = false;
    }
}

pub struct ProjectileContext<'a> {
    pub entities: &'a mut Entities,
    pub tilemap: &'a Tilemap,
    pub events: &'a mut EventBus,
    pub commands: &'a mut CommandQueue,
    pub gravity: Vec2,
    pub dt: f64,
}

#[derive(Debug, Default)]
pub struct ProjectileSystem {
    projectiles: ComponentSystem<ProjectileComponent>,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, projectile: ProjectileComponent) -> Result<(), EcsError> {
        self.projectiles.insert(projectile)
    }

    pub fn kill(&mut self, owner: EntityId) -> bool {
        self.projectiles.kill(owner)
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Advance every projectile; those that hit terrain or leave the map
    /// queue their entity for despawn.
    pub fn update(&mut self, ctx: &mut ProjectileContext<'_>) -> usize {
        self.projectiles.run(|projectile| {
            let owner = projectile.owner;
            let Some(entity) = ctx.entities.get_mut(owner) else {
                return false;
            };
            entity.pos += entity.vel * ctx.dt;
            entity.vel += ctx.gravity * ctx.dt;

            let rect = Rect::centered(entity.pos, PROJECTILE_SIZE, PROJECTILE_SIZE);
            if !ctx.tilemap.get_collisions(&rect).is_empty() {
                ctx.events.post(GameEvent {
                    kind: EventKind::ProjectileExplosion,
                    entity: owner,
                    pos: entity.pos,
                    vel: entity.vel,
                    vec: Vec2::ZERO,
                });
                ctx.commands
                    .despawn(owner, CausalReason::GameRule("projectile_explosion"));
                return false;
            }

            if out_of_bounds(ctx.tilemap, entity.pos) {
                tracing::trace!(entity = %owner, "projectile left the map");
                ctx.commands
                    .despawn(owner, CausalReason::GameRule("projectile_out_of_bounds"));
                return false;
            }
            true
        })
    }
}

fn out_of_bounds(tilemap: &Tilemap, pos: Vec2) -> bool {
    let w = tilemap.width() as f64;
    let h = tilemap.height() as f64;
    pos.x < -OUT_OF_BOUNDS_MARGIN
        || pos.x > w + OUT_OF_BOUNDS_MARGIN
        || pos.y > h + OUT_OF_BOUNDS_MARGIN
}

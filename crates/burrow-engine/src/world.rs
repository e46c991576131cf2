//! Frame orchestration.
//!
//! [`World::update`] advances the simulation by one variable-length frame.
//! Systems run to completion in a fixed order:
//!
//! 1. colliders sync to their owners and the spatial index is rebuilt,
//! 2. physics integrates queued forces and resolves collisions,
//! 3. input components queue forces for the next frame, break and place
//!    tiles and request projectiles,
//! 4. the tilemap advances its fluids,
//! 5. particles and projectiles advance,
//! 6. deferred commands are applied in FIFO order,
//! 7. render components of despawned entities are swept,
//! 8. events posted during the frame are dispatched to subscribers.
//!
//! `dt` is clamped to `max_dt` before anything runs.

use std::time::{Duration, Instant};

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::EcsError;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::collider::{Collider, ColliderSystem};
use crate::command::{CommandQueue, WorldCommand};
use crate::config::{ConfigError, WorldConfig};
use crate::entity::{Entities, Entity, Tag};
use crate::events::{EventBus, EventKind, GameEvent};
use crate::input::{InputComponent, InputContext, InputSnapshot, InputState, InputSystem};
use crate::inventory::Inventory;
use crate::math::Vec2;
use crate::particles::{ParticleManager, EMBER_COLORS};
use crate::physics::{PhysicsComponent, PhysicsContext, PhysicsSystem};
use crate::projectile::{ProjectileComponent, ProjectileContext, ProjectileSystem, PROJECTILE_SIZE};
use crate::render::{self, Camera2D, Canvas, RenderComponent, RenderSystem, Sprite};
use crate::tilemap::Tilemap;

/// Player and enemy body size, in tiles.
pub const BODY_SIZE: Vec2 = Vec2::new(0.8, 0.8);

// ---------------------------------------------------------------------------
// FrameDiagnostics
// ---------------------------------------------------------------------------

/// What happened during the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Frames completed, including this one.
    pub frame: u64,
    /// The dt actually simulated.
    pub dt: f64,
    /// Whether the requested dt was clamped.
    pub clamped: bool,
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(&'static str, Duration)>,
    pub total_time: Duration,
    pub commands_applied: usize,
    pub events_dispatched: usize,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    config: WorldConfig,
    entities: Entities,
    colliders: ColliderSystem,
    physics: PhysicsSystem,
    inputs: InputSystem,
    renders: RenderSystem,
    projectiles: ProjectileSystem,
    particles: ParticleManager,
    tilemap: Tilemap,
    inventory: Inventory,
    events: EventBus,
    commands: CommandQueue,
    rng: Pcg32,
    input: InputSnapshot,
    player: Option<EntityId>,
    frame: u64,
    sim_time: f64,
    last_diagnostics: FrameDiagnostics,
}

impl World {
    /// An empty world with a blank tilemap of the configured size.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            "world created"
        );
        Ok(Self {
            entities: Entities::new(),
            colliders: ColliderSystem::new(),
            physics: PhysicsSystem::new(),
            inputs: InputSystem::new(),
            renders: RenderSystem::new(),
            projectiles: ProjectileSystem::new(),
            particles: ParticleManager::new(),
            tilemap: Tilemap::new(config.width, config.height),
            inventory: Inventory::new(config.player.inventory_size, config.player.hotbar_size),
            events: EventBus::new(),
            commands: CommandQueue::new(),
            rng: Pcg32::seed_from_u64(config.seed),
            input: InputSnapshot::new(),
            player: None,
            frame: 0,
            sim_time: 0.0,
            last_diagnostics: FrameDiagnostics::default(),
            config,
        })
    }

    // -- spawning -----------------------------------------------------------

    /// An entity with a collider, a physics body and a sprite.
    pub fn spawn_body(
        &mut self,
        pos: Vec2,
        tag: Tag,
        size: Vec2,
        sprite: Sprite,
    ) -> Result<EntityId, EcsError> {
        let id = self.entities.spawn(pos, tag);
        self.colliders
            .insert(Collider::new(id, tag, pos, size.x, size.y))?;
        self.entities.attach(id, ComponentKind::Collider)?;
        self.physics.insert(PhysicsComponent::new(id))?;
        self.entities.attach(id, ComponentKind::Physics)?;
        self.renders.insert(RenderComponent::new(id, sprite, size))?;
        self.entities.attach(id, ComponentKind::Render)?;
        Ok(id)
    }

    /// Spawn the player at `pos`, or at the configured spawn point. The new
    /// entity becomes the one enemies chase.
    pub fn spawn_player(&mut self, pos: Option<Vec2>) -> Result<EntityId, EcsError> {
        let pos = pos.unwrap_or_else(|| self.config.player_spawn());
        let id = self.spawn_body(pos, Tag::Player, BODY_SIZE, Sprite::Image("player".into()))?;
        self.inputs
            .insert(InputComponent::player(id, &self.config.player))?;
        self.entities.attach(id, ComponentKind::Input)?;
        self.player = Some(id);
        Ok(id)
    }

    pub fn spawn_enemy(&mut self, pos: Vec2) -> Result<EntityId, EcsError> {
        let id = self.spawn_body(pos, Tag::Enemy, BODY_SIZE, Sprite::Image("enemy".into()))?;
        self.inputs
            .insert(InputComponent::simple_ai(id, &self.config.ai, &mut self.rng))?;
        self.entities.attach(id, ComponentKind::Input)?;
        Ok(id)
    }

    pub fn spawn_projectile(&mut self, pos: Vec2, vel: Vec2) -> Result<EntityId, EcsError> {
        let id = self.entities.spawn(pos, Tag::Projectile);
        if let Some(entity) = self.entities.get_mut(id) {
            entity.vel = vel;
        }
        self.colliders.insert(
            Collider::new(id, Tag::Projectile, pos, PROJECTILE_SIZE, PROJECTILE_SIZE)
                .with_allow_list([Tag::Enemy]),
        )?;
        self.entities.attach(id, ComponentKind::Collider)?;
        self.projectiles.insert(ProjectileComponent::new(id))?;
        self.entities.attach(id, ComponentKind::Projectile)?;
        let color = EMBER_COLORS[self.rng.gen_range(0..EMBER_COLORS.len())];
        self.renders.insert(RenderComponent::new(
            id,
            Sprite::Solid(color),
            Vec2::new(PROJECTILE_SIZE, PROJECTILE_SIZE),
        ))?;
        self.entities.attach(id, ComponentKind::Render)?;
        Ok(id)
    }

    /// Remove an entity and kill every component it registered.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, EcsError> {
        let entity = self.entities.despawn(id)?;
        for kind in entity.components.iter() {
            match kind {
                ComponentKind::Collider => self.colliders.kill(id),
                ComponentKind::Physics => self.physics.kill(id),
                ComponentKind::Input => self.inputs.kill(id),
                ComponentKind::Render => self.renders.kill(id),
                ComponentKind::Projectile => self.projectiles.kill(id),
            };
        }
        if self.player == Some(id) {
            self.player = None;
        }
        Ok(entity)
    }

    // -- frame --------------------------------------------------------------

    /// Register a callback for `kind`; it runs at the end of every frame in
    /// which such an event was posted.
    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.events.subscribe(kind, callback);
    }

    /// Input held during subsequent frames.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    /// Advance one frame using the stored input snapshot.
    pub fn update(&mut self, dt: f64) -> &FrameDiagnostics {
        let input = self.input;
        self.update_with(dt, &input)
    }

    /// Advance one frame reading `input`.
    pub fn update_with(&mut self, dt: f64, input: &dyn InputState) -> &FrameDiagnostics {
        let frame_start = Instant::now();
        let (dt, clamped) = self.clamp_dt(dt);
        let mut system_times = Vec::with_capacity(7);

        let start = Instant::now();
        self.colliders.update(&self.entities);
        system_times.push(("colliders", start.elapsed()));

        let start = Instant::now();
        self.physics.update(&mut PhysicsContext {
            entities: &mut self.entities,
            colliders: &mut self.colliders,
            tilemap: &self.tilemap,
            events: &mut self.events,
            rng: &mut self.rng,
            tuning: &self.config.physics,
            gravity: self.config.gravity,
            dt,
        });
        system_times.push(("physics", start.elapsed()));

        let start = Instant::now();
        self.inputs.update(&mut InputContext {
            entities: &self.entities,
            physics: &mut self.physics,
            colliders: &self.colliders,
            tilemap: &mut self.tilemap,
            inventory: &mut self.inventory,
            input,
            events: &mut self.events,
            commands: &mut self.commands,
            rng: &mut self.rng,
            player: self.player,
            player_tuning: &self.config.player,
            ai_tuning: &self.config.ai,
            dt,
        });
        system_times.push(("input", start.elapsed()));

        let start = Instant::now();
        self.tilemap.update();
        system_times.push(("tilemap", start.elapsed()));

        let start = Instant::now();
        self.particles.update(dt);
        self.projectiles.update(&mut ProjectileContext {
            entities: &mut self.entities,
            tilemap: &self.tilemap,
            events: &mut self.events,
            commands: &mut self.commands,
            gravity: self.config.gravity,
            dt,
        });
        system_times.push(("entities", start.elapsed()));

        let start = Instant::now();
        let commands_applied = self.apply_commands();
        system_times.push(("commands", start.elapsed()));

        let start = Instant::now();
        self.renders.update(&self.entities);
        system_times.push(("render", start.elapsed()));

        let events = self.events.dispatch();
        for event in &events {
            self.particles.react(event, self.config.gravity, &mut self.rng);
        }

        self.frame += 1;
        self.sim_time += dt;
        self.last_diagnostics = FrameDiagnostics {
            frame: self.frame,
            dt,
            clamped,
            system_times,
            total_time: frame_start.elapsed(),
            commands_applied,
            events_dispatched: events.len(),
        };
        tracing::trace!(
            frame = self.frame,
            dt,
            entities = self.entities.len(),
            events = events.len(),
            "frame complete"
        );
        &self.last_diagnostics
    }

    fn clamp_dt(&self, dt: f64) -> (f64, bool) {
        let max_dt = self.config.max_dt;
        if !(dt.is_finite() && dt >= 0.0) {
            tracing::warn!(dt, "invalid frame dt, simulating zero");
            return (0.0, true);
        }
        if dt > max_dt {
            tracing::warn!(dt, max_dt, "frame dt clamped");
            return (max_dt, true);
        }
        (dt, false)
    }

    fn apply_commands(&mut self) -> usize {
        let queued: Vec<_> = self.commands.drain().collect();
        let mut applied = 0;
        for queued in queued {
            let result = match queued.command {
                WorldCommand::SpawnProjectile { pos, vel } => {
                    self.spawn_projectile(pos, vel).map(|_| ())
                }
                WorldCommand::Despawn { entity } => self.despawn(entity).map(|_| ()),
            };
            match result {
                Ok(()) => applied += 1,
                Err(err) => {
                    tracing::debug!(reason = ?queued.reason, %err, "command skipped");
                }
            }
        }
        applied
    }

    // -- drawing ------------------------------------------------------------

    /// A camera of the given size centred on the player, or on the map
    /// centre when there is no player.
    pub fn camera(&self, width: f64, height: f64) -> Camera2D {
        let center = self
            .player
            .and_then(|id| self.entities.get(id))
            .map(|e| e.pos)
            .unwrap_or_else(|| {
                Vec2::new(
                    self.tilemap.width() as f64 / 2.0,
                    self.tilemap.height() as f64 / 2.0,
                )
            });
        Camera2D::new(center, width, height)
    }

    /// Emit the frame's draw calls: tiles, sprites, particles, then debug
    /// force arrows when enabled.
    pub fn draw(&mut self, camera: &Camera2D, canvas: &mut dyn Canvas) {
        render::draw_tilemap(&self.tilemap, camera, canvas);
        self.renders.draw(&self.entities, camera, canvas);
        self.particles.draw(canvas);
        if self.config.debug {
            for body in self.physics.iter() {
                if let Some(entity) = self.entities.get(body.owner()) {
                    render::draw_forces(entity.pos, entity.vel, body.last_forces(), canvas);
                }
            }
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Direct entity access for setup and tests.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn tilemap_mut(&mut self) -> &mut Tilemap {
        &mut self.tilemap
    }

    pub fn colliders(&self) -> &ColliderSystem {
        &self.colliders
    }

    pub fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsSystem {
        &mut self.physics
    }

    pub fn inputs(&self) -> &InputSystem {
        &self.inputs
    }

    pub fn renders(&self) -> &RenderSystem {
        &self.renders
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn particles(&self) -> &ParticleManager {
        &self.particles
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds, summed from clamped dts.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("frame", &self.frame)
            .field("entities", &self.entities.len())
            .field("player", &self.player)
            .field("particles", &self.particles.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use crate::tiles::TileId;

    fn flat_world() -> World {
        let config = WorldConfig {
            width: 64,
            height: 32,
            ..WorldConfig::default()
        };
        let mut world = World::new(config).unwrap();
        world.tilemap_mut().fill((0, 20), (63, 20), TileId::STONE);
        world
    }

    #[test]
    fn rejects_invalid_config() {
        let config = WorldConfig {
            width: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(config),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn large_dt_is_clamped() {
        let mut world = flat_world();
        let diag = world.update(1.5);
        assert!(diag.clamped);
        assert_eq!(diag.dt, 0.2);
        assert_eq!(world.frame_count(), 1);

        let diag = world.update(0.016);
        assert!(!diag.clamped);
        let names: Vec<_> = diag.system_times.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["colliders", "physics", "input", "tilemap", "entities", "commands", "render"]
        );
    }

    #[test]
    fn despawn_kills_every_component() {
        let mut world = flat_world();
        let player = world.spawn_player(Some(Vec2::new(10.5, 19.5))).unwrap();
        let entity = world.despawn(player).unwrap();
        assert!(entity.has(ComponentKind::Input));
        assert_eq!(world.player(), None);

        world.update(0.016);
        assert!(world.colliders().is_empty());
        assert!(world.physics().is_empty());
        assert!(world.inputs().is_empty());
        assert!(matches!(
            world.despawn(player),
            Err(EcsError::StaleEntity { .. })
        ));
    }

    #[test]
    fn player_settles_on_the_floor() {
        let mut world = flat_world();
        let player = world.spawn_player(Some(Vec2::new(10.5, 15.0))).unwrap();
        for _ in 0..120 {
            world.update(1.0 / 60.0);
        }
        let rect = world.colliders().get(player).unwrap().rect;
        assert!((rect.bottom() - 20.0).abs() < 1e-9);
        assert!(world.physics().get(player).unwrap().grounded());
    }

    #[test]
    fn draw_emits_tiles_and_sprites() {
        let mut world = flat_world();
        world.spawn_player(Some(Vec2::new(10.5, 19.5))).unwrap();
        let camera = world.camera(20.0, 12.0);
        let mut list = DrawList::new();
        world.draw(&camera, &mut list);
        assert!(list.tiles() > 0);
        assert!(list
            .commands
            .iter()
            .any(|c| matches!(c, render::DrawCommand::Sprite { sprite, .. } if sprite == "player")));
    }
}

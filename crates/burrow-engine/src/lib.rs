//! Burrow Engine -- simulation core of a tile-based 2D sandbox platformer.
//!
//! This crate builds on [`burrow_ecs`] to provide the game's per-frame
//! simulation: a corner-bucket spatial index over colliders, a tilemap
//! collision surface, a force/impulse physics integrator with axis-separated
//! tile resolution, player and enemy controllers, and the [`World`](world::World)
//! that runs them in a fixed order. Drawing, audio and input polling live
//! outside the core behind the [`Canvas`](render::Canvas),
//! [`EventBus`](events::EventBus) and [`InputState`](input::InputState) seams.
//!
//! # Quick Start
//!
//! ```
//! use burrow_engine::prelude::*;
//!
//! let config = WorldConfig { width: 32, height: 16, ..Default::default() };
//! let mut world = World::new(config).unwrap();
//! world.tilemap_mut().fill((0, 10), (31, 10), TileId::STONE);
//!
//! let player = world.spawn_player(Some(Vec2::new(4.5, 8.0))).unwrap();
//! world.set_input(InputSnapshot::new().with_key(Key::MoveRight));
//! for _ in 0..60 {
//!     world.update(1.0 / 60.0);
//! }
//!
//! assert!(world.entity(player).unwrap().pos.x > 4.5);
//! assert!(world.physics().get(player).unwrap().grounded());
//! ```

#![deny(unsafe_code)]

pub mod collider;
pub mod command;
pub mod config;
pub mod entity;
pub mod events;
pub mod input;
pub mod inventory;
pub mod math;
pub mod particles;
pub mod physics;
pub mod projectile;
pub mod render;
pub mod tilemap;
pub mod tiles;
pub mod timer;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use burrow_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use burrow_ecs::prelude::*;

    pub use crate::collider::{Collider, ColliderSystem};
    pub use crate::config::{AiTuning, ConfigError, PhysicsTuning, PlayerTuning, WorldConfig};
    pub use crate::entity::{Entities, Entity, Tag};
    pub use crate::events::{EventBus, EventKind, GameEvent};
    pub use crate::input::{InputSnapshot, InputState, Key, MouseButton};
    pub use crate::inventory::{Inventory, ItemStack};
    pub use crate::math::{Rect, Vec2};
    pub use crate::physics::{PhysicsComponent, PhysicsSystem};
    pub use crate::render::{Camera2D, Canvas, DrawCommand, DrawList};
    pub use crate::tilemap::Tilemap;
    pub use crate::tiles::{Tile, TileId, TileSet};
    pub use crate::timer::Timer;
    pub use crate::world::{FrameDiagnostics, World};
}

//! Deferred world mutations.
//!
//! Systems run while the world is split into borrowed parts, so anything that
//! spawns or despawns entities is queued here and applied by the world in
//! FIFO order once every system has finished the frame.

use burrow_ecs::entity::EntityId;

use crate::math::Vec2;

/// Why a command was issued, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausalReason {
    PlayerInput(&'static str),
    GameRule(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    SpawnProjectile { pos: Vec2, vel: Vec2 },
    Despawn { entity: EntityId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    pub command: WorldCommand,
    pub reason: CausalReason,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<QueuedCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: WorldCommand, reason: CausalReason) {
        self.commands.push(QueuedCommand { command, reason });
    }

    pub fn spawn_projectile(&mut self, pos: Vec2, vel: Vec2, reason: CausalReason) {
        self.push(WorldCommand::SpawnProjectile { pos, vel }, reason);
    }

    pub fn despawn(&mut self, entity: EntityId, reason: CausalReason) {
        self.push(WorldCommand::Despawn { entity }, reason);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every queued command in issue order.
    pub fn drain(&mut self) -> impl Iterator<Item = QueuedCommand> + '_ {
        self.commands.drain(..)
    }
}

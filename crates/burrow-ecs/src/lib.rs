//! Burrow ECS -- entity handles and per-kind component systems.
//!
//! Entities are plain generational handles. Every component kind lives in its
//! own [`ComponentSystem`](system::ComponentSystem), which stores components
//! in registration order, looks them up by owner in O(1) through a sparse
//! slot table, and is the sole authority on component liveness.
//!
//! # Quick Start
//!
//! ```
//! use burrow_ecs::prelude::*;
//!
//! struct Health { owner: EntityId, alive: bool, hp: u32 }
//!
//! impl Component for Health {
//!     const KIND: ComponentKind = ComponentKind::Render;
//!     fn owner(&self) -> EntityId { self.owner }
//!     fn is_alive(&self) -> bool { self.alive }
//!     fn kill(&mut self) { self.alive = false; }
//! }
//!
//! let mut entities = EntityAllocator::new();
//! let mut health = ComponentSystem::new();
//! let e = entities.allocate();
//! health.insert(Health { owner: e, alive: true, hp: 3 }).unwrap();
//!
//! // One frame: tick everything, drop whatever reached zero.
//! health.run(|h| { h.hp -= 1; h.hp > 0 });
//! assert_eq!(health.get(e).map(|h| h.hp), Some(2));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod system;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The handle is stale or was never allocated.
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// The entity already owns a live component of this kind.
    #[error("entity {entity:?} already has a {kind} component")]
    DuplicateComponent {
        entity: entity::EntityId,
        kind: component::ComponentKind,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentKind, ComponentMask};
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::system::ComponentSystem;
    pub use crate::EcsError;
}

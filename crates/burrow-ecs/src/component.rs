//! Component kinds, the per-entity slot table, and the [`Component`] trait.
//!
//! Each entity may carry at most one component of every [`ComponentKind`].
//! Which kinds it carries is recorded in a [`ComponentMask`]; the component
//! values themselves live in the owning
//! [`ComponentSystem`](crate::system::ComponentSystem), which is the authority
//! on whether a component is still alive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// Every component capability the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Axis-aligned box used for broad-phase overlap queries.
    Collider,
    /// Force/impulse accumulator and tile/entity collision resolver.
    Physics,
    /// Player or AI controller that feeds the physics component.
    Input,
    /// Sprite drawn at the owner's position.
    Render,
    /// Ballistic motion that ends on terrain contact.
    Projectile,
}

impl ComponentKind {
    /// All kinds, in frame update order.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Collider,
        ComponentKind::Physics,
        ComponentKind::Input,
        ComponentKind::Projectile,
        ComponentKind::Render,
    ];

    /// Short lowercase name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Collider => "collider",
            ComponentKind::Physics => "physics",
            ComponentKind::Input => "input",
            ComponentKind::Render => "render",
            ComponentKind::Projectile => "projectile",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// ComponentMask
// ---------------------------------------------------------------------------

/// Bitset slot table: which component kinds an entity has registered.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentMask(u8);

impl ComponentMask {
    pub const EMPTY: ComponentMask = ComponentMask(0);

    pub fn contains(self, kind: ComponentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Mark `kind` present. Returns `false` if it already was.
    pub fn insert(&mut self, kind: ComponentKind) -> bool {
        let had = self.contains(kind);
        self.0 |= kind.bit();
        !had
    }

    /// Clear `kind`. Returns `true` if it was present.
    pub fn remove(&mut self, kind: ComponentKind) -> bool {
        let had = self.contains(kind);
        self.0 &= !kind.bit();
        had
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kinds present in the mask, in [`ComponentKind::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Shared capability of every component: an owner and a liveness flag.
///
/// Killing a component only flips the flag; the owning system drops it on
/// its next sweep.
pub trait Component {
    /// Which system this component type is registered into.
    const KIND: ComponentKind;

    /// The entity that owns this component.
    fn owner(&self) -> EntityId;

    fn is_alive(&self) -> bool;

    fn kill(&mut self);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_insert_reports_duplicates() {
        let mut mask = ComponentMask::EMPTY;
        assert!(mask.insert(ComponentKind::Physics));
        assert!(!mask.insert(ComponentKind::Physics));
        assert!(mask.contains(ComponentKind::Physics));
        assert!(!mask.contains(ComponentKind::Collider));
    }

    #[test]
    fn mask_remove_and_iterate() {
        let mut mask = ComponentMask::EMPTY;
        mask.insert(ComponentKind::Render);
        mask.insert(ComponentKind::Collider);
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![ComponentKind::Collider, ComponentKind::Render]
        );
        assert!(mask.remove(ComponentKind::Render));
        assert!(!mask.remove(ComponentKind::Render));
        mask.remove(ComponentKind::Collider);
        assert!(mask.is_empty());
    }

    #[test]
    fn kind_names() {
        assert_eq!(ComponentKind::Collider.to_string(), "collider");
        assert_eq!(ComponentKind::Projectile.name(), "projectile");
    }
}

//! Generic per-kind component container.
//!
//! A [`ComponentSystem`] owns every component of one kind. Components are kept
//! densely in registration order; a sparse table indexed by entity slot gives
//! O(1) lookup by owner. Dead components stay in place until [`sweep`]
//! compacts the dense storage, after which the order of survivors is
//! preserved but indices are rebuilt.
//!
//! [`sweep`]: ComponentSystem::sweep

use crate::component::Component;
use crate::entity::EntityId;
use crate::EcsError;

/// Dense storage of one component kind with owner lookup.
#[derive(Debug)]
pub struct ComponentSystem<C: Component> {
    dense: Vec<C>,
    /// Entity slot -> position in `dense`.
    sparse: Vec<Option<usize>>,
}

impl<C: Component> Default for ComponentSystem<C> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
        }
    }
}

impl<C: Component> ComponentSystem<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Its owner must not already hold a live component
    /// of this kind.
    pub fn insert(&mut self, component: C) -> Result<(), EcsError> {
        let owner = component.owner();
        if let Some(existing) = self.get(owner) {
            if existing.is_alive() {
                return Err(EcsError::DuplicateComponent {
                    entity: owner,
                    kind: C::KIND,
                });
            }
        }
        let slot = owner.slot();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.dense.len());
        self.dense.push(component);
        tracing::trace!(entity = %owner, kind = %C::KIND, "component registered");
        Ok(())
    }

    /// The component owned by `owner`, dead or alive, until the next sweep.
    pub fn get(&self, owner: EntityId) -> Option<&C> {
        let index = (*self.sparse.get(owner.slot())?)?;
        self.dense.get(index).filter(|c| c.owner() == owner)
    }

    pub fn get_mut(&mut self, owner: EntityId) -> Option<&mut C> {
        let index = (*self.sparse.get(owner.slot())?)?;
        self.dense.get_mut(index).filter(|c| c.owner() == owner)
    }

    /// Whether `owner` has a live component here.
    pub fn contains(&self, owner: EntityId) -> bool {
        self.get(owner).is_some_and(|c| c.is_alive())
    }

    /// Flag `owner`'s component dead. Returns `false` if there was none.
    pub fn kill(&mut self, owner: EntityId) -> bool {
        match self.get_mut(owner) {
            Some(component) => {
                component.kill();
                true
            }
            None => false,
        }
    }

    /// Advance every live component with `step`, killing those for which it
    /// returns `false`, then sweep.
    pub fn run<F>(&mut self, mut step: F) -> usize
    where
        F: FnMut(&mut C) -> bool,
    {
        for component in self.dense.iter_mut() {
            if component.is_alive() && !step(component) {
                component.kill();
            }
        }
        self.sweep()
    }

    /// Drop dead components and rebuild the owner index. Returns how many were
    /// removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.dense.len();
        self.dense.retain(|c| c.is_alive());
        let removed = before - self.dense.len();
        if removed > 0 {
            self.sparse.iter_mut().for_each(|entry| *entry = None);
            for (index, component) in self.dense.iter().enumerate() {
                self.sparse[component.owner().slot()] = Some(index);
            }
            tracing::trace!(kind = %C::KIND, removed, remaining = self.dense.len(), "swept");
        }
        removed
    }

    /// Components in registration order, including dead ones not yet swept.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.dense.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.dense.iter_mut()
    }

    /// Live components only.
    pub fn iter_alive(&self) -> impl Iterator<Item = &C> {
        self.dense.iter().filter(|c| c.is_alive())
    }

    /// Stored components, dead ones included.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.iter_alive().count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

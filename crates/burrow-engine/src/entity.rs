//! Entity records: position, velocity, tag and the component slot table.

use burrow_ecs::component::{ComponentKind, ComponentMask};
use burrow_ecs::entity::{EntityAllocator, EntityId};
use burrow_ecs::EcsError;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Coarse category used by collider allow-lists and event routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    #[default]
    Default,
    Player,
    Enemy,
    Projectile,
}

/// State shared by every entity regardless of its components.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// Centre position in tile units.
    pub pos: Vec2,
    pub vel: Vec2,
    pub tag: Tag,
    /// Which component kinds have been registered for this entity.
    pub components: ComponentMask,
}

impl Entity {
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.contains(kind)
    }
}

/// Arena of entity records indexed by [`EntityId`] slot.
#[derive(Debug, Default)]
pub struct Entities {
    allocator: EntityAllocator,
    records: Vec<Option<Entity>>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, pos: Vec2, tag: Tag) -> EntityId {
        let id = self.allocator.allocate();
        let slot = id.slot();
        if slot >= self.records.len() {
            self.records.resize(slot + 1, None);
        }
        self.records[slot] = Some(Entity {
            id,
            pos,
            vel: Vec2::ZERO,
            tag,
            components: ComponentMask::EMPTY,
        });
        tracing::debug!(entity = %id, ?tag, x = pos.x, y = pos.y, "entity spawned");
        id
    }

    /// Remove the record. The caller is responsible for killing components.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, EcsError> {
        if !self.allocator.deallocate(id) {
            return Err(EcsError::StaleEntity { entity: id });
        }
        let record = self.records[id.slot()]
            .take()
            .ok_or(EcsError::StaleEntity { entity: id })?;
        tracing::debug!(entity = %id, tag = ?record.tag, "entity despawned");
        Ok(record)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.records
            .get(id.slot())?
            .as_ref()
            .filter(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.records
            .get_mut(id.slot())?
            .as_mut()
            .filter(|e| e.id == id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Record that `id` now carries a component of `kind`.
    ///
    /// Fails if the entity is gone or already has that kind.
    pub fn attach(&mut self, id: EntityId, kind: ComponentKind) -> Result<(), EcsError> {
        let entity = self
            .get_mut(id)
            .ok_or(EcsError::StaleEntity { entity: id })?;
        if entity.components.insert(kind) {
            Ok(())
        } else {
            Err(EcsError::DuplicateComponent { entity: id, kind })
        }
    }

    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.records.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_lookup() {
        let mut entities = Entities::new();
        let id = entities.spawn(Vec2::new(1.0, 2.0), Tag::Enemy);
        let e = entities.get(id).unwrap();
        assert_eq!(e.pos, Vec2::new(1.0, 2.0));
        assert_eq!(e.tag, Tag::Enemy);
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn despawned_handle_is_stale() {
        let mut entities = Entities::new();
        let id = entities.spawn(Vec2::ZERO, Tag::Default);
        entities.despawn(id).unwrap();
        assert!(entities.get(id).is_none());
        assert!(matches!(
            entities.despawn(id),
            Err(EcsError::StaleEntity { .. })
        ));

        let reused = entities.spawn(Vec2::ZERO, Tag::Player);
        assert_eq!(reused.slot(), id.slot());
        assert!(entities.get(id).is_none());
        assert_eq!(entities.get(reused).unwrap().tag, Tag::Player);
    }

    #[test]
    fn attach_enforces_one_component_per_kind() {
        let mut entities = Entities::new();
        let id = entities.spawn(Vec2::ZERO, Tag::Default);
        entities.attach(id, ComponentKind::Physics).unwrap();
        assert!(matches!(
            entities.attach(id, ComponentKind::Physics),
            Err(EcsError::DuplicateComponent { .. })
        ));
        assert!(entities.get(id).unwrap().has(ComponentKind::Physics));
    }
}

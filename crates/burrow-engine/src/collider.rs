//! Collider components and the corner-bucket spatial index.
//!
//! Every frame [`ColliderSystem::update`] snaps each collider's rect onto its
//! owner's position, sweeps dead colliders, and rebuilds the index from
//! scratch: each collider is inserted into the bucket of every distinct tile
//! cell holding one of its rect's four corners. Queries union the query
//! rect's corner buckets, then confirm candidates with an exact AABB test.
//!
//! Only corners are indexed. A collider larger than a tile can therefore miss
//! a smaller collider sitting entirely inside its span without touching any
//! of its corner cells. Entities in this game are about one tile across, where
//! the approximation is exact.

use std::collections::HashMap;

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::system::ComponentSystem;
use burrow_ecs::EcsError;

use crate::entity::{Entities, Tag};
use crate::math::{Rect, Vec2};

// ---------------------------------------------------------------------------
// Collider
// ---------------------------------------------------------------------------

/// Axis-aligned box centred on its owner.
#[derive(Debug, Clone)]
pub struct Collider {
    owner: EntityId,
    alive: bool,
    /// Owner's tag as of the last sync.
    owner_tag: Tag,
    pub rect: Rect,
    /// Tags this collider may collide with. Empty means everyone.
    pub allow: Vec<Tag>,
}

impl Collider {
    pub fn new(owner: EntityId, owner_tag: Tag, center: Vec2, w: f64, h: f64) -> Self {
        Self {
            owner,
            alive: true,
            owner_tag,
            rect: Rect::centered(center, w, h),
            allow: Vec::new(),
        }
    }

    /// Restrict this collider to owners carrying one of `tags`.
    pub fn with_allow_list(mut self, tags: impl Into<Vec<Tag>>) -> Self {
        self.allow = tags.into();
        self
    }

    pub fn owner_tag(&self) -> Tag {
        self.owner_tag
    }

    /// Whether a query made on behalf of a `tag` owner may see this collider.
    pub fn accepts(&self, tag: Tag) -> bool {
        self.allow.is_empty() || self.allow.contains(&tag)
    }

    fn sync(&mut self, pos: Vec2, tag: Tag) {
        self.rect.set_center(pos);
        self.owner_tag = tag;
    }
}

impl Component for Collider {
    const KIND: ComponentKind = ComponentKind::Collider;

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

// ---------------------------------------------------------------------------
// ColliderSystem
// ---------------------------------------------------------------------------

/// Owns all colliders plus the per-frame corner-bucket index.
#[derive(Debug, Default)]
pub struct ColliderSystem {
    colliders: ComponentSystem<Collider>,
    buckets: HashMap<(i32, i32), Vec<EntityId>>,
}

impl ColliderSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collider: Collider) -> Result<(), EcsError> {
        self.colliders.insert(collider)
    }

    pub fn get(&self, owner: EntityId) -> Option<&Collider> {
        self.colliders.get(owner)
    }

    pub fn get_mut(&mut self, owner: EntityId) -> Option<&mut Collider> {
        self.colliders.get_mut(owner)
    }

    pub fn kill(&mut self, owner: EntityId) -> bool {
        self.colliders.kill(owner)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter_alive()
    }

    /// Sync rects to owners, drop dead colliders, rebuild the index.
    pub fn update(&mut self, entities: &Entities) {
        self.colliders.run(|collider| match entities.get(collider.owner) {
            Some(entity) => {
                collider.sync(entity.pos, entity.tag);
                true
            }
            None => {
                tracing::warn!(entity = %collider.owner, "collider owner missing, dropping collider");
                false
            }
        });
        self.rebuild_index();
    }

    /// Rebuild the corner buckets from the colliders' current rects.
    pub fn rebuild_index(&mut self) {
        self.buckets.clear();
        for collider in self.colliders.iter_alive() {
            for cell in collider.rect.corner_cells().iter() {
                self.buckets.entry(cell).or_default().push(collider.owner);
            }
        }
        tracing::trace!(
            colliders = self.colliders.len(),
            buckets = self.buckets.len(),
            "spatial index rebuilt"
        );
    }

    /// Colliders indexed in tile cell `cell`.
    pub fn bucket(&self, cell: (i32, i32)) -> &[EntityId] {
        self.buckets.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Every other collider whose rect truly overlaps `collider`'s.
    ///
    /// Candidates come from the query rect's corner buckets; self is
    /// excluded, colliders whose allow-list rejects the query owner's tag are
    /// skipped, and each result appears once. Order is unspecified.
    pub fn get_entity_collisions(&self, collider: &Collider) -> Vec<&Collider> {
        self.query(&collider.rect, collider.owner_tag, Some(collider.owner))
    }

    /// [`get_entity_collisions`](Self::get_entity_collisions) by owner.
    pub fn collisions_for(&self, owner: EntityId) -> Vec<&Collider> {
        match self.colliders.get(owner) {
            Some(collider) if collider.is_alive() => self.get_entity_collisions(collider),
            _ => Vec::new(),
        }
    }

    /// Overlap query for an arbitrary rect on behalf of a `tag` owner.
    pub fn query(&self, rect: &Rect, tag: Tag, exclude: Option<EntityId>) -> Vec<&Collider> {
        let mut seen: Vec<EntityId> = Vec::new();
        let mut hits = Vec::new();
        for cell in rect.corner_cells().iter() {
            for &candidate in self.bucket(cell) {
                if Some(candidate) == exclude || seen.contains(&candidate) {
                    continue;
                }
                seen.push(candidate);
                let Some(other) = self.colliders.get(candidate) else {
                    continue;
                };
                if other.is_alive() && other.accepts(tag) && rect.intersects(&other.rect) {
                    hits.push(other);
                }
            }
        }
        hits
    }

    /// Whether any indexed collider overlaps tile cell `(cx, cy)`.
    pub fn is_cell_occupied(&self, cx: i32, cy: i32) -> bool {
        let cell = Rect::cell(cx, cy);
        self.bucket((cx, cy)).iter().any(|&owner| {
            self.colliders
                .get(owner)
                .is_some_and(|c| c.is_alive() && c.rect.intersects(&cell))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

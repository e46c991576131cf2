//! Force accumulation and axis-separated collision resolution.
//!
//! A [`PhysicsComponent`] collects forces, target forces and impulses from
//! input and AI code during a frame. On the next [`PhysicsSystem::update`]
//! each body:
//!
//! 1. queues gravity and a friction target force,
//! 2. queues a repulsion force away from every overlapping collider,
//! 3. resolves target forces, then applies forces (`vel += f * dt`) and
//!    impulses (`vel += i`), clearing all three queues,
//! 4. moves along Y and resolves against solid tiles,
//! 5. moves along X and resolves against solid tiles,
//! 6. writes the resolved rect centre back to the entity.
//!
//! Resolving Y before X is not continuous collision detection. A body moving
//! fast enough diagonally can clip a tile corner; `max_dt` keeps this rare.

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::system::ComponentSystem;
use burrow_ecs::EcsError;
use rand_pcg::Pcg32;

use crate::collider::ColliderSystem;
use crate::config::PhysicsTuning;
use crate::entity::{Entities, Tag};
use crate::events::{EventBus, EventKind, GameEvent};
use crate::math::{Rect, Vec2};
use crate::tilemap::Tilemap;

// ---------------------------------------------------------------------------
// Target force clamping
// ---------------------------------------------------------------------------

/// The part of `force` that may be applied along one axis this frame without
/// carrying `vel` past `target`.
///
/// Returns `force` unchanged when it cannot reach the target, the exact force
/// `(target - vel) / dt` when it would overshoot from the near side, and zero
/// when velocity already sits on or beyond the target in the force's
/// direction.
pub fn clamp_target_force(vel: f64, force: f64, target: f64, dt: f64) -> f64 {
    if vel == target || force == 0.0 || dt <= 0.0 {
        return 0.0;
    }
    let next = vel + force * dt;
    if force > 0.0 {
        if vel < target && next > target {
            (target - vel) / dt
        } else if next <= target {
            force
        } else {
            0.0
        }
    } else if vel > target && next < target {
        (target - vel) / dt
    } else if next >= target {
        force
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// PhysicsComponent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PhysicsComponent {
    owner: EntityId,
    alive: bool,
    grounded: bool,
    forces: Vec<Vec2>,
    target_forces: Vec<(Vec2, Vec2)>,
    impulses: Vec<Vec2>,
    last_forces: Vec<Vec2>,
}

impl PhysicsComponent {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            alive: true,
            grounded: false,
            forces: Vec::new(),
            target_forces: Vec::new(),
            impulses: Vec::new(),
            last_forces: Vec::new(),
        }
    }

    /// Queue `force`, integrated as `vel += force * dt`.
    pub fn apply_force(&mut self, force: Vec2) {
        self.forces.push(force);
    }

    /// Queue `force`, clamped per axis so it cannot push velocity past
    /// `target`. See [`clamp_target_force`].
    pub fn apply_force_target(&mut self, force: Vec2, target: Vec2) {
        self.target_forces.push((force, target));
    }

    /// Queue an instantaneous velocity change.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.impulses.push(impulse);
    }

    /// Whether the last vertical resolution stopped downward motion.
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Forces integrated in the most recent update, for debug drawing.
    pub fn last_forces(&self) -> &[Vec2] {
        &self.last_forces
    }

    /// Whether nothing is queued for the next update.
    pub fn is_idle(&self) -> bool {
        self.forces.is_empty() && self.target_forces.is_empty() && self.impulses.is_empty()
    }

    /// Fold every queued force and impulse into `vel` and clear the queues.
    ///
    /// Target forces are clamped against the incoming velocity before any
    /// plain force is applied.
    pub fn integrate(&mut self, vel: &mut Vec2, dt: f64) {
        for (force, target) in std::mem::take(&mut self.target_forces) {
            let clamped = Vec2::new(
                clamp_target_force(vel.x, force.x, target.x, dt),
                clamp_target_force(vel.y, force.y, target.y, dt),
            );
            if clamped != Vec2::ZERO {
                self.forces.push(clamped);
            }
        }
        for force in &self.forces {
            *vel += *force * dt;
        }
        for impulse in self.impulses.drain(..) {
            *vel += impulse;
        }
        std::mem::swap(&mut self.last_forces, &mut self.forces);
        self.forces.clear();
    }
}

impl Component for PhysicsComponent {
    const KIND: ComponentKind = ComponentKind::Physics;

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
// PhysicsSystem
// ---------------------------------------------------------------------------

/// Everything a physics step reads or writes besides the bodies themselves.
pub struct PhysicsContext<'a> {
    pub entities: &'a mut Entities,
    pub colliders: &'a mut ColliderSystem,
    pub tilemap: &'a Tilemap,
    pub events: &'a mut EventBus,
    pub rng: &'a mut Pcg32,
    pub tuning: &'a PhysicsTuning,
    pub gravity: Vec2,
    pub dt: f64,
}

#[derive(Debug, Default)]
pub struct PhysicsSystem {
    bodies: ComponentSystem<PhysicsComponent>,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: PhysicsComponent) -> Result<(), EcsError> {
        self.bodies.insert(body)
    }

    pub fn get(&self, owner: EntityId) -> Option<&PhysicsComponent> {
        self.bodies.get(owner)
    }

    pub fn get_mut(&mut self, owner: EntityId) -> Option<&mut PhysicsComponent> {
        self.bodies.get_mut(owner)
    }

    pub fn kill(&mut self, owner: EntityId) -> bool {
        self.bodies.kill(owner)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicsComponent> {
        self.bodies.iter_alive()
    }

    /// Step every live body in registration order and sweep dead ones.
    /// Returns how many were removed.
    pub fn update(&mut self, ctx: &mut PhysicsContext<'_>) -> usize {
        self.bodies.run(|body| step(body, ctx))
    }
}

fn step(body: &mut PhysicsComponent, ctx: &mut PhysicsContext<'_>) -> bool {
    let owner = body.owner;
    let Some(entity) = ctx.entities.get(owner) else {
        tracing::warn!(entity = %owner, "physics owner missing, dropping body");
        return false;
    };
    let tag = entity.tag;
    let mut vel = entity.vel;
    let mut rect = ctx
        .colliders
        .get(owner)
        .map_or_else(|| Rect::centered(entity.pos, 0.0, 0.0), |c| c.rect);
    let dt = ctx.dt;

    body.apply_force(ctx.gravity);
    let friction = if body.grounded {
        ctx.tuning.ground_friction
    } else {
        ctx.tuning.air_friction
    };
    body.apply_force_target(Vec2::new(-friction.copysign(vel.x), 0.0), Vec2::ZERO);

    let neighbours: Vec<Vec2> = ctx
        .colliders
        .collisions_for(owner)
        .iter()
        .map(|other| other.rect.center())
        .collect();
    let center = rect.center();
    for other in neighbours {
        let away = (center - other).normalize_or_random(&mut *ctx.rng);
        body.apply_force(away.scale(ctx.tuning.repulsion));
    }

    body.integrate(&mut vel, dt);

    let was_grounded = body.grounded;
    body.grounded = false;

    rect.y += vel.y * dt;
    for tile in ctx.tilemap.get_collisions(&rect) {
        if vel.y > 0.0 {
            vel.y = 0.0;
            body.grounded = true;
            rect.set_bottom(tile.top());
            if !was_grounded && tag == Tag::Player {
                ctx.events.post(GameEvent {
                    kind: EventKind::PlayerGrounded,
                    entity: owner,
                    pos: rect.center(),
                    vel,
                    vec: Vec2::ZERO,
                });
            }
        } else if vel.y < 0.0 {
            vel.y = 0.0;
            rect.set_top(tile.bottom());
        }
    }

    rect.x += vel.x * dt;
    for tile in ctx.tilemap.get_collisions(&rect) {
        if vel.x > 0.0 {
            vel.x = 0.0;
            rect.set_right(tile.left());
        } else if vel.x < 0.0 {
            vel.x = 0.0;
            rect.set_left(tile.right());
        }
    }

    if let Some(collider) = ctx.colliders.get_mut(owner) {
        collider.rect = rect;
    }
    if let Some(entity) = ctx.entities.get_mut(owner) {
        entity.pos = rect.center();
        entity.vel = vel;
    }
    tracing::trace!(entity = %owner, x = rect.center().x, y = rect.center().y, grounded = body.grounded, "body stepped");
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::Collider;
    use crate::tiles::TileId;
    use rand::SeedableRng;

    struct Rig {
        entities: Entities,
        colliders: ColliderSystem,
        physics: PhysicsSystem,
        tilemap: Tilemap,
        events: EventBus,
        rng: Pcg32,
        tuning: PhysicsTuning,
        gravity: Vec2,
    }

    impl Rig {
        fn new(gravity: Vec2) -> Self {
            Self {
                entities: Entities::new(),
                colliders: ColliderSystem::new(),
                physics: PhysicsSystem::new(),
                tilemap: Tilemap::new(32, 32),
                events: EventBus::new(),
                rng: Pcg32::seed_from_u64(7),
                tuning: PhysicsTuning::default(),
                gravity,
            }
        }

        fn body(&mut self, pos: Vec2, tag: Tag) -> EntityId {
            let id = self.entities.spawn(pos, tag);
            self.colliders
                .insert(Collider::new(id, tag, pos, 1.0, 1.0))
                .unwrap();
            self.physics.insert(PhysicsComponent::new(id)).unwrap();
            id
        }

        fn step(&mut self, dt: f64) {
            self.colliders.update(&self.entities);
            let mut ctx = PhysicsContext {
                entities: &mut self.entities,
                colliders: &mut self.colliders,
                tilemap: &self.tilemap,
                events: &mut self.events,
                rng: &mut self.rng,
                tuning: &self.tuning,
                gravity: self.gravity,
                dt,
            };
            self.physics.update(&mut ctx);
        }

        fn vel(&self, id: EntityId) -> Vec2 {
            self.entities.get(id).unwrap().vel
        }
    }

    #[test]
    fn clamp_passes_force_below_target() {
        assert_eq!(clamp_target_force(0.0, 50.0, 5.0, 0.05), 50.0);
        assert_eq!(clamp_target_force(0.0, -50.0, -5.0, 0.05), -50.0);
    }

    #[test]
    fn clamp_lands_exactly_on_target() {
        let f = clamp_target_force(4.0, 50.0, 5.0, 0.1);
        assert!((4.0 + f * 0.1 - 5.0).abs() < 1e-12);
        let f = clamp_target_force(-4.0, -50.0, -5.0, 0.1);
        assert!((-4.0 + f * 0.1 + 5.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_suppresses_when_at_or_past_target() {
        assert_eq!(clamp_target_force(5.0, 50.0, 5.0, 0.1), 0.0);
        assert_eq!(clamp_target_force(7.0, 50.0, 5.0, 0.1), 0.0);
        assert_eq!(clamp_target_force(-7.0, -50.0, -5.0, 0.1), 0.0);
    }

    #[test]
    fn clamp_lets_force_pull_back_toward_target() {
        // Friction style: pushing a positive velocity toward zero.
        assert_eq!(clamp_target_force(3.0, -1.0, 0.0, 0.1), -1.0);
        let f = clamp_target_force(0.5, -20.0, 0.0, 0.1);
        assert!((0.5 + f * 0.1).abs() < 1e-12);
    }

    #[test]
    fn integrate_orders_target_forces_plain_forces_then_impulses() {
        let mut body = PhysicsComponent::new(EntityId::new(0, 0));
        let mut vel = Vec2::new(4.0, 0.0);
        body.apply_force_target(Vec2::new(50.0, 0.0), Vec2::new(5.0, 0.0));
        body.apply_force(Vec2::new(0.0, 10.0));
        body.apply_impulse(Vec2::new(10.0, 0.0));
        body.integrate(&mut vel, 0.1);

        assert!((vel.x - 15.0).abs() < 1e-12, "clamped to 5 then +10 impulse");
        assert!((vel.y - 1.0).abs() < 1e-12);
        assert!(body.is_idle());
        assert_eq!(body.last_forces().len(), 2);
    }

    #[test]
    fn impulse_is_not_scaled_by_dt() {
        let mut body = PhysicsComponent::new(EntityId::new(0, 0));
        let mut vel = Vec2::ZERO;
        body.apply_impulse(Vec2::new(10.0, 0.0));
        body.integrate(&mut vel, 0.016);
        assert_eq!(vel, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn falling_body_lands_on_tile() {
        let mut rig = Rig::new(Vec2::new(0.0, 20.0));
        rig.tilemap.set_tile((10, 11), Some(TileId::STONE), true);
        let id = rig.body(Vec2::new(10.5, 10.5), Tag::Default);
        rig.entities.get_mut(id).unwrap().vel = Vec2::new(0.0, 5.0);

        rig.step(0.1);

        let rect = rig.colliders.get(id).unwrap().rect;
        assert!((rect.bottom() - 11.0).abs() < 1e-9);
        assert_eq!(rig.vel(id).y, 0.0);
        assert!(rig.physics.get(id).unwrap().grounded());
        assert!((rig.entities.get(id).unwrap().pos.y - 10.5).abs() < 1e-9);
    }

    #[test]
    fn rising_body_stops_under_ceiling() {
        let mut rig = Rig::new(Vec2::ZERO);
        rig.tilemap.set_tile((4, 3), Some(TileId::DIRT), true);
        let id = rig.body(Vec2::new(4.5, 4.6), Tag::Default);
        rig.entities.get_mut(id).unwrap().vel = Vec2::new(0.0, -3.0);

        rig.step(0.1);

        let rect = rig.colliders.get(id).unwrap().rect;
        assert!((rect.top() - 4.0).abs() < 1e-9);
        assert_eq!(rig.vel(id).y, 0.0);
        assert!(!rig.physics.get(id).unwrap().grounded());
    }

    #[test]
    fn walls_stop_horizontal_motion() {
        let mut rig = Rig::new(Vec2::ZERO);
        rig.tilemap.set_tile((6, 5), Some(TileId::STONE), true);
        let id = rig.body(Vec2::new(5.4, 5.5), Tag::Default);
        rig.entities.get_mut(id).unwrap().vel = Vec2::new(4.0, 0.0);

        rig.step(0.1);

        let rect = rig.colliders.get(id).unwrap().rect;
        assert!((rect.right() - 6.0).abs() < 1e-9);
        assert_eq!(rig.vel(id).x, 0.0);
    }

    #[test]
    fn grounded_event_fires_once_for_player_only() {
        let mut rig = Rig::new(Vec2::new(0.0, 20.0));
        rig.tilemap.fill((0, 11), (31, 11), TileId::STONE);
        let player = rig.body(Vec2::new(5.5, 10.4), Tag::Player);
        let enemy = rig.body(Vec2::new(15.5, 10.4), Tag::Enemy);
        rig.entities.get_mut(player).unwrap().vel = Vec2::new(0.0, 2.0);
        rig.entities.get_mut(enemy).unwrap().vel = Vec2::new(0.0, 2.0);

        rig.step(0.1);
        rig.step(0.1);
        rig.step(0.1);

        let events = rig.events.dispatch();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::PlayerGrounded);
        assert_eq!(events[0].entity, player);
        assert!(rig.physics.get(enemy).unwrap().grounded());
    }

    #[test]
    fn ground_friction_stops_without_reversing() {
        let mut rig = Rig::new(Vec2::new(0.0, 20.0));
        rig.tilemap.fill((0, 11), (31, 11), TileId::STONE);
        let id = rig.body(Vec2::new(10.5, 10.5), Tag::Default);
        rig.entities.get_mut(id).unwrap().vel = Vec2::new(1.0, 0.0);

        for _ in 0..20 {
            rig.step(0.05);
            assert!(rig.vel(id).x > -1e-9);
        }
        assert!(rig.vel(id).x.abs() < 1e-9);
    }

    #[test]
    fn overlapping_bodies_push_apart() {
        let mut rig = Rig::new(Vec2::ZERO);
        let left = rig.body(Vec2::new(5.0, 5.5), Tag::Default);
        let right = rig.body(Vec2::new(5.5, 5.5), Tag::Default);

        rig.step(0.05);

        assert!(rig.vel(left).x < 0.0);
        assert!(rig.vel(right).x > 0.0);
    }

    #[test]
    fn coincident_bodies_get_a_finite_nonzero_push() {
        let mut rig = Rig::new(Vec2::ZERO);
        let a = rig.body(Vec2::new(8.5, 8.5), Tag::Default);
        let b = rig.body(Vec2::new(8.5, 8.5), Tag::Default);

        rig.step(0.05);

        for id in [a, b] {
            let forces = rig.physics.get(id).unwrap().last_forces().to_vec();
            let push = forces
                .iter()
                .copied()
                .fold(Vec2::ZERO, |acc, f| acc + f);
            assert!(push.x.is_finite() && push.y.is_finite());
            assert!(push.length() > 0.0);
        }
    }

    #[test]
    fn body_without_owner_is_dropped() {
        let mut rig = Rig::new(Vec2::ZERO);
        let id = rig.body(Vec2::new(1.5, 1.5), Tag::Default);
        rig.entities.despawn(id).unwrap();
        rig.step(0.1);
        assert!(rig.physics.is_empty());
    }
}

//! Property tests for the collision layers.
//!
//! Random populations of tile-sized colliders are indexed and every query is
//! compared with a brute-force pairwise scan. Target-force clamping and tile
//! placement are checked against their invariants on random inputs.

use burrow_engine::burrow_ecs::component::Component;
use burrow_engine::collider::{Collider, ColliderSystem};
use burrow_engine::entity::{Entities, Tag};
use burrow_engine::math::{Rect, Vec2};
use burrow_engine::physics::clamp_target_force;
use burrow_engine::tilemap::Tilemap;
use burrow_engine::tiles::TileId;
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Body {
    pos: (f64, f64),
    size: (f64, f64),
    tag: Tag,
    allow: Vec<Tag>,
}

fn tag() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::Default),
        Just(Tag::Player),
        Just(Tag::Enemy),
        Just(Tag::Projectile),
    ]
}

fn body() -> impl Strategy<Value = Body> {
    (
        (-4.0f64..8.0, -4.0f64..8.0),
        (0.05f64..=1.0, 0.05f64..=1.0),
        tag(),
        prop::collection::vec(tag(), 0..3),
    )
        .prop_map(|(pos, size, tag, allow)| Body {
            pos,
            size,
            tag,
            allow,
        })
}

fn build(bodies: &[Body]) -> (Entities, ColliderSystem) {
    let mut entities = Entities::new();
    let mut colliders = ColliderSystem::new();
    for b in bodies {
        let pos = Vec2::new(b.pos.0, b.pos.1);
        let id = entities.spawn(pos, b.tag);
        colliders
            .insert(Collider::new(id, b.tag, pos, b.size.0, b.size.1).with_allow_list(b.allow.clone()))
            .unwrap();
    }
    colliders.update(&entities);
    (entities, colliders)
}

proptest! {
    #[test]
    fn index_matches_brute_force(bodies in prop::collection::vec(body(), 1..40)) {
        let (_entities, colliders) = build(&bodies);
        let all: Vec<&Collider> = colliders.iter().collect();

        for me in &all {
            let mut expected: Vec<_> = all
                .iter()
                .filter(|other| other.owner() != me.owner())
                .filter(|other| other.accepts(me.owner_tag()))
                .filter(|other| other.rect.intersects(&me.rect))
                .map(|other| other.owner())
                .collect();
            let mut got: Vec<_> = colliders
                .get_entity_collisions(me)
                .iter()
                .map(|c| c.owner())
                .collect();
            expected.sort();
            got.sort();

            let before = got.len();
            got.dedup();
            prop_assert_eq!(before, got.len(), "duplicate results");
            prop_assert_eq!(got, expected);
        }
    }

    #[test]
    fn edge_neighbours_never_collide(x in -4i32..8, y in -4i32..8, vertical in any::<bool>()) {
        let (dx, dy) = if vertical { (0.0, 1.0) } else { (1.0, 0.0) };
        let a = (x as f64 + 0.5, y as f64 + 0.5);
        let bodies = [
            Body { pos: a, size: (1.0, 1.0), tag: Tag::Enemy, allow: vec![] },
            Body { pos: (a.0 + dx, a.1 + dy), size: (1.0, 1.0), tag: Tag::Enemy, allow: vec![] },
        ];
        let (_entities, colliders) = build(&bodies);
        for c in colliders.iter() {
            prop_assert!(colliders.get_entity_collisions(c).is_empty());
        }
    }

    #[test]
    fn occupied_cells_agree_with_rects(bodies in prop::collection::vec(body(), 1..20), cx in -4i32..8, cy in -4i32..8) {
        let (_entities, colliders) = build(&bodies);
        let cell = Rect::cell(cx, cy);
        let expected = colliders.iter().any(|c| c.rect.intersects(&cell));
        prop_assert_eq!(colliders.is_cell_occupied(cx, cy), expected);
    }

    #[test]
    fn target_force_never_overshoots(
        vel in -50.0f64..50.0,
        force in -200.0f64..200.0,
        target in -50.0f64..50.0,
        dt in 0.001f64..0.2,
    ) {
        let applied = clamp_target_force(vel, force, target, dt);
        let next = vel + applied * dt;
        let eps = 1e-9;

        prop_assert!(applied.abs() <= force.abs() + eps);
        prop_assert!(applied == 0.0 || applied.signum() == force.signum());
        if force > 0.0 && vel < target {
            prop_assert!(next <= target + eps);
        } else if force < 0.0 && vel > target {
            prop_assert!(next >= target - eps);
        } else {
            // Already at or past the target in the force's direction.
            prop_assert_eq!(applied, 0.0);
        }
    }

    #[test]
    fn non_replacing_writes_keep_existing_tiles(
        writes in prop::collection::vec(((0i32..8, 0i32..8), 0u16..6, any::<bool>()), 1..64),
    ) {
        let mut map = Tilemap::new(8, 8);
        for ((x, y), id, replace) in writes {
            let before = map.get_tile_id((x, y));
            let written = map.set_tile((x, y), Some(TileId(id)), replace);
            let after = map.get_tile_id((x, y));
            if replace || before.is_none() {
                prop_assert!(written);
                prop_assert_eq!(after, Some(TileId(id)));
            } else {
                prop_assert!(!written);
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn tile_collisions_are_solid_and_overlapping(
        solids in prop::collection::vec((0i32..8, 0i32..8), 0..24),
        center in (0.0f64..8.0, 0.0f64..8.0),
        size in (0.05f64..=1.0, 0.05f64..=1.0),
    ) {
        let mut map = Tilemap::new(8, 8);
        for &cell in &solids {
            map.set_tile(cell, Some(TileId::STONE), true);
        }
        let rect = Rect::centered(Vec2::new(center.0, center.1), size.0, size.1);
        let hits = map.get_collisions(&rect);

        let mut expected = 0;
        for y in 0..8 {
            for x in 0..8 {
                if map.is_tile_collidable((x, y)) && Rect::cell(x, y).intersects(&rect) {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(hits.len(), expected);
        prop_assert!(hits.iter().all(|tile| tile.intersects(&rect)));
    }
}

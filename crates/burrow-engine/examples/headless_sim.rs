//! Headless sandbox run -- terrain, a scripted player and a pack of enemies.
//!
//! Run with:
//!   cargo run --example headless_sim -p burrow-engine [-- config.json]
//!
//! Set `RUST_LOG=burrow_engine=debug` to watch events, spawns and tile edits.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context;
use burrow_engine::prelude::*;

const FRAMES: u64 = 1200;
const DT: f64 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

/// Rolling dirt hills with a grass crust and a stone floor, plus water
/// dropped over the first valley to pool there.
fn build_terrain(world: &mut World) {
    let map = world.tilemap_mut();
    let (w, h) = (map.width(), map.height());
    let base = h / 2;
    for x in 0..w {
        let surface = base + ((x as f64 / 9.0).sin() * 3.0).round() as i32;
        map.set_tile((x, surface), Some(TileId::GRASS), true);
        map.fill((x, surface + 1), (x, h - 2), TileId::DIRT);
        map.set_tile((x, h - 1), Some(TileId::STONE), true);
    }
    for x in 12..18 {
        map.set_tile((x, base - 8), Some(TileId::WATER), true);
    }
}

/// Scripted input for `frame`: run right, hop every second, and keep firing
/// at a point ahead of the player.
fn script(frame: u64, player_pos: Vec2) -> InputSnapshot {
    let mut input = InputSnapshot::new().with_key(Key::MoveRight);
    if frame % 60 == 0 {
        input.press(Key::Jump);
    }
    if frame % 300 == 150 {
        input.press(Key::DashRight);
    }
    if frame > 600 {
        input = input.with_mouse(MouseButton::Left, player_pos + Vec2::new(6.0, 1.0));
    }
    input
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            WorldConfig::from_json(&json).with_context(|| format!("parsing config {path}"))?
        }
        None => WorldConfig {
            width: 128,
            height: 48,
            seed: 42,
            ..WorldConfig::default()
        },
    };

    let mut world = World::new(config).context("building world")?;
    build_terrain(&mut world);

    let counts: Rc<RefCell<BTreeMap<&'static str, usize>>> = Rc::default();
    for kind in [
        EventKind::PlayerJump,
        EventKind::PlayerDash,
        EventKind::PlayerGrounded,
        EventKind::ProjectileExplosion,
    ] {
        let counts = Rc::clone(&counts);
        world.subscribe(kind, move |event| {
            *counts.borrow_mut().entry(event.kind.name()).or_default() += 1;
        });
    }

    let spawn = world.config().player_spawn();
    let player = world.spawn_player(Some(spawn))?;
    for i in 0..6 {
        world.spawn_enemy(spawn + Vec2::new(12.0 + 6.0 * i as f64, -2.0))?;
    }

    let mut slowest = std::time::Duration::ZERO;
    for frame in 0..FRAMES {
        let pos = world.entity(player).map_or(spawn, |e| e.pos);
        world.set_input(script(frame, pos));
        let diag = world.update(DT).clone();
        slowest = slowest.max(diag.total_time);

        if diag.frame % 300 == 0 {
            let breakdown: Vec<String> = diag
                .system_times
                .iter()
                .map(|(name, t)| format!("{name}={}us", t.as_micros()))
                .collect();
            tracing::info!(
                frame = diag.frame,
                entities = world.entities().len(),
                particles = world.particles().len(),
                water = world.tilemap().water_cells(),
                systems = %breakdown.join(" "),
                "checkpoint"
            );
        }
    }

    let camera = world.camera(40.0, 22.0);
    let mut frame_draws = DrawList::new();
    world.draw(&camera, &mut frame_draws);

    let end = world.entity(player).map(|e| e.pos);
    println!("simulated {:.1}s in {} frames", world.sim_time(), world.frame_count());
    println!("player finished at {end:?}");
    println!("slowest frame: {}us", slowest.as_micros());
    println!(
        "draw calls: {} ({} tiles)",
        frame_draws.len(),
        frame_draws.tiles()
    );
    for (name, count) in counts.borrow().iter() {
        println!("  {name}: {count}");
    }
    for kind in [TileId::GRASS, TileId::DIRT, TileId::STONE] {
        let name = world
            .tilemap()
            .tile_set()
            .get(kind)
            .map_or("?", |t| t.name.as_str());
        println!("  mined {name}: {}", world.inventory().count_of(kind));
    }
    Ok(())
}

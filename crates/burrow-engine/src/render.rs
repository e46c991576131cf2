//! Render components and the draw-command surface.
//!
//! The core never touches pixels. Each frame the world walks the visible
//! tiles, the render components, particles and (in debug mode) physics
//! forces, and hands primitive draw calls in world tile units to a
//! [`Canvas`]. A platform layer implements `Canvas` over its own renderer;
//! [`DrawList`] simply records the calls for headless runs and tests.

use burrow_ecs::component::{Component, ComponentKind};
use burrow_ecs::entity::EntityId;
use burrow_ecs::system::ComponentSystem;
use burrow_ecs::EcsError;

use crate::entity::Entities;
use crate::math::{Rect, Vec2};
use crate::tilemap::{Cell, Tilemap};
use crate::tiles::TileId;

/// RGBA, each channel in `0.0..=1.0`.
pub type Color = [f32; 4];

pub const COLOR_WHITE: Color = [1.0, 1.0, 1.0, 1.0];
/// Velocity arrows in debug mode.
pub const COLOR_VELOCITY: Color = [0.0, 0.0, 1.0, 1.0];

/// Debug arrows are drawn this many tiles long per unit of force.
const FORCE_LINE_SCALE: f64 = 0.25;

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Drawing surface, in world tile coordinates.
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: &str, rect: Rect);
    /// `water_level` is zero for non-fluid tiles.
    fn draw_tile(&mut self, cell: Cell, tile: TileId, water_level: f64);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite { sprite: String, rect: Rect },
    Tile { cell: Cell, tile: TileId, water_level: f64 },
    Rect { rect: Rect, color: Color },
    Line { from: Vec2, to: Vec2, color: Color },
}

/// A [`Canvas`] that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn tiles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Tile { .. }))
            .count()
    }
}

impl Canvas for DrawList {
    fn draw_sprite(&mut self, sprite: &str, rect: Rect) {
        self.commands.push(DrawCommand::Sprite {
            sprite: sprite.to_owned(),
            rect,
        });
    }

    fn draw_tile(&mut self, cell: Cell, tile: TileId, water_level: f64) {
        self.commands.push(DrawCommand::Tile {
            cell,
            tile,
            water_level,
        });
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }
}

// ---------------------------------------------------------------------------
// Camera2D
// ---------------------------------------------------------------------------

/// Visible region, centred on `center`, in tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub center: Vec2,
    pub width: f64,
    pub height: f64,
}

impl Camera2D {
    pub fn new(center: Vec2, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    pub fn view(&self) -> Rect {
        Rect::centered(self.center, self.width, self.height)
    }

    /// Inclusive range of tile cells touching the view.
    pub fn visible_cells(&self) -> (Cell, Cell) {
        let view = self.view();
        (
            Vec2::new(view.left(), view.top()).cell(),
            Vec2::new(view.right(), view.bottom()).cell(),
        )
    }

    pub fn sees(&self, rect: &Rect) -> bool {
        self.view().intersects(rect)
    }
}

/// Draw every occupied tile in the camera's view.
pub fn draw_tilemap(tilemap: &Tilemap, camera: &Camera2D, canvas: &mut dyn Canvas) {
    let (from, to) = camera.visible_cells();
    for (cell, tile) in tilemap.iter_region(from, to) {
        canvas.draw_tile(cell, tile, tilemap.water_level(cell));
    }
}

/// Arrows for each force of the last physics step, coloured by direction,
/// plus the velocity in blue.
pub fn draw_forces(pos: Vec2, vel: Vec2, forces: &[Vec2], canvas: &mut dyn Canvas) {
    for &force in forces {
        let Some(dir) = force.try_normalize() else {
            continue;
        };
        let color = [dir.x.abs() as f32, dir.y.abs() as f32, 0.0, 1.0];
        canvas.draw_line(pos, pos + force * FORCE_LINE_SCALE, color);
    }
    canvas.draw_line(pos, pos + vel * FORCE_LINE_SCALE, COLOR_VELOCITY);
}

// ---------------------------------------------------------------------------
// RenderComponent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Sprite {
    /// Named image, resolved by the platform layer.
    Image(String),
    Solid(Color),
}

/// Draws its owner as a sprite of `size` tiles centred on the owner.
#[derive(Debug, Clone)]
pub struct RenderComponent {
    owner: EntityId,
    alive: bool,
    pub sprite: Sprite,
    pub size: Vec2,
}

impl RenderComponent {
    pub fn new(owner: EntityId, sprite: Sprite, size: Vec2) -> Self {
        Self {
            owner,
            alive: true,
            sprite,
            size,
        }
    }
}

impl Component for RenderComponent {
    const KIND: ComponentKind = ComponentKind::Render;

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

#[derive(Debug, Default)]
pub struct RenderSystem {
    components: ComponentSystem<RenderComponent>,
}

impl RenderSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: RenderComponent) -> Result<(), EcsError> {
        self.components.insert(component)
    }

    pub fn get(&self, owner: EntityId) -> Option<&RenderComponent> {
        self.components.get(owner)
    }

    pub fn kill(&mut self, owner: EntityId) -> bool {
        self.components.kill(owner)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Drop components that were killed or whose owner is gone. Returns how
    /// many were removed.
    pub fn update(&mut self, entities: &Entities) -> usize {
        self.components.run(|component| entities.is_alive(component.owner))
    }

    /// Draw every live component whose owner is in view, in registration
    /// order, and drop components whose owner is gone.
    pub fn draw(&mut self, entities: &Entities, camera: &Camera2D, canvas: &mut dyn Canvas) -> usize {
        self.components.run(|component| {
            let Some(entity) = entities.get(component.owner) else {
                return false;
            };
            let rect = Rect::centered(entity.pos, component.size.x, component.size.y);
            if camera.sees(&rect) {
                match &component.sprite {
                    Sprite::Image(name) => canvas.draw_sprite(name, rect),
                    Sprite::Solid(color) => canvas.draw_rect(rect, *color),
                }
            }
            true
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Tile definitions.
//!
//! A tile is static terrain content shared by every cell that holds it: a
//! sprite reference, an optional collision rect local to its cell, and how
//! long it takes to break.

use serde::{Deserialize, Serialize};

use crate::math::Rect;

/// Index into a [`TileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u16);

impl TileId {
    pub const DIRT: TileId = TileId(0);
    pub const GRASS: TileId = TileId(1);
    pub const STONE: TileId = TileId(2);
    pub const GRASS_PLANT: TileId = TileId(3);
    pub const WOOD: TileId = TileId(4);
    pub const LEAF: TileId = TileId(5);
    pub const WATER: TileId = TileId(6);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub name: String,
    /// Sprite key handed to the renderer.
    pub sprite: String,
    /// Solid area relative to the cell's top-left corner; `None` for
    /// decorative or fluid tiles.
    pub collision: Option<Rect>,
    /// Seconds of continuous mining needed to break the tile.
    pub break_time: f64,
    pub max_stack: u32,
    /// Fluid tiles carry a level and flow each frame.
    pub fluid: bool,
}

impl Tile {
    pub fn is_solid(&self) -> bool {
        self.collision.is_some()
    }
}

/// Registry of tile definitions, indexed by [`TileId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

impl TileSet {
    /// The game's built-in tiles, with ids matching the [`TileId`] constants.
    pub fn standard() -> Self {
        let full = Some(Rect::new(0.0, 0.0, 1.0, 1.0));
        let mut set = TileSet { tiles: Vec::new() };
        set.push("Dirt", "textures/1.png", full, 0.5, false);
        set.push("Grass", "textures/7.png", full, 0.5, false);
        set.push("Stone", "textures/3.png", full, 0.5, false);
        set.push("Grass Plant", "textures/8.png", None, 0.1, false);
        set.push("Wood", "textures/5.png", full, 0.5, false);
        set.push("Leaf", "textures/9.png", full, 0.2, false);
        set.push("Water", "water", None, 0.5, true);
        set
    }

    fn push(
        &mut self,
        name: &str,
        sprite: &str,
        collision: Option<Rect>,
        break_time: f64,
        fluid: bool,
    ) -> TileId {
        let id = TileId(self.tiles.len() as u16);
        self.tiles.push(Tile {
            id,
            name: name.to_owned(),
            sprite: sprite.to_owned(),
            collision,
            break_time,
            max_stack: 64,
            fluid,
        });
        id
    }

    /// Register a custom tile and return its id.
    pub fn register(&mut self, mut tile: Tile) -> TileId {
        let id = TileId(self.tiles.len() as u16);
        tile.id = id;
        self.tiles.push(tile);
        id
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ids_line_up() {
        let set = TileSet::standard();
        assert_eq!(set.get(TileId::STONE).unwrap().name, "Stone");
        assert_eq!(set.get(TileId::WATER).unwrap().name, "Water");
        assert!(set.get(TileId::WATER).unwrap().fluid);
        assert!(!set.get(TileId::GRASS_PLANT).unwrap().is_solid());
        assert!(set.get(TileId::DIRT).unwrap().is_solid());
        assert_eq!(set.get(TileId::LEAF).unwrap().break_time, 0.2);
    }

    #[test]
    fn register_assigns_next_id() {
        let mut set = TileSet::standard();
        let base = set.get(TileId::STONE).unwrap().clone();
        let id = set.register(Tile {
            name: "Obsidian".into(),
            break_time: 5.0,
            ..base
        });
        assert_eq!(id, TileId(7));
        assert_eq!(set.get(id).unwrap().id, id);
    }
}

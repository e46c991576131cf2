//! Fixed-size tile grid and its collision surface.
//!
//! Cells are addressed by integer `(x, y)` tile coordinates; anything outside
//! `0..width` x `0..height` reads as empty and rejects writes. Fluid cells
//! additionally carry a level in `0..=MAX_WATER_LEVEL + 2`, advanced by
//! [`Tilemap::update`].

use std::collections::HashMap;

use crate::math::{Rect, Vec2};
use crate::tiles::{Tile, TileId, TileSet};

/// A full water cell.
pub const MAX_WATER_LEVEL: f64 = 4.0;
/// A cell merged into from above may hold this much over full.
const WATER_OVERFILL: f64 = 2.0;
/// Water thinner than this evaporates.
const MIN_WATER_LEVEL: f64 = 0.05;
/// Largest supported width or height, in tiles.
pub const MAX_MAP_SIDE: u32 = 16_384;

pub type Cell = (i32, i32);

#[derive(Debug, Clone)]
pub struct Tilemap {
    width: i32,
    height: i32,
    cells: Vec<Option<TileId>>,
    water: HashMap<Cell, f64>,
    tiles: TileSet,
}

impl Tilemap {
    /// An empty map using the standard tile set.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_tiles(width, height, TileSet::standard())
    }

    /// An empty map using `tiles`. Sides above [`MAX_MAP_SIDE`] are clamped.
    pub fn with_tiles(width: u32, height: u32, tiles: TileSet) -> Self {
        let width = clamp_side(width);
        let height = clamp_side(height);
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            water: HashMap::new(),
            tiles,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_set(&self) -> &TileSet {
        &self.tiles
    }

    pub fn is_inside(&self, (x, y): Cell) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.is_inside(cell)
            .then(|| cell.1 as usize * self.width as usize + cell.0 as usize)
    }

    /// The cell holding world position `pos`, if it is on the map.
    pub fn tile_coords(&self, pos: Vec2) -> Option<Cell> {
        let cell = pos.cell();
        self.is_inside(cell).then_some(cell)
    }

    pub fn get_tile_id(&self, cell: Cell) -> Option<TileId> {
        self.cells[self.index(cell)?]
    }

    /// The tile at `cell`, or `None` when empty or off the map.
    pub fn get_tile(&self, cell: Cell) -> Option<&Tile> {
        self.tiles.get(self.get_tile_id(cell)?)
    }

    /// Write `tile` (or clear with `None`) at `cell`.
    ///
    /// With `replace == false` only empty cells are written. Returns whether
    /// the cell was written; off-map writes and ids missing from the tile set
    /// always return `false`.
    pub fn set_tile(&mut self, cell: Cell, tile: Option<TileId>, replace: bool) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let fluid = match tile {
            Some(id) => match self.tiles.get(id) {
                Some(t) => t.fluid,
                None => {
                    tracing::warn!(tile = id.0, x = cell.0, y = cell.1, "unknown tile id");
                    return false;
                }
            },
            None => false,
        };
        if !replace && self.cells[index].is_some() {
            return false;
        }
        self.cells[index] = tile;
        if fluid {
            self.water.insert(cell, MAX_WATER_LEVEL);
        } else {
            self.water.remove(&cell);
        }
        true
    }

    /// Stamp a block of rows with its top-left corner at `origin`. Returns
    /// how many cells were written.
    pub fn set_tiles(&mut self, origin: Cell, rows: &[Vec<Option<TileId>>], replace: bool) -> usize {
        let mut written = 0;
        for (dy, row) in rows.iter().enumerate() {
            for (dx, &tile) in row.iter().enumerate() {
                let cell = (origin.0 + dx as i32, origin.1 + dy as i32);
                if self.set_tile(cell, tile, replace) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Fill the inclusive rectangle `from..=to` with `tile`.
    pub fn fill(&mut self, from: Cell, to: Cell, tile: TileId) {
        for y in from.1.min(to.1)..=from.1.max(to.1) {
            for x in from.0.min(to.0)..=from.0.max(to.0) {
                self.set_tile((x, y), Some(tile), true);
            }
        }
    }

    /// Whether `cell` holds a tile with a collision rect.
    pub fn is_tile_collidable(&self, cell: Cell) -> bool {
        self.get_tile(cell).is_some_and(Tile::is_solid)
    }

    /// World-space collision rect of the tile at `cell`, if solid.
    pub fn collision_rect(&self, cell: Cell) -> Option<Rect> {
        let local = self.get_tile(cell)?.collision?;
        Some(local.moved(cell.0 as f64, cell.1 as f64))
    }

    /// Solid tile rects overlapping `rect`.
    ///
    /// Only the cells under `rect`'s four corners are examined, which is
    /// exact for rects no larger than one tile.
    pub fn get_collisions(&self, rect: &Rect) -> Vec<Rect> {
        rect.corner_cells()
            .iter()
            .filter_map(|cell| self.collision_rect(cell))
            .filter(|tile| tile.intersects(rect))
            .collect()
    }

    /// Water level at `cell`; zero when there is no water.
    pub fn water_level(&self, cell: Cell) -> f64 {
        self.water.get(&cell).copied().unwrap_or(0.0)
    }

    pub fn water_cells(&self) -> usize {
        self.water.len()
    }

    /// Advance fluid cells one step.
    ///
    /// Cells are processed bottom row first. Water falls into an empty or
    /// non-solid cell below, tops up partially filled water below, and when
    /// resting on something spreads toward the lower of its two side
    /// neighbours.
    pub fn update(&mut self) {
        if self.water.is_empty() {
            return;
        }
        let mut order: Vec<Cell> = self.water.keys().copied().collect();
        order.sort_by_key(|&(x, y)| (std::cmp::Reverse(y), x));

        for cell in order {
            if !self.water.contains_key(&cell) {
                continue;
            }
            let Some(current) = self.flow_down(cell) else {
                continue;
            };
            if let Some(supported) = current {
                self.spread(supported);
            }
        }
    }

    /// Returns `None` if the water moved or vanished, `Some(Some(cell))` if it
    /// is resting at `cell`, `Some(None)` if it stayed but is not supported.
    fn flow_down(&mut self, cell: Cell) -> Option<Option<Cell>> {
        let below = (cell.0, cell.1 + 1);
        let level = self.water_level(cell);

        if self.water.contains_key(&below) {
            let below_level = self.water_level(below);
            if below_level >= MAX_WATER_LEVEL {
                return Some(Some(cell));
            }
            let total = below_level + level;
            let merged = total.min(MAX_WATER_LEVEL + WATER_OVERFILL);
            self.water.insert(below, merged);
            self.set_level(cell, total - merged);
            return self.water.contains_key(&cell).then_some(None);
        }

        if !self.is_inside(below) || self.is_tile_collidable(below) {
            return Some(Some(cell));
        }

        self.set_tile(below, Some(TileId::WATER), true);
        self.water.insert(below, level);
        self.set_tile(cell, None, true);
        None
    }

    fn spread(&mut self, cell: Cell) {
        let mut sides = [(cell.0 + 1, cell.1), (cell.0 - 1, cell.1)];
        sides.sort_by(|a, b| self.water_level(*a).total_cmp(&self.water_level(*b)));

        for side in sides {
            if !self.is_inside(side) {
                continue;
            }
            if self.water.contains_key(&side) {
                let total = self.water_level(side) + self.water_level(cell);
                let half = total / 2.0;
                self.water.insert(side, total - half);
                self.set_level(cell, half);
                break;
            }
            if !self.is_tile_collidable(side) {
                let half = self.water_level(cell) / 2.0;
                if half < MIN_WATER_LEVEL {
                    break;
                }
                self.set_tile(side, Some(TileId::WATER), true);
                self.water.insert(side, half);
                self.set_level(cell, half);
                break;
            }
        }
    }

    fn set_level(&mut self, cell: Cell, level: f64) {
        if level < MIN_WATER_LEVEL {
            self.set_tile(cell, None, true);
        } else {
            self.water.insert(cell, level);
        }
    }

    /// Occupied cells inside the inclusive region, row by row.
    pub fn iter_region(&self, from: Cell, to: Cell) -> impl Iterator<Item = (Cell, TileId)> + '_ {
        let x0 = from.0.max(0);
        let y0 = from.1.max(0);
        let x1 = to.0.min(self.width - 1);
        let y1 = to.1.min(self.height - 1);
        (y0..=y1).flat_map(move |y| {
            (x0..=x1).filter_map(move |x| self.get_tile_id((x, y)).map(|id| ((x, y), id)))
        })
    }
}

fn clamp_side(side: u32) -> i32 {
    if side > MAX_MAP_SIDE {
        tracing::warn!(side, max = MAX_MAP_SIDE, "tilemap side clamped");
    }
    i32::try_from(side.min(MAX_MAP_SIDE)).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

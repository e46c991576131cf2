//! Item stacks and the player's inventory.
//!
//! Every item is a tile; a stack holds up to that tile's `max_stack`. The
//! first `hotbar_size` slots form the hotbar, and one hotbar slot is selected
//! as the block to place.

use serde::{Deserialize, Serialize};

use crate::tiles::TileId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Option<TileId>,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: TileId, count: u32) -> Self {
        Self {
            item: Some(item),
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none() || self.count == 0
    }

    pub fn clear(&mut self) {
        *self = ItemStack::default();
    }

    /// Take up to `count` items, clearing the stack when it runs out.
    pub fn remove(&mut self, count: u32) -> u32 {
        let taken = count.min(self.count);
        self.count -= taken;
        if self.count == 0 {
            self.clear();
        }
        taken
    }

    /// Move as much of `other` into this stack as fits. `other` keeps the
    /// remainder.
    pub fn combine(&mut self, other: &mut ItemStack, max_stack: u32) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.item = other.item;
            self.count = 0;
        } else if self.item != other.item {
            return;
        }
        let moved = other.count.min(max_stack.saturating_sub(self.count));
        self.count += moved;
        other.remove(moved);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
    hotbar_size: usize,
    selected: usize,
}

impl Inventory {
    pub fn new(size: usize, hotbar_size: usize) -> Self {
        Self {
            slots: vec![ItemStack::default(); size],
            hotbar_size: hotbar_size.min(size),
            selected: 0,
        }
    }

    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    pub fn hotbar(&self) -> &[ItemStack] {
        &self.slots[..self.hotbar_size]
    }

    /// Add `count` of `item`, topping up matching stacks before filling empty
    /// slots. Returns how many did not fit.
    pub fn add(&mut self, item: TileId, count: u32, max_stack: u32) -> u32 {
        let mut incoming = ItemStack::new(item, count);
        for slot in self.slots.iter_mut().filter(|s| s.item == Some(item)) {
            slot.combine(&mut incoming, max_stack);
        }
        for slot in self.slots.iter_mut().filter(|s| s.is_empty()) {
            if incoming.is_empty() {
                break;
            }
            slot.combine(&mut incoming, max_stack);
        }
        if !incoming.is_empty() {
            tracing::debug!(item = item.0, lost = incoming.count, "inventory full");
        }
        incoming.count
    }

    pub fn count_of(&self, item: TileId) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item == Some(item))
            .map(|s| s.count)
            .sum()
    }

    /// Select hotbar slot `index`. Out of range selections are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.hotbar_size {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&ItemStack> {
        self.hotbar().get(self.selected)
    }

    /// The selected item, if the selected slot is non-empty.
    pub fn selected_item(&self) -> Option<TileId> {
        self.selected().filter(|s| !s.is_empty()).and_then(|s| s.item)
    }

    /// Consume one of the selected item.
    pub fn remove_one_selected(&mut self) -> Option<TileId> {
        let slot = self.slots[..self.hotbar_size].get_mut(self.selected)?;
        let item = slot.item.filter(|_| !slot.is_empty())?;
        slot.remove(1);
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_respects_max_stack() {
        let mut a = ItemStack::new(TileId::DIRT, 60);
        let mut b = ItemStack::new(TileId::DIRT, 10);
        a.combine(&mut b, 64);
        assert_eq!(a.count, 64);
        assert_eq!(b.count, 6);

        let mut c = ItemStack::new(TileId::STONE, 3);
        a.combine(&mut c, 64);
        assert_eq!(c.count, 3, "different items never merge");
    }

    #[test]
    fn add_tops_up_matching_stacks_first() {
        let mut inv = Inventory::new(4, 2);
        assert_eq!(inv.add(TileId::DIRT, 10, 64), 0);
        assert_eq!(inv.add(TileId::STONE, 1, 64), 0);
        assert_eq!(inv.add(TileId::DIRT, 5, 64), 0);
        assert_eq!(inv.slots()[0], ItemStack::new(TileId::DIRT, 15));
        assert_eq!(inv.slots()[1], ItemStack::new(TileId::STONE, 1));
    }

    #[test]
    fn add_reports_overflow() {
        let mut inv = Inventory::new(2, 1);
        assert_eq!(inv.add(TileId::WOOD, 130, 64), 2);
        assert_eq!(inv.count_of(TileId::WOOD), 128);
    }

    #[test]
    fn selection_lives_in_the_hotbar() {
        let mut inv = Inventory::new(3, 2);
        inv.add(TileId::LEAF, 2, 64);
        inv.add(TileId::WOOD, 1, 64);
        inv.add(TileId::DIRT, 64, 64);

        assert_eq!(inv.hotbar().len(), 2);
        assert_eq!(inv.selected_item(), Some(TileId::LEAF));
        assert!(inv.select(1));
        assert_eq!(inv.selected_item(), Some(TileId::WOOD));
        assert!(!inv.select(2), "slot 2 is outside the hotbar");

        assert_eq!(inv.remove_one_selected(), Some(TileId::WOOD));
        assert_eq!(inv.remove_one_selected(), None);
        assert!(inv.hotbar()[1].is_empty());
        assert_eq!(inv.count_of(TileId::DIRT), 64);
    }
}

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::shared::*;
use crate::world::Sim;

/// Items set aside in the crafting panel. Plain stackable items only;
/// meta-bearing items never enter the stash.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct CraftingStash {
    items: BTreeMap<ItemId, u32>,
}

impl CraftingStash {
    pub fn deposit(&mut self, id: &str, qty: u32) {
        if qty == 0 {
            return;
        }
        *self.items.entry(id.to_string()).or_insert(0) += qty;
    }

    /// Take one unit back out. False if none is stashed.
    pub fn withdraw(&mut self, id: &str) -> bool {
        let Some(qty) = self.items.get_mut(id) else {
            return false;
        };
        *qty -= 1;
        if *qty == 0 {
            self.items.remove(id);
        }
        true
    }

    /// Remove `qty` units, all or nothing.
    pub fn consume(&mut self, id: &str, qty: u32) -> bool {
        if self.count(id) < qty {
            return false;
        }
        for _ in 0..qty {
            self.withdraw(id);
        }
        true
    }

    pub fn count(&self, id: &str) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// Empty the stash, returning what it held.
    pub fn clear(&mut self) -> Vec<(ItemId, u32)> {
        std::mem::take(&mut self.items).into_iter().collect()
    }
}

/// Move one unit from the inventory into the stash.
pub fn deposit_from_inventory(sim: &mut Sim, id: &str) -> bool {
    let Some(stack) = sim.inventory.find(id) else {
        return false;
    };
    if stack.meta.is_some() {
        sim.outbox.toast("That can't be used for crafting");
        return false;
    }
    if sim.inventory.take_one(id).is_none() {
        return false;
    }
    sim.stash.deposit(id, 1);
    sim.inventory_changed();
    sim.outbox.push(Notification::CraftChanged);
    true
}

/// Move one unit from the stash back into the inventory.
pub fn withdraw_to_inventory(sim: &mut Sim, id: &str) -> bool {
    if sim.stash.count(id) == 0 {
        return false;
    }
    let max_stack = sim.catalog.max_stack(id);
    if !sim.inventory.add(id, 1, max_stack, None) {
        sim.outbox.toast("Inventory is full");
        return false;
    }
    sim.stash.withdraw(id);
    sim.inventory_changed();
    sim.outbox.push(Notification::CraftChanged);
    true
}

/// Put everything in the stash back into the inventory. Whatever does not
/// fit lands at the player's feet. Returns the number of units dropped.
pub fn return_stash_to_inventory(sim: &mut Sim) -> u32 {
    if sim.stash.is_empty() {
        return 0;
    }
    let mut spilled = 0;
    for (id, qty) in sim.stash.clear() {
        let max_stack = sim.catalog.max_stack(&id);
        let before = sim.inventory.count(&id);
        sim.inventory.add(&id, qty, max_stack, None);
        let inserted = sim.inventory.count(&id).saturating_sub(before).min(qty);
        let leftover = qty - inserted;
        if leftover > 0 {
            let pos = sim.player.pos;
            sim.spawn_drop(&id, leftover, pos, None, None);
            spilled += leftover;
        }
    }
    sim.inventory_changed();
    sim.outbox.push(Notification::CraftChanged);
    if spilled > 0 {
        warn!("[Crafting] inventory full, dropped {spilled} stashed items");
        sim.outbox.toast("Inventory full: some items were dropped");
    }
    spilled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameBalance;
    use crate::entities::{EntityBody, EntityKind};
    use crate::world::Sandbox;

    fn ground_qty(sb: &Sandbox, id: &str) -> u32 {
        sb.entities
            .iter()
            .filter_map(|e| match &e.body {
                EntityBody::Drop(drop) if drop.item == id => Some(drop.qty),
                _ => None,
            })
            .sum()
    }

    #[test]
    fn test_stash_counts() {
        let mut stash = CraftingStash::default();
        stash.deposit("wood", 3);
        assert!(stash.withdraw("wood"));
        assert_eq!(stash.count("wood"), 2);
        assert!(!stash.consume("wood", 3), "all or nothing");
        assert!(stash.consume("wood", 2));
        assert!(stash.is_empty());
        assert!(!stash.withdraw("wood"));
    }

    #[test]
    fn test_round_trip_returns_everything() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.inventory.add("wood", 7, 50, None);
        sb.inventory.add("rockshard", 2, 50, None);
        for _ in 0..5 {
            assert!(deposit_from_inventory(&mut sb.sim(), "wood"));
        }
        assert!(deposit_from_inventory(&mut sb.sim(), "rockshard"));
        assert_eq!(sb.inventory.count("wood"), 2);
        assert_eq!(sb.stash.count("wood"), 5);

        assert_eq!(return_stash_to_inventory(&mut sb.sim()), 0);
        assert_eq!(sb.inventory.count("wood"), 7);
        assert_eq!(sb.inventory.count("rockshard"), 2);
        assert!(sb.stash.is_empty());
    }

    #[test]
    fn test_round_trip_spills_overflow() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.stash.deposit("wood", 12);
        for _ in 0..PLAYER_INVENTORY_SLOTS {
            sb.inventory.add("axe", 1, 1, None);
        }
        assert_eq!(return_stash_to_inventory(&mut sb.sim()), 12);
        assert_eq!(ground_qty(&sb, "wood"), 12, "total conserved on the ground");
        assert_eq!(sb.entities.count_kind(EntityKind::ItemDrop), 1);
    }

    #[test]
    fn test_meta_items_stay_out_of_stash() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.inventory
            .add("chest", 1, 1, Some(ItemMeta::Container(Inventory::with_slots(CHEST_SLOTS))));
        assert!(!deposit_from_inventory(&mut sb.sim(), "chest"));
        assert_eq!(sb.inventory.count("chest"), 1);
    }
}

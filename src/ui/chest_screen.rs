use bevy::prelude::*;

use crate::shared::*;
use crate::world::Sim;

/// Show the chest panel for `chest`. Opening the same chest again is a
/// no-op.
pub fn open_chest(sim: &mut Sim, chest: EntityId) {
    if sim.panels.open_chest == Some(chest) {
        return;
    }
    if sim.panels.open_chest.is_some() {
        close_chest(sim);
    }
    sim.panels.open_chest = Some(chest);
    sim.outbox.push(Notification::ChestOpen(chest));
}

pub fn close_chest(sim: &mut Sim) {
    if sim.panels.open_chest.take().is_some() {
        sim.outbox.push(Notification::ChestClose);
    }
}

/// Close the chest panel once its chest is gone or out of reach.
pub fn close_unreachable_chest(sim: &mut Sim) {
    let Some(id) = sim.panels.open_chest else {
        return;
    };
    let reachable = sim
        .entities
        .get(id)
        .is_some_and(|e| {
            e.is_alive() && e.pos().distance(sim.player.pos) <= sim.tuning.interact_range
        });
    if !reachable {
        debug!("[UI] chest {id} out of reach, closing");
        close_chest(sim);
    }
}

fn is_container(sim: &Sim, id: &str) -> bool {
    sim.catalog.has_tag(id, ItemTag::Container)
}

/// Move one unit between the player and the open chest.
pub fn transfer(sim: &mut Sim, id: &str, direction: TransferDirection) -> bool {
    let Some(chest_id) = sim.panels.open_chest else {
        return false;
    };
    let moved = match direction {
        TransferDirection::Stow => stow(sim, chest_id, id),
        TransferDirection::Retrieve => retrieve(sim, chest_id, id),
    };
    if moved {
        sim.outbox.push(Notification::ChestChanged(chest_id));
    }
    moved
}

fn stow(sim: &mut Sim, chest_id: EntityId, id: &str) -> bool {
    if is_container(sim, id) {
        sim.outbox.toast("A chest can't go inside a chest");
        return false;
    }
    let max_stack = sim.catalog.max_stack(id);
    let Some(stack) = sim.inventory.take_one(id) else {
        return false;
    };
    let stored = sim
        .entities
        .get_mut(chest_id)
        .and_then(|e| e.as_chest_mut())
        .is_some_and(|chest| chest.inventory.add(id, 1, max_stack, stack.meta.clone()));
    if !stored {
        sim.inventory.add(id, 1, max_stack, stack.meta);
        sim.outbox.toast("Chest is full");
        return false;
    }
    sim.inventory_changed();
    true
}

fn retrieve(sim: &mut Sim, chest_id: EntityId, id: &str) -> bool {
    let max_stack = sim.catalog.max_stack(id);
    let Some(stack) = sim
        .entities
        .get_mut(chest_id)
        .and_then(|e| e.as_chest_mut())
        .and_then(|chest| chest.inventory.take_one(id))
    else {
        return false;
    };

    let to_wallet = sim.catalog.has_tag(id, ItemTag::Currency);
    let store = if to_wallet { &mut *sim.wallet } else { &mut *sim.inventory };
    if store.add(id, 1, max_stack, stack.meta.clone()) {
        if to_wallet {
            sim.outbox.push(Notification::WalletChanged);
        } else {
            sim.inventory_changed();
        }
        return true;
    }

    if let Some(chest) = sim.entities.get_mut(chest_id).and_then(|e| e.as_chest_mut()) {
        chest.inventory.add(id, 1, max_stack, stack.meta);
    }
    sim.outbox
        .toast(if to_wallet { "Wallet is full" } else { "Inventory is full" });
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameBalance;
    use crate::entities::{Chest, EntityBody};
    use crate::world::Sandbox;

    fn with_open_chest() -> (Sandbox, EntityId) {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.player.pos = Vec2::new(600.0, 600.0);
        let mut contents = Inventory::with_slots(CHEST_SLOTS);
        contents.add("wood", 10, 50, None);
        contents.add("coin", 12, 999, None);
        let chest = sb
            .entities
            .spawn(Vec2::new(630.0, 600.0), EntityBody::Chest(Chest::new(contents)));
        open_chest(&mut sb.sim(), chest);
        (sb, chest)
    }

    fn chest_count(sb: &Sandbox, chest: EntityId, id: &str) -> u32 {
        sb.entities
            .get(chest)
            .and_then(|e| e.as_chest())
            .map(|c| c.inventory.count(id))
            .unwrap_or(0)
    }

    #[test]
    fn test_chest_panel_is_announced_by_chest_events_only() {
        let (mut sb, chest) = with_open_chest();
        close_chest(&mut sb.sim());
        let pending = sb.outbox.pending();
        assert!(pending.contains(&Notification::ChestOpen(chest)));
        assert!(pending.contains(&Notification::ChestClose));
        assert!(
            !pending
                .iter()
                .any(|n| matches!(n, Notification::PanelToggled { .. })),
            "inventory and wallet toggles are the only PanelToggled sources"
        );
    }

    #[test]
    fn test_retrieve_and_stow_one_at_a_time() {
        let (mut sb, chest) = with_open_chest();
        assert!(transfer(&mut sb.sim(), "wood", TransferDirection::Retrieve));
        assert_eq!(sb.inventory.count("wood"), 1);
        assert_eq!(chest_count(&sb, chest, "wood"), 9);

        assert!(transfer(&mut sb.sim(), "wood", TransferDirection::Stow));
        assert_eq!(sb.inventory.count("wood"), 0);
        assert_eq!(chest_count(&sb, chest, "wood"), 10);
        assert!(sb.outbox.pending().contains(&Notification::ChestChanged(chest)));
    }

    #[test]
    fn test_coins_come_out_into_wallet() {
        let (mut sb, chest) = with_open_chest();
        assert!(transfer(&mut sb.sim(), "coin", TransferDirection::Retrieve));
        assert_eq!(sb.wallet.count("coin"), 1);
        assert_eq!(chest_count(&sb, chest, "coin"), 11);
    }

    #[test]
    fn test_chest_cannot_hold_a_chest() {
        let (mut sb, _) = with_open_chest();
        sb.inventory
            .add("chest", 1, 1, Some(ItemMeta::Container(Inventory::with_slots(CHEST_SLOTS))));
        assert!(!transfer(&mut sb.sim(), "chest", TransferDirection::Stow));
        assert_eq!(sb.inventory.count("chest"), 1);
        assert!(sb
            .outbox
            .pending()
            .contains(&Notification::Toast("A chest can't go inside a chest".into())));
    }

    #[test]
    fn test_walking_away_closes_chest() {
        let (mut sb, _) = with_open_chest();
        sb.player.pos = Vec2::new(900.0, 600.0);
        close_unreachable_chest(&mut sb.sim());
        assert_eq!(sb.panels.open_chest, None);
        assert_eq!(sb.outbox.pending().last(), Some(&Notification::ChestClose));
    }
}

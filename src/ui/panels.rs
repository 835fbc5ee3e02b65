use crate::crafting::return_stash_to_inventory;
use crate::shared::*;
use crate::world::Sim;

use super::close_chest;

fn announce(sim: &mut Sim, panel: Panel, open: bool) {
    sim.outbox.push(Notification::PanelToggled { panel, open });
}

/// Flip the inventory panel. Any open chest closes; closing the panel
/// hands the crafting stash back.
pub fn toggle_inventory(sim: &mut Sim) {
    let open = !sim.panels.inventory_open;
    sim.panels.inventory_open = open;
    close_chest(sim);
    if !open {
        return_stash_to_inventory(sim);
    }
    announce(sim, Panel::Inventory, open);
}

pub fn toggle_wallet(sim: &mut Sim) {
    let open = !sim.panels.wallet_open;
    sim.panels.wallet_open = open;
    announce(sim, Panel::Wallet, open);
}

/// Close everything that is open.
pub fn close_all(sim: &mut Sim) {
    close_chest(sim);
    if sim.panels.inventory_open {
        sim.panels.inventory_open = false;
        return_stash_to_inventory(sim);
        announce(sim, Panel::Inventory, false);
    }
    if sim.panels.wallet_open {
        sim.panels.wallet_open = false;
        announce(sim, Panel::Wallet, false);
    }
}

pub fn apply_ui_action(sim: &mut Sim, action: UiActionEvent) {
    match action {
        UiActionEvent::ToggleInventory => toggle_inventory(sim),
        UiActionEvent::ToggleWallet => toggle_wallet(sim),
        UiActionEvent::Esc => close_all(sim),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameBalance;
    use crate::world::Sandbox;

    #[test]
    fn test_closing_inventory_restores_stash() {
        let mut sb = Sandbox::new(GameBalance::default());
        toggle_inventory(&mut sb.sim());
        assert!(sb.panels.inventory_open);
        sb.stash.deposit("wood", 3);

        toggle_inventory(&mut sb.sim());
        assert!(!sb.panels.inventory_open);
        assert_eq!(sb.inventory.count("wood"), 3);
        assert!(sb.stash.is_empty());
        assert_eq!(
            sb.outbox.pending().last(),
            Some(&Notification::PanelToggled {
                panel: Panel::Inventory,
                open: false
            })
        );
    }

    #[test]
    fn test_esc_closes_everything() {
        let mut sb = Sandbox::new(GameBalance::default());
        apply_ui_action(&mut sb.sim(), UiActionEvent::ToggleInventory);
        apply_ui_action(&mut sb.sim(), UiActionEvent::ToggleWallet);
        sb.panels.open_chest = Some(EntityId(99));
        sb.outbox.clear();

        apply_ui_action(&mut sb.sim(), UiActionEvent::Esc);
        assert!(!sb.panels.inventory_open && !sb.panels.wallet_open);
        assert_eq!(sb.panels.open_chest, None);
        assert_eq!(sb.outbox.pending().first(), Some(&Notification::ChestClose));
        assert_eq!(
            sb.outbox
                .pending()
                .iter()
                .filter(|n| matches!(n, Notification::PanelToggled { open: false, .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_esc_with_nothing_open_is_silent() {
        let mut sb = Sandbox::new(GameBalance::default());
        apply_ui_action(&mut sb.sim(), UiActionEvent::Esc);
        assert!(sb.outbox.pending().is_empty());
    }
}

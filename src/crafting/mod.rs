//! Crafting domain: the temporary crafting stash and recipe crafting.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::SimParams;

mod bench;
mod stash;

pub use bench::{craft, has_all_ingredients};
pub use stash::{
    deposit_from_inventory, return_stash_to_inventory, withdraw_to_inventory, CraftingStash,
};

pub struct CraftingPlugin;

impl Plugin for CraftingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CraftingStash>().add_systems(
            Update,
            (handle_stash_transfers, handle_craft_requests)
                .chain()
                .in_set(TickSet::Input),
        );
    }
}

pub fn handle_stash_transfers(mut events: EventReader<StashTransferEvent>, mut params: SimParams) {
    for event in events.read() {
        let mut sim = params.sim();
        match event.direction {
            TransferDirection::Stow => deposit_from_inventory(&mut sim, &event.id),
            TransferDirection::Retrieve => withdraw_to_inventory(&mut sim, &event.id),
        };
    }
}

pub fn handle_craft_requests(mut events: EventReader<CraftRequestEvent>, mut params: SimParams) {
    for event in events.read() {
        craft(&mut params.sim(), &event.recipe_id);
    }
}

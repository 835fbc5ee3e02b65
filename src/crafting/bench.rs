use bevy::prelude::*;

use crate::metabolism::Action;
use crate::shared::*;
use crate::world::Sim;

use super::CraftingStash;

/// Craft `recipe_id` from what is in the stash. The output goes to the
/// inventory; whatever does not fit is dropped at the player.
pub fn craft(sim: &mut Sim, recipe_id: &str) -> bool {
    let Some(recipe) = sim.recipes.get(recipe_id).cloned() else {
        warn!("[Crafting] recipe '{recipe_id}' not found");
        sim.outbox.toast("Unknown recipe");
        return false;
    };

    if !has_all_ingredients(sim.stash, &recipe) {
        let missing = missing_ingredients_description(sim.stash, &recipe, sim.catalog);
        debug!("[Crafting] cannot craft '{}': missing {missing}", recipe.id);
        sim.outbox.toast(format!("Missing materials: {missing}"));
        return false;
    }
    consume_ingredients(sim.stash, &recipe);

    let max_stack = sim.catalog.max_stack(&recipe.output);
    let before = sim.inventory.count(&recipe.output);
    sim.inventory.add(&recipe.output, recipe.output_qty, max_stack, None);
    let inserted = sim
        .inventory
        .count(&recipe.output)
        .saturating_sub(before)
        .min(recipe.output_qty);
    let leftover = recipe.output_qty - inserted;
    if leftover > 0 {
        let pos = sim.player.pos;
        sim.spawn_drop(&recipe.output, leftover, pos, None, None);
        sim.outbox.toast("Inventory full: dropped on the ground");
    }

    sim.metabolism.apply_action(Action::Craft, 1.0, sim.outbox);
    sim.inventory_changed();
    sim.outbox.push(Notification::CraftChanged);

    let name = sim.item_name(&recipe.output);
    let feedback = if recipe.output_qty > 1 {
        format!("Crafted {name} x{}", recipe.output_qty)
    } else {
        format!("Crafted {name}")
    };
    info!("[Crafting] {feedback}");
    sim.outbox.ping(feedback);
    true
}

// ──────────────────────────────────────────────────────────────────────────────
// HELPER FUNCTIONS
// ──────────────────────────────────────────────────────────────────────────────

/// Returns true if the stash holds every input of the recipe.
pub fn has_all_ingredients(stash: &CraftingStash, recipe: &Recipe) -> bool {
    recipe.inputs.iter().all(|(id, qty)| stash.count(id) >= *qty)
}

/// Returns a human-readable list of missing inputs.
fn missing_ingredients_description(
    stash: &CraftingStash,
    recipe: &Recipe,
    catalog: &ItemCatalog,
) -> String {
    let mut parts = Vec::new();
    for (item_id, qty) in &recipe.inputs {
        let have = stash.count(item_id);
        if have < *qty {
            parts.push(format!("{} (have {}/{})", catalog.name(item_id), have, qty));
        }
    }
    parts.join(", ")
}

pub fn consume_ingredients(stash: &mut CraftingStash, recipe: &Recipe) {
    for (item_id, qty) in &recipe.inputs {
        if !stash.consume(item_id, *qty) {
            warn!("[Crafting] could not consume {qty} '{item_id}'; stash may be inconsistent");
        }
    }
}

//! Click dispatch: what a left or right click does to the world.
//!
//! Left click acts on the nearest interactable in range. Right click
//! opens a chest, cooks, eats, or places, in that order.

use bevy::prelude::*;

use super::Sim;
use crate::entities::structures::cooked_form;
use crate::entities::{
    Campfire, Chest, DisplayProp, EntityBody, EntityKind, Interaction, Strike, Tree,
};
use crate::metabolism::Action;
use crate::shared::*;
use crate::ui;

/// The player's current hand, status multiplier and position as a strike.
pub fn player_strike(sim: &Sim) -> Strike {
    Strike {
        tooling: sim.catalog.tooling(sim.player.hand.as_deref()),
        multiplier: sim.metabolism.damage_multiplier(),
        from: sim.player.pos,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LEFT CLICK
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_primary_action(sim: &mut Sim) {
    let Some((target, distance)) = sim.interaction_target() else {
        return;
    };
    if distance > sim.tuning.interact_range {
        debug!("[World] nearest target {target} is {distance:.0}px away");
        return;
    }
    let Some(kind) = sim.entities.get(target).map(|e| e.kind()) else {
        return;
    };

    match kind {
        EntityKind::ItemDrop => pickup_drop(sim, target),
        EntityKind::Coin => pickup_coin(sim, target),
        EntityKind::Chest => pickup_chest(sim, target),
        EntityKind::Cow => attack(sim, target),
        EntityKind::Tree | EntityKind::Rock => {
            sim.metabolism.apply_action(Action::Break, 1.0, sim.outbox);
            strike(sim, target);
        }
        EntityKind::BerryBush
        | EntityKind::NutTree
        | EntityKind::Campfire
        | EntityKind::Display => {
            if strike(sim, target) == Some(Interaction::Dismantle) {
                sim.metabolism.apply_action(Action::Break, 1.0, sim.outbox);
            }
        }
        EntityKind::HitEffect => {}
    }
}

fn strike(sim: &mut Sim, target: EntityId) -> Option<Interaction> {
    let strike = player_strike(sim);
    sim.with_entity(target, |entity, ctx| entity.interact(&strike, ctx))
}

fn attack(sim: &mut Sim, target: EntityId) {
    sim.metabolism.apply_action(Action::Attack, 1.0, sim.outbox);
    // Only a landed hit earns a ping; a missing or already dead cow is silent.
    let Some(Interaction::Strike(_)) = strike(sim, target) else {
        return;
    };
    let alive = sim.entities.get(target).is_some_and(|cow| cow.is_alive());
    if alive {
        sim.outbox.ping("The cow runs off!");
    } else {
        sim.outbox.ping("The cow goes down.");
    }
}

/// Currency goes to the wallet, everything else to the inventory.
fn store_for<'s>(sim: &'s mut Sim, id: &str) -> (&'s mut Inventory, Notification, &'static str) {
    if sim.catalog.has_tag(id, ItemTag::Currency) {
        (&mut *sim.wallet, Notification::WalletChanged, "Wallet is full")
    } else {
        (&mut *sim.inventory, Notification::InventoryChanged, "Inventory is full")
    }
}

fn pickup_drop(sim: &mut Sim, target: EntityId) {
    let Some(EntityBody::Drop(drop)) = sim.entities.get(target).map(|e| e.body.clone()) else {
        return;
    };
    let max_stack = sim.catalog.max_stack(&drop.item);
    let name = sim.item_name(&drop.item);

    let (store, changed, full_message) = store_for(sim, &drop.item);
    let before = store.count(&drop.item);
    store.add(&drop.item, drop.qty, max_stack, drop.meta.clone());
    let inserted = store.count(&drop.item).saturating_sub(before).min(drop.qty);

    if inserted == 0 {
        sim.outbox.toast(full_message);
        return;
    }
    if let Some(entity) = sim.entities.get_mut(target) {
        match &mut entity.body {
            EntityBody::Drop(body) if inserted < body.qty => body.qty -= inserted,
            _ => entity.core.dead = true,
        }
    }
    sim.outbox.push(changed);
    sim.player.release_hand_if_gone(sim.inventory);
    if inserted < drop.qty {
        sim.outbox.toast(full_message);
    }
    sim.outbox.ping(format!("Picked up {name} x{inserted}"));
}

fn pickup_coin(sim: &mut Sim, target: EntityId) {
    let Some(EntityBody::Coin(coin)) = sim.entities.get(target).map(|e| e.body.clone()) else {
        return;
    };
    let max_stack = sim.catalog.max_stack("coin");
    let before = sim.wallet.count("coin");
    sim.wallet.add("coin", coin.value, max_stack, None);
    if sim.wallet.count("coin") == before {
        sim.outbox.toast("Wallet is full");
        return;
    }
    if let Some(entity) = sim.entities.get_mut(target) {
        entity.core.dead = true;
    }
    sim.outbox.push(Notification::WalletChanged);
    sim.outbox.ping("Picked up a coin");
}

/// Fold the chest and its contents into a single carried item.
fn pickup_chest(sim: &mut Sim, target: EntityId) {
    if sim.inventory.first_free_slot().is_none() {
        sim.outbox.toast("Inventory is full");
        return;
    }
    if sim.panels.open_chest == Some(target) {
        ui::close_chest(sim);
    }
    let Some(entity) = sim.entities.get_mut(target) else {
        return;
    };
    let Some(chest) = entity.as_chest_mut() else {
        return;
    };
    let contents = std::mem::take(&mut chest.inventory);
    entity.core.dead = true;

    let max_stack = sim.catalog.max_stack("chest");
    sim.inventory
        .add("chest", 1, max_stack, Some(ItemMeta::Container(contents)));
    sim.inventory_changed();
    sim.outbox.ping("Picked up the chest");
}

// ═══════════════════════════════════════════════════════════════════════
// RIGHT CLICK
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_secondary_action(sim: &mut Sim, world_pos: Vec2) {
    if let Some(chest) = sim.nearest_in_range(EntityKind::Chest) {
        ui::open_chest(sim, chest);
        return;
    }
    let Some(held) = sim.player.hand.clone() else {
        return;
    };

    if cooked_form(&held).is_some() {
        if let Some(fire) = sim.nearest_in_range(EntityKind::Campfire) {
            cook(sim, fire, &held);
            return;
        }
    }
    if sim.catalog.is_food(&held) {
        eat(sim, &held);
        return;
    }
    if sim.catalog.is_placeable(&held) {
        place(sim, &held, world_pos);
        return;
    }
    let name = sim.item_name(&held);
    sim.outbox.ping(format!("Nothing to do with {name}"));
}

fn cook(sim: &mut Sim, fire: EntityId, raw: &str) {
    let now_ms = sim.now_ms;
    let started = sim
        .entities
        .get_mut(fire)
        .and_then(|e| e.as_campfire_mut())
        .is_some_and(|campfire| campfire.start_cooking(raw, now_ms));
    if !started {
        sim.outbox.ping("The campfire is busy");
        return;
    }
    sim.inventory.remove(raw, 1);
    sim.inventory_changed();
    let name = sim.item_name(raw);
    sim.outbox.ping(format!("Cooking {name}..."));
}

fn eat(sim: &mut Sim, food: &str) {
    let Some(nutrition) = sim.catalog.nutrition(food) else {
        return;
    };
    if !sim.inventory.has(food, 1) {
        return;
    }
    if !sim.metabolism.eat(&nutrition, sim.outbox) {
        debug!("[World] eating {food} changed nothing");
        return;
    }
    sim.inventory.remove(food, 1);
    sim.inventory_changed();
    let name = sim.item_name(food);
    sim.outbox.ping(format!("Ate {name}"));
}

/// Put the held item down on the tile under `world_pos`.
pub fn place(sim: &mut Sim, item: &str, world_pos: Vec2) -> Option<EntityId> {
    let radius = sim.catalog.get(item).and_then(|def| def.place_radius).unwrap_or(TILE_SIZE / 2.0);
    let pos = sim.bounds.snap(sim.bounds.clamp(world_pos));
    if sim.entities.collides(pos, radius)
        || pos.distance(sim.player.pos) < radius + sim.player.radius
    {
        sim.outbox.toast("Something is in the way");
        return None;
    }

    let stack = sim.inventory.take_one(item)?;
    let body = if sim.catalog.has_tag(item, ItemTag::Plant) {
        EntityBody::Tree(Tree::default())
    } else if sim.catalog.has_tag(item, ItemTag::Campfire) {
        EntityBody::Campfire(Campfire::default())
    } else if sim.catalog.has_tag(item, ItemTag::Container) {
        match stack.meta {
            Some(ItemMeta::Container(contents)) => EntityBody::Chest(Chest::new(contents)),
            None => EntityBody::Chest(Chest::default()),
        }
    } else {
        EntityBody::Display(DisplayProp::new(item))
    };

    let id = sim.entities.spawn(pos, body);
    sim.inventory_changed();
    let name = sim.item_name(item);
    sim.outbox.ping(format!("Placed {name}"));
    Some(id)
}

// ═══════════════════════════════════════════════════════════════════════
// DROPS
// ═══════════════════════════════════════════════════════════════════════

pub fn drop_from_hand(sim: &mut Sim) {
    let Some(held) = sim.player.hand.clone() else {
        return;
    };
    drop_from_inventory(sim, &held);
}

/// Drop one unit of `id` at the player's feet, meta included.
pub fn drop_from_inventory(sim: &mut Sim, id: &str) {
    let Some(stack) = sim.inventory.take_one(id) else {
        debug!("[World] nothing to drop: {id}");
        return;
    };
    let pos = sim.player.pos;
    sim.spawn_drop(&stack.id, 1, pos, stack.meta, None);
    sim.inventory_changed();
}

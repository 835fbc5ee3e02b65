//! World generation: a fresh player, the starter camp, scattered props and
//! creatures, then the natural spawn fill.

use bevy::prelude::*;

use super::Sim;
use crate::entities::{Campfire, Chest, Coin, Cow, EntityBody, Rock, Tree};
use crate::shared::*;
use crate::spawning::{random_spot, SpawnDirector, SPOT_ATTEMPTS};

/// Scattered props and creatures stay this far from the world centre so
/// the camp is never buried.
const CAMP_CLEARING: f32 = 260.0;
const COIN_MARGIN: f32 = 160.0;
const TREE_MARGIN: f32 = 120.0;
const ROCK_MARGIN: f32 = 220.0;
const COW_MARGIN: f32 = 180.0;
const STARTER_SAPLINGS: usize = 3;

/// Wipe everything and build a new world around the centre.
pub fn reset_world(sim: &mut Sim, spawns: &SpawnDirector) {
    sim.entities.clear();

    let center = sim.bounds.center();
    *sim.player = Player {
        pos: center,
        radius: sim.tuning.player_radius,
        speed: sim.tuning.player_speed,
        ..default()
    };
    *sim.inventory = Inventory::with_slots(sim.tuning.inventory_slots);
    *sim.wallet = Inventory::with_slots(sim.tuning.wallet_slots);
    sim.stash.clear();
    *sim.panels = UiPanels::default();
    sim.metabolism.reset(sim.outbox);

    build_camp(sim);
    scatter_wilds(sim);
    let natural = spawns.populate(sim.entities, &sim.bounds, sim.rng);

    let counts = sim.entities.counts_by_kind();
    info!(
        "[World] generated {} entities ({} natural spawns)",
        sim.entities.len(),
        natural
    );
    for (kind, count) in &counts {
        debug!("[World]   {kind}: {count}");
    }

    sim.outbox.push(Notification::InventoryChanged);
    sim.outbox.push(Notification::WalletChanged);
    sim.outbox.push(Notification::CraftChanged);
}

/// Campfire, stocked chest, and starter tools lying near the centre.
fn build_camp(sim: &mut Sim) {
    let center = sim.bounds.center();

    sim.entities.spawn(
        center + Vec2::new(120.0, 100.0),
        EntityBody::Campfire(Campfire::default()),
    );

    let mut chest = Chest::default();
    for (item, qty) in [("wood", 10), ("rockshard", 6), ("coin", 12)] {
        let max_stack = sim.catalog.max_stack(item);
        if !chest.inventory.add(item, qty, max_stack, None) {
            warn!("[World] starter chest could not hold {qty} {item}");
        }
    }
    sim.entities
        .spawn(center + Vec2::new(200.0, -60.0), EntityBody::Chest(chest));

    let ttl = Some(sim.tuning.starter_ttl_ms);
    let axe_pos = sim.bounds.snap(center - Vec2::new(100.0, 0.0));
    sim.spawn_drop("axe", 1, axe_pos, None, ttl);
    for i in 0..STARTER_SAPLINGS {
        let pos = center + Vec2::new(-80.0 + 22.0 * i as f32, 80.0);
        sim.spawn_drop("sapling", 1, pos, None, ttl);
    }
}

fn scatter_wilds(sim: &mut Sim) {
    let tuning = sim.tuning;
    for _ in 0..tuning.coins {
        if let Some(pos) = scatter_spot(sim, COIN_MARGIN, 0.0) {
            sim.entities.spawn(pos, EntityBody::Coin(Coin::default()));
        }
    }
    for _ in 0..tuning.trees {
        if let Some(pos) = scatter_spot(sim, TREE_MARGIN, 22.0) {
            sim.entities.spawn(sim.bounds.snap(pos), EntityBody::Tree(Tree::default()));
        }
    }
    for _ in 0..tuning.rocks {
        if let Some(pos) = scatter_spot(sim, ROCK_MARGIN, 20.0) {
            sim.entities.spawn(sim.bounds.snap(pos), EntityBody::Rock(Rock));
        }
    }
    for _ in 0..tuning.cows {
        if let Some(pos) = scatter_spot(sim, COW_MARGIN, 0.0) {
            sim.entities.spawn(pos, EntityBody::Cow(Cow::default()));
        }
    }
}

/// Random point outside the camp clearing that does not overlap anything
/// tangible. `None` after `SPOT_ATTEMPTS` misses.
fn scatter_spot(sim: &mut Sim, margin: f32, radius: f32) -> Option<Vec2> {
    let center = sim.bounds.center();
    for _ in 0..SPOT_ATTEMPTS {
        let pos = random_spot(sim.rng, &sim.bounds, margin);
        if pos.distance(center) < CAMP_CLEARING {
            continue;
        }
        if radius > 0.0 && sim.entities.collides(pos, radius + TILE_SIZE / 2.0) {
            continue;
        }
        return Some(pos);
    }
    debug!("[World] no room to scatter (margin {margin})");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameBalance;
    use crate::entities::EntityKind;
    use crate::world::Sandbox;

    #[test]
    fn test_generation_counts() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.generate();
        let counts = sb.entities.counts_by_kind();
        let count = |kind| counts.get(&kind).copied().unwrap_or(0);
        assert_eq!(count(EntityKind::Coin), 18);
        assert_eq!(count(EntityKind::Tree), 28);
        assert_eq!(count(EntityKind::Rock), 20);
        assert_eq!(count(EntityKind::Cow), 6);
        assert_eq!(count(EntityKind::Campfire), 1);
        assert_eq!(count(EntityKind::Chest), 1);
        assert_eq!(count(EntityKind::ItemDrop), 4, "axe and three saplings");
        assert_eq!(count(EntityKind::BerryBush), 18);
        assert_eq!(count(EntityKind::NutTree), 14);
    }

    #[test]
    fn test_starter_chest_contents() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.generate();
        let chest = sb
            .entities
            .iter()
            .find_map(|e| e.as_chest())
            .expect("starter chest");
        assert_eq!(chest.inventory.count("wood"), 10);
        assert_eq!(chest.inventory.count("rockshard"), 6);
        assert_eq!(chest.inventory.count("coin"), 12);
    }

    #[test]
    fn test_regeneration_resets_player_and_metabolism() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.generate();
        sb.inventory.add("wood", 5, 50, None);
        sb.player.pos = Vec2::new(50.0, 50.0);
        sb.metabolism.apply_action(crate::metabolism::Action::Break, 10.0, &mut sb.outbox);
        sb.outbox.clear();

        sb.generate();
        assert_eq!(sb.inventory.count("wood"), 0);
        assert_eq!(sb.player.pos, sb.balance.world.bounds().center());
        assert_eq!(sb.metabolism.hunger(), 80.0);
        assert!(sb
            .outbox
            .pending()
            .iter()
            .any(|n| matches!(n, Notification::HungerChanged(_))));
    }

    #[test]
    fn test_camp_stays_clear() {
        let mut sb = Sandbox::new(GameBalance::default());
        sb.generate();
        let center = sb.balance.world.bounds().center();
        assert!(!sb.entities.collides(center, PLAYER_RADIUS), "player spawns free");
        let scattered = sb
            .entities
            .iter()
            .filter(|e| matches!(e.kind(), EntityKind::Tree | EntityKind::Rock | EntityKind::Coin));
        for entity in scattered {
            assert!(entity.pos().distance(center) > 200.0, "{} too close to camp", entity.kind());
        }
    }
}

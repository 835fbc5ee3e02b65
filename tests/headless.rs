//! Headless integration tests for Grovekeep.
//!
//! These tests run the simulation without a window. They use Bevy's
//! `MinimalPlugins` to tick the app with a fixed frame time, or drive a
//! `Sandbox` directly when no scheduling is involved.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grovekeep::config::GameBalance;
use grovekeep::crafting::CraftingStash;
use grovekeep::entities::{
    Campfire, Cow, EntityBody, EntityCtx, EntityKind, Rock, SimEntity, Tree, WorldEffects,
};
use grovekeep::metabolism::Metabolism;
use grovekeep::shared::*;
use grovekeep::world::interaction::{handle_primary_action, handle_secondary_action};
use grovekeep::world::movement::gait;
use grovekeep::world::{Sandbox, WorldEntities};

const FRAME_MS: u64 = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the full simulation with no window, a fixed 16 ms frame, and
/// the default balance.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(FRAME_MS)));
    app.insert_resource(GameBalance::default());

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Events and domain plugins (mirrors main.rs) ──────────────────────
    grovekeep::add_sim_events(&mut app);
    grovekeep::add_sim_plugins(&mut app);

    app
}

/// Loading populates the catalog; the second update enters Playing and
/// generates the world.
fn boot(app: &mut App) {
    app.update();
    app.update();
}

/// An empty sandbox with one entity 30 px to the player's right.
fn sandbox_with(body: EntityBody) -> (Sandbox, EntityId) {
    let mut sb = Sandbox::new(GameBalance::default());
    sb.player.pos = Vec2::new(600.0, 600.0);
    let id = sb.entities.spawn(Vec2::new(630.0, 600.0), body);
    (sb, id)
}

fn hold(sb: &mut Sandbox, item: &str, qty: u32) {
    let max_stack = sb.catalog.max_stack(item);
    sb.inventory.add(item, qty, max_stack, None);
    sb.player.hand = Some(item.to_string());
}

/// Live drops on the ground: (entity count, total qty) for `item`.
fn ground_drops(entities: &WorldEntities, item: &str) -> (usize, u32) {
    entities
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| match &e.body {
            EntityBody::Drop(drop) if drop.item == item => Some(drop.qty),
            _ => None,
        })
        .fold((0, 0), |(n, total), qty| (n + 1, total + qty))
}

fn neutral_macros(sb: &mut Sandbox) {
    sb.metabolism.set_macros(
        Macros {
            carbs: 50.0,
            protein: 30.0,
            fat: 18.0,
        },
        &mut sb.outbox,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot & generation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_reaches_playing_with_generated_world() {
    let mut app = build_test_app();
    boot(&mut app);

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Playing, "Expected Playing after loading data");

    assert!(
        !app.world().resource::<ItemCatalog>().items.is_empty(),
        "Item catalog should be populated during boot"
    );
    assert_eq!(app.world().resource::<RecipeBook>().recipes.len(), 6);

    let entities = app.world().resource::<WorldEntities>();
    assert_eq!(entities.count_kind(EntityKind::Coin), 18, "coins");
    assert_eq!(entities.count_kind(EntityKind::Tree), 28, "trees");
    assert_eq!(entities.count_kind(EntityKind::Rock), 20, "rocks");
    assert_eq!(entities.count_kind(EntityKind::Cow), 6, "cows");
    assert_eq!(entities.count_kind(EntityKind::Campfire), 1, "campfire");
    assert_eq!(entities.count_kind(EntityKind::Chest), 1, "chest");
    assert_eq!(entities.count_kind(EntityKind::NutTree), 14, "nut trees");
    assert_eq!(entities.count_kind(EntityKind::BerryBush), 18, "berry bushes");
}

#[test]
fn test_headless_runs_many_frames_without_losing_the_player() {
    let mut app = build_test_app();
    boot(&mut app);

    for frame in 0..600u32 {
        let dx = if (frame / 100) % 2 == 0 { 1.0 } else { -1.0 };
        app.world_mut().send_event(MoveInputEvent {
            dx,
            dy: 0.3,
            sprint: frame % 3 == 0,
        });
        app.update();
    }

    let bounds = *app.world().resource::<WorldBounds>();
    let player = app.world().resource::<Player>();
    assert_eq!(bounds.clamp(player.pos), player.pos, "player stays inside the world");

    let clock = app.world().resource::<SimClock>();
    assert!(clock.now_ms > 9000.0, "clock advanced: {}", clock.now_ms);

    let hunger = app.world().resource::<Metabolism>().hunger();
    assert!(hunger < 80.0, "hunger should drift down, got {hunger}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tick ordering & event flow
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_input_is_applied_before_movement_in_the_same_frame() {
    let mut app = build_test_app();
    boot(&mut app);

    let start = app.world().resource::<Player>().pos;
    app.world_mut().send_event(MoveInputEvent {
        dx: 1.0,
        dy: 0.0,
        sprint: false,
    });
    app.update();

    let moved = app.world().resource::<Player>().pos.x - start.x;
    let expected = PLAYER_SPEED * FRAME_MS as f32 / 1000.0;
    assert!(
        (moved - expected).abs() < 1e-3,
        "moved {moved}, expected {expected} in one frame"
    );
}

#[test]
fn test_hand_selected_this_frame_is_used_by_the_click() {
    let mut app = build_test_app();
    boot(&mut app);

    let player_pos = app.world().resource::<Player>().pos;
    app.world_mut().resource_mut::<Player>().hand = None;
    app.world_mut()
        .resource_mut::<PlayerInventory>()
        .add("axe", 1, 1, None);
    let tree = {
        let mut entities = app.world_mut().resource_mut::<WorldEntities>();
        entities.clear();
        entities.spawn(player_pos + Vec2::new(30.0, 0.0), EntityBody::Tree(Tree::default()))
    };

    app.world_mut().send_event(SelectHandEvent {
        id: Some("axe".into()),
    });
    app.world_mut().send_event(ClickEvent {
        button: ClickButton::Left,
        screen: Vec2::ZERO,
    });
    app.update();

    assert_eq!(app.world().resource::<Player>().hand.as_deref(), Some("axe"));
    let hp = app.world().resource::<WorldEntities>().get(tree).and_then(|t| t.hp());
    assert_eq!(hp, Some(4), "the click should chop with the axe, not tap bare-handed");
}

#[test]
fn test_scenario_e_low_carb_sprint_moves_at_slow_speed() {
    let mut app = build_test_app();
    boot(&mut app);

    app.world_mut()
        .resource_scope(|world, mut metabolism: Mut<Metabolism>| {
            let mut outbox = world.resource_mut::<Outbox>();
            metabolism.set_macros(
                Macros {
                    carbs: 10.0,
                    protein: 45.0,
                    fat: 30.0,
                },
                &mut outbox,
            );
        });
    let start = app.world().resource::<Player>().pos;
    app.world_mut().send_event(MoveInputEvent {
        dx: 1.0,
        dy: 0.0,
        sprint: true,
    });
    app.update();

    let moved = app.world().resource::<Player>().pos.x - start.x;
    let expected = PLAYER_SPEED * 0.7 * FRAME_MS as f32 / 1000.0;
    assert!(
        (moved - expected).abs() < 1e-3,
        "moved {moved}, expected base x slow = {expected}"
    );
}

#[test]
fn test_craft_request_emits_craft_changed() {
    let mut app = build_test_app();
    boot(&mut app);
    app.update();

    app.world_mut().resource_mut::<CraftingStash>().deposit("wood", 3);
    app.world_mut()
        .resource_mut::<CraftingStash>()
        .deposit("rockshard", 1);
    app.world_mut().send_event(CraftRequestEvent {
        recipe_id: "axe".into(),
    });
    app.update();

    assert!(
        app.world().resource::<PlayerInventory>().has("axe", 1),
        "axe should land in the inventory"
    );
    assert!(
        app.world().resource::<CraftingStash>().is_empty(),
        "ingredients consumed from the stash"
    );
    let changed = app.world().resource::<Events<CraftChangedEvent>>();
    assert!(!changed.is_empty(), "CraftChangedEvent should be sent");
    let inventory = app.world().resource::<Events<InventoryChangedEvent>>();
    assert!(!inventory.is_empty(), "InventoryChangedEvent should be sent");
}

#[test]
fn test_failed_craft_sends_toast_into_feed() {
    let mut app = build_test_app();
    boot(&mut app);
    app.update();

    app.world_mut().send_event(CraftRequestEvent {
        recipe_id: "sword".into(),
    });
    app.update();

    let feed = app.world().resource::<grovekeep::ui::ToastFeed>();
    assert!(
        feed.messages().any(|m| m.starts_with("Missing materials")),
        "toast feed should explain the failure"
    );
}

#[test]
fn test_closing_inventory_returns_the_stash() {
    let mut app = build_test_app();
    boot(&mut app);

    app.world_mut()
        .resource_mut::<PlayerInventory>()
        .add("wood", 4, 50, None);
    app.world_mut().send_event(UiActionEvent::ToggleInventory);
    app.update();
    assert!(app.world().resource::<UiPanels>().inventory_open);

    for _ in 0..3 {
        app.world_mut().send_event(StashTransferEvent {
            id: "wood".into(),
            direction: TransferDirection::Stow,
        });
    }
    app.update();
    assert_eq!(app.world().resource::<CraftingStash>().count("wood"), 3);
    assert_eq!(app.world().resource::<PlayerInventory>().count("wood"), 1);

    app.world_mut().send_event(UiActionEvent::ToggleInventory);
    app.update();
    assert!(app.world().resource::<CraftingStash>().is_empty());
    assert_eq!(app.world().resource::<PlayerInventory>().count("wood"), 4);
    assert!(!app.world().resource::<UiPanels>().inventory_open);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_scenario_a_bare_hand_taps_shake_loose_one_stick() {
    let (mut sb, tree) = sandbox_with(EntityBody::Tree(Tree::default()));
    for _ in 0..10 {
        handle_primary_action(&mut sb.sim());
    }
    let tree = sb.entities.get(tree).expect("tree exists");
    assert!(tree.is_alive(), "taps never break the tree");
    assert_eq!(tree.hp(), Some(5));
    assert_eq!(ground_drops(&sb.entities, "stick"), (1, 1));
}

#[test]
fn test_scenario_b_axe_fells_tree_in_five_hits() {
    let (mut sb, tree) = sandbox_with(EntityBody::Tree(Tree::default()));
    hold(&mut sb, "axe", 1);
    for hit in 1..=5 {
        handle_primary_action(&mut sb.sim());
        let alive = sb.entities.get(tree).is_some_and(|e| e.is_alive());
        assert_eq!(alive, hit < 5, "after hit {hit}");
    }
    assert_eq!(ground_drops(&sb.entities, "wood"), (10, 10));
    let (_, saplings) = ground_drops(&sb.entities, "sapling");
    assert!(saplings == 1 || saplings == 3, "saplings {saplings}");
    let (_, sticks) = ground_drops(&sb.entities, "stick");
    assert!(sticks <= 2, "sticks {sticks}");
}

#[test]
fn test_scenario_c_sword_hit_spreads_fear_to_the_herd() {
    let (mut sb, struck) = sandbox_with(EntityBody::Cow(Cow::default()));
    let bystander = sb
        .entities
        .spawn(Vec2::new(730.0, 600.0), EntityBody::Cow(Cow::default()));
    neutral_macros(&mut sb);
    assert_eq!(sb.metabolism.damage_multiplier(), 1.0);
    hold(&mut sb, "sword", 1);

    handle_primary_action(&mut sb.sim());

    let cow = sb.entities.get_mut(struck).expect("cow exists");
    assert!(cow.is_alive());
    assert_eq!(cow.hp(), Some(18));
    let flee = cow.as_cow_mut().map(|c| c.flee_timer).unwrap_or(0.0);
    assert!((flee - 6.0).abs() < 1e-4, "flee timer {flee}");

    let other = sb
        .entities
        .get_mut(bystander)
        .and_then(|e| e.as_cow_mut())
        .map(|c| c.flee_timer)
        .unwrap_or(0.0);
    assert!(other > 0.0, "the second cow should flee too");
}

#[test]
fn test_scenario_d_campfire_cooks_one_thing_at_a_time() {
    let mut fire = Campfire::default();
    assert!(fire.start_cooking("beef", 1000.0));
    let job = fire.cooking.clone().expect("cooking");
    assert_eq!(job.ready_at_ms, 31_000.0);
    assert!(!fire.start_cooking("beef", 2000.0), "already cooking");
}

#[test]
fn test_right_click_cooks_held_beef_at_nearby_fire() {
    let (mut sb, fire) = sandbox_with(EntityBody::Campfire(Campfire::default()));
    hold(&mut sb, "beef", 2);
    sb.clock.now_ms = 5000.0;

    handle_secondary_action(&mut sb.sim(), Vec2::new(630.0, 600.0));

    assert_eq!(sb.inventory.count("beef"), 1, "one beef goes on the fire");
    let ready = sb
        .entities
        .get_mut(fire)
        .and_then(|e| e.as_campfire_mut())
        .and_then(|c| c.cooking.clone())
        .map(|job| job.ready_at_ms);
    assert_eq!(ready, Some(35_000.0));
}

#[test]
fn test_scenario_e_gait_reports_slow_without_sprint() {
    let mut sb = Sandbox::new(GameBalance::default());
    sb.metabolism.set_macros(
        Macros {
            carbs: 10.0,
            protein: 45.0,
            fat: 30.0,
        },
        &mut sb.outbox,
    );
    let g = gait(&sb.balance.world, 210.0, &sb.metabolism, true);
    assert!(!g.running);
    assert!((g.speed - 147.0).abs() < 1e-3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistical and property checks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rock_coal_frequency_is_about_half() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut coal_total = 0;
    let trials = 1000;
    for i in 0..trials {
        let mut fx = WorldEffects::default();
        let mut rock = SimEntity::new(EntityId(i), Vec2::ZERO, EntityBody::Rock(Rock));
        let mut ctx = EntityCtx {
            now_ms: 0.0,
            bounds: WorldBounds::default(),
            rng: &mut rng,
            fx: &mut fx,
        };
        assert!(rock.break_apart(&mut ctx));
        let shards = fx.dropped_qty("rockshard");
        assert!((1..=3).contains(&shards), "break {i} dropped {shards} rockshards");
        coal_total += fx.dropped_qty("coal");
    }
    let coal = coal_total as f64 / trials as f64;
    assert!((0.4..=0.6).contains(&coal), "coal frequency {coal}");
}

#[test]
fn test_stash_round_trip_conserves_items() {
    let mut sb = Sandbox::new(GameBalance::default());
    sb.inventory.add("wood", 12, 50, None);
    sb.inventory.add("rockshard", 5, 50, None);
    sb.inventory.add("berries", 3, 30, None);

    let mut sim = sb.sim();
    grovekeep::ui::toggle_inventory(&mut sim);
    for _ in 0..7 {
        grovekeep::crafting::deposit_from_inventory(&mut sim, "wood");
    }
    for _ in 0..5 {
        grovekeep::crafting::deposit_from_inventory(&mut sim, "rockshard");
    }
    grovekeep::ui::toggle_inventory(&mut sim);

    assert_eq!(sb.inventory.count("wood"), 12);
    assert_eq!(sb.inventory.count("rockshard"), 5);
    assert_eq!(sb.inventory.count("berries"), 3);
    assert!(sb.stash.is_empty());
}

#[test]
fn test_stash_overflow_lands_on_the_ground() {
    let mut sb = Sandbox::new(GameBalance::default());
    sb.stash.deposit("wood", 3);
    for _ in 0..sb.inventory.capacity() {
        sb.inventory.add("axe", 1, 1, None);
    }

    sb.panels.inventory_open = true;
    grovekeep::ui::close_all(&mut sb.sim());

    assert_eq!(ground_drops(&sb.entities, "wood").1, 3, "overflow is dropped");
    assert!(sb.stash.is_empty());
}

#[test]
fn test_inventory_count_matches_slots_under_random_ops() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut inventory = Inventory::with_slots(PLAYER_INVENTORY_SLOTS);
    for _ in 0..1000 {
        let qty = rng.gen_range(1..40);
        let before = inventory.count("wood");
        if rng.gen_bool(0.6) {
            inventory.add("wood", qty, 50, None);
            assert!(inventory.count("wood") >= before, "adds never lose items");
        } else if inventory.has("wood", qty) {
            assert!(inventory.remove("wood", qty));
            assert_eq!(inventory.count("wood"), before - qty);
        }

        let slot_sum: u32 = inventory
            .stacks()
            .filter(|s| s.id == "wood")
            .map(|s| s.qty)
            .sum();
        assert_eq!(inventory.count("wood"), slot_sum);
        assert!(inventory.stacks().all(|s| s.qty <= 50), "stacks respect max");
        assert!(inventory.count("wood") <= 50 * PLAYER_INVENTORY_SLOTS as u32);
    }
}

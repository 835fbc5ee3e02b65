//! Grovekeep library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the headless runner. This library
//! exposes the same modules so that `tests/` can import simulation types,
//! systems and resources without a window.

pub mod shared;
pub mod config;
pub mod data;
pub mod entities;
pub mod metabolism;
pub mod spawning;
pub mod crafting;
pub mod player;
pub mod world;
pub mod ui;

use bevy::prelude::*;

use shared::*;

/// Registers every input and notification event the simulation reads or
/// writes.
pub fn add_sim_events(app: &mut App) {
    // ── Input ────────────────────────────────────────────────────────────
    app.add_event::<MoveInputEvent>()
        .add_event::<ClickEvent>()
        .add_event::<DropHandOneEvent>()
        .add_event::<DropInventoryItemEvent>()
        .add_event::<WorldDropEvent>()
        .add_event::<UiActionEvent>()
        .add_event::<SelectHandEvent>()
        .add_event::<CraftRequestEvent>()
        .add_event::<StashTransferEvent>()
        .add_event::<ChestTransferEvent>();

    // ── Notifications ────────────────────────────────────────────────────
    app.add_event::<PingEvent>()
        .add_event::<ToastEvent>()
        .add_event::<InventoryChangedEvent>()
        .add_event::<WalletChangedEvent>()
        .add_event::<CraftChangedEvent>()
        .add_event::<ChestOpenEvent>()
        .add_event::<ChestCloseEvent>()
        .add_event::<ChestChangedEvent>()
        .add_event::<HungerChangedEvent>()
        .add_event::<EffectsChangedEvent>()
        .add_event::<StaminaFatigueEvent>()
        .add_event::<PanelToggledEvent>();
}

/// Every domain plugin. `GameBalance` must already be inserted.
pub fn add_sim_plugins(app: &mut App) {
    app.add_plugins((
        data::DataPlugin,
        player::PlayerPlugin,
        metabolism::MetabolismPlugin,
        spawning::SpawningPlugin,
        crafting::CraftingPlugin,
        world::WorldPlugin,
        ui::UiPlugin,
    ));
}

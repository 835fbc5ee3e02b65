use std::collections::BTreeMap;
use std::time::Duration;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use serde::Serialize;

use grovekeep::config::{GameBalance, DEFAULT_BALANCE_PATH};
use grovekeep::metabolism::Metabolism;
use grovekeep::shared::*;
use grovekeep::world::WorldEntities;

/// Runs the Grovekeep simulation headless with a scripted player and
/// prints a JSON report.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frames to simulate
    #[arg(short, long, default_value_t = 3600)]
    frames: u32,

    /// Balance file (RON)
    #[arg(short, long, default_value = DEFAULT_BALANCE_PATH)]
    balance: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const FRAME: Duration = Duration::from_millis(16);
/// Frames per leg of the wander loop.
const LEG_FRAMES: u32 = 90;
const CLICK_EVERY: u32 = 20;
const LEGS: [(f32, f32); 6] = [
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, 1.0),
];

#[derive(Serialize)]
struct RunReport {
    frames: u32,
    entities: BTreeMap<&'static str, usize>,
    inventory: BTreeMap<ItemId, u32>,
    wallet: BTreeMap<ItemId, u32>,
    hunger: HungerSnapshot,
}

fn main() {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .add_plugins(LogPlugin {
            level: if args.verbose { Level::DEBUG } else { Level::INFO },
            ..default()
        });

    let balance = GameBalance::load_or_default(&args.balance);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(balance)
        .init_state::<GameState>();
    grovekeep::add_sim_events(&mut app);
    grovekeep::add_sim_plugins(&mut app);

    // Loading, then the transition into Playing.
    app.update();
    app.update();

    for frame in 0..args.frames {
        drive_player(app.world_mut(), frame);
        app.update();
    }

    let report = build_report(app.world(), args.frames);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => error!("[Runner] could not serialise report: {err}"),
    }
}

/// Wander in legs, sprint on every other leg, and swing at whatever is
/// in reach. Picks up the axe as soon as it is carried.
fn drive_player(world: &mut World, frame: u32) {
    let leg = (frame / LEG_FRAMES) as usize;
    let (dx, dy) = LEGS[leg % LEGS.len()];
    world.send_event(MoveInputEvent {
        dx,
        dy,
        sprint: leg % 2 == 1,
    });

    if frame % CLICK_EVERY == 0 {
        let wants_axe = world.resource::<Player>().hand.is_none()
            && world.resource::<PlayerInventory>().has("axe", 1);
        if wants_axe {
            world.send_event(SelectHandEvent {
                id: Some("axe".into()),
            });
        }
        world.send_event(ClickEvent {
            button: ClickButton::Left,
            screen: Vec2::ZERO,
        });
    }
}

fn totals(inventory: &Inventory) -> BTreeMap<ItemId, u32> {
    let mut totals = BTreeMap::new();
    for stack in inventory.stacks() {
        *totals.entry(stack.id.clone()).or_insert(0) += stack.qty;
    }
    totals
}

fn build_report(world: &World, frames: u32) -> RunReport {
    let entities = world
        .resource::<WorldEntities>()
        .counts_by_kind()
        .into_iter()
        .map(|(kind, n)| (kind.tag(), n))
        .collect();
    RunReport {
        frames,
        entities,
        inventory: totals(world.resource::<PlayerInventory>()),
        wallet: totals(world.resource::<Wallet>()),
        hunger: world.resource::<Metabolism>().snapshot(),
    }
}

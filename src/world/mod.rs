//! World domain plugin for Grovekeep.
//!
//! Responsible for:
//! - The entity arena and the seeded world RNG
//! - The simulation clock and the ordered per-tick sets
//! - Player movement and collision
//! - Click dispatch (pickups, harvesting, combat, cooking, eating, placing)
//! - World generation on entering `Playing`
//! - Flushing the notification outbox into events

pub mod arena;
pub mod generation;
pub mod interaction;
pub mod movement;
pub mod notify;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameBalance, WorldTuning};
use crate::crafting::CraftingStash;
use crate::entities::{
    EntityBody, EntityCtx, EntityKind, HitEffect, ItemDrop, SimEntity, WorldEffects,
};
use crate::metabolism::Metabolism;
use crate::shared::*;
use crate::spawning::SpawnDirector;

pub use arena::WorldEntities;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let tuning = app
            .world()
            .get_resource::<GameBalance>()
            .map(|b| b.world.clone())
            .unwrap_or_default();

        app.insert_resource(tuning.bounds())
            .insert_resource(PlayerInventory(Inventory::with_slots(tuning.inventory_slots)))
            .insert_resource(Wallet(Inventory::with_slots(tuning.wallet_slots)))
            .init_resource::<WorldEntities>()
            .init_resource::<WorldRng>()
            .init_resource::<SimClock>()
            .init_resource::<Outbox>()
            .configure_sets(
                Update,
                (
                    TickSet::Clock,
                    TickSet::Input,
                    TickSet::Movement,
                    TickSet::Entities,
                    TickSet::Focus,
                    TickSet::Spawns,
                    TickSet::Metabolism,
                    TickSet::Notify,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Playing), spawn_initial_world)
            .add_systems(Update, advance_clock.in_set(TickSet::Clock))
            .add_systems(
                Update,
                (
                    handle_clicks,
                    handle_drop_requests,
                )
                    .chain()
                    .in_set(TickSet::Input),
            )
            .add_systems(Update, movement::move_player_system.in_set(TickSet::Movement))
            .add_systems(Update, update_world_entities.in_set(TickSet::Entities))
            .add_systems(Update, refresh_focus.in_set(TickSet::Focus))
            .add_systems(Update, notify::flush_notifications.in_set(TickSet::Notify));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Every random roll in the simulation goes through this.
#[derive(Resource, Debug, Clone)]
pub struct WorldRng(pub StdRng);

impl FromWorld for WorldRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<GameBalance>()
            .map(|b| b.seed)
            .unwrap_or_else(|| GameBalance::default().seed);
        Self(StdRng::seed_from_u64(seed))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIM — one mutable view over all simulation state
// ═══════════════════════════════════════════════════════════════════════

/// Borrowed view handed to every world operation. Systems build it from
/// `SimParams`; `Sandbox` builds it from owned state.
pub struct Sim<'a> {
    pub entities: &'a mut WorldEntities,
    pub player: &'a mut Player,
    pub inventory: &'a mut Inventory,
    pub wallet: &'a mut Inventory,
    pub stash: &'a mut CraftingStash,
    pub panels: &'a mut UiPanels,
    pub metabolism: &'a mut Metabolism,
    pub catalog: &'a ItemCatalog,
    pub recipes: &'a RecipeBook,
    pub tuning: &'a WorldTuning,
    pub bounds: WorldBounds,
    pub now_ms: f64,
    pub rng: &'a mut StdRng,
    pub outbox: &'a mut Outbox,
}

impl Sim<'_> {
    /// Run `f` against one entity with a fresh effects buffer, then apply
    /// whatever the entity asked for. `None` if the id is unknown.
    pub fn with_entity<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut SimEntity, &mut EntityCtx) -> R,
    ) -> Option<R> {
        let mut fx = WorldEffects::default();
        let result = {
            let entity = self.entities.get_mut(id)?;
            let mut ctx = EntityCtx {
                now_ms: self.now_ms,
                bounds: self.bounds,
                rng: &mut *self.rng,
                fx: &mut fx,
            };
            f(entity, &mut ctx)
        };
        self.apply_effects(fx);
        Some(result)
    }

    /// Advance every live entity, apply their effects, then drop the dead.
    pub fn update_entities(&mut self, dt: f32) {
        let mut fx = WorldEffects::default();
        {
            let mut ctx = EntityCtx {
                now_ms: self.now_ms,
                bounds: self.bounds,
                rng: &mut *self.rng,
                fx: &mut fx,
            };
            for entity in self.entities.iter_mut() {
                entity.update(dt, &mut ctx);
            }
        }
        self.apply_effects(fx);
        self.entities.compact();
    }

    pub fn apply_effects(&mut self, fx: WorldEffects) {
        for drop in fx.drops {
            self.spawn_drop(&drop.id, drop.qty, drop.pos, drop.meta, drop.ttl_ms);
        }
        for pos in fx.hits {
            let burst = HitEffect::burst(&mut *self.rng);
            self.entities.spawn(pos, EntityBody::HitEffect(burst));
        }
        for signal in fx.fear {
            let radius = self.tuning.cow_chain_radius;
            for entity in self.entities.iter_mut() {
                if entity.id() == signal.source || entity.pos().distance(signal.origin) > radius {
                    continue;
                }
                if let Some(cow) = entity.as_cow_mut() {
                    cow.trigger_flee(signal.threat);
                }
            }
        }
        for note in fx.notices {
            self.outbox.push(note);
        }
    }

    /// Put an item on the ground. `ttl_ms` of `None` uses the world default.
    pub fn spawn_drop(
        &mut self,
        id: &str,
        qty: u32,
        pos: Vec2,
        meta: Option<ItemMeta>,
        ttl_ms: Option<f64>,
    ) -> EntityId {
        let ttl = ttl_ms.unwrap_or(self.tuning.drop_ttl_ms);
        let body = ItemDrop::new(id, qty, meta, self.now_ms, ttl);
        self.entities.spawn(pos, EntityBody::Drop(body))
    }

    /// Nearest interactable live entity, with its distance to the player.
    pub fn interaction_target(&self) -> Option<(EntityId, f32)> {
        self.entities
            .nearest(self.player.pos, |e| e.kind().is_interactable())
    }

    /// Nearest live entity of `kind` within interaction range.
    pub fn nearest_in_range(&self, kind: EntityKind) -> Option<EntityId> {
        self.entities
            .nearest(self.player.pos, |e| e.kind() == kind)
            .filter(|(_, distance)| *distance <= self.tuning.interact_range)
            .map(|(id, _)| id)
    }

    pub fn update_focus(&mut self) {
        self.player.focus = self
            .interaction_target()
            .filter(|(_, distance)| *distance <= self.tuning.interact_range)
            .map(|(id, _)| id);
    }

    pub fn item_name(&self, id: &str) -> String {
        self.catalog.name(id)
    }

    /// Clear the hand if its item ran out, and tell the UI.
    pub fn inventory_changed(&mut self) {
        self.player.release_hand_if_gone(self.inventory);
        self.outbox.push(Notification::InventoryChanged);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM PARAMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(SystemParam)]
pub struct SimParams<'w> {
    entities: ResMut<'w, WorldEntities>,
    player: ResMut<'w, Player>,
    inventory: ResMut<'w, PlayerInventory>,
    wallet: ResMut<'w, Wallet>,
    stash: ResMut<'w, CraftingStash>,
    panels: ResMut<'w, UiPanels>,
    metabolism: ResMut<'w, Metabolism>,
    catalog: Res<'w, ItemCatalog>,
    recipes: Res<'w, RecipeBook>,
    balance: Res<'w, GameBalance>,
    bounds: Res<'w, WorldBounds>,
    clock: Res<'w, SimClock>,
    rng: ResMut<'w, WorldRng>,
    outbox: ResMut<'w, Outbox>,
}

impl SimParams<'_> {
    pub fn sim(&mut self) -> Sim<'_> {
        Sim {
            entities: &mut *self.entities,
            player: &mut *self.player,
            inventory: &mut self.inventory.0,
            wallet: &mut self.wallet.0,
            stash: &mut *self.stash,
            panels: &mut *self.panels,
            metabolism: &mut *self.metabolism,
            catalog: &*self.catalog,
            recipes: &*self.recipes,
            tuning: &self.balance.world,
            bounds: *self.bounds,
            now_ms: self.clock.now_ms,
            rng: &mut self.rng.0,
            outbox: &mut *self.outbox,
        }
    }

    pub fn clock(&self) -> SimClock {
        *self.clock
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn advance_clock(time: Res<Time>, balance: Res<GameBalance>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs(), balance.world.max_frame_dt);
}

/// Rebuild the world from scratch: fresh metabolism, player at the
/// centre, generated entities.
pub fn spawn_initial_world(mut params: SimParams, mut director: ResMut<SpawnDirector>) {
    director.reset();
    generation::reset_world(&mut params.sim(), &director);
}

pub fn handle_clicks(mut clicks: EventReader<ClickEvent>, mut params: SimParams) {
    for click in clicks.read() {
        let mut sim = params.sim();
        match click.button {
            ClickButton::Left => interaction::handle_primary_action(&mut sim),
            ClickButton::Right => {
                let world_pos = movement::screen_to_world(&sim, click.screen);
                interaction::handle_secondary_action(&mut sim, world_pos);
            }
        }
    }
}

pub fn handle_drop_requests(
    mut hand_drops: EventReader<DropHandOneEvent>,
    mut inventory_drops: EventReader<DropInventoryItemEvent>,
    mut world_drops: EventReader<WorldDropEvent>,
    mut params: SimParams,
) {
    let mut sim = params.sim();
    for _ in hand_drops.read() {
        interaction::drop_from_hand(&mut sim);
    }
    for ev in inventory_drops.read() {
        interaction::drop_from_inventory(&mut sim, &ev.id);
    }
    for ev in world_drops.read() {
        let pos = sim.player.pos;
        sim.spawn_drop(&ev.id, ev.qty, pos, ev.meta.clone(), None);
    }
}

pub fn update_world_entities(mut params: SimParams) {
    let dt = params.clock().dt;
    params.sim().update_entities(dt);
}

pub fn refresh_focus(mut params: SimParams) {
    params.sim().update_focus();
}

// ═══════════════════════════════════════════════════════════════════════
// SANDBOX — the same simulation without an App
// ═══════════════════════════════════════════════════════════════════════

/// Owns one copy of every piece of simulation state and steps it in the
/// same order as the scheduled systems. Used by tools and tests that do
/// not need a Bevy `App`.
pub struct Sandbox {
    pub entities: WorldEntities,
    pub player: Player,
    pub inventory: Inventory,
    pub wallet: Inventory,
    pub stash: CraftingStash,
    pub panels: UiPanels,
    pub metabolism: Metabolism,
    pub catalog: ItemCatalog,
    pub recipes: RecipeBook,
    pub balance: GameBalance,
    pub clock: SimClock,
    pub rng: StdRng,
    pub outbox: Outbox,
    pub spawns: SpawnDirector,
}

impl Sandbox {
    /// Empty world with the built-in catalog and recipes.
    pub fn new(balance: GameBalance) -> Self {
        let metabolism = Metabolism::new(
            balance.metabolism.clone(),
            crate::metabolism::ActionCostTable::from_config(&balance.action_costs),
        );
        Self {
            entities: WorldEntities::default(),
            player: Player {
                pos: balance.world.bounds().center(),
                radius: balance.world.player_radius,
                speed: balance.world.player_speed,
                ..default()
            },
            inventory: Inventory::with_slots(balance.world.inventory_slots),
            wallet: Inventory::with_slots(balance.world.wallet_slots),
            stash: CraftingStash::default(),
            panels: UiPanels::default(),
            metabolism,
            catalog: crate::data::item_catalog(),
            recipes: crate::data::recipe_book(),
            clock: SimClock::default(),
            rng: StdRng::seed_from_u64(balance.seed),
            outbox: Outbox::default(),
            spawns: SpawnDirector::new(&balance.spawns),
            balance,
        }
    }

    pub fn sim(&mut self) -> Sim<'_> {
        Sim {
            entities: &mut self.entities,
            player: &mut self.player,
            inventory: &mut self.inventory,
            wallet: &mut self.wallet,
            stash: &mut self.stash,
            panels: &mut self.panels,
            metabolism: &mut self.metabolism,
            catalog: &self.catalog,
            recipes: &self.recipes,
            tuning: &self.balance.world,
            bounds: self.balance.world.bounds(),
            now_ms: self.clock.now_ms,
            rng: &mut self.rng,
            outbox: &mut self.outbox,
        }
    }

    /// Full world generation, as on entering `Playing`.
    pub fn generate(&mut self) {
        self.spawns.reset();
        let spawns = self.spawns.clone();
        generation::reset_world(&mut self.sim(), &spawns);
    }

    /// One frame: clock, movement, entities, focus, spawns, metabolism.
    pub fn tick(&mut self, raw_dt: f32) {
        let dt = self.clock.advance(raw_dt, self.balance.world.max_frame_dt);
        {
            let mut sim = self.sim();
            movement::step_player(&mut sim, dt);
            sim.update_entities(dt);
            sim.update_focus();
        }
        let bounds = self.balance.world.bounds();
        self.spawns
            .update(dt * 1000.0, &mut self.entities, &bounds, &mut self.rng);
        self.metabolism.tick(dt * 1000.0, &mut self.outbox);
    }
}

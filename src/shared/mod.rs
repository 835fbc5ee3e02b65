//! Shared components, resources, events, and states for Grovekeep.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Domains talk to each other through the events and the notification
//! outbox declared below.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Fixed per-tick ordering of the simulation. Configured as a chain by
/// `WorldPlugin`; every domain plugin drops its systems into one of these.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Clock,
    Input,
    Movement,
    Entities,
    Focus,
    Spawns,
    Metabolism,
    Notify,
}

// ═══════════════════════════════════════════════════════════════════════
// CLOCK & BOUNDS
// ═══════════════════════════════════════════════════════════════════════

/// Monotonic simulation clock. All deadlines (cooking, harvest rests,
/// drop expiry) are absolute values on this clock.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    pub now_ms: f64,
    /// Clamped frame delta for the current tick, in seconds.
    pub dt: f32,
    pub frame: u64,
}

impl SimClock {
    pub fn advance(&mut self, raw_dt: f32, max_dt: f32) -> f32 {
        let dt = raw_dt.clamp(0.0, max_dt);
        self.dt = dt;
        self.now_ms += f64::from(dt) * 1000.0;
        self.frame += 1;
        dt
    }

    pub fn dt_ms(&self) -> f32 {
        self.dt * 1000.0
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    pub tile: f32,
    /// Keep-out distance from the world edge for moving bodies.
    pub margin: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            tile: TILE_SIZE,
            margin: PLAYER_RADIUS,
        }
    }
}

impl WorldBounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(self.margin, self.width - self.margin),
            pos.y.clamp(self.margin, self.height - self.margin),
        )
    }

    /// Snap to the centre of the tile containing `pos`.
    pub fn snap(&self, pos: Vec2) -> Vec2 {
        let half = self.tile / 2.0;
        Vec2::new(
            (pos.x / self.tile).floor() * self.tile + half,
            (pos.y / self.tile).floor() * self.tile + half,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ENTITY IDS
// ═══════════════════════════════════════════════════════════════════════

/// Arena key for a simulated world object. Never reused within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEM CATALOG
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type. String ids keep the catalog
/// data-driven.
pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTag {
    Currency,
    Material,
    Food,
    Tool,
    Chop,
    Mine,
    Weapon,
    Place,
    Solid,
    Plant,
    Container,
    Campfire,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub max_stack: u32,
    pub tags: Vec<ItemTag>,
    /// Nutrition labels such as `"protein<14>"`.
    pub labels: Vec<String>,
    /// Footprint radius when placed in the world.
    pub place_radius: Option<f32>,
}

impl ItemDef {
    pub fn has_tag(&self, tag: ItemTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: HashMap<ItemId, ItemDef>,
}

impl ItemCatalog {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn name(&self, id: &str) -> String {
        self.get(id)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Unknown items never stack.
    pub fn max_stack(&self, id: &str) -> u32 {
        self.get(id).map(|def| def.max_stack.max(1)).unwrap_or(1)
    }

    pub fn has_tag(&self, id: &str, tag: ItemTag) -> bool {
        self.get(id).is_some_and(|def| def.has_tag(tag))
    }

    pub fn is_placeable(&self, id: &str) -> bool {
        self.has_tag(id, ItemTag::Place)
    }

    pub fn is_food(&self, id: &str) -> bool {
        self.has_tag(id, ItemTag::Food)
    }

    /// Tool capabilities of the held item, if any.
    pub fn tooling(&self, held: Option<&str>) -> Tooling {
        match held {
            Some(id) => Tooling {
                chop: self.has_tag(id, ItemTag::Chop),
                mine: self.has_tag(id, ItemTag::Mine),
                weapon: self.has_tag(id, ItemTag::Weapon),
            },
            None => Tooling::default(),
        }
    }

    /// Sum of the item's nutrition labels. Malformed labels are skipped.
    pub fn nutrition(&self, id: &str) -> Option<Nutrition> {
        let def = self.get(id)?;
        if !def.has_tag(ItemTag::Food) {
            return None;
        }
        let mut nutrition = Nutrition::default();
        for raw in &def.labels {
            match parse_labeled_amount(raw) {
                Ok(parsed) => match parsed.label.as_str() {
                    "carb" | "carbs" => nutrition.carbs += parsed.amount,
                    "protein" => nutrition.protein += parsed.amount,
                    "fat" => nutrition.fat += parsed.amount,
                    "portion" => nutrition.portion += parsed.amount,
                    other => debug!("[Catalog] {id}: ignoring label '{other}'"),
                },
                Err(err) => warn!("[Catalog] {id}: {err}"),
            }
        }
        Some(nutrition)
    }
}

/// Capabilities a held item grants to a left-click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tooling {
    pub chop: bool,
    pub mine: bool,
    pub weapon: bool,
}

impl Tooling {
    pub fn any(&self) -> bool {
        self.chop || self.mine || self.weapon
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub carbs: f32,
    pub protein: f32,
    pub fat: f32,
    pub portion: f32,
}

impl Nutrition {
    pub fn calories(&self) -> f32 {
        4.0 * self.carbs + 4.0 * self.protein + 9.0 * self.fat
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub output: ItemId,
    pub output_qty: u32,
    pub inputs: Vec<(ItemId, u32)>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct RecipeBook {
    pub recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LABEL PARSING — "name<amount>" strings used by costs and nutrition
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledAmount {
    pub label: String,
    pub amount: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    Malformed(String),
    EmptyLabel(String),
    BadAmount(String),
}

impl fmt::Display for LabelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelParseError::Malformed(raw) => write!(f, "expected 'name<amount>', got '{raw}'"),
            LabelParseError::EmptyLabel(raw) => write!(f, "missing label name in '{raw}'"),
            LabelParseError::BadAmount(raw) => {
                write!(f, "amount is not a finite number in '{raw}'")
            }
        }
    }
}

impl std::error::Error for LabelParseError {}

pub fn parse_labeled_amount(raw: &str) -> Result<LabeledAmount, LabelParseError> {
    let body = raw
        .strip_suffix('>')
        .ok_or_else(|| LabelParseError::Malformed(raw.to_string()))?;
    let (label, amount) = body
        .split_once('<')
        .ok_or_else(|| LabelParseError::Malformed(raw.to_string()))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(LabelParseError::EmptyLabel(raw.to_string()));
    }
    let amount: f32 = amount
        .trim()
        .parse()
        .map_err(|_| LabelParseError::BadAmount(raw.to_string()))?;
    if !amount.is_finite() {
        return Err(LabelParseError::BadAmount(raw.to_string()));
    }
    Ok(LabeledAmount {
        label: label.to_string(),
        amount,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// State carried by a non-stackable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemMeta {
    /// A packed-up chest keeps its contents.
    Container(Inventory),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: ItemId,
    pub qty: u32,
    pub meta: Option<ItemMeta>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// First stack holding `id`.
    pub fn find(&self, id: &str) -> Option<&ItemStack> {
        self.stacks().find(|s| s.id == id)
    }

    /// Add `qty` units of `id`.
    ///
    /// Meta-bearing or non-stackable items take one slot per unit and are
    /// refused without any change when there are not enough free slots.
    /// Stackable items top up existing stacks first, then open new slots;
    /// a `false` return means some units did not fit, and the ones that
    /// did are kept.
    pub fn add(&mut self, id: &str, qty: u32, max_stack: u32, meta: Option<ItemMeta>) -> bool {
        if qty == 0 {
            return true;
        }

        if meta.is_some() || max_stack <= 1 {
            if self.free_slots() < qty as usize {
                return false;
            }
            for _ in 0..qty {
                if let Some(index) = self.first_free_slot() {
                    self.slots[index] = Some(ItemStack {
                        id: id.to_string(),
                        qty: 1,
                        meta: meta.clone(),
                    });
                }
            }
            return true;
        }

        let mut remaining = qty;

        for stack in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if stack.id == id && stack.meta.is_none() && stack.qty < max_stack {
                let add = remaining.min(max_stack - stack.qty);
                stack.qty += add;
                remaining -= add;
            }
        }

        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add = remaining.min(max_stack);
                *slot = Some(ItemStack {
                    id: id.to_string(),
                    qty: add,
                    meta: None,
                });
                remaining -= add;
            }
        }

        remaining == 0
    }

    /// Remove `qty` units front-to-back. A meta-bearing slot counts as a
    /// single unit. Returns false if fewer than `qty` were present; what
    /// was found is still removed.
    pub fn remove(&mut self, id: &str, qty: u32) -> bool {
        let mut remaining = qty;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot.as_mut() else { continue };
            if stack.id != id {
                continue;
            }
            if stack.meta.is_some() {
                *slot = None;
                remaining -= 1;
                continue;
            }
            let take = remaining.min(stack.qty);
            stack.qty -= take;
            remaining -= take;
            if stack.qty == 0 {
                *slot = None;
            }
        }
        remaining == 0
    }

    /// Take a single unit, keeping its meta.
    pub fn take_one(&mut self, id: &str) -> Option<ItemStack> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|stack| stack.id == id))?;
        let stack = slot.as_mut()?;
        if stack.meta.is_some() || stack.qty <= 1 {
            return slot.take().map(|mut s| {
                s.qty = 1;
                s
            });
        }
        stack.qty -= 1;
        Some(ItemStack {
            id: stack.id.clone(),
            qty: 1,
            meta: None,
        })
    }

    pub fn count(&self, id: &str) -> u32 {
        self.stacks()
            .filter(|s| s.id == id)
            .map(|s| if s.meta.is_some() { 1 } else { s.qty })
            .sum()
    }

    pub fn has(&self, id: &str, qty: u32) -> bool {
        self.count(id) >= qty
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER — position, hand, focus
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Normalized per-frame movement request from the controller layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub dx: f32,
    pub dy: f32,
    pub sprint: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hand: Option<ItemId>,
    pub intent: MoveIntent,
    pub facing: Facing,
    /// Nearest interactable within range, for highlighting.
    pub focus: Option<EntityId>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: WorldBounds::default().center(),
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            hand: None,
            intent: MoveIntent::default(),
            facing: Facing::Down,
            focus: None,
        }
    }
}

impl Player {
    /// Clear the hand once the held item has run out.
    pub fn release_hand_if_gone(&mut self, inventory: &Inventory) {
        if let Some(id) = &self.hand {
            if inventory.count(id) == 0 {
                self.hand = None;
            }
        }
    }
}

#[derive(Resource, Debug, Clone, Deref, DerefMut)]
pub struct PlayerInventory(pub Inventory);

impl Default for PlayerInventory {
    fn default() -> Self {
        Self(Inventory::with_slots(PLAYER_INVENTORY_SLOTS))
    }
}

#[derive(Resource, Debug, Clone, Deref, DerefMut)]
pub struct Wallet(pub Inventory);

impl Default for Wallet {
    fn default() -> Self {
        Self(Inventory::with_slots(WALLET_SLOTS))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panel {
    Inventory,
    Wallet,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct UiPanels {
    pub inventory_open: bool,
    pub wallet_open: bool,
    pub open_chest: Option<EntityId>,
}

// ═══════════════════════════════════════════════════════════════════════
// METABOLISM SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusEffect {
    Slow,
    Blur,
    Weakness,
    Strength,
    Saturation,
    Starving,
    Fatigued,
}

pub type EffectSet = BTreeSet<StatusEffect>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub carbs: f32,
    pub protein: f32,
    pub fat: f32,
}

impl Macros {
    pub fn any_empty(&self) -> bool {
        self.carbs == 0.0 || self.protein == 0.0 || self.fat == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FatigueState {
    pub active: bool,
    pub remaining_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HungerSnapshot {
    pub macros: Macros,
    pub hunger: f32,
    pub stamina: f32,
    pub effects: EffectSet,
    pub fatigue: FatigueState,
    pub blur_visible: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// NOTIFICATION OUTBOX — filled by the simulation, flushed into events
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Ping(String),
    Toast(String),
    InventoryChanged,
    WalletChanged,
    CraftChanged,
    ChestOpen(EntityId),
    ChestClose,
    ChestChanged(EntityId),
    HungerChanged(HungerSnapshot),
    EffectsChanged(EffectSet),
    StaminaFatigue(FatigueState),
    PanelToggled { panel: Panel, open: bool },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Outbox {
    queue: Vec<Notification>,
}

impl Outbox {
    pub fn push(&mut self, note: Notification) {
        self.queue.push(note);
    }

    pub fn ping(&mut self, message: impl Into<String>) {
        self.queue.push(Notification::Ping(message.into()));
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.queue.push(Notification::Toast(message.into()));
    }

    pub fn pending(&self) -> &[Notification] {
        &self.queue
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Notification> {
        self.queue.drain(..)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT EVENTS — produced by the controller layer
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, Copy)]
pub struct MoveInputEvent {
    pub dx: f32,
    pub dy: f32,
    pub sprint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickButton {
    Left,
    Right,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ClickEvent {
    pub button: ClickButton,
    /// Canvas coordinates; mapped to the world through the camera.
    pub screen: Vec2,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DropHandOneEvent;

#[derive(Event, Debug, Clone)]
pub struct DropInventoryItemEvent {
    pub id: ItemId,
}

#[derive(Event, Debug, Clone)]
pub struct WorldDropEvent {
    pub id: ItemId,
    pub qty: u32,
    pub meta: Option<ItemMeta>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiActionEvent {
    ToggleInventory,
    ToggleWallet,
    Esc,
}

#[derive(Event, Debug, Clone)]
pub struct SelectHandEvent {
    pub id: Option<ItemId>,
}

#[derive(Event, Debug, Clone)]
pub struct CraftRequestEvent {
    pub recipe_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Player inventory into the container.
    Stow,
    /// Container back into the player inventory.
    Retrieve,
}

#[derive(Event, Debug, Clone)]
pub struct StashTransferEvent {
    pub id: ItemId,
    pub direction: TransferDirection,
}

#[derive(Event, Debug, Clone)]
pub struct ChestTransferEvent {
    pub id: ItemId,
    pub direction: TransferDirection,
}

// ═══════════════════════════════════════════════════════════════════════
// NOTIFICATION EVENTS — consumed by UI and render layers
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct PingEvent {
    pub message: String,
}

#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct InventoryChangedEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct WalletChangedEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct CraftChangedEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct ChestOpenEvent {
    pub chest: EntityId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ChestCloseEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct ChestChangedEvent {
    pub chest: EntityId,
}

#[derive(Event, Debug, Clone)]
pub struct HungerChangedEvent {
    pub state: HungerSnapshot,
}

#[derive(Event, Debug, Clone)]
pub struct EffectsChangedEvent {
    pub effects: EffectSet,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct StaminaFatigueEvent {
    pub active: bool,
    pub remaining_ms: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PanelToggledEvent {
    pub panel: Panel,
    pub open: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 32.0;
pub const WORLD_WIDTH: f32 = 2400.0;
pub const WORLD_HEIGHT: f32 = 1800.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

pub const PLAYER_RADIUS: f32 = 14.0;
pub const PLAYER_SPEED: f32 = 210.0;
pub const INTERACT_RANGE: f32 = 56.0;

pub const PLAYER_INVENTORY_SLOTS: usize = 20;
pub const WALLET_SLOTS: usize = 8;
pub const CHEST_SLOTS: usize = 18;

pub const MAX_HUNGER: f32 = 100.0;
pub const MAX_STAMINA: f32 = 100.0;

pub const DEFAULT_DROP_TTL_MS: f64 = 300_000.0;
pub const TOAST_SECS: f32 = 2.5;

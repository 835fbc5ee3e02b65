//! Simulated world objects.
//!
//! Every object is a `SimEntity`: an `EntityCore` (position, size, hit
//! points, lifecycle flags) plus an `EntityBody` holding the per-kind state
//! machine. The world arena owns all of them; bodies never reference each
//! other. Anything an entity does to the rest of the world (spawning drops,
//! hit particles, scaring the herd, pinging the player) is written into the
//! `WorldEffects` passed in through `EntityCtx` and applied by the world.

pub mod cow;
pub mod pickups;
pub mod props;
pub mod structures;

use bevy::prelude::*;
use rand::rngs::StdRng;
use std::fmt;

use crate::shared::*;

pub use cow::{Cow, Creature, Knockback};
pub use pickups::{Coin, HitEffect, ItemDrop};
pub use props::{BerryBush, NutTree, Rock, Tree};
pub use structures::{Campfire, Chest, CookJob, DisplayProp};

// ═══════════════════════════════════════════════════════════════════════
// KINDS & CORE STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Tree,
    Rock,
    BerryBush,
    NutTree,
    Campfire,
    Chest,
    Display,
    Cow,
    ItemDrop,
    Coin,
    HitEffect,
}

impl EntityKind {
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Tree => "prop.tree",
            EntityKind::Rock => "prop.rock",
            EntityKind::BerryBush => "prop.berry-bush",
            EntityKind::NutTree => "prop.nut-tree",
            EntityKind::Campfire => "prop.campfire",
            EntityKind::Chest => "prop.chest",
            EntityKind::Display => "prop.display",
            EntityKind::Cow => "creature.cow",
            EntityKind::ItemDrop => "item.drop",
            EntityKind::Coin => "item.coin",
            EntityKind::HitEffect => "effect.hit",
        }
    }

    /// Whether left/right clicks and focus highlighting consider this kind.
    pub fn is_interactable(self) -> bool {
        !matches!(self, EntityKind::HitEffect)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }
}

/// Static shape of a kind, used when an entity is created.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub size: SizeClass,
    pub radius: f32,
    pub hp: Option<u32>,
    pub tangible: bool,
    pub breakable: bool,
}

#[derive(Debug, Clone)]
pub struct EntityCore {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: SizeClass,
    pub radius: f32,
    /// `None` for indestructible, non-combat objects.
    pub health: Option<Health>,
    /// Blocks player movement and placement.
    pub tangible: bool,
    pub dead: bool,
    pub breakable: bool,
    pub placeable: bool,
    /// Productive interactions are refused until this clock time.
    pub rest_until_ms: f64,
}

impl EntityCore {
    pub fn hp(&self) -> Option<u32> {
        self.health.map(|h| h.current)
    }

    pub fn is_resting(&self, now_ms: f64) -> bool {
        now_ms < self.rest_until_ms
    }

    pub fn rest_for(&mut self, now_ms: f64, duration_ms: f64) {
        self.rest_until_ms = now_ms + duration_ms;
    }

    pub fn rest_remaining_ms(&self, now_ms: f64) -> f64 {
        (self.rest_until_ms - now_ms).max(0.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD EFFECTS — the capability handed to entity hooks
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    pub id: ItemId,
    pub qty: u32,
    pub pos: Vec2,
    pub meta: Option<ItemMeta>,
    /// `None` uses the world's default lifetime.
    pub ttl_ms: Option<f64>,
}

/// A creature was struck at `origin` by something at `threat`; nearby
/// herd members should flee too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FearSignal {
    pub source: EntityId,
    pub origin: Vec2,
    pub threat: Vec2,
}

#[derive(Debug, Default)]
pub struct WorldEffects {
    pub drops: Vec<DropRequest>,
    /// Positions where hit particles should appear.
    pub hits: Vec<Vec2>,
    pub fear: Vec<FearSignal>,
    pub notices: Vec<Notification>,
}

impl WorldEffects {
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
            && self.hits.is_empty()
            && self.fear.is_empty()
            && self.notices.is_empty()
    }

    pub fn drops_of(&self, id: &str) -> impl Iterator<Item = &DropRequest> + '_ {
        let id = id.to_string();
        self.drops.iter().filter(move |d| d.id == id)
    }

    /// Total quantity of `id` across all requested drops.
    pub fn dropped_qty(&self, id: &str) -> u32 {
        self.drops_of(id).map(|d| d.qty).sum()
    }
}

pub struct EntityCtx<'a> {
    pub now_ms: f64,
    pub bounds: WorldBounds,
    pub rng: &'a mut StdRng,
    pub fx: &'a mut WorldEffects,
}

impl EntityCtx<'_> {
    pub fn drop_item(&mut self, id: &str, qty: u32, pos: Vec2) {
        self.fx.drops.push(DropRequest {
            id: id.to_string(),
            qty: qty.max(1),
            pos,
            meta: None,
            ttl_ms: None,
        });
    }

    pub fn request_drop(&mut self, request: DropRequest) {
        self.fx.drops.push(request);
    }

    pub fn ping(&mut self, message: impl Into<String>) {
        self.fx.notices.push(Notification::Ping(message.into()));
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.fx.notices.push(Notification::Toast(message.into()));
    }
}

/// What the player is holding when they click, plus the multiplier their
/// status effects give to damage.
#[derive(Debug, Clone, Copy)]
pub struct Strike {
    pub tooling: Tooling,
    pub multiplier: f32,
    pub from: Vec2,
}

impl Strike {
    pub fn bare(from: Vec2) -> Self {
        Self {
            tooling: Tooling::default(),
            multiplier: 1.0,
            from,
        }
    }

    pub fn with_tool(tooling: Tooling, from: Vec2) -> Self {
        Self {
            tooling,
            multiplier: 1.0,
            from,
        }
    }
}

/// Result of a body's `interact` hook. Damage and breaking are applied by
/// `SimEntity` so the hp and break-once rules live in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Ignored,
    Handled,
    /// Structure damage; breaks on the transition to zero.
    Damage(u32),
    /// Creature damage; runs the on-hit hook every time.
    Strike(u32),
    /// Break immediately.
    Dismantle,
}

// ═══════════════════════════════════════════════════════════════════════
// RENDER HOOKS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Burst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub shape: Shape,
    pub color: Color,
    pub radius: f32,
    pub alpha: f32,
}

impl Appearance {
    pub fn solid(shape: Shape, color: Color, radius: f32) -> Self {
        Self {
            shape,
            color,
            radius,
            alpha: 1.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BEHAVIOR — per-kind hooks
// ═══════════════════════════════════════════════════════════════════════

pub trait Behavior {
    fn kind(&self) -> EntityKind;

    fn profile(&self) -> Profile;

    fn label(&self, core: &EntityCore, catalog: &ItemCatalog, now_ms: f64) -> String;

    fn appearance(&self, core: &EntityCore, now_ms: f64) -> Appearance;

    fn update(&mut self, _core: &mut EntityCore, _dt: f32, _ctx: &mut EntityCtx) {}

    fn interact(
        &mut self,
        _core: &mut EntityCore,
        _strike: &Strike,
        _ctx: &mut EntityCtx,
    ) -> Interaction {
        Interaction::Ignored
    }

    /// Residual drops. Runs at most once per entity.
    fn on_break(&mut self, _core: &EntityCore, _ctx: &mut EntityCtx) {}

    /// Every creature hit, lethal or not.
    fn on_hit(&mut self, _core: &mut EntityCore, _from: Vec2, _ctx: &mut EntityCtx) {}

    fn on_death(&mut self, _core: &EntityCore, _ctx: &mut EntityCtx) {}
}

#[derive(Debug, Clone)]
pub enum EntityBody {
    Tree(Tree),
    Rock(Rock),
    BerryBush(BerryBush),
    NutTree(NutTree),
    Campfire(Campfire),
    Chest(Chest),
    Display(DisplayProp),
    Cow(Cow),
    Drop(ItemDrop),
    Coin(Coin),
    HitEffect(HitEffect),
}

impl EntityBody {
    pub fn behavior(&self) -> &dyn Behavior {
        match self {
            EntityBody::Tree(b) => b,
            EntityBody::Rock(b) => b,
            EntityBody::BerryBush(b) => b,
            EntityBody::NutTree(b) => b,
            EntityBody::Campfire(b) => b,
            EntityBody::Chest(b) => b,
            EntityBody::Display(b) => b,
            EntityBody::Cow(b) => b,
            EntityBody::Drop(b) => b,
            EntityBody::Coin(b) => b,
            EntityBody::HitEffect(b) => b,
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn Behavior {
        match self {
            EntityBody::Tree(b) => b,
            EntityBody::Rock(b) => b,
            EntityBody::BerryBush(b) => b,
            EntityBody::NutTree(b) => b,
            EntityBody::Campfire(b) => b,
            EntityBody::Chest(b) => b,
            EntityBody::Display(b) => b,
            EntityBody::Cow(b) => b,
            EntityBody::Drop(b) => b,
            EntityBody::Coin(b) => b,
            EntityBody::HitEffect(b) => b,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.behavior().kind()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIM ENTITY — lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SimEntity {
    pub core: EntityCore,
    pub body: EntityBody,
}

impl SimEntity {
    pub fn new(id: EntityId, pos: Vec2, body: EntityBody) -> Self {
        let profile = body.behavior().profile();
        let is_prop = matches!(
            body.kind(),
            EntityKind::Tree
                | EntityKind::Rock
                | EntityKind::BerryBush
                | EntityKind::NutTree
                | EntityKind::Campfire
                | EntityKind::Chest
                | EntityKind::Display
        );
        Self {
            core: EntityCore {
                id,
                pos,
                size: profile.size,
                radius: profile.radius,
                health: profile.hp.map(Health::full),
                tangible: profile.tangible,
                dead: false,
                breakable: profile.breakable,
                placeable: is_prop,
                rest_until_ms: 0.0,
            },
            body,
        }
    }

    pub fn id(&self) -> EntityId {
        self.core.id
    }

    pub fn pos(&self) -> Vec2 {
        self.core.pos
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn is_alive(&self) -> bool {
        !self.core.dead
    }

    pub fn hp(&self) -> Option<u32> {
        self.core.hp()
    }

    /// Lower hp, never below zero. Breaks exactly once, on the transition
    /// to zero. Returns true if this call broke the entity.
    pub fn damage(&mut self, amount: u32, ctx: &mut EntityCtx) -> bool {
        let Some(health) = self.core.health.as_mut() else {
            return false;
        };
        if health.current == 0 {
            return false;
        }
        health.current = health.current.saturating_sub(amount);
        if health.current == 0 {
            return self.break_apart(ctx);
        }
        false
    }

    pub fn heal(&mut self, amount: u32) {
        if let Some(health) = self.core.health.as_mut() {
            health.current = health.current.saturating_add(amount).min(health.max);
        }
    }

    /// Mark dead and spawn residual drops. A second call is a no-op and
    /// returns false.
    pub fn break_apart(&mut self, ctx: &mut EntityCtx) -> bool {
        if self.core.dead || !self.core.breakable {
            return false;
        }
        self.core.dead = true;
        self.body.behavior_mut().on_break(&self.core, ctx);
        true
    }

    /// Creature combat entry: the on-hit hook runs on every hit, the
    /// on-death hook only when hp reaches zero.
    pub fn take_damage(&mut self, amount: u32, from: Vec2, ctx: &mut EntityCtx) {
        if self.core.dead {
            return;
        }
        let Some(health) = self.core.health.as_mut() else {
            return;
        };
        health.current = health.current.saturating_sub(amount);
        let lethal = health.current == 0;
        self.body.behavior_mut().on_hit(&mut self.core, from, ctx);
        if lethal {
            self.core.dead = true;
            self.body.behavior_mut().on_death(&self.core, ctx);
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut EntityCtx) {
        if self.core.dead {
            return;
        }
        self.body.behavior_mut().update(&mut self.core, dt, ctx);
    }

    /// Run the body's interaction and apply whatever damage it asks for.
    pub fn interact(&mut self, strike: &Strike, ctx: &mut EntityCtx) -> Interaction {
        if self.core.dead {
            return Interaction::Ignored;
        }
        let outcome = self.body.behavior_mut().interact(&mut self.core, strike, ctx);
        match outcome {
            Interaction::Damage(amount) => {
                self.damage(amount, ctx);
            }
            Interaction::Strike(amount) => self.take_damage(amount, strike.from, ctx),
            Interaction::Dismantle => {
                self.break_apart(ctx);
            }
            Interaction::Ignored | Interaction::Handled => {}
        }
        outcome
    }

    pub fn label(&self, catalog: &ItemCatalog, now_ms: f64) -> String {
        self.body.behavior().label(&self.core, catalog, now_ms)
    }

    pub fn appearance(&self, now_ms: f64) -> Appearance {
        self.body.behavior().appearance(&self.core, now_ms)
    }

    pub fn as_cow_mut(&mut self) -> Option<&mut Cow> {
        match &mut self.body {
            EntityBody::Cow(cow) => Some(cow),
            _ => None,
        }
    }

    pub fn as_campfire_mut(&mut self) -> Option<&mut Campfire> {
        match &mut self.body {
            EntityBody::Campfire(fire) => Some(fire),
            _ => None,
        }
    }

    pub fn as_chest(&self) -> Option<&Chest> {
        match &self.body {
            EntityBody::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    pub fn as_chest_mut(&mut self) -> Option<&mut Chest> {
        match &mut self.body {
            EntityBody::Chest(chest) => Some(chest),
            _ => None,
        }
    }
}

/// `"3/5"`-style hit point readout used by labels.
pub(crate) fn hp_text(core: &EntityCore) -> String {
    match core.health {
        Some(h) => format!("{}/{}", h.current, h.max),
        None => "-".to_string(),
    }
}

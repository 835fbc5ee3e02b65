//! Resource nodes: trees, rocks, berry bushes and nut trees.

use bevy::prelude::*;
use rand::Rng;

use super::*;

pub const TREE_HP: u32 = 5;
pub const ROCK_HP: u32 = 20;
pub const BERRY_BUSH_HP: u32 = 10;
pub const NUT_TREE_HP: u32 = 8;

/// Bare-hand taps needed to shake loose a stick or a nut.
pub const TAPS_PER_YIELD: u32 = 10;

const TREE_WOOD_DROPS: u32 = 10;
const BERRY_REST_MS: f64 = 20.0 * 60.0 * 1000.0;
const NUT_REST_MS: f64 = 4500.0;

// ═══════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Tree {
    pub taps: u32,
    max_hp: u32,
}

impl Tree {
    pub fn new(max_hp: u32) -> Self {
        Self { taps: 0, max_hp }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(TREE_HP)
    }
}

impl Behavior for Tree {
    fn kind(&self) -> EntityKind {
        EntityKind::Tree
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Large,
            radius: 22.0,
            hp: Some(self.max_hp),
            tangible: true,
            breakable: true,
        }
    }

    fn label(&self, core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        format!("Tree ({})", hp_text(core))
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Circle, Color::srgb_u8(34, 139, 34), core.radius)
    }

    fn interact(
        &mut self,
        core: &mut EntityCore,
        strike: &Strike,
        ctx: &mut EntityCtx,
    ) -> Interaction {
        if strike.tooling.chop {
            let remaining = core.hp().unwrap_or(0).saturating_sub(1);
            ctx.ping(format!("Axe bites the tree: hp {remaining}"));
            return Interaction::Damage(1);
        }

        self.taps += 1;
        if self.taps % TAPS_PER_YIELD == 0 {
            ctx.drop_item("stick", 1, core.pos);
            ctx.ping("Got a stick!");
        } else {
            let left = TAPS_PER_YIELD - self.taps % TAPS_PER_YIELD;
            ctx.ping(format!("Keep hitting... {left} more"));
        }
        Interaction::Handled
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        for _ in 0..TREE_WOOD_DROPS {
            ctx.drop_item("wood", 1, core.pos);
        }
        let saplings = if ctx.rng.gen_bool(0.5) { 1 } else { 3 };
        for _ in 0..saplings {
            ctx.drop_item("sapling", 1, core.pos);
        }
        if ctx.rng.gen_bool(0.4) {
            ctx.drop_item("stick", 2, core.pos);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ROCK
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Rock;

impl Rock {
    /// Mining tools hit for 5, anything else for 2, scaled by status
    /// effects and never below 1.
    pub fn hit_damage(strike: &Strike) -> u32 {
        let base: f32 = if strike.tooling.mine { 5.0 } else { 2.0 };
        ((base * strike.multiplier).floor() as u32).max(1)
    }
}

impl Behavior for Rock {
    fn kind(&self) -> EntityKind {
        EntityKind::Rock
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Large,
            radius: 20.0,
            hp: Some(ROCK_HP),
            tangible: true,
            breakable: true,
        }
    }

    fn label(&self, core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        format!("Rock ({})", hp_text(core))
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Circle, Color::srgb_u8(156, 163, 175), core.radius)
    }

    fn interact(
        &mut self,
        core: &mut EntityCore,
        strike: &Strike,
        ctx: &mut EntityCtx,
    ) -> Interaction {
        let applied = Rock::hit_damage(strike);
        let remaining = core.hp().unwrap_or(0).saturating_sub(applied);
        ctx.ping(format!("Rock: hp {remaining}"));
        Interaction::Damage(applied)
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        let shards = ctx.rng.gen_range(1..=3);
        ctx.drop_item("rockshard", shards, core.pos);
        if ctx.rng.gen_bool(0.5) {
            ctx.drop_item("coal", 1, core.pos);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BERRY BUSH
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct BerryBush;

impl Behavior for BerryBush {
    fn kind(&self) -> EntityKind {
        EntityKind::BerryBush
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Medium,
            radius: 18.0,
            hp: Some(BERRY_BUSH_HP),
            tangible: false,
            breakable: true,
        }
    }

    fn label(&self, core: &EntityCore, _catalog: &ItemCatalog, now_ms: f64) -> String {
        if core.is_resting(now_ms) {
            "Berry bush (regrowing)".to_string()
        } else {
            "Berry bush (ripe)".to_string()
        }
    }

    fn appearance(&self, core: &EntityCore, now_ms: f64) -> Appearance {
        let color = if core.is_resting(now_ms) {
            Color::srgb_u8(22, 101, 52)
        } else {
            Color::srgb_u8(190, 18, 60)
        };
        Appearance::solid(Shape::Circle, color, core.radius)
    }

    fn interact(
        &mut self,
        core: &mut EntityCore,
        strike: &Strike,
        ctx: &mut EntityCtx,
    ) -> Interaction {
        if strike.tooling.chop {
            ctx.ping("You hack at the bush");
            return Interaction::Damage(2);
        }

        if core.is_resting(ctx.now_ms) {
            let minutes = (core.rest_remaining_ms(ctx.now_ms) / 60_000.0).ceil();
            ctx.ping(format!("The bush needs to rest (~{minutes} min left)"));
            return Interaction::Handled;
        }

        let qty = ctx.rng.gen_range(3..=5);
        ctx.drop_item("berries", qty, core.pos);
        ctx.ping(format!("Picked {qty} berries!"));
        core.rest_for(ctx.now_ms, BERRY_REST_MS);
        Interaction::Handled
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        let qty = ctx.rng.gen_range(2..=3);
        ctx.drop_item("berries", qty, core.pos);
        if ctx.rng.gen_bool(0.35) {
            ctx.drop_item("stick", 1, core.pos);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NUT TREE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct NutTree {
    pub taps: u32,
}

impl Behavior for NutTree {
    fn kind(&self) -> EntityKind {
        EntityKind::NutTree
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Large,
            radius: 22.0,
            hp: Some(NUT_TREE_HP),
            tangible: true,
            breakable: true,
        }
    }

    fn label(&self, core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        format!("Nut tree ({})", hp_text(core))
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Circle, Color::srgb_u8(120, 84, 40), core.radius)
    }

    fn interact(
        &mut self,
        core: &mut EntityCore,
        strike: &Strike,
        ctx: &mut EntityCtx,
    ) -> Interaction {
        if strike.tooling.chop {
            let remaining = core.hp().unwrap_or(0).saturating_sub(1);
            ctx.ping(format!("Axe bites the nut tree: hp {remaining}"));
            return Interaction::Damage(1);
        }

        if core.is_resting(ctx.now_ms) {
            let secs = (core.rest_remaining_ms(ctx.now_ms) / 1000.0).ceil();
            ctx.ping(format!("The tree is settling ({secs}s)"));
            return Interaction::Handled;
        }

        self.taps += 1;
        if self.taps >= TAPS_PER_YIELD {
            ctx.drop_item("nuts", 1, core.pos);
            ctx.ping("A nut fell from the tree!");
            self.taps = 0;
            core.rest_for(ctx.now_ms, NUT_REST_MS);
        } else {
            ctx.ping(format!("Keep shaking... {} more", TAPS_PER_YIELD - self.taps));
        }
        Interaction::Handled
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        ctx.drop_item("wood", 6, core.pos);
        ctx.drop_item("nuts", 3, core.pos);
        if ctx.rng.gen_bool(0.35) {
            ctx.drop_item("stick", 2, core.pos);
        }
    }
}

//! Player-built structures: campfires, chests and display props.

use bevy::prelude::*;

use super::*;

pub const CAMPFIRE_HP: u32 = 14;
pub const CHEST_HP: u32 = 12;
pub const DISPLAY_HP: u32 = 4;

pub const COOK_TIME_MS: f64 = 30_000.0;
pub const COOKED_TTL_MS: f64 = 240_000.0;

/// Raw item to cooked item.
pub fn cooked_form(raw: &str) -> Option<&'static str> {
    match raw {
        "beef" => Some("cookedbeef"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CAMPFIRE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct CookJob {
    pub item: ItemId,
    pub ready_at_ms: f64,
}

/// Cooks one item at a time.
#[derive(Debug, Clone, Default)]
pub struct Campfire {
    pub cooking: Option<CookJob>,
}

impl Campfire {
    pub fn is_cooking(&self) -> bool {
        self.cooking.is_some()
    }

    pub fn can_cook(&self, item: &str) -> bool {
        cooked_form(item).is_some()
    }

    /// Returns false if the item has no cooked form or a job is running.
    pub fn start_cooking(&mut self, item: &str, now_ms: f64) -> bool {
        if !self.can_cook(item) || self.is_cooking() {
            return false;
        }
        self.cooking = Some(CookJob {
            item: item.to_string(),
            ready_at_ms: now_ms + COOK_TIME_MS,
        });
        true
    }
}

impl Behavior for Campfire {
    fn kind(&self) -> EntityKind {
        EntityKind::Campfire
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Medium,
            radius: 16.0,
            hp: Some(CAMPFIRE_HP),
            tangible: true,
            breakable: true,
        }
    }

    fn label(&self, _core: &EntityCore, catalog: &ItemCatalog, now_ms: f64) -> String {
        match &self.cooking {
            Some(job) => {
                let secs = ((job.ready_at_ms - now_ms).max(0.0) / 1000.0).ceil();
                format!("Campfire (cooking {}, {secs}s)", catalog.name(&job.item))
            }
            None => "Campfire".to_string(),
        }
    }

    fn appearance(&self, core: &EntityCore, now_ms: f64) -> Appearance {
        let flicker = ((now_ms + f64::from(core.pos.x + core.pos.y)) * 0.01).sin() as f32;
        let base = if self.is_cooking() { 12.0 } else { 8.0 };
        Appearance {
            shape: Shape::Burst,
            color: Color::srgb_u8(249, 115, 22),
            radius: base + flicker * 2.0,
            alpha: 1.0,
        }
    }

    fn update(&mut self, core: &mut EntityCore, _dt: f32, ctx: &mut EntityCtx) {
        let Some(job) = &self.cooking else { return };
        if ctx.now_ms < job.ready_at_ms {
            return;
        }
        if let Some(cooked) = cooked_form(&job.item) {
            ctx.request_drop(DropRequest {
                id: cooked.to_string(),
                qty: 1,
                pos: core.pos - Vec2::new(0.0, 18.0),
                meta: None,
                ttl_ms: Some(COOKED_TTL_MS),
            });
            ctx.ping("The meat is ready!");
        }
        self.cooking = None;
    }

    fn interact(
        &mut self,
        _core: &mut EntityCore,
        strike: &Strike,
        ctx: &mut EntityCtx,
    ) -> Interaction {
        if strike.tooling.any() {
            ctx.ping("Campfire taken apart");
            return Interaction::Dismantle;
        }
        if !self.is_cooking() {
            ctx.toast("Right-click while holding raw beef to cook");
        }
        Interaction::Handled
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        ctx.drop_item("coal", 1, core.pos);
        ctx.drop_item("wood", 1, core.pos);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CHEST
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Chest {
    pub inventory: Inventory,
}

impl Chest {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

impl Default for Chest {
    fn default() -> Self {
        Self::new(Inventory::with_slots(CHEST_SLOTS))
    }
}

impl Behavior for Chest {
    fn kind(&self) -> EntityKind {
        EntityKind::Chest
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Medium,
            radius: 18.0,
            hp: Some(CHEST_HP),
            tangible: true,
            breakable: true,
        }
    }

    fn label(&self, _core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        let used = self.inventory.capacity() - self.inventory.free_slots();
        format!("Chest ({used}/{})", self.inventory.capacity())
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Square, Color::srgb_u8(146, 64, 14), core.radius)
    }

    /// The contents travel with the dropped chest item.
    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        let inventory = std::mem::take(&mut self.inventory);
        ctx.request_drop(DropRequest {
            id: "chest".to_string(),
            qty: 1,
            pos: core.pos,
            meta: Some(ItemMeta::Container(inventory)),
            ttl_ms: None,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DISPLAY PROP — any other placeable item set down in the world
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct DisplayProp {
    pub item: ItemId,
}

impl DisplayProp {
    pub fn new(item: impl Into<ItemId>) -> Self {
        Self { item: item.into() }
    }
}

impl Behavior for DisplayProp {
    fn kind(&self) -> EntityKind {
        EntityKind::Display
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Small,
            radius: 14.0,
            hp: Some(DISPLAY_HP),
            tangible: false,
            breakable: true,
        }
    }

    fn label(&self, _core: &EntityCore, catalog: &ItemCatalog, _now_ms: f64) -> String {
        catalog.name(&self.item)
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Square, Color::srgb_u8(148, 163, 184), core.radius)
    }

    fn interact(
        &mut self,
        _core: &mut EntityCore,
        strike: &Strike,
        _ctx: &mut EntityCtx,
    ) -> Interaction {
        if strike.tooling.any() {
            Interaction::Dismantle
        } else {
            Interaction::Ignored
        }
    }

    fn on_break(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        ctx.drop_item(&self.item, 1, core.pos);
    }
}

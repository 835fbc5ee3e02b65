//! Things lying on the ground: item drops, coins, and short-lived hit
//! particles.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use super::*;

// ═══════════════════════════════════════════════════════════════════════
// ITEM DROP
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ItemDrop {
    pub item: ItemId,
    pub qty: u32,
    pub meta: Option<ItemMeta>,
    /// Despawns once the clock passes this. `None` never expires.
    pub expires_at_ms: Option<f64>,
}

impl ItemDrop {
    pub fn new(
        item: impl Into<ItemId>,
        qty: u32,
        meta: Option<ItemMeta>,
        now_ms: f64,
        ttl_ms: f64,
    ) -> Self {
        Self {
            item: item.into(),
            qty: qty.max(1),
            meta,
            expires_at_ms: (ttl_ms > 0.0).then_some(now_ms + ttl_ms),
        }
    }
}

impl Behavior for ItemDrop {
    fn kind(&self) -> EntityKind {
        EntityKind::ItemDrop
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Small,
            radius: 12.0,
            hp: None,
            tangible: false,
            breakable: false,
        }
    }

    fn label(&self, _core: &EntityCore, catalog: &ItemCatalog, _now_ms: f64) -> String {
        if self.qty > 1 {
            format!("{} x{}", catalog.name(&self.item), self.qty)
        } else {
            catalog.name(&self.item)
        }
    }

    fn appearance(&self, core: &EntityCore, now_ms: f64) -> Appearance {
        // Blink through the last ten seconds.
        let alpha = match self.expires_at_ms {
            Some(at) if at - now_ms < 10_000.0 && ((now_ms / 250.0) as u64) % 2 == 0 => 0.4,
            _ => 1.0,
        };
        Appearance {
            shape: Shape::Square,
            color: Color::srgb_u8(250, 204, 21),
            radius: core.radius,
            alpha,
        }
    }

    fn update(&mut self, core: &mut EntityCore, _dt: f32, ctx: &mut EntityCtx) {
        if self.expires_at_ms.is_some_and(|at| ctx.now_ms >= at) {
            core.dead = true;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Coin {
    pub value: u32,
}

impl Default for Coin {
    fn default() -> Self {
        Self { value: 1 }
    }
}

impl Behavior for Coin {
    fn kind(&self) -> EntityKind {
        EntityKind::Coin
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Small,
            radius: 10.0,
            hp: None,
            tangible: false,
            breakable: false,
        }
    }

    fn label(&self, _core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        "Coin".to_string()
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Circle, Color::srgb_u8(234, 179, 8), core.radius)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HIT PARTICLES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub offset: Vec2,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct HitEffect {
    pub life: f32,
    pub total: f32,
    pub particles: Vec<Particle>,
}

impl HitEffect {
    pub fn burst(rng: &mut StdRng) -> Self {
        let duration = rng.gen_range(0.3..0.6);
        let particles = (0..6)
            .map(|_| Particle {
                offset: Vec2::new(rng.gen_range(-9.0..9.0), rng.gen_range(-9.0..9.0)),
                size: rng.gen_range(2.0..4.0),
            })
            .collect();
        Self {
            life: duration,
            total: duration,
            particles,
        }
    }
}

impl Behavior for HitEffect {
    fn kind(&self) -> EntityKind {
        EntityKind::HitEffect
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Small,
            radius: 0.0,
            hp: None,
            tangible: false,
            breakable: false,
        }
    }

    fn label(&self, _core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        String::new()
    }

    fn appearance(&self, _core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance {
            shape: Shape::Burst,
            color: Color::srgb_u8(254, 226, 226),
            radius: 9.0,
            alpha: (self.life / self.total).max(0.0),
        }
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, _ctx: &mut EntityCtx) {
        self.life -= dt;
        if self.life <= 0.0 {
            core.dead = true;
        }
    }
}

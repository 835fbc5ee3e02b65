//! Creatures: shared knockback handling and the cow's wander/flee AI.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use super::*;

pub const COW_HP: u32 = 20;
pub const COW_SPEED: f32 = 32.0;
pub const FLEE_SECS: f32 = 6.0;
pub const FLEE_SPEED: f32 = 120.0;
pub const WANDER_SPEED: f32 = 28.0;
pub const WANDER_INTERVAL_SECS: (f32, f32) = (2.0, 5.0);
pub const KNOCKBACK_STRENGTH: f32 = 260.0;
pub const KNOCKBACK_SECS: f32 = 0.4;

// ═══════════════════════════════════════════════════════════════════════
// CREATURE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    /// Initial push velocity; scaled down linearly as `remaining` runs out.
    pub velocity: Vec2,
    pub remaining: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Creature {
    pub speed: f32,
    pub velocity: Vec2,
    pub knockback: Option<Knockback>,
}

impl Creature {
    /// Push away from `toward_source` (the vector from the creature to
    /// whatever hit it).
    pub fn apply_knockback(&mut self, toward_source: Vec2, strength: f32, duration: f32) {
        let dir = toward_source.normalize_or_zero();
        self.knockback = Some(Knockback {
            velocity: -dir * strength,
            remaining: duration,
            duration,
        });
    }

    /// Advance the knockback. Returns true while it is still steering the
    /// creature.
    pub fn update_knockback(&mut self, pos: &mut Vec2, dt: f32, bounds: &WorldBounds) -> bool {
        let Some(kb) = self.knockback.as_mut() else {
            return false;
        };
        kb.remaining -= dt;
        if kb.remaining <= 0.0 {
            self.knockback = None;
            self.velocity = Vec2::ZERO;
            *pos = bounds.clamp(*pos);
            return false;
        }
        let falloff = if kb.duration > 0.0 {
            kb.remaining / kb.duration
        } else {
            0.0
        };
        self.velocity = kb.velocity * falloff;
        *pos = bounds.clamp(*pos + self.velocity * dt);
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COW
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CowMood {
    KnockedBack,
    Fleeing,
    Wandering,
}

#[derive(Debug, Clone)]
pub struct Cow {
    pub creature: Creature,
    pub wander_timer: f32,
    pub wander_dir: Vec2,
    pub flee_timer: f32,
    pub flee_from: Vec2,
}

impl Default for Cow {
    fn default() -> Self {
        Self {
            creature: Creature {
                speed: COW_SPEED,
                ..default()
            },
            wander_timer: 0.0,
            wander_dir: Vec2::ZERO,
            flee_timer: 0.0,
            flee_from: Vec2::ZERO,
        }
    }
}

impl Cow {
    /// Start (or restart) fleeing from `threat`.
    pub fn trigger_flee(&mut self, threat: Vec2) {
        self.flee_timer = FLEE_SECS;
        self.flee_from = threat;
    }

    pub fn is_fleeing(&self) -> bool {
        self.flee_timer > 0.0
    }

    pub fn mood(&self) -> CowMood {
        if self.creature.knockback.is_some() {
            CowMood::KnockedBack
        } else if self.is_fleeing() {
            CowMood::Fleeing
        } else {
            CowMood::Wandering
        }
    }

    /// Weapons hit for 2, anything else for 1; rounded, never below 1.
    pub fn hit_damage(strike: &Strike) -> u32 {
        let base: f32 = if strike.tooling.weapon { 2.0 } else { 1.0 };
        ((base * strike.multiplier).round() as u32).max(1)
    }
}

impl Behavior for Cow {
    fn kind(&self) -> EntityKind {
        EntityKind::Cow
    }

    fn profile(&self) -> Profile {
        Profile {
            size: SizeClass::Large,
            radius: 16.0,
            hp: Some(COW_HP),
            tangible: false,
            breakable: false,
        }
    }

    fn label(&self, core: &EntityCore, _catalog: &ItemCatalog, _now_ms: f64) -> String {
        match self.mood() {
            CowMood::Wandering => format!("Cow ({})", hp_text(core)),
            CowMood::Fleeing | CowMood::KnockedBack => format!("Cow ({}, spooked)", hp_text(core)),
        }
    }

    fn appearance(&self, core: &EntityCore, _now_ms: f64) -> Appearance {
        Appearance::solid(Shape::Circle, Color::srgb_u8(245, 245, 245), core.radius)
    }

    fn update(&mut self, core: &mut EntityCore, dt: f32, ctx: &mut EntityCtx) {
        if self.creature.update_knockback(&mut core.pos, dt, &ctx.bounds) {
            return;
        }

        if self.flee_timer > 0.0 {
            self.flee_timer = (self.flee_timer - dt).max(0.0);
            let away = (core.pos - self.flee_from).normalize_or_zero();
            core.pos = ctx.bounds.clamp(core.pos + away * FLEE_SPEED * dt);
            return;
        }

        self.wander_timer -= dt;
        if self.wander_timer <= 0.0 {
            let (min, max) = WANDER_INTERVAL_SECS;
            self.wander_timer = ctx.rng.gen_range(min..max);
            let angle = ctx.rng.gen_range(0.0..TAU);
            self.wander_dir = Vec2::from_angle(angle);
        }
        core.pos = ctx.bounds.clamp(core.pos + self.wander_dir * WANDER_SPEED * dt);
    }

    fn interact(
        &mut self,
        _core: &mut EntityCore,
        strike: &Strike,
        _ctx: &mut EntityCtx,
    ) -> Interaction {
        Interaction::Strike(Cow::hit_damage(strike))
    }

    fn on_hit(&mut self, core: &mut EntityCore, from: Vec2, ctx: &mut EntityCtx) {
        self.creature
            .apply_knockback(from - core.pos, KNOCKBACK_STRENGTH, KNOCKBACK_SECS);
        self.trigger_flee(from);
        ctx.fx.hits.push(core.pos);
        ctx.fx.fear.push(FearSignal {
            source: core.id,
            origin: core.pos,
            threat: from,
        });
    }

    fn on_death(&mut self, core: &EntityCore, ctx: &mut EntityCtx) {
        ctx.drop_item("beef", 4, core.pos);
        ctx.drop_item("leather", 2, core.pos);
        ctx.drop_item("bone", 3, core.pos);
        ctx.ping("Cow down");
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;

    fn cow_at(pos: Vec2) -> SimEntity {
        SimEntity::new(EntityId(1), pos, EntityBody::Cow(Cow::default()))
    }

    fn sword() -> Strike {
        Strike::with_tool(
            Tooling {
                weapon: true,
                ..default()
            },
            Vec2::new(500.0, 520.0),
        )
    }

    #[test]
    fn test_weapon_hit_arms_flee_and_knockback() {
        let mut h = Harness::new(31);
        let mut cow = cow_at(Vec2::new(500.0, 500.0));
        cow.interact(&sword(), &mut h.ctx());

        assert_eq!(cow.hp(), Some(18));
        assert!(cow.is_alive());
        let body = cow.as_cow_mut().expect("cow body");
        assert_eq!(body.flee_timer, FLEE_SECS);
        assert_eq!(body.flee_from, Vec2::new(500.0, 520.0));
        let kb = body.creature.knockback.expect("knockback armed");
        assert!(kb.velocity.y < 0.0, "pushed away from the attacker");
        assert_eq!(h.fx.hits.len(), 1);
        assert_eq!(h.fx.fear.len(), 1);
    }

    #[test]
    fn test_every_hit_rearms_flee() {
        let mut h = Harness::new(32);
        let mut cow = cow_at(Vec2::new(500.0, 500.0));
        cow.interact(&sword(), &mut h.ctx());
        for _ in 0..30 {
            cow.update(0.05, &mut h.ctx());
        }
        let before = cow.as_cow_mut().map(|c| c.flee_timer).unwrap_or_default();
        assert!(before < FLEE_SECS);
        cow.interact(&sword(), &mut h.ctx());
        assert_eq!(cow.as_cow_mut().map(|c| c.flee_timer), Some(FLEE_SECS));
        assert_eq!(h.fx.fear.len(), 2);
    }

    #[test]
    fn test_knockback_has_priority_then_expires() {
        let mut h = Harness::new(33);
        let mut cow = cow_at(Vec2::new(500.0, 500.0));
        cow.interact(&sword(), &mut h.ctx());
        cow.update(0.1, &mut h.ctx());
        assert_eq!(cow.as_cow_mut().map(|c| c.mood()), Some(CowMood::KnockedBack));
        assert_eq!(
            cow.as_cow_mut().map(|c| c.flee_timer),
            Some(FLEE_SECS),
            "flee timer untouched during knockback"
        );
        for _ in 0..6 {
            cow.update(0.1, &mut h.ctx());
        }
        assert_eq!(cow.as_cow_mut().map(|c| c.mood()), Some(CowMood::Fleeing));
    }

    #[test]
    fn test_knockback_decays_linearly() {
        let bounds = WorldBounds::default();
        let mut creature = Creature::default();
        creature.apply_knockback(Vec2::new(1.0, 0.0), 100.0, 1.0);
        let mut pos = Vec2::new(1000.0, 900.0);
        assert!(creature.update_knockback(&mut pos, 0.5, &bounds));
        assert!((creature.velocity.x + 50.0).abs() < 1e-3);
        assert!(creature.update_knockback(&mut pos, 0.25, &bounds));
        assert!((creature.velocity.x + 25.0).abs() < 1e-3);
        assert!(!creature.update_knockback(&mut pos, 0.5, &bounds));
        assert!(creature.knockback.is_none());
    }

    #[test]
    fn test_fleeing_moves_away_and_stays_in_bounds() {
        let mut h = Harness::new(34);
        let mut cow = cow_at(Vec2::new(30.0, 900.0));
        if let Some(body) = cow.as_cow_mut() {
            body.trigger_flee(Vec2::new(60.0, 900.0));
        }
        for _ in 0..20 {
            cow.update(0.05, &mut h.ctx());
        }
        assert_eq!(cow.pos().x, PLAYER_RADIUS, "clamped at the west edge");
    }

    #[test]
    fn test_death_drops_fixed_loot() {
        let mut h = Harness::new(35);
        let mut cow = cow_at(Vec2::new(500.0, 500.0));
        cow.take_damage(COW_HP, Vec2::ZERO, &mut h.ctx());
        assert!(!cow.is_alive());
        assert_eq!(h.fx.dropped_qty("beef"), 4);
        assert_eq!(h.fx.dropped_qty("leather"), 2);
        assert_eq!(h.fx.dropped_qty("bone"), 3);
        assert_eq!(h.fx.hits.len(), 1, "on-hit still runs for the lethal blow");

        cow.take_damage(5, Vec2::ZERO, &mut h.ctx());
        assert_eq!(h.fx.dropped_qty("beef"), 4, "dead cows drop nothing more");
    }

    #[test]
    fn test_wandering_picks_a_heading() {
        let mut h = Harness::new(36);
        let mut cow = cow_at(Vec2::new(800.0, 800.0));
        cow.update(0.05, &mut h.ctx());
        let body = cow.as_cow_mut().expect("cow body");
        assert!((2.0..5.0).contains(&body.wander_timer));
        assert!((body.wander_dir.length() - 1.0).abs() < 1e-4);
    }
}

//! Metabolism — macro pools, hunger, stamina, fatigue and status effects.
//!
//! `Metabolism` is a single resource mutated only through its methods:
//! `apply_action` / `apply_cost` for activity, `eat` for food, and `tick`
//! once per frame. Every observable change is queued on the `Outbox` as a
//! `HungerChanged`, `EffectsChanged` or `StaminaFatigue` notification.
//! `reset` ties its lifetime to world generation.

pub mod costs;
pub mod effects;

use bevy::prelude::*;

use crate::config::{GameBalance, MetabolismConfig};
use crate::shared::*;

pub use costs::{Action, ActionCostTable, Cost, CostTarget, MacroKind};

const EPSILON: f32 = 1e-4;

pub struct MetabolismPlugin;

impl Plugin for MetabolismPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Metabolism>();
        app.add_systems(Update, tick_metabolism.in_set(TickSet::Metabolism));
    }
}

/// Advance the metabolism by this frame's clamped delta.
pub fn tick_metabolism(
    clock: Res<SimClock>,
    mut metabolism: ResMut<Metabolism>,
    mut outbox: ResMut<Outbox>,
) {
    metabolism.tick(clock.dt_ms(), &mut outbox);
}

#[derive(Resource, Debug, Clone)]
pub struct Metabolism {
    config: MetabolismConfig,
    costs: ActionCostTable,
    macros: Macros,
    hunger: f32,
    stamina: f32,
    effects: EffectSet,
    cooldown_ms: f32,
    sprint_drain: f32,
    blur_timer_ms: f32,
    blur_visible: bool,
    /// Set by run costs, cleared at the end of each tick.
    running: bool,
    last_snapshot: Option<HungerSnapshot>,
    last_fatigue: FatigueState,
}

impl FromWorld for Metabolism {
    fn from_world(world: &mut World) -> Self {
        let balance = world.get_resource::<GameBalance>().cloned().unwrap_or_default();
        Self::new(
            balance.metabolism.clone(),
            ActionCostTable::from_config(&balance.action_costs),
        )
    }
}

impl Metabolism {
    pub fn new(config: MetabolismConfig, costs: ActionCostTable) -> Self {
        let macros = config.initial_macros;
        let effects = effects::compute_effects(&config, &macros, false);
        Self {
            macros,
            hunger: config.initial_hunger.clamp(0.0, config.hunger_max),
            stamina: config.initial_stamina.clamp(0.0, config.stamina_max),
            effects,
            cooldown_ms: 0.0,
            sprint_drain: 0.0,
            blur_timer_ms: 0.0,
            blur_visible: false,
            running: false,
            last_snapshot: None,
            last_fatigue: FatigueState::default(),
            config,
            costs,
        }
    }

    /// Back to initial pools, then announce the full state.
    pub fn reset(&mut self, outbox: &mut Outbox) {
        *self = Self::new(self.config.clone(), self.costs.clone());
        self.emit_fatigue(true, outbox);
        self.emit_snapshot(true, outbox);
        if !self.effects.is_empty() {
            outbox.push(Notification::EffectsChanged(self.effects.clone()));
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &MetabolismConfig {
        &self.config
    }

    pub fn macros(&self) -> Macros {
        self.macros
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn has_effect(&self, effect: StatusEffect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn is_fatigued(&self) -> bool {
        self.cooldown_ms > EPSILON
    }

    pub fn fatigue(&self) -> FatigueState {
        let remaining_ms = self.cooldown_ms.max(0.0);
        FatigueState {
            active: remaining_ms > EPSILON,
            remaining_ms,
        }
    }

    pub fn sprint_drain(&self) -> f32 {
        self.sprint_drain
    }

    pub fn blur_visible(&self) -> bool {
        self.blur_visible
    }

    pub fn sprint_multiplier(&self) -> f32 {
        effects::sprint_multiplier(&self.config, &self.macros)
    }

    /// A sprint request turns into running only with enough stamina, no
    /// fatigue, and carbs inside the good band.
    pub fn can_sprint(&self) -> bool {
        self.stamina >= self.config.stamina.min_to_sprint
            && !self.is_fatigued()
            && effects::carbs_in_good_band(&self.config, &self.macros)
    }

    /// Damage factor from strength and weakness.
    pub fn damage_multiplier(&self) -> f32 {
        let mut multiplier = 1.0;
        if self.has_effect(StatusEffect::Strength) {
            multiplier *= self.config.strength_multiplier;
        }
        if self.has_effect(StatusEffect::Weakness) {
            multiplier *= self.config.weakness_multiplier;
        }
        multiplier
    }

    pub fn snapshot(&self) -> HungerSnapshot {
        HungerSnapshot {
            macros: self.macros,
            hunger: self.hunger,
            stamina: self.stamina,
            effects: self.effects.clone(),
            fatigue: self.fatigue(),
            blur_visible: self.blur_visible,
        }
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Overwrite the pools (negative values clamp to zero) and re-derive
    /// effects immediately.
    pub fn set_macros(&mut self, macros: Macros, outbox: &mut Outbox) {
        self.macros = Macros {
            carbs: macros.carbs.max(0.0),
            protein: macros.protein.max(0.0),
            fat: macros.fat.max(0.0),
        };
        self.recalc_effects(outbox);
        self.emit_snapshot(true, outbox);
    }

    /// Charge every cost configured for `action`, scaled by `scale`
    /// (frame dt for continuous actions, 1 for discrete ones).
    pub fn apply_action(&mut self, action: Action, scale: f32, outbox: &mut Outbox) {
        let costs: Vec<Cost> = self.costs.get(action).to_vec();
        for cost in costs {
            self.apply_cost(cost.target, cost.amount * scale, Some(action), outbox);
        }
    }

    pub fn apply_cost(
        &mut self,
        target: CostTarget,
        amount: f32,
        action: Option<Action>,
        outbox: &mut Outbox,
    ) {
        let mut amount = amount;
        if action == Some(Action::Run) {
            self.running = true;
            if target == CostTarget::Stamina {
                amount /= self.sprint_multiplier();
                if self.macros.carbs < self.config.carbs.slow_below {
                    amount *= self.config.carbs.low_carb_sprint_drain;
                }
            }
        }

        match target {
            CostTarget::Hunger => {
                self.hunger = (self.hunger - amount).clamp(0.0, self.config.hunger_max);
            }
            CostTarget::Stamina => self.drain_stamina(amount, action == Some(Action::Run), outbox),
            CostTarget::Macro(kind) => {
                let pool = kind.pool_mut(&mut self.macros);
                *pool = (*pool - amount).max(0.0);
            }
        }
    }

    fn drain_stamina(&mut self, amount: f32, running: bool, outbox: &mut Outbox) {
        let previous = self.stamina;
        self.stamina = (self.stamina - amount).clamp(0.0, self.config.stamina_max);
        let drained = previous - self.stamina;
        if drained <= EPSILON {
            return;
        }
        if previous > EPSILON && self.stamina <= EPSILON {
            self.start_cooldown(outbox);
        } else if running
            && !self.is_fatigued()
            && self.config.stamina.significant_sprint_drain > 0.0
        {
            self.sprint_drain += drained;
            if self.sprint_drain >= self.config.stamina.significant_sprint_drain {
                self.start_cooldown(outbox);
            }
        }
    }

    fn start_cooldown(&mut self, outbox: &mut Outbox) {
        let duration_ms = (self.config.stamina.cooldown_secs * 1000.0).max(0.0);
        if duration_ms <= 0.0 {
            return;
        }
        self.cooldown_ms = duration_ms;
        self.sprint_drain = 0.0;
        debug!("[Metabolism] fatigued for {duration_ms} ms");
        self.emit_fatigue(true, outbox);
    }

    /// Feed the pools and hunger. Returns false, and notifies nobody, when
    /// nothing actually changed.
    pub fn eat(&mut self, food: &Nutrition, outbox: &mut Outbox) -> bool {
        let before_macros = self.macros;
        let before_hunger = self.hunger;

        self.macros.carbs = (self.macros.carbs + food.carbs).max(0.0);
        self.macros.protein = (self.macros.protein + food.protein).max(0.0);
        self.macros.fat = (self.macros.fat + food.fat).max(0.0);
        let gain = food.calories() * self.config.calories_to_hunger;
        self.hunger = (self.hunger + gain).clamp(0.0, self.config.hunger_max);

        let changed = self.macros != before_macros || (self.hunger - before_hunger).abs() > EPSILON;
        if changed {
            self.recalc_effects(outbox);
            self.emit_snapshot(true, outbox);
        }
        changed
    }

    /// One frame of passive change. Order: fatigue countdown, macro decay,
    /// effects, hunger decay, stamina, sprint-drain decay, blur, snapshot.
    pub fn tick(&mut self, dt_ms: f32, outbox: &mut Outbox) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let dt = dt_ms / 1000.0;

        self.update_cooldown(dt_ms, outbox);
        if dt <= 0.0 {
            self.update_blur(dt_ms);
            return;
        }

        self.decay_macros(dt);
        self.recalc_effects(outbox);
        self.decay_hunger(dt);
        self.update_stamina(dt);
        self.decay_sprint_drain(dt);
        self.update_blur(dt_ms);
        self.emit_snapshot(false, outbox);

        self.running = false;
    }

    fn update_cooldown(&mut self, dt_ms: f32, outbox: &mut Outbox) {
        if self.cooldown_ms <= 0.0 {
            if self.last_fatigue.active {
                self.emit_fatigue(false, outbox);
            }
            return;
        }
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);
        if self.cooldown_ms <= 0.0 {
            self.sprint_drain = 0.0;
        }
        self.emit_fatigue(false, outbox);
    }

    fn decay_macros(&mut self, dt: f32) {
        let decay = &self.config.decay;
        let fat_factor = if effects::is_starving(&self.config, &self.macros) {
            decay.fat_starving_multiplier
        } else {
            1.0
        };
        self.macros.carbs = (self.macros.carbs - decay.carbs_per_sec * dt).max(0.0);
        self.macros.protein = (self.macros.protein - decay.protein_per_sec * dt).max(0.0);
        self.macros.fat = (self.macros.fat - decay.fat_per_sec * fat_factor * dt).max(0.0);
    }

    fn recalc_effects(&mut self, outbox: &mut Outbox) {
        let next = effects::compute_effects(&self.config, &self.macros, self.is_fatigued());
        if next != self.effects {
            self.effects = next;
            outbox.push(Notification::EffectsChanged(self.effects.clone()));
        }
    }

    fn decay_hunger(&mut self, dt: f32) {
        let decay = &self.config.decay;
        let mut rate = decay.hunger_per_sec;
        if effects::is_saturated(&self.config, &self.macros) {
            rate *= decay.saturation_multiplier;
        }
        if self.macros.fat < self.config.fat.starving_guard {
            rate *= decay.low_fat_penalty;
        }
        if self.has_effect(StatusEffect::Starving) {
            rate += decay.starving_damage_per_sec;
        }
        self.hunger = (self.hunger - rate * dt).clamp(0.0, self.config.hunger_max);
    }

    fn update_stamina(&mut self, dt: f32) {
        let tuning = &self.config.stamina;
        let max = self.config.stamina_max;
        self.stamina = (self.stamina - tuning.idle_loss_per_sec * dt).clamp(0.0, max);
        if !self.running {
            self.stamina = (self.stamina + tuning.regen_per_sec * dt).clamp(0.0, max);
        }
    }

    fn decay_sprint_drain(&mut self, dt: f32) {
        if self.sprint_drain <= 0.0 || self.is_fatigued() || self.running {
            return;
        }
        let rate = self.config.stamina.sprint_drain_decay_per_sec;
        if rate > 0.0 {
            self.sprint_drain = (self.sprint_drain - rate * dt).max(0.0);
        }
    }

    /// While blurred, alternate a short visible flash with a long hidden
    /// interval.
    fn update_blur(&mut self, dt_ms: f32) {
        if !self.has_effect(StatusEffect::Blur) {
            self.blur_visible = false;
            self.blur_timer_ms = 0.0;
            return;
        }
        if self.blur_timer_ms > 0.0 {
            self.blur_timer_ms -= dt_ms;
            return;
        }
        self.blur_visible = !self.blur_visible;
        self.blur_timer_ms = if self.blur_visible {
            self.config.blur_flash_ms
        } else {
            self.config.blur_interval_ms
        };
    }

    fn emit_fatigue(&mut self, force: bool, outbox: &mut Outbox) {
        let payload = self.fatigue();
        if !force
            && self.last_fatigue.active == payload.active
            && (self.last_fatigue.remaining_ms - payload.remaining_ms).abs() < 1.0
        {
            return;
        }
        self.last_fatigue = payload;
        outbox.push(Notification::StaminaFatigue(payload));
    }

    fn emit_snapshot(&mut self, force: bool, outbox: &mut Outbox) {
        let snapshot = self.snapshot();
        if !force {
            if let Some(prev) = &self.last_snapshot {
                let moved = |a: f32, b: f32| (a - b).abs() > EPSILON;
                let changed = moved(prev.hunger, snapshot.hunger)
                    || moved(prev.stamina, snapshot.stamina)
                    || moved(prev.macros.carbs, snapshot.macros.carbs)
                    || moved(prev.macros.protein, snapshot.macros.protein)
                    || moved(prev.macros.fat, snapshot.macros.fat)
                    || moved(prev.fatigue.remaining_ms, snapshot.fatigue.remaining_ms)
                    || prev.fatigue.active != snapshot.fatigue.active;
                if !changed {
                    return;
                }
            }
        }
        self.last_snapshot = Some(snapshot.clone());
        outbox.push(Notification::HungerChanged(snapshot));
    }
}

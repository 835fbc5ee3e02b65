//! Natural spawns — keeps wild berry bushes and nut trees near their
//! target population.
//!
//! World generation fills each definition greedily. Afterwards a
//! per-definition countdown allows at most one respawn per interval while
//! the population is under target; the countdown rests at full whenever
//! the target is met.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{GameBalance, SpawnDefinition, SpawnKind};
use crate::entities::{BerryBush, EntityBody, EntityKind, NutTree, Rock, Tree};
use crate::shared::*;
use crate::world::{WorldEntities, WorldRng};

/// Random positions tried per spot search.
pub const SPOT_ATTEMPTS: usize = 40;
/// Spawns keep this far from the world edge.
pub const SPAWN_EDGE_MARGIN: f32 = 120.0;

pub struct SpawningPlugin;

impl Plugin for SpawningPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnDirector>();
        app.add_systems(Update, maintain_natural_spawns.in_set(TickSet::Spawns));
    }
}

pub fn maintain_natural_spawns(
    clock: Res<SimClock>,
    bounds: Res<WorldBounds>,
    mut director: ResMut<SpawnDirector>,
    mut entities: ResMut<WorldEntities>,
    mut rng: ResMut<WorldRng>,
) {
    director.update(clock.dt_ms(), &mut entities, &bounds, &mut rng.0);
}

impl SpawnKind {
    pub fn entity_kind(self) -> EntityKind {
        match self {
            SpawnKind::Tree => EntityKind::Tree,
            SpawnKind::Rock => EntityKind::Rock,
            SpawnKind::BerryBush => EntityKind::BerryBush,
            SpawnKind::NutTree => EntityKind::NutTree,
        }
    }

    pub fn body(self) -> EntityBody {
        match self {
            SpawnKind::Tree => EntityBody::Tree(Tree::default()),
            SpawnKind::Rock => EntityBody::Rock(Rock),
            SpawnKind::BerryBush => EntityBody::BerryBush(BerryBush),
            SpawnKind::NutTree => EntityBody::NutTree(NutTree::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnEntry {
    pub def: SpawnDefinition,
    /// Milliseconds until the next respawn attempt.
    pub timer_ms: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnDirector {
    pub entries: Vec<SpawnEntry>,
}

impl FromWorld for SpawnDirector {
    fn from_world(world: &mut World) -> Self {
        let defs = world
            .get_resource::<GameBalance>()
            .map(|b| b.spawns.clone())
            .unwrap_or_else(|| GameBalance::default().spawns);
        Self::new(&defs)
    }
}

impl SpawnDirector {
    pub fn new(defs: &[SpawnDefinition]) -> Self {
        Self {
            entries: defs
                .iter()
                .map(|def| SpawnEntry {
                    def: def.clone(),
                    timer_ms: def.respawn_ms,
                })
                .collect(),
        }
    }

    /// Rewind every countdown to its full interval.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.timer_ms = entry.def.respawn_ms;
        }
    }

    /// Greedy initial fill. Gives up on a definition after `target * 5`
    /// spawns or the first failed spot search. Returns how many spawned.
    pub fn populate(
        &self,
        entities: &mut WorldEntities,
        bounds: &WorldBounds,
        rng: &mut StdRng,
    ) -> usize {
        let mut spawned = 0;
        for entry in &self.entries {
            let def = &entry.def;
            let kind = def.kind.entity_kind();
            let mut attempts = 0;
            while entities.count_kind(kind) < def.target && attempts < def.target * 5 {
                let Some(pos) = find_spawn_spot(entities, bounds, rng, def.min_spacing) else {
                    debug!("[Spawns] no room left for {kind}");
                    break;
                };
                entities.spawn(pos, def.kind.body());
                spawned += 1;
                attempts += 1;
            }
        }
        spawned
    }

    /// Per-tick maintenance. Returns how many entities were spawned.
    pub fn update(
        &mut self,
        dt_ms: f32,
        entities: &mut WorldEntities,
        bounds: &WorldBounds,
        rng: &mut StdRng,
    ) -> usize {
        let mut spawned = 0;
        for entry in &mut self.entries {
            let kind = entry.def.kind.entity_kind();
            if entities.count_kind(kind) >= entry.def.target {
                entry.timer_ms = entry.def.respawn_ms;
                continue;
            }
            entry.timer_ms -= dt_ms;
            if entry.timer_ms > 0.0 {
                continue;
            }
            match find_spawn_spot(entities, bounds, rng, entry.def.min_spacing) {
                Some(pos) => {
                    entities.spawn(pos, entry.def.kind.body());
                    spawned += 1;
                    debug!("[Spawns] respawned {kind} at {pos}");
                }
                None => debug!("[Spawns] respawn of {kind} found no spot"),
            }
            entry.timer_ms = entry.def.respawn_ms;
        }
        spawned
    }
}

/// Random tile-snapped position at least `entity.radius + spacing` away
/// from every live entity.
pub fn find_spawn_spot(
    entities: &WorldEntities,
    bounds: &WorldBounds,
    rng: &mut StdRng,
    spacing: f32,
) -> Option<Vec2> {
    for _ in 0..SPOT_ATTEMPTS {
        let candidate = random_spot(rng, bounds, SPAWN_EDGE_MARGIN);
        let clear = entities
            .iter()
            .all(|e| e.pos().distance(candidate) >= e.core.radius + spacing);
        if clear {
            return Some(bounds.snap(candidate));
        }
    }
    None
}

/// Uniform point inside the world, `margin` in from every edge. Collapses
/// to the centre line when the world is narrower than two margins.
pub fn random_spot(rng: &mut StdRng, bounds: &WorldBounds, margin: f32) -> Vec2 {
    let axis = |rng: &mut StdRng, extent: f32| {
        let lo = margin.min(extent / 2.0);
        let hi = extent - lo;
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            extent / 2.0
        }
    };
    let x = axis(rng, bounds.width);
    let y = axis(rng, bounds.height);
    Vec2::new(x, y)
}

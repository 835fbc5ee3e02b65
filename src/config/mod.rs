//! Data-driven balance configuration.
//!
//! Every tunable number of the simulation lives in `GameBalance`, read from
//! a RON file at startup (`assets/balance.ron`). Missing sections fall back
//! to the compiled-in defaults, so a partial file only overrides what it
//! names.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::shared::*;

pub const DEFAULT_BALANCE_PATH: &str = "assets/balance.ron";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameBalance {
    /// Seed for the world RNG. Same seed, same world.
    pub seed: u64,
    pub world: WorldTuning,
    pub metabolism: MetabolismConfig,
    pub spawns: Vec<SpawnDefinition>,
    /// Action name to `"resource<amount>"` cost strings.
    pub action_costs: BTreeMap<String, Vec<String>>,
}

impl Default for GameBalance {
    fn default() -> Self {
        Self {
            seed: 0x6772_6f76,
            world: WorldTuning::default(),
            metabolism: MetabolismConfig::default(),
            spawns: vec![
                SpawnDefinition {
                    kind: SpawnKind::NutTree,
                    target: 14,
                    respawn_ms: 7.0 * 60.0 * 1000.0,
                    min_spacing: 120.0,
                },
                SpawnDefinition {
                    kind: SpawnKind::BerryBush,
                    target: 18,
                    respawn_ms: 8.0 * 60.0 * 1000.0,
                    min_spacing: 100.0,
                },
            ],
            action_costs: default_action_costs(),
        }
    }
}

fn default_action_costs() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 6] = [
        ("walk", &["hunger<0.02>"]),
        ("run", &["hunger<0.06>", "stamina<8>"]),
        ("break", &["hunger<0.08>", "stamina<2>"]),
        ("craft", &["hunger<0.04>"]),
        ("attack", &["hunger<0.05>", "stamina<3>"]),
        ("time:tick", &["hunger<0.01>"]),
    ];
    table
        .into_iter()
        .map(|(action, costs)| {
            (
                action.to_string(),
                costs.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

impl GameBalance {
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Read the balance file, falling back to defaults when it is missing
    /// or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("[Config] {} unreadable ({e}); using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_ron(&source) {
            Ok(balance) => {
                info!("[Config] loaded balance from {}", path.display());
                balance
            }
            Err(e) => {
                warn!("[Config] {} is invalid ({e}); using defaults", path.display());
                Self::default()
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub tile: f32,
    pub player_radius: f32,
    pub player_speed: f32,
    pub interact_range: f32,
    pub slow_multiplier: f32,
    pub sprint_multiplier: f32,
    /// Radius around a struck cow within which the herd also flees.
    pub cow_chain_radius: f32,
    pub max_frame_dt: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub inventory_slots: usize,
    pub wallet_slots: usize,
    pub drop_ttl_ms: f64,
    pub starter_ttl_ms: f64,
    pub coins: usize,
    pub trees: usize,
    pub rocks: usize,
    pub cows: usize,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            tile: TILE_SIZE,
            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            interact_range: INTERACT_RANGE,
            slow_multiplier: 0.7,
            sprint_multiplier: 1.55,
            cow_chain_radius: 220.0,
            max_frame_dt: 0.05,
            viewport_width: SCREEN_WIDTH,
            viewport_height: SCREEN_HEIGHT,
            inventory_slots: PLAYER_INVENTORY_SLOTS,
            wallet_slots: WALLET_SLOTS,
            drop_ttl_ms: DEFAULT_DROP_TTL_MS,
            starter_ttl_ms: 600_000.0,
            coins: 18,
            trees: 28,
            rocks: 20,
            cows: 6,
        }
    }
}

impl WorldTuning {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds {
            width: self.width,
            height: self.height,
            tile: self.tile,
            margin: self.player_radius,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// METABOLISM
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbBands {
    pub good: (f32, f32),
    pub slow_below: f32,
    pub blur_below: f32,
    pub sprint_bonus_cap: f32,
    /// Stamina cost factor for sprinting while below `slow_below`.
    pub low_carb_sprint_drain: f32,
}

impl Default for CarbBands {
    fn default() -> Self {
        Self {
            good: (40.0, 60.0),
            slow_below: 20.0,
            blur_below: 5.0,
            sprint_bonus_cap: 1.5,
            low_carb_sprint_drain: 1.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProteinBands {
    pub good: (f32, f32),
    pub weak_below: f32,
    pub blur_below: f32,
    pub strength_in_good: bool,
}

impl Default for ProteinBands {
    fn default() -> Self {
        Self {
            good: (40.0, 50.0),
            weak_below: 20.0,
            blur_below: 5.0,
            strength_in_good: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatBands {
    pub saturation: (f32, f32),
    pub slow_above: f32,
    pub starving_guard: f32,
}

impl Default for FatBands {
    fn default() -> Self {
        Self {
            saturation: (15.0, 20.0),
            slow_above: 60.0,
            starving_guard: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayRates {
    pub hunger_per_sec: f32,
    pub carbs_per_sec: f32,
    pub protein_per_sec: f32,
    pub fat_per_sec: f32,
    pub saturation_multiplier: f32,
    pub low_fat_penalty: f32,
    pub starving_damage_per_sec: f32,
    pub fat_starving_multiplier: f32,
}

impl Default for DecayRates {
    fn default() -> Self {
        Self {
            hunger_per_sec: 0.02,
            carbs_per_sec: 0.01,
            protein_per_sec: 0.008,
            fat_per_sec: 0.006,
            saturation_multiplier: 0.8,
            low_fat_penalty: 1.25,
            starving_damage_per_sec: 2.0,
            fat_starving_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaTuning {
    pub idle_loss_per_sec: f32,
    pub regen_per_sec: f32,
    pub min_to_sprint: f32,
    pub cooldown_secs: f32,
    /// Accumulated sprint drain that forces a rest.
    pub significant_sprint_drain: f32,
    pub sprint_drain_decay_per_sec: f32,
}

impl Default for StaminaTuning {
    fn default() -> Self {
        Self {
            idle_loss_per_sec: 0.5,
            regen_per_sec: 4.0,
            min_to_sprint: 3.0,
            cooldown_secs: 4.0,
            significant_sprint_drain: 60.0,
            sprint_drain_decay_per_sec: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolismConfig {
    pub carbs: CarbBands,
    pub protein: ProteinBands,
    pub fat: FatBands,
    pub decay: DecayRates,
    pub stamina: StaminaTuning,
    pub hunger_max: f32,
    pub stamina_max: f32,
    pub blur_interval_ms: f32,
    pub blur_flash_ms: f32,
    pub initial_macros: Macros,
    pub initial_hunger: f32,
    pub initial_stamina: f32,
    pub calories_to_hunger: f32,
    pub strength_multiplier: f32,
    pub weakness_multiplier: f32,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            carbs: CarbBands::default(),
            protein: ProteinBands::default(),
            fat: FatBands::default(),
            decay: DecayRates::default(),
            stamina: StaminaTuning::default(),
            hunger_max: MAX_HUNGER,
            stamina_max: MAX_STAMINA,
            blur_interval_ms: 20_000.0,
            blur_flash_ms: 600.0,
            initial_macros: Macros {
                carbs: 60.0,
                protein: 45.0,
                fat: 30.0,
            },
            initial_hunger: 80.0,
            initial_stamina: MAX_STAMINA,
            calories_to_hunger: 0.1,
            strength_multiplier: 1.25,
            weakness_multiplier: 0.7,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NATURAL SPAWNS
// ═══════════════════════════════════════════════════════════════════════

/// Kinds the population controller is allowed to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Tree,
    Rock,
    BerryBush,
    NutTree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDefinition {
    pub kind: SpawnKind,
    pub target: usize,
    pub respawn_ms: f32,
    pub min_spacing: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_balance_matches_defaults() {
        let shipped = GameBalance::from_ron(include_str!("../../assets/balance.ron"))
            .expect("shipped balance file parses");
        assert_eq!(shipped, GameBalance::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let balance = GameBalance::from_ron("(seed: 7, world: (cows: 2))").expect("valid ron");
        assert_eq!(balance.seed, 7);
        assert_eq!(balance.world.cows, 2);
        assert_eq!(balance.world.trees, 28, "unnamed fields keep defaults");
        assert_eq!(balance.metabolism, MetabolismConfig::default());
        assert_eq!(balance.action_costs.len(), 6);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(GameBalance::from_ron("(seed: \"many\")").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let balance = GameBalance::load_or_default("does/not/exist.ron");
        assert_eq!(balance, GameBalance::default());
    }

    #[test]
    fn test_bounds_follow_tuning() {
        let tuning = WorldTuning {
            width: 640.0,
            height: 480.0,
            ..default()
        };
        let bounds = tuning.bounds();
        assert_eq!(bounds.center(), Vec2::new(320.0, 240.0));
        assert_eq!(bounds.margin, PLAYER_RADIUS);
    }
}

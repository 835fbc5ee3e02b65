//! Action cost table: `"resource<amount>"` strings parsed once at startup.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::shared::*;

/// Player activities that carry a metabolic cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Walk,
    Run,
    Break,
    Craft,
    Attack,
    /// Passive cost of being alive, charged every frame scaled by dt.
    TimeTick,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Walk,
        Action::Run,
        Action::Break,
        Action::Craft,
        Action::Attack,
        Action::TimeTick,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Action::Walk => "walk",
            Action::Run => "run",
            Action::Break => "break",
            Action::Craft => "craft",
            Action::Attack => "attack",
            Action::TimeTick => "time:tick",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|a| a.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Carbs,
    Protein,
    Fat,
}

impl MacroKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "carbs" | "carb" => Some(MacroKind::Carbs),
            "protein" => Some(MacroKind::Protein),
            "fat" => Some(MacroKind::Fat),
            _ => None,
        }
    }

    pub fn pool_mut(self, macros: &mut Macros) -> &mut f32 {
        match self {
            MacroKind::Carbs => &mut macros.carbs,
            MacroKind::Protein => &mut macros.protein,
            MacroKind::Fat => &mut macros.fat,
        }
    }
}

/// What a cost entry drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostTarget {
    Hunger,
    Stamina,
    Macro(MacroKind),
}

impl CostTarget {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "hunger" => Some(CostTarget::Hunger),
            "stamina" => Some(CostTarget::Stamina),
            other => other
                .strip_prefix("macro.")
                .and_then(MacroKind::from_name)
                .map(CostTarget::Macro),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost {
    pub target: CostTarget,
    pub amount: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionCostTable {
    costs: HashMap<Action, Vec<Cost>>,
}

impl ActionCostTable {
    /// Build from the config table. Unknown actions, unknown resources and
    /// malformed strings are skipped with a warning.
    pub fn from_config(raw: &BTreeMap<String, Vec<String>>) -> Self {
        let mut costs: HashMap<Action, Vec<Cost>> = HashMap::new();
        for (key, entries) in raw {
            let Some(action) = Action::from_key(key) else {
                warn!("[Metabolism] unknown action '{key}' in cost table");
                continue;
            };
            let parsed = costs.entry(action).or_default();
            for entry in entries {
                match parse_labeled_amount(entry) {
                    Ok(cost) => match CostTarget::from_label(&cost.label) {
                        Some(target) => parsed.push(Cost {
                            target,
                            amount: cost.amount,
                        }),
                        None => warn!("[Metabolism] {key}: unknown resource '{}'", cost.label),
                    },
                    Err(e) => warn!("[Metabolism] {key}: {e}"),
                }
            }
        }
        Self { costs }
    }

    pub fn get(&self, action: Action) -> &[Cost] {
        self.costs.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameBalance;

    #[test]
    fn test_default_table_parses_every_action() {
        let table = ActionCostTable::from_config(&GameBalance::default().action_costs);
        for action in Action::ALL {
            assert!(!table.get(action).is_empty(), "{} has no cost", action.key());
        }
        assert_eq!(
            table.get(Action::Run),
            &[
                Cost {
                    target: CostTarget::Hunger,
                    amount: 0.06
                },
                Cost {
                    target: CostTarget::Stamina,
                    amount: 8.0
                },
            ]
        );
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "attack".to_string(),
            vec![
                "hunger<0.5>".to_string(),
                "mana<3>".to_string(),
                "stamina 3".to_string(),
                "macro.fat<1>".to_string(),
            ],
        );
        raw.insert("dance".to_string(), vec!["hunger<1>".to_string()]);
        let table = ActionCostTable::from_config(&raw);
        assert_eq!(table.get(Action::Attack).len(), 2);
        assert_eq!(
            table.get(Action::Attack)[1].target,
            CostTarget::Macro(MacroKind::Fat)
        );
        assert!(table.get(Action::Walk).is_empty());
    }
}

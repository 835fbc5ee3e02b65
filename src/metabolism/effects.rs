//! Status effects derived from the macro pools.

use crate::config::MetabolismConfig;
use crate::shared::*;

fn in_band(value: f32, (lo, hi): (f32, f32)) -> bool {
    value >= lo && value <= hi
}

/// Fat at or below the guard while any pool is empty.
pub fn is_starving(config: &MetabolismConfig, macros: &Macros) -> bool {
    macros.fat <= config.fat.starving_guard && macros.any_empty()
}

pub fn is_saturated(config: &MetabolismConfig, macros: &Macros) -> bool {
    in_band(macros.fat, config.fat.saturation)
}

/// Carb-driven sprint factor: 1.0 outside the good band, rising linearly
/// across it up to the configured cap.
pub fn sprint_multiplier(config: &MetabolismConfig, macros: &Macros) -> f32 {
    let (lo, hi) = config.carbs.good;
    if !in_band(macros.carbs, config.carbs.good) {
        return 1.0;
    }
    let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };
    let ratio = ((macros.carbs - lo) / span).clamp(0.0, 1.0);
    1.0 + (config.carbs.sprint_bonus_cap - 1.0) * ratio
}

pub fn carbs_in_good_band(config: &MetabolismConfig, macros: &Macros) -> bool {
    in_band(macros.carbs, config.carbs.good)
}

pub fn compute_effects(config: &MetabolismConfig, macros: &Macros, fatigued: bool) -> EffectSet {
    let mut effects = EffectSet::new();

    if macros.carbs < config.carbs.slow_below {
        effects.insert(StatusEffect::Slow);
    }
    if macros.carbs < config.carbs.blur_below {
        effects.insert(StatusEffect::Blur);
    }

    if macros.protein < config.protein.weak_below {
        effects.insert(StatusEffect::Weakness);
        if macros.protein < config.protein.blur_below {
            effects.insert(StatusEffect::Blur);
        }
    } else if config.protein.strength_in_good && in_band(macros.protein, config.protein.good) {
        effects.insert(StatusEffect::Strength);
    }

    if macros.fat > config.fat.slow_above {
        effects.insert(StatusEffect::Slow);
    }
    if is_saturated(config, macros) {
        effects.insert(StatusEffect::Saturation);
    }
    if is_starving(config, macros) {
        effects.insert(StatusEffect::Starving);
    }
    if fatigued {
        effects.insert(StatusEffect::Fatigued);
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macros(carbs: f32, protein: f32, fat: f32) -> Macros {
        Macros { carbs, protein, fat }
    }

    #[test]
    fn test_initial_pools_give_strength_only() {
        let config = MetabolismConfig::default();
        let effects = compute_effects(&config, &config.initial_macros, false);
        assert_eq!(effects, EffectSet::from([StatusEffect::Strength]));
    }

    #[test]
    fn test_low_carbs_slow_then_blur() {
        let config = MetabolismConfig::default();
        let slow = compute_effects(&config, &macros(10.0, 30.0, 30.0), false);
        assert!(slow.contains(&StatusEffect::Slow));
        assert!(!slow.contains(&StatusEffect::Blur));

        let blur = compute_effects(&config, &macros(4.0, 30.0, 30.0), false);
        assert!(blur.contains(&StatusEffect::Slow));
        assert!(blur.contains(&StatusEffect::Blur));
    }

    #[test]
    fn test_protein_bands() {
        let config = MetabolismConfig::default();
        let weak = compute_effects(&config, &macros(50.0, 3.0, 30.0), false);
        assert!(weak.contains(&StatusEffect::Weakness));
        assert!(weak.contains(&StatusEffect::Blur));

        let middling = compute_effects(&config, &macros(50.0, 30.0, 30.0), false);
        assert!(!middling.contains(&StatusEffect::Weakness));
        assert!(!middling.contains(&StatusEffect::Strength));
    }

    #[test]
    fn test_fat_bands() {
        let config = MetabolismConfig::default();
        let heavy = compute_effects(&config, &macros(50.0, 45.0, 70.0), false);
        assert!(heavy.contains(&StatusEffect::Slow));

        let sated = compute_effects(&config, &macros(50.0, 45.0, 18.0), false);
        assert!(sated.contains(&StatusEffect::Saturation));
    }

    #[test]
    fn test_starving_needs_low_fat_and_an_empty_pool() {
        let config = MetabolismConfig::default();
        assert!(is_starving(&config, &macros(0.0, 30.0, 5.0)));
        assert!(!is_starving(&config, &macros(0.0, 30.0, 6.0)), "fat above guard");
        assert!(!is_starving(&config, &macros(1.0, 1.0, 1.0)), "no pool empty");
        assert!(is_starving(&config, &macros(10.0, 10.0, 0.0)));
    }

    #[test]
    fn test_sprint_multiplier_scales_across_good_band() {
        let config = MetabolismConfig::default();
        assert_eq!(sprint_multiplier(&config, &macros(10.0, 0.0, 0.0)), 1.0);
        assert_eq!(sprint_multiplier(&config, &macros(40.0, 0.0, 0.0)), 1.0);
        assert!((sprint_multiplier(&config, &macros(50.0, 0.0, 0.0)) - 1.25).abs() < 1e-6);
        assert!((sprint_multiplier(&config, &macros(60.0, 0.0, 0.0)) - 1.5).abs() < 1e-6);
        assert_eq!(sprint_multiplier(&config, &macros(61.0, 0.0, 0.0)), 1.0);
    }
}

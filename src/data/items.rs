use crate::shared::*;

fn item(id: &str, name: &str, max_stack: u32, tags: &[ItemTag]) -> ItemDef {
    ItemDef {
        id: id.into(),
        name: name.into(),
        max_stack,
        tags: tags.to_vec(),
        labels: Vec::new(),
        place_radius: None,
    }
}

fn food(id: &str, name: &str, labels: &[&str]) -> ItemDef {
    ItemDef {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        ..item(id, name, 30, &[ItemTag::Food])
    }
}

fn placeable(id: &str, name: &str, max_stack: u32, radius: f32, extra: &[ItemTag]) -> ItemDef {
    let mut tags = vec![ItemTag::Place, ItemTag::Solid];
    tags.extend_from_slice(extra);
    ItemDef {
        place_radius: Some(radius),
        ..item(id, name, max_stack, &tags)
    }
}

/// Populate the catalog with every item the world can produce.
pub fn populate_items(catalog: &mut ItemCatalog) {
    use ItemTag::*;

    let items = vec![
        // ── Currency & materials ────────────────────────────────────
        item("coin", "Coin", 999, &[Currency]),
        item("wood", "Wood", 50, &[Material]),
        item("stick", "Stick", 50, &[Material]),
        item("rockshard", "Rock Shard", 50, &[Material]),
        item("coal", "Coal", 50, &[Material]),
        item("leather", "Leather", 50, &[Material]),
        item("bone", "Bone", 50, &[Material]),
        // ── Food ────────────────────────────────────────────────────
        food("beef", "Raw Beef", &["portion<24>", "carb<0>", "protein<14>", "fat<10>"]),
        food("cookedbeef", "Cooked Beef", &["portion<30>", "carb<0>", "protein<18>", "fat<12>"]),
        food("berries", "Wild Berries", &["portion<21>", "carb<18>", "protein<2>", "fat<1>"]),
        food("nuts", "Nuts", &["portion<35>", "carb<8>", "protein<7>", "fat<20>"]),
        // ── Tools ───────────────────────────────────────────────────
        item("axe", "Axe", 1, &[Tool, Chop]),
        item("pickaxe", "Pickaxe", 1, &[Tool, Mine]),
        item("sword", "Sword", 1, &[Tool, Weapon]),
        // ── Placeables ──────────────────────────────────────────────
        placeable("sapling", "Sapling", 20, 22.0, &[Plant]),
        placeable("chest", "Chest", 1, 18.0, &[Container]),
        placeable("campfire", "Campfire", 1, 16.0, &[Campfire]),
    ];

    for def in items {
        catalog.items.insert(def.id.clone(), def);
    }
}

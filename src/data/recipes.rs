use crate::shared::*;

fn recipe(output: &str, output_qty: u32, inputs: &[(&str, u32)]) -> Recipe {
    Recipe {
        id: output.into(),
        output: output.into(),
        output_qty,
        inputs: inputs.iter().map(|(id, qty)| (id.to_string(), *qty)).collect(),
    }
}

/// Populate the recipe book. Recipe ids match their output item.
pub fn populate_recipes(book: &mut RecipeBook) {
    book.recipes = vec![
        recipe("stick", 2, &[("wood", 1)]),
        // ── Tools ───────────────────────────────────────────────────
        recipe("axe", 1, &[("wood", 3), ("rockshard", 1)]),
        recipe("pickaxe", 1, &[("wood", 2), ("rockshard", 3)]),
        recipe("sword", 1, &[("wood", 1), ("rockshard", 4)]),
        // ── Structures ──────────────────────────────────────────────
        recipe("campfire", 1, &[("wood", 4), ("coal", 1)]),
        recipe("chest", 1, &[("wood", 8)]),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::populate_items;

    #[test]
    fn test_recipes_reference_known_items() {
        let mut catalog = ItemCatalog::default();
        populate_items(&mut catalog);
        let mut book = RecipeBook::default();
        populate_recipes(&mut book);

        assert_eq!(book.recipes.len(), 6);
        for r in &book.recipes {
            assert!(catalog.get(&r.output).is_some(), "unknown output {}", r.output);
            for (id, qty) in &r.inputs {
                assert!(catalog.get(id).is_some(), "{}: unknown input {id}", r.id);
                assert!(*qty > 0);
            }
        }
    }
}

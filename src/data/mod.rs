//! Data layer: fills the item catalog and recipe book at startup.
//!
//! Runs in OnEnter(GameState::Loading), then moves the game into
//! GameState::Playing. Other domains read `ItemCatalog` and `RecipeBook`
//! once the state has advanced.

mod items;
mod recipes;

use bevy::prelude::*;

use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemCatalog>()
            .init_resource::<RecipeBook>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

pub fn item_catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::default();
    items::populate_items(&mut catalog);
    catalog
}

pub fn recipe_book() -> RecipeBook {
    let mut book = RecipeBook::default();
    recipes::populate_recipes(&mut book);
    book
}

fn load_all_data(
    mut catalog: ResMut<ItemCatalog>,
    mut book: ResMut<RecipeBook>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    *catalog = item_catalog();
    *book = recipe_book();
    info!(
        "[Data] {} items, {} recipes loaded",
        catalog.items.len(),
        book.recipes.len()
    );
    next_state.set(GameState::Playing);
}

mod history;
mod pantry;
mod price;
mod recipe;

pub use history::{last_cooked, most_cooked, times_cooked, weeks_tracked, MealHistoryEntry};
pub use pantry::{is_staple, suggested_staples, PantryStaple};
pub use price::{IngredientPrice, PriceHistoryEntry};
pub use recipe::{
    new_recipe_id, recipe_lines, recipe_meta, unique_recipe_names, RecipeLine, DEFAULT_SERVINGS,
};

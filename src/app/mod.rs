use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ingest::parse_ingredient_block;
use crate::models::{
    is_staple, new_recipe_id, recipe_meta, unique_recipe_names, weeks_tracked, IngredientPrice,
    MealHistoryEntry, PantryStaple, PriceHistoryEntry, RecipeLine, DEFAULT_SERVINGS,
};
use crate::plan::{self, Selection, ShoppingList};
use crate::pricing::{apply_price_save, missing_prices, upsert_price, PriceIndex};
use crate::recommend::{self, Recommendation};
use crate::store::Store;

/// Recipe-level metadata for a new or edited recipe. One draft fans out onto
/// every ingredient line of the recipe.
#[derive(Debug, Clone)]
pub(crate) struct RecipeDraft {
    pub(crate) name: String,
    pub(crate) tags: String,
    pub(crate) cook_time: String,
    pub(crate) rating: String,
    pub(crate) source: String,
    pub(crate) source_url: String,
    pub(crate) servings: u32,
    pub(crate) notes: String,
    pub(crate) estimated_cost: Decimal,
    pub(crate) prep_friendly: bool,
}

impl RecipeDraft {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: String::new(),
            cook_time: String::new(),
            rating: String::new(),
            source: String::new(),
            source_url: String::new(),
            servings: DEFAULT_SERVINGS,
            notes: String::new(),
            estimated_cost: Decimal::ZERO,
            prep_friendly: false,
        }
    }
}

/// Partial recipe-metadata update; unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecipeEdit {
    pub(crate) tags: Option<String>,
    pub(crate) cook_time: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) source_url: Option<String>,
    pub(crate) servings: Option<u32>,
    pub(crate) notes: Option<String>,
    pub(crate) prep_friendly: Option<bool>,
}

impl RecipeEdit {
    pub(crate) fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.cook_time.is_none()
            && self.source.is_none()
            && self.source_url.is_none()
            && self.servings.is_none()
            && self.notes.is_none()
            && self.prep_friendly.is_none()
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug)]
pub(crate) struct Stats {
    pub(crate) recipe_count: usize,
    pub(crate) meals_logged: usize,
    pub(crate) weeks_tracked: usize,
    pub(crate) pantry_count: usize,
    pub(crate) priced_ingredients: usize,
    pub(crate) avg_rating: Option<f64>,
}

/// In-memory working set over a [`Store`]. Every mutating command rewrites
/// the affected table through the store and keeps the cached copy in sync.
pub(crate) struct App {
    store: Box<dyn Store>,
    pub(crate) recipes: Vec<RecipeLine>,
    pub(crate) history: Vec<MealHistoryEntry>,
    pub(crate) pantry: Vec<PantryStaple>,
    pub(crate) pricing: Vec<IngredientPrice>,
    pub(crate) price_history: Vec<PriceHistoryEntry>,
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl App {
    pub(crate) fn load(store: Box<dyn Store>) -> Result<Self> {
        let recipes = store.load_recipes()?;
        let history = store.load_history()?;
        let pantry = store.load_pantry()?;
        let pricing = store.load_pricing()?;
        let price_history = store.load_price_history()?;
        Ok(Self {
            store,
            recipes,
            history,
            pantry,
            pricing,
            price_history,
        })
    }

    // ── Recipes ───────────────────────────────────────────────

    pub(crate) fn recipe_names(&self) -> Vec<String> {
        unique_recipe_names(&self.recipes)
    }

    pub(crate) fn has_recipe(&self, name: &str) -> bool {
        recipe_meta(&self.recipes, name).is_some()
    }

    /// Add a recipe from a draft plus a free-text ingredient block. Valid
    /// ingredient lines are saved; per-line parse errors come back to the
    /// caller for display.
    pub(crate) fn add_recipe(
        &mut self,
        draft: &RecipeDraft,
        ingredients_text: &str,
    ) -> Result<Vec<String>> {
        let name = draft.name.trim();
        if name.is_empty() {
            bail!("Recipe name is required");
        }
        if self.has_recipe(name) {
            bail!("Recipe '{name}' already exists");
        }

        let (drafts, errors) = parse_ingredient_block(ingredients_text);
        if drafts.is_empty() {
            bail!("No valid ingredient lines");
        }

        let recipe_id = new_recipe_id(name, &now_stamp());
        for d in drafts {
            self.recipes.push(RecipeLine {
                recipe_id: recipe_id.clone(),
                recipe_name: name.to_string(),
                ingredient: d.ingredient,
                quantity: d.quantity,
                unit: d.unit,
                category: d.category,
                tags: draft.tags.clone(),
                cook_time: draft.cook_time.clone(),
                rating: draft.rating.clone(),
                source: draft.source.clone(),
                source_url: draft.source_url.clone(),
                servings: draft.servings,
                notes: draft.notes.clone(),
                estimated_cost: draft.estimated_cost,
                prep_friendly: draft.prep_friendly,
            });
        }
        self.store.save_recipes(&self.recipes)?;
        Ok(errors)
    }

    /// Rename a recipe on every one of its lines. History entries keep the
    /// old name; they are a log of what was cooked, not a foreign key.
    pub(crate) fn rename_recipe(&mut self, old: &str, new: &str) -> Result<()> {
        let new = new.trim();
        if new.is_empty() {
            bail!("Recipe name is required");
        }
        if !self.has_recipe(old) {
            bail!("No recipe named '{old}'");
        }
        if old != new && self.has_recipe(new) {
            bail!("Recipe '{new}' already exists");
        }
        for line in self.recipes.iter_mut().filter(|l| l.recipe_name == old) {
            line.recipe_name = new.to_string();
        }
        self.store.save_recipes(&self.recipes)?;
        Ok(())
    }

    pub(crate) fn delete_recipe(&mut self, name: &str) -> Result<()> {
        if !self.has_recipe(name) {
            bail!("No recipe named '{name}'");
        }
        self.recipes.retain(|l| l.recipe_name != name);
        self.store.save_recipes(&self.recipes)?;
        Ok(())
    }

    /// Copy a recipe under "<name> (Copy)" with a fresh id. Returns the new
    /// name.
    pub(crate) fn duplicate_recipe(&mut self, name: &str) -> Result<String> {
        if !self.has_recipe(name) {
            bail!("No recipe named '{name}'");
        }
        let copy_name = format!("{name} (Copy)");
        if self.has_recipe(&copy_name) {
            bail!("Recipe '{copy_name}' already exists");
        }
        let copy_id = new_recipe_id(&copy_name, &now_stamp());
        let copies: Vec<RecipeLine> = self
            .recipes
            .iter()
            .filter(|l| l.recipe_name == name)
            .map(|l| {
                let mut line = l.clone();
                line.recipe_id = copy_id.clone();
                line.recipe_name = copy_name.clone();
                line
            })
            .collect();
        self.recipes.extend(copies);
        self.store.save_recipes(&self.recipes)?;
        Ok(copy_name)
    }

    pub(crate) fn set_rating(&mut self, name: &str, rating: f64) -> Result<()> {
        if !self.has_recipe(name) {
            bail!("No recipe named '{name}'");
        }
        if !(1.0..=5.0).contains(&rating) {
            bail!("Rating must be between 1 and 5");
        }
        let text = if rating.fract() == 0.0 {
            format!("{rating:.0}")
        } else {
            format!("{rating}")
        };
        for line in self.recipes.iter_mut().filter(|l| l.recipe_name == name) {
            line.rating = text.clone();
        }
        self.store.save_recipes(&self.recipes)?;
        Ok(())
    }

    /// Apply the set fields of an edit to every line of the recipe.
    pub(crate) fn edit_recipe(&mut self, name: &str, edit: &RecipeEdit) -> Result<()> {
        if !self.has_recipe(name) {
            bail!("No recipe named '{name}'");
        }
        for line in self.recipes.iter_mut().filter(|l| l.recipe_name == name) {
            if let Some(tags) = &edit.tags {
                line.tags = tags.clone();
            }
            if let Some(cook_time) = &edit.cook_time {
                line.cook_time = cook_time.clone();
            }
            if let Some(source) = &edit.source {
                line.source = source.clone();
            }
            if let Some(source_url) = &edit.source_url {
                line.source_url = source_url.clone();
            }
            if let Some(servings) = edit.servings {
                line.servings = servings;
            }
            if let Some(notes) = &edit.notes {
                line.notes = notes.clone();
            }
            if let Some(prep_friendly) = edit.prep_friendly {
                line.prep_friendly = prep_friendly;
            }
        }
        self.store.save_recipes(&self.recipes)?;
        Ok(())
    }

    // ── Pantry ────────────────────────────────────────────────

    /// Add a staple unless an equivalent name (case-insensitive) is already
    /// present. Returns false on a no-op.
    pub(crate) fn add_pantry_staple(&mut self, ingredient: &str) -> Result<bool> {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() {
            bail!("Ingredient name is required");
        }
        if is_staple(&self.pantry, ingredient) {
            return Ok(false);
        }
        self.pantry.push(PantryStaple::new(ingredient.to_string()));
        self.store.save_pantry(&self.pantry)?;
        Ok(true)
    }

    pub(crate) fn remove_pantry_staple(&mut self, ingredient: &str) -> Result<bool> {
        let lower = ingredient.trim().to_lowercase();
        let before = self.pantry.len();
        self.pantry.retain(|p| p.ingredient.to_lowercase() != lower);
        if self.pantry.len() == before {
            return Ok(false);
        }
        self.store.save_pantry(&self.pantry)?;
        Ok(true)
    }

    // ── Pricing ───────────────────────────────────────────────

    pub(crate) fn price_index(&self) -> PriceIndex {
        PriceIndex::new(&self.pricing)
    }

    /// Set one price and persist both the table and any change-log rows.
    pub(crate) fn set_price(&mut self, ingredient: &str, unit: &str, price: Decimal) -> Result<()> {
        if ingredient.trim().is_empty() {
            bail!("Ingredient name is required");
        }
        if price < Decimal::ZERO {
            bail!("Price cannot be negative");
        }
        let table = upsert_price(self.pricing.clone(), ingredient, unit, price);
        self.save_pricing_table(table)
    }

    fn save_pricing_table(&mut self, table: Vec<IngredientPrice>) -> Result<()> {
        let (stamped, changes) = apply_price_save(table, &self.pricing, &now_stamp());
        self.pricing = stamped;
        self.price_history.extend(changes);
        self.store.save_pricing(&self.pricing)?;
        self.store.save_price_history(&self.price_history)?;
        Ok(())
    }

    /// Recipe ingredient pairs with no price on file.
    pub(crate) fn unpriced_ingredients(&self) -> Vec<(String, String)> {
        missing_prices(&self.recipes, &self.price_index())
    }

    // ── History ───────────────────────────────────────────────

    /// Log one cooked meal per recipe name against a week. All names are
    /// validated up front so a bad one leaves the cache untouched.
    pub(crate) fn record_week(&mut self, week_start: NaiveDate, names: &[String]) -> Result<usize> {
        for name in names {
            if !self.has_recipe(name) {
                bail!("No recipe named '{name}'");
            }
        }
        for name in names {
            self.history
                .push(MealHistoryEntry::new(week_start, name.clone()));
        }
        if !names.is_empty() {
            self.store.save_history(&self.history)?;
        }
        Ok(names.len())
    }

    /// Remove one logged meal matching (week, name). Returns false when no
    /// entry matched.
    pub(crate) fn remove_history_entry(
        &mut self,
        week_start: NaiveDate,
        name: &str,
    ) -> Result<bool> {
        let Some(pos) = self
            .history
            .iter()
            .position(|h| h.week_start == week_start && h.recipe_name == name)
        else {
            return Ok(false);
        };
        self.history.remove(pos);
        self.store.save_history(&self.history)?;
        Ok(true)
    }

    pub(crate) fn clear_history(&mut self) -> Result<usize> {
        let removed = self.history.len();
        self.history.clear();
        self.store.save_history(&self.history)?;
        Ok(removed)
    }

    /// Copy every populated CSV table found in `src_dir` into the backing
    /// store, replacing what is there, then reload the working set.
    pub(crate) fn import_tables(
        &mut self,
        src_dir: &std::path::Path,
    ) -> Result<Vec<(&'static str, usize)>> {
        let copied = crate::store::migrate_into(src_dir, self.store.as_mut())?;
        self.recipes = self.store.load_recipes()?;
        self.history = self.store.load_history()?;
        self.pantry = self.store.load_pantry()?;
        self.pricing = self.store.load_pricing()?;
        self.price_history = self.store.load_price_history()?;
        Ok(copied)
    }

    // ── Planning & recommendations ────────────────────────────

    pub(crate) fn shopping_list(&self, selection: &[Selection]) -> ShoppingList {
        plan::build(&self.recipes, selection, &self.pantry, &self.price_index())
    }

    pub(crate) fn recommendations(&self, today: NaiveDate, top_n: usize) -> Vec<Recommendation> {
        recommend::recommendations(&self.recipes, &self.history, today, top_n)
    }

    pub(crate) fn quick_meals(&self) -> Vec<String> {
        recommend::quick_meals(&self.recipes)
    }

    // ── Dashboard ─────────────────────────────────────────────

    pub(crate) fn stats(&self) -> Stats {
        let names = self.recipe_names();
        let ratings: Vec<f64> = names
            .iter()
            .filter_map(|n| recipe_meta(&self.recipes, n))
            .filter_map(RecipeLine::parsed_rating)
            .collect();
        let avg_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };
        Stats {
            recipe_count: names.len(),
            meals_logged: self.history.len(),
            weeks_tracked: weeks_tracked(&self.history),
            pantry_count: self.pantry.len(),
            priced_ingredients: self.pricing.len(),
            avg_rating,
        }
    }

    /// Recipe names with a rating of 4 or above, best first.
    pub(crate) fn top_rated(&self) -> Vec<(String, f64)> {
        let mut rated: Vec<(String, f64)> = self
            .recipe_names()
            .into_iter()
            .filter_map(|n| {
                recipe_meta(&self.recipes, &n)
                    .and_then(RecipeLine::parsed_rating)
                    .filter(|r| *r >= 4.0)
                    .map(|r| (n, r))
            })
            .collect();
        rated.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rated
    }
}

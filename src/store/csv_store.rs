use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::{
    IngredientPrice, MealHistoryEntry, PantryStaple, PriceHistoryEntry, RecipeLine,
};

use super::{bool_from_str, decimal_or_zero, parse_week_start, servings_or_default, Store};

pub(crate) const RECIPES_FILE: &str = "recipes.csv";
pub(crate) const HISTORY_FILE: &str = "meal_history.csv";
pub(crate) const PANTRY_FILE: &str = "pantry_staples.csv";
pub(crate) const PRICING_FILE: &str = "ingredient_pricing.csv";
pub(crate) const PRICE_HISTORY_FILE: &str = "price_history.csv";

const RECIPE_COLS: &[&str] = &[
    "recipe_id",
    "recipe_name",
    "ingredient",
    "quantity",
    "unit",
    "category",
    "tags",
    "cook_time",
    "rating",
    "source",
    "source_url",
    "servings",
    "notes",
    "estimated_cost",
    "prep_friendly",
];

/// File-backed store: one CSV per table in a single directory. A missing
/// file is an empty table; a missing column is backfilled on load.
pub(crate) struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Read a CSV into (header index map, rows). Missing file → empty.
    fn read_table(&self, file: &str) -> Result<(HashMap<String, usize>, Vec<csv::StringRecord>)> {
        let path = self.path(file);
        if !path.exists() {
            return Ok((HashMap::new(), Vec::new()));
        }
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let headers: HashMap<String, usize> = rdr
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record.with_context(|| format!("Failed to read {}", path.display()))?);
        }
        Ok((headers, rows))
    }

    fn writer(&mut self, file: &str) -> Result<csv::Writer<std::fs::File>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;
        let path = self.path(file);
        csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Column lookup with backfill: absent column or short row reads as "".
fn field<'a>(
    record: &'a csv::StringRecord,
    headers: &HashMap<String, usize>,
    name: &str,
) -> &'a str {
    headers
        .get(name)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

impl Store for CsvStore {
    fn load_recipes(&self) -> Result<Vec<RecipeLine>> {
        let (headers, rows) = self.read_table(RECIPES_FILE)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(RecipeLine {
                recipe_id: field(row, &headers, "recipe_id").to_string(),
                recipe_name: field(row, &headers, "recipe_name").to_string(),
                ingredient: field(row, &headers, "ingredient").to_string(),
                quantity: decimal_or_zero(field(row, &headers, "quantity")),
                unit: field(row, &headers, "unit").to_string(),
                category: field(row, &headers, "category").to_string(),
                tags: field(row, &headers, "tags").to_string(),
                cook_time: field(row, &headers, "cook_time").to_string(),
                rating: field(row, &headers, "rating").trim().to_string(),
                source: field(row, &headers, "source").to_string(),
                source_url: field(row, &headers, "source_url").to_string(),
                servings: servings_or_default(field(row, &headers, "servings")),
                notes: field(row, &headers, "notes").to_string(),
                estimated_cost: decimal_or_zero(field(row, &headers, "estimated_cost")),
                prep_friendly: bool_from_str(field(row, &headers, "prep_friendly")),
            });
        }
        Ok(out)
    }

    fn save_recipes(&mut self, rows: &[RecipeLine]) -> Result<()> {
        let mut wtr = self.writer(RECIPES_FILE)?;
        wtr.write_record(RECIPE_COLS)?;
        for r in rows {
            wtr.write_record([
                r.recipe_id.as_str(),
                r.recipe_name.as_str(),
                r.ingredient.as_str(),
                &r.quantity.to_string(),
                r.unit.as_str(),
                r.category.as_str(),
                r.tags.as_str(),
                r.cook_time.as_str(),
                r.rating.as_str(),
                r.source.as_str(),
                r.source_url.as_str(),
                &r.servings.to_string(),
                r.notes.as_str(),
                &r.estimated_cost.to_string(),
                if r.prep_friendly { "true" } else { "false" },
            ])?;
        }
        wtr.flush().context("Failed to flush recipes.csv")?;
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<MealHistoryEntry>> {
        let (headers, rows) = self.read_table(HISTORY_FILE)?;
        let mut out = Vec::new();
        for row in &rows {
            // Rows with unparsable dates are dropped; nothing downstream
            // can use an undated entry.
            let Some(week_start) = parse_week_start(field(row, &headers, "week_start")) else {
                continue;
            };
            out.push(MealHistoryEntry {
                week_start,
                recipe_name: field(row, &headers, "recipe_name").to_string(),
            });
        }
        Ok(out)
    }

    fn save_history(&mut self, rows: &[MealHistoryEntry]) -> Result<()> {
        let mut wtr = self.writer(HISTORY_FILE)?;
        wtr.write_record(["week_start", "recipe_name"])?;
        for r in rows {
            wtr.write_record([
                r.week_start.format("%Y-%m-%d").to_string().as_str(),
                r.recipe_name.as_str(),
            ])?;
        }
        wtr.flush().context("Failed to flush meal_history.csv")?;
        Ok(())
    }

    fn load_pantry(&self) -> Result<Vec<PantryStaple>> {
        let (headers, rows) = self.read_table(PANTRY_FILE)?;
        Ok(rows
            .iter()
            .map(|row| PantryStaple::new(field(row, &headers, "ingredient").to_string()))
            .filter(|p| !p.ingredient.is_empty())
            .collect())
    }

    fn save_pantry(&mut self, rows: &[PantryStaple]) -> Result<()> {
        let mut wtr = self.writer(PANTRY_FILE)?;
        wtr.write_record(["ingredient"])?;
        for r in rows {
            wtr.write_record([r.ingredient.as_str()])?;
        }
        wtr.flush().context("Failed to flush pantry_staples.csv")?;
        Ok(())
    }

    fn load_pricing(&self) -> Result<Vec<IngredientPrice>> {
        let (headers, rows) = self.read_table(PRICING_FILE)?;
        Ok(rows
            .iter()
            .map(|row| IngredientPrice {
                ingredient: field(row, &headers, "ingredient").to_string(),
                unit: field(row, &headers, "unit").to_string(),
                price_per_unit: decimal_or_zero(field(row, &headers, "price_per_unit")),
                last_updated: field(row, &headers, "last_updated").to_string(),
            })
            .collect())
    }

    fn save_pricing(&mut self, rows: &[IngredientPrice]) -> Result<()> {
        let mut wtr = self.writer(PRICING_FILE)?;
        wtr.write_record(["ingredient", "unit", "price_per_unit", "last_updated"])?;
        for r in rows {
            wtr.write_record([
                r.ingredient.as_str(),
                r.unit.as_str(),
                &r.price_per_unit.to_string(),
                r.last_updated.as_str(),
            ])?;
        }
        wtr.flush().context("Failed to flush ingredient_pricing.csv")?;
        Ok(())
    }

    fn load_price_history(&self) -> Result<Vec<PriceHistoryEntry>> {
        let (headers, rows) = self.read_table(PRICE_HISTORY_FILE)?;
        Ok(rows
            .iter()
            .map(|row| PriceHistoryEntry {
                ingredient: field(row, &headers, "ingredient").to_string(),
                unit: field(row, &headers, "unit").to_string(),
                old_price: decimal_or_zero(field(row, &headers, "old_price")),
                new_price: decimal_or_zero(field(row, &headers, "new_price")),
                changed_at: field(row, &headers, "changed_at").to_string(),
            })
            .collect())
    }

    fn save_price_history(&mut self, rows: &[PriceHistoryEntry]) -> Result<()> {
        let mut wtr = self.writer(PRICE_HISTORY_FILE)?;
        wtr.write_record(["ingredient", "unit", "old_price", "new_price", "changed_at"])?;
        for r in rows {
            wtr.write_record([
                r.ingredient.as_str(),
                r.unit.as_str(),
                &r.old_price.to_string(),
                &r.new_price.to_string(),
                r.changed_at.as_str(),
            ])?;
        }
        wtr.flush().context("Failed to flush price_history.csv")?;
        Ok(())
    }
}

/// Copy every table present in `src_dir` into `dest`, replacing the
/// destination tables wholesale. Missing source files are skipped. Returns
/// (table file name, row count) per table copied.
pub(crate) fn migrate_into(
    src_dir: &Path,
    dest: &mut dyn Store,
) -> Result<Vec<(&'static str, usize)>> {
    let src = CsvStore::new(src_dir.to_path_buf());
    let mut copied = Vec::new();

    let recipes = src.load_recipes()?;
    if !recipes.is_empty() {
        dest.save_recipes(&recipes)?;
        copied.push((RECIPES_FILE, recipes.len()));
    }
    let history = src.load_history()?;
    if !history.is_empty() {
        dest.save_history(&history)?;
        copied.push((HISTORY_FILE, history.len()));
    }
    let pantry = src.load_pantry()?;
    if !pantry.is_empty() {
        dest.save_pantry(&pantry)?;
        copied.push((PANTRY_FILE, pantry.len()));
    }
    let pricing = src.load_pricing()?;
    if !pricing.is_empty() {
        dest.save_pricing(&pricing)?;
        copied.push((PRICING_FILE, pricing.len()));
    }
    let price_history = src.load_price_history()?;
    if !price_history.is_empty() {
        dest.save_price_history(&price_history)?;
        copied.push((PRICE_HISTORY_FILE, price_history.len()));
    }

    Ok(copied)
}

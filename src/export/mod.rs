use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;

use crate::models::{recipe_meta, IngredientPrice, MealHistoryEntry, RecipeLine};
use crate::plan::{effective_servings, scaled_lines, Selection, ShoppingList};

/// "£1.50" for positive amounts, "—" for zero. Display only; exported CSVs
/// keep raw numbers so they re-import cleanly.
pub(crate) fn format_price(amount: Decimal) -> String {
    if amount > Decimal::ZERO {
        format!("£{amount:.2}")
    } else {
        "—".to_string()
    }
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    csv::Writer::from_path(path).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the aggregated shopping list. Returns the number of data rows.
pub(crate) fn write_shopping_list(path: &Path, list: &ShoppingList) -> Result<usize> {
    let mut wtr = open_writer(path)?;
    wtr.write_record([
        "ingredient",
        "unit",
        "category",
        "quantity",
        "used_in",
        "price_per_unit",
        "item_cost",
    ])?;
    for line in &list.lines {
        wtr.write_record([
            line.ingredient.as_str(),
            line.unit.as_str(),
            line.category.as_str(),
            &line.quantity.to_string(),
            line.used_in.as_str(),
            &line.price_per_unit.to_string(),
            &line.item_cost.to_string(),
        ])?;
    }
    wtr.flush().context("Failed to flush shopping list")?;
    Ok(list.lines.len())
}

/// Write the week's recipes in detail form: one header row per recipe with
/// its metadata, followed by one row per scaled ingredient line.
pub(crate) fn write_week_detail(
    path: &Path,
    recipes: &[RecipeLine],
    selection: &[Selection],
) -> Result<usize> {
    let scaled = scaled_lines(recipes, selection);
    let servings = effective_servings(recipes, selection);

    let mut wtr = open_writer(path)?;
    wtr.write_record([
        "recipe_name",
        "servings",
        "cook_time",
        "source",
        "ingredient",
        "quantity",
        "unit",
        "category",
    ])?;

    let mut rows = 0;
    for (name, servings) in &servings {
        let Some(meta) = recipe_meta(recipes, name) else {
            continue;
        };
        wtr.write_record([
            name.as_str(),
            &servings.to_string(),
            meta.cook_time.as_str(),
            meta.source.as_str(),
            "",
            "",
            "",
            "",
        ])?;
        rows += 1;
        for line in scaled.iter().filter(|l| &l.recipe_name == name) {
            wtr.write_record([
                "",
                "",
                "",
                "",
                line.ingredient.as_str(),
                &format!("{:.2}", line.quantity),
                line.unit.as_str(),
                line.category.as_str(),
            ])?;
            rows += 1;
        }
    }
    wtr.flush().context("Failed to flush weekly recipes")?;
    Ok(rows)
}

/// Write the price table in its storage format.
pub(crate) fn write_pricing(path: &Path, pricing: &[IngredientPrice]) -> Result<usize> {
    let mut wtr = open_writer(path)?;
    wtr.write_record(["ingredient", "unit", "price_per_unit", "last_updated"])?;
    for row in pricing {
        wtr.write_record([
            row.ingredient.as_str(),
            row.unit.as_str(),
            &row.price_per_unit.to_string(),
            row.last_updated.as_str(),
        ])?;
    }
    wtr.flush().context("Failed to flush pricing export")?;
    Ok(pricing.len())
}

/// Write the meal history in its storage format.
pub(crate) fn write_history(path: &Path, history: &[MealHistoryEntry]) -> Result<usize> {
    let mut wtr = open_writer(path)?;
    wtr.write_record(["week_start", "recipe_name"])?;
    for row in history {
        wtr.write_record([
            row.week_start.format("%Y-%m-%d").to_string().as_str(),
            row.recipe_name.as_str(),
        ])?;
    }
    wtr.flush().context("Failed to flush history export")?;
    Ok(history.len())
}

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{IngredientPrice, PriceHistoryEntry};

/// Changes smaller than this are float noise, not price changes worth logging.
fn change_threshold() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

/// Lookup from (ingredient, unit) to current price-per-unit.
/// Both key fields match case-insensitively; units are not normalized, so
/// "g" and "grams" are distinct keys.
pub(crate) struct PriceIndex {
    map: HashMap<(String, String), Decimal>,
}

impl PriceIndex {
    pub(crate) fn new(pricing: &[IngredientPrice]) -> Self {
        let mut map = HashMap::new();
        for price in pricing {
            // First entry wins, matching lookup-by-first-match semantics.
            map.entry(price.key()).or_insert(price.price_per_unit);
        }
        Self { map }
    }

    /// Current price for the pair, or zero when nothing is on file.
    pub(crate) fn lookup(&self, ingredient: &str, unit: &str) -> Decimal {
        let key = (ingredient.to_lowercase(), unit.to_lowercase());
        self.map.get(&key).copied().unwrap_or(Decimal::ZERO)
    }

    pub(crate) fn has_price(&self, ingredient: &str, unit: &str) -> bool {
        self.lookup(ingredient, unit) > Decimal::ZERO
    }
}

/// Diff a new price table against the previously persisted one and produce
/// the rows to append to the change log. Every row of the returned table is
/// stamped with `now`, changed or not. This is the only place price-change
/// audit records are created; every save path funnels through it.
pub(crate) fn apply_price_save(
    mut new_table: Vec<IngredientPrice>,
    existing: &[IngredientPrice],
    now: &str,
) -> (Vec<IngredientPrice>, Vec<PriceHistoryEntry>) {
    let prior = PriceIndex::new(existing);
    let prior_keys: std::collections::HashSet<(String, String)> =
        existing.iter().map(|p| p.key()).collect();

    let mut changes = Vec::new();
    for row in &mut new_table {
        row.ingredient = row.ingredient.trim().to_string();
        row.unit = row.unit.trim().to_string();

        let is_new_key = !prior_keys.contains(&row.key());
        let old_price = prior.lookup(&row.ingredient, &row.unit);
        let diff = (old_price - row.price_per_unit).abs();
        if is_new_key || diff > change_threshold() {
            changes.push(PriceHistoryEntry {
                ingredient: row.ingredient.clone(),
                unit: row.unit.clone(),
                old_price,
                new_price: row.price_per_unit,
                changed_at: now.to_string(),
            });
        }
        row.last_updated = now.to_string();
    }

    (new_table, changes)
}

/// Upsert a single price into a table copy, keyed case-insensitively.
/// The result still has to go through [`apply_price_save`] to be persisted.
pub(crate) fn upsert_price(
    mut table: Vec<IngredientPrice>,
    ingredient: &str,
    unit: &str,
    price: Decimal,
) -> Vec<IngredientPrice> {
    let key = (
        ingredient.trim().to_lowercase(),
        unit.trim().to_lowercase(),
    );
    match table.iter_mut().find(|p| p.key() == key) {
        Some(row) => row.price_per_unit = price,
        None => table.push(IngredientPrice::new(
            ingredient.trim().to_string(),
            unit.trim().to_string(),
            price,
        )),
    }
    table
}

/// Distinct (ingredient, unit) pairs in the recipe table with no price on
/// file, in first-seen order.
pub(crate) fn missing_prices(
    recipes: &[crate::models::RecipeLine],
    index: &PriceIndex,
) -> Vec<(String, String)> {
    let mut seen = std::collections::HashSet::new();
    let mut missing = Vec::new();
    for line in recipes {
        let key = (line.ingredient.to_lowercase(), line.unit.to_lowercase());
        if !seen.insert(key) {
            continue;
        }
        if !index.has_price(&line.ingredient, &line.unit) {
            missing.push((line.ingredient.clone(), line.unit.clone()));
        }
    }
    missing
}

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rust_decimal::Decimal;

use crate::models::{is_staple, recipe_meta, PantryStaple, RecipeLine};
use crate::pricing::PriceIndex;

/// One recipe chosen for the week, with an optional serving override.
/// `servings: None` means "use the recipe's stored serving count".
#[derive(Debug, Clone)]
pub(crate) struct Selection {
    pub(crate) recipe_name: String,
    pub(crate) servings: Option<u32>,
}

impl Selection {
    pub(crate) fn new(recipe_name: impl Into<String>) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            servings: None,
        }
    }

    pub(crate) fn with_servings(recipe_name: impl Into<String>, servings: u32) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            servings: Some(servings),
        }
    }
}

/// One aggregated, priced line of the shopping list.
#[derive(Debug, Clone)]
pub(crate) struct ShoppingLine {
    pub(crate) ingredient: String,
    pub(crate) unit: String,
    pub(crate) category: String,
    pub(crate) quantity: Decimal,
    /// Sorted, de-duplicated contributing recipe names, joined ", ".
    pub(crate) used_in: String,
    pub(crate) price_per_unit: Decimal,
    pub(crate) item_cost: Decimal,
}

impl ShoppingLine {
    pub(crate) fn missing_price(&self) -> bool {
        self.price_per_unit == Decimal::ZERO
    }
}

/// Per-recipe cost breakdown for the cost summary.
#[derive(Debug, Clone)]
pub(crate) struct RecipeCost {
    pub(crate) recipe_name: String,
    pub(crate) servings: u32,
    pub(crate) cost: Decimal,
}

impl RecipeCost {
    pub(crate) fn per_serving(&self) -> Decimal {
        self.cost / Decimal::from(self.servings.max(1))
    }
}

/// The aggregated shopping list plus its cost metrics.
///
/// `meal_cost` covers every scaled ingredient of the selected meals, pantry
/// staples included, so it is the true ingredient cost of cooking the week.
/// `shopping_cost` only sums what is left to buy after the pantry filter.
/// The two are distinct and must not be conflated.
#[derive(Debug)]
pub(crate) struct ShoppingList {
    pub(crate) lines: Vec<ShoppingLine>,
    pub(crate) meal_cost: Decimal,
    pub(crate) shopping_cost: Decimal,
    pub(crate) total_servings: u32,
    pub(crate) cost_per_serving: Option<Decimal>,
    pub(crate) recipe_costs: Vec<RecipeCost>,
    /// Number of aggregated groups dropped by the pantry filter.
    pub(crate) pantry_excluded: usize,
}

impl ShoppingList {
    pub(crate) fn missing_prices(&self) -> Vec<&ShoppingLine> {
        self.lines.iter().filter(|l| l.missing_price()).collect()
    }
}

/// Scale every line of the selected recipes by its serving multiplier.
/// Duplicate selections are ignored (set semantics, first occurrence wins);
/// names absent from the recipe table contribute nothing.
pub(crate) fn scaled_lines(recipes: &[RecipeLine], selection: &[Selection]) -> Vec<RecipeLine> {
    let mut scaled = Vec::new();
    let mut seen = HashSet::new();

    for sel in selection {
        if !seen.insert(sel.recipe_name.clone()) {
            continue;
        }
        let Some(meta) = recipe_meta(recipes, &sel.recipe_name) else {
            continue;
        };
        let base = meta.base_servings();
        let target = sel.servings.unwrap_or(base);
        let multiplier = Decimal::from(target) / Decimal::from(base);

        for line in recipes.iter().filter(|l| l.recipe_name == sel.recipe_name) {
            let mut scaled_line = line.clone();
            scaled_line.quantity = line.quantity * multiplier;
            scaled.push(scaled_line);
        }
    }

    scaled
}

/// Effective serving count per selected recipe (override, else stored base),
/// skipping duplicates and unknown names.
pub(crate) fn effective_servings(
    recipes: &[RecipeLine],
    selection: &[Selection],
) -> Vec<(String, u32)> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for sel in selection {
        if !seen.insert(sel.recipe_name.clone()) {
            continue;
        }
        let Some(meta) = recipe_meta(recipes, &sel.recipe_name) else {
            continue;
        };
        let servings = sel.servings.unwrap_or_else(|| meta.base_servings());
        out.push((sel.recipe_name.clone(), servings));
    }
    out
}

/// Total ingredient cost of one recipe within a line table.
pub(crate) fn recipe_cost(lines: &[RecipeLine], name: &str, prices: &PriceIndex) -> Decimal {
    lines
        .iter()
        .filter(|l| l.recipe_name == name)
        .map(|l| l.quantity * prices.lookup(&l.ingredient, &l.unit))
        .sum()
}

/// Build the shopping list for the selected recipes: scale, group-by-sum,
/// pantry-filter, price, and sort by (category, ingredient).
pub(crate) fn build(
    recipes: &[RecipeLine],
    selection: &[Selection],
    pantry: &[PantryStaple],
    prices: &PriceIndex,
) -> ShoppingList {
    let scaled = scaled_lines(recipes, selection);
    let servings = effective_servings(recipes, selection);

    // Group key is exact string match, not case-folded. Keying the map by
    // (category, ingredient, unit) makes iteration come out already in the
    // output sort order.
    let mut groups: BTreeMap<(String, String, String), (Decimal, BTreeSet<String>)> =
        BTreeMap::new();
    for line in &scaled {
        let key = (
            line.category.clone(),
            line.ingredient.clone(),
            line.unit.clone(),
        );
        let entry = groups.entry(key).or_default();
        entry.0 += line.quantity;
        entry.1.insert(line.recipe_name.clone());
    }

    let mut lines = Vec::new();
    let mut pantry_excluded = 0;
    for ((category, ingredient, unit), (quantity, used_in)) in groups {
        if is_staple(pantry, &ingredient) {
            pantry_excluded += 1;
            continue;
        }
        let price_per_unit = prices.lookup(&ingredient, &unit);
        lines.push(ShoppingLine {
            item_cost: quantity * price_per_unit,
            ingredient,
            unit,
            category,
            quantity,
            used_in: used_in.into_iter().collect::<Vec<_>>().join(", "),
            price_per_unit,
        });
    }

    let meal_cost: Decimal = scaled
        .iter()
        .map(|l| l.quantity * prices.lookup(&l.ingredient, &l.unit))
        .sum();
    let shopping_cost: Decimal = lines.iter().map(|l| l.item_cost).sum();

    let recipe_costs: Vec<RecipeCost> = servings
        .iter()
        .map(|(name, servings)| RecipeCost {
            recipe_name: name.clone(),
            servings: *servings,
            cost: recipe_cost(&scaled, name, prices),
        })
        .collect();

    let total_servings: u32 = servings.iter().map(|(_, s)| s).sum();
    let cost_per_serving = if total_servings > 0 {
        Some(meal_cost / Decimal::from(total_servings))
    } else {
        None
    };

    ShoppingList {
        lines,
        meal_cost,
        shopping_cost,
        total_servings,
        cost_per_serving,
        recipe_costs,
        pantry_excluded,
    }
}

#[cfg(test)]
mod tests;

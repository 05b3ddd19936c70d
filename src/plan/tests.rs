#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{IngredientPrice, PantryStaple, RecipeLine};

fn line(
    recipe: &str,
    ingredient: &str,
    qty: Decimal,
    unit: &str,
    category: &str,
    servings: u32,
) -> RecipeLine {
    RecipeLine {
        recipe_id: format!("id-{recipe}"),
        recipe_name: recipe.into(),
        ingredient: ingredient.into(),
        quantity: qty,
        unit: unit.into(),
        category: category.into(),
        tags: String::new(),
        cook_time: String::new(),
        rating: String::new(),
        source: String::new(),
        source_url: String::new(),
        servings,
        notes: String::new(),
        estimated_cost: Decimal::ZERO,
        prep_friendly: false,
    }
}

fn pasta_table() -> Vec<RecipeLine> {
    vec![
        line("Pasta", "Pasta", dec!(200), "g", "Carbs", 2),
        line("Pasta", "Tomato", dec!(2), "item", "Vegetables", 2),
    ]
}

fn price_index(prices: &[IngredientPrice]) -> PriceIndex {
    PriceIndex::new(prices)
}

// ── Scaling ───────────────────────────────────────────────────

#[test]
fn test_scaling_doubles_quantities() {
    // 2 base servings scaled to 4: 200 g -> 400 g, 2 item -> 4 item.
    let scaled = scaled_lines(&pasta_table(), &[Selection::with_servings("Pasta", 4)]);
    assert_eq!(scaled.len(), 2);
    assert_eq!(scaled[0].quantity, dec!(400));
    assert_eq!(scaled[1].quantity, dec!(4));
}

#[test]
fn test_scaling_at_base_servings_is_identity() {
    let scaled = scaled_lines(&pasta_table(), &[Selection::with_servings("Pasta", 2)]);
    assert_eq!(scaled[0].quantity, dec!(200));
    assert_eq!(scaled[1].quantity, dec!(2));
}

#[test]
fn test_no_override_uses_stored_servings() {
    let scaled = scaled_lines(&pasta_table(), &[Selection::new("Pasta")]);
    assert_eq!(scaled[0].quantity, dec!(200));
}

#[test]
fn test_zero_base_servings_treated_as_one() {
    let table = vec![line("Broth", "Stock", dec!(500), "ml", "", 0)];
    let scaled = scaled_lines(&table, &[Selection::with_servings("Broth", 3)]);
    assert_eq!(scaled[0].quantity, dec!(1500));
}

#[test]
fn test_duplicate_selection_is_noop() {
    let selection = [Selection::new("Pasta"), Selection::with_servings("Pasta", 8)];
    let scaled = scaled_lines(&pasta_table(), &selection);
    // First occurrence wins; the table is not doubled.
    assert_eq!(scaled.len(), 2);
    assert_eq!(scaled[0].quantity, dec!(200));
}

#[test]
fn test_unknown_recipe_contributes_nothing() {
    let scaled = scaled_lines(&pasta_table(), &[Selection::new("Ghost")]);
    assert!(scaled.is_empty());
}

// ── Aggregation ───────────────────────────────────────────────

#[test]
fn test_shared_ingredients_summed_across_recipes() {
    let mut table = pasta_table();
    table.push(line("Salad", "Tomato", dec!(3), "item", "Vegetables", 2));
    let list = build(
        &table,
        &[Selection::new("Pasta"), Selection::new("Salad")],
        &[],
        &price_index(&[]),
    );
    let tomato = list.lines.iter().find(|l| l.ingredient == "Tomato").unwrap();
    assert_eq!(tomato.quantity, dec!(5));
    assert_eq!(tomato.used_in, "Pasta, Salad");
}

#[test]
fn test_grouping_key_is_exact_not_case_folded() {
    let table = vec![
        line("A", "Tomato", dec!(1), "item", "", 2),
        line("B", "tomato", dec!(1), "item", "", 2),
    ];
    let list = build(
        &table,
        &[Selection::new("A"), Selection::new("B")],
        &[],
        &price_index(&[]),
    );
    assert_eq!(list.lines.len(), 2);
}

#[test]
fn test_same_ingredient_different_units_not_merged() {
    let table = vec![
        line("A", "Tomato", dec!(200), "g", "", 2),
        line("B", "Tomato", dec!(2), "item", "", 2),
    ];
    let list = build(
        &table,
        &[Selection::new("A"), Selection::new("B")],
        &[],
        &price_index(&[]),
    );
    assert_eq!(list.lines.len(), 2);
}

#[test]
fn test_output_sorted_by_category_then_ingredient() {
    let table = vec![
        line("A", "Zucchini", dec!(1), "item", "Vegetables", 2),
        line("A", "Pasta", dec!(200), "g", "Carbs", 2),
        line("A", "Aubergine", dec!(1), "item", "Vegetables", 2),
    ];
    let list = build(&table, &[Selection::new("A")], &[], &price_index(&[]));
    let order: Vec<(&str, &str)> = list
        .lines
        .iter()
        .map(|l| (l.category.as_str(), l.ingredient.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Carbs", "Pasta"),
            ("Vegetables", "Aubergine"),
            ("Vegetables", "Zucchini"),
        ]
    );
}

// ── Pantry filter ─────────────────────────────────────────────

#[test]
fn test_pantry_staples_excluded_case_insensitive() {
    let pantry = vec![PantryStaple::new("TOMATO".into())];
    let list = build(&pasta_table(), &[Selection::new("Pasta")], &pantry, &price_index(&[]));
    assert!(list.lines.iter().all(|l| l.ingredient != "Tomato"));
    assert_eq!(list.pantry_excluded, 1);
}

#[test]
fn test_empty_pantry_behaves_like_no_match() {
    let no_pantry = build(&pasta_table(), &[Selection::new("Pasta")], &[], &price_index(&[]));
    let irrelevant = vec![PantryStaple::new("Saffron".into())];
    let with_pantry = build(
        &pasta_table(),
        &[Selection::new("Pasta")],
        &irrelevant,
        &price_index(&[]),
    );
    assert_eq!(no_pantry.lines.len(), with_pantry.lines.len());
    assert_eq!(with_pantry.pantry_excluded, 0);
}

// ── Costing ───────────────────────────────────────────────────

fn pasta_prices() -> Vec<IngredientPrice> {
    vec![
        IngredientPrice::new("Pasta".into(), "g".into(), dec!(0.002)),
        IngredientPrice::new("Tomato".into(), "item".into(), dec!(0.50)),
    ]
}

#[test]
fn test_shopping_cost_equals_sum_of_item_costs() {
    let prices = pasta_prices();
    let list = build(
        &pasta_table(),
        &[Selection::with_servings("Pasta", 4)],
        &[],
        &price_index(&prices),
    );
    let sum: Decimal = list
        .lines
        .iter()
        .map(|l| l.quantity * l.price_per_unit)
        .sum();
    assert_eq!(list.shopping_cost, sum);
    // 400 g * 0.002 + 4 item * 0.50 = 0.8 + 2.0
    assert_eq!(list.shopping_cost, dec!(2.80));
}

#[test]
fn test_meal_cost_includes_pantry_excluded_lines() {
    let prices = pasta_prices();
    let pantry = vec![PantryStaple::new("Pasta".into())];
    let list = build(
        &pasta_table(),
        &[Selection::new("Pasta")],
        &pantry,
        &price_index(&prices),
    );
    // Shopping list only buys tomatoes, but the meal still costs the pasta.
    assert_eq!(list.shopping_cost, dec!(1.00));
    assert_eq!(list.meal_cost, dec!(1.40));
}

#[test]
fn test_cost_per_serving() {
    let prices = pasta_prices();
    let list = build(
        &pasta_table(),
        &[Selection::with_servings("Pasta", 4)],
        &[],
        &price_index(&prices),
    );
    assert_eq!(list.total_servings, 4);
    assert_eq!(list.cost_per_serving, Some(dec!(0.70)));
}

#[test]
fn test_cost_per_serving_none_when_no_servings() {
    let list = build(&pasta_table(), &[], &[], &price_index(&[]));
    assert_eq!(list.total_servings, 0);
    assert_eq!(list.cost_per_serving, None);
}

#[test]
fn test_missing_price_flagged_and_costs_zero() {
    let prices = vec![IngredientPrice::new("Pasta".into(), "g".into(), dec!(0.002))];
    let list = build(
        &pasta_table(),
        &[Selection::new("Pasta")],
        &[],
        &price_index(&prices),
    );
    let tomato = list.lines.iter().find(|l| l.ingredient == "Tomato").unwrap();
    assert!(tomato.missing_price());
    assert_eq!(tomato.item_cost, Decimal::ZERO);

    let missing = list.missing_prices();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].ingredient, "Tomato");
}

#[test]
fn test_recipe_cost_breakdown() {
    let prices = pasta_prices();
    let list = build(
        &pasta_table(),
        &[Selection::with_servings("Pasta", 4)],
        &[],
        &price_index(&prices),
    );
    assert_eq!(list.recipe_costs.len(), 1);
    let rc = &list.recipe_costs[0];
    assert_eq!(rc.recipe_name, "Pasta");
    assert_eq!(rc.servings, 4);
    assert_eq!(rc.cost, dec!(2.80));
    assert_eq!(rc.per_serving(), dec!(0.70));
}

#[test]
fn test_recipe_cost_helper() {
    let prices = price_index(&pasta_prices());
    assert_eq!(recipe_cost(&pasta_table(), "Pasta", &prices), dec!(1.40));
    assert_eq!(recipe_cost(&pasta_table(), "Ghost", &prices), Decimal::ZERO);
}

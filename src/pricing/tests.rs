#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::IngredientPrice;

fn price(ingredient: &str, unit: &str, value: Decimal) -> IngredientPrice {
    IngredientPrice::new(ingredient.into(), unit.into(), value)
}

// ── PriceIndex ────────────────────────────────────────────────

#[test]
fn test_lookup_case_insensitive() {
    let index = PriceIndex::new(&[price("Tomato", "Item", dec!(0.50))]);
    assert_eq!(index.lookup("tomato", "item"), dec!(0.50));
    assert_eq!(index.lookup("TOMATO", "ITEM"), dec!(0.50));
}

#[test]
fn test_lookup_missing_returns_zero() {
    let index = PriceIndex::new(&[]);
    assert_eq!(index.lookup("Tomato", "item"), Decimal::ZERO);
    assert!(!index.has_price("Tomato", "item"));
}

#[test]
fn test_lookup_units_not_normalized() {
    let index = PriceIndex::new(&[price("Flour", "g", dec!(0.002))]);
    assert_eq!(index.lookup("Flour", "g"), dec!(0.002));
    assert_eq!(index.lookup("Flour", "grams"), Decimal::ZERO);
}

#[test]
fn test_lookup_first_entry_wins_on_duplicate_key() {
    let index = PriceIndex::new(&[
        price("Tomato", "item", dec!(0.40)),
        price("tomato", "item", dec!(0.90)),
    ]);
    assert_eq!(index.lookup("Tomato", "item"), dec!(0.40));
}

// ── apply_price_save ──────────────────────────────────────────

#[test]
fn test_first_price_logs_change_from_zero() {
    let (table, changes) = apply_price_save(
        vec![price("Tomato", "item", dec!(0.50))],
        &[],
        "2024-01-01 10:00:00",
    );
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_price, Decimal::ZERO);
    assert_eq!(changes[0].new_price, dec!(0.50));
    assert_eq!(changes[0].changed_at, "2024-01-01 10:00:00");
    assert_eq!(table[0].last_updated, "2024-01-01 10:00:00");
}

#[test]
fn test_price_change_logged_with_real_old_value() {
    let existing = vec![price("Tomato", "item", dec!(1.00))];
    let (_, changes) = apply_price_save(
        vec![price("Tomato", "item", dec!(1.50))],
        &existing,
        "2024-01-02 10:00:00",
    );
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_price, dec!(1.00));
    assert_eq!(changes[0].new_price, dec!(1.50));
}

#[test]
fn test_unchanged_price_logs_nothing() {
    let existing = vec![price("Tomato", "item", dec!(1.50))];
    let (_, changes) = apply_price_save(
        vec![price("Tomato", "item", dec!(1.50))],
        &existing,
        "2024-01-03 10:00:00",
    );
    assert!(changes.is_empty());
}

#[test]
fn test_change_within_noise_threshold_ignored() {
    let existing = vec![price("Tomato", "item", dec!(1.500))];
    let (_, changes) = apply_price_save(
        vec![price("Tomato", "item", dec!(1.5005))],
        &existing,
        "2024-01-03 10:00:00",
    );
    assert!(changes.is_empty());
}

#[test]
fn test_change_just_over_threshold_logged() {
    let existing = vec![price("Tomato", "item", dec!(1.500))];
    let (_, changes) = apply_price_save(
        vec![price("Tomato", "item", dec!(1.502))],
        &existing,
        "2024-01-03 10:00:00",
    );
    assert_eq!(changes.len(), 1);
}

#[test]
fn test_unchanged_rows_still_stamped() {
    let existing = vec![price("Tomato", "item", dec!(1.50))];
    let (table, _) = apply_price_save(
        vec![price("Tomato", "item", dec!(1.50))],
        &existing,
        "2024-01-04 09:30:00",
    );
    assert_eq!(table[0].last_updated, "2024-01-04 09:30:00");
}

#[test]
fn test_comparison_is_case_insensitive() {
    let existing = vec![price("Tomato", "Item", dec!(1.50))];
    let (_, changes) = apply_price_save(
        vec![price("tomato", "item", dec!(1.50))],
        &existing,
        "2024-01-05 10:00:00",
    );
    assert!(changes.is_empty());
}

#[test]
fn test_save_trims_key_fields() {
    let (table, changes) = apply_price_save(
        vec![price(" Tomato ", " item ", dec!(0.50))],
        &[],
        "2024-01-01 10:00:00",
    );
    assert_eq!(table[0].ingredient, "Tomato");
    assert_eq!(table[0].unit, "item");
    assert_eq!(changes[0].ingredient, "Tomato");
}

#[test]
fn test_bulk_save_mixed_changes() {
    let existing = vec![
        price("Tomato", "item", dec!(0.50)),
        price("Pasta", "g", dec!(0.002)),
    ];
    let (_, changes) = apply_price_save(
        vec![
            price("Tomato", "item", dec!(0.60)), // changed
            price("Pasta", "g", dec!(0.002)),    // unchanged
            price("Onion", "item", dec!(0.30)),  // new
        ],
        &existing,
        "2024-01-06 10:00:00",
    );
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().any(|c| c.ingredient == "Tomato"));
    assert!(changes.iter().any(|c| c.ingredient == "Onion"));
}

// ── upsert_price ──────────────────────────────────────────────

#[test]
fn test_upsert_updates_existing_key() {
    let table = vec![price("Tomato", "item", dec!(0.50))];
    let table = upsert_price(table, "TOMATO", "ITEM", dec!(0.75));
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].price_per_unit, dec!(0.75));
}

#[test]
fn test_upsert_appends_new_key() {
    let table = upsert_price(Vec::new(), "Onion", "item", dec!(0.30));
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].ingredient, "Onion");
}

// ── missing_prices ────────────────────────────────────────────

#[test]
fn test_missing_prices_reports_unpriced_pairs() {
    let recipes = vec![
        recipe_line("Pasta", "Pasta", "g"),
        recipe_line("Pasta", "Tomato", "item"),
        recipe_line("Soup", "Tomato", "item"), // duplicate pair, reported once
    ];
    let index = PriceIndex::new(&[price("Pasta", "g", dec!(0.002))]);
    let missing = missing_prices(&recipes, &index);
    assert_eq!(missing, vec![("Tomato".to_string(), "item".to_string())]);
}

fn recipe_line(recipe: &str, ingredient: &str, unit: &str) -> crate::models::RecipeLine {
    crate::models::RecipeLine {
        recipe_id: "id".into(),
        recipe_name: recipe.into(),
        ingredient: ingredient.into(),
        quantity: dec!(1),
        unit: unit.into(),
        category: String::new(),
        tags: String::new(),
        cook_time: String::new(),
        rating: String::new(),
        source: String::new(),
        source_url: String::new(),
        servings: 2,
        notes: String::new(),
        estimated_cost: Decimal::ZERO,
        prep_friendly: false,
    }
}

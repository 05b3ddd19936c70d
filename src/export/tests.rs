#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::models::PantryStaple;
use crate::plan;
use crate::pricing::PriceIndex;

fn line(name: &str, ingredient: &str, qty: &str, unit: &str, category: &str) -> RecipeLine {
    RecipeLine {
        recipe_id: "id".to_string(),
        recipe_name: name.to_string(),
        ingredient: ingredient.to_string(),
        quantity: qty.parse().unwrap(),
        unit: unit.to_string(),
        category: category.to_string(),
        tags: String::new(),
        cook_time: "30 mins".to_string(),
        rating: String::new(),
        source: "Book".to_string(),
        source_url: String::new(),
        servings: 2,
        notes: String::new(),
        estimated_cost: dec!(0),
        prep_friendly: false,
    }
}

#[test]
fn test_format_price() {
    assert_eq!(format_price(dec!(1.5)), "£1.50");
    assert_eq!(format_price(dec!(0)), "—");
}

#[test]
fn test_write_shopping_list() {
    let recipes = vec![
        line("Curry", "Rice", "150", "g", "Pantry"),
        line("Curry", "Onion", "1", "item", "Vegetables"),
    ];
    let pricing = vec![IngredientPrice::new(
        "rice".to_string(),
        "g".to_string(),
        dec!(0.01),
    )];
    let list = plan::build(
        &recipes,
        &[Selection::new("Curry")],
        &[] as &[PantryStaple],
        &PriceIndex::new(&pricing),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shopping_list.csv");
    let rows = write_shopping_list(&path, &list).unwrap();
    assert_eq!(rows, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ingredient,unit,category,quantity,used_in,price_per_unit,item_cost"
    );
    assert_eq!(lines.next().unwrap(), "Rice,g,Pantry,150,Curry,0.01,1.50");
    assert_eq!(lines.next().unwrap(), "Onion,item,Vegetables,1,Curry,0,0");
}

#[test]
fn test_write_week_detail_interleaves_meta_and_lines() {
    let recipes = vec![
        line("Curry", "Rice", "150", "g", "Pantry"),
        line("Curry", "Onion", "1", "item", "Vegetables"),
    ];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weekly_recipes.csv");
    let rows = write_week_detail(&path, &recipes, &[Selection::with_servings("Curry", 4)]).unwrap();
    assert_eq!(rows, 3);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "recipe_name,servings,cook_time,source,ingredient,quantity,unit,category"
    );
    assert_eq!(lines.next().unwrap(), "Curry,4,30 mins,Book,,,,");
    assert_eq!(lines.next().unwrap(), ",,,,Rice,300.00,g,Pantry");
    assert_eq!(lines.next().unwrap(), ",,,,Onion,2.00,item,Vegetables");
}

#[test]
fn test_write_pricing_round_trips_storage_columns() {
    let mut price = IngredientPrice::new("rice".to_string(), "g".to_string(), dec!(0.002));
    price.last_updated = "2025-03-10 09:00:00".to_string();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ingredient_pricing.csv");
    assert_eq!(write_pricing(&path, &[price]).unwrap(), 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("ingredient,unit,price_per_unit,last_updated\n"));
    assert!(text.contains("rice,g,0.002,2025-03-10 09:00:00"));
}

#[test]
fn test_write_history() {
    let history = vec![MealHistoryEntry::new(
        NaiveDate::parse_from_str("2025-03-10", "%Y-%m-%d").unwrap(),
        "Curry".to_string(),
    )];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meal_history.csv");
    assert_eq!(write_history(&path, &history).unwrap(), 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("2025-03-10,Curry"));
}

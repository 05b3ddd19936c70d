mod csv_store;
mod schema;
mod sqlite_store;

pub(crate) use csv_store::{migrate_into, CsvStore};
pub(crate) use sqlite_store::SqliteStore;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{
    IngredientPrice, MealHistoryEntry, PantryStaple, PriceHistoryEntry, RecipeLine,
    DEFAULT_SERVINGS,
};

/// Whole-table persistence for the five tables. Every save replaces the
/// table's entire contents; there is no partial update and no locking, so
/// two concurrent sessions can race on the rewrite and the last writer wins.
pub(crate) trait Store {
    fn load_recipes(&self) -> Result<Vec<RecipeLine>>;
    fn save_recipes(&mut self, rows: &[RecipeLine]) -> Result<()>;

    fn load_history(&self) -> Result<Vec<MealHistoryEntry>>;
    fn save_history(&mut self, rows: &[MealHistoryEntry]) -> Result<()>;

    fn load_pantry(&self) -> Result<Vec<PantryStaple>>;
    fn save_pantry(&mut self, rows: &[PantryStaple]) -> Result<()>;

    fn load_pricing(&self) -> Result<Vec<IngredientPrice>>;
    fn save_pricing(&mut self, rows: &[IngredientPrice]) -> Result<()>;

    fn load_price_history(&self) -> Result<Vec<PriceHistoryEntry>>;
    fn save_price_history(&mut self, rows: &[PriceHistoryEntry]) -> Result<()>;
}

// ── Lenient field parsing ────────────────────────────────────
//
// Loads normalize every column to a safe value: numeric → 0, boolean →
// false, text → empty, servings → 2. Stored data may predate columns or
// carry stray text; a load never fails on a bad cell.

pub(crate) fn decimal_or_zero(s: &str) -> Decimal {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed).unwrap_or(Decimal::ZERO)
}

pub(crate) fn servings_or_default(s: &str) -> u32 {
    s.trim().parse::<u32>().unwrap_or(DEFAULT_SERVINGS)
}

pub(crate) fn bool_from_str(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1")
}

/// Parse a week_start cell, trying the canonical format first and a couple
/// of spreadsheet-style fallbacks. None for blank or unparsable cells.
pub(crate) fn parse_week_start(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    None
}

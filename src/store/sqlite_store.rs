use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{schema, Store};
use crate::models::{
    IngredientPrice, MealHistoryEntry, PantryStaple, PriceHistoryEntry, RecipeLine,
};

/// SQLite-backed store. Saves replace the whole table inside a single
/// transaction; loads read back in insertion order so row order round-trips.
pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate().context("Database migration failed")?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }
}

impl Store for SqliteStore {
    fn load_recipes(&self) -> Result<Vec<RecipeLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT recipe_id, recipe_name, ingredient, quantity, unit, category, tags,
                    cook_time, rating, source, source_url, servings, notes, estimated_cost,
                    prep_friendly
             FROM recipes ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let quantity: String = row.get(3)?;
            let estimated_cost: String = row.get(13)?;
            Ok(RecipeLine {
                recipe_id: row.get(0)?,
                recipe_name: row.get(1)?,
                ingredient: row.get(2)?,
                quantity: Decimal::from_str(&quantity).unwrap_or_default(),
                unit: row.get(4)?,
                category: row.get(5)?,
                tags: row.get(6)?,
                cook_time: row.get(7)?,
                rating: row.get(8)?,
                source: row.get(9)?,
                source_url: row.get(10)?,
                servings: row.get(11)?,
                notes: row.get(12)?,
                estimated_cost: Decimal::from_str(&estimated_cost).unwrap_or_default(),
                prep_friendly: row.get(14)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn save_recipes(&mut self, rows: &[RecipeLine]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM recipes", [])?;
        for r in rows {
            tx.execute(
                "INSERT INTO recipes (recipe_id, recipe_name, ingredient, quantity, unit,
                     category, tags, cook_time, rating, source, source_url, servings, notes,
                     estimated_cost, prep_friendly)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    r.recipe_id,
                    r.recipe_name,
                    r.ingredient,
                    r.quantity.to_string(),
                    r.unit,
                    r.category,
                    r.tags,
                    r.cook_time,
                    r.rating,
                    r.source,
                    r.source_url,
                    r.servings,
                    r.notes,
                    r.estimated_cost.to_string(),
                    r.prep_friendly,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<MealHistoryEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT week_start, recipe_name FROM meal_history ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let week_start: String = row.get(0)?;
            let recipe_name: String = row.get(1)?;
            Ok((week_start, recipe_name))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (week_start, recipe_name) = row?;
            // Rows with unparsable dates are dropped, same as the CSV load.
            if let Ok(week_start) = NaiveDate::parse_from_str(&week_start, "%Y-%m-%d") {
                out.push(MealHistoryEntry {
                    week_start,
                    recipe_name,
                });
            }
        }
        Ok(out)
    }

    fn save_history(&mut self, rows: &[MealHistoryEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM meal_history", [])?;
        for r in rows {
            tx.execute(
                "INSERT INTO meal_history (week_start, recipe_name) VALUES (?1, ?2)",
                params![r.week_start.format("%Y-%m-%d").to_string(), r.recipe_name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_pantry(&self) -> Result<Vec<PantryStaple>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ingredient FROM pantry_staples ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(PantryStaple {
                ingredient: row.get(0)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn save_pantry(&mut self, rows: &[PantryStaple]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM pantry_staples", [])?;
        for r in rows {
            tx.execute(
                "INSERT INTO pantry_staples (ingredient) VALUES (?1)",
                params![r.ingredient],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_pricing(&self) -> Result<Vec<IngredientPrice>> {
        let mut stmt = self.conn.prepare(
            "SELECT ingredient, unit, price_per_unit, last_updated
             FROM ingredient_pricing ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let price: String = row.get(2)?;
            Ok(IngredientPrice {
                ingredient: row.get(0)?,
                unit: row.get(1)?,
                price_per_unit: Decimal::from_str(&price).unwrap_or_default(),
                last_updated: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn save_pricing(&mut self, rows: &[IngredientPrice]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM ingredient_pricing", [])?;
        for r in rows {
            tx.execute(
                "INSERT INTO ingredient_pricing (ingredient, unit, price_per_unit, last_updated)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    r.ingredient,
                    r.unit,
                    r.price_per_unit.to_string(),
                    r.last_updated,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_price_history(&self) -> Result<Vec<PriceHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT ingredient, unit, old_price, new_price, changed_at
             FROM price_history ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let old_price: String = row.get(2)?;
            let new_price: String = row.get(3)?;
            Ok(PriceHistoryEntry {
                ingredient: row.get(0)?,
                unit: row.get(1)?,
                old_price: Decimal::from_str(&old_price).unwrap_or_default(),
                new_price: Decimal::from_str(&new_price).unwrap_or_default(),
                changed_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn save_price_history(&mut self, rows: &[PriceHistoryEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM price_history", [])?;
        for r in rows {
            tx.execute(
                "INSERT INTO price_history (ingredient, unit, old_price, new_price, changed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    r.ingredient,
                    r.unit,
                    r.old_price.to_string(),
                    r.new_price.to_string(),
                    r.changed_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS recipes (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id      TEXT NOT NULL,
    recipe_name    TEXT NOT NULL,
    ingredient     TEXT NOT NULL,
    quantity       TEXT NOT NULL DEFAULT '0',
    unit           TEXT NOT NULL DEFAULT '',
    category       TEXT NOT NULL DEFAULT '',
    tags           TEXT NOT NULL DEFAULT '',
    cook_time      TEXT NOT NULL DEFAULT '',
    rating         TEXT NOT NULL DEFAULT '',
    source         TEXT NOT NULL DEFAULT '',
    source_url     TEXT NOT NULL DEFAULT '',
    servings       INTEGER NOT NULL DEFAULT 2,
    notes          TEXT NOT NULL DEFAULT '',
    estimated_cost TEXT NOT NULL DEFAULT '0',
    prep_friendly  BOOLEAN NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(recipe_name);

CREATE TABLE IF NOT EXISTS meal_history (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    week_start  TEXT NOT NULL,
    recipe_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pantry_staples (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ingredient_pricing (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient     TEXT NOT NULL,
    unit           TEXT NOT NULL DEFAULT '',
    price_per_unit TEXT NOT NULL DEFAULT '0',
    last_updated   TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS price_history (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient TEXT NOT NULL,
    unit       TEXT NOT NULL DEFAULT '',
    old_price  TEXT NOT NULL DEFAULT '0',
    new_price  TEXT NOT NULL DEFAULT '0',
    changed_at TEXT NOT NULL DEFAULT ''
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE recipes ADD COLUMN cuisine TEXT NOT NULL DEFAULT '';"),
];

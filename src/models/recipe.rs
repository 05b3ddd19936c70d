use rust_decimal::Decimal;

/// One ingredient row belonging to a recipe. A recipe is the set of lines
/// sharing `recipe_id`; recipe-level metadata (cook_time, rating, servings,
/// …) is duplicated onto every line and kept in sync by the edit commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLine {
    pub recipe_id: String,
    pub recipe_name: String,
    pub ingredient: String,
    pub quantity: Decimal,
    pub unit: String,
    pub category: String,
    pub tags: String,
    pub cook_time: String,
    /// "1"–"5" as entered, or empty when unrated.
    pub rating: String,
    pub source: String,
    pub source_url: String,
    pub servings: u32,
    pub notes: String,
    pub estimated_cost: Decimal,
    pub prep_friendly: bool,
}

pub const DEFAULT_SERVINGS: u32 = 2;

impl RecipeLine {
    /// Rating parsed as a number, or None when empty/unparsable.
    pub fn parsed_rating(&self) -> Option<f64> {
        let trimmed = self.rating.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok()
    }

    /// Base serving count the listed quantities assume; 0 is treated as 1
    /// so serving-ratio math never divides by zero.
    pub fn base_servings(&self) -> u32 {
        self.servings.max(1)
    }
}

/// Sorted, de-duplicated recipe names across the line table.
pub fn unique_recipe_names(lines: &[RecipeLine]) -> Vec<String> {
    let mut names: Vec<String> = lines
        .iter()
        .map(|l| l.recipe_name.clone())
        .filter(|n| !n.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// First line of the named recipe, which carries its metadata.
pub fn recipe_meta<'a>(lines: &'a [RecipeLine], name: &str) -> Option<&'a RecipeLine> {
    lines.iter().find(|l| l.recipe_name == name)
}

/// All lines of the named recipe, in table order.
pub fn recipe_lines<'a>(lines: &'a [RecipeLine], name: &str) -> Vec<&'a RecipeLine> {
    lines.iter().filter(|l| l.recipe_name == name).collect()
}

/// Stable identifier for a newly created recipe. FNV-1a over the name and
/// creation timestamp; stable across Rust versions, unlike DefaultHasher.
pub fn new_recipe_id(recipe_name: &str, created_at: &str) -> String {
    let input = format!("{recipe_name}|{created_at}");
    format!("{:016x}", fnv1a(input.as_bytes()))
}

pub(crate) fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// An ingredient the user always has on hand. Shopping lists drop any line
/// whose ingredient matches a staple name case-insensitively; the unit is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryStaple {
    pub ingredient: String,
}

impl PantryStaple {
    pub fn new(ingredient: String) -> Self {
        Self { ingredient }
    }
}

/// Is `ingredient` covered by the pantry (case-insensitive name match)?
pub fn is_staple(pantry: &[PantryStaple], ingredient: &str) -> bool {
    let lower = ingredient.to_lowercase();
    pantry.iter().any(|p| p.ingredient.to_lowercase() == lower)
}

/// Common staples offered as one-tap suggestions, minus those already
/// in the pantry.
pub fn suggested_staples(pantry: &[PantryStaple]) -> Vec<&'static str> {
    const COMMON: &[&str] = &[
        "Salt", "Pepper", "Olive oil", "Garlic", "Onion", "Rice", "Pasta", "Flour", "Sugar",
        "Butter",
    ];
    COMMON
        .iter()
        .filter(|c| !is_staple(pantry, c))
        .copied()
        .collect()
}

impl std::fmt::Display for PantryStaple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ingredient)
    }
}

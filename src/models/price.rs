use rust_decimal::Decimal;

/// Current price for one (ingredient, unit) pair. The composite key is
/// case-insensitive; "g" and "grams" are distinct units on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientPrice {
    pub ingredient: String,
    pub unit: String,
    pub price_per_unit: Decimal,
    /// "%Y-%m-%d %H:%M:%S", stamped on every save.
    pub last_updated: String,
}

impl IngredientPrice {
    pub fn new(ingredient: String, unit: String, price_per_unit: Decimal) -> Self {
        Self {
            ingredient,
            unit,
            price_per_unit,
            last_updated: String::new(),
        }
    }

    pub fn key(&self) -> (String, String) {
        (self.ingredient.to_lowercase(), self.unit.to_lowercase())
    }
}

/// One row of the append-only price-change log. `old_price` is zero when the
/// key was priced for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceHistoryEntry {
    pub ingredient: String,
    pub unit: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub changed_at: String,
}

impl PriceHistoryEntry {
    /// Percent change for display; "New" when there was no prior price.
    pub fn change_label(&self) -> String {
        if self.old_price > Decimal::ZERO {
            let pct = (self.new_price - self.old_price) / self.old_price * Decimal::from(100);
            format!("{pct:.1}%")
        } else {
            "New".to_string()
        }
    }
}

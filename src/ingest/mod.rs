use rust_decimal::Decimal;
use std::str::FromStr;

/// One valid ingredient entry parsed out of a free-text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngredientDraft {
    pub(crate) ingredient: String,
    pub(crate) quantity: Decimal,
    pub(crate) unit: String,
    pub(crate) category: String,
}

/// Parse a multi-line ingredient block, one entry per line:
/// `name, quantity, unit` or `name, quantity, unit, category`.
///
/// Bad lines become per-line error messages; good lines still parse, so a
/// recipe save can proceed with the valid subset.
pub(crate) fn parse_ingredient_block(text: &str) -> (Vec<IngredientDraft>, Vec<String>) {
    let mut drafts = Vec::new();
    let mut errors = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_ingredient_line(line) {
            Ok(draft) => drafts.push(draft),
            Err(msg) => errors.push(msg),
        }
    }

    (drafts, errors)
}

fn parse_ingredient_line(line: &str) -> Result<IngredientDraft, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();

    let (ingredient, qty_str, unit, category) = match parts.as_slice() {
        [ing, qty, unit] => (*ing, *qty, *unit, ""),
        [ing, qty, unit, cat] => (*ing, *qty, *unit, *cat),
        _ => return Err(format!("Bad format: {line}")),
    };

    if ingredient.is_empty() {
        return Err(format!("Missing ingredient name: {line}"));
    }

    let quantity = Decimal::from_str(qty_str)
        .map_err(|e| format!("Parse error on '{line}': {e}"))?;
    if quantity < Decimal::ZERO {
        return Err(format!("Negative quantity on '{line}'"));
    }

    Ok(IngredientDraft {
        ingredient: ingredient.to_string(),
        quantity,
        unit: unit.to_string(),
        category: category.to_string(),
    })
}

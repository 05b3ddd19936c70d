use chrono::NaiveDate;

/// One cooked meal: a recipe name against the Monday of the week it was
/// cooked. No referential integrity against the recipe table; entries
/// survive renames and deletes as orphans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealHistoryEntry {
    pub week_start: NaiveDate,
    pub recipe_name: String,
}

impl MealHistoryEntry {
    pub fn new(week_start: NaiveDate, recipe_name: String) -> Self {
        Self {
            week_start,
            recipe_name,
        }
    }
}

/// Count of history rows for one recipe name (exact match).
pub fn times_cooked(history: &[MealHistoryEntry], name: &str) -> usize {
    history.iter().filter(|h| h.recipe_name == name).count()
}

/// Most recent week_start for one recipe name.
pub fn last_cooked(history: &[MealHistoryEntry], name: &str) -> Option<NaiveDate> {
    history
        .iter()
        .filter(|h| h.recipe_name == name)
        .map(|h| h.week_start)
        .max()
}

/// Distinct weeks present in the history.
pub fn weeks_tracked(history: &[MealHistoryEntry]) -> usize {
    let mut weeks: Vec<NaiveDate> = history.iter().map(|h| h.week_start).collect();
    weeks.sort();
    weeks.dedup();
    weeks.len()
}

/// (recipe_name, count) pairs ordered by count descending, then name.
pub fn most_cooked(history: &[MealHistoryEntry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in history {
        match counts.iter_mut().find(|(n, _)| *n == entry.recipe_name) {
            Some((_, c)) => *c += 1,
            None => counts.push((entry.recipe_name.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{last_cooked, times_cooked, MealHistoryEntry, RecipeLine};

/// Cook times that count as quick for the dashboard list (≤ 25 minutes,
/// matched as loose text since cook_time is free-form).
static QUICK_MEAL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"1[0-5]|20|25").ok());

#[derive(Debug, Clone)]
pub(crate) struct Recommendation {
    pub(crate) recipe_name: String,
    pub(crate) score: f64,
    pub(crate) reasons: Vec<String>,
}

impl Recommendation {
    pub(crate) fn reason_line(&self) -> String {
        self.reasons.join(" · ")
    }
}

/// Score every recipe against the meal history and return the top `top_n`.
///
/// The weights and thresholds are a hand-tuned heuristic; they are part of
/// the behavioral contract and must not be "improved". Deterministic given
/// identical inputs and `today`. Ties keep the first-seen recipe order from
/// the line table.
pub(crate) fn recommendations(
    recipes: &[RecipeLine],
    history: &[MealHistoryEntry],
    today: NaiveDate,
    top_n: usize,
) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    let mut recs = Vec::new();

    for line in recipes {
        let name = &line.recipe_name;
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        recs.push(score_recipe(line, history, today));
    }

    recs.sort_by(|a, b| b.score.total_cmp(&a.score));
    recs.truncate(top_n);
    recs
}

fn score_recipe(
    meta: &RecipeLine,
    history: &[MealHistoryEntry],
    today: NaiveDate,
) -> Recommendation {
    let name = &meta.recipe_name;
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if let Some(rating) = meta.parsed_rating() {
        if (1.0..=5.0).contains(&rating) {
            score += rating * 10.0;
            if rating >= 4.0 {
                reasons.push(format!("⭐ Rated {rating:.0}/5"));
            }
        }
    }

    let n = times_cooked(history, name);
    if n == 0 {
        score += 10.0;
        reasons.push("✨ Never tried".to_string());
    } else {
        if let Some(last) = last_cooked(history, name) {
            let days = (today - last).num_days();
            if days > 60 {
                score += 15.0;
                reasons.push(format!("🕐 Not cooked in {days} days"));
            } else if days < 14 {
                // Recently cooked: deprioritize, no reason shown.
                score -= 20.0;
            }
        }
        if n >= 3 {
            score += 5.0;
            reasons.push(format!("❤️ Favorite ({n}×)"));
        }
    }

    if meta.cook_time.contains("15") || meta.cook_time.contains("20") {
        score += 5.0;
        reasons.push("⚡ Quick meal".to_string());
    }

    if reasons.is_empty() {
        reasons.push("Good choice!".to_string());
    }

    Recommendation {
        recipe_name: name.clone(),
        score,
        reasons,
    }
}

/// Recipe names whose cook_time matches the quick-meal pattern, in
/// first-seen order.
pub(crate) fn quick_meals(recipes: &[RecipeLine]) -> Vec<String> {
    let Some(re) = QUICK_MEAL_RE.as_ref() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    recipes
        .iter()
        .filter(|l| !l.recipe_name.is_empty() && re.is_match(&l.cook_time))
        .filter(|l| seen.insert(l.recipe_name.clone()))
        .map(|l| l.recipe_name.clone())
        .collect()
}

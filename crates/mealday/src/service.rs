use std::collections::{BTreeSet, HashSet};

use rand::seq::IndexedRandom;
use serde::Serialize;
use time::{Date, Duration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaydayInfo {
    pub days_until_next_payday: i64,
    pub next_payday_date: String,
}

/// First payday strictly after `today` on a `period_days` cycle through `anchor`.
///
/// Works on either side of the anchor. A payday falling on `today` counts as
/// already paid, so the result is always at least one day away.
pub fn next_payday(today: Date, anchor: Date, period_days: u32) -> Date {
    let period = i64::from(period_days.max(1));
    let elapsed = (today - anchor).whole_days();
    let periods = elapsed.div_euclid(period) + 1;

    anchor + Duration::days(periods * period)
}

pub fn payday_info(
    today: Date,
    anchor: Date,
    period_days: u32,
) -> mealdays_shared::Result<PaydayInfo> {
    let next = next_payday(today, anchor, period_days);

    Ok(PaydayInfo {
        days_until_next_payday: (next - today).whole_days(),
        next_payday_date: mealdays_shared::format_date(next)?,
    })
}

/// Favorites not eaten recently, compared trimmed and case-insensitively.
pub fn rotation_candidates<F, R>(favorites: F, recent: R) -> Vec<String>
where
    F: IntoIterator,
    F::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let recent: HashSet<String> = recent
        .into_iter()
        .map(|meal| meal.as_ref().trim().to_lowercase())
        .collect();

    favorites
        .into_iter()
        .map(|meal| meal.as_ref().trim().to_owned())
        .filter(|meal| !meal.is_empty() && !recent.contains(&meal.to_lowercase()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn suggest_rotation(candidates: &[String]) -> Option<String> {
    let mut rng = rand::rng();
    candidates.choose(&mut rng).cloned()
}

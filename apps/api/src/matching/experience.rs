#![allow(dead_code)]

//! Experience Estimator: total years of experience and recency of the most
//! recent role, derived from employment date ranges.
//!
//! Every operation has an `_at` variant taking the evaluation date so results
//! are reproducible; the plain variants evaluate against today (UTC).

use chrono::{NaiveDate, Utc};

use crate::models::candidate::ExperienceEntry;

/// Divisor used when converting a role's duration to years.
const DAYS_PER_YEAR: f64 = 365.25;
/// Divisor used when measuring time since the most recent role ended.
const RECENCY_DAYS_PER_YEAR: f64 = 365.0;
/// Durations at or beyond this are treated as malformed input.
const MAX_PLAUSIBLE_YEARS: f64 = 100.0;
/// Points lost per year since the most recent role ended.
const RECENCY_DECAY_PER_YEAR: f64 = 10.0;
/// Returned when no entry has a usable end date.
pub const NEUTRAL_RECENCY_SCORE: f64 = 50.0;

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Total years across all entries, rounded to one decimal place.
pub fn estimate_total_experience(entries: &[ExperienceEntry]) -> f64 {
    estimate_total_experience_at(entries, today())
}

/// Overlapping roles are not de-duplicated; each contributes its full span.
pub fn estimate_total_experience_at(entries: &[ExperienceEntry], today: NaiveDate) -> f64 {
    let total: f64 = entries
        .iter()
        .filter_map(|entry| entry_years(entry, today))
        .sum();
    round_to_tenth(total)
}

/// Span of a single entry in years, or `None` when the entry is skipped:
/// no start date, no end date on a non-current role, or an implausible span.
fn entry_years(entry: &ExperienceEntry, today: NaiveDate) -> Option<f64> {
    let start = entry.start_date?;
    let end = entry.effective_end(today)?;
    let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;

    (years > 0.0 && years < MAX_PLAUSIBLE_YEARS).then_some(years)
}

/// 0–100 score rewarding recent or ongoing experience.
pub fn calculate_experience_recency(entries: &[ExperienceEntry]) -> f64 {
    calculate_experience_recency_at(entries, today())
}

/// 100 for a current role, minus 10 per year since the latest end date,
/// floored at 0. Neutral 50 when nothing has an end date.
pub fn calculate_experience_recency_at(entries: &[ExperienceEntry], today: NaiveDate) -> f64 {
    let most_recent_end = entries
        .iter()
        .filter_map(|entry| entry.effective_end(today))
        .max();

    match most_recent_end {
        None => NEUTRAL_RECENCY_SCORE,
        Some(end) => {
            let years_since_end = (today - end).num_days() as f64 / RECENCY_DAYS_PER_YEAR;
            (100.0 - RECENCY_DECAY_PER_YEAR * years_since_end).clamp(0.0, 100.0)
        }
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

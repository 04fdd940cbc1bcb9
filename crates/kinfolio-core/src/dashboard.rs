//! Aggregations behind the teacher dashboard and author archive pages.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubjectShare {
    pub subject: String,
    pub count: u64,
    /// Percent of all considered posts, rounded to one decimal.
    pub percentage: f64,
}

/// Per-subject post counts and their share of the total, ordered by subject name.
///
/// Empty input gives an empty distribution.
pub fn subject_distribution<'a, I>(subject_names: I) -> Vec<SubjectShare>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut total = 0u64;
    for name in subject_names {
        *counts.entry(name).or_insert(0) += 1;
        total += 1;
    }

    counts
        .into_iter()
        .map(|(subject, count)| SubjectShare {
            subject: subject.to_string(),
            count,
            percentage: round_one_decimal(count as f64 * 100.0 / total as f64),
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Distinct calendar years (in `time_zone`) of the given timestamps, newest first.
pub fn archive_years<I>(timestamps: I, time_zone: Tz) -> Vec<i32>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let years: BTreeSet<i32> = timestamps
        .into_iter()
        .map(|ts| ts.with_timezone(&time_zone).year())
        .collect();
    years.into_iter().rev().collect()
}

/// `[start, end)` of a calendar year in `time_zone`, as UTC instants.
///
/// `None` for years chrono cannot represent.
pub fn year_bounds(time_zone: Tz, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = time_zone
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .earliest()?;
    let end = time_zone
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .earliest()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

//! Contribution heatmap for the trailing year.
//!
//! Posts are bucketed by calendar day in one fixed time zone and laid out on a
//! 53 × 7 grid (weeks × weekdays, Sunday first) that begins on the Sunday on
//! or before the window start. Each cell carries a 0–4 activity level.
//!
//! The window is the 365 days ending at the reference date inclusive, so the
//! window start shares the reference date's weekday and the whole window
//! always fits on the grid.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub const WEEKS: usize = 53;
pub const DAYS_PER_WEEK: usize = 7;
/// Days in the window, the reference date included.
pub const WINDOW_DAYS: u64 = 365;

/// Minimum count for levels 1 through 4.
const LEVEL_THRESHOLDS: [u32; 4] = [1, 3, 6, 9];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
    pub is_future: bool,
}

/// Month name to print above the week column where that month first appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthLabel {
    pub week: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HeatmapSummary {
    pub total_posts_last_year: u64,
    /// `None` when there were no posts in the window.
    pub busiest_day: Option<NaiveDate>,
    pub busiest_day_count: u32,
    /// Every record, in or out of the window, falls in the reference date's year.
    pub is_current_year: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Heatmap {
    pub reference_date: NaiveDate,
    pub start_date: NaiveDate,
    /// Row-major: `weeks[w][d]`, `d = 0` is Sunday.
    pub weeks: Vec<Vec<HeatmapCell>>,
    pub month_labels: Vec<MonthLabel>,
    pub summary: HeatmapSummary,
}

impl Heatmap {
    /// Cell for `date`, if it is on the grid.
    pub fn cell(&self, date: NaiveDate) -> Option<&HeatmapCell> {
        self.weeks.iter().flatten().find(|cell| cell.date == date)
    }
}

/// Map a day's post count to its 0–4 activity level.
pub fn activity_level(count: u32) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .filter(|&&threshold| count >= threshold)
        .count() as u8
}

/// Builds heatmaps with a fixed bucketing time zone.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapBuilder {
    time_zone: Tz,
}

impl Default for HeatmapBuilder {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl HeatmapBuilder {
    pub fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }

    /// Today's date in the builder's time zone.
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.time_zone).date_naive()
    }

    pub fn build<I>(&self, records: I, reference_date: NaiveDate) -> Heatmap
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let start_date = reference_date - Days::new(WINDOW_DAYS - 1);

        // Ordered by date so busiest-day ties resolve to the earliest day.
        let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        let mut total_posts_last_year = 0u64;
        let mut is_current_year = true;

        for timestamp in records {
            let day = self.local_date(timestamp);
            if day.year() != reference_date.year() {
                is_current_year = false;
            }
            if day >= start_date && day <= reference_date {
                *counts.entry(day).or_insert(0) += 1;
                total_posts_last_year += 1;
            }
        }

        let mut busiest: Option<(NaiveDate, u32)> = None;
        for (&day, &count) in &counts {
            if busiest.map_or(true, |(_, best)| count > best) {
                busiest = Some((day, count));
            }
        }

        let grid_start =
            start_date - Days::new(u64::from(start_date.weekday().num_days_from_sunday()));

        let weeks: Vec<Vec<HeatmapCell>> = (0..WEEKS)
            .map(|week| {
                (0..DAYS_PER_WEEK)
                    .map(|weekday| {
                        let date = grid_start + Days::new((week * DAYS_PER_WEEK + weekday) as u64);
                        let count = counts.get(&date).copied().unwrap_or(0);
                        HeatmapCell {
                            date,
                            count,
                            level: activity_level(count),
                            is_future: date > reference_date,
                        }
                    })
                    .collect()
            })
            .collect();

        let month_labels = month_labels(&weeks);

        Heatmap {
            reference_date,
            start_date,
            weeks,
            month_labels,
            summary: HeatmapSummary {
                total_posts_last_year,
                busiest_day: busiest.map(|(day, _)| day),
                busiest_day_count: busiest.map_or(0, |(_, count)| count),
                is_current_year,
            },
        }
    }
}

/// One label per week in which a new month starts, skipping future days.
fn month_labels(weeks: &[Vec<HeatmapCell>]) -> Vec<MonthLabel> {
    let mut labels = Vec::new();
    let mut last_month: Option<u32> = None;

    for (week, row) in weeks.iter().enumerate() {
        if let Some(cell) = row
            .iter()
            .filter(|cell| !cell.is_future)
            .find(|cell| Some(cell.date.month()) != last_month)
        {
            last_month = Some(cell.date.month());
            labels.push(MonthLabel {
                week,
                label: cell.date.format("%b").to_string(),
            });
        }
    }

    labels
}

/// Build a heatmap bucketing days in UTC.
pub fn build_heatmap<I>(records: I, reference_date: NaiveDate) -> Heatmap
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    HeatmapBuilder::default().build(records, reference_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn on_grid_sum(heatmap: &Heatmap) -> u64 {
        heatmap
            .weeks
            .iter()
            .flatten()
            .filter(|cell| !cell.is_future && cell.date >= heatmap.start_date)
            .map(|cell| u64::from(cell.count))
            .sum()
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(activity_level(0), 0);
        assert_eq!(activity_level(1), 1);
        assert_eq!(activity_level(2), 1);
        assert_eq!(activity_level(3), 2);
        assert_eq!(activity_level(5), 2);
        assert_eq!(activity_level(6), 3);
        assert_eq!(activity_level(8), 3);
        assert_eq!(activity_level(9), 4);
        assert_eq!(activity_level(500), 4);
    }

    #[test]
    fn test_reference_scenario() {
        let records = vec![
            at(2024, 6, 15, 9),
            at(2024, 6, 15, 12),
            at(2024, 6, 15, 18),
            at(2024, 6, 14, 8),
        ];
        let heatmap = build_heatmap(records, date(2024, 6, 15));

        let today = heatmap.cell(date(2024, 6, 15)).expect("reference on grid");
        assert_eq!(today.count, 3);
        assert_eq!(today.level, 2);
        assert!(!today.is_future);

        let yesterday = heatmap.cell(date(2024, 6, 14)).expect("on grid");
        assert_eq!(yesterday.count, 1);
        assert_eq!(yesterday.level, 1);

        assert_eq!(heatmap.summary.busiest_day, Some(date(2024, 6, 15)));
        assert_eq!(heatmap.summary.busiest_day_count, 3);
        assert_eq!(heatmap.summary.total_posts_last_year, 4);
        assert!(heatmap.summary.is_current_year);
    }

    #[test]
    fn test_empty_input() {
        let heatmap = build_heatmap(Vec::new(), date(2024, 6, 15));
        assert_eq!(heatmap.summary.busiest_day, None);
        assert_eq!(heatmap.summary.busiest_day_count, 0);
        assert_eq!(heatmap.summary.total_posts_last_year, 0);
        assert!(heatmap.summary.is_current_year);
        assert!(heatmap.weeks.iter().flatten().all(|c| c.level == 0 && c.count == 0));
    }

    #[test]
    fn test_grid_shape_is_fixed() {
        let busy: Vec<DateTime<Utc>> = (0..2000)
            .map(|i| at(2024, 1, 1, 0) + chrono::Duration::hours(i * 5))
            .collect();
        for records in [Vec::new(), busy] {
            let heatmap = build_heatmap(records, date(2024, 6, 15));
            assert_eq!(heatmap.weeks.len(), WEEKS);
            assert!(heatmap.weeks.iter().all(|row| row.len() == DAYS_PER_WEEK));
        }
    }

    #[test]
    fn test_grid_starts_on_sunday_before_window() {
        // 2023-06-17 is a Saturday; the grid backs up to Sunday 2023-06-11.
        let heatmap = build_heatmap(Vec::new(), date(2024, 6, 15));
        assert_eq!(heatmap.start_date, date(2023, 6, 17));
        assert_eq!(heatmap.weeks[0][0].date, date(2023, 6, 11));
        assert_eq!(heatmap.weeks[52][6].date, date(2024, 6, 15));

        for row in &heatmap.weeks {
            assert_eq!(row[0].date.weekday(), Weekday::Sun);
            assert_eq!(row[6].date.weekday(), Weekday::Sat);
        }
    }

    #[test]
    fn test_grid_starts_on_window_start_when_sunday() {
        let heatmap = build_heatmap(Vec::new(), date(2024, 6, 16));
        assert_eq!(heatmap.start_date, date(2023, 6, 18));
        assert_eq!(heatmap.weeks[0][0].date, date(2023, 6, 18));
        assert_eq!(heatmap.weeks[52][0].date, date(2024, 6, 16));
        assert!(heatmap.weeks[52][1..].iter().all(|c| c.is_future));
    }

    #[test]
    fn test_future_cells() {
        // Monday reference: the rest of the last week is in the future.
        let heatmap = build_heatmap(Vec::new(), date(2024, 6, 17));
        let last_row = &heatmap.weeks[52];
        assert!(!last_row[1].is_future);
        assert_eq!(last_row[1].date, date(2024, 6, 17));
        assert!(last_row[2..].iter().all(|c| c.is_future));
        assert_eq!(
            heatmap.weeks.iter().flatten().filter(|c| c.is_future).count(),
            5
        );
    }

    #[test]
    fn test_window_bounds_and_year_flag() {
        let reference = date(2024, 6, 15);
        let records = vec![
            at(2023, 6, 16, 12), // one day before the window
            at(2023, 6, 17, 12), // window start
            at(2024, 6, 15, 23), // reference day
            at(2024, 6, 16, 1),  // after the reference date
        ];
        let heatmap = build_heatmap(records, reference);
        assert_eq!(heatmap.summary.total_posts_last_year, 2);
        assert_eq!(on_grid_sum(&heatmap), 2);
        assert!(!heatmap.summary.is_current_year);
        assert_eq!(heatmap.start_date, date(2023, 6, 17));
        assert_eq!(heatmap.cell(date(2023, 6, 16)).map(|c| c.count), Some(0));
        assert_eq!(heatmap.cell(date(2023, 6, 17)).map(|c| c.count), Some(1));
    }

    #[test]
    fn test_is_current_year_only_for_reference_year() {
        let heatmap = build_heatmap(vec![at(2024, 1, 2, 8), at(2024, 6, 1, 8)], date(2024, 6, 15));
        assert!(heatmap.summary.is_current_year);

        let heatmap = build_heatmap(vec![at(2023, 12, 31, 8), at(2024, 6, 1, 8)], date(2024, 6, 15));
        assert!(!heatmap.summary.is_current_year);
    }

    #[test]
    fn test_busiest_day_ties_pick_earliest() {
        let records = vec![
            at(2024, 5, 20, 8),
            at(2024, 5, 20, 9),
            at(2024, 3, 2, 8),
            at(2024, 3, 2, 9),
            at(2024, 4, 1, 8),
        ];
        let heatmap = build_heatmap(records.clone(), date(2024, 6, 15));
        assert_eq!(heatmap.summary.busiest_day, Some(date(2024, 3, 2)));
        assert_eq!(heatmap.summary.busiest_day_count, 2);

        let mut reversed = records;
        reversed.reverse();
        assert_eq!(build_heatmap(reversed, date(2024, 6, 15)).summary, heatmap.summary);
    }

    #[test]
    fn test_sum_matches_total_for_every_weekday() {
        let background: Vec<DateTime<Utc>> = (0..400)
            .map(|i| at(2023, 5, 1, 6) + chrono::Duration::hours(i * 23))
            .collect();
        for offset in 0..7u64 {
            let reference = date(2024, 6, 10) + Days::new(offset);
            let mut records = background.clone();
            records.extend((0..5u32).map(|h| {
                Utc.from_utc_datetime(&reference.and_hms_opt(10 + h, 0, 0).unwrap())
            }));

            let heatmap = build_heatmap(records, reference);
            assert_eq!(heatmap.start_date.weekday(), reference.weekday());
            assert_eq!(
                on_grid_sum(&heatmap),
                heatmap.summary.total_posts_last_year,
                "reference {} ({:?})",
                reference,
                reference.weekday()
            );
            let today = heatmap.cell(reference).expect("reference on grid");
            assert!(today.count >= 5);
            assert!(!today.is_future);
        }
    }

    #[test]
    fn test_sunday_reference_keeps_busiest_day_on_grid() {
        let reference = date(2024, 6, 16);
        assert_eq!(reference.weekday(), Weekday::Sun);
        let records: Vec<DateTime<Utc>> = (0..5).map(|_| at(2024, 6, 16, 10)).collect();

        let heatmap = build_heatmap(records, reference);
        assert_eq!(heatmap.summary.total_posts_last_year, 5);
        assert_eq!(heatmap.summary.busiest_day, Some(reference));
        assert_eq!(heatmap.cell(reference).map(|c| c.count), Some(5));
        assert_eq!(on_grid_sum(&heatmap), 5);
    }

    #[test]
    fn test_time_zone_bucketing() {
        let new_york: Tz = "America/New_York".parse().unwrap();
        // 02:00 UTC on the 15th is still the evening of the 14th in New York.
        let record = at(2024, 6, 15, 2);

        let utc = build_heatmap(vec![record], date(2024, 6, 15));
        assert_eq!(utc.cell(date(2024, 6, 15)).unwrap().count, 1);

        let local = HeatmapBuilder::new(new_york).build(vec![record], date(2024, 6, 15));
        assert_eq!(local.cell(date(2024, 6, 14)).unwrap().count, 1);
        assert_eq!(local.cell(date(2024, 6, 15)).unwrap().count, 0);
    }

    #[test]
    fn test_month_labels() {
        let heatmap = build_heatmap(Vec::new(), date(2024, 6, 15));
        let labels: Vec<(usize, &str)> = heatmap
            .month_labels
            .iter()
            .map(|l| (l.week, l.label.as_str()))
            .collect();

        assert_eq!(labels.len(), 13);
        assert_eq!(labels[0], (0, "Jun"));
        // Week 2 runs Jun 25 - Jul 1.
        assert_eq!(labels[1], (2, "Jul"));
        assert_eq!(labels[12].1, "Jun");
        assert!(labels.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 != w[1].1));
    }

    #[test]
    fn test_month_labels_skip_future_days() {
        // Reference Tuesday 2024-04-30; the last row holds May 1-4 in the future.
        let heatmap = build_heatmap(Vec::new(), date(2024, 4, 30));
        assert_eq!(heatmap.month_labels.last().unwrap().label, "Apr");
    }

    #[test]
    fn test_output_is_deterministic() {
        let records: Vec<DateTime<Utc>> = (0..50)
            .map(|i| at(2024, 2, 1, 0) + chrono::Duration::hours(i * 37))
            .collect();
        let a = build_heatmap(records.clone(), date(2024, 6, 15));
        let b = build_heatmap(records, date(2024, 6, 15));
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

use crate::models::report::{DailySeries, PeriodTotal, WorkReport, WorkStats};
use crate::models::work_log::WorkLog;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Roll a chronologically ordered sequence of `(date, hours)` into daily
/// points, calendar-month and ISO-week totals, and summary statistics.
///
/// Daily points are not merged: two entries on one date are two points.
pub fn aggregate<I>(records: I) -> WorkReport
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut daily = DailySeries::default();
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut weeks: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for (date, hours) in records {
        daily.labels.push(date.format("%d.%m").to_string());
        daily.hours.push(hours);

        *months.entry((date.year(), date.month())).or_default() += hours;

        let week = date.iso_week();
        *weeks.entry((week.year(), week.week())).or_default() += hours;
    }

    let stats = summarize(daily.hours.iter().copied());

    let monthly = months
        .into_iter()
        .map(|((year, month), total_hours)| PeriodTotal {
            key: format!("{}-{:02}", year, month),
            label: format!("{:02}/{}", month, year),
            total_hours,
        })
        .collect();

    let weekly = weeks
        .into_iter()
        .map(|((year, week), total_hours)| {
            let key = format!("{}-W{:02}", year, week);
            PeriodTotal {
                label: key.clone(),
                key,
                total_hours,
            }
        })
        .collect();

    WorkReport { daily, monthly, weekly, stats }
}

/// Totals without the breakdowns. `days_count` counts entries.
pub fn summarize<I>(hours: I) -> WorkStats
where
    I: IntoIterator<Item = f64>,
{
    let (total_hours, days_count) = hours.into_iter().fold((0.0, 0usize), |(total, count), h| (total + h, count + 1));
    let avg_hours = if days_count > 0 { total_hours / days_count as f64 } else { 0.0 };

    WorkStats {
        total_hours,
        days_count,
        avg_hours,
    }
}

pub fn report_for(entries: &[WorkLog]) -> WorkReport {
    aggregate(entries.iter().map(|e| (e.date, e.hours)))
}

pub fn stats_for(entries: &[WorkLog]) -> WorkStats {
    summarize(entries.iter().map(|e| e.hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn two_entries_in_separate_weeks_of_one_month() {
        let report = aggregate([(date("2024-01-01"), 2.0), (date("2024-01-08"), 3.0)]);

        assert_eq!(report.stats.total_hours, 5.0);
        assert_eq!(report.stats.days_count, 2);
        assert_eq!(report.stats.avg_hours, 2.5);

        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.monthly[0].key, "2024-01");
        assert_eq!(report.monthly[0].label, "01/2024");
        assert_eq!(report.monthly[0].total_hours, 5.0);

        let weekly: Vec<_> = report.weekly.iter().map(|w| (w.key.as_str(), w.total_hours)).collect();
        assert_eq!(weekly, vec![("2024-W01", 2.0), ("2024-W02", 3.0)]);
    }

    #[test]
    fn empty_input_has_zero_average() {
        let report = aggregate(std::iter::empty::<(NaiveDate, f64)>());
        assert_eq!(report.stats, WorkStats::default());
        assert!(report.daily.labels.is_empty());
        assert!(report.monthly.is_empty());
        assert!(report.weekly.is_empty());
    }

    #[test]
    fn same_day_entries_stay_separate_points() {
        let report = aggregate([(date("2024-02-05"), 1.0), (date("2024-02-05"), 4.0)]);
        assert_eq!(report.daily.labels, vec!["05.02", "05.02"]);
        assert_eq!(report.daily.hours, vec![1.0, 4.0]);
        assert_eq!(report.stats.days_count, 2);
        assert_eq!(report.weekly.len(), 1);
        assert_eq!(report.weekly[0].total_hours, 5.0);
    }

    #[test]
    fn iso_week_belongs_to_week_year_not_calendar_year() {
        // 2024-12-30 is Monday of ISO week 1 of 2025; 2021-01-03 is Sunday of week 53 of 2020.
        let report = aggregate([(date("2021-01-03"), 1.0), (date("2024-12-30"), 2.0)]);
        let keys: Vec<_> = report.weekly.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(keys, vec!["2020-W53", "2025-W01"]);

        let months: Vec<_> = report.monthly.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(months, vec!["2021-01", "2024-12"]);
    }

    #[test]
    fn monthly_output_is_chronological_across_years() {
        let report = aggregate([
            (date("2023-11-15"), 1.0),
            (date("2023-12-01"), 1.0),
            (date("2024-01-02"), 1.0),
            (date("2024-10-09"), 1.0),
        ]);
        let keys: Vec<_> = report.monthly.iter().map(|m| m.key.clone()).collect();
        assert_eq!(keys, vec!["2023-11", "2023-12", "2024-01", "2024-10"]);
    }

    fn arb_record() -> impl Strategy<Value = (NaiveDate, f64)> {
        (0i64..3650, 0u32..=96).prop_map(|(offset, quarters)| (date("2020-01-01") + chrono::Duration::days(offset), quarters as f64 / 4.0))
    }

    proptest! {
        #[test]
        fn rollups_preserve_the_total(mut records in prop::collection::vec(arb_record(), 0..60)) {
            records.sort_by_key(|(d, _)| *d);
            let report = aggregate(records.clone());

            let expected: f64 = records.iter().map(|(_, h)| h).sum();
            let monthly: f64 = report.monthly.iter().map(|m| m.total_hours).sum();
            let weekly: f64 = report.weekly.iter().map(|w| w.total_hours).sum();

            prop_assert!((report.stats.total_hours - expected).abs() < 1e-9);
            prop_assert!((monthly - expected).abs() < 1e-9);
            prop_assert!((weekly - expected).abs() < 1e-9);
            prop_assert_eq!(report.daily.labels.len(), records.len());
            prop_assert_eq!(report.daily.hours.len(), records.len());
            prop_assert_eq!(report.stats.days_count, records.len());
        }

        #[test]
        fn period_keys_are_strictly_increasing(records in prop::collection::vec(arb_record(), 0..60)) {
            let report = aggregate(records);
            prop_assert!(report.monthly.windows(2).all(|w| w[0].key < w[1].key));
            prop_assert!(report.weekly.windows(2).all(|w| w[0].key < w[1].key));
        }
    }
}

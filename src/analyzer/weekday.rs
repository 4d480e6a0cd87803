use crate::analyzer::scoring::round2;
use crate::models::DailyReport;
use chrono::Datelike;
use serde::Serialize;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Buckets with fewer samples are charted but never named best/worst.
pub const MIN_SAMPLES_FOR_RANKING: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    /// 0 = Sunday.
    pub day: u32,
    pub name: &'static str,
    pub samples: usize,
    pub average: f64,
}

pub fn aggregate_by_weekday(reports: &[DailyReport]) -> Vec<WeekdayBucket> {
    let sums = reports.iter().fold([(0.0_f64, 0_usize); 7], |mut acc, report| {
        let slot = &mut acc[report.date.weekday().num_days_from_sunday() as usize];
        slot.0 += report.productivity_percent;
        slot.1 += 1;
        acc
    });

    sums.iter()
        .enumerate()
        .map(|(day, (total, samples))| WeekdayBucket {
            day: day as u32,
            name: WEEKDAY_NAMES[day],
            samples: *samples,
            average: if *samples == 0 {
                0.0
            } else {
                round2(total / *samples as f64)
            },
        })
        .collect()
}

fn ranked(buckets: &[WeekdayBucket]) -> impl Iterator<Item = &WeekdayBucket> {
    buckets
        .iter()
        .filter(|bucket| bucket.samples >= MIN_SAMPLES_FOR_RANKING)
}

/// Earliest weekday wins ties.
pub fn best_day(buckets: &[WeekdayBucket]) -> Option<&WeekdayBucket> {
    ranked(buckets).fold(None, |best: Option<&WeekdayBucket>, bucket| match best {
        Some(current) if current.average >= bucket.average => Some(current),
        _ => Some(bucket),
    })
}

pub fn worst_day(buckets: &[WeekdayBucket]) -> Option<&WeekdayBucket> {
    ranked(buckets).fold(None, |worst: Option<&WeekdayBucket>, bucket| match worst {
        Some(current) if current.average <= bucket.average => Some(current),
        _ => Some(bucket),
    })
}

#[cfg(test)]
mod tests {
    use super::{aggregate_by_weekday, best_day, worst_day};
    use crate::analyzer::streak::fixtures::report_on;
    use chrono::NaiveDate;

    fn on(date: &str, productivity: f64) -> crate::models::DailyReport {
        report_on(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
            productivity,
        )
    }

    #[test]
    fn buckets_by_day_of_week_starting_sunday() {
        // 2026-03-15 is a Sunday, 2026-03-16 a Monday.
        let reports = vec![
            on("2026-03-15", 80.0),
            on("2026-03-08", 60.0),
            on("2026-03-16", 30.0),
        ];
        let buckets = aggregate_by_weekday(&reports);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].name, "Sunday");
        assert_eq!(buckets[0].samples, 2);
        assert_eq!(buckets[0].average, 70.0);
        assert_eq!(buckets[1].samples, 1);
        assert_eq!(buckets[6].samples, 0);
        assert_eq!(buckets[6].average, 0.0);
    }

    #[test]
    fn single_sample_days_are_not_ranked() {
        let reports = vec![
            on("2026-03-15", 80.0),
            on("2026-03-08", 60.0),
            on("2026-03-16", 100.0),
            on("2026-03-17", 20.0),
            on("2026-03-10", 40.0),
        ];
        let buckets = aggregate_by_weekday(&reports);

        assert_eq!(best_day(&buckets).map(|bucket| bucket.name), Some("Sunday"));
        assert_eq!(worst_day(&buckets).map(|bucket| bucket.name), Some("Tuesday"));
    }

    #[test]
    fn no_ranking_without_enough_samples() {
        let buckets = aggregate_by_weekday(&[on("2026-03-15", 80.0)]);
        assert!(best_day(&buckets).is_none());
        assert!(worst_day(&buckets).is_none());
    }
}

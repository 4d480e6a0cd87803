use crate::models::DailyReport;
use chrono::{Duration, NaiveDate};

/// Minimum productivity for a day to count towards a streak.
pub const STREAK_THRESHOLD: f64 = 60.0;

pub fn qualifies(report: &DailyReport) -> bool {
    report.productivity_percent >= STREAK_THRESHOLD
}

/// Consecutive qualifying days ending today.
///
/// After sorting newest first, the report at index `i` must be dated exactly
/// `today - i` days. Any gap, duplicate or sub-threshold day ends the walk.
pub fn current_streak(reports: &[DailyReport], today: NaiveDate) -> u32 {
    let mut sorted = reports.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| right.date.cmp(&left.date));

    sorted
        .iter()
        .enumerate()
        .take_while(|(index, report)| {
            report.date == today - Duration::days(*index as i64) && qualifies(report)
        })
        .count() as u32
}

/// Longest run of qualifying reports on consecutive calendar days.
pub fn best_streak(reports: &[DailyReport]) -> u32 {
    let mut sorted = reports.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.date.cmp(&right.date));

    let mut best = 0_u32;
    let mut running = 0_u32;
    let mut previous: Option<NaiveDate> = None;

    for report in sorted {
        let follows = previous.is_some_and(|date| report.date == date + Duration::days(1));

        running = match (qualifies(report), follows) {
            (true, true) => running + 1,
            (true, false) => 1,
            (false, _) => 0,
        };
        best = best.max(running);
        previous = Some(report.date);
    }

    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub best: u32,
}

pub fn summarize(reports: &[DailyReport], today: NaiveDate) -> StreakSummary {
    StreakSummary {
        current: current_streak(reports, today),
        best: best_streak(reports),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{history, today};
    use super::{best_streak, current_streak};

    #[test]
    fn seven_consecutive_days_make_a_week() {
        let reports = history(&(0..7).map(|day| (day, 75.0)).collect::<Vec<_>>());
        assert_eq!(current_streak(&reports, today()), 7);
    }

    #[test]
    fn gap_caps_current_streak() {
        let reports = history(&[(0, 80.0), (1, 80.0), (2, 80.0), (4, 80.0), (5, 80.0)]);
        assert_eq!(current_streak(&reports, today()), 3);
    }

    #[test]
    fn streak_requires_today() {
        let reports = history(&[(1, 90.0), (2, 90.0)]);
        assert_eq!(current_streak(&reports, today()), 0);
    }

    #[test]
    fn sub_threshold_day_breaks_current_streak() {
        let reports = history(&[(0, 90.0), (1, 59.99), (2, 90.0)]);
        assert_eq!(current_streak(&reports, today()), 1);
    }

    #[test]
    fn input_order_does_not_matter() {
        let reports = history(&[(2, 60.0), (0, 60.0), (1, 60.0)]);
        assert_eq!(current_streak(&reports, today()), 3);
    }

    #[test]
    fn best_streak_tracks_longest_run() {
        let reports = history(&[
            (0, 70.0),
            (1, 70.0),
            (3, 90.0),
            (4, 90.0),
            (5, 90.0),
            (6, 90.0),
            (7, 20.0),
            (8, 90.0),
        ]);
        assert_eq!(best_streak(&reports), 4);
    }

    #[test]
    fn best_streak_restarts_after_low_day() {
        let reports = history(&[(0, 80.0), (1, 10.0), (2, 80.0), (3, 80.0)]);
        assert_eq!(best_streak(&reports), 2);
        assert_eq!(best_streak(&[]), 0);
    }
}

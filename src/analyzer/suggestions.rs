use crate::analyzer::streak::current_streak;
use crate::analyzer::weekday::{aggregate_by_weekday, best_day, worst_day};
use crate::models::DailyReport;
use chrono::NaiveDate;
use serde::Serialize;

pub const MAX_SUGGESTIONS: usize = 4;
const RECENT_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Tip,
    Warning,
    Celebration,
    Insight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub message: String,
}

impl Suggestion {
    fn new(kind: SuggestionKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

/// Runs every rule in order and keeps the first `MAX_SUGGESTIONS`.
///
/// Rule order is the only priority: later rules are dropped, not ranked.
pub fn generate_suggestions(reports: &[DailyReport], today: NaiveDate) -> Vec<Suggestion> {
    let mut newest_first = reports.iter().collect::<Vec<_>>();
    newest_first.sort_by(|left, right| right.date.cmp(&left.date));

    let recent = newest_first
        .iter()
        .take(RECENT_WINDOW)
        .map(|report| report.productivity_percent)
        .collect::<Vec<_>>();
    let recent_average =
        (!recent.is_empty()).then(|| recent.iter().sum::<f64>() / recent.len() as f64);
    let latest = newest_first.first().copied();
    let streak = current_streak(reports, today);
    let buckets = aggregate_by_weekday(reports);
    let best = best_day(&buckets);
    let worst = worst_day(&buckets);

    let logged_today = reports.iter().any(|report| report.date == today);

    let rules = [
        (!logged_today).then(|| {
            Suggestion::new(
                SuggestionKind::Tip,
                "Log today",
                "You haven't saved a report for today yet. Add your tasks and track progress."
                    .to_string(),
            )
        }),
        if streak >= 3 {
            Some(Suggestion::new(
                SuggestionKind::Celebration,
                "Keep the streak alive",
                format!("You're on a {streak}-day streak. One more productive day keeps it going."),
            ))
        } else if streak == 0 && !reports.is_empty() {
            Some(Suggestion::new(
                SuggestionKind::Tip,
                "Start a new streak",
                "Reach 60% today to begin a fresh streak.".to_string(),
            ))
        } else {
            None
        },
        best.map(|bucket| {
            Suggestion::new(
                SuggestionKind::Insight,
                "Your strongest day",
                format!(
                    "{} averages {:.0}%. Schedule demanding work then.",
                    bucket.name, bucket.average
                ),
            )
        }),
        worst
            .filter(|bucket| best.is_none_or(|top| top.day != bucket.day))
            .map(|bucket| {
                Suggestion::new(
                    SuggestionKind::Insight,
                    "Lighten your weakest day",
                    format!(
                        "{} averages {:.0}%. Plan a lighter load or fewer tasks.",
                        bucket.name, bucket.average
                    ),
                )
            }),
        recent_average.filter(|average| *average < 60.0).map(|average| {
            Suggestion::new(
                SuggestionKind::Warning,
                "Productivity dip",
                format!(
                    "Your recent average is {average:.0}%. Try fewer, smaller tasks to rebuild momentum."
                ),
            )
        }),
        recent_average.filter(|average| *average >= 85.0).map(|average| {
            Suggestion::new(
                SuggestionKind::Celebration,
                "Raise the bar",
                format!("Your recent average is {average:.0}%. Consider a more ambitious goal."),
            )
        }),
        latest
            .and_then(|report| report.tasks.iter().find(|task| task.weight > 50.0))
            .map(|task| {
                Suggestion::new(
                    SuggestionKind::Tip,
                    "Split big tasks",
                    format!(
                        "\"{}\" carried {:.0}% of the day. Breaking it up makes progress visible.",
                        task.title, task.weight
                    ),
                )
            }),
        latest
            .filter(|report| report.tasks.len() < 3)
            .map(|report| {
                Suggestion::new(
                    SuggestionKind::Tip,
                    "Add granularity",
                    format!(
                        "Your last report had only {} task(s). Smaller steps give a clearer score.",
                        report.tasks.len()
                    ),
                )
            }),
    ];

    rules.into_iter().flatten().take(MAX_SUGGESTIONS).collect()
}

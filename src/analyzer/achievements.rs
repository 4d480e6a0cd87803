use crate::analyzer::streak::current_streak;
use crate::models::{DailyReport, FocusSession};
use chrono::NaiveDate;
use serde::Serialize;

/// Everything an achievement rule may look at.
pub struct History<'a> {
    pub reports: &'a [DailyReport],
    pub focus_sessions: &'a [FocusSession],
    pub today: NaiveDate,
}

pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: fn(&History) -> bool,
    pub progress: fn(&History) -> f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
    pub progress: f64,
}

pub const DEFINITIONS: [AchievementDefinition; 8] = [
    AchievementDefinition {
        id: "first_day",
        title: "First Step",
        description: "Save your first daily report",
        icon: "🌱",
        requirement: |history| !history.reports.is_empty(),
        progress: |history| ratio(history.reports.len(), 1),
    },
    AchievementDefinition {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Reach a 7-day streak of 60%+ days",
        icon: "🔥",
        requirement: |history| current_streak(history.reports, history.today) >= 7,
        progress: |history| ratio(current_streak(history.reports, history.today) as usize, 7),
    },
    AchievementDefinition {
        id: "consistent",
        title: "Consistent",
        description: "Save 30 daily reports",
        icon: "📅",
        requirement: |history| history.reports.len() >= 30,
        progress: |history| ratio(history.reports.len(), 30),
    },
    AchievementDefinition {
        id: "perfect_day",
        title: "Perfect Day",
        description: "Finish every task of a day",
        icon: "💯",
        requirement: |history| {
            history
                .reports
                .iter()
                .any(|report| report.productivity_percent >= 100.0)
        },
        progress: |history| {
            history
                .reports
                .iter()
                .map(|report| report.productivity_percent)
                .fold(0.0, f64::max)
                .clamp(0.0, 100.0)
        },
    },
    AchievementDefinition {
        id: "high_achiever",
        title: "High Achiever",
        description: "Score 80% or more on 10 days",
        icon: "🏆",
        requirement: |history| high_days(history) >= 10,
        progress: |history| ratio(high_days(history), 10),
    },
    AchievementDefinition {
        id: "task_master",
        title: "Task Master",
        description: "Track 100 tasks across all reports",
        icon: "📋",
        requirement: |history| total_tasks(history) >= 100,
        progress: |history| ratio(total_tasks(history), 100),
    },
    AchievementDefinition {
        id: "unstoppable",
        title: "Unstoppable",
        description: "Keep a 30-day streak going",
        icon: "⚡",
        requirement: |history| current_streak(history.reports, history.today) >= 30,
        progress: |history| ratio(current_streak(history.reports, history.today) as usize, 30),
    },
    AchievementDefinition {
        id: "focus_master",
        title: "Focus Master",
        description: "Complete 10 focus sessions",
        icon: "🎯",
        requirement: |history| completed_focus_sessions(history) >= 10,
        progress: |history| ratio(completed_focus_sessions(history), 10),
    },
];

/// Recomputed from raw history every time; unlock state is never stored.
pub fn evaluate(history: &History) -> Vec<AchievementStatus> {
    DEFINITIONS
        .iter()
        .map(|definition| {
            let unlocked = (definition.requirement)(history);
            AchievementStatus {
                id: definition.id,
                title: definition.title,
                description: definition.description,
                icon: definition.icon,
                unlocked,
                progress: if unlocked {
                    100.0
                } else {
                    (definition.progress)(history)
                },
            }
        })
        .collect()
}

fn high_days(history: &History) -> usize {
    history
        .reports
        .iter()
        .filter(|report| report.productivity_percent >= 80.0)
        .count()
}

fn total_tasks(history: &History) -> usize {
    history.reports.iter().map(|report| report.tasks.len()).sum()
}

fn completed_focus_sessions(history: &History) -> usize {
    history
        .focus_sessions
        .iter()
        .filter(|session| session.completed)
        .count()
}

fn ratio(value: usize, target: usize) -> f64 {
    ((value as f64 / target as f64) * 100.0).min(100.0).round()
}

#[cfg(test)]
mod tests {
    use super::{AchievementStatus, History, evaluate};
    use crate::analyzer::streak::fixtures::{history, today};
    use crate::models::{DailyReport, FocusSession};
    use chrono::Utc;

    fn status<'a>(statuses: &'a [AchievementStatus], id: &str) -> &'a AchievementStatus {
        statuses
            .iter()
            .find(|status| status.id == id)
            .expect("achievement present")
    }

    fn run(reports: &[DailyReport], focus_sessions: &[FocusSession]) -> Vec<AchievementStatus> {
        evaluate(&History {
            reports,
            focus_sessions,
            today: today(),
        })
    }

    #[test]
    fn nothing_unlocks_on_empty_history() {
        let statuses = run(&[], &[]);

        assert_eq!(statuses.len(), 8);
        assert!(statuses.iter().all(|status| !status.unlocked));
        assert!(statuses.iter().all(|status| status.progress == 0.0));
    }

    #[test]
    fn first_day_unlocks_with_one_report() {
        let statuses = run(&history(&[(3, 20.0)]), &[]);

        assert!(status(&statuses, "first_day").unlocked);
        assert!(!status(&statuses, "consistent").unlocked);
        assert_eq!(status(&statuses, "consistent").progress, 3.0);
    }

    #[test]
    fn consistent_needs_thirty_reports() {
        let entries = (0..29).map(|day| (day * 2, 30.0)).collect::<Vec<_>>();
        assert!(!status(&run(&history(&entries), &[]), "consistent").unlocked);

        let entries = (0..30).map(|day| (day * 2, 30.0)).collect::<Vec<_>>();
        assert!(status(&run(&history(&entries), &[]), "consistent").unlocked);
    }

    #[test]
    fn week_warrior_follows_current_streak() {
        let six = (0..6).map(|day| (day, 70.0)).collect::<Vec<_>>();
        let statuses = run(&history(&six), &[]);
        assert!(!status(&statuses, "week_warrior").unlocked);
        assert_eq!(status(&statuses, "week_warrior").progress, 86.0);

        let seven = (0..7).map(|day| (day, 70.0)).collect::<Vec<_>>();
        assert!(status(&run(&history(&seven), &[]), "week_warrior").unlocked);
    }

    #[test]
    fn unstoppable_needs_a_live_thirty_day_streak() {
        let live = (0..30).map(|day| (day, 90.0)).collect::<Vec<_>>();
        let statuses = run(&history(&live), &[]);
        assert!(status(&statuses, "unstoppable").unlocked);

        let lapsed = (40..70).map(|day| (day, 90.0)).collect::<Vec<_>>();
        let statuses = run(&history(&lapsed), &[]);
        assert!(!status(&statuses, "unstoppable").unlocked);
        assert_eq!(status(&statuses, "unstoppable").progress, 0.0);
    }

    #[test]
    fn perfect_day_progress_is_best_score() {
        let statuses = run(&history(&[(0, 45.5), (1, 92.0)]), &[]);
        assert!(!status(&statuses, "perfect_day").unlocked);
        assert_eq!(status(&statuses, "perfect_day").progress, 92.0);

        let statuses = run(&history(&[(0, 100.0)]), &[]);
        assert!(status(&statuses, "perfect_day").unlocked);
    }

    #[test]
    fn focus_master_counts_completed_sessions_only() {
        let sessions = (0..12)
            .map(|index| FocusSession {
                id: format!("f{index}"),
                date: today(),
                started_at: Utc::now(),
                duration_minutes: 25,
                task_id: None,
                completed: index % 4 != 0,
            })
            .collect::<Vec<_>>();
        let statuses = run(&[], &sessions);

        assert!(!status(&statuses, "focus_master").unlocked);
        assert_eq!(status(&statuses, "focus_master").progress, 90.0);
    }
}

pub mod achievements;
pub mod categorizer;
pub mod heatmap;
pub mod report;
pub mod scoring;
pub mod streak;
pub mod suggestions;
pub mod weekday;

use crate::analyzer::achievements::{AchievementStatus, History};
use crate::analyzer::heatmap::HeatmapCell;
use crate::analyzer::streak::StreakSummary;
use crate::analyzer::suggestions::Suggestion;
use crate::analyzer::weekday::WeekdayBucket;
use crate::db::Database;
use crate::models::{DailyReport, REPORT_VERSION, Task, Template};
use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Unsaved tasks for a date with their live score.
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    pub total_weight: f64,
    pub productivity: f64,
}

impl DraftView {
    pub fn new(date: NaiveDate, tasks: Vec<Task>) -> Self {
        Self {
            date,
            total_weight: scoring::total_weight(&tasks),
            productivity: scoring::calculate_productivity(&tasks),
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub report_count: usize,
    pub average_productivity: f64,
    pub streak: StreakSummary,
    pub heatmap: Vec<HeatmapCell>,
    pub weekdays: Vec<WeekdayBucket>,
    pub achievements: Vec<AchievementStatus>,
    pub suggestions: Vec<Suggestion>,
}

pub fn load_draft(database: &Database, date: NaiveDate) -> Result<DraftView> {
    Ok(DraftView::new(date, database.draft_tasks(date)?))
}

pub fn add_draft_task(database: &Database, date: NaiveDate, mut task: Task) -> Result<DraftView> {
    let preferences = database.preferences()?;
    let mut tasks = database.draft_tasks(date)?;

    if tasks.len() >= preferences.max_tasks {
        bail!(
            "Draft for {date} already has {} tasks (max_tasks = {})",
            tasks.len(),
            preferences.max_tasks
        );
    }

    ensure_finite("weight", task.weight)?;
    ensure_finite("completion", task.completion_percent)?;

    task.category = task
        .category
        .as_deref()
        .map(|raw| categorizer::normalize_category(raw).to_string());
    tasks.push(task);
    database.put_draft_tasks(date, &tasks)?;

    let view = DraftView::new(date, tasks);
    info!(%date, tasks = view.tasks.len(), productivity = view.productivity, "draft task added");
    Ok(view)
}

pub fn update_draft_completion(
    database: &Database,
    date: NaiveDate,
    reference: &str,
    completion_percent: f64,
) -> Result<DraftView> {
    ensure_finite("completion", completion_percent)?;

    let mut tasks = database.draft_tasks(date)?;
    let index = resolve_task(&tasks, reference)?;
    tasks[index].completion_percent = completion_percent.clamp(0.0, 100.0);
    database.put_draft_tasks(date, &tasks)?;

    Ok(DraftView::new(date, tasks))
}

pub fn remove_draft_task(database: &Database, date: NaiveDate, reference: &str) -> Result<Task> {
    let mut tasks = database.draft_tasks(date)?;
    let index = resolve_task(&tasks, reference)?;
    let removed = tasks.remove(index);
    database.put_draft_tasks(date, &tasks)?;

    Ok(removed)
}

pub fn normalize_draft(database: &Database, date: NaiveDate) -> Result<DraftView> {
    let tasks = scoring::normalize_weights(&database.draft_tasks(date)?);
    database.put_draft_tasks(date, &tasks)?;

    Ok(DraftView::new(date, tasks))
}

pub fn apply_template(
    database: &Database,
    date: NaiveDate,
    template: &Template,
) -> Result<DraftView> {
    let preferences = database.preferences()?;
    let mut tasks = database.draft_tasks(date)?;
    for task in &template.tasks {
        ensure_finite("weight", task.weight)?;
    }
    tasks.extend(template.instantiate());

    if tasks.len() > preferences.max_tasks {
        bail!(
            "Applying template '{}' would exceed max_tasks ({} > {})",
            template.name,
            tasks.len(),
            preferences.max_tasks
        );
    }

    database.put_draft_tasks(date, &tasks)?;
    info!(%date, template = %template.name, "template applied to draft");

    Ok(DraftView::new(date, tasks))
}

/// NaN and infinities cannot be stored as JSON numbers.
fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        bail!("Task {field} must be a number between 0 and 100, got {value}");
    }

    Ok(())
}

/// Snapshots the draft into an immutable report and clears the draft.
pub fn save_daily_report(
    database: &Database,
    date: NaiveDate,
    notes: Option<String>,
) -> Result<DailyReport> {
    if database.report_by_date(date)?.is_some() {
        bail!("A report for {date} is already saved");
    }

    let tasks = database.draft_tasks(date)?;
    if tasks.is_empty() {
        bail!("No draft tasks for {date}. Add tasks with `glow task add` first.");
    }

    let report = DailyReport {
        id: Uuid::new_v4().to_string(),
        date,
        productivity_percent: scoring::calculate_productivity(&tasks),
        tasks,
        notes: notes.filter(|value| !value.trim().is_empty()),
        created_at: Utc::now(),
        version: REPORT_VERSION,
    };

    database.put_report(&report)?;
    database.delete_draft_tasks(date)?;
    info!(%date, productivity = report.productivity_percent, "daily report saved");

    Ok(report)
}

pub fn build_dashboard(database: &Database, today: NaiveDate) -> Result<Dashboard> {
    let reports = database.all_reports()?;
    let focus_sessions = database.focus_sessions()?;

    let average_productivity = if reports.is_empty() {
        0.0
    } else {
        scoring::round2(
            reports
                .iter()
                .map(|report| report.productivity_percent)
                .sum::<f64>()
                / reports.len() as f64,
        )
    };

    let history = History {
        reports: &reports,
        focus_sessions: &focus_sessions,
        today,
    };

    Ok(Dashboard {
        today,
        report_count: reports.len(),
        average_productivity,
        streak: streak::summarize(&reports, today),
        heatmap: heatmap::build_heatmap(&reports, today, heatmap::DEFAULT_WINDOW_DAYS),
        weekdays: weekday::aggregate_by_weekday(&reports),
        achievements: achievements::evaluate(&history),
        suggestions: suggestions::generate_suggestions(&reports, today),
    })
}

/// Accepts a 1-based position, a full id, or a unique id prefix.
fn resolve_task(tasks: &[Task], reference: &str) -> Result<usize> {
    let reference = reference.trim();

    if let Ok(position) = reference.parse::<usize>() {
        if (1..=tasks.len()).contains(&position) {
            return Ok(position - 1);
        }
    }

    let matches = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.id == reference || task.id.starts_with(reference))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => bail!("No draft task matches '{reference}'"),
        _ => bail!("Task reference '{reference}' is ambiguous"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_draft_task, apply_template, build_dashboard, normalize_draft, remove_draft_task,
        save_daily_report, update_draft_completion,
    };
    use crate::db::Database;
    use crate::models::{Task, Template, TemplateTask, UserPreferences};
    use chrono::{NaiveDate, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("date")
    }

    #[test]
    fn draft_to_report_flow() {
        let database = Database::open_in_memory().expect("db");

        add_draft_task(&database, date(), Task::new("Write", 60.0)).expect("add");
        let view = add_draft_task(&database, date(), Task::new("Review", 40.0)).expect("add");
        assert_eq!(view.total_weight, 100.0);
        assert_eq!(view.productivity, 0.0);

        update_draft_completion(&database, date(), "1", 100.0).expect("update");
        let view = update_draft_completion(&database, date(), "2", 50.0).expect("update");
        assert_eq!(view.productivity, 80.0);

        let report = save_daily_report(&database, date(), Some("solid".to_string())).expect("save");
        assert_eq!(report.productivity_percent, 80.0);
        assert!(database.draft_tasks(date()).expect("draft").is_empty());

        let stored = database
            .report_by_date(date())
            .expect("query")
            .expect("stored report");
        assert_eq!(stored.id, report.id);
    }

    #[test]
    fn non_finite_scores_are_rejected_and_draft_stays_readable() {
        let database = Database::open_in_memory().expect("db");
        add_draft_task(&database, date(), Task::new("Write", 100.0)).expect("add");

        assert!(add_draft_task(&database, date(), Task::new("Bad", f64::NAN)).is_err());
        assert!(
            add_draft_task(
                &database,
                date(),
                Task::new("Bad", 50.0).with_completion(f64::NAN)
            )
            .is_err()
        );
        assert!(update_draft_completion(&database, date(), "1", f64::NAN).is_err());
        assert!(update_draft_completion(&database, date(), "1", f64::INFINITY).is_err());

        let draft = database.draft_tasks(date()).expect("draft still decodes");
        assert_eq!(draft.len(), 1);
        assert_eq!(draft[0].completion_percent, 0.0);

        update_draft_completion(&database, date(), "1", 40.0).expect("update");
        let report = save_daily_report(&database, date(), None).expect("save");
        assert_eq!(report.productivity_percent, 40.0);
    }

    #[test]
    fn saving_twice_or_empty_is_rejected() {
        let database = Database::open_in_memory().expect("db");
        assert!(save_daily_report(&database, date(), None).is_err());

        add_draft_task(&database, date(), Task::new("Write", 100.0)).expect("add");
        save_daily_report(&database, date(), None).expect("save");

        add_draft_task(&database, date(), Task::new("Again", 100.0)).expect("add");
        assert!(save_daily_report(&database, date(), None).is_err());
    }

    #[test]
    fn max_tasks_preference_is_enforced() {
        let database = Database::open_in_memory().expect("db");
        database
            .put_preferences(&UserPreferences {
                max_tasks: 2,
                ..UserPreferences::default()
            })
            .expect("prefs");

        add_draft_task(&database, date(), Task::new("One", 50.0)).expect("add");
        add_draft_task(&database, date(), Task::new("Two", 50.0)).expect("add");
        assert!(add_draft_task(&database, date(), Task::new("Three", 10.0)).is_err());
    }

    #[test]
    fn tasks_resolve_by_id_prefix_and_remove() {
        let database = Database::open_in_memory().expect("db");
        let view = add_draft_task(&database, date(), Task::new("Write", 30.0)).expect("add");
        let prefix = view.tasks[0].id[..8].to_string();
        add_draft_task(&database, date(), Task::new("Read", 30.0)).expect("add");

        let removed = remove_draft_task(&database, date(), &prefix).expect("remove");
        assert_eq!(removed.title, "Write");
        assert!(remove_draft_task(&database, date(), "zz").is_err());

        let view = normalize_draft(&database, date()).expect("normalize");
        assert_eq!(view.tasks[0].weight, 100.0);
    }

    #[test]
    fn template_application_appends_tasks() {
        let database = Database::open_in_memory().expect("db");
        let template = Template {
            id: "tpl".to_string(),
            name: "Workday".to_string(),
            description: None,
            tasks: vec![
                TemplateTask {
                    title: "Deep work".to_string(),
                    weight: 70.0,
                    category: Some("work".to_string()),
                    estimated_duration: Some(90),
                },
                TemplateTask {
                    title: "Walk".to_string(),
                    weight: 30.0,
                    category: Some("health".to_string()),
                    estimated_duration: None,
                },
            ],
            created_at: Utc::now(),
        };

        let view = apply_template(&database, date(), &template).expect("apply");
        assert_eq!(view.tasks.len(), 2);
        assert_eq!(view.total_weight, 100.0);
    }

    #[test]
    fn dashboard_over_saved_history() {
        let database = Database::open_in_memory().expect("db");
        add_draft_task(&database, date(), Task::new("Write", 100.0).with_completion(90.0))
            .expect("add");
        save_daily_report(&database, date(), None).expect("save");

        let dashboard = build_dashboard(&database, date()).expect("dashboard");
        assert_eq!(dashboard.report_count, 1);
        assert_eq!(dashboard.average_productivity, 90.0);
        assert_eq!(dashboard.streak.current, 1);
        assert_eq!(dashboard.heatmap.len(), 28);
        assert!(
            dashboard
                .achievements
                .iter()
                .any(|status| status.id == "first_day" && status.unlocked)
        );
        assert!(dashboard.suggestions.len() <= 4);
    }
}

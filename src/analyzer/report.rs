use crate::analyzer::categorizer::{canonical_categories, display_name, normalize_category};
use crate::analyzer::scoring::round2;
use crate::models::DailyReport;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Shape of the downloadable `glow-report-<date>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedReport {
    pub date: String,
    pub productivity: String,
    pub tasks: Vec<ExportedTask>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedTask {
    pub title: String,
    pub weight: String,
    pub completion: String,
}

pub fn export_report(report: &DailyReport) -> ExportedReport {
    ExportedReport {
        date: report.date.format("%Y-%m-%d").to_string(),
        productivity: percent(report.productivity_percent),
        tasks: report
            .tasks
            .iter()
            .map(|task| ExportedTask {
                title: task.title.clone(),
                weight: percent(task.weight),
                completion: percent(task.completion_percent),
            })
            .collect(),
        notes: report.notes.clone(),
    }
}

pub fn export_file_name(report: &DailyReport) -> String {
    format!("glow-report-{}.json", report.date.format("%Y-%m-%d"))
}

pub fn save_export_file(report: &DailyReport, export_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(export_dir).with_context(|| {
        format!(
            "Failed to create export directory: {}",
            export_dir.display()
        )
    })?;

    let path = export_dir.join(export_file_name(report));
    let content = serde_json::to_string_pretty(&export_report(report))
        .context("Failed to serialize exported report")?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write exported report: {}", path.display()))?;

    Ok(path)
}

/// Category name to summed task weight, canonical categories only.
pub fn category_weights(report: &DailyReport) -> BTreeMap<String, f64> {
    let mut weights = canonical_categories()
        .into_iter()
        .map(|category| (category.to_string(), 0.0))
        .collect::<BTreeMap<_, _>>();

    report.tasks.iter().for_each(|task| {
        let category = normalize_category(task.category.as_deref().unwrap_or_default());
        *weights.entry(category.to_string()).or_insert(0.0) += task.weight;
    });

    weights
}

pub fn render_markdown(report: &DailyReport) -> String {
    let completed = report
        .tasks
        .iter()
        .filter(|task| task.completion_percent >= 100.0)
        .count();

    let task_rows = if report.tasks.is_empty() {
        "| - | - | - |".to_string()
    } else {
        report
            .tasks
            .iter()
            .map(|task| {
                format!(
                    "| {} | {} | {} |",
                    task.title,
                    percent(task.weight),
                    percent(task.completion_percent)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let category_rows = category_weights(report)
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .map(|(category, weight)| format!("- {}: {}", display_name(&category), percent(weight)))
        .collect::<Vec<_>>();
    let category_rows = if category_rows.is_empty() {
        "- No data".to_string()
    } else {
        category_rows.join("\n")
    };

    let notes = report
        .notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
        .unwrap_or("- None");

    format!(
        "# Daily Productivity Report - {}\n\n## Summary\n- Productivity: {}\n- Tasks completed: {} / {}\n\n## Tasks\n| Task | Weight | Completion |\n|------|--------|------------|\n{}\n\n## Weight by Category\n{}\n\n## Notes\n{}\n",
        report.date.format("%Y-%m-%d"),
        percent(report.productivity_percent),
        completed,
        report.tasks.len(),
        task_rows,
        category_rows,
        notes
    )
}

/// `80` renders as `80%`, `33.333` as `33.33%`.
pub fn percent(value: f64) -> String {
    format!("{}%", round2(value))
}

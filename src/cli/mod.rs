pub mod onboard;

use crate::analyzer::categorizer::normalize_category;
use crate::models::TemplateTask;
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "glow", about = "Daily Productivity Tracker & Report System")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Onboard,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Edit the unsaved task list for a day
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Snapshot a day's draft into a saved report
    Save {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Report {
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete a saved report by date or id
    Discard { report: String },
    /// Write glow-report-<date>.json to the export directory
    Export {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
    History {
        #[arg(long, default_value_t = 14)]
        limit: usize,
    },
    Stats,
    Heatmap {
        #[arg(long)]
        days: Option<u32>,
    },
    Achievements,
    Suggest,
    Focus {
        #[command(subcommand)]
        command: FocusCommands,
    },
    Status,
    Doctor,
    /// Run the dashboard API and reminder loop in the foreground
    Service,
    Dashboard,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommands {
    Show,
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    Add {
        title: String,
        #[arg(long, default_value_t = 0.0)]
        weight: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        /// Minutes
        #[arg(long)]
        estimate: Option<u32>,
        /// Completion percent to start from
        #[arg(long, default_value_t = 0.0)]
        done: f64,
        #[arg(long)]
        date: Option<String>,
    },
    /// Set completion for a task (position, id, or id prefix)
    Done {
        task: String,
        #[arg(long, default_value_t = 100.0)]
        percent: f64,
        #[arg(long)]
        date: Option<String>,
    },
    Remove {
        task: String,
        #[arg(long)]
        date: Option<String>,
    },
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Rescale draft weights so they sum to 100
    Normalize {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    /// Create a template from `title:weight[:category]` entries
    Add {
        name: String,
        #[arg(required = true)]
        tasks: Vec<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create a template from a day's draft
    FromDraft {
        name: String,
        #[arg(long)]
        date: Option<String>,
    },
    List,
    Show { template: String },
    Delete { template: String },
    Apply {
        template: String,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FocusCommands {
    Log {
        #[arg(long, default_value_t = 25)]
        minutes: u32,
        #[arg(long)]
        task: Option<String>,
        #[arg(long, default_value_t = false)]
        abandoned: bool,
        #[arg(long)]
        date: Option<String>,
    },
    List {
        #[arg(long)]
        date: Option<String>,
    },
}

/// Parses a `title:weight[:category]` template entry.
pub fn parse_template_entry(entry: &str) -> Result<TemplateTask> {
    let mut parts = entry.splitn(3, ':').map(str::trim);
    let title = parts
        .next()
        .filter(|title| !title.is_empty())
        .ok_or_else(|| anyhow!("Template entry is missing a title: {entry}"))?;
    let weight = parts
        .next()
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| anyhow!("Invalid weight in template entry: {entry}"))
        })
        .transpose()?
        .unwrap_or(0.0);
    if !weight.is_finite() {
        return Err(anyhow!("Invalid weight in template entry: {entry}"));
    }
    let category = parts
        .next()
        .filter(|category| !category.is_empty())
        .map(|category| normalize_category(category).to_string());

    Ok(TemplateTask {
        title: title.to_string(),
        weight: weight.clamp(0.0, 100.0),
        category,
        estimated_duration: None,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_template_entry;

    #[test]
    fn template_entries_parse() {
        let entry = parse_template_entry("Deep work:60:dev").expect("entry");
        assert_eq!(entry.title, "Deep work");
        assert_eq!(entry.weight, 60.0);
        assert_eq!(entry.category.as_deref(), Some("work"));

        let bare = parse_template_entry("Stretch").expect("bare entry");
        assert_eq!(bare.weight, 0.0);
        assert!(bare.category.is_none());

        assert!(parse_template_entry(":40").is_err());
        assert!(parse_template_entry("Read:lots").is_err());
        assert!(parse_template_entry("Read:NaN").is_err());
        assert!(parse_template_entry("Read:inf").is_err());
    }
}

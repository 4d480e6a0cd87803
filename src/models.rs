use crate::config::parse_hhmm;
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MAX_TASKS: usize = 10;

/// A unit of work inside a day. Weights of a day's tasks are expected to sum
/// to 100 but nothing enforces it; see `scoring::normalize_weights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Local wall-clock time in `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub completion_percent: f64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, weight: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            weight: weight.clamp(0.0, 100.0),
            category: None,
            due_time: None,
            estimated_duration: None,
            completion_percent: 0.0,
            created_at: Utc::now(),
        }
    }

    pub fn with_completion(mut self, completion_percent: f64) -> Self {
        self.completion_percent = completion_percent.clamp(0.0, 100.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: String,
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    /// Snapshot taken at save time, never recomputed on read.
    pub productivity_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub version: u32,
}

pub const REPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTask {
    pub title: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tasks: Vec<TemplateTask>,
    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn instantiate(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|skeleton| Task {
                category: skeleton.category.clone(),
                estimated_duration: skeleton.estimated_duration,
                ..Task::new(skeleton.title.clone(), skeleton.weight)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub reminder_times: Vec<String>,
    pub notifications_enabled: bool,
    pub max_tasks: usize,
    /// `local`, `UTC`, or a fixed offset such as `+09:00`.
    pub timezone: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            reminder_times: vec!["09:00".to_string(), "21:00".to_string()],
            notifications_enabled: true,
            max_tasks: DEFAULT_MAX_TASKS,
            timezone: "local".to_string(),
        }
    }
}

impl UserPreferences {
    /// Wall-clock time in the user's configured timezone.
    pub fn now(&self) -> NaiveDateTime {
        match parse_timezone(&self.timezone) {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_preference_key(key) {
            "reminder_times" => {
                let times = value
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| parse_hhmm(part).map(|_| part.to_string()))
                    .collect::<Result<Vec<_>>>()?;
                self.reminder_times = times;
            }
            "notifications_enabled" => {
                self.notifications_enabled = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("notifications_enabled must be true/false"))?;
            }
            "max_tasks" => {
                let max = value
                    .parse::<usize>()
                    .map_err(|_| anyhow!("max_tasks must be a number"))?;
                if max == 0 {
                    bail!("max_tasks must be at least 1");
                }
                self.max_tasks = max;
            }
            "timezone" => {
                let trimmed = value.trim();
                if !trimmed.eq_ignore_ascii_case("local") && parse_timezone(trimmed).is_none() {
                    bail!("timezone must be `local`, `UTC`, or an offset like +09:00");
                }
                self.timezone = trimmed.to_string();
            }
            _ => {
                bail!(
                    "Unsupported preference: {key}. Supported keys: reminder_times|reminders, notifications_enabled|notifications, max_tasks|tasks.max, timezone|tz"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_preference_key(key) {
            "reminder_times" => Some(self.reminder_times.join(",")),
            "notifications_enabled" => Some(self.notifications_enabled.to_string()),
            "max_tasks" => Some(self.max_tasks.to_string()),
            "timezone" => Some(self.timezone.clone()),
            _ => None,
        }
    }
}

fn normalize_preference_key(key: &str) -> &str {
    match key {
        "reminder_times" | "reminders" => "reminder_times",
        "notifications_enabled" | "notifications" => "notifications_enabled",
        "max_tasks" | "tasks.max" => "max_tasks",
        "timezone" | "tz" => "timezone",
        _ => key,
    }
}

/// Returns `None` for the machine's local zone.
pub fn parse_timezone(raw: &str) -> Option<FixedOffset> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours = hours.parse::<u32>().ok()?;
    let minutes = minutes.parse::<u32>().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub completed: bool,
}

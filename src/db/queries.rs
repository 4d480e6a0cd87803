pub const CREATE_DAILY_REPORTS: &str = r#"
CREATE TABLE IF NOT EXISTS daily_reports (
  id         TEXT PRIMARY KEY,
  date       TEXT NOT NULL,
  created_at TEXT NOT NULL,
  body       TEXT NOT NULL
);
"#;

pub const CREATE_TEMPLATES: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
  id   TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  body TEXT NOT NULL
);
"#;

pub const CREATE_PREFERENCES: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
  key  TEXT PRIMARY KEY,
  body TEXT NOT NULL
);
"#;

pub const CREATE_DRAFT_TASKS: &str = r#"
CREATE TABLE IF NOT EXISTS draft_tasks (
  date       TEXT PRIMARY KEY,
  updated_at TEXT NOT NULL,
  body       TEXT NOT NULL
);
"#;

pub const CREATE_FOCUS_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS focus_sessions (
  id   TEXT PRIMARY KEY,
  date TEXT NOT NULL,
  body TEXT NOT NULL
);
"#;

// Lookup index only: one report per date is a convention, not a constraint.
pub const INDEX_DAILY_REPORTS_DATE: &str =
    "CREATE INDEX IF NOT EXISTS idx_daily_reports_date ON daily_reports(date);";

pub const INDEX_FOCUS_SESSIONS_DATE: &str =
    "CREATE INDEX IF NOT EXISTS idx_focus_sessions_date ON focus_sessions(date);";

pub const PREFERENCES_KEY: &str = "user";

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_DAILY_REPORTS,
        CREATE_TEMPLATES,
        CREATE_PREFERENCES,
        CREATE_DRAFT_TASKS,
        CREATE_FOCUS_SESSIONS,
        INDEX_DAILY_REPORTS_DATE,
        INDEX_FOCUS_SESSIONS_DATE,
    ]
}

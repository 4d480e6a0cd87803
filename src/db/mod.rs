pub mod queries;

use crate::models::{DailyReport, FocusSession, Task, Template, UserPreferences};
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let database = Self { conn };
        database.init_schema()?;
        debug!(path = %path.display(), "database opened");

        Ok(database)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite DB")?;
        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    pub fn put_report(&self, report: &DailyReport) -> Result<()> {
        let body = encode(report)?;
        self.conn
            .execute(
                "INSERT INTO daily_reports (id, date, created_at, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET date=excluded.date, created_at=excluded.created_at, body=excluded.body",
                params![
                    report.id,
                    date_key(report.date),
                    report.created_at.to_rfc3339(),
                    body
                ],
            )
            .context("Failed to store daily report")?;

        Ok(())
    }

    pub fn report(&self, id: &str) -> Result<Option<DailyReport>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM daily_reports WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query daily report")?;

        body.map(|body| decode(&body)).transpose()
    }

    /// First match on the date index. Duplicates are not prevented here.
    pub fn report_by_date(&self, date: NaiveDate) -> Result<Option<DailyReport>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM daily_reports WHERE date = ?1 ORDER BY created_at ASC LIMIT 1",
                params![date_key(date)],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query daily report by date")?;

        body.map(|body| decode(&body)).transpose()
    }

    /// Newest first.
    pub fn list_reports(&self, limit: Option<usize>) -> Result<Vec<DailyReport>> {
        let limit = limit.map(|value| value as i64).unwrap_or(-1);
        let mut statement = self.conn.prepare(
            "SELECT body FROM daily_reports
             ORDER BY date DESC, created_at DESC
             LIMIT ?1",
        )?;

        let bodies = statement
            .query_map(params![limit], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list daily reports")?;

        bodies.iter().map(|body| decode(body)).collect()
    }

    pub fn all_reports(&self) -> Result<Vec<DailyReport>> {
        self.list_reports(None)
    }

    pub fn delete_report(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM daily_reports WHERE id = ?1", params![id])
            .context("Failed to delete daily report")?;

        Ok(deleted > 0)
    }

    pub fn put_template(&self, template: &Template) -> Result<()> {
        let body = encode(template)?;
        self.conn
            .execute(
                "INSERT INTO templates (id, name, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET name=excluded.name, body=excluded.body",
                params![template.id, template.name, body],
            )
            .context("Failed to store template")?;

        Ok(())
    }

    pub fn template(&self, id: &str) -> Result<Option<Template>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM templates WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query template")?;

        body.map(|body| decode(&body)).transpose()
    }

    /// Resolves either a template id or its (case-insensitive) name.
    pub fn find_template(&self, id_or_name: &str) -> Result<Option<Template>> {
        if let Some(template) = self.template(id_or_name)? {
            return Ok(Some(template));
        }

        Ok(self
            .list_templates()?
            .into_iter()
            .find(|template| template.name.eq_ignore_ascii_case(id_or_name.trim())))
    }

    pub fn list_templates(&self) -> Result<Vec<Template>> {
        let mut statement = self
            .conn
            .prepare("SELECT body FROM templates ORDER BY name ASC")?;

        let bodies = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list templates")?;

        bodies.iter().map(|body| decode(body)).collect()
    }

    pub fn delete_template(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM templates WHERE id = ?1", params![id])
            .context("Failed to delete template")?;

        Ok(deleted > 0)
    }

    /// Falls back to defaults when nothing has been stored yet.
    pub fn preferences(&self) -> Result<UserPreferences> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM preferences WHERE key = ?1",
                params![queries::PREFERENCES_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query preferences")?;

        body.map(|body| decode(&body))
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        let body = encode(preferences)?;
        self.conn
            .execute(
                "INSERT INTO preferences (key, body) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET body=excluded.body",
                params![queries::PREFERENCES_KEY, body],
            )
            .context("Failed to store preferences")?;

        Ok(())
    }

    /// A date without a draft yields an empty list.
    pub fn draft_tasks(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM draft_tasks WHERE date = ?1",
                params![date_key(date)],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query draft tasks")?;

        body.map(|body| decode(&body))
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn put_draft_tasks(&self, date: NaiveDate, tasks: &[Task]) -> Result<()> {
        let body = encode(&tasks)?;
        self.conn
            .execute(
                "INSERT INTO draft_tasks (date, updated_at, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(date) DO UPDATE SET updated_at=excluded.updated_at, body=excluded.body",
                params![date_key(date), Utc::now().to_rfc3339(), body],
            )
            .context("Failed to store draft tasks")?;

        Ok(())
    }

    pub fn delete_draft_tasks(&self, date: NaiveDate) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM draft_tasks WHERE date = ?1",
                params![date_key(date)],
            )
            .context("Failed to delete draft tasks")?;

        Ok(())
    }

    pub fn put_focus_session(&self, session: &FocusSession) -> Result<()> {
        let body = encode(session)?;
        self.conn
            .execute(
                "INSERT INTO focus_sessions (id, date, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET date=excluded.date, body=excluded.body",
                params![session.id, date_key(session.date), body],
            )
            .context("Failed to store focus session")?;

        Ok(())
    }

    pub fn focus_sessions(&self) -> Result<Vec<FocusSession>> {
        let mut statement = self
            .conn
            .prepare("SELECT body FROM focus_sessions ORDER BY date DESC")?;

        let bodies = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list focus sessions")?;

        bodies.iter().map(|body| decode(body)).collect()
    }

    pub fn focus_sessions_for_date(&self, date: NaiveDate) -> Result<Vec<FocusSession>> {
        let mut statement = self
            .conn
            .prepare("SELECT body FROM focus_sessions WHERE date = ?1")?;

        let bodies = statement
            .query_map(params![date_key(date)], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query focus sessions")?;

        bodies.iter().map(|body| decode(body)).collect()
    }
}

/// Process-wide handle for the service, opened on first use.
pub struct SharedDatabase {
    path: PathBuf,
    handle: Mutex<Option<Database>>,
}

impl SharedDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn from_database(database: Database) -> Self {
        Self {
            path: PathBuf::new(),
            handle: Mutex::new(Some(database)),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|_| anyhow!("Database handle poisoned"))?;

        if handle.is_none() {
            *handle = Some(Database::open(&self.path)?);
            info!(path = %self.path.display(), "shared database opened");
        }

        let database = handle.as_ref().context("Database handle unavailable")?;
        f(database)
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.handle
            .lock()
            .map(|handle| handle.is_some())
            .unwrap_or(false)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize record")
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).context("Failed to parse stored record")
}

#[cfg(test)]
mod tests {
    use super::{Database, SharedDatabase};
    use crate::models::{
        DailyReport, FocusSession, REPORT_VERSION, Task, Template, TemplateTask, UserPreferences,
    };
    use chrono::{NaiveDate, Utc};

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
    }

    fn report(id: &str, date: &str, productivity: f64) -> DailyReport {
        DailyReport {
            id: id.to_string(),
            date: day(date),
            tasks: vec![Task::new("Write", 100.0).with_completion(productivity)],
            productivity_percent: productivity,
            notes: None,
            created_at: Utc::now(),
            version: REPORT_VERSION,
        }
    }

    #[test]
    fn reports_round_trip_by_id_and_date() {
        let database = Database::open_in_memory().expect("db");
        database
            .put_report(&report("a", "2026-03-01", 70.0))
            .expect("put");
        database
            .put_report(&report("b", "2026-03-02", 40.0))
            .expect("put");

        let by_id = database.report("a").expect("query").expect("report a");
        assert_eq!(by_id.productivity_percent, 70.0);

        let by_date = database
            .report_by_date(day("2026-03-02"))
            .expect("query")
            .expect("report b");
        assert_eq!(by_date.id, "b");

        assert!(
            database
                .report_by_date(day("2026-03-05"))
                .expect("query")
                .is_none()
        );
    }

    #[test]
    fn list_reports_is_newest_first_and_limited() {
        let database = Database::open_in_memory().expect("db");
        for (id, date) in [("a", "2026-03-01"), ("b", "2026-03-03"), ("c", "2026-03-02")] {
            database.put_report(&report(id, date, 50.0)).expect("put");
        }

        let dates = database
            .list_reports(Some(2))
            .expect("list")
            .into_iter()
            .map(|report| report.id)
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["b", "c"]);
        assert_eq!(database.all_reports().expect("all").len(), 3);

        assert!(database.delete_report("b").expect("delete"));
        assert!(!database.delete_report("b").expect("delete again"));
    }

    #[test]
    fn missing_draft_and_preferences_are_empty_state() {
        let database = Database::open_in_memory().expect("db");

        assert!(
            database
                .draft_tasks(day("2026-03-01"))
                .expect("draft")
                .is_empty()
        );
        assert_eq!(
            database.preferences().expect("prefs"),
            UserPreferences::default()
        );
    }

    #[test]
    fn draft_tasks_are_keyed_by_date() {
        let database = Database::open_in_memory().expect("db");
        let date = day("2026-03-01");
        let tasks = vec![Task::new("Plan", 40.0), Task::new("Build", 60.0)];

        database.put_draft_tasks(date, &tasks).expect("put");
        assert_eq!(database.draft_tasks(date).expect("draft"), tasks);
        assert!(
            database
                .draft_tasks(day("2026-03-02"))
                .expect("other day")
                .is_empty()
        );

        database.delete_draft_tasks(date).expect("delete");
        assert!(database.draft_tasks(date).expect("draft").is_empty());
    }

    #[test]
    fn preferences_singleton_overwrites() {
        let database = Database::open_in_memory().expect("db");
        let preferences = UserPreferences {
            max_tasks: 3,
            ..UserPreferences::default()
        };

        database.put_preferences(&preferences).expect("put");
        database.put_preferences(&preferences).expect("put again");
        assert_eq!(database.preferences().expect("prefs").max_tasks, 3);
    }

    #[test]
    fn templates_resolve_by_id_or_name() {
        let database = Database::open_in_memory().expect("db");
        let template = Template {
            id: "tpl-1".to_string(),
            name: "Workday".to_string(),
            description: None,
            tasks: vec![TemplateTask {
                title: "Inbox".to_string(),
                weight: 100.0,
                category: None,
                estimated_duration: None,
            }],
            created_at: Utc::now(),
        };
        database.put_template(&template).expect("put");

        assert!(database.find_template("tpl-1").expect("find").is_some());
        assert!(database.find_template("workday").expect("find").is_some());
        assert!(database.find_template("weekend").expect("find").is_none());

        assert!(database.delete_template("tpl-1").expect("delete"));
        assert!(database.list_templates().expect("list").is_empty());
    }

    #[test]
    fn focus_sessions_filter_by_date() {
        let database = Database::open_in_memory().expect("db");
        for (id, date) in [("f1", "2026-03-01"), ("f2", "2026-03-01"), ("f3", "2026-03-02")] {
            database
                .put_focus_session(&FocusSession {
                    id: id.to_string(),
                    date: day(date),
                    started_at: Utc::now(),
                    duration_minutes: 25,
                    task_id: None,
                    completed: true,
                })
                .expect("put");
        }

        assert_eq!(database.focus_sessions().expect("all").len(), 3);
        assert_eq!(
            database
                .focus_sessions_for_date(day("2026-03-01"))
                .expect("day")
                .len(),
            2
        );
    }

    #[test]
    fn shared_database_opens_on_first_use() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("db").join("glow.db");
        let shared = SharedDatabase::new(&path);

        assert!(!shared.is_open());
        assert!(!path.exists());

        let count = shared
            .with(|database| Ok(database.all_reports()?.len()))
            .expect("first use");
        assert_eq!(count, 0);
        assert!(shared.is_open());
        assert!(path.exists());

        shared
            .with(|database| database.put_report(&report("a", "2026-03-15", 70.0)))
            .expect("reuse");
        let stored = shared
            .with(|database| database.report("a"))
            .expect("query");
        assert!(stored.is_some());
    }
}

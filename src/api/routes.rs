use crate::analyzer::achievements::History;
use crate::analyzer::{self, heatmap, report};
use crate::config::Config;
use crate::db::{Database, SharedDatabase};
use crate::models::{DailyReport, Template, UserPreferences};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub database: Arc<SharedDatabase>,
}

impl ApiState {
    fn with_database<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        self.database.with(f)
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/reports", get(report_list))
        .route("/api/v1/report/:date", get(report_by_date))
        .route("/api/v1/report/:date/markdown", get(report_markdown))
        .route(
            "/api/v1/report/:date/download/json",
            get(report_download_json),
        )
        .route("/api/v1/draft/:date", get(draft))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/heatmap", get(heatmap_cells))
        .route("/api/v1/achievements", get(achievements))
        .route("/api/v1/suggestions", get(suggestions))
        .route("/api/v1/templates", get(templates))
        .route(
            "/api/v1/preferences",
            get(preferences_get).put(preferences_put),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReportsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct HeatmapQuery {
    days: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ReportsPayload {
    reports: Vec<ReportView>,
}

#[derive(Debug, Serialize)]
struct ReportView {
    id: String,
    date: String,
    productivity_percent: f64,
    task_count: usize,
    json_url: String,
    markdown_url: String,
    download_url: String,
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    today: NaiveDate,
    report_count: usize,
    logged_today: bool,
    draft_task_count: usize,
    latest_report_date: Option<String>,
    api_port: u16,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let payload = state.with_database(|database| {
        let today = database.preferences()?.today();
        let reports = database.list_reports(None)?;

        Ok(StatusPayload {
            today,
            report_count: reports.len(),
            logged_today: reports.iter().any(|report| report.date == today),
            draft_task_count: database.draft_tasks(today)?.len(),
            latest_report_date: reports
                .first()
                .map(|report| report.date.format("%Y-%m-%d").to_string()),
            api_port: state.config.api_port,
        })
    })?;

    Ok(Json(payload))
}

async fn report_list(
    State(state): State<ApiState>,
    Query(query): Query<ReportsQuery>,
) -> ApiResult<Json<ReportsPayload>> {
    let limit = query.limit.unwrap_or(7).clamp(1, 366);
    let reports = state
        .with_database(|database| database.list_reports(Some(limit)))?
        .into_iter()
        .map(|report| {
            let date = report.date.format("%Y-%m-%d").to_string();
            ReportView {
                id: report.id,
                productivity_percent: report.productivity_percent,
                task_count: report.tasks.len(),
                json_url: format!("/api/v1/report/{date}"),
                markdown_url: format!("/api/v1/report/{date}/markdown"),
                download_url: format!("/api/v1/report/{date}/download/json"),
                date,
            }
        })
        .collect::<Vec<_>>();

    Ok(Json(ReportsPayload { reports }))
}

async fn report_by_date(
    State(state): State<ApiState>,
    Path(date): Path<String>,
) -> ApiResult<Json<DailyReport>> {
    Ok(Json(find_report(&state, &date)?))
}

async fn report_markdown(
    State(state): State<ApiState>,
    Path(date): Path<String>,
) -> ApiResult<Response> {
    let report = find_report(&state, &date)?;
    let markdown = report::render_markdown(&report);

    let mut response = Response::new(markdown.into_response().into_body());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/markdown; charset=utf-8"),
    );

    Ok(response)
}

async fn report_download_json(
    State(state): State<ApiState>,
    Path(date): Path<String>,
) -> ApiResult<Response> {
    let report = find_report(&state, &date)?;
    let content = serde_json::to_string_pretty(&report::export_report(&report))
        .context("Failed to serialize exported report")?;
    let filename = report::export_file_name(&report);

    let mut response = Response::new(content.into_response().into_body());
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))?,
    );

    Ok(response)
}

async fn draft(
    State(state): State<ApiState>,
    Path(date): Path<String>,
) -> ApiResult<Json<analyzer::DraftView>> {
    let target_date = parse_date(&date)?;
    let view = state.with_database(|database| analyzer::load_draft(database, target_date))?;

    Ok(Json(view))
}

async fn stats(State(state): State<ApiState>) -> ApiResult<Json<analyzer::Dashboard>> {
    let dashboard = state.with_database(|database| {
        let today = database.preferences()?.today();
        analyzer::build_dashboard(database, today)
    })?;

    Ok(Json(dashboard))
}

async fn heatmap_cells(
    State(state): State<ApiState>,
    Query(query): Query<HeatmapQuery>,
) -> ApiResult<Json<Vec<heatmap::HeatmapCell>>> {
    let days = query
        .days
        .unwrap_or(state.config.heatmap_days)
        .clamp(7, 366);
    let cells = state.with_database(|database| {
        let today = database.preferences()?.today();
        Ok(heatmap::build_heatmap(
            &database.all_reports()?,
            today,
            days,
        ))
    })?;

    Ok(Json(cells))
}

async fn achievements(
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<analyzer::achievements::AchievementStatus>>> {
    let statuses = state.with_database(|database| {
        let reports = database.all_reports()?;
        let focus_sessions = database.focus_sessions()?;

        Ok(analyzer::achievements::evaluate(&History {
            reports: &reports,
            focus_sessions: &focus_sessions,
            today: database.preferences()?.today(),
        }))
    })?;

    Ok(Json(statuses))
}

async fn suggestions(
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<analyzer::suggestions::Suggestion>>> {
    let suggestions = state.with_database(|database| {
        let today = database.preferences()?.today();
        Ok(analyzer::suggestions::generate_suggestions(
            &database.all_reports()?,
            today,
        ))
    })?;

    Ok(Json(suggestions))
}

async fn templates(State(state): State<ApiState>) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(
        state.with_database(|database| database.list_templates())?,
    ))
}

async fn preferences_get(State(state): State<ApiState>) -> ApiResult<Json<UserPreferences>> {
    Ok(Json(
        state.with_database(|database| database.preferences())?,
    ))
}

async fn preferences_put(
    State(state): State<ApiState>,
    Json(payload): Json<serde_json::Map<String, serde_json::Value>>,
) -> ApiResult<Json<UserPreferences>> {
    let mut preferences = state.with_database(|database| database.preferences())?;

    for (key, value) in &payload {
        let raw = match value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        preferences
            .set_value(key, &raw)
            .map_err(|error| ApiError::BadRequest(error.to_string()))?;
    }

    state.with_database(|database| database.put_preferences(&preferences))?;

    Ok(Json(preferences))
}

fn find_report(state: &ApiState, date: &str) -> ApiResult<DailyReport> {
    let target_date = parse_date(date)?;

    state
        .with_database(|database| database.report_by_date(target_date))?
        .ok_or_else(|| ApiError::NotFound(format!("No report found for date: {target_date}")))
}

fn parse_date(input: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(format!("Invalid date format: {input}. Example: 2026-03-15"))
    })
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ApiError {
    fn from(value: axum::http::header::InvalidHeaderValue) -> Self {
        Self::Internal(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, ApiState, parse_date, report_by_date, stats};
    use crate::analyzer::{add_draft_task, save_daily_report};
    use crate::config::Config;
    use crate::db::{Database, SharedDatabase};
    use crate::models::Task;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn state() -> ApiState {
        ApiState {
            config: Arc::new(Config::default()),
            database: Arc::new(SharedDatabase::from_database(
                Database::open_in_memory().expect("db"),
            )),
        }
    }

    #[test]
    fn invalid_dates_are_bad_requests() {
        let error = parse_date("15/03/2026").expect_err("invalid date");
        assert!(matches!(error, ApiError::BadRequest(_)));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let result = report_by_date(State(state()), Path("2026-03-15".to_string())).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn saved_report_is_served_by_date() {
        let state = state();
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 15).expect("date");
        state
            .with_database(|database| {
                add_draft_task(database, date, Task::new("Write", 100.0).with_completion(75.0))?;
                save_daily_report(database, date, None)
            })
            .expect("saved");

        let report = report_by_date(State(state), Path("2026-03-15".to_string()))
            .await
            .expect("report");
        assert_eq!(report.0.productivity_percent, 75.0);
    }

    #[tokio::test]
    async fn stats_respond_on_empty_history() {
        let dashboard = stats(State(state())).await.expect("stats");

        assert_eq!(dashboard.0.report_count, 0);
        assert_eq!(dashboard.0.streak.current, 0);
    }
}

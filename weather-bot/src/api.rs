//! Read-only HTTP API over the audit log.
//!
//! Endpoints:
//! - GET /logs: every user's requests, newest first
//! - GET /logs/{user_id}: one user's requests, 404 when there are none
//!
//! Both accept `offset`, `limit` (1–100), `start_date` and `end_date`. Handlers
//! are thin wrappers over `logs_inner`, which is testable without a server.

use std::{future::Future, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use weather_core::{
    AuditHistory, HttpConfig, LogQuery,
    store::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
};

#[derive(Clone)]
pub struct ApiState {
    pub history: Arc<dyn AuditHistory>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/logs", get(all_logs_handler))
        .route("/logs/:user_id", get(user_logs_handler))
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn serve<F>(state: ApiState, http: &HttpConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", http.host, http.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("history API listening on http://{}", addr);

    axum::serve(listener, build_router(state)).with_graceful_shutdown(shutdown).await?;

    Ok(())
}

/// Validate raw query parameters into a store query.
pub fn build_query(user_id: Option<i64>, params: &LogParams) -> Result<LogQuery, String> {
    let offset = params.offset.unwrap_or(0);
    let offset = u32::try_from(offset).map_err(|_| format!("offset must be >= 0, got {offset}"))?;

    let limit = params.limit.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
    let limit = u32::try_from(limit)
        .ok()
        .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
        .ok_or_else(|| format!("limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"))?;

    Ok(LogQuery {
        user_id,
        start: parse_date_param("start_date", params.start_date.as_deref())?,
        end: parse_date_param("end_date", params.end_date.as_deref())?,
        offset,
        limit,
    })
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC) or `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| format!("{name} must be a date (YYYY-MM-DD) or datetime, got '{raw}'")),
    }
}

pub async fn logs_inner(
    history: &dyn AuditHistory,
    user_id: Option<i64>,
    params: LogParams,
) -> (StatusCode, serde_json::Value) {
    let query = match build_query(user_id, &params) {
        Ok(q) => q,
        Err(detail) => return (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": detail })),
    };

    let records = match history.recent(&query).await {
        Ok(records) => records,
        Err(err) => {
            match user_id {
                Some(id) => tracing::error!(user_id = id, error = %err, "failed to read user logs"),
                None => tracing::error!(error = %err, "failed to read logs"),
            }
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "Internal server error" }),
            );
        }
    };

    if user_id.is_some() && records.is_empty() {
        tracing::warn!(user_id = ?user_id, "no logs found for user");
        return (StatusCode::NOT_FOUND, json!({ "detail": "No logs found for this user" }));
    }

    tracing::info!(
        user_id = ?query.user_id,
        offset = query.offset,
        limit = query.limit,
        start_date = ?query.start,
        end_date = ?query.end,
        count = records.len(),
        "served logs"
    );

    (StatusCode::OK, json!(records))
}

pub async fn all_logs_handler(
    State(state): State<ApiState>,
    Query(params): Query<LogParams>,
) -> impl IntoResponse {
    let (status, body) = logs_inner(state.history.as_ref(), None, params).await;
    (status, Json(body))
}

pub async fn user_logs_handler(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
    Query(params): Query<LogParams>,
) -> impl IntoResponse {
    let (status, body) = logs_inner(state.history.as_ref(), Some(user_id), params).await;
    (status, Json(body))
}

use crate::analytics::insights::Insights;
use crate::domain::models::Report;
use crate::services::insights::{self as insights_service, InsightsError};
use crate::state::SharedState;
use crate::web::session::AdminSession;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

const DEFAULT_REPORT_PAGE: i64 = 20;
const MAX_REPORT_PAGE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct InsightsParams {
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub limit: Option<i64>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(compute))
        .route("/reports", get(list_reports).post(create_report))
        .with_state(state)
}

fn status_for(err: &InsightsError) -> StatusCode {
    tracing::error!("Insights run failed: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Runs the analysis; `persist=true` also appends a report without waiting on it.
async fn compute(
    _admin: AdminSession,
    State(state): State<SharedState>,
    Query(params): Query<InsightsParams>,
) -> Result<Json<Insights>, StatusCode> {
    let insights = insights_service::generate(state.store.as_ref(), &state.analysis)
        .await
        .map_err(|e| status_for(&e))?;

    if params.persist {
        if let Some(summary) = insights.summary() {
            insights_service::persist_in_background(
                state.store.clone(),
                state.change_feed.clone(),
                summary.clone(),
            );
        }
    }

    Ok(Json(insights))
}

async fn list_reports(
    _admin: AdminSession,
    State(state): State<SharedState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<Report>>, StatusCode> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_REPORT_PAGE)
        .clamp(1, MAX_REPORT_PAGE);
    state.store.list_reports(limit).await.map(Json).map_err(|e| {
        tracing::error!("Failed to list reports: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Same analysis, but the append is awaited and the stored row returned.
async fn create_report(
    _admin: AdminSession,
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<Report>), StatusCode> {
    let insights = insights_service::generate(state.store.as_ref(), &state.analysis)
        .await
        .map_err(|e| status_for(&e))?;
    let summary = insights.summary().ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let report = insights_service::persist(state.store.as_ref(), &state.change_feed, summary)
        .await
        .map_err(|e| status_for(&e))?;
    Ok((StatusCode::CREATED, Json(report)))
}

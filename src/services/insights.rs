use crate::analytics::aggregator::aggregate;
use crate::analytics::insights::{analyze, AnalysisOptions, InsightSummary, Insights};
use crate::analytics::report::build_report;
use crate::db::SubmissionStore;
use crate::domain::models::Report;
use crate::services::change_feed::{ChangeEvent, ChangeFeed};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("analysis failed: could not load submissions: {0}")]
    Fetch(#[source] anyhow::Error),
    #[error("could not encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not store report: {0}")]
    Persist(#[source] anyhow::Error),
}

/// Loads both submission kinds concurrently and analyzes the joined snapshot.
/// Either load failing fails the whole run.
pub async fn generate(
    store: &dyn SubmissionStore,
    options: &AnalysisOptions,
) -> Result<Insights, InsightsError> {
    let (suggestions, feedback) = tokio::try_join!(store.list_suggestions(), store.list_feedback())
        .map_err(InsightsError::Fetch)?;

    tracing::debug!(
        suggestions = suggestions.len(),
        feedback = feedback.len(),
        "running insights analysis"
    );

    Ok(analyze(aggregate(&suggestions, &feedback), options))
}

pub async fn persist(
    store: &dyn SubmissionStore,
    feed: &ChangeFeed,
    summary: &InsightSummary,
) -> Result<Report, InsightsError> {
    let report = build_report(summary)?;
    let stored = store
        .append_report(report)
        .await
        .map_err(InsightsError::Persist)?;
    tracing::info!("Insights report stored: id={}", stored.id);
    feed.publish(ChangeEvent::ReportCreated { id: stored.id });
    Ok(stored)
}

/// Fire-and-forget append; failures are only logged.
pub fn persist_in_background(store: Arc<dyn SubmissionStore>, feed: ChangeFeed, summary: InsightSummary) {
    tokio::spawn(async move {
        if let Err(e) = persist(store.as_ref(), &feed, &summary).await {
            tracing::error!("Failed to store insights report: {}", e);
        }
    });
}

use crate::analytics::insights::InsightSummary;
use crate::domain::models::NewReport;

/// Denormalizes a summary into the append-only report shape.
pub fn build_report(summary: &InsightSummary) -> Result<NewReport, serde_json::Error> {
    Ok(NewReport {
        generated_at: summary.generated_at,
        summary: summary.recommendations.join("\n"),
        sentiment: summary.histogram.dominant().label().to_lowercase(),
        topics: summary.keywords.iter().map(|k| k.word.clone()).collect(),
        raw_data: serde_json::to_value(summary)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::aggregate;
    use crate::analytics::insights::{analyze, AnalysisOptions, Insights};
    use crate::domain::models::Feedback;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_report_fields() {
        let feedback: Vec<Feedback> = ["checkout flow is awful", "checkout crashes, terrible"]
            .into_iter()
            .map(|content| Feedback {
                id: Uuid::new_v4(),
                user_id: None,
                content: content.to_string(),
                category: Some("bug".to_string()),
                created_at: Utc::now(),
            })
            .collect();

        let Insights::Ready(summary) = analyze(aggregate(&[], &feedback), &AnalysisOptions::default())
        else {
            panic!("expected a summary");
        };

        let report = build_report(&summary).unwrap();
        assert_eq!(report.sentiment, "negative");
        assert_eq!(report.topics[0], "checkout");
        assert_eq!(report.generated_at, summary.generated_at);
        assert_eq!(report.summary.lines().count(), summary.recommendations.len());
        assert_eq!(report.raw_data["total_items"], 2);
        assert_eq!(report.raw_data["keywords"][0]["count"], 2);
    }
}

use crate::domain::models::{Feedback, Submission, Suggestion};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_suggestions: usize,
    pub total_feedback: usize,
    pub total_users: i64,
    pub today_count: usize,
}

impl DashboardStats {
    /// `today` is compared against the UTC date of each submission.
    pub fn compute(
        suggestions: &[Suggestion],
        feedback: &[Feedback],
        total_users: i64,
        today: NaiveDate,
    ) -> Self {
        let today_count = suggestions
            .iter()
            .map(|s| s.created_at)
            .chain(feedback.iter().map(|f| f.created_at))
            .filter(|created| created.date_naive() == today)
            .count();

        Self {
            total_suggestions: suggestions.len(),
            total_feedback: feedback.len(),
            total_users,
            today_count,
        }
    }
}

/// Both kinds interleaved, newest first.
pub fn merge_submissions(suggestions: Vec<Suggestion>, feedback: Vec<Feedback>) -> Vec<Submission> {
    let mut all: Vec<Submission> = suggestions
        .into_iter()
        .map(Submission::Suggestion)
        .chain(feedback.into_iter().map(Submission::Feedback))
        .collect();
    all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn suggestion_at(hours_ago: i64) -> Suggestion {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        Suggestion {
            id: Uuid::new_v4(),
            user_id: None,
            title: "Title".to_string(),
            content: "Content here".to_string(),
            created_at: now - Duration::hours(hours_ago),
        }
    }

    fn feedback_at(hours_ago: i64) -> Feedback {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        Feedback {
            id: Uuid::new_v4(),
            user_id: None,
            content: "Feedback text".to_string(),
            category: None,
            created_at: now - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_stats_today_count() {
        let suggestions = vec![suggestion_at(1), suggestion_at(30)];
        let feedback = vec![feedback_at(17), feedback_at(19)];
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        let stats = DashboardStats::compute(&suggestions, &feedback, 7, today);
        assert_eq!(stats.total_suggestions, 2);
        assert_eq!(stats.total_feedback, 2);
        assert_eq!(stats.total_users, 7);
        assert_eq!(stats.today_count, 2);
    }

    #[test]
    fn test_merge_newest_first() {
        let merged = merge_submissions(
            vec![suggestion_at(5), suggestion_at(1)],
            vec![feedback_at(3)],
        );
        let ages: Vec<bool> = merged
            .windows(2)
            .map(|w| w[0].created_at() >= w[1].created_at())
            .collect();
        assert!(ages.into_iter().all(|ok| ok));
        assert!(matches!(merged[1], Submission::Feedback(_)));
    }
}

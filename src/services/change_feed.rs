//! Broadcast of row-store changes, consumed by the dashboard event stream.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    SuggestionCreated { id: Uuid },
    FeedbackCreated { id: Uuid },
    QuizSettingsChanged { is_active: bool },
    ReportCreated { id: Uuid },
}

impl ChangeEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SuggestionCreated { .. } => "suggestion_created",
            Self::FeedbackCreated { .. } => "feedback_created",
            Self::QuizSettingsChanged { .. } => "quiz_settings_changed",
            Self::ReportCreated { .. } => "report_created",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        tracing::debug!(event = event.event_type(), "publishing change");
        // no subscribers is not an error
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

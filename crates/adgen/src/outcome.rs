use serde::Serialize;
use serde_json::Value;

/// Recorded result of a task as seen by a poller.
///
/// `Processing` is never stored: it is what a poll reports when no entry
/// exists, whether the task is still queued, running, already consumed or
/// was never submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Processing,
    Completed { data: Value },
    Failed { error: String },
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::Processing)
    }
}

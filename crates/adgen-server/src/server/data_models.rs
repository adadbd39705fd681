use adgen::TaskId;
use serde::{Deserialize, Serialize};

/// Body of `202 Accepted` after a submission.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubmitResponse {
    pub task_id: TaskId,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

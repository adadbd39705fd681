use bytes::Bytes;
use tokio::time::Instant;
use uuid::Uuid;

pub type TaskId = Uuid;

/// Input of a single job: the uploaded bytes, their declared content type and
/// the requested output style.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub data: Bytes,
    pub content_type: String,
    pub style: String,
}

impl Payload {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            style: style.into(),
        }
    }
}

/// Queue entry
#[derive(Debug)]
pub struct Task {
    /// Identifier
    id: TaskId,

    /// Request
    payload: Payload,

    /// Instant when this entry was queued
    queue_time: Instant,
}

impl Task {
    pub(crate) fn new(payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            queue_time: Instant::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn queue_time(&self) -> Instant {
        self.queue_time
    }

    pub(crate) fn into_parts(self) -> (TaskId, Payload) {
        (self.id, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_payload_gets_distinct_ids() {
        let payload = Payload::new(vec![1u8, 2, 3], "image/png", "brief");

        let a = Task::new(payload.clone());
        let b = Task::new(payload);

        assert_ne!(a.id(), b.id());
        assert_eq!(a.payload(), b.payload());
    }
}

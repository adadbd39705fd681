use std::time::Duration;

/// Settings for a [`JobService`](crate::JobService).
///
/// The defaults reproduce the plain behaviour: an unbounded queue, no
/// processing deadline, results kept until polled and no size limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobConfig {
    /// Maximum number of queued tasks. Producers wait for space when full.
    /// Zero is treated as one.
    pub queue_capacity: Option<usize>,

    /// Deadline for a single processor call.
    pub processing_timeout: Option<Duration>,

    /// How long a resolved result waits for its poller before being dropped.
    pub result_ttl: Option<Duration>,

    /// Largest accepted payload, in bytes.
    pub max_payload_bytes: Option<usize>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_processing_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = Some(timeout);
        self
    }

    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = Some(ttl);
        self
    }

    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }
}

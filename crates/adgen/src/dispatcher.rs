use crate::error::{Error, Result};
use crate::queue::JobQueue;
use crate::task::{Payload, Task, TaskId};

/// Admission: validates a payload, gives it an id and queues it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queue: JobQueue,
    max_payload_bytes: Option<usize>,
}

impl Dispatcher {
    pub fn new(queue: JobQueue, max_payload_bytes: Option<usize>) -> Self {
        Self {
            queue,
            max_payload_bytes,
        }
    }

    /// Reject payloads that can never be processed. Has no side effects.
    pub fn validate(&self, payload: &Payload) -> Result<()> {
        let content_type = payload.content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(Error::InvalidContentType(payload.content_type.clone()));
        }

        if let Some(limit) = self.max_payload_bytes {
            let size = payload.data.len();
            if size > limit {
                return Err(Error::PayloadTooLarge { size, limit });
            }
        }
        Ok(())
    }

    /// Admit a payload and return its task id without waiting for processing.
    ///
    /// Nothing is written to the result store: the absence of an entry is
    /// what "processing" means.
    pub async fn submit(&self, payload: Payload) -> Result<TaskId> {
        self.validate(&payload)?;

        let task = Task::new(payload);
        let id = task.id();
        self.queue.push(task).await?;

        tracing::info!("Task {} queued ({} pending)", id, self.queue.pending());
        Ok(id)
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn max_payload_bytes(&self) -> Option<usize> {
        self.max_payload_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_images() {
        let (queue, _receiver) = JobQueue::new(None);
        let dispatcher = Dispatcher::new(queue, None);

        for _ in 0..2 {
            let payload = Payload::new(b"hello".to_vec(), "text/plain", "brief");
            let err = dispatcher.submit(payload).await.unwrap_err();
            assert!(matches!(err, Error::InvalidContentType(_)));
            assert_eq!(err.to_string(), crate::error::INVALID_FILE_TYPE);
        }
        assert_eq!(dispatcher.queue().pending(), 0);
    }

    #[tokio::test]
    async fn test_content_type_is_case_insensitive() {
        let (queue, _receiver) = JobQueue::new(None);
        let dispatcher = Dispatcher::new(queue, None);

        let payload = Payload::new(vec![0u8], "Image/PNG", "brief");
        assert!(dispatcher.validate(&payload).is_ok());
    }

    #[tokio::test]
    async fn test_size_limit() {
        let (queue, _receiver) = JobQueue::new(None);
        let dispatcher = Dispatcher::new(queue, Some(4));

        let payload = Payload::new(vec![0u8; 5], "image/png", "brief");
        let err = dispatcher.submit(payload).await.unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { size: 5, limit: 4 }));

        let payload = Payload::new(vec![0u8; 4], "image/png", "brief");
        dispatcher.submit(payload).await.unwrap();
        assert_eq!(dispatcher.queue().pending(), 1);
    }

    #[tokio::test]
    async fn test_submit_assigns_fresh_ids() {
        let (queue, mut receiver) = JobQueue::new(None);
        let dispatcher = Dispatcher::new(queue, None);

        let payload = Payload::new(vec![0u8], "image/jpeg", "social");
        let first = dispatcher.submit(payload.clone()).await.unwrap();
        let second = dispatcher.submit(payload).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(receiver.pop().await.unwrap().id(), first);
        assert_eq!(receiver.pop().await.unwrap().id(), second);
    }
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::JobConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::outcome::Outcome;
use crate::processor::Processor;
use crate::queue::JobQueue;
use crate::store::ResultStore;
use crate::task::{Payload, TaskId};
use crate::worker::Worker;

/// Owns the queue, the result store and the single worker for the lifetime
/// of the application.
pub struct JobService {
    dispatcher: Dispatcher,
    store: Arc<ResultStore>,
    shutdown: CancellationToken,
    worker: Mutex<Option<Worker>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl JobService {
    /// Build the queue and start the worker on the current tokio runtime.
    pub fn start<P>(processor: P, config: JobConfig) -> Result<Self>
    where
        P: Processor,
    {
        let runtime = Handle::try_current().context("JobService must start inside a tokio runtime")?;

        let (queue, receiver) = JobQueue::new(config.queue_capacity);
        let store = Arc::new(ResultStore::new());
        let shutdown = CancellationToken::new();

        let worker = Worker::spawn(
            &runtime,
            receiver,
            processor,
            store.clone(),
            config.processing_timeout,
            shutdown.clone(),
        );

        let sweeper = config
            .result_ttl
            .map(|ttl| spawn_sweeper(&runtime, store.clone(), ttl, shutdown.clone()));

        tracing::info!(
            "Job service started (queue capacity: {:?}, timeout: {:?}, result ttl: {:?})",
            config.queue_capacity,
            config.processing_timeout,
            config.result_ttl
        );

        Ok(Self {
            dispatcher: Dispatcher::new(queue, config.max_payload_bytes),
            store,
            shutdown,
            worker: Mutex::new(Some(worker)),
            sweeper: Mutex::new(sweeper),
        })
    }

    pub async fn submit(&self, payload: Payload) -> Result<TaskId> {
        self.dispatcher.submit(payload).await
    }

    /// Fetch and consume the outcome of a task. See
    /// [`ResultStore::get_and_consume`].
    pub fn poll(&self, id: &TaskId) -> Outcome {
        let outcome = self.store.get_and_consume(id);
        if outcome.is_resolved() {
            tracing::debug!("Delivered outcome for task {}", id);
        }
        outcome
    }

    pub fn pending(&self) -> usize {
        self.dispatcher.queue().pending()
    }

    pub fn max_payload_bytes(&self) -> Option<usize> {
        self.dispatcher.max_payload_bytes()
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Wait until every admitted task has an outcome.
    pub async fn drain(&self) {
        self.dispatcher.queue().join().await
    }

    /// Stop the worker between tasks and wait for it to exit. Tasks still
    /// queued are failed; later submissions are rejected.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down job service");
        self.shutdown.cancel();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.join().await.context("Worker task failed")?;
        }

        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.await.context("Sweeper task failed")?;
        }
        Ok(())
    }
}

impl Drop for JobService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn spawn_sweeper(
    runtime: &Handle,
    store: Arc<ResultStore>,
    ttl: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let period = (ttl / 2).max(Duration::from_millis(1));

    runtime.spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let purged = store.purge_expired(ttl);
                    if purged > 0 {
                        tracing::info!("Purged {} unclaimed results older than {:?}", purged, ttl);
                    }
                }
            }
        }
    })
}

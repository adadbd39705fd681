use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::{spawn_blocking, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::processor::Processor;
use crate::queue::JobReceiver;
use crate::store::ResultStore;

/// Error recorded for tasks still queued when the worker is stopped.
pub const CANCELLED: &str = "cancelled before processing";

/// The single consumer of the job queue.
///
/// Pops one task at a time, runs the processor on the blocking thread pool
/// and records the outcome. No two processor calls ever overlap. A failing
/// or panicking processor only fails its own task.
#[derive(Debug)]
pub struct Worker {
    join_handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn<P>(
        runtime: &Handle,
        receiver: JobReceiver,
        processor: P,
        store: Arc<ResultStore>,
        timeout: Option<Duration>,
        shutdown: CancellationToken,
    ) -> Self
    where
        P: Processor,
    {
        let processor = Arc::new(Mutex::new(processor));
        let join_handle = runtime.spawn(worker_loop(receiver, processor, store, timeout, shutdown));

        Self { join_handle }
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    /// Wait for the loop to exit. It exits once the shutdown token fires or
    /// every producer is gone.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.join_handle.await
    }
}

async fn worker_loop<P>(
    mut receiver: JobReceiver,
    processor: Arc<Mutex<P>>,
    store: Arc<ResultStore>,
    timeout: Option<Duration>,
    shutdown: CancellationToken,
) where
    P: Processor,
{
    tracing::info!("Worker started");

    'main: loop {
        let task = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break 'main,
            task = receiver.pop() => match task {
                Some(task) => task,
                None => break 'main,
            },
        };

        tracing::trace!(
            "Processing task {}, added {}ms ago",
            task.id(),
            task.queue_time().elapsed().as_millis()
        );

        let (id, payload) = task.into_parts();
        let handle = spawn_blocking({
            let processor = processor.clone();
            move || {
                let mut processor = processor.lock();
                processor.process(payload)
            }
        });

        let straggler = match await_processor(handle, timeout).await {
            Ok(data) => {
                store.complete(id, data);
                tracing::info!("Task {} completed", id);
                None
            }
            Err((error, straggler)) => {
                tracing::error!("Task {} failed: {}", id, error);
                store.fail(id, error);
                straggler
            }
        };

        receiver.task_done();

        // A timed-out call keeps running; let it finish before the next one
        // starts so that calls never overlap and each gets its full budget.
        if let Some(straggler) = straggler {
            let _ = straggler.await;
            tracing::debug!("Timed-out processor call for task {} returned", id);
        }
    }

    // Fail whatever is left so pollers and `join` are not left waiting.
    receiver.close();
    while let Some(task) = receiver.pop().await {
        tracing::warn!("Task {} dropped on shutdown", task.id());
        store.fail(task.id(), CANCELLED);
        receiver.task_done();
    }

    tracing::info!("Worker stopped");
}

type ProcessorHandle = JoinHandle<anyhow::Result<Value>>;

/// Wait for a processor call. On timeout the still-running call is handed
/// back alongside the error.
async fn await_processor(
    mut handle: ProcessorHandle,
    timeout: Option<Duration>,
) -> Result<Value, (String, Option<ProcessorHandle>)> {
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!("Processor exceeded {}ms", limit.as_millis());
                let error = format!("processing timed out after {}ms", limit.as_millis());
                return Err((error, Some(handle)));
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(Ok(data)) => Ok(data),
        Ok(Err(err)) => Err((format!("{err:#}"), None)),
        Err(err) if err.is_panic() => Err((
            format!("processor panicked: {}", panic_message(err.into_panic())),
            None,
        )),
        Err(err) => Err((err.to_string(), None)),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

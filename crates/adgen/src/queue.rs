use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use crate::error::{Error, Result};
use crate::task::Task;

#[derive(Debug)]
enum QueueSender {
    Bounded(mpsc::Sender<Task>),
    Unbounded(mpsc::UnboundedSender<Task>),
}

impl Clone for QueueSender {
    fn clone(&self) -> Self {
        match self {
            QueueSender::Bounded(tx) => QueueSender::Bounded(tx.clone()),
            QueueSender::Unbounded(tx) => QueueSender::Unbounded(tx.clone()),
        }
    }
}

#[derive(Debug)]
enum QueueReceiver {
    Bounded(mpsc::Receiver<Task>),
    Unbounded(mpsc::UnboundedReceiver<Task>),
}

/// Number of tasks pushed but not yet acknowledged by the consumer.
#[derive(Debug, Default)]
struct Outstanding {
    count: AtomicUsize,
    drained: Notify,
}

impl Outstanding {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn done(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.drained.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("Acknowledged more tasks than were queued"),
        }
    }

    fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    async fn wait_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.get() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Producer side of the FIFO job queue. Cheap to clone; every admission path
/// holds one.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: QueueSender,
    outstanding: Arc<Outstanding>,
}

/// Consumer side of the job queue. There is exactly one, owned by the worker.
#[derive(Debug)]
pub struct JobReceiver {
    rx: QueueReceiver,
    outstanding: Arc<Outstanding>,
}

impl JobQueue {
    /// Create a queue. With `capacity` set, [`JobQueue::push`] suspends the
    /// producer while the queue is full instead of rejecting the task. A
    /// capacity of zero is raised to one.
    pub fn new(capacity: Option<usize>) -> (Self, JobReceiver) {
        let (tx, rx) = match capacity {
            Some(capacity) => {
                if capacity == 0 {
                    tracing::warn!("Queue capacity 0 is not usable, using 1");
                }
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (QueueSender::Bounded(tx), QueueReceiver::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
            }
        };
        let outstanding = Arc::new(Outstanding::default());

        (
            Self {
                tx,
                outstanding: outstanding.clone(),
            },
            JobReceiver { rx, outstanding },
        )
    }

    /// Append a task at the back of the queue.
    ///
    /// Only waits for buffer space, never for processing. Fails with
    /// [`Error::QueueClosed`] once the consumer is gone.
    pub async fn push(&self, task: Task) -> Result<()> {
        match &self.tx {
            QueueSender::Bounded(tx) => {
                // Count the task only once a slot is reserved, so a producer
                // dropped while waiting leaves no trace.
                let permit = tx.reserve().await.map_err(|_| Error::QueueClosed)?;
                self.outstanding.add();
                permit.send(task);
            }
            QueueSender::Unbounded(tx) => {
                self.outstanding.add();
                if tx.send(task).is_err() {
                    self.outstanding.done();
                    return Err(Error::QueueClosed);
                }
            }
        }
        Ok(())
    }

    /// Tasks queued or in flight that have not been acknowledged yet.
    pub fn pending(&self) -> usize {
        self.outstanding.get()
    }

    /// Wait until every pushed task has been acknowledged.
    pub async fn join(&self) {
        self.outstanding.wait_drained().await
    }
}

impl JobReceiver {
    /// Take the oldest task, suspending while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn pop(&mut self) -> Option<Task> {
        match &mut self.rx {
            QueueReceiver::Bounded(rx) => rx.recv().await,
            QueueReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Acknowledge that a popped task has been fully handled.
    pub fn task_done(&self) {
        self.outstanding.done();
    }

    /// Stop accepting new tasks. Already queued tasks can still be popped.
    pub fn close(&mut self) {
        match &mut self.rx {
            QueueReceiver::Bounded(rx) => rx.close(),
            QueueReceiver::Unbounded(rx) => rx.close(),
        }
    }
}

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;

use crate::outcome::Outcome;
use crate::task::TaskId;

#[derive(Debug)]
struct Resolved {
    outcome: Outcome,
    recorded_at: Instant,
}

/// Resolved outcomes keyed by task id, each delivered at most once.
///
/// An id moves through `absent -> present -> absent`: the worker writes an
/// entry once, and the first poll removes it. There is no way back to
/// `present`, so a second poll cannot be told apart from an unknown id.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: DashMap<TaskId, Resolved>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&self, id: TaskId, data: Value) {
        self.record(id, Outcome::Completed { data });
    }

    pub fn fail(&self, id: TaskId, error: impl Into<String>) {
        self.record(id, Outcome::Failed {
            error: error.into(),
        });
    }

    fn record(&self, id: TaskId, outcome: Outcome) {
        match self.entries.entry(id) {
            Entry::Occupied(_) => {
                tracing::warn!("Outcome for task {} already recorded, ignoring", id);
            }
            Entry::Vacant(slot) => {
                slot.insert(Resolved {
                    outcome,
                    recorded_at: Instant::now(),
                });
            }
        }
    }

    /// Read and delete the outcome for `id` in one step.
    ///
    /// Returns [`Outcome::Processing`] when there is nothing to deliver.
    /// Concurrent callers for the same id never both receive the entry.
    pub fn get_and_consume(&self, id: &TaskId) -> Outcome {
        match self.entries.remove(id) {
            Some((_, resolved)) => resolved.outcome,
            None => Outcome::Processing,
        }
    }

    /// Drop outcomes that have waited longer than `ttl` for a poller.
    /// Returns the number of entries removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, resolved| resolved.recorded_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

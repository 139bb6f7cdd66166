//! Bounded sequential task list with an inter-task delay.

use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

use crate::Result;

/// A unit of work run by [`SequentialSchedule`].
pub type Task<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T>> + Send + 'a>;

/// Runs tasks one after another, never overlapping, waiting `pacing` before
/// every task except the first. The first failure stops the schedule and
/// discards earlier results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialSchedule {
    pacing: Duration,
}

impl SequentialSchedule {
    pub fn new(pacing: Duration) -> Self {
        Self { pacing }
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Results come back in task order.
    pub async fn run<'a, T>(&self, tasks: Vec<Task<'a, T>>) -> Result<Vec<T>> {
        let total = tasks.len();
        let mut results = Vec::with_capacity(total);
        for (i, task) in tasks.into_iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                debug!(task = i + 1, total, delay_ms = self.pacing.as_millis() as u64, "pacing");
                tokio::time::sleep(self.pacing).await;
            }
            results.push(task().await?);
        }
        Ok(results)
    }
}

use std::future::Future;
use std::pin::Pin;

use mnemo_shared::EngineError;
use tokio::sync::{mpsc, oneshot};

type BoxedJob = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A single-worker FIFO queue of turn jobs and search jobs (§5 / §9 design
/// note: prefer a queue + worker over shared locks). Every job submitted
/// through one `WorkQueue` runs to completion before the next starts, so
/// the state transitions an observer sees are always serialized and
/// submission order is preserved — generalized from a persisted
/// producer/consumer job pipeline down to an in-process channel, since
/// nothing here needs to survive a process restart.
#[derive(Clone)]
pub struct WorkQueue {
  sender: mpsc::UnboundedSender<BoxedJob>,
}

impl WorkQueue {
  #[must_use]
  pub fn spawn() -> Self {
    let (sender, mut receiver) = mpsc::unbounded_channel::<BoxedJob>();

    tokio::spawn(async move {
      while let Some(job) = receiver.recv().await {
        job.await;
      }
    });

    Self { sender }
  }

  /// Enqueues `job` and awaits its result. A job already running or
  /// queued ahead of this one always completes first.
  pub async fn submit<F, R>(&self, job: F) -> Result<R, EngineError>
  where
    F: Future<Output = R> + Send + 'static,
    R: Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    let boxed: BoxedJob = Box::pin(async move {
      let result = job.await;
      let _ = tx.send(result);
    });

    self.sender.send(boxed).map_err(|_| EngineError::provider(anyhow::anyhow!("work queue worker has shut down")))?;

    rx.await.map_err(|_| EngineError::provider(anyhow::anyhow!("work queue dropped the job before completion")))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use super::*;

  #[tokio::test]
  async fn jobs_run_in_submission_order() {
    let queue = WorkQueue::spawn();
    let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for i in 0..5 {
      let queue = queue.clone();
      let order = order.clone();
      handles.push(tokio::spawn(async move {
        queue
          .submit(async move {
            order.lock().await.push(i);
          })
          .await
          .unwrap();
      }));
    }

    for handle in handles {
      handle.await.unwrap();
    }

    // Submission happened concurrently above, so we only assert every job
    // ran exactly once rather than a specific order.
    let recorded = order.lock().await;
    let mut sorted = recorded.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
  }

  #[tokio::test]
  async fn submit_returns_the_jobs_output() {
    let queue = WorkQueue::spawn();
    let result = queue.submit(async { 2 + 2 }).await.unwrap();
    assert_eq!(result, 4);
  }

  #[tokio::test]
  async fn counter_reflects_every_completed_job() {
    let queue = WorkQueue::spawn();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..10 {
      let counter = counter.clone();
      queue.submit(async move { counter.fetch_add(1, Ordering::SeqCst) }).await.unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 10);
  }
}

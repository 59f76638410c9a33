// slicehouse/src/notify/outbox.rs

//! Hands notification work to a background worker after the order write has
//! committed, so slow gateways never hold up a response.

use super::dispatcher::NotificationDispatcher;
use super::templates::NotificationPayload;
use crate::model::NotificationEvent;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct OutboxJob {
  pub event: NotificationEvent,
  pub payload: NotificationPayload,
}

enum Mode {
  Queued(mpsc::Sender<OutboxJob>),
  Inline,
}

pub struct Outbox {
  dispatcher: Arc<NotificationDispatcher>,
  mode: Mode,
}

impl Outbox {
  /// Starts the worker on the current tokio runtime. The worker exits once
  /// every `Outbox` handle is dropped and the queue is drained.
  pub fn spawn(dispatcher: Arc<NotificationDispatcher>, capacity: usize) -> (Self, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<OutboxJob>(capacity.max(1));
    let worker_dispatcher = Arc::clone(&dispatcher);
    let worker = tokio::spawn(async move {
      while let Some(job) = rx.recv().await {
        worker_dispatcher.notify(job.event, &job.payload).await;
      }
      debug!("Outbox worker stopped.");
    });
    (
      Self {
        dispatcher,
        mode: Mode::Queued(tx),
      },
      worker,
    )
  }

  /// Dispatches within `enqueue` itself. Used by tests and one-shot tools.
  pub fn inline(dispatcher: Arc<NotificationDispatcher>) -> Self {
    Self {
      dispatcher,
      mode: Mode::Inline,
    }
  }

  pub async fn enqueue(&self, job: OutboxJob) {
    let tx = match &self.mode {
      Mode::Inline => {
        self.dispatcher.notify(job.event, &job.payload).await;
        return;
      }
      Mode::Queued(tx) => tx,
    };

    match tx.try_send(job) {
      Ok(()) => {}
      Err(TrySendError::Full(job)) | Err(TrySendError::Closed(job)) => {
        warn!(order_id = %job.payload.order_id, event = %job.event, "Outbox queue unavailable, dispatching on a detached task.");
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
          dispatcher.notify(job.event, &job.payload).await;
        });
      }
    }
  }
}

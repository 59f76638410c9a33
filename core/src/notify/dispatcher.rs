// slicehouse/src/notify/dispatcher.rs

use super::provider::{Delivery, LogProvider, NotificationProvider, OutboundMessage, ProviderError};
use super::templates::{render, NotificationPayload};
use crate::clock::Clock;
use crate::model::{Channel, NotificationEvent, NotificationLog, NotificationStatus};
use crate::store::NotificationLogRepository;
use futures_util::future::join_all;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Per-provider bounds on one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
  /// Limit on a single `send` attempt.
  pub timeout: Duration,
  /// Attempts per provider, including the first. Values below 1 mean 1.
  pub max_attempts: u32,
}

impl Default for DispatchPolicy {
  fn default() -> Self {
    Self {
      timeout: Duration::from_millis(5000),
      max_attempts: 2,
    }
  }
}

/// Fans one event out to every provider concurrently and records one
/// `NotificationLog` per provider. Never returns an error.
pub struct NotificationDispatcher {
  providers: Vec<Arc<dyn NotificationProvider>>,
  logs: Arc<dyn NotificationLogRepository>,
  clock: Arc<dyn Clock>,
  policy: DispatchPolicy,
}

struct Outcome {
  status: NotificationStatus,
  error: Option<String>,
  attempts: u32,
}

impl NotificationDispatcher {
  /// A `LogProvider` is added when `providers` has no log channel.
  pub fn new(
    mut providers: Vec<Arc<dyn NotificationProvider>>,
    logs: Arc<dyn NotificationLogRepository>,
    clock: Arc<dyn Clock>,
    policy: DispatchPolicy,
  ) -> Self {
    if !providers.iter().any(|p| p.channel() == Channel::Log) {
      providers.insert(0, Arc::new(LogProvider));
    }
    Self {
      providers,
      logs,
      clock,
      policy,
    }
  }

  pub fn channels(&self) -> Vec<Channel> {
    self.providers.iter().map(|p| p.channel()).collect()
  }

  #[instrument(name = "notify", skip(self, payload), fields(order_id = %payload.order_id))]
  pub async fn notify(&self, event: NotificationEvent, payload: &NotificationPayload) -> Vec<NotificationLog> {
    let message = OutboundMessage {
      order_id: payload.order_id,
      event,
      recipient: payload.phone.clone(),
      body: render(event, payload),
    };

    let message = &message;
    // A panicking provider becomes a FAILED row for its channel only.
    let attempts = self.providers.iter().map(|provider| async move {
      match AssertUnwindSafe(self.deliver(provider.as_ref(), message)).catch_unwind().await {
        Ok(entry) => entry,
        Err(panic) => {
          let reason = format!("provider panicked: {}", panic_message(panic.as_ref()));
          warn!(channel = %provider.channel(), error = %reason, "Notification provider panicked.");
          self.log_entry(
            provider.channel(),
            message,
            Outcome {
              status: NotificationStatus::Failed,
              error: Some(reason),
              attempts: 1,
            },
          )
        }
      }
    });
    let entries = join_all(attempts).await;

    for entry in &entries {
      if let Err(e) = self.logs.append(entry.clone()).await {
        warn!(order_id = %entry.order_id, channel = %entry.channel, error = %e, "Failed to persist notification log.");
      }
    }
    entries
  }

  async fn deliver(&self, provider: &dyn NotificationProvider, message: &OutboundMessage) -> NotificationLog {
    let channel = provider.channel();
    let outcome = if !provider.is_enabled() {
      Outcome {
        status: NotificationStatus::Skipped,
        error: Some(format!("{} channel disabled", channel)),
        attempts: 0,
      }
    } else if channel.needs_phone() && message.recipient.is_none() {
      Outcome {
        status: NotificationStatus::Skipped,
        error: Some(ProviderError::MissingRecipient(channel).to_string()),
        attempts: 0,
      }
    } else {
      self.send_with_retries(provider, message).await
    };

    debug!(channel = %channel, event = %message.event, status = outcome.status.as_str(), "Notification attempt finished.");
    self.log_entry(channel, message, outcome)
  }

  fn log_entry(&self, channel: Channel, message: &OutboundMessage, outcome: Outcome) -> NotificationLog {
    NotificationLog {
      id: Uuid::new_v4(),
      order_id: message.order_id,
      channel,
      event: message.event,
      status: outcome.status,
      recipient: if channel.needs_phone() { message.recipient.clone() } else { None },
      message: message.body.clone(),
      error: outcome.error,
      attempts: outcome.attempts,
      created_at: self.clock.now(),
    }
  }

  async fn send_with_retries(&self, provider: &dyn NotificationProvider, message: &OutboundMessage) -> Outcome {
    let max_attempts = self.policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
      match tokio::time::timeout(self.policy.timeout, provider.send(message)).await {
        Ok(Ok(delivery)) => {
          return Outcome {
            status: match delivery {
              Delivery::Sent => NotificationStatus::Sent,
              Delivery::Queued => NotificationStatus::Queued,
            },
            error: None,
            attempts: attempt,
          }
        }
        Ok(Err(e)) => last_error = e.to_string(),
        Err(_) => last_error = format!("timed out after {} ms", self.policy.timeout.as_millis()),
      }
      warn!(channel = %provider.channel(), attempt, error = %last_error, "Notification attempt failed.");
    }

    Outcome {
      status: NotificationStatus::Failed,
      error: Some(last_error),
      attempts: max_attempts,
    }
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(s) = panic.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}

// slicehouse/src/notify/provider.rs

use crate::model::{Channel, NotificationEvent};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// What a provider did with a message it accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
  Sent,
  /// Handed to an upstream gateway that will deliver it later.
  Queued,
}

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("gateway rejected the message: {0}")]
  Rejected(String),

  #[error("gateway unreachable: {0}")]
  Transport(String),

  #[error("no recipient for channel {0}")]
  MissingRecipient(Channel),
}

#[derive(Debug, Clone)]
pub struct OutboundMessage {
  pub order_id: Uuid,
  pub event: NotificationEvent,
  /// Customer phone number, when one is known.
  pub recipient: Option<String>,
  pub body: String,
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
  fn channel(&self) -> Channel;

  fn is_enabled(&self) -> bool {
    true
  }

  async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError>;
}

/// Writes notifications to the application log. Always enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProvider;

#[async_trait]
impl NotificationProvider for LogProvider {
  fn channel(&self) -> Channel {
    Channel::Log
  }

  async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError> {
    info!(
      target: "notifications",
      order_id = %message.order_id,
      event = %message.event,
      "{}",
      message.body
    );
    Ok(Delivery::Sent)
  }
}

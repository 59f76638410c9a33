// slicehouse/src/model/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Delivery channels a provider can serve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
  Log,
  Sms,
  Whatsapp,
}

impl Channel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Channel::Log => "LOG",
      Channel::Sms => "SMS",
      Channel::Whatsapp => "WHATSAPP",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [Channel::Log, Channel::Sms, Channel::Whatsapp].into_iter().find(|c| c.as_str() == s)
  }

  /// Whether the channel can only deliver to a phone number.
  pub fn needs_phone(&self) -> bool {
    !matches!(self, Channel::Log)
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
  OrderPlaced,
  OrderAccepted,
  OrderPreparing,
  OutForDelivery,
  OrderDelivered,
}

impl NotificationEvent {
  pub fn as_str(&self) -> &'static str {
    match self {
      NotificationEvent::OrderPlaced => "ORDER_PLACED",
      NotificationEvent::OrderAccepted => "ORDER_ACCEPTED",
      NotificationEvent::OrderPreparing => "ORDER_PREPARING",
      NotificationEvent::OutForDelivery => "OUT_FOR_DELIVERY",
      NotificationEvent::OrderDelivered => "ORDER_DELIVERED",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [
      NotificationEvent::OrderPlaced,
      NotificationEvent::OrderAccepted,
      NotificationEvent::OrderPreparing,
      NotificationEvent::OutForDelivery,
      NotificationEvent::OrderDelivered,
    ]
    .into_iter()
    .find(|e| e.as_str() == s)
  }
}

impl fmt::Display for NotificationEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
  /// Accepted by an upstream gateway that delivers later.
  Queued,
  Sent,
  Failed,
  Skipped,
}

impl NotificationStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      NotificationStatus::Queued => "QUEUED",
      NotificationStatus::Sent => "SENT",
      NotificationStatus::Failed => "FAILED",
      NotificationStatus::Skipped => "SKIPPED",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [
      NotificationStatus::Queued,
      NotificationStatus::Sent,
      NotificationStatus::Failed,
      NotificationStatus::Skipped,
    ]
    .into_iter()
    .find(|st| st.as_str() == s)
  }
}

/// Append-only audit row: one per (order, channel, event) dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLog {
  pub id: Uuid,
  pub order_id: Uuid,
  pub channel: Channel,
  pub event: NotificationEvent,
  pub status: NotificationStatus,
  pub recipient: Option<String>,
  pub message: String,
  pub error: Option<String>,
  pub attempts: u32,
  pub created_at: DateTime<Utc>,
}

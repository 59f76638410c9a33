// slicehouse/src/broadcast.rs

//! Live status events. Each order has its own channel and the kitchen gets
//! every event. Delivery is at-most-once: a lagging or disconnected
//! subscriber misses events and should re-fetch the order.

use crate::model::OrderStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

const ORDER_CHANNEL_CAPACITY: usize = 16;
const KITCHEN_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
  pub order_id: Uuid,
  pub order_number: i64,
  /// `None` for a newly placed order.
  pub previous: Option<OrderStatus>,
  pub status: OrderStatus,
  pub at: DateTime<Utc>,
}

pub struct StatusBroadcaster {
  orders: Mutex<HashMap<Uuid, broadcast::Sender<StatusEvent>>>,
  kitchen: broadcast::Sender<StatusEvent>,
}

impl Default for StatusBroadcaster {
  fn default() -> Self {
    Self::new()
  }
}

impl StatusBroadcaster {
  pub fn new() -> Self {
    let (kitchen, _) = broadcast::channel(KITCHEN_CHANNEL_CAPACITY);
    Self {
      orders: Mutex::new(HashMap::new()),
      kitchen,
    }
  }

  pub fn subscribe(&self, order_id: Uuid) -> broadcast::Receiver<StatusEvent> {
    self
      .orders
      .lock()
      .entry(order_id)
      .or_insert_with(|| broadcast::channel(ORDER_CHANNEL_CAPACITY).0)
      .subscribe()
  }

  pub fn subscribe_kitchen(&self) -> broadcast::Receiver<StatusEvent> {
    self.kitchen.subscribe()
  }

  /// Publishes to the order channel and the kitchen. Returns how many
  /// subscribers of the order channel received it.
  pub fn publish(&self, event: StatusEvent) -> usize {
    let _ = self.kitchen.send(event.clone());

    let mut orders = self.orders.lock();
    let Some(sender) = orders.get(&event.order_id) else {
      return 0;
    };
    match sender.send(event) {
      Ok(delivered) => delivered,
      Err(broadcast::error::SendError(event)) => {
        trace!(order_id = %event.order_id, "Dropping order channel without subscribers.");
        orders.remove(&event.order_id);
        0
      }
    }
  }

  /// Number of order channels currently held open.
  pub fn open_channels(&self) -> usize {
    self.orders.lock().len()
  }
}

// slicehouse/src/notify/templates.rs

use crate::model::{NotificationEvent, Order};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// The order facts a notification template may use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
  pub order_id: Uuid,
  pub order_number: i64,
  pub customer_name: String,
  pub phone: Option<String>,
  pub total: Decimal,
  pub scheduled_for: Option<DateTime<Utc>>,
}

impl From<&Order> for NotificationPayload {
  fn from(order: &Order) -> Self {
    let phone = order.customer.phone.trim();
    Self {
      order_id: order.id,
      order_number: order.order_number,
      customer_name: order.customer.name.clone(),
      phone: (!phone.is_empty()).then(|| phone.to_string()),
      total: order.total,
      scheduled_for: order.scheduled_for,
    }
  }
}

pub fn render(event: NotificationEvent, payload: &NotificationPayload) -> String {
  let name = &payload.customer_name;
  let number = payload.order_number;
  match event {
    NotificationEvent::OrderPlaced => match payload.scheduled_for {
      Some(slot) => format!(
        "Hi {}, your order #{} for Rs {:.2} is scheduled for {}.",
        name,
        number,
        payload.total,
        slot.format("%d %b %H:%M UTC")
      ),
      None => format!("Hi {}, we have received your order #{} for Rs {:.2}.", name, number, payload.total),
    },
    NotificationEvent::OrderAccepted => format!("Hi {}, your order #{} has been accepted.", name, number),
    NotificationEvent::OrderPreparing => format!("Good news {}! Your order #{} is being prepared.", name, number),
    NotificationEvent::OutForDelivery => format!("Your order #{} is out for delivery. Enjoy your meal, {}!", number, name),
    NotificationEvent::OrderDelivered => format!("Order #{} delivered. Thank you for ordering, {}!", number, name),
  }
}

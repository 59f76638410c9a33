// slicehouse/src/orders/kitchen.rs

use super::status::KitchenColumn;
use crate::model::{Order, OrderStatus, OrderType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
  pub order_id: Uuid,
  pub order_number: i64,
  pub status: OrderStatus,
  pub customer_name: String,
  /// "2 x Margherita (Large)" style lines.
  pub lines: Vec<String>,
  pub order_type: OrderType,
  pub scheduled_for: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
  pub column: KitchenColumn,
  pub tickets: Vec<KitchenTicket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenBoard {
  pub columns: Vec<BoardColumn>,
  /// Scheduled orders not yet released to the kitchen.
  pub upcoming: Vec<KitchenTicket>,
}

fn ticket(order: &Order) -> KitchenTicket {
  KitchenTicket {
    order_id: order.id,
    order_number: order.order_number,
    status: order.status,
    customer_name: order.customer.name.clone(),
    lines: order
      .items
      .iter()
      .map(|line| {
        let labels: Vec<&str> = line.variants.iter().map(|v| v.label.as_str()).collect();
        if labels.is_empty() {
          format!("{} x {}", line.quantity, line.name)
        } else {
          format!("{} x {} ({})", line.quantity, line.name, labels.join(", "))
        }
      })
      .collect(),
    order_type: order.order_type,
    scheduled_for: order.scheduled_for,
    created_at: order.created_at,
  }
}

/// Lays active orders out by column, keeping the input order within each.
pub fn build_board(orders: &[Order]) -> KitchenBoard {
  let mut columns: Vec<BoardColumn> = KitchenColumn::ALL
    .into_iter()
    .map(|column| BoardColumn {
      column,
      tickets: Vec::new(),
    })
    .collect();
  let mut upcoming = Vec::new();

  for order in orders {
    match KitchenColumn::for_status(order.status) {
      Some(column) => {
        if let Some(slot) = columns.iter_mut().find(|c| c.column == column) {
          slot.tickets.push(ticket(order));
        }
      }
      None if order.status == OrderStatus::Scheduled => upcoming.push(ticket(order)),
      None => {}
    }
  }
  upcoming.sort_by_key(|t| t.scheduled_for);

  KitchenBoard { columns, upcoming }
}

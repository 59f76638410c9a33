// slicehouse/src/model/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order lifecycle states. Transition rules live in `orders::status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Scheduled,
  Pending,
  Accepted,
  Preparing,
  Baking,
  ReadyForPickup,
  OutForDelivery,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 9] = [
    OrderStatus::Scheduled,
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::Baking,
    OrderStatus::ReadyForPickup,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Scheduled => "SCHEDULED",
      OrderStatus::Pending => "PENDING",
      OrderStatus::Accepted => "ACCEPTED",
      OrderStatus::Preparing => "PREPARING",
      OrderStatus::Baking => "BAKING",
      OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
      OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
      OrderStatus::Delivered => "DELIVERED",
      OrderStatus::Cancelled => "CANCELLED",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
  Cod,
  Upi,
  Card,
  NetBanking,
}

impl PaymentMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMethod::Cod => "COD",
      PaymentMethod::Upi => "UPI",
      PaymentMethod::Card => "CARD",
      PaymentMethod::NetBanking => "NET_BANKING",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [PaymentMethod::Cod, PaymentMethod::Upi, PaymentMethod::Card, PaymentMethod::NetBanking]
      .into_iter()
      .find(|m| m.as_str() == s)
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "PENDING",
      PaymentStatus::Paid => "PAID",
      PaymentStatus::Failed => "FAILED",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [PaymentStatus::Pending, PaymentStatus::Paid, PaymentStatus::Failed]
      .into_iter()
      .find(|m| m.as_str() == s)
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
  #[default]
  Instant,
  Scheduled,
}

impl OrderType {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderType::Instant => "INSTANT",
      OrderType::Scheduled => "SCHEDULED",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "INSTANT" => Some(OrderType::Instant),
      "SCHEDULED" => Some(OrderType::Scheduled),
      _ => None,
    }
  }
}

/// Name, phone and address captured at order time, for guests and
/// registered users alike.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
  pub name: String,
  pub phone: String,
  pub address: String,
}

/// Split GST stored verbatim on the order for invoice regeneration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakup {
  pub cgst_rate: Decimal,
  pub cgst_amount: Decimal,
  pub sgst_rate: Decimal,
  pub sgst_amount: Decimal,
  pub total_tax: Decimal,
}

/// A variant as it was priced when the line was built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVariant {
  pub id: Uuid,
  #[serde(rename = "type")]
  pub variant_type: String,
  pub label: String,
  pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
}

/// Immutable order line. `price` is the server-computed unit price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub item_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub quantity: i32,
  pub variants: Vec<SelectedVariant>,
  pub addons: Vec<SelectedAddon>,
  pub options: serde_json::Value,
}

impl OrderItem {
  pub fn line_total(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub order_number: i64,
  pub user_id: Option<Uuid>,
  pub address_id: Option<Uuid>,
  pub customer: CustomerSnapshot,
  pub items: Vec<OrderItem>,
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub tax_breakup: TaxBreakup,
  pub total: Decimal,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub coupon_code: Option<String>,
  pub invoice_number: Option<String>,
  pub order_type: OrderType,
  pub scheduled_for: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A line ready to be persisted; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDraft {
  pub item_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub quantity: i32,
  pub variants: Vec<SelectedVariant>,
  pub addons: Vec<SelectedAddon>,
  pub options: serde_json::Value,
}

/// Everything the store needs to create an order in one transaction.
///
/// When `coupon_code` is set the store increments that coupon's `used_count`
/// in the same transaction, refusing if the limit has been reached.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
  pub user_id: Option<Uuid>,
  pub address_id: Option<Uuid>,
  pub customer: CustomerSnapshot,
  pub lines: Vec<OrderLineDraft>,
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub tax_breakup: TaxBreakup,
  pub total: Decimal,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub coupon_code: Option<String>,
  pub order_type: OrderType,
  pub scheduled_for: Option<DateTime<Utc>>,
}

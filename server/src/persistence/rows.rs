// slicehouse_server/src/persistence/rows.rs

//! Row shapes read back from Postgres and their conversion into domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use slicehouse::model::{
  Addon, Channel, Coupon, CouponKind, CustomerSnapshot, Item, NotificationEvent, NotificationLog, NotificationStatus,
  Order, OrderItem, OrderStatus, OrderType, PaymentMethod, PaymentStatus, SelectedAddon, SelectedVariant, TaxBreakup,
  Variant,
};
use slicehouse::StoreError;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

fn unknown(column: &str, value: &str) -> StoreError {
  StoreError::Backend(anyhow::anyhow!("unrecognised {} value '{}' in database", column, value))
}

#[derive(Debug, FromRow)]
pub(super) struct ItemRow {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub is_available: bool,
  pub stock: i32,
  pub is_stock_managed: bool,
}

impl ItemRow {
  pub fn into_item(self) -> Item {
    Item {
      id: self.id,
      name: self.name,
      price: self.price,
      is_available: self.is_available,
      stock: self.stock,
      is_stock_managed: self.is_stock_managed,
      variants: Vec::new(),
      addons: Vec::new(),
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct VariantRow {
  pub id: Uuid,
  pub item_id: Uuid,
  pub variant_type: String,
  pub label: String,
  pub price: Decimal,
  pub is_available: bool,
}

impl From<VariantRow> for Variant {
  fn from(row: VariantRow) -> Self {
    Variant {
      id: row.id,
      item_id: row.item_id,
      variant_type: row.variant_type,
      label: row.label,
      price: row.price,
      is_available: row.is_available,
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct AddonRow {
  pub id: Uuid,
  pub item_id: Uuid,
  pub name: String,
  pub price: Decimal,
}

impl From<AddonRow> for Addon {
  fn from(row: AddonRow) -> Self {
    Addon {
      id: row.id,
      item_id: row.item_id,
      name: row.name,
      price: row.price,
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct CouponRow {
  pub code: String,
  pub kind: String,
  pub value: Decimal,
  pub expires_at: DateTime<Utc>,
  pub is_active: bool,
  pub usage_limit: Option<i32>,
  pub used_count: i32,
}

impl TryFrom<CouponRow> for Coupon {
  type Error = StoreError;

  fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
    Ok(Coupon {
      kind: CouponKind::parse(&row.kind).ok_or_else(|| unknown("coupon kind", &row.kind))?,
      code: row.code,
      value: row.value,
      expires_at: row.expires_at,
      is_active: row.is_active,
      usage_limit: row.usage_limit,
      used_count: row.used_count,
    })
  }
}

#[derive(Debug, FromRow)]
pub(super) struct OrderRow {
  pub id: Uuid,
  pub order_number: i64,
  pub user_id: Option<Uuid>,
  pub address_id: Option<Uuid>,
  pub customer_name: String,
  pub customer_phone: String,
  pub customer_address: String,
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub tax_breakup: Json<StoredTaxBreakup>,
  pub total: Decimal,
  pub status: String,
  pub payment_method: String,
  pub payment_status: String,
  pub coupon_code: Option<String>,
  pub invoice_number: Option<String>,
  pub order_type: String,
  pub scheduled_for: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// JSONB form of `TaxBreakup`. Amounts are written as decimal strings so the
/// stored scale ("25.00") reads back unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTaxBreakup {
  #[serde(with = "rust_decimal::serde::str")]
  pub cgst_rate: Decimal,
  #[serde(with = "rust_decimal::serde::str")]
  pub cgst_amount: Decimal,
  #[serde(with = "rust_decimal::serde::str")]
  pub sgst_rate: Decimal,
  #[serde(with = "rust_decimal::serde::str")]
  pub sgst_amount: Decimal,
  #[serde(with = "rust_decimal::serde::str")]
  pub total_tax: Decimal,
}

impl From<TaxBreakup> for StoredTaxBreakup {
  fn from(tax: TaxBreakup) -> Self {
    Self {
      cgst_rate: tax.cgst_rate,
      cgst_amount: tax.cgst_amount,
      sgst_rate: tax.sgst_rate,
      sgst_amount: tax.sgst_amount,
      total_tax: tax.total_tax,
    }
  }
}

impl From<StoredTaxBreakup> for TaxBreakup {
  fn from(stored: StoredTaxBreakup) -> Self {
    Self {
      cgst_rate: stored.cgst_rate,
      cgst_amount: stored.cgst_amount,
      sgst_rate: stored.sgst_rate,
      sgst_amount: stored.sgst_amount,
      total_tax: stored.total_tax,
    }
  }
}

pub(super) const ORDER_COLUMNS: &str = "id, order_number, user_id, address_id, customer_name, customer_phone, \
  customer_address, subtotal, discount, tax_breakup, total, status, payment_method, payment_status, coupon_code, \
  invoice_number, order_type, scheduled_for, created_at, updated_at";

impl OrderRow {
  pub fn into_order(self, items: Vec<OrderItem>) -> Result<Order, StoreError> {
    Ok(Order {
      status: OrderStatus::parse(&self.status).ok_or_else(|| unknown("order status", &self.status))?,
      payment_method: PaymentMethod::parse(&self.payment_method)
        .ok_or_else(|| unknown("payment method", &self.payment_method))?,
      payment_status: PaymentStatus::parse(&self.payment_status)
        .ok_or_else(|| unknown("payment status", &self.payment_status))?,
      order_type: OrderType::parse(&self.order_type).ok_or_else(|| unknown("order type", &self.order_type))?,
      id: self.id,
      order_number: self.order_number,
      user_id: self.user_id,
      address_id: self.address_id,
      customer: CustomerSnapshot {
        name: self.customer_name,
        phone: self.customer_phone,
        address: self.customer_address,
      },
      items,
      subtotal: self.subtotal,
      discount: self.discount,
      tax_breakup: self.tax_breakup.0.into(),
      total: self.total,
      coupon_code: self.coupon_code,
      invoice_number: self.invoice_number,
      scheduled_for: self.scheduled_for,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
pub(super) struct OrderItemRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub item_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub quantity: i32,
  pub variants: Json<Vec<SelectedVariant>>,
  pub addons: Json<Vec<SelectedAddon>>,
  pub options: serde_json::Value,
}

impl From<OrderItemRow> for OrderItem {
  fn from(row: OrderItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      item_id: row.item_id,
      name: row.name,
      price: row.price,
      quantity: row.quantity,
      variants: row.variants.0,
      addons: row.addons.0,
      options: row.options,
    }
  }
}

#[derive(Debug, FromRow)]
pub(super) struct NotificationLogRow {
  pub id: Uuid,
  pub order_id: Uuid,
  pub channel: String,
  pub event: String,
  pub status: String,
  pub recipient: Option<String>,
  pub message: String,
  pub error: Option<String>,
  pub attempts: i32,
  pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationLogRow> for NotificationLog {
  type Error = StoreError;

  fn try_from(row: NotificationLogRow) -> Result<Self, Self::Error> {
    Ok(NotificationLog {
      channel: Channel::parse(&row.channel).ok_or_else(|| unknown("channel", &row.channel))?,
      event: NotificationEvent::parse(&row.event).ok_or_else(|| unknown("notification event", &row.event))?,
      status: NotificationStatus::parse(&row.status).ok_or_else(|| unknown("notification status", &row.status))?,
      id: row.id,
      order_id: row.order_id,
      recipient: row.recipient,
      message: row.message,
      error: row.error,
      attempts: u32::try_from(row.attempts).unwrap_or(0),
      created_at: row.created_at,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use slicehouse::checkout::tax::compute_totals;

  #[test]
  fn stored_tax_breakup_keeps_two_decimal_amounts() {
    let tax = compute_totals(Decimal::from(1000), Decimal::ZERO, Decimal::from(5)).tax;
    let json = serde_json::to_value(StoredTaxBreakup::from(tax)).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "cgstRate": "2.5",
        "cgstAmount": "25.00",
        "sgstRate": "2.5",
        "sgstAmount": "25.00",
        "totalTax": "50.00"
      })
    );

    let back: TaxBreakup = serde_json::from_value::<StoredTaxBreakup>(json).unwrap().into();
    assert_eq!(back, tax);
    assert_eq!(back.cgst_amount.to_string(), "25.00");
  }
}

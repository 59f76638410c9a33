// tests/invoice_tests.rs
mod common;

use chrono::{TimeZone, Utc};
use common::*;
use rust_decimal_macros::dec;
use slicehouse::model::{
  CustomerSnapshot, Order, OrderStatus, OrderType, PaymentMethod, PaymentStatus, TaxBreakup,
};
use slicehouse::orders::invoice::{invoice_number, InvoiceHeader};
use slicehouse::{Caller, OrderError, OrderPolicy};
use uuid::Uuid;

fn legacy_order(order_number: i64) -> Order {
  let created_at = Utc.with_ymd_and_hms(2024, 12, 31, 22, 15, 0).unwrap();
  Order {
    id: Uuid::new_v4(),
    order_number,
    user_id: None,
    address_id: None,
    customer: CustomerSnapshot {
      name: "Old Customer".to_string(),
      phone: "9000000007".to_string(),
      address: "1 Old Lane".to_string(),
    },
    items: Vec::new(),
    subtotal: dec!(100),
    discount: dec!(0),
    tax_breakup: TaxBreakup {
      cgst_rate: dec!(2.5),
      cgst_amount: dec!(2.50),
      sgst_rate: dec!(2.5),
      sgst_amount: dec!(2.50),
      total_tax: dec!(5.00),
    },
    total: dec!(105.00),
    status: OrderStatus::Delivered,
    payment_method: PaymentMethod::Cod,
    payment_status: PaymentStatus::Paid,
    coupon_code: None,
    invoice_number: None,
    order_type: OrderType::Instant,
    scheduled_for: None,
    created_at,
    updated_at: created_at,
  }
}

#[tokio::test]
async fn backfill_is_idempotent() {
  let h = Harness::new();
  let (a, b) = (legacy_order(7), legacy_order(8));
  h.store.insert_order(a.clone());
  h.store.insert_order(b.clone());

  assert_eq!(h.service.backfill_invoice_numbers().await.unwrap(), 2);
  assert_eq!(h.service.backfill_invoice_numbers().await.unwrap(), 0);

  let stored = h.service.get_order(Caller::Admin, a.id, None).await.unwrap();
  assert_eq!(stored.invoice_number.as_deref(), Some("INV-202412-00007"));
  assert_eq!(stored.invoice_number.unwrap(), invoice_number(a.order_number, a.created_at));
}

#[tokio::test]
async fn new_orders_continue_the_sequence_after_legacy_rows() {
  let h = Harness::new();
  h.store.insert_order(legacy_order(41));
  let item = plain_item("Farmhouse", dec!(300));
  h.store.insert_item(item.clone());

  let order = h.service.place_order(Caller::Guest, guest_order(vec![line(&item, 1)])).await.unwrap();
  assert_eq!(order.order_number, 42);
  assert_eq!(order.invoice_number.as_deref(), Some("INV-202503-00042"));
}

#[tokio::test]
async fn invoice_document_uses_stored_breakup() {
  let h = Harness::with_policy(OrderPolicy {
    invoice: InvoiceHeader {
      store_name: "Slicehouse Indiranagar".to_string(),
      gstin: Some("29ABCDE1234F1Z5".to_string()),
    },
    ..OrderPolicy::default()
  });
  let pizza = margherita();
  h.store.insert_item(pizza.clone());
  h.store.insert_coupon(coupon("TEN", slicehouse::model::CouponKind::Percentage, dec!(10), None));
  let mut request = guest_order(vec![line_with(&pizza, 1, vec![pizza.variants[0].id], vec![])]);
  request.coupon_code = Some("TEN".to_string());
  let order = h.service.place_order(Caller::Guest, request).await.unwrap();

  let doc = h
    .service
    .invoice_document(Caller::Guest, order.id, Some("9876543210"))
    .await
    .unwrap();
  assert_eq!(doc.file_name, "INV-202503-00001.txt");
  assert!(doc.body.contains("Slicehouse Indiranagar"));
  assert!(doc.body.contains("GSTIN: 29ABCDE1234F1Z5"));
  assert!(doc.body.contains("SIZE: Large"));
  assert!(doc.body.contains("Discount (TEN)"));
  assert!(doc.body.contains("CGST @ 2.5%"));
  // 350 - 35 = 315; 2.5% of 315 = 7.875 -> 7.88 each side.
  assert!(doc.body.contains("7.88"));
  assert!(doc.body.contains("330.76"));
}

#[tokio::test]
async fn invoice_for_legacy_order_assigns_its_number() {
  let h = Harness::new();
  let legacy = legacy_order(3);
  h.store.insert_order(legacy.clone());

  let doc = h.service.invoice_document(Caller::Admin, legacy.id, None).await.unwrap();
  assert_eq!(doc.file_name, "INV-202412-00003.txt");
  let stored = h.service.get_order(Caller::Admin, legacy.id, None).await.unwrap();
  assert_eq!(stored.invoice_number.as_deref(), Some("INV-202412-00003"));
}

#[tokio::test]
async fn invoice_requires_access() {
  let h = Harness::new();
  let legacy = legacy_order(5);
  h.store.insert_order(legacy.clone());
  assert!(matches!(
    h.service.invoice_document(Caller::Guest, legacy.id, Some("1234")).await,
    Err(OrderError::Forbidden(_))
  ));
}

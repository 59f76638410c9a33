// slicehouse/src/checkout/placement.rs

//! The order placement flow as pipeline steps:
//!
//! `validate_request → resolve_customer → reprice_lines → apply_coupon →
//! compute_totals → persist_order → announce_order`
//!
//! Everything up to `persist_order` is read-only; the store write is the only
//! step with durable effects, and `announce_order` runs after it commits.

use super::discount::{validate_coupon, AppliedCoupon};
use super::pricing::{price_cart, LineRequest, PricedCart, PricedLine, Unverified};
use super::schedule::initial_status;
use super::tax::{compute_totals, OrderTotals};
use crate::broadcast::StatusEvent;
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::{Coupon, CustomerSnapshot, NotificationEvent, Order, OrderDraft, OrderStatus, OrderType, PaymentMethod, PaymentStatus};
use crate::notify::{NotificationPayload, OutboxJob};
use crate::orders::service::OrderDeps;
use crate::orders::Caller;
use crate::pipeline::{ContextData, Pipeline, PipelineControl, SkipCondition};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Contact details for an order placed without an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
  pub name: String,
  pub phone: String,
  pub address: String,
}

/// The storefront's checkout payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
  pub items: Vec<Unverified<LineRequest>>,
  /// What the storefront displayed. Never used for pricing.
  #[serde(default)]
  pub total: Option<Decimal>,
  #[serde(default)]
  pub address_id: Option<Uuid>,
  #[serde(default)]
  pub guest_address: Option<GuestDetails>,
  pub payment_method: PaymentMethod,
  #[serde(default)]
  pub payment_status: PaymentStatus,
  #[serde(default)]
  pub coupon_code: Option<String>,
  #[serde(default)]
  pub order_type: OrderType,
  #[serde(default)]
  pub scheduled_for: Option<DateTime<Utc>>,
}

pub(crate) struct PlaceOrderCtx {
  pub deps: Arc<OrderDeps>,
  pub caller: Caller,
  pub request: PlaceOrderRequest,
  pub now: DateTime<Utc>,

  pub coupon_code: Option<String>,
  pub status: OrderStatus,
  pub scheduled_for: Option<DateTime<Utc>>,
  pub customer: Option<CustomerSnapshot>,
  pub cart: Option<PricedCart>,
  pub applied_coupon: Option<AppliedCoupon>,
  pub totals: Option<OrderTotals>,
  pub order: Option<Order>,
}

impl PlaceOrderCtx {
  pub fn new(deps: Arc<OrderDeps>, caller: Caller, request: PlaceOrderRequest, now: DateTime<Utc>) -> Self {
    Self {
      deps,
      caller,
      request,
      now,
      coupon_code: None,
      status: OrderStatus::Pending,
      scheduled_for: None,
      customer: None,
      cart: None,
      applied_coupon: None,
      totals: None,
      order: None,
    }
  }
}

fn missing(step_name: &str, field: &'static str) -> OrderError {
  PipelineError::MissingContext {
    step_name: step_name.to_string(),
    field,
  }
  .into()
}

pub(crate) fn placement_pipeline() -> Pipeline<PlaceOrderCtx, OrderError> {
  let no_coupon: SkipCondition<PlaceOrderCtx> = Arc::new(|ctx: ContextData<PlaceOrderCtx>| {
    let skip = ctx.read().coupon_code.is_none();
    skip
  });

  let mut p = Pipeline::new(&[
    ("validate_request", false, None),
    ("resolve_customer", false, None),
    ("reprice_lines", false, None),
    ("apply_coupon", false, Some(no_coupon)),
    ("compute_totals", false, None),
    ("persist_order", false, None),
    ("announce_order", true, None),
  ]);

  p.on_root("validate_request", validate_request);
  p.on_root("resolve_customer", resolve_customer);
  p.on_root("reprice_lines", reprice_lines);
  p.on_root("apply_coupon", apply_coupon);
  p.on_root("compute_totals", compute_order_totals);
  p.on_root("persist_order", persist_order);
  p.on_root("announce_order", announce_order);
  p
}

async fn validate_request(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (status, scheduled_for, coupon_code) = {
    let guard = ctx.read();
    let request = &guard.request;
    if request.items.is_empty() {
      return Err(OrderError::Validation("Order must contain at least one item".to_string()));
    }
    let (status, slot) = initial_status(
      request.order_type,
      request.scheduled_for,
      guard.now,
      guard.deps.policy.min_schedule_lead,
    )?;
    let code = request
      .coupon_code
      .as_deref()
      .map(Coupon::normalize_code)
      .filter(|c| !c.is_empty());
    (status, slot, code)
  };

  let mut guard = ctx.write();
  guard.status = status;
  guard.scheduled_for = scheduled_for;
  guard.coupon_code = coupon_code;
  Ok(PipelineControl::Continue)
}

async fn resolve_customer(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (caller, address_id, guest, customers) = {
    let guard = ctx.read();
    (
      guard.caller,
      guard.request.address_id,
      guard.request.guest_address.clone(),
      Arc::clone(&guard.deps.ports.customers),
    )
  };

  let customer = match (address_id, caller.user_id()) {
    (Some(address_id), Some(user_id)) => customers
      .resolve(user_id, address_id)
      .await?
      .ok_or_else(|| OrderError::Validation("Delivery address not found".to_string()))?,
    (Some(_), None) => {
      return Err(OrderError::Validation(
        "addressId can only be used by a signed-in customer".to_string(),
      ))
    }
    (None, _) => {
      let guest = guest.ok_or_else(|| {
        OrderError::Validation("Either addressId or guestAddress is required".to_string())
      })?;
      for (field, value) in [("name", &guest.name), ("phone", &guest.phone), ("address", &guest.address)] {
        if value.trim().is_empty() {
          return Err(OrderError::Validation(format!("guestAddress.{} is required", field)));
        }
      }
      CustomerSnapshot {
        name: guest.name.trim().to_string(),
        phone: guest.phone.trim().to_string(),
        address: guest.address.trim().to_string(),
      }
    }
  };

  ctx.write().customer = Some(customer);
  Ok(PipelineControl::Continue)
}

async fn reprice_lines(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (lines, catalog) = {
    let guard = ctx.read();
    (guard.request.items.clone(), Arc::clone(&guard.deps.ports.catalog))
  };

  let ids: Vec<Uuid> = lines
    .iter()
    .map(|l| l.untrusted().item_id)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();
  let items = catalog.items_by_ids(&ids).await?;
  let cart = price_cart(&items, &lines)?;
  debug!(lines = cart.lines.len(), subtotal = %cart.subtotal, "Cart repriced from catalog.");

  ctx.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

async fn apply_coupon(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (code, subtotal, now, coupons) = {
    let guard = ctx.read();
    (
      guard.coupon_code.clone().ok_or_else(|| missing("apply_coupon", "coupon_code"))?,
      guard.cart.as_ref().ok_or_else(|| missing("apply_coupon", "cart"))?.subtotal,
      guard.now,
      Arc::clone(&guard.deps.ports.coupons),
    )
  };

  let coupon = coupons.find_by_code(&code).await?;
  let applied = validate_coupon(coupon.as_ref(), subtotal, now)?;
  debug!(code = %applied.code, discount = %applied.discount, "Coupon applied.");

  ctx.write().applied_coupon = Some(applied);
  Ok(PipelineControl::Continue)
}

async fn compute_order_totals(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let mut guard = ctx.write();
  let subtotal = guard.cart.as_ref().ok_or_else(|| missing("compute_totals", "cart"))?.subtotal;
  let discount = guard.applied_coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount);
  let totals = compute_totals(subtotal, discount, guard.deps.policy.gst_rate);

  if let Some(client_total) = guard.request.total {
    if client_total != totals.total {
      debug!(%client_total, server_total = %totals.total, "Client-reported total differs; using server total.");
    }
  }
  guard.totals = Some(totals);
  Ok(PipelineControl::Continue)
}

async fn persist_order(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (draft, now, orders) = {
    let guard = ctx.read();
    let cart = guard.cart.as_ref().ok_or_else(|| missing("persist_order", "cart"))?;
    let totals = guard.totals.ok_or_else(|| missing("persist_order", "totals"))?;
    let customer = guard.customer.clone().ok_or_else(|| missing("persist_order", "customer"))?;
    let draft = OrderDraft {
      user_id: guard.caller.user_id(),
      address_id: guard.request.address_id,
      customer,
      lines: cart.lines.iter().cloned().map(PricedLine::into_draft).collect(),
      subtotal: totals.subtotal,
      discount: totals.discount,
      tax_breakup: totals.tax,
      total: totals.total,
      status: guard.status,
      payment_method: guard.request.payment_method,
      payment_status: guard.request.payment_status,
      coupon_code: guard.applied_coupon.as_ref().map(|c| c.code.clone()),
      order_type: guard.request.order_type,
      scheduled_for: guard.scheduled_for,
    };
    (draft, guard.now, Arc::clone(&guard.deps.ports.orders))
  };

  let order = orders.create(draft, now).await?;
  info!(
    order_id = %order.id,
    order_number = order.order_number,
    total = %order.total,
    status = %order.status,
    "Order placed."
  );

  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn announce_order(ctx: ContextData<PlaceOrderCtx>) -> OrderResult<PipelineControl> {
  let (order, deps) = {
    let guard = ctx.read();
    (
      guard.order.clone().ok_or_else(|| missing("announce_order", "order"))?,
      Arc::clone(&guard.deps),
    )
  };

  deps.broadcaster.publish(StatusEvent {
    order_id: order.id,
    order_number: order.order_number,
    previous: None,
    status: order.status,
    at: order.created_at,
  });
  deps
    .outbox
    .enqueue(OutboxJob {
      event: NotificationEvent::OrderPlaced,
      payload: NotificationPayload::from(&order),
    })
    .await;
  Ok(PipelineControl::Continue)
}

// slicehouse/src/orders/service.rs

//! `OrderService`: the entry point the HTTP layer talks to.

use super::invoice::{invoice_number, render_invoice};
use super::kitchen::{build_board, KitchenBoard};
use super::repeat::{rebuild_cart, RepeatCart, RepeatRequest};
use super::transition::{status_pipeline, StatusCtx};
use super::{ensure_can_access, Caller};
use crate::broadcast::StatusBroadcaster;
use crate::checkout::discount::{validate_coupon, AppliedCoupon};
use crate::checkout::placement::{placement_pipeline, PlaceOrderCtx, PlaceOrderRequest};
use crate::clock::Clock;
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::{Coupon, Item, Order, OrderStatus};
use crate::notify::Outbox;
use crate::pipeline::{ContextData, Pipeline};
use crate::policy::OrderPolicy;
use crate::store::{CatalogRepository, CouponRepository, CustomerDirectory, OrderRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The storage ports the service reads and writes through.
#[derive(Clone)]
pub struct Ports {
  pub catalog: Arc<dyn CatalogRepository>,
  pub coupons: Arc<dyn CouponRepository>,
  pub orders: Arc<dyn OrderRepository>,
  pub customers: Arc<dyn CustomerDirectory>,
}

impl Ports {
  /// All four ports backed by one store.
  pub fn from_store<S>(store: Arc<S>) -> Self
  where
    S: CatalogRepository + CouponRepository + OrderRepository + CustomerDirectory + 'static,
  {
    Self {
      catalog: store.clone(),
      coupons: store.clone(),
      orders: store.clone(),
      customers: store,
    }
  }
}

pub(crate) struct OrderDeps {
  pub ports: Ports,
  pub outbox: Arc<Outbox>,
  pub broadcaster: Arc<StatusBroadcaster>,
  pub clock: Arc<dyn Clock>,
  pub policy: OrderPolicy,
}

/// A rendered invoice ready to be served as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
  pub file_name: String,
  pub body: String,
}

pub struct OrderService {
  deps: Arc<OrderDeps>,
  placement: Pipeline<PlaceOrderCtx, OrderError>,
  status_flow: Pipeline<StatusCtx, OrderError>,
}

impl OrderService {
  pub fn new(
    ports: Ports,
    outbox: Arc<Outbox>,
    broadcaster: Arc<StatusBroadcaster>,
    clock: Arc<dyn Clock>,
    policy: OrderPolicy,
  ) -> Self {
    Self {
      deps: Arc::new(OrderDeps {
        ports,
        outbox,
        broadcaster,
        clock,
        policy,
      }),
      placement: placement_pipeline(),
      status_flow: status_pipeline(),
    }
  }

  pub fn policy(&self) -> &OrderPolicy {
    &self.deps.policy
  }

  pub fn broadcaster(&self) -> &Arc<StatusBroadcaster> {
    &self.deps.broadcaster
  }

  /// Step names of the placement flow, in order.
  pub fn placement_steps(&self) -> Vec<&str> {
    self.placement.step_names()
  }

  #[instrument(name = "OrderService::place_order", skip(self, request), fields(items = request.items.len()), err(Display))]
  pub async fn place_order(&self, caller: Caller, request: PlaceOrderRequest) -> OrderResult<Order> {
    let now = self.deps.clock.now();
    let ctx = ContextData::new(PlaceOrderCtx::new(Arc::clone(&self.deps), caller, request, now));
    self.placement.run(ctx.clone()).await?;

    let order = ctx.write().order.take();
    order.ok_or_else(|| {
      PipelineError::MissingContext {
        step_name: "persist_order".to_string(),
        field: "order",
      }
      .into()
    })
  }

  /// Admin-only. Validates the move, commits it conditionally, then
  /// broadcasts and queues the customer notification.
  #[instrument(name = "OrderService::update_status", skip(self), err(Display))]
  pub async fn update_status(&self, caller: Caller, order_id: Uuid, status: OrderStatus) -> OrderResult<Order> {
    if !caller.is_admin() {
      return Err(OrderError::Forbidden("Only admins can change order status".to_string()));
    }

    let now = self.deps.clock.now();
    let ctx = ContextData::new(StatusCtx::new(Arc::clone(&self.deps), order_id, status, now));
    self.status_flow.run(ctx.clone()).await?;

    let updated = ctx.write().updated.take();
    updated.ok_or_else(|| {
      PipelineError::MissingContext {
        step_name: "commit_status".to_string(),
        field: "updated",
      }
      .into()
    })
  }

  #[instrument(name = "OrderService::repeat_order", skip(self, request), fields(order_id = %request.order_id), err(Display))]
  pub async fn repeat_order(&self, caller: Caller, request: RepeatRequest) -> OrderResult<RepeatCart> {
    let order = self.find_order(request.order_id).await?;
    ensure_can_access(&order, caller, request.phone.as_deref())?;

    let ids: Vec<Uuid> = order.items.iter().map(|line| line.item_id).collect();
    let catalog = self.deps.ports.catalog.items_by_ids(&ids).await?;
    let cart = rebuild_cart(&order, &catalog, self.deps.policy.addon_repricing);
    if !cart.warnings.is_empty() {
      info!(warnings = cart.warnings.len(), kept = cart.items.len(), "Repeat order rebuilt with changes.");
    }
    Ok(cart)
  }

  /// Pre-checkout coupon check. Never redeems.
  #[instrument(name = "OrderService::validate_coupon", skip(self), err(Display))]
  pub async fn validate_coupon(&self, code: &str, cart_total: Decimal) -> OrderResult<AppliedCoupon> {
    if cart_total < Decimal::ZERO {
      return Err(OrderError::Validation("cartTotal must not be negative".to_string()));
    }
    let code = Coupon::normalize_code(code);
    if code.is_empty() {
      return Err(OrderError::Validation("code is required".to_string()));
    }
    let coupon = self.deps.ports.coupons.find_by_code(&code).await?;
    validate_coupon(coupon.as_ref(), cart_total, self.deps.clock.now())
  }

  pub async fn get_order(&self, caller: Caller, order_id: Uuid, phone: Option<&str>) -> OrderResult<Order> {
    let order = self.find_order(order_id).await?;
    ensure_can_access(&order, caller, phone)?;
    Ok(order)
  }

  /// Renders the invoice, assigning the number first for orders that predate
  /// numbering.
  #[instrument(name = "OrderService::invoice_document", skip(self, phone), err(Display))]
  pub async fn invoice_document(&self, caller: Caller, order_id: Uuid, phone: Option<&str>) -> OrderResult<InvoiceDocument> {
    let mut order = self.get_order(caller, order_id, phone).await?;
    if order.invoice_number.is_none() {
      let number = invoice_number(order.order_number, order.created_at);
      self
        .deps
        .ports
        .orders
        .assign_invoice_number_if_missing(order.id, &number)
        .await?;
      order.invoice_number = Some(number);
    }

    let body = render_invoice(&order, &self.deps.policy.invoice);
    let number = order.invoice_number.unwrap_or_default();
    Ok(InvoiceDocument {
      file_name: format!("{}.txt", number),
      body,
    })
  }

  /// Derives and stores invoice numbers for orders missing one. Safe to run
  /// any number of times; returns how many orders were updated.
  #[instrument(name = "OrderService::backfill_invoice_numbers", skip(self), err(Display))]
  pub async fn backfill_invoice_numbers(&self) -> OrderResult<usize> {
    let pending = self.deps.ports.orders.list_missing_invoice().await?;
    let mut assigned = 0;
    for order in &pending {
      let number = invoice_number(order.order_number, order.created_at);
      match self.deps.ports.orders.assign_invoice_number_if_missing(order.id, &number).await {
        Ok(true) => assigned += 1,
        Ok(false) => {}
        Err(e) => {
          warn!(order_id = %order.id, error = %e, "Invoice backfill failed for order.");
          return Err(e.into());
        }
      }
    }
    if assigned > 0 {
      info!(assigned, "Backfilled invoice numbers.");
    }
    Ok(assigned)
  }

  pub async fn kitchen_board(&self) -> OrderResult<KitchenBoard> {
    let active = self.deps.ports.orders.list_active().await?;
    Ok(build_board(&active))
  }

  pub async fn menu(&self) -> OrderResult<Vec<Item>> {
    Ok(self.deps.ports.catalog.menu().await?)
  }

  async fn find_order(&self, order_id: Uuid) -> OrderResult<Order> {
    self
      .deps
      .ports
      .orders
      .find(order_id)
      .await?
      .ok_or(OrderError::OrderNotFound(order_id))
  }
}

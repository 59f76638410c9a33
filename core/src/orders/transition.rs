// slicehouse/src/orders/transition.rs

//! Status updates as pipeline steps:
//! `load_order → check_transition → commit_status → broadcast_change → queue_notification`.

use super::service::OrderDeps;
use crate::broadcast::StatusEvent;
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::{Order, OrderStatus};
use crate::notify::{NotificationPayload, OutboxJob};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, SkipCondition};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub(crate) struct StatusCtx {
  pub deps: Arc<OrderDeps>,
  pub order_id: Uuid,
  pub requested: OrderStatus,
  pub now: DateTime<Utc>,
  pub previous: Option<OrderStatus>,
  pub updated: Option<Order>,
}

impl StatusCtx {
  pub fn new(deps: Arc<OrderDeps>, order_id: Uuid, requested: OrderStatus, now: DateTime<Utc>) -> Self {
    Self {
      deps,
      order_id,
      requested,
      now,
      previous: None,
      updated: None,
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

pub(crate) fn status_pipeline() -> Pipeline<StatusCtx, OrderError> {
  let silent: SkipCondition<StatusCtx> = Arc::new(|ctx: ContextData<StatusCtx>| {
    let skip = ctx.read().requested.notification_event().is_none();
    skip
  });

  let mut p = Pipeline::new(&[
    ("load_order", false, None),
    ("check_transition", false, None),
    ("commit_status", false, None),
    ("broadcast_change", true, None),
    ("queue_notification", true, Some(silent)),
  ]);

  p.on_root("load_order", load_order);
  p.on_root("check_transition", check_transition);
  p.on_root("commit_status", commit_status);
  p.on_root("broadcast_change", broadcast_change);
  p.on_root("queue_notification", queue_notification);
  p
}

async fn load_order(ctx: ContextData<StatusCtx>) -> OrderResult<PipelineControl> {
  let (order_id, orders) = {
    let guard = ctx.read();
    (guard.order_id, Arc::clone(&guard.deps.ports.orders))
  };
  let order = orders.find(order_id).await?.ok_or(OrderError::OrderNotFound(order_id))?;
  ctx.write().previous = Some(order.status);
  Ok(PipelineControl::Continue)
}

async fn check_transition(ctx: ContextData<StatusCtx>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  let from = guard.previous.ok_or_else(|| missing("check_transition", "previous"))?;
  guard.deps.policy.transitions.check(from, guard.requested)?;
  Ok(PipelineControl::Continue)
}

async fn commit_status(ctx: ContextData<StatusCtx>) -> OrderResult<PipelineControl> {
  let (order_id, from, to, now, orders) = {
    let guard = ctx.read();
    (
      guard.order_id,
      guard.previous.ok_or_else(|| missing("commit_status", "previous"))?,
      guard.requested,
      guard.now,
      Arc::clone(&guard.deps.ports.orders),
    )
  };

  let updated = orders
    .set_status_if(order_id, from, to, now)
    .await?
    .ok_or(OrderError::OrderNotFound(order_id))?;
  info!(order_id = %order_id, from = %from, to = %to, "Order status updated.");

  ctx.write().updated = Some(updated);
  Ok(PipelineControl::Continue)
}

async fn broadcast_change(ctx: ContextData<StatusCtx>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  let order = guard.updated.as_ref().ok_or_else(|| missing("broadcast_change", "updated"))?;
  guard.deps.broadcaster.publish(StatusEvent {
    order_id: order.id,
    order_number: order.order_number,
    previous: guard.previous,
    status: order.status,
    at: order.updated_at,
  });
  Ok(PipelineControl::Continue)
}

async fn queue_notification(ctx: ContextData<StatusCtx>) -> OrderResult<PipelineControl> {
  let (job, deps) = {
    let guard = ctx.read();
    let order = guard.updated.as_ref().ok_or_else(|| missing("queue_notification", "updated"))?;
    let event = guard
      .requested
      .notification_event()
      .ok_or_else(|| missing("queue_notification", "notification_event"))?;
    (
      OutboxJob {
        event,
        payload: NotificationPayload::from(order),
      },
      Arc::clone(&guard.deps),
    )
  };
  deps.outbox.enqueue(job).await;
  Ok(PipelineControl::Continue)
}

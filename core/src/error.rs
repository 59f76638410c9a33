// slicehouse/src/error.rs
use crate::model::OrderStatus;
use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the step engine itself rather than by a business step.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Step '{step_name}' left required context unset: {field}")]
  MissingContext { step_name: String, field: &'static str },
}

/// Failures reported by storage ports.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The guarded coupon increment found the usage limit already reached.
  #[error("coupon {code} has no redemptions left")]
  CouponExhausted { code: String },

  /// The conditional status write found a different current status.
  #[error("order {order_id} changed status concurrently")]
  StatusChanged { order_id: Uuid },

  #[error(transparent)]
  Backend(#[from] anyhow::Error),
}

/// Everything the order pipeline can reject or fail with.
///
/// Messages are user-facing: they name the item, coupon or constraint.
#[derive(Debug, Error)]
pub enum OrderError {
  #[error("{0}")]
  Validation(String),

  #[error("Item not found: {item_id}")]
  ItemNotFound { item_id: Uuid },

  #[error("{name} is currently unavailable")]
  ItemUnavailable { name: String },

  #[error("Insufficient stock for {name}. Only {remaining} left")]
  InsufficientStock { name: String, remaining: i32 },

  #[error("Invalid coupon code")]
  CouponNotFound,

  #[error("Coupon {code} is not active")]
  CouponInactive { code: String },

  #[error("Coupon {code} has expired")]
  CouponExpired { code: String },

  #[error("Coupon {code} usage limit reached")]
  CouponUsageLimitReached { code: String },

  #[error("Scheduled orders must be placed at least {min_lead_minutes} minutes in advance")]
  ScheduleTooSoon { min_lead_minutes: i64 },

  #[error("Order not found: {0}")]
  OrderNotFound(Uuid),

  #[error("{0}")]
  Forbidden(String),

  #[error("Cannot move order from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Order {0} was updated by someone else; reload and retry")]
  StatusConflict(Uuid),

  #[error("Order pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Storage error: {0}")]
  Store(#[source] StoreError),
}

impl From<StoreError> for OrderError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::CouponExhausted { code } => OrderError::CouponUsageLimitReached { code },
      StoreError::StatusChanged { order_id } => OrderError::StatusConflict(order_id),
      other => OrderError::Store(other),
    }
  }
}

impl OrderError {
  /// True for rejections caused by the request or business rules, as opposed
  /// to infrastructure failures.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, OrderError::Pipeline(_) | OrderError::Store(_))
  }
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;

// slicehouse/src/store/mod.rs

//! Storage ports used by the order service. The server provides Postgres
//! implementations; `memory` backs tests and the demo backend.

pub mod memory;

use crate::error::StoreError;
use crate::model::{Coupon, CustomerSnapshot, Item, NotificationLog, Order, OrderDraft, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
  /// Items (with variants and addons) for the given ids. Missing ids are
  /// simply absent from the map.
  async fn items_by_ids(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Item>>;

  async fn menu(&self) -> StoreResult<Vec<Item>>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
  /// Looks up a normalized (upper-case) code.
  async fn find_by_code(&self, code: &str) -> StoreResult<Option<Coupon>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
  /// Creates the order, its lines, the coupon redemption and the invoice
  /// number in one atomic unit. Fails with `StoreError::CouponExhausted` and
  /// persists nothing when the coupon has no redemptions left.
  async fn create(&self, draft: OrderDraft, created_at: DateTime<Utc>) -> StoreResult<Order>;

  async fn find(&self, id: Uuid) -> StoreResult<Option<Order>>;

  /// Moves the order to `next` only if it is still in `expected`.
  ///
  /// Returns `Ok(None)` when the order does not exist and
  /// `StoreError::StatusChanged` when its status is no longer `expected`.
  async fn set_status_if(
    &self,
    id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
    at: DateTime<Utc>,
  ) -> StoreResult<Option<Order>>;

  /// Orders created before invoice numbers were assigned.
  async fn list_missing_invoice(&self) -> StoreResult<Vec<Order>>;

  /// Stores `invoice_number` unless the order already has one. Returns whether
  /// a write happened.
  async fn assign_invoice_number_if_missing(&self, id: Uuid, invoice_number: &str) -> StoreResult<bool>;

  /// Orders that are neither delivered nor cancelled, oldest first.
  async fn list_active(&self) -> StoreResult<Vec<Order>>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
  /// Name, phone and delivery address for a registered user's saved address.
  async fn resolve(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<Option<CustomerSnapshot>>;
}

#[async_trait]
pub trait NotificationLogRepository: Send + Sync {
  async fn append(&self, entry: NotificationLog) -> StoreResult<()>;

  async fn for_order(&self, order_id: Uuid) -> StoreResult<Vec<NotificationLog>>;
}

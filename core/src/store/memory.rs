// slicehouse/src/store/memory.rs

//! Single-mutex in-memory store. Every port method takes the lock once, so an
//! order creation (coupon redemption included) is atomic with respect to all
//! other calls.

use super::{CatalogRepository, CouponRepository, CustomerDirectory, NotificationLogRepository, OrderRepository, StoreResult};
use crate::error::StoreError;
use crate::model::{
  Addon, Coupon, CouponKind, CustomerSnapshot, Item, NotificationLog, Order, OrderDraft, OrderItem, OrderStatus,
  Variant,
};
use crate::orders::invoice::invoice_number;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
  items: HashMap<Uuid, Item>,
  coupons: HashMap<String, Coupon>,
  orders: HashMap<Uuid, Order>,
  last_order_number: i64,
  addresses: HashMap<(Uuid, Uuid), CustomerSnapshot>,
  notifications: Vec<NotificationLog>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_item(&self, item: Item) {
    self.inner.lock().items.insert(item.id, item);
  }

  pub fn update_item(&self, id: Uuid, f: impl FnOnce(&mut Item)) {
    if let Some(item) = self.inner.lock().items.get_mut(&id) {
      f(item);
    }
  }

  pub fn insert_coupon(&self, mut coupon: Coupon) {
    coupon.code = Coupon::normalize_code(&coupon.code);
    self.inner.lock().coupons.insert(coupon.code.clone(), coupon);
  }

  pub fn coupon(&self, code: &str) -> Option<Coupon> {
    self.inner.lock().coupons.get(&Coupon::normalize_code(code)).cloned()
  }

  /// Every coupon, sorted by code.
  pub fn coupons(&self) -> Vec<Coupon> {
    let mut coupons: Vec<Coupon> = self.inner.lock().coupons.values().cloned().collect();
    coupons.sort_by(|a, b| a.code.cmp(&b.code));
    coupons
  }

  pub fn insert_address(&self, user_id: Uuid, address_id: Uuid, customer: CustomerSnapshot) {
    self.inner.lock().addresses.insert((user_id, address_id), customer);
  }

  /// Inserts an already-built order as-is, e.g. one that predates invoice
  /// numbering. Keeps the order-number sequence ahead of it.
  pub fn insert_order(&self, order: Order) {
    let mut inner = self.inner.lock();
    inner.last_order_number = inner.last_order_number.max(order.order_number);
    inner.orders.insert(order.id, order);
  }

  pub fn order_count(&self) -> usize {
    self.inner.lock().orders.len()
  }

  pub fn notification_logs(&self) -> Vec<NotificationLog> {
    self.inner.lock().notifications.clone()
  }

  /// A small menu and two coupons for local runs.
  pub fn with_demo_data(now: DateTime<Utc>) -> Self {
    let store = Self::new();

    let margherita = Uuid::new_v4();
    store.insert_item(Item {
      id: margherita,
      name: "Margherita".to_string(),
      price: Decimal::from(199),
      is_available: true,
      stock: 0,
      is_stock_managed: false,
      variants: [("Regular", 199), ("Medium", 349), ("Large", 499)]
        .into_iter()
        .map(|(label, price)| Variant {
          id: Uuid::new_v4(),
          item_id: margherita,
          variant_type: "SIZE".to_string(),
          label: label.to_string(),
          price: Decimal::from(price),
          is_available: true,
        })
        .collect(),
      addons: [("Extra Cheese", 50), ("Jalapenos", 30), ("Olives", 40)]
        .into_iter()
        .map(|(name, price)| Addon {
          id: Uuid::new_v4(),
          item_id: margherita,
          name: name.to_string(),
          price: Decimal::from(price),
        })
        .collect(),
    });

    for (name, price, stock) in [("Farmhouse", 299, None), ("Garlic Breadsticks", 129, Some(20)), ("Choco Lava Cake", 99, Some(12))] {
      store.insert_item(Item {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price: Decimal::from(price),
        is_available: true,
        stock: stock.unwrap_or(0),
        is_stock_managed: stock.is_some(),
        variants: Vec::new(),
        addons: Vec::new(),
      });
    }

    store.insert_coupon(Coupon {
      code: "WELCOME10".to_string(),
      kind: CouponKind::Percentage,
      value: Decimal::from(10),
      expires_at: now + Duration::days(365),
      is_active: true,
      usage_limit: None,
      used_count: 0,
    });
    store.insert_coupon(Coupon {
      code: "FLAT100".to_string(),
      kind: CouponKind::Flat,
      value: Decimal::from(100),
      expires_at: now + Duration::days(30),
      is_active: true,
      usage_limit: Some(100),
      used_count: 0,
    });

    store
  }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
  async fn items_by_ids(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Item>> {
    let inner = self.inner.lock();
    Ok(
      ids
        .iter()
        .filter_map(|id| inner.items.get(id).map(|item| (*id, item.clone())))
        .collect(),
    )
  }

  async fn menu(&self) -> StoreResult<Vec<Item>> {
    let mut items: Vec<Item> = self.inner.lock().items.values().cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
  }
}

#[async_trait]
impl CouponRepository for MemoryStore {
  async fn find_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
    Ok(self.inner.lock().coupons.get(code).cloned())
  }
}

#[async_trait]
impl OrderRepository for MemoryStore {
  async fn create(&self, draft: OrderDraft, created_at: DateTime<Utc>) -> StoreResult<Order> {
    let mut inner = self.inner.lock();

    if let Some(code) = &draft.coupon_code {
      let coupon = inner
        .coupons
        .get(code)
        .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("coupon {} disappeared before redemption", code)))?;
      if coupon.is_exhausted() {
        return Err(StoreError::CouponExhausted { code: code.clone() });
      }
    }

    // Nothing below can fail, so the writes happen together or not at all.
    let order_number = inner.last_order_number + 1;
    let id = Uuid::new_v4();
    let items = draft
      .lines
      .into_iter()
      .map(|line| OrderItem {
        id: Uuid::new_v4(),
        order_id: id,
        item_id: line.item_id,
        name: line.name,
        price: line.price,
        quantity: line.quantity,
        variants: line.variants,
        addons: line.addons,
        options: line.options,
      })
      .collect();

    let order = Order {
      id,
      order_number,
      user_id: draft.user_id,
      address_id: draft.address_id,
      customer: draft.customer,
      items,
      subtotal: draft.subtotal,
      discount: draft.discount,
      tax_breakup: draft.tax_breakup,
      total: draft.total,
      status: draft.status,
      payment_method: draft.payment_method,
      payment_status: draft.payment_status,
      coupon_code: draft.coupon_code,
      invoice_number: Some(invoice_number(order_number, created_at)),
      order_type: draft.order_type,
      scheduled_for: draft.scheduled_for,
      created_at,
      updated_at: created_at,
    };

    if let Some(code) = &order.coupon_code {
      if let Some(coupon) = inner.coupons.get_mut(code) {
        coupon.used_count += 1;
      }
    }
    inner.last_order_number = order_number;
    inner.orders.insert(id, order.clone());
    debug!(order_id = %id, order_number, "Order stored in memory.");
    Ok(order)
  }

  async fn find(&self, id: Uuid) -> StoreResult<Option<Order>> {
    Ok(self.inner.lock().orders.get(&id).cloned())
  }

  async fn set_status_if(
    &self,
    id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
    at: DateTime<Utc>,
  ) -> StoreResult<Option<Order>> {
    let mut inner = self.inner.lock();
    let Some(order) = inner.orders.get_mut(&id) else {
      return Ok(None);
    };
    if order.status != expected {
      return Err(StoreError::StatusChanged { order_id: id });
    }
    order.status = next;
    order.updated_at = at;
    Ok(Some(order.clone()))
  }

  async fn list_missing_invoice(&self) -> StoreResult<Vec<Order>> {
    let mut missing: Vec<Order> = self
      .inner
      .lock()
      .orders
      .values()
      .filter(|o| o.invoice_number.is_none())
      .cloned()
      .collect();
    missing.sort_by_key(|o| o.order_number);
    Ok(missing)
  }

  async fn assign_invoice_number_if_missing(&self, id: Uuid, invoice_number: &str) -> StoreResult<bool> {
    let mut inner = self.inner.lock();
    match inner.orders.get_mut(&id) {
      Some(order) if order.invoice_number.is_none() => {
        order.invoice_number = Some(invoice_number.to_string());
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn list_active(&self) -> StoreResult<Vec<Order>> {
    let mut active: Vec<Order> = self
      .inner
      .lock()
      .orders
      .values()
      .filter(|o| !o.status.is_terminal())
      .cloned()
      .collect();
    active.sort_by_key(|o| (o.created_at, o.order_number));
    Ok(active)
  }
}

#[async_trait]
impl CustomerDirectory for MemoryStore {
  async fn resolve(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<Option<CustomerSnapshot>> {
    Ok(self.inner.lock().addresses.get(&(user_id, address_id)).cloned())
  }
}

#[async_trait]
impl NotificationLogRepository for MemoryStore {
  async fn append(&self, entry: NotificationLog) -> StoreResult<()> {
    self.inner.lock().notifications.push(entry);
    Ok(())
  }

  async fn for_order(&self, order_id: Uuid) -> StoreResult<Vec<NotificationLog>> {
    Ok(
      self
        .inner
        .lock()
        .notifications
        .iter()
        .filter(|n| n.order_id == order_id)
        .cloned()
        .collect(),
    )
  }
}

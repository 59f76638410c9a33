// slicehouse_server/src/persistence/postgres.rs

use super::rows::{
  AddonRow, CouponRow, ItemRow, NotificationLogRow, OrderItemRow, OrderRow, StoredTaxBreakup, VariantRow,
  ORDER_COLUMNS,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slicehouse::model::{
  Coupon, CustomerSnapshot, Item, NotificationLog, Order, OrderDraft, OrderItem, OrderStatus,
};
use slicehouse::orders::invoice::invoice_number;
use slicehouse::store::{
  CatalogRepository, CouponRepository, CustomerDirectory, MemoryStore, NotificationLogRepository, OrderRepository,
  StoreResult,
};
use slicehouse::StoreError;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

fn db(err: sqlx::Error) -> StoreError {
  StoreError::Backend(anyhow::Error::new(err))
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Copies the demo menu and coupons into an empty catalog. Does nothing
  /// when items already exist.
  #[instrument(name = "PgStore::seed_demo_data", skip_all)]
  pub async fn seed_demo_data(&self, demo: &MemoryStore) -> StoreResult<usize> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
      .fetch_one(&self.pool)
      .await
      .map_err(db)?;
    if existing > 0 {
      info!(existing, "Catalog already populated; skipping seed.");
      return Ok(0);
    }

    let menu = demo.menu().await?;
    let mut tx = self.pool.begin().await.map_err(db)?;
    for item in &menu {
      sqlx::query(
        "INSERT INTO items (id, name, price, is_available, stock, is_stock_managed) VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(item.id)
      .bind(&item.name)
      .bind(item.price)
      .bind(item.is_available)
      .bind(item.stock)
      .bind(item.is_stock_managed)
      .execute(&mut *tx)
      .await
      .map_err(db)?;
      for variant in &item.variants {
        sqlx::query(
          "INSERT INTO item_variants (id, item_id, variant_type, label, price, is_available) \
           VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(variant.id)
        .bind(item.id)
        .bind(&variant.variant_type)
        .bind(&variant.label)
        .bind(variant.price)
        .bind(variant.is_available)
        .execute(&mut *tx)
        .await
        .map_err(db)?;
      }
      for addon in &item.addons {
        sqlx::query("INSERT INTO item_addons (id, item_id, name, price) VALUES ($1, $2, $3, $4)")
          .bind(addon.id)
          .bind(item.id)
          .bind(&addon.name)
          .bind(addon.price)
          .execute(&mut *tx)
          .await
          .map_err(db)?;
      }
    }
    for coupon in demo.coupons() {
      sqlx::query(
        "INSERT INTO coupons (code, kind, value, expires_at, is_active, usage_limit, used_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (code) DO NOTHING",
      )
      .bind(&coupon.code)
      .bind(coupon.kind.as_str())
      .bind(coupon.value)
      .bind(coupon.expires_at)
      .bind(coupon.is_active)
      .bind(coupon.usage_limit)
      .bind(coupon.used_count)
      .execute(&mut *tx)
      .await
      .map_err(db)?;
    }
    tx.commit().await.map_err(db)?;
    info!(items = menu.len(), "Seeded demo catalog.");
    Ok(menu.len())
  }

  async fn attach_options(&self, rows: Vec<ItemRow>) -> StoreResult<Vec<Item>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let variants: Vec<VariantRow> = sqlx::query_as(
      "SELECT id, item_id, variant_type, label, price, is_available FROM item_variants \
       WHERE item_id = ANY($1) ORDER BY price, label",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;
    let addons: Vec<AddonRow> =
      sqlx::query_as("SELECT id, item_id, name, price FROM item_addons WHERE item_id = ANY($1) ORDER BY name")
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

    let mut items: Vec<Item> = rows.into_iter().map(ItemRow::into_item).collect();
    let index: HashMap<Uuid, usize> = items.iter().enumerate().map(|(i, item)| (item.id, i)).collect();
    for variant in variants {
      if let Some(&i) = index.get(&variant.item_id) {
        items[i].variants.push(variant.into());
      }
    }
    for addon in addons {
      if let Some(&i) = index.get(&addon.item_id) {
        items[i].addons.push(addon.into());
      }
    }
    Ok(items)
  }

  /// Loads the lines of every row in one query and assembles the orders in
  /// row order.
  async fn hydrate(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let lines: Vec<OrderItemRow> = sqlx::query_as(
      "SELECT id, order_id, item_id, name, price, quantity, variants, addons, options FROM order_items \
       WHERE order_id = ANY($1) ORDER BY position",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for line in lines {
      by_order.entry(line.order_id).or_default().push(line.into());
    }
    rows
      .into_iter()
      .map(|row| {
        let items = by_order.remove(&row.id).unwrap_or_default();
        row.into_order(items)
      })
      .collect()
  }
}

#[async_trait]
impl CatalogRepository for PgStore {
  async fn items_by_ids(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Item>> {
    let rows: Vec<ItemRow> = sqlx::query_as(
      "SELECT id, name, price, is_available, stock, is_stock_managed FROM items WHERE id = ANY($1)",
    )
    .bind(ids.to_vec())
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;
    let items = self.attach_options(rows).await?;
    Ok(items.into_iter().map(|item| (item.id, item)).collect())
  }

  async fn menu(&self) -> StoreResult<Vec<Item>> {
    let rows: Vec<ItemRow> =
      sqlx::query_as("SELECT id, name, price, is_available, stock, is_stock_managed FROM items ORDER BY name")
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;
    self.attach_options(rows).await
  }
}

#[async_trait]
impl CouponRepository for PgStore {
  async fn find_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
    let row: Option<CouponRow> = sqlx::query_as(
      "SELECT code, kind, value, expires_at, is_active, usage_limit, used_count FROM coupons WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(&self.pool)
    .await
    .map_err(db)?;
    row.map(Coupon::try_from).transpose()
  }
}

#[async_trait]
impl OrderRepository for PgStore {
  #[instrument(name = "PgStore::create", skip_all, fields(lines = draft.lines.len(), coupon = ?draft.coupon_code))]
  async fn create(&self, draft: OrderDraft, created_at: DateTime<Utc>) -> StoreResult<Order> {
    let mut tx = self.pool.begin().await.map_err(db)?;

    if let Some(code) = &draft.coupon_code {
      // Guarded increment: concurrent redemptions serialize on the row lock
      // and the loser sees zero rows affected.
      let redeemed = sqlx::query(
        "UPDATE coupons SET used_count = used_count + 1 \
         WHERE code = $1 AND (usage_limit IS NULL OR used_count < usage_limit)",
      )
      .bind(code)
      .execute(&mut *tx)
      .await
      .map_err(db)?
      .rows_affected();
      if redeemed == 0 {
        debug!(code = %code, "Coupon redemption refused at the limit.");
        return Err(StoreError::CouponExhausted { code: code.clone() });
      }
    }

    let id = Uuid::new_v4();
    let (order_number,): (i64,) = sqlx::query_as(
      "INSERT INTO orders (id, user_id, address_id, customer_name, customer_phone, customer_address, subtotal, \
       discount, tax_breakup, total, status, payment_method, payment_status, coupon_code, order_type, scheduled_for, \
       created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17) \
       RETURNING order_number",
    )
    .bind(id)
    .bind(draft.user_id)
    .bind(draft.address_id)
    .bind(&draft.customer.name)
    .bind(&draft.customer.phone)
    .bind(&draft.customer.address)
    .bind(draft.subtotal)
    .bind(draft.discount)
    .bind(Json(StoredTaxBreakup::from(draft.tax_breakup)))
    .bind(draft.total)
    .bind(draft.status.as_str())
    .bind(draft.payment_method.as_str())
    .bind(draft.payment_status.as_str())
    .bind(&draft.coupon_code)
    .bind(draft.order_type.as_str())
    .bind(draft.scheduled_for)
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(db)?;

    let invoice = invoice_number(order_number, created_at);
    sqlx::query("UPDATE orders SET invoice_number = $2 WHERE id = $1")
      .bind(id)
      .bind(&invoice)
      .execute(&mut *tx)
      .await
      .map_err(db)?;

    let mut items = Vec::with_capacity(draft.lines.len());
    for (position, line) in draft.lines.into_iter().enumerate() {
      let item = OrderItem {
        id: Uuid::new_v4(),
        order_id: id,
        item_id: line.item_id,
        name: line.name,
        price: line.price,
        quantity: line.quantity,
        variants: line.variants,
        addons: line.addons,
        options: line.options,
      };
      sqlx::query(
        "INSERT INTO order_items (id, order_id, position, item_id, name, price, quantity, variants, addons, options) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
      )
      .bind(item.id)
      .bind(id)
      .bind(position as i32)
      .bind(item.item_id)
      .bind(&item.name)
      .bind(item.price)
      .bind(item.quantity)
      .bind(Json(&item.variants))
      .bind(Json(&item.addons))
      .bind(&item.options)
      .execute(&mut *tx)
      .await
      .map_err(db)?;
      items.push(item);
    }

    tx.commit().await.map_err(db)?;

    Ok(Order {
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
      invoice_number: Some(invoice),
      order_type: draft.order_type,
      scheduled_for: draft.scheduled_for,
      created_at,
      updated_at: created_at,
    })
  }

  async fn find(&self, id: Uuid) -> StoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db)?;
    match row {
      Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn set_status_if(
    &self,
    id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
    at: DateTime<Utc>,
  ) -> StoreResult<Option<Order>> {
    let updated = sqlx::query("UPDATE orders SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2")
      .bind(id)
      .bind(expected.as_str())
      .bind(next.as_str())
      .bind(at)
      .execute(&self.pool)
      .await
      .map_err(db)?
      .rows_affected();

    if updated == 0 {
      let exists: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;
      return match exists {
        None => Ok(None),
        Some(_) => Err(StoreError::StatusChanged { order_id: id }),
      };
    }
    self.find(id).await
  }

  async fn list_missing_invoice(&self) -> StoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE invoice_number IS NULL ORDER BY order_number",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;
    self.hydrate(rows).await
  }

  async fn assign_invoice_number_if_missing(&self, id: Uuid, invoice_number: &str) -> StoreResult<bool> {
    let updated = sqlx::query("UPDATE orders SET invoice_number = $2 WHERE id = $1 AND invoice_number IS NULL")
      .bind(id)
      .bind(invoice_number)
      .execute(&self.pool)
      .await
      .map_err(db)?
      .rows_affected();
    Ok(updated == 1)
  }

  async fn list_active(&self) -> StoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE status NOT IN ('DELIVERED', 'CANCELLED') ORDER BY created_at",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;
    self.hydrate(rows).await
  }
}

#[async_trait]
impl CustomerDirectory for PgStore {
  async fn resolve(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<Option<CustomerSnapshot>> {
    let row: Option<(String, String, String)> =
      sqlx::query_as("SELECT name, phone, address FROM customer_addresses WHERE id = $1 AND user_id = $2")
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;
    Ok(row.map(|(name, phone, address)| CustomerSnapshot { name, phone, address }))
  }
}

#[async_trait]
impl NotificationLogRepository for PgStore {
  async fn append(&self, entry: NotificationLog) -> StoreResult<()> {
    sqlx::query(
      "INSERT INTO notification_logs (id, order_id, channel, event, status, recipient, message, error, attempts, \
       created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(entry.id)
    .bind(entry.order_id)
    .bind(entry.channel.as_str())
    .bind(entry.event.as_str())
    .bind(entry.status.as_str())
    .bind(&entry.recipient)
    .bind(&entry.message)
    .bind(&entry.error)
    .bind(i32::try_from(entry.attempts).unwrap_or(i32::MAX))
    .bind(entry.created_at)
    .execute(&self.pool)
    .await
    .map_err(db)?;
    Ok(())
  }

  async fn for_order(&self, order_id: Uuid) -> StoreResult<Vec<NotificationLog>> {
    let rows: Vec<NotificationLogRow> = sqlx::query_as(
      "SELECT id, order_id, channel, event, status, recipient, message, error, attempts, created_at \
       FROM notification_logs WHERE order_id = $1 ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(db)?;
    rows.into_iter().map(NotificationLog::try_from).collect()
  }
}

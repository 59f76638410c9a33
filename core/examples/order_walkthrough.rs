// slicehouse/examples/order_walkthrough.rs

use chrono::Utc;
use slicehouse::checkout::{LineRequest, SelectionRef, Unverified};
use slicehouse::model::{OrderStatus, PaymentMethod, PaymentStatus};
use slicehouse::notify::{DispatchPolicy, NotificationDispatcher, Outbox};
use slicehouse::store::{MemoryStore, NotificationLogRepository};
use slicehouse::{
  Caller, GuestDetails, OrderError, OrderPolicy, OrderService, PlaceOrderRequest, Ports, StatusBroadcaster, SystemClock,
};
use std::sync::Arc;
use tracing::info;

// Places a guest order against the demo menu, walks it to delivery and prints
// the invoice plus every notification that was logged along the way.
#[tokio::main]
async fn main() -> Result<(), OrderError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let store = Arc::new(MemoryStore::with_demo_data(Utc::now()));
  let clock = Arc::new(SystemClock);
  let logs: Arc<dyn NotificationLogRepository> = store.clone();
  // No providers configured: the dispatcher falls back to the log channel.
  let dispatcher = Arc::new(NotificationDispatcher::new(
    Vec::new(),
    logs,
    clock.clone(),
    DispatchPolicy::default(),
  ));
  let service = OrderService::new(
    Ports::from_store(store.clone()),
    Arc::new(Outbox::inline(dispatcher)),
    Arc::new(StatusBroadcaster::new()),
    clock,
    OrderPolicy::default(),
  );

  let menu = service.menu().await?;
  let Some(pizza) = menu.iter().find(|item| item.name == "Margherita") else {
    return Err(OrderError::Validation("demo menu has no Margherita".to_string()));
  };
  let large = pizza.variants.iter().find(|v| v.label == "Large").map(|v| SelectionRef::Id(v.id));
  let cheese = pizza.addons.first().map(|a| SelectionRef::Id(a.id));

  let request = PlaceOrderRequest {
    items: vec![Unverified::new(LineRequest {
      item_id: pizza.id,
      quantity: 2,
      variants: large.into_iter().collect(),
      addons: cheese.into_iter().collect(),
      options: serde_json::Value::Null,
    })],
    total: None,
    address_id: None,
    guest_address: Some(GuestDetails {
      name: "Asha Rao".to_string(),
      phone: "+91 98765 43210".to_string(),
      address: "12 MG Road, Bengaluru".to_string(),
    }),
    payment_method: PaymentMethod::Cod,
    payment_status: PaymentStatus::Pending,
    coupon_code: Some("welcome10".to_string()),
    order_type: Default::default(),
    scheduled_for: None,
  };

  let order = service.place_order(Caller::Guest, request).await?;
  info!(order_number = order.order_number, total = %order.total, "Order placed");

  for status in [
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::Baking,
    OrderStatus::ReadyForPickup,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
  ] {
    let updated = service.update_status(Caller::Admin, order.id, status).await?;
    info!(status = %updated.status, "Status updated");
  }

  let invoice = service.invoice_document(Caller::Admin, order.id, None).await?;
  println!("{}\n{}", invoice.file_name, invoice.body);

  for entry in store.notification_logs() {
    println!("{:<22} {:<9} {:?}", entry.event.as_str(), entry.channel.as_str(), entry.status);
  }
  Ok(())
}

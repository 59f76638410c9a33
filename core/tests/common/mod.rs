// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use slicehouse::checkout::{LineRequest, SelectionRef, Unverified};
use slicehouse::model::{Addon, Channel, Coupon, CouponKind, Item, PaymentMethod, PaymentStatus, Variant};
use slicehouse::notify::{
  DispatchPolicy, Delivery, NotificationDispatcher, NotificationProvider, Outbox, OutboundMessage, ProviderError,
};
use slicehouse::store::{MemoryStore, NotificationLogRepository};
use slicehouse::{FixedClock, GuestDetails, OrderPolicy, OrderService, PlaceOrderRequest, Ports, StatusBroadcaster};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn march_noon() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

// --- Fake providers ---

/// Answers with a fixed result and counts calls.
pub struct ScriptedProvider {
  pub channel: Channel,
  pub enabled: bool,
  /// Number of leading calls that fail before the provider starts succeeding.
  pub failures_before_success: u32,
  pub delivery: Delivery,
  pub calls: AtomicU32,
}

impl ScriptedProvider {
  pub fn ok(channel: Channel) -> Arc<Self> {
    Arc::new(Self {
      channel,
      enabled: true,
      failures_before_success: 0,
      delivery: Delivery::Sent,
      calls: AtomicU32::new(0),
    })
  }

  pub fn queued(channel: Channel) -> Arc<Self> {
    Arc::new(Self {
      delivery: Delivery::Queued,
      ..Self::plain(channel)
    })
  }

  pub fn failing(channel: Channel) -> Arc<Self> {
    Arc::new(Self {
      failures_before_success: u32::MAX,
      ..Self::plain(channel)
    })
  }

  pub fn flaky(channel: Channel, failures: u32) -> Arc<Self> {
    Arc::new(Self {
      failures_before_success: failures,
      ..Self::plain(channel)
    })
  }

  pub fn disabled(channel: Channel) -> Arc<Self> {
    Arc::new(Self {
      enabled: false,
      ..Self::plain(channel)
    })
  }

  fn plain(channel: Channel) -> Self {
    Self {
      channel,
      enabled: true,
      failures_before_success: 0,
      delivery: Delivery::Sent,
      calls: AtomicU32::new(0),
    }
  }

  pub fn calls(&self) -> u32 {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl NotificationProvider for ScriptedProvider {
  fn channel(&self) -> Channel {
    self.channel
  }

  fn is_enabled(&self) -> bool {
    self.enabled
  }

  async fn send(&self, _message: &OutboundMessage) -> Result<Delivery, ProviderError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if call < self.failures_before_success {
      return Err(ProviderError::Transport("gateway returned 502".to_string()));
    }
    Ok(self.delivery)
  }
}

/// Never answers within any reasonable timeout.
pub struct HangingProvider {
  pub channel: Channel,
}

#[async_trait]
impl NotificationProvider for HangingProvider {
  fn channel(&self) -> Channel {
    self.channel
  }

  async fn send(&self, _message: &OutboundMessage) -> Result<Delivery, ProviderError> {
    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    Ok(Delivery::Sent)
  }
}

/// Panics inside `send`.
pub struct PanickingProvider {
  pub channel: Channel,
}

#[async_trait]
impl NotificationProvider for PanickingProvider {
  fn channel(&self) -> Channel {
    self.channel
  }

  async fn send(&self, _message: &OutboundMessage) -> Result<Delivery, ProviderError> {
    panic!("gateway client bug");
  }
}

// --- Harness ---

pub struct Harness {
  pub store: Arc<MemoryStore>,
  pub clock: Arc<FixedClock>,
  pub broadcaster: Arc<StatusBroadcaster>,
  pub service: OrderService,
}

pub fn fast_dispatch() -> DispatchPolicy {
  DispatchPolicy {
    timeout: std::time::Duration::from_millis(50),
    max_attempts: 2,
  }
}

impl Harness {
  pub fn new() -> Self {
    Self::with(Vec::new(), OrderPolicy::default())
  }

  pub fn with_policy(policy: OrderPolicy) -> Self {
    Self::with(Vec::new(), policy)
  }

  pub fn with_providers(providers: Vec<Arc<dyn NotificationProvider>>) -> Self {
    Self::with(providers, OrderPolicy::default())
  }

  /// Notifications dispatch inline so tests can assert on logs right after
  /// the call returns.
  pub fn with(providers: Vec<Arc<dyn NotificationProvider>>, policy: OrderPolicy) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(march_noon()));
    let broadcaster = Arc::new(StatusBroadcaster::new());
    let logs: Arc<dyn NotificationLogRepository> = store.clone();
    let dispatcher = Arc::new(NotificationDispatcher::new(providers, logs, clock.clone(), fast_dispatch()));
    let service = OrderService::new(
      Ports::from_store(store.clone()),
      Arc::new(Outbox::inline(dispatcher)),
      broadcaster.clone(),
      clock.clone(),
      policy,
    );
    Self {
      store,
      clock,
      broadcaster,
      service,
    }
  }
}

// --- Fixtures ---

/// Base 200, one `Large` variant at 350, one `Extra cheese` addon at 50.
pub fn margherita() -> Item {
  let id = Uuid::new_v4();
  Item {
    id,
    name: "Margherita".to_string(),
    price: dec!(200),
    is_available: true,
    stock: 0,
    is_stock_managed: false,
    variants: vec![Variant {
      id: Uuid::new_v4(),
      item_id: id,
      variant_type: "SIZE".to_string(),
      label: "Large".to_string(),
      price: dec!(350),
      is_available: true,
    }],
    addons: vec![Addon {
      id: Uuid::new_v4(),
      item_id: id,
      name: "Extra cheese".to_string(),
      price: dec!(50),
    }],
  }
}

pub fn plain_item(name: &str, price: Decimal) -> Item {
  Item {
    id: Uuid::new_v4(),
    name: name.to_string(),
    price,
    is_available: true,
    stock: 0,
    is_stock_managed: false,
    variants: Vec::new(),
    addons: Vec::new(),
  }
}

pub fn coupon(code: &str, kind: CouponKind, value: Decimal, usage_limit: Option<i32>) -> Coupon {
  Coupon {
    code: code.to_string(),
    kind,
    value,
    expires_at: march_noon() + Duration::days(30),
    is_active: true,
    usage_limit,
    used_count: 0,
  }
}

pub fn line(item: &Item, quantity: i32) -> Unverified<LineRequest> {
  line_with(item, quantity, Vec::new(), Vec::new())
}

pub fn line_with(item: &Item, quantity: i32, variants: Vec<Uuid>, addons: Vec<Uuid>) -> Unverified<LineRequest> {
  Unverified::new(LineRequest {
    item_id: item.id,
    quantity,
    variants: variants.into_iter().map(SelectionRef::Id).collect(),
    addons: addons.into_iter().map(SelectionRef::Id).collect(),
    options: serde_json::Value::Null,
  })
}

pub fn guest() -> GuestDetails {
  GuestDetails {
    name: "Asha Rao".to_string(),
    phone: "+91 98765 43210".to_string(),
    address: "12 MG Road, Bengaluru".to_string(),
  }
}

pub fn guest_order(items: Vec<Unverified<LineRequest>>) -> PlaceOrderRequest {
  PlaceOrderRequest {
    items,
    total: None,
    address_id: None,
    guest_address: Some(guest()),
    payment_method: PaymentMethod::Cod,
    payment_status: PaymentStatus::Pending,
    coupon_code: None,
    order_type: Default::default(),
    scheduled_for: None,
  }
}

// --- Step engine fixtures ---

use slicehouse::{ContextData, PipelineControl, PipelineError};

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("engine error: {0}")]
  Engine(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<PipelineError> for TestError {
  fn from(e: PipelineError) -> Self {
    TestError::Engine(format!("{:?}", e))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> slicehouse::pipeline::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> slicehouse::pipeline::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

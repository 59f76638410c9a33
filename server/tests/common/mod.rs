// tests/common/mod.rs
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use slicehouse::model::{Addon, Coupon, CouponKind, Item, Variant};
use slicehouse::notify::NotificationProvider;
use slicehouse::store::{MemoryStore, NotificationLogRepository};
use slicehouse::{FixedClock, Ports};
use slicehouse_server::config::AppConfig;
use slicehouse_server::state::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key";
pub const GUEST_PHONE: &str = "+91 98765 43210";

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

pub fn config_with(overrides: &[(&str, &str)]) -> AppConfig {
  let mut vars: HashMap<String, String> = HashMap::from([
    ("STORE_BACKEND".to_string(), "memory".to_string()),
    ("ADMIN_API_KEY".to_string(), ADMIN_KEY.to_string()),
  ]);
  for (k, v) in overrides {
    vars.insert((*k).to_string(), (*v).to_string());
  }
  AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

/// Ids of the fixture menu.
#[derive(Debug, Clone, Copy)]
pub struct Menu {
  pub margherita: Uuid,
  pub large: Uuid,
  pub extra_cheese: Uuid,
  pub garlic_bread: Uuid,
}

pub struct TestApp {
  pub store: Arc<MemoryStore>,
  pub clock: Arc<FixedClock>,
  pub state: AppState,
  pub menu: Menu,
}

impl TestApp {
  pub fn new() -> Self {
    Self::with_config(config_with(&[]))
  }

  /// Memory store, fixed clock, inline notification dispatch with only the
  /// log provider.
  pub fn with_config(config: AppConfig) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let menu = seed_menu(&store);
    let clock = Arc::new(FixedClock::new(march_noon()));
    let logs: Arc<dyn NotificationLogRepository> = store.clone();
    let providers: Vec<Arc<dyn NotificationProvider>> = Vec::new();
    let state = AppState::inline(
      Arc::new(config),
      Ports::from_store(store.clone()),
      logs,
      providers,
      clock.clone(),
    );
    Self {
      store,
      clock,
      state,
      menu,
    }
  }
}

fn seed_menu(store: &MemoryStore) -> Menu {
  let margherita = Uuid::new_v4();
  let large = Uuid::new_v4();
  let extra_cheese = Uuid::new_v4();
  store.insert_item(Item {
    id: margherita,
    name: "Margherita".to_string(),
    price: dec!(200),
    is_available: true,
    stock: 0,
    is_stock_managed: false,
    variants: vec![Variant {
      id: large,
      item_id: margherita,
      variant_type: "SIZE".to_string(),
      label: "Large".to_string(),
      price: dec!(350),
      is_available: true,
    }],
    addons: vec![Addon {
      id: extra_cheese,
      item_id: margherita,
      name: "Extra cheese".to_string(),
      price: dec!(50),
    }],
  });

  let garlic_bread = Uuid::new_v4();
  store.insert_item(Item {
    id: garlic_bread,
    name: "Garlic Breadsticks".to_string(),
    price: dec!(129),
    is_available: true,
    stock: 3,
    is_stock_managed: true,
    variants: Vec::new(),
    addons: Vec::new(),
  });

  store.insert_coupon(Coupon {
    code: "WELCOME10".to_string(),
    kind: CouponKind::Percentage,
    value: dec!(10),
    expires_at: march_noon() + Duration::days(30),
    is_active: true,
    usage_limit: None,
    used_count: 0,
  });
  store.insert_coupon(Coupon {
    code: "LASTYEAR".to_string(),
    kind: CouponKind::Flat,
    value: dec!(100),
    expires_at: march_noon() - Duration::days(1),
    is_active: true,
    usage_limit: None,
    used_count: 0,
  });

  Menu {
    margherita,
    large,
    extra_cheese,
    garlic_bread,
  }
}

/// Builds the actix test service over `$state` with the production routes
/// and JSON error handling.
#[macro_export]
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .app_data(actix_web::web::JsonConfig::default().error_handler(slicehouse_server::errors::json_error_handler))
        .configure(slicehouse_server::web::configure_app_routes),
    )
    .await
  };
}

pub fn pizza_order(menu: &Menu) -> serde_json::Value {
  serde_json::json!({
    "items": [{
      "itemId": menu.margherita,
      "quantity": 2,
      "price": 1,
      "variants": [{ "id": menu.large, "price": 1 }],
      "addons": [menu.extra_cheese]
    }],
    "total": 2,
    "guestAddress": { "name": "Asha Rao", "phone": GUEST_PHONE, "address": "12 MG Road, Bengaluru" },
    "paymentMethod": "COD"
  })
}

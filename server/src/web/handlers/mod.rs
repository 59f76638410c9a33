// slicehouse_server/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod coupon_handlers;
pub mod live_handlers;
pub mod menu_handlers;
pub mod order_handlers;

use serde::Deserialize;

/// `?phone=` used by guests to prove they own an order.
#[derive(Debug, Default, Deserialize)]
pub struct PhoneQuery {
  pub phone: Option<String>,
}

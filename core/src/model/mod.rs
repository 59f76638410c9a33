// slicehouse/src/model/mod.rs

//! Data structures shared by the pipeline, the ports and the HTTP layer.

pub mod catalog;
pub mod coupon;
pub mod notification;
pub mod order;

pub use catalog::{Addon, Item, Variant};
pub use coupon::{Coupon, CouponKind};
pub use notification::{Channel, NotificationEvent, NotificationLog, NotificationStatus};
pub use order::{
  CustomerSnapshot, Order, OrderDraft, OrderItem, OrderLineDraft, OrderStatus, OrderType, PaymentMethod,
  PaymentStatus, SelectedAddon, SelectedVariant, TaxBreakup,
};

// slicehouse/src/checkout/mod.rs

//! Turning a storefront cart into a priced, taxed order.

pub mod discount;
pub mod placement;
pub mod pricing;
pub mod schedule;
pub mod tax;

pub use discount::{validate_coupon, AppliedCoupon};
pub use placement::{GuestDetails, PlaceOrderRequest};
pub use pricing::{price_cart, LineRequest, PricedCart, PricedLine, SelectionRef, Unverified};
pub use schedule::initial_status;
pub use tax::{compute_totals, round_money, OrderTotals};

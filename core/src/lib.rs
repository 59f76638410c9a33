// slicehouse/src/lib.rs

//! Slicehouse: the order core of a pizza storefront.
//!
//! Carts are repriced from the catalog, coupons validated and redeemed
//! atomically with order creation, GST split into CGST and SGST, invoices
//! numbered, and status changes pushed to a state machine that drives
//! notifications and live updates.
//!
//! Placement and status changes run on a small step engine (`pipeline`):
//! named steps with `before`/`on`/`after` hooks over a shared `ContextData`.

pub mod broadcast;
pub mod checkout;
pub mod clock;
pub mod error;
pub mod model;
pub mod notify;
pub mod orders;
pub mod pipeline;
pub mod policy;
pub mod store;

pub use crate::broadcast::{StatusBroadcaster, StatusEvent};
pub use crate::checkout::{GuestDetails, PlaceOrderRequest};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::error::{OrderError, OrderResult, PipelineError, StoreError};
pub use crate::orders::{Caller, OrderService, Ports};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::policy::OrderPolicy;

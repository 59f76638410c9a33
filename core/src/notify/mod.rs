// slicehouse/src/notify/mod.rs

//! Customer notifications: templates, channel providers, the fan-out
//! dispatcher and the outbox that keeps dispatch off the request path.

pub mod dispatcher;
pub mod outbox;
pub mod provider;
pub mod templates;

pub use dispatcher::{DispatchPolicy, NotificationDispatcher};
pub use outbox::{Outbox, OutboxJob};
pub use provider::{Delivery, LogProvider, NotificationProvider, OutboundMessage, ProviderError};
pub use templates::NotificationPayload;

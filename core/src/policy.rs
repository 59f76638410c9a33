// slicehouse/src/policy.rs

//! Business knobs handed to the order service at construction. The library
//! never reads the environment; the server builds this from its config.

use crate::checkout::schedule::DEFAULT_MIN_LEAD_MINUTES;
use crate::orders::invoice::InvoiceHeader;
use crate::orders::repeat::AddonRepricing;
use crate::orders::status::TransitionPolicy;
use chrono::Duration;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct OrderPolicy {
  /// Full GST percentage; CGST and SGST get half each.
  pub gst_rate: Decimal,
  pub min_schedule_lead: Duration,
  pub transitions: TransitionPolicy,
  pub addon_repricing: AddonRepricing,
  pub invoice: InvoiceHeader,
}

impl Default for OrderPolicy {
  fn default() -> Self {
    Self {
      gst_rate: Decimal::from(5),
      min_schedule_lead: Duration::minutes(DEFAULT_MIN_LEAD_MINUTES),
      transitions: TransitionPolicy::default(),
      addon_repricing: AddonRepricing::default(),
      invoice: InvoiceHeader::default(),
    }
  }
}

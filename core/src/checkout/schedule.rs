// slicehouse/src/checkout/schedule.rs

use crate::error::{OrderError, OrderResult};
use crate::model::{OrderStatus, OrderType};
use chrono::{DateTime, Duration, Utc};

/// Default minimum gap, in minutes, between placing a scheduled order and its slot.
pub const DEFAULT_MIN_LEAD_MINUTES: i64 = 30;

/// Decides the initial status and the stored slot for an order.
///
/// Instant orders start `PENDING` and drop any slot the client sent.
/// Scheduled orders need a slot at least `min_lead` after `now` and start
/// `SCHEDULED`.
pub fn initial_status(
  order_type: OrderType,
  scheduled_for: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
  min_lead: Duration,
) -> OrderResult<(OrderStatus, Option<DateTime<Utc>>)> {
  match order_type {
    OrderType::Instant => Ok((OrderStatus::Pending, None)),
    OrderType::Scheduled => {
      let slot = scheduled_for.ok_or_else(|| {
        OrderError::Validation("scheduledFor is required for scheduled orders".to_string())
      })?;
      if slot < now + min_lead {
        return Err(OrderError::ScheduleTooSoon {
          min_lead_minutes: min_lead.num_minutes(),
        });
      }
      Ok((OrderStatus::Scheduled, Some(slot)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn instant_orders_start_pending_without_slot() {
    let now = Utc::now();
    let (status, slot) = initial_status(OrderType::Instant, Some(now), now, Duration::minutes(DEFAULT_MIN_LEAD_MINUTES)).unwrap();
    assert_eq!(status, OrderStatus::Pending);
    assert!(slot.is_none());
  }

  #[test]
  fn scheduled_orders_need_thirty_minutes_lead() {
    let now = Utc::now();
    let too_soon = initial_status(OrderType::Scheduled, Some(now + Duration::minutes(29)), now, Duration::minutes(DEFAULT_MIN_LEAD_MINUTES));
    match too_soon {
      Err(OrderError::ScheduleTooSoon { min_lead_minutes }) => assert_eq!(min_lead_minutes, 30),
      other => panic!("expected lead-time rejection, got {:?}", other),
    }

    let exact = now + Duration::minutes(30);
    let (status, slot) = initial_status(OrderType::Scheduled, Some(exact), now, Duration::minutes(DEFAULT_MIN_LEAD_MINUTES)).unwrap();
    assert_eq!(status, OrderStatus::Scheduled);
    assert_eq!(slot, Some(exact));
  }

  #[test]
  fn scheduled_orders_require_a_slot() {
    let now = Utc::now();
    assert!(matches!(
      initial_status(OrderType::Scheduled, None, now, Duration::minutes(DEFAULT_MIN_LEAD_MINUTES)),
      Err(OrderError::Validation(_))
    ));
  }
}

// slicehouse/src/orders/status.rs

//! The order lifecycle: which moves are legal, which moves notify the
//! customer, and where an order sits on the kitchen board.

use crate::error::{OrderError, OrderResult};
use crate::model::{NotificationEvent, OrderStatus};
use serde::Serialize;

impl OrderStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  /// Forward moves allowed from this state. `Cancelled` is handled separately.
  fn forward(&self) -> &'static [OrderStatus] {
    match self {
      OrderStatus::Scheduled => &[OrderStatus::Pending],
      OrderStatus::Pending => &[OrderStatus::Accepted],
      OrderStatus::Accepted => &[OrderStatus::Preparing],
      OrderStatus::Preparing => &[OrderStatus::Baking],
      OrderStatus::Baking => &[OrderStatus::ReadyForPickup],
      // Collected at the counter skips the rider.
      OrderStatus::ReadyForPickup => &[OrderStatus::OutForDelivery, OrderStatus::Delivered],
      OrderStatus::OutForDelivery => &[OrderStatus::Delivered],
      OrderStatus::Delivered | OrderStatus::Cancelled => &[],
    }
  }

  pub fn can_transition_to(&self, next: OrderStatus) -> bool {
    if self.is_terminal() {
      return false;
    }
    next == OrderStatus::Cancelled || self.forward().contains(&next)
  }

  /// Customer notification emitted when an order enters this state.
  pub fn notification_event(&self) -> Option<NotificationEvent> {
    match self {
      OrderStatus::Accepted => Some(NotificationEvent::OrderAccepted),
      OrderStatus::Preparing => Some(NotificationEvent::OrderPreparing),
      OrderStatus::OutForDelivery => Some(NotificationEvent::OutForDelivery),
      OrderStatus::Delivered => Some(NotificationEvent::OrderDelivered),
      _ => None,
    }
  }
}

/// How strictly status updates follow the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
  #[default]
  Strict,
  /// Any status may be set from any status. For manual corrections by staff.
  Permissive,
}

impl TransitionPolicy {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "strict" => Some(TransitionPolicy::Strict),
      "permissive" => Some(TransitionPolicy::Permissive),
      _ => None,
    }
  }

  pub fn check(&self, from: OrderStatus, to: OrderStatus) -> OrderResult<()> {
    match self {
      TransitionPolicy::Permissive => Ok(()),
      TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
      TransitionPolicy::Strict => Err(OrderError::InvalidTransition { from, to }),
    }
  }
}

/// Columns of the kitchen board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenColumn {
  New,
  Preparing,
  Oven,
  Ready,
  Dispatched,
}

impl KitchenColumn {
  pub const ALL: [KitchenColumn; 5] = [
    KitchenColumn::New,
    KitchenColumn::Preparing,
    KitchenColumn::Oven,
    KitchenColumn::Ready,
    KitchenColumn::Dispatched,
  ];

  /// Scheduled orders are not on the board until released, finished ones
  /// have left it.
  pub fn for_status(status: OrderStatus) -> Option<Self> {
    match status {
      OrderStatus::Pending | OrderStatus::Accepted => Some(KitchenColumn::New),
      OrderStatus::Preparing => Some(KitchenColumn::Preparing),
      OrderStatus::Baking => Some(KitchenColumn::Oven),
      OrderStatus::ReadyForPickup => Some(KitchenColumn::Ready),
      OrderStatus::OutForDelivery => Some(KitchenColumn::Dispatched),
      OrderStatus::Scheduled | OrderStatus::Delivered | OrderStatus::Cancelled => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn happy_path_walks_forward_one_step_at_a_time() {
    let path = [
      OrderStatus::Scheduled,
      OrderStatus::Pending,
      OrderStatus::Accepted,
      OrderStatus::Preparing,
      OrderStatus::Baking,
      OrderStatus::ReadyForPickup,
      OrderStatus::OutForDelivery,
      OrderStatus::Delivered,
    ];
    for pair in path.windows(2) {
      assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
      assert!(!pair[1].can_transition_to(pair[0]), "{} -> {}", pair[1], pair[0]);
    }
    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Baking));
  }

  #[test]
  fn cancellation_only_from_live_states() {
    for status in OrderStatus::ALL {
      assert_eq!(status.can_transition_to(OrderStatus::Cancelled), !status.is_terminal());
    }
  }

  #[test]
  fn strict_rejects_and_permissive_allows() {
    let err = TransitionPolicy::Strict
      .check(OrderStatus::Delivered, OrderStatus::Pending)
      .unwrap_err();
    assert!(matches!(
      err,
      OrderError::InvalidTransition {
        from: OrderStatus::Delivered,
        to: OrderStatus::Pending
      }
    ));
    assert!(TransitionPolicy::Permissive
      .check(OrderStatus::Delivered, OrderStatus::Pending)
      .is_ok());
  }

  #[test]
  fn only_four_states_notify() {
    let notifying: Vec<_> = OrderStatus::ALL
      .into_iter()
      .filter(|s| s.notification_event().is_some())
      .collect();
    assert_eq!(
      notifying,
      vec![
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered
      ]
    );
  }

  #[test]
  fn board_excludes_scheduled_and_finished_orders() {
    assert_eq!(KitchenColumn::for_status(OrderStatus::Baking), Some(KitchenColumn::Oven));
    assert_eq!(KitchenColumn::for_status(OrderStatus::Scheduled), None);
    assert_eq!(KitchenColumn::for_status(OrderStatus::Cancelled), None);
  }
}

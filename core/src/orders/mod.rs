// slicehouse/src/orders/mod.rs

pub mod invoice;
pub mod kitchen;
pub mod repeat;
pub mod service;
pub mod status;
pub mod transition;

use crate::error::{OrderError, OrderResult};
use crate::model::Order;
use uuid::Uuid;

pub use kitchen::KitchenBoard;
pub use repeat::{AddonRepricing, RepeatCart, RepeatRequest};
pub use service::{InvoiceDocument, OrderService, Ports};
pub use status::{KitchenColumn, TransitionPolicy};

/// Who is calling. How the caller was identified is the server's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
  Admin,
  User(Uuid),
  Guest,
}

impl Caller {
  pub fn is_admin(&self) -> bool {
    matches!(self, Caller::Admin)
  }

  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Caller::User(id) => Some(*id),
      _ => None,
    }
  }
}

/// Digits of a phone number, keeping the last ten so that a country prefix
/// does not matter.
pub fn phone_digits(phone: &str) -> String {
  let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
  let start = digits.len().saturating_sub(10);
  digits[start..].iter().collect()
}

/// Registered-user orders belong to that user; guest orders to whoever knows
/// the phone number. Admins see everything.
pub fn ensure_can_access(order: &Order, caller: Caller, phone: Option<&str>) -> OrderResult<()> {
  if caller.is_admin() {
    return Ok(());
  }
  match order.user_id {
    Some(owner) if caller.user_id() == Some(owner) => Ok(()),
    Some(_) => Err(OrderError::Forbidden("This order belongs to another account".to_string())),
    None => {
      let given = phone.map(phone_digits).unwrap_or_default();
      if !given.is_empty() && given == phone_digits(&order.customer.phone) {
        Ok(())
      } else {
        Err(OrderError::Forbidden("Phone number does not match this order".to_string()))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phone_digits_ignore_formatting_and_country_code() {
    assert_eq!(phone_digits("+91 98765-43210"), "9876543210");
    assert_eq!(phone_digits("09876543210"), "9876543210");
    assert_eq!(phone_digits("12345"), "12345");
    assert_eq!(phone_digits("n/a"), "");
  }
}

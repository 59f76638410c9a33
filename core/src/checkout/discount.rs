// slicehouse/src/checkout/discount.rs

use crate::checkout::tax::round_money;
use crate::error::{OrderError, OrderResult};
use crate::model::{Coupon, CouponKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A coupon that passed validation, with the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
  pub code: String,
  pub kind: CouponKind,
  pub discount: Decimal,
}

/// Raw discount before clamping, rounded to paise.
pub fn discount_for(kind: CouponKind, value: Decimal, subtotal: Decimal) -> Decimal {
  let raw = match kind {
    CouponKind::Percentage => subtotal * value / Decimal::ONE_HUNDRED,
    CouponKind::Flat => value,
  };
  round_money(raw.max(Decimal::ZERO))
}

/// Validates `coupon` (as looked up for the requested code) against the
/// subtotal at time `now`. Does not touch `used_count`.
pub fn validate_coupon(coupon: Option<&Coupon>, subtotal: Decimal, now: DateTime<Utc>) -> OrderResult<AppliedCoupon> {
  let coupon = coupon.ok_or(OrderError::CouponNotFound)?;
  if !coupon.is_active {
    return Err(OrderError::CouponInactive {
      code: coupon.code.clone(),
    });
  }
  if now > coupon.expires_at {
    return Err(OrderError::CouponExpired {
      code: coupon.code.clone(),
    });
  }
  if coupon.is_exhausted() {
    return Err(OrderError::CouponUsageLimitReached {
      code: coupon.code.clone(),
    });
  }

  let discount = discount_for(coupon.kind, coupon.value, subtotal).min(subtotal.max(Decimal::ZERO));
  Ok(AppliedCoupon {
    code: coupon.code.clone(),
    kind: coupon.kind,
    discount,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use rust_decimal_macros::dec;

  fn coupon(kind: CouponKind, value: Decimal) -> Coupon {
    Coupon {
      code: "PIZZA".to_string(),
      kind,
      value,
      expires_at: Utc::now() + Duration::days(7),
      is_active: true,
      usage_limit: Some(10),
      used_count: 0,
    }
  }

  #[test]
  fn percentage_discount_is_share_of_subtotal() {
    let applied = validate_coupon(Some(&coupon(CouponKind::Percentage, dec!(10))), dec!(450), Utc::now()).unwrap();
    assert_eq!(applied.discount, dec!(45));
  }

  #[test]
  fn flat_discount_clamps_to_subtotal() {
    let applied = validate_coupon(Some(&coupon(CouponKind::Flat, dec!(600))), dec!(500), Utc::now()).unwrap();
    assert_eq!(applied.discount, dec!(500));
  }

  #[test]
  fn percentage_discount_rounds_to_paise() {
    assert_eq!(discount_for(CouponKind::Percentage, dec!(15), dec!(333.33)), dec!(50.00));
    assert_eq!(discount_for(CouponKind::Percentage, dec!(12.5), dec!(99.99)), dec!(12.50));
  }

  #[test]
  fn distinct_rejections() {
    let now = Utc::now();
    assert!(matches!(
      validate_coupon(None, dec!(100), now),
      Err(OrderError::CouponNotFound)
    ));

    let mut inactive = coupon(CouponKind::Flat, dec!(50));
    inactive.is_active = false;
    assert!(matches!(
      validate_coupon(Some(&inactive), dec!(100), now),
      Err(OrderError::CouponInactive { .. })
    ));

    let mut expired = coupon(CouponKind::Flat, dec!(50));
    expired.expires_at = now - Duration::seconds(1);
    assert!(matches!(
      validate_coupon(Some(&expired), dec!(100), now),
      Err(OrderError::CouponExpired { .. })
    ));

    let mut spent = coupon(CouponKind::Flat, dec!(50));
    spent.used_count = 10;
    assert!(matches!(
      validate_coupon(Some(&spent), dec!(100), now),
      Err(OrderError::CouponUsageLimitReached { .. })
    ));
  }

  #[test]
  fn unlimited_coupon_never_exhausts() {
    let mut open = coupon(CouponKind::Flat, dec!(50));
    open.usage_limit = None;
    open.used_count = 10_000;
    assert!(validate_coupon(Some(&open), dec!(100), Utc::now()).is_ok());
  }
}

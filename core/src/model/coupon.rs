// slicehouse/src/model/coupon.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
  Flat,
  Percentage,
}

impl CouponKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      CouponKind::Flat => "FLAT",
      CouponKind::Percentage => "PERCENTAGE",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.to_ascii_uppercase().as_str() {
      "FLAT" => Some(CouponKind::Flat),
      "PERCENTAGE" => Some(CouponKind::Percentage),
      _ => None,
    }
  }
}

/// A discount code. `used_count` only ever grows, and never past
/// `usage_limit` when one is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
  pub code: String,
  #[serde(rename = "type")]
  pub kind: CouponKind,
  pub value: Decimal,
  pub expires_at: DateTime<Utc>,
  pub is_active: bool,
  pub usage_limit: Option<i32>,
  pub used_count: i32,
}

impl Coupon {
  /// Codes are stored and compared upper-case with surrounding space removed.
  pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
  }

  pub fn is_exhausted(&self) -> bool {
    matches!(self.usage_limit, Some(limit) if self.used_count >= limit)
  }
}

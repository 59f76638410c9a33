// slicehouse/src/checkout/tax.rs

//! Split GST. CGST and SGST are rounded independently before being summed;
//! stored breakups are reconciled against invoices with exactly this order.

use crate::model::TaxBreakup;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Rounds to two decimal places, half away from zero. The result always
/// carries scale 2, so `20` comes back as `20.00`.
pub fn round_money(amount: Decimal) -> Decimal {
  let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  rounded.rescale(2);
  rounded
}

/// Amounts that make up an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub taxable_amount: Decimal,
  pub tax: TaxBreakup,
  pub total: Decimal,
}

/// Computes the split tax on `subtotal - discount` at `gst_rate` percent.
pub fn compute_totals(subtotal: Decimal, discount: Decimal, gst_rate: Decimal) -> OrderTotals {
  let taxable_amount = (subtotal - discount).max(Decimal::ZERO);
  let half_rate = gst_rate / Decimal::TWO;

  let cgst_amount = round_money(taxable_amount * half_rate / Decimal::ONE_HUNDRED);
  let sgst_amount = round_money(taxable_amount * half_rate / Decimal::ONE_HUNDRED);
  let total_tax = cgst_amount + sgst_amount;

  OrderTotals {
    subtotal,
    discount,
    taxable_amount,
    tax: TaxBreakup {
      cgst_rate: half_rate,
      cgst_amount,
      sgst_rate: half_rate,
      sgst_amount,
      total_tax,
    },
    total: round_money(taxable_amount + total_tax),
  }
}

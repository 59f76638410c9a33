// slicehouse/src/orders/invoice.rs

use crate::model::Order;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt::{self, Write as _};

/// `INV-{YYYYMM}-{order_number:05}`, the month taken from creation time in UTC.
///
/// Pure in both inputs, so re-deriving a stored number always agrees with it.
pub fn invoice_number(order_number: i64, created_at: DateTime<Utc>) -> String {
  format!("INV-{}-{:05}", created_at.format("%Y%m"), order_number)
}

/// Seller details printed on every invoice.
#[derive(Debug, Clone)]
pub struct InvoiceHeader {
  pub store_name: String,
  pub gstin: Option<String>,
}

impl Default for InvoiceHeader {
  fn default() -> Self {
    Self {
      store_name: "Slicehouse Pizzeria".to_string(),
      gstin: None,
    }
  }
}

fn money(amount: Decimal) -> String {
  format!("{:.2}", amount)
}

/// Renders a plain-text tax invoice from stored order data only.
///
/// Amounts come from the order row and its tax breakup as persisted, never
/// recomputed, so a re-rendered invoice matches the original.
pub fn render_invoice(order: &Order, header: &InvoiceHeader) -> String {
  let number = order
    .invoice_number
    .clone()
    .unwrap_or_else(|| invoice_number(order.order_number, order.created_at));

  let mut out = String::new();
  // Writing into a `String` cannot fail.
  let _ = write_invoice(&mut out, order, header, &number);
  out
}

fn write_invoice(out: &mut String, order: &Order, header: &InvoiceHeader, number: &str) -> fmt::Result {
  writeln!(out, "{}", header.store_name)?;
  if let Some(gstin) = &header.gstin {
    writeln!(out, "GSTIN: {}", gstin)?;
  }
  writeln!(out, "TAX INVOICE {}", number)?;
  writeln!(out, "Order #{}  Date: {}", order.order_number, order.created_at.format("%Y-%m-%d %H:%M UTC"))?;
  writeln!(out, "Bill to: {}, {}", order.customer.name, order.customer.phone)?;
  writeln!(out, "         {}", order.customer.address)?;
  writeln!(out)?;
  writeln!(out, "{:<32} {:>5} {:>10} {:>11}", "Item", "Qty", "Rate", "Amount")?;

  for line in &order.items {
    writeln!(
      out,
      "{:<32} {:>5} {:>10} {:>11}",
      line.name,
      line.quantity,
      money(line.price),
      money(line.line_total())
    )?;
    for variant in &line.variants {
      writeln!(out, "  {}: {}", variant.variant_type, variant.label)?;
    }
    for addon in &line.addons {
      writeln!(out, "  + {}", addon.name)?;
    }
  }

  let tax = &order.tax_breakup;
  writeln!(out)?;
  writeln!(out, "{:<49} {:>11}", "Subtotal", money(order.subtotal))?;
  if order.discount > Decimal::ZERO {
    let label = match &order.coupon_code {
      Some(code) => format!("Discount ({})", code),
      None => "Discount".to_string(),
    };
    writeln!(out, "{:<49} {:>11}", label, format!("-{}", money(order.discount)))?;
  }
  writeln!(out, "{:<49} {:>11}", format!("CGST @ {}%", tax.cgst_rate.normalize()), money(tax.cgst_amount))?;
  writeln!(out, "{:<49} {:>11}", format!("SGST @ {}%", tax.sgst_rate.normalize()), money(tax.sgst_amount))?;
  writeln!(out, "{:<49} {:>11}", "Total", money(order.total))?;
  writeln!(out, "Payment: {} ({})", order.payment_method.as_str(), order.payment_status.as_str())?;
  Ok(())
}

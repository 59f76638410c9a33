// slicehouse/src/orders/repeat.rs

//! Rebuilds a cart from a past order against today's catalog.
//!
//! Unlike placement this never fails on a line: whatever can no longer be
//! ordered is dropped and explained in `warnings`.

use crate::checkout::pricing::unit_price;
use crate::model::{Item, Order, OrderItem, SelectedAddon, SelectedVariant};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Where repeat orders take addon prices from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddonRepricing {
  /// Price recorded on the original order. Variants are still repriced, so
  /// the two axes disagree on freshness; kept for parity with existing carts.
  #[default]
  Historical,
  /// Price from the current catalog, like variants.
  Current,
}

impl AddonRepricing {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "historical" => Some(AddonRepricing::Historical),
      "current" => Some(AddonRepricing::Current),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRequest {
  pub order_id: Uuid,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatLine {
  pub item_id: Uuid,
  pub name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub line_total: Decimal,
  pub variants: Vec<SelectedVariant>,
  pub addons: Vec<SelectedAddon>,
  pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepeatCart {
  pub items: Vec<RepeatLine>,
  pub subtotal: Decimal,
  pub warnings: Vec<String>,
}

pub fn rebuild_cart(order: &Order, catalog: &HashMap<Uuid, Item>, addon_pricing: AddonRepricing) -> RepeatCart {
  let mut cart = RepeatCart::default();
  for original in &order.items {
    if let Some(line) = rebuild_line(original, catalog.get(&original.item_id), addon_pricing, &mut cart.warnings) {
      cart.subtotal += line.line_total;
      cart.items.push(line);
    }
  }
  cart
}

fn rebuild_line(
  original: &OrderItem,
  item: Option<&Item>,
  addon_pricing: AddonRepricing,
  warnings: &mut Vec<String>,
) -> Option<RepeatLine> {
  let Some(item) = item else {
    warnings.push(format!("{} is no longer on the menu and was removed", original.name));
    return None;
  };
  if !item.is_available {
    warnings.push(format!("{} is currently unavailable and was removed", item.name));
    return None;
  }

  let mut quantity = original.quantity;
  if let Some(remaining) = item.remaining_stock() {
    if remaining <= 0 {
      warnings.push(format!("{} is out of stock and was removed", item.name));
      return None;
    }
    if remaining < quantity {
      warnings.push(format!("Only {} left of {}; quantity reduced from {}", remaining, item.name, quantity));
      quantity = remaining;
    }
  }

  let mut variants = Vec::with_capacity(original.variants.len());
  for previous in &original.variants {
    match item.variant(previous.id).filter(|v| v.is_available) {
      Some(current) => variants.push(SelectedVariant {
        id: current.id,
        variant_type: current.variant_type.clone(),
        label: current.label.clone(),
        price: current.price,
      }),
      None => warnings.push(format!("{} {} is no longer available for {}", previous.label, previous.variant_type.to_lowercase(), item.name)),
    }
  }

  let mut addons = Vec::with_capacity(original.addons.len());
  for previous in &original.addons {
    match item.addon(previous.id) {
      Some(current) => addons.push(SelectedAddon {
        id: current.id,
        name: current.name.clone(),
        price: match addon_pricing {
          AddonRepricing::Historical => previous.price,
          AddonRepricing::Current => current.price,
        },
      }),
      None => warnings.push(format!("{} is no longer offered on {}", previous.name, item.name)),
    }
  }

  let unit = unit_price(item.price, &variants, &addons);
  Some(RepeatLine {
    item_id: item.id,
    name: item.name.clone(),
    quantity,
    unit_price: unit,
    line_total: unit * Decimal::from(quantity),
    variants,
    addons,
    options: original.options.clone(),
  })
}

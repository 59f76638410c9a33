// slicehouse/src/checkout/pricing.rs

//! Server-side repricing of cart lines.
//!
//! Client lines arrive as `Unverified<LineRequest>` and only carry ids; every
//! amount used in arithmetic comes from the catalog. Variants override the
//! base price, addons add to it.

use crate::error::{OrderError, OrderResult};
use crate::model::{Item, OrderLineDraft, SelectedAddon, SelectedVariant};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Client input that has not been checked against the catalog yet.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Unverified<T>(T);

impl<T> Unverified<T> {
  pub fn new(inner: T) -> Self {
    Unverified(inner)
  }

  pub fn untrusted(&self) -> &T {
    &self.0
  }
}

/// A catalog reference as sent by the storefront: either a bare id or an
/// object that carries one. Any other fields (names, prices) are discarded.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SelectionRef {
  Id(Uuid),
  Object { id: Uuid },
}

impl SelectionRef {
  pub fn id(&self) -> Uuid {
    match self {
      SelectionRef::Id(id) | SelectionRef::Object { id } => *id,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
  #[serde(alias = "id")]
  pub item_id: Uuid,
  pub quantity: i32,
  #[serde(default)]
  pub variants: Vec<SelectionRef>,
  #[serde(default)]
  pub addons: Vec<SelectionRef>,
  #[serde(default)]
  pub options: serde_json::Value,
}

/// A line whose price was computed from catalog data.
///
/// Only this module builds one, so holding a `PricedLine` means the amounts
/// are trusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
  item_id: Uuid,
  name: String,
  unit_price: Decimal,
  quantity: i32,
  line_total: Decimal,
  variants: Vec<SelectedVariant>,
  addons: Vec<SelectedAddon>,
  options: serde_json::Value,
}

impl PricedLine {
  pub fn item_id(&self) -> Uuid {
    self.item_id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn unit_price(&self) -> Decimal {
    self.unit_price
  }

  pub fn quantity(&self) -> i32 {
    self.quantity
  }

  pub fn line_total(&self) -> Decimal {
    self.line_total
  }

  pub fn variants(&self) -> &[SelectedVariant] {
    &self.variants
  }

  pub fn addons(&self) -> &[SelectedAddon] {
    &self.addons
  }

  pub fn into_draft(self) -> OrderLineDraft {
    OrderLineDraft {
      item_id: self.item_id,
      name: self.name,
      price: self.unit_price,
      quantity: self.quantity,
      variants: self.variants,
      addons: self.addons,
      options: self.options,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricedCart {
  pub lines: Vec<PricedLine>,
  pub subtotal: Decimal,
}

/// Unit price rule shared by placement and repeat orders: a positive variant
/// sum replaces the base price, addons are added on top.
pub fn unit_price(base_price: Decimal, variants: &[SelectedVariant], addons: &[SelectedAddon]) -> Decimal {
  let variants_price: Decimal = variants.iter().map(|v| v.price).sum();
  let addons_price: Decimal = addons.iter().map(|a| a.price).sum();
  let line_base = if variants_price > Decimal::ZERO { variants_price } else { base_price };
  line_base + addons_price
}

/// Resolves requested ids against the item, ignoring duplicates and ids the
/// lookup rejects (not owned by the item, or switched off).
fn matched<'a, T, F>(requested: &[SelectionRef], lookup: F) -> Vec<&'a T>
where
  F: Fn(Uuid) -> Option<&'a T>,
{
  let mut seen = HashSet::new();
  requested
    .iter()
    .map(SelectionRef::id)
    .filter(|id| seen.insert(*id))
    .filter_map(lookup)
    .collect()
}

/// Checks one line against its catalog item and prices it.
pub fn verify_line(item: Option<&Item>, line: &Unverified<LineRequest>) -> OrderResult<PricedLine> {
  let request = line.untrusted();
  let item = item.ok_or(OrderError::ItemNotFound { item_id: request.item_id })?;

  if request.quantity < 1 {
    return Err(OrderError::Validation(format!(
      "Quantity for {} must be at least 1",
      item.name
    )));
  }
  if !item.is_available {
    return Err(OrderError::ItemUnavailable { name: item.name.clone() });
  }
  if let Some(remaining) = item.remaining_stock() {
    if remaining < request.quantity {
      return Err(OrderError::InsufficientStock {
        name: item.name.clone(),
        remaining,
      });
    }
  }

  let variants: Vec<SelectedVariant> = matched(&request.variants, |id| item.variant(id).filter(|v| v.is_available))
    .into_iter()
    .map(|v| SelectedVariant {
      id: v.id,
      variant_type: v.variant_type.clone(),
      label: v.label.clone(),
      price: v.price,
    })
    .collect();
  let addons: Vec<SelectedAddon> = matched(&request.addons, |id| item.addon(id))
    .into_iter()
    .map(|a| SelectedAddon {
      id: a.id,
      name: a.name.clone(),
      price: a.price,
    })
    .collect();

  let unit_price = unit_price(item.price, &variants, &addons);
  Ok(PricedLine {
    item_id: item.id,
    name: item.name.clone(),
    unit_price,
    quantity: request.quantity,
    line_total: unit_price * Decimal::from(request.quantity),
    variants,
    addons,
    options: request.options.clone(),
  })
}

/// Prices every line or fails on the first bad one; no partial carts.
pub fn price_cart(catalog: &HashMap<Uuid, Item>, lines: &[Unverified<LineRequest>]) -> OrderResult<PricedCart> {
  let mut cart = PricedCart::default();
  for line in lines {
    let priced = verify_line(catalog.get(&line.untrusted().item_id), line)?;
    cart.subtotal += priced.line_total;
    cart.lines.push(priced);
  }
  Ok(cart)
}

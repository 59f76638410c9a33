// slicehouse/src/model/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A menu product with its owned customisation axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub is_available: bool,
  pub stock: i32,
  pub is_stock_managed: bool,
  #[serde(default)]
  pub variants: Vec<Variant>,
  #[serde(default)]
  pub addons: Vec<Addon>,
}

/// A price-overriding option such as a size. Belongs to exactly one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
  pub id: Uuid,
  pub item_id: Uuid,
  #[serde(rename = "type")]
  pub variant_type: String,
  pub label: String,
  pub price: Decimal,
  pub is_available: bool,
}

/// A price-additive extra such as a topping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
  pub id: Uuid,
  pub item_id: Uuid,
  pub name: String,
  pub price: Decimal,
}

impl Item {
  pub fn variant(&self, id: Uuid) -> Option<&Variant> {
    self.variants.iter().find(|v| v.id == id)
  }

  pub fn addon(&self, id: Uuid) -> Option<&Addon> {
    self.addons.iter().find(|a| a.id == id)
  }

  /// Units that can still be sold, or `None` when stock is not tracked.
  pub fn remaining_stock(&self) -> Option<i32> {
    self.is_stock_managed.then_some(self.stock)
  }
}

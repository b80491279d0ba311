//! Order and order line types

use super::money::{line_total, to_money};
use super::status::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount arithmetic left the representable `Decimal` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount out of range")]
pub struct AmountOverflow;

/// Order line snapshot
///
/// `name` and `price` are copied at the time the line is added, so later menu
/// edits don't rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Result<Decimal, AmountOverflow> {
        line_total(self.price, self.quantity).ok_or(AmountOverflow)
    }
}

/// Order line as sent by a caller
///
/// `name`/`price` are optional hints; the server fills or overrides them from
/// the canonical menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub quantity: u32,
}

impl OrderItemInput {
    pub fn new(menu_item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: None,
            price: None,
            quantity,
        }
    }
}

/// 订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub vendor_id: String,
    pub table_id: Option<String>,
    pub order_number: u64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub customer_name: Option<String>,
    pub archived: bool,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl Order {
    /// Active = not completed and not archived (mergeable, shown by default)
    pub fn is_active(&self) -> bool {
        !self.archived && self.status.is_active()
    }

    /// Recompute `total_amount` from `items`
    ///
    /// On overflow the previous total is kept.
    pub fn recompute_total(&mut self) -> Result<(), AmountOverflow> {
        self.total_amount = compute_total(&self.items)?;
        Ok(())
    }

    /// Merge lines into this order and refresh the total
    pub fn merge_items(
        &mut self,
        incoming: impl IntoIterator<Item = OrderItem>,
    ) -> Result<(), AmountOverflow> {
        merge_lines(&mut self.items, incoming);
        self.recompute_total()
    }
}

/// Σ price × quantity, stored with two decimals
pub fn compute_total(items: &[OrderItem]) -> Result<Decimal, AmountOverflow> {
    let total = items.iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.line_total()?).ok_or(AmountOverflow)
    })?;
    Ok(to_money(total))
}

/// Combine lines by `menu_item_id`
///
/// Existing lines keep their position and snapshot; only the quantity grows.
/// Unknown ids are appended in arrival order.
pub fn merge_lines(existing: &mut Vec<OrderItem>, incoming: impl IntoIterator<Item = OrderItem>) {
    for item in incoming {
        match existing
            .iter_mut()
            .find(|line| line.menu_item_id == item.menu_item_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => existing.push(item),
        }
    }
}

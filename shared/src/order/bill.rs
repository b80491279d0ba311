//! Bill snapshot

use super::types::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bill line (no menu item reference)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// 账单，订单完成时写入一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub order_id: String,
    pub vendor_id: String,
    pub order_number: u64,
    /// Denormalized table number, not a reference
    pub table_number: Option<String>,
    pub items: Vec<BillItem>,
    pub total_amount: Decimal,
    pub customer_name: Option<String>,
    pub created_at: i64,
}

impl Bill {
    /// Snapshot an order
    pub fn from_order(order: &Order, table_number: Option<String>, created_at: i64) -> Self {
        Self {
            order_id: order.id.clone(),
            vendor_id: order.vendor_id.clone(),
            order_number: order.order_number,
            table_number,
            items: order
                .items
                .iter()
                .map(|item| BillItem {
                    name: item.name.clone(),
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
            total_amount: order.total_amount,
            customer_name: order.customer_name.clone(),
            created_at,
        }
    }
}

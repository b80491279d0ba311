//! OrdersManager - 订单生命周期核心
//!
//! This module handles:
//! - Placing orders, with table-scoped merging and per-vendor numbering
//! - Status transitions along new → preparing → ready → completed
//! - Item editing with canonical price re-resolution
//! - Bill generation on completion and archival of completed orders
//! - Event broadcasting (consumed by the event router)
//!
//! # Place Order Flow
//!
//! ```text
//! place_order(req)
//!     ├─ 1. Validate items (non-empty, quantity, price)
//!     ├─ 2. Resolve table (id → number within vendor)
//!     ├─ 3. Begin write transaction (global serialization point)
//!     ├─ 4. Resolve item snapshots from the catalog
//!     ├─ 5. Active order on the table?
//!     │      ├─ yes: merge lines, recompute total
//!     │      └─ no:  allocate next number, insert, bind table
//!     ├─ 6. Commit
//!     └─ 7. Broadcast NEW_ORDER / ORDER_UPDATE
//! ```
//!
//! All methods are synchronous (redb); async callers should wrap them in
//! `spawn_blocking` when contention matters.

mod error;
pub use error::*;

use super::OrderNotice;
use super::bill::BillGenerator;
use super::storage::{OrderStorage, OrderView};
use crate::catalog::Catalog;
use crate::db::StorageError;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::LiveEvent;
use shared::models::DiningTable;
use shared::order::types::merge_lines;
use shared::order::{Bill, Order, OrderItem, OrderItemInput, OrderStatus};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Upper bound for a single line quantity
pub const MAX_ITEM_QUANTITY: u32 = 9999;

/// Upper bound for a caller-supplied unit price
pub const MAX_ITEM_PRICE: i64 = 1_000_000;

/// Place order request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub vendor_id: String,
    /// Table id or human-readable table number
    #[serde(default)]
    pub table_id: Option<String>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Result of an archival attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    Archived(Order),
    Missing,
    NotCompleted(OrderStatus),
    AlreadyArchived,
}

/// OrdersManager for the order lifecycle
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<dyn Catalog>,
    bills: BillGenerator,
    event_tx: broadcast::Sender<OrderNotice>,
    /// Reject skipped steps (new → completed)
    strict_status: bool,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("event_tx", &"<broadcast::Sender>")
            .field("strict_status", &self.strict_status)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(storage: OrderStorage, catalog: Arc<dyn Catalog>, strict_status: bool) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let bills = BillGenerator::new(storage.clone(), catalog.clone());
        Self {
            storage,
            catalog,
            bills,
            event_tx,
            strict_status,
        }
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderNotice> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    fn emit(&self, vendor_id: &str, event: LiveEvent) {
        let notice = OrderNotice {
            vendor_id: vendor_id.to_string(),
            event,
        };
        if self.event_tx.send(notice).is_err() {
            tracing::debug!(vendor_id, "Event broadcast skipped: no active receivers");
        }
    }

    // ========== Commands ==========

    /// Create a new order, or merge into the table's active order
    pub fn place_order(&self, req: PlaceOrderRequest) -> OrderResult<Order> {
        validate_inputs(&req.items)?;

        let table = match req.table_id.as_deref().map(str::trim) {
            Some(table_ref) if !table_ref.is_empty() => {
                Some(self.resolve_table(&req.vendor_id, table_ref)?)
            }
            _ => None,
        };
        let customer_name = req
            .customer_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let txn = self.storage.begin_write()?;
        let lines = self.resolve_lines(&req.vendor_id, &req.items, false)?;

        if let Some(table) = &table
            && let Some(mut order) =
                self.storage
                    .find_active_order_for_table_txn(&txn, &req.vendor_id, &table.id)?
        {
            order.merge_items(lines)?;
            check_quantities(&order.items)?;
            if order.customer_name.is_none() {
                order.customer_name = customer_name;
            }
            self.storage.put_order(&txn, &order)?;
            txn.commit().map_err(StorageError::from)?;

            tracing::info!(
                order_id = %order.id,
                vendor_id = %order.vendor_id,
                table_id = %table.id,
                order_number = order.order_number,
                total = %order.total_amount,
                "Merged items into active table order"
            );
            self.emit(&order.vendor_id, LiveEvent::OrderUpdate { order: order.clone() });
            return Ok(order);
        }

        let order_number = self.storage.next_order_number(&txn, &req.vendor_id)?;
        let mut order = Order {
            id: shared::util::new_order_id(),
            vendor_id: req.vendor_id,
            table_id: table.as_ref().map(|t| t.id.clone()),
            order_number,
            status: OrderStatus::New,
            items: lines,
            total_amount: Decimal::ZERO,
            customer_name,
            archived: false,
            created_at: shared::util::now_millis(),
            completed_at: None,
        };
        check_quantities(&order.items)?;
        order.recompute_total()?;

        self.storage.put_order(&txn, &order)?;
        if let Some(table) = &table {
            self.storage
                .bind_table(&txn, &order.vendor_id, &table.id, &order.id)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            order_number = order.order_number,
            total = %order.total_amount,
            "Order created"
        );
        self.emit(&order.vendor_id, LiveEvent::NewOrder { order: order.clone() });
        Ok(order)
    }

    /// Move an order forward in the status pipeline
    ///
    /// Entering `completed` stamps `completed_at` once, releases the table and
    /// generates the bill. A bill failure is logged and does not undo the
    /// transition. Setting `completed` again is accepted as a re-entry.
    pub fn set_status(&self, order_id: &str, status: OrderStatus) -> OrderResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if order.archived {
            return Err(OrderError::OrderLocked {
                order_id: order.id,
                reason: LockReason::Archived,
            });
        }
        if !order.status.can_transition_to(status, self.strict_status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        let from = order.status;
        if from == status {
            // completed → completed: nothing to persist
            txn.abort().map_err(StorageError::from)?;
        } else {
            order.status = status;
            if status == OrderStatus::Completed {
                if order.completed_at.is_none() {
                    order.completed_at = Some(shared::util::now_millis());
                }
                if let Some(table_id) = &order.table_id {
                    self.storage
                        .release_table(&txn, &order.vendor_id, table_id, &order.id)?;
                }
            }
            self.storage.put_order(&txn, &order)?;
            txn.commit().map_err(StorageError::from)?;
        }

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            from = %from,
            to = %status,
            "Order status changed"
        );

        if status == OrderStatus::Completed
            && let Err(e) = self.bills.generate(&order)
        {
            tracing::error!(order_id = %order.id, error = %e, "Bill generation failed, will regenerate on read");
        }

        self.emit(&order.vendor_id, LiveEvent::OrderUpdate { order: order.clone() });
        Ok(order)
    }

    /// Replace the item list, re-pricing every line from the catalog
    pub fn update_items(&self, order_id: &str, items: &[OrderItemInput]) -> OrderResult<Order> {
        validate_inputs(items)?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if order.archived {
            return Err(OrderError::OrderLocked {
                order_id: order.id,
                reason: LockReason::Archived,
            });
        }
        if order.status == OrderStatus::Completed {
            return Err(OrderError::OrderLocked {
                order_id: order.id,
                reason: LockReason::Completed,
            });
        }

        order.items = self.resolve_lines(&order.vendor_id, items, true)?;
        check_quantities(&order.items)?;
        order.recompute_total()?;

        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            lines = order.items.len(),
            total = %order.total_amount,
            "Order items updated"
        );
        self.emit(&order.vendor_id, LiveEvent::OrderUpdate { order: order.clone() });
        Ok(order)
    }

    /// Archive an order if it is still completed
    ///
    /// Anything else is reported through [`ArchiveOutcome`] and left untouched.
    pub fn archive_order(&self, order_id: &str) -> OrderResult<ArchiveOutcome> {
        let txn = self.storage.begin_write()?;
        let Some(mut order) = self.storage.get_order_txn(&txn, order_id)? else {
            return Ok(ArchiveOutcome::Missing);
        };
        if order.archived {
            return Ok(ArchiveOutcome::AlreadyArchived);
        }
        if order.status != OrderStatus::Completed {
            return Ok(ArchiveOutcome::NotCompleted(order.status));
        }

        order.archived = true;
        self.storage.put_order(&txn, &order)?;
        if let Some(table_id) = &order.table_id {
            self.storage
                .release_table(&txn, &order.vendor_id, table_id, &order.id)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            order_number = order.order_number,
            "Order archived"
        );
        self.emit(
            &order.vendor_id,
            LiveEvent::OrderArchived {
                order_id: order.id.clone(),
            },
        );
        Ok(ArchiveOutcome::Archived(order))
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> OrderResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub fn list_orders(&self, vendor_id: &str, view: OrderView) -> OrderResult<Vec<Order>> {
        Ok(self.storage.list_vendor_orders(vendor_id, view)?)
    }

    /// Completed orders still waiting for archival
    pub fn completed_unarchived(&self) -> OrderResult<Vec<Order>> {
        Ok(self.storage.list_completed_unarchived()?)
    }

    /// Bill of an order
    ///
    /// A completed order without a bill gets one generated now. `None` means
    /// the order has not been completed yet.
    pub fn get_bill(&self, order_id: &str) -> OrderResult<Option<Bill>> {
        if let Some(bill) = self.storage.get_bill(order_id)? {
            return Ok(Some(bill));
        }

        let order = self.get_order(order_id)?;
        if order.status != OrderStatus::Completed {
            return Ok(None);
        }

        tracing::warn!(order_id, "Completed order has no bill, regenerating");
        Ok(Some(self.bills.generate(&order)?))
    }

    // ========== Resolution ==========

    /// Resolve a table reference: direct id first, then number within the vendor
    fn resolve_table(&self, vendor_id: &str, table_ref: &str) -> OrderResult<DiningTable> {
        let by_id = self.catalog.get_table(table_ref)?;
        let foreign = match by_id {
            Some(table) if table.vendor_id == vendor_id => return check_active(table),
            other => other,
        };

        if let Some(table) = self.catalog.get_table_by_number(vendor_id, table_ref)? {
            return check_active(table);
        }

        match foreign {
            Some(table) => Err(OrderError::TableOwnership {
                table_id: table.id,
                vendor_id: vendor_id.to_string(),
            }),
            None => Err(OrderError::InvalidTable(table_ref.to_string())),
        }
    }

    /// Turn inputs into line snapshots, combining duplicate menu items
    ///
    /// With `canonical` the name and price always come from the menu item;
    /// otherwise caller-supplied values are kept and only gaps are filled.
    fn resolve_lines(
        &self,
        vendor_id: &str,
        inputs: &[OrderItemInput],
        canonical: bool,
    ) -> OrderResult<Vec<OrderItem>> {
        let mut lines = Vec::with_capacity(inputs.len());

        for input in inputs {
            let (name, price) = match (&input.name, input.price) {
                (Some(name), Some(price)) if !canonical => (name.clone(), price),
                _ => {
                    let item = self
                        .catalog
                        .get_menu_item(&input.menu_item_id)?
                        .filter(|item| item.vendor_id == vendor_id)
                        .ok_or_else(|| OrderError::MenuItemNotFound(input.menu_item_id.clone()))?;
                    if canonical {
                        (item.name, item.price)
                    } else {
                        (
                            input.name.clone().unwrap_or(item.name),
                            input.price.unwrap_or(item.price),
                        )
                    }
                }
            };

            lines.push(OrderItem {
                menu_item_id: input.menu_item_id.clone(),
                name,
                price: shared::order::money::to_money(price),
                quantity: input.quantity,
            });
        }

        let mut combined = Vec::with_capacity(lines.len());
        merge_lines(&mut combined, lines);
        Ok(combined)
    }
}

fn check_active(table: DiningTable) -> OrderResult<DiningTable> {
    if table.is_active {
        Ok(table)
    } else {
        Err(OrderError::TableInactive(table.table_number))
    }
}

fn validate_inputs(items: &[OrderItemInput]) -> OrderResult<()> {
    if items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    for item in items {
        if item.menu_item_id.trim().is_empty() {
            return Err(OrderError::InvalidItem("menuItemId is required".into()));
        }
        if item.quantity == 0 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(OrderError::InvalidItem(format!(
                "quantity for {} must be between 1 and {}",
                item.menu_item_id, MAX_ITEM_QUANTITY
            )));
        }
        if item
            .price
            .is_some_and(|price| price < Decimal::ZERO || price > Decimal::from(MAX_ITEM_PRICE))
        {
            return Err(OrderError::InvalidItem(format!(
                "price for {} must be between 0 and {}",
                item.menu_item_id, MAX_ITEM_PRICE
            )));
        }
    }
    Ok(())
}

fn check_quantities(items: &[OrderItem]) -> OrderResult<()> {
    match items.iter().find(|line| line.quantity > MAX_ITEM_QUANTITY) {
        Some(line) => Err(OrderError::InvalidItem(format!(
            "quantity for {} exceeds {}",
            line.menu_item_id, MAX_ITEM_QUANTITY
        ))),
        None => Ok(()),
    }
}

/// Parse a status value coming from a request body
pub fn parse_status(raw: &str) -> OrderResult<OrderStatus> {
    raw.trim()
        .parse()
        .map_err(|_| OrderError::InvalidStatus(raw.to_string()))
}

#[cfg(test)]
mod tests;

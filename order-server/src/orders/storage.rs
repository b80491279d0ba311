//! redb-based storage layer for orders and bills
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order records |
//! | `vendor_orders` | `(vendor_id, order_number)` | `order_id` | 编号索引，同时是编号分配器 |
//! | `active_table_orders` | `(vendor_id, table_id)` | `order_id` | 合并查找索引 |
//! | `bills` | `order_id` | `Bill` | 账单 (只写一次) |
//!
//! Archived orders keep their `vendor_orders` entry, so the last key of a
//! vendor's range is always the highest number ever handed out.

use crate::db::StorageResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::order::{Bill, Order, OrderStatus};
use std::sync::Arc;

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for per-vendor numbering: key = (vendor_id, order_number), value = order_id
const VENDOR_ORDERS_TABLE: TableDefinition<(&str, u64), &str> =
    TableDefinition::new("vendor_orders");

/// Table for table → active order: key = (vendor_id, table_id), value = order_id
const ACTIVE_TABLE_ORDERS_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("active_table_orders");

/// Table for bills: key = order_id, value = JSON-serialized Bill
const BILLS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bills");

/// Which orders a vendor listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderView {
    /// Not archived (includes completed orders waiting for archival)
    Current,
    /// Everything, archived history included
    All,
    /// Archived history only
    Archived,
}

impl OrderView {
    fn matches(self, order: &Order) -> bool {
        match self {
            OrderView::Current => !order.archived,
            OrderView::All => true,
            OrderView::Archived => order.archived,
        }
    }
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Wrap a database and create the order tables if they don't exist
    pub fn open(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(VENDOR_ORDERS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_TABLE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(BILLS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(crate::db::open_in_memory()?)
    }

    /// Begin a write transaction
    ///
    /// Blocks while another write transaction is open.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Numbers ==========

    /// Next order number for a vendor (does NOT reserve - use within the inserting transaction)
    pub fn next_order_number(&self, txn: &WriteTransaction, vendor_id: &str) -> StorageResult<u64> {
        let table = txn.open_table(VENDOR_ORDERS_TABLE)?;
        let last = table
            .range((vendor_id, 0u64)..=(vendor_id, u64::MAX))?
            .next_back()
            .transpose()?
            .map(|(key, _)| key.value().1);
        Ok(last.map_or(1, |n| n + 1))
    }

    // ========== Orders ==========

    /// Store an order and its number index entry
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        let mut numbers = txn.open_table(VENDOR_ORDERS_TABLE)?;

        let value = serde_json::to_vec(order)?;
        orders.insert(order.id.as_str(), value.as_slice())?;
        numbers.insert(
            (order.vendor_id.as_str(), order.order_number),
            order.id.as_str(),
        )?;
        Ok(())
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by ID (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Orders of one vendor, ascending by order number
    pub fn list_vendor_orders(&self, vendor_id: &str, view: OrderView) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let numbers = read_txn.open_table(VENDOR_ORDERS_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in numbers.range((vendor_id, 0u64)..=(vendor_id, u64::MAX))? {
            let (_key, order_id) = entry?;
            if let Some(value) = orders.get(order_id.value())? {
                let order: Order = serde_json::from_slice(value.value())?;
                if view.matches(&order) {
                    result.push(order);
                }
            }
        }

        Ok(result)
    }

    /// Completed orders that have not been archived yet (all vendors)
    pub fn list_completed_unarchived(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut result = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.status == OrderStatus::Completed && !order.archived {
                result.push(order);
            }
        }

        Ok(result)
    }

    // ========== Table Index ==========

    /// Find the active order bound to a table (within transaction)
    ///
    /// A stale entry (order no longer active) is removed and `None` returned.
    pub fn find_active_order_for_table_txn(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
        table_id: &str,
    ) -> StorageResult<Option<Order>> {
        let mut index = txn.open_table(ACTIVE_TABLE_ORDERS_TABLE)?;
        let order_id = index
            .get((vendor_id, table_id))?
            .map(|guard| guard.value().to_string());

        let Some(order_id) = order_id else {
            return Ok(None);
        };

        match self.get_order_txn(txn, &order_id)? {
            Some(order) if order.is_active() => Ok(Some(order)),
            _ => {
                tracing::debug!(vendor_id, table_id, order_id = %order_id, "Dropping stale table binding");
                index.remove((vendor_id, table_id))?;
                Ok(None)
            }
        }
    }

    /// Bind a table to its active order
    pub fn bind_table(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
        table_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut index = txn.open_table(ACTIVE_TABLE_ORDERS_TABLE)?;
        index.insert((vendor_id, table_id), order_id)?;
        Ok(())
    }

    /// Release a table binding if it still points to `order_id`
    pub fn release_table(
        &self,
        txn: &WriteTransaction,
        vendor_id: &str,
        table_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut index = txn.open_table(ACTIVE_TABLE_ORDERS_TABLE)?;
        let bound = index
            .get((vendor_id, table_id))?
            .is_some_and(|guard| guard.value() == order_id);
        if bound {
            index.remove((vendor_id, table_id))?;
        }
        Ok(())
    }

    // ========== Bills ==========

    /// Store a bill unless one already exists for the order
    ///
    /// Returns the bill that is stored after the call.
    pub fn store_bill_if_absent(&self, txn: &WriteTransaction, bill: &Bill) -> StorageResult<Bill> {
        let mut table = txn.open_table(BILLS_TABLE)?;
        let existing: Option<Bill> = match table.get(bill.order_id.as_str())? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let value = serde_json::to_vec(bill)?;
        table.insert(bill.order_id.as_str(), value.as_slice())?;
        Ok(bill.clone())
    }

    /// Get the bill of an order
    pub fn get_bill(&self, order_id: &str) -> StorageResult<Option<Bill>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BILLS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::OrderItem;

    fn create_test_order(vendor_id: &str, number: u64, table_id: Option<&str>) -> Order {
        let mut order = Order {
            id: format!("{vendor_id}-order-{number}"),
            vendor_id: vendor_id.to_string(),
            table_id: table_id.map(str::to_string),
            order_number: number,
            status: OrderStatus::New,
            items: vec![OrderItem {
                menu_item_id: "tea".to_string(),
                name: "Tea".to_string(),
                price: Decimal::new(200, 2),
                quantity: 1,
            }],
            total_amount: Decimal::ZERO,
            customer_name: None,
            archived: false,
            created_at: shared::util::now_millis(),
            completed_at: None,
        };
        order.recompute_total().unwrap();
        order
    }

    fn insert(storage: &OrderStorage, order: &Order) {
        let txn = storage.begin_write().unwrap();
        storage.put_order(&txn, order).unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_next_order_number_per_vendor() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn, "v1").unwrap(), 1);
        drop(txn);

        insert(&storage, &create_test_order("v1", 1, None));
        insert(&storage, &create_test_order("v1", 2, None));
        insert(&storage, &create_test_order("v2", 1, None));

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn, "v1").unwrap(), 3);
        assert_eq!(storage.next_order_number(&txn, "v2").unwrap(), 2);
        assert_eq!(storage.next_order_number(&txn, "v10").unwrap(), 1);
    }

    #[test]
    fn test_numbers_not_reused_after_archival() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut order = create_test_order("v1", 1, None);
        insert(&storage, &order);

        order.status = OrderStatus::Completed;
        order.archived = true;
        insert(&storage, &order);

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn, "v1").unwrap(), 2);
    }

    #[test]
    fn test_list_views() {
        let storage = OrderStorage::open_in_memory().unwrap();
        insert(&storage, &create_test_order("v1", 2, None));
        let mut archived = create_test_order("v1", 1, None);
        archived.status = OrderStatus::Completed;
        archived.archived = true;
        insert(&storage, &archived);
        insert(&storage, &create_test_order("v2", 1, None));

        let current = storage.list_vendor_orders("v1", OrderView::Current).unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].order_number, 2);

        let all = storage.list_vendor_orders("v1", OrderView::All).unwrap();
        let numbers: Vec<u64> = all.iter().map(|o| o.order_number).collect();
        assert_eq!(numbers, vec![1, 2]);

        let history = storage.list_vendor_orders("v1", OrderView::Archived).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].archived);
    }

    #[test]
    fn test_table_binding_and_stale_cleanup() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut order = create_test_order("v1", 1, Some("t1"));

        let txn = storage.begin_write().unwrap();
        storage.put_order(&txn, &order).unwrap();
        storage.bind_table(&txn, "v1", "t1", &order.id).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let found = storage.find_active_order_for_table_txn(&txn, "v1", "t1").unwrap();
        assert_eq!(found.map(|o| o.id), Some(order.id.clone()));
        assert!(storage.find_active_order_for_table_txn(&txn, "v2", "t1").unwrap().is_none());
        drop(txn);

        // Completed without releasing the binding
        order.status = OrderStatus::Completed;
        insert(&storage, &order);

        let txn = storage.begin_write().unwrap();
        assert!(storage.find_active_order_for_table_txn(&txn, "v1", "t1").unwrap().is_none());
        txn.commit().unwrap();
    }

    #[test]
    fn test_release_only_own_binding() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order = create_test_order("v1", 1, Some("t1"));

        let txn = storage.begin_write().unwrap();
        storage.put_order(&txn, &order).unwrap();
        storage.bind_table(&txn, "v1", "t1", &order.id).unwrap();
        storage.release_table(&txn, "v1", "t1", "someone-else").unwrap();
        let found = storage.find_active_order_for_table_txn(&txn, "v1", "t1").unwrap();
        assert!(found.is_some());

        storage.release_table(&txn, "v1", "t1", &order.id).unwrap();
        let found = storage.find_active_order_for_table_txn(&txn, "v1", "t1").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_completed_unarchived() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut done = create_test_order("v1", 1, None);
        done.status = OrderStatus::Completed;
        insert(&storage, &done);
        let mut gone = create_test_order("v1", 2, None);
        gone.status = OrderStatus::Completed;
        gone.archived = true;
        insert(&storage, &gone);
        insert(&storage, &create_test_order("v1", 3, None));

        let pending = storage.list_completed_unarchived().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, done.id);
    }

    #[test]
    fn test_bill_written_once() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order = create_test_order("v1", 1, None);
        let first = Bill::from_order(&order, None, 1);
        let mut second = first.clone();
        second.created_at = 99;

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.store_bill_if_absent(&txn, &first).unwrap().created_at, 1);
        assert_eq!(storage.store_bill_if_absent(&txn, &second).unwrap().created_at, 1);
        txn.commit().unwrap();

        assert_eq!(storage.get_bill(&order.id).unwrap().unwrap().created_at, 1);
        assert!(storage.get_bill("missing").unwrap().is_none());
    }
}

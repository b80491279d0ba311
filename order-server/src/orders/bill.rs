//! Bill Generator - 账单生成
//!
//! 订单进入 completed 时生成一次。已有账单则直接返回，不会覆盖。

use super::storage::OrderStorage;
use crate::catalog::Catalog;
use crate::db::StorageResult;
use shared::order::{Bill, Order};
use std::sync::Arc;

#[derive(Clone)]
pub struct BillGenerator {
    storage: OrderStorage,
    catalog: Arc<dyn Catalog>,
}

impl BillGenerator {
    pub fn new(storage: OrderStorage, catalog: Arc<dyn Catalog>) -> Self {
        Self { storage, catalog }
    }

    /// Snapshot `order` into a bill, idempotently
    pub fn generate(&self, order: &Order) -> StorageResult<Bill> {
        if let Some(existing) = self.storage.get_bill(&order.id)? {
            return Ok(existing);
        }

        let table_number = match order.table_id.as_deref() {
            Some(table_id) => self
                .catalog
                .get_table(table_id)?
                .map(|table| table.table_number),
            None => None,
        };
        let bill = Bill::from_order(order, table_number, shared::util::now_millis());

        // 并发完成时由写事务裁决，先写入者获胜
        let txn = self.storage.begin_write()?;
        let stored = self.storage.store_bill_if_absent(&txn, &bill)?;
        txn.commit()?;

        tracing::info!(
            order_id = %order.id,
            vendor_id = %order.vendor_id,
            order_number = order.order_number,
            total = %stored.total_amount,
            "Bill generated"
        );
        Ok(stored)
    }
}

//! 目录数据 (商户 / 桌台 / 菜品)
//!
//! 这些数据由外部的菜单与桌台管理维护，订单核心只通过 [`Catalog`] 读取:
//!
//! - `get_table(id)` / `get_table_by_number(vendor, number)`: 桌台解析
//! - `get_menu_item(id)`: 权威价格
//! - `get_vendor(id)`: 角色，用于实时频道归属

mod seed;
mod storage;

pub use seed::CatalogSeed;
pub use storage::CatalogStorage;

use crate::db::StorageResult;
use shared::models::{DiningTable, MenuItem, Vendor};

/// Read-only collaborator interface consumed by the order core
pub trait Catalog: Send + Sync {
    fn get_table(&self, table_id: &str) -> StorageResult<Option<DiningTable>>;

    fn get_table_by_number(
        &self,
        vendor_id: &str,
        table_number: &str,
    ) -> StorageResult<Option<DiningTable>>;

    fn get_menu_item(&self, menu_item_id: &str) -> StorageResult<Option<MenuItem>>;

    fn get_vendor(&self, vendor_id: &str) -> StorageResult<Option<Vendor>>;
}

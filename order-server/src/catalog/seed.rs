//! Catalog seed file
//!
//! 启动时可选加载的 JSON 目录数据 (`SEED_FILE`)，格式:
//!
//! ```json
//! {
//!   "vendors": [{ "id": "v1", "name": "Noodle Bar" }],
//!   "tables": [{ "id": "t1", "vendorId": "v1", "tableNumber": "12" }],
//!   "menuItems": [{ "id": "tea", "vendorId": "v1", "name": "Tea", "price": "2.00" }]
//! }
//! ```

use super::CatalogStorage;
use crate::db::StorageResult;
use serde::Deserialize;
use shared::models::{DiningTable, MenuItem, Vendor};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub tables: Vec<DiningTable>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

impl CatalogSeed {
    pub fn from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write every entry into the catalog, returns the number of records
    pub fn apply(&self, catalog: &CatalogStorage) -> StorageResult<usize> {
        for vendor in &self.vendors {
            catalog.put_vendor(vendor)?;
        }
        for table in &self.tables {
            catalog.put_table(table)?;
        }
        for item in &self.menu_items {
            catalog.put_menu_item(item)?;
        }
        Ok(self.vendors.len() + self.tables.len() + self.menu_items.len())
    }
}

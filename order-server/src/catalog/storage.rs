//! redb-backed catalog
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `dining_tables` | `table_id` | JSON `DiningTable` |
//! | `table_numbers` | `(vendor_id, table_number)` | `table_id` |
//! | `menu_items` | `menu_item_id` | JSON `MenuItem` |
//! | `vendors` | `vendor_id` | JSON `Vendor` |

use super::Catalog;
use crate::db::StorageResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use shared::models::{DiningTable, MenuItem, Vendor};
use std::sync::Arc;

const TABLES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("dining_tables");

const TABLE_NUMBERS_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("table_numbers");

const MENU_ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("menu_items");

const VENDORS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("vendors");

/// Catalog storage backed by redb
#[derive(Clone)]
pub struct CatalogStorage {
    db: Arc<Database>,
}

impl CatalogStorage {
    /// Wrap a database and make sure all catalog tables exist
    pub fn open(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(TABLE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(VENDORS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // ========== Writes (seed loader / tests) ==========

    pub fn put_vendor(&self, vendor: &Vendor) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(VENDORS_TABLE)?;
            let value = serde_json::to_vec(vendor)?;
            table.insert(vendor.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Insert or replace a table, keeping the number index in sync
    pub fn put_table(&self, dining_table: &DiningTable) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut tables = txn.open_table(TABLES_TABLE)?;
            let mut numbers = txn.open_table(TABLE_NUMBERS_TABLE)?;

            let previous: Option<DiningTable> = match tables.get(dining_table.id.as_str())? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            if let Some(prev) = previous {
                numbers.remove((prev.vendor_id.as_str(), prev.table_number.as_str()))?;
            }

            let value = serde_json::to_vec(dining_table)?;
            tables.insert(dining_table.id.as_str(), value.as_slice())?;
            numbers.insert(
                (
                    dining_table.vendor_id.as_str(),
                    dining_table.table_number.as_str(),
                ),
                dining_table.id.as_str(),
            )?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn put_menu_item(&self, item: &MenuItem) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
            let value = serde_json::to_vec(item)?;
            table.insert(item.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Delete a menu item; returns whether it existed
    pub fn remove_menu_item(&self, menu_item_id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
            table.remove(menu_item_id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        definition: TableDefinition<'static, &'static str, &'static [u8]>,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

impl Catalog for CatalogStorage {
    fn get_table(&self, table_id: &str) -> StorageResult<Option<DiningTable>> {
        self.get_json(TABLES_TABLE, table_id)
    }

    fn get_table_by_number(
        &self,
        vendor_id: &str,
        table_number: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let table_id = {
            let read_txn = self.db.begin_read()?;
            let numbers = read_txn.open_table(TABLE_NUMBERS_TABLE)?;
            numbers
                .get((vendor_id, table_number))?
                .map(|guard| guard.value().to_string())
        };

        match table_id {
            Some(id) => self.get_table(&id),
            None => Ok(None),
        }
    }

    fn get_menu_item(&self, menu_item_id: &str) -> StorageResult<Option<MenuItem>> {
        self.get_json(MENU_ITEMS_TABLE, menu_item_id)
    }

    fn get_vendor(&self, vendor_id: &str) -> StorageResult<Option<Vendor>> {
        self.get_json(VENDORS_TABLE, vendor_id)
    }
}

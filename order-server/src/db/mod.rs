//! redb 数据库句柄
//!
//! 订单表和目录表共用同一个 [`Database`]。redb 同一时刻只允许一个写事务，
//! 这也是下单流程 (合并查找 + 编号分配 + 写入) 的串行化点。
//!
//! # Durability
//!
//! redb uses `Durability::Immediate` by default: a commit is persistent as
//! soon as `commit()` returns.

use redb::Database;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Open or create the database file, creating parent directories
pub fn open_database(path: impl AsRef<Path>) -> StorageResult<Arc<Database>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::create(path)?;
    Ok(Arc::new(db))
}

/// Open an in-memory database (tests, `STORAGE_IN_MEMORY=true`)
pub fn open_in_memory() -> StorageResult<Arc<Database>> {
    let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
    Ok(Arc::new(db))
}

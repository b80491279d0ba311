use crate::db::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::order::{AmountOverflow, OrderStatus};
use std::fmt;
use thiserror::Error;

/// Why an order refuses a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    /// Archived orders are read-only
    Archived,
    /// Completed orders keep their items (bill snapshot)
    Completed,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::Archived => f.write_str("archived"),
            LockReason::Completed => f.write_str("completed"),
        }
    }
}

/// Order core errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Table {0} is inactive")]
    TableInactive(String),

    #[error("Table {table_id} does not belong to vendor {vendor_id}")]
    TableOwnership { table_id: String, vendor_id: String },

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Order {order_id} is {reason}")]
    OrderLocked { order_id: String, reason: LockReason },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<AmountOverflow> for OrderError {
    fn from(_: AmountOverflow) -> Self {
        OrderError::InvalidItem("order total is out of range".to_string())
    }
}

/// 将存储错误转换为错误码（前端负责本地化）
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    if let StorageError::Serialization(_) = e {
        return ErrorCode::InternalError;
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::DatabaseError
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::EmptyOrder => {
                AppError::with_message(ErrorCode::OrderEmpty, message).with_detail("field", "items")
            }
            OrderError::InvalidItem(_) => AppError::with_message(ErrorCode::ValidationFailed, message)
                .with_detail("field", "items"),
            OrderError::InvalidTable(table) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table", table)
            }
            OrderError::TableInactive(table) => {
                AppError::with_message(ErrorCode::TableInactive, message).with_detail("table", table)
            }
            OrderError::TableOwnership { table_id, vendor_id } => {
                AppError::with_message(ErrorCode::TableVendorMismatch, message)
                    .with_detail("tableId", table_id)
                    .with_detail("vendorId", vendor_id)
            }
            OrderError::InvalidStatus(status) => {
                AppError::with_message(ErrorCode::InvalidOrderStatus, message)
                    .with_detail("status", status)
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::OrderNotFound(order_id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
                    .with_detail("orderId", order_id)
            }
            OrderError::MenuItemNotFound(menu_item_id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menuItemId", menu_item_id)
            }
            OrderError::OrderLocked { order_id, reason } => {
                let code = match reason {
                    LockReason::Archived => ErrorCode::OrderArchived,
                    LockReason::Completed => ErrorCode::OrderAlreadyCompleted,
                };
                AppError::with_message(code, message).with_detail("orderId", order_id)
            }
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order storage failure");
                AppError::with_message(classify_storage_error(&e), "Storage failure")
            }
        }
    }
}

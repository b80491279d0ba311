//! Shared types for the ordering core
//!
//! 服务端与客户端 (顾客点单页、后厨屏、服务员手持端) 共用的类型:
//! 订单/账单模型、实时事件、目录数据 (桌台/菜品/商户) 以及统一错误体系。

pub mod error;
pub mod live;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use live::LiveEvent;
pub use order::{Bill, BillItem, Order, OrderItem, OrderItemInput, OrderStatus};

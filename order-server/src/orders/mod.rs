//! Order lifecycle module
//!
//! # Components
//!
//! - [`OrderStorage`] - redb 持久化 (订单、编号索引、桌台索引、账单)
//! - [`OrdersManager`] - 下单合并、状态流转、改菜、归档
//! - [`BillGenerator`] - 完成时生成账单 (幂等)
//! - [`ArchiveScheduler`] - completed 之后延迟归档
//!
//! # Data Flow
//!
//! ```text
//! HTTP handler → OrdersManager → redb (write txn)
//!                      │
//!                      └─ broadcast OrderNotice → EventRouter
//!                                                  ├── LiveOrderHub (vendor channels)
//!                                                  └── ArchiveScheduler (completed orders)
//! ```

pub mod archive_scheduler;
pub mod bill;
pub mod manager;
pub mod storage;

pub use archive_scheduler::ArchiveScheduler;
pub use bill::BillGenerator;
pub use manager::{
    ArchiveOutcome, OrderError, OrderResult, OrdersManager, PlaceOrderRequest, parse_status,
};
pub use storage::{OrderStorage, OrderView};

use shared::LiveEvent;

/// Lifecycle event addressed to a vendor channel
#[derive(Debug, Clone)]
pub struct OrderNotice {
    pub vendor_id: String,
    pub event: LiveEvent,
}

impl OrderNotice {
    /// Completed, not yet archived order carried by an update event
    pub fn completed_order(&self) -> Option<&shared::Order> {
        match &self.event {
            LiveEvent::OrderUpdate { order }
                if order.status == shared::OrderStatus::Completed && !order.archived =>
            {
                Some(order)
            }
            _ => None,
        }
    }
}

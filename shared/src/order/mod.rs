//! Order domain types
//!
//! - [`OrderStatus`]: 四段状态机 new → preparing → ready → completed
//! - [`Order`] / [`OrderItem`]: 订单与行项目快照
//! - [`Bill`]: 完成时生成的不可变账单

pub mod bill;
pub mod money;
pub mod status;
pub mod types;

pub use bill::{Bill, BillItem};
pub use status::OrderStatus;
pub use types::{AmountOverflow, Order, OrderItem, OrderItemInput};

//! Catalog models
//!
//! 由外部协作方 (菜单/桌台管理) 维护，订单核心只读使用。

pub mod dining_table;
pub mod menu_item;
pub mod vendor;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use vendor::*;

//! Order Server - 多租户餐厅点单核心
//!
//! # 架构概述
//!
//! - **订单核心** (`orders`): 下单 / 同桌合并、按 vendor 编号、状态流转、改菜、账单、延迟归档
//! - **目录** (`catalog`): 桌台、菜品、vendor (只读协作数据)
//! - **实时推送** (`live`): 按 vendor 分组的 WebSocket 频道
//! - **HTTP API** (`api`): REST + WebSocket 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、事件路由、后台任务
//! ├── db/            # redb 句柄与存储错误
//! ├── catalog/       # 桌台 / 菜品 / vendor
//! ├── orders/        # OrdersManager、存储、账单、归档调度
//! ├── live/          # LiveOrderHub
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod live;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use live::LiveOrderHub;
pub use orders::{OrderStorage, OrdersManager};

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

/// 初始化日志 (`.env` 需在 [`Config::from_env`] 之前加载)
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    let log_dir = config.log_to_file.then(|| config.log_dir());
    init_logger_with_file(&config.log_level, config.log_json, log_dir.as_deref())?;
    Ok(())
}

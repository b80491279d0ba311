use std::sync::Arc;

use crate::catalog::{CatalogSeed, CatalogStorage};
use crate::core::{BackgroundTasks, Config, EventRouter, Result, TaskKind};
use crate::db;
use crate::live::LiveOrderHub;
use crate::orders::{ArchiveScheduler, OrderStorage, OrdersManager};

/// 归档通道 buffer（关键业务，宁大勿小）
const ARCHIVE_CHANNEL_BUFFER: usize = 1024;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，clone 成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | catalog | CatalogStorage | 桌台 / 菜品 / vendor 目录 |
/// | orders | Arc<OrdersManager> | 订单核心 |
/// | live | LiveOrderHub | vendor 实时频道 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub catalog: CatalogStorage,
    pub orders: Arc<OrdersManager>,
    pub live: LiveOrderHub,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 打开 redb (文件或内存)
    /// 2. 导入目录种子 (SEED_FILE)
    /// 3. 创建 OrdersManager 和 LiveOrderHub
    pub fn initialize(config: &Config) -> Result<Self> {
        let database = if config.storage_in_memory {
            tracing::warn!("Using in-memory storage, data is lost on exit");
            db::open_in_memory()?
        } else {
            let path = config.database_path();
            tracing::info!(path = %path.display(), "Opening order database");
            db::open_database(&path)?
        };

        let catalog = CatalogStorage::open(database.clone())?;
        if let Some(seed_file) = &config.seed_file {
            let count = CatalogSeed::from_file(seed_file)?.apply(&catalog)?;
            tracing::info!(seed_file = %seed_file, records = count, "Catalog seed applied");
        }

        let storage = OrderStorage::open(database)?;
        let orders = Arc::new(OrdersManager::new(
            storage,
            Arc::new(catalog.clone()),
            config.strict_status_sequence,
        ));
        let live = LiveOrderHub::new(config.live_channel_capacity, config.max_ws_per_vendor);

        Ok(Self {
            config: config.clone(),
            catalog,
            orders,
            live,
        })
    }

    /// 启动后台任务
    ///
    /// - EventRouter: OrdersManager → LiveOrderHub / ArchiveScheduler
    /// - ArchiveScheduler: 延迟归档 + 启动恢复 + 周期扫描
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        // 先订阅，保证任务启动前产生的事件不会丢
        let source = self.orders.subscribe();
        let (router, archive_rx) = EventRouter::new(self.live.clone(), ARCHIVE_CHANNEL_BUFFER);
        tasks.spawn(
            "event_router",
            TaskKind::Listener,
            router.run(source, tasks.shutdown_token()),
        );

        let scheduler = ArchiveScheduler::new(
            self.orders.clone(),
            self.config.archive_delay(),
            tasks.shutdown_token(),
        );
        let sweep_interval = self.config.archive_sweep_interval();
        tasks.spawn(
            "archive_scheduler",
            TaskKind::Worker,
            scheduler.run(archive_rx, sweep_interval),
        );

        tasks.log_summary();
        tasks
    }
}

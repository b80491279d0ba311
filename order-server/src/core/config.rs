use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP / WebSocket 端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_TO_FILE | false | 写入 `<work_dir>/logs` |
/// | ARCHIVE_DELAY_SECS | 60 | completed → archived 延迟 |
/// | ARCHIVE_SWEEP_INTERVAL_SECS | 300 | 归档兜底扫描周期 |
/// | STRICT_STATUS_SEQUENCE | true | 禁止跳过状态 |
/// | LIVE_CHANNEL_CAPACITY | 256 | 每个 vendor 的推送缓冲 |
/// | MAX_WS_PER_VENDOR | 20 | 每个 vendor 的实时连接上限 |
/// | STORAGE_IN_MEMORY | false | 内存数据库 (测试用) |
/// | SEED_FILE | - | 启动时导入的目录 JSON |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/orders HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    pub log_level: String,
    pub log_json: bool,
    pub log_to_file: bool,

    /// completed 之后多久归档
    pub archive_delay_secs: u64,
    pub archive_sweep_interval_secs: u64,
    /// 状态只能逐级前进 (new → preparing → ready → completed)
    pub strict_status_sequence: bool,

    pub live_channel_capacity: usize,
    pub max_ws_per_vendor: usize,

    pub storage_in_memory: bool,
    pub seed_file: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_to_file: env_or("LOG_TO_FILE", false),
            archive_delay_secs: env_or("ARCHIVE_DELAY_SECS", 60),
            archive_sweep_interval_secs: env_or("ARCHIVE_SWEEP_INTERVAL_SECS", 300),
            strict_status_sequence: env_or("STRICT_STATUS_SEQUENCE", true),
            live_channel_capacity: env_or("LIVE_CHANNEL_CAPACITY", 256),
            max_ws_per_vendor: env_or("MAX_WS_PER_VENDOR", 20),
            storage_in_memory: env_or("STORAGE_IN_MEMORY", false),
            seed_file: std::env::var("SEED_FILE").ok().filter(|s| !s.trim().is_empty()),
        }
    }

    /// 测试配置：内存数据库，不依赖环境变量
    pub fn for_tests() -> Self {
        Self {
            work_dir: "./data".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_json: false,
            log_to_file: false,
            archive_delay_secs: 60,
            archive_sweep_interval_secs: 300,
            strict_status_sequence: true,
            live_channel_capacity: 64,
            max_ws_per_vendor: 4,
            storage_in_memory: true,
            seed_file: None,
        }
    }

    pub fn archive_delay(&self) -> Duration {
        Duration::from_secs(self.archive_delay_secs)
    }

    pub fn archive_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.archive_sweep_interval_secs.max(1))
    }

    /// redb 数据库文件
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("orders.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

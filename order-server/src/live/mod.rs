//! LiveOrderHub - 按 vendor 分组的实时推送
//!
//! ```text
//! EventRouter
//!       │ LiveEvent (NEW_ORDER / ORDER_UPDATE / ORDER_ARCHIVED)
//!       ▼
//! LiveOrderHub
//!   └── vendors: vendor_id → VendorChannel
//!         ├── broadcast: Sender<Arc<LiveEvent>> (fan-out 到多个 viewer)
//!         └── connections: 当前订阅的连接 id
//!               │
//!               ▼
//!         WS handler (subscribe → 推送 → unsubscribe)
//! ```
//!
//! 推送是 best-effort：断开的 viewer 错过的事件不会重放，重连后自行拉取全量。

use dashmap::DashMap;
use dashmap::DashSet;
use shared::LiveEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

/// 默认 broadcast 容量，足以缓冲连接时突发
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 默认每个 vendor 的最大连接数
pub const DEFAULT_MAX_CONNECTIONS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("Vendor {vendor_id} reached the limit of {max} realtime connections")]
    ConnectionLimit { vendor_id: String, max: usize },
}

/// 单个 vendor 的频道
struct VendorChannel {
    tx: broadcast::Sender<Arc<LiveEvent>>,
    connections: DashSet<u64>,
}

impl VendorChannel {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            connections: DashSet::new(),
        }
    }
}

/// 一个 viewer 的订阅句柄
///
/// drop 时 (或交还给 [`LiveOrderHub::unsubscribe`]) 从分组中移除，
/// upgrade 失败的连接也不会占用名额。
pub struct LiveSubscription {
    id: u64,
    vendor_id: String,
    pub rx: broadcast::Receiver<Arc<LiveEvent>>,
    vendors: Arc<DashMap<String, VendorChannel>>,
}

impl LiveSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        if let Some(channel) = self.vendors.get(&self.vendor_id) {
            channel.connections.remove(&self.id);
        }
        self.vendors
            .remove_if(&self.vendor_id, |_, channel| channel.connections.is_empty());

        tracing::debug!(vendor_id = %self.vendor_id, connection_id = self.id, "Live viewer unsubscribed");
    }
}

impl std::fmt::Debug for LiveSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSubscription")
            .field("id", &self.id)
            .field("vendor_id", &self.vendor_id)
            .finish()
    }
}

/// 全局实时 hub，按 vendor 严格隔离
#[derive(Clone)]
pub struct LiveOrderHub {
    vendors: Arc<DashMap<String, VendorChannel>>,
    capacity: usize,
    max_connections: usize,
    next_id: Arc<AtomicU64>,
}

impl Default for LiveOrderHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_CONNECTIONS)
    }
}

impl LiveOrderHub {
    pub fn new(capacity: usize, max_connections: usize) -> Self {
        Self {
            vendors: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            max_connections,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// 订阅 vendor 的事件流
    ///
    /// 连接数检查与登记在同一个 entry 锁内完成。
    pub fn subscribe(&self, vendor_id: &str) -> Result<LiveSubscription, HubError> {
        let channel = self
            .vendors
            .entry(vendor_id.to_string())
            .or_insert_with(|| VendorChannel::new(self.capacity));

        if channel.connections.len() >= self.max_connections {
            return Err(HubError::ConnectionLimit {
                vendor_id: vendor_id.to_string(),
                max: self.max_connections,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        channel.connections.insert(id);
        let rx = channel.tx.subscribe();
        let connections = channel.connections.len();
        drop(channel);

        tracing::debug!(vendor_id, connection_id = id, connections, "Live viewer subscribed");
        Ok(LiveSubscription {
            id,
            vendor_id: vendor_id.to_string(),
            rx,
            vendors: Arc::clone(&self.vendors),
        })
    }

    /// 移除连接；分组空了就清理 vendor 条目
    pub fn unsubscribe(&self, subscription: LiveSubscription) {
        drop(subscription);
    }

    /// 推送给 vendor 的所有 viewer，返回收到的连接数
    ///
    /// 没有 viewer 时事件直接丢弃。
    pub fn broadcast(&self, vendor_id: &str, event: LiveEvent) -> usize {
        let Some(channel) = self.vendors.get(vendor_id) else {
            return 0;
        };
        // 无订阅者时 send 返回 Err，安全忽略
        channel.tx.send(Arc::new(event)).unwrap_or(0)
    }

    pub fn connection_count(&self, vendor_id: &str) -> usize {
        self.vendors
            .get(vendor_id)
            .map(|channel| channel.connections.len())
            .unwrap_or(0)
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archived(order_id: &str) -> LiveEvent {
        LiveEvent::OrderArchived {
            order_id: order_id.to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_viewer_of_vendor() {
        let hub = LiveOrderHub::default();
        let mut kitchen = hub.subscribe("v1").unwrap();
        let mut handheld = hub.subscribe("v1").unwrap();

        assert_eq!(hub.broadcast("v1", archived("o1")), 2);

        for sub in [&mut kitchen, &mut handheld] {
            let event = sub.rx.recv().await.unwrap();
            assert_eq!(event.order_id(), "o1");
        }
    }

    #[tokio::test]
    async fn vendor_isolation() {
        let hub = LiveOrderHub::default();
        let mut a = hub.subscribe("vendor-a").unwrap();
        let mut b = hub.subscribe("vendor-b").unwrap();

        hub.broadcast("vendor-a", archived("only-a"));

        assert_eq!(a.rx.recv().await.unwrap().order_id(), "only-a");
        assert!(matches!(
            b.rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn broadcast_without_viewers_is_dropped() {
        let hub = LiveOrderHub::default();
        assert_eq!(hub.broadcast("nobody", archived("o1")), 0);
        assert_eq!(hub.vendor_count(), 0);
    }

    #[test]
    fn connection_limit_per_vendor() {
        let hub = LiveOrderHub::new(16, 2);
        let first = hub.subscribe("v1").unwrap();
        let _second = hub.subscribe("v1").unwrap();

        let err = hub.subscribe("v1").unwrap_err();
        assert_eq!(
            err,
            HubError::ConnectionLimit {
                vendor_id: "v1".to_string(),
                max: 2
            }
        );
        // 其他 vendor 不受影响
        assert!(hub.subscribe("v2").is_ok());

        hub.unsubscribe(first);
        assert!(hub.subscribe("v1").is_ok());
    }

    #[test]
    fn unsubscribe_cleans_up_empty_vendor() {
        let hub = LiveOrderHub::default();
        let first = hub.subscribe("v1").unwrap();
        let second = hub.subscribe("v1").unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(hub.connection_count("v1"), 2);

        hub.unsubscribe(first);
        assert_eq!(hub.connection_count("v1"), 1);
        assert_eq!(hub.vendor_count(), 1);

        hub.unsubscribe(second);
        assert_eq!(hub.connection_count("v1"), 0);
        assert_eq!(hub.vendor_count(), 0);
    }

    #[test]
    fn dropped_subscription_frees_its_slot() {
        let hub = LiveOrderHub::new(16, 1);
        {
            let _sub = hub.subscribe("v1").unwrap();
            assert!(hub.subscribe("v1").is_err());
        }
        assert_eq!(hub.connection_count("v1"), 0);
        assert!(hub.subscribe("v1").is_ok());
    }

    #[tokio::test]
    async fn slow_viewer_lags_instead_of_blocking() {
        let hub = LiveOrderHub::new(2, 4);
        let mut slow = hub.subscribe("v1").unwrap();

        for i in 0..5 {
            hub.broadcast("v1", archived(&format!("o{i}")));
        }

        assert!(matches!(
            slow.rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(slow.rx.recv().await.unwrap().order_id(), "o3");
    }
}

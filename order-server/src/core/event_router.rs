//! Event Router - 事件路由与分发
//!
//! 解耦 OrdersManager 和下游消费者。
//!
//! ```text
//! OrdersManager (broadcast)
//!        │
//!        └── EventRouter
//!               ├── mpsc ──► ArchiveScheduler (completed orders only) [CRITICAL]
//!               └── LiveOrderHub ──► vendor viewers (all events) [best-effort]
//! ```
//!
//! ## 优先级策略
//!
//! - **Archive**: 关键业务，阻塞发送保证不丢失
//! - **Live**: Best-effort，没有 viewer 或 viewer 落后时直接丢弃

use crate::live::LiveOrderHub;
use crate::orders::OrderNotice;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// 事件路由器
///
/// 订阅 OrdersManager 的 broadcast，completed 订单送往归档通道，
/// 所有事件推送到对应 vendor 的实时频道。
pub struct EventRouter {
    live: LiveOrderHub,
    archive_tx: mpsc::Sender<Arc<OrderNotice>>,
}

impl EventRouter {
    /// 创建路由器和归档通道
    ///
    /// `archive_buffer`: 归档通道 buffer（关键业务，建议较大）
    pub fn new(
        live: LiveOrderHub,
        archive_buffer: usize,
    ) -> (Self, mpsc::Receiver<Arc<OrderNotice>>) {
        let (archive_tx, archive_rx) = mpsc::channel(archive_buffer);
        (Self { live, archive_tx }, archive_rx)
    }

    /// 运行路由器（直到源通道关闭或 shutdown）
    pub async fn run(self, mut source: broadcast::Receiver<OrderNotice>, shutdown: CancellationToken) {
        tracing::info!("Event router started");

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Event router stopped");
                    break;
                }
                received = source.recv() => received,
            };
            match received {
                Ok(notice) => {
                    self.dispatch(notice).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Lag 意味着可能漏掉归档，由 ArchiveScheduler 的 sweep 兜底
                    tracing::error!(
                        skipped = n,
                        "Event router lagged! Events skipped, archive sweep will catch up"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Source channel closed, event router stopping");
                    break;
                }
            }
        }
    }

    async fn dispatch(&self, notice: OrderNotice) {
        let notice = Arc::new(notice);

        // 1. 归档通道优先：阻塞发送保证不丢失
        if notice.completed_order().is_some()
            && self.archive_tx.send(Arc::clone(&notice)).await.is_err()
        {
            tracing::error!(
                order_id = %notice.event.order_id(),
                "Archive channel closed, completed order will wait for the sweep"
            );
        }

        // 2. 实时推送：best-effort
        let delivered = self
            .live
            .broadcast(&notice.vendor_id, notice.event.clone());
        tracing::debug!(
            vendor_id = %notice.vendor_id,
            event = notice.event.kind(),
            order_id = %notice.event.order_id(),
            delivered,
            "Live event dispatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::{Order, OrderStatus};
    use shared::LiveEvent;

    fn make_order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            vendor_id: "v1".to_string(),
            table_id: None,
            order_number: 1,
            status,
            items: vec![],
            total_amount: Decimal::ZERO,
            customer_name: None,
            archived: false,
            created_at: 0,
            completed_at: (status == OrderStatus::Completed).then_some(0),
        }
    }

    fn update(order: Order) -> OrderNotice {
        OrderNotice {
            vendor_id: order.vendor_id.clone(),
            event: LiveEvent::OrderUpdate { order },
        }
    }

    #[tokio::test]
    async fn test_event_routing() {
        let live = LiveOrderHub::default();
        let mut viewer = live.subscribe("v1").unwrap();
        let (router, mut archive_rx) = EventRouter::new(live.clone(), 16);
        let (tx, rx) = broadcast::channel(16);

        tokio::spawn(router.run(rx, CancellationToken::new()));

        // 非 completed：只推送给 viewer
        tx.send(update(make_order("o1", OrderStatus::Preparing)))
            .unwrap();
        assert_eq!(viewer.rx.recv().await.unwrap().order_id(), "o1");

        // completed：viewer + 归档通道
        tx.send(update(make_order("o2", OrderStatus::Completed)))
            .unwrap();
        assert_eq!(viewer.rx.recv().await.unwrap().order_id(), "o2");
        let archived = archive_rx.recv().await.unwrap();
        assert_eq!(archived.event.order_id(), "o2");
        assert!(archive_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_archived_event_not_rescheduled() {
        let live = LiveOrderHub::default();
        let mut viewer = live.subscribe("v1").unwrap();
        let (router, mut archive_rx) = EventRouter::new(live.clone(), 16);
        let (tx, rx) = broadcast::channel(16);

        tokio::spawn(router.run(rx, CancellationToken::new()));

        tx.send(OrderNotice {
            vendor_id: "v1".to_string(),
            event: LiveEvent::OrderArchived {
                order_id: "o3".to_string(),
            },
        })
        .unwrap();

        let event = viewer.rx.recv().await.unwrap();
        assert_eq!(event.kind(), "ORDER_ARCHIVED");
        assert!(archive_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_router_stops_when_source_closes() {
        let (router, _archive_rx) = EventRouter::new(LiveOrderHub::default(), 4);
        let (tx, rx) = broadcast::channel::<OrderNotice>(4);

        let handle = tokio::spawn(router.run(rx, CancellationToken::new()));
        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_router_stops_on_shutdown() {
        let (router, _archive_rx) = EventRouter::new(LiveOrderHub::default(), 4);
        let (_tx, rx) = broadcast::channel::<OrderNotice>(4);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(router.run(rx, shutdown.clone()));
        shutdown.cancel();
        handle.await.unwrap();
    }
}

//! Archive Scheduler - completed 订单延迟归档
//!
//! 每个订单最多一个待触发的定时器 (order_id → 取消令牌)。同一订单再次
//! 进入 completed 时，旧定时器被取消并替换。
//!
//! 定时器只在内存中，进程重启后由 [`ArchiveScheduler::recover`] 按剩余时间
//! 重新挂载；周期性 [`ArchiveScheduler::sweep`] 兜底处理漏掉的订单。
//!
//! 归档失败 (订单消失、状态已不是 completed) 只记录日志，不会抛给任何调用方。
//!
//! Note: redb operations are synchronous for stability.

use super::OrderNotice;
use super::manager::{ArchiveOutcome, OrdersManager};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// 待触发的定时器
struct PendingTimer {
    /// 代数，只有最新一代的定时器可以触发
    generation: u64,
    cancel: CancellationToken,
}

/// Delayed, cancellable archival per order
pub struct ArchiveScheduler {
    manager: Arc<OrdersManager>,
    delay: Duration,
    pending: DashMap<String, PendingTimer>,
    next_generation: AtomicU64,
    shutdown: CancellationToken,
}

impl ArchiveScheduler {
    pub fn new(manager: Arc<OrdersManager>, delay: Duration, shutdown: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            manager,
            delay,
            pending: DashMap::new(),
            next_generation: AtomicU64::new(0),
            shutdown,
        })
    }

    /// Run the scheduler until shutdown
    ///
    /// Re-arms timers for completed orders left over from a previous run,
    /// then listens for completion notices from the event router and sweeps
    /// periodically.
    pub async fn run(
        self: Arc<Self>,
        mut notices: mpsc::Receiver<Arc<OrderNotice>>,
        sweep_interval: Duration,
    ) {
        tracing::info!(delay_secs = self.delay.as_secs(), "ArchiveScheduler started");

        match self.recover() {
            0 => {}
            n => tracing::info!(count = n, "Re-armed archival timers from storage"),
        }

        let mut sweep = tokio::time::interval(sweep_interval);
        sweep.tick().await; // skip immediate

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.cancel_all();
                    tracing::info!("ArchiveScheduler stopped");
                    break;
                }
                notice = notices.recv() => {
                    match notice {
                        Some(notice) => {
                            if let Some(order) = notice.completed_order() {
                                let completed_at = order.completed_at.unwrap_or_else(shared::util::now_millis);
                                self.schedule(&order.id, completed_at);
                            }
                        }
                        None => {
                            tracing::info!("Archive channel closed, shutting down ArchiveScheduler");
                            self.cancel_all();
                            break;
                        }
                    }
                }
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }
    }

    /// Arm (or replace) the timer of an order
    ///
    /// The timer fires `delay` after `completed_at` (epoch millis), immediately
    /// if that moment already passed.
    pub fn schedule(self: &Arc<Self>, order_id: &str, completed_at: i64) {
        let remaining = self.remaining(completed_at);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = self.shutdown.child_token();

        if let Some(previous) = self.pending.insert(
            order_id.to_string(),
            PendingTimer {
                generation,
                cancel: cancel.clone(),
            },
        ) {
            previous.cancel.cancel();
            tracing::debug!(order_id, "Replaced pending archival timer");
        }

        tracing::debug!(
            order_id,
            remaining_ms = remaining.as_millis() as u64,
            "Archival timer armed"
        );

        let scheduler = Arc::clone(self);
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(remaining) => {}
            }

            let current = scheduler
                .pending
                .remove_if(&order_id, |_, timer| timer.generation == generation)
                .is_some();
            if current {
                scheduler.fire(&order_id);
            }
        });
    }

    /// Re-arm timers for every completed, unarchived order
    pub fn recover(self: &Arc<Self>) -> usize {
        let orders = match self.manager.completed_unarchived() {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load completed orders for archival recovery");
                return 0;
            }
        };

        for order in &orders {
            let completed_at = order.completed_at.unwrap_or(order.created_at);
            self.schedule(&order.id, completed_at);
        }
        orders.len()
    }

    /// Archive overdue completed orders that have no pending timer
    ///
    /// Returns the number of orders archived.
    pub fn sweep(&self) -> usize {
        let orders = match self.manager.completed_unarchived() {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Archive sweep failed to load completed orders");
                return 0;
            }
        };

        let mut archived = 0;
        for order in orders {
            if self.pending.contains_key(&order.id) {
                continue;
            }
            let completed_at = order.completed_at.unwrap_or(order.created_at);
            if self.remaining(completed_at).is_zero() && self.fire(&order.id) {
                archived += 1;
            }
        }

        if archived > 0 {
            tracing::info!(count = archived, "Archive sweep archived overdue orders");
        }
        archived
    }

    /// Number of armed timers
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, order_id: &str) -> bool {
        self.pending.contains_key(order_id)
    }

    /// Cancel every pending timer
    pub fn cancel_all(&self) {
        for entry in self.pending.iter() {
            entry.value().cancel.cancel();
        }
        self.pending.clear();
    }

    fn remaining(&self, completed_at: i64) -> Duration {
        let due = completed_at.saturating_add(self.delay.as_millis() as i64);
        let left = due.saturating_sub(shared::util::now_millis()).max(0) as u64;
        Duration::from_millis(left).min(self.delay)
    }

    /// Archive one order, logging and swallowing every failure
    fn fire(&self, order_id: &str) -> bool {
        match self.manager.archive_order(order_id) {
            Ok(ArchiveOutcome::Archived(_)) => true,
            Ok(ArchiveOutcome::Missing) => {
                tracing::warn!(order_id, "Archival skipped: order no longer exists");
                false
            }
            Ok(ArchiveOutcome::NotCompleted(status)) => {
                tracing::warn!(order_id, status = %status, "Archival skipped: order left completed");
                false
            }
            Ok(ArchiveOutcome::AlreadyArchived) => {
                tracing::debug!(order_id, "Archival skipped: already archived");
                false
            }
            Err(e) => {
                tracing::error!(order_id, error = %e, "Archival failed");
                false
            }
        }
    }
}

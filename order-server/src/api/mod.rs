//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 下单、状态流转、改菜、订单列表
//! - [`bills`] - 账单查询
//! - [`ws`] - vendor 实时推送 (WebSocket)

pub mod bills;
pub mod health;
pub mod orders;
pub mod ws;

use axum::Router;
use shared::error::{AppError, AppResult};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::orders::{OrderResult, OrdersManager};

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(bills::router())
        .merge(ws::router())
}

/// 完整应用：路由 + 状态 + HTTP 中间件
pub fn build_router(state: ServerState) -> Router {
    build_app().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // 顾客扫码页面来自其他域名
            .layer(CorsLayer::permissive()),
    )
}

/// 在阻塞线程上调用 OrdersManager (redb 是同步的)
pub(crate) async fn with_orders<T, F>(state: &ServerState, f: F) -> AppResult<T>
where
    F: FnOnce(&OrdersManager) -> OrderResult<T> + Send + 'static,
    T: Send + 'static,
{
    let orders = state.orders.clone();
    tokio::task::spawn_blocking(move || f(&orders))
        .await
        .map_err(|e| AppError::internal(format!("Order task failed: {e}")))?
        .map_err(AppError::from)
}

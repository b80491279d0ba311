//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 下单 (同桌合并) |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id}/status | PATCH | 状态流转 |
//! | /api/orders/{id}/items | PATCH | 改菜 (按菜单价重算) |
//! | /api/vendors/{vendor_id}/orders | GET | 活跃订单 (`?includeArchived=true` 含历史) |
//! | /api/vendors/{vendor_id}/orders/archived | GET | 已归档订单 |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", order_routes())
        .route("/api/vendors/{vendor_id}/orders", get(handler::list))
        .route(
            "/api/vendors/{vendor_id}/orders/archived",
            get(handler::list_archived),
        )
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::place))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/items", patch(handler::update_items))
}

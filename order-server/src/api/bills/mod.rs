//! Bill API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/bills/{order_id} | GET | 账单；未完成的订单返回 404 (尚未生成) |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/bills/{order_id}", get(handler::get_by_order))
}

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::Bill;

use crate::api::with_orders;
use crate::core::ServerState;

/// Get the bill of an order
///
/// A completed order missing its bill gets it regenerated here.
pub async fn get_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Bill>> {
    let lookup_id = order_id.clone();
    let bill = with_orders(&state, move |orders| orders.get_bill(&lookup_id)).await?;
    bill.map(Json).ok_or_else(|| {
        AppError::with_message(ErrorCode::BillNotGenerated, "Bill not yet generated")
            .with_detail("orderId", order_id)
    })
}

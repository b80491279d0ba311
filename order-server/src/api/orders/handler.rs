//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::order::{Order, OrderItemInput};

use crate::api::with_orders;
use crate::core::ServerState;
use crate::orders::{OrderView, PlaceOrderRequest, parse_status};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemsBody {
    pub items: Vec<OrderItemInput>,
}

/// Place an order, merging into the table's active order when there is one
pub async fn place(
    State(state): State<ServerState>,
    Json(mut payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<Order>> {
    payload.vendor_id = payload.vendor_id.trim().to_string();
    if payload.vendor_id.is_empty() {
        return Err(AppError::validation("vendorId is required").with_detail("field", "vendorId"));
    }
    let order = with_orders(&state, move |orders| orders.place_order(payload)).await?;
    Ok(Json(order))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = with_orders(&state, move |orders| orders.get_order(&id)).await?;
    Ok(Json(order))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusBody>,
) -> AppResult<Json<Order>> {
    let status = parse_status(&payload.status)?;
    let order = with_orders(&state, move |orders| orders.set_status(&id, status)).await?;
    Ok(Json(order))
}

pub async fn update_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ItemsBody>,
) -> AppResult<Json<Order>> {
    let order = with_orders(&state, move |orders| orders.update_items(&id, &payload.items)).await?;
    Ok(Json(order))
}

/// Active orders of a vendor, or the full history with `includeArchived=true`
pub async fn list(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let view = if query.include_archived {
        OrderView::All
    } else {
        OrderView::Current
    };
    let orders = with_orders(&state, move |orders| orders.list_orders(&vendor_id, view)).await?;
    Ok(Json(orders))
}

pub async fn list_archived(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = with_orders(&state, move |orders| {
        orders.list_orders(&vendor_id, OrderView::Archived)
    })
    .await?;
    Ok(Json(orders))
}

//! # Order Routes
//!
//! ## Placing an Order
//! ```text
//! POST /api/orders  { items, subtotal, tax, deliveryFee, total, customerInfo, ... }
//!      │
//!      ├── load menu rows for every item id
//!      ├── CheckoutPayload::verify   ──► 400 / 422 on any mismatch
//!      ├── resolve currency code     ──► unknown code: default currency
//!      ├── OrderRepository::create   (one transaction: order + lines)
//!      │
//!      └── 201 { orderId }
//! ```
//!
//! The stored totals are the server's own; the client's figures only have to
//! agree with them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bistro_core::validation::validate_uuid;
use bistro_core::{CheckoutPayload, Order, OrderDetail, OrderReceipt, OrderStatus};
use bistro_db::{NewOrder, OrderFilter};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::routes::currencies::load_settings;
use crate::state::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderReceipt>)> {
    let Json(payload) = payload?;

    let ids: Vec<i64> = payload.items.iter().map(|item| item.id).collect();
    let menu = state.db.menu().get_many(&ids).await?;

    let totals = payload
        .verify(|id| menu.get(&id), &state.policy)
        .inspect_err(|e| warn!(error = %e, "Rejected checkout payload"))?;

    let mut new_order = NewOrder::from_checkout(&payload, totals);

    let settings = load_settings(&state.db).await?;
    let (currency, fell_back) = settings.select(&new_order.currency_code);
    if fell_back {
        warn!(
            requested = %new_order.currency_code,
            used = %currency.code,
            "Unknown currency on order, using default"
        );
    }
    new_order.currency_code = currency.code.clone();

    let detail = state.db.orders().create(&new_order).await?;

    info!(
        order_id = %detail.order.id,
        lines = detail.items.len(),
        total_cents = detail.order.total_cents,
        "Order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderReceipt {
            order_id: detail.order.id,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

/// Newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            OrderStatus::parse(s)
                .ok_or_else(|| ApiError::validation(format!("Unknown order status: {s}")))
        })
        .transpose()?;

    let orders = state
        .db
        .orders()
        .list(OrderFilter {
            status,
            limit: query.limit,
        })
        .await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    validate_uuid(&id)?;
    state
        .db
        .orders()
        .get_detail(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    validate_uuid(&id)?;
    let Json(body) = body?;
    let order = state.db.orders().update_status(&id, body.status).await?;
    Ok(Json(order))
}

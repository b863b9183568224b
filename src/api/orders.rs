use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use super::service_error;
use crate::auth::Claims;
use crate::services::{self, order_service};

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Order created, stock decremented"),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Unknown book in line items")
    )
)]
pub async fn create_order(
    State(db): State<DatabaseConnection>,
    Json(input): Json<order_service::CreateOrderInput>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let created = order_service::create_order(&db, input)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order": created,
            "message": "Order created successfully"
        })),
    ))
}

pub async fn list_orders(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let orders = order_service::list_orders(&db)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "orders": orders, "total": orders.len() })))
}

pub async fn list_user_orders(
    State(db): State<DatabaseConnection>,
    Path(userid): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let orders = order_service::list_user_orders(&db, userid)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "orders": orders, "total": orders.len() })))
}

pub async fn get_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let order = order_service::get_order(&db, id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "order": order })))
}

pub async fn approve_order(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let order = order_service::approve_order(&db, id)
        .await
        .map_err(service_error)?;

    services::notify(&db, "order", format!("Order {} approved", order.order_id)).await;

    Ok(Json(json!({ "order": order, "message": "Order approved" })))
}

pub async fn reject_order(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let order = order_service::reject_order(&db, id)
        .await
        .map_err(service_error)?;

    services::notify(
        &db,
        "order",
        format!("Order {} rejected, stock restored", order.order_id),
    )
    .await;

    Ok(Json(json!({ "order": order, "message": "Order rejected" })))
}

pub async fn cancel_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let order = order_service::cancel_order(&db, id)
        .await
        .map_err(service_error)?;

    services::notify(
        &db,
        "order",
        format!("Order {} cancelled, stock restored", order.order_id),
    )
    .await;

    Ok(Json(json!({ "order": order, "message": "Order cancelled" })))
}

pub async fn mark_paid(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let order = order_service::mark_paid(&db, id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "order": order, "message": "Payment recorded" })))
}

pub async fn complete_order(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let order = order_service::complete_order(&db, id)
        .await
        .map_err(service_error)?;

    services::notify(&db, "order", format!("Order {} completed", order.order_id)).await;

    Ok(Json(json!({ "order": order, "message": "Order completed" })))
}

pub async fn update_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(input): Json<order_service::UpdateOrderInput>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let updated = order_service::update_order(&db, id, input)
        .await
        .map_err(service_error)?;
    Ok(Json(
        json!({ "order": updated, "message": "Order updated successfully" }),
    ))
}

pub async fn delete_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    order_service::delete_order(&db, id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

#[derive(Deserialize)]
pub struct DisputeRequest {
    pub message: String,
}

pub async fn open_dispute(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<DisputeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let order = order_service::open_dispute(&db, id, payload.message)
        .await
        .map_err(service_error)?;

    services::notify(
        &db,
        "order",
        format!("Dispute opened on order {}", order.order_id),
    )
    .await;

    Ok(Json(json!({ "order": order, "message": "Dispute opened" })))
}

#[derive(Deserialize)]
pub struct ResolveDisputeRequest {
    pub resolution: String,
}

pub async fn resolve_dispute(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<ResolveDisputeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let order = order_service::resolve_dispute(&db, id, payload.resolution)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "order": order, "message": "Dispute resolved" })))
}

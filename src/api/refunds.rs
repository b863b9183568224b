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
use crate::services::refund_service;

#[derive(Deserialize)]
pub struct CreateRefundRequest {
    pub payment_ref: i32,
    pub reason: Option<String>,
}

pub async fn create_refund(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateRefundRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let refund = refund_service::create_refund(&db, payload.payment_ref, payload.reason)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "refund": refund, "message": "Refund requested successfully" })),
    ))
}

pub async fn list_refunds(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let refunds = refund_service::list_refunds(&db)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "refunds": refunds, "total": refunds.len() })))
}

pub async fn approve_refund(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let refund = refund_service::approve_refund(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "refund": refund, "message": "Refund approved" })))
}

pub async fn reject_refund(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let refund = refund_service::reject_refund(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "refund": refund, "message": "Refund rejected" })))
}

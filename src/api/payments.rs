use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use super::service_error;
use crate::models::payment::{self, Entity as Payment};
use crate::services::{self, ServiceError};

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub user_id: i32,
    pub giver_id: i32,
    pub book_id: String,
    pub amount: f64,
    pub payment_date: Option<String>,
}

pub async fn create_payment(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if payload.amount <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Amount must be positive" })),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();

    let saved = async {
        let txn = db.begin().await.map_err(ServiceError::from)?;
        let payment_id = services::next_id(&txn, "payment", "PAY").await?;

        let saved = payment::ActiveModel {
            payment_id: Set(payment_id),
            user_id: Set(payload.user_id),
            giver_id: Set(payload.giver_id),
            book_id: Set(payload.book_id),
            amount: Set(payload.amount),
            payment_date: Set(payload.payment_date.unwrap_or_else(|| now.clone())),
            status: Set("PENDING".to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::from)?;

        txn.commit().await.map_err(ServiceError::from)?;
        Ok::<_, ServiceError>(saved)
    }
    .await
    .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "payment": saved, "message": "Payment recorded successfully" })),
    ))
}

pub async fn list_payments(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let payments = Payment::find()
        .order_by_desc(payment::Column::CreatedAt)
        .all(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    Ok(Json(json!({ "payments": payments, "total": payments.len() })))
}

pub async fn get_payment(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let payment = Payment::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Payment not found" })),
        ))?;

    Ok(Json(json!({ "payment": payment })))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !["PENDING", "APPROVED", "REJECTED"].contains(&payload.status.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Unknown payment status {}", payload.status) })),
        ));
    }

    let payment = Payment::find_by_id(id)
        .one(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Payment not found" })),
        ))?;

    let mut active: payment::ActiveModel = payment.into();
    active.status = Set(payload.status);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(Json(
        json!({ "payment": updated, "message": "Payment status updated" }),
    ))
}

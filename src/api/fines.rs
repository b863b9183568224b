use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use super::service_error;
use crate::auth::Claims;
use crate::services::fine_service;

/// The overdue sweep runs on every listing rather than on a schedule, so the
/// admin always sees fines that are current as of this request.
pub async fn list_fines(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let created = fine_service::calculate_fines(&db)
        .await
        .map_err(service_error)?;

    if created > 0 {
        tracing::info!("overdue sweep created {} fine(s)", created);
    }

    let fines = fine_service::list_fines(&db).await.map_err(service_error)?;
    Ok(Json(json!({ "fines": fines, "total": fines.len() })))
}

pub async fn approve_fine(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let fine = fine_service::approve_fine(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "fine": fine, "message": "Fine approved" })))
}

pub async fn reject_fine(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let fine = fine_service::reject_fine(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "fine": fine, "message": "Fine rejected" })))
}

pub async fn mark_paid(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let fine = fine_service::mark_fine_paid(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "fine": fine, "message": "Fine marked paid" })))
}

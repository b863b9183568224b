use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::models::supplier::{self, Entity as Supplier};

#[derive(Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn list_suppliers(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Supplier::find().all(&db).await {
        Ok(suppliers) => {
            Json(json!({ "suppliers": suppliers, "total": suppliers.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn create_supplier(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SupplierRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let now = chrono::Utc::now().to_rfc3339();
    let saved = supplier::ActiveModel {
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "supplier": saved,
            "message": "Supplier created successfully"
        })),
    ))
}

pub async fn update_supplier(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<SupplierRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let supplier = Supplier::find_by_id(id)
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
            Json(json!({ "error": "Supplier not found" })),
        ))?;

    let mut active: supplier::ActiveModel = supplier.into();
    active.name = Set(payload.name);
    active.email = Set(payload.email);
    active.phone = Set(payload.phone);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(Json(json!({
        "supplier": updated,
        "message": "Supplier updated successfully"
    })))
}

pub async fn delete_supplier(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let res = Supplier::delete_by_id(id).exec(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    if res.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Supplier not found" })),
        ));
    }

    Ok(Json(json!({ "message": "Supplier deleted successfully" })))
}

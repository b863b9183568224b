//! Legacy inventory surface.
//!
//! Older clients read stock as `{bookId, itemName, quantity, price}` rows.
//! That shape is served here as a view over the canonical products table, so
//! the two can never disagree.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde_json::{json, Value};

use crate::models::product::{self, Entity as Product};

fn to_legacy_row(p: &product::Model) -> Value {
    json!({
        "bookId": p.code,
        "itemName": p.name,
        "quantity": p.stock_current,
        "price": p.price,
    })
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Stock in the legacy inventory shape")
    )
)]
pub async fn list_inventory(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Product::find().all(&db).await {
        Ok(products) => {
            let rows: Vec<Value> = products.iter().map(to_legacy_row).collect();
            Json(json!({ "inventory": rows, "total": rows.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn get_inventory_item(
    State(db): State<DatabaseConnection>,
    Path(book_id): Path<String>,
) -> impl IntoResponse {
    match Product::find()
        .filter(product::Column::Code.eq(&book_id))
        .one(&db)
        .await
    {
        Ok(Some(product)) => Json(json!({ "item": to_legacy_row(&product) })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Inventory item not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Compatibility shim for the old admin "sync" button. The inventory view is
/// derived from products, so there is nothing to copy; this reports what the
/// view currently exposes.
pub async fn sync_to_inventory(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Product::find().count(&db).await {
        Ok(count) => Json(json!({
            "synced": count,
            "message": "Inventory reflects products directly; no copy needed"
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

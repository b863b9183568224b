use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde_json::json;

use crate::auth::Claims;
use crate::models::product::{self, Entity as Product, ProductDto};

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products with derived availability status")
    )
)]
pub async fn list_products(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Product::find().all(&db).await {
        Ok(products) => {
            let dtos: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();
            Json(json!({ "products": dtos, "total": dtos.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn get_product(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Product::find_by_id(id).one(&db).await {
        Ok(Some(product)) => Json(json!({ "product": ProductDto::from(product) })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Product not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Duplicate product code")
    )
)]
pub async fn create_product(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(dto): Json<ProductDto>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let existing = Product::find()
        .filter(product::Column::Code.eq(&dto.code))
        .one(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    if existing.is_some() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Product code {} already exists", dto.code) })),
        ));
    }

    if dto.stock_current < 0 || dto.stock_total < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Stock counts cannot be negative" })),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let saved = product::ActiveModel {
        code: Set(dto.code),
        name: Set(dto.name),
        category: Set(dto.category),
        price: Set(dto.price),
        stock_current: Set(dto.stock_current),
        stock_total: Set(dto.stock_total),
        supplier: Set(dto.supplier),
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
            "product": ProductDto::from(saved),
            "message": "Product created successfully"
        })),
    ))
}

pub async fn update_product(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<ProductDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let product = Product::find_by_id(id)
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
            Json(json!({ "error": "Product not found" })),
        ))?;

    if dto.stock_current < 0 || dto.stock_total < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Stock counts cannot be negative" })),
        ));
    }

    // The code is the business key shared with orders and the legacy
    // inventory view; it never changes after creation.
    let mut active: product::ActiveModel = product.into();
    active.name = Set(dto.name);
    active.category = Set(dto.category);
    active.price = Set(dto.price);
    active.stock_current = Set(dto.stock_current);
    active.stock_total = Set(dto.stock_total);
    active.supplier = Set(dto.supplier);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(Json(json!({
        "product": ProductDto::from(updated),
        "message": "Product updated successfully"
    })))
}

pub async fn delete_product(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    claims.require_role(&["admin", "inventory_manager"])?;

    let res = Product::delete_by_id(id).exec(&db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    if res.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Product not found" })),
        ));
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

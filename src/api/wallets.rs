use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::*;
use serde_json::{json, Value};

use super::service_error;
use crate::auth::Claims;
use crate::models::wallet::{self, Entity as Wallet};
use crate::services::wallet_service;

pub async fn list_wallets(
    claims: Claims,
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let wallets = Wallet::find()
        .order_by_asc(wallet::Column::Id)
        .all(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    Ok(Json(json!({ "wallets": wallets, "total": wallets.len() })))
}

pub async fn get_system_wallet(
    claims: Claims,
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    claims.require_role(&["admin"])?;

    let wallet = wallet_service::get_or_create_system_wallet(&db)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "wallet": wallet })))
}

pub async fn get_user_wallet(
    _claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let wallet = wallet_service::get_or_create_user_wallet(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "wallet": wallet })))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde_json::json;

use crate::models::notification::{self, Entity as Notification};

pub async fn list_notifications(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Notification::find()
        .order_by_desc(notification::Column::CreatedAt)
        .all(&db)
        .await
    {
        Ok(notifications) => Json(json!({
            "notifications": notifications,
            "total": notifications.len()
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn mark_read(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let notification = Notification::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(notification) = notification {
        let mut active: notification::ActiveModel = notification.into();
        active.read = Set(true);

        match active.update(&db).await {
            Ok(model) => Json(json!({ "notification": model })).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Notification not found" })),
        )
            .into_response()
    }
}

pub async fn delete_notification(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Notification::delete_by_id(id).exec(&db).await {
        Ok(res) if res.rows_affected > 0 => {
            Json(json!({ "message": "Notification deleted" })).into_response()
        }
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Notification not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

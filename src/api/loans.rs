use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use super::service_error;
use crate::services::loan_service::{self, LoanFilter};

#[derive(Deserialize)]
pub struct ListLoansQuery {
    pub user_id: Option<i32>,
    pub status: Option<String>,
}

pub async fn list_loans(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let loans = loan_service::list_loans(
        &db,
        LoanFilter {
            user_id: query.user_id,
            status: query.status,
        },
    )
    .await
    .map_err(service_error)?;

    Ok(Json(json!({ "loans": loans, "total": loans.len() })))
}

#[derive(Deserialize)]
pub struct CreateLoanRequest {
    pub user_id: i32,
    pub book_id: String,
}

pub async fn create_loan(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let loan = loan_service::create_loan(&db, payload.user_id, &payload.book_id)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "loan": loan, "message": "Loan created successfully" })),
    ))
}

pub async fn return_loan(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let loan = loan_service::return_loan(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(
        json!({ "loan": loan, "message": "Loan returned successfully" }),
    ))
}

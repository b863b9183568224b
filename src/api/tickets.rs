use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use super::service_error;
use crate::models::ticket::{self, Entity as Ticket, TicketDto};
use crate::models::ticket_response::{self, Entity as TicketResponse};
use crate::services::ticket_service;

#[derive(Deserialize)]
pub struct ListTicketsQuery {
    pub student_id: Option<i32>,
    pub status: Option<String>,
    pub archived: Option<bool>,
}

pub async fn list_tickets(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut condition = Condition::all();

    if let Some(student_id) = query.student_id {
        condition = condition.add(ticket::Column::StudentId.eq(student_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(ticket::Column::Status.eq(status));
    }
    if let Some(archived) = query.archived {
        condition = condition.add(ticket::Column::Archived.eq(archived));
    }

    let tickets = Ticket::find()
        .filter(condition)
        .order_by_desc(ticket::Column::CreatedAt)
        .all(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    Ok(Json(json!({ "tickets": tickets, "total": tickets.len() })))
}

pub async fn get_ticket(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ticket = Ticket::find_by_id(id)
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
            Json(json!({ "error": "Ticket not found" })),
        ))?;

    let responses = TicketResponse::find()
        .filter(ticket_response::Column::TicketId.eq(ticket.id))
        .order_by_asc(ticket_response::Column::CreatedAt)
        .all(&db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    Ok(Json(json!({ "ticket": ticket, "responses": responses })))
}

pub async fn create_ticket(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<TicketDto>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let ticket = ticket_service::create_ticket(&db, dto)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ticket": ticket, "message": "Ticket created successfully" })),
    ))
}

pub async fn update_ticket(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<TicketDto>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ticket = ticket_service::update_ticket(&db, id, dto)
        .await
        .map_err(service_error)?;

    Ok(Json(
        json!({ "ticket": ticket, "message": "Ticket updated successfully" }),
    ))
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
    let ticket = ticket_service::update_status(&db, id, &payload.status)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "ticket": ticket, "message": "Status updated" })))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub assignee: String,
}

pub async fn assign_ticket(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ticket = ticket_service::assign_ticket(&db, id, payload.assignee)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "ticket": ticket, "message": "Ticket assigned" })))
}

pub async fn archive_ticket(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ticket = ticket_service::archive_ticket(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "ticket": ticket, "message": "Ticket archived" })))
}

#[derive(Deserialize)]
pub struct ResponseRequest {
    pub responder: String,
    pub message: String,
}

pub async fn add_response(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<ResponseRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let response = ticket_service::add_response(&db, id, payload.responder, payload.message)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "response": response, "message": "Response added" })),
    ))
}

pub async fn delete_ticket(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ticket_service::delete_ticket(&db, id)
        .await
        .map_err(service_error)?;

    Ok(Json(json!({ "message": "Ticket deleted successfully" })))
}

pub async fn dashboard_stats(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let stats = ticket_service::dashboard_stats(&db)
        .await
        .map_err(service_error)?;
    Ok(Json(stats))
}

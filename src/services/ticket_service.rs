//! Ticket Service - helpdesk state machine and the duplicate guard.

use chrono::{Duration, Utc};
use sea_orm::*;
use serde_json::{json, Value};

use super::ServiceError;
use crate::models::ticket::{self, Entity as Ticket, TicketDto};
use crate::models::ticket_response::{self, Entity as TicketResponse};

const DUPLICATE_WINDOW_MINUTES: i64 = 60;
const DUPLICATE_PREFIX_CHARS: usize = 50;

fn transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("Open", "In Progress")
            | ("Open", "Closed")
            | ("In Progress", "Resolved")
            | ("Resolved", "Closed")
    )
}

/// Find a recent near-identical ticket from the same student: still open or
/// in progress, created inside the window, and containing the new
/// description's first 50 characters (case-insensitive).
pub async fn check_duplicate(
    db: &DatabaseConnection,
    student_id: i32,
    description: &str,
) -> Result<Option<ticket::Model>, ServiceError> {
    let prefix: String = description
        .chars()
        .take(DUPLICATE_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase();

    if prefix.is_empty() {
        return Ok(None);
    }

    let cutoff = (Utc::now() - Duration::minutes(DUPLICATE_WINDOW_MINUTES)).to_rfc3339();

    let candidates = Ticket::find()
        .filter(ticket::Column::StudentId.eq(student_id))
        .filter(ticket::Column::Status.is_in(["Open", "In Progress"]))
        .filter(ticket::Column::CreatedAt.gte(cutoff))
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .find(|t| t.description.to_lowercase().contains(&prefix)))
}

pub async fn create_ticket(
    db: &DatabaseConnection,
    dto: TicketDto,
) -> Result<ticket::Model, ServiceError> {
    if check_duplicate(db, dto.student_id, &dto.description)
        .await?
        .is_some()
    {
        return Err(ServiceError::InvalidState(
            "A similar ticket was submitted recently".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    Ok(ticket::ActiveModel {
        student_id: Set(dto.student_id),
        subject: Set(dto.subject),
        description: Set(dto.description),
        category: Set(dto.category),
        priority: Set(dto.priority),
        status: Set("Open".to_owned()),
        assigned_to: Set(None),
        archived: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Edit subject/description/category/priority. Only open tickets are
/// editable.
pub async fn update_ticket(
    db: &DatabaseConnection,
    id: i32,
    dto: TicketDto,
) -> Result<ticket::Model, ServiceError> {
    let ticket = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if ticket.status != "Open" {
        return Err(ServiceError::InvalidState(
            "Only open tickets can be edited".to_string(),
        ));
    }

    let mut active: ticket::ActiveModel = ticket.into();
    active.subject = Set(dto.subject);
    active.description = Set(dto.description);
    active.category = Set(dto.category);
    active.priority = Set(dto.priority);
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: i32,
    new_status: &str,
) -> Result<ticket::Model, ServiceError> {
    let ticket = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if !transition_allowed(&ticket.status, new_status) {
        return Err(ServiceError::InvalidState(format!(
            "Cannot move a ticket from {} to {}",
            ticket.status, new_status
        )));
    }

    let mut active: ticket::ActiveModel = ticket.into();
    active.status = Set(new_status.to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Assign a ticket. Assignment pulls an open ticket into In Progress.
pub async fn assign_ticket(
    db: &DatabaseConnection,
    id: i32,
    assignee: String,
) -> Result<ticket::Model, ServiceError> {
    let ticket = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if ticket.status != "Open" && ticket.status != "In Progress" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot assign a ticket in status {}",
            ticket.status
        )));
    }

    let mut active: ticket::ActiveModel = ticket.into();
    active.assigned_to = Set(Some(assignee));
    active.status = Set("In Progress".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

pub async fn add_response(
    db: &DatabaseConnection,
    id: i32,
    responder: String,
    message: String,
) -> Result<ticket_response::Model, ServiceError> {
    Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(ticket_response::ActiveModel {
        ticket_id: Set(id),
        responder: Set(responder),
        message: Set(message),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Delete a ticket and its thread. Allowed only while Open or after Closed.
pub async fn delete_ticket(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let ticket = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if ticket.status != "Open" && ticket.status != "Closed" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot delete a ticket in status {}",
            ticket.status
        )));
    }

    TicketResponse::delete_many()
        .filter(ticket_response::Column::TicketId.eq(ticket.id))
        .exec(db)
        .await?;
    Ticket::delete_by_id(ticket.id).exec(db).await?;
    Ok(())
}

pub async fn archive_ticket(db: &DatabaseConnection, id: i32) -> Result<ticket::Model, ServiceError> {
    let ticket = Ticket::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: ticket::ActiveModel = ticket.into();
    active.archived = Set(true);
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Per-status counts for the helpdesk dashboard.
pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<Value, ServiceError> {
    let total = Ticket::find().count(db).await?;
    let open = Ticket::find()
        .filter(ticket::Column::Status.eq("Open"))
        .count(db)
        .await?;
    let in_progress = Ticket::find()
        .filter(ticket::Column::Status.eq("In Progress"))
        .count(db)
        .await?;
    let resolved = Ticket::find()
        .filter(ticket::Column::Status.eq("Resolved"))
        .count(db)
        .await?;
    let closed = Ticket::find()
        .filter(ticket::Column::Status.eq("Closed"))
        .count(db)
        .await?;

    Ok(json!({
        "total": total,
        "open": open,
        "in_progress": in_progress,
        "resolved": resolved,
        "closed": closed,
    }))
}

#[cfg(test)]
mod tests {
    use super::transition_allowed;

    #[test]
    fn closing_paths() {
        assert!(transition_allowed("Open", "In Progress"));
        assert!(transition_allowed("Open", "Closed"));
        assert!(transition_allowed("In Progress", "Resolved"));
        assert!(transition_allowed("Resolved", "Closed"));
    }

    #[test]
    fn rejected_transitions() {
        assert!(!transition_allowed("In Progress", "Closed"));
        assert!(!transition_allowed("Resolved", "Open"));
        assert!(!transition_allowed("Closed", "Open"));
        assert!(!transition_allowed("Open", "Resolved"));
    }
}
